use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::animation::ScrollAnimation;
use crate::config::ScrollToOptions;
use crate::env::{EventHandler, ListenerId, ScrollEnvironment};
use crate::error::Result;
use crate::resolver::Resolver;
use crate::stream::PositionStream;

/// User input that cancels a running scroll
pub const INTERRUPTIVE_EVENTS: [&str; 3] = ["mousewheel", "DOMMouseScroll", "touchstart"];

/// Entry point for scroll requests
///
/// At most one animation runs at a time; a new request stops the previous
/// one before starting.
pub struct ScrollToService {
    env: Arc<dyn ScrollEnvironment>,
    current: Mutex<Option<ScrollAnimation>>,
}

impl ScrollToService {
    pub fn new(env: Arc<dyn ScrollEnvironment>) -> Self {
        Self {
            env,
            current: Mutex::new(None),
        }
    }

    pub fn env(&self) -> &Arc<dyn ScrollEnvironment> {
        &self.env
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<ScrollAnimation>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start scrolling to `options.target`
    ///
    /// Returns the position stream of the new animation. Resolution failures
    /// are reported on the stream rather than returned; outside a browser
    /// the stream completes immediately without emitting.
    pub fn scroll_to(&self, options: ScrollToOptions) -> PositionStream {
        if !self.env.is_browser() {
            debug!("Not running in a browser, ignoring scroll to {}", options.target);
            return PositionStream::completed();
        }

        match self.start_animation(&options) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Scroll to {} failed: {}", options.target, e);
                PositionStream::failed(e)
            }
        }
    }

    fn start_animation(&self, options: &ScrollToOptions) -> Result<PositionStream> {
        let mut current = self.lock_current();
        if let Some(previous) = current.take() {
            previous.stop();
        }

        let resolver = Resolver::new(self.env.as_ref());
        let target = resolver.target(options)?;
        let container = resolver.get_container(options, target)?;
        let listener_target = resolver.listener_target(container);
        let is_window = listener_target.is_window();

        let to = if is_window {
            self.env.offset_top(target)
        } else {
            self.env.bounding_client_top(target)
        };

        let animation = ScrollAnimation::new(
            self.env.clone(),
            container,
            listener_target,
            is_window,
            to,
            options,
        );
        let stream = animation.start()?;

        let listeners: Vec<ListenerId> = INTERRUPTIVE_EVENTS
            .iter()
            .map(|event| {
                let weak = animation.downgrade_handle();
                let handler: EventHandler = Arc::new(move |event: &str| {
                    if let Some(animation) = weak.upgrade() {
                        if animation.stop() {
                            debug!("Scroll interrupted by '{}'", event);
                        }
                    }
                });
                self.env.add_event_listener(listener_target, event, handler)
            })
            .collect();

        let env = self.env.clone();
        animation.on_finish(move || {
            for id in listeners {
                env.remove_event_listener(listener_target, id);
            }
        });

        info!(
            "Scrolling to {} in {:?} over {}ms",
            options.target, listener_target, options.duration_ms
        );
        *current = Some(animation);
        Ok(stream)
    }

    /// Stop the running animation, if any
    pub fn stop(&self) -> bool {
        match self.lock_current().take() {
            Some(animation) => animation.stop(),
            None => false,
        }
    }

    /// The most recently started animation
    pub fn current(&self) -> Option<ScrollAnimation> {
        self.lock_current().clone()
    }

    /// Whether an animation is currently moving
    pub fn is_animating(&self) -> bool {
        self.lock_current()
            .as_ref()
            .is_some_and(|animation| animation.is_running())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, ElementSpec};
    use crate::env::{ListenerTarget, NodeId};
    use crate::error::Error;
    use std::time::Duration;

    struct Page {
        doc: Arc<Document>,
        panel: NodeId,
    }

    fn create_test_page() -> Page {
        let doc = Arc::new(Document::new(1280.0, 800.0));
        doc.set_document_height(6000.0);
        let body = doc.body_node();

        doc.append(body, ElementSpec::new("section").id("section1").top(0.0).height(1000.0));
        doc.append(body, ElementSpec::new("section").id("section2").top(1000.0).height(1000.0));
        doc.append(body, ElementSpec::new("section").id("section3").top(2500.0).height(1000.0));
        let panel = doc.append(
            body,
            ElementSpec::new("div")
                .id("panel")
                .top(4000.0)
                .height(500.0)
                .content_height(2500.0)
                .overflow_y("auto"),
        );
        doc.append(panel, ElementSpec::new("p").id("faq-7").top(5200.0).height(40.0));

        Page { doc, panel }
    }

    fn service(page: &Page) -> ScrollToService {
        ScrollToService::new(page.doc.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_to_section() {
        let page = create_test_page();
        let service = service(&page);

        let stream = service.scroll_to(ScrollToOptions::new("#section2").with_duration_ms(100));
        assert!(service.is_animating());

        let positions = stream.subscribe().collect().await.unwrap();
        assert_eq!(positions.len(), 7);
        assert_eq!(*positions.last().unwrap(), 1000.0);
        assert_eq!(page.doc.window_scroll_y(), 1000.0);
        assert!(!service.is_animating());
        assert_eq!(page.doc.listener_count(ListenerTarget::Window), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hash_prefix_is_optional() {
        let page = create_test_page();
        let service = service(&page);

        let with_hash = service
            .scroll_to(ScrollToOptions::new("#section3").with_duration_ms(64))
            .subscribe()
            .collect()
            .await
            .unwrap();

        page.doc.window_scroll_to(0.0, 0.0);
        let without_hash = service
            .scroll_to(ScrollToOptions::new("section3").with_duration_ms(64))
            .subscribe()
            .collect()
            .await
            .unwrap();

        assert_eq!(with_hash, without_hash);
        assert_eq!(page.doc.window_scroll_y(), 2500.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_target_fails_stream() {
        let page = create_test_page();
        let service = service(&page);

        let stream = service.scroll_to(ScrollToOptions::new("#section9"));
        let err = stream.subscribe().collect().await.unwrap_err();
        assert!(matches!(&*err, Error::TargetNotFound(_)));
        assert!(!service.is_animating());
        assert_eq!(page.doc.window_scroll_y(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container_fails_stream() {
        let page = create_test_page();
        let service = service(&page);

        let options = ScrollToOptions::new("section2").with_container("#sidebar");
        let err = service.scroll_to(options).subscribe().collect().await.unwrap_err();
        assert!(matches!(&*err, Error::ContainerNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_stops_previous() {
        let page = create_test_page();
        let service = service(&page);

        let first = service.scroll_to(ScrollToOptions::new("section3").with_duration_ms(1000));
        let first_animation = service.current().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let stopped_at = first.latest().unwrap();

        let second = service.scroll_to(ScrollToOptions::new("section1").with_duration_ms(200));
        let second_animation = service.current().unwrap();
        assert!(!second_animation.ptr_eq(&first_animation));
        assert!(first_animation.was_interrupted());
        assert!(second_animation.is_running());
        assert!(first.is_terminated());
        assert_eq!(first.latest(), Some(stopped_at));
        assert!(stopped_at > 0.0 && stopped_at < 2500.0);

        second.subscribe().collect().await.unwrap();
        assert_eq!(page.doc.window_scroll_y(), 0.0);
        assert_eq!(first.latest(), Some(stopped_at));
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_interrupts_scroll() {
        let page = create_test_page();
        let service = service(&page);

        let stream = service.scroll_to(ScrollToOptions::new("section3").with_duration_ms(1000));
        assert_eq!(page.doc.listener_count(ListenerTarget::Window), 3);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let at = page.doc.window_scroll_y();
        assert_eq!(page.doc.dispatch_event(ListenerTarget::Window, "touchstart"), 1);

        assert!(stream.is_terminated());
        assert!(stream.error().is_none());
        assert_eq!(page.doc.listener_count(ListenerTarget::Window), 0);
        assert!(!service.is_animating());
        assert!(service.current().unwrap().was_interrupted());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(page.doc.window_scroll_y(), at);
        assert!(at < 2500.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wheel_interrupts_scroll() {
        let page = create_test_page();
        let service = service(&page);

        let stream = service.scroll_to(ScrollToOptions::new("section3"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        page.doc.dispatch_event(ListenerTarget::Window, "DOMMouseScroll");

        assert!(stream.is_terminated());
        assert_eq!(page.doc.dispatch_event(ListenerTarget::Window, "mousewheel"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolls_nested_container() {
        let page = create_test_page();
        let service = service(&page);

        let stream = service.scroll_to(ScrollToOptions::new("faq-7").with_duration_ms(160));
        assert_eq!(page.doc.listener_count(ListenerTarget::Element(page.panel)), 3);
        assert_eq!(page.doc.listener_count(ListenerTarget::Window), 0);

        let positions = stream.subscribe().collect().await.unwrap();
        assert_eq!(*positions.last().unwrap(), 1200.0);
        assert_eq!(page.doc.scroll_top(page.panel), 1200.0);
        assert_eq!(page.doc.window_scroll_y(), 0.0);
        assert_eq!(page.doc.listener_count(ListenerTarget::Element(page.panel)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offset_shifts_destination() {
        let page = create_test_page();
        let service = service(&page);

        let options = ScrollToOptions::new("section2").with_duration_ms(64).with_offset(-80.0);
        service.scroll_to(options).subscribe().collect().await.unwrap();
        assert_eq!(page.doc.window_scroll_y(), 920.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_browser_completes_empty() {
        let page = create_test_page();
        page.doc.set_browser(false);
        let service = service(&page);

        let stream = service.scroll_to(ScrollToOptions::new("section2"));
        assert!(stream.subscribe().collect().await.unwrap().is_empty());
        assert!(!service.is_animating());
        assert_eq!(page.doc.listener_count(ListenerTarget::Window), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop() {
        let page = create_test_page();
        let service = service(&page);

        assert!(!service.stop());
        let stream = service.scroll_to(ScrollToOptions::new("section3"));
        tokio::time::sleep(Duration::from_millis(32)).await;

        assert!(service.stop());
        assert!(stream.is_terminated());
        assert!(!service.stop());
    }
}
