//! Scroll animation controller
//!
//! Combines easing and timing to move a container (or the window) from its
//! current offset to a destination, one 16ms tick at a time. Each tick emits
//! the interpolated position on a [`PositionStream`] and writes it to the
//! environment. The animation stops once the position (or the real scroll
//! offset) reaches the destination, or when something forces it to stop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::config::ScrollToOptions;
use crate::easing::Easing;
use crate::env::{ListenerTarget, NodeId, ScrollEnvironment};
use crate::error::{Error, Result};
use crate::stream::PositionStream;
use crate::timing::{self, TICK};

/// Lifecycle of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, timer not armed
    Idle,
    /// Timer armed
    Running,
    /// Finished or cancelled; terminal
    Stopped,
}

type FinishHook = Box<dyn FnOnce() + Send>;

/// Mutable animation state
struct AnimationState {
    phase: Phase,
    elapsed: Duration,
    percentage: f64,
    position: Option<f64>,
    interrupted: bool,
    timer: Option<JoinHandle<()>>,
    on_finish: Option<FinishHook>,
}

struct Shared {
    env: Arc<dyn ScrollEnvironment>,
    container: NodeId,
    listener_target: ListenerTarget,
    is_window: bool,
    /// Target coordinate in the container's scroll space
    to: f64,
    /// `to` plus the applied offset; where the animation ends
    destination: f64,
    start_position: f64,
    direction: f64,
    distance: f64,
    duration: Duration,
    easing: Easing,
    stream: PositionStream,
    state: Mutex<AnimationState>,
}

/// A single scroll animation; clones are handles to the same animation
#[derive(Clone)]
pub struct ScrollAnimation {
    shared: Arc<Shared>,
}

/// Non-owning handle to a [`ScrollAnimation`]
#[derive(Clone)]
pub struct WeakScrollAnimation {
    shared: Weak<Shared>,
}

impl WeakScrollAnimation {
    pub fn upgrade(&self) -> Option<ScrollAnimation> {
        self.shared.upgrade().map(|shared| ScrollAnimation { shared })
    }
}

impl ScrollAnimation {
    /// Prepare an animation of `container` toward `to`
    ///
    /// `to` is a document offset when scrolling the window and a
    /// viewport-relative offset otherwise; it is converted into the
    /// container's own scroll coordinates here.
    pub fn new(
        env: Arc<dyn ScrollEnvironment>,
        container: NodeId,
        listener_target: ListenerTarget,
        is_window: bool,
        to: f64,
        options: &ScrollToOptions,
    ) -> Self {
        let start_position = if is_window {
            env.window_scroll_y()
        } else {
            env.scroll_top(container)
        };

        // Viewport-relative target → container scroll coordinate
        let to = if is_window {
            to
        } else {
            to - env.bounding_client_top(container) + start_position
        };

        let directional_distance = start_position - to;
        let mut distance = directional_distance.abs();

        let offset = if env.is_browser() {
            options.offset_map.resolve(options.offset, env.inner_width())
        } else {
            options.offset
        };
        distance += offset * if directional_distance <= 0.0 { 1.0 } else { -1.0 };

        // An offset larger than the gap flips the travel direction
        let mut direction = timing::direction(start_position, to);
        if distance < 0.0 {
            distance = -distance;
            direction = -direction;
        }

        debug!(
            "Animation prepared: {} -> {} (offset {}, distance {}, {}ms, {})",
            start_position, to, offset, distance, options.duration_ms, options.easing
        );

        Self {
            shared: Arc::new(Shared {
                env,
                container,
                listener_target,
                is_window,
                to,
                destination: to + offset,
                start_position,
                direction,
                distance,
                duration: options.duration(),
                easing: options.easing,
                stream: PositionStream::new(),
                state: Mutex::new(AnimationState {
                    phase: Phase::Idle,
                    elapsed: Duration::ZERO,
                    percentage: 0.0,
                    position: None,
                    interrupted: false,
                    timer: None,
                    on_finish: None,
                }),
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, AnimationState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle that doesn't keep the animation alive
    pub fn downgrade_handle(&self) -> WeakScrollAnimation {
        WeakScrollAnimation {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Arm the 16ms timer and return the position stream
    ///
    /// Any timer armed by an earlier `start` is cancelled first. Starting a
    /// stopped animation arms nothing and returns its completed stream.
    pub fn start(&self) -> Result<PositionStream> {
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;

        let mut state = self.lock_state();
        if state.phase == Phase::Stopped {
            return Ok(self.shared.stream.clone());
        }
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        state.phase = Phase::Running;
        state.timer = Some(runtime.spawn(run_timer(self.downgrade_handle())));
        debug!("Animation started on {:?}", self.shared.listener_target);

        Ok(self.shared.stream.clone())
    }

    /// Advance the animation by one tick
    ///
    /// Returns `false` once the animation has stopped; ticks after that are
    /// no-ops.
    pub fn tick(&self) -> bool {
        let shared = &self.shared;

        let position = {
            let mut state = self.lock_state();
            if state.phase == Phase::Stopped {
                return false;
            }

            state.elapsed = timing::advance(state.elapsed, TICK, shared.duration);
            state.percentage = timing::progress(state.elapsed, shared.duration);

            let eased = shared.easing.apply(state.percentage);
            let position =
                timing::interpolate(shared.start_position, shared.direction, shared.distance, eased);
            state.position = Some(position);

            trace!(
                "Tick: elapsed {:?}, {:.3} -> {:.3}, position {:.2}",
                state.elapsed,
                state.percentage,
                eased,
                position
            );
            position
        };

        shared.stream.emit(position);

        let y = position.floor();
        if shared.is_window {
            let x = shared.env.window_scroll_x();
            shared.env.window_scroll_to(x, y);
        } else {
            shared.env.set_scroll_top(shared.container, y);
        }

        !self.stop_with(false)
    }

    /// Force the animation to stop where it is
    pub fn stop(&self) -> bool {
        self.stop_with(true)
    }

    /// Stop if forced or if the destination has been reached
    ///
    /// The real scroll offset is read fresh from the environment, so a jump
    /// to the destination by other means also ends the animation. Returns
    /// `true` only for the call that actually stopped it.
    pub fn stop_with(&self, force: bool) -> bool {
        let shared = &self.shared;
        let current = if shared.is_window {
            shared.env.window_scroll_y()
        } else {
            shared.env.scroll_top(shared.container)
        };

        let (timer, on_finish) = {
            let mut state = self.lock_state();
            if state.phase == Phase::Stopped {
                return false;
            }

            let reached = state.position == Some(shared.destination)
                || current == shared.destination
                || state.percentage >= 1.0;
            if !force && !reached {
                return false;
            }

            state.phase = Phase::Stopped;
            state.interrupted = !reached;
            (state.timer.take(), state.on_finish.take())
        };

        if let Some(timer) = timer {
            timer.abort();
        }
        shared.stream.complete();

        debug!(
            "Animation stopped at {:?} (destination {}, forced: {})",
            self.position(),
            shared.destination,
            force
        );

        if let Some(on_finish) = on_finish {
            on_finish();
        }
        true
    }

    /// Run `hook` once when the animation stops (immediately if it already has)
    pub fn on_finish(&self, hook: impl FnOnce() + Send + 'static) {
        let mut state = self.lock_state();
        if state.phase == Phase::Stopped {
            drop(state);
            hook();
        } else {
            state.on_finish = Some(Box::new(hook));
        }
    }

    /// The stream of positions this animation emits
    pub fn stream(&self) -> PositionStream {
        self.shared.stream.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    /// Last interpolated position, if any tick has run
    pub fn position(&self) -> Option<f64> {
        self.lock_state().position
    }

    /// Whether the animation was stopped before reaching its destination
    pub fn was_interrupted(&self) -> bool {
        self.lock_state().interrupted
    }

    pub fn elapsed(&self) -> Duration {
        self.lock_state().elapsed
    }

    /// Where the animation will come to rest
    pub fn destination(&self) -> f64 {
        self.shared.destination
    }

    /// Target coordinate before the offset is applied
    pub fn target_position(&self) -> f64 {
        self.shared.to
    }

    pub fn start_position(&self) -> f64 {
        self.shared.start_position
    }

    /// Unsigned distance covered at completion, including the applied offset
    pub fn distance(&self) -> f64 {
        self.shared.distance
    }

    pub fn listener_target(&self) -> ListenerTarget {
        self.shared.listener_target
    }

    /// Whether both handles refer to the same animation
    pub fn ptr_eq(&self, other: &ScrollAnimation) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

/// Repeating 16ms timer; the first tick fires one interval after start
async fn run_timer(animation: WeakScrollAnimation) {
    let mut interval = time::interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(animation) = animation.upgrade() else {
            break;
        };
        if !animation.tick() {
            break;
        }
    }
}
