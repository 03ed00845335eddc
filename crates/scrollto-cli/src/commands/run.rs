use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::info;

use scrollto_core::{
    AppConfig, Easing, ElementSpec, ListenerTarget, ScrollEnvironment, ScrollToOptions,
    ScrollToService, ScrollTrigger,
};

use crate::page::PageSpec;

/// Overrides for a simulated scroll
pub struct RunArgs {
    pub page: PathBuf,
    pub target: String,
    pub container: Option<String>,
    pub duration_ms: Option<u64>,
    pub easing: Option<Easing>,
    pub offset: Option<f64>,
    pub width: Option<f64>,
    pub interrupt_after_ms: Option<u64>,
    pub json: bool,
}

#[derive(Serialize)]
struct PositionLine {
    tick: usize,
    position: f64,
}

#[derive(Serialize)]
struct SummaryLine {
    ticks: usize,
    final_offset: f64,
    interrupted: bool,
}

pub async fn run(config: &AppConfig, args: RunArgs) -> Result<()> {
    let stdout = std::io::stdout();
    simulate(config, args, &mut stdout.lock()).await
}

/// Build the page, fire the configured trigger action on a link to the
/// target and report every position to `out`
pub async fn simulate(config: &AppConfig, args: RunArgs, out: &mut impl Write) -> Result<()> {
    let page = PageSpec::load(&args.page)?;
    let doc = Arc::new(page.build()?);
    if let Some(width) = args.width {
        doc.set_viewport_width(width);
    }

    let mut options = ScrollToOptions::from_defaults(args.target, &config.scroll);
    if let Some(container) = args.container {
        options = options.with_container(container);
    }
    if let Some(duration_ms) = args.duration_ms {
        options = options.with_duration_ms(duration_ms);
    }
    if let Some(easing) = args.easing {
        options = options.with_easing(easing);
    }
    if let Some(offset) = args.offset {
        options = options.with_offset(offset);
    }

    let service = Arc::new(ScrollToService::new(doc.clone()));
    let link = doc.append(doc.body_node(), ElementSpec::new("a"));
    let action = config.scroll.action;
    let trigger = ScrollTrigger::bind(&service, link, action.as_str(), options)?;

    info!("Dispatching '{}' on the scroll link", action);
    doc.dispatch_event(ListenerTarget::Element(link), action.as_str());
    let stream = trigger
        .last_stream()
        .ok_or_else(|| anyhow!("'{}' did not start a scroll", action))?;
    let listener_target = service.current().map(|animation| animation.listener_target());

    if let (Some(after), Some(target)) = (args.interrupt_after_ms, listener_target) {
        let doc = doc.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after)).await;
            info!("Simulating touchstart after {}ms", after);
            doc.dispatch_event(target, "touchstart");
        });
    }

    let mut subscription = stream.subscribe();
    let mut ticks = 0;
    while let Some(item) = subscription.next().await {
        let position = item.map_err(|e| anyhow!("{}", e))?;
        ticks += 1;
        if args.json {
            writeln!(out, "{}", serde_json::to_string(&PositionLine { tick: ticks, position })?)?;
        } else {
            writeln!(out, "  {:>4}  {:.2}", ticks, position)?;
        }
    }

    let final_offset = match listener_target {
        Some(ListenerTarget::Element(container)) => doc.scroll_top(container),
        _ => doc.window_scroll_y(),
    };
    let interrupted = service
        .current()
        .is_some_and(|animation| animation.was_interrupted());

    if args.json {
        let summary = SummaryLine {
            ticks,
            final_offset,
            interrupted,
        };
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    } else {
        writeln!(out, "\nScroll finished after {} ticks at offset {}", ticks, final_offset)?;
        if interrupted {
            writeln!(out, "(interrupted)")?;
        }
    }

    Ok(())
}
