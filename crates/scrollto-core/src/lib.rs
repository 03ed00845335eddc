pub mod animation;
pub mod config;
pub mod document;
pub mod easing;
pub mod env;
pub mod error;
pub mod resolver;
pub mod service;
pub mod stream;
pub mod target;
pub mod timing;
pub mod trigger;

pub use animation::{Phase, ScrollAnimation};
pub use config::{AppConfig, OffsetMap, ScrollDefaults, ScrollToOptions};
pub use document::{Document, ElementSpec};
pub use easing::Easing;
pub use env::{ListenerTarget, NodeId, ScrollEnvironment};
pub use error::{Error, Result};
pub use service::ScrollToService;
pub use stream::{PositionStream, Subscription};
pub use target::{ElementRef, ScrollTarget};
pub use trigger::{ScrollTrigger, TriggerEvent};
