use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::easing::Easing;
use crate::target::ScrollTarget;
use crate::trigger::TriggerEvent;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Defaults applied to every scroll request that doesn't override them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollDefaults {
    /// Event that triggers a bound scroll (read by `ScrollTrigger` bindings)
    #[serde(default)]
    pub action: TriggerEvent,
    /// Animation duration in milliseconds
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Easing function name (e.g., "easeInOutQuad", "easeOutElastic")
    #[serde(default)]
    pub easing: Easing,
    /// Offset from the top of the target in pixels
    #[serde(default)]
    pub offset: f64,
    /// Responsive offsets as [viewport_width, offset] pairs
    #[serde(default)]
    pub offset_map: OffsetMap,
}

impl Default for ScrollDefaults {
    fn default() -> Self {
        Self {
            action: TriggerEvent::default(),
            duration_ms: default_duration_ms(),
            easing: Easing::default(),
            offset: 0.0,
            offset_map: OffsetMap::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duration_ms() -> u64 {
    650
}

/// Ordered breakpoint → offset pairs
///
/// Entries keep their insertion order; resolution walks them in that order
/// and the last entry whose breakpoint is below the viewport width wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffsetMap(Vec<(f64, f64)>);

impl OffsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the offset for a breakpoint, keeping the position of an existing key
    pub fn insert(&mut self, breakpoint: f64, offset: f64) {
        match self.0.iter_mut().find(|(key, _)| *key == breakpoint) {
            Some(entry) => entry.1 = offset,
            None => self.0.push((breakpoint, offset)),
        }
    }

    pub fn with(mut self, breakpoint: f64, offset: f64) -> Self {
        self.insert(breakpoint, offset);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Offset to apply at `viewport_width`, starting from `base`
    pub fn resolve(&self, base: f64, viewport_width: f64) -> f64 {
        self.0.iter().fold(base, |offset, &(breakpoint, value)| {
            if viewport_width > breakpoint {
                value
            } else {
                offset
            }
        })
    }
}

impl FromIterator<(f64, f64)> for OffsetMap {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut map = OffsetMap::new();
        for (breakpoint, offset) in iter {
            map.insert(breakpoint, offset);
        }
        map
    }
}

/// A single scroll request
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollToOptions {
    /// The element to scroll to
    pub target: ScrollTarget,
    /// The container to scroll (defaults to the first scrollable ancestor)
    pub container: Option<ScrollTarget>,
    pub duration_ms: u64,
    pub easing: Easing,
    pub offset: f64,
    pub offset_map: OffsetMap,
}

impl ScrollToOptions {
    /// Request with the built-in defaults
    pub fn new(target: impl Into<ScrollTarget>) -> Self {
        Self::from_defaults(target, &ScrollDefaults::default())
    }

    /// Request using configured defaults
    pub fn from_defaults(target: impl Into<ScrollTarget>, defaults: &ScrollDefaults) -> Self {
        Self {
            target: target.into(),
            container: None,
            duration_ms: defaults.duration_ms,
            easing: defaults.easing,
            offset: defaults.offset,
            offset_map: defaults.offset_map.clone(),
        }
    }

    pub fn with_container(mut self, container: impl Into<ScrollTarget>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_offset_map(mut self, offset_map: OffsetMap) -> Self {
        self.offset_map = offset_map;
        self
    }

    /// Animation duration as Duration
    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it doesn't exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Write configuration as TOML to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Render configuration as TOML text
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollto/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollto")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ScrollToOptions::new("#top");
        assert_eq!(options.target, ScrollTarget::Id("#top".to_string()));
        assert_eq!(options.container, None);
        assert_eq!(options.duration_ms, 650);
        assert_eq!(options.duration(), Duration::from_millis(650));
        assert_eq!(options.easing, Easing::EaseInOutQuad);
        assert_eq!(options.offset, 0.0);
        assert!(options.offset_map.is_empty());
    }

    #[test]
    fn test_default_action_is_click() {
        let defaults = ScrollDefaults::default();
        assert_eq!(defaults.action, TriggerEvent::Click);
    }

    #[test]
    fn test_offset_map_selection() {
        let map = OffsetMap::new().with(400.0, 10.0).with(800.0, 20.0);

        assert_eq!(map.resolve(0.0, 900.0), 20.0);
        assert_eq!(map.resolve(0.0, 500.0), 10.0);
        assert_eq!(map.resolve(5.0, 300.0), 5.0);
        // Breakpoints are exclusive
        assert_eq!(map.resolve(5.0, 400.0), 5.0);
    }

    #[test]
    fn test_offset_map_last_satisfied_wins() {
        let map: OffsetMap = [(800.0, 20.0), (400.0, 10.0)].into_iter().collect();

        // Both entries are satisfied; the later one overwrites
        assert_eq!(map.resolve(0.0, 900.0), 10.0);
        assert_eq!(map.resolve(0.0, 500.0), 10.0);
    }

    #[test]
    fn test_offset_map_insert_keeps_position() {
        let mut map = OffsetMap::new().with(400.0, 10.0).with(800.0, 20.0);
        map.insert(400.0, 15.0);

        let entries: Vec<_> = map.iter().copied().collect();
        assert_eq!(entries, vec![(400.0, 15.0), (800.0, 20.0)]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_parse_config() {
        let config = AppConfig::parse(
            r#"
            [general]
            log_level = "debug"

            [scroll]
            action = "mouseenter"
            duration_ms = 300
            easing = "easeOutCubic"
            offset = -60
            offset_map = [[480, -40], [1024, -80]]
            "#,
        )
        .unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.scroll.action, TriggerEvent::MouseEnter);
        assert_eq!(config.scroll.duration_ms, 300);
        assert_eq!(config.scroll.easing, Easing::EaseOutCubic);
        assert_eq!(config.scroll.offset, -60.0);
        assert_eq!(config.scroll.offset_map.resolve(-60.0, 1280.0), -80.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.scroll, ScrollDefaults::default());
    }

    #[test]
    fn test_unknown_easing_is_rejected() {
        let err = AppConfig::parse("[scroll]\neasing = \"bounce\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = AppConfig::parse("[scroll]\naction = \"keydown\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/scrollto/config.toml")).unwrap();
        assert_eq!(config.scroll.duration_ms, 650);
    }

    #[test]
    fn test_save_to_round_trips_through_load() {
        let dir = std::env::temp_dir().join(format!("scrollto-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.general.log_level = "debug".to_string();
        config.scroll.action = TriggerEvent::MouseEnter;
        config.scroll.easing = Easing::EaseOutElastic;
        config.scroll.offset = -64.0;
        config.scroll.offset_map = OffsetMap::new().with(768.0, -96.0);

        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded.general.log_level, "debug");
        assert_eq!(loaded.scroll, config.scroll);
    }

    #[test]
    fn test_to_toml_uses_config_names() {
        let text = AppConfig::default().to_toml().unwrap();
        assert!(text.contains("easing = \"easeInOutQuad\""));
        assert!(text.contains("action = \"click\""));
    }

    #[test]
    fn test_options_from_defaults() {
        let defaults = ScrollDefaults {
            duration_ms: 200,
            easing: Easing::EaseInCubic,
            offset: -10.0,
            ..Default::default()
        };
        let options = ScrollToOptions::from_defaults(12i64, &defaults).with_container("body");

        assert_eq!(options.target, ScrollTarget::Number(12));
        assert_eq!(options.container, Some(ScrollTarget::Id("body".to_string())));
        assert_eq!(options.duration_ms, 200);
        assert_eq!(options.easing, Easing::EaseInCubic);
        assert_eq!(options.offset, -10.0);
    }
}
