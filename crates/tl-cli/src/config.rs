//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use tl_core::controller::{DEFAULT_DEBOUNCE_DELAY, DEFAULT_FILTER_FIELDS, DEFAULT_RESIZE_DELAY};
use tl_core::{NAVIGATION_GUARD, PanelConfig, Theme};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of filter fields on the panel.
    pub filter_field_count: usize,

    /// Highlight colors, one highlight field per color.
    pub highlight_colors: Vec<String>,

    /// Quiet period before typed patterns are applied.
    pub debounce_delay_ms: u64,

    /// Events closer than this to the center are skipped by navigation.
    pub navigation_guard_ms: u64,

    /// Delay before relayout after the window is resized.
    pub resize_delay_ms: u64,

    /// Overview bands shown below the primary band.
    pub overview_bands: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter_field_count: DEFAULT_FILTER_FIELDS,
            highlight_colors: Theme::classic().highlight_colors,
            debounce_delay_ms: duration_ms(DEFAULT_DEBOUNCE_DELAY),
            navigation_guard_ms: NAVIGATION_GUARD.num_milliseconds().unsigned_abs(),
            resize_delay_ms: duration_ms(DEFAULT_RESIZE_DELAY),
            overview_bands: 3,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Guards too large for `TimeDelta` saturate.
fn guard_delta(ms: u64) -> TimeDelta {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TL_DEBOUNCE_DELAY_MS=150 and friends
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }

    pub fn theme(&self) -> Theme {
        Theme {
            highlight_colors: self.highlight_colors.clone(),
        }
    }

    /// Panel settings derived from this configuration.
    pub fn panel_config(&self) -> PanelConfig {
        PanelConfig {
            filter_field_count: self.filter_field_count,
            debounce_delay: Duration::from_millis(self.debounce_delay_ms),
            navigation_guard: guard_delta(self.navigation_guard_ms),
            resize_delay: Duration::from_millis(self.resize_delay_ms),
            ..PanelConfig::for_theme(&self.theme())
        }
    }
}

/// Returns the platform-specific config directory for tl.
///
/// On Linux: `~/.config/tl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_config_path_ends_with_tl() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }

    #[test]
    fn test_default_config_matches_panel_defaults() {
        let config = Config::default();
        assert_eq!(config.panel_config(), PanelConfig::default());
        assert_eq!(config.debounce_delay_ms, 300);
        assert_eq!(config.navigation_guard_ms, 10_000);
        assert_eq!(config.resize_delay_ms, 500);
    }

    #[test]
    fn test_highlight_field_count_follows_colors() {
        let config = Config {
            highlight_colors: vec!["#00FF00".to_string(), "#FF00FF".to_string()],
            ..Config::default()
        };
        assert_eq!(config.panel_config().highlight_field_count, 2);
        assert_eq!(config.theme().highlight_color(1), Some("#FF00FF"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filter_field_count = 6").unwrap();
        writeln!(file, "navigation_guard_ms = 2500").unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.filter_field_count, 6);
        assert_eq!(config.navigation_guard_ms, 2_500);
        assert_eq!(config.panel_config().navigation_guard, TimeDelta::milliseconds(2_500));
    }

    #[test]
    fn test_load_from_rejects_negative_guard() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "navigation_guard_ms = -5000").unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn test_huge_guard_saturates() {
        let config = Config {
            navigation_guard_ms: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.panel_config().navigation_guard, TimeDelta::MAX);
    }

    #[test]
    fn test_load_from_rejects_wrong_types() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filter_field_count = \"many\"").unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }
}
