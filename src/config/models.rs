use crate::gate::AccessPolicy;
use crate::matcher::HighlightWindow;
use serde::Deserialize;
use std::time::Duration;
use ts_rs::TS;

/// Listen Mode configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct ListenConfig {
    #[serde(default = "crate::config::defaults::default_window_start")]
    pub highlight_window_start: f64,
    #[serde(default = "crate::config::defaults::default_window_end")]
    pub highlight_window_end: f64,
    #[serde(default = "crate::config::defaults::default_update_interval_ms")]
    pub highlight_update_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_free_page_limit")]
    pub free_page_limit: usize,
    #[serde(default = "crate::config::defaults::default_audio_preview_secs")]
    pub audio_preview_secs: f64,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        ListenConfig {
            highlight_window_start: crate::config::defaults::default_window_start(),
            highlight_window_end: crate::config::defaults::default_window_end(),
            highlight_update_interval_ms: crate::config::defaults::default_update_interval_ms(),
            free_page_limit: crate::config::defaults::default_free_page_limit(),
            audio_preview_secs: crate::config::defaults::default_audio_preview_secs(),
            log_level: crate::config::defaults::default_log_level(),
            cache_dir: crate::config::defaults::default_cache_dir(),
        }
    }
}

impl ListenConfig {
    /// Progress window in which a sentence takes the highlight. Bounds that
    /// are out of order or outside `[0, 1]` are clamped into a usable range.
    pub fn highlight_window(&self) -> HighlightWindow {
        let start = clamp_unit(self.highlight_window_start, 0.6);
        let end = clamp_unit(self.highlight_window_end, 1.0).max(start);
        HighlightWindow { start, end }
    }

    pub fn highlight_update_interval(&self) -> Duration {
        Duration::from_millis(self.highlight_update_interval_ms)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        let preview = if self.audio_preview_secs.is_finite() {
            self.audio_preview_secs.max(0.0)
        } else {
            crate::config::defaults::default_audio_preview_secs()
        };
        AccessPolicy {
            free_page_limit: self.free_page_limit,
            audio_preview_secs: preview,
        }
    }
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_window_is_clamped() {
        let config = ListenConfig {
            highlight_window_start: 1.4,
            highlight_window_end: 0.2,
            ..ListenConfig::default()
        };
        let window = config.highlight_window();
        assert_eq!(window.start, 1.0);
        assert_eq!(window.end, 1.0);
    }

    #[test]
    fn non_finite_preview_falls_back_to_default() {
        let config = ListenConfig {
            audio_preview_secs: f64::NAN,
            ..ListenConfig::default()
        };
        assert_eq!(config.access_policy().audio_preview_secs, 180.0);
    }
}
