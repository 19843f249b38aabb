use super::defaults;
use super::models::{ListenConfig, LogLevel};
use serde::Deserialize;

/// On-disk layout of `conf/config.toml`, grouped into tables.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    highlight: HighlightConfig,
    #[serde(default)]
    access: AccessConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    cache: CacheConfig,
}

impl From<ConfigTables> for ListenConfig {
    fn from(tables: ConfigTables) -> Self {
        ListenConfig {
            highlight_window_start: tables.highlight.window_start,
            highlight_window_end: tables.highlight.window_end,
            highlight_update_interval_ms: tables.highlight.update_interval_ms,
            free_page_limit: tables.access.free_page_limit,
            audio_preview_secs: tables.access.audio_preview_secs,
            log_level: tables.logging.log_level,
            cache_dir: tables.cache.dir,
        }
    }
}

impl From<&ListenConfig> for ConfigTables {
    fn from(config: &ListenConfig) -> Self {
        ConfigTables {
            highlight: HighlightConfig {
                window_start: config.highlight_window_start,
                window_end: config.highlight_window_end,
                update_interval_ms: config.highlight_update_interval_ms,
            },
            access: AccessConfig {
                free_page_limit: config.free_page_limit,
                audio_preview_secs: config.audio_preview_secs,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            cache: CacheConfig {
                dir: config.cache_dir.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct HighlightConfig {
    #[serde(default = "defaults::default_window_start")]
    window_start: f64,
    #[serde(default = "defaults::default_window_end")]
    window_end: f64,
    #[serde(default = "defaults::default_update_interval_ms")]
    update_interval_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig {
            window_start: defaults::default_window_start(),
            window_end: defaults::default_window_end(),
            update_interval_ms: defaults::default_update_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AccessConfig {
    #[serde(default = "defaults::default_free_page_limit")]
    free_page_limit: usize,
    #[serde(default = "defaults::default_audio_preview_secs")]
    audio_preview_secs: f64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            free_page_limit: defaults::default_free_page_limit(),
            audio_preview_secs: defaults::default_audio_preview_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct CacheConfig {
    #[serde(default = "defaults::default_cache_dir")]
    dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            dir: defaults::default_cache_dir(),
        }
    }
}
