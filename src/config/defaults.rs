pub(crate) fn default_window_start() -> f64 {
    0.6
}

pub(crate) fn default_window_end() -> f64 {
    1.0
}

pub(crate) fn default_update_interval_ms() -> u64 {
    200
}

pub(crate) fn default_free_page_limit() -> usize {
    10
}

pub(crate) fn default_audio_preview_secs() -> f64 {
    180.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}
