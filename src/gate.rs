//! Paywall checks for pages and Listen Mode audio.
//!
//! Readers who have not purchased a book get a fixed number of free pages and
//! a short audio preview per page. Entitled readers are never gated.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub free_page_limit: usize,
    pub audio_preview_secs: f64,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            free_page_limit: 10,
            audio_preview_secs: 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(export)]
pub enum PageAccess {
    Open,
    Locked { free_page_limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(export)]
pub enum AudioAccess {
    Open,
    Preview { remaining_secs: f64 },
    Expired,
}

impl AudioAccess {
    pub fn is_expired(&self) -> bool {
        matches!(self, AudioAccess::Expired)
    }
}

impl AccessPolicy {
    /// Pages are zero-indexed; `page_idx < free_page_limit` is free.
    pub fn page_access(&self, page_idx: usize, entitled: bool) -> PageAccess {
        if entitled || page_idx < self.free_page_limit {
            PageAccess::Open
        } else {
            PageAccess::Locked {
                free_page_limit: self.free_page_limit,
            }
        }
    }

    pub fn audio_access(&self, current_time: f64, entitled: bool) -> AudioAccess {
        if entitled {
            return AudioAccess::Open;
        }
        // Unknown positions are treated as the start of the preview.
        let elapsed = if current_time.is_finite() {
            current_time.max(0.0)
        } else {
            0.0
        };
        if elapsed >= self.audio_preview_secs {
            AudioAccess::Expired
        } else {
            AudioAccess::Preview {
                remaining_secs: self.audio_preview_secs - elapsed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_pages_open_until_limit() {
        let policy = AccessPolicy {
            free_page_limit: 3,
            ..AccessPolicy::default()
        };
        assert_eq!(policy.page_access(0, false), PageAccess::Open);
        assert_eq!(policy.page_access(2, false), PageAccess::Open);
        assert_eq!(
            policy.page_access(3, false),
            PageAccess::Locked { free_page_limit: 3 }
        );
        assert_eq!(policy.page_access(300, true), PageAccess::Open);
    }

    #[test]
    fn audio_preview_expires_at_three_minutes() {
        let policy = AccessPolicy::default();
        assert_eq!(
            policy.audio_access(0.0, false),
            AudioAccess::Preview {
                remaining_secs: 180.0
            }
        );
        assert_eq!(
            policy.audio_access(179.5, false),
            AudioAccess::Preview {
                remaining_secs: 0.5
            }
        );
        assert!(policy.audio_access(180.0, false).is_expired());
        assert!(policy.audio_access(900.0, false).is_expired());
        assert_eq!(policy.audio_access(900.0, true), AudioAccess::Open);
    }

    #[test]
    fn invalid_times_count_as_preview_start() {
        let policy = AccessPolicy::default();
        for time in [-5.0, f64::NAN] {
            assert_eq!(
                policy.audio_access(time, false),
                AudioAccess::Preview {
                    remaining_secs: 180.0
                }
            );
        }
    }
}
