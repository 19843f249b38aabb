//! Listen Mode session state.
//!
//! A session owns one book's current page, its sentence timeline and the
//! highlight tracker. Hosts drive it with `ListenCommand`s and render the
//! `ListenSnapshot` that comes back with every event.

use crate::cache::{self, ListenPosition};
use crate::config::ListenConfig;
use crate::gate::{AccessPolicy, AudioAccess, PageAccess};
use crate::matcher::{HighlightTracker, HighlightUpdate};
use crate::timeline::{self, Sentence};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use ts_rs::TS;

/// Everything the highlight renderer needs to draw the current page.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ListenSnapshot {
    pub book_id: String,
    pub page: usize,
    pub duration: Option<f64>,
    pub current_time: f64,
    pub sentences: Vec<Sentence>,
    pub highlighted_sentence_idx: Option<usize>,
    pub page_access: PageAccess,
    pub audio_access: AudioAccess,
    pub page_locked: bool,
    pub audio_gate_reached: bool,
}

#[derive(Debug, Clone)]
pub enum ListenCommand {
    SetPage { page: usize, html: String },
    SetDuration { secs: f64 },
    TimeUpdate { current_time: f64 },
    SetEntitled { entitled: bool },
    Stop,
}

impl ListenCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::SetPage { .. } => "listen_set_page",
            Self::SetDuration { .. } => "listen_set_duration",
            Self::TimeUpdate { .. } => "listen_time_update",
            Self::SetEntitled { .. } => "listen_set_entitled",
            Self::Stop => "listen_stop",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListenEvent {
    pub action: &'static str,
    pub update: HighlightUpdate,
    pub snapshot: ListenSnapshot,
}

/// Read-along state for one book: the current page, its sentence timeline and
/// the highlight tracker driven by playback time.
#[derive(Debug, Clone)]
pub struct ListenSession {
    book_id: String,
    cache_root: PathBuf,
    policy: AccessPolicy,
    tracker: HighlightTracker,
    page: usize,
    page_html: String,
    page_text: String,
    duration: Option<f64>,
    sentences: Vec<Sentence>,
    entitled: bool,
    current_time: f64,
    resume_from: Option<ListenPosition>,
}

impl ListenSession {
    pub fn new(book_id: impl Into<String>, config: &ListenConfig) -> Self {
        Self {
            book_id: book_id.into(),
            cache_root: PathBuf::from(&config.cache_dir),
            policy: config.access_policy(),
            tracker: HighlightTracker::new(
                config.highlight_window(),
                config.highlight_update_interval(),
            ),
            page: 0,
            page_html: String::new(),
            page_text: String::new(),
            duration: None,
            sentences: Vec::new(),
            entitled: false,
            current_time: 0.0,
            resume_from: None,
        }
    }

    /// Create a session holding the cached position for `book_id`. The page
    /// is not switched here; the playback time is restored once the host
    /// sets the cached page.
    pub fn load(book_id: impl Into<String>, config: &ListenConfig) -> Self {
        let mut session = Self::new(book_id, config);
        session.resume_from = cache::load_listen_position(&session.cache_root, &session.book_id);
        if let Some(position) = session.resume_from {
            info!(
                page = position.page,
                current_time = position.current_time,
                "Found cached listen position"
            );
        }
        session
    }

    /// Cached position not yet consumed by `set_page`.
    pub fn resume_position(&self) -> Option<ListenPosition> {
        self.resume_from
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn entitled(&self) -> bool {
        self.entitled
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn page_text(&self) -> &str {
        &self.page_text
    }

    pub fn highlighted_idx(&self) -> Option<usize> {
        self.tracker.active_idx()
    }

    pub fn page_access(&self) -> PageAccess {
        self.policy.page_access(self.page, self.entitled)
    }

    pub fn audio_access(&self) -> AudioAccess {
        self.policy.audio_access(self.current_time, self.entitled)
    }

    pub fn snapshot(&self) -> ListenSnapshot {
        let page_access = self.page_access();
        let audio_access = self.audio_access();
        ListenSnapshot {
            book_id: self.book_id.clone(),
            page: self.page,
            duration: self.duration,
            current_time: self.current_time,
            sentences: self.sentences.clone(),
            highlighted_sentence_idx: self.highlighted_idx(),
            page_access,
            audio_access,
            page_locked: matches!(page_access, PageAccess::Locked { .. }),
            audio_gate_reached: audio_access.is_expired(),
        }
    }

    pub fn apply_command(&mut self, command: ListenCommand, now: Instant) -> ListenEvent {
        let action = command.action();
        let update = match command {
            ListenCommand::SetPage { page, html } => {
                self.set_page(page, html);
                self.unchanged()
            }
            ListenCommand::SetDuration { secs } => {
                self.set_duration(secs);
                self.unchanged()
            }
            ListenCommand::TimeUpdate { current_time } => self.time_update(now, current_time),
            ListenCommand::SetEntitled { entitled } => {
                self.set_entitled(entitled);
                self.unchanged()
            }
            ListenCommand::Stop => {
                self.stop();
                self.unchanged()
            }
        };
        ListenEvent {
            action,
            update,
            snapshot: self.snapshot(),
        }
    }

    /// Switch to `page` or refresh its markup. A new page means new audio, so
    /// the known duration is forgotten until the player reports it again.
    ///
    /// The first page set after `load` consumes the cached position: its
    /// playback time is restored only when the pages match.
    pub fn set_page(&mut self, page: usize, html: String) {
        let resumed = self.resume_from.take().filter(|position| position.page == page);
        if resumed.is_none()
            && page == self.page
            && html == self.page_html
            && !self.page_html.is_empty()
        {
            return;
        }
        if page != self.page || resumed.is_some() {
            self.duration = None;
            self.current_time = resumed.map_or(0.0, |position| position.current_time);
        }
        if let Some(position) = resumed {
            info!(page, current_time = position.current_time, "Restored playback time");
        }
        self.page = page;
        self.page_text = crate::html::strip_html(&html);
        self.page_html = html;
        info!(page, chars = self.page_text.len(), "Loaded page for listening");
        self.rebuild();
    }

    pub fn set_duration(&mut self, secs: f64) {
        if self.duration.map(f64::to_bits) == Some(secs.to_bits()) {
            return;
        }
        self.duration = Some(secs);
        self.rebuild();
    }

    pub fn set_entitled(&mut self, entitled: bool) {
        if entitled == self.entitled {
            return;
        }
        self.entitled = entitled;
        info!(entitled, "Entitlement changed");
        self.rebuild();
    }

    pub fn time_update(&mut self, now: Instant, current_time: f64) -> HighlightUpdate {
        let was_expired = self.audio_access().is_expired();
        self.current_time = current_time;
        if self.audio_access().is_expired() {
            if !was_expired {
                info!(
                    page = self.page,
                    preview_secs = self.policy.audio_preview_secs,
                    "Audio preview limit reached"
                );
            }
            return self.unchanged();
        }
        self.tracker
            .on_time_update(now, current_time, &self.sentences)
    }

    pub fn stop(&mut self) {
        debug!(page = self.page, "Stopping listen session playback");
        self.current_time = 0.0;
        self.tracker.reset();
    }

    pub fn to_position(&self) -> ListenPosition {
        ListenPosition {
            page: self.page,
            current_time: self.current_time,
        }
    }

    fn unchanged(&self) -> HighlightUpdate {
        HighlightUpdate::Unchanged(self.tracker.active_idx())
    }

    fn rebuild(&mut self) {
        self.tracker.reset();
        self.sentences = match (self.page_access(), self.duration) {
            (PageAccess::Locked { free_page_limit }, _) => {
                info!(page = self.page, free_page_limit, "Page is locked");
                Vec::new()
            }
            (PageAccess::Open, Some(duration)) => timeline::build_timeline(&self.page_text, duration),
            (PageAccess::Open, None) => Vec::new(),
        };
        debug!(
            page = self.page,
            duration = ?self.duration,
            sentences = self.sentences.len(),
            "Rebuilt sentence timeline"
        );
    }
}

pub fn persist_session_housekeeping(session: &ListenSession) {
    cache::save_listen_position(&session.cache_root, &session.book_id, session.to_position());
}
