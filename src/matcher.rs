//! Playback-position matching for the highlighted sentence.
//!
//! A sentence only takes the highlight late in its estimated span, once its
//! progress enters the configured window. Span boundaries are estimates, so
//! switching late keeps the highlight from running ahead of the narration.
//! When nothing matches, the previous highlight stays in place.

use crate::timeline::Sentence;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;
use ts_rs::TS;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// Inclusive progress range `[start, end]` in which a sentence is selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HighlightWindow {
    pub start: f64,
    pub end: f64,
}

impl Default for HighlightWindow {
    fn default() -> Self {
        HighlightWindow {
            start: 0.6,
            end: 1.0,
        }
    }
}

impl HighlightWindow {
    pub fn contains(&self, progress: f64) -> bool {
        progress >= self.start && progress <= self.end
    }
}

/// Fraction of `sentence` elapsed at `current_time`, or `None` for zero-width
/// spans.
pub fn sentence_progress(sentence: &Sentence, current_time: f64) -> Option<f64> {
    let span = sentence.span();
    if !(span > 0.0) {
        return None;
    }
    Some((current_time - sentence.start_time) / span)
}

/// Pick the first sentence whose progress falls inside `window`; otherwise
/// keep `previous` (dropped if it no longer indexes into `sentences`).
pub fn match_sentence(
    current_time: f64,
    sentences: &[Sentence],
    window: HighlightWindow,
    previous: Option<usize>,
) -> Option<usize> {
    let previous = previous.filter(|idx| *idx < sentences.len());
    if !current_time.is_finite() {
        return previous;
    }
    sentences
        .iter()
        .position(|sentence| {
            sentence_progress(sentence, current_time)
                .map(|progress| window.contains(progress))
                .unwrap_or(false)
        })
        .or(previous)
}

/// Outcome of feeding one playback-time notification to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", content = "sentence_idx", rename_all = "snake_case")]
#[ts(export)]
pub enum HighlightUpdate {
    /// Arrived inside the rate-limit interval; nothing was recomputed.
    Throttled,
    /// Recomputed; the active sentence is the same as before.
    Unchanged(Option<usize>),
    /// Recomputed; the highlight moved to this sentence.
    Changed(usize),
}

/// Stateful matcher fed from playback time updates.
///
/// Owns the active sentence index and rate-limits recomputation to one per
/// `min_interval` of wall-clock time.
#[derive(Debug, Clone)]
pub struct HighlightTracker {
    window: HighlightWindow,
    min_interval: Duration,
    last_update: Option<Instant>,
    active_idx: Option<usize>,
}

impl Default for HighlightTracker {
    fn default() -> Self {
        Self::new(HighlightWindow::default(), DEFAULT_UPDATE_INTERVAL)
    }
}

impl HighlightTracker {
    pub fn new(window: HighlightWindow, min_interval: Duration) -> Self {
        Self {
            window,
            min_interval,
            last_update: None,
            active_idx: None,
        }
    }

    pub fn active_idx(&self) -> Option<usize> {
        self.active_idx
    }

    /// Forget the active sentence and the throttle clock. Call whenever the
    /// timeline is rebuilt.
    pub fn reset(&mut self) {
        self.last_update = None;
        self.active_idx = None;
    }

    pub fn on_time_update(
        &mut self,
        now: Instant,
        current_time: f64,
        sentences: &[Sentence],
    ) -> HighlightUpdate {
        if let Some(last) = self.last_update {
            if now.saturating_duration_since(last) < self.min_interval {
                return HighlightUpdate::Throttled;
            }
        }
        self.last_update = Some(now);

        let next = match_sentence(current_time, sentences, self.window, self.active_idx);
        if next == self.active_idx {
            return HighlightUpdate::Unchanged(next);
        }
        self.active_idx = next;
        match next {
            Some(idx) => {
                trace!(idx, current_time, "Highlight moved");
                HighlightUpdate::Changed(idx)
            }
            // Only reachable when the previous index fell off a shorter list.
            None => HighlightUpdate::Unchanged(None),
        }
    }
}
