//! Word-proportional timing for read-along highlighting.
//!
//! Each sentence receives a share of the narration duration proportional to
//! its word count. This assumes a uniform narration pace; nothing corrects
//! drift when the real audio speeds up or pauses.

use crate::segmenter::split_sentences;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

/// One sentence and its estimated `[start_time, end_time)` span in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sentence {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    pub word_count: usize,
}

impl Sentence {
    pub fn span(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Count whitespace-delimited tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Assign contiguous spans covering `[0, duration]` to `sentences`.
///
/// Returns an empty timeline when the sentences hold no words at all. The last
/// span always ends exactly at `duration`.
pub fn allocate_spans<S: AsRef<str>>(sentences: &[S], duration: f64) -> Vec<Sentence> {
    let duration = sanitize_duration(duration);
    let word_counts: Vec<usize> = sentences.iter().map(|s| count_words(s.as_ref())).collect();
    let total_words: usize = word_counts.iter().sum();
    if total_words == 0 {
        debug!(
            sentences = sentences.len(),
            "No words to allocate; timeline is empty"
        );
        return Vec::new();
    }

    let mut timeline = Vec::with_capacity(sentences.len());
    let mut cumulative = 0.0f64;
    for (sentence, word_count) in sentences.iter().zip(word_counts) {
        let ratio = word_count as f64 / total_words as f64;
        let start_time = cumulative;
        let end_time = cumulative + duration * ratio;
        cumulative = end_time;
        timeline.push(Sentence {
            text: sentence.as_ref().to_string(),
            start_time,
            end_time,
            word_count,
        });
    }

    if let Some(last) = timeline.last_mut() {
        last.end_time = duration.max(last.start_time);
    }

    debug!(
        sentences = timeline.len(),
        total_words,
        duration,
        "Allocated sentence spans"
    );
    timeline
}

/// Segment plain `text` and allocate spans over `duration` seconds.
pub fn build_timeline(text: &str, duration: f64) -> Vec<Sentence> {
    let sentences = split_sentences(text);
    allocate_spans(&sentences, duration)
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration >= 0.0 {
        return duration;
    }
    warn!(duration, "Invalid audio duration; treating as zero");
    0.0
}
