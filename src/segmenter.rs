//! Text splitting for read-along alignment.

use once_cell::sync::Lazy;
use regex::Regex;

/// A run of non-terminal characters closed by one or more of `.`, `!`, `?`.
static RE_SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());

/// Lightweight punctuation-based sentence splitter.
///
/// Each sentence runs up to and including a run of terminal punctuation and is
/// trimmed. Text after the last terminal run becomes a final sentence, so text
/// without any terminal punctuation comes back as a single sentence. Blank
/// input yields no sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut cursor = 0usize;

    for found in RE_SENTENCE.find_iter(text) {
        // Leading terminal marks have no sentence of their own; fold them in.
        push_trimmed(&mut sentences, &text[cursor..found.end()]);
        cursor = found.end();
    }
    push_trimmed(&mut sentences, &text[cursor..]);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::split_sentences;

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences =
            split_sentences("Hello world. This is a test sentence with more words.");
        assert_eq!(
            sentences,
            vec!["Hello world.", "This is a test sentence with more words."]
        );
    }

    #[test]
    fn keeps_runs_of_terminal_marks_together() {
        let sentences = split_sentences("Wait?! Really... Yes!!!");
        assert_eq!(sentences, vec!["Wait?!", "Really...", "Yes!!!"]);
    }

    #[test]
    fn text_without_punctuation_is_one_sentence() {
        assert_eq!(
            split_sentences("  no punctuation at all here  "),
            vec!["no punctuation at all here"]
        );
    }

    #[test]
    fn trailing_fragment_becomes_last_sentence() {
        assert_eq!(
            split_sentences("First one. And then a fragment"),
            vec!["First one.", "And then a fragment"]
        );
    }

    #[test]
    fn leading_marks_are_folded_into_first_sentence() {
        assert_eq!(split_sentences("...so it begins."), vec!["...so it begins."]);
    }

    #[test]
    fn only_punctuation_is_one_sentence() {
        assert_eq!(split_sentences("?!"), vec!["?!"]);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" \n\t ").is_empty());
    }

    #[test]
    fn multiline_text_is_trimmed_per_sentence() {
        assert_eq!(
            split_sentences("One.\n\nTwo!\n"),
            vec!["One.", "Two!"]
        );
    }
}
