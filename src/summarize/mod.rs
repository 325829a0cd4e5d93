pub mod gemini;

pub use gemini::GeminiSummarizer;

use crate::error::Result;
use async_trait::async_trait;

/// Fewest sentences a summary is ever asked for.
pub const MIN_SUMMARY_SENTENCES: u32 = 5;

/// Seconds of media covered by one summary sentence.
pub const SECONDS_PER_SENTENCE: f64 = 30.0;

/// Condenses transcript text into a fixed number of sentences.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, sentences: u32) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Number of summary sentences for a media duration: one per 30 seconds,
/// never fewer than five.
///
/// Negative or non-finite durations count as zero.
pub fn summary_length(duration_secs: f64) -> u32 {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return MIN_SUMMARY_SENTENCES;
    }
    let sentences = (duration_secs / SECONDS_PER_SENTENCE).ceil();
    if sentences >= u32::MAX as f64 {
        return u32::MAX;
    }
    (sentences as u32).max(MIN_SUMMARY_SENTENCES)
}

/// Instruction sent to the language model, followed by the transcript.
pub fn build_prompt(text: &str, sentences: u32) -> String {
    format!(
        "Summarize this transcript into exactly {sentences} sentences, identifying key topics \
         or side headings. Structure the summary with these headings. Do not exceed or fall \
         short of this number of sentences.:\n\n{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_length_examples() {
        assert_eq!(summary_length(0.0), 5);
        assert_eq!(summary_length(10.0), 5);
        assert_eq!(summary_length(90.0), 5);
        assert_eq!(summary_length(150.0), 5);
        assert_eq!(summary_length(150.5), 6);
        assert_eq!(summary_length(151.0), 6);
        assert_eq!(summary_length(180.0), 6);
        assert_eq!(summary_length(3600.0), 120);
    }

    #[test]
    fn test_summary_length_matches_formula() {
        for tenth in 0..20_000u32 {
            let d = tenth as f64 / 10.0;
            let expected = (d / 30.0).ceil().max(5.0) as u32;
            assert_eq!(summary_length(d), expected, "duration {d}");
        }
    }

    #[test]
    fn test_summary_length_degenerate_input() {
        assert_eq!(summary_length(-12.0), 5);
        assert_eq!(summary_length(f64::NAN), 5);
        assert_eq!(summary_length(f64::INFINITY), 5);
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt("we talked about rust", 7);
        assert!(prompt.starts_with("Summarize this transcript into exactly 7 sentences"));
        assert!(prompt.contains("headings"));
        assert!(prompt.ends_with(":\n\nwe talked about rust"));
    }
}
