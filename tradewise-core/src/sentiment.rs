//! Keyword-count sentiment heuristic for headlines.
//!
//! Each lexicon word counts once if it appears anywhere in the lower-cased
//! text as a substring ("upgrade" therefore also counts "up"). The score is
//! positive hits minus negative hits. This is a demo heuristic, not NLP.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const POSITIVE_WORDS: [&str; 12] = [
    "gain",
    "beat",
    "up",
    "strong",
    "positive",
    "record",
    "surge",
    "growth",
    "raise",
    "outperform",
    "upgrade",
    "profit",
];

pub const NEGATIVE_WORDS: [&str; 12] = [
    "drop",
    "fall",
    "loss",
    "miss",
    "down",
    "weak",
    "decline",
    "warning",
    "cut",
    "recall",
    "lawsuit",
    "downgrade",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: i32,
}

/// Score free text against the fixed lexicons.
pub fn score(text: &str) -> Sentiment {
    let text = text.to_lowercase();
    let hits = |words: &[&str]| words.iter().filter(|w| text.contains(*w)).count() as i32;

    let score = hits(&POSITIVE_WORDS) - hits(&NEGATIVE_WORDS);
    let label = match score {
        s if s > 0 => SentimentLabel::Positive,
        s if s < 0 => SentimentLabel::Negative,
        _ => SentimentLabel::Neutral,
    };

    Sentiment { label, score }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_phrase() {
        assert_eq!(
            score("strong growth"),
            Sentiment {
                label: SentimentLabel::Positive,
                score: 2
            }
        );
    }

    #[test]
    fn negative_phrase() {
        assert_eq!(
            score("recall lawsuit"),
            Sentiment {
                label: SentimentLabel::Negative,
                score: -2
            }
        );
    }

    #[test]
    fn neutral_phrase() {
        assert_eq!(
            score("the stock moved"),
            Sentiment {
                label: SentimentLabel::Neutral,
                score: 0
            }
        );
        assert_eq!(score("").label, SentimentLabel::Neutral);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(score("RECORD PROFIT").score, 2);
    }

    #[test]
    fn substring_matches_count_each_word_once() {
        // "upgrade" contains "up": both count; repeats do not add.
        assert_eq!(score("upgrade").score, 2);
        assert_eq!(score("gain gain gain").score, 1);
        // "downgrade" contains "down"
        assert_eq!(score("downgrade").score, -2);
    }

    #[test]
    fn mixed_text_can_cancel_out() {
        let s = score("Profit beat estimates but guidance cut on weak demand");
        // positive: profit, beat; negative: cut, weak
        assert_eq!(s.score, 0);
        assert_eq!(s.label, SentimentLabel::Neutral);
    }

    #[test]
    fn lexicons_are_disjoint() {
        for w in POSITIVE_WORDS {
            assert!(!NEGATIVE_WORDS.contains(&w));
        }
    }
}
