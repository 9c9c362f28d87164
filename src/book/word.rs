//! Word-level timestamp records and the payload parser.

use crate::error::TimestampError;
use serde::{Deserialize, Serialize};

/// Playback time in seconds from the start of the narration.
pub type Seconds = f64;

/// One spoken word and the interval in which it is spoken.
///
/// Invariants: `0 <= start <= end`, both finite. Enforced on deserialization
/// and by [`TimedWord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimedWord")]
pub struct TimedWord {
    pub text: String,
    pub start: Seconds,
    pub end: Seconds,
}

impl TimedWord {
    /// Creates a word, validating its interval.
    pub fn new(
        text: impl Into<String>,
        start: Seconds,
        end: Seconds,
    ) -> Result<Self, TimestampError> {
        let reason = if !start.is_finite() || !end.is_finite() {
            Some("not finite")
        } else if start < 0.0 {
            Some("start is negative")
        } else if start > end {
            Some("start is after end")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(TimestampError::Interval { start, end, reason });
        }
        Ok(Self {
            text: text.into(),
            start,
            end,
        })
    }

    /// Whether the trimmed text ends a sentence.
    pub fn ends_sentence(&self) -> bool {
        self.text.trim().ends_with('.')
    }

    /// Length of the spoken interval.
    pub fn duration(&self) -> Seconds {
        self.end - self.start
    }
}

/// Shapes accepted in a timestamps payload.
///
/// Transcription and alignment tools disagree on field names; all three are
/// normalized into [`TimedWord`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimedWord {
    Flat {
        text: String,
        start: Seconds,
        end: Seconds,
    },
    Whisper {
        text: String,
        timestamp: [Seconds; 2],
    },
    Aligned {
        word: String,
        time: [Seconds; 2],
    },
}

impl TryFrom<RawTimedWord> for TimedWord {
    type Error = TimestampError;

    fn try_from(raw: RawTimedWord) -> Result<Self, Self::Error> {
        match raw {
            RawTimedWord::Flat { text, start, end } => TimedWord::new(text, start, end),
            RawTimedWord::Whisper {
                text,
                timestamp: [start, end],
            } => TimedWord::new(text, start, end),
            RawTimedWord::Aligned {
                word,
                time: [start, end],
            } => TimedWord::new(word, start, end),
        }
    }
}

/// Parse a JSON timestamps payload into an ordered word list.
///
/// Entries must be sorted by `start`. Errors name the offending entry.
pub fn parse_timestamps(json: &str) -> Result<Vec<TimedWord>, TimestampError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| TimestampError::NotAnArray {
            message: e.to_string(),
        })?;

    let mut words = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let word: TimedWord =
            serde_json::from_value(value).map_err(|e| TimestampError::Entry {
                index,
                message: e.to_string(),
            })?;
        if let Some(previous) = words.last().map(|w: &TimedWord| w.start)
            && word.start < previous
        {
            return Err(TimestampError::Order {
                index,
                start: word.start,
                previous,
            });
        }
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_negative_start() {
        assert!(TimedWord::new("a", -0.1, 1.0).is_err());
    }

    #[test]
    fn new_rejects_inverted_interval() {
        let err = TimedWord::new("a", 2.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            TimestampError::Interval {
                start: 2.0,
                end: 1.0,
                reason: "start is after end"
            }
        );
    }

    #[test]
    fn new_rejects_nan() {
        assert!(TimedWord::new("a", f64::NAN, 1.0).is_err());
    }

    #[test]
    fn zero_length_word_is_valid() {
        let word = TimedWord::new("uh", 3.0, 3.0).unwrap();
        assert_eq!(word.duration(), 0.0);
    }

    #[test]
    fn ends_sentence_ignores_surrounding_whitespace() {
        assert!(TimedWord::new(" pigs. ", 0.0, 1.0).unwrap().ends_sentence());
        assert!(!TimedWord::new(" pigs,", 0.0, 1.0).unwrap().ends_sentence());
        assert!(!TimedWord::new("pigs!", 0.0, 1.0).unwrap().ends_sentence());
    }

    #[test]
    fn parses_all_payload_shapes() {
        let json = r#"[
            {"text": "Once", "start": 0.0, "end": 0.4},
            {"text": " upon", "timestamp": [0.4, 0.7]},
            {"word": "a", "time": [0.7, 0.8]}
        ]"#;
        let words = parse_timestamps(json).unwrap();

        assert_eq!(words.len(), 3);
        assert_eq!(words[0], TimedWord::new("Once", 0.0, 0.4).unwrap());
        assert_eq!(words[1].text, " upon");
        assert_eq!(words[1].start, 0.4);
        assert_eq!(words[2].text, "a");
        assert_eq!(words[2].end, 0.8);
    }

    #[test]
    fn serializes_to_flat_shape() {
        let word = TimedWord::new("time", 1.5, 2.0).unwrap();
        let json = serde_json::to_value(&word).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "time", "start": 1.5, "end": 2.0})
        );
    }

    #[test]
    fn invalid_interval_names_entry() {
        let json = r#"[
            {"text": "ok", "start": 0.0, "end": 1.0},
            {"text": "bad", "start": 3.0, "end": 2.0}
        ]"#;
        let err = parse_timestamps(json).unwrap_err();
        assert!(
            matches!(err, TimestampError::Entry { index: 1, .. }),
            "got: {err}"
        );
        assert!(err.to_string().contains("start is after end"), "got: {err}");
    }

    #[test]
    fn unsorted_payload_is_rejected() {
        let json = r#"[
            {"text": "late", "start": 5.0, "end": 6.0},
            {"text": "early", "start": 1.0, "end": 2.0}
        ]"#;
        let err = parse_timestamps(json).unwrap_err();
        assert_eq!(
            err,
            TimestampError::Order {
                index: 1,
                start: 1.0,
                previous: 5.0
            }
        );
    }

    #[test]
    fn equal_starts_are_allowed() {
        // Sentence-level alignment can give several words the same window.
        let json = r#"[
            {"text": "The", "start": 1.0, "end": 3.0},
            {"text": "pig", "start": 1.0, "end": 3.0}
        ]"#;
        assert_eq!(parse_timestamps(json).unwrap().len(), 2);
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let err = parse_timestamps(r#"{"text": "x"}"#).unwrap_err();
        assert!(matches!(err, TimestampError::NotAnArray { .. }));
    }

    #[test]
    fn empty_array_is_empty_list() {
        assert!(parse_timestamps("[]").unwrap().is_empty());
    }
}
