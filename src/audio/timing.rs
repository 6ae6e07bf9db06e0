//! Word tokenization and timing slots.

use serde::{Deserialize, Serialize};

/// Length of one word-boundary tick (100 ns) in seconds.
const TICK_SECS: f64 = 1e-7;

/// One speakable word with its slot on the narration timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub word: String,
    pub start_offset_sec: f32,
    pub duration_sec: f32,
}

impl TimedWord {
    /// Build from a speech service word boundary whose offset and duration
    /// are in 100-nanosecond ticks.
    pub fn from_boundary_ticks(word: impl Into<String>, offset_ticks: u64, duration_ticks: u64) -> Self {
        Self {
            word: word.into(),
            start_offset_sec: (offset_ticks as f64 * TICK_SECS) as f32,
            duration_sec: (duration_ticks as f64 * TICK_SECS) as f32,
        }
    }

    /// End of this word's slot.
    pub fn end_offset_sec(&self) -> f32 {
        self.start_offset_sec + self.duration_sec
    }
}

/// Estimates word durations for text without engine-supplied timings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordTiming {
    /// Fixed cost of every word, in seconds
    pub base_word_secs: f32,
    /// Additional seconds per character
    pub per_char_secs: f32,
}

impl Default for WordTiming {
    fn default() -> Self {
        Self {
            base_word_secs: 0.25,
            per_char_secs: 0.06,
        }
    }
}

impl WordTiming {
    /// Estimated duration of one word at the given rate multiplier.
    /// Negative or non-finite costs count as zero.
    pub fn duration_for(&self, word: &str, rate: f32) -> f32 {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        let chars = word.chars().filter(|c| c.is_alphanumeric()).count() as f32;
        (non_negative(self.base_word_secs) + non_negative(self.per_char_secs) * chars) / rate
    }

    /// Whether both costs are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.base_word_secs, self.per_char_secs]
            .iter()
            .all(|secs| secs.is_finite() && *secs >= 0.0)
    }

    /// Split text into words and lay them out back to back.
    pub fn build_queue(&self, text: &str, rate: f32) -> Vec<TimedWord> {
        let mut offset = 0.0;
        tokenize(text)
            .map(|word| {
                let duration = self.duration_for(word, rate);
                let timed = TimedWord {
                    word: word.to_string(),
                    start_offset_sec: offset,
                    duration_sec: duration,
                };
                offset += duration;
                timed
            })
            .collect()
    }
}

fn non_negative(secs: f32) -> f32 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}

/// Whitespace tokenization shared by narration and highlighting, so word
/// indices line up on both sides.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}
