//! Narration: word-by-word speech synchronized with on-screen highlighting.
//!
//! - `tts`: the speech engine seam, voice selection and the bundled engines
//! - `timing`: tokenization and per-word timing slots
//! - `narration`: the cancellable play/pause/stop controller

pub mod narration;
pub mod timing;
pub mod tts;

use thiserror::Error;
use tokio::sync::mpsc;

// Re-export main types
pub use narration::{NarrationController, PlaybackState};
pub use timing::{TimedWord, WordTiming};
pub use tts::{select_voice, SimulatedSpeechEngine, SpeechEngine, VoiceInfo};
#[cfg(feature = "native-tts")]
pub use tts::NativeSpeechEngine;

/// Errors that can occur during narration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NarrationError {
    /// The speech engine is missing or failed; degrade to silent reading.
    #[error("Narration unavailable: {0}")]
    Unavailable(String),

    /// Narration is switched off in the accessibility profile.
    #[error("Narration is disabled")]
    Disabled,

    #[error("Voice not available: {0}")]
    VoiceNotAvailable(String),
}

/// Identifies one utterance. Engines hand the ticket back when the
/// utterance ends; the controller drops tickets from older generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceTicket {
    pub generation: u64,
    pub index: usize,
}

/// Channel on which engines report finished utterances.
pub type CompletionSender = mpsc::UnboundedSender<UtteranceTicket>;

/// Per-utterance speech parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceOptions {
    /// Engine voice id; `None` uses the engine default
    pub voice_id: Option<String>,
    /// Requested locale, e.g. "en-GB"
    pub locale: String,
    /// Rate multiplier (1.0 is normal)
    pub rate: f32,
}

impl Default for UtteranceOptions {
    fn default() -> Self {
        Self {
            voice_id: None,
            locale: crate::accessibility::profile::DEFAULT_TTS_LOCALE.to_string(),
            rate: 1.0,
        }
    }
}

/// Narration events for highlighting and controls.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationEvent {
    /// A new word queue was loaded
    Loaded { word_count: usize },
    /// The word at `index` is being spoken
    WordStarted { index: usize },
    /// Playback paused; resume continues after the active word
    Paused,
    /// Playback stopped and position reset
    Stopped,
    /// The last word finished
    Finished,
    /// The engine failed; narration is disabled for the session
    Unavailable { reason: String },
}
