//! Speech engine seam.
//!
//! The controller talks to the platform through [`SpeechEngine`]. Engines
//! start an utterance and return immediately; when it ends they send the
//! utterance's ticket on the completion channel they were handed.

use super::{CompletionSender, NarrationError, UtteranceOptions, UtteranceTicket};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Voice information
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    /// Voice identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Language code (e.g., "en-US")
    pub language: String,
    /// Whether this is the default voice
    pub is_default: bool,
}

/// Trait for speech engines
pub trait SpeechEngine {
    /// Whether speech can currently be produced
    fn is_available(&self) -> bool;

    /// Get available voices
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Start speaking `text`. Must not block until the utterance ends; send
    /// `ticket` on `done` once it has.
    fn speak(
        &mut self,
        text: &str,
        options: &UtteranceOptions,
        ticket: UtteranceTicket,
        done: CompletionSender,
    ) -> Result<(), NarrationError>;

    /// Cancel the current utterance, if any. A cancelled utterance may still
    /// report completion.
    fn cancel(&mut self);
}

/// Pick the voice for a locale.
///
/// An exact locale match wins, then any voice sharing the first two
/// characters (the language). `None` means "use the engine default".
pub fn select_voice<'a>(voices: &'a [VoiceInfo], locale: &str) -> Option<&'a VoiceInfo> {
    let prefix: String = locale.chars().take(2).collect::<String>().to_ascii_lowercase();
    if prefix.is_empty() {
        return None;
    }

    voices
        .iter()
        .find(|v| v.language.eq_ignore_ascii_case(locale))
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.language.to_ascii_lowercase().starts_with(prefix.as_str()))
        })
}

/// Engine that simulates speech on the tokio runtime.
///
/// Each utterance "lasts" in proportion to its length and completes through
/// the completion channel, which makes it usable where no platform speech is
/// installed and in tests.
pub struct SimulatedSpeechEngine {
    voices: Vec<VoiceInfo>,
    ms_per_char: u64,
    current: Option<JoinHandle<()>>,
}

impl Default for SimulatedSpeechEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSpeechEngine {
    /// Minimum simulated utterance length.
    const MIN_UTTERANCE_MS: u64 = 80;

    /// Create a simulated engine with a small set of English voices
    pub fn new() -> Self {
        Self::with_voices(vec![
            VoiceInfo {
                id: "en-GB-SoniaNeural".to_string(),
                name: "Sonia (UK English)".to_string(),
                language: "en-GB".to_string(),
                is_default: true,
            },
            VoiceInfo {
                id: "en-KE-AsminaNeural".to_string(),
                name: "Asmina (Kenya English)".to_string(),
                language: "en-KE".to_string(),
                is_default: false,
            },
            VoiceInfo {
                id: "en-US-GuyNeural".to_string(),
                name: "Guy (US English)".to_string(),
                language: "en-US".to_string(),
                is_default: false,
            },
        ])
    }

    /// Create a simulated engine offering the given voices
    pub fn with_voices(voices: Vec<VoiceInfo>) -> Self {
        Self {
            voices,
            ms_per_char: 50,
            current: None,
        }
    }

    /// Simulated speaking speed at rate 1.0
    pub fn with_ms_per_char(mut self, ms_per_char: u64) -> Self {
        self.ms_per_char = ms_per_char;
        self
    }

    fn utterance_duration(&self, text: &str, rate: f32) -> Duration {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        let ms = (text.chars().count() as u64 * self.ms_per_char) as f32 / rate;
        Duration::from_millis((ms as u64).max(Self::MIN_UTTERANCE_MS))
    }
}

impl SpeechEngine for SimulatedSpeechEngine {
    fn is_available(&self) -> bool {
        tokio::runtime::Handle::try_current().is_ok()
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    fn speak(
        &mut self,
        text: &str,
        options: &UtteranceOptions,
        ticket: UtteranceTicket,
        done: CompletionSender,
    ) -> Result<(), NarrationError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| NarrationError::Unavailable("no async runtime for speech".to_string()))?;

        self.cancel();

        let duration = self.utterance_duration(text, options.rate);
        tracing::debug!("Simulated TTS speaking {:?} for {:?}", text, duration);

        self.current = Some(runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = done.send(ticket);
        }));

        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
    }
}

/// Platform speech synthesis via the `tts` crate.
#[cfg(feature = "native-tts")]
pub struct NativeSpeechEngine {
    tts: tts::Tts,
}

#[cfg(feature = "native-tts")]
impl NativeSpeechEngine {
    /// Initialize the platform speech backend
    pub fn new() -> Result<Self, NarrationError> {
        tracing::info!("Initializing native TTS");
        let tts = tts::Tts::default().map_err(|e| NarrationError::Unavailable(e.to_string()))?;
        Ok(Self { tts })
    }

    fn find_voice(&self, voice_id: &str) -> Option<tts::Voice> {
        self.tts
            .voices()
            .ok()
            .and_then(|voices| voices.into_iter().find(|v| v.id() == voice_id))
    }
}

#[cfg(feature = "native-tts")]
impl SpeechEngine for NativeSpeechEngine {
    fn is_available(&self) -> bool {
        // Word-by-word narration needs end-of-utterance callbacks.
        self.tts.supported_features().utterance_callbacks
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.tts
            .voices()
            .map(|voices| {
                voices
                    .iter()
                    .map(|v| VoiceInfo {
                        id: v.id(),
                        name: v.name(),
                        language: v.language().as_str().to_string(),
                        is_default: false,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn speak(
        &mut self,
        text: &str,
        options: &UtteranceOptions,
        ticket: UtteranceTicket,
        done: CompletionSender,
    ) -> Result<(), NarrationError> {
        if let Some(voice) = options.voice_id.as_deref().and_then(|id| self.find_voice(id)) {
            if let Err(e) = self.tts.set_voice(&voice) {
                tracing::warn!("Could not set voice {}, using default: {}", voice.id(), e);
            }
        }

        let rate = (self.tts.normal_rate() * options.rate)
            .clamp(self.tts.min_rate(), self.tts.max_rate());
        if let Err(e) = self.tts.set_rate(rate) {
            tracing::warn!("Could not set speech rate {}: {}", rate, e);
        }

        self.tts
            .on_utterance_end(Some(Box::new(move |_| {
                let _ = done.send(ticket);
            })))
            .map_err(|e| NarrationError::Unavailable(e.to_string()))?;

        self.tts
            .speak(text, true)
            .map_err(|e| NarrationError::Unavailable(e.to_string()))?;

        Ok(())
    }

    fn cancel(&mut self) {
        if let Err(e) = self.tts.stop() {
            tracing::warn!("Failed to stop native TTS: {}", e);
        }
    }
}
