//! Narration controller.
//!
//! Speaks a word queue one utterance at a time. Every cancellation point
//! (`pause`, `stop`, `load`) bumps a generation counter; a completion whose
//! ticket carries an older generation is ignored, so a late callback from a
//! cancelled utterance can never advance the queue.

use super::timing::{TimedWord, WordTiming};
use super::tts::{select_voice, SpeechEngine};
use super::{
    CompletionSender, NarrationError, NarrationEvent, UtteranceOptions, UtteranceTicket,
};
use crate::accessibility::AccessibilityProfile;
use tokio::sync::{broadcast, mpsc};

/// Playback state of the controller.
///
/// `stop()` resets straight to `Idle`; the stop itself is reported as
/// [`NarrationEvent::Stopped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Word-by-word narration over a [`SpeechEngine`].
pub struct NarrationController<E: SpeechEngine> {
    engine: E,
    queue: Vec<TimedWord>,
    /// Word currently (or last) spoken; `None` when idle
    active_index: Option<usize>,
    state: PlaybackState,
    generation: u64,
    options: UtteranceOptions,
    timing: WordTiming,
    /// Set once the engine fails; narration stays off for the session
    unavailable: Option<String>,
    event_tx: broadcast::Sender<NarrationEvent>,
    completion_tx: CompletionSender,
    completion_rx: mpsc::UnboundedReceiver<UtteranceTicket>,
}

impl<E: SpeechEngine> NarrationController<E> {
    /// Create a controller using the profile's voice locale and speed.
    pub fn new(engine: E, profile: &AccessibilityProfile, timing: WordTiming) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let mut controller = Self {
            engine,
            queue: Vec::new(),
            active_index: None,
            state: PlaybackState::Idle,
            generation: 0,
            options: UtteranceOptions::default(),
            timing,
            unavailable: None,
            event_tx,
            completion_tx,
            completion_rx,
        };
        controller.apply_profile(profile);
        controller
    }

    /// Pick up voice and rate changes. Takes effect from the next word.
    pub fn apply_profile(&mut self, profile: &AccessibilityProfile) {
        let locale = profile.tts_voice_locale();
        let voices = self.engine.voices();
        let voice_id = select_voice(&voices, locale).map(|v| v.id.clone());

        match &voice_id {
            Some(id) => tracing::debug!("Narration voice {} for locale {}", id, locale),
            None => tracing::debug!("No voice for locale {}, using engine default", locale),
        }

        self.options = UtteranceOptions {
            voice_id,
            locale: locale.to_string(),
            rate: profile.tts_speed(),
        };
    }

    /// Replace the queue with the words of `text`, cancelling any playback.
    pub fn load(&mut self, text: &str) {
        let queue = self.timing.build_queue(text, self.options.rate);
        self.load_timed(queue);
    }

    /// Replace the queue with engine-supplied word timings, cancelling any
    /// playback.
    pub fn load_timed(&mut self, words: Vec<TimedWord>) {
        self.cancel_in_flight();
        self.queue = words;
        self.active_index = None;
        self.state = PlaybackState::Idle;

        tracing::debug!("Narration loaded {} words", self.queue.len());
        self.emit(NarrationEvent::Loaded {
            word_count: self.queue.len(),
        });
    }

    /// Start, or resume after the active word. No-op while already playing.
    pub fn play(&mut self) -> Result<(), NarrationError> {
        if let Some(reason) = &self.unavailable {
            return Err(NarrationError::Unavailable(reason.clone()));
        }
        if !self.engine.is_available() {
            return Err(self.mark_unavailable("speech engine not available".to_string()));
        }

        if self.state == PlaybackState::Playing {
            tracing::debug!("play() while already playing ignored");
            return Ok(());
        }

        let next = self.active_index.map_or(0, |i| i + 1);
        if next >= self.queue.len() {
            if self.state == PlaybackState::Paused {
                self.finish();
            }
            return Ok(());
        }

        self.state = PlaybackState::Playing;
        self.speak_word(next)
    }

    /// Pause, keeping the queue position. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.cancel_in_flight();
        self.state = PlaybackState::Paused;
        tracing::debug!("Narration paused at word {:?}", self.active_index);
        self.emit(NarrationEvent::Paused);
    }

    /// Stop and reset to the start of the queue. Safe to call from any state.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }

        self.cancel_in_flight();
        self.active_index = None;
        self.state = PlaybackState::Idle;
        tracing::debug!("Narration stopped");
        self.emit(NarrationEvent::Stopped);
    }

    /// Handle an engine completion callback.
    ///
    /// Returns the resulting event, or `None` when the ticket is stale.
    pub fn on_utterance_complete(&mut self, ticket: UtteranceTicket) -> Option<NarrationEvent> {
        if ticket.generation != self.generation
            || self.state != PlaybackState::Playing
            || self.active_index != Some(ticket.index)
        {
            tracing::debug!(
                "Ignoring stale completion {:?} (generation {})",
                ticket,
                self.generation
            );
            return None;
        }

        let next = ticket.index + 1;
        if next >= self.queue.len() {
            self.finish();
            return Some(NarrationEvent::Finished);
        }

        match self.speak_word(next) {
            Ok(()) => Some(NarrationEvent::WordStarted { index: next }),
            Err(e) => Some(NarrationEvent::Unavailable {
                reason: e.to_string(),
            }),
        }
    }

    /// Wait for the next completion from the engine and process it.
    ///
    /// Stale completions are skipped. Pends until something happens, so
    /// drive it alongside user input (e.g. in `tokio::select!`).
    pub async fn next_event(&mut self) -> Option<NarrationEvent> {
        while let Some(ticket) = self.completion_rx.recv().await {
            if let Some(event) = self.on_utterance_complete(ticket) {
                return Some(event);
            }
        }
        None
    }

    /// Subscribe to narration events
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the word being spoken, `None` when idle.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active_word(&self) -> Option<&TimedWord> {
        self.active_index.and_then(|i| self.queue.get(i))
    }

    pub fn queue(&self) -> &[TimedWord] {
        &self.queue
    }

    pub fn options(&self) -> &UtteranceOptions {
        &self.options
    }

    /// Current cancellation generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False once the engine has failed during this session.
    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn speak_word(&mut self, index: usize) -> Result<(), NarrationError> {
        self.active_index = Some(index);
        let ticket = UtteranceTicket {
            generation: self.generation,
            index,
        };

        let result = self.engine.speak(
            &self.queue[index].word,
            &self.options,
            ticket,
            self.completion_tx.clone(),
        );

        match result {
            Ok(()) => {
                self.emit(NarrationEvent::WordStarted { index });
                Ok(())
            }
            Err(e) => Err(self.mark_unavailable(e.to_string())),
        }
    }

    fn finish(&mut self) {
        self.generation += 1;
        self.active_index = None;
        self.state = PlaybackState::Idle;
        tracing::debug!("Narration finished");
        self.emit(NarrationEvent::Finished);
    }

    /// Invalidate outstanding tickets and silence the engine.
    fn cancel_in_flight(&mut self) {
        self.generation += 1;
        if self.state != PlaybackState::Idle {
            self.engine.cancel();
        }
    }

    fn mark_unavailable(&mut self, reason: String) -> NarrationError {
        tracing::warn!("Narration unavailable, continuing without audio: {}", reason);
        self.cancel_in_flight();
        self.active_index = None;
        self.state = PlaybackState::Idle;
        self.unavailable = Some(reason.clone());
        self.emit(NarrationEvent::Unavailable {
            reason: reason.clone(),
        });
        NarrationError::Unavailable(reason)
    }

    fn emit(&self, event: NarrationEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl<E: SpeechEngine> Drop for NarrationController<E> {
    fn drop(&mut self) {
        if self.state != PlaybackState::Idle {
            self.engine.cancel();
        }
    }
}
