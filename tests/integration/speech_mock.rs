//! Scripted speech engine for integration tests.
//!
//! Utterances never finish on their own; tests deliver completions by hand,
//! including late ones for utterances that were already cancelled.

use adaptive_reader::audio::{
    CompletionSender, NarrationError, SpeechEngine, UtteranceOptions, UtteranceTicket, VoiceInfo,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    available: bool,
    fail_next: bool,
    spoken: Vec<(String, UtteranceTicket)>,
    sender: Option<CompletionSender>,
    cancels: usize,
}

/// Mock engine. Clones share state, so a test keeps a handle after moving
/// the engine into a session.
#[derive(Clone)]
pub struct MockSpeechEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockSpeechEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                available: true,
                ..Default::default()
            })),
        }
    }

    pub fn unavailable() -> Self {
        let engine = Self::new();
        engine.state.lock().unwrap().available = false;
        engine
    }

    /// Make the next `speak` fail.
    pub fn fail_next_speak(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    pub fn spoken_words(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .spoken
            .iter()
            .map(|(word, _)| word.clone())
            .collect()
    }

    pub fn last_ticket(&self) -> Option<UtteranceTicket> {
        self.state.lock().unwrap().spoken.last().map(|(_, t)| *t)
    }

    pub fn cancels(&self) -> usize {
        self.state.lock().unwrap().cancels
    }

    /// Report `ticket` as finished, whether or not it was cancelled.
    pub fn deliver(&self, ticket: UtteranceTicket) {
        let state = self.state.lock().unwrap();
        if let Some(sender) = &state.sender {
            sender.send(ticket).unwrap();
        }
    }

    /// Finish the most recent utterance.
    pub fn complete_last(&self) {
        if let Some(ticket) = self.last_ticket() {
            self.deliver(ticket);
        }
    }
}

impl SpeechEngine for MockSpeechEngine {
    fn is_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![VoiceInfo {
            id: "mock-en".to_string(),
            name: "Mock English".to_string(),
            language: "en-GB".to_string(),
            is_default: true,
        }]
    }

    fn speak(
        &mut self,
        text: &str,
        _options: &UtteranceOptions,
        ticket: UtteranceTicket,
        done: CompletionSender,
    ) -> Result<(), NarrationError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next {
            state.fail_next = false;
            return Err(NarrationError::Unavailable("audio device lost".to_string()));
        }
        state.spoken.push((text.to_string(), ticket));
        state.sender = Some(done);
        Ok(())
    }

    fn cancel(&mut self) {
        self.state.lock().unwrap().cancels += 1;
    }
}

#[test]
fn test_mock_records_utterances() {
    let mut engine = MockSpeechEngine::new();
    let handle = engine.clone();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let ticket = UtteranceTicket {
        generation: 0,
        index: 0,
    };

    engine
        .speak("Hello", &UtteranceOptions::default(), ticket, tx)
        .unwrap();
    handle.complete_last();

    assert_eq!(handle.spoken_words(), vec!["Hello".to_string()]);
    assert_eq!(rx.try_recv().unwrap(), ticket);
}
