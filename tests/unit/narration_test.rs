//! Unit tests for narration over the simulated speech engine.

use adaptive_reader::accessibility::{AccessibilityProfile, ProfileSetting};
use adaptive_reader::audio::timing::TimedWord;
use adaptive_reader::audio::{
    NarrationController, NarrationEvent, PlaybackState, SimulatedSpeechEngine, WordTiming,
};
use std::time::Duration;

fn controller() -> NarrationController<SimulatedSpeechEngine> {
    NarrationController::new(
        SimulatedSpeechEngine::new(),
        &AccessibilityProfile::new(),
        WordTiming::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_words_spoken_in_order() {
    let mut narration = controller();
    narration.load("a b c");
    narration.play().unwrap();

    assert_eq!(
        narration.next_event().await,
        Some(NarrationEvent::WordStarted { index: 1 })
    );
    assert_eq!(
        narration.next_event().await,
        Some(NarrationEvent::WordStarted { index: 2 })
    );
    assert_eq!(narration.next_event().await, Some(NarrationEvent::Finished));
    assert_eq!(narration.state(), PlaybackState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_broadcast_events_for_highlighting() {
    let mut narration = controller();
    let mut events = narration.subscribe();

    narration.load("To be");
    narration.play().unwrap();
    narration.next_event().await;
    narration.next_event().await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            NarrationEvent::Loaded { word_count: 2 },
            NarrationEvent::WordStarted { index: 0 },
            NarrationEvent::WordStarted { index: 1 },
            NarrationEvent::Finished,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_pause_holds_position() {
    let mut narration = controller();
    narration.load("one two three");
    narration.play().unwrap();
    narration.next_event().await;
    narration.pause();

    let waited = tokio::time::timeout(Duration::from_secs(5), narration.next_event()).await;
    assert!(waited.is_err());
    assert_eq!(narration.active_index(), Some(1));

    narration.play().unwrap();
    assert_eq!(narration.active_word().unwrap().word, "three");
}

#[tokio::test]
async fn test_stop_from_any_state() {
    let mut narration = controller();
    narration.stop();
    assert_eq!(narration.state(), PlaybackState::Idle);

    narration.load("a b c");
    narration.play().unwrap();
    narration.pause();
    narration.stop();
    assert_eq!(narration.state(), PlaybackState::Idle);
    assert_eq!(narration.active_index(), None);

    narration.play().unwrap();
    assert_eq!(narration.active_index(), Some(0));
}

#[tokio::test]
async fn test_load_timed_words() {
    let mut narration = controller();
    narration.load_timed(vec![
        TimedWord::from_boundary_ticks("Friends,", 0, 5_000_000),
        TimedWord::from_boundary_ticks("Romans", 5_000_000, 4_000_000),
    ]);
    assert_eq!(narration.queue().len(), 2);
    assert!((narration.queue()[1].start_offset_sec - 0.5).abs() < 1e-6);
}

#[test]
fn test_profile_speed_reaches_utterances() {
    let profile = AccessibilityProfile::new()
        .update(ProfileSetting::TtsSpeed(1.5))
        .unwrap()
        .update(ProfileSetting::TtsVoiceLocale("en-KE".to_string()))
        .unwrap();
    let narration = NarrationController::new(
        SimulatedSpeechEngine::new(),
        &profile,
        WordTiming::default(),
    );

    assert_eq!(narration.options().rate, 1.5);
    assert_eq!(narration.options().voice_id.as_deref(), Some("en-KE-AsminaNeural"));
}

#[test]
fn test_no_runtime_means_unavailable() {
    let mut narration = controller();
    narration.load("a b");
    assert!(narration.play().is_err());
    assert!(!narration.is_available());
}
