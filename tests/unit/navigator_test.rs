//! Unit tests for section navigation and checkpointing.

use adaptive_reader::reading::{
    Checkpoint, Document, DocumentId, NavigationError, NavigationOutcome, ProgressStatus,
    SavedProgress, Section, SectionNavigator,
};
use adaptive_reader::storage::MemoryProgressStore;
use std::time::Duration;

fn three_sections() -> Document {
    Document::new(
        "julius-caesar",
        vec![
            Section::new("Intro", "Beware the ides of March."),
            Section::new("Middle", "Et tu, Brute?"),
            Section::new("End", "This was the noblest Roman of them all."),
        ],
    )
    .unwrap()
}

fn checkpoint(index: usize, status: ProgressStatus) -> Checkpoint {
    Checkpoint {
        current_section_index: index,
        status,
    }
}

#[tokio::test]
async fn test_first_visit_scenario_persists_each_step() {
    let store = MemoryProgressStore::new();
    let mut navigator = SectionNavigator::new(store.clone(), Duration::from_secs(5));
    let id = DocumentId::new("julius-caesar");

    assert!(navigator.initialize(three_sections(), None).await.is_none());
    assert_eq!(
        store.saves_for(&id).await,
        vec![checkpoint(0, ProgressStatus::InProgress)]
    );

    navigator.advance().await.unwrap();
    navigator.advance().await.unwrap();
    let finished = navigator.advance().await.unwrap();

    assert_eq!(
        finished.outcome,
        NavigationOutcome::Finished {
            document_id: id.clone()
        }
    );
    assert_eq!(
        store.saves_for(&id).await,
        vec![
            checkpoint(0, ProgressStatus::InProgress),
            checkpoint(1, ProgressStatus::InProgress),
            checkpoint(2, ProgressStatus::InProgress),
            checkpoint(2, ProgressStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_two_advances_from_first_visit() {
    let store = MemoryProgressStore::new();
    let document = Document::new(
        "short",
        vec![Section::new("Intro", "a"), Section::new("End", "b")],
    )
    .unwrap();
    let mut navigator = SectionNavigator::new(store.clone(), Duration::from_secs(5));

    navigator.initialize(document, None).await;
    navigator.advance().await.unwrap();
    let outcome = navigator.advance().await.unwrap().outcome;

    assert!(matches!(outcome, NavigationOutcome::Finished { .. }));
    assert_eq!(
        store.saves_for(&DocumentId::new("short")).await,
        vec![
            checkpoint(0, ProgressStatus::InProgress),
            checkpoint(1, ProgressStatus::InProgress),
            checkpoint(1, ProgressStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_index_stays_in_range() {
    let store = MemoryProgressStore::new();
    let mut navigator = SectionNavigator::new(store, Duration::from_secs(5));
    navigator.initialize(three_sections(), None).await;

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        outcomes.push(navigator.advance().await.unwrap().outcome);
        let index = navigator.current_index().unwrap();
        assert!(index <= 2);
    }

    assert_eq!(
        outcomes[..2],
        [
            NavigationOutcome::Advanced { index: 1 },
            NavigationOutcome::Advanced { index: 2 },
        ]
    );
    assert!(matches!(outcomes[2], NavigationOutcome::Finished { .. }));
}

#[tokio::test]
async fn test_resume_issues_no_persistence_call() {
    let store = MemoryProgressStore::new();
    let mut navigator = SectionNavigator::new(store.clone(), Duration::from_secs(5));
    let saved = SavedProgress {
        current_section_index: 1,
        status: Some(ProgressStatus::InProgress),
    };

    assert!(navigator.initialize(three_sections(), Some(saved)).await.is_none());

    let progress = navigator.progress().unwrap();
    assert_eq!(progress.current_section_index, 1);
    assert_eq!(progress.status, ProgressStatus::InProgress);
    assert_eq!(navigator.current_section().unwrap().title, "Middle");
    assert!(store.saves().await.is_empty());
}

#[tokio::test]
async fn test_saved_progress_without_status_is_in_progress() {
    let store = MemoryProgressStore::new();
    let mut navigator = SectionNavigator::new(store, Duration::from_secs(5));
    let saved = SavedProgress {
        current_section_index: 0,
        status: None,
    };
    navigator.initialize(three_sections(), Some(saved)).await;
    assert_eq!(navigator.progress().unwrap().status, ProgressStatus::InProgress);
}

#[tokio::test]
async fn test_retreat_and_jump() {
    let store = MemoryProgressStore::new();
    let mut navigator = SectionNavigator::new(store.clone(), Duration::from_secs(5));
    navigator.initialize(three_sections(), None).await;

    assert_eq!(
        navigator.retreat().await.unwrap().outcome,
        NavigationOutcome::Unchanged { index: 0 }
    );
    assert_eq!(
        navigator.jump_to(2).await.unwrap().outcome,
        NavigationOutcome::Jumped { index: 2 }
    );
    assert_eq!(
        navigator.retreat().await.unwrap().outcome,
        NavigationOutcome::Retreated { index: 1 }
    );
    assert_eq!(
        navigator.jump_to(9).await,
        Err(NavigationError::SectionIndexOutOfRange { index: 9, len: 3 })
    );

    let saves = store.saves_for(&DocumentId::new("julius-caesar")).await;
    assert_eq!(saves.last(), Some(&checkpoint(1, ProgressStatus::InProgress)));
    assert_eq!(saves.len(), 3);
}

#[tokio::test]
async fn test_reinitialize_after_finish() {
    let store = MemoryProgressStore::new();
    let mut navigator = SectionNavigator::new(store, Duration::from_secs(5));
    let single = || Document::new("poem", vec![Section::new("Only", "Ozymandias")]).unwrap();

    navigator.initialize(single(), None).await;
    navigator.advance().await.unwrap();
    assert_eq!(navigator.retreat().await, Err(NavigationError::SessionFinished));

    navigator
        .initialize(
            single(),
            Some(SavedProgress {
                current_section_index: 0,
                status: Some(ProgressStatus::Completed),
            }),
        )
        .await;
    assert!(!navigator.is_finished());
    assert_eq!(navigator.progress().unwrap().completion_ratio(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_without_blocking() {
    let store = MemoryProgressStore::new().with_latency(Duration::from_secs(30));
    let mut navigator = SectionNavigator::new(store, Duration::from_secs(5));

    let warning = navigator.initialize(three_sections(), None).await.unwrap();
    assert_eq!(
        warning.error,
        adaptive_reader::storage::PersistenceError::Timeout(Duration::from_secs(5))
    );

    let transition = navigator.advance().await.unwrap();
    assert_eq!(transition.outcome, NavigationOutcome::Advanced { index: 1 });
    assert!(transition.warning.is_some());
}
