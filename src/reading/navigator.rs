//! Section navigation state machine.
//!
//! Tracks the current section of a document and checkpoints every
//! transition to the progress store before returning. A failed or timed-out
//! checkpoint does not roll the transition back; it comes back as a
//! [`PersistenceWarning`] on the returned [`Transition`].
//!
//! When saved progress could not be fetched the navigator runs unsynced:
//! it writes nothing until a later fetch succeeds, and a checkpoint found
//! by that fetch replaces the local position.

use super::{
    Checkpoint, Document, DocumentId, NavigationError, PersistenceWarning, ProgressStatus,
    ReadingProgress, SavedProgress, Section,
};
use crate::storage::progress::{PersistenceError, ProgressStore};
use std::time::Duration;

/// What a navigation call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Advanced { index: usize },
    Retreated { index: usize },
    Jumped { index: usize },
    /// Nothing to do (retreat at the first section)
    Unchanged { index: usize },
    /// Saved progress arrived late and replaced the local position; the
    /// requested move was not applied
    Resumed { index: usize },
    /// The last section was completed; hand off to the quiz
    Finished { document_id: DocumentId },
}

impl NavigationOutcome {
    /// Whether the displayed section changed.
    pub fn changed_section(&self) -> bool {
        matches!(
            self,
            NavigationOutcome::Advanced { .. }
                | NavigationOutcome::Retreated { .. }
                | NavigationOutcome::Jumped { .. }
                | NavigationOutcome::Resumed { .. }
        )
    }
}

/// Result of a successful navigation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub outcome: NavigationOutcome,
    /// Set when the checkpoint for this transition was not stored
    pub warning: Option<PersistenceWarning>,
}

impl Transition {
    fn unpersisted(outcome: NavigationOutcome) -> Self {
        Self {
            outcome,
            warning: None,
        }
    }
}

/// Navigation position within a loaded document.
#[derive(Debug)]
struct Position {
    document: Document,
    index: usize,
    status: ProgressStatus,
    finished: bool,
    /// Saved progress has been read from the store
    synced: bool,
}

/// Result of catching up with the store before a write.
enum ServerSync {
    Current,
    Adopted(usize),
    Failed(PersistenceError),
}

/// Navigator over the sections of one document at a time.
pub struct SectionNavigator<S: ProgressStore> {
    store: S,
    timeout: Duration,
    position: Option<Position>,
}

impl<S: ProgressStore> SectionNavigator<S> {
    /// Create a navigator that checkpoints to `store`, giving each call
    /// `timeout` before treating it as failed.
    pub fn new(store: S, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            position: None,
        }
    }

    /// Load a document, resuming from `saved` when present.
    ///
    /// Without saved progress this is a first visit: an initial
    /// `{0, InProgress}` checkpoint is stored so the session is visible to
    /// progress tracking. With saved progress nothing is written.
    pub async fn initialize(
        &mut self,
        document: Document,
        saved: Option<SavedProgress>,
    ) -> Option<PersistenceWarning> {
        let (index, status) = match saved {
            Some(saved) => resume_point(&document, saved),
            None => (0, ProgressStatus::NotStarted),
        };

        tracing::info!(
            "Navigator loaded {} at section {}/{} ({})",
            document.id(),
            index + 1,
            document.len(),
            status
        );

        let first_visit = saved.is_none();
        self.position = Some(Position {
            document,
            index,
            status,
            finished: false,
            synced: true,
        });

        if first_visit {
            self.persist(Checkpoint {
                current_section_index: 0,
                status: ProgressStatus::InProgress,
            })
            .await
        } else {
            None
        }
    }

    /// Fetch saved progress for `document` and load it.
    ///
    /// If the fetch fails the document opens at `{0, NotStarted}` unsynced
    /// and the returned warning carries the fetch error.
    pub async fn open(&mut self, document: Document) -> Option<PersistenceWarning> {
        let fetched = self.fetch(document.id()).await;
        match fetched {
            Ok(saved) => self.initialize(document, saved).await,
            Err(error) => {
                let warning = PersistenceWarning::new(document.id().clone(), None, error);
                self.initialize_unsynced(document);
                Some(warning)
            }
        }
    }

    /// Load a document at `{0, NotStarted}` without knowing the saved
    /// progress. Nothing is written until a fetch succeeds.
    pub fn initialize_unsynced(&mut self, document: Document) {
        tracing::info!(
            "Navigator loaded {} locally, saved progress unknown",
            document.id()
        );
        self.position = Some(Position {
            document,
            index: 0,
            status: ProgressStatus::NotStarted,
            finished: false,
            synced: false,
        });
    }

    /// Whether saved progress has been read for the loaded document.
    pub fn is_synced(&self) -> bool {
        self.position.as_ref().is_some_and(|p| p.synced)
    }

    /// Move to the next section, or finish the document from the last one.
    pub async fn advance(&mut self) -> Result<Transition, NavigationError> {
        let unsynced = match self.catch_up().await? {
            ServerSync::Adopted(index) => return Ok(resumed(index)),
            ServerSync::Failed(error) => Some(error),
            ServerSync::Current => None,
        };
        let position = self.active_position()?;
        let last = position.document.len() - 1;

        if position.index < last {
            position.index += 1;
            position.status = in_progress_unless_completed(position.status);
            let index = position.index;
            let checkpoint = checkpoint_of(position);

            let warning = self.commit(checkpoint, unsynced).await;
            tracing::debug!("Advanced to section {}", index);
            return Ok(Transition {
                outcome: NavigationOutcome::Advanced { index },
                warning,
            });
        }

        position.status = ProgressStatus::Completed;
        position.finished = true;
        let document_id = position.document.id().clone();
        let checkpoint = checkpoint_of(position);

        let warning = self.commit(checkpoint, unsynced).await;
        tracing::info!("Finished {}", document_id);
        Ok(Transition {
            outcome: NavigationOutcome::Finished { document_id },
            warning,
        })
    }

    /// Move to the previous section. No-op at the first section.
    pub async fn retreat(&mut self) -> Result<Transition, NavigationError> {
        let unsynced = match self.catch_up().await? {
            ServerSync::Adopted(index) => return Ok(resumed(index)),
            ServerSync::Failed(error) => Some(error),
            ServerSync::Current => None,
        };
        let position = self.active_position()?;

        if position.index == 0 {
            return Ok(Transition::unpersisted(NavigationOutcome::Unchanged {
                index: 0,
            }));
        }

        position.index -= 1;
        position.status = in_progress_unless_completed(position.status);
        let index = position.index;
        let checkpoint = checkpoint_of(position);

        let warning = self.commit(checkpoint, unsynced).await;
        tracing::debug!("Retreated to section {}", index);
        Ok(Transition {
            outcome: NavigationOutcome::Retreated { index },
            warning,
        })
    }

    /// Jump to any section. The target is absolute, so it still applies
    /// after a late checkpoint replaced the local position.
    pub async fn jump_to(&mut self, index: usize) -> Result<Transition, NavigationError> {
        let len = self.active_position()?.document.len();
        if index >= len {
            return Err(NavigationError::SectionIndexOutOfRange { index, len });
        }

        let unsynced = match self.catch_up().await? {
            ServerSync::Failed(error) => Some(error),
            ServerSync::Adopted(_) | ServerSync::Current => None,
        };
        let position = self.active_position()?;
        position.index = index;
        position.status = in_progress_unless_completed(position.status);
        let checkpoint = checkpoint_of(position);

        let warning = self.commit(checkpoint, unsynced).await;
        tracing::debug!("Jumped to section {}", index);
        Ok(Transition {
            outcome: NavigationOutcome::Jumped { index },
            warning,
        })
    }

    /// Current progress, `None` before `initialize`.
    pub fn progress(&self) -> Option<ReadingProgress> {
        self.position.as_ref().map(|p| ReadingProgress {
            document_id: p.document.id().clone(),
            current_section_index: p.index,
            status: p.status,
            section_count: p.document.len(),
        })
    }

    pub fn current_index(&self) -> Option<usize> {
        self.position.as_ref().map(|p| p.index)
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.position
            .as_ref()
            .and_then(|p| p.document.section(p.index))
    }

    pub fn document(&self) -> Option<&Document> {
        self.position.as_ref().map(|p| &p.document)
    }

    /// Whether the document was finished and the navigator is closed.
    pub fn is_finished(&self) -> bool {
        self.position.as_ref().is_some_and(|p| p.finished)
    }

    fn active_position(&mut self) -> Result<&mut Position, NavigationError> {
        match self.position.as_mut() {
            None => Err(NavigationError::NotInitialized),
            Some(p) if p.finished => Err(NavigationError::SessionFinished),
            Some(p) => Ok(p),
        }
    }

    async fn fetch(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<SavedProgress>, PersistenceError> {
        tokio::time::timeout(self.timeout, self.store.fetch(document_id))
            .await
            .unwrap_or(Err(PersistenceError::Timeout(self.timeout)))
    }

    /// Retry the fetch for an unsynced document, adopting what it returns.
    async fn catch_up(&mut self) -> Result<ServerSync, NavigationError> {
        let position = self.active_position()?;
        if position.synced {
            return Ok(ServerSync::Current);
        }
        let document_id = position.document.id().clone();

        let saved = match self.fetch(&document_id).await {
            Ok(saved) => saved,
            Err(error) => return Ok(ServerSync::Failed(error)),
        };

        let position = self.active_position()?;
        position.synced = true;
        let Some(saved) = saved else {
            tracing::debug!("No saved progress for {}, keeping local position", document_id);
            return Ok(ServerSync::Current);
        };

        let (index, status) = resume_point(&position.document, saved);
        position.index = index;
        position.status = status;
        tracing::info!(
            "Saved progress for {} arrived, resuming at section {}",
            document_id,
            index
        );
        Ok(ServerSync::Adopted(index))
    }

    /// Store `checkpoint`, or report it unsaved when the store is still
    /// unreachable.
    async fn commit(
        &self,
        checkpoint: Checkpoint,
        unsynced: Option<PersistenceError>,
    ) -> Option<PersistenceWarning> {
        match unsynced {
            None => self.persist(checkpoint).await,
            Some(error) => {
                let document_id = self.position.as_ref()?.document.id().clone();
                Some(PersistenceWarning::new(document_id, Some(checkpoint), error))
            }
        }
    }

    async fn persist(&self, checkpoint: Checkpoint) -> Option<PersistenceWarning> {
        let document_id = self.position.as_ref()?.document.id().clone();

        let result = tokio::time::timeout(self.timeout, self.store.save(&document_id, checkpoint))
            .await
            .unwrap_or(Err(PersistenceError::Timeout(self.timeout)));

        match result {
            Ok(()) => None,
            Err(error) => Some(PersistenceWarning::new(document_id, Some(checkpoint), error)),
        }
    }
}

/// Where to resume `document` from saved progress. An index past the end
/// resumes at the last section.
fn resume_point(document: &Document, saved: SavedProgress) -> (usize, ProgressStatus) {
    let last = document.len() - 1;
    let index = if saved.current_section_index > last {
        tracing::warn!(
            "Saved section {} beyond document {} ({} sections), resuming at last section",
            saved.current_section_index,
            document.id(),
            document.len()
        );
        last
    } else {
        saved.current_section_index
    };
    (index, saved.status.unwrap_or(ProgressStatus::InProgress))
}

fn resumed(index: usize) -> Transition {
    Transition::unpersisted(NavigationOutcome::Resumed { index })
}

fn in_progress_unless_completed(status: ProgressStatus) -> ProgressStatus {
    match status {
        ProgressStatus::Completed => ProgressStatus::Completed,
        _ => ProgressStatus::InProgress,
    }
}

fn checkpoint_of(position: &Position) -> Checkpoint {
    Checkpoint {
        current_section_index: position.index,
        status: position.status,
    }
}
