//! Documents, reading progress and section navigation.

pub mod navigator;
pub mod session;

use crate::storage::progress::PersistenceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export types
pub use navigator::{NavigationOutcome, SectionNavigator, Transition};
pub use session::{QuizHandoff, ReadingSession};

/// Navigation errors. These are caller bugs, not environment failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    #[error("Section index {index} out of range (document has {len} sections)")]
    SectionIndexOutOfRange { index: usize, len: usize },

    #[error("Document has no sections")]
    EmptyDocument,

    #[error("No document loaded")]
    NotInitialized,

    #[error("Document already finished; initialize again to keep navigating")]
    SessionFinished,
}

/// Identifier of a document, as assigned by the document source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One line of a scripted exchange (plays, interviews).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
}

/// One navigable unit of a document: a page, chapter or scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialogue: Vec<DialogueLine>,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            dialogue: Vec::new(),
        }
    }

    pub fn with_dialogue(mut self, dialogue: Vec<DialogueLine>) -> Self {
        self.dialogue = dialogue;
        self
    }

    /// Text read aloud for this section: the prose, then each dialogue line
    /// as "Speaker: line".
    pub fn narration_text(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.dialogue.len());
        if !self.content.trim().is_empty() {
            parts.push(self.content.trim().to_string());
        }
        parts.extend(
            self.dialogue
                .iter()
                .map(|line| format!("{}: {}", line.speaker.trim(), line.text.trim())),
        );
        parts.join("\n")
    }
}

/// Unvalidated document as delivered by the document source.
#[derive(Deserialize)]
struct DocumentRecord {
    id: DocumentId,
    sections: Vec<Section>,
}

/// A segmented document. Always has at least one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRecord")]
pub struct Document {
    id: DocumentId,
    sections: Vec<Section>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, sections: Vec<Section>) -> Result<Self, NavigationError> {
        if sections.is_empty() {
            return Err(NavigationError::EmptyDocument);
        }
        Ok(Self {
            id: id.into(),
            sections,
        })
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Number of sections (never zero).
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false; kept for the `len`/`is_empty` convention.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl TryFrom<DocumentRecord> for Document {
    type Error = NavigationError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        Document::new(record.id, record.sections)
    }
}

/// Reading status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::NotStarted => write!(f, "Not Started"),
            ProgressStatus::InProgress => write!(f, "In Progress"),
            ProgressStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// A persisted resume position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub current_section_index: usize,
    pub status: ProgressStatus,
}

/// Progress as returned by the persistence collaborator. The status may be
/// missing on older records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    pub current_section_index: usize,
    #[serde(default)]
    pub status: Option<ProgressStatus>,
}

impl From<Checkpoint> for SavedProgress {
    fn from(checkpoint: Checkpoint) -> Self {
        Self {
            current_section_index: checkpoint.current_section_index,
            status: Some(checkpoint.status),
        }
    }
}

/// In-session view of a student's position in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingProgress {
    pub document_id: DocumentId,
    pub current_section_index: usize,
    pub status: ProgressStatus,
    pub section_count: usize,
}

impl ReadingProgress {
    /// Fraction of the document reached, 0.0 - 1.0.
    pub fn completion_ratio(&self) -> f32 {
        match self.status {
            ProgressStatus::NotStarted => 0.0,
            ProgressStatus::Completed => 1.0,
            ProgressStatus::InProgress if self.section_count == 0 => 0.0,
            ProgressStatus::InProgress => {
                (self.current_section_index + 1) as f32 / self.section_count as f32
            }
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            current_section_index: self.current_section_index,
            status: self.status,
        }
    }
}

/// A checkpoint that could not be stored or fetched.
///
/// Returned next to a successful operation: losing a checkpoint never blocks
/// reading.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceWarning {
    pub document_id: DocumentId,
    /// `None` when the failure was fetching saved progress
    pub checkpoint: Option<Checkpoint>,
    pub error: PersistenceError,
}

impl PersistenceWarning {
    pub(crate) fn new(
        document_id: DocumentId,
        checkpoint: Option<Checkpoint>,
        error: PersistenceError,
    ) -> Self {
        let warning = Self {
            document_id,
            checkpoint,
            error,
        };
        warning.report();
        warning
    }

    fn report(&self) {
        tracing::warn!(
            document_id = %self.document_id,
            section_index = ?self.checkpoint.map(|c| c.current_section_index),
            error = %self.error,
            "Reading progress not persisted"
        );
    }
}

impl std::fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.checkpoint {
            Some(c) => write!(
                f,
                "checkpoint {} ({}) for {} not saved: {}",
                c.current_section_index, c.status, self.document_id, self.error
            ),
            None => write!(f, "progress for {} not loaded: {}", self.document_id, self.error),
        }
    }
}
