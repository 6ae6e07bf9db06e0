//! Reading session: one student reading one document.
//!
//! Owns the navigator, the narration controller and the accessibility
//! profile for the session, keeps narration in step with the displayed
//! section, and hands off to the quiz flow when the document is finished.

use super::navigator::{NavigationOutcome, SectionNavigator, Transition};
use super::{Document, DocumentId, NavigationError, PersistenceWarning, ReadingProgress, Section};
use crate::accessibility::{AccessibilityProfile, ProfileSetting, SettingError};
use crate::audio::{NarrationController, NarrationError, NarrationEvent, SpeechEngine};
use crate::storage::config::EngineConfig;
use crate::storage::progress::ProgressStore;
use crate::ui::ReadingTheme;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Receives control once a document is finished.
pub trait QuizHandoff {
    fn begin_quiz(&mut self, document_id: &DocumentId);
}

impl<F> QuizHandoff for F
where
    F: FnMut(&DocumentId),
{
    fn begin_quiz(&mut self, document_id: &DocumentId) {
        self(document_id)
    }
}

/// An active reading session.
pub struct ReadingSession<S: ProgressStore, E: SpeechEngine, Q: QuizHandoff> {
    id: Uuid,
    profile: AccessibilityProfile,
    navigator: SectionNavigator<S>,
    narration: NarrationController<E>,
    quiz: Q,
    /// Quiz already handed off for the loaded document
    quiz_started: bool,
}

impl<S, E, Q> ReadingSession<S, E, Q>
where
    S: ProgressStore,
    E: SpeechEngine,
    Q: QuizHandoff,
{
    /// Start a session on `document`, resuming from the store's checkpoint.
    /// Without a `profile` the configured default profile is used.
    ///
    /// Never fails: if the store cannot be reached the session starts at the
    /// first section and the returned warning says why.
    pub async fn start(
        document: Document,
        store: S,
        engine: E,
        quiz: Q,
        profile: Option<AccessibilityProfile>,
        config: &EngineConfig,
    ) -> (Self, Option<PersistenceWarning>) {
        let profile = profile.unwrap_or_else(|| {
            config.default_profile().unwrap_or_else(|e| {
                tracing::warn!("Configured profile rejected ({}), using defaults", e);
                AccessibilityProfile::new()
            })
        });
        let timeout = config.persistence.timeout();
        let narration = NarrationController::new(engine, &profile, config.narration);

        let mut session = Self {
            id: Uuid::new_v4(),
            profile,
            navigator: SectionNavigator::new(store, timeout),
            narration,
            quiz,
            quiz_started: false,
        };

        tracing::info!("Reading session {} starting on {}", session.id, document.id());
        let warning = session.load_document(document).await;
        (session, warning)
    }

    /// Switch to another document, releasing narration first.
    pub async fn load_document(&mut self, document: Document) -> Option<PersistenceWarning> {
        self.narration.stop();

        let warning = self.navigator.open(document).await;

        self.quiz_started = false;
        self.load_current_section();

        warning
    }

    /// Start or resume narration of the current section.
    pub fn play(&mut self) -> Result<(), NarrationError> {
        if !self.profile.tts_enabled() {
            return Err(NarrationError::Disabled);
        }
        self.narration.play()
    }

    pub fn pause(&mut self) {
        self.narration.pause();
    }

    pub fn stop(&mut self) {
        self.narration.stop();
    }

    /// False once narration has failed; audio controls should be hidden.
    pub fn narration_available(&self) -> bool {
        self.narration.is_available()
    }

    /// Drive narration: wait for the next word boundary or the end.
    pub async fn next_narration_event(&mut self) -> Option<NarrationEvent> {
        self.narration.next_event().await
    }

    /// Subscribe to narration events
    pub fn subscribe_narration(&self) -> broadcast::Receiver<NarrationEvent> {
        self.narration.subscribe()
    }

    /// Change one profile setting for the rest of the session.
    pub fn update_profile(&mut self, setting: ProfileSetting) -> Result<(), SettingError> {
        let profile = self.profile.update(setting)?;
        self.narration.apply_profile(&profile);
        if !profile.tts_enabled() {
            self.narration.stop();
        }
        self.profile = profile;
        Ok(())
    }

    pub async fn advance(&mut self) -> Result<Transition, NavigationError> {
        let transition = self.navigator.advance().await?;
        self.after_transition(&transition);
        Ok(transition)
    }

    pub async fn retreat(&mut self) -> Result<Transition, NavigationError> {
        let transition = self.navigator.retreat().await?;
        self.after_transition(&transition);
        Ok(transition)
    }

    pub async fn jump_to(&mut self, index: usize) -> Result<Transition, NavigationError> {
        let transition = self.navigator.jump_to(index).await?;
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &AccessibilityProfile {
        &self.profile
    }

    /// Theme for rendering the current profile.
    pub fn theme(&self) -> ReadingTheme {
        ReadingTheme::from_profile(&self.profile)
    }

    pub fn progress(&self) -> Option<ReadingProgress> {
        self.navigator.progress()
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.navigator.current_section()
    }

    pub fn document(&self) -> Option<&Document> {
        self.navigator.document()
    }

    pub fn narration(&self) -> &NarrationController<E> {
        &self.narration
    }

    pub fn quiz(&self) -> &Q {
        &self.quiz
    }

    /// End the session, releasing the speech engine.
    pub fn end(mut self) -> Option<ReadingProgress> {
        self.narration.stop();
        let progress = self.navigator.progress();
        tracing::info!("Reading session {} ended", self.id);
        progress
    }

    fn after_transition(&mut self, transition: &Transition) {
        match &transition.outcome {
            NavigationOutcome::Finished { document_id } => {
                self.narration.stop();
                if !self.quiz_started {
                    self.quiz_started = true;
                    tracing::info!("Handing off {} to quiz", document_id);
                    self.quiz.begin_quiz(document_id);
                }
            }
            outcome if outcome.changed_section() => self.load_current_section(),
            _ => {}
        }
    }

    fn load_current_section(&mut self) {
        let text = self
            .navigator
            .current_section()
            .map(Section::narration_text)
            .unwrap_or_default();
        self.narration.load(&text);
    }
}
