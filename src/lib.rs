//! Adaptive Reader - Accessible Adaptive Reading Session Engine
//!
//! Turns a structured document plus a per-student accessibility profile into
//! a navigable reading session. Provides onboarding-derived profiles,
//! word-by-word narration with cancellable play/pause/stop, and resumable
//! per-section progress that checkpoints to a backend and hands off to a
//! quiz when the document is finished.

pub mod accessibility;
pub mod audio;
pub mod onboarding;
pub mod reading;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use accessibility::{AccessibilityProfile, ProfileSetting, SettingError};
pub use audio::{NarrationController, NarrationError, SpeechEngine};
pub use onboarding::{DisabilityIndicatorProfile, OnboardingScorer};
pub use reading::{Document, ReadingSession, SectionNavigator};
pub use storage::{EngineConfig, ProgressStore};
