//! Onboarding scoring.
//!
//! Turns the onboarding questionnaire into disability indicator scores and
//! an initial [`AccessibilityProfile`]. The weights and the `> 0.4`
//! classification threshold are product-tuned constants; keep them exact.

pub mod questions;

use crate::accessibility::{
    AccessibilityProfile, ContrastPreset, FontFamily, ProfileSettings, SettingError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Re-export types
pub use questions::{Answer, OnboardingAnswer, QuestionId};

/// Score above which an indicator counts as present.
pub const CLASSIFICATION_THRESHOLD: f32 = 0.4;

const DYSLEXIA_YES: f32 = 0.5;
const DYSLEXIA_SOMETIMES: f32 = 0.25;
const SHARED_ATTENTION_YES: f32 = 0.25;
const ADHD_SIGNAL_YES: f32 = 0.4;

/// Line spacing applied for dyslexic readers.
const DYSLEXIA_LINE_SPACING: f32 = 1.8;
/// Line spacing applied for readers with attention difficulties.
const ADHD_LINE_SPACING: f32 = 1.6;

/// Classified reading difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabilityType {
    #[default]
    None,
    Dyslexia,
    #[serde(rename = "adhd")]
    Adhd,
    Both,
}

impl std::fmt::Display for DisabilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisabilityType::None => write!(f, "None"),
            DisabilityType::Dyslexia => write!(f, "Dyslexia"),
            DisabilityType::Adhd => write!(f, "ADHD"),
            DisabilityType::Both => write!(f, "Dyslexia and ADHD"),
        }
    }
}

/// Onboarding result, consumed once to seed the accessibility profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabilityIndicatorProfile {
    /// 0.0 - 1.0
    pub dyslexia_score: f32,
    /// 0.0 - 1.0
    pub adhd_score: f32,
    pub disability_type: DisabilityType,
}

impl DisabilityIndicatorProfile {
    /// Build from raw scores, clamping to [0, 1] and classifying.
    pub fn from_scores(dyslexia_score: f32, adhd_score: f32) -> Self {
        let dyslexia_score = dyslexia_score.clamp(0.0, 1.0);
        let adhd_score = adhd_score.clamp(0.0, 1.0);

        let dyslexic = dyslexia_score > CLASSIFICATION_THRESHOLD;
        let adhd = adhd_score > CLASSIFICATION_THRESHOLD;
        let disability_type = match (dyslexic, adhd) {
            (true, true) => DisabilityType::Both,
            (true, false) => DisabilityType::Dyslexia,
            (false, true) => DisabilityType::Adhd,
            (false, false) => DisabilityType::None,
        };

        Self {
            dyslexia_score,
            adhd_score,
            disability_type,
        }
    }

    /// Apply the reading defaults that follow from this classification.
    pub fn apply_defaults(&self, settings: &mut ProfileSettings) {
        match self.disability_type {
            DisabilityType::Dyslexia | DisabilityType::Both => {
                settings.font_family = FontFamily::DyslexiaFriendly;
                settings.line_spacing = DYSLEXIA_LINE_SPACING;
                let (background, text) = ContrastPreset::Cream.colors();
                settings.background_color = background;
                settings.text_color = text;
            }
            DisabilityType::Adhd => {
                settings.line_spacing = ADHD_LINE_SPACING;
            }
            DisabilityType::None => {}
        }
    }
}

/// Scores onboarding answers.
pub struct OnboardingScorer;

impl OnboardingScorer {
    /// Score a sequence of answers.
    ///
    /// Missing questions count as `no`. If a question is answered more than
    /// once, the last answer wins.
    pub fn score(answers: &[OnboardingAnswer]) -> DisabilityIndicatorProfile {
        let answers = latest_answers(answers);
        let answer = |q: QuestionId| answers.get(&q).copied().unwrap_or_default();

        let mut dyslexia = 0.0;
        let mut adhd = 0.0;

        dyslexia += match answer(QuestionId::DyslexiaSignal) {
            Answer::Yes => DYSLEXIA_YES,
            Answer::Sometimes => DYSLEXIA_SOMETIMES,
            Answer::No => 0.0,
        };

        if answer(QuestionId::SharedAttention) == Answer::Yes {
            dyslexia += SHARED_ATTENTION_YES;
            adhd += SHARED_ATTENTION_YES;
        }

        for question in [QuestionId::AdhdSignal1, QuestionId::AdhdSignal2] {
            if answer(question) == Answer::Yes {
                adhd += ADHD_SIGNAL_YES;
            }
        }

        let profile = DisabilityIndicatorProfile::from_scores(dyslexia, adhd);
        tracing::debug!(
            "Onboarding scored: dyslexia={:.2} adhd={:.2} type={}",
            profile.dyslexia_score,
            profile.adhd_score,
            profile.disability_type
        );
        profile
    }

    /// Whether the student asked for narration.
    pub fn prefers_narration(answers: &[OnboardingAnswer]) -> bool {
        latest_answers(answers).get(&QuestionId::AudioPreference) == Some(&Answer::Yes)
    }

    /// Derive the initial accessibility profile from onboarding answers.
    pub fn derive_profile(
        answers: &[OnboardingAnswer],
        base: &ProfileSettings,
    ) -> Result<AccessibilityProfile, SettingError> {
        let indicators = Self::score(answers);
        let mut settings = base.clone();
        indicators.apply_defaults(&mut settings);
        settings.tts_enabled = Self::prefers_narration(answers);

        tracing::info!(
            "Derived accessibility profile for {} reader",
            indicators.disability_type
        );
        AccessibilityProfile::from_settings(settings)
    }
}

fn latest_answers(answers: &[OnboardingAnswer]) -> BTreeMap<QuestionId, Answer> {
    answers.iter().map(|a| (a.question_id, a.answer)).collect()
}
