//! Onboarding questionnaire.

use crate::accessibility::SettingError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Questions asked during onboarding, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionId {
    /// Letters moving or swapping while reading
    DyslexiaSignal,
    /// Losing the place on the page; counts toward both indicators
    SharedAttention,
    /// Drifting off mid-paragraph
    #[serde(rename = "adhd_signal_1")]
    AdhdSignal1,
    /// Restlessness during long reading
    #[serde(rename = "adhd_signal_2")]
    AdhdSignal2,
    /// Preference for having text read aloud
    AudioPreference,
}

impl QuestionId {
    /// Get all questions in order.
    pub fn all() -> &'static [QuestionId] {
        &[
            QuestionId::DyslexiaSignal,
            QuestionId::SharedAttention,
            QuestionId::AdhdSignal1,
            QuestionId::AdhdSignal2,
            QuestionId::AudioPreference,
        ]
    }

    /// Stable identifier used by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionId::DyslexiaSignal => "dyslexia_signal",
            QuestionId::SharedAttention => "shared_attention",
            QuestionId::AdhdSignal1 => "adhd_signal_1",
            QuestionId::AdhdSignal2 => "adhd_signal_2",
            QuestionId::AudioPreference => "audio_preference",
        }
    }

    /// The question as shown to the student.
    pub fn prompt(&self) -> &'static str {
        match self {
            QuestionId::DyslexiaSignal => {
                "Do letters or words seem to move, flip or swap places when you read?"
            }
            QuestionId::SharedAttention => "Do you often lose your place on the page?",
            QuestionId::AdhdSignal1 => {
                "Do you find your mind wandering before you finish a paragraph?"
            }
            QuestionId::AdhdSignal2 => "Is it hard to sit still while reading for a long time?",
            QuestionId::AudioPreference => "Would you like the text read aloud to you?",
        }
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionId {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionId::all()
            .iter()
            .copied()
            .find(|q| q.as_str() == s.trim())
            .ok_or_else(|| SettingError::UnknownQuestion(s.to_string()))
    }
}

/// Categorical answer to an onboarding question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    Sometimes,
    #[default]
    No,
}

impl FromStr for Answer {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Answer::Yes),
            "sometimes" => Ok(Answer::Sometimes),
            "no" => Ok(Answer::No),
            _ => Err(SettingError::invalid("answer", s, "expected yes, sometimes or no")),
        }
    }
}

/// One answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingAnswer {
    pub question_id: QuestionId,
    pub answer: Answer,
}

impl OnboardingAnswer {
    pub fn new(question_id: QuestionId, answer: Answer) -> Self {
        Self { question_id, answer }
    }

    /// Parse a `(questionId, answer)` pair submitted as strings.
    pub fn parse(question_id: &str, answer: &str) -> Result<Self, SettingError> {
        Ok(Self {
            question_id: question_id.parse()?,
            answer: answer.parse()?,
        })
    }
}
