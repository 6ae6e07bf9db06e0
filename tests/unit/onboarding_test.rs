//! Unit tests for onboarding scoring.

use adaptive_reader::accessibility::{ContrastPreset, FontFamily, ProfileSettings};
use adaptive_reader::onboarding::{
    Answer, DisabilityType, OnboardingAnswer, OnboardingScorer, QuestionId,
    CLASSIFICATION_THRESHOLD,
};

const ANSWERS: [Answer; 3] = [Answer::Yes, Answer::Sometimes, Answer::No];

/// Every combination of answers to the fixed question set.
fn all_answer_sets() -> Vec<Vec<OnboardingAnswer>> {
    let mut sets = vec![Vec::new()];
    for question in QuestionId::all() {
        sets = sets
            .into_iter()
            .flat_map(|set| {
                ANSWERS.into_iter().map(move |answer| {
                    let mut next = set.clone();
                    next.push(OnboardingAnswer::new(*question, answer));
                    next
                })
            })
            .collect();
    }
    sets
}

#[test]
fn test_scores_bounded_and_consistent() {
    let sets = all_answer_sets();
    assert_eq!(sets.len(), 3usize.pow(QuestionId::all().len() as u32));

    for answers in &sets {
        let profile = OnboardingScorer::score(answers);
        assert!((0.0..=1.0).contains(&profile.dyslexia_score));
        assert!((0.0..=1.0).contains(&profile.adhd_score));

        let dyslexic = profile.dyslexia_score > CLASSIFICATION_THRESHOLD;
        let adhd = profile.adhd_score > CLASSIFICATION_THRESHOLD;
        let expected = match (dyslexic, adhd) {
            (true, true) => DisabilityType::Both,
            (true, false) => DisabilityType::Dyslexia,
            (false, true) => DisabilityType::Adhd,
            (false, false) => DisabilityType::None,
        };
        assert_eq!(profile.disability_type, expected, "{:?}", answers);
    }
}

#[test]
fn test_dyslexia_and_shared_yes_is_never_both() {
    let answers = vec![
        OnboardingAnswer::new(QuestionId::DyslexiaSignal, Answer::Yes),
        OnboardingAnswer::new(QuestionId::SharedAttention, Answer::Yes),
        OnboardingAnswer::new(QuestionId::AdhdSignal1, Answer::No),
        OnboardingAnswer::new(QuestionId::AdhdSignal2, Answer::No),
    ];
    assert_eq!(
        OnboardingScorer::score(&answers).disability_type,
        DisabilityType::Dyslexia
    );
}

#[test]
fn test_parse_answers_from_form() {
    let answer = OnboardingAnswer::parse("adhd_signal_1", "Yes").unwrap();
    assert_eq!(answer.question_id, QuestionId::AdhdSignal1);
    assert_eq!(answer.answer, Answer::Yes);

    assert!(OnboardingAnswer::parse("favourite_colour", "yes").is_err());
    assert!(OnboardingAnswer::parse("adhd_signal_1", "maybe").is_err());
}

#[test]
fn test_derived_profile_for_adhd_reader() {
    let answers = vec![
        OnboardingAnswer::new(QuestionId::AdhdSignal1, Answer::Yes),
        OnboardingAnswer::new(QuestionId::AdhdSignal2, Answer::Yes),
    ];
    let profile = OnboardingScorer::derive_profile(&answers, &ProfileSettings::default()).unwrap();

    assert_eq!(profile.line_spacing(), 1.6);
    assert_eq!(profile.font_family(), FontFamily::Standard);
    assert!(!profile.tts_enabled());
}

#[test]
fn test_derived_profile_keeps_base_for_no_indicators() {
    let mut base = ProfileSettings::default();
    base.font_size_px = 24;

    let profile = OnboardingScorer::derive_profile(&[], &base).unwrap();
    assert_eq!(profile.font_size_px(), 24);
    assert_eq!(profile.background_color(), ContrastPreset::Standard.colors().0);
}
