//! Unit test modules.

mod narration_test;
mod navigator_test;
mod onboarding_test;
