//! Integration test modules.

mod config_test;
mod speech_mock;
