//! Integration tests for configuration files.

use adaptive_reader::accessibility::{ColorVisionMode, FontFamily};
use adaptive_reader::storage::{load_config_from, save_config_to, ConfigError, EngineConfig};
use tempfile::tempdir;

#[test]
fn test_config_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = EngineConfig::default();
    config.persistence.base_url = "https://reader.example.org/api".to_string();
    config.persistence.timeout_ms = 3000;
    config.narration.per_char_secs = 0.08;
    config.profile.font_family = FontFamily::DyslexiaFriendly;
    config.profile.color_vision_mode = ColorVisionMode::Deuteranopia;

    save_config_to(&config, &path).unwrap();
    let loaded = load_config_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_hand_written_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[persistence]
base_url = "http://10.0.0.5/api"

[profile]
font_size_px = 22
background_color = "#1e1e24"
tts_enabled = true
"##,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.persistence.base_url, "http://10.0.0.5/api");
    assert_eq!(config.persistence.timeout_ms, 5000);
    assert_eq!(config.profile.font_size_px, 22);
    assert!(config.profile.tts_enabled);
    assert_eq!(config.profile.background_color.to_hex(), "#1e1e24");
}

#[test]
fn test_malformed_config_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[persistence\ntimeout_ms = ").unwrap();

    assert!(matches!(
        load_config_from(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    std::fs::write(&path, "[narration]\nbase_word_secs = -0.3\n").unwrap();
    assert!(matches!(
        load_config_from(&path),
        Err(ConfigError::InvalidValue(_))
    ));

    std::fs::write(&path, "[profile]\ntts_voice_locale = \"not a locale!\"\n").unwrap();
    assert!(matches!(
        load_config_from(&path),
        Err(ConfigError::InvalidValue(_))
    ));
}
