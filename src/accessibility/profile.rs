//! Per-session accessibility profile.
//!
//! The profile is a plain value: every mutation goes through [`AccessibilityProfile::update`],
//! which returns a new profile with bounded fields clamped. Applying the
//! profile to a display surface is the caller's job (see `ui::theme`).

use super::colorblind::{ColorMatrix, ColorVisionMode};
use super::high_contrast::ContrastPreset;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Smallest reading font size in pixels.
pub const FONT_SIZE_MIN_PX: u32 = 14;
/// Largest reading font size in pixels.
pub const FONT_SIZE_MAX_PX: u32 = 32;
/// Minimum line spacing multiplier.
pub const LINE_SPACING_MIN: f32 = 1.0;
/// Slowest narration rate multiplier.
pub const TTS_SPEED_MIN: f32 = 0.5;
/// Fastest narration rate multiplier.
pub const TTS_SPEED_MAX: f32 = 2.0;
/// Narration locale used when neither the settings nor the OS provide one.
pub const DEFAULT_TTS_LOCALE: &str = "en-GB";

/// Errors raised for out-of-contract settings input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidSetting {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Unknown setting: {0}")]
    UnknownField(String),

    #[error("Unknown onboarding question: {0}")]
    UnknownQuestion(String),
}

impl SettingError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        SettingError::InvalidSetting {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, SettingError> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || SettingError::invalid("color", hex, "expected #RRGGBB or #RGB");

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
                Ok(Self::rgb(
                    channel(0).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                    channel(4).map_err(|_| invalid())?,
                ))
            }
            3 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::rgb(
                    channel(0).map_err(|_| invalid())?,
                    channel(1).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = SettingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Reading typeface family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Heavy-bottomed letterforms (OpenDyslexic, Lexend)
    DyslexiaFriendly,
    /// Plain sans-serif
    #[default]
    Standard,
    /// Book serif
    Serif,
}

impl FontFamily {
    /// CSS font stack for this family.
    pub fn font_stack(&self) -> &'static str {
        match self {
            FontFamily::DyslexiaFriendly => "'OpenDyslexic', 'Lexend', 'Comic Sans MS', sans-serif",
            FontFamily::Standard => "'Inter', 'Helvetica Neue', Arial, sans-serif",
            FontFamily::Serif => "'Merriweather', Georgia, 'Times New Roman', serif",
        }
    }
}

impl std::fmt::Display for FontFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFamily::DyslexiaFriendly => write!(f, "Dyslexia Friendly"),
            FontFamily::Standard => write!(f, "Standard"),
            FontFamily::Serif => write!(f, "Serif"),
        }
    }
}

impl FromStr for FontFamily {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "dyslexiafriendly" | "opendyslexic" => Ok(FontFamily::DyslexiaFriendly),
            "standard" | "sansserif" | "sans" => Ok(FontFamily::Standard),
            "serif" => Ok(FontFamily::Serif),
            _ => Err(SettingError::invalid(
                "fontFamily",
                s,
                "expected dyslexia_friendly, standard or serif",
            )),
        }
    }
}

/// A single profile mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileSetting {
    FontSizePx(i64),
    FontFamily(FontFamily),
    LineSpacing(f32),
    BackgroundColor(Color),
    TextColor(Color),
    /// Sets background and text color together
    Contrast(ContrastPreset),
    ColorVisionMode(ColorVisionMode),
    TtsEnabled(bool),
    /// An empty locale means "use the OS locale"
    TtsVoiceLocale(String),
    TtsSpeed(f32),
}

/// Unvalidated profile fields, as read from configuration or storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub font_size_px: i64,
    pub font_family: FontFamily,
    pub line_spacing: f32,
    pub background_color: Color,
    pub text_color: Color,
    pub color_vision_mode: ColorVisionMode,
    pub tts_enabled: bool,
    pub tts_voice_locale: String,
    pub tts_speed: f32,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        let (background, text) = ContrastPreset::Standard.colors();
        Self {
            font_size_px: 18,
            font_family: FontFamily::Standard,
            line_spacing: 1.5,
            background_color: background,
            text_color: text,
            color_vision_mode: ColorVisionMode::None,
            tts_enabled: false,
            tts_voice_locale: DEFAULT_TTS_LOCALE.to_string(),
            tts_speed: 1.0,
        }
    }
}

/// Accessibility settings for one reading session.
///
/// Fields are private so the bounds hold for every value of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileSettings", into = "ProfileSettings")]
pub struct AccessibilityProfile {
    font_size_px: u32,
    font_family: FontFamily,
    line_spacing: f32,
    background_color: Color,
    text_color: Color,
    color_vision_mode: ColorVisionMode,
    tts_enabled: bool,
    tts_voice_locale: String,
    tts_speed: f32,
}

impl Default for AccessibilityProfile {
    fn default() -> Self {
        let settings = ProfileSettings::default();
        Self {
            font_size_px: clamp_font_size(settings.font_size_px),
            font_family: settings.font_family,
            line_spacing: settings.line_spacing,
            background_color: settings.background_color,
            text_color: settings.text_color,
            color_vision_mode: settings.color_vision_mode,
            tts_enabled: settings.tts_enabled,
            tts_voice_locale: settings.tts_voice_locale,
            tts_speed: settings.tts_speed,
        }
    }
}

impl AccessibilityProfile {
    /// Create a profile with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profile from raw settings, clamping bounded fields.
    pub fn from_settings(settings: ProfileSettings) -> Result<Self, SettingError> {
        Ok(Self {
            font_size_px: clamp_font_size(settings.font_size_px),
            font_family: settings.font_family,
            line_spacing: clamp_line_spacing(settings.line_spacing)?,
            background_color: settings.background_color,
            text_color: settings.text_color,
            color_vision_mode: settings.color_vision_mode,
            tts_enabled: settings.tts_enabled,
            tts_voice_locale: resolve_locale(&settings.tts_voice_locale)?,
            tts_speed: clamp_tts_speed(settings.tts_speed)?,
        })
    }

    /// Raw settings view of this profile.
    pub fn settings(&self) -> ProfileSettings {
        ProfileSettings {
            font_size_px: i64::from(self.font_size_px),
            font_family: self.font_family,
            line_spacing: self.line_spacing,
            background_color: self.background_color,
            text_color: self.text_color,
            color_vision_mode: self.color_vision_mode,
            tts_enabled: self.tts_enabled,
            tts_voice_locale: self.tts_voice_locale.clone(),
            tts_speed: self.tts_speed,
        }
    }

    /// Return a new profile with one setting changed.
    ///
    /// Numeric values outside their bounds are clamped to the nearest bound.
    /// Non-finite numbers and malformed locales are rejected.
    pub fn update(&self, setting: ProfileSetting) -> Result<Self, SettingError> {
        let mut next = self.clone();

        match setting {
            ProfileSetting::FontSizePx(px) => next.font_size_px = clamp_font_size(px),
            ProfileSetting::FontFamily(family) => next.font_family = family,
            ProfileSetting::LineSpacing(spacing) => next.line_spacing = clamp_line_spacing(spacing)?,
            ProfileSetting::BackgroundColor(color) => next.background_color = color,
            ProfileSetting::TextColor(color) => next.text_color = color,
            ProfileSetting::Contrast(preset) => {
                let (background, text) = preset.colors();
                next.background_color = background;
                next.text_color = text;
            }
            ProfileSetting::ColorVisionMode(mode) => next.color_vision_mode = mode,
            ProfileSetting::TtsEnabled(enabled) => next.tts_enabled = enabled,
            ProfileSetting::TtsVoiceLocale(locale) => next.tts_voice_locale = resolve_locale(&locale)?,
            ProfileSetting::TtsSpeed(speed) => next.tts_speed = clamp_tts_speed(speed)?,
        }

        Ok(next)
    }

    /// Update a setting from its field name and string value, as submitted by
    /// a settings form. Accepts camelCase or snake_case field names.
    pub fn update_named(&self, field: &str, value: &str) -> Result<Self, SettingError> {
        let setting = match field {
            "fontSizePx" | "font_size_px" => {
                let px = parse_number("fontSizePx", value)?;
                if !px.is_finite() {
                    return Err(SettingError::invalid(
                        "fontSizePx",
                        value,
                        "must be a finite number",
                    ));
                }
                ProfileSetting::FontSizePx(px.round() as i64)
            }
            "fontFamily" | "font_family" => ProfileSetting::FontFamily(value.parse()?),
            "lineSpacing" | "line_spacing" => {
                ProfileSetting::LineSpacing(parse_number("lineSpacing", value)? as f32)
            }
            "backgroundColor" | "background_color" => {
                ProfileSetting::BackgroundColor(Color::from_hex(value)?)
            }
            "textColor" | "text_color" => ProfileSetting::TextColor(Color::from_hex(value)?),
            "contrast" => ProfileSetting::Contrast(value.parse()?),
            "colorVisionMode" | "color_vision_mode" => ProfileSetting::ColorVisionMode(value.parse()?),
            "ttsEnabled" | "tts_enabled" => ProfileSetting::TtsEnabled(parse_bool(value)?),
            "ttsVoiceLocale" | "tts_voice_locale" => ProfileSetting::TtsVoiceLocale(value.to_string()),
            "ttsSpeed" | "tts_speed" => ProfileSetting::TtsSpeed(parse_number("ttsSpeed", value)? as f32),
            _ => return Err(SettingError::UnknownField(field.to_string())),
        };

        self.update(setting)
    }

    pub fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    pub fn font_family(&self) -> FontFamily {
        self.font_family
    }

    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn color_vision_mode(&self) -> ColorVisionMode {
        self.color_vision_mode
    }

    /// Display filter for the color-vision mode.
    pub fn color_matrix(&self) -> ColorMatrix {
        self.color_vision_mode.matrix()
    }

    pub fn tts_enabled(&self) -> bool {
        self.tts_enabled
    }

    pub fn tts_voice_locale(&self) -> &str {
        &self.tts_voice_locale
    }

    pub fn tts_speed(&self) -> f32 {
        self.tts_speed
    }
}

impl TryFrom<ProfileSettings> for AccessibilityProfile {
    type Error = SettingError;

    fn try_from(settings: ProfileSettings) -> Result<Self, Self::Error> {
        Self::from_settings(settings)
    }
}

impl From<AccessibilityProfile> for ProfileSettings {
    fn from(profile: AccessibilityProfile) -> Self {
        profile.settings()
    }
}

fn clamp_font_size(px: i64) -> u32 {
    px.clamp(i64::from(FONT_SIZE_MIN_PX), i64::from(FONT_SIZE_MAX_PX)) as u32
}

fn clamp_line_spacing(spacing: f32) -> Result<f32, SettingError> {
    if !spacing.is_finite() {
        return Err(SettingError::invalid("lineSpacing", spacing, "must be a finite number"));
    }
    Ok(spacing.max(LINE_SPACING_MIN))
}

fn clamp_tts_speed(speed: f32) -> Result<f32, SettingError> {
    if !speed.is_finite() {
        return Err(SettingError::invalid("ttsSpeed", speed, "must be a finite number"));
    }
    Ok(speed.clamp(TTS_SPEED_MIN, TTS_SPEED_MAX))
}

/// Validate a BCP 47-ish locale tag, substituting the OS locale for an empty one.
fn resolve_locale(locale: &str) -> Result<String, SettingError> {
    let locale = locale.trim();
    if locale.is_empty() {
        return Ok(system_locale());
    }

    let well_formed = locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return Err(SettingError::invalid(
            "ttsVoiceLocale",
            locale,
            "expected a language tag such as en-GB",
        ));
    }

    Ok(locale.to_string())
}

fn system_locale() -> String {
    sys_locale::get_locale()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_TTS_LOCALE.to_string())
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, SettingError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SettingError::invalid(field, value, "expected a number"))
}

fn parse_bool(value: &str) -> Result<bool, SettingError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SettingError::invalid("ttsEnabled", value, "expected true or false")),
    }
}
