//! Background/text color presets and WCAG contrast checks.

use super::profile::{Color, SettingError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named background/text color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastPreset {
    /// Near-black on white
    #[default]
    Standard,
    /// Dark brown on cream, softer glare for dyslexic readers
    Cream,
    /// Light gray on charcoal
    Dark,
    /// White on black (WCAG AAA)
    HighContrast,
}

impl ContrastPreset {
    /// `(background, text)` colors for this preset.
    pub fn colors(&self) -> (Color, Color) {
        match self {
            ContrastPreset::Standard => (Color::WHITE, Color::rgb(26, 26, 26)),
            ContrastPreset::Cream => (Color::rgb(253, 246, 227), Color::rgb(59, 47, 35)),
            ContrastPreset::Dark => (Color::rgb(30, 30, 36), Color::rgb(230, 230, 235)),
            ContrastPreset::HighContrast => (Color::BLACK, Color::WHITE),
        }
    }
}

impl std::fmt::Display for ContrastPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContrastPreset::Standard => write!(f, "Standard"),
            ContrastPreset::Cream => write!(f, "Cream"),
            ContrastPreset::Dark => write!(f, "Dark"),
            ContrastPreset::HighContrast => write!(f, "High Contrast"),
        }
    }
}

impl FromStr for ContrastPreset {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "standard" => Ok(ContrastPreset::Standard),
            "cream" => Ok(ContrastPreset::Cream),
            "dark" => Ok(ContrastPreset::Dark),
            "high_contrast" | "high" => Ok(ContrastPreset::HighContrast),
            _ => Err(SettingError::invalid(
                "contrast",
                s,
                "expected standard, cream, dark or high_contrast",
            )),
        }
    }
}

/// Contrast ratio between two colors, from 1 to 21 (black on white).
pub fn contrast_ratio(fg: Color, bg: Color) -> f32 {
    let fg_lum = relative_luminance(fg);
    let bg_lum = relative_luminance(bg);

    let (lighter, darker) = if fg_lum > bg_lum {
        (fg_lum, bg_lum)
    } else {
        (bg_lum, fg_lum)
    };

    (lighter + 0.05) / (darker + 0.05)
}

/// Relative luminance of a color.
/// https://www.w3.org/TR/WCAG21/#dfn-relative-luminance
pub fn relative_luminance(color: Color) -> f32 {
    let r = linearize(color.r as f32 / 255.0);
    let g = linearize(color.g as f32 / 255.0);
    let b = linearize(color.b as f32 / 255.0);

    0.2126 * r + 0.7152 * g + 0.0722 * b
}

fn linearize(value: f32) -> f32 {
    if value <= 0.03928 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG AA for body text (4.5:1).
pub fn meets_aa(fg: Color, bg: Color) -> bool {
    contrast_ratio(fg, bg) >= 4.5
}

/// WCAG AAA for body text (7:1).
pub fn meets_aaa(fg: Color, bg: Color) -> bool {
    contrast_ratio(fg, bg) >= 7.0
}
