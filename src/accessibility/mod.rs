//! Accessibility settings for the reading surface.
//!
//! - Per-session accessibility profile with clamped bounds
//! - Color-vision simulation filters
//! - Contrast presets and WCAG contrast checks

pub mod colorblind;
pub mod high_contrast;
pub mod profile;

// Re-export primary types
pub use colorblind::{matrix_for, ColorMatrix, ColorVisionMode};
pub use high_contrast::{contrast_ratio, meets_aa, meets_aaa, ContrastPreset};
pub use profile::{
    AccessibilityProfile, Color, FontFamily, ProfileSetting, ProfileSettings, SettingError,
};
