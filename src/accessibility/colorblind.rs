//! Color vision simulation filters.
//!
//! Maps a color-vision mode to the 4x5 color matrix the renderer applies as a
//! display-level filter over the whole reading surface. The coefficients are
//! the widely published protanopia, deuteranopia and tritanopia simulation
//! matrices (rows R, G, B, A; columns R, G, B, A, offset).

use super::profile::{Color, SettingError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color vision mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorVisionMode {
    /// No simulation
    #[default]
    None,
    /// Red-blind (missing L cones)
    Protanopia,
    /// Green-blind (missing M cones)
    Deuteranopia,
    /// Blue-blind (missing S cones)
    Tritanopia,
}

impl ColorVisionMode {
    /// All modes, in settings-menu order.
    pub fn all() -> &'static [ColorVisionMode] {
        &[
            ColorVisionMode::None,
            ColorVisionMode::Protanopia,
            ColorVisionMode::Deuteranopia,
            ColorVisionMode::Tritanopia,
        ]
    }

    /// The display filter for this mode.
    pub fn matrix(&self) -> ColorMatrix {
        matrix_for(*self)
    }
}

impl std::fmt::Display for ColorVisionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorVisionMode::None => write!(f, "None"),
            ColorVisionMode::Protanopia => write!(f, "Protanopia (Red-Green)"),
            ColorVisionMode::Deuteranopia => write!(f, "Deuteranopia (Red-Green)"),
            ColorVisionMode::Tritanopia => write!(f, "Tritanopia (Blue-Yellow)"),
        }
    }
}

impl FromStr for ColorVisionMode {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "normal" => Ok(ColorVisionMode::None),
            "protanopia" => Ok(ColorVisionMode::Protanopia),
            "deuteranopia" => Ok(ColorVisionMode::Deuteranopia),
            "tritanopia" => Ok(ColorVisionMode::Tritanopia),
            _ => Err(SettingError::invalid(
                "colorVisionMode",
                s,
                "expected none, protanopia, deuteranopia or tritanopia",
            )),
        }
    }
}

/// A 4x5 color transform matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 5]; 4]);

impl ColorMatrix {
    /// The identity transform.
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        [1.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    const PROTANOPIA: ColorMatrix = ColorMatrix([
        [0.567, 0.433, 0.0, 0.0, 0.0],
        [0.558, 0.442, 0.0, 0.0, 0.0],
        [0.0, 0.242, 0.758, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    const DEUTERANOPIA: ColorMatrix = ColorMatrix([
        [0.625, 0.375, 0.0, 0.0, 0.0],
        [0.7, 0.3, 0.0, 0.0, 0.0],
        [0.0, 0.3, 0.7, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    const TRITANOPIA: ColorMatrix = ColorMatrix([
        [0.95, 0.05, 0.0, 0.0, 0.0],
        [0.0, 0.433, 0.567, 0.0, 0.0],
        [0.0, 0.475, 0.525, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Transform a single opaque color.
    ///
    /// Offsets are in normalized units, so they are scaled by 255 here.
    pub fn apply(&self, color: Color) -> Color {
        let input = [
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            1.0,
        ];
        let channel = |row: &[f32; 5]| -> u8 {
            let value = row[0] * input[0]
                + row[1] * input[1]
                + row[2] * input[2]
                + row[3] * input[3]
                + row[4];
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        };

        Color::rgb(channel(&self.0[0]), channel(&self.0[1]), channel(&self.0[2]))
    }

    /// The 20 coefficients as a space-separated list, as expected by an
    /// `feColorMatrix` `values` attribute.
    pub fn to_svg_values(&self) -> String {
        self.0
            .iter()
            .flat_map(|row| row.iter())
            .map(|v| format!("{}", v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Get the display filter for a color-vision mode. Total: every mode has a
/// matrix and `None` is the identity.
pub fn matrix_for(mode: ColorVisionMode) -> ColorMatrix {
    match mode {
        ColorVisionMode::None => ColorMatrix::IDENTITY,
        ColorVisionMode::Protanopia => ColorMatrix::PROTANOPIA,
        ColorVisionMode::Deuteranopia => ColorMatrix::DEUTERANOPIA,
        ColorVisionMode::Tritanopia => ColorMatrix::TRITANOPIA,
    }
}
