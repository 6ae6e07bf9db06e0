//! Reading theme derived from an accessibility profile.
//!
//! The engine does not draw anything itself. Renderers take a
//! [`ReadingTheme`] and apply it to whatever surface they own.

use crate::accessibility::high_contrast::relative_luminance;
use crate::accessibility::{meets_aa, AccessibilityProfile, Color, ColorMatrix};
use crate::audio::timing::tokenize;

/// Id of the SVG filter referenced from the CSS block.
pub const FILTER_ID: &str = "cvd-filter";

/// Highlight for the active word on light backgrounds.
const HIGHLIGHT_ON_LIGHT: Color = Color::rgb(255, 221, 87);
/// Highlight for the active word on dark backgrounds.
const HIGHLIGHT_ON_DARK: Color = Color::rgb(99, 80, 0);

/// Everything a renderer needs to display a section for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingTheme {
    /// CSS font stack
    pub font_stack: &'static str,
    pub font_size_px: u32,
    /// Line height in px (font size times line spacing)
    pub line_height_px: f32,
    pub background: Color,
    pub text: Color,
    /// Background of the word being narrated
    pub highlight: Color,
    /// Color-vision filter; identity when no mode is set
    pub filter: ColorMatrix,
}

impl ReadingTheme {
    pub fn from_profile(profile: &AccessibilityProfile) -> Self {
        let background = profile.background_color();
        let highlight = if relative_luminance(background) > 0.5 {
            HIGHLIGHT_ON_LIGHT
        } else {
            HIGHLIGHT_ON_DARK
        };

        Self {
            font_stack: profile.font_family().font_stack(),
            font_size_px: profile.font_size_px(),
            line_height_px: profile.font_size_px() as f32 * profile.line_spacing(),
            background,
            text: profile.text_color(),
            highlight,
            filter: profile.color_matrix(),
        }
    }

    /// CSS declarations for the reading surface.
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "font-family: {};\nfont-size: {}px;\nline-height: {:.1}px;\nbackground-color: {};\ncolor: {};\n",
            self.font_stack, self.font_size_px, self.line_height_px, self.background, self.text
        );
        if !self.filter.is_identity() {
            css.push_str(&format!("filter: url(#{});\n", FILTER_ID));
        }
        css
    }

    /// SVG filter definition for the color-vision matrix, `None` when no
    /// filter applies.
    pub fn svg_filter(&self) -> Option<String> {
        if self.filter.is_identity() {
            return None;
        }
        Some(format!(
            "<filter id=\"{}\"><feColorMatrix type=\"matrix\" values=\"{}\"/></filter>",
            FILTER_ID,
            self.filter.to_svg_values()
        ))
    }

    /// Whether the text/background pair meets WCAG AA for body text.
    pub fn meets_aa(&self) -> bool {
        meets_aa(self.text, self.background)
    }
}

/// A word of displayed text, marked when it is being narrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan<'a> {
    pub text: &'a str,
    pub index: usize,
    pub active: bool,
}

/// Split `text` into word spans using the narration tokenization, so
/// `active_index` from the narration controller marks the right word.
pub fn highlight_words(text: &str, active_index: Option<usize>) -> Vec<WordSpan<'_>> {
    tokenize(text)
        .enumerate()
        .map(|(index, word)| WordSpan {
            text: word,
            index,
            active: active_index == Some(index),
        })
        .collect()
}
