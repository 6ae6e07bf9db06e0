//! Rendering contract for reading surfaces.

pub mod theme;

pub use theme::{highlight_words, ReadingTheme, WordSpan};
