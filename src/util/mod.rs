//! Utility modules

pub mod text;

pub use text::{char_at, char_before, char_len, slice_chars, slice_from, slice_to, word_at};
