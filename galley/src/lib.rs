// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Galley is a text rendering and incremental paragraph layout core.
//!
//! The crate is split along its dataflow:
//!
//! - [`font`] loads fonts, rasterizes glyphs into shelf-packed alpha
//!   atlases and caches them per font.
//! - [`layout`] breaks paragraphs into lines greedily and keeps a
//!   document's worth of paragraphs addressable by absolute position,
//!   line index and pixel coordinate, re-laying out incrementally after
//!   edits and on a background worker after width changes.
//! - [`editing`] ties both together behind [`Document`](editing::Document),
//!   an editable buffer with cursor movement and thread-safe layout
//!   snapshots for renderers.
//!
//! Rendering itself is out of scope: the font layer hands back CPU-side
//! alpha textures and UV rectangles for a graphics backend to upload and
//! draw however it likes.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use galley::editing::Document;
//! use galley::font::{GlyphChar, GlyphProvider};
//!
//! // Any fixed-metric provider will do for layout; use `galley::font::Font`
//! // to measure real font files.
//! struct Monospace;
//!
//! impl GlyphProvider for Monospace {
//!     fn glyph_char(&self, ch: char) -> GlyphChar {
//!         GlyphChar { ch, glyph_id: ch as u16, advance: 8 }
//!     }
//!     fn line_height(&self) -> f32 {
//!         16.0
//!     }
//! }
//!
//! let mut document = Document::new(Arc::new(Monospace), 320);
//! document.load_text("Hello\nWorld");
//! document.set_cursor_abs_position(6);
//! document.insert_text("brave ");
//! assert_eq!(document.text(), "Hello\nbrave World");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod editing;
pub mod font;
pub mod layout;
pub mod util;

pub use swash;

#[cfg(test)]
mod tests;
