// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph value types and the provider seam between fonts and layout.

use bitflags::bitflags;

use super::atlas::TextureId;

/// A font-internal glyph index. Index 0 is the `.notdef` glyph.
pub type GlyphId = u16;

/// Sentinel terminating every paragraph except the last one in a document.
pub const PARAGRAPH_BREAK: char = '\n';

/// Sentinel terminating the final paragraph of a document.
pub const END_OF_TEXT: char = '\0';

/// Normalized texture coordinates of a glyph bitmap within its texture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

/// Placement and sampling data for one rasterized glyph.
///
/// Immutable once computed; cached for the lifetime of the owning font. A
/// glyph with no visible bitmap (a space, for example) has `texture: None`
/// and a zero [`UvRect`] but still carries a valid advance so advance-based
/// layout stays correct.
#[derive(Clone, Debug)]
pub struct GlyphInfo {
    /// Texture holding the bitmap, `None` for zero-area glyphs.
    pub texture: Option<TextureId>,
    /// Bitmap extent in pixels.
    pub width: u32,
    pub height: u32,
    /// Bearing: horizontal offset from the pen to the bitmap's left edge.
    pub left: i32,
    /// Bearing: vertical offset from the baseline up to the bitmap's top edge.
    pub top: i32,
    /// Horizontal pen advance in pixels.
    pub advance: f32,
    /// Sampling rectangle within `texture`.
    pub uv: UvRect,
}

/// One rendered unit of paragraph content: a source character resolved to a
/// glyph with an integer pixel advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphChar {
    pub ch: char,
    pub glyph_id: GlyphId,
    pub advance: u32,
}

impl GlyphChar {
    /// A zero-width sentinel glyph (`'\n'` or `'\0'`).
    pub fn terminator(ch: char) -> Self {
        debug_assert!(ch == PARAGRAPH_BREAK || ch == END_OF_TEXT);
        Self {
            ch,
            glyph_id: 0,
            advance: 0,
        }
    }

    /// Whether this glyph ends a paragraph.
    pub fn is_terminator(&self) -> bool {
        self.ch == PARAGRAPH_BREAK || self.ch == END_OF_TEXT
    }

    pub fn is_paragraph_break(&self) -> bool {
        self.ch == PARAGRAPH_BREAK
    }

    pub fn is_end_of_text(&self) -> bool {
        self.ch == END_OF_TEXT
    }
}

bitflags! {
    /// Selects which glyphs a font rasterizes at load time.
    ///
    /// `ALL` preloads the whole character map. `ON_DEMAND` preloads nothing
    /// and compiles glyphs on first request (icon and fallback fonts). Any
    /// other combination preloads the union of the named categories, which
    /// bounds memory for large CJK-capable fonts.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GlyphFilter: u32 {
        const ALL = 1 << 0;
        const ON_DEMAND = 1 << 1;
        const PUNCTUATION = 1 << 2;
        const NUMERIC = 1 << 3;
        const ALPHA = 1 << 4;
        const ASCII = 1 << 5;
        const LOWER = 1 << 6;
        const UPPER = 1 << 7;
        const SYMBOL = 1 << 8;
    }
}

impl GlyphFilter {
    /// Whether a character passes this filter for eager loading.
    pub fn admits(self, ch: char) -> bool {
        if self.contains(Self::ALL) {
            return true;
        }
        (self.contains(Self::ALPHA) && ch.is_alphabetic())
            || (self.contains(Self::NUMERIC) && ch.is_numeric())
            || (self.contains(Self::PUNCTUATION) && ch.is_ascii_punctuation())
            || (self.contains(Self::ASCII) && ch.is_ascii())
            || (self.contains(Self::LOWER) && ch.is_lowercase())
            || (self.contains(Self::UPPER) && ch.is_uppercase())
            || (self.contains(Self::SYMBOL)
                && !ch.is_alphanumeric()
                && !ch.is_whitespace()
                && !ch.is_control())
    }
}

impl Default for GlyphFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// Character-level metrics consumed by paragraph layout.
///
/// [`Font`](super::Font) is the production implementation; tests use a
/// fixed-advance stand-in so layout exercises run without font files.
pub trait GlyphProvider: Send + Sync {
    /// Resolves a character to its glyph index and integer advance.
    fn glyph_char(&self, ch: char) -> GlyphChar;

    /// The scaled line height in pixels.
    fn line_height(&self) -> f32;
}
