// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use crate::editing::Document;
use crate::font::{GlyphChar, GlyphProvider};

/// 10px advances and a 16px line height keep every expected coordinate
/// mentally checkable.
pub(super) struct FixedMetrics;

impl GlyphProvider for FixedMetrics {
    fn glyph_char(&self, ch: char) -> GlyphChar {
        GlyphChar {
            ch,
            glyph_id: ch as u16,
            advance: 10,
        }
    }

    fn line_height(&self) -> f32 {
        16.0
    }
}

pub(super) fn document(text: &str, break_width: u32) -> Document {
    let mut document = Document::new(Arc::new(FixedMetrics), break_width);
    document.load_text(text);
    document
}
