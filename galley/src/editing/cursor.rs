// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor addressing between the three coordinate spaces: absolute glyph
//! positions, paragraph/column pairs, and pixels.

use crate::layout::ParagraphList;
use crate::util::Rect;

/// A caret location: a paragraph index and a column within it.
///
/// The column ranges over `0..=visible_len`, the last slot being the
/// paragraph's sentinel. Conversions through a [`ParagraphList`] assume its
/// layout pass has run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub paragraph: usize,
    pub column: usize,
}

impl Cursor {
    /// The document-absolute glyph position of this cursor.
    pub fn to_abs_position(self, list: &ParagraphList) -> usize {
        list[self.paragraph].position_offset() + self.column
    }

    /// Places a cursor at an absolute position, clamped to the document.
    /// The largest valid position is the end-of-text sentinel slot.
    pub fn from_abs_position(list: &ParagraphList, pos: usize) -> Self {
        let pos = pos.min(list.visible_len());
        let paragraph = list.find_by_position(pos);
        Self {
            paragraph,
            column: pos - list[paragraph].position_offset(),
        }
    }

    /// Places a cursor at a pixel point, snapping to the nearest column on
    /// the line under `y`. Points past either end clamp inward.
    pub fn from_point(list: &ParagraphList, x: f32, y: f32) -> Self {
        let paragraph = list.find_on_screen(y.max(0.0));
        let p = &list[paragraph];
        let line = (((y - p.top()) / list.line_height()).floor().max(0.0) as usize)
            .min(p.line_count() - 1);
        Self {
            paragraph,
            column: p.position_at_line_width(line, x.max(0.0) as u32),
        }
    }

    /// The caret cell in document pixels. `sentinel_advance` supplies the
    /// cell width when the cursor sits on a zero-width sentinel.
    pub fn rect(self, list: &ParagraphList, sentinel_advance: u32) -> Rect {
        let p = &list[self.paragraph];
        let (line, _, x) = p.position_at_index(self.column);
        let advance = p
            .glyphs()
            .get(self.column)
            .map_or(0, |g| g.advance);
        let line_height = list.line_height();
        Rect {
            x: x as f32,
            y: p.top() + line as f32 * line_height,
            width: if advance == 0 { sentinel_advance } else { advance } as f32,
            height: line_height,
        }
    }

    /// Re-anchors the cursor after the list shrank underneath it.
    pub fn clamp(&mut self, list: &ParagraphList) {
        if self.paragraph >= list.len() {
            self.paragraph = list.len() - 1;
        }
        self.column = self.column.min(list[self.paragraph].visible_len());
    }
}
