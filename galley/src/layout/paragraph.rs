// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One line-broken unit of document text.

use crate::font::{GlyphChar, END_OF_TEXT, PARAGRAPH_BREAK};

use super::wrap::{compute_breaks, BreakList};

/// An ordered glyph sequence terminated by a sentinel (`'\n'` inside the
/// document, `'\0'` at its end), plus lazily recomputed line breaks.
///
/// `len` counts the sentinel; `visible_len` does not. Break positions are
/// strictly increasing line-start offsets in `(0, len)`, so `line_count`
/// is always `breaks.len() + 1`.
///
/// The `top` / `line_offset` / `position_offset` bookkeeping fields are
/// document-absolute and are maintained by the layout pass in
/// [`ParagraphList`](super::ParagraphList); they are only meaningful after
/// that pass has run.
#[derive(Clone, Debug)]
pub struct Paragraph {
    glyphs: Vec<GlyphChar>,
    breaks: BreakList,
    width: u32,
    needs_word_wrap: bool,
    wrapped_width: Option<u32>,
    pub(crate) top: f32,
    pub(crate) line_offset: usize,
    pub(crate) position_offset: usize,
}

impl Paragraph {
    /// Wraps a terminated glyph sequence into a paragraph.
    pub fn new(glyphs: Vec<GlyphChar>) -> Self {
        debug_assert!(
            glyphs.last().is_some_and(GlyphChar::is_terminator),
            "a paragraph must end with a sentinel glyph"
        );
        Self {
            glyphs,
            breaks: BreakList::new(),
            width: 0,
            needs_word_wrap: true,
            wrapped_width: None,
            top: 0.0,
            line_offset: 0,
            position_offset: 0,
        }
    }

    /// An empty paragraph holding only the given sentinel.
    pub fn empty(terminator: char) -> Self {
        Self::new(vec![GlyphChar::terminator(terminator)])
    }

    /// Number of glyphs including the terminating sentinel.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false: even an empty paragraph holds its sentinel.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of glyphs excluding the terminating sentinel.
    pub fn visible_len(&self) -> usize {
        self.glyphs.len() - 1
    }

    pub fn glyphs(&self) -> &[GlyphChar] {
        &self.glyphs
    }

    /// The terminating sentinel glyph.
    pub fn terminator(&self) -> GlyphChar {
        self.glyphs[self.glyphs.len() - 1]
    }

    /// Whether this paragraph ends the document.
    pub fn is_last(&self) -> bool {
        self.terminator().is_end_of_text()
    }

    pub fn line_count(&self) -> usize {
        self.breaks.len() + 1
    }

    /// Line-start offsets within the paragraph, valid after a wrap.
    pub fn breaks(&self) -> &[u32] {
        &self.breaks
    }

    /// Width of the widest line, valid after a wrap.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self, line_height: f32) -> f32 {
        self.line_count() as f32 * line_height
    }

    /// Document-absolute top edge, maintained by the layout pass.
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Document-absolute index of this paragraph's first line.
    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// Document-absolute offset of this paragraph's first glyph.
    pub fn position_offset(&self) -> usize {
        self.position_offset
    }

    pub fn needs_word_wrap(&self) -> bool {
        self.needs_word_wrap
    }

    /// Whether the cached breaks are valid for `break_width`.
    pub(crate) fn wrapped_at(&self, break_width: u32) -> bool {
        !self.needs_word_wrap && self.wrapped_width == Some(break_width)
    }

    /// Recomputes line breaks; a no-op when neither the content nor the
    /// break width changed since the last wrap.
    pub fn word_wrap(&mut self, break_width: u32) {
        if self.wrapped_at(break_width) {
            return;
        }
        let (breaks, width) = compute_breaks(&self.glyphs, break_width);
        self.breaks = breaks;
        self.width = width;
        self.needs_word_wrap = false;
        self.wrapped_width = Some(break_width);
    }

    /// Re-wrap at the cached width after a single-character edit. Cheap
    /// because wrapping is paragraph-local.
    fn rewrap_after_edit(&mut self) {
        self.needs_word_wrap = true;
        if let Some(width) = self.wrapped_width {
            self.word_wrap(width);
        }
    }

    /// Appends a glyph just before the sentinel.
    pub fn append_char(&mut self, glyph: GlyphChar) {
        let at = self.visible_len();
        self.glyphs.insert(at, glyph);
        self.rewrap_after_edit();
    }

    /// Inserts a glyph at `column`, clamped to the visible range.
    pub fn insert_char(&mut self, column: usize, glyph: GlyphChar) {
        let at = column.min(self.visible_len());
        self.glyphs.insert(at, glyph);
        self.rewrap_after_edit();
    }

    /// Removes the glyph at `column`; the sentinel cannot be removed.
    pub fn remove_char(&mut self, column: usize) {
        if column >= self.visible_len() {
            return;
        }
        self.glyphs.remove(column);
        self.rewrap_after_edit();
    }

    /// Removes up to `len` visible glyphs starting at `column`, clamped.
    pub fn remove_range(&mut self, column: usize, len: usize) {
        let start = column.min(self.visible_len());
        let end = start.saturating_add(len).min(self.visible_len());
        if start == end {
            return;
        }
        self.glyphs.drain(start..end);
        self.needs_word_wrap = true;
    }

    /// Splits at `column`: the returned paragraph takes the glyphs from
    /// `column` on, including this paragraph's sentinel, while this one is
    /// re-terminated with a paragraph break.
    pub fn split_off(&mut self, column: usize) -> Self {
        let column = column.min(self.visible_len());
        let tail = self.glyphs.split_off(column);
        self.glyphs.push(GlyphChar::terminator(PARAGRAPH_BREAK));
        self.needs_word_wrap = true;
        Self::new(tail)
    }

    /// Joins `right` onto this paragraph, dropping this paragraph's
    /// sentinel; `right`'s sentinel terminates the result.
    pub fn merge(&mut self, right: Self) {
        self.glyphs.pop();
        self.glyphs.extend(right.into_glyphs());
        self.needs_word_wrap = true;
    }

    /// Consumes the paragraph, yielding its glyphs (sentinel included).
    pub(crate) fn into_glyphs(self) -> Vec<GlyphChar> {
        self.glyphs
    }

    /// Appends the paragraph's source text, mapping the paragraph-break
    /// sentinel to `'\n'` and eliding the end-of-text sentinel.
    pub(crate) fn write_text(&self, out: &mut String) {
        for glyph in &self.glyphs {
            if glyph.is_end_of_text() {
                break;
            }
            out.push(if glyph.is_paragraph_break() {
                PARAGRAPH_BREAK
            } else {
                glyph.ch
            });
        }
    }

    /// Index of the line containing `column`. A column equal to a break
    /// position belongs to the line the break starts.
    pub fn line_index_of(&self, column: usize) -> usize {
        self.breaks.partition_point(|&b| (b as usize) <= column)
    }

    /// Glyph range `[start, end)` of a line.
    pub fn line_span(&self, line: usize) -> (usize, usize) {
        let start = if line == 0 {
            0
        } else {
            self.breaks[line - 1] as usize
        };
        let end = self
            .breaks
            .get(line)
            .map_or(self.glyphs.len(), |&b| b as usize);
        (start, end)
    }

    /// Highest cursor column addressable on a line: the sentinel slot on
    /// the last line, the glyph before the break elsewhere.
    pub fn max_column_on_line(&self, line: usize) -> usize {
        let (_, end) = self.line_span(line);
        end - 1
    }

    /// Maps a column to `(line, column within line, pixel x)`.
    pub fn position_at_index(&self, column: usize) -> (usize, usize, u32) {
        let column = column.min(self.visible_len());
        let line = self.line_index_of(column);
        let (start, _) = self.line_span(line);
        let x = self.glyphs[start..column]
            .iter()
            .map(|g| g.advance)
            .sum();
        (line, column - start, x)
    }

    /// Maps a pixel x coordinate on a line to the nearest cursor column.
    pub fn position_at_line_width(&self, line: usize, x: u32) -> usize {
        let line = line.min(self.line_count() - 1);
        let (start, _) = self.line_span(line);
        let cap = self.max_column_on_line(line);
        let mut acc = 0u32;
        for column in start..cap {
            let advance = self.glyphs[column].advance;
            if x < acc + advance / 2 {
                return column;
            }
            acc += advance;
        }
        cap
    }
}
