// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered paragraph collection and its layout pass.

use crate::font::{GlyphChar, GlyphProvider, END_OF_TEXT, PARAGRAPH_BREAK};

use super::paragraph::Paragraph;

/// Paragraphs scanned unconditionally before the layout pass may take its
/// early exit.
pub(crate) const MIN_SCAN: usize = 8;

/// An ordered collection of paragraphs with document-wide bookkeeping.
///
/// Ordering is document order, equivalently ascending `top` and ascending
/// `position_offset`. After a layout pass the offsets are contiguous:
/// each paragraph starts where the previous one ends, both vertically and
/// in absolute glyph positions. Between an edit and the next pass these
/// invariants may be transiently violated.
#[derive(Clone, Debug)]
pub struct ParagraphList {
    paragraphs: Vec<Paragraph>,
    line_height: f32,
    /// Whether the last layout pass reached the end of the list. Only then
    /// do the stored suffix offsets prove anything, so the incremental
    /// pass may not take its early exit while this is false.
    fully_laid_out: bool,
}

impl ParagraphList {
    /// An empty document: a single paragraph holding only the end-of-text
    /// sentinel.
    pub fn new(line_height: f32) -> Self {
        Self {
            paragraphs: vec![Paragraph::empty(END_OF_TEXT)],
            line_height,
            fully_laid_out: false,
        }
    }

    /// Parses source text into paragraphs, one per line. CR and CRLF line
    /// endings normalize to the internal paragraph break.
    pub fn from_text(text: &str, provider: &dyn GlyphProvider) -> Self {
        let mut segments = glyph_segments(text, provider);
        if let Some(last) = segments.last_mut() {
            last.push(GlyphChar::terminator(END_OF_TEXT));
        }
        Self {
            paragraphs: segments.into_iter().map(Paragraph::new).collect(),
            line_height: provider.line_height(),
            fully_laid_out: false,
        }
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Always false: a document holds at least its end-of-text paragraph.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn get(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Paragraph> {
        self.paragraphs.iter()
    }

    fn last(&self) -> &Paragraph {
        // The list is never empty by construction.
        &self.paragraphs[self.paragraphs.len() - 1]
    }

    /// Total glyph count including sentinels, valid after layout.
    pub fn total_len(&self) -> usize {
        let last = self.last();
        last.position_offset + last.len()
    }

    /// Total character count excluding the end-of-text sentinel.
    pub fn visible_len(&self) -> usize {
        self.total_len() - 1
    }

    /// Total pixel height, valid after layout.
    pub fn total_height(&self) -> f32 {
        let last = self.last();
        last.top + last.height(self.line_height)
    }

    /// Total wrapped line count, valid after layout.
    pub fn total_lines(&self) -> usize {
        let last = self.last();
        last.line_offset + last.line_count()
    }

    /// Index of the paragraph containing the absolute position `pos`.
    ///
    /// Binary search over `position_offset`; callers must only use this
    /// after a layout pass, when the ordering invariant holds.
    pub fn find_by_position(&self, pos: usize) -> usize {
        let index = self
            .paragraphs
            .partition_point(|p| p.position_offset + p.len() <= pos);
        index.min(self.paragraphs.len() - 1)
    }

    /// Index of the paragraph covering the vertical coordinate `y`.
    pub fn find_on_screen(&self, y: f32) -> usize {
        let index = self
            .paragraphs
            .partition_point(|p| p.top + p.height(self.line_height) <= y);
        index.min(self.paragraphs.len() - 1)
    }

    /// Index of the paragraph containing the document-absolute line index.
    pub fn find_by_line(&self, line: usize) -> usize {
        let index = self
            .paragraphs
            .partition_point(|p| p.line_offset + p.line_count() <= line);
        index.min(self.paragraphs.len() - 1)
    }

    /// Reconstructs the document text with normalized line breaks.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.total_len());
        for paragraph in &self.paragraphs {
            paragraph.write_text(&mut out);
        }
        out
    }

    /// Extracts up to `len` characters starting at the absolute position
    /// `start`, both clamped to the document.
    pub fn text_range(&self, start: usize, len: usize) -> String {
        let visible = self.visible_len();
        let start = start.min(visible);
        let len = len.min(visible - start);
        if len == 0 {
            return String::new();
        }
        let mut out = String::with_capacity(len);
        let mut remaining = len;
        let mut index = self.find_by_position(start);
        let mut column = start - self.paragraphs[index].position_offset;
        while remaining > 0 && index < self.paragraphs.len() {
            let paragraph = &self.paragraphs[index];
            for glyph in &paragraph.glyphs()[column..] {
                if remaining == 0 || glyph.is_end_of_text() {
                    break;
                }
                out.push(if glyph.is_paragraph_break() {
                    PARAGRAPH_BREAK
                } else {
                    glyph.ch
                });
                remaining -= 1;
            }
            column = 0;
            index += 1;
        }
        out
    }

    /// Replaces paragraphs `[start, end)` with `pieces`.
    pub(crate) fn splice(
        &mut self,
        start: usize,
        end: usize,
        pieces: impl IntoIterator<Item = Paragraph>,
    ) {
        self.paragraphs.splice(start..end, pieces);
        debug_assert!(!self.paragraphs.is_empty());
    }

    pub(crate) fn take(&mut self, index: usize) -> Paragraph {
        self.paragraphs.remove(index)
    }

    /// The incremental layout pass: forward scan from `start_index`
    /// recomputing tops, line offsets and position offsets, wrapping any
    /// paragraph whose cached breaks are stale.
    ///
    /// Returns `None` when the pass completed, or `Some(resume_index)`
    /// when `max_rows` paragraphs were processed first; the caller resumes
    /// from that index (or hands the remainder to the background worker).
    ///
    /// Once `MIN_SCAN` paragraphs have been examined, a clean paragraph
    /// whose stored offsets already match the running values proves the
    /// whole suffix unaffected and the pass stops early. Stored offsets
    /// are only trustworthy when some previous pass reached the end of
    /// the list, so the early exit is disabled after a bounded pass left
    /// the tail stale.
    pub(crate) fn relayout_from(
        &mut self,
        start_index: usize,
        break_width: u32,
        max_rows: Option<usize>,
    ) -> Option<usize> {
        let start_index = start_index.min(self.paragraphs.len());
        let (mut top, mut line_offset, mut position) = if start_index == 0 {
            (0.0, 0, 0)
        } else {
            let prev = &self.paragraphs[start_index - 1];
            (
                prev.top + prev.height(self.line_height),
                prev.line_offset + prev.line_count(),
                prev.position_offset + prev.len(),
            )
        };

        let suffix_trusted = self.fully_laid_out;
        let mut scanned = 0usize;
        for index in start_index..self.paragraphs.len() {
            let paragraph = &mut self.paragraphs[index];
            if scanned >= MIN_SCAN
                && suffix_trusted
                && paragraph.wrapped_at(break_width)
                && paragraph.top == top
                && paragraph.line_offset == line_offset
                && paragraph.position_offset == position
            {
                // The suffix already agrees with the running values.
                return None;
            }
            if max_rows.is_some_and(|max| scanned >= max) {
                self.fully_laid_out = false;
                return Some(index);
            }
            paragraph.word_wrap(break_width);
            paragraph.top = top;
            paragraph.line_offset = line_offset;
            paragraph.position_offset = position;
            top += paragraph.height(self.line_height);
            line_offset += paragraph.line_count();
            position += paragraph.len();
            scanned += 1;
        }
        self.fully_laid_out = true;
        None
    }
}

impl core::ops::Index<usize> for ParagraphList {
    type Output = Paragraph;

    fn index(&self, index: usize) -> &Paragraph {
        &self.paragraphs[index]
    }
}

impl core::ops::IndexMut<usize> for ParagraphList {
    fn index_mut(&mut self, index: usize) -> &mut Paragraph {
        &mut self.paragraphs[index]
    }
}

/// Splits text into glyph-char segments on line breaks, resolving glyphs
/// through `provider`. Every segment except the last ends with a
/// paragraph-break sentinel; CRLF and lone CR normalize to one break.
pub(crate) fn glyph_segments(
    text: &str,
    provider: &dyn GlyphProvider,
) -> Vec<Vec<GlyphChar>> {
    let mut segments: Vec<Vec<GlyphChar>> = vec![Vec::new()];
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let ch = if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            PARAGRAPH_BREAK
        } else {
            ch
        };
        if ch == PARAGRAPH_BREAK {
            if let Some(last) = segments.last_mut() {
                last.push(GlyphChar::terminator(PARAGRAPH_BREAK));
            }
            segments.push(Vec::new());
        } else if let Some(last) = segments.last_mut() {
            last.push(provider.glyph_char(ch));
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TenPx;

    impl GlyphProvider for TenPx {
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

    #[test]
    fn two_line_document_splits_into_two_paragraphs() {
        let list = ParagraphList::from_text("Hello\nWorld", &TenPx);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().len(), 6); // "Hello" + '\n'
        assert_eq!(list.get(1).unwrap().len(), 6); // "World" + end of text
        let mut list = list;
        list.relayout_from(0, 0, None);
        assert_eq!(list.visible_len(), 11);
    }

    #[test]
    fn text_round_trips_with_normalized_breaks() {
        let list = ParagraphList::from_text("a\r\nb\rc\nlast", &TenPx);
        assert_eq!(list.len(), 4);
        assert_eq!(list.text(), "a\nb\nc\nlast");
    }

    #[test]
    fn trailing_newline_yields_empty_final_paragraph() {
        let list = ParagraphList::from_text("one\n", &TenPx);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().len(), 1);
        assert_eq!(list.text(), "one\n");
    }

    #[test]
    fn layout_makes_offsets_contiguous() {
        let mut list = ParagraphList::from_text("aa\nbbbb\nc\n\ndddddd", &TenPx);
        list.relayout_from(0, 30, None);
        let mut top = 0.0;
        let mut position = 0;
        let mut line = 0;
        for paragraph in list.iter() {
            assert_eq!(paragraph.top(), top);
            assert_eq!(paragraph.position_offset(), position);
            assert_eq!(paragraph.line_offset(), line);
            top += paragraph.height(16.0);
            position += paragraph.len();
            line += paragraph.line_count();
        }
    }

    #[test]
    fn binary_searches_agree_with_linear_scan() {
        let mut list = ParagraphList::from_text("aaa\nbb\n\ncccc\ndd", &TenPx);
        list.relayout_from(0, 0, None);
        for pos in 0..list.total_len() {
            let index = list.find_by_position(pos);
            let p = list.get(index).unwrap();
            assert!(
                p.position_offset() <= pos && pos < p.position_offset() + p.len(),
                "position {pos} resolved to the wrong paragraph"
            );
        }
        let index = list.find_on_screen(16.0 * 3.0 + 1.0);
        assert_eq!(index, 3);
        assert_eq!(list.find_by_line(2), 2);
    }

    #[test]
    fn partial_relayout_fixes_the_suffix() {
        let text = (0..30).map(|i| format!("row {i}")).collect::<Vec<_>>();
        let mut list = ParagraphList::from_text(&text.join("\n"), &TenPx);
        list.relayout_from(0, 0, None);

        let edit_at = 12;
        list.get_mut(edit_at).unwrap().append_char(GlyphChar {
            ch: 'x',
            glyph_id: b'x' as u16,
            advance: 10,
        });
        assert!(list.relayout_from(edit_at, 0, None).is_none());

        let mut reference = list.clone();
        reference.relayout_from(0, 0, None);
        for (a, b) in list.iter().zip(reference.iter()) {
            assert_eq!(a.position_offset(), b.position_offset());
            assert_eq!(a.top(), b.top());
            assert_eq!(a.line_offset(), b.line_offset());
        }
    }

    #[test]
    fn bounded_pass_reports_its_resume_index() {
        let text = (0..40).map(|i| format!("row {i}")).collect::<Vec<_>>();
        let mut list = ParagraphList::from_text(&text.join("\n"), &TenPx);
        assert_eq!(list.relayout_from(0, 0, Some(10)), Some(10));
        assert_eq!(list.relayout_from(10, 0, Some(10)), Some(20));
        assert!(list.relayout_from(20, 0, None).is_none());
    }

    #[test]
    fn full_pass_after_bounded_pass_reaches_the_tail() {
        let text = (0..40).map(|i| format!("row {i}")).collect::<Vec<_>>();
        let mut list = ParagraphList::from_text(&text.join("\n"), &TenPx);
        // A bounded pass leaves the tail stale; the clean prefix must not
        // trick the next full pass into stopping early.
        assert_eq!(list.relayout_from(0, 0, Some(10)), Some(10));
        assert!(list.relayout_from(0, 0, None).is_none());

        let mut top = 0.0;
        let mut position = 0;
        for paragraph in list.iter() {
            assert_eq!(paragraph.top(), top);
            assert_eq!(paragraph.position_offset(), position);
            top += paragraph.height(16.0);
            position += paragraph.len();
        }
        assert_eq!(list[39].top(), 39.0 * 16.0);
    }
}
