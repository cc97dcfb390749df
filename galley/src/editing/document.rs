// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editable document: a paragraph list, a cursor, and the policy for
//! when layout runs synchronously versus on the re-wrap worker.

use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::font::{GlyphChar, GlyphProvider, END_OF_TEXT, PARAGRAPH_BREAK};
use crate::layout::wrap::is_break_char;
use crate::layout::{glyph_segments, Paragraph, ParagraphList, Rewrapper};
use crate::util::Rect;

use super::cursor::Cursor;

/// Paragraphs a mutation may re-lay out on the calling thread before the
/// remainder is handed to the re-wrap worker.
const MAX_SYNC_ROWS: usize = 512;

/// Word movement stops at soft break characters and paragraph ends alike.
fn is_word_boundary(ch: char) -> bool {
    is_break_char(ch) || ch == PARAGRAPH_BREAK || ch == END_OF_TEXT
}

/// A shared, read-only view of the latest published layout.
///
/// Renderers on other threads hold a clone and call [`get`](Self::get) each
/// frame; the document publishes a new `Arc` after every mutation, so readers
/// never observe a half-edited list.
#[derive(Clone)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Arc<ParagraphList>>>,
}

impl core::fmt::Debug for SnapshotHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnapshotHandle")
            .field("paragraphs", &self.get().len())
            .finish()
    }
}

impl SnapshotHandle {
    fn new(list: Arc<ParagraphList>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(list)),
        }
    }

    /// The most recently published layout.
    pub fn get(&self) -> Arc<ParagraphList> {
        self.inner.read().clone()
    }

    fn publish(&self, list: Arc<ParagraphList>) {
        *self.inner.write() = list;
    }
}

/// An editable, incrementally laid out text document.
///
/// All mutation goes through the cursor or explicit ranges in absolute
/// positions. Edits re-lay out from the edited paragraph and stop as soon as
/// the suffix is provably unaffected; width changes on large documents run
/// on the [`Rewrapper`] worker instead, and [`poll_rewrap`](Self::poll_rewrap)
/// adopts the result once it lands.
pub struct Document {
    provider: Arc<dyn GlyphProvider>,
    list: Arc<ParagraphList>,
    break_width: u32,
    cursor: Cursor,
    preferred_column: Option<usize>,
    rewrapper: Rewrapper,
    pending_rewrap: bool,
    snapshot: SnapshotHandle,
}

impl Document {
    /// An empty document wrapped at `break_width` pixels (0 disables
    /// wrapping).
    pub fn new(provider: Arc<dyn GlyphProvider>, break_width: u32) -> Self {
        let list = Arc::new(ParagraphList::new(provider.line_height()));
        let snapshot = SnapshotHandle::new(list.clone());
        Self {
            provider,
            list,
            break_width,
            cursor: Cursor::default(),
            preferred_column: None,
            rewrapper: Rewrapper::new(),
            pending_rewrap: false,
            snapshot,
        }
    }

    /// Replaces the whole document with `text` and homes the cursor.
    pub fn load_text(&mut self, text: &str) {
        self.list = Arc::new(ParagraphList::from_text(text, self.provider.as_ref()));
        self.cursor = Cursor::default();
        self.preferred_column = None;
        self.relayout(0);
    }

    pub fn list(&self) -> &ParagraphList {
        &self.list
    }

    /// A handle renderers can clone to read published layouts from other
    /// threads.
    pub fn snapshot(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    pub fn break_width(&self) -> u32 {
        self.break_width
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn cursor_abs_position(&self) -> usize {
        self.cursor.to_abs_position(&self.list)
    }

    /// The caret cell in document pixels.
    pub fn cursor_rectangle(&self) -> Rect {
        let space = self.provider.glyph_char(' ').advance;
        self.cursor.rect(&self.list, space)
    }

    pub fn text(&self) -> String {
        self.list.text()
    }

    /// Extracts up to `len` characters starting at absolute position
    /// `start`, clamped to the document.
    pub fn get_char_range(&self, start: usize, len: usize) -> String {
        self.list.text_range(start, len)
    }

    /// Inserts `text` at the cursor and moves the cursor past it. Line
    /// breaks in `text` split the paragraph.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let index = self.cursor.paragraph;
        let abs = self.cursor.to_abs_position(&self.list);
        let mut segments = glyph_segments(text, self.provider.as_ref());
        let inserted: usize = segments.iter().map(Vec::len).sum();

        let list = Arc::make_mut(&mut self.list);
        let mut first = list.take(index);
        let tail = first.split_off(self.cursor.column);

        // The final segment carries no sentinel of its own; it continues
        // into the split-off tail.
        let last_piece = {
            let mut glyphs = segments.pop().unwrap_or_default();
            glyphs.push(GlyphChar::terminator(PARAGRAPH_BREAK));
            let mut piece = Paragraph::new(glyphs);
            piece.merge(tail);
            piece
        };

        let mut pieces = Vec::with_capacity(segments.len() + 1);
        let mut middle = segments.into_iter().map(Paragraph::new);
        if let Some(second) = middle.next() {
            first.merge(second);
            pieces.push(first);
            pieces.extend(middle);
            pieces.push(last_piece);
        } else {
            first.merge(last_piece);
            pieces.push(first);
        }
        list.splice(index, index, pieces);

        self.after_edit(index);
        self.set_cursor_abs_position(abs + inserted);
    }

    /// Inserts a single character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        let mut buffer = [0_u8; 4];
        self.insert_text(ch.encode_utf8(&mut buffer));
    }

    /// Deletes up to `len` characters starting at absolute position
    /// `start`, clamped to the document. Deleting across a paragraph break
    /// joins the surrounding paragraphs.
    pub fn delete_range(&mut self, start: usize, len: usize) {
        let visible = self.list.visible_len();
        let start = start.min(visible);
        let len = len.min(visible - start);
        if len == 0 {
            return;
        }
        let first = self.list.find_by_position(start);
        let last = self.list.find_by_position(start + len);
        let local_start = start - self.list[first].position_offset();

        let list = Arc::make_mut(&mut self.list);
        if first == last {
            list[first].remove_range(local_start, len);
        } else {
            let local_end = start + len - list[last].position_offset();
            let mut trailing = list.take(last);
            trailing.remove_range(0, local_end);
            list.splice(first + 1, last, []);
            let lead = &mut list[first];
            lead.remove_range(local_start, usize::MAX);
            lead.merge(trailing);
        }

        self.after_edit(first);
        self.set_cursor_abs_position(start);
    }

    /// Deletes the character before the cursor.
    pub fn delete_backward(&mut self) {
        let abs = self.cursor_abs_position();
        if abs > 0 {
            self.delete_range(abs - 1, 1);
        }
    }

    /// Deletes the character under the cursor.
    pub fn delete_forward(&mut self) {
        self.delete_range(self.cursor_abs_position(), 1);
    }

    /// Changes the wrap width. Small documents re-wrap before returning;
    /// large ones re-wrap a leading window synchronously and finish on the
    /// worker.
    pub fn set_break_width(&mut self, break_width: u32) {
        if break_width == self.break_width {
            return;
        }
        self.break_width = break_width;
        self.relayout(0);
    }

    /// Adopts a finished background re-wrap, if one is waiting. Returns
    /// whether the layout changed.
    pub fn poll_rewrap(&mut self) -> bool {
        let Some((list, break_width)) = self.rewrapper.poll() else {
            return false;
        };
        // A result can legally arrive after a synchronous relayout already
        // settled the document; it describes content that no longer exists.
        if !self.pending_rewrap || break_width != self.break_width {
            return false;
        }
        let abs = self.cursor_abs_position();
        self.list = Arc::new(list);
        self.pending_rewrap = false;
        self.cursor = Cursor::from_abs_position(&self.list, abs);
        self.snapshot.publish(self.list.clone());
        debug!("adopted background rewrap at width {break_width}");
        true
    }

    /// Whether a background re-wrap is still outstanding.
    pub fn rewrap_pending(&self) -> bool {
        self.pending_rewrap
    }

    /// Places the cursor at the column nearest a pixel point.
    pub fn set_cursor_position(&mut self, x: f32, y: f32) {
        self.cursor = Cursor::from_point(&self.list, x, y);
        self.preferred_column = None;
    }

    /// Places the cursor at an absolute position, clamped to the document.
    pub fn set_cursor_abs_position(&mut self, pos: usize) {
        self.cursor = Cursor::from_abs_position(&self.list, pos);
        self.preferred_column = None;
    }

    pub fn move_left(&mut self) {
        let abs = self.cursor_abs_position();
        self.set_cursor_abs_position(abs.saturating_sub(1));
    }

    pub fn move_right(&mut self) {
        let abs = self.cursor_abs_position();
        self.set_cursor_abs_position(abs + 1);
    }

    pub fn move_up(&mut self) {
        self.move_vertical(-1);
    }

    pub fn move_down(&mut self) {
        self.move_vertical(1);
    }

    pub fn page_up(&mut self, lines: usize) {
        self.move_vertical(-(lines as isize));
    }

    pub fn page_down(&mut self, lines: usize) {
        self.move_vertical(lines as isize);
    }

    /// Moves to the start of the next word, or the end of the document.
    pub fn move_word_right(&mut self) {
        let visible = self.list.visible_len();
        let mut abs = self.cursor_abs_position();
        while abs < visible && !is_word_boundary(self.glyph_ch(abs)) {
            abs += 1;
        }
        while abs < visible && is_word_boundary(self.glyph_ch(abs)) {
            abs += 1;
        }
        self.set_cursor_abs_position(abs);
    }

    /// Moves to the start of the previous word.
    pub fn move_word_left(&mut self) {
        let mut abs = self.cursor_abs_position();
        while abs > 0 && is_word_boundary(self.glyph_ch(abs - 1)) {
            abs -= 1;
        }
        while abs > 0 && !is_word_boundary(self.glyph_ch(abs - 1)) {
            abs -= 1;
        }
        self.set_cursor_abs_position(abs);
    }

    /// Moves to the first column of the current visual line.
    pub fn move_home(&mut self) {
        let p = &self.list[self.cursor.paragraph];
        let (line, _, _) = p.position_at_index(self.cursor.column);
        let (start, _) = p.line_span(line);
        self.cursor.column = start;
        self.preferred_column = None;
    }

    /// Moves to the last column of the current visual line.
    pub fn move_end(&mut self) {
        let p = &self.list[self.cursor.paragraph];
        let (line, _, _) = p.position_at_index(self.cursor.column);
        self.cursor.column = p.max_column_on_line(line);
        self.preferred_column = None;
    }

    fn glyph_ch(&self, abs: usize) -> char {
        let index = self.list.find_by_position(abs);
        let p = &self.list[index];
        p.glyphs()[abs - p.position_offset()].ch
    }

    /// Vertical movement keeps the column-within-line of the first move in
    /// the run, so traversing a short line does not lose the column.
    fn move_vertical(&mut self, delta: isize) {
        let p = &self.list[self.cursor.paragraph];
        let (line, column_in_line, _) = p.position_at_index(self.cursor.column);
        let abs_line = p.line_offset() + line;
        let last_line = self.list.total_lines() - 1;
        let target = abs_line
            .saturating_add_signed(delta)
            .min(last_line);
        if target == abs_line {
            return;
        }
        let preferred = *self.preferred_column.get_or_insert(column_in_line);
        let paragraph = self.list.find_by_line(target);
        let tp = &self.list[paragraph];
        let local_line = target - tp.line_offset();
        let (start, _) = tp.line_span(local_line);
        let column = (start + preferred).min(tp.max_column_on_line(local_line));
        self.cursor = Cursor { paragraph, column };
    }

    /// Lays out from `start_index` after a content edit. The synchronous
    /// pass is always bounded so a keystroke never scans a whole large
    /// document; an unfinished remainder goes to the worker, and a
    /// finished one retires any worker that was still in flight.
    fn after_edit(&mut self, start_index: usize) {
        // While a rewrap is pending the tail offsets are stale, so running
        // values seeded from an arbitrary start index cannot be trusted;
        // restart from the head in that case.
        let start_index = if self.pending_rewrap { 0 } else { start_index };
        let list = Arc::make_mut(&mut self.list);
        let finished = list
            .relayout_from(start_index, self.break_width, Some(MAX_SYNC_ROWS))
            .is_none();
        if finished {
            if self.pending_rewrap {
                self.rewrapper.cancel();
                self.pending_rewrap = false;
            }
        } else {
            self.pending_rewrap = true;
            self.rewrapper
                .request(self.list.as_ref().clone(), self.break_width);
        }
        self.snapshot.publish(self.list.clone());
    }

    /// Full layout, synchronous only for documents the UI thread can
    /// afford to wait on.
    fn relayout(&mut self, start_index: usize) {
        let list = Arc::make_mut(&mut self.list);
        if list.len() <= MAX_SYNC_ROWS {
            list.relayout_from(start_index, self.break_width, None);
            if self.pending_rewrap {
                // An in-flight pass describes content this relayout just
                // replaced; retire it before it can be adopted.
                self.rewrapper.cancel();
                self.pending_rewrap = false;
            }
        } else {
            list.relayout_from(start_index, self.break_width, Some(MAX_SYNC_ROWS));
            self.pending_rewrap = true;
            self.rewrapper
                .request(self.list.as_ref().clone(), self.break_width);
        }
        self.cursor.clamp(&self.list);
        self.snapshot.publish(self.list.clone());
    }
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Document")
            .field("paragraphs", &self.list.len())
            .field("break_width", &self.break_width)
            .field("cursor", &self.cursor)
            .field("pending_rewrap", &self.pending_rewrap)
            .finish_non_exhaustive()
    }
}
