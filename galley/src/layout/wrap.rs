// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy break-position computation.
//!
//! One forward pass, no backtracking: the most recent break opportunity is
//! remembered and committed when the running width overflows, which keeps
//! re-wrap linear in the paragraph length at the cost of never producing a
//! globally optimal (minimal-raggedness) result.

use smallvec::SmallVec;

use crate::font::GlyphChar;

/// Sorted offsets of line starts within a paragraph.
pub type BreakList = SmallVec<[u32; 8]>;

/// Characters a line may be broken after.
pub(crate) fn is_break_char(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '-' | ',' | '.' | ';' | ':' | '!' | '?')
}

fn is_soft_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// Computes line-start offsets for `glyphs` wrapped at `break_width` pixels,
/// returning the breaks and the width of the widest resulting line.
///
/// A break opportunity is a break character followed by non-whitespace; when
/// the running width overflows, the latest opportunity after the previous
/// break wins, and with no such opportunity the line is force-broken before
/// the current glyph (a word longer than the line overflows visually rather
/// than hyphenating). `break_width == 0` disables wrapping.
pub(crate) fn compute_breaks(glyphs: &[GlyphChar], break_width: u32) -> (BreakList, u32) {
    let mut breaks = BreakList::new();
    let total: u32 = glyphs.iter().map(|g| g.advance).sum();
    if break_width == 0 || glyphs.is_empty() {
        return (breaks, total);
    }

    let mut cum = 0u32; // width of glyphs [0, i]
    let mut line_start_cum = 0u32; // value of `cum` at the current line start
    // Latest break opportunity: (line-start offset, `cum` at that offset).
    let mut candidate: Option<(u32, u32)> = None;
    let mut max_width = 0u32;

    let count = glyphs.len();
    for (i, glyph) in glyphs.iter().enumerate() {
        if is_break_char(glyph.ch)
            && i + 1 < count
            && !is_soft_whitespace(glyphs[i + 1].ch)
        {
            candidate = Some((i as u32 + 1, cum + glyph.advance));
        }
        cum += glyph.advance;
        if cum - line_start_cum > break_width && i + 1 < count {
            let previous = breaks.last().copied().unwrap_or(0);
            let (position, position_cum) = match candidate {
                Some((position, c)) if position > previous => (position, c),
                // Word too long for the line: force a break at this glyph.
                _ if i as u32 > previous => (i as u32, cum - glyph.advance),
                // A single glyph wider than the line cannot be broken.
                _ => continue,
            };
            max_width = max_width.max(position_cum - line_start_cum);
            breaks.push(position);
            line_start_cum = position_cum;
            candidate = None;
        }
    }
    max_width = max_width.max(cum - line_start_cum);
    (breaks, max_width)
}

/// Widest line and line count for `glyphs` wrapped at `break_width`, for
/// measurement paths that never build a paragraph.
pub(crate) fn wrapped_extent(glyphs: &[GlyphChar], break_width: u32) -> (u32, usize) {
    let (breaks, width) = compute_breaks(glyphs, break_width);
    (width, breaks.len() + 1)
}
