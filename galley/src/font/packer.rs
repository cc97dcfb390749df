// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shelf-based rectangle packing for atlas pages.

/// Padding in pixels kept around every packed rectangle so that bilinear
/// sampling of one glyph never bleeds into its neighbors.
pub const PADDING: u32 = 2;

/// A greedy shelf packer for a fixed-size square page.
///
/// Rectangles are placed left to right along the current shelf; when a
/// rectangle no longer fits, the packer advances to a fresh shelf below the
/// tallest rectangle of the current one. Placements are permanent: glyphs are
/// packed once per font lifetime and never reclaimed, so there is no free
/// list and no compaction.
#[derive(Clone, Debug)]
pub struct ShelfPacker {
    size: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    /// Creates an empty packer for a `size` x `size` page.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
        }
    }

    /// The page edge length this packer allocates within.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Attempts to allocate a `width` x `height` rectangle.
    ///
    /// Returns the top-left corner of the placed rectangle, or `None` when
    /// the page is exhausted and the caller should open a new page. A request
    /// wider than the page can never succeed and fails immediately.
    pub fn try_pack(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width + PADDING > self.size {
            return None;
        }
        if self.cursor_x + width + PADDING > self.size {
            // Advance to a new shelf below the tallest entry of this one.
            self.cursor_y += self.row_height + PADDING;
            self.cursor_x = 0;
            self.row_height = 0;
        }
        if self.cursor_y + height + PADDING > self.size {
            return None;
        }
        let origin = (self.cursor_x, self.cursor_y);
        self.cursor_x += width + PADDING;
        self.row_height = self.row_height.max(height);
        Some(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_rows_left_to_right() {
        let mut packer = ShelfPacker::new(64);
        assert_eq!(packer.try_pack(30, 30), Some((0, 0)));
        assert_eq!(packer.try_pack(30, 30), Some((32, 0)));
        // Third request exceeds the page width and starts a new shelf.
        assert_eq!(packer.try_pack(30, 30), Some((0, 32)));
        assert_eq!(packer.try_pack(30, 30), Some((32, 32)));
        // Page height is exhausted.
        assert_eq!(packer.try_pack(30, 30), None);
    }

    #[test]
    fn rejects_wider_than_page() {
        let mut packer = ShelfPacker::new(64);
        assert_eq!(packer.try_pack(63, 8), None);
        // The failed request must not disturb packer state.
        assert_eq!(packer.try_pack(30, 8), Some((0, 0)));
    }

    #[test]
    fn placements_are_disjoint_and_in_bounds() {
        let mut packer = ShelfPacker::new(128);
        let mut rects: Vec<(u32, u32, u32, u32)> = Vec::new();
        let sizes = [(10, 12), (30, 7), (5, 20), (40, 9), (16, 16), (25, 3)];
        for &(w, h) in sizes.iter().cycle().take(40) {
            let Some((x, y)) = packer.try_pack(w, h) else {
                break;
            };
            assert!(x + w <= 128 && y + h <= 128, "placement out of bounds");
            for &(ox, oy, ow, oh) in &rects {
                let disjoint = x + w + PADDING <= ox
                    || ox + ow + PADDING <= x
                    || y + h + PADDING <= oy
                    || oy + oh + PADDING <= y;
                assert!(disjoint, "({x},{y},{w},{h}) overlaps ({ox},{oy},{ow},{oh})");
            }
            rects.push((x, y, w, h));
        }
        assert!(rects.len() > 10, "packer gave up far too early");
    }
}
