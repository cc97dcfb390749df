// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph atlas textures: fixed-size pages packed by a [`ShelfPacker`] and
//! grouped so that overflowing one page transparently opens the next.
//!
//! Textures here are CPU-side alpha bitmaps. Render backends watch the
//! [`AtlasTexture::epoch`] counter and re-upload a texture whenever it has
//! advanced since the last frame.

use core::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};

use super::packer::{ShelfPacker, PADDING};

/// Edge length of a full-size atlas page.
pub const ATLAS_PAGE_SIZE: u32 = 1024;

/// Opaque identifier of one texture, unique within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value, for render backends that key caches by texture.
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// A CPU-side alpha8 texture.
#[derive(Clone, Debug)]
pub struct AtlasTexture {
    id: TextureId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    epoch: u64,
}

impl AtlasTexture {
    /// Creates a zero-filled texture.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: TextureId::next(),
            width,
            height,
            pixels: vec![0; (width * height) as usize],
            epoch: 0,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major alpha8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Incremented on every write; render backends re-upload when it moves.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Copies a tightly packed `width` x `height` bitmap into the texture at
    /// `(x, y)`, one row at a time.
    pub(crate) fn upload(&mut self, x: u32, y: u32, width: u32, height: u32, data: &[u8]) {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        debug_assert!(data.len() >= (width * height) as usize);
        for row in 0..height {
            let src = (row * width) as usize;
            let dst = ((y + row) * self.width + x) as usize;
            self.pixels[dst..dst + width as usize]
                .copy_from_slice(&data[src..src + width as usize]);
        }
        self.epoch += 1;
    }
}

/// One atlas page: a texture plus its packer state.
#[derive(Clone, Debug)]
pub struct AtlasPage {
    texture: AtlasTexture,
    packer: ShelfPacker,
}

impl AtlasPage {
    fn new(size: u32) -> Self {
        Self {
            texture: AtlasTexture::new(size, size),
            packer: ShelfPacker::new(size),
        }
    }

    pub fn texture(&self) -> &AtlasTexture {
        &self.texture
    }

    pub(crate) fn texture_mut(&mut self) -> &mut AtlasTexture {
        &mut self.texture
    }
}

/// A packed rectangle returned by [`AtlasGroup::try_pack`].
#[derive(Clone, Copy, Debug)]
pub struct PackedRegion {
    /// Index of the page that serviced the request.
    pub page: usize,
    pub x: u32,
    pub y: u32,
}

/// An ordered list of atlas pages owned by one font.
///
/// Packing requests go to the newest page; when it overflows, a fresh page of
/// the same size is opened and the request retried once. A request that does
/// not fit an empty page is a configuration error (the glyph is larger than
/// the atlas) and fails permanently.
#[derive(Clone, Debug)]
pub struct AtlasGroup {
    page_size: u32,
    pages: Vec<AtlasPage>,
    last_packed: usize,
}

impl AtlasGroup {
    /// Creates a group with no pages; the first page is opened on first use.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            last_packed: 0,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    /// The page that serviced the most recent successful [`Self::try_pack`],
    /// so the caller can upload pixels without a second lookup.
    pub(crate) fn last_page_mut(&mut self) -> Option<&mut AtlasPage> {
        self.pages.get_mut(self.last_packed)
    }

    /// Allocates a rectangle, opening a new page on overflow.
    pub fn try_pack(&mut self, width: u32, height: u32) -> Option<PackedRegion> {
        if width + PADDING > self.page_size || height + PADDING > self.page_size {
            warn!(
                "glyph of {width}x{height}px cannot fit a {0}x{0}px atlas page",
                self.page_size
            );
            return None;
        }
        if self.pages.is_empty() {
            self.pages.push(AtlasPage::new(self.page_size));
        }
        let page = self.pages.len() - 1;
        if let Some((x, y)) = self.pages[page].packer.try_pack(width, height) {
            self.last_packed = page;
            return Some(PackedRegion { page, x, y });
        }
        debug!("atlas page {page} full, opening page {}", page + 1);
        self.pages.push(AtlasPage::new(self.page_size));
        let page = page + 1;
        let (x, y) = self.pages[page].packer.try_pack(width, height)?;
        self.last_packed = page;
        Some(PackedRegion { page, x, y })
    }
}

/// Smallest power of two greater than or equal to `v`, used to size
/// standalone single-glyph textures.
pub(crate) fn next_pow2(v: u32) -> u32 {
    v.max(1).next_power_of_two()
}
