// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font loading, shaping, rasterization and the per-font glyph cache.
//!
//! A [`Font`] owns its bytes (shared via [`Blob`]), its scaled metrics, an
//! optional [`AtlasGroup`] of glyph textures and two glyph caches: one keyed
//! by glyph index (canonical, deduplicating glyphs shared by several
//! characters) and one keyed by character (the fast path for simple
//! lookups). Shaping goes through swash's [`ShapeContext`] and outline
//! rendering through its [`ScaleContext`]; both are owned per font so there
//! is no process-wide library handle.

pub mod atlas;
pub mod glyph;
pub mod packer;

use std::path::Path;
use std::sync::Arc;

use hashbrown::HashMap;
use log::warn;
use parking_lot::{Mutex, RwLock};
use peniko::Blob;
use swash::scale::{Render, ScaleContext, Source};
use swash::shape::ShapeContext;
use swash::zeno::Format;
use swash::{CacheKey, FontRef};
use thiserror::Error;

pub use atlas::{AtlasGroup, AtlasPage, AtlasTexture, PackedRegion, TextureId, ATLAS_PAGE_SIZE};
pub use glyph::{
    GlyphChar, GlyphFilter, GlyphId, GlyphInfo, GlyphProvider, UvRect, END_OF_TEXT,
    PARAGRAPH_BREAK,
};

use atlas::next_pow2;

/// Conversion from points to pixels at the 96 dpi reference resolution.
const PT_TO_PX: f32 = 96.0 / 72.0;

/// One pixel of transparent gutter kept inside every packed atlas slot so
/// that UVs can reference the bitmap without sampling a neighbor.
const GUTTER: u32 = 1;

/// A font could not be loaded.
///
/// This is the only hard error the font layer surfaces; everything past
/// loading degrades to placeholder glyphs instead of failing.
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("font data could not be parsed")]
    Parse,
}

/// Configuration consumed once at font load time.
#[derive(Clone, Debug)]
pub struct FontOptions {
    /// Requested size in typographic points.
    pub size_pt: f32,
    /// UI scale (dpi) factor applied on top of the point size.
    pub scale_factor: f32,
    /// Which glyphs to rasterize eagerly.
    pub filter: GlyphFilter,
    /// Extra vertical offset applied by consumers when drawing runs.
    pub y_offset: f32,
    /// Multiplier applied to the font's natural line height.
    pub line_spacing: f32,
    /// Tag of the font consulted by consumers when a glyph is missing here.
    pub fallback: Option<String>,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            size_pt: 14.0,
            scale_factor: 1.0,
            filter: GlyphFilter::ALL,
            y_offset: 0.0,
            line_spacing: 1.0,
            fallback: None,
        }
    }
}

/// Vertical metrics scaled to the font's pixel size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub leading: f32,
    /// `(ascent + descent + leading) * line_spacing`.
    pub line_height: f32,
}

/// One positioned glyph produced by shaping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: GlyphId,
    pub x_offset: f32,
    pub y_offset: f32,
    pub advance: f32,
    /// Byte offset of the source character cluster within the shaped string.
    pub cluster: u32,
}

#[derive(Default)]
struct GlyphMaps {
    by_index: HashMap<GlyphId, Arc<GlyphInfo>>,
    by_char: HashMap<char, Arc<GlyphInfo>>,
}

/// Mutable rasterization state, locked for the duration of one compile or
/// one shaping call. Cache hits never touch this lock.
struct RasterState {
    shape: ShapeContext,
    scale: ScaleContext,
    atlas: Option<AtlasGroup>,
    /// Power-of-two single-glyph textures used when no atlas is active or a
    /// bitmap is too large for a page.
    standalone: Vec<AtlasTexture>,
}

/// A loaded font at a fixed pixel size, with its glyph caches and textures.
pub struct Font {
    data: Blob<u8>,
    index: u32,
    offset: u32,
    key: CacheKey,
    options: FontOptions,
    px: f32,
    units_to_px: f32,
    metrics: FontMetrics,
    glyphs: RwLock<GlyphMaps>,
    raster: Mutex<RasterState>,
}

impl core::fmt::Debug for Font {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Font")
            .field("index", &self.index)
            .field("options", &self.options)
            .field("px", &self.px)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl Font {
    /// Loads a font from a file. Failures are logged and returned; callers
    /// are expected to fall back to another font.
    pub fn from_file(path: impl AsRef<Path>, options: FontOptions) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            warn!("failed to read font {}: {e}", path.display());
            FontLoadError::Io(e)
        })?;
        Self::from_bytes(bytes, 0, options).map_err(|e| {
            warn!("failed to parse font {}: {e}", path.display());
            e
        })
    }

    /// Loads a font from raw bytes. `index` selects a face within a
    /// collection file and is 0 for plain font files.
    pub fn from_bytes(
        bytes: Vec<u8>,
        index: u32,
        options: FontOptions,
    ) -> Result<Self, FontLoadError> {
        let data = Blob::new(Arc::new(bytes));
        let font_ref =
            FontRef::from_index(data.as_ref(), index as usize).ok_or(FontLoadError::Parse)?;
        let offset = font_ref.offset;
        let key = font_ref.key;

        let px = options.size_pt * options.scale_factor * PT_TO_PX;
        let (units_to_px, metrics) = scaled_metrics(&font_ref, px, options.line_spacing);

        let font = Self {
            data,
            index,
            offset,
            key,
            options,
            px,
            units_to_px,
            metrics,
            glyphs: RwLock::new(GlyphMaps::default()),
            raster: Mutex::new(RasterState {
                shape: ShapeContext::new(),
                scale: ScaleContext::new(),
                atlas: None,
                standalone: Vec::new(),
            }),
        };
        font.preload();
        Ok(font)
    }

    fn font_ref(&self) -> FontRef<'_> {
        // Validated in `from_bytes`; reconstructing from the stored offset
        // and key avoids re-parsing the table directory on every call.
        FontRef {
            data: self.data.as_ref(),
            offset: self.offset,
            key: self.key,
        }
    }

    /// The options this font was loaded with.
    pub fn options(&self) -> &FontOptions {
        &self.options
    }

    /// The pixel size glyphs are rasterized at.
    pub fn pixel_size(&self) -> f32 {
        self.px
    }

    /// Scaled vertical metrics.
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Tag of the configured fallback font, if any.
    pub fn fallback(&self) -> Option<&str> {
        self.options.fallback.as_deref()
    }

    /// Reloads the font at a new UI scale factor: recomputes pixel metrics,
    /// drops every cached glyph and texture, and re-runs the load strategy.
    pub fn rescale(&mut self, scale_factor: f32) {
        self.options.scale_factor = scale_factor;
        self.px = self.options.size_pt * scale_factor * PT_TO_PX;
        let (units_to_px, metrics) =
            scaled_metrics(&self.font_ref(), self.px, self.options.line_spacing);
        self.units_to_px = units_to_px;
        self.metrics = metrics;
        {
            let mut maps = self.glyphs.write();
            maps.by_index.clear();
            maps.by_char.clear();
        }
        {
            let mut raster = self.raster.lock();
            raster.atlas = None;
            raster.standalone.clear();
        }
        self.preload();
    }

    /// Rasterizes the glyphs selected by the configured filter.
    fn preload(&self) {
        if self.options.filter.contains(GlyphFilter::ON_DEMAND) {
            return;
        }
        let mut pairs: Vec<(char, GlyphId)> = Vec::new();
        self.font_ref().charmap().enumerate(|code, id| {
            if let Some(ch) = char::from_u32(code) {
                if self.options.filter.admits(ch) {
                    pairs.push((ch, id));
                }
            }
        });

        let mut raster = self.raster.lock();
        if raster.atlas.is_none() {
            raster.atlas = Some(AtlasGroup::new(ATLAS_PAGE_SIZE));
        }
        let mut by_index: HashMap<GlyphId, Arc<GlyphInfo>> = HashMap::new();
        let mut by_char: HashMap<char, Arc<GlyphInfo>> = HashMap::new();
        for (ch, id) in pairs {
            let info = match by_index.get(&id) {
                Some(info) => info.clone(),
                None => {
                    let info = Arc::new(self.compile_glyph(&mut raster, id));
                    by_index.insert(id, info.clone());
                    info
                }
            };
            by_char.insert(ch, info);
        }
        let mut maps = self.glyphs.write();
        maps.by_index = by_index;
        maps.by_char = by_char;
    }

    /// Looks up a glyph by character.
    ///
    /// A miss on the character cache that hits by glyph index backfills the
    /// character cache; a full miss compiles the glyph on demand. Returns
    /// `None` for characters the font has no glyph for, so the caller can
    /// consult its fallback chain.
    pub fn get_glyph(&self, ch: char) -> Option<Arc<GlyphInfo>> {
        if let Some(info) = self.glyphs.read().by_char.get(&ch) {
            return Some(info.clone());
        }
        let id = self.font_ref().charmap().map(ch);
        if id == 0 {
            return None;
        }
        let info = self.get_or_compile(id)?;
        self.glyphs.write().by_char.insert(ch, info.clone());
        Some(info)
    }

    /// Looks up a glyph by its font-internal index, compiling it on demand.
    pub fn get_glyph_by_index(&self, id: GlyphId) -> Option<Arc<GlyphInfo>> {
        if id == 0 {
            return None;
        }
        self.get_or_compile(id)
    }

    fn get_or_compile(&self, id: GlyphId) -> Option<Arc<GlyphInfo>> {
        if let Some(info) = self.glyphs.read().by_index.get(&id) {
            return Some(info.clone());
        }
        // First compile of this glyph; concurrent callers serialize here.
        let mut raster = self.raster.lock();
        if let Some(info) = self.glyphs.read().by_index.get(&id) {
            return Some(info.clone());
        }
        let info = Arc::new(self.compile_glyph(&mut raster, id));
        self.glyphs.write().by_index.insert(id, info.clone());
        Some(info)
    }

    /// Renders one glyph outline and records its placement.
    ///
    /// With an active atlas the bitmap goes into a packed slot inset by a
    /// one-pixel gutter and the UVs cover only the inset, so bilinear
    /// sampling cannot bleed a neighbor in. Without an atlas, or when the
    /// bitmap cannot fit a page, the bitmap gets its own power-of-two
    /// texture with UVs scaled to the real extent.
    fn compile_glyph(&self, raster: &mut RasterState, id: GlyphId) -> GlyphInfo {
        let font_ref = self.font_ref();
        let advance = font_ref.glyph_metrics(&[]).advance_width(id) * self.units_to_px;

        let mut scaler = raster.scale.builder(font_ref).size(self.px).hint(true).build();
        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, id);
        drop(scaler);

        let Some(image) = image.filter(|i| i.placement.width > 0 && i.placement.height > 0)
        else {
            // Zero-area glyph (a space): keep the advance, skip the texture.
            return GlyphInfo {
                texture: None,
                width: 0,
                height: 0,
                left: 0,
                top: 0,
                advance,
                uv: UvRect::default(),
            };
        };
        let width = image.placement.width;
        let height = image.placement.height;

        if let Some(atlas) = raster.atlas.as_mut() {
            let region = atlas.try_pack(width + 2 * GUTTER, height + 2 * GUTTER);
            let page_size = atlas.page_size();
            if let (Some(region), Some(page)) = (region, atlas.last_page_mut()) {
                let (x, y, uv) = inset_placement(region, width, height, page_size);
                page.texture_mut().upload(x, y, width, height, &image.data);
                return GlyphInfo {
                    texture: Some(page.texture().id()),
                    width,
                    height,
                    left: image.placement.left,
                    top: image.placement.top,
                    advance,
                    uv,
                };
            }
        }

        // No atlas (on-demand font) or the glyph is too large for a page.
        let (tex_w, tex_h, uv) = standalone_placement(width, height);
        let mut texture = AtlasTexture::new(tex_w, tex_h);
        texture.upload(0, 0, width, height, &image.data);
        let info = GlyphInfo {
            texture: Some(texture.id()),
            width,
            height,
            left: image.placement.left,
            top: image.placement.top,
            advance,
            uv,
        };
        raster.standalone.push(texture);
        info
    }

    /// Shapes a string into positioned glyphs.
    pub fn shape(&self, text: &str) -> Vec<ShapedGlyph> {
        let font_ref = self.font_ref();
        let mut raster = self.raster.lock();
        let mut shaper = raster.shape.builder(font_ref).size(self.px).build();
        shaper.add_str(text);
        let mut out = Vec::with_capacity(text.len());
        shaper.shape_with(|cluster| {
            for glyph in cluster.glyphs {
                out.push(ShapedGlyph {
                    glyph_id: glyph.id,
                    x_offset: glyph.x,
                    y_offset: glyph.y,
                    advance: glyph.advance,
                    cluster: cluster.source.start,
                });
            }
        });
        out
    }

    /// Measures a single line of text: the sum of shaped advances and the
    /// line height.
    pub fn measure(&self, text: &str) -> (f32, f32) {
        let width = self.shape(text).iter().map(|g| g.advance).sum();
        (width, self.metrics.line_height)
    }

    /// Measures text under soft word-wrap at `max_width`, without touching
    /// any paragraph state. Returns the widest line and the wrapped height.
    pub fn measure_wrapped(&self, text: &str, max_width: f32) -> (f32, f32) {
        let glyphs: Vec<GlyphChar> = text.chars().map(|ch| self.glyph_char(ch)).collect();
        let (width, lines) =
            crate::layout::wrap::wrapped_extent(&glyphs, max_width.max(0.0) as u32);
        (width as f32, lines as f32 * self.metrics.line_height)
    }

    /// Visits every texture owned by this font (atlas pages first, then
    /// standalone glyph textures) so a render backend can upload them.
    pub fn with_textures<F: FnMut(&AtlasTexture)>(&self, mut f: F) {
        let raster = self.raster.lock();
        if let Some(atlas) = &raster.atlas {
            for page in atlas.pages() {
                f(page.texture());
            }
        }
        for texture in &raster.standalone {
            f(texture);
        }
    }
}

impl GlyphProvider for Font {
    fn glyph_char(&self, ch: char) -> GlyphChar {
        let font_ref = self.font_ref();
        let glyph_id = font_ref.charmap().map(ch);
        let advance = font_ref.glyph_metrics(&[]).advance_width(glyph_id) * self.units_to_px;
        GlyphChar {
            ch,
            glyph_id,
            advance: advance.round().max(0.0) as u32,
        }
    }

    fn line_height(&self) -> f32 {
        self.metrics.line_height
    }
}

/// Origin and UVs of a glyph bitmap inside a packed atlas slot, inset by
/// the gutter so bilinear sampling never reads a neighboring glyph.
fn inset_placement(
    region: PackedRegion,
    width: u32,
    height: u32,
    page_size: u32,
) -> (u32, u32, UvRect) {
    let x = region.x + GUTTER;
    let y = region.y + GUTTER;
    let size = page_size as f32;
    let uv = UvRect {
        u0: x as f32 / size,
        v0: y as f32 / size,
        u1: (x + width) as f32 / size,
        v1: (y + height) as f32 / size,
    };
    (x, y, uv)
}

/// Texture extent and UVs for a glyph bitmap uploaded at the origin of its
/// own power-of-two texture.
fn standalone_placement(width: u32, height: u32) -> (u32, u32, UvRect) {
    let tex_w = next_pow2(width);
    let tex_h = next_pow2(height);
    let uv = UvRect {
        u0: 0.0,
        v0: 0.0,
        u1: width as f32 / tex_w as f32,
        v1: height as f32 / tex_h as f32,
    };
    (tex_w, tex_h, uv)
}

fn scaled_metrics(font_ref: &FontRef<'_>, px: f32, line_spacing: f32) -> (f32, FontMetrics) {
    let m = font_ref.metrics(&[]);
    let units_to_px = if m.units_per_em > 0 {
        px / m.units_per_em as f32
    } else {
        0.0
    };
    let ascent = m.ascent * units_to_px;
    let descent = m.descent * units_to_px;
    let leading = m.leading * units_to_px;
    let metrics = FontMetrics {
        ascent,
        descent,
        leading,
        line_height: (ascent + descent + leading) * line_spacing,
    };
    (units_to_px, metrics)
}
