//! Glyph atlas — shelf (row) packing of rasterized glyph bitmaps.
//!
//! Glyphs are placed left-to-right along a row until the next one would
//! cross the maximum row width, then a new row opens below. The final
//! texture height is unknown until every glyph height has been seen, so
//! packing is two passes over the same sequence: measure, then place.
//!
//! Both passes drive the **same** [`ShelfCursor`] step function. The
//! row-break predicate exists in exactly one place, so measurement and
//! placement cannot disagree about where rows break — if they did, pixel
//! positions and UV rectangles would silently diverge.
//!
//! Each glyph instance gets its own placement; repeated glyphs are packed
//! again rather than deduplicated, trading memory for a write-once atlas.

use thiserror::Error;

use crate::raster::RasterGlyph;

/// Default bound on atlas row width, in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1024;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Glyph {index} is {width}px wide, exceeding the {max_width}px row bound")]
    GlyphTooWide {
        index: usize,
        width: u32,
        max_width: u32,
    },
}

/// Where one glyph instance landed in the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasPlacement {
    /// Pixel origin of the bitmap within the atlas.
    pub x: u32,
    pub y: u32,
    /// Normalized UV rectangle covering the bitmap.
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

/// The packed result: CPU pixel buffer plus one placement per glyph.
///
/// Write-once — the buffer is complete before any placement is handed to
/// the quad builder, and nothing is evicted afterwards.
#[derive(Clone, Debug, Default)]
pub struct PackedAtlas {
    pub width: u32,
    pub height: u32,
    /// Row-major single-channel coverage, `width * height` bytes.
    pub pixels: Vec<u8>,
    pub placements: Vec<AtlasPlacement>,
}

impl PackedAtlas {
    /// True for the zero-glyph (or all-whitespace) atlas, which is a
    /// valid drawable-with-zero-count result, not an error.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The single row-break rule, replayed identically by both passes.
struct ShelfCursor {
    max_width: u32,
    x: u32,
    y: u32,
    row_height: u32,
}

impl ShelfCursor {
    fn new(max_width: u32) -> Self {
        Self {
            max_width,
            x: 0,
            y: 0,
            row_height: 0,
        }
    }

    /// Advance past one `w × h` glyph (plus its 1-pixel gutter) and
    /// return the pixel origin it was assigned.
    fn place(&mut self, w: u32, h: u32) -> (u32, u32) {
        if self.x + w + 1 >= self.max_width {
            self.y += self.row_height;
            self.x = 0;
            self.row_height = 0;
        }
        let origin = (self.x, self.y);
        self.x += w + 1;
        self.row_height = self.row_height.max(h);
        origin
    }
}

/// Shelf packer with a configurable row-width bound.
pub struct ShelfPacker {
    max_width: u32,
}

impl ShelfPacker {
    pub fn new() -> Self {
        Self::with_max_width(DEFAULT_MAX_WIDTH)
    }

    pub fn with_max_width(max_width: u32) -> Self {
        Self { max_width }
    }

    /// Pack the glyph sequence, in shaping order, into an atlas.
    ///
    /// Pass 1 measures the final dimensions; pass 2 replays the identical
    /// cursor while blitting bitmaps and deriving UV rectangles. An empty
    /// sequence yields a zero-size atlas.
    pub fn pack(&self, glyphs: &[RasterGlyph]) -> Result<PackedAtlas, AtlasError> {
        // Pass 1: measure.
        let mut cursor = ShelfCursor::new(self.max_width);
        let mut width = 0u32;
        for (index, glyph) in glyphs.iter().enumerate() {
            if glyph.width + 1 >= self.max_width {
                return Err(AtlasError::GlyphTooWide {
                    index,
                    width: glyph.width,
                    max_width: self.max_width,
                });
            }
            cursor.place(glyph.width, glyph.height);
            width = width.max(cursor.x);
        }
        let height = cursor.y + cursor.row_height;

        let mut atlas = PackedAtlas {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize)],
            placements: Vec::with_capacity(glyphs.len()),
        };

        // All-whitespace runs measure to zero height; keep UVs finite.
        let inv_w = if width > 0 { 1.0 / width as f32 } else { 0.0 };
        let inv_h = if height > 0 { 1.0 / height as f32 } else { 0.0 };

        // Pass 2: place and copy, replaying the same row breaks.
        let mut cursor = ShelfCursor::new(self.max_width);
        for glyph in glyphs {
            let (x, y) = cursor.place(glyph.width, glyph.height);
            self.blit(&mut atlas, x, y, glyph);

            let s0 = x as f32 * inv_w;
            let t0 = y as f32 * inv_h;
            atlas.placements.push(AtlasPlacement {
                x,
                y,
                uv_min: [s0, t0],
                uv_max: [
                    s0 + glyph.width as f32 * inv_w,
                    t0 + glyph.height as f32 * inv_h,
                ],
            });
        }

        log::debug!(
            "packed atlas: {}x{}, {} glyphs",
            atlas.width,
            atlas.height,
            atlas.placements.len()
        );

        Ok(atlas)
    }

    fn blit(&self, atlas: &mut PackedAtlas, x: u32, y: u32, glyph: &RasterGlyph) {
        let w = glyph.width as usize;
        for row in 0..glyph.height as usize {
            let src = row * w;
            let dst = (y as usize + row) * atlas.width as usize + x as usize;
            atlas.pixels[dst..dst + w].copy_from_slice(&glyph.data[src..src + w]);
        }
    }
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self::new()
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: u32, height: u32, fill: u8) -> RasterGlyph {
        RasterGlyph {
            data: vec![fill; (width * height) as usize],
            width,
            height,
            left: 0,
            top: height as i32,
        }
    }

    #[test]
    fn test_empty_sequence_is_zero_size() {
        let atlas = ShelfPacker::new().pack(&[]).unwrap();
        assert!(atlas.is_empty());
        assert_eq!(atlas.width, 0);
        assert_eq!(atlas.height, 0);
        assert!(atlas.placements.is_empty());
        assert!(atlas.pixels.is_empty());
    }

    #[test]
    fn test_single_glyph() {
        let atlas = ShelfPacker::new().pack(&[glyph(8, 12, 200)]).unwrap();
        // One glyph plus its gutter.
        assert_eq!(atlas.width, 9);
        assert_eq!(atlas.height, 12);
        assert_eq!(atlas.placements[0].x, 0);
        assert_eq!(atlas.placements[0].y, 0);
    }

    #[test]
    fn test_row_break_at_exact_bound() {
        // Widths [10,10,10] with a 25px bound: 11, then 22, then
        // 22 + 10 + 1 >= 25 breaks before the third glyph.
        let glyphs = [glyph(10, 4, 1), glyph(10, 6, 2), glyph(10, 5, 3)];
        let atlas = ShelfPacker::with_max_width(25).pack(&glyphs).unwrap();

        assert_eq!(atlas.placements[0].x, 0);
        assert_eq!(atlas.placements[1].x, 11);
        assert_eq!(atlas.placements[1].y, 0);
        assert_eq!(atlas.placements[2].x, 0);
        assert_eq!(atlas.placements[2].y, 6, "second row starts below the tallest glyph");

        assert!(atlas.width >= 21);
        assert_eq!(atlas.width, 22);
        // Height is the sum of the two rows' max heights.
        assert_eq!(atlas.height, 6 + 5);
    }

    #[test]
    fn test_placements_stay_in_bounds() {
        let glyphs: Vec<RasterGlyph> = (0u32..40)
            .map(|i| glyph(5 + (i % 7), 3 + (i % 5), 255))
            .collect();
        let atlas = ShelfPacker::with_max_width(64).pack(&glyphs).unwrap();

        for (placement, g) in atlas.placements.iter().zip(&glyphs) {
            assert!(placement.x + g.width <= atlas.width);
            assert!(placement.y + g.height <= atlas.height);
        }
    }

    #[test]
    fn test_uv_rectangles_match_pixel_sizes() {
        let glyphs = [glyph(10, 4, 1), glyph(7, 9, 2), glyph(3, 2, 3)];
        let atlas = ShelfPacker::new().pack(&glyphs).unwrap();

        for (placement, g) in atlas.placements.iter().zip(&glyphs) {
            let du = (placement.uv_max[0] - placement.uv_min[0]) * atlas.width as f32;
            let dv = (placement.uv_max[1] - placement.uv_min[1]) * atlas.height as f32;
            assert!((du - g.width as f32).abs() < 1e-3, "u span {du} vs width {}", g.width);
            assert!((dv - g.height as f32).abs() < 1e-3, "v span {dv} vs height {}", g.height);
        }
    }

    #[test]
    fn test_gutter_prevents_overlap() {
        let glyphs = [glyph(6, 6, 10), glyph(6, 6, 20)];
        let atlas = ShelfPacker::new().pack(&glyphs).unwrap();
        assert_eq!(atlas.placements[1].x, 7, "1-pixel gutter between neighbors");

        // The gutter column between them stays blank.
        for row in 0..6usize {
            assert_eq!(atlas.pixels[row * atlas.width as usize + 6], 0);
        }
    }

    #[test]
    fn test_bitmap_contents_copied() {
        let mut g = glyph(2, 2, 0);
        g.data = vec![1, 2, 3, 4];
        let atlas = ShelfPacker::new().pack(&[g]).unwrap();
        let w = atlas.width as usize;
        assert_eq!(atlas.pixels[0], 1);
        assert_eq!(atlas.pixels[1], 2);
        assert_eq!(atlas.pixels[w], 3);
        assert_eq!(atlas.pixels[w + 1], 4);
    }

    #[test]
    fn test_zero_size_glyphs_pack_between_others() {
        // Whitespace: zero footprint, but the gutter still advances x.
        let glyphs = [glyph(5, 5, 9), glyph(0, 0, 0), glyph(5, 5, 9)];
        let atlas = ShelfPacker::new().pack(&glyphs).unwrap();
        assert_eq!(atlas.placements[0].x, 0);
        assert_eq!(atlas.placements[1].x, 6);
        assert_eq!(atlas.placements[2].x, 7);
        assert_eq!(atlas.height, 5);
    }

    #[test]
    fn test_all_whitespace_has_zero_height() {
        let glyphs = [glyph(0, 0, 0), glyph(0, 0, 0)];
        let atlas = ShelfPacker::new().pack(&glyphs).unwrap();
        assert_eq!(atlas.height, 0);
        assert_eq!(atlas.placements.len(), 2);
        for placement in &atlas.placements {
            assert_eq!(placement.uv_min, placement.uv_max);
        }
    }

    #[test]
    fn test_too_wide_glyph_rejected() {
        let err = ShelfPacker::with_max_width(16)
            .pack(&[glyph(4, 4, 1), glyph(30, 4, 1)])
            .unwrap_err();
        match err {
            AtlasError::GlyphTooWide { index, width, max_width } => {
                assert_eq!(index, 1);
                assert_eq!(width, 30);
                assert_eq!(max_width, 16);
            }
        }
    }

    #[test]
    fn test_repeated_glyphs_get_distinct_placements() {
        let g = glyph(4, 4, 7);
        let atlas = ShelfPacker::new().pack(&[g.clone(), g]).unwrap();
        assert_ne!(atlas.placements[0], atlas.placements[1]);
    }

    #[test]
    fn test_packing_is_deterministic() {
        let glyphs: Vec<RasterGlyph> = (0u32..25).map(|i| glyph(3 + i % 9, 2 + i % 6, 128)).collect();
        let packer = ShelfPacker::with_max_width(48);
        let a = packer.pack(&glyphs).unwrap();
        let b = packer.pack(&glyphs).unwrap();
        assert_eq!(a.pixels, b.pixels);
        assert_eq!(a.placements, b.placements);
    }
}
