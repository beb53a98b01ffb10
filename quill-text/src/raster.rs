//! Glyph rasterization via `swash`.
//!
//! Produces anti-aliased 8-bit coverage bitmaps plus per-glyph bearings.
//! Unlike a FreeType glyph slot, the returned [`RasterGlyph`] owns its
//! pixel data, so there is no transient backend buffer to copy out of
//! before the next call — the packer still consumes each bitmap before
//! the next glyph is rasterized, keeping the pipeline strictly in
//! shaping order.

use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};

use crate::font::FontFace;

/// A rasterized glyph: row-major single-channel coverage plus bearings.
///
/// Zero-size bitmaps (whitespace, glyphs with no outline) are legal and
/// must still flow through packing with zero footprint.
#[derive(Clone, Debug, Default)]
pub struct RasterGlyph {
    /// Coverage bytes, `width * height` of them.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Horizontal offset from the pen origin to the bitmap's left edge.
    pub left: i32,
    /// Vertical offset from the baseline up to the bitmap's top edge.
    pub top: i32,
}

impl RasterGlyph {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Wraps a swash scale context; create once and reuse across runs.
///
/// Not safe to share between threads building runs concurrently — each
/// builder thread owns its own rasterizer (and face), mirroring the
/// single-owner contract of [`crate::shaper::ShapingContext`].
pub struct GlyphRasterizer {
    context: ScaleContext,
}

impl GlyphRasterizer {
    pub fn new() -> Self {
        Self {
            context: ScaleContext::new(),
        }
    }

    /// Rasterize one glyph at the given pixel size.
    ///
    /// Hinted outlines with embedded bitmaps as a fallback; a glyph the
    /// font cannot render comes back zero-size rather than failing.
    pub fn rasterize(&mut self, face: &FontFace, glyph_id: u32, pixel_size: f32) -> RasterGlyph {
        let font = face.raster_ref();
        let mut scaler = self
            .context
            .builder(font)
            .size(pixel_size)
            .hint(true)
            .build();

        let rendered = Render::new(&[
            Source::Outline,
            Source::Bitmap(StrikeWith::BestFit),
        ])
        .render(&mut scaler, glyph_id as swash::GlyphId);

        let Some(image) = rendered else {
            return RasterGlyph::default();
        };

        let width = image.placement.width;
        let height = image.placement.height;
        let data = match image.content {
            Content::Mask => image.data,
            // Color content is out of scope; reduce to coverage via alpha.
            Content::Color | Content::SubpixelMask => image
                .data
                .chunks_exact(4)
                .map(|px| px[3])
                .collect(),
        };

        RasterGlyph {
            data,
            width,
            height,
            left: image.placement.left,
            top: image.placement.top,
        }
    }
}

impl Default for GlyphRasterizer {
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
    use crate::font::FontFace;
    use crate::shaper::{Direction, ShapingContext};
    use crate::test_support::system_font_bytes;

    fn face() -> Option<FontFace> {
        let (bytes, index) = system_font_bytes()?;
        FontFace::from_bytes(bytes, index).ok()
    }

    #[test]
    fn test_rasterize_letter() {
        let Some(face) = face() else { return };
        let mut ctx = ShapingContext::new(face.clone());
        let records = ctx.shape("A", "en", "Latn", Direction::LeftToRight, 40.0);
        let Some(record) = records.first() else { return };

        let mut rasterizer = GlyphRasterizer::new();
        let glyph = rasterizer.rasterize(&face, record.glyph_id, 40.0);
        assert!(!glyph.is_empty(), "'A' at 40px should produce pixels");
        assert_eq!(glyph.data.len(), (glyph.width * glyph.height) as usize);
        assert!(glyph.data.iter().any(|&c| c > 0), "coverage should be non-blank");
    }

    #[test]
    fn test_rasterize_whitespace_is_zero_footprint() {
        let Some(face) = face() else { return };
        let mut ctx = ShapingContext::new(face.clone());
        let records = ctx.shape(" ", "en", "Latn", Direction::LeftToRight, 40.0);
        let Some(record) = records.first() else { return };

        let mut rasterizer = GlyphRasterizer::new();
        let glyph = rasterizer.rasterize(&face, record.glyph_id, 40.0);
        // A space still advances the pen but packs with zero footprint.
        assert!(glyph.is_empty());
        assert!(record.x_advance > 0.0);
    }

    #[test]
    fn test_unknown_glyph_id_is_empty() {
        let Some(face) = face() else { return };
        let mut rasterizer = GlyphRasterizer::new();
        let glyph = rasterizer.rasterize(&face, u32::from(u16::MAX), 40.0);
        assert_eq!(glyph.data.len(), (glyph.width * glyph.height) as usize);
    }
}
