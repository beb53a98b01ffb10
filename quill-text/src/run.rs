//! Text run building — the full shape → rasterize → pack → layout
//! pipeline.
//!
//! A [`TextRun`] is the `Ready` end state: packed atlas pixels plus
//! vertex/index arrays, immutable once built. The intermediate states
//! (shaped records, rasterized bitmaps, packed placements) live only
//! inside [`TextRun::build`], and GPU-side destruction is enforced by
//! move semantics in the render crate, so a destroyed run cannot be
//! drawn by construction.
//!
//! The pipeline is single-threaded and synchronous: glyphs are
//! rasterized and consumed strictly in shaping order. Runs may be built
//! on independent threads only when each thread owns its own
//! [`ShapingContext`] and [`GlyphRasterizer`].

use thiserror::Error;

use crate::atlas::{AtlasError, PackedAtlas, ShelfPacker};
use crate::geometry::{build_quads, Vertex};
use crate::raster::{GlyphRasterizer, RasterGlyph};
use crate::shaper::{Direction, ShapingContext};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Atlas packing failed: {0}")]
    Atlas(#[from] AtlasError),
}

/// Input configuration for a text run. Never mutated by the pipeline.
#[derive(Clone, Debug)]
pub struct TextRunConfig {
    /// UTF-8 text to shape.
    pub text: String,
    /// BCP-47-ish language tag (`"en"`, `"zh"`).
    pub language: String,
    /// ISO 15924 script tag (`"Latn"`, `"Hani"`).
    pub script: String,
    /// Paragraph direction.
    pub direction: Direction,
    /// Extra inter-glyph spacing in pixels.
    pub letter_spacing: f32,
}

impl Default for TextRunConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            language: String::from("en"),
            script: String::from("Latn"),
            direction: Direction::LeftToRight,
            letter_spacing: 0.0,
        }
    }
}

/// A built, drawable text run.
///
/// Every glyph instance's pixels are in `atlas` before its UV rectangle
/// appears in `vertices`; the two-pass packer guarantees the ordering.
#[derive(Clone, Debug, Default)]
pub struct TextRun {
    pub atlas: PackedAtlas,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub glyph_count: u32,
    pub advance: [f32; 2],
}

impl TextRun {
    /// Build a run with the default 1024px atlas row bound.
    pub fn build(
        shaper: &mut ShapingContext,
        rasterizer: &mut GlyphRasterizer,
        config: &TextRunConfig,
        pixel_size: f32,
        pen: [f32; 2],
    ) -> Result<Self, BuildError> {
        Self::build_with_packer(shaper, rasterizer, &ShelfPacker::new(), config, pixel_size, pen)
    }

    /// Build a run with a caller-supplied packer (custom row bound).
    pub fn build_with_packer(
        shaper: &mut ShapingContext,
        rasterizer: &mut GlyphRasterizer,
        packer: &ShelfPacker,
        config: &TextRunConfig,
        pixel_size: f32,
        pen: [f32; 2],
    ) -> Result<Self, BuildError> {
        let records = shaper.shape(
            &config.text,
            &config.language,
            &config.script,
            config.direction,
            pixel_size,
        );

        // Rasterize in shaping order; each bitmap is owned, so nothing
        // aliases the next rasterization.
        let face = shaper.face().clone();
        let glyphs: Vec<RasterGlyph> = records
            .iter()
            .map(|record| rasterizer.rasterize(&face, record.glyph_id, pixel_size))
            .collect();

        let atlas = packer.pack(&glyphs)?;
        let geometry = build_quads(&records, &glyphs, &atlas.placements, pen, config.letter_spacing);

        log::debug!(
            "built text run: {} glyphs, atlas {}x{}, advance {:.1}px",
            records.len(),
            atlas.width,
            atlas.height,
            geometry.advance[0]
        );

        Ok(Self {
            atlas,
            vertices: geometry.vertices,
            indices: geometry.indices,
            glyph_count: records.len() as u32,
            advance: geometry.advance,
        })
    }

    /// Number of indices to draw; zero for an empty run.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// True when there is nothing to draw (still a valid run).
    pub fn is_empty(&self) -> bool {
        self.glyph_count == 0
    }
}

// ===================================================================
// Tests
// ===================================================================
