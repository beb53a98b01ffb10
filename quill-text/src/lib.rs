//! # quill-text
//!
//! Shaped, internationalized text as GPU-drawable geometry. Given a
//! string, script/language/direction tags, and a pixel size, the
//! pipeline shapes, rasterizes, packs, and lays out one drawable
//! [`TextRun`].
//!
//! ## Architecture
//!
//! ```text
//! "How to render text" + tags + px
//!     │
//!     ▼
//! ShapingContext::shape (rustybuzz) ──► Vec<GlyphRecord>
//!     │
//!     ▼
//! GlyphRasterizer (swash)           ──► coverage bitmaps + bearings
//!     │
//!     ▼
//! ShelfPacker                       ──► atlas pixels + UV placements
//!     │
//!     ▼
//! build_quads                       ──► vertices + indices
//!     │
//!     ▼
//! TextRun  ──► quill-render (upload / draw / destroy)
//! ```
//!
//! - **`font`** — font face loading, Unicode charmap validation.
//! - **`shaper`** — HarfBuzz-style shaping adapter with a reusable buffer.
//! - **`raster`** — anti-aliased coverage bitmaps per glyph.
//! - **`atlas`** — two-pass shelf packing into a bounded-width texture.
//! - **`geometry`** — indexed quad layout with letter spacing.
//! - **`run`** — the build pipeline and the `TextRun` result.

pub mod atlas;
pub mod font;
pub mod geometry;
pub mod raster;
pub mod run;
pub mod shaper;

// Re-exports for ergonomic use.
pub use atlas::{AtlasError, AtlasPlacement, PackedAtlas, ShelfPacker, DEFAULT_MAX_WIDTH};
pub use font::{FontError, FontFace};
pub use geometry::{build_quads, Geometry, Vertex};
pub use raster::{GlyphRasterizer, RasterGlyph};
pub use run::{BuildError, TextRun, TextRunConfig};
pub use shaper::{Direction, GlyphRecord, ShapingContext};

#[cfg(test)]
pub(crate) mod test_support {
    //! System-font lookup for tests. Environments without fonts make the
    //! dependent tests skip rather than fail.

    use fontdb::{Database, Family, Query, Source};

    /// Locate a sans-serif system face, returning its bytes and index.
    pub fn system_font_bytes() -> Option<(Vec<u8>, u32)> {
        let mut db = Database::new();
        db.load_system_fonts();

        let id = db.query(&Query {
            families: &[
                Family::SansSerif,
                Family::Name("DejaVu Sans".into()),
                Family::Name("Liberation Sans".into()),
                Family::Name("Arial".into()),
            ],
            ..Query::default()
        })?;

        let face = db.face(id)?;
        let bytes = match &face.source {
            Source::File(path) => std::fs::read(path).ok()?,
            Source::Binary(data) => data.as_ref().as_ref().to_vec(),
            Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
        };
        Some((bytes, face.index))
    }
}
