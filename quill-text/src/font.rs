//! Font face loading and validation.
//!
//! A [`FontFace`] owns the raw font bytes and hands out short-lived views
//! for the two backends: a `rustybuzz::Face` for shaping and a
//! `swash::FontRef` for rasterization. Both views borrow the same bytes,
//! so a face can be loaded once and reused across runs.
//!
//! Loading validates that the font carries a Unicode character map. Some
//! font formats ship several charmaps, and resolving codepoints through a
//! non-Unicode one silently produces wrong glyph IDs — the check runs once
//! here, never per shape call.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Font data could not be parsed as a face")]
    InvalidFont,
    #[error("Font has no Unicode character map")]
    NoUnicodeCharmap,
}

/// Loaded font face backed by TTF/OTF bytes.
///
/// The swash `offset`/`key` pair is captured at load time so rasterizer
/// views can be rebuilt without re-parsing the table directory.
#[derive(Clone, Debug)]
pub struct FontFace {
    data: Arc<[u8]>,
    index: u32,
    units_per_em: u16,
    swash_offset: u32,
    swash_key: swash::CacheKey,
}

impl FontFace {
    /// Load a face from raw font bytes and a face index within the file.
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, FontError> {
        let data: Arc<[u8]> = Arc::from(data);

        let face = rustybuzz::Face::from_slice(&data, index).ok_or(FontError::InvalidFont)?;
        if !has_unicode_charmap(&face) {
            return Err(FontError::NoUnicodeCharmap);
        }
        let units_per_em = face.units_per_em();

        let swash_ref = swash::FontRef::from_index(&data, index as usize)
            .ok_or(FontError::InvalidFont)?;
        let (swash_offset, swash_key) = (swash_ref.offset, swash_ref.key);

        log::debug!(
            "loaded font face: index {}, {} units/em, {} bytes",
            index,
            units_per_em,
            data.len()
        );

        Ok(Self {
            data,
            index,
            units_per_em: units_per_em as u16,
            swash_offset,
            swash_key,
        })
    }

    /// Load a face from a font file on disk.
    pub fn from_path(path: impl AsRef<Path>, index: u32) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data, index)
    }

    /// Face index within the underlying font file.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Design units per em, the divisor when scaling to pixels.
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Borrow a shaping view of this face.
    ///
    /// Valid construction is guaranteed by `from_bytes`, so the unwrap
    /// here can only fire on memory corruption.
    pub(crate) fn shaping_face(&self) -> rustybuzz::Face<'_> {
        rustybuzz::Face::from_slice(&self.data, self.index)
            .expect("font bytes were validated at load time")
    }

    /// Borrow a rasterization view of this face.
    pub(crate) fn raster_ref(&self) -> swash::FontRef<'_> {
        swash::FontRef {
            data: &self.data,
            offset: self.swash_offset,
            key: self.swash_key,
        }
    }
}

/// True if the face exposes a Unicode cmap subtable.
///
/// Accepts the Unicode platform, or the Windows platform with a UCS-2 /
/// UCS-4 encoding — the same set a shaping engine will consult when
/// mapping codepoints to glyph IDs.
fn has_unicode_charmap(face: &rustybuzz::Face<'_>) -> bool {
    let Some(cmap) = face.tables().cmap else {
        return false;
    };
    cmap.subtables.into_iter().any(|subtable| subtable.is_unicode())
}

// ===================================================================
// Tests
// ===================================================================
