//! Shaping engine adapter — HarfBuzz-style shaping via `rustybuzz`.
//!
//! [`ShapingContext`] owns the font face and a reusable shaping buffer.
//! It is single-owner, non-reentrant state: one context serves one thread,
//! and callers building runs concurrently need one context (and face) each.
//!
//! ## Data flow
//!
//! ```text
//! ShapingContext::shape(text, tags, px)
//!     │  set direction/script/language, push UTF-8, shape
//!     ▼
//! Vec<GlyphRecord>   (glyph id + advance + offset, fractional pixels)
//! ```

use std::str::FromStr;

use rustybuzz::ttf_parser::Tag;
use rustybuzz::{Language, Script, UnicodeBuffer};

use crate::font::FontFace;

/// Paragraph direction for a shaping call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl Default for Direction {
    fn default() -> Self {
        Self::LeftToRight
    }
}

impl Direction {
    fn to_rustybuzz(self) -> rustybuzz::Direction {
        match self {
            Self::LeftToRight => rustybuzz::Direction::LeftToRight,
            Self::RightToLeft => rustybuzz::Direction::RightToLeft,
            Self::TopToBottom => rustybuzz::Direction::TopToBottom,
            Self::BottomToTop => rustybuzz::Direction::BottomToTop,
        }
    }
}

/// One shaped glyph: font glyph index plus positioning, in fractional
/// pixels at the requested size. Order is shaping (visual) order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRecord {
    /// Glyph index in the font (not a Unicode codepoint).
    pub glyph_id: u32,
    /// Pen displacement after this glyph.
    pub x_advance: f32,
    pub y_advance: f32,
    /// Sub-pixel quad shift applied before the advance (combining marks).
    pub x_offset: f32,
    pub y_offset: f32,
}

/// Owns the font face and the recycled shaping buffer.
///
/// The buffer slot is `Option` so the `UnicodeBuffer → GlyphBuffer` move
/// through `rustybuzz::shape` can hand the allocation back after every
/// call instead of reallocating.
pub struct ShapingContext {
    face: FontFace,
    buffer: Option<UnicodeBuffer>,
}

impl ShapingContext {
    pub fn new(face: FontFace) -> Self {
        Self {
            face,
            buffer: Some(UnicodeBuffer::new()),
        }
    }

    /// The font face this context shapes with.
    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Shape UTF-8 text into positioned glyph records.
    ///
    /// `script` is an ISO 15924 tag (`"Latn"`, `"Hani"`, …) and `language`
    /// a BCP-47-ish tag (`"en"`, `"zh"`). An unknown script or language is
    /// left for the shaper to guess rather than treated as an error;
    /// genuinely unshapeable input comes back as an empty record list.
    ///
    /// Advances and offsets are converted from design units to fractional
    /// pixels using `pixel_size / units_per_em`, so shaping output is
    /// already in the coordinate space the packer and quad builder use.
    pub fn shape(
        &mut self,
        text: &str,
        language: &str,
        script: &str,
        direction: Direction,
        pixel_size: f32,
    ) -> Vec<GlyphRecord> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut buffer = self.buffer.take().unwrap_or_else(UnicodeBuffer::new);
        buffer.push_str(text);
        buffer.set_direction(direction.to_rustybuzz());

        if let Some(script) = parse_script(script) {
            buffer.set_script(script);
        } else if !script.is_empty() {
            log::warn!("unknown script tag {script:?}, letting the shaper guess");
        }

        let lang_tag = language.trim();
        if !lang_tag.is_empty() {
            if let Ok(lang) = Language::from_str(lang_tag) {
                buffer.set_language(lang);
            }
        }

        let shaping_face = self.face.shaping_face();
        let glyphs = rustybuzz::shape(&shaping_face, &[], buffer);

        let units_per_em = self.face.units_per_em();
        let scale = if units_per_em != 0 {
            pixel_size / units_per_em as f32
        } else {
            1.0
        };

        let infos = glyphs.glyph_infos();
        let positions = glyphs.glyph_positions();

        let mut records = Vec::with_capacity(infos.len());
        for (info, pos) in infos.iter().zip(positions.iter()) {
            records.push(GlyphRecord {
                glyph_id: info.glyph_id,
                x_advance: pos.x_advance as f32 * scale,
                y_advance: pos.y_advance as f32 * scale,
                x_offset: pos.x_offset as f32 * scale,
                y_offset: pos.y_offset as f32 * scale,
            });
        }

        // Recycle the buffer allocation for the next call.
        self.buffer = Some(glyphs.clear());

        records
    }
}

/// Parse a 4-character ISO 15924 tag into a rustybuzz script.
fn parse_script(tag: &str) -> Option<Script> {
    let bytes = tag.as_bytes();
    if bytes.len() != 4 {
        return None;
    }
    Script::from_iso15924_tag(Tag::from_bytes(&[bytes[0], bytes[1], bytes[2], bytes[3]]))
}

// ===================================================================
// Tests
// ===================================================================
