//! Quad layout — turns shaped records and atlas placements into
//! vertex/index buffers.
//!
//! One quad (4 vertices, 6 indices, two CCW triangles sharing the
//! diagonal) per glyph instance, including zero-size whitespace glyphs,
//! so buffer counts stay `4 × glyphs` / `6 × glyphs` without special
//! cases. Vertical quad edges are floored to whole pixels; sub-pixel
//! baselines make static text shimmer.

use bytemuck::{Pod, Zeroable};

use crate::atlas::AtlasPlacement;
use crate::raster::RasterGlyph;
use crate::shaper::GlyphRecord;

/// One glyph-quad vertex: screen position plus atlas UV.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Flat geometry for a text run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Total pen displacement across the run, letter spacing included.
    pub advance: [f32; 2],
}

/// Lay out quads for a run starting at `pen`, in shaping order.
///
/// Letter spacing is split half before the first glyph and half after the
/// last, with a full unit between every adjacent pair, so a run of `n`
/// glyphs grows by exactly `n` spacing units. Shaping offsets shift each
/// quad without touching the pen advance — dropping them misplaces
/// combining marks in complex scripts.
///
/// `records`, `glyphs`, and `placements` are parallel, one entry per
/// glyph instance.
pub fn build_quads(
    records: &[GlyphRecord],
    glyphs: &[RasterGlyph],
    placements: &[AtlasPlacement],
    pen: [f32; 2],
    letter_spacing: f32,
) -> Geometry {
    debug_assert_eq!(records.len(), glyphs.len());
    debug_assert_eq!(records.len(), placements.len());

    let mut vertices = Vec::with_capacity(records.len() * 4);
    let mut indices = Vec::with_capacity(records.len() * 6);

    let half_before = letter_spacing * 0.5;
    let half_after = letter_spacing - half_before;

    let mut x = pen[0];
    let mut y = pen[1];
    if !records.is_empty() {
        x += half_before;
    }

    for (i, ((record, glyph), placement)) in
        records.iter().zip(glyphs).zip(placements).enumerate()
    {
        let x0 = x + record.x_offset + glyph.left as f32;
        let y0 = (y + record.y_offset + glyph.top as f32).floor();
        let x1 = x0 + glyph.width as f32;
        let y1 = (y0 - glyph.height as f32).floor();

        let [s0, t0] = placement.uv_min;
        let [s1, t1] = placement.uv_max;

        // Counter-clockwise: top-left, bottom-left, bottom-right, top-right.
        let base = vertices.len() as u32;
        vertices.push(Vertex { position: [x0, y0], uv: [s0, t0] });
        vertices.push(Vertex { position: [x0, y1], uv: [s0, t1] });
        vertices.push(Vertex { position: [x1, y1], uv: [s1, t1] });
        vertices.push(Vertex { position: [x1, y0], uv: [s1, t0] });
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        x += record.x_advance;
        y += record.y_advance;
        if i + 1 < records.len() {
            x += letter_spacing;
        }
    }

    if !records.is_empty() {
        x += half_after;
    }

    Geometry {
        vertices,
        indices,
        advance: [x - pen[0], y - pen[1]],
    }
}

// ===================================================================
// Tests
// ===================================================================
