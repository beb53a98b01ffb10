//! GPU uniform types for the text renderer.
//!
//! The per-vertex data itself ([`quill_text::Vertex`]) is produced by the
//! quad builder; this module carries the frame-level camera uniform.

use bytemuck::{Pod, Zeroable};

/// Camera/viewport uniform sent to the GPU once per frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// 4×4 orthographic projection matrix (column-major).
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Orthographic projection for a `width × height` viewport with the
    /// origin at the **bottom-left** and Y growing upward, matching the
    /// baseline-up coordinate space the quad builder emits.
    ///
    /// Maps (0,0) to NDC (-1,-1) and (width,height) to (1,1).
    pub fn orthographic(width: f32, height: f32) -> Self {
        let sx = 2.0 / width;
        let sy = 2.0 / height;

        Self {
            view_proj: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [-1.0, -1.0, 0.0, 1.0],
            ],
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
