//! High-level renderer — clears a target and draws a set of uploaded
//! text runs in one pass.

use wgpu::{
    Color, CommandEncoderDescriptor, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureView,
};

use crate::context::GpuContext;
use crate::pipelines::text::{GpuTextRun, TextPipeline};
use crate::vertex::CameraUniform;

/// Frame statistics returned after each render.
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    /// Glyph quads drawn across all runs.
    pub glyph_count: u32,
    /// Draw calls issued (one per non-empty run).
    pub draw_calls: u32,
}

/// Frame orchestration over the text pipeline.
///
/// # Usage
///
/// ```ignore
/// let mut renderer = Renderer::new(&gpu);
/// let gpu_run = renderer.text_pipeline().upload(&gpu, &run, color);
/// renderer.prepare(&gpu, &camera);
/// let target = gpu.create_offscreen_target(800, 600);
/// let stats = renderer.render(&gpu, &target, &[&gpu_run]);
/// ```
pub struct Renderer {
    text_pipeline: TextPipeline,
    clear_color: Color,
}

impl Renderer {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            text_pipeline: TextPipeline::new(&gpu.device, gpu.target_format),
            clear_color: Color::WHITE,
        }
    }

    /// Set the background clear color.
    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = Color { r, g, b, a };
    }

    /// Upload per-frame data (camera) to the GPU. Call once per frame.
    pub fn prepare(&self, gpu: &GpuContext, camera: &CameraUniform) {
        self.text_pipeline.upload_camera(&gpu.queue, camera);
    }

    /// Access the text pipeline for uploading runs.
    pub fn text_pipeline(&self) -> &TextPipeline {
        &self.text_pipeline
    }

    /// Render one frame into `target`: clear, draw every run, submit.
    ///
    /// `target` must use the context's [`GpuContext::target_format`];
    /// presenting callers hand in their surface texture's view, everyone
    /// else an off-screen target.
    pub fn render(
        &self,
        gpu: &GpuContext,
        target: &TextureView,
        runs: &[&GpuTextRun],
    ) -> FrameStats {
        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("quill_frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("quill_text_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for run in runs {
                self.text_pipeline.draw(&mut pass, run);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let glyph_count = runs.iter().map(|r| r.glyph_count()).sum();
        let draw_calls = runs.iter().filter(|r| r.index_count() > 0).count() as u32;
        FrameStats {
            glyph_count,
            draw_calls,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
