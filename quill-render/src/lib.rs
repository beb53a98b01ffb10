//! # quill-render
//!
//! wgpu render collaborator for `quill-text`. Takes a built
//! [`quill_text::TextRun`] and exposes the three operations the core
//! pipeline needs from the GPU side: upload, draw, destroy.
//!
//! ## Architecture
//!
//! ```text
//!  TextRun (quill-text)
//!       │
//!       ▼
//!  TextPipeline::upload()       ◀─── R8 atlas texture + vertex/index buffers
//!       │
//!       ▼
//!  Renderer::render(runs)       ◀─── one indexed draw per run
//!       │
//!       ▼
//!  GpuTextRun::destroy()        ◀─── releases texture + both buffers
//! ```
//!
//! ## Crate modules
//!
//! - [`context`] — headless GPU device/queue and off-screen targets
//! - [`vertex`] — camera uniform
//! - [`pipelines`] — the text render pipeline and per-run GPU resources
//! - [`renderer`] — frame orchestration

pub mod context;
pub mod pipelines;
pub mod renderer;
pub mod vertex;

// Re-exports for convenience
pub use context::GpuContext;
pub use pipelines::text::{GpuTextRun, TextPipeline};
pub use renderer::{FrameStats, Renderer};
pub use vertex::CameraUniform;
