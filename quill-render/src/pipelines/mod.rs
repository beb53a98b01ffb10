//! wgpu render pipelines.

pub mod text;
