//! GPU context — owns the `wgpu::Device` and `Queue` the text pipeline
//! draws with.
//!
//! Construction is headless: nothing here touches a window or event
//! loop. Callers that present to a screen bring their own surface and
//! configure it against [`GpuContext::target_format`]; everything this
//! crate renders goes into a color target view, and
//! [`GpuContext::create_offscreen_target`] makes one on demand (tests
//! and off-screen rendering use it directly).

use thiserror::Error;
use wgpu::{
    Adapter, Device, DeviceDescriptor, Extent3d, Instance,
    InstanceDescriptor, Queue, RequestAdapterOptions, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Device, queue, and the color format render targets use.
pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub adapter: Adapter,
    /// Format of targets created by [`GpuContext::create_offscreen_target`];
    /// pipelines built from this context output to it.
    pub target_format: TextureFormat,
}

impl GpuContext {
    /// Create a context rendering to `Bgra8UnormSrgb` targets.
    pub async fn new() -> Result<Self, GpuError> {
        Self::with_target_format(TextureFormat::Bgra8UnormSrgb).await
    }

    /// Create a context with an explicit target format, for callers
    /// whose presentation surface prefers something else.
    pub async fn with_target_format(target_format: TextureFormat) -> Result<Self, GpuError> {
        let instance = Instance::new(&InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::debug!(
            "text renderer adapter: {} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("quill-device"),
                ..Default::default()
            }, None)
            .await?;

        Ok(Self {
            device,
            queue,
            adapter,
            target_format,
        })
    }

    /// Create an off-screen color target in this context's format.
    pub fn create_offscreen_target(&self, width: u32, height: u32) -> TextureView {
        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("quill_offscreen_target"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: self.target_format,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&TextureViewDescriptor::default())
    }
}

// ===================================================================
// Tests
// ===================================================================
