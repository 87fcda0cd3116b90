use anyhow::{anyhow, Context, Result};
use winit::{dpi::PhysicalSize, window::Window};

/// Surface, device and queue for one window.
pub(crate) struct Gpu<'window> {
    surface: wgpu::Surface<'window>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl<'window> Gpu<'window> {
    pub(crate) fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .context("creating window surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no graphics adapter can present to this window")?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("space-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))
        .context("requesting device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface supports no texture formats"))?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode_for(&caps.present_modes, vsync),
            alpha_mode: alpha_mode_for(&caps.alpha_modes),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface {}x{} {:?} {:?} on {}",
            config.width,
            config.height,
            config.format,
            config.present_mode,
            adapter.get_info().name
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Minimised windows report a zero size; those are ignored.
    pub(crate) fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain image. A lost or outdated surface is reconfigured and
    /// retried; timeouts are retried as well.
    pub(crate) fn acquire(&mut self) -> Result<wgpu::SurfaceTexture> {
        loop {
            match self.surface.get_current_texture() {
                Ok(texture) => return Ok(texture),
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::debug!("surface out of date, reconfiguring");
                    self.surface.configure(&self.device, &self.config);
                }
                Err(wgpu::SurfaceError::Timeout) => {}
                Err(err) => return Err(anyhow!("acquiring surface texture: {err}")),
            }
        }
    }
}

fn present_mode_for(supported: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    use wgpu::PresentMode::*;

    let wanted: &[wgpu::PresentMode] = if vsync {
        &[Fifo, FifoRelaxed]
    } else {
        &[Immediate, Mailbox]
    };
    supported
        .iter()
        .copied()
        .find(|mode| wanted.contains(mode))
        .unwrap_or(Fifo)
}

fn alpha_mode_for(supported: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    if supported.contains(&wgpu::CompositeAlphaMode::Auto) {
        wgpu::CompositeAlphaMode::Auto
    } else {
        supported
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Opaque)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, PresentMode};

    #[test]
    fn vsync_picks_a_fifo_mode() {
        let modes = [PresentMode::Immediate, PresentMode::FifoRelaxed];
        assert_eq!(present_mode_for(&modes, true), PresentMode::FifoRelaxed);
        assert_eq!(present_mode_for(&modes, false), PresentMode::Immediate);
    }

    #[test]
    fn fifo_is_the_fallback() {
        assert_eq!(present_mode_for(&[], false), PresentMode::Fifo);
        assert_eq!(present_mode_for(&[PresentMode::Fifo], false), PresentMode::Fifo);
    }

    #[test]
    fn alpha_prefers_auto_then_first() {
        let modes = [CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Auto];
        assert_eq!(alpha_mode_for(&modes), CompositeAlphaMode::Auto);
        assert_eq!(
            alpha_mode_for(&[CompositeAlphaMode::PostMultiplied]),
            CompositeAlphaMode::PostMultiplied
        );
        assert_eq!(alpha_mode_for(&[]), CompositeAlphaMode::Opaque);
    }
}
