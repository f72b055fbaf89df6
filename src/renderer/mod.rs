mod particles;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    entity::Scene,
    particles::ParticleSystem,
    window::{Size, Window},
};

use self::particles::{ParticleRenderer, ParticleRendererBuilder};

pub struct Renderer {
    surface: wgpu::Surface,
    surface_format: wgpu::TextureFormat,
    surface_size: Size,
    device: wgpu::Device,
    queue: wgpu::Queue,
    particle_renderer: ParticleRenderer,
}

impl Renderer {
    pub async fn new(
        window: &impl Window,
        particle_system: &ParticleSystem,
        scene: &Scene,
        size: Size,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::Backends::PRIMARY);
        let surface = unsafe { instance.create_surface(window) };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No adapter found")?;
        info!("Using adapter {:?}", adapter.get_info());

        let surface_format = surface
            .get_preferred_format(&adapter)
            .context("No preferred format found")?;
        if !surface_format.describe().srgb {
            warn!(
                "Surface format {:?} is not sRGB, colors will look darker",
                surface_format
            );
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .context("No device found")?;

        Self::configure_surface(&surface, &device, surface_format, size);

        let particle_renderer = ParticleRendererBuilder::new(particle_system, scene)
            .color_target_format(surface_format)
            .build(&device);

        Ok(Self {
            surface,
            surface_format,
            surface_size: size,
            device,
            queue,
            particle_renderer,
        })
    }

    fn configure_surface(
        surface: &wgpu::Surface,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: Size,
    ) {
        surface.configure(
            device,
            &wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width,
                height: size.height,
                present_mode: wgpu::PresentMode::Fifo,
            },
        )
    }

    /// Resizes the backing framebuffer. Empty sizes (minimized windows) are ignored.
    pub fn resize(&mut self, size: Size) {
        if size.is_empty() || size == self.surface_size {
            return;
        }
        info!("Resizing surface to {}x{}", size.width, size.height);
        Self::configure_surface(&self.surface, &self.device, self.surface_format, size);
        self.surface_size = size;
    }

    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        if self.surface_size.is_empty() {
            return Ok(());
        }

        self.particle_renderer
            .update(&self.device, &self.queue, scene);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                Self::configure_surface(
                    &self.surface,
                    &self.device,
                    self.surface_format,
                    self.surface_size,
                );
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to get next surface texture"),
        };

        let surface_texture_view = surface_texture.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Command Encoder"),
            });

        {
            let clear_color = scene.appearance.clear_color;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear_color.x as f64,
                            g: clear_color.y as f64,
                            b: clear_color.z as f64,
                            a: 1.0,
                        }),
                        store: true,
                    },
                }],
                depth_stencil_attachment: None,
            });
            self.particle_renderer.draw(&mut rpass);
        }

        self.queue.submit(Some(encoder.finish()));

        surface_texture.present();

        Ok(())
    }
}
