use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use glam::{const_vec3, Mat4, Vec2, Vec3, Vec4};
use log::debug;
use wgpu::util::DeviceExt;

use crate::{
    entity::Scene,
    particles::{morph::MorphPair, ParticleSystem},
};

const QUAD_VERTICES: [Vec3; 4] = [
    const_vec3!([-0.5, -0.5, 0.]),
    const_vec3!([-0.5, 0.5, 0.]),
    const_vec3!([0.5, -0.5, 0.]),
    const_vec3!([0.5, 0.5, 0.]),
];
const QUAD_INDICES: [u16; 6] = [0, 2, 1, 1, 2, 3];

#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
#[repr(C)]
struct Uniforms {
    view: Mat4,
    proj: Mat4,
    resolution: Vec2,
    size: f32,
    progress: f32,
    primary_color: Vec4,
    secondary_color: Vec4,
}

impl Uniforms {
    fn new(scene: &Scene) -> Self {
        let Scene {
            camera,
            appearance,
            resolution,
            progress,
            ..
        } = scene;

        Self {
            view: camera.view_matrix(),
            proj: camera.proj_matrix(),
            resolution: *resolution,
            size: appearance.particle_size,
            progress: *progress,
            primary_color: appearance.primary_color.extend(1.),
            secondary_color: appearance.secondary_color.extend(1.),
        }
    }
}

/// Draws every particle as an instanced, camera-facing quad blended between
/// two of the normalized point sets.
pub struct ParticleRenderer {
    bound_pair: MorphPair,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    position_buffers: Vec<wgpu::Buffer>,
    size_buffer: wgpu::Buffer,
    instance_count: u32,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
}

impl ParticleRenderer {
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        if self.bound_pair != scene.morph_pair {
            debug!(
                "Rebinding particle positions: {:?} -> {:?}",
                self.bound_pair, scene.morph_pair
            );
            self.bind_group = make_bind_group(
                device,
                &self.bind_group_layout,
                &self.uniform_buffer,
                &self.position_buffers[scene.morph_pair.current],
                &self.position_buffers[scene.morph_pair.target],
                &self.size_buffer,
            );
            self.bound_pair = scene.morph_pair;
        }
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&Uniforms::new(scene)));
    }

    pub fn draw<'rpass>(&'rpass self, rpass: &mut impl wgpu::util::RenderEncoder<'rpass>) {
        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..(QUAD_INDICES.len() as _), 0, 0..self.instance_count);
    }
}

pub struct ParticleRendererBuilder<'a> {
    particle_system: &'a ParticleSystem,
    scene: &'a Scene,
    color_format: Option<wgpu::TextureFormat>,
}

impl<'a> ParticleRendererBuilder<'a> {
    pub fn new(particle_system: &'a ParticleSystem, scene: &'a Scene) -> Self {
        Self {
            particle_system,
            scene,
            color_format: None,
        }
    }

    pub fn color_target_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn build(self, device: &wgpu::Device) -> ParticleRenderer {
        let Self {
            particle_system,
            scene,
            color_format,
        } = self;
        let color_format = color_format.unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Vertex Buffer"),
            contents: bytes_of(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Index Buffer"),
            contents: bytes_of(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let position_buffers = particle_system
            .sets
            .iter()
            .enumerate()
            .map(|(i, set)| {
                let positions: Vec<Vec4> = set.positions().iter().map(|p| p.extend(1.)).collect();
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(format!("Particle Position Buffer {}", i).as_str()),
                    contents: cast_slice(&positions),
                    usage: wgpu::BufferUsages::STORAGE,
                })
            })
            .collect::<Vec<_>>();

        let size_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Size Buffer"),
            contents: cast_slice(&particle_system.sizes),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Uniform Buffer"),
            contents: bytes_of(&Uniforms::new(scene)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let storage_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<Uniforms>() as _),
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
                storage_entry(3),
            ],
        });

        let bound_pair = scene.morph_pair;
        let bind_group = make_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &position_buffers[bound_pair.current],
            &position_buffers[bound_pair.target],
            &size_buffer,
        );

        let shader_module = device.create_shader_module(&wgpu::include_wgsl!("particles.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<Vec3>() as _,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    }],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[wgpu::ColorTargetState {
                    format: color_format,
                    // Additive: overlapping sprites brighten each other.
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                }],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        ParticleRenderer {
            bound_pair,
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            position_buffers,
            size_buffer,
            instance_count: particle_system.max_count() as _,
            bind_group_layout,
            bind_group,
            render_pipeline,
        }
    }
}

fn make_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    current_positions: &wgpu::Buffer,
    target_positions: &wgpu::Buffer,
    size_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Particle Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: current_positions.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: target_positions.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: size_buffer.as_entire_binding(),
            },
        ],
    })
}
