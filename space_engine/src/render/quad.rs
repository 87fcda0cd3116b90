use std::{mem::size_of, num::NonZeroU64};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Uniform slots available per frame; further draws are dropped.
pub(crate) const QUAD_CAPACITY: u64 = 4096;

/// Per-draw data, laid out like `QuadUniforms` in `quad.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct QuadUniforms {
    pub clip_from_local: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub uv_origin: [f32; 2],
    pub uv_extent: [f32; 2],
}

const UNIFORM_SIZE: u64 = size_of::<QuadUniforms>() as u64;

/// Unit quad around the origin, drawn as a triangle strip. Texture
/// coordinates are the corner shifted by one half.
const UNIT_QUAD: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [-0.5, 0.5], [0.5, 0.5]];

/// Pipeline, shared quad geometry and the per-frame uniform ring.
pub(crate) struct QuadPipeline {
    pipeline: wgpu::RenderPipeline,
    corners: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    /// Distance between uniform slots, honoring the device's offset alignment.
    stride: u64,
}

impl QuadPipeline {
    pub(crate) fn new(device: &wgpu::Device, target: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("quad.wgsl").into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad-bindings"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad-layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let corners = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad-corners"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let stride = slot_stride(device.limits().min_uniform_buffer_offset_alignment);
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad-uniform-ring"),
            size: QUAD_CAPACITY * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            corners,
            uniforms,
            layout,
            stride,
        }
    }

    pub(crate) fn stride(&self) -> u64 {
        self.stride
    }

    pub(crate) fn write_slot(&self, queue: &wgpu::Queue, slot: u64, data: &QuadUniforms) {
        queue.write_buffer(&self.uniforms, slot * self.stride, bytemuck::bytes_of(data));
    }

    /// Bindings for one texture; the uniform offset is supplied per draw.
    pub(crate) fn bind_texture(
        &self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad-texture"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.uniforms,
                        offset: 0,
                        size: NonZeroU64::new(UNIFORM_SIZE),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.corners.slice(..));
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>, textures: &wgpu::BindGroup, slot: u64) {
        pass.set_bind_group(0, textures, &[(slot * self.stride) as u32]);
        pass.draw(0..UNIT_QUAD.len() as u32, 0..1);
    }
}

fn slot_stride(alignment: u32) -> u64 {
    let alignment = u64::from(alignment.max(1));
    UNIFORM_SIZE.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_packed_like_the_shader() {
        // mat4x4 + vec4 + vec2 + vec2
        assert_eq!(UNIFORM_SIZE, 96);
    }

    #[test]
    fn slots_round_up_to_the_alignment() {
        assert_eq!(slot_stride(256), 256);
        assert_eq!(slot_stride(64), 128);
        assert_eq!(slot_stride(32), 96);
    }
}
