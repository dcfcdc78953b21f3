use std::borrow::Cow;
use std::fs;
use std::path::Path;

use bytemuck::bytes_of;
use thiserror::Error;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState, Buffer, BufferBindingType,
    BufferDescriptor, BufferUsages, ColorTargetState, ColorWrites, Device, ErrorFilter,
    FragmentState, MultisampleState, PipelineLayoutDescriptor, PrimitiveState, Queue, RenderPass,
    RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource, ShaderStages,
    TextureFormat, TextureSampleType, TextureViewDimension, VertexState,
};

use crate::camera::Camera;
use crate::glint::sampling::SamplingTables;
use crate::glint::scene::Scene;
use crate::glint::texture::LookupTexture;
use crate::glint::uniforms::{marshal, FrameUniforms, MarshalError};
use crate::settings::RenderSettings;

pub mod builder;
pub mod sampling;
pub mod scene;
pub mod texture;
pub mod uniforms;

/// Setup failures of the external ray tracing program. All fatal: the
/// application cannot recover a missing or broken shader.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}: {source}")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to compile shader {path}:\n{log}")]
    Compile { path: String, log: String },
    #[error("failed to link the ray tracing pipeline:\n{log}")]
    Link { log: String },
}

/// Host side of the ray tracer: owns the shader pipeline, the frame
/// uniform buffer and the sampling-table textures, and flattens the scene
/// into them once per frame. All intersection and shading math lives in
/// the shader.
pub struct Glint {
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    tables: SamplingTables,
    pub jitter: LookupTexture,
    pub randoms: LookupTexture,
}

impl Glint {
    pub fn new(
        device: &Device,
        queue: &Queue,
        surface_format: TextureFormat,
        shader_path: &Path,
    ) -> Result<Self, ShaderError> {
        let path = shader_path.display().to_string();
        let source = fs::read_to_string(shader_path).map_err(|source| ShaderError::NotFound {
            path: path.clone(),
            source,
        })?;

        // wgpu reports bad WGSL through validation error scopes; catch it
        // here instead of letting the device error handler panic later.
        device.push_error_scope(ErrorFilter::Validation);
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Ray Trace Program"),
            source: ShaderSource::Wgsl(Cow::Owned(source)),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Compile {
                path,
                log: error.to_string(),
            });
        }

        let tables = SamplingTables::from_entropy();
        let jitter = LookupTexture::jitter_table(device, queue, tables.jitter(), tables.jitter_size());
        let randoms = LookupTexture::random_pool(device, queue, tables.randoms());

        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let lookup_entry = |binding| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: false },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                lookup_entry(1),
                lookup_entry(2),
            ],
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&jitter.view),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::TextureView(&randoms.view),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Ray Trace Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // A stage/layout mismatch only surfaces at pipeline creation, the
        // closest thing WGSL has to a link stage.
        device.push_error_scope(ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Ray Trace Pipeline"),
            layout: Some(&layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link {
                log: error.to_string(),
            });
        }

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            tables,
            jitter,
            randoms,
        })
    }

    /// Marshals the frame parameter set and uploads it. Called exactly
    /// once per displayed frame, after all pending scene and camera
    /// mutations have been applied.
    pub fn prepare(
        &self,
        queue: &Queue,
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
    ) -> Result<(), MarshalError> {
        let uniforms = marshal(scene, camera, settings, &self.tables)?;
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&uniforms));
        Ok(())
    }

    pub fn render<'pass>(&'pass self, render_pass: &mut RenderPass<'pass>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        // Fullscreen triangle; the vertex stage synthesizes the corners.
        render_pass.draw(0..3, 0..1);
    }
}
