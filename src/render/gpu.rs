use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::{Mat3, Vec3};
use log::{info, warn};
use wgpu::util::DeviceExt;

use crate::environment::{Backdrop, CubeFaces, EnvironmentState, FACE_COUNT};
use crate::lighting::{LightKind, LightingRig};
use crate::material::{MaterialSpec, Shading, Side};
use crate::render::geometry::{MeshData, VERTEX_STRIDE};
use crate::render::shader::{MAX_LIGHTS, MESH_SHADER, SKY_SHADER};
use crate::render::FrameTarget;
use crate::render_loop::Frame;
use crate::scene::{MeshPart, SceneObject};
use crate::viewport::CameraParams;

/// GPU renderer backed by wgpu that draws the scene subject over its backdrop.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthBuffer,
    mesh_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    environment_layout: wgpu::BindGroupLayout,
    environment: EnvironmentBinding,
    parts: HashMap<String, PartBuffers>,
    dropped_lights_reported: bool,
}

impl Renderer {
    /// Initializes the GPU renderer for a window or canvas of the given size.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("surface has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: instance_backends(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .context("failed to create render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("renderer-device"),
            required_features: wgpu::Features::empty(),
            required_limits: required_limits(&adapter),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            // One frame per display refresh, like requestAnimationFrame.
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        info!(
            "surface configured: {width}x{height} {surface_format:?} on {}",
            adapter.get_info().name
        );

        let depth = DepthBuffer::create(&device, width, height);

        let global_layout = uniform_layout::<GlobalUniform>(&device, "global-bind-layout");
        let object_layout = uniform_layout::<ObjectConstants>(&device, "object-bind-layout");
        let environment_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("environment-bind-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let mesh_pipeline = create_mesh_pipeline(
            &device,
            surface_format,
            &[&global_layout, &object_layout, &environment_layout],
        );
        let sky_pipeline =
            create_sky_pipeline(&device, surface_format, &[&global_layout, &environment_layout]);

        // Stands in until the real map arrives, so the bind group is never missing.
        let placeholder = CubeFaces::solid(1, [0, 0, 0, 255]);
        let environment =
            EnvironmentBinding::upload(&device, &queue, &environment_layout, &placeholder, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            mesh_pipeline,
            sky_pipeline,
            global_buffer,
            global_bind_group,
            object_layout,
            environment_layout,
            environment,
            parts: HashMap::new(),
            dropped_lights_reported: false,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigures the surface after `Lost`/`Outdated` errors.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn sync_environment(&mut self, state: &EnvironmentState) {
        if let EnvironmentState::Loaded(faces) = state {
            if !self.environment.loaded {
                self.environment = EnvironmentBinding::upload(
                    &self.device,
                    &self.queue,
                    &self.environment_layout,
                    faces,
                    true,
                );
                info!("uploaded {}x{} environment cube", faces.size(), faces.size());
            }
        }
    }

    fn update_globals(&mut self, camera: &CameraParams, lights: &LightingRig) {
        let mut uniform = GlobalUniform::zeroed();
        uniform.view_proj = camera.view_proj().to_cols_array_2d();
        uniform.inv_sky_view_proj = camera.inverse_sky_view_proj().to_cols_array_2d();
        uniform.camera_position = camera.position.extend(1.0).into();

        let mut count = 0;
        for light in lights.positioned() {
            if count == MAX_LIGHTS {
                if !self.dropped_lights_reported {
                    warn!(
                        "{} positioned lights exceed the renderer limit of {MAX_LIGHTS}; extra lights are dropped",
                        lights.positioned().count()
                    );
                    self.dropped_lights_reported = true;
                }
                break;
            }
            let color = srgb_to_linear(light.color) * light.intensity;
            uniform.lights[count] = match light.kind {
                LightKind::Directional { position } => LightUniform {
                    position: position.normalize_or_zero().extend(0.0).into(),
                    color: color.extend(0.0).into(),
                },
                LightKind::Point { position, range } => LightUniform {
                    position: position.extend(1.0).into(),
                    color: color.extend(range).into(),
                },
                LightKind::Ambient => continue,
            };
            count += 1;
        }
        let ambient = lights
            .lights()
            .iter()
            .filter(|light| matches!(light.kind, LightKind::Ambient))
            .fold(Vec3::ZERO, |acc, light| {
                acc + srgb_to_linear(light.color) * light.intensity
            });
        uniform.ambient = ambient.extend(count as f32).into();

        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&uniform));
    }

    fn update_part(&mut self, object: &SceneObject, part: &MeshPart, state: &EnvironmentState) {
        if !self.parts.contains_key(&part.name) {
            let buffers = PartBuffers::create(&self.device, &self.object_layout, part);
            self.parts.insert(part.name.clone(), buffers);
        }
        let Some(buffers) = self.parts.get(&part.name) else {
            return;
        };
        let model = object.part_matrix(part);
        let constants = ObjectConstants {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(object.normal_matrix(part)),
            color: srgb_to_linear(part.material.color).extend(1.0).into(),
            surface: surface_params(&part.material, state),
            side: [side_code(part.material.side), 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&buffers.uniform, 0, bytes_of(&constants));
    }
}

impl FrameTarget for Renderer {
    type Error = wgpu::SurfaceError;

    /// Resizes the swap chain to match the new dimensions.
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, width, height);
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), wgpu::SurfaceError> {
        let scene = frame.scene;
        let state = scene.environment.state();
        self.sync_environment(state);
        self.update_globals(&frame.camera, &scene.lights);
        for part in &scene.subject.parts {
            self.update_part(&scene.subject, part, state);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        let (clear, draw_sky) = match &frame.backdrop {
            Backdrop::Color(color) => (*color, false),
            Backdrop::Environment(_) => (Vec3::ZERO, self.environment.loaded),
        };
        let clear = srgb_to_linear(clear);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.x as f64,
                        g: clear.y as f64,
                        b: clear.z as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if draw_sky {
            pass.set_pipeline(&self.sky_pipeline);
            pass.set_bind_group(0, &self.global_bind_group, &[]);
            pass.set_bind_group(1, &self.environment.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        pass.set_pipeline(&self.mesh_pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);
        pass.set_bind_group(2, &self.environment.bind_group, &[]);
        for part in &scene.subject.parts {
            let Some(buffers) = self.parts.get(&part.name) else {
                continue;
            };
            pass.set_bind_group(1, &buffers.bind_group, &[]);
            pass.set_vertex_buffer(0, buffers.vertex.slice(..));
            pass.set_index_buffer(buffers.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..buffers.index_count, 0, 0..1);
        }

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn instance_backends() -> wgpu::Backends {
    wgpu::Backends::PRIMARY
}

#[cfg(target_arch = "wasm32")]
fn instance_backends() -> wgpu::Backends {
    wgpu::Backends::all()
}

#[cfg(not(target_arch = "wasm32"))]
fn required_limits(_adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits::default()
}

#[cfg(target_arch = "wasm32")]
fn required_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
}

fn uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
    })
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh-shader"),
        source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh-pipeline-layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: (VERTEX_STRIDE * std::mem::size_of::<f32>()) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: 0,
                        shader_location: 0,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: (3 * std::mem::size_of::<f32>()) as u64,
                        shader_location: 1,
                    },
                ],
            }],
        },
        // Side selection happens in the fragment shader, per material.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    })
}

fn create_sky_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sky-shader"),
        source: wgpu::ShaderSource::Wgsl(SKY_SHADER.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sky-pipeline-layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sky-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_sky"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_sky"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    })
}

fn surface_params(material: &MaterialSpec, state: &EnvironmentState) -> [f32; 4] {
    let unlit = match material.shading {
        Shading::Standard => 0.0,
        Shading::Unlit => 1.0,
    };
    [
        material.roughness,
        material.metalness,
        material.reflectance(state),
        unlit,
    ]
}

fn side_code(side: Side) -> f32 {
    match side {
        Side::Front => 0.0,
        Side::Back => 1.0,
        Side::Both => 2.0,
    }
}

/// Hex colors are authored in sRGB; the shader works in linear space.
fn srgb_to_linear(color: Vec3) -> Vec3 {
    let channel = |c: f32| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(color.x), channel(color.y), channel(color.z))
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

/// Cube texture and sampler bound at the environment slot.
struct EnvironmentBinding {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    loaded: bool,
}

impl EnvironmentBinding {
    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        faces: &CubeFaces,
        loaded: bool,
    ) -> Self {
        let size = faces.size();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("environment-cube"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: FACE_COUNT as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for layer in 0..FACE_COUNT {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                faces.face(layer),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size),
                    rows_per_image: Some(size),
                },
                wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
            );
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("environment-cube-view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("environment-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("environment-bind-group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        Self {
            _texture: texture,
            bind_group,
            loaded,
        }
    }
}

struct PartBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PartBuffers {
    fn create(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, part: &MeshPart) -> Self {
        let mesh = MeshData::from_geometry(&part.geometry);
        let label = &part.name;
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}-uniform")),
            size: std::mem::size_of::<ObjectConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
            uniform,
            bind_group,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LightUniform {
    position: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlobalUniform {
    view_proj: [[f32; 4]; 4],
    inv_sky_view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectConstants {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    color: [f32; 4],
    surface: [f32; 4],
    side: [f32; 4],
}
