#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use std::collections::HashMap;

    use gpu::{FramePacket, Globals, GlobeVertex, MarkerInstance, StaticBuffers, TrackVertex};

    use crate::capability::GraphicsBackend;
    use crate::error::ViewerError;
    use crate::textures::{TextureData, TextureSlot};

    const DEPTH_FORMAT: ::wgpu::TextureFormat = ::wgpu::TextureFormat::Depth24Plus;

    /// Vertices per marker quad.
    const MARKER_QUAD_VERTICES: u32 = 6;

    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub depth_view: ::wgpu::TextureView,

        pub stars_pipeline: ::wgpu::RenderPipeline,
        pub globe_pipeline: ::wgpu::RenderPipeline,
        pub track_pipeline: ::wgpu::RenderPipeline,
        pub marker_pipeline: ::wgpu::RenderPipeline,

        pub globals_buffer: ::wgpu::Buffer,
        pub globals_bind_group: ::wgpu::BindGroup,
        pub star_globals_buffer: ::wgpu::Buffer,
        pub star_globals_bind_group: ::wgpu::BindGroup,

        pub texture_layout: ::wgpu::BindGroupLayout,
        pub sampler: ::wgpu::Sampler,
        pub textures: HashMap<TextureSlot, ::wgpu::TextureView>,
        pub globe_textures: ::wgpu::BindGroup,
        pub star_textures: ::wgpu::BindGroup,
        pub marker_textures: ::wgpu::BindGroup,

        pub globe_vertex_buffer: ::wgpu::Buffer,
        pub globe_index_buffer: ::wgpu::Buffer,
        pub globe_index_count: u32,
        pub star_vertex_buffer: ::wgpu::Buffer,
        pub star_index_buffer: ::wgpu::Buffer,
        pub star_index_count: u32,
        pub track_vertex_buffer: ::wgpu::Buffer,
        pub track_vertex_count: u32,
        pub endpoint_buffer: ::wgpu::Buffer,
        pub endpoint_count: u32,
        pub marker_buffer: ::wgpu::Buffer,
        pub marker_capacity: usize,
        pub marker_count: u32,
    }

    const SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    ambient: vec4<f32>,
    specular: vec4<f32>,
    track_color: vec4<f32>,
    marker_color: vec4<f32>,
    viewport: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0) var color_tex: texture_2d<f32>;
@group(1) @binding(1) var bump_tex: texture_2d<f32>;
@group(1) @binding(2) var specular_tex: texture_2d<f32>;
@group(1) @binding(3) var tex_sampler: sampler;

struct SurfaceOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_sphere(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> SurfaceOut {
    let world = globals.model * vec4<f32>(position, 1.0);
    var out: SurfaceOut;
    out.clip = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = (globals.model * vec4<f32>(normal, 0.0)).xyz;
    out.uv = uv;
    return out;
}

@fragment
fn fs_stars(in: SurfaceOut) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(color_tex, tex_sampler, in.uv).rgb, 1.0);
}

// Bump mapping from screen-space derivatives of the height map.
fn perturb_normal(surf_pos: vec3<f32>, surf_norm: vec3<f32>, uv: vec2<f32>) -> vec3<f32> {
    let bump_scale = globals.viewport.z;
    let duv_dx = dpdx(uv);
    let duv_dy = dpdy(uv);
    let h = textureSample(bump_tex, tex_sampler, uv).r;
    let dh_dx = bump_scale * (textureSample(bump_tex, tex_sampler, uv + duv_dx).r - h);
    let dh_dy = bump_scale * (textureSample(bump_tex, tex_sampler, uv + duv_dy).r - h);

    let sigma_x = dpdx(surf_pos);
    let sigma_y = dpdy(surf_pos);
    let r1 = cross(sigma_y, surf_norm);
    let r2 = cross(surf_norm, sigma_x);
    let det = dot(sigma_x, r1);
    let grad = sign(det) * (dh_dx * r1 + dh_dy * r2);
    return normalize(abs(det) * surf_norm - grad);
}

@fragment
fn fs_globe(in: SurfaceOut) -> @location(0) vec4<f32> {
    let base = textureSample(color_tex, tex_sampler, in.uv).rgb;
    let spec_mask = textureSample(specular_tex, tex_sampler, in.uv).r;
    let n = perturb_normal(in.world_pos, normalize(in.normal), in.uv);

    let l = normalize(globals.light_dir.xyz);
    let v = normalize(globals.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);
    let diffuse = globals.light_color.rgb * max(dot(n, l), 0.0);
    let highlight = pow(max(dot(n, h), 0.0), globals.specular.w);
    let highlight_color = globals.specular.rgb * spec_mask * globals.light_color.rgb * highlight;
    return vec4<f32>(base * (globals.ambient.rgb + diffuse) + highlight_color, 1.0);
}

struct TrackOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_track(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> TrackOut {
    var out: TrackOut;
    out.clip = globals.view_proj * globals.model * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_track(in: TrackOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color * globals.track_color.rgb, globals.track_color.a);
}

struct MarkerOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_marker(
    @builtin(vertex_index) vid: u32,
    @location(0) position: vec3<f32>,
    @location(1) scale: f32,
) -> MarkerOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vid];

    // Fixed pixel size regardless of distance.
    let clip = globals.view_proj * globals.model * vec4<f32>(position, 1.0);
    let size_px = globals.marker_color.a * scale;
    let offset = corner * size_px / globals.viewport.xy * clip.w;

    var out: MarkerOut;
    out.clip = vec4<f32>(clip.xy + offset, clip.zw);
    out.uv = corner * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    return out;
}

@fragment
fn fs_marker(in: MarkerOut) -> @location(0) vec4<f32> {
    let sprite = textureSample(color_tex, tex_sampler, in.uv);
    if (sprite.a < 0.5) {
        discard;
    }
    return vec4<f32>(globals.marker_color.rgb * sprite.rgb, sprite.a);
}
"#;

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("globe-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn upload_texture(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        data: &TextureData,
        srgb: bool,
    ) -> ::wgpu::TextureView {
        let size = ::wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some(&data.name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: if srgb {
                ::wgpu::TextureFormat::Rgba8UnormSrgb
            } else {
                ::wgpu::TextureFormat::Rgba8Unorm
            },
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            ::wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            &data.data,
            ::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(data.bytes_per_row()),
                rows_per_image: Some(data.height),
            },
            size,
        );
        texture.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn texture_bind_group(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        sampler: &::wgpu::Sampler,
        label: &str,
        views: [&::wgpu::TextureView; 3],
    ) -> ::wgpu::BindGroup {
        device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(views[0]),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::TextureView(views[1]),
                },
                ::wgpu::BindGroupEntry {
                    binding: 2,
                    resource: ::wgpu::BindingResource::TextureView(views[2]),
                },
                ::wgpu::BindGroupEntry {
                    binding: 3,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Bind groups for (globe, stars, markers) from the current texture views.
    fn texture_bind_groups(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        sampler: &::wgpu::Sampler,
        textures: &HashMap<TextureSlot, ::wgpu::TextureView>,
    ) -> Result<(::wgpu::BindGroup, ::wgpu::BindGroup, ::wgpu::BindGroup), ViewerError> {
        let view = |slot: TextureSlot| {
            textures
                .get(&slot)
                .ok_or_else(|| ViewerError::Graphics(format!("texture {slot:?} missing")))
        };
        let map = view(TextureSlot::GlobeMap)?;
        let bump = view(TextureSlot::GlobeBump)?;
        let specular = view(TextureSlot::GlobeSpecular)?;
        let stars = view(TextureSlot::Starfield)?;
        let sprite = view(TextureSlot::MarkerSprite)?;
        Ok((
            texture_bind_group(device, layout, sampler, "globe-textures", [map, bump, specular]),
            texture_bind_group(device, layout, sampler, "star-textures", [stars, stars, stars]),
            texture_bind_group(device, layout, sampler, "marker-textures", [sprite, sprite, sprite]),
        ))
    }

    struct PipelineDesc<'a> {
        label: &'a str,
        layout: &'a ::wgpu::PipelineLayout,
        vs: &'a str,
        fs: &'a str,
        buffers: &'a [::wgpu::VertexBufferLayout<'a>],
        topology: ::wgpu::PrimitiveTopology,
        cull_mode: Option<::wgpu::Face>,
        blend: ::wgpu::BlendState,
        depth_write: bool,
        depth_compare: ::wgpu::CompareFunction,
    }

    fn create_pipeline(
        device: &::wgpu::Device,
        shader: &::wgpu::ShaderModule,
        format: ::wgpu::TextureFormat,
        desc: PipelineDesc<'_>,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(desc.layout),
            vertex: ::wgpu::VertexState {
                module: shader,
                entry_point: Some(desc.vs),
                compilation_options: Default::default(),
                buffers: desc.buffers,
            },
            fragment: Some(::wgpu::FragmentState {
                module: shader,
                entry_point: Some(desc.fs),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(desc.blend),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: desc.topology,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: desc.depth_write,
                depth_compare: desc.depth_compare,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn marker_buffer(device: &::wgpu::Device, label: &str, markers: &[MarkerInstance]) -> ::wgpu::Buffer {
        // Zero-sized vertex buffers are invalid; keep one hidden instance.
        let hidden = [MarkerInstance {
            position: [0.0; 3],
            scale: 0.0,
        }];
        let contents = if markers.is_empty() { &hidden[..] } else { markers };
        device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(contents),
            usage: ::wgpu::BufferUsages::VERTEX | ::wgpu::BufferUsages::COPY_DST,
        })
    }

    fn vertex_buffer<T: bytemuck::Pod>(device: &::wgpu::Device, label: &str, data: &[T]) -> ::wgpu::Buffer {
        device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: ::wgpu::BufferUsages::VERTEX,
        })
    }

    fn index_buffer(device: &::wgpu::Device, label: &str, data: &[u32]) -> ::wgpu::Buffer {
        device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: ::wgpu::BufferUsages::INDEX,
        })
    }

    fn backends(backend: GraphicsBackend) -> ::wgpu::Backends {
        match backend {
            GraphicsBackend::WebGpu => ::wgpu::Backends::BROWSER_WEBGPU,
            GraphicsBackend::WebGl2 => ::wgpu::Backends::GL,
        }
    }

    /// Build the renderer on `canvas` using exactly one browser API.
    ///
    /// A canvas keeps the first context type requested from it, so a failed
    /// attempt needs a fresh canvas for the next backend.
    pub async fn init_wgpu(
        canvas: web_sys::HtmlCanvasElement,
        buffers: &StaticBuffers,
        backend: GraphicsBackend,
    ) -> Result<WgpuContext, ViewerError> {
        let width = canvas.width();
        let height = canvas.height();

        // `wgpu::Surface` must not outlive its `wgpu::Instance`; the instance
        // lives as long as the page.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: backends(backend),
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| ViewerError::Graphics(format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::Graphics(format!("adapter error: {e}")))?;

        // The 4k textures exceed the WebGL2 baseline; take what the adapter offers.
        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("globe-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(|e| ViewerError::Graphics(format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| ViewerError::Graphics("surface has no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("globe-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER)),
        });

        let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("globals-bgl"),
            entries: &[::wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: ::wgpu::BindingType::Buffer {
                    ty: ::wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_entry = |binding: u32| ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::FRAGMENT,
            ty: ::wgpu::BindingType::Texture {
                sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: ::wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("textures-bgl"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                ::wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_size = std::mem::size_of::<Globals>() as u64;
        let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("globe-globals"),
            size: globals_size,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let star_globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("star-globals"),
            size: globals_size,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("globe-globals-bg"),
            layout: &globals_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let star_globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("star-globals-bg"),
            layout: &globals_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: star_globals_buffer.as_entire_binding(),
            }],
        });

        let textured_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("textured-pipeline-layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });
        let track_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("track-pipeline-layout"),
            bind_group_layouts: &[&globals_layout],
            immediate_size: 0,
        });

        let sphere_buffers = [::wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlobeVertex>() as ::wgpu::BufferAddress,
            step_mode: ::wgpu::VertexStepMode::Vertex,
            attributes: &[
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32x3,
                    offset: GlobeVertex::NORMAL_OFFSET,
                    shader_location: 1,
                },
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32x2,
                    offset: GlobeVertex::UV_OFFSET,
                    shader_location: 2,
                },
            ],
        }];
        let track_buffers = [::wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TrackVertex>() as ::wgpu::BufferAddress,
            step_mode: ::wgpu::VertexStepMode::Vertex,
            attributes: &[
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32x3,
                    offset: TrackVertex::COLOR_OFFSET,
                    shader_location: 1,
                },
            ],
        }];
        let marker_buffers = [::wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MarkerInstance>() as ::wgpu::BufferAddress,
            step_mode: ::wgpu::VertexStepMode::Instance,
            attributes: &[
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                ::wgpu::VertexAttribute {
                    format: ::wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }];

        // The starfield is seen from inside the sphere.
        let stars_pipeline = create_pipeline(
            &device,
            &shader,
            config.format,
            PipelineDesc {
                label: "stars-pipeline",
                layout: &textured_layout,
                vs: "vs_sphere",
                fs: "fs_stars",
                buffers: &sphere_buffers,
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(::wgpu::Face::Front),
                blend: ::wgpu::BlendState::REPLACE,
                depth_write: true,
                depth_compare: ::wgpu::CompareFunction::Less,
            },
        );
        let globe_pipeline = create_pipeline(
            &device,
            &shader,
            config.format,
            PipelineDesc {
                label: "globe-pipeline",
                layout: &textured_layout,
                vs: "vs_sphere",
                fs: "fs_globe",
                buffers: &sphere_buffers,
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(::wgpu::Face::Back),
                blend: ::wgpu::BlendState::REPLACE,
                depth_write: true,
                depth_compare: ::wgpu::CompareFunction::Less,
            },
        );
        let track_pipeline = create_pipeline(
            &device,
            &shader,
            config.format,
            PipelineDesc {
                label: "track-pipeline",
                layout: &track_layout,
                vs: "vs_track",
                fs: "fs_track",
                buffers: &track_buffers,
                topology: ::wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
            },
        );
        let marker_pipeline = create_pipeline(
            &device,
            &shader,
            config.format,
            PipelineDesc {
                label: "marker-pipeline",
                layout: &textured_layout,
                vs: "vs_marker",
                fs: "fs_marker",
                buffers: &marker_buffers,
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
            },
        );

        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("globe-sampler"),
            address_mode_u: ::wgpu::AddressMode::Repeat,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let textures: HashMap<TextureSlot, ::wgpu::TextureView> = TextureSlot::ALL
            .iter()
            .map(|slot| {
                let view = upload_texture(&device, &queue, &slot.placeholder(), slot.is_srgb());
                (*slot, view)
            })
            .collect();
        let (globe_textures, star_textures, marker_textures) =
            texture_bind_groups(&device, &texture_layout, &sampler, &textures)?;

        let globe_vertex_buffer = vertex_buffer(&device, "globe-vertices", &buffers.globe_vertices);
        let globe_index_buffer = index_buffer(&device, "globe-indices", &buffers.globe_indices);
        let star_vertex_buffer = vertex_buffer(&device, "star-vertices", &buffers.star_vertices);
        let star_index_buffer = index_buffer(&device, "star-indices", &buffers.star_indices);
        let track_vertex_buffer = if buffers.track_vertices.is_empty() {
            vertex_buffer(
                &device,
                "track-vertices",
                &[TrackVertex {
                    position: [0.0; 3],
                    color: [0.0; 3],
                }],
            )
        } else {
            vertex_buffer(&device, "track-vertices", &buffers.track_vertices)
        };
        let endpoint_buffer = marker_buffer(&device, "endpoint-instances", &buffers.endpoint_instances);
        let marker_capacity = buffers.endpoint_instances.len() / 2;
        let marker_buffer_init = vec![
            MarkerInstance {
                position: [0.0; 3],
                scale: 0.0,
            };
            marker_capacity
        ];
        let moving_buffer = marker_buffer(&device, "marker-instances", &marker_buffer_init);

        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas,
            depth_view,
            stars_pipeline,
            globe_pipeline,
            track_pipeline,
            marker_pipeline,
            globals_buffer,
            globals_bind_group,
            star_globals_buffer,
            star_globals_bind_group,
            texture_layout,
            sampler,
            textures,
            globe_textures,
            star_textures,
            marker_textures,
            globe_vertex_buffer,
            globe_index_buffer,
            globe_index_count: buffers.globe_indices.len() as u32,
            star_vertex_buffer,
            star_index_buffer,
            star_index_count: buffers.star_indices.len() as u32,
            track_vertex_buffer,
            track_vertex_count: buffers.track_vertices.len() as u32,
            endpoint_buffer,
            endpoint_count: buffers.endpoint_instances.len() as u32,
            marker_buffer: moving_buffer,
            marker_capacity,
            marker_count: 0,
        })
    }

    /// Largest texture edge the device accepts.
    pub fn max_texture_dimension(ctx: &WgpuContext) -> u32 {
        ctx.device.limits().max_texture_dimension_2d
    }

    /// Replace a placeholder with a loaded image.
    pub fn set_texture(
        ctx: &mut WgpuContext,
        slot: TextureSlot,
        data: &TextureData,
    ) -> Result<(), ViewerError> {
        let view = upload_texture(&ctx.device, &ctx.queue, data, slot.is_srgb());
        ctx.textures.insert(slot, view);
        let (globe, stars, markers) =
            texture_bind_groups(&ctx.device, &ctx.texture_layout, &ctx.sampler, &ctx.textures)?;
        ctx.globe_textures = globe;
        ctx.star_textures = stars;
        ctx.marker_textures = markers;
        Ok(())
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    fn upload_markers(ctx: &mut WgpuContext, markers: &[MarkerInstance]) {
        if markers.len() > ctx.marker_capacity {
            ctx.marker_buffer = marker_buffer(&ctx.device, "marker-instances", markers);
            ctx.marker_capacity = markers.len();
        } else if !markers.is_empty() {
            ctx.queue
                .write_buffer(&ctx.marker_buffer, 0, bytemuck::cast_slice(markers));
        }
        ctx.marker_count = markers.len() as u32;
    }

    pub fn render_frame(ctx: &mut WgpuContext, packet: &FramePacket) -> Result<(), ViewerError> {
        let frame = match ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(::wgpu::SurfaceError::Lost | ::wgpu::SurfaceError::Outdated) => {
                ctx.surface.configure(&ctx.device, &ctx.config);
                return Ok(());
            }
            Err(e) => return Err(ViewerError::Graphics(format!("surface acquire failed: {e}"))),
        };
        let view = frame
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        ctx.queue
            .write_buffer(&ctx.globals_buffer, 0, bytemuck::bytes_of(&packet.globals));
        ctx.queue.write_buffer(
            &ctx.star_globals_buffer,
            0,
            bytemuck::bytes_of(&packet.globals.without_model()),
        );
        upload_markers(ctx, &packet.markers);

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("globe-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("globe-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color::BLACK),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            // Starfield: does not spin with the globe.
            rpass.set_pipeline(&ctx.stars_pipeline);
            rpass.set_bind_group(0, &ctx.star_globals_bind_group, &[]);
            rpass.set_bind_group(1, &ctx.star_textures, &[]);
            rpass.set_vertex_buffer(0, ctx.star_vertex_buffer.slice(..));
            rpass.set_index_buffer(ctx.star_index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..ctx.star_index_count, 0, 0..1);

            rpass.set_pipeline(&ctx.globe_pipeline);
            rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
            rpass.set_bind_group(1, &ctx.globe_textures, &[]);
            rpass.set_vertex_buffer(0, ctx.globe_vertex_buffer.slice(..));
            rpass.set_index_buffer(ctx.globe_index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..ctx.globe_index_count, 0, 0..1);

            if ctx.track_vertex_count > 0 {
                rpass.set_pipeline(&ctx.track_pipeline);
                rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
                rpass.set_vertex_buffer(0, ctx.track_vertex_buffer.slice(..));
                rpass.draw(0..ctx.track_vertex_count, 0..1);
            }

            rpass.set_pipeline(&ctx.marker_pipeline);
            rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);
            rpass.set_bind_group(1, &ctx.marker_textures, &[]);
            if ctx.endpoint_count > 0 {
                rpass.set_vertex_buffer(0, ctx.endpoint_buffer.slice(..));
                rpass.draw(0..MARKER_QUAD_VERTICES, 0..ctx.endpoint_count);
            }
            if ctx.marker_count > 0 {
                rpass.set_vertex_buffer(0, ctx.marker_buffer.slice(..));
                rpass.draw(0..MARKER_QUAD_VERTICES, 0..ctx.marker_count);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{FramePacket, StaticBuffers};

    use crate::capability::GraphicsBackend;
    use crate::error::ViewerError;
    use crate::textures::{TextureData, TextureSlot};

    #[derive(Debug, Default)]
    pub struct WgpuContext;

    pub async fn init_wgpu(
        _canvas: web_sys::HtmlCanvasElement,
        _buffers: &StaticBuffers,
        _backend: GraphicsBackend,
    ) -> Result<WgpuContext, ViewerError> {
        Err(ViewerError::Graphics(
            "wgpu initialization is only available on wasm32 targets".to_string(),
        ))
    }

    pub fn max_texture_dimension(_ctx: &WgpuContext) -> u32 {
        0
    }

    pub fn set_texture(
        _ctx: &mut WgpuContext,
        _slot: TextureSlot,
        _data: &TextureData,
    ) -> Result<(), ViewerError> {
        Ok(())
    }

    pub fn resize_wgpu(_ctx: &mut WgpuContext, _width: u32, _height: u32) {}

    pub fn render_frame(_ctx: &mut WgpuContext, _packet: &FramePacket) -> Result<(), ViewerError> {
        Err(ViewerError::Graphics(
            "wgpu rendering is only available on wasm32 targets".to_string(),
        ))
    }
}

pub use imp::{
    WgpuContext, init_wgpu, max_texture_dimension, render_frame, resize_wgpu, set_texture,
};
