//! GPU-accelerated texture driver for edo using wgpu.
//!
//! Every image in the asset store is uploaded once during initialization
//! as its own GPU texture; each scene command then renders as one
//! instanced quad. Text runs are rasterized on the CPU (fontdue, via
//! `edo-assets`), uploaded as textures and memoized per
//! (text, size, colour).
//!
//! Uses:
//! - [`wgpu`] for GPU rendering
//! - [`winit`] for window creation and input events

mod input;

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use edo_assets::Assets;
use edo_core::{
    app::{AppRunner, EventLoopDriver},
    Color, DrawCmd, Msg,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the wgpu driver.
pub struct WgpuConfig {
    /// Window title.
    pub title: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Resources loaded at startup; the driver uploads every image once
    /// and takes exclusive ownership.
    pub assets: Assets,
}

impl Default for WgpuConfig {
    fn default() -> Self {
        Self {
            title: "edo".into(),
            width: 640,
            height: 480,
            assets: Assets::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// WgpuDriver
// ---------------------------------------------------------------------------

/// GPU-accelerated driver for edo.
///
/// Implements [`EventLoopDriver`] — it owns the main-thread event loop
/// and drives an [`AppRunner`].
pub struct WgpuDriver {
    config: WgpuConfig,
}

impl WgpuDriver {
    pub fn new(config: WgpuConfig) -> Self {
        Self { config }
    }
}

impl EventLoopDriver for WgpuDriver {
    fn run(self, runner: AppRunner) -> Result<(), Box<dyn std::error::Error>> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let mut app = WgpuApp::new(self.config, runner);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GPU types (must match quad.wgsl)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    screen: [f32; 2], // frame width, height in pixels
    _pad: [f32; 2],
}

/// Per-instance data for one quad.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadInstance {
    rect: [f32; 4], // x, y, w, h of the destination in pixels
}

// ---------------------------------------------------------------------------
// GPU state
// ---------------------------------------------------------------------------

/// Memoization key for rasterized text textures.
#[derive(Clone, Hash, PartialEq, Eq)]
struct TextKey {
    text: String,
    /// Bit pattern of the pixel size (`f32` is not `Hash`).
    size: u32,
    color: Color,
}

/// One uploaded texture plus its bind group.
struct QuadTexture {
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
}

/// Which texture an instance draws with.
enum QuadSource {
    Image(usize),
    Text(TextKey),
}

/// Scoped guard for the GPU resources: acquired in `resumed`, released by
/// drop when the event loop exits.
struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_bind_group: wgpu::BindGroup,
    _uniform_buffer: wgpu::Buffer,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    instance_buffer: wgpu::Buffer,
    /// One texture per [`edo_core::ImageId`], uploaded at startup.
    images: Vec<QuadTexture>,
    text_cache: HashMap<TextKey, QuadTexture>,
    assets: Assets,
}

// ---------------------------------------------------------------------------
// WgpuApp — ApplicationHandler
// ---------------------------------------------------------------------------

struct WgpuApp {
    config: WgpuConfig,
    runner: AppRunner,
    gpu: Option<GpuState>,
    window: Option<Arc<Window>>,
}

impl WgpuApp {
    fn new(config: WgpuConfig, runner: AppRunner) -> Self {
        Self {
            config,
            runner,
            gpu: None,
            window: None,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("no suitable GPU adapter found");

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
                .expect("failed to create GPU device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Shader
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("quad.wgsl").into()),
        });

        // Uniforms: the frame size in pixels, fixed for the process lifetime.
        let uniforms = Uniforms {
            screen: [self.config.width as f32, self.config.height as f32],
            _pad: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bg"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Pipeline
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        // rect
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 0,
                            shader_location: 0,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad instances"),
            size: (64 * std::mem::size_of::<QuadInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The explicit upload step: every decoded image becomes one GPU
        // texture, exactly once.
        let assets = std::mem::take(&mut self.config.assets);
        let images = assets
            .images()
            .iter()
            .map(|img| {
                upload_texture(
                    &device,
                    &queue,
                    &texture_layout,
                    &sampler,
                    img.width(),
                    img.height(),
                    img.data(),
                )
            })
            .collect();

        self.gpu = Some(GpuState {
            device,
            queue,
            surface,
            surface_config,
            pipeline,
            uniform_bind_group,
            _uniform_buffer: uniform_buffer,
            texture_layout,
            sampler,
            instance_buffer,
            images,
            text_cache: HashMap::new(),
            assets,
        });
        self.window = Some(window);
    }

    fn render(&mut self) {
        if self.runner.should_quit() {
            return;
        }

        let gpu = match self.gpu.as_mut() {
            Some(g) => g,
            None => return,
        };

        // One full frame per iteration, idle or not.
        let scene = self.runner.draw_frame();

        let mut instances: Vec<QuadInstance> = Vec::with_capacity(scene.cmds().len());
        let mut sources: Vec<QuadSource> = Vec::with_capacity(scene.cmds().len());

        for cmd in scene.cmds() {
            match cmd {
                DrawCmd::Image { image, dst } => {
                    if image.0 < gpu.images.len() {
                        instances.push(QuadInstance {
                            rect: [
                                dst.min.x as f32,
                                dst.min.y as f32,
                                dst.width() as f32,
                                dst.height() as f32,
                            ],
                        });
                        sources.push(QuadSource::Image(image.0));
                    } else {
                        log::debug!("image {image:?} not uploaded, skipping draw");
                    }
                }
                DrawCmd::Text {
                    text,
                    pos,
                    size,
                    color,
                } => {
                    let Some(font) = gpu.assets.font() else {
                        log::debug!("no font loaded, skipping text draw");
                        continue;
                    };
                    let key = TextKey {
                        text: text.clone(),
                        size: size.to_bits(),
                        color: *color,
                    };
                    let texture = gpu.text_cache.entry(key.clone()).or_insert_with(|| {
                        let bitmap = font.rasterize(text, *size, *color);
                        upload_texture(
                            &gpu.device,
                            &gpu.queue,
                            &gpu.texture_layout,
                            &gpu.sampler,
                            bitmap.width,
                            bitmap.height,
                            &bitmap.data,
                        )
                    });
                    instances.push(QuadInstance {
                        rect: [
                            pos.x as f32,
                            pos.y as f32,
                            texture.width as f32,
                            texture.height as f32,
                        ],
                    });
                    sources.push(QuadSource::Text(key));
                }
            }
        }

        // Reallocate the instance buffer if the scene outgrew it.
        let needed = (instances.len() * std::mem::size_of::<QuadInstance>()) as u64;
        if needed > gpu.instance_buffer.size() {
            gpu.instance_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("quad instances"),
                size: needed.next_power_of_two(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !instances.is_empty() {
            gpu.queue
                .write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let surface_texture = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(_) => return,
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("edo-wgpu encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("edo-wgpu pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu_color(scene.clear_color())),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&gpu.pipeline);
            pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.instance_buffer.slice(..));

            for (i, source) in sources.iter().enumerate() {
                let texture = match source {
                    QuadSource::Image(idx) => &gpu.images[*idx],
                    QuadSource::Text(key) => &gpu.text_cache[key],
                };
                pass.set_bind_group(1, &texture.bind_group, &[]);
                let i = i as u32;
                pass.draw(0..4, i..i + 1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }
}

impl ApplicationHandler for WgpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // already initialized
        }

        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("failed to create window"),
        );

        log::info!(
            "opened {}x{} window, setting up GPU",
            self.config.width,
            self.config.height
        );

        self.init_gpu(window);

        // Resources acquired; enter the loop and send Init to the model.
        self.runner.init();
        self.runner.start();
        self.render();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.runner.handle_msg(Msg::Quit);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.surface_config.width = size.width.max(1);
                    gpu.surface_config.height = size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.surface_config);
                }
                self.render();
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(msg) = input::translate_keyboard(&event) {
                    self.runner.handle_msg(msg);
                    if self.runner.should_quit() {
                        event_loop.exit();
                        return;
                    }
                    self.render();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Busy poll: request the next frame immediately.
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release textures, surface and window in reverse order.
        self.gpu = None;
        self.window = None;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a device texture from RGBA8 pixels and bind it with the sampler.
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> QuadTexture {
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("quad texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        extent,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("quad texture bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    QuadTexture {
        bind_group,
        width,
        height,
        _texture: texture,
    }
}

#[inline]
fn wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r() as f64 / 255.0,
        g: c.g() as f64 / 255.0,
        b: c.b() as f64 / 255.0,
        a: c.a() as f64 / 255.0,
    }
}
