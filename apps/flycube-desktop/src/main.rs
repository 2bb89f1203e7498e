mod clock;
mod hud;

use anyhow::{Context, Result};
use clap::Parser;
use clock::FrameClock;
use flycube_camera::PerspectiveCamera;
use flycube_config::AppConfig;
use flycube_input::InputState;
use flycube_render_wgpu::{
    CubeRenderer, ProgramTarget, ShaderProgram, ShaderSource, ShaderStage, UniformBlock,
    UniformWriter,
};
use glam::{Mat4, Vec3};
use hud::Hud;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pixel-precise scroll deltas (touchpads) are converted to wheel lines at this rate.
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;
/// Frames between frame-time debug logs.
const STATS_INTERVAL: u64 = 600;

#[derive(Parser)]
#[command(name = "flycube-desktop", about = "Fly around a lit cube")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vertex shader (WGSL)
    #[arg(long)]
    vertex_shader: Option<PathBuf>,

    /// Fragment shader (WGSL)
    #[arg(long)]
    fragment_shader: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    /// Defaults, then the config file, then command-line overrides.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(path) = &self.vertex_shader {
            config.shaders.vertex = path.clone();
        }
        if let Some(path) = &self.fragment_shader {
            config.shaders.fragment = path.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Everything the frame loop mutates apart from GPU objects.
struct AppState {
    config: AppConfig,
    camera: PerspectiveCamera,
    input: InputState,
    clock: FrameClock,
}

impl AppState {
    fn new(config: AppConfig) -> Self {
        Self {
            camera: PerspectiveCamera::new(config.camera),
            config,
            input: InputState::default(),
            clock: FrameClock::new(120),
        }
    }

    /// Advance the camera by one frame of input.
    fn update(&mut self, dt: f32) {
        self.input.apply_frame(&mut self.camera, dt);

        if self.clock.frames() % STATS_INTERVAL == 0 {
            tracing::debug!(
                "frame {}: avg {:?}, max {:?}",
                self.clock.frames(),
                self.clock.average(),
                self.clock.max()
            );
        }
    }

    /// Write the per-frame transforms and lighting inputs.
    fn write_uniforms(&self, program: &mut impl UniformWriter, aspect: f32) {
        let scene = &self.config.scene;
        program.set_mat4("model", Mat4::from_scale(Vec3::splat(scene.model_scale)));
        program.set_mat4("view", self.camera.view_matrix());
        program.set_mat4("projection", self.camera.projection_matrix(aspect));
        program.set_vec3("light_pos", scene.light_position);
        program.set_vec3("view_pos", self.camera.view_position());
    }
}

/// GPU objects created once the window exists.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: CubeRenderer,
    hud: Hud,
}

impl Gpu {
    fn new(window: Arc<Window>, config: &AppConfig, shaders: &[ShaderSource; 2]) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("flycube_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("creating device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.window.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let [vertex, fragment] = shaders;
        let program = ShaderProgram::new(
            &device,
            vertex,
            fragment,
            UniformBlock::scene(),
            ProgramTarget::with_depth(surface_format),
        )?;
        let mut renderer = CubeRenderer::new(&device, program, surface_config.width, surface_config.height);
        let [r, g, b, a] = config.scene.clear_color;
        renderer.set_clear_color(wgpu::Color { r, g, b, a });

        let hud = Hud::new(&window, &device, surface_format);

        tracing::info!(
            "GPU initialized with {} backend ({})",
            adapter.get_info().backend.to_str(),
            adapter.get_info().name
        );

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            renderer,
            hud,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface_config.width = size.width.max(1);
        self.surface_config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.renderer
            .resize(&self.device, self.surface_config.width, self.surface_config.height);
    }

    fn aspect(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }
}

struct GpuApp {
    state: AppState,
    shaders: [ShaderSource; 2],
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    /// Fatal startup error, returned from `main` once the event loop exits.
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: AppConfig, shaders: [ShaderSource; 2]) -> Self {
        Self {
            state: AppState::new(config),
            shaders,
            window: None,
            gpu: None,
            init_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.state.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let gpu = Gpu::new(window.clone(), &self.state.config, &self.shaders)?;
        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode, pressed: bool) {
        self.state.input.handle_key(key, pressed);
        if pressed && key == KeyCode::F1 {
            if let Some(gpu) = &mut self.gpu {
                gpu.hud.visible = !gpu.hud.visible;
            }
        }
        if self.state.input.exit_requested() {
            tracing::info!("exit requested");
            event_loop.exit();
        }
    }

    fn redraw(&mut self) {
        let dt = self.state.clock.tick();
        self.state.update(dt);

        let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let aspect = gpu.aspect();
        self.state.write_uniforms(gpu.renderer.program_mut(), aspect);
        gpu.renderer.render(&gpu.device, &gpu.queue, &view);

        gpu.hud.render(
            window,
            &gpu.device,
            &gpu.queue,
            &view,
            [gpu.surface_config.width, gpu.surface_config.height],
            &self.state.camera,
            &self.state.clock,
        );

        window.pre_present_notify();
        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_error.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            tracing::error!("initialization failed: {err:#}");
            self.init_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) {
            // egui tracks pointer and key state even while hidden
            let consumed = gpu.hud.on_window_event(window, &event);
            if gpu.hud.visible && consumed {
                if matches!(event, WindowEvent::CursorMoved { .. }) {
                    self.state.input.cursor_captured();
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.handle_key(event_loop, key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.input.cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.input.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_SCROLL_LINE) as f32,
                };
                self.state.input.scroll(lines);
            }
            WindowEvent::Focused(false) => {
                self.state.input.release_all();
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("flycube-desktop starting");

    let config = cli.resolve_config()?;
    let shaders = [
        ShaderSource::load(ShaderStage::Vertex, &config.shaders.vertex)?,
        ShaderSource::load(ShaderStage::Fragment, &config.shaders.fragment)?,
    ];

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, shaders);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.init_error.take() {
        return Err(err);
    }
    tracing::info!("flycube-desktop exiting");
    Ok(())
}
