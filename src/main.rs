use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{debug, info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use cube_viewer::{describe_camera, FrameDriver, Mesh, RenderOptions, Renderer};

const USAGE: &str = "Usage: cube-viewer [MESH_FILE] [--no-depth] [--summary-only] [--frames N]";
const HEADLESS_DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mesh = load_mesh(options.mesh_path.as_deref())?;

    println!(
        "Loaded mesh with {} vertices ({} triangles)",
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    if options.summary_only {
        return run_headless(options.frames);
    }

    match run_interactive(mesh, options.render_options()) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or WAYLAND_DISPLAY to enable rendering)."
            );
            run_headless(options.frames)
        }
        Err(err) => Err(err),
    }
}

fn load_mesh(path: Option<&Path>) -> Result<Mesh> {
    match path {
        Some(path) => {
            let mesh = Mesh::load(path)
                .with_context(|| format!("failed to load mesh {}", path.display()))?;
            info!("parsed mesh from {}", path.display());
            Ok(mesh)
        }
        None => Ok(Mesh::cube()),
    }
}

fn run_headless(frames: u32) -> Result<()> {
    let mut driver = FrameDriver::default();
    for _ in 0..frames {
        driver.tick(HEADLESS_DT);
    }
    println!(
        "Simulated {} frame(s) over {:.2}s",
        driver.frame_count(),
        driver.elapsed()
    );
    println!("Final {}", describe_camera(driver.scene()));
    Ok(())
}

fn run_interactive(mesh: Mesh, options: RenderOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(mesh, options);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    info!(
        "exiting after {} frame(s); {}",
        app.driver.frame_count(),
        describe_camera(app.driver.scene())
    );
    Ok(())
}

struct ViewerApp {
    mesh: Mesh,
    options: RenderOptions,
    driver: FrameDriver,
    renderer: Option<Renderer>,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(mesh: Mesh, options: RenderOptions) -> Self {
        Self {
            mesh,
            options,
            driver: FrameDriver::default(),
            renderer: None,
            last_frame: Instant::now(),
            last_error: None,
        }
    }

    fn init_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("Cube Viewer")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );
        let renderer = block_on(Renderer::new(window, &self.mesh, self.options))
            .context("failed to initialize renderer")?;
        self.driver.set_aspect_ratio(renderer.aspect_ratio());
        info!(
            "uploaded {} vertices / {} triangles",
            self.mesh.vertex_count(),
            self.mesh.triangle_count()
        );
        self.renderer = Some(renderer);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn process_window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        event: WindowEvent,
    ) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                self.driver.set_aspect_ratio(renderer.aspect_ratio());
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let locked = self.driver.toggle_pointer_lock();
                apply_pointer_lock(renderer.window(), locked);
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.release_pointer();
            }
            WindowEvent::Focused(false) => self.release_pointer(),
            WindowEvent::RedrawRequested => self.redraw()?,
            _ => {}
        }
        Ok(())
    }

    fn release_pointer(&mut self) {
        if !self.driver.pointer_locked() {
            return;
        }
        self.driver.set_pointer_locked(false);
        if let Some(renderer) = self.renderer.as_ref() {
            apply_pointer_lock(renderer.window(), false);
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let uniforms = self.driver.tick(dt);
        renderer.write_uniforms(&uniforms);
        match renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
                warn!("surface lost; reconfigured and skipped frame");
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(err) => warn!("skipping frame: {err}"),
        }
        Ok(())
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.init_renderer(event_loop) {
            self.last_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.renderer.as_ref().map(Renderer::window_id) != Some(window_id) {
            return;
        }
        if let Err(err) = self.process_window_event(event_loop, event) {
            self.last_error = Some(err);
            event_loop.exit();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.driver.pointer_moved(Vec2::new(dx as f32, dy as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

fn apply_pointer_lock(window: &Window, locked: bool) {
    let grab = if locked {
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(err) = grab {
        warn!("unable to change cursor grab: {err}");
    }
    window.set_cursor_visible(!locked);
    debug!("pointer lock {}", if locked { "engaged" } else { "released" });
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    mesh_path: Option<PathBuf>,
    depth_buffer: bool,
    summary_only: bool,
    frames: u32,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::from_args(env::args().skip(1))
    }

    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            mesh_path: None,
            depth_buffer: true,
            summary_only: false,
            frames: 1,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--no-depth" => options.depth_buffer = false,
                "--summary-only" => options.summary_only = true,
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames expects a value. {USAGE}"))?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "-h" | "--help" => return Err(anyhow!(USAGE)),
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                path if options.mesh_path.is_none() => {
                    options.mesh_path = Some(PathBuf::from(path));
                }
                extra => return Err(anyhow!("Unexpected argument: {extra}. {USAGE}")),
            }
        }
        Ok(options)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            depth_buffer: self.depth_buffer,
            ..RenderOptions::default()
        }
    }
}
