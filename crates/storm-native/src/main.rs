use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use winit::{
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use storm_core::{FrameScheduler, SimulationContext, Vignette, WallClock};

mod loader;
mod render;
mod scene;

use loader::ModelLoader;
use render::GpuState;

/// Launch options, read from the environment.
struct Options {
    vignette: Vignette,
    boat_model: PathBuf,
    gpu_waves: bool,
}

impl Options {
    fn from_env() -> anyhow::Result<Self> {
        let vignette = match std::env::var("STORM_VIGNETTE") {
            Ok(name) => name.parse()?,
            Err(_) => Vignette::default(),
        };
        let boat_model = std::env::var_os("STORM_BOAT_MODEL")
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/boat.obj"));
        let gpu_waves = matches!(
            std::env::var("STORM_GPU_WAVES").as_deref(),
            Ok("1") | Ok("true")
        );
        Ok(Self {
            vignette,
            boat_model,
            gpu_waves,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Options::from_env()?;
    let mut sim = SimulationContext::new(opts.vignette.config())?;
    sim.set_host_waves(!opts.gpu_waves);

    // The boat is decoration: a failed spawn or load only means no boat.
    let mut loader = if sim.config().boat.is_some() {
        match ModelLoader::spawn(opts.boat_model) {
            Ok(l) => Some(l),
            Err(e) => {
                log::error!("[loader] could not start worker: {e}");
                None
            }
        }
    } else {
        None
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let window = WindowBuilder::new()
        .with_title(format!("Storm ({})", sim.config().name))
        .build(&event_loop)?;
    let size = window.inner_size();
    sim.set_viewport(size.width, size.height);

    let mut gpu = pollster::block_on(GpuState::new(&window, &sim))?;
    let sim = Rc::new(RefCell::new(sim));

    let scheduler = FrameScheduler::new();
    let tick_sim = Rc::clone(&sim);
    let handle = scheduler.run(move |ft| tick_sim.borrow_mut().tick(ft));
    let wall = WallClock::new();
    let mut cursor = PhysicalPosition::new(0.0f64, 0.0f64);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                gpu.resize(size);
                sim.borrow_mut().set_viewport(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => cursor = position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = (cursor.x as f32, cursor.y as f32);
                log::debug!("[input] click at ({x:.0}, {y:.0})");
                let click_sim = Rc::clone(&sim);
                scheduler.post(move || {
                    click_sim.borrow_mut().on_pointer_click(x, y);
                });
            }
            WindowEvent::CloseRequested => {
                handle.stop();
                elwt.exit();
            }
            _ => {}
        },
        Event::AboutToWait => {
            if let Some(result) = loader.as_ref().and_then(ModelLoader::poll) {
                loader = None;
                let boat_sim = Rc::clone(&sim);
                scheduler.post(move || boat_sim.borrow_mut().resolve_boat(result));
            }
            if !scheduler.on_refresh(wall.now_sec()) {
                return;
            }
            let rendered = gpu.render(&sim.borrow());
            match rendered {
                Ok(_) => gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(e) => log::warn!("[gpu] frame skipped: {e}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}
