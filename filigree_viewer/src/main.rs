use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use pollster::FutureExt;
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use filigree_scene::Scene;
use filigree_scene::camera::PointerOffset;
use filigree_scene::config::SceneConfig;

mod cli;
mod viewer;

use cli::Args;
use viewer::ViewerState;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    ensure!(
        args.headless_seconds > 0.0,
        "headless_seconds must be positive (got {})",
        args.headless_seconds
    );

    let preset = match args.preset.as_ref() {
        Some(path) => Some(
            cli::load_scene_preset(path)
                .with_context(|| format!("loading scene preset {}", path.display()))?,
        ),
        None => None,
    };
    let config = cli::resolve_config(&args, preset.as_ref());
    config.validate().context("validating scene parameters")?;

    if args.headless {
        return run_headless(&config, args.headless_seconds);
    }

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Filigree - string art globe")
            .with_inner_size(PhysicalSize::new(1280, 720))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let size = window.inner_size();
    let mut scene = Scene::new(&config, aspect_of(size))?;
    print_scene_summary(&scene, &config);

    // The native analog of a page without its canvas: nothing to draw into,
    // so skip the viewer without treating it as an error.
    let Some(mut state) = ViewerState::new(window).block_on()? else {
        log::warn!("no compatible graphics adapter for this window; viewer skipped");
        return Ok(());
    };

    let started = Instant::now();
    let mut pointer = PointerOffset::default();
    let mut half_width = size.width as f32 / 2.0;
    let mut half_height = size.height as f32 / 2.0;

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key: Key::Named(NamedKey::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => target.exit(),
                        WindowEvent::CursorMoved { position, .. } => {
                            pointer.x = position.x as f32 - half_width;
                            pointer.y = position.y as f32 - half_height;
                        }
                        WindowEvent::Resized(new_size) => {
                            half_width = new_size.width as f32 / 2.0;
                            half_height = new_size.height as f32 / 2.0;
                            scene.set_aspect(aspect_of(new_size));
                            state.resize(new_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let frame = scene.tick(started.elapsed().as_secs_f32(), pointer);
                            match state.render(&frame) {
                                Ok(()) => {}
                                Err(SurfaceError::Lost) => state.resize(state.size()),
                                Err(SurfaceError::OutOfMemory) => target.exit(),
                                Err(err) => {
                                    eprintln!("[filigree_viewer] render error: {err:?}")
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => state.window().request_redraw(),
                _ => {}
            }
        })
        .context("running viewer application")?;
    Ok(())
}

fn aspect_of(size: PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}

fn print_scene_summary(scene: &Scene, config: &SceneConfig) {
    println!(
        "Globe bootstrap: {} surface points, {} strings accepted of {} attempts, {} particles, {} glow markers",
        scene.point_count(),
        scene.line_count(),
        config.line_attempts,
        scene.particle_count(),
        scene.marker_count()
    );
    if let Some(seed) = config.seed {
        println!("  seeded RNG: {seed}");
    }
}

/// Drive the simulation at a fixed 60 Hz step with no window. Useful for
/// automation: the process exits once the weave settles, or once the time
/// limit runs out if it cannot.
fn run_headless(config: &SceneConfig, max_seconds: f32) -> Result<()> {
    let mut scene = Scene::new(config, 16.0 / 9.0)?;
    print_scene_summary(&scene, config);

    let step = 1.0 / 60.0;
    let pointer = PointerOffset::default();
    let mut elapsed = 0.0_f32;
    while elapsed < max_seconds && !scene.formation_complete() {
        elapsed += step;
        scene.tick(elapsed, pointer);
    }

    if scene.formation_complete() {
        println!(
            "Formation settled after {elapsed:.2} simulated seconds ({:?}).",
            scene.phase()
        );
    } else {
        println!(
            "Formation still running after {elapsed:.2} simulated seconds; raise --headless-seconds to let it settle."
        );
    }
    Ok(())
}
