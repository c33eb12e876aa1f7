//! Falling-block demo binary.
//!
//! The process main thread is the graphics owner: it runs the dispatch loop
//! and executes everything context-bound (window, device, draw calls). Game
//! bootstrap happens on a second thread and hands the whole windowed session
//! back to the owner via `RenderDispatcher::submit`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use engine::app::{build_display, AppConfig};
use engine::dispatch::render_channel;
use engine::surface::SurfaceSize;

use game::gpu_renderer::BlockRenderer;
use game::grid::{FALL_RATE, WINDOW_HEIGHT, WINDOW_WIDTH};
use game::input::{action_for_key, InputAction};
use game::piece::{spawn_signal, Direction, GameState};
use game::rng::{clock_seed, Rng};

fn main() {
    let (dispatcher, render_loop) = render_channel();

    thread::spawn(move || {
        dispatcher.submit(run_session);
    });

    render_loop.run();
}

/// The whole windowed session. Executes on the render thread.
fn run_session() {
    let event_loop = EventLoop::new();
    let config = AppConfig {
        title: "Tetris".to_string(),
        desired_size: PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        vsync: Some(true),
    };
    let mut ctx = build_display(&config, &event_loop)
        .unwrap_or_else(|err| panic!("window/surface init failed: {err}"));

    let mut renderer = BlockRenderer::new(
        &ctx.pixels.context().device,
        ctx.pixels.surface_texture_format(),
    );

    let (signal, requests) = spawn_signal();
    let state = Arc::new(GameState::new(signal));
    let mut rng = Rng::new(clock_seed());

    // The first piece.
    state.spawn(&mut rng);

    // Fall timer: one Down move per tick, directly on shared state. Runs
    // until the process exits.
    {
        let state = Arc::clone(&state);
        let period = Duration::from_secs(1) / FALL_RATE;
        thread::spawn(move || loop {
            thread::sleep(period);
            state.move_active(Direction::Down);
        });
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    ctx.surface_size = SurfaceSize::new(size.width, size.height);
                    if !ctx.surface_size.is_empty() {
                        if let Err(err) = ctx.pixels.resize_surface(size.width, size.height) {
                            eprintln!("resize failed: {err}");
                        }
                    }
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => match action_for_key(key) {
                    Some(InputAction::Quit) => *control_flow = ControlFlow::Exit,
                    Some(InputAction::MoveLeft) => state.move_active(Direction::Left),
                    Some(InputAction::MoveRight) => state.move_active(Direction::Right),
                    Some(InputAction::MoveDown) => state.move_active(Direction::Down),
                    Some(InputAction::Rotate) => state.rotate_active(),
                    None => {}
                },
                _ => {}
            },
            Event::MainEventsCleared => {
                ctx.window.request_redraw();
            }
            Event::RedrawRequested(_) => {
                // Piece creation is context-adjacent work; it only ever
                // happens here, on the render thread.
                if requests.take() {
                    state.spawn(&mut rng);
                }

                if ctx.surface_size.is_empty() {
                    return;
                }

                let size = ctx.surface_size;
                let pieces = state.pieces();
                let res = ctx.pixels.render_with(|encoder, render_target, pixels_ctx| {
                    renderer.render(encoder, render_target, pixels_ctx, size, &pieces);
                    Ok(())
                });
                if let Err(err) = res {
                    eprintln!("present failed: {err}");
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}
