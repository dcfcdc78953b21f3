use log::{error, warn};
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::app::{Application, FrameError};
use crate::settings::RenderSettings;

pub mod app;
pub mod camera;
pub mod glint;
pub mod settings;
pub mod util;

pub fn run() {
    env_logger::init();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Glint: Ray Tracer")
        .build(&event_loop)
        .unwrap();

    // A surrounding settings layer would restore persisted values here
    // and read them back through the accessors on shutdown.
    let settings = RenderSettings::default();

    let mut app = match pollster::block_on(Application::new(window, &event_loop, settings)) {
        Ok(app) => app,
        Err(shader_error) => {
            error!("render setup failed: {shader_error}");
            return;
        }
    };

    event_loop.run(move |event, _target, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == app.window.id() => {
            if app.input(event) {
                return;
            }

            match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => *control_flow = ControlFlow::ExitWithCode(0),

                WindowEvent::Resized(new_size) => app.resize(*new_size),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.resize(**new_inner_size)
                }

                _ => {}
            }
        }

        Event::RedrawRequested(window_id) if window_id == app.window.id() => match app.render() {
            Ok(()) => {}
            // The surface comes back after a reconfigure.
            Err(FrameError::Surface(wgpu::SurfaceError::Lost)) => app.resize(app.size),
            Err(FrameError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                error!("out of GPU memory");
                *control_flow = ControlFlow::ExitWithCode(1);
            }
            Err(FrameError::Surface(surface_error)) => warn!("{surface_error:?}"),
            // A dangling material index is a precondition violation;
            // nothing sane can be drawn from that scene.
            Err(FrameError::Marshal(marshal_error)) => {
                error!("{marshal_error}");
                *control_flow = ControlFlow::ExitWithCode(1);
            }
        },

        Event::MainEventsCleared => app.window.request_redraw(),

        _ => {}
    });
}
