use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use log::{debug, error};
use pollster::FutureExt as _;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyboardInput, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod app;
mod assets;
mod clock;
mod config;
mod controls;
mod entity;
mod orbit;
mod particles;
mod renderer;
mod viewport;
mod window;

use app::App;
use config::Args;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    debug!("{:#?}", args);

    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("shifting-sand")
        .with_inner_size(LogicalSize::<u32> {
            width: 1280,
            height: 720,
        })
        .build(&event_loop)?;

    let mut last_render_inst = Instant::now();

    let mut app = App::new(window, &args).block_on()?;

    event_loop.run(move |e, _, control_flow| match e {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
            WindowEvent::Resized(size) => app.on_resize(size),
            WindowEvent::ScaleFactorChanged {
                scale_factor,
                new_inner_size,
            } => app.on_scale_factor_changed(*new_inner_size, scale_factor),
            WindowEvent::MouseInput { state, button, .. } => app.on_mouse_input(state, button),
            WindowEvent::CursorMoved { position, .. } => app.on_cursor_moved(position),
            WindowEvent::MouseWheel { delta, .. } => app.on_mouse_scroll(delta),
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Released,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => app.on_key_up(keycode),
            _ => (),
        },
        Event::MainEventsCleared => {
            let target_frame_interval = Duration::from_secs_f64(1.0 / 60.0);
            let elapsed_from_last_draw = last_render_inst.elapsed();
            if target_frame_interval > elapsed_from_last_draw {
                let wait = target_frame_interval - elapsed_from_last_draw;
                *control_flow = ControlFlow::WaitUntil(Instant::now() + wait);
                return;
            }

            if let Err(e) = app.render() {
                error!("{:#}", e);
            }

            last_render_inst = Instant::now();
        }
        _ => (),
    });
}
