use std::error::Error;

use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use crate::surface::SurfaceSize;

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub vsync: Option<bool>,
}

/// Window plus GPU surface, bundled for the render thread.
///
/// Everything in here is context-bound: construct and use it only on the
/// thread that runs the event loop.
pub struct AppContext {
    pub window: Window,
    pub pixels: Pixels,
    pub surface_size: SurfaceSize,
}

/// Builds the window and the `pixels` surface/device on the calling thread.
pub fn build_display(
    config: &AppConfig,
    event_loop: &EventLoop<()>,
) -> Result<AppContext, Box<dyn Error>> {
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(config.desired_size)
        .build(event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height);

    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut builder = PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        builder = builder.enable_vsync(vsync);
    }
    let mut pixels = builder.build()?;

    // Frames come from the caller's own render pass via `render_with`; keep
    // the intermediate pixel buffer tiny so nothing is uploaded per frame.
    pixels.resize_buffer(1, 1)?;

    Ok(AppContext {
        window,
        pixels,
        surface_size,
    })
}
