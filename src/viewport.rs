use glam::{vec2, Vec2};

use crate::window::Size;

/// Device pixel ratios above this are clamped.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Logical window dimensions plus the pixel ratio used to render them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: pixel_ratio.min(MAX_PIXEL_RATIO),
        }
    }

    /// Builds a viewport from a window's physical inner size and scale factor.
    pub fn from_physical(size: Size, scale_factor: f64) -> Self {
        let scale_factor = scale_factor.max(f64::EPSILON);
        Self::new(
            (size.width as f64 / scale_factor) as f32,
            (size.height as f64 / scale_factor) as f32,
            scale_factor as f32,
        )
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0. {
            self.width / self.height
        } else {
            1.
        }
    }

    /// Value of the `uResolution` uniform, in device pixels.
    pub fn resolution(&self) -> Vec2 {
        vec2(
            self.width * self.pixel_ratio,
            self.height * self.pixel_ratio,
        )
    }

    /// True while the window is minimized or collapsed to zero area.
    pub fn is_empty(&self) -> bool {
        self.framebuffer_size().is_empty()
    }

    /// Size of the backing framebuffer.
    pub fn framebuffer_size(&self) -> Size {
        let resolution = self.resolution();
        Size {
            width: resolution.x.round() as u32,
            height: resolution.y.round() as u32,
        }
    }
}
