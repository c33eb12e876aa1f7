#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True while the window is minimized (zero-area surfaces cannot be
    /// rendered to).
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}
