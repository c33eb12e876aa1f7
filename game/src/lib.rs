pub mod gpu_renderer;
pub mod grid;
pub mod input;
pub mod piece;
pub mod rng;
pub mod shapes;
