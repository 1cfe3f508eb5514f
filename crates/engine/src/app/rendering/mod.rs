mod renderer;

pub use renderer::{FrameCanvas, Renderer, LOGICAL_HEIGHT, LOGICAL_WIDTH};
