mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputEvent, InputSnapshot, Key, KeyStates, MouseButton};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{FrameCanvas, Renderer, LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use scene::{FramePainter, Scene, SceneCommand};
