//! Sprite keys stamped into the tile grid by the level loader.

pub const SKY: &str = "sky";
pub const GROUND: &str = "ground";
pub const PIPE_HEAD_LEFT: &str = "pipeL";
pub const PIPE_HEAD_RIGHT: &str = "pipeR";
pub const PIPE_BODY_LEFT: &str = "pipe2L";
pub const PIPE_BODY_RIGHT: &str = "pipe2R";

pub fn bush(part: i32) -> String {
    format!("bush_{part}")
}

pub fn cloud(row: i32, col: i32) -> String {
    format!("cloud{row}_{col}")
}

/// Sprites with transparent pixels need the sky painted underneath first.
pub(crate) fn redraws_background(key: &str) -> bool {
    key.starts_with("bush_") || key.starts_with("cloud") || key.starts_with("pipe")
}
