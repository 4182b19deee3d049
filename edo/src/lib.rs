//! edo — a windowed 2D game skeleton: a picture moved with the keyboard.
//!
//! Arrow keys and WASD move the picture by a fixed step, `q` or closing
//! the window quits. Runs on either the softbuffer driver (`edo` binary)
//! or the wgpu driver (`edo-wgpu` binary).

mod model;

pub use model::{EdoModel, BACKGROUND, MOVE_STEP, SCREEN_HEIGHT, SCREEN_WIDTH};
