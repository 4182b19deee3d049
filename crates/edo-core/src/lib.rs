//! **edo-core** — windowed 2D game skeleton (core types).
//!
//! This crate provides the foundational types used across the *edo*
//! workspace: geometry primitives, colours, input messages, the per-frame
//! scene, and the application loop with its controller state machine.
//! Rendering lives in the driver crates (`edo-winit`, `edo-wgpu`).

pub mod app;
pub mod color;
pub mod geom;
pub mod messages;
pub mod scene;

pub use app::{AppRunner, AppState, Effect, EventLoopDriver, Model};
pub use color::{Color, ParseColorError};
pub use geom::{Point, Rect};
pub use messages::{Key, Msg};
pub use scene::{DrawCmd, ImageId, Scene};
