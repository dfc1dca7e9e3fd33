//! ZEP: a small 2D scene-graph engine for casual canvas games
//!
//! Everything on screen is an executant: a node with a position, a scale,
//! an optional draw layer, named children and named behaviors. A scene walks
//! the tree once per frame (stand, update, stay), then paints it layer by
//! layer. Behavior comes from composition:
//! - Behaviors plug capabilities into slots (body, renderer, sensor, mover...)
//! - Roles give a node its own per-frame script and gesture handlers
//! - Delegates carry notifications between nodes
//!
//! Structural changes made during a frame are bid and land at the start of
//! the next one, so a frame always walks a stable tree.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod behaviors;
pub mod config;
pub mod core;
pub mod error;
pub mod geom;
pub mod motion;
pub mod particles;
pub mod render;
pub mod resources;

pub use crate::config::SceneConfig;
pub use crate::core::{AntId, Behavior, Executant, Role, Scene, Slot, Stage};
pub use crate::error::{Error, Result};
pub use crate::geom::{Point, Rect};
pub use crate::resources::Resources;
