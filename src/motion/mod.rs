//! Motion
//!
//! Curves and rails shared by the movers and the tween:
//! - polator: scalar easing and wrapping curves, nestable
//! - walker: rails giving a position for a progress value

pub mod polator;
pub mod walker;

pub use polator::{Polator, Timing};
pub use walker::{ArcWalker, CoalesceWalker, LineWalker, Track, Walker};
