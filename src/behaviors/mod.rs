//! Stock Behaviors
//!
//! Ready-made behaviors for the well-known slots and the usual per-frame
//! chores:
//! - bodies: where a node sits (`Slot::Body`)
//! - sensors: body change notifications (`Slot::Sensor`)
//! - interact: touch sensitivity and routing (`Slot::Interactor`)
//! - colliders: rigid shapes and hit tests (`Slot::Rigid`, `Slot::Collider`)
//! - anchors: layout relative to another node (`Slot::Anchor`)
//! - movers: position over time (`Slot::Mover`, `Slot::Friction`)
//! - timers: countdowns and property tweens (`Slot::Life`, `Slot::Tween`)

pub mod anchors;
pub mod bodies;
pub mod colliders;
pub mod interact;
pub mod movers;
pub mod sensors;
pub mod timers;

pub use anchors::{pivot_keyword, Adjust, Anchor, EdgeAnchor, PositionAnchor};
pub use bodies::{CanvasBody, ImageBody, RectBody, RevisionBody, SceneBody};
pub use colliders::{CircleRigid, ColliderBehavior, RectRigid, RigidBehavior, Rivals};
pub use interact::{deliver, process_touch, InteractBehavior, TouchRoute, WholeInteractor};
pub use movers::{AngleMover, DestineMover, Drift, InsideSkater, SpeedFriction, WalkMover};
pub use sensors::{BodySensor, DeadSensor};
pub use timers::{Property, TimerBehavior, TweenBehavior};

use crate::core::{share, Shared, Slot};

/// The behavior a well-known slot falls back on when something needs it and
/// nothing is installed. Other slots have no default.
pub fn default_behavior(slot: &Slot) -> Option<Shared> {
    match slot {
        Slot::Body => Some(share(ImageBody)),
        Slot::Sensor => Some(share(BodySensor::new())),
        Slot::Interactor => Some(share(InteractBehavior)),
        Slot::Rigid => Some(share(RigidBehavior)),
        _ => None,
    }
}
