//! Engine Core
//!
//! The executant scene graph and its frame cycle.
//!
//! Key concepts:
//! - Stage: arena owning every executant, addressed by generational `AntId`
//! - Executant: tree node with position, scale, layer, children and behaviors
//! - Behavior: pluggable capability stored under a `Slot`, driven per frame
//! - LeafManager: ordered named container with deferred commands
//! - Delegate: multicast callbacks with snapshot dispatch
//! - Scene: frame driver owning the stage, the canvas and the clock
//!
//! Each frame walks stand, update and stay over the whole tree, parents
//! first, then draws layer by layer. Structural changes bid during a frame
//! wait for the next stand phase.

pub mod ant;
pub mod behavior;
pub mod capability;
pub mod delegate;
pub mod executant;
pub mod leaf;
pub mod scene;
pub mod stage;

pub use ant::{AntAllocator, AntId};
pub use behavior::{share, AsAny, Behavior, Cx, Readiness, Shared, Slot, Tenant};
pub use capability::{Body, Interaction, Interactor, Reach, Renderer, Rigid, Sense, Sensor};
pub use delegate::{Callback, Delegate};
pub use executant::{Debut, Executant, Gestures, Name, Phase, Role};
pub use leaf::{Command, LeafManager, LeafName, Pick};
pub use scene::Scene;
pub use stage::Stage;
