//! Executant
//!
//! A scene-graph node: position and scale relative to its parent, an
//! optional draw layer, named children and named behaviors. Executants are
//! built here and then handed to `Stage::spawn`; from then on the stage owns
//! them and every structural change goes through it, so parent links and
//! tribe layers stay consistent.
//!
//! A node's own per-frame script is its `Role`. Nodes without one are plain
//! containers driven by their behaviors alone.

use std::fmt;

use super::behavior::{AsAny, Cx, Shared, Slot};
use super::leaf::{Command, LeafManager, LeafName};
use super::{AntId, Stage};
use crate::error::Result;
use crate::geom::{Point, Spatial};
use crate::render::Canvas;

/// Child key: an automatic index or an explicit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    Index(u32),
    Key(String),
}

impl Name {
    /// Path segments made of digits name indexed children.
    pub fn parse(segment: &str) -> Self {
        match segment.parse::<u32>() {
            Ok(n) if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) => {
                Name::Index(n)
            }
            _ => Name::Key(segment.to_string()),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Index(n) => write!(f, "{n}"),
            Name::Key(key) => f.write_str(key),
        }
    }
}

impl LeafName for Name {
    fn nth(n: u32) -> Self {
        Name::Index(n)
    }
}

impl From<&str> for Name {
    fn from(key: &str) -> Self {
        Name::Key(key.to_string())
    }
}

impl From<u32> for Name {
    fn from(n: u32) -> Self {
        Name::Index(n)
    }
}

/// Frame-cycle phases walked over the tree, in this order every frame.
/// Drawing follows as a separate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Flush deferred commands, then run `before` hooks
    Stand,
    /// Role `first`/`update`, then behavior `behave`
    Update,
    /// Role `stay`, then behavior `after`
    Stay,
}

/// Whether the node has had its first update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Debut {
    /// The next update runs `first` instead
    #[default]
    Pending,
    Done,
}

/// Which gesture handlers a role implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gestures {
    pub touch: bool,
    pub tap: bool,
    pub hand: bool,
    pub drag: bool,
}

impl Gestures {
    pub const NONE: Gestures = Gestures {
        touch: false,
        tap: false,
        hand: false,
        drag: false,
    };
}

/// A node's own script.
///
/// The stage takes the role out of its node while calling a mutating hook,
/// so the hook may freely reach its own node through `cx`.
pub trait Role: AsAny {
    /// Runs instead of `update` on the node's first update.
    fn first(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        Ok(())
    }

    fn stay(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
        Ok(())
    }

    /// Draws the node in its local transform. Returning true means the role
    /// drew it and the renderer is skipped.
    fn depict(&self, _canvas: &mut dyn Canvas, _stage: &Stage, _host: AntId) -> bool {
        false
    }

    /// Handlers below that the role actually wants called.
    fn gestures(&self) -> Gestures {
        Gestures::NONE
    }

    /// Immediate, at touch start, in host-local space.
    fn touch(&mut self, _cx: &mut Cx<'_>, _point: Point) -> Result<()> {
        Ok(())
    }

    fn tap(&mut self, _cx: &mut Cx<'_>, _begin: Point) -> Result<()> {
        Ok(())
    }

    fn hand(&mut self, _cx: &mut Cx<'_>, _begin: Point) -> Result<()> {
        Ok(())
    }

    fn drag(&mut self, _cx: &mut Cx<'_>, _movement: Point) -> Result<()> {
        Ok(())
    }

    /// A collider on this node found `rival` overlapping.
    fn collided(&mut self, _cx: &mut Cx<'_>, _rival: AntId) -> Result<()> {
        Ok(())
    }
}

pub struct Executant {
    pub position: Point,
    pub scale: Point,
    /// `None` means never drawn itself
    pub(crate) layer: Option<i32>,
    pub(crate) parent: Option<AntId>,
    pub(crate) childs: LeafManager<Name, AntId>,
    pub(crate) behaviors: LeafManager<Slot, Shared>,
    /// Sorted distinct layers drawn in this subtree; `None` until computed
    pub(crate) tribe_layers: Option<Vec<i32>>,
    pub(crate) debut: Debut,
    pub(crate) role: Option<Box<dyn Role>>,
    /// Behaviors given to the builder, installed by `Stage::spawn`
    pub(crate) staged: Vec<(Slot, Shared)>,
}

impl Default for Executant {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            scale: Point::ONE,
            layer: None,
            parent: None,
            childs: LeafManager::new(),
            behaviors: LeafManager::new(),
            tribe_layers: None,
            debut: Debut::Pending,
            role: None,
            staged: Vec::new(),
        }
    }
}

impl Executant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Point) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn with_role(mut self, role: impl Role) -> Self {
        self.role = Some(Box::new(role));
        self
    }

    /// Queues a behavior to be installed under `slot` once spawned.
    pub fn with_behavior(mut self, slot: Slot, behavior: Shared) -> Self {
        self.staged.push((slot, behavior));
        self
    }

    pub fn layer(&self) -> Option<i32> {
        self.layer
    }

    pub fn parent(&self) -> Option<AntId> {
        self.parent
    }

    pub fn childs(&self) -> &LeafManager<Name, AntId> {
        &self.childs
    }

    pub fn behaviors(&self) -> &LeafManager<Slot, Shared> {
        &self.behaviors
    }

    pub fn tribe_layers(&self) -> Option<&[i32]> {
        self.tribe_layers.as_deref()
    }

    pub fn debut(&self) -> Debut {
        self.debut
    }

    pub fn role(&self) -> Option<&dyn Role> {
        self.role.as_deref()
    }

    pub fn role_as<T: Role>(&self) -> Option<&T> {
        self.role.as_deref()?.as_any().downcast_ref()
    }

    /// Defers a child change to the next stand phase.
    pub fn bid_child(&mut self, command: Command<Name, AntId>) {
        self.childs.bid(command);
    }

    /// Defers a behavior change to the next stand phase.
    pub fn bid_behavior(&mut self, command: Command<Slot, Shared>) {
        self.behaviors.bid(command);
    }

    /// Parent space to local space. Rects may come out virtual.
    pub fn get_coord<T: Spatial>(&self, coord: T) -> T {
        (coord - self.position) / self.scale
    }

    /// Local space to parent space. Rects may come out virtual.
    pub fn parent_coord<T: Spatial>(&self, coord: T) -> T {
        coord * self.scale + self.position
    }

    /// Parent scale to local scale, ignoring position.
    pub fn get_scale<T: Spatial>(&self, coord: T) -> T {
        coord / self.scale
    }

    /// Local scale to parent scale, ignoring position.
    pub fn parent_scale<T: Spatial>(&self, coord: T) -> T {
        coord * self.scale
    }
}

impl fmt::Debug for Executant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executant")
            .field("position", &self.position)
            .field("scale", &self.scale)
            .field("layer", &self.layer)
            .field("parent", &self.parent)
            .field("childs", &self.childs.len())
            .field("behaviors", &self.behaviors.len())
            .field("has_role", &self.role.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;

    #[test]
    fn test_coord_example() {
        let x = Executant::new().at(Point::new(10.0, 20.0));
        assert_eq!(x.parent_coord(Point::new(5.0, 5.0)), Point::new(15.0, 25.0));
        assert_eq!(x.get_coord(Point::new(15.0, 25.0)), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_scaled_coords() {
        let x = Executant::new()
            .at(Point::new(4.0, 0.0))
            .with_scale(Point::new(2.0, -1.0));
        let rect = x.parent_coord(Rect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(rect, Rect::new(6.0, -1.0, 4.0, -2.0));
        assert_eq!(rect.normalize(), Rect::new(6.0, -3.0, 4.0, 2.0));
        assert_eq!(x.get_coord(rect), Rect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(x.get_scale(Point::new(4.0, 4.0)), Point::new(2.0, -4.0));
        assert_eq!(x.parent_scale(Point::new(2.0, -4.0)), Point::new(4.0, 4.0));
    }

    #[test]
    fn test_name_parse() {
        assert_eq!(Name::parse("12"), Name::Index(12));
        assert_eq!(Name::parse("wing"), Name::Key("wing".into()));
        assert_eq!(Name::parse("+3"), Name::Key("+3".into()));
        assert_eq!(Name::Index(4).to_string(), "4");
    }
}
