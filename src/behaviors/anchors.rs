//! Anchors
//!
//! An anchor keeps its host placed relative to a target's body: the target's
//! sensor reports every move and the anchor recomputes the host position from
//! the rect it was given. The target defaults to the host's parent.
//!
//! What "placed relative" means is up to the `Adjust` half:
//! - `PositionAnchor` puts the host origin on a pivot of the target plus an offset
//! - `EdgeAnchor` lines up one edge of the host body with a pivot line of the target

use std::rc::Rc;

use tracing::{trace, warn};

use crate::core::behavior::capability;
use crate::core::{AntId, Behavior, Callback, Cx, Delegate, Sense, Slot, Stage};
use crate::error::Result;
use crate::geom::{Edge, Point, Rect};

/// Moves the host so that it lines up with `point`, given in the host's
/// parent space.
pub trait Adjust: 'static {
    fn adjust(&self, stage: &mut Stage, host: AntId, point: Point) -> Result<()>;
}

/// Relative position from a pivot keyword: "left" and "top" are 0,
/// "center" is 0.5, "right" and "bottom" are 1.
pub fn pivot_keyword(word: &str) -> Option<f64> {
    match word {
        "left" | "top" => Some(0.0),
        "center" => Some(0.5),
        "right" | "bottom" => Some(1.0),
        _ => None,
    }
}

/// Places the host origin at the anchor point plus `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionAnchor {
    pub offset: Point,
}

impl Adjust for PositionAnchor {
    fn adjust(&self, stage: &mut Stage, host: AntId, point: Point) -> Result<()> {
        stage.get_mut(host)?.position = point + self.offset;
        Ok(())
    }
}

/// Aligns one `edge` of the host body with the anchor point plus `offset`
/// along the edge's axis. The other axis is left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAnchor {
    pub edge: Edge,
    pub offset: f64,
}

impl Adjust for EdgeAnchor {
    fn adjust(&self, stage: &mut Stage, host: AntId, point: Point) -> Result<()> {
        let body = stage.body_rect(host)?;
        let edge = body.edge(self.edge);
        let node = stage.get_mut(host)?;
        if self.edge.is_vertical() {
            node.position.x = point.x + self.offset - edge;
        } else {
            node.position.y = point.y + self.offset - edge;
        }
        Ok(())
    }
}

/// Runs one anchoring pass from a target rect in root space.
fn anchor(stage: &mut Stage, host: AntId, pivot: Point, adjust: &dyn Adjust, rect: Rect) -> Result<()> {
    let point = rect.point_at(pivot);
    let point = match stage.get(host)?.parent() {
        Some(parent) => stage.local_coord(parent, point),
        None => point,
    };
    adjust.adjust(stage, host, point)
}

/// The anchor behavior. Primes, so the sensor subscription and the first
/// placement happen on the first update after attach.
pub struct Anchor<A: Adjust> {
    target: Option<AntId>,
    pivot: Point,
    adjust: Rc<A>,
    subscription: Option<(Rc<Delegate<Sense>>, Callback<Sense>)>,
}

impl<A: Adjust> Anchor<A> {
    /// `target` of `None` follows the host's parent. `pivot` is relative to
    /// the target rect: (0, 0) is its left-top corner, (1, 1) its right-bottom.
    pub fn new(target: Option<AntId>, pivot: Point, adjust: A) -> Self {
        Self {
            target,
            pivot,
            adjust: Rc::new(adjust),
            subscription: None,
        }
    }

    pub fn target(&self) -> Option<AntId> {
        self.target
    }

    fn unsubscribe(&mut self) {
        if let Some((delegate, callback)) = self.subscription.take() {
            delegate.unregister(&callback);
        }
    }
}

impl Anchor<PositionAnchor> {
    /// Centers the host on the target, then shifts it by `offset`.
    pub fn position(target: Option<AntId>, offset: Point) -> Self {
        Self::new(target, Point::new(0.5, 0.5), PositionAnchor { offset })
    }
}

impl Anchor<EdgeAnchor> {
    /// Aligns `edge` of the host with the line at relative `pivot` across the
    /// target (0 is its left or top, 1 its right or bottom).
    pub fn edge(edge: Edge, target: Option<AntId>, pivot: f64, offset: f64) -> Self {
        Self::new(target, Point::regular(pivot), EdgeAnchor { edge, offset })
    }
}

impl<A: Adjust> Behavior for Anchor<A> {
    fn attached(&mut self, host: Option<AntId>) {
        if host.is_none() {
            self.unsubscribe();
        }
    }

    fn primes(&self) -> bool {
        true
    }

    fn reset(&mut self, cx: &mut Cx<'_>) -> Result<()> {
        let host = cx.host;
        let target = match self.target.or(cx.node()?.parent()) {
            Some(target) => target,
            None => {
                warn!(?host, "anchor has no target and no parent");
                return Ok(());
            }
        };
        self.target = Some(target);
        self.unsubscribe();

        let sensor = cx.stage.need_behavior(target, &Slot::Sensor)?;
        let delegate = {
            let tenant = sensor.borrow();
            let on_sense = capability(&tenant, &Slot::Sensor, |b| b.as_sensor())?.on_sense();
            on_sense
        };

        let pivot = self.pivot;
        let adjust = Rc::clone(&self.adjust);
        let callback = Delegate::callback(move |stage: &mut Stage, sense: &Sense| {
            if !stage.contains(host) {
                trace!(?host, "anchored executant is gone");
                return Ok(());
            }
            anchor(stage, host, pivot, adjust.as_ref(), sense.rect)
        });
        delegate.register(Rc::clone(&callback), false);
        self.subscription = Some((delegate, callback));

        let rect = cx.stage.body_rect(target)?;
        let rect = cx.stage.global_coord(target, rect).normalize();
        anchor(cx.stage, host, pivot, self.adjust.as_ref(), rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::bodies::RectBody;
    use crate::core::{Executant, Phase};

    fn frame(stage: &mut Stage) {
        let root = stage.root();
        for phase in [Phase::Stand, Phase::Update, Phase::Stay] {
            stage.kick_cycle(root, phase).unwrap();
        }
    }

    fn panel(stage: &mut Stage) -> AntId {
        let root = stage.root();
        let id = stage.add_child(root, Executant::new().at(Point::new(100.0, 50.0)), None).unwrap();
        stage.attach(id, Slot::Body, RectBody::new(Rect::new(0.0, 0.0, 80.0, 40.0))).unwrap();
        id
    }

    #[test]
    fn test_pivot_keywords() {
        assert_eq!(pivot_keyword("top"), Some(0.0));
        assert_eq!(pivot_keyword("center"), Some(0.5));
        assert_eq!(pivot_keyword("bottom"), Some(1.0));
        assert_eq!(pivot_keyword("middle"), None);
    }

    #[test]
    fn test_position_anchor_follows_parent() {
        let mut stage = Stage::new();
        let panel = panel(&mut stage);
        let badge = stage.add_child(panel, Executant::new(), None).unwrap();
        stage
            .attach(badge, Slot::Anchor, Anchor::position(None, Point::new(0.0, -5.0)))
            .unwrap();

        frame(&mut stage);
        assert_eq!(stage.get(badge).unwrap().position, Point::new(40.0, 15.0));

        // target moves in root space, badge stays put in parent space
        stage.get_mut(panel).unwrap().scale = Point::new(2.0, 2.0);
        frame(&mut stage);
        frame(&mut stage);
        assert_eq!(stage.get(badge).unwrap().position, Point::new(40.0, 15.0));
    }

    #[test]
    fn test_edge_anchor_tracks_sibling() {
        let mut stage = Stage::new();
        let panel = panel(&mut stage);
        let root = stage.root();
        let label = stage.add_child(root, Executant::new().at(Point::new(0.0, 7.0)), None).unwrap();
        stage.attach(label, Slot::Body, RectBody::new(Rect::new(-10.0, -5.0, 20.0, 10.0))).unwrap();
        stage
            .attach(label, Slot::Anchor, Anchor::edge(Edge::Left, Some(panel), 1.0, 4.0))
            .unwrap();

        frame(&mut stage);
        // left edge at panel right (180) + 4
        assert_eq!(stage.get(label).unwrap().position, Point::new(194.0, 7.0));

        // the freshly installed sensor records once before reporting moves
        frame(&mut stage);
        stage.get_mut(panel).unwrap().position.x = 0.0;
        frame(&mut stage);
        assert_eq!(stage.get(label).unwrap().position, Point::new(94.0, 7.0));
    }

    #[test]
    fn test_detach_unsubscribes() {
        let mut stage = Stage::new();
        let panel = panel(&mut stage);
        let badge = stage.add_child(panel, Executant::new(), None).unwrap();
        stage.attach(badge, Slot::Anchor, Anchor::position(None, Point::ZERO)).unwrap();
        frame(&mut stage);

        let sensor = stage.behavior(panel, &Slot::Sensor).unwrap();
        let delegate = sensor.borrow().behavior().as_sensor().map(|s| s.on_sense());
        let delegate = delegate.unwrap();
        assert_eq!(delegate.len(), 1);

        stage.remove_behavior(badge, &Slot::Anchor).unwrap();
        assert!(delegate.is_empty());
    }
}
