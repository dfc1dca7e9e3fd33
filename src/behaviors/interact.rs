//! Interactors and touch routing.
//!
//! An interactor decides whether its host is sensitive at a point and hands
//! gestures to the host's role. `process_touch` asks every interactor in a
//! subtree which gestures it wants and keeps the topmost taker of each.

use crate::core::{AntId, Behavior, Cx, Gestures, Interaction, Interactor, Reach, Slot, Stage};
use crate::error::Result;
use crate::geom::Point;

/// Runs the role's raw touch handler if it has one, then reports which
/// gestures it takes.
fn touch_role(stage: &mut Stage, host: AntId, point: Point) -> Result<Reach> {
    let gestures = stage
        .get(host)?
        .role()
        .map(|role| role.gestures())
        .unwrap_or(Gestures::NONE);

    if gestures.touch {
        stage.with_role_taken(host, |role, cx| role.touch(cx, point))?;
    }

    let taps = gestures.tap || gestures.hand;
    Ok(match (taps, gestures.drag) {
        (true, true) => Reach::All,
        (true, false) => Reach::Tap,
        (false, true) => Reach::Drag,
        (false, false) if gestures.touch => Reach::Processed,
        (false, false) => Reach::Silent,
    })
}

fn interact_role(stage: &mut Stage, host: AntId, interaction: Interaction) -> Result<()> {
    stage.with_role_taken(host, |role, cx: &mut Cx<'_>| match interaction {
        Interaction::Tap { begin } => role.tap(cx, begin),
        Interaction::Hand { begin } => role.hand(cx, begin),
        Interaction::Drag { movement, .. } => role.drag(cx, movement),
    })?;
    Ok(())
}

/// Sensitive inside the host body rect.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractBehavior;

impl Interactor for InteractBehavior {
    fn touch(&self, stage: &mut Stage, host: AntId, point: Point) -> Result<Option<Reach>> {
        if !stage.body_rect(host)?.inside(point) {
            return Ok(None);
        }
        touch_role(stage, host, point).map(Some)
    }

    fn interact(&self, stage: &mut Stage, host: AntId, interaction: Interaction) -> Result<()> {
        interact_role(stage, host, interaction)
    }
}

impl Behavior for InteractBehavior {
    fn as_interactor(&self) -> Option<&dyn Interactor> {
        Some(self)
    }
}

/// Sensitive everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeInteractor;

impl Interactor for WholeInteractor {
    fn touch(&self, stage: &mut Stage, host: AntId, point: Point) -> Result<Option<Reach>> {
        touch_role(stage, host, point).map(Some)
    }

    fn interact(&self, stage: &mut Stage, host: AntId, interaction: Interaction) -> Result<()> {
        interact_role(stage, host, interaction)
    }
}

impl Behavior for WholeInteractor {
    fn as_interactor(&self) -> Option<&dyn Interactor> {
        Some(self)
    }
}

/// Hands a gesture to the interactor installed on `target`. Targets that
/// lost their interactor since the touch began are skipped.
pub fn deliver(stage: &mut Stage, target: AntId, interaction: Interaction) -> Result<()> {
    let Some(shared) = stage.behavior(target, &Slot::Interactor) else {
        return Ok(());
    };
    let delivered = {
        let tenant = shared.borrow();
        let delivered = match tenant.behavior().as_interactor() {
            Some(interactor) => interactor.interact(stage, target, interaction),
            None => Ok(()),
        };
        delivered
    };
    stage.settle();
    delivered
}

/// Outcome of routing one touch through a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchRoute {
    /// Receiver of taps and hands
    pub tap: Option<AntId>,
    /// Receiver of drags
    pub drag: Option<AntId>,
    /// Somebody handled the raw touch without taking a gesture
    pub processed: bool,
}

impl TouchRoute {
    /// Whether anything at all reacted.
    pub fn reacted(&self) -> bool {
        self.processed || self.tap.is_some() || self.drag.is_some()
    }
}

/// Routes a touch at `point` (in the parent space of `id`) through `id` and
/// its subtree, parents first. For taps and drags the node on the highest
/// layer wins; on equal layers the first one found keeps it.
pub fn process_touch(stage: &mut Stage, id: AntId, point: Point) -> Result<TouchRoute> {
    let mut route = TouchRoute::default();
    route_touch(stage, id, point, &mut route)?;
    Ok(route)
}

fn route_touch(stage: &mut Stage, id: AntId, point: Point, route: &mut TouchRoute) -> Result<()> {
    let Some(node) = stage.node(id) else {
        return Ok(());
    };
    let point = node.get_coord(point);
    let layer = node.layer();

    if let Some(shared) = stage.behavior(id, &Slot::Interactor) {
        let tenant = shared.borrow();
        let reach = match tenant.behavior().as_interactor() {
            Some(interactor) => interactor.touch(stage, id, point)?,
            None => None,
        };
        drop(tenant);
        stage.settle();

        if let Some(reach) = reach {
            let outranks = |current: Option<AntId>| match current {
                None => true,
                Some(current) => stage.node(current).and_then(|n| n.layer()) < layer,
            };
            if reach.taps() && outranks(route.tap) {
                route.tap = Some(id);
            }
            if reach.drags() && outranks(route.drag) {
                route.drag = Some(id);
            }
            if reach == Reach::Processed {
                route.processed = true;
            }
        }
    }

    let childs: Vec<AntId> = stage
        .node(id)
        .map(|node| node.childs().values().copied().collect())
        .unwrap_or_default();
    for child in childs {
        route_touch(stage, child, point, route)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::bodies::RectBody;
    use crate::core::{Executant, Role};
    use crate::geom::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Button {
        gestures: Gestures,
        hits: Rc<RefCell<Vec<(&'static str, Point)>>>,
    }

    impl Role for Button {
        fn gestures(&self) -> Gestures {
            self.gestures
        }

        fn touch(&mut self, _cx: &mut Cx<'_>, point: Point) -> Result<()> {
            self.hits.borrow_mut().push(("touch", point));
            Ok(())
        }

        fn tap(&mut self, _cx: &mut Cx<'_>, begin: Point) -> Result<()> {
            self.hits.borrow_mut().push(("tap", begin));
            Ok(())
        }

        fn drag(&mut self, _cx: &mut Cx<'_>, movement: Point) -> Result<()> {
            self.hits.borrow_mut().push(("drag", movement));
            Ok(())
        }
    }

    fn button(stage: &mut Stage, layer: i32, at: Point, gestures: Gestures) -> AntId {
        let root = stage.root();
        let hits = Rc::default();
        let ant = Executant::new()
            .with_layer(layer)
            .at(at)
            .with_role(Button { gestures, hits });
        let id = stage.add_child(root, ant, None).unwrap();
        stage.attach(id, Slot::Body, RectBody::new(Rect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
        stage.attach(id, Slot::Interactor, InteractBehavior).unwrap();
        id
    }

    const TAP_DRAG: Gestures = Gestures { touch: false, tap: true, hand: false, drag: true };

    #[test]
    fn test_highest_layer_wins() {
        let mut stage = Stage::new();
        let low = button(&mut stage, 1, Point::ZERO, TAP_DRAG);
        let high = button(&mut stage, 3, Point::new(5.0, 5.0), Gestures { tap: true, ..Gestures::NONE });
        let _outside = button(&mut stage, 9, Point::new(50.0, 0.0), TAP_DRAG);

        let root = stage.root();
        let route = process_touch(&mut stage, root, Point::new(7.0, 7.0)).unwrap();
        assert_eq!(route.tap, Some(high));
        assert_eq!(route.drag, Some(low));
        assert!(!route.processed);
    }

    #[test]
    fn test_touch_only_marks_processed() {
        let mut stage = Stage::new();
        let id = button(&mut stage, 0, Point::new(2.0, 2.0), Gestures { touch: true, ..Gestures::NONE });
        let root = stage.root();
        let route = process_touch(&mut stage, root, Point::new(3.0, 4.0)).unwrap();
        assert_eq!(route, TouchRoute { tap: None, drag: None, processed: true });

        let hits = stage.get(id).unwrap().role_as::<Button>().unwrap().hits.clone();
        assert_eq!(*hits.borrow(), vec![("touch", Point::new(1.0, 2.0))]);
    }

    #[test]
    fn test_interact_dispatches_by_kind() {
        let mut stage = Stage::new();
        let id = button(&mut stage, 0, Point::ZERO, TAP_DRAG);
        let interactor = InteractBehavior;
        interactor
            .interact(&mut stage, id, Interaction::Tap { begin: Point::new(1.0, 1.0) })
            .unwrap();
        interactor
            .interact(
                &mut stage,
                id,
                Interaction::Drag { begin: Point::ZERO, movement: Point::new(3.0, 0.0) },
            )
            .unwrap();

        let hits = stage.get(id).unwrap().role_as::<Button>().unwrap().hits.clone();
        assert_eq!(
            *hits.borrow(),
            vec![("tap", Point::new(1.0, 1.0)), ("drag", Point::new(3.0, 0.0))]
        );
    }

    #[test]
    fn test_whole_interactor_ignores_body() {
        let mut stage = Stage::new();
        let id = stage.spawn(Executant::new().with_role(Button { gestures: TAP_DRAG, ..Default::default() }));
        let reach = WholeInteractor.touch(&mut stage, id, Point::new(1e6, -1e6)).unwrap();
        assert_eq!(reach, Some(Reach::All));
        let reach = InteractBehavior.touch(&mut stage, id, Point::new(1e6, -1e6)).unwrap();
        assert_eq!(reach, None);
    }
}
