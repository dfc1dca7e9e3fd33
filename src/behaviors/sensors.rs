//! Sensor behaviors: report when the host body moves in root space.

use std::rc::Rc;

use crate::core::{AntId, Behavior, Cx, Delegate, Sense, Sensor};
use crate::error::Result;
use crate::geom::Rect;

/// Watches the host body in root space every update and triggers
/// `on_sense` whenever it differs from the previous frame. The first
/// observation after attach only records.
#[derive(Debug, Default)]
pub struct BodySensor {
    on_sense: Rc<Delegate<Sense>>,
    previous: Option<Rect>,
}

impl BodySensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed global body rect.
    pub fn previous(&self) -> Option<Rect> {
        self.previous
    }
}

impl Sensor for BodySensor {
    fn on_sense(&self) -> Rc<Delegate<Sense>> {
        Rc::clone(&self.on_sense)
    }
}

impl Behavior for BodySensor {
    fn attached(&mut self, _host: Option<AntId>) {
        self.previous = None;
    }

    fn behave(&mut self, cx: &mut Cx<'_>, _delta: f64) -> Result<()> {
        let rect = cx.body_rect()?;
        let rect = cx.stage.global_coord(cx.host, rect).normalize();

        let changed = self.previous.is_some_and(|previous| previous != rect);
        self.previous = Some(rect);
        if changed {
            let sense = Sense { rect, host: cx.host };
            Rc::clone(&self.on_sense).trigger(cx.stage, &sense)?;
        }
        Ok(())
    }

    fn as_sensor(&self) -> Option<&dyn Sensor> {
        Some(self)
    }
}

/// A sensor that never fires, for hosts known to stay put.
#[derive(Debug, Default)]
pub struct DeadSensor {
    on_sense: Rc<Delegate<Sense>>,
}

impl DeadSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for DeadSensor {
    fn on_sense(&self) -> Rc<Delegate<Sense>> {
        Rc::clone(&self.on_sense)
    }
}

impl Behavior for DeadSensor {
    fn as_sensor(&self) -> Option<&dyn Sensor> {
        Some(self)
    }
}
