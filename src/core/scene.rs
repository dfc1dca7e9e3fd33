//! Scene
//!
//! Drives a stage: owns it together with the canvas it paints on, keeps the
//! frame clock and turns raw pointer input into gestures.
//!
//! Clock: `poll` is meant to be called as often as the host loop likes and
//! only ticks once a frame interval has passed. A tick never simulates more
//! than `1000 / minrate` ms, so a long stall slows the game down instead of
//! skipping through it.
//!
//! Gestures: a touch is routed once at its start (`process_touch` picks the
//! tap and drag receivers). Moving past the drag threshold turns it into a
//! drag; releasing it quickly without dragging makes a tap. Hands go out
//! right away from `touch_end`, taps and drags are queued as a bullet and
//! delivered during the next update, right after the root's own update.

use tracing::{debug, trace};

use super::capability::Interaction;
use super::executant::Phase;
use super::{share, AntId, Slot, Stage};
use crate::behaviors::bodies::SceneBody;
use crate::behaviors::interact::{deliver, process_touch};
use crate::config::SceneConfig;
use crate::error::Result;
use crate::geom::Point;
use crate::render::Canvas;

/// A gesture waiting for the next update.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bullet {
    Tap,
    /// Movement accumulated since the last update, in view pixels
    Drag(Point),
}

/// Pointer state between touch start and the delivery of its last bullet.
#[derive(Debug, Clone, Default)]
struct Gesture {
    /// Touch start in view pixels
    begin: Point,
    /// Last point a drag movement was measured from
    follow: Point,
    started: f64,
    pressed: bool,
    dragged: bool,
    tap: Option<AntId>,
    drag: Option<AntId>,
    bullet: Option<Bullet>,
}

pub struct Scene<C: Canvas> {
    pub stage: Stage,
    pub canvas: C,
    config: SceneConfig,
    /// Timestamp of the last tick in ms
    now: f64,
    playing: bool,
    /// Stopped because the window went away; the next touch resumes
    suspended: bool,
    /// Canvas pixels per view pixel
    ratio: Point,
    gesture: Gesture,
}

impl<C: Canvas> Scene<C> {
    pub fn new(canvas: C, config: SceneConfig) -> Result<Self> {
        Self::with_stage(Stage::new(), canvas, config)
    }

    /// A scene over an existing stage, typically one built with a fixed seed.
    pub fn with_stage(mut stage: Stage, canvas: C, config: SceneConfig) -> Result<Self> {
        stage.set_canvas_size(canvas.size());
        let root = stage.root();
        stage.set_behavior(root, Some(share(SceneBody)), Some(Slot::Body))?;
        Ok(Self {
            stage,
            canvas,
            config,
            now: 0.0,
            playing: false,
            suspended: false,
            ratio: Point::ONE,
            gesture: Gesture::default(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn root(&self) -> AntId {
        self.stage.root()
    }

    /// Tells the scene how large the canvas appears on screen, so pointer
    /// positions can be mapped to canvas pixels.
    pub fn set_view_size(&mut self, view: Point) {
        let canvas = self.canvas.size();
        self.ratio = Point::new(
            if view.x > 0.0 { canvas.x / view.x } else { 1.0 },
            if view.y > 0.0 { canvas.y / view.y } else { 1.0 },
        );
    }

    /// Follows a canvas resize.
    pub fn canvas_resized(&mut self) {
        self.stage.set_canvas_size(self.canvas.size());
    }

    // Clock
    //==========================================================================

    /// Starts or resumes the clock at timestamp `now` (ms).
    pub fn start(&mut self, now: f64) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.suspended = false;
        self.now = now;
        debug!(now, "scene started");
    }

    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        debug!(now = self.now, time = self.stage.time, "scene stopped");
    }

    /// Stops until the next touch, as when the window is hidden.
    pub fn suspend(&mut self) {
        self.stop();
        self.suspended = true;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Ticks if a frame interval has passed since the last tick. Returns
    /// whether a frame ran.
    pub fn poll(&mut self, timestamp: f64) -> Result<bool> {
        if !self.playing || self.now + self.config.frame_interval() > timestamp {
            return Ok(false);
        }
        self.tick(timestamp)?;
        Ok(true)
    }

    /// Runs one frame for the time elapsed up to `timestamp`, clamped to
    /// the min-rate frame time.
    pub fn tick(&mut self, timestamp: f64) -> Result<()> {
        let elapsed = timestamp - self.now;
        let limit = self.config.max_delta();
        if elapsed > limit {
            trace!(elapsed, limit, "frame delta clamped");
        }
        self.now = timestamp;
        self.frame(elapsed.min(limit))
    }

    /// Processes and draws one frame of `delta` ms.
    pub fn frame(&mut self, delta: f64) -> Result<()> {
        self.stage.delta = delta;
        self.stage.time += delta;

        let root = self.stage.root();
        self.stage.cycle(root, Phase::Stand, None)?;

        let mut bullet = self.gesture.bullet.take();
        let gesture = &self.gesture;
        let ratio = self.ratio;
        let mut fire = |stage: &mut Stage| match bullet.take() {
            Some(bullet) => fire_bullet(stage, gesture, ratio, bullet),
            None => Ok(()),
        };
        self.stage.cycle(root, Phase::Update, Some(&mut fire))?;

        self.stage.cycle(root, Phase::Stay, None)?;
        self.draw();
        Ok(())
    }

    /// Paints the tree again without advancing it.
    pub fn draw(&mut self) {
        self.stage.draw_all_layers(&mut self.canvas);
    }

    // Gestures
    //==========================================================================

    /// Pointer pressed at `point` (view pixels) at time `now` (ms). Returns
    /// whether anything in the tree reacted to it.
    pub fn touch_start(&mut self, point: Point, now: f64) -> Result<bool> {
        if self.suspended {
            self.start(now);
            self.gesture.pressed = false;
            return Ok(false);
        }
        if !self.playing {
            return Ok(false);
        }

        self.gesture = Gesture {
            begin: point,
            follow: point,
            started: now,
            pressed: true,
            ..Gesture::default()
        };
        let root = self.stage.root();
        let route = process_touch(&mut self.stage, root, point * self.ratio)?;
        trace!(tap = ?route.tap, drag = ?route.drag, processed = route.processed, "touch routed");
        self.gesture.tap = route.tap;
        self.gesture.drag = route.drag;
        Ok(route.reacted())
    }

    /// Pointer moved to `point` (view pixels).
    pub fn touch_move(&mut self, point: Point) {
        let gesture = &mut self.gesture;
        if !self.playing || !gesture.pressed {
            return;
        }
        if !gesture.dragged && gesture.follow.axisdist_to(point) < self.config.drag_threshold {
            return;
        }

        gesture.dragged = true;
        let movement = point - gesture.follow;
        gesture.follow = point;
        match &mut gesture.bullet {
            Some(Bullet::Drag(pending)) => *pending += movement,
            _ => gesture.bullet = Some(Bullet::Drag(movement)),
        }
    }

    /// Pointer released at time `now` (ms).
    pub fn touch_end(&mut self, now: f64) -> Result<()> {
        if !self.playing || !self.gesture.pressed {
            return Ok(());
        }
        self.gesture.pressed = false;
        if self.gesture.dragged || now - self.gesture.started >= self.config.tap_limit_ms {
            return Ok(());
        }

        self.gesture.bullet = Some(Bullet::Tap);
        if let Some(target) = self.gesture.tap {
            let begin = self.stage.local_coord(target, self.gesture.begin * self.ratio);
            deliver(&mut self.stage, target, Interaction::Hand { begin })?;
        }
        Ok(())
    }
}

/// Delivers a queued gesture to its receiver, in the receiver's space.
fn fire_bullet(stage: &mut Stage, gesture: &Gesture, ratio: Point, bullet: Bullet) -> Result<()> {
    let target = match bullet {
        Bullet::Tap => gesture.tap,
        Bullet::Drag(_) => gesture.drag,
    };
    let Some(target) = target.filter(|t| stage.contains(*t)) else {
        return Ok(());
    };

    let begin = stage.local_coord(target, gesture.begin * ratio);
    let interaction = match bullet {
        Bullet::Tap => Interaction::Tap { begin },
        Bullet::Drag(movement) => Interaction::Drag {
            begin,
            movement: stage.local_scale(target, movement * ratio),
        },
    };
    deliver(stage, target, interaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::bodies::RectBody;
    use crate::behaviors::interact::InteractBehavior;
    use crate::core::{Behavior, Command, Cx, Executant, Gestures, Role};
    use crate::geom::Rect;
    use crate::render::{Easel, FillRenderer, Stroke};
    use macroquad::color::RED;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(&'static str, Point)>>>;

    struct Pad {
        log: Log,
    }

    impl Role for Pad {
        fn gestures(&self) -> Gestures {
            Gestures {
                touch: false,
                tap: true,
                hand: true,
                drag: true,
            }
        }

        fn tap(&mut self, _cx: &mut Cx<'_>, begin: Point) -> Result<()> {
            self.log.borrow_mut().push(("tap", begin));
            Ok(())
        }

        fn hand(&mut self, _cx: &mut Cx<'_>, begin: Point) -> Result<()> {
            self.log.borrow_mut().push(("hand", begin));
            Ok(())
        }

        fn drag(&mut self, _cx: &mut Cx<'_>, movement: Point) -> Result<()> {
            self.log.borrow_mut().push(("drag", movement));
            Ok(())
        }
    }

    fn scene() -> Scene<Easel> {
        Scene::new(Easel::new(Point::new(200.0, 100.0)), SceneConfig::default()).unwrap()
    }

    /// A 40x40 pad at (100, 50), drawn at half scale.
    fn pad(scene: &mut Scene<Easel>) -> (AntId, Log) {
        let log = Log::default();
        let ant = Executant::new()
            .at(Point::new(100.0, 50.0))
            .with_scale(Point::new(0.5, 0.5))
            .with_layer(1)
            .with_role(Pad { log: log.clone() });
        let root = scene.root();
        let id = scene.stage.add_child(root, ant, None).unwrap();
        let body = RectBody::new(Rect::new(0.0, 0.0, 40.0, 40.0));
        scene.stage.attach(id, Slot::Body, body).unwrap();
        scene.stage.attach(id, Slot::Interactor, InteractBehavior).unwrap();
        (id, log)
    }

    #[test]
    fn test_clock_rates() {
        let mut scene = scene();
        assert!(!scene.poll(100.0).unwrap());

        scene.start(1000.0);
        assert!(scene.is_playing());
        assert!(!scene.poll(1007.0).unwrap());
        assert!(scene.poll(1008.0).unwrap());
        assert_eq!(scene.stage.delta, 8.0);

        // a long stall is clamped to the min-rate frame time
        assert!(scene.poll(3000.0).unwrap());
        assert_eq!(scene.stage.delta, 100.0);
        assert_eq!(scene.stage.time, 108.0);

        scene.stop();
        assert!(!scene.poll(4000.0).unwrap());
    }

    #[test]
    fn test_root_body_is_canvas() {
        let mut scene = scene();
        let root = scene.root();
        assert_eq!(scene.stage.body_rect(root).unwrap(), Rect::new(0.0, 0.0, 200.0, 100.0));

        scene.stage.get_mut(root).unwrap().scale = Point::new(2.0, 2.0);
        assert_eq!(scene.stage.body_rect(root).unwrap(), Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_frame_draws_layers() {
        let mut scene = scene();
        let root = scene.root();
        let id = scene
            .stage
            .add_child(root, Executant::new().with_layer(2), None)
            .unwrap();
        let body = RectBody::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        scene.stage.attach(id, Slot::Body, body).unwrap();
        scene.stage.attach(id, Slot::Renderer, FillRenderer::new(RED)).unwrap();

        scene.frame(16.0).unwrap();
        assert_eq!(scene.canvas.count(|s| matches!(s, Stroke::FillRect { .. })), 1);
        assert_eq!(scene.canvas.depth(), 0);
    }

    #[test]
    fn test_tap_sends_hand_then_tap() {
        let mut scene = scene();
        let (_, log) = pad(&mut scene);
        scene.start(0.0);

        assert!(scene.touch_start(Point::new(104.0, 52.0), 10.0).unwrap());
        scene.touch_end(200.0).unwrap();
        assert_eq!(*log.borrow(), vec![("hand", Point::new(8.0, 4.0))]);

        scene.frame(16.0).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![("hand", Point::new(8.0, 4.0)), ("tap", Point::new(8.0, 4.0))]
        );

        // the bullet is spent
        scene.frame(16.0).unwrap();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_slow_release_is_no_tap() {
        let mut scene = scene();
        let (_, log) = pad(&mut scene);
        scene.start(0.0);
        scene.touch_start(Point::new(104.0, 52.0), 0.0).unwrap();
        scene.touch_end(750.0).unwrap();
        scene.frame(16.0).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_drag_accumulates_until_update() {
        let mut scene = scene();
        let (_, log) = pad(&mut scene);
        scene.start(0.0);
        scene.touch_start(Point::new(104.0, 52.0), 0.0).unwrap();

        // under the threshold on both axes
        scene.touch_move(Point::new(110.0, 58.0));
        scene.frame(16.0).unwrap();
        assert!(log.borrow().is_empty());

        scene.touch_move(Point::new(114.0, 52.0));
        scene.touch_move(Point::new(116.0, 53.0));
        scene.frame(16.0).unwrap();
        // scaled into the pad's half-size space
        assert_eq!(*log.borrow(), vec![("drag", Point::new(24.0, 2.0))]);

        scene.touch_end(100.0).unwrap();
        scene.frame(16.0).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_view_ratio_maps_pointer() {
        let mut scene = scene();
        let (pad_id, log) = pad(&mut scene);
        scene.set_view_size(Point::new(400.0, 200.0));
        scene.start(0.0);

        assert!(!scene.touch_start(Point::new(10.0, 10.0), 0.0).unwrap());
        assert!(scene.touch_start(Point::new(208.0, 104.0), 0.0).unwrap());
        scene.touch_end(10.0).unwrap();
        assert_eq!(*log.borrow(), vec![("hand", Point::new(8.0, 4.0))]);

        scene.stage.destroy(pad_id).unwrap();
        scene.frame(16.0).unwrap();
        assert_eq!(log.borrow().len(), 1);
    }

    /// Pops itself on tap.
    struct Bubble;

    impl Role for Bubble {
        fn gestures(&self) -> Gestures {
            Gestures { tap: true, ..Gestures::NONE }
        }

        fn tap(&mut self, cx: &mut Cx<'_>, _begin: Point) -> Result<()> {
            let host = cx.host;
            cx.stage.destroy(host)
        }
    }

    #[test]
    fn test_tap_may_destroy_receiver() {
        let mut scene = scene();
        let root = scene.root();
        let ant = Executant::new().at(Point::new(100.0, 50.0)).with_layer(1).with_role(Bubble);
        let bubble = scene.stage.add_child(root, ant, None).unwrap();
        let inner = scene.stage.add_child(bubble, Executant::new(), None).unwrap();
        scene.stage.attach(bubble, Slot::Body, RectBody::new(Rect::new(0.0, 0.0, 20.0, 20.0))).unwrap();
        let interactor = scene.stage.attach(bubble, Slot::Interactor, InteractBehavior).unwrap();
        scene.start(0.0);

        assert!(scene.touch_start(Point::new(105.0, 55.0), 0.0).unwrap());
        scene.touch_end(50.0).unwrap();
        assert!(scene.stage.contains(bubble));

        scene.frame(16.0).unwrap();
        assert!(!scene.stage.contains(bubble));
        assert!(!scene.stage.contains(inner));
        assert!(scene.stage.get(root).unwrap().childs().is_empty());
        assert_eq!(interactor.borrow().readiness(), crate::core::Readiness::Detached);
        scene.frame(16.0).unwrap();
    }

    type Trail = Rc<RefCell<Vec<String>>>;

    struct Marcher {
        tag: &'static str,
        trail: Trail,
    }

    impl Role for Marcher {
        fn first(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
            self.trail.borrow_mut().push(format!("{}:first", self.tag));
            Ok(())
        }

        fn update(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
            self.trail.borrow_mut().push(format!("{}:update", self.tag));
            Ok(())
        }

        fn stay(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
            self.trail.borrow_mut().push(format!("{}:stay", self.tag));
            Ok(())
        }
    }

    struct Stamp {
        tag: &'static str,
        trail: Trail,
    }

    impl Behavior for Stamp {
        fn attached(&mut self, host: Option<AntId>) {
            if host.is_some() {
                self.trail.borrow_mut().push(format!("{}:attach", self.tag));
            }
        }

        fn before(&mut self, _cx: &mut Cx<'_>) -> Result<()> {
            self.trail.borrow_mut().push(format!("{}:before", self.tag));
            Ok(())
        }

        fn behave(&mut self, _cx: &mut Cx<'_>, _delta: f64) -> Result<()> {
            self.trail.borrow_mut().push(format!("{}:behave", self.tag));
            Ok(())
        }
    }

    fn marcher(scene: &mut Scene<Easel>, parent: AntId, tag: &'static str, trail: &Trail) -> AntId {
        let ant = Executant::new().with_role(Marcher { tag, trail: trail.clone() });
        let id = scene.stage.add_child(parent, ant, None).unwrap();
        let stamp = Stamp { tag, trail: trail.clone() };
        scene.stage.attach(id, Slot::Mover, stamp).unwrap();
        id
    }

    #[test]
    fn test_stand_reaches_every_node_before_any_update() {
        let trail = Trail::default();
        let mut scene = scene();
        let root = scene.root();
        let a = marcher(&mut scene, root, "a", &trail);
        marcher(&mut scene, a, "b", &trail);
        let c = marcher(&mut scene, root, "c", &trail);
        let late = share(Stamp { tag: "late", trail: trail.clone() });
        scene
            .stage
            .bid_behavior(c, Command::Set { leaf: late, name: Some(Slot::Life) })
            .unwrap();
        trail.borrow_mut().clear();

        scene.start(0.0);
        assert!(scene.poll(8.0).unwrap());

        let trail = trail.borrow().clone();
        assert_eq!(
            trail,
            [
                "a:before", "b:before", "late:attach", "c:before", "late:before",
                "a:first", "a:behave", "b:first", "b:behave", "c:first", "c:behave", "late:behave",
                "a:stay", "b:stay", "c:stay",
            ]
        );
        let last_stand = trail
            .iter()
            .rposition(|e| e.ends_with(":before") || e.ends_with(":attach"))
            .unwrap();
        let first_update = trail
            .iter()
            .position(|e| e.ends_with(":first") || e.ends_with(":update"))
            .unwrap();
        assert!(last_stand < first_update);
    }

    #[test]
    fn test_suspended_scene_resumes_on_touch() {
        let mut scene = scene();
        let (_, log) = pad(&mut scene);
        scene.start(0.0);
        scene.suspend();
        assert!(!scene.is_playing());

        assert!(!scene.touch_start(Point::new(104.0, 52.0), 500.0).unwrap());
        assert!(scene.is_playing());
        scene.touch_end(510.0).unwrap();
        assert!(log.borrow().is_empty());
        assert!(!scene.poll(507.0).unwrap());
        assert!(scene.poll(508.0).unwrap());
    }
}
