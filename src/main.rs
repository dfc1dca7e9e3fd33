//! ZEP demo: pop the drifting balloons
//!
//! Tap anywhere to send the player there, or drag to shove it around. A
//! sparkle trail follows the player; balloons bounce inside the canvas and
//! burst when the player touches them.
//!
//! Reads `zep.ron` from the working directory if present.

use std::path::Path;

use macroquad::color::{GOLD, ORANGE, RED, SKYBLUE};
use macroquad::prelude::{
    clear_background, get_time, is_mouse_button_down, is_mouse_button_pressed,
    is_mouse_button_released, mouse_position, next_frame, screen_height, screen_width, Conf,
    MouseButton,
};
use rand::Rng;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use zep::behaviors::{
    Anchor, AngleMover, CircleRigid, ColliderBehavior, DestineMover, InsideSkater, RectBody,
    Rivals, TimerBehavior, WholeInteractor,
};
use zep::core::{share, Command, Cx, Delegate, Gestures, Pick};
use zep::geom::angle::PI360;
use zep::geom::Edge;
use zep::particles::{Clocker, EmissionParticle, FuzzyValue, Look, Mistant};
use zep::render::{CircleRenderer, FillRenderer, QuadCanvas};
use zep::{AntId, Executant, Point, Rect, Result, Role, Scene, SceneConfig, Slot, Stage, VERSION};

const CONFIG_FILE: &str = "zep.ron";

fn load_config() -> Result<SceneConfig> {
    if Path::new(CONFIG_FILE).exists() {
        SceneConfig::load(CONFIG_FILE)
    } else {
        Ok(SceneConfig::default())
    }
}

fn window_conf() -> Conf {
    let config = load_config().unwrap_or_default();
    Conf {
        window_title: format!("{} v{}", config.title, VERSION),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

// Roles
//==============================================================================

/// Drifts around until popped.
struct Balloon;

impl Role for Balloon {}

/// Pops every balloon it touches.
struct Player;

impl Role for Player {
    fn collided(&mut self, cx: &mut Cx<'_>, rival: AntId) -> Result<()> {
        let balloon = cx.stage.get(rival)?;
        if balloon.role_as::<Balloon>().is_none() {
            return Ok(());
        }
        let at = balloon.position;
        let root = cx.stage.root();

        cx.stage.bid_child(root, Command::Destroy(Pick::Leaf(rival)))?;
        burst(cx.stage, at)?;
        spawn_balloon(cx.stage)?;
        info!(x = at.x, y = at.y, "balloon popped");
        Ok(())
    }
}

/// The playing field: answers every tap and drag not taken by something
/// on a higher layer.
struct Field {
    player: AntId,
}

impl Role for Field {
    fn gestures(&self) -> Gestures {
        Gestures {
            tap: true,
            drag: true,
            ..Gestures::NONE
        }
    }

    fn tap(&mut self, cx: &mut Cx<'_>, begin: Point) -> Result<()> {
        debug!(x = begin.x, y = begin.y, "player sent");
        cx.stage.attach(self.player, Slot::Mover, DestineMover::new(begin, 180.0))?;
        Ok(())
    }

    fn drag(&mut self, cx: &mut Cx<'_>, movement: Point) -> Result<()> {
        cx.stage.get_mut(self.player)?.position += movement;
        Ok(())
    }
}

// Scene building
//==============================================================================

/// Area balloons bounce in, in root space.
fn rink(stage: &Stage) -> Rect {
    Rect::from_parts(Point::ZERO, stage.canvas_size())
}

fn spawn_balloon(stage: &mut Stage) -> Result<AntId> {
    let area = rink(stage).swell(-24.0);
    let rng = stage.rng();
    let at = Point::new(
        rng.gen_range(area.left()..area.right().max(area.left() + 1.0)),
        rng.gen_range(area.top()..area.bottom().max(area.top() + 1.0)),
    );
    let heading = rng.gen_range(0.0..PI360);

    let id = stage.spawn(Executant::new().at(at).with_layer(2).with_role(Balloon));
    stage.attach(id, Slot::Body, RectBody::new(Rect::new(-12.0, -12.0, 24.0, 24.0)))?;
    stage.attach(id, Slot::Renderer, CircleRenderer::new(RED))?;
    stage.attach(id, Slot::Rigid, CircleRigid)?;
    stage.attach(id, Slot::Mover, AngleMover::new(heading, 70.0))?;

    let skater = InsideSkater::new(rink(stage));
    skater.on_bound().register(
        Delegate::callback(move |stage: &mut Stage, edge: &Edge| {
            let vertical = edge.is_vertical();
            stage.with_behavior(id, &Slot::Mover, |mover: &mut AngleMover| {
                if vertical {
                    mover.flip();
                } else {
                    mover.flop();
                }
            });
            Ok(())
        }),
        false,
    );
    stage.attach(id, Slot::Key("skater".into()), skater)?;

    let root = stage.root();
    stage.bid_child(root, Command::Set { leaf: id, name: None })?;
    Ok(id)
}

/// A one-off spray of particles at `at` that cleans itself up.
fn burst(stage: &mut Stage, at: Point) -> Result<()> {
    let shard = EmissionParticle::new(
        Look::Dot {
            radius: 2.5,
            color: ORANGE,
        },
        FuzzyValue::new(300.0, 700.0),
        FuzzyValue::fuzz(120.0, 60.0),
    );
    let mut mist = Mistant::gush(move |rng| shard.hatch(rng));
    for _ in 0..24 {
        mist.increment(stage.rng());
    }

    let id = stage.spawn(Executant::new().at(at).with_layer(5).with_role(mist));
    let root = stage.root();
    let life = TimerBehavior::new(800.0);
    life.on_timeout().register(
        Delegate::callback(move |stage: &mut Stage, _: &()| {
            stage.bid_child(root, Command::Destroy(Pick::Leaf(id)))
        }),
        true,
    );
    stage.attach(id, Slot::Life, life)?;
    stage.bid_child(root, Command::Set { leaf: id, name: None })
}

fn build(scene: &mut Scene<QuadCanvas>) -> Result<()> {
    let stage = &mut scene.stage;
    let root = stage.root();
    let center = rink(stage).center();

    let player = stage.add_child(
        root,
        Executant::new().at(center).with_layer(3).with_role(Player),
        Some("player".into()),
    )?;
    stage.attach(player, Slot::Body, RectBody::new(Rect::new(-10.0, -10.0, 20.0, 20.0)))?;
    stage.attach(player, Slot::Renderer, FillRenderer::new(SKYBLUE))?;
    stage.attach(player, Slot::Collider, ColliderBehavior::new(Rivals::Siblings))?;

    let sparkle = EmissionParticle::new(
        Look::Dot {
            radius: 1.5,
            color: GOLD,
        },
        FuzzyValue::new(250.0, 600.0),
        FuzzyValue::new(20.0, 60.0),
    );
    let trail = Mistant::clocked(move |rng| sparkle.hatch(rng), Clocker::new(FuzzyValue::new(20.0, 50.0)));
    let trail = stage.add_child(root, Executant::new().with_layer(4).with_role(trail), Some("trail".into()))?;
    stage.attach(trail, Slot::Anchor, Anchor::position(Some(player), Point::ZERO))?;

    stage.set_role(root, Some(Box::new(Field { player })))?;
    stage.set_behavior(root, Some(share(WholeInteractor)), Some(Slot::Interactor))?;

    for _ in 0..3 {
        spawn_balloon(stage)?;
    }
    Ok(())
}

async fn run(config: SceneConfig) -> Result<()> {
    let background = config.background_color();
    let canvas = QuadCanvas::new(config.size());
    let mut scene = Scene::new(canvas, config)?;
    build(&mut scene)?;
    scene.start(get_time() * 1000.0);

    loop {
        let now = get_time() * 1000.0;
        scene.set_view_size(Point::new(screen_width() as f64, screen_height() as f64));

        let (x, y) = mouse_position();
        let pointer = Point::new(x as f64, y as f64);
        if is_mouse_button_pressed(MouseButton::Left) {
            scene.touch_start(pointer, now)?;
        } else if is_mouse_button_down(MouseButton::Left) {
            scene.touch_move(pointer);
        }
        if is_mouse_button_released(MouseButton::Left) {
            scene.touch_end(now)?;
        }

        clear_background(background);
        scene.canvas.begin();
        if !scene.poll(now)? {
            scene.draw();
        }
        next_frame().await;
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    init_tracing();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            warn!(%err, "falling back to the default config");
            SceneConfig::default()
        }
    };
    info!(title = %config.title, width = config.width, height = config.height, "starting");

    if let Err(err) = run(config).await {
        error!(%err, "scene failed");
    }
}
