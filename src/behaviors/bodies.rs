//! Body behaviors: where the host sits, in its own local space.

use crate::core::{AntId, Behavior, Body, Slot, Stage};
use crate::error::Result;
use crate::geom::{Point, Rect};

/// A fixed rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectBody {
    pub rect: Rect,
}

impl RectBody {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Body for RectBody {
    fn rect(&self, _stage: &Stage, _host: AntId) -> Result<Rect> {
        Ok(self.rect)
    }
}

impl Behavior for RectBody {
    fn as_body(&self) -> Option<&dyn Body> {
        Some(self)
    }
}

/// Natural size of whatever the host's renderer draws, if anything.
fn renderer_extent(stage: &Stage, host: AntId) -> Option<Point> {
    let shared = stage.behavior(host, &Slot::Renderer)?;
    let tenant = shared.borrow();
    let extent = tenant.behavior().as_renderer()?.extent();
    extent
}

/// The renderer's natural size, centered on the host origin. Zero when the
/// renderer has no size or there is no renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBody;

impl Body for ImageBody {
    fn rect(&self, stage: &Stage, host: AntId) -> Result<Rect> {
        Ok(renderer_extent(stage, host)
            .map(|size| Rect::by_center(Point::ZERO, size))
            .unwrap_or(Rect::ZERO))
    }
}

impl Behavior for ImageBody {
    fn as_body(&self) -> Option<&dyn Body> {
        Some(self)
    }
}

/// Like `ImageBody`, with the renderer's size multiplied by `scale` and the
/// host origin placed at the relative `pivot`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevisionBody {
    pub pivot: Point,
    pub scale: Point,
}

impl Default for RevisionBody {
    fn default() -> Self {
        Self {
            pivot: Point::new(0.5, 0.5),
            scale: Point::ONE,
        }
    }
}

impl RevisionBody {
    pub fn new(pivot: Point, scale: Point) -> Self {
        Self { pivot, scale }
    }
}

impl Body for RevisionBody {
    fn rect(&self, stage: &Stage, host: AntId) -> Result<Rect> {
        Ok(renderer_extent(stage, host)
            .map(|size| Rect::by_pivot(self.pivot, size * self.scale))
            .unwrap_or(Rect::ZERO))
    }
}

impl Behavior for RevisionBody {
    fn as_body(&self) -> Option<&dyn Body> {
        Some(self)
    }
}

/// The visible canvas area, in host space.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasBody;

impl Body for CanvasBody {
    fn rect(&self, stage: &Stage, host: AntId) -> Result<Rect> {
        let root = stage.root();
        let scene = stage.body_rect(root)?;
        Ok(stage.spin_coord(Some(root), scene, Some(host)).normalize())
    }
}

impl Behavior for CanvasBody {
    fn as_body(&self) -> Option<&dyn Body> {
        Some(self)
    }
}

/// Body of the root: the canvas rect in root-local space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneBody;

impl Body for SceneBody {
    fn rect(&self, stage: &Stage, host: AntId) -> Result<Rect> {
        let canvas = Rect::from_parts(Point::ZERO, stage.canvas_size());
        Ok(stage.get(host)?.get_coord(canvas).normalize())
    }
}

impl Behavior for SceneBody {
    fn as_body(&self) -> Option<&dyn Body> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Executant;
    use crate::render::{FillRenderer, Piece, PieceRenderer};

    fn piece_host(stage: &mut Stage) -> AntId {
        let root = stage.root();
        let id = stage.add_child(root, Executant::new(), None).unwrap();
        let piece = Piece::new("p", Rect::new(0.0, 0.0, 20.0, 10.0));
        stage.attach(id, Slot::Renderer, PieceRenderer::new(piece)).unwrap();
        id
    }

    #[test]
    fn test_image_body() {
        let mut stage = Stage::new();
        let id = piece_host(&mut stage);
        stage.attach(id, Slot::Body, ImageBody).unwrap();
        assert_eq!(stage.body_rect(id).unwrap(), Rect::new(-10.0, -5.0, 20.0, 10.0));

        let plain = stage.spawn(Executant::new());
        stage.attach(plain, Slot::Renderer, FillRenderer::new(macroquad::color::RED)).unwrap();
        assert_eq!(stage.body_rect(plain).unwrap(), Rect::ZERO);
    }

    #[test]
    fn test_revision_body() {
        let mut stage = Stage::new();
        let id = piece_host(&mut stage);
        let body = RevisionBody::new(Point::new(0.0, 1.0), Point::new(2.0, 2.0));
        stage.attach(id, Slot::Body, body).unwrap();
        assert_eq!(stage.body_rect(id).unwrap(), Rect::new(0.0, -20.0, 40.0, 20.0));
    }

    #[test]
    fn test_scene_and_canvas_body() {
        let mut stage = Stage::new();
        stage.set_canvas_size(Point::new(320.0, 240.0));
        let root = stage.root();
        stage.get_mut(root).unwrap().scale = Point::new(2.0, 2.0);
        stage.attach(root, Slot::Body, SceneBody).unwrap();
        assert_eq!(stage.body_rect(root).unwrap(), Rect::new(0.0, 0.0, 160.0, 120.0));

        let ant = Executant::new().at(Point::new(10.0, 20.0));
        let id = stage.add_child(root, ant, None).unwrap();
        stage.attach(id, Slot::Body, CanvasBody).unwrap();
        assert_eq!(stage.body_rect(id).unwrap(), Rect::new(-10.0, -20.0, 160.0, 120.0));
    }
}
