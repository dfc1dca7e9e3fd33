//! Stock renderers. Each paints over the host's body rect.

use tracing::trace;

use super::{Canvas, Color, Piece};
use crate::core::{AntId, Behavior, Renderer, Stage};
use crate::geom::{Point, Rect};

/// Body rect of `host`, or `None` (with a trace) if it cannot be had.
fn dest(stage: &Stage, host: AntId) -> Option<Rect> {
    match stage.body_rect(host) {
        Ok(rect) => Some(rect),
        Err(err) => {
            trace!(?host, %err, "renderer has no destination");
            None
        }
    }
}

/// Fills the body rect with a flat color.
#[derive(Debug, Clone)]
pub struct FillRenderer {
    pub color: Color,
}

impl FillRenderer {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Renderer for FillRenderer {
    fn render(&self, canvas: &mut dyn Canvas, stage: &Stage, host: AntId) {
        if let Some(rect) = dest(stage, host) {
            canvas.fill_rect(rect, self.color);
        }
    }
}

impl Behavior for FillRenderer {
    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

/// Fills the circle inscribed in the body rect's width.
#[derive(Debug, Clone)]
pub struct CircleRenderer {
    pub color: Color,
}

impl CircleRenderer {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Renderer for CircleRenderer {
    fn render(&self, canvas: &mut dyn Canvas, stage: &Stage, host: AntId) {
        if let Some(rect) = dest(stage, host) {
            canvas.fill_circle(rect.center(), rect.width() / 2.0, self.color);
        }
    }
}

impl Behavior for CircleRenderer {
    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

/// Stretches an image piece over the body rect. Its natural size feeds the
/// default image body.
#[derive(Debug, Clone)]
pub struct PieceRenderer {
    pub piece: Piece,
}

impl PieceRenderer {
    pub fn new(piece: Piece) -> Self {
        Self { piece }
    }

    pub fn set_piece(&mut self, piece: Piece) {
        self.piece = piece;
    }
}

impl Renderer for PieceRenderer {
    fn render(&self, canvas: &mut dyn Canvas, stage: &Stage, host: AntId) {
        if let Some(rect) = dest(stage, host) {
            canvas.draw_piece(&self.piece, rect);
        }
    }

    fn extent(&self) -> Option<Point> {
        Some(self.piece.size())
    }
}

impl Behavior for PieceRenderer {
    fn as_renderer(&self) -> Option<&dyn Renderer> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Executant, Slot};
    use crate::render::{Easel, Stroke};

    #[test]
    fn test_piece_renderer_centers_on_host() {
        let mut stage = Stage::new();
        let root = stage.root();
        let ant = Executant::new().with_layer(0).at(Point::new(40.0, 30.0));
        let id = stage.add_child(root, ant, None).unwrap();
        let piece = Piece::new("balloon", Rect::new(0.0, 0.0, 16.0, 24.0));
        stage.attach(id, Slot::Renderer, PieceRenderer::new(piece)).unwrap();

        let mut easel = Easel::new(Point::new(100.0, 100.0));
        stage.draw_all_layers(&mut easel);

        let pieces: Vec<&Stroke> = easel
            .strokes()
            .iter()
            .filter(|s| matches!(s, Stroke::Piece { .. }))
            .collect();
        assert_eq!(
            pieces,
            vec![&Stroke::Piece { key: "balloon".into(), dest: Rect::new(32.0, 18.0, 16.0, 24.0) }]
        );
    }

    #[test]
    fn test_fill_without_body_size_draws_empty() {
        let mut stage = Stage::new();
        let id = stage.spawn(Executant::new());
        stage
            .attach(id, Slot::Renderer, FillRenderer::new(macroquad::color::BLUE))
            .unwrap();
        let mut easel = Easel::new(Point::new(10.0, 10.0));
        stage.draw(id, 0, &mut easel);
        // no layer, nothing depicted
        assert_eq!(easel.count(|s| matches!(s, Stroke::FillRect { .. })), 0);
    }
}
