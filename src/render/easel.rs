//! Recording canvas. Keeps every stroke in canvas pixels so a drawn tree can
//! be inspected without a window.

use super::{Canvas, Color, Pen, Piece};
use crate::geom::{Point, Rect};

/// One recorded operation. Geometry is in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    Save,
    Restore,
    Translate(Point),
    Scale(Point),
    FillRect { rect: Rect, color: Color },
    FillCircle { center: Point, radius: f64, color: Color },
    Piece { key: String, dest: Rect },
}

#[derive(Debug, Default)]
pub struct Easel {
    pen: Pen,
    size: Point,
    strokes: Vec<Stroke>,
}

impl Easel {
    pub fn new(size: Point) -> Self {
        Self {
            pen: Pen::new(),
            size,
            strokes: Vec::new(),
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn count(&self, pred: impl Fn(&Stroke) -> bool) -> usize {
        self.strokes.iter().filter(|s| pred(s)).count()
    }

    /// Saves not yet restored.
    pub fn depth(&self) -> usize {
        self.pen.depth()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.pen = Pen::new();
    }
}

impl Canvas for Easel {
    fn pen(&self) -> &Pen {
        &self.pen
    }

    fn pen_mut(&mut self) -> &mut Pen {
        &mut self.pen
    }

    fn save(&mut self) {
        self.pen.save();
        self.strokes.push(Stroke::Save);
    }

    fn restore(&mut self) {
        self.pen.restore();
        self.strokes.push(Stroke::Restore);
    }

    fn translate(&mut self, by: Point) {
        self.pen.translate(by);
        self.strokes.push(Stroke::Translate(by));
    }

    fn scale(&mut self, by: Point) {
        self.pen.scale(by);
        self.strokes.push(Stroke::Scale(by));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.pen.rect(rect).normalize();
        self.strokes.push(Stroke::FillRect { rect, color });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let center = self.pen.point(center);
        let radius = radius * self.pen.current_scale().x.abs();
        self.strokes.push(Stroke::FillCircle { center, radius, color });
    }

    fn draw_piece(&mut self, piece: &Piece, dest: Rect) {
        let dest = self.pen.rect(dest);
        self.strokes.push(Stroke::Piece {
            key: piece.key.clone(),
            dest,
        });
    }

    fn size(&self) -> Point {
        self.size
    }
}
