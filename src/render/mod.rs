//! Rendering
//!
//! The drawing context executants paint into. `Canvas` carries a cumulative
//! translate/scale transform (kept by `Pen`) plus a handful of primitives;
//! everything a renderer passes in is in the node's local space and gets
//! mapped to canvas pixels by the pen.
//!
//! Two canvases:
//! - `Easel`: headless, records strokes for tests and tooling
//! - `QuadCanvas`: draws through macroquad

pub mod easel;
pub mod quad;
pub mod renderers;

pub use macroquad::color::Color;
use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect};

pub use easel::{Easel, Stroke};
pub use quad::QuadCanvas;
pub use renderers::{CircleRenderer, FillRenderer, PieceRenderer};

/// A region of a named texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Texture key, as registered with the canvas
    pub key: String,
    /// Source rect in texture pixels
    pub src: Rect,
}

impl Piece {
    pub fn new(key: impl Into<String>, src: Rect) -> Self {
        Self {
            key: key.into(),
            src,
        }
    }

    /// Natural size of the piece in pixels.
    pub fn size(&self) -> Point {
        self.src.size
    }
}

/// Translate/scale state of a canvas, with a save stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    offset: Point,
    scale: Point,
    stack: Vec<(Point, Point)>,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            offset: Point::ZERO,
            scale: Point::ONE,
            stack: Vec::new(),
        }
    }
}

impl Pen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self) {
        self.stack.push((self.offset, self.scale));
    }

    /// Returns to the last saved state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some((offset, scale)) = self.stack.pop() {
            self.offset = offset;
            self.scale = scale;
        }
    }

    pub fn translate(&mut self, by: Point) {
        self.offset += by * self.scale;
    }

    pub fn scale(&mut self, by: Point) {
        self.scale *= by;
    }

    /// Number of unmatched saves.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn current_scale(&self) -> Point {
        self.scale
    }

    /// Local point to canvas pixels.
    pub fn point(&self, local: Point) -> Point {
        local * self.scale + self.offset
    }

    /// Local rect to canvas pixels. May come out virtual under a negative
    /// scale; `draw_piece` uses that to flip.
    pub fn rect(&self, local: Rect) -> Rect {
        local * self.scale + self.offset
    }
}

/// A 2D drawing context.
pub trait Canvas {
    fn pen(&self) -> &Pen;
    fn pen_mut(&mut self) -> &mut Pen;

    fn save(&mut self) {
        self.pen_mut().save();
    }

    fn restore(&mut self) {
        self.pen_mut().restore();
    }

    fn translate(&mut self, by: Point) {
        self.pen_mut().translate(by);
    }

    fn scale(&mut self, by: Point) {
        self.pen_mut().scale(by);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    /// Draws `piece` stretched over `dest`.
    fn draw_piece(&mut self, piece: &Piece, dest: Rect);

    /// Canvas size in pixels.
    fn size(&self) -> Point;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_nesting() {
        let mut pen = Pen::new();
        pen.save();
        pen.translate(Point::new(10.0, 20.0));
        pen.scale(Point::new(2.0, 2.0));
        pen.save();
        pen.translate(Point::new(1.0, 1.0));
        assert_eq!(pen.point(Point::ZERO), Point::new(12.0, 22.0));
        assert_eq!(pen.point(Point::new(1.0, 0.0)), Point::new(14.0, 22.0));

        pen.restore();
        assert_eq!(pen.point(Point::ZERO), Point::new(10.0, 20.0));
        pen.restore();
        pen.restore();
        assert_eq!(pen, Pen::new());
    }

    #[test]
    fn test_pen_negative_scale() {
        let mut pen = Pen::new();
        pen.translate(Point::new(50.0, 0.0));
        pen.scale(Point::new(-1.0, 1.0));
        let rect = pen.rect(Rect::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(rect.width(), -10.0);
        assert_eq!(rect.normalize(), Rect::new(40.0, 0.0, 10.0, 5.0));
    }
}
