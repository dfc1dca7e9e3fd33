//! macroquad-backed canvas.
//!
//! Textures are registered by key; a piece whose key is unknown is skipped
//! with a trace event rather than failing the frame.

use std::collections::HashMap;

use macroquad::prelude::{
    draw_circle, draw_rectangle, draw_texture_ex, DrawTextureParams, FilterMode, Texture2D, Vec2,
    WHITE,
};
use tracing::trace;

use super::{Canvas, Color, Pen, Piece};
use crate::geom::{Point, Rect};

pub struct QuadCanvas {
    pen: Pen,
    size: Point,
    textures: HashMap<String, Texture2D>,
}

impl QuadCanvas {
    pub fn new(size: Point) -> Self {
        Self {
            pen: Pen::new(),
            size,
            textures: HashMap::new(),
        }
    }

    /// Registers a texture under `key`. Pixel art stays crisp.
    pub fn add_texture(&mut self, key: impl Into<String>, texture: Texture2D) {
        texture.set_filter(FilterMode::Nearest);
        self.textures.insert(key.into(), texture);
    }

    /// Builds a texture from raw RGBA8 pixels and registers it.
    pub fn add_rgba(&mut self, key: impl Into<String>, width: u16, height: u16, pixels: &[u8]) {
        self.add_texture(key, Texture2D::from_rgba8(width, height, pixels));
    }

    pub fn resize(&mut self, size: Point) {
        self.size = size;
    }

    /// Resets the transform at the start of a frame.
    pub fn begin(&mut self) {
        self.pen = Pen::new();
    }
}

impl Canvas for QuadCanvas {
    fn pen(&self) -> &Pen {
        &self.pen
    }

    fn pen_mut(&mut self) -> &mut Pen {
        &mut self.pen
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = self.pen.rect(rect).normalize();
        draw_rectangle(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
            color,
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let center = self.pen.point(center);
        let scale = self.pen.current_scale().abs();
        let radius = radius * (scale.x + scale.y) / 2.0;
        draw_circle(center.x as f32, center.y as f32, radius as f32, color);
    }

    fn draw_piece(&mut self, piece: &Piece, dest: Rect) {
        let Some(texture) = self.textures.get(&piece.key) else {
            trace!(key = %piece.key, "piece texture not loaded");
            return;
        };
        let dest = self.pen.rect(dest);
        let flip_x = dest.width() < 0.0;
        let flip_y = dest.height() < 0.0;
        let dest = dest.normalize();

        draw_texture_ex(
            texture,
            dest.left() as f32,
            dest.top() as f32,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(dest.width() as f32, dest.height() as f32)),
                source: Some(macroquad::math::Rect::new(
                    piece.src.left() as f32,
                    piece.src.top() as f32,
                    piece.src.width() as f32,
                    piece.src.height() as f32,
                )),
                flip_x,
                flip_y,
                ..Default::default()
            },
        );
    }

    fn size(&self) -> Point {
        self.size
    }
}
