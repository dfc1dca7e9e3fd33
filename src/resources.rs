//! Resources - named image pieces
//!
//! Keeps the textures a game draws from (by key, with their pixel size) and
//! the named pieces cut out of them. Loading the texture pixels is the
//! embedding application's job; the canvas only ever sees texture keys and
//! source rects.
//!
//! A sheet can also be described in RON:
//!
//! ```text
//! (
//!     textures: { "sprites": (x: 64.0, y: 32.0) },
//!     pieces: {
//!         "balloon": (key: "sprites", src: (lt: (x: 0.0, y: 0.0), size: (x: 16.0, y: 24.0))),
//!     },
//! )
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geom::{Point, Rect};
use crate::render::Piece;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Texture pixel sizes keyed by texture key
    #[serde(default)]
    textures: HashMap<String, Point>,
    /// Pieces keyed by name
    #[serde(default)]
    pieces: HashMap<String, Piece>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a sheet from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Registers a texture of `size` pixels, plus a piece of the same name
    /// covering all of it.
    pub fn add_texture(&mut self, key: impl Into<String>, size: Point) {
        let key = key.into();
        let whole = Piece::new(key.clone(), Rect::from_parts(Point::ZERO, size));
        self.pieces.insert(key.clone(), whole);
        self.textures.insert(key, size);
    }

    /// Cuts `src` out of a registered texture and names it.
    ///
    /// Replaces any piece already under `name`.
    pub fn slice(&mut self, name: impl Into<String>, texture: &str, src: Rect) -> Result<()> {
        if !self.textures.contains_key(texture) {
            return Err(Error::ResourceNotFound { key: texture.to_string() });
        }
        self.pieces.insert(name.into(), Piece::new(texture, src));
        Ok(())
    }

    pub fn piece(&self, name: &str) -> Result<&Piece> {
        self.pieces
            .get(name)
            .ok_or_else(|| Error::ResourceNotFound { key: name.to_string() })
    }

    pub fn texture_size(&self, key: &str) -> Result<Point> {
        self.textures
            .get(key)
            .copied()
            .ok_or_else(|| Error::ResourceNotFound { key: key.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pieces.contains_key(name)
    }

    /// Number of pieces, whole-texture pieces included
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
