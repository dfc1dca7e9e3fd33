//! Scene configuration
//!
//! Canvas size, clock rates and gesture thresholds, read from a RON file.
//! Every field is optional in the file; missing ones take the defaults.

use std::fs;
use std::path::Path;

use macroquad::color::Color;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geom::Point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
    /// Frames per second the clock aims for
    pub framerate: f64,
    /// Lowest rate simulated; longer gaps are clamped to `1000 / minrate` ms
    pub minrate: f64,
    /// Longest touch in ms still counted as a tap
    pub tap_limit_ms: f64,
    /// Pixels a touch must travel on one axis before it becomes a drag
    pub drag_threshold: f64,
    /// Clear color, RGBA in 0..=1
    pub background: [f32; 4],
    pub title: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 320.0,
            framerate: 120.0,
            minrate: 10.0,
            tap_limit_ms: 750.0,
            drag_threshold: 10.0,
            background: [0.08, 0.09, 0.13, 1.0],
            title: "zep".to_string(),
        }
    }
}

impl SceneConfig {
    /// Reads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    pub fn background_color(&self) -> Color {
        let [r, g, b, a] = self.background;
        Color::new(r, g, b, a)
    }

    /// Shortest gap between frames in ms.
    pub fn frame_interval(&self) -> f64 {
        (1000.0 / self.framerate).floor()
    }

    /// Longest delta a single frame simulates, in ms.
    pub fn max_delta(&self) -> f64 {
        (1000.0 / self.minrate).floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.frame_interval(), 8.0);
        assert_eq!(config.max_delta(), 100.0);
        assert_eq!(config.tap_limit_ms, 750.0);
        assert_eq!(config.drag_threshold, 10.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = SceneConfig::from_ron("(width: 800.0, height: 600.0, framerate: 60.0)").unwrap();
        assert_eq!(config.size(), Point::new(800.0, 600.0));
        assert_eq!(config.frame_interval(), 16.0);
        assert_eq!(config.minrate, 10.0);
        assert_eq!(config.title, "zep");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "(title: \"balloons\", background: (1.0, 0.0, 0.0, 1.0))").unwrap();
        drop(file);

        let config = SceneConfig::load(&path).unwrap();
        assert_eq!(config.title, "balloons");
        assert_eq!(config.background_color(), Color::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SceneConfig::load(dir.path().join("none.ron")).unwrap_err();
        assert!(matches!(missing, Error::ConfigRead { .. }));

        let bad = SceneConfig::from_ron("(width: \"wide\")").unwrap_err();
        assert!(matches!(bad, Error::ConfigParse(_)));
    }
}
