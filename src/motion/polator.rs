//! Polators: scalar curves over a progress value.
//!
//! Most take a progress in 0.0..=1.0 and return something in -1.0..=1.0.
//! `Timing` holds the plain curves; `Polator` nests them with wrappers that
//! stretch, scale, mirror, invert or fade another polator.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geom::angle::mirror;

/// Plain curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    /// Identity, over any range
    #[default]
    Linear,
    /// Fast start, braking towards 1.0
    Easein,
    /// Slow start, accelerating towards 1.0
    Easeout,
    /// One full sine wave per 1.0
    Sin,
    /// One full cosine wave per 1.0
    Cos,
    /// Clamps into 0.0..=1.0
    Stop,
    /// Wraps into 0.0..=1.0
    Loop,
    /// Bounces between 0.0 and 1.0
    Pingpong,
}

impl Timing {
    pub fn get(self, x: f64) -> f64 {
        match self {
            Timing::Linear => x,
            Timing::Easein => (x - 1.0).powi(3) + 1.0,
            Timing::Easeout => x.powi(3),
            Timing::Sin => (PI * 2.0 * x).sin(),
            Timing::Cos => (PI * 2.0 * x).cos(),
            Timing::Stop => x.clamp(0.0, 1.0),
            Timing::Loop => {
                if x < 0.0 {
                    1.0 + x % 1.0
                } else if 1.0 < x {
                    x % 1.0
                } else {
                    x
                }
            }
            Timing::Pingpong => {
                let mut x = x.abs();
                if 2.0 < x {
                    x %= 2.0;
                }
                if 1.0 < x {
                    x = 2.0 - x;
                }
                x
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Timing::Linear => "linear",
            Timing::Easein => "easein",
            Timing::Easeout => "easeout",
            Timing::Sin => "sin",
            Timing::Cos => "cos",
            Timing::Stop => "stop",
            Timing::Loop => "loop",
            Timing::Pingpong => "pingpong",
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Timing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "linear" => Timing::Linear,
            "easein" => Timing::Easein,
            "easeout" => Timing::Easeout,
            "sin" => Timing::Sin,
            "cos" => Timing::Cos,
            "stop" => Timing::Stop,
            "loop" => Timing::Loop,
            "pingpong" => Timing::Pingpong,
            _ => return Err(Error::UnknownKeyword(s.to_string())),
        })
    }
}

/// A curve, possibly built out of other curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Polator {
    Plain(Timing),
    /// Inner curve with its input divided by `running`: 1.0 is reached at `running`
    Run { inner: Box<Polator>, running: f64 },
    /// Inner curve with its output multiplied by `rise`
    Rise { inner: Box<Polator>, rise: f64 },
    /// Inner curve played backwards, mirrored around 0.5
    Reversal(Box<Polator>),
    /// Inner curve rotated half a turn around (0.5, 0.5)
    Inverse(Box<Polator>),
    /// Inner curve faded out by `decayer`, which goes 0.0 to 1.0
    Decay { inner: Box<Polator>, decayer: Box<Polator> },
}

impl Default for Polator {
    fn default() -> Self {
        Polator::Plain(Timing::Linear)
    }
}

impl From<Timing> for Polator {
    fn from(timing: Timing) -> Self {
        Polator::Plain(timing)
    }
}

impl Polator {
    pub fn run(inner: impl Into<Polator>, running: f64) -> Self {
        Polator::Run { inner: Box::new(inner.into()), running }
    }

    pub fn rise(inner: impl Into<Polator>, rise: f64) -> Self {
        Polator::Rise { inner: Box::new(inner.into()), rise }
    }

    pub fn reversal(inner: impl Into<Polator>) -> Self {
        Polator::Reversal(Box::new(inner.into()))
    }

    pub fn inverse(inner: impl Into<Polator>) -> Self {
        Polator::Inverse(Box::new(inner.into()))
    }

    /// Fades `inner` out linearly.
    pub fn decay(inner: impl Into<Polator>) -> Self {
        Self::decay_by(inner, Timing::Linear)
    }

    pub fn decay_by(inner: impl Into<Polator>, decayer: impl Into<Polator>) -> Self {
        Polator::Decay {
            inner: Box::new(inner.into()),
            decayer: Box::new(decayer.into()),
        }
    }

    pub fn get(&self, x: f64) -> f64 {
        match self {
            Polator::Plain(timing) => timing.get(x),
            Polator::Run { inner, running } => inner.get(x / running),
            Polator::Rise { inner, rise } => inner.get(x) * rise,
            Polator::Reversal(inner) => inner.get(mirror(x, 0.5)),
            Polator::Inverse(inner) => 1.0 - inner.get(1.0 - x),
            Polator::Decay { inner, decayer } => inner.get(x) * (1.0 - decayer.get(x)),
        }
    }
}
