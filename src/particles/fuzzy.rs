//! Random values within a range.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A number drawn anew from `min..max` each time it is read. With
/// `min == max` it is not random at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuzzyValue {
    pub min: f64,
    pub max: f64,
}

impl FuzzyValue {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn exact(value: f64) -> Self {
        Self::new(value, value)
    }

    /// `value` plus or minus `fuzz`.
    pub fn fuzz(value: f64, fuzz: f64) -> Self {
        Self::new(value - fuzz, value + fuzz)
    }

    /// `value` plus or minus `rate` of itself.
    pub fn rate(value: f64, rate: f64) -> Self {
        Self::fuzz(value, value * rate)
    }

    pub fn get(&self, rng: &mut impl Rng) -> f64 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..self.max)
    }

    /// An integer in `min..=max`. Bounds are expected to be whole numbers.
    pub fn int(&self, rng: &mut impl Rng) -> i64 {
        if self.min >= self.max {
            return self.min as i64;
        }
        rng.gen_range(self.min..self.max + 1.0).floor() as i64
    }
}

impl From<f64> for FuzzyValue {
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}
