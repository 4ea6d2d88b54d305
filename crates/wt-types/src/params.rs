//! Simulation parameters, their bounds, and the feature vectors built from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ConfigError;

/// Inclusive integer range for one parameter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Check the range is usable: `min >= 1` and `min < max`.
    pub fn validate(&self, dimension: &str) -> Result<(), ConfigError> {
        if self.min < 1 {
            return Err(ConfigError::MinBelowOne {
                dimension: dimension.to_string(),
                min: self.min,
            });
        }
        if self.min >= self.max {
            return Err(ConfigError::EmptyRange {
                dimension: dimension.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Bounds for all three simulation dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub x: Bounds,
    pub y: Bounds,
    pub z: Bounds,
}

impl ParameterBounds {
    pub fn new(x: Bounds, y: Bounds, z: Bounds) -> Self {
        Self { x, y, z }
    }

    /// Use the same range for every dimension.
    pub fn uniform(bounds: Bounds) -> Self {
        Self {
            x: bounds,
            y: bounds,
            z: bounds,
        }
    }

    /// Validate each dimension in x, y, z order, returning the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        self.z.validate("z")
    }

    pub fn contains(&self, params: &TrialParameters) -> bool {
        self.x.contains(params.x) && self.y.contains(params.y) && self.z.contains(params.z)
    }
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            x: Bounds::new(1, 32),
            y: Bounds::new(1, 16),
            z: Bounds::new(1, 16),
        }
    }
}

/// One sampled point in the simulation's parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialParameters {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl TrialParameters {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for TrialParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {} y: {} z: {}", self.x, self.y, self.z)
    }
}

/// Feature vector sent to the model service, serialized as `{"x":..,"y":..,"z":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{x: {}, y: {}, z: {}}}", self.x, self.y, self.z)
    }
}

/// How trial parameters become model features.
///
/// `LegacyYAsX` reproduces an older training script that put `y` into both the
/// `x` and `y` slots. It is kept only so existing models trained that way can
/// be fed consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMapping {
    #[default]
    Faithful,
    LegacyYAsX,
}

impl FeatureMapping {
    pub fn features(&self, params: &TrialParameters) -> Features {
        match self {
            Self::Faithful => Features {
                x: params.x,
                y: params.y,
                z: params.z,
            },
            Self::LegacyYAsX => Features {
                x: params.y,
                y: params.y,
                z: params.z,
            },
        }
    }
}
