use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const MIN_SLIDES: usize = 3;
pub const MAX_SLIDES: usize = 15;

/// Inclusive slide-count range requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideBounds {
    min: usize,
    max: usize,
}

impl SlideBounds {
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        let allowed = MIN_SLIDES..=MAX_SLIDES;
        if !allowed.contains(&min) || !allowed.contains(&max) || min > max {
            return Err(ConfigError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, count: usize) -> bool {
        self.range().contains(&count)
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl Default for SlideBounds {
    fn default() -> Self {
        Self { min: 5, max: 10 }
    }
}
