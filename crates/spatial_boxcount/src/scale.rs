//! Box-size sequences and scale lookup.
//!
//! A scale is an index into a [`ScaleSet`], an increasing sequence of box sizes. The default
//! set is the geometric sequence [`DEFAULT_BOX_SIZES`].
use crate::error::{Error, Result};

/// Box sizes used when no explicit set is configured.
pub const DEFAULT_BOX_SIZES: [u32; 10] = [2, 4, 8, 16, 32, 64, 128, 256, 512, 1024];

/// One entry of a [`ScaleSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scale {
    /// Position in the scale set.
    pub index: usize,
    /// Edge length of a box in grid cells and in value units.
    pub box_size: u32,
}

impl Scale {
    /// Number of value bins available at this scale.
    pub fn max_num_boxes(&self, max_value: u32) -> u32 {
        max_num_boxes(max_value, self.box_size)
    }
}

/// `floor(max_value / box_size)`.
#[inline]
pub fn max_num_boxes(max_value: u32, box_size: u32) -> u32 {
    debug_assert!(box_size > 0, "box_size must be > 0");
    max_value / box_size
}

/// Strictly increasing sequence of box sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleSet {
    box_sizes: Vec<u32>,
}

impl Default for ScaleSet {
    fn default() -> Self {
        Self {
            box_sizes: DEFAULT_BOX_SIZES.to_vec(),
        }
    }
}

impl ScaleSet {
    /// Creates a scale set, rejecting empty, zero, or non-increasing sizes.
    pub fn new(box_sizes: impl Into<Vec<u32>>) -> Result<Self> {
        let set = Self {
            box_sizes: box_sizes.into(),
        };
        set.validate()?;
        Ok(set)
    }

    /// Validates the set, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.box_sizes.is_empty() {
            return Err(Error::InvalidConfig("scale set must not be empty".into()));
        }
        if self.box_sizes[0] == 0 {
            return Err(Error::InvalidConfig("box sizes must be > 0".into()));
        }
        if self.box_sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidConfig(format!(
                "box sizes must be strictly increasing, got {:?}",
                self.box_sizes
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.box_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.box_sizes.is_empty()
    }

    pub fn box_sizes(&self) -> &[u32] {
        &self.box_sizes
    }

    /// Resolves a scale index.
    pub fn get(&self, index: usize) -> Result<Scale> {
        self.box_sizes
            .get(index)
            .map(|&box_size| Scale { index, box_size })
            .ok_or_else(|| {
                Error::InvalidScale(format!(
                    "scale index {index} outside 0..{}",
                    self.box_sizes.len()
                ))
            })
    }

    /// Largest scale whose box size does not exceed `limit`.
    pub fn largest_within(&self, limit: u32) -> Option<Scale> {
        self.iter().take_while(|s| s.box_size <= limit).last()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scale> + '_ {
        self.box_sizes
            .iter()
            .enumerate()
            .map(|(index, &box_size)| Scale { index, box_size })
    }
}
