//! Sample grids, tile views, and per-tile output maps.
//!
//! A [`Grid`] is the read-only input of every analysis: a row-major 2D array of samples with an
//! exclusive upper bound on its values. [`Tile`] borrows a rectangular window of it and
//! [`ScalarMap`] stores one value per tile position.
use glam::UVec2;

use crate::error::{Error, Result};

pub mod map;
pub mod tile;

pub use map::ScalarMap;
pub use tile::{Tile, TileId};

/// Row-major 2D array of non-negative samples bounded by `max_value` (exclusive).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    width: usize,
    height: usize,
    max_value: u32,
    data: Vec<u32>,
}

impl Grid {
    /// Value bound of 8-bit samples.
    pub const DEFAULT_MAX_VALUE: u32 = 256;

    /// Create a grid filled with zeros.
    pub fn zeros(width: usize, height: usize, max_value: u32) -> Result<Self> {
        check_shape(width, height, max_value)?;
        Ok(Self {
            width,
            height,
            max_value,
            data: vec![0; width * height],
        })
    }

    /// Create a grid from row-major samples, validating shape and value range.
    pub fn from_vec(width: usize, height: usize, max_value: u32, data: Vec<u32>) -> Result<Self> {
        check_shape(width, height, max_value)?;
        if data.len() != width * height {
            return Err(Error::InvalidGrid(format!(
                "expected {} samples for {width}x{height}, got {}",
                width * height,
                data.len()
            )));
        }
        if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| **v >= max_value) {
            return Err(Error::ValueOutOfRange {
                value,
                index,
                max_value,
            });
        }
        Ok(Self {
            width,
            height,
            max_value,
            data,
        })
    }

    /// Create an 8-bit grid (`max_value = 256`) from row-major bytes.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let data = bytes.iter().map(|&b| u32::from(b)).collect();
        Self::from_vec(width, height, Self::DEFAULT_MAX_VALUE, data)
    }

    /// Create a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        max_value: u32,
        mut f: impl FnMut(usize, usize) -> u32,
    ) -> Result<Self> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::from_vec(width, height, max_value, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Exclusive upper bound on stored values.
    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    /// Size as `(width, height)`.
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width as u32, self.height as u32)
    }

    /// Smaller of the two dimensions.
    pub fn min_side(&self) -> usize {
        self.width.min(self.height)
    }

    /// Row-major samples.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Sample at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Samples of row `y`.
    pub fn row(&self, y: usize) -> &[u32] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, value: u32) {
        debug_assert!(value < self.max_value);
        self.data[y * self.width + x] = value;
    }

    /// Window starting at `origin` spanning `extent`, clipped to the grid.
    pub fn tile(&self, origin: UVec2, extent: UVec2) -> Tile<'_> {
        let size = self.size();
        let origin = origin.min(size);
        let extent = extent.min(size - origin);
        Tile::new(self, origin, extent)
    }

    /// The whole grid as a single tile.
    pub fn as_tile(&self) -> Tile<'_> {
        Tile::new(self, UVec2::ZERO, self.size())
    }

    /// Row-major non-overlapping tiles of `box_size`.
    ///
    /// With `include_partial == false` only tiles whose full extent fits are yielded.
    pub fn tiles(&self, box_size: u32, include_partial: bool) -> impl Iterator<Item = Tile<'_>> {
        debug_assert!(box_size > 0, "box_size must be > 0");
        let step = box_size.max(1) as usize;
        let size = self.size();
        (0..self.height).step_by(step).flat_map(move |y| {
            (0..self.width).step_by(step).filter_map(move |x| {
                let origin = UVec2::new(x as u32, y as u32);
                let extent = UVec2::splat(box_size).min(size - origin);
                if !include_partial && extent != UVec2::splat(box_size) {
                    return None;
                }
                Some(Tile::new(self, origin, extent))
            })
        })
    }
}

fn check_shape(width: usize, height: usize, max_value: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidGrid(format!(
            "dimensions must be > 0, got {width}x{height}"
        )));
    }
    if width > u32::MAX as usize || height > u32::MAX as usize {
        return Err(Error::InvalidGrid(format!(
            "dimensions {width}x{height} exceed u32 range"
        )));
    }
    if max_value == 0 {
        return Err(Error::InvalidGrid("max_value must be > 0".into()));
    }
    Ok(())
}
