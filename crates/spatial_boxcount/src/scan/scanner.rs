//! Single-scale spatial scan.
//!
//! Tiles a grid into non-overlapping `box_size x box_size` squares in row-major order and runs
//! the box-count kernel on each, producing an occupancy-ratio map and a lacunarity map.
use tracing::debug;

use crate::boxcount::{count_with_capacity, BoxCountConfig};
use crate::error::{Error, Result};
use crate::grid::{Grid, ScalarMap};
use crate::scale::{Scale, ScaleSet};

/// Treatment of tiles that do not fit completely at the right and bottom edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundaryPolicy {
    /// Leave the map cells of partial tiles at zero.
    #[default]
    Skip,
    /// Evaluate partial tiles with a bin capacity reduced by their covered area.
    Include,
}

/// Configuration of a single-scale scan.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanConfig {
    /// Box sizes addressed by scale index.
    pub scales: ScaleSet,
    /// Edge tile handling.
    pub boundary: BoundaryPolicy,
    /// Kernel options.
    pub boxcount: BoxCountConfig,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scale set.
    pub fn with_scales(mut self, scales: ScaleSet) -> Self {
        self.scales = scales;
        self
    }

    /// Sets the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the kernel options.
    pub fn with_boxcount(mut self, boxcount: BoxCountConfig) -> Self {
        self.boxcount = boxcount;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.scales.validate()?;
        self.boxcount.validate()
    }
}

/// Occupancy-ratio and lacunarity maps of one scale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialMaps {
    /// Scale these maps were computed at.
    pub scale: Scale,
    /// `occupied_bins / max_num_boxes` per tile.
    pub ratio: ScalarMap,
    /// Lacunarity per tile.
    pub lacunarity: ScalarMap,
    /// Tiles passed to the kernel.
    pub tiles_evaluated: usize,
    /// Map cells left at zero by [`BoundaryPolicy::Skip`].
    pub tiles_skipped: usize,
}

impl SpatialMaps {
    /// Shape of both maps as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.ratio.shape()
    }
}

/// Scans `grid` at the scale addressed by `scale_index`.
pub fn scan(grid: &Grid, scale_index: usize, config: &ScanConfig) -> Result<SpatialMaps> {
    let scale = config.scales.get(scale_index)?;
    scan_scale(grid, scale, config)
}

/// Scans `grid` at an already resolved scale.
pub fn scan_scale(grid: &Grid, scale: Scale, config: &ScanConfig) -> Result<SpatialMaps> {
    let box_size = scale.box_size;
    if box_size == 0 {
        return Err(Error::InvalidScale("box size must be > 0".into()));
    }
    let max_value = grid.max_value();
    let capacity = scale.max_num_boxes(max_value);
    if capacity == 0 {
        return Err(Error::InvalidScale(format!(
            "box size {box_size} exceeds value bound {max_value}"
        )));
    }

    let step = box_size as usize;
    let rows = grid.height().div_ceil(step);
    let cols = grid.width().div_ceil(step);
    let mut ratio = ScalarMap::new(rows, cols);
    let mut lacunarity = ScalarMap::new(rows, cols);

    let include_partial = config.boundary == BoundaryPolicy::Include;
    let mut tiles_evaluated = 0;
    for tile in grid.tiles(box_size, include_partial) {
        let bins = if tile.is_full(box_size) {
            capacity
        } else {
            reduced_capacity(capacity, tile.len(), box_size)
        };
        let result =
            count_with_capacity(tile.values(), box_size, max_value, bins, &config.boxcount)?;
        let id = tile.id(box_size);
        ratio.set(id, result.occupied_bins as f64 / f64::from(bins));
        lacunarity.set(id, result.lacunarity);
        tiles_evaluated += 1;
    }
    let tiles_skipped = rows * cols - tiles_evaluated;

    debug!(
        scale_index = scale.index,
        box_size, rows, cols, tiles_evaluated, tiles_skipped, "scanned scale"
    );

    Ok(SpatialMaps {
        scale,
        ratio,
        lacunarity,
        tiles_evaluated,
        tiles_skipped,
    })
}

/// Bin capacity of a clipped tile, proportional to the covered area and at least one.
fn reduced_capacity(capacity: u32, covered: usize, box_size: u32) -> u32 {
    let full = u64::from(box_size) * u64::from(box_size);
    let reduced = u64::from(capacity) * covered as u64 / full;
    reduced.clamp(1, u64::from(capacity)) as u32
}
