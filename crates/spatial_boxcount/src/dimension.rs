//! Fractal dimension estimation.
//!
//! The whole grid is treated as a single tile and box-counted at several box sizes. A
//! least-squares line through `(ln box_size, ln occupied_bins)` gives the slope; its negation
//! is the dimension estimate.
use tracing::debug;

use crate::boxcount::{count_tile, BoxCountConfig};
use crate::error::{Error, Result};
use crate::events::{BoxcountEvent, BoxcountEventKind, EventSink};
use crate::grid::Grid;

/// Configuration for [`estimate`].
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionConfig {
    /// Explicit box sizes; `None` uses [`default_box_sizes`] for the grid.
    pub box_sizes: Option<Vec<u32>>,
    /// Kernel options.
    pub boxcount: BoxCountConfig,
}

impl DimensionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets explicit box sizes.
    pub fn with_box_sizes(mut self, box_sizes: impl Into<Vec<u32>>) -> Self {
        self.box_sizes = Some(box_sizes.into());
        self
    }

    /// Sets the kernel options.
    pub fn with_boxcount(mut self, boxcount: BoxCountConfig) -> Self {
        self.boxcount = boxcount;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(sizes) = &self.box_sizes {
            if sizes.contains(&0) {
                return Err(Error::InvalidConfig("box sizes must be > 0".into()));
            }
        }
        self.boxcount.validate()
    }

    /// Box sizes used for `grid`, validated against its smaller side.
    pub fn resolve_box_sizes(&self, grid: &Grid) -> Result<Vec<u32>> {
        let min_side = grid.min_side();
        match &self.box_sizes {
            None => Ok(default_box_sizes(min_side)),
            Some(sizes) => {
                if let Some(&bad) = sizes
                    .iter()
                    .find(|&&s| s == 0 || s as usize > min_side)
                {
                    return Err(Error::InvalidScale(format!(
                        "box size {bad} outside 1..={min_side} for a {}x{} grid",
                        grid.width(),
                        grid.height()
                    )));
                }
                Ok(sizes.clone())
            }
        }
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; `1.0` when all `y` are equal.
    pub r_squared: f64,
}

impl LineFit {
    /// Evaluates the line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Dimension together with the regression it came from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionEstimate {
    /// Negated slope of the fit.
    pub dimension: f64,
    /// Fit in `(ln box_size, ln count)` space.
    pub fit: LineFit,
    /// `(box_size, occupied_bins)` pairs with a non-zero count.
    pub points: Vec<(u32, usize)>,
    /// Box sizes discarded because their count was zero.
    pub discarded: Vec<u32>,
}

/// Powers of two from 2 up to the largest one not exceeding `min_side`.
pub fn default_box_sizes(min_side: usize) -> Vec<u32> {
    std::iter::successors(Some(2u64), |s| s.checked_mul(2))
        .take_while(|&s| s <= min_side as u64 && s <= u64::from(u32::MAX))
        .map(|s| s as u32)
        .collect()
}

/// Global occupied-bin count of `grid` for each box size.
pub fn global_box_counts(
    grid: &Grid,
    box_sizes: &[u32],
    config: &BoxCountConfig,
) -> Result<Vec<(u32, usize)>> {
    let tile = grid.as_tile();
    box_sizes
        .iter()
        .map(|&box_size| {
            count_tile(&tile, box_size, grid.max_value(), config)
                .map(|r| (box_size, r.occupied_bins))
        })
        .collect()
}

/// Fits a line through `(ln size, ln count)`, skipping non-positive counts.
///
/// Fails with [`Error::InsufficientScales`] unless at least two points with distinct sizes
/// remain.
pub fn fit_log_log(points: &[(f64, f64)]) -> Result<LineFit> {
    let logs: Vec<(f64, f64)> = points
        .iter()
        .filter(|(size, count)| *size > 0.0 && *count > 0.0)
        .map(|(size, count)| (size.ln(), count.ln()))
        .collect();
    if logs.len() < 2 {
        return Err(Error::InsufficientScales { valid: logs.len() });
    }

    let n = logs.len() as f64;
    let mean_x = logs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = logs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &logs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx == 0.0 {
        return Err(Error::InsufficientScales { valid: 1 });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Ok(LineFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Estimates the fractal dimension of `grid`.
pub fn estimate(grid: &Grid, config: &DimensionConfig) -> Result<f64> {
    estimate_detailed(grid, config).map(|e| e.dimension)
}

/// [`estimate`], returning the fit and the points used.
pub fn estimate_detailed(grid: &Grid, config: &DimensionConfig) -> Result<DimensionEstimate> {
    estimate_with_events(grid, config, &mut ())
}

/// [`estimate_detailed`], reporting every evaluated box size to `sink`.
pub fn estimate_with_events(
    grid: &Grid,
    config: &DimensionConfig,
    sink: &mut dyn EventSink,
) -> Result<DimensionEstimate> {
    config.validate()?;
    let box_sizes = config.resolve_box_sizes(grid)?;
    let counts = global_box_counts(grid, &box_sizes, &config.boxcount)?;

    if sink.wants(BoxcountEventKind::DimensionPoint) {
        for &(box_size, occupied_bins) in &counts {
            sink.send(BoxcountEvent::DimensionPoint {
                box_size,
                occupied_bins,
            });
        }
    }

    let (points, discarded): (Vec<_>, Vec<_>) = counts.into_iter().partition(|(_, c)| *c > 0);
    let discarded: Vec<u32> = discarded.into_iter().map(|(s, _)| s).collect();
    if !discarded.is_empty() && sink.wants(BoxcountEventKind::Warning) {
        sink.send(BoxcountEvent::Warning {
            context: "estimate".into(),
            message: format!("discarded zero counts at box sizes {discarded:?}"),
        });
    }

    let samples: Vec<(f64, f64)> = points
        .iter()
        .map(|&(s, c)| (f64::from(s), c as f64))
        .collect();
    let fit = fit_log_log(&samples)?;
    let dimension = -fit.slope;
    debug!(
        dimension,
        r_squared = fit.r_squared,
        points = points.len(),
        "estimated fractal dimension"
    );

    Ok(DimensionEstimate {
        dimension,
        fit,
        points,
        discarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VecSink;

    const EPS: f64 = 1e-9;

    #[test]
    fn default_sizes_stop_at_smaller_side() {
        assert_eq!(default_box_sizes(1), Vec::<u32>::new());
        assert_eq!(default_box_sizes(2), vec![2]);
        assert_eq!(default_box_sizes(100), vec![2, 4, 8, 16, 32, 64]);
        assert_eq!(default_box_sizes(256), vec![2, 4, 8, 16, 32, 64, 128, 256]);
    }

    #[test]
    fn recovers_synthetic_power_law() {
        for target in [0.5, 1.0, 1.7, 2.3] {
            let points: Vec<(f64, f64)> = (1..=9)
                .map(|k| {
                    let s = f64::from(1u32 << k);
                    (s, 1.0e6 * s.powf(-target))
                })
                .collect();
            let fit = fit_log_log(&points).expect("fit");
            assert!((-fit.slope - target).abs() < EPS, "{target}: {fit:?}");
            assert!((fit.intercept - 1.0e6f64.ln()).abs() < 1e-6);
            assert!((fit.r_squared - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn fit_skips_zero_counts() {
        let fit = fit_log_log(&[(2.0, 8.0), (4.0, 0.0), (8.0, 2.0)]).expect("fit");
        assert!((fit.slope + 1.0).abs() < EPS);
        assert!((fit.predict(2f64.ln()) - 8f64.ln()).abs() < EPS);
    }

    #[test]
    fn fit_needs_two_distinct_points() {
        assert!(matches!(
            fit_log_log(&[(2.0, 3.0), (4.0, 0.0)]),
            Err(Error::InsufficientScales { valid: 1 })
        ));
        assert!(matches!(
            fit_log_log(&[(4.0, 3.0), (4.0, 5.0)]),
            Err(Error::InsufficientScales { .. })
        ));
    }

    #[test]
    fn full_value_range_has_dimension_one() {
        // Every row holds every value 0..256, so all value bins are occupied at every size.
        let grid = Grid::from_fn(256, 256, 256, |x, _| x as u32).expect("grid");
        let est = estimate_detailed(&grid, &DimensionConfig::default()).expect("estimate");
        assert!((est.dimension - 1.0).abs() < EPS);
        assert_eq!(est.points.len(), 8);
        assert_eq!(est.points[0], (2, 128));
        assert_eq!(est.points[7], (256, 1));
        assert!(est.discarded.is_empty());
    }

    #[test]
    fn constant_grid_has_dimension_zero() {
        let grid = Grid::from_fn(32, 32, 256, |_, _| 9).expect("grid");
        let d = estimate(&grid, &DimensionConfig::default()).expect("estimate");
        assert!(d.abs() < EPS);
    }

    #[test]
    fn explicit_sizes_are_validated() {
        let grid = Grid::zeros(16, 8, 256).expect("grid");
        let too_big = DimensionConfig::default().with_box_sizes(vec![2, 16]);
        assert!(matches!(
            estimate(&grid, &too_big),
            Err(Error::InvalidScale(_))
        ));
        let zero = DimensionConfig::default().with_box_sizes(vec![0, 2]);
        assert!(matches!(
            estimate(&grid, &zero),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn tiny_grids_cannot_be_regressed() {
        let grid = Grid::zeros(2, 2, 256).expect("grid");
        assert!(matches!(
            estimate(&grid, &DimensionConfig::default()),
            Err(Error::InsufficientScales { valid: 1 })
        ));
        let grid = Grid::zeros(1, 5, 256).expect("grid");
        assert!(matches!(
            estimate(&grid, &DimensionConfig::default()),
            Err(Error::InsufficientScales { valid: 0 })
        ));
    }

    #[test]
    fn global_counts_follow_requested_sizes() {
        let grid = Grid::from_fn(16, 16, 256, |x, y| ((x * 16 + y) % 256) as u32).expect("grid");
        let counts =
            global_box_counts(&grid, &[2, 8, 64], &BoxCountConfig::default()).expect("counts");
        assert_eq!(counts, vec![(2, 128), (8, 32), (64, 4)]);
    }

    #[test]
    fn events_list_every_box_size() {
        let grid = Grid::from_fn(16, 16, 256, |x, y| (x * y) as u32 % 256).expect("grid");
        let mut sink = VecSink::new();
        let est = estimate_with_events(&grid, &DimensionConfig::default(), &mut sink)
            .expect("estimate");
        let sizes: Vec<u32> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                BoxcountEvent::DimensionPoint { box_size, .. } => Some(*box_size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![2, 4, 8, 16]);
        assert_eq!(est.points.len(), 4);
    }
}
