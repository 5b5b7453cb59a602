//! Differential box-counting kernel.
//!
//! Every sample is quantized along the value axis into bins of width `box_size`. The number of
//! distinct bins is the box count; the squared coefficient of variation of the per-bin sample
//! counts (padded with empty bins up to `floor(max_value / box_size)`) is the lacunarity.
use crate::error::{Error, Result};
use crate::grid::Tile;
use crate::scale::max_num_boxes;

/// How to report lacunarity when its mean is zero (a tile without samples).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DegeneratePolicy {
    /// Report this value instead.
    Sentinel(f64),
    /// Fail with [`Error::DegenerateStatistic`].
    Error,
}

impl Default for DegeneratePolicy {
    fn default() -> Self {
        Self::Sentinel(0.0)
    }
}

/// Options for the box-count kernel.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxCountConfig {
    /// Handling of zero-mean statistics.
    pub degenerate: DegeneratePolicy,
    /// Seed the per-bin counts with one extra empty entry before the occupied bins.
    ///
    /// Off by default; enable to reproduce lacunarity values of older tooling that always
    /// carried this entry.
    pub leading_zero: bool,
}

impl BoxCountConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the degenerate-statistic policy.
    pub fn with_degenerate_policy(mut self, degenerate: DegeneratePolicy) -> Self {
        self.degenerate = degenerate;
        self
    }

    /// Enables or disables the leading empty entry.
    pub fn with_leading_zero(mut self, leading_zero: bool) -> Self {
        self.leading_zero = leading_zero;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if let DegeneratePolicy::Sentinel(v) = self.degenerate {
            if v.is_infinite() {
                return Err(Error::InvalidConfig(
                    "degenerate sentinel must not be infinite".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Box count and lacunarity of one tile at one box size.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxCount {
    /// Number of distinct value bins present.
    pub occupied_bins: usize,
    /// `(stddev / mean)^2` of the per-bin counts.
    pub lacunarity: f64,
}

/// Counts occupied value bins and computes lacunarity for `values`.
pub fn count(
    values: impl IntoIterator<Item = u32>,
    box_size: u32,
    max_value: u32,
    config: &BoxCountConfig,
) -> Result<BoxCount> {
    if box_size == 0 {
        return Err(Error::InvalidScale("box size must be > 0".into()));
    }
    count_with_capacity(
        values,
        box_size,
        max_value,
        max_num_boxes(max_value, box_size),
        config,
    )
}

/// [`count`] over the samples of a tile.
pub fn count_tile(
    tile: &Tile<'_>,
    box_size: u32,
    max_value: u32,
    config: &BoxCountConfig,
) -> Result<BoxCount> {
    count(tile.values(), box_size, max_value, config)
}

/// Kernel with an explicit number of available bins, used for clipped edge tiles.
pub(crate) fn count_with_capacity(
    values: impl IntoIterator<Item = u32>,
    box_size: u32,
    max_value: u32,
    capacity: u32,
    config: &BoxCountConfig,
) -> Result<BoxCount> {
    if box_size == 0 {
        return Err(Error::InvalidScale("box size must be > 0".into()));
    }

    let mut bins = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        if value >= max_value {
            return Err(Error::ValueOutOfRange {
                value,
                index,
                max_value,
            });
        }
        bins.push(value / box_size);
    }
    bins.sort_unstable();

    let per_bin = run_lengths(&bins);
    let occupied_bins = per_bin.len();
    let empty = (capacity as usize).saturating_sub(occupied_bins) + usize::from(config.leading_zero);

    let lacunarity = match lacunarity(&per_bin, empty, bins.len()) {
        Some(l) => l,
        None => match config.degenerate {
            DegeneratePolicy::Sentinel(v) => v,
            DegeneratePolicy::Error => {
                return Err(Error::DegenerateStatistic(format!(
                    "no samples at box size {box_size}; lacunarity undefined"
                )))
            }
        },
    };

    Ok(BoxCount {
        occupied_bins,
        lacunarity,
    })
}

/// Lengths of runs of equal values in a sorted slice.
fn run_lengths(sorted: &[u32]) -> Vec<usize> {
    sorted
        .chunk_by(|a, b| a == b)
        .map(<[u32]>::len)
        .collect()
}

/// Squared coefficient of variation of `counts` plus `empty` zero entries.
///
/// Returns `None` when the mean is zero.
fn lacunarity(counts: &[usize], empty: usize, total: usize) -> Option<f64> {
    let n = counts.len() + empty;
    if n == 0 || total == 0 {
        return None;
    }
    let n = n as f64;
    let mean = total as f64 / n;
    let sq_dev: f64 = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        + empty as f64 * mean * mean;
    let variance = sq_dev / n;
    Some(variance / (mean * mean))
}

#[cfg(test)]
mod tests {
    use glam::UVec2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::grid::Grid;

    const EPS: f64 = 1e-9;

    #[test]
    fn constant_tile_occupies_one_bin() {
        let cfg = BoxCountConfig::default();
        for box_size in [2, 4, 8, 16, 32] {
            let r = count([77; 16], box_size, 256, &cfg).expect("count");
            assert_eq!(r.occupied_bins, 1);
            let expected = f64::from(256 / box_size) - 1.0;
            assert!((r.lacunarity - expected).abs() < EPS, "{box_size}: {r:?}");
        }
    }

    #[test]
    fn constant_tile_without_empty_bins_has_zero_lacunarity() {
        let r = count([200; 4], 256, 256, &BoxCountConfig::default()).expect("count");
        assert_eq!(r.occupied_bins, 1);
        assert_eq!(r.lacunarity, 0.0);
    }

    #[test]
    fn two_bins_match_hand_computed_lacunarity() {
        // bins {0, 0, 4, 4}: counts [2, 2] plus 126 empty bins.
        let r = count([0, 1, 8, 9], 2, 256, &BoxCountConfig::default()).expect("count");
        assert_eq!(r.occupied_bins, 2);
        assert!((r.lacunarity - 63.0).abs() < EPS);
    }

    #[test]
    fn leading_zero_adds_one_empty_entry() {
        let cfg = BoxCountConfig::default().with_leading_zero(true);
        let r = count([5; 4], 2, 256, &cfg).expect("count");
        assert_eq!(r.occupied_bins, 1);
        assert!((r.lacunarity - 128.0).abs() < EPS);
    }

    #[test]
    fn no_padding_when_bins_exceed_capacity() {
        // 255 / 2 = 127 bins available, but values 0..=254 land in 128 distinct bins.
        let values: Vec<u32> = (0..255).collect();
        let r = count(values, 2, 255, &BoxCountConfig::default()).expect("count");
        assert_eq!(r.occupied_bins, 128);
        assert!(r.lacunarity.is_finite());
    }

    #[test]
    fn empty_input_uses_sentinel() {
        let r = count(
            std::iter::empty(),
            2,
            256,
            &BoxCountConfig::default().with_degenerate_policy(DegeneratePolicy::Sentinel(-1.0)),
        )
        .expect("count");
        assert_eq!(r.occupied_bins, 0);
        assert_eq!(r.lacunarity, -1.0);
    }

    #[test]
    fn empty_input_errors_when_requested() {
        let cfg = BoxCountConfig::default().with_degenerate_policy(DegeneratePolicy::Error);
        let err = count(std::iter::empty(), 2, 256, &cfg).unwrap_err();
        assert!(matches!(err, Error::DegenerateStatistic(_)));
    }

    #[test]
    fn rejects_zero_box_size_and_out_of_range_values() {
        let cfg = BoxCountConfig::default();
        assert!(matches!(
            count([1], 0, 256, &cfg),
            Err(Error::InvalidScale(_))
        ));
        assert!(matches!(
            count([1, 300], 2, 256, &cfg),
            Err(Error::ValueOutOfRange { value: 300, .. })
        ));
    }

    #[test]
    fn random_tiles_respect_count_bounds_and_are_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<u32> = (0..64 * 64).map(|_| rng.next_u32() % 256).collect();
        let grid = Grid::from_vec(64, 64, 256, data).expect("grid");
        let cfg = BoxCountConfig::default();
        for box_size in [2u32, 4, 8, 16, 32] {
            let tile = grid.tile(UVec2::ZERO, UVec2::splat(box_size));
            let a = count_tile(&tile, box_size, 256, &cfg).expect("count");
            let b = count_tile(&tile, box_size, 256, &cfg).expect("count");
            assert_eq!(a, b);
            assert!(a.occupied_bins >= 1);
            assert!(a.occupied_bins <= 256usize.div_ceil(box_size as usize));
            assert!(a.lacunarity >= 0.0);
        }
    }

    #[test]
    fn validate_rejects_infinite_sentinel() {
        let cfg = BoxCountConfig::default()
            .with_degenerate_policy(DegeneratePolicy::Sentinel(f64::INFINITY));
        assert!(cfg.validate().is_err());
        assert!(BoxCountConfig::default().validate().is_ok());
    }
}
