//! Multi-scale scan orchestration.
//!
//! [`scheduled_scales`] picks the scales worth scanning for a grid: every scale up to the
//! largest box that fits `min(16, height, width)`, plus one coarser scale so that at least one
//! scale aggregates several value bins into a single tile. [`scan_all_scales`] runs one worker
//! per scale and joins all of them before building the result.
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, warn};

use super::scanner::{scan_scale, ScanConfig, SpatialMaps};
use crate::error::{Error, Result};
use crate::events::{BoxcountEvent, BoxcountEventKind, EventSink};
use crate::grid::Grid;
use crate::scale::{Scale, ScaleSet};

/// Upper bound on the base box size considered by [`scheduled_scales`].
pub const BASE_BOX_SIZE_LIMIT: u32 = 16;

/// How scheduled scales are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parallelism {
    /// One worker thread per scale on a dedicated pool.
    #[default]
    PerScale,
    /// All scales on the calling thread, in index order.
    Sequential,
}

/// Configuration for [`scan_all_scales`].
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleConfig {
    /// Per-scale scan options.
    pub scan: ScanConfig,
    /// Execution strategy.
    pub parallelism: Parallelism,
}

impl ScheduleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-scale scan options.
    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    /// Sets the execution strategy.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()
    }
}

/// Spatial maps of every scheduled scale, keyed by scale index.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiScaleMaps {
    maps: BTreeMap<usize, SpatialMaps>,
}

impl MultiScaleMaps {
    /// Maps for `scale_index`, if it was scanned.
    pub fn get(&self, scale_index: usize) -> Option<&SpatialMaps> {
        self.maps.get(&scale_index)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Scanned scale indices in increasing order.
    pub fn scale_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.maps.keys().copied()
    }

    /// Scanned scales in increasing order.
    pub fn scales(&self) -> impl Iterator<Item = Scale> + '_ {
        self.maps.values().map(|m| m.scale)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SpatialMaps)> {
        self.maps.iter().map(|(k, v)| (*k, v))
    }

    pub fn into_inner(self) -> BTreeMap<usize, SpatialMaps> {
        self.maps
    }
}

/// Scales scanned for a `height x width` grid.
///
/// Returns every scale from index 0 through one past the largest scale whose box size is at
/// most `min(16, height, width)`, clamped to the end of `scales`.
pub fn scheduled_scales(height: usize, width: usize, scales: &ScaleSet) -> Result<Vec<Scale>> {
    let limit = [BASE_BOX_SIZE_LIMIT as usize, height, width]
        .into_iter()
        .min()
        .unwrap_or(0) as u32;
    let base = scales.largest_within(limit).ok_or_else(|| {
        Error::InvalidScale(format!(
            "no box size fits a {height}x{width} grid (smallest is {:?})",
            scales.box_sizes().first()
        ))
    })?;
    let top = (base.index + 1).min(scales.len().saturating_sub(1));
    (0..=top).map(|index| scales.get(index)).collect()
}

/// Scans `grid` at every scheduled scale.
///
/// All workers are joined before the result is assembled. If any scale fails or panics the
/// whole call fails with [`Error::WorkerFailure`] for the lowest failing scale index.
pub fn scan_all_scales(
    grid: &Grid,
    config: &ScheduleConfig,
    sink: &mut dyn EventSink,
) -> Result<MultiScaleMaps> {
    config.validate()?;
    let scales = scheduled_scales(grid.height(), grid.width(), &config.scan.scales)?;

    if sink.wants(BoxcountEventKind::RunStarted) {
        sink.send(BoxcountEvent::RunStarted {
            width: grid.width(),
            height: grid.height(),
            max_value: grid.max_value(),
            scales: scales.clone(),
        });
    }

    let start = Instant::now();
    let outcomes = run_scales(&scales, config.parallelism, |scale| {
        scan_scale(grid, scale, &config.scan)
    })?;

    let mut maps = BTreeMap::new();
    let mut timings = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok((m, elapsed)) => {
                timings.push((m.scale, m.tiles_evaluated, m.tiles_skipped, elapsed));
                maps.insert(m.scale.index, m);
            }
            Err(e) => {
                warn!("Multi-scale scan aborted: {e}.");
                if sink.wants(BoxcountEventKind::Warning) {
                    sink.send(BoxcountEvent::Warning {
                        context: "scan_all_scales".into(),
                        message: e.to_string(),
                    });
                }
                return Err(e);
            }
        }
    }

    if sink.wants(BoxcountEventKind::ScaleFinished) {
        for (scale, tiles_evaluated, tiles_skipped, elapsed) in timings {
            sink.send(BoxcountEvent::ScaleFinished {
                scale,
                tiles_evaluated,
                tiles_skipped,
                elapsed,
            });
        }
    }

    let elapsed = start.elapsed();
    info!(
        "Spatial box counting over {} scales took {:.3}s.",
        maps.len(),
        elapsed.as_secs_f64()
    );
    if sink.wants(BoxcountEventKind::RunFinished) {
        sink.send(BoxcountEvent::RunFinished {
            scale_count: maps.len(),
            elapsed,
        });
    }

    Ok(MultiScaleMaps { maps })
}

/// Runs `job` once per scale and returns the outcomes in scale order.
fn run_scales<F>(
    scales: &[Scale],
    parallelism: Parallelism,
    job: F,
) -> Result<Vec<Result<(SpatialMaps, Duration)>>>
where
    F: Fn(Scale) -> Result<SpatialMaps> + Sync,
{
    match parallelism {
        Parallelism::Sequential => Ok(scales
            .iter()
            .map(|&scale| run_worker(scale, &job))
            .collect()),
        Parallelism::PerScale => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(scales.len())
                .thread_name(|i| format!("boxcount-scale-{i}"))
                .build()
                .map_err(|e| Error::Other(format!("failed to build worker pool: {e}")))?;
            Ok(pool.install(|| {
                scales
                    .par_iter()
                    .map(|&scale| run_worker(scale, &job))
                    .collect()
            }))
        }
    }
}

fn run_worker<F>(scale: Scale, job: &F) -> Result<(SpatialMaps, Duration)>
where
    F: Fn(Scale) -> Result<SpatialMaps>,
{
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(scale)));
    match outcome {
        Ok(Ok(maps)) => Ok((maps, start.elapsed())),
        Ok(Err(e)) => Err(Error::WorkerFailure {
            scale_index: scale.index,
            reason: e.to_string(),
        }),
        Err(payload) => Err(Error::WorkerFailure {
            scale_index: scale.index,
            reason: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
