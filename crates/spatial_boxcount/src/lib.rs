#![forbid(unsafe_code)]
//! spatial_boxcount: Differential box-counting for 2D samples.
//!
//! Modules:
//! - grid: sample grids, tile views, and per-tile result maps
//! - scale: box-size sequences
//! - boxcount: the occupancy/lacunarity kernel
//! - scan: single-scale spatial scans and parallel multi-scale orchestration
//! - dimension: log-log regression of global box counts
//! - hilbert: Hilbert curve layout of byte sequences
//! - events: per-call diagnostics sinks
//!
//! Loading images or files, plotting, and command-line handling are left to the caller.
pub mod analyzer;
pub mod boxcount;
pub mod dimension;
pub mod error;
pub mod events;
pub mod grid;
pub mod hilbert;
pub mod scale;
pub mod scan;

/// Convenient re-exports for common types. Import with `use spatial_boxcount::prelude::*;`.
pub mod prelude {
    pub use crate::analyzer::{AnalysisConfig, Analyzer};
    pub use crate::boxcount::{count, count_tile, BoxCount, BoxCountConfig, DegeneratePolicy};
    pub use crate::dimension::{
        default_box_sizes, estimate, estimate_detailed, estimate_with_events, fit_log_log,
        global_box_counts, DimensionConfig, DimensionEstimate, LineFit,
    };
    pub use crate::error::{Error, Result};
    pub use crate::events::{
        BoxcountEvent, BoxcountEventKind, EventSink, FnSink, MultiSink, VecSink,
    };
    pub use crate::grid::{Grid, ScalarMap, Tile, TileId};
    pub use crate::hilbert::{bytes_to_grid, map_row_major, map_to_grid, ByteLayout};
    pub use crate::scale::{Scale, ScaleSet, DEFAULT_BOX_SIZES};
    pub use crate::scan::{
        scan, scan_all_scales, scheduled_scales, BoundaryPolicy, MultiScaleMaps, Parallelism,
        ScanConfig, ScheduleConfig, SpatialMaps,
    };
}
