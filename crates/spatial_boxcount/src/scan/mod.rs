//! Spatial scanning: one scale at a time, or every relevant scale in parallel.
pub mod scanner;
pub mod scheduler;

pub use scanner::{scan, scan_scale, BoundaryPolicy, ScanConfig, SpatialMaps};
pub use scheduler::{
    scan_all_scales, scheduled_scales, MultiScaleMaps, Parallelism, ScheduleConfig,
    BASE_BOX_SIZE_LIMIT,
};
