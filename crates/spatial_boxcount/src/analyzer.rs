//! High-level entry point bundling configuration for scans and dimension estimates.
use tracing::info;

use crate::boxcount::{BoxCountConfig, DegeneratePolicy};
use crate::dimension::{self, DimensionConfig, DimensionEstimate};
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::grid::Grid;
use crate::scale::ScaleSet;
use crate::scan::{
    self, BoundaryPolicy, MultiScaleMaps, Parallelism, ScanConfig, ScheduleConfig, SpatialMaps,
};

/// Configuration shared by all analyses of an [`Analyzer`].
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    /// Box sizes addressed by scale index in spatial scans.
    pub scales: ScaleSet,
    /// Edge tile handling in spatial scans.
    pub boundary: BoundaryPolicy,
    /// Kernel options.
    pub boxcount: BoxCountConfig,
    /// Execution strategy for multi-scale scans.
    pub parallelism: Parallelism,
    /// Explicit box sizes for dimension estimates.
    pub dimension_box_sizes: Option<Vec<u32>>,
}

impl AnalysisConfig {
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

    /// Sets the degenerate-statistic policy.
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.boxcount = self.boxcount.with_degenerate_policy(policy);
        self
    }

    /// Reproduces lacunarity values computed with a leading empty entry.
    pub fn with_leading_zero(mut self, leading_zero: bool) -> Self {
        self.boxcount = self.boxcount.with_leading_zero(leading_zero);
        self
    }

    /// Sets the execution strategy.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Sets explicit box sizes for dimension estimates.
    pub fn with_dimension_box_sizes(mut self, box_sizes: impl Into<Vec<u32>>) -> Self {
        self.dimension_box_sizes = Some(box_sizes.into());
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.schedule_config().validate()?;
        self.dimension_config().validate()?;
        if matches!(&self.dimension_box_sizes, Some(sizes) if sizes.is_empty()) {
            return Err(Error::InvalidConfig(
                "dimension box sizes must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Single-scale scan options derived from this configuration.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_scales(self.scales.clone())
            .with_boundary(self.boundary)
            .with_boxcount(self.boxcount)
    }

    /// Multi-scale scan options derived from this configuration.
    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig::default()
            .with_scan(self.scan_config())
            .with_parallelism(self.parallelism)
    }

    /// Dimension estimate options derived from this configuration.
    pub fn dimension_config(&self) -> DimensionConfig {
        let cfg = DimensionConfig::default().with_boxcount(self.boxcount);
        match &self.dimension_box_sizes {
            Some(sizes) => cfg.with_box_sizes(sizes.clone()),
            None => cfg,
        }
    }
}

/// Runs spatial scans and dimension estimates with a validated configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn try_new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Scans one scale.
    pub fn scan(&self, grid: &Grid, scale_index: usize) -> Result<SpatialMaps> {
        scan::scan(grid, scale_index, &self.config.scan_config())
    }

    /// Scans every scheduled scale.
    pub fn scan_all(&self, grid: &Grid) -> Result<MultiScaleMaps> {
        self.scan_all_with_events(grid, &mut ())
    }

    pub fn scan_all_with_events(
        &self,
        grid: &Grid,
        sink: &mut dyn EventSink,
    ) -> Result<MultiScaleMaps> {
        scan::scan_all_scales(grid, &self.config.schedule_config(), sink)
    }

    /// Fractal dimension of `grid`.
    pub fn fractal_dimension(&self, grid: &Grid) -> Result<f64> {
        self.fractal_dimension_detailed(grid).map(|e| e.dimension)
    }

    pub fn fractal_dimension_detailed(&self, grid: &Grid) -> Result<DimensionEstimate> {
        self.fractal_dimension_with_events(grid, &mut ())
    }

    pub fn fractal_dimension_with_events(
        &self,
        grid: &Grid,
        sink: &mut dyn EventSink,
    ) -> Result<DimensionEstimate> {
        let estimate =
            dimension::estimate_with_events(grid, &self.config.dimension_config(), sink)?;
        info!(
            "Fractal dimension {:.3} from {} box sizes (r^2 = {:.4}).",
            estimate.dimension,
            estimate.points.len(),
            estimate.fit.r_squared
        );
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BoxcountEvent, VecSink};

    #[test]
    fn try_new_rejects_invalid_configuration() {
        let cfg = AnalysisConfig::default().with_dimension_box_sizes(Vec::new());
        assert!(matches!(
            Analyzer::try_new(cfg),
            Err(Error::InvalidConfig(_))
        ));
        let cfg = AnalysisConfig::default()
            .with_degenerate_policy(DegeneratePolicy::Sentinel(f64::NEG_INFINITY));
        assert!(Analyzer::try_new(cfg).is_err());
    }

    #[test]
    fn derived_configs_carry_settings() {
        let cfg = AnalysisConfig::default()
            .with_boundary(BoundaryPolicy::Include)
            .with_leading_zero(true)
            .with_parallelism(Parallelism::Sequential)
            .with_dimension_box_sizes(vec![2, 4]);
        let schedule = cfg.schedule_config();
        assert_eq!(schedule.parallelism, Parallelism::Sequential);
        assert_eq!(schedule.scan.boundary, BoundaryPolicy::Include);
        assert!(schedule.scan.boxcount.leading_zero);
        assert_eq!(cfg.dimension_config().box_sizes, Some(vec![2, 4]));
    }

    #[test]
    fn analyzer_runs_scan_and_estimate() {
        let grid = Grid::from_fn(32, 32, 256, |x, y| ((x * 7 + y * 13) % 256) as u32)
            .expect("grid");
        let analyzer = Analyzer::try_new(AnalysisConfig::default()).expect("analyzer");

        let single = analyzer.scan(&grid, 1).expect("scan");
        assert_eq!(single.shape(), (8, 8));

        let mut sink = VecSink::new();
        let all = analyzer
            .scan_all_with_events(&grid, &mut sink)
            .expect("scan all");
        assert_eq!(all.len(), 5);
        assert_eq!(all.get(1), Some(&single));
        assert!(matches!(
            sink.as_slice().last(),
            Some(BoxcountEvent::RunFinished { .. })
        ));

        let est = analyzer.fractal_dimension_detailed(&grid).expect("estimate");
        assert!(est.dimension.is_finite());
        assert_eq!(
            analyzer.fractal_dimension(&grid).expect("estimate"),
            est.dimension
        );
    }

    #[test]
    fn leading_zero_changes_lacunarity_only() {
        let grid = Grid::zeros(4, 4, 256).expect("grid");
        let plain = Analyzer::try_new(AnalysisConfig::default()).expect("analyzer");
        let seeded =
            Analyzer::try_new(AnalysisConfig::default().with_leading_zero(true)).expect("analyzer");
        let a = plain.scan(&grid, 0).expect("scan");
        let b = seeded.scan(&grid, 0).expect("scan");
        assert_eq!(a.ratio, b.ratio);
        assert!((a.lacunarity.as_slice()[0] - 127.0).abs() < 1e-9);
        assert!((b.lacunarity.as_slice()[0] - 128.0).abs() < 1e-9);
    }
}
