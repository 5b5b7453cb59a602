use std::path::Path;
use std::sync::Once;

use anyhow::Context;
use image::{GrayImage, Luma};
use spatial_boxcount::grid::ScalarMap;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Installs a formatting subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    });
}

/// Min/max normalised grayscale image of `map`, one pixel per cell.
///
/// Non-finite cells render black; a flat map renders mid-gray.
pub fn map_to_luma(map: &ScalarMap) -> GrayImage {
    let (lo, hi) = map.min_max().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    GrayImage::from_fn(map.cols() as u32, map.rows() as u32, |x, y| {
        let v = map.row(y as usize)[x as usize];
        let level = if !v.is_finite() {
            0
        } else if span <= 0.0 {
            128
        } else {
            (((v - lo) / span) * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Luma([level])
    })
}

/// Writes `map` as a PNG, scaling each cell to a `cell_px` square.
pub fn render_map_to_png(
    map: &ScalarMap,
    cell_px: u32,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let base = map_to_luma(map);
    let cell_px = cell_px.max(1);
    let img = if cell_px == 1 {
        base
    } else {
        image::imageops::resize(
            &base,
            base.width() * cell_px,
            base.height() * cell_px,
            image::imageops::FilterType::Nearest,
        )
    };
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
