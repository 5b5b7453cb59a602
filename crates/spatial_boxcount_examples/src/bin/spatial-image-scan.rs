use std::path::PathBuf;

use anyhow::{bail, Context};
use spatial_boxcount::prelude::*;
use spatial_boxcount_examples::{init_tracing, load_grid, render_map_to_png};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let mut args = std::env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: spatial-image-scan <input> [output-dir]");
    };
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let grid = load_grid(&input, ByteLayout::Hilbert)?;
    let analyzer = Analyzer::try_new(AnalysisConfig::default())?;

    let mut sink = VecSink::new();
    let maps = analyzer.scan_all_with_events(&grid, &mut sink)?;
    for event in sink.as_slice() {
        if let BoxcountEvent::ScaleFinished {
            scale,
            tiles_evaluated,
            tiles_skipped,
            elapsed,
        } = event
        {
            info!(
                "box size {:>4}: {} tiles, {} skipped, {:.2?}",
                scale.box_size, tiles_evaluated, tiles_skipped, elapsed
            );
        }
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("grid");
    for (_, scale_maps) in maps.iter() {
        let bs = scale_maps.scale.box_size;
        render_map_to_png(
            &scale_maps.ratio,
            bs,
            out_dir.join(format!("{stem}-ratio-{bs}.png")),
        )?;
        render_map_to_png(
            &scale_maps.lacunarity,
            bs,
            out_dir.join(format!("{stem}-lacunarity-{bs}.png")),
        )?;
    }
    println!(
        "{}: {}x{} grid, {} scales written to {}",
        input.display(),
        grid.width(),
        grid.height(),
        maps.len(),
        out_dir.display()
    );
    Ok(())
}
