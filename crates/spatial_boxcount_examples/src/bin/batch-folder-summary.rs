use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use spatial_boxcount::prelude::*;
use spatial_boxcount_examples::{init_tracing, load_grid, matches_pattern};
use tracing::warn;

const USAGE: &str = "usage: batch-folder-summary <folder> [--mode dimension|single] \
                     [--layout hilbert|row-major] [--pattern GLOB]";
const SINGLE_BOX_SIZE: u32 = 8;

#[derive(Clone, Copy)]
enum Mode {
    /// Fractal dimension of each file.
    Dimension,
    /// Whole-grid box count and lacunarity at one box size.
    Single,
}

struct Options {
    folder: PathBuf,
    mode: Mode,
    layout: ByteLayout,
    pattern: String,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut args = std::env::args().skip(1);
    let mut folder = None;
    let mut mode = Mode::Dimension;
    let mut layout = ByteLayout::Hilbert;
    let mut pattern = String::from("*.*");

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                mode = match args.next().as_deref() {
                    Some("dimension") => Mode::Dimension,
                    Some("single") => Mode::Single,
                    other => bail!("unknown mode {other:?}\n{USAGE}"),
                }
            }
            "--layout" => {
                layout = match args.next().as_deref() {
                    Some("hilbert") => ByteLayout::Hilbert,
                    Some("row-major") => ByteLayout::RowMajor,
                    other => bail!("unknown layout {other:?}\n{USAGE}"),
                }
            }
            "--pattern" => match args.next() {
                Some(p) => pattern = p,
                None => bail!("--pattern needs a value\n{USAGE}"),
            },
            _ if folder.is_none() => folder = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }

    let Some(folder) = folder else {
        bail!(USAGE);
    };
    Ok(Options {
        folder,
        mode,
        layout,
        pattern,
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let options = parse_args()?;

    let analyzer = Analyzer::try_new(AnalysisConfig::default())?;
    let boxcount = analyzer.config().boxcount;
    let mut results: BTreeMap<String, String> = BTreeMap::new();
    let entries = std::fs::read_dir(&options.folder)
        .with_context(|| format!("failed to list {}", options.folder.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !matches_pattern(&name, &options.pattern) {
            continue;
        }
        let outcome = load_grid(&path, options.layout).and_then(|grid| match options.mode {
            Mode::Dimension => {
                let d = analyzer.fractal_dimension(&grid)?;
                Ok(format!("dimension {d:.3}"))
            }
            Mode::Single => {
                let r = count_tile(&grid.as_tile(), SINGLE_BOX_SIZE, grid.max_value(), &boxcount)?;
                Ok(format!(
                    "boxcount {} lacunarity {:.4}",
                    r.occupied_bins, r.lacunarity
                ))
            }
        });
        let line = match outcome {
            Ok(line) => line,
            Err(err) => {
                warn!("{name}: {err:#}");
                format!("Error: {err:#}")
            }
        };
        results.insert(name, line);
    }

    for (name, line) in &results {
        println!("{name}: {line}");
    }
    Ok(())
}
