use anyhow::bail;
use spatial_boxcount::prelude::*;
use spatial_boxcount_examples::{init_tracing, load_grid};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let Some(input) = std::env::args().nth(1) else {
        bail!("usage: binary-hilbert-dimension <file>");
    };

    let grid = load_grid(&input, ByteLayout::Hilbert)?;
    let analyzer = Analyzer::try_new(AnalysisConfig::default())?;
    let mut sink = FnSink::new(|event: BoxcountEvent| {
        if let BoxcountEvent::Warning { context, message } = event {
            eprintln!("warning ({context}): {message}");
        }
    });
    let estimate = analyzer.fractal_dimension_with_events(&grid, &mut sink)?;

    println!("{input}: {}x{} Hilbert grid", grid.width(), grid.height());
    println!("{:>8} {:>10}", "box", "occupied");
    for (box_size, occupied) in &estimate.points {
        println!("{box_size:>8} {occupied:>10}");
    }
    println!(
        "fractal dimension {:.3} (slope {:.4}, intercept {:.4}, r^2 {:.4})",
        estimate.dimension, estimate.fit.slope, estimate.fit.intercept, estimate.fit.r_squared
    );
    Ok(())
}
