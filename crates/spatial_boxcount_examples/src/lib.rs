#![forbid(unsafe_code)]

mod loading;
mod pattern;
mod rendering;

pub use loading::{load_grid, InputKind};
pub use pattern::matches_pattern;
pub use rendering::{init_tracing, map_to_luma, render_map_to_png};
