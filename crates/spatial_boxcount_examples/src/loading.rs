use std::path::Path;

use anyhow::Context;
use spatial_boxcount::prelude::*;
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// How a file on disk is turned into a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Decoded and converted to 8-bit luminance.
    Image,
    /// Raw bytes laid out with a [`ByteLayout`].
    Binary(ByteLayout),
}

impl InputKind {
    /// Images by extension, everything else as raw bytes.
    pub fn for_path(path: &Path, layout: ByteLayout) -> Self {
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_image {
            Self::Image
        } else {
            Self::Binary(layout)
        }
    }
}

/// Loads `path` as a grid with `max_value = 256`.
pub fn load_grid(path: impl AsRef<Path>, layout: ByteLayout) -> anyhow::Result<Grid> {
    let path = path.as_ref();
    let grid = match InputKind::for_path(path, layout) {
        InputKind::Image => {
            let img = image::open(path)
                .with_context(|| format!("failed to decode image {}", path.display()))?
                .to_luma8();
            let (width, height) = img.dimensions();
            Grid::from_bytes(width as usize, height as usize, img.as_raw())?
        }
        InputKind::Binary(layout) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            bytes_to_grid(&bytes, layout)?
        }
    };
    debug!(
        "Loaded {} as {}x{} grid.",
        path.display(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}
