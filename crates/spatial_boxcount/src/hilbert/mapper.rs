//! Byte sequences laid out on square grids.
use crate::error::{Error, Result};
use crate::grid::Grid;

use super::curve::{d2xy, order_for_len};

/// Arrangement of a byte sequence on a grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteLayout {
    /// Along a Hilbert curve on a `2^p x 2^p` grid, zero-padded.
    #[default]
    Hilbert,
    /// Row by row on a `floor(sqrt(len))` square; trailing bytes are dropped.
    RowMajor,
}

/// Lays out `bytes` according to `layout`.
pub fn bytes_to_grid(bytes: &[u8], layout: ByteLayout) -> Result<Grid> {
    match layout {
        ByteLayout::Hilbert => map_to_grid(bytes),
        ByteLayout::RowMajor => map_row_major(bytes),
    }
}

/// Places byte `d` at the Hilbert coordinate of distance `d`.
///
/// The grid side is the smallest power of two whose square holds all bytes; cells past the
/// end of the input stay zero. The first curve coordinate is the row, the second the column.
pub fn map_to_grid(bytes: &[u8]) -> Result<Grid> {
    let side = 1usize
        .checked_shl(order_for_len(bytes.len()))
        .ok_or_else(|| Error::InvalidGrid(format!("{} bytes exceed grid range", bytes.len())))?;
    let mut grid = Grid::zeros(side, side, Grid::DEFAULT_MAX_VALUE)?;
    let n = side as u64;
    for (d, &byte) in bytes.iter().enumerate() {
        let (x, y) = d2xy(n, d as u64);
        grid.set(y as usize, x as usize, u32::from(byte));
    }
    Ok(grid)
}

/// Row-major square of side `floor(sqrt(len))`.
pub fn map_row_major(bytes: &[u8]) -> Result<Grid> {
    let side = bytes.len().isqrt();
    if side == 0 {
        return Err(Error::InvalidGrid(
            "row-major layout needs at least one byte".into(),
        ));
    }
    Grid::from_bytes(side, side, &bytes[..side * side])
}
