//! Dense per-tile result storage.
//!
//! A [`ScalarMap`] holds one `f64` per tile position of a tiling, in row-major order.
use super::TileId;

/// Row-major 2D array of `f64` values indexed by [`TileId`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalarMap {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ScalarMap {
    /// Create a map of the given shape, initializing all values to zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Value at `id`, or `None` outside the map.
    pub fn get(&self, id: TileId) -> Option<f64> {
        let TileId(row, col) = id;
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    pub(crate) fn set(&mut self, id: TileId, value: f64) {
        let TileId(row, col) = id;
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    /// Values of one row.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// All values in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Smallest and largest finite value, or `None` if there is none.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_initializes_with_zeroes() {
        let map = ScalarMap::new(2, 3);
        assert_eq!(map.shape(), (2, 3));
        assert!(map.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn get_returns_none_outside_bounds() {
        let map = ScalarMap::new(2, 2);
        assert_eq!(map.get(TileId(2, 0)), None);
        assert_eq!(map.get(TileId(0, 2)), None);
        assert_eq!(map.get(TileId(1, 1)), Some(0.0));
    }

    #[test]
    fn set_writes_row_major() {
        let mut map = ScalarMap::new(2, 3);
        map.set(TileId(1, 2), 0.5);
        assert_eq!(map.row(1), &[0.0, 0.0, 0.5]);
        assert_eq!(map.as_slice()[5], 0.5);
    }

    #[test]
    fn min_max_ignores_non_finite() {
        let mut map = ScalarMap::new(1, 3);
        map.set(TileId(0, 0), f64::NAN);
        map.set(TileId(0, 1), -1.0);
        map.set(TileId(0, 2), 4.0);
        assert_eq!(map.min_max(), Some((-1.0, 4.0)));
    }
}
