//! Borrowed rectangular windows into a [`Grid`].
use glam::UVec2;

use super::Grid;

/// Position of a tile in a tiling, as `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileId(
    /// Tile index along the Y axis.
    pub usize,
    /// Tile index along the X axis.
    pub usize,
);

/// A rectangular window of a grid.
#[derive(Clone, Copy, Debug)]
pub struct Tile<'a> {
    grid: &'a Grid,
    origin: UVec2,
    extent: UVec2,
}

impl<'a> Tile<'a> {
    pub(crate) fn new(grid: &'a Grid, origin: UVec2, extent: UVec2) -> Self {
        debug_assert!(origin.x as usize + extent.x as usize <= grid.width());
        debug_assert!(origin.y as usize + extent.y as usize <= grid.height());
        Self {
            grid,
            origin,
            extent,
        }
    }

    /// Top-left cell of the tile.
    pub fn origin(&self) -> UVec2 {
        self.origin
    }

    /// Width and height of the tile.
    pub fn extent(&self) -> UVec2 {
        self.extent
    }

    /// Number of cells covered.
    pub fn len(&self) -> usize {
        self.extent.x as usize * self.extent.y as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the tile covers a full `box_size x box_size` square.
    pub fn is_full(&self, box_size: u32) -> bool {
        self.extent == UVec2::splat(box_size)
    }

    /// Position of this tile in a tiling with step `box_size`.
    pub fn id(&self, box_size: u32) -> TileId {
        debug_assert!(box_size > 0, "box_size must be > 0");
        TileId(
            (self.origin.y / box_size) as usize,
            (self.origin.x / box_size) as usize,
        )
    }

    /// Samples in row-major order.
    pub fn values(&self) -> impl Iterator<Item = u32> + 'a {
        let grid = self.grid;
        let x0 = self.origin.x as usize;
        let x1 = x0 + self.extent.x as usize;
        let y0 = self.origin.y as usize;
        let y1 = y0 + self.extent.y as usize;
        (y0..y1).flat_map(move |y| grid.row(y)[x0..x1].iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_fn(4, 4, 256, |x, y| (y * 4 + x) as u32).expect("valid grid")
    }

    #[test]
    fn values_walk_rows_inside_window() {
        let grid = grid();
        let tile = grid.tile(UVec2::new(2, 2), UVec2::new(2, 2));
        assert_eq!(tile.values().collect::<Vec<_>>(), vec![10, 11, 14, 15]);
        assert_eq!(tile.len(), 4);
        assert!(tile.is_full(2));
    }

    #[test]
    fn id_divides_origin_by_box_size() {
        let grid = grid();
        let tile = grid.tile(UVec2::new(2, 0), UVec2::new(2, 2));
        assert_eq!(tile.id(2), TileId(0, 1));
    }

    #[test]
    fn whole_grid_tile_covers_everything() {
        let grid = grid();
        let tile = grid.as_tile();
        assert_eq!(tile.len(), 16);
        assert_eq!(tile.values().sum::<u32>(), (0..16).sum::<u32>());
    }
}
