//! Hilbert curve mapping of byte sequences onto grids.
//!
//! Data without native 2D structure (executables, archives, raw dumps) is laid out along a
//! Hilbert curve so that bytes close together in the sequence stay close together on the grid.
pub mod curve;
pub mod mapper;

pub use curve::{d2xy, order_for_len, xy2d};
pub use mapper::{bytes_to_grid, map_row_major, map_to_grid, ByteLayout};
