use ndarray::Array2;
use serde::Serialize;

use crate::*;

/// Plaintext, publicly observable record of which cells are taken.
///
/// Says nothing about who took a cell; ownership lives only in the
/// confidential values held by [`AssignmentEngine`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OccupancyTracker {
    grid: GridConfig,
    mask: Array2<bool>,
    occupied_count: CellCount,
}

impl OccupancyTracker {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            mask: Array2::default(grid.size().to_nd_index()),
            occupied_count: 0,
        }
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn is_occupied(&self, cell: CellIndex) -> Result<bool> {
        let coords = self.grid.coords_of(cell)?;
        Ok(self.mask[coords.to_nd_index()])
    }

    pub fn occupy(&mut self, cell: CellIndex) -> Result<()> {
        let coords = self.grid.coords_of(cell)?;
        let slot = &mut self.mask[coords.to_nd_index()];
        if *slot {
            return Err(TileError::AlreadyOccupied);
        }
        *slot = true;
        self.occupied_count += 1;
        Ok(())
    }

    pub fn occupied_count(&self) -> CellCount {
        self.occupied_count
    }

    pub fn capacity_remaining(&self) -> CellCount {
        self.grid.total_cells().saturating_sub(self.occupied_count)
    }

    pub fn is_full(&self) -> bool {
        self.capacity_remaining() == 0
    }

    /// Occupancy laid out as `[x, y]`, for rendering the grid.
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.grid
            .cells()
            .filter(|&cell| self.mask[cell.to_coords(self.grid.width).to_nd_index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn tracker() -> OccupancyTracker {
        OccupancyTracker::new(GridConfig::new(2, 2).unwrap())
    }

    #[test]
    fn occupy_marks_cell_and_reduces_capacity() {
        let mut tracker = tracker();
        let cell = CellIndex::new_unchecked(3);

        tracker.occupy(cell).unwrap();

        assert!(tracker.is_occupied(cell).unwrap());
        assert!(!tracker.is_occupied(CellIndex::new_unchecked(1)).unwrap());
        assert_eq!(tracker.capacity_remaining(), 3);
        assert!(tracker.mask()[[0, 1]]);
    }

    #[test]
    fn occupy_twice_trips_the_guard() {
        let mut tracker = tracker();
        let cell = CellIndex::new_unchecked(2);

        tracker.occupy(cell).unwrap();

        assert_eq!(tracker.occupy(cell), Err(TileError::AlreadyOccupied));
        assert_eq!(tracker.occupied_count(), 1);
    }

    #[test]
    fn lookups_outside_the_grid_fail() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.is_occupied(CellIndex::new_unchecked(0)),
            Err(TileError::OutOfRange)
        );
        assert_eq!(
            tracker.occupy(CellIndex::new_unchecked(5)),
            Err(TileError::OutOfRange)
        );
    }

    #[test]
    fn occupied_cells_lists_taken_cells_in_index_order() {
        let mut tracker = tracker();
        tracker.occupy(CellIndex::new_unchecked(4)).unwrap();
        tracker.occupy(CellIndex::new_unchecked(1)).unwrap();

        let cells: Vec<_> = tracker.occupied_cells().map(CellIndex::get).collect();

        assert_eq!(cells, [1, 4]);
        assert!(!tracker.is_full());
    }

    #[test]
    fn capacity_bottoms_out_at_zero_when_full() {
        let mut tracker = tracker();
        for index in 1..=4 {
            tracker.occupy(CellIndex::new_unchecked(index)).unwrap();
        }

        assert!(tracker.is_full());
        assert_eq!(tracker.capacity_remaining(), 0);
        assert_eq!(
            tracker.occupy(CellIndex::new_unchecked(1)),
            Err(TileError::AlreadyOccupied)
        );
        assert_eq!(tracker.capacity_remaining(), 0);
    }
}
