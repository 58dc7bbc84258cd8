//! Dense walkability grid backed by an obstacle set.

use std::collections::HashSet;

use path_defence_core::CellCoord;

/// Tracks which cells are blocked by towers.
///
/// Callers must keep coordinates within the grid extent; out-of-range
/// access trips a debug assertion and is otherwise ignored.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    columns: u32,
    rows: u32,
    walkable: Vec<bool>,
    obstacles: HashSet<CellCoord>,
}

impl OccupancyGrid {
    /// Creates a fully walkable grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            walkable: vec![true; count],
            obstacles: HashSet::new(),
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Marks the cell as blocked. Blocking an already blocked cell is a no-op.
    pub fn add_obstacle(&mut self, cell: CellCoord) {
        debug_assert!(self.contains(cell), "obstacle {cell} outside grid");
        if let Some(index) = self.index(cell) {
            self.walkable[index] = false;
            let _ = self.obstacles.insert(cell);
        }
    }

    /// Marks the cell as free. Freeing an already free cell is a no-op.
    pub fn remove_obstacle(&mut self, cell: CellCoord) {
        debug_assert!(self.contains(cell), "obstacle {cell} outside grid");
        if let Some(index) = self.index(cell) {
            self.walkable[index] = true;
            let _ = self.obstacles.remove(&cell);
        }
    }

    /// Reports whether the cell can be walked through.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map(|index| self.walkable[index])
            .unwrap_or(false)
    }

    /// Reports whether the cell is blocked by an obstacle.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellCoord) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Set of blocked cells.
    #[must_use]
    pub fn obstacles(&self) -> &HashSet<CellCoord> {
        &self.obstacles
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    pub(crate) fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.columns).ok()?;
        if width == 0 || index >= self.walkable.len() {
            return None;
        }
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.walkable.len()
    }
}

#[cfg(test)]
mod tests {
    use super::OccupancyGrid;
    use path_defence_core::CellCoord;

    #[test]
    fn obstacles_toggle_idempotently() {
        let mut grid = OccupancyGrid::new(4, 3);
        let cell = CellCoord::new(2, 1);

        grid.add_obstacle(cell);
        grid.add_obstacle(cell);
        assert!(!grid.is_walkable(cell));
        assert_eq!(grid.obstacles().len(), 1);

        grid.remove_obstacle(cell);
        grid.remove_obstacle(cell);
        assert!(grid.is_walkable(cell));
        assert!(grid.obstacles().is_empty());
    }

    #[test]
    fn index_round_trips_cells() {
        let grid = OccupancyGrid::new(5, 4);
        let cell = CellCoord::new(3, 2);
        let index = grid.index(cell).expect("inside grid");
        assert_eq!(index, 13);
        assert_eq!(grid.cell_at(index), Some(cell));
        assert_eq!(grid.index(CellCoord::new(5, 0)), None);
    }

    #[test]
    fn out_of_grid_cells_are_not_walkable() {
        let grid = OccupancyGrid::new(2, 2);
        assert!(!grid.is_walkable(CellCoord::new(2, 0)));
    }
}
