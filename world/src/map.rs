//! Fixed serpentine route, coordinate conversion and tower placement validation.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use path_defence_core::{CellCoord, PlacementRejection, TowerId};

use crate::{occupancy::OccupancyGrid, pathfinding::Pathfinder, WorldError};

const MIN_COLUMNS: u32 = 8;
const MIN_ROWS: u32 = 6;
const TOP_LANE_ROW: u32 = 2;

/// Grid layout, enemy route and tower occupancy.
#[derive(Clone, Debug)]
pub(crate) struct GameMap {
    columns: u32,
    rows: u32,
    cell_size: f32,
    start: CellCoord,
    end: CellCoord,
    path: Vec<CellCoord>,
    path_cells: HashSet<CellCoord>,
    pathfinder: Pathfinder,
    towers: HashMap<CellCoord, TowerId>,
}

impl GameMap {
    pub(crate) fn new(columns: u32, rows: u32, cell_size: f32) -> Result<Self, WorldError> {
        if columns < MIN_COLUMNS || rows < MIN_ROWS {
            return Err(WorldError::GridTooSmall { columns, rows });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(WorldError::InvalidCellSize(cell_size));
        }

        let start = CellCoord::new(0, rows / 2);
        let end = CellCoord::new(columns - 1, rows / 2);
        let path = serpentine(columns, rows, start, end);
        let path_cells = path.iter().copied().collect();

        Ok(Self {
            columns,
            rows,
            cell_size,
            start,
            end,
            path,
            path_cells,
            pathfinder: Pathfinder::new(OccupancyGrid::new(columns, rows)),
            towers: HashMap::new(),
        })
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn start(&self) -> CellCoord {
        self.start
    }

    pub(crate) const fn end(&self) -> CellCoord {
        self.end
    }

    pub(crate) fn path(&self) -> &[CellCoord] {
        &self.path
    }

    pub(crate) fn occupancy(&self) -> &OccupancyGrid {
        self.pathfinder.grid()
    }

    /// Cell containing the world position, or `None` outside the grid.
    pub(crate) fn world_to_cell(&self, position: Vec3) -> Option<CellCoord> {
        let column = (position.x / self.cell_size).floor();
        let row = (position.z / self.cell_size).floor();
        if !(column >= 0.0 && row >= 0.0) {
            return None;
        }
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// World position of the centre of the cell, on the ground plane.
    pub(crate) fn cell_center(&self, cell: CellCoord) -> Vec3 {
        let half = self.cell_size / 2.0;
        Vec3::new(
            cell.column() as f32 * self.cell_size + half,
            0.0,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    /// Path points expressed as cell centres.
    pub(crate) fn route(&self) -> Vec<Vec3> {
        self.path.iter().map(|cell| self.cell_center(*cell)).collect()
    }

    /// Validates a hypothetical placement without leaving any trace on the grid.
    pub(crate) fn check_placement(
        &mut self,
        position: Vec3,
    ) -> Result<CellCoord, PlacementRejection> {
        let cell = self
            .world_to_cell(position)
            .ok_or(PlacementRejection::OutOfBounds)?;
        if self.path_cells.contains(&cell) {
            return Err(PlacementRejection::OnPath);
        }
        if self.towers.contains_key(&cell) {
            return Err(PlacementRejection::Occupied);
        }

        self.pathfinder.add_obstacle(cell);
        let connected = self.pathfinder.is_path_available(self.start, self.end);
        self.pathfinder.remove_obstacle(cell);

        if connected {
            Ok(cell)
        } else {
            Err(PlacementRejection::SeversPath)
        }
    }

    /// Registers a tower on a cell previously accepted by [`Self::check_placement`].
    pub(crate) fn occupy(&mut self, cell: CellCoord, tower: TowerId) {
        let _ = self.towers.insert(cell, tower);
        self.pathfinder.add_obstacle(cell);
    }

    /// Frees the cell, returning the tower that occupied it.
    pub(crate) fn vacate(&mut self, cell: CellCoord) -> Option<TowerId> {
        let tower = self.towers.remove(&cell)?;
        self.pathfinder.remove_obstacle(cell);
        Some(tower)
    }

    pub(crate) fn tower_at(&self, cell: CellCoord) -> Option<TowerId> {
        self.towers.get(&cell).copied()
    }

    pub(crate) fn is_route_open(&mut self) -> bool {
        self.pathfinder.is_path_available(self.start, self.end)
    }
}

/// Builds the fixed route: east, south, east, north, east, then onto the exit row.
fn serpentine(columns: u32, rows: u32, start: CellCoord, end: CellCoord) -> Vec<CellCoord> {
    let first_turn = (columns / 4).max(1);
    let second_turn = (columns * 3 / 5).max(first_turn + 1).min(end.column() - 1);
    let bottom_lane = rows - 3;

    let mut path = vec![start];
    let mut column = start.column();
    let mut row = start.row();

    while column < first_turn {
        column += 1;
        path.push(CellCoord::new(column, row));
    }
    while row < bottom_lane {
        row += 1;
        path.push(CellCoord::new(column, row));
    }
    while column < second_turn {
        column += 1;
        path.push(CellCoord::new(column, row));
    }
    while row > TOP_LANE_ROW {
        row -= 1;
        path.push(CellCoord::new(column, row));
    }
    while column < end.column() {
        column += 1;
        path.push(CellCoord::new(column, row));
    }
    while row < end.row() {
        row += 1;
        path.push(CellCoord::new(column, row));
    }
    while row > end.row() {
        row -= 1;
        path.push(CellCoord::new(column, row));
    }

    path
}

#[cfg(test)]
mod tests {
    use super::GameMap;
    use glam::Vec3;
    use path_defence_core::{CellCoord, PlacementRejection, TowerId};

    fn default_map() -> GameMap {
        GameMap::new(20, 15, 1.0).expect("valid map")
    }

    #[test]
    fn path_is_contiguous_and_spans_start_to_end() {
        let map = default_map();
        let path = map.path();
        assert_eq!(path.first(), Some(&CellCoord::new(0, 7)));
        assert_eq!(path.last(), Some(&CellCoord::new(19, 7)));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
        assert!(path.contains(&CellCoord::new(5, 12)));
        assert!(path.contains(&CellCoord::new(12, 12)));
        assert!(path.contains(&CellCoord::new(12, 2)));
        assert!(path.contains(&CellCoord::new(19, 2)));
    }

    #[test]
    fn small_grids_are_rejected() {
        assert!(GameMap::new(4, 15, 1.0).is_err());
        assert!(GameMap::new(20, 3, 1.0).is_err());
        assert!(GameMap::new(20, 15, 0.0).is_err());
    }

    #[test]
    fn coordinate_conversion_snaps_to_cell_centres() {
        let map = GameMap::new(20, 15, 2.0).expect("valid map");
        let cell = map
            .world_to_cell(Vec3::new(3.9, 0.0, 0.1))
            .expect("inside grid");
        assert_eq!(cell, CellCoord::new(1, 0));
        assert_eq!(map.cell_center(cell), Vec3::new(3.0, 0.0, 1.0));
        assert_eq!(map.world_to_cell(map.cell_center(cell)), Some(cell));
        assert_eq!(map.world_to_cell(Vec3::new(-0.1, 0.0, 1.0)), None);
        assert_eq!(map.world_to_cell(Vec3::new(40.0, 0.0, 1.0)), None);
    }

    #[test]
    fn placement_checks_leave_no_trace() {
        let mut map = default_map();
        let before = map.occupancy().obstacles().clone();

        assert_eq!(
            map.check_placement(Vec3::new(1.5, 0.0, 6.5)),
            Ok(CellCoord::new(1, 6))
        );
        assert_eq!(
            map.check_placement(Vec3::new(0.5, 0.0, 7.5)),
            Err(PlacementRejection::OnPath)
        );
        assert_eq!(
            map.check_placement(Vec3::new(-3.0, 0.0, 7.5)),
            Err(PlacementRejection::OutOfBounds)
        );

        assert_eq!(map.occupancy().obstacles(), &before);
    }

    #[test]
    fn occupied_cells_are_rejected_until_vacated() {
        let mut map = default_map();
        let cell = CellCoord::new(1, 6);
        map.occupy(cell, TowerId::new(3));
        assert_eq!(
            map.check_placement(map.cell_center(cell)),
            Err(PlacementRejection::Occupied)
        );
        assert!(!map.occupancy().is_walkable(cell));

        assert_eq!(map.vacate(cell), Some(TowerId::new(3)));
        assert_eq!(map.vacate(cell), None);
        assert!(map.occupancy().is_walkable(cell));
    }
}
