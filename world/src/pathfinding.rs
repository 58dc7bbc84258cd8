//! A* search over the eight-connected occupancy grid.

use std::{cmp::Reverse, collections::BinaryHeap};

use path_defence_core::CellCoord;

use crate::occupancy::OccupancyGrid;

const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Open-set entry ordered by `f`, then `h`, then first insertion.
///
/// Entries are invalidated lazily: an entry whose `f` no longer matches the
/// node's current score is skipped when popped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: u32,
    h: u32,
    sequence: u64,
    index: usize,
}

#[derive(Clone, Debug, Default)]
struct SearchScratch {
    g: Vec<u32>,
    h: Vec<u32>,
    parent: Vec<Option<usize>>,
    sequence: Vec<Option<u64>>,
    closed: Vec<bool>,
    open: BinaryHeap<Reverse<OpenEntry>>,
}

impl SearchScratch {
    fn reset(&mut self, count: usize) {
        self.g.clear();
        self.g.resize(count, u32::MAX);
        self.h.clear();
        self.h.resize(count, 0);
        self.parent.clear();
        self.parent.resize(count, None);
        self.sequence.clear();
        self.sequence.resize(count, None);
        self.closed.clear();
        self.closed.resize(count, false);
        self.open.clear();
    }
}

/// Grid pathfinder that owns the walkability grid it searches.
///
/// Every query re-runs from scratch; no search state survives between calls.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    grid: OccupancyGrid,
    scratch: SearchScratch,
}

impl Pathfinder {
    /// Creates a pathfinder over the provided grid.
    #[must_use]
    pub fn new(grid: OccupancyGrid) -> Self {
        Self {
            grid,
            scratch: SearchScratch::default(),
        }
    }

    /// Read-only access to the searched grid.
    #[must_use]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Blocks a cell for subsequent searches.
    pub fn add_obstacle(&mut self, cell: CellCoord) {
        self.grid.add_obstacle(cell);
    }

    /// Frees a cell for subsequent searches.
    pub fn remove_obstacle(&mut self, cell: CellCoord) {
        self.grid.remove_obstacle(cell);
    }

    /// Computes a cheapest route from `start` to `end`, inclusive of both.
    ///
    /// Returns an empty sequence when no route exists or either endpoint lies
    /// outside the grid. When several open nodes share the lowest `f` score
    /// the one with the lower heuristic wins, and remaining ties go to the
    /// node that entered the open set first.
    pub fn find_path(&mut self, start: CellCoord, end: CellCoord) -> Vec<CellCoord> {
        let (Some(start_index), Some(end_index)) = (self.grid.index(start), self.grid.index(end))
        else {
            return Vec::new();
        };

        self.scratch.reset(self.grid.cell_count());
        let mut next_sequence: u64 = 0;

        let start_h = start.octile_distance(end);
        self.scratch.g[start_index] = 0;
        self.scratch.h[start_index] = start_h;
        self.scratch.sequence[start_index] = Some(next_sequence);
        self.scratch.open.push(Reverse(OpenEntry {
            f: start_h,
            h: start_h,
            sequence: next_sequence,
            index: start_index,
        }));
        next_sequence += 1;

        while let Some(Reverse(entry)) = self.scratch.open.pop() {
            let current = entry.index;
            if self.scratch.closed[current] {
                continue;
            }
            let current_f = self.scratch.g[current].saturating_add(self.scratch.h[current]);
            if entry.f != current_f {
                continue;
            }

            self.scratch.closed[current] = true;

            if current == end_index {
                return self.retrace(start_index, end_index);
            }

            let Some(current_cell) = self.grid.cell_at(current) else {
                continue;
            };

            for (dx, dz) in NEIGHBOUR_OFFSETS {
                let Some(neighbour_cell) = offset(current_cell, dx, dz) else {
                    continue;
                };
                let Some(neighbour) = self.grid.index(neighbour_cell) else {
                    continue;
                };
                if !self.grid.is_walkable(neighbour_cell) || self.scratch.closed[neighbour] {
                    continue;
                }

                let tentative = self.scratch.g[current]
                    .saturating_add(current_cell.octile_distance(neighbour_cell));
                let in_open = self.scratch.sequence[neighbour].is_some();
                if in_open && tentative >= self.scratch.g[neighbour] {
                    continue;
                }

                let h = neighbour_cell.octile_distance(end);
                self.scratch.g[neighbour] = tentative;
                self.scratch.h[neighbour] = h;
                self.scratch.parent[neighbour] = Some(current);
                let sequence = match self.scratch.sequence[neighbour] {
                    Some(existing) => existing,
                    None => {
                        let assigned = next_sequence;
                        next_sequence += 1;
                        self.scratch.sequence[neighbour] = Some(assigned);
                        assigned
                    }
                };
                self.scratch.open.push(Reverse(OpenEntry {
                    f: tentative.saturating_add(h),
                    h,
                    sequence,
                    index: neighbour,
                }));
            }
        }

        Vec::new()
    }

    /// Reports whether any route connects `start` to `end`.
    pub fn is_path_available(&mut self, start: CellCoord, end: CellCoord) -> bool {
        !self.find_path(start, end).is_empty()
    }

    fn retrace(&self, start: usize, end: usize) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut current = end;
        loop {
            if let Some(cell) = self.grid.cell_at(current) {
                path.push(cell);
            }
            if current == start {
                break;
            }
            match self.scratch.parent[current] {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

fn offset(cell: CellCoord, dx: i64, dz: i64) -> Option<CellCoord> {
    let column = u32::try_from(i64::from(cell.column()) + dx).ok()?;
    let row = u32::try_from(i64::from(cell.row()) + dz).ok()?;
    Some(CellCoord::new(column, row))
}

/// Total octile cost of walking the provided sequence.
#[must_use]
pub fn path_cost(path: &[CellCoord]) -> u32 {
    path.windows(2)
        .map(|pair| pair[0].octile_distance(pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use super::{path_cost, Pathfinder, NEIGHBOUR_OFFSETS};
    use crate::occupancy::OccupancyGrid;
    use path_defence_core::CellCoord;

    fn pathfinder(columns: u32, rows: u32, obstacles: &[(u32, u32)]) -> Pathfinder {
        let mut grid = OccupancyGrid::new(columns, rows);
        for &(column, row) in obstacles {
            grid.add_obstacle(CellCoord::new(column, row));
        }
        Pathfinder::new(grid)
    }

    /// Exhaustive Dijkstra used as the reference for optimal cost.
    fn brute_force_cost(grid: &OccupancyGrid, start: CellCoord, end: CellCoord) -> Option<u32> {
        let mut best: HashMap<CellCoord, u32> = HashMap::new();
        let mut queue = VecDeque::new();
        let _ = best.insert(start, 0);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            let cost = best[&cell];
            for (dx, dz) in NEIGHBOUR_OFFSETS {
                let Some(next) = super::offset(cell, dx, dz) else {
                    continue;
                };
                if !grid.contains(next) || !grid.is_walkable(next) {
                    continue;
                }
                let candidate = cost + cell.octile_distance(next);
                if best.get(&next).map_or(true, |&known| candidate < known) {
                    let _ = best.insert(next, candidate);
                    queue.push_back(next);
                }
            }
        }
        best.get(&end).copied()
    }

    fn assert_valid_route(path: &[CellCoord], start: CellCoord, end: CellCoord) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn open_grid_routes_are_optimal_against_brute_force() {
        let mut finder = pathfinder(5, 4, &[]);
        for start_column in 0..5 {
            for start_row in 0..4 {
                for end_column in 0..5 {
                    for end_row in 0..4 {
                        let start = CellCoord::new(start_column, start_row);
                        let end = CellCoord::new(end_column, end_row);
                        let path = finder.find_path(start, end);
                        assert_valid_route(&path, start, end);
                        assert_eq!(
                            Some(path_cost(&path)),
                            brute_force_cost(finder.grid(), start, end)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn obstructed_routes_remain_optimal() {
        let obstacles = [(2, 0), (2, 1), (2, 2), (4, 4), (4, 3), (4, 2), (1, 4)];
        let mut finder = pathfinder(6, 6, &obstacles);
        let start = CellCoord::new(0, 0);
        for end_column in 0..6 {
            for end_row in 0..6 {
                let end = CellCoord::new(end_column, end_row);
                if !finder.grid().is_walkable(end) {
                    assert!(finder.find_path(start, end).is_empty());
                    continue;
                }
                let path = finder.find_path(start, end);
                assert_valid_route(&path, start, end);
                assert_eq!(
                    Some(path_cost(&path)),
                    brute_force_cost(finder.grid(), start, end)
                );
            }
        }
    }

    #[test]
    fn wall_without_gap_disconnects_endpoints() {
        let wall: Vec<(u32, u32)> = (0..5).map(|row| (3, row)).collect();
        let mut finder = pathfinder(7, 5, &wall);
        let start = CellCoord::new(0, 2);
        let end = CellCoord::new(6, 2);
        assert!(finder.find_path(start, end).is_empty());
        assert!(!finder.is_path_available(start, end));

        finder.remove_obstacle(CellCoord::new(3, 4));
        assert!(finder.is_path_available(start, end));
    }

    #[test]
    fn straight_line_prefers_lower_heuristic_on_ties() {
        let mut finder = pathfinder(5, 3, &[]);
        let path = finder.find_path(CellCoord::new(0, 1), CellCoord::new(4, 1));
        let expected: Vec<CellCoord> = (0..5).map(|column| CellCoord::new(column, 1)).collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn diagonal_offset_takes_the_diagonal_first() {
        let mut finder = pathfinder(4, 4, &[]);
        let path = finder.find_path(CellCoord::new(0, 0), CellCoord::new(3, 1));
        assert_eq!(
            path,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 1),
                CellCoord::new(2, 1),
                CellCoord::new(3, 1),
            ]
        );
    }

    #[test]
    fn start_equal_to_end_yields_single_cell() {
        let mut finder = pathfinder(3, 3, &[]);
        let cell = CellCoord::new(1, 1);
        assert_eq!(finder.find_path(cell, cell), vec![cell]);
    }

    #[test]
    fn out_of_grid_endpoints_yield_empty_paths() {
        let mut finder = pathfinder(3, 3, &[]);
        assert!(finder
            .find_path(CellCoord::new(0, 0), CellCoord::new(3, 0))
            .is_empty());
    }

    #[test]
    fn blocked_goal_is_unreachable() {
        let mut finder = pathfinder(3, 3, &[(2, 2)]);
        assert!(finder
            .find_path(CellCoord::new(0, 0), CellCoord::new(2, 2))
            .is_empty());
    }
}
