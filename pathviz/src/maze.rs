use log::debug;
use rand::{seq::IndexedRandom, Rng};

use crate::grid::{Grid, Point};

/// Room neighbors are two cells away, the cell in between is the wall
const DIRECTIONS: [(isize, isize); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

/// Carve a perfect maze into `grid` with a randomized depth-first backtracker.
///
/// Every cell becomes an obstacle first, then rooms at odd row/col indices are connected starting
/// from (1, 1). Whatever the grid held before, start and end included, is overwritten, so callers
/// have to place those again afterwards. Grids smaller than 2x2 end up as solid obstacles.
pub fn generate_maze<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    for cell in grid.cells_mut() {
        cell.reset();
        cell.mark_obstacle();
    }

    let seed = Point { row: 1, col: 1 };
    if !grid.is_valid(seed) {
        return;
    }

    let mut stack = vec![seed];
    grid.get_mut(seed).reset();
    let mut rooms = 1;

    while let Some(&current) = stack.last() {
        let candidates: Vec<Point> = DIRECTIONS
            .iter()
            .filter_map(|&(dr, dc)| {
                let point = Point {
                    row: current.row.checked_add_signed(dr)?,
                    col: current.col.checked_add_signed(dc)?,
                };
                let carvable = point.row > 0
                    && point.col > 0
                    && grid.is_valid(point)
                    && grid.get(point).is_obstacle();
                carvable.then_some(point)
            })
            .collect();

        match candidates.choose(rng) {
            Some(&next) => {
                let wall = Point {
                    row: (current.row + next.row) / 2,
                    col: (current.col + next.col) / 2,
                };
                grid.get_mut(wall).reset();
                grid.get_mut(next).reset();
                stack.push(next);
                rooms += 1;
            }
            None => {
                // dead end, backtrack
                stack.pop();
            }
        }
    }

    debug!(
        "carved a maze with {} rooms into a {}x{} grid",
        rooms,
        grid.size(),
        grid.size()
    );
}

#[cfg(test)]
mod test {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::grid::CellState;

    fn p(row: usize, col: usize) -> Point {
        Point { row, col }
    }

    fn rooms(size: usize) -> Vec<Point> {
        (1..size)
            .step_by(2)
            .flat_map(|row| (1..size).step_by(2).map(move |col| p(row, col)))
            .collect()
    }

    /// Breadth-first flood fill over non-obstacle cells
    fn reachable_from(grid: &Grid, from: Point) -> Vec<Point> {
        let mut seen = grid.create_storage::<bool>();
        let mut queue = VecDeque::from([from]);
        let mut reached = Vec::new();
        *seen.get_mut(from) = true;

        while let Some(point) = queue.pop_front() {
            reached.push(point);
            for n in grid.neighbors_of(point) {
                if !seen.get(n) {
                    *seen.get_mut(n) = true;
                    queue.push_back(n);
                }
            }
        }
        reached
    }

    fn carved_edges(grid: &Grid) -> usize {
        let size = grid.size();
        rooms(size)
            .into_iter()
            .map(|room| {
                let mut edges = 0;
                if room.row + 2 < size && !grid.get(p(room.row + 1, room.col)).is_obstacle() {
                    edges += 1;
                }
                if room.col + 2 < size && !grid.get(p(room.row, room.col + 1)).is_obstacle() {
                    edges += 1;
                }
                edges
            })
            .sum()
    }

    #[test]
    fn test_perfect_maze() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for size in [3, 5, 10, 11, 12, 21, 40] {
            let mut grid = Grid::new(size).unwrap();
            generate_maze(&mut grid, &mut rng);

            let rooms = rooms(size);
            let reached = reachable_from(&grid, p(1, 1));

            // every room is open and connected to the seed
            for room in &rooms {
                assert!(!grid.get(*room).is_obstacle(), "room {:?} not carved", room);
                assert!(reached.contains(room), "room {:?} unreachable", room);
            }
            // a spanning tree over the rooms, so no cycles
            assert_eq!(carved_edges(&grid), rooms.len() - 1);

            // only rooms and walls between rooms are ever opened
            for point in reached {
                assert!(point.row % 2 == 1 || point.col % 2 == 1);
                assert!(point.row > 0 && point.col > 0);
            }
        }
    }

    #[test]
    fn test_overwrites_previous_state() {
        let mut grid = Grid::new(9).unwrap();
        grid.get_mut(p(1, 1)).mark_start();
        grid.get_mut(p(7, 7)).mark_end();
        grid.get_mut(p(3, 4)).mark_path();
        grid.get_mut(p(2, 2)).set_parent(Some(p(3, 4)));

        generate_maze(&mut grid, &mut ChaCha8Rng::seed_from_u64(1));

        assert!(grid
            .cells()
            .all(|c| matches!(c.state(), CellState::Empty | CellState::Obstacle)));
        assert_eq!(grid.get(p(1, 1)).state(), CellState::Empty);
        assert_eq!(grid.get(p(7, 7)).state(), CellState::Empty);
        assert!(grid.cells().all(|c| c.parent().is_none()));
    }

    #[test]
    fn test_tiny_grids() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut grid = Grid::new(1).unwrap();
        generate_maze(&mut grid, &mut rng);
        assert!(grid.get(p(0, 0)).is_obstacle());

        let mut grid = Grid::new(2).unwrap();
        generate_maze(&mut grid, &mut rng);
        assert_eq!(grid.get(p(1, 1)).state(), CellState::Empty);
        assert_eq!(grid.cells().filter(|c| c.is_obstacle()).count(), 3);
    }

    #[test]
    fn test_same_seed_same_maze() {
        let mut first = Grid::new(15).unwrap();
        let mut second = Grid::new(15).unwrap();

        generate_maze(&mut first, &mut ChaCha8Rng::seed_from_u64(5));
        generate_maze(&mut second, &mut ChaCha8Rng::seed_from_u64(5));

        assert_eq!(first.to_string(), second.to_string());
    }
}
