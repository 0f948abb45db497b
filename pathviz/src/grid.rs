use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// What a cell currently shows, both for editing and for search progress
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    #[default]
    Empty,
    Obstacle,
    Start,
    End,
    Open,
    Closed,
    Path,
}

impl Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CellState::Empty => " ",
                CellState::Obstacle => "X",
                CellState::Start => "S",
                CellState::End => "E",
                CellState::Open => "o",
                CellState::Closed => ".",
                CellState::Path => "*",
            }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Number of 4-connected steps between two points when nothing is in the way
    pub fn manhattan(&self, other: &Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// A single grid position. The position is fixed at creation, the state and parent are free to
/// change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    point: Point,
    state: CellState,
    // back-reference written by a search run, only used to rebuild the path
    parent: Option<Point>,
}

impl Cell {
    fn new(point: Point) -> Self {
        Self {
            point,
            state: CellState::Empty,
            parent: None,
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn row(&self) -> usize {
        self.point.row
    }

    pub fn col(&self) -> usize {
        self.point.col
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn parent(&self) -> Option<Point> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<Point>) {
        self.parent = parent;
    }

    pub fn is_obstacle(&self) -> bool {
        self.state == CellState::Obstacle
    }

    pub fn is_start(&self) -> bool {
        self.state == CellState::Start
    }

    pub fn is_end(&self) -> bool {
        self.state == CellState::End
    }

    pub fn is_open(&self) -> bool {
        self.state == CellState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == CellState::Closed
    }

    pub fn is_path(&self) -> bool {
        self.state == CellState::Path
    }

    /// Back to `empty` with no parent
    pub fn reset(&mut self) {
        self.state = CellState::Empty;
        self.parent = None;
    }

    // The setters below overwrite the state without looking at the previous one.

    pub fn mark_obstacle(&mut self) {
        self.state = CellState::Obstacle;
    }

    pub fn mark_start(&mut self) {
        self.state = CellState::Start;
    }

    pub fn mark_end(&mut self) {
        self.state = CellState::End;
    }

    pub fn mark_open(&mut self) {
        self.state = CellState::Open;
    }

    pub fn mark_closed(&mut self) {
        self.state = CellState::Closed;
    }

    pub fn mark_path(&mut self) {
        self.state = CellState::Path;
    }
}

/// How [`Grid::apply_brush`] changes the cells under the brush
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Brush {
    Paint,
    Erase,
}

/// A fixed size square grid of cells, stored row by row in a single vec
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a `size` x `size` grid where every cell is `empty`
    pub fn new(size: usize) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::InvalidSize { size });
        }

        let cells = (0..size)
            .flat_map(|row| (0..size).map(move |col| Cell::new(Point { row, col })))
            .collect();

        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if the provided point lies inside the grid
    pub fn is_valid(&self, point: Point) -> bool {
        point.row < self.size && point.col < self.size
    }

    fn index(&self, point: Point) -> usize {
        point.row * self.size + point.col
    }

    /// # Panics
    /// Panics if `point` is outside of the grid, see [`Grid::is_valid`].
    pub fn get(&self, point: Point) -> &Cell {
        assert!(self.is_valid(point), "point {:?} outside of grid", point);
        &self.cells[self.index(point)]
    }

    /// # Panics
    /// Panics if `point` is outside of the grid, see [`Grid::is_valid`].
    pub fn get_mut(&mut self, point: Point) -> &mut Cell {
        assert!(self.is_valid(point), "point {:?} outside of grid", point);
        let index = self.index(point);
        &mut self.cells[index]
    }

    /// Like [`Grid::get_mut`] but reports an out of bounds point as an error
    pub fn try_get_mut(&mut self, point: Point) -> Result<&mut Cell, GridError> {
        if !self.is_valid(point) {
            return Err(GridError::OutOfBounds {
                point,
                size: self.size,
            });
        }
        Ok(self.get_mut(point))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.iter().map(Cell::point)
    }

    /// Return the 4-connected neighbors of `point` that are inside the grid and not obstacles.
    ///
    /// The order is always down, up, right, left.
    pub fn neighbors_of(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        let mut points = Vec::with_capacity(4);

        if point.row + 1 < self.size {
            points.push(Point {
                row: point.row + 1,
                col: point.col,
            });
        }
        if point.row > 0 {
            points.push(Point {
                row: point.row - 1,
                col: point.col,
            });
        }
        if point.col + 1 < self.size {
            points.push(Point {
                row: point.row,
                col: point.col + 1,
            });
        }
        if point.col > 0 {
            points.push(Point {
                row: point.row,
                col: point.col - 1,
            });
        }

        // filter to only keep walkable cells
        points.retain(|p| !self.get(*p).is_obstacle());

        points.into_iter()
    }

    /// Forget every parent pointer left behind by an earlier search
    pub fn clear_parents(&mut self) {
        for cell in &mut self.cells {
            cell.parent = None;
        }
    }

    /// Remove the `open`, `closed` and `path` marks of a search run while keeping obstacles,
    /// start and end.
    pub fn clear_search_marks(&mut self) {
        for cell in &mut self.cells {
            if matches!(
                cell.state,
                CellState::Open | CellState::Closed | CellState::Path
            ) {
                cell.reset();
            }
            cell.parent = None;
        }
    }

    /// First point in row-major order whose cell has the given state
    pub fn find(&self, state: CellState) -> Option<Point> {
        self.cells
            .iter()
            .find(|cell| cell.state == state)
            .map(Cell::point)
    }

    /// Paint or erase a `size` x `size` square centered on `center`, clipped to the grid.
    /// Start and end cells are left alone.
    pub fn apply_brush(&mut self, center: Point, size: usize, brush: Brush) {
        let radius = size / 2;
        let top = center.row.saturating_sub(radius);
        let left = center.col.saturating_sub(radius);
        let bottom = (center.row + radius).min(self.size - 1);
        let right = (center.col + radius).min(self.size - 1);

        for row in top..=bottom {
            for col in left..=right {
                let cell = self.get_mut(Point { row, col });
                if cell.is_start() || cell.is_end() {
                    continue;
                }
                match brush {
                    Brush::Paint => cell.mark_obstacle(),
                    Brush::Erase => cell.reset(),
                }
            }
        }
    }

    /// Map a pixel position inside a square view `width_px` pixels wide to the cell under it
    pub fn point_at_pixel(&self, x: u32, y: u32, width_px: u32) -> Option<Point> {
        let gap = width_px as usize / self.size;
        if gap == 0 {
            return None;
        }

        let point = Point {
            row: y as usize / gap,
            col: x as usize / gap,
        };
        self.is_valid(point).then_some(point)
    }

    /// Create a side table with one default value per cell
    pub fn create_storage<T: Default + Copy>(&self) -> CellStorage<T> {
        CellStorage {
            size: self.size,
            values: vec![T::default(); self.size * self.size],
        }
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.size) {
            for cell in row {
                write!(f, "{}", cell.state)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Per-cell values kept next to a grid, e.g. the visited set of a search
#[derive(Debug, Clone)]
pub struct CellStorage<T> {
    size: usize,
    values: Vec<T>,
}

impl<T: Copy> CellStorage<T> {
    pub fn get(&self, point: Point) -> T {
        self.values[point.row * self.size + point.col]
    }

    pub fn get_mut(&mut self, point: Point) -> &mut T {
        &mut self.values[point.row * self.size + point.col]
    }
}
