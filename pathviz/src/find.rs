use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    fmt::Display,
    str::FromStr,
    sync::{
        atomic::{self, AtomicBool},
        Arc,
    },
    thread,
    time::Duration,
};

use log::debug;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::grid::{Cell, Grid, Point};

/// Shared stop flag. The shell trips it (usually from inside the redraw callback) and the running
/// search notices it at the start of its next step.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(atomic::Ordering::SeqCst)
    }

    /// Arm the token again for the next run
    pub fn reset(&self) {
        self.0.store(false, atomic::Ordering::SeqCst);
    }
}

/// The contract every pathfinding algorithm plugs into.
///
/// A strategy explores `grid` from `start` towards `end`, marking cells `open`/`closed` as it goes
/// and calling `redraw` after every visible change. On success it marks the path found by
/// following the parent pointers from `end` back to `start` (`start` itself is not marked) and
/// returns `Ok(true)`. Running out of cells or being cancelled returns `Ok(false)`, leaving the
/// partial marks in place.
pub trait SearchStrategy {
    fn name(&self) -> &str;

    fn search(
        &mut self,
        redraw: &mut dyn FnMut(&Grid),
        grid: &mut Grid,
        start: Point,
        end: Point,
    ) -> Result<bool, SearchError>;
}

/// The algorithms the shell can pick from
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Dumb,
    Dijkstra,
    AStar,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::Dumb => "dumb",
                Algorithm::Dijkstra => "dijkstra",
                Algorithm::AStar => "astar",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dumb" => Ok(Algorithm::Dumb),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "astar" => Ok(Algorithm::AStar),
            _ => Err(SearchError::unimplemented(s)),
        }
    }
}

/// Run `strategy` after clearing the parents of any earlier run.
///
/// This is the single entry point the shell uses, so every algorithm is invoked the same way.
/// Passing `None` means no algorithm was supplied and returns `SearchError::Unimplemented`
/// without touching the grid.
pub fn run_algorithm(
    strategy: Option<&mut dyn SearchStrategy>,
    redraw: &mut dyn FnMut(&Grid),
    grid: &mut Grid,
    start: Point,
    end: Point,
) -> Result<bool, SearchError> {
    let Some(strategy) = strategy else {
        return Err(SearchError::unimplemented("none"));
    };
    check_endpoints(grid, start, end)?;
    grid.clear_parents();

    debug!(
        "running {} from ({}, {}) to ({}, {})",
        strategy.name(),
        start.row,
        start.col,
        end.row,
        end.col
    );
    let found = strategy.search(redraw, grid, start, end)?;
    debug!("{} finished, path found: {}", strategy.name(), found);

    Ok(found)
}

fn check_endpoints(grid: &Grid, start: Point, end: Point) -> Result<(), SearchError> {
    if start == end {
        return Err(SearchError::precondition("start and end are the same cell"));
    }
    for (name, point) in [("start", start), ("end", end)] {
        if !grid.is_valid(point) {
            return Err(SearchError::precondition(format!(
                "{} ({}, {}) is outside of the {}x{} grid",
                name,
                point.row,
                point.col,
                grid.size(),
                grid.size()
            )));
        }
    }
    Ok(())
}

/// Apply `mark` unless the point is one of the endpoints, which keep their own state
fn mark_unless_endpoint(
    grid: &mut Grid,
    point: Point,
    start: Point,
    end: Point,
    mark: fn(&mut Cell),
) {
    if point != start && point != end {
        mark(grid.get_mut(point));
    }
}

/// Walk the parent pointers from `end` back to `start`, marking every cell on the way except
/// `start`. Returns the number of marked cells.
fn mark_path(grid: &mut Grid, start: Point, end: Point) -> Result<usize, SearchError> {
    let limit = grid.size() * grid.size();
    let mut current = end;
    let mut length = 0;

    while current != start {
        if length >= limit {
            // a chain longer than the grid must have looped
            return Err(SearchError::BrokenParentChain { at: current });
        }
        let cell = grid.get_mut(current);
        cell.mark_path();
        length += 1;
        current = cell
            .parent()
            .ok_or(SearchError::BrokenParentChain { at: current })?;
    }

    Ok(length)
}

fn pause(pacing: Duration) {
    if !pacing.is_zero() {
        thread::sleep(pacing);
    }
}

/// Randomized depth-first walk used as a placeholder algorithm.
///
/// Neighbors are pushed in shuffled order, so it always terminates but the path it finds is
/// usually far from the shortest one.
pub struct DumbSearch<R> {
    rng: R,
    pacing: Duration,
    cancel: CancelToken,
}

impl<R: Rng> DumbSearch<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            pacing: Duration::ZERO,
            cancel: CancelToken::new(),
        }
    }

    /// Delay after every redraw so the exploration can be followed on screen
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl<R: Rng> SearchStrategy for DumbSearch<R> {
    fn name(&self) -> &str {
        "dumb search"
    }

    fn search(
        &mut self,
        redraw: &mut dyn FnMut(&Grid),
        grid: &mut Grid,
        start: Point,
        end: Point,
    ) -> Result<bool, SearchError> {
        check_endpoints(grid, start, end)?;

        let mut visited = grid.create_storage::<bool>();
        let mut stack = vec![start];
        grid.get_mut(start).set_parent(None);

        loop {
            if self.cancel.is_cancelled() {
                debug!("dumb search cancelled");
                return Ok(false);
            }

            let Some(current) = stack.pop() else {
                return Ok(false);
            };
            if visited.get(current) {
                continue;
            }
            *visited.get_mut(current) = true;

            mark_unless_endpoint(grid, current, start, end, Cell::mark_closed);
            redraw(grid);
            pause(self.pacing);

            if current == end {
                let length = mark_path(grid, start, end)?;
                debug!("dumb search found a path of length {}", length);
                redraw(grid);
                return Ok(true);
            }

            let mut neighbors: Vec<Point> = grid
                .neighbors_of(current)
                .filter(|n| !visited.get(*n))
                .collect();
            neighbors.shuffle(&mut self.rng);

            for neighbor in neighbors {
                grid.get_mut(neighbor).set_parent(Some(current));
                mark_unless_endpoint(grid, neighbor, start, end, Cell::mark_open);
                stack.push(neighbor);
            }
        }
    }
}

/// Estimate of the remaining distance used to order the frontier
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Heuristic {
    /// Plain Dijkstra
    Zero,
    /// A*, admissible on a 4-connected unit cost grid
    Manhattan,
}

impl Heuristic {
    fn estimate(&self, from: Point, to: Point) -> usize {
        match self {
            Heuristic::Zero => 0,
            Heuristic::Manhattan => from.manhattan(&to),
        }
    }
}

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit {
    priority: usize,
    cost: usize,
    point: Point,
    from: Option<Point>,
}

impl Ord for ToVisit {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse for BinaryHeap to be a min-heap, prefer the deeper entry on ties
        self.priority
            .cmp(&other.priority)
            .reverse()
            .then_with(|| self.cost.cmp(&other.cost))
    }
}

impl PartialOrd for ToVisit {
    fn partial_cmp(&self, other: &ToVisit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToVisit {
    fn eq(&self, other: &ToVisit) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToVisit {}

/// Shortest path search over the unit cost grid, Dijkstra or A* depending on the heuristic
pub struct BestFirstSearch {
    heuristic: Heuristic,
    pacing: Duration,
    cancel: CancelToken,
}

impl BestFirstSearch {
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            pacing: Duration::ZERO,
            cancel: CancelToken::new(),
        }
    }

    pub fn dijkstra() -> Self {
        Self::new(Heuristic::Zero)
    }

    pub fn astar() -> Self {
        Self::new(Heuristic::Manhattan)
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl SearchStrategy for BestFirstSearch {
    fn name(&self) -> &str {
        match self.heuristic {
            Heuristic::Zero => "dijkstra",
            Heuristic::Manhattan => "a*",
        }
    }

    fn search(
        &mut self,
        redraw: &mut dyn FnMut(&Grid),
        grid: &mut Grid,
        start: Point,
        end: Point,
    ) -> Result<bool, SearchError> {
        check_endpoints(grid, start, end)?;

        let mut visited = grid.create_storage::<bool>();
        let mut best_cost = grid.create_storage::<Option<usize>>();
        *best_cost.get_mut(start) = Some(0);

        let mut visit_list = BinaryHeap::from([ToVisit {
            priority: self.heuristic.estimate(start, end),
            cost: 0,
            point: start,
            from: None,
        }]);

        loop {
            if self.cancel.is_cancelled() {
                debug!("{} cancelled", self.name());
                return Ok(false);
            }

            let Some(visit) = visit_list.pop() else {
                return Ok(false);
            };
            if visited.get(visit.point) {
                continue;
            }
            *visited.get_mut(visit.point) = true;

            grid.get_mut(visit.point).set_parent(visit.from);
            mark_unless_endpoint(grid, visit.point, start, end, Cell::mark_closed);
            redraw(grid);
            pause(self.pacing);

            if visit.point == end {
                let length = mark_path(grid, start, end)?;
                debug!("{} found a path of length {}", self.name(), length);
                redraw(grid);
                return Ok(true);
            }

            let neighbors: Vec<Point> = grid.neighbors_of(visit.point).collect();
            for point in neighbors {
                if visited.get(point) {
                    continue;
                }
                let cost = visit.cost + 1;
                if best_cost.get(point).is_some_and(|best| best <= cost) {
                    continue;
                }
                *best_cost.get_mut(point) = Some(cost);

                mark_unless_endpoint(grid, point, start, end, Cell::mark_open);
                visit_list.push(ToVisit {
                    priority: cost + self.heuristic.estimate(point, end),
                    cost,
                    point,
                    from: Some(visit.point),
                });
            }
        }
    }
}

/// Stand-in for an algorithm that has not been written yet. Fails loudly instead of quietly
/// falling back to another search.
pub struct Unimplemented {
    algorithm: String,
}

impl Unimplemented {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
        }
    }
}

impl SearchStrategy for Unimplemented {
    fn name(&self) -> &str {
        &self.algorithm
    }

    fn search(
        &mut self,
        _redraw: &mut dyn FnMut(&Grid),
        _grid: &mut Grid,
        _start: Point,
        _end: Point,
    ) -> Result<bool, SearchError> {
        Err(SearchError::unimplemented(self.algorithm.clone()))
    }
}
