//! Grid pathfinding visualizer core: the grid model, pluggable search strategies that animate their
//! progress through a redraw callback, and a maze generator.

pub mod config;
pub mod error;
pub mod find;
pub mod grid;
pub mod maze;
pub mod util;

pub use config::Config;
pub use error::{ConfigError, GridError, SearchError};
pub use find::{
    run_algorithm, Algorithm, BestFirstSearch, CancelToken, DumbSearch, SearchStrategy,
    Unimplemented,
};
pub use grid::{Brush, Cell, CellState, Grid, Point};
pub use maze::generate_maze;
