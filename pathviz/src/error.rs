//! Error types for the grid, search and configuration layers.

use std::path::PathBuf;

use crate::grid::Point;

/// Errors raised while building or editing a [`Grid`](crate::grid::Grid).
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A grid must have at least one row and one column.
    #[error("invalid grid size {size}, the grid needs at least one cell per side")]
    InvalidSize { size: usize },

    #[error("point ({}, {}) is outside of a {size}x{size} grid", .point.row, .point.col)]
    OutOfBounds { point: Point, size: usize },

    /// Grids are square, so imported images have to be square as well.
    #[error("image is {width}x{height} but the grid has to be square")]
    NotSquare { width: u32, height: u32 },

    #[error("a {size}x{size} grid at {cell_px} pixels per cell does not fit into an image")]
    ImageTooLarge { size: usize, cell_px: u32 },
}

/// Errors raised by a [`SearchStrategy`](crate::find::SearchStrategy).
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No algorithm was supplied for the requested slot.
    #[error("the {algorithm} algorithm has not been implemented yet")]
    Unimplemented { algorithm: String },

    /// The caller broke the search contract (`start == end`, points outside the grid, ...).
    #[error("search precondition violated: {0}")]
    Precondition(String),

    /// Walking the parent chain from the goal reached a cell with no parent.
    #[error("backtracking reached ({}, {}) which has no parent", .at.row, .at.col)]
    BrokenParentChain { at: Point },
}

impl SearchError {
    pub fn unimplemented(algorithm: impl Into<String>) -> Self {
        Self::Unimplemented {
            algorithm: algorithm.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}

/// Errors raised while loading a [`Config`](crate::config::Config).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
