use std::{fs, path::Path, path::PathBuf, time::Duration};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::find::{Algorithm, BestFirstSearch, CancelToken, DumbSearch, SearchStrategy};

/// Settings for one visualizer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when reading older files
pub struct Config {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Pause after every search step so the animation can be followed
    pub step_delay_ms: u64,
    pub algorithm: Algorithm,
    /// Fixed seed for the maze and the dumb search, random when unset
    pub seed: Option<u64>,
    /// Cancel the search after this many redraws
    pub max_frames: Option<usize>,
    /// Where to write a PNG of the final grid
    pub snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: 40,
            step_delay_ms: 10,
            algorithm: Algorithm::default(),
            seed: None,
            max_frames: None,
            snapshot: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// The random source for this session, reproducible when a seed is configured
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Build the configured algorithm, wired to `cancel` and paced by `step_delay_ms`
    pub fn strategy(&self, cancel: CancelToken) -> Box<dyn SearchStrategy> {
        match self.algorithm {
            Algorithm::Dumb => Box::new(
                DumbSearch::new(self.rng())
                    .with_pacing(self.step_delay())
                    .with_cancel(cancel),
            ),
            Algorithm::Dijkstra => Box::new(
                BestFirstSearch::dijkstra()
                    .with_pacing(self.step_delay())
                    .with_cancel(cancel),
            ),
            Algorithm::AStar => Box::new(
                BestFirstSearch::astar()
                    .with_pacing(self.step_delay())
                    .with_cancel(cancel),
            ),
        }
    }
}
