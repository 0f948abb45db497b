use std::io::Write;

use anyhow::{bail, Context};
use log::{info, warn};
use pathviz::{
    generate_maze, run_algorithm,
    util::{render_image, Theme},
    CancelToken, Config, Grid, Point,
};

const SNAPSHOT_CELL_PX: u32 = 20;

/// Start in the seed room of the maze and end in the room furthest away from it
fn endpoints(size: usize) -> Result<(Point, Point), anyhow::Error> {
    if size < 4 {
        bail!("grid_size must be at least 4 to fit both start and end into a maze");
    }
    let last_room = if (size - 1) % 2 == 1 { size - 1 } else { size - 2 };

    Ok((Point::new(1, 1), Point::new(last_room, last_room)))
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let mut grid = Grid::new(config.grid_size)?;
    generate_maze(&mut grid, &mut config.rng());

    let (start, end) = endpoints(grid.size())?;
    grid.get_mut(start).mark_start();
    grid.get_mut(end).mark_end();

    let cancel = CancelToken::new();
    let mut strategy = config.strategy(cancel.clone());

    let mut frames = 0;
    let mut redraw = |grid: &Grid| {
        frames += 1;
        // move the cursor home and clear so every frame overwrites the last one
        print!("\x1b[H\x1b[2J{}", grid);
        if let Err(err) = std::io::stdout().flush() {
            warn!("failed to flush frame {}: {}", frames, err);
        }

        if config.max_frames.is_some_and(|max| frames >= max) {
            cancel.cancel();
        }
    };

    info!("running {} on a {}x{} maze", config.algorithm, grid.size(), grid.size());
    let found = run_algorithm(Some(strategy.as_mut()), &mut redraw, &mut grid, start, end)?;

    if cancel.is_cancelled() {
        warn!("search cancelled after {} frames", frames);
    } else if found {
        let length = grid.cells().filter(|c| c.is_path()).count();
        info!("path found after {} frames, length {}", frames, length);
    } else {
        info!("no path found after {} frames", frames);
    }

    if let Some(path) = &config.snapshot {
        render_image(&grid, &Theme::for_algorithm(config.algorithm), SNAPSHOT_CELL_PX)?
            .save(path)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!("wrote snapshot to {}", path.display());
    }

    Ok(())
}
