use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use crate::error::GridError;
use crate::find::Algorithm;
use crate::grid::{CellState, Grid, Point};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GREY: Rgb<u8> = Rgb([128, 128, 128]);
const PURPLE: Rgb<u8> = Rgb([128, 0, 128]);
const ORANGE: Rgb<u8> = Rgb([255, 165, 0]);

/// Colors used to draw each cell state. Passed to rendering explicitly, there is no global theme.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Theme {
    pub empty: Rgb<u8>,
    pub obstacle: Rgb<u8>,
    pub start: Rgb<u8>,
    pub end: Rgb<u8>,
    pub open: Rgb<u8>,
    pub closed: Rgb<u8>,
    pub path: Rgb<u8>,
    pub grid_lines: Rgb<u8>,
}

impl Theme {
    pub const DEFAULT: Theme = Theme {
        empty: WHITE,
        obstacle: BLACK,
        start: PURPLE,
        end: ORANGE,
        open: Rgb([0, 255, 0]),
        closed: Rgb([255, 0, 0]),
        path: Rgb([0, 0, 255]),
        grid_lines: GREY,
    };

    pub const ASTAR: Theme = Theme {
        open: Rgb([0, 200, 200]),
        closed: Rgb([150, 0, 200]),
        path: Rgb([0, 120, 255]),
        ..Theme::DEFAULT
    };

    pub const DIJKSTRA: Theme = Theme {
        open: Rgb([0, 180, 0]),
        closed: Rgb([200, 80, 80]),
        path: Rgb([255, 140, 0]),
        ..Theme::DEFAULT
    };

    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Dumb => Theme::DEFAULT,
            Algorithm::Dijkstra => Theme::DIJKSTRA,
            Algorithm::AStar => Theme::ASTAR,
        }
    }

    pub fn color(&self, state: CellState) -> Rgb<u8> {
        match state {
            CellState::Empty => self.empty,
            CellState::Obstacle => self.obstacle,
            CellState::Start => self.start,
            CellState::End => self.end,
            CellState::Open => self.open,
            CellState::Closed => self.closed,
            CellState::Path => self.path,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::DEFAULT
    }
}

/// Rasterize the grid with `cell_px` pixels per cell side. Grid lines are drawn once cells are at
/// least 4 pixels wide.
pub fn render_image(grid: &Grid, theme: &Theme, cell_px: u32) -> Result<RgbImage, GridError> {
    let cell_px = cell_px.max(1);
    let width = u32::try_from(grid.size())
        .ok()
        .and_then(|size| size.checked_mul(cell_px))
        .ok_or(GridError::ImageTooLarge {
            size: grid.size(),
            cell_px,
        })?;
    let draw_lines = cell_px >= 4;

    Ok(RgbImage::from_fn(width, width, |x, y| {
        if draw_lines && (x % cell_px == 0 || y % cell_px == 0) {
            return theme.grid_lines;
        }
        let point = Point {
            row: (y / cell_px) as usize,
            col: (x / cell_px) as usize,
        };
        theme.color(grid.get(point).state())
    }))
}

/// Build a grid from a square black and white image, dark pixels become obstacles
pub fn grid_from_image(img: &DynamicImage) -> Result<Grid, GridError> {
    let (width, height) = img.dimensions();
    if width != height {
        return Err(GridError::NotSquare { width, height });
    }

    let mut grid = Grid::new(width as usize)?;

    for row in 0..height {
        for col in 0..width {
            let p = img.get_pixel(col, row);

            if p.0[0] < 128 {
                grid.get_mut(Point {
                    row: row as usize,
                    col: col as usize,
                })
                .mark_obstacle();
            }
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod test {
    use image::{GrayImage, Luma};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::maze::generate_maze;

    #[test]
    fn test_theme_per_algorithm() {
        assert_eq!(Theme::for_algorithm(Algorithm::Dumb), Theme::default());
        assert_eq!(
            Theme::for_algorithm(Algorithm::AStar).color(CellState::Open),
            Rgb([0, 200, 200])
        );
        assert_eq!(
            Theme::for_algorithm(Algorithm::Dijkstra).color(CellState::Path),
            Rgb([255, 140, 0])
        );
        // shared colors stay the same across themes
        assert_eq!(Theme::ASTAR.obstacle, Theme::DIJKSTRA.obstacle);
        assert_eq!(Theme::ASTAR.start, PURPLE);
    }

    #[test]
    fn test_render_image() {
        let mut grid = Grid::new(3).unwrap();
        grid.get_mut(Point::new(0, 0)).mark_start();
        grid.get_mut(Point::new(1, 2)).mark_obstacle();
        grid.get_mut(Point::new(2, 1)).mark_closed();

        let img = render_image(&grid, &Theme::DEFAULT, 10).unwrap();
        assert_eq!(img.dimensions(), (30, 30));

        // cell centers
        assert_eq!(*img.get_pixel(5, 5), PURPLE);
        assert_eq!(*img.get_pixel(25, 15), BLACK);
        assert_eq!(*img.get_pixel(15, 25), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(15, 15), WHITE);
        // grid lines
        assert_eq!(*img.get_pixel(10, 3), GREY);
        assert_eq!(*img.get_pixel(3, 20), GREY);
    }

    #[test]
    fn test_render_image_too_large() {
        let grid = Grid::new(2).unwrap();

        assert!(matches!(
            render_image(&grid, &Theme::DEFAULT, u32::MAX),
            Err(GridError::ImageTooLarge {
                size: 2,
                cell_px: u32::MAX
            })
        ));
    }

    #[test]
    fn test_grid_from_image() {
        let img = GrayImage::from_fn(4, 4, |x, y| if x == y { Luma([0]) } else { Luma([255]) });
        let grid = grid_from_image(&DynamicImage::ImageLuma8(img)).unwrap();

        assert_eq!(grid.size(), 4);
        for cell in grid.cells() {
            assert_eq!(cell.is_obstacle(), cell.row() == cell.col());
        }
    }

    #[test]
    fn test_grid_from_image_not_square() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(4, 3));
        assert!(matches!(
            grid_from_image(&img),
            Err(GridError::NotSquare {
                width: 4,
                height: 3
            })
        ));

        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            grid_from_image(&img),
            Err(GridError::InvalidSize { size: 0 })
        ));
    }

    #[test]
    fn test_rendered_maze_imports_with_same_walls() {
        let mut grid = Grid::new(11).unwrap();
        generate_maze(&mut grid, &mut ChaCha8Rng::seed_from_u64(8));

        let img = render_image(&grid, &Theme::DEFAULT, 1).unwrap();
        let imported = grid_from_image(&DynamicImage::ImageRgb8(img)).unwrap();

        assert_eq!(imported.to_string(), grid.to_string());
    }
}
