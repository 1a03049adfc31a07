use crate::entity::Position;

/// Side length of one grid cell, in pixels.
pub const UNIT_SIZE: i32 = 25;

/// Number of segments the snake has after `start`.
pub const INITIAL_BODY_PARTS: usize = 6;

/// Sub-ticks per grid step at the start of a game. Lower means faster snake.
pub const UPDATE_RATE: u32 = 10;

/// The fastest the snake can get: one grid step per sub-tick.
pub const MIN_UPDATE_RATE: u32 = 1;

/// Every this many apples the snake speeds up by one sub-tick.
pub const APPLES_PER_SPEEDUP: u32 = 5;

/// Rate at which shells call `Game::tick`.
pub const FPS: u32 = 60;

/// Pixel coordinates of the head when a game starts.
pub const START_PIXEL: (i32, i32) = (50, 50);

/// Dimensions of the playable grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    width: i32,
    height: i32,
}

impl GridConfig {
    /// Grids are at least one cell in each dimension.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Derive the grid from a playable area measured in pixels.
    /// Partial cells at the right and bottom edges are not playable.
    pub fn from_pixels(width_px: i32, height_px: i32, unit: i32) -> Self {
        let unit = unit.max(1);
        Self::new(width_px / unit, height_px / unit)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }
}

/// Grid cell holding the given pixel coordinate.
pub fn pixel_to_cell(px: i32, py: i32, unit: i32) -> Position {
    let unit = unit.max(1);
    Position::new(px.div_euclid(unit), py.div_euclid(unit))
}
