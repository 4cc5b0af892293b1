#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

// Puzzle board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

// Game timing (milliseconds)
pub const INITIAL_DROP_INTERVAL_MS: f64 = 1000.0;
pub const MIN_DROP_INTERVAL_MS: f64 = 100.0;
pub const DROP_INTERVAL_STEP_MS: f64 = 100.0;

// Scoring: points per cleared line, multiplied by the level at the time of the clear
pub const POINTS_PER_LINE: u32 = 100;

// Level progression
pub const LINES_PER_LEVEL: u32 = 10;
pub const STARTING_LEVEL: u32 = 1;

// Size of the next-piece preview box, in cells
pub const PREVIEW_SIZE: usize = 4;

/// Drop interval for a level: `max(100, 1000 - (level - 1) * 100)` milliseconds.
#[must_use]
pub fn drop_interval_for_level(level: u32) -> f64 {
    let steps = f64::from(level.saturating_sub(STARTING_LEVEL));
    (INITIAL_DROP_INTERVAL_MS - steps * DROP_INTERVAL_STEP_MS).max(MIN_DROP_INTERVAL_MS)
}

/// Level reached after clearing `total_lines` lines in total.
#[must_use]
pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + STARTING_LEVEL
}

/// Offset in cells (may be a half cell) that centres a shape of
/// `width` x `height` inside the preview box.
#[must_use]
pub fn preview_offset(width: usize, height: usize) -> (f64, f64) {
    let free = |extent: usize| PREVIEW_SIZE.saturating_sub(extent) as f64 / 2.0;
    (free(width), free(height))
}
