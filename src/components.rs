#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since board dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow sign loss when going from signed to unsigned types since we validate values are non-negative before casting
    clippy::cast_sign_loss,
    // Allow potential wrapping when casting between types of same size as we validate values are in range
    clippy::cast_possible_wrap,
    // Allow more than 3 bools in structs for input handling where bools represent distinct flags
    clippy::struct_excessive_bools
)]

use bevy_ecs::prelude::*;
use ratatui::style::Color;

use crate::game::{
    BOARD_WIDTH, INITIAL_DROP_INTERVAL_MS, POINTS_PER_LINE, STARTING_LEVEL,
    drop_interval_for_level, level_for_lines,
};

/// Lifecycle shared by both games: `Idle -> Running -> Terminal`.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Terminal,
}

impl RunPhase {
    #[must_use]
    pub fn is_running(self) -> bool {
        self == RunPhase::Running
    }

    #[must_use]
    pub fn is_game_over(self) -> bool {
        self == RunPhase::Terminal
    }
}

/// Seedable random source, so spawn sequences can be replayed in tests.
#[derive(Resource, Debug)]
pub struct GameRng(pub fastrand::Rng);

impl GameRng {
    #[must_use]
    pub fn new() -> Self {
        Self(fastrand::Rng::new())
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceType {
    /// All piece types in id order (1..=7).
    pub const ALL: [PieceType; 7] = [
        PieceType::I,
        PieceType::O,
        PieceType::T,
        PieceType::S,
        PieceType::Z,
        PieceType::J,
        PieceType::L,
    ];

    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::ALL[rng.usize(0..Self::ALL.len())]
    }

    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            PieceType::I => 1,
            PieceType::O => 2,
            PieceType::T => 3,
            PieceType::S => 4,
            PieceType::Z => 5,
            PieceType::J => 6,
            PieceType::L => 7,
        }
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        let index = usize::from(id).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    /// Spawn orientation of the piece.
    #[must_use]
    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceType::I => &[&[1, 1, 1, 1]],
            PieceType::O => &[&[1, 1], &[1, 1]],
            PieceType::T => &[&[0, 1, 0], &[1, 1, 1]],
            PieceType::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceType::Z => &[&[1, 1, 0], &[0, 1, 1]],
            PieceType::J => &[&[1, 0, 0], &[1, 1, 1]],
            PieceType::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        Shape::from_rows(rows)
    }

    #[must_use]
    pub fn get_color(self) -> Color {
        match self {
            PieceType::I => Color::Rgb(0xFF, 0x0D, 0x72),
            PieceType::O => Color::Rgb(0x0D, 0xC2, 0xFF),
            PieceType::T => Color::Rgb(0x0D, 0xFF, 0x72),
            PieceType::S => Color::Rgb(0xF5, 0x38, 0xFF),
            PieceType::Z => Color::Rgb(0xFF, 0x8E, 0x0D),
            PieceType::J => Color::Rgb(0xFF, 0xE1, 0x38),
            PieceType::L => Color::Rgb(0x38, 0x77, 0xFF),
        }
    }
}

/// Occupancy matrix of a piece, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    #[must_use]
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.iter().map(|&cell| cell != 0).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_filled(&self, col: usize, row: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Offsets `(col, row)` of every occupied cell.
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(col, _)| (col as i32, row as i32))
        })
    }

    /// Quarter turn clockwise: destination row = source column,
    /// destination column = source row counted from the bottom.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Shape {
        let height = self.height();
        let cells = (0..self.width())
            .map(|col| (0..height).rev().map(|row| self.cells[row][col]).collect())
            .collect();
        Shape { cells }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub piece_type: PieceType,
    pub shape: Shape,
    pub position: Position,
}

impl Piece {
    /// A piece in spawn orientation, horizontally centred on row 0.
    #[must_use]
    pub fn new(piece_type: PieceType) -> Self {
        let shape = piece_type.shape();
        let x = (BOARD_WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            piece_type,
            shape,
            position: Position { x, y: 0 },
        }
    }

    /// Board coordinates `(col, row)` covered by the piece.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let Position { x, y } = self.position;
        self.shape.blocks().map(move |(dx, dy)| (x + dx, y + dy))
    }
}

/// The falling piece and the queued one.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActivePieces {
    pub current: Option<Piece>,
    pub next: Option<Piece>,
}

#[derive(Resource, Debug, Clone)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    /// Row-major, row 0 at the top.
    pub cells: Vec<Vec<Option<PieceType>>>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![None; width]; height],
        }
    }

    #[must_use]
    pub fn get(&self, col: usize, row: usize) -> Option<PieceType> {
        self.cells.get(row).and_then(|cells| cells.get(col)).copied().flatten()
    }

    /// True when `shape` placed with its origin at `(x, y)` leaves the board
    /// sideways or through the floor, or overlaps a locked cell. Cells above
    /// the top edge only fail the side and floor checks.
    #[must_use]
    pub fn collides(&self, shape: &Shape, x: i32, y: i32) -> bool {
        for (dx, dy) in shape.blocks() {
            let col = x + dx;
            let row = y + dy;

            if col < 0 || col >= self.width as i32 || row >= self.height as i32 {
                return true;
            }

            if row >= 0 && self.cells[row as usize][col as usize].is_some() {
                return true;
            }
        }
        false
    }

    pub fn lock_piece(&mut self, piece: &Piece) {
        for (col, row) in piece.cells() {
            if row >= 0 && (row as usize) < self.height && col >= 0 && (col as usize) < self.width
            {
                self.cells[row as usize][col as usize] = Some(piece.piece_type);
            }
        }
    }

    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|cells| cells.iter().all(Option::is_some))
    }

    /// Removes every full row, scanning from the bottom. After a removal the
    /// same index is examined again since the rows above have shifted down.
    /// Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = self.height;

        while row > 0 {
            let index = row - 1;
            if self.is_row_full(index) {
                self.cells.remove(index);
                self.cells.insert(0, vec![None; self.width]);
                cleared += 1;
            } else {
                row -= 1;
            }
        }

        cleared
    }

    /// Row contents as piece ids, 0 for empty cells.
    #[must_use]
    pub fn row_ids(&self, row: usize) -> Vec<u8> {
        self.cells.get(row).map_or_else(Vec::new, |cells| {
            cells
                .iter()
                .map(|cell| cell.map_or(0, PieceType::id))
                .collect()
        })
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_some()).count())
            .sum()
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameStats {
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    /// Milliseconds between automatic drops.
    pub drop_interval: f64,
    /// Milliseconds accumulated since the last drop.
    pub drop_counter: f64,
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            score: 0,
            level: STARTING_LEVEL,
            lines_cleared: 0,
            drop_interval: INITIAL_DROP_INTERVAL_MS,
            drop_counter: 0.0,
        }
    }
}

impl GameStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies the result of one line-clear scan and returns the points
    /// awarded. Points use the level in effect before the clear.
    pub fn apply_line_clear(&mut self, lines: usize) -> u32 {
        if lines == 0 {
            return 0;
        }

        let lines = u32::try_from(lines).unwrap_or(u32::MAX);
        let points = POINTS_PER_LINE * lines * self.level;

        self.lines_cleared += lines;
        self.score += points;
        self.level = level_for_lines(self.lines_cleared);
        self.drop_interval = drop_interval_for_level(self.level);

        points
    }
}

// Input state for keyboard and touch-style controls
#[derive(Resource, Debug, Clone, Default)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub rotate: bool,
}

impl Input {
    #[must_use]
    pub fn any(&self) -> bool {
        self.left || self.right || self.down || self.rotate
    }
}
