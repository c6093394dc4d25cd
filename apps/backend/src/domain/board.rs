//! Board model and four-in-a-row detection.
//!
//! Row 0 is the top of the grid and row `ROWS - 1` the bottom; discs fall
//! towards the bottom. Cells are never cleared once filled.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::domain::DomainError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CENTER_COLUMN: usize = COLS / 2;

pub const RUN_TO_WIN: usize = 4;

/// Probe directions as (row delta, col delta): rightward, downward,
/// down-right and up-right. The order is part of the win tie-break.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// `(row, col)` position on the board.
pub type Coord = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "Y")]
    Yellow,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Yellow,
            Color::Yellow => Color::Red,
        }
    }

    /// Seat index bound to this color: Red is seat 0, Yellow seat 1.
    pub fn seat(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Yellow => 1,
        }
    }

    pub fn for_seat(seat: usize) -> Self {
        if seat == 0 {
            Color::Red
        } else {
            Color::Yellow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Red,
    Yellow,
}

impl Cell {
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Color::Red),
            Cell::Yellow => Some(Color::Yellow),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::Red => Cell::Red,
            Color::Yellow => Cell::Yellow,
        }
    }
}

impl From<Option<Color>> for Cell {
    fn from(color: Option<Color>) -> Self {
        color.map_or(Cell::Empty, Cell::from)
    }
}

// On the wire a cell is `null`, `"R"` or `"Y"`.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.color().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Color>::deserialize(deserializer).map(Cell::from)
    }
}

/// Result of evaluating the board for one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Win { cells: [Coord; RUN_TO_WIN] },
    Draw,
    Ongoing,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        matches!(self, Evaluation::Win { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    #[cfg(test)]
    pub(crate) fn from_cells(cells: [[Cell; COLS]; ROWS]) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// The cell at `(row, col)`, or `None` off the board.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row)?.get(col).copied()
    }

    /// A column has room while its top cell is empty.
    pub fn has_room(&self, column: usize) -> bool {
        column < COLS && self.cells[0][column].is_empty()
    }

    /// Columns whose top cell is empty, ascending.
    pub fn available_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| self.has_room(col)).collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| !cell.is_empty()))
    }

    /// Drop a disc into `column`, returning the row it landed in.
    pub fn place(&mut self, column: usize, color: Color) -> Result<usize, DomainError> {
        if column >= COLS {
            return Err(DomainError::ColumnOutOfRange { column });
        }
        let row = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][column].is_empty())
            .ok_or(DomainError::ColumnFull { column })?;
        self.cells[row][column] = Cell::from(color);
        Ok(row)
    }

    /// Evaluate the board from `color`'s point of view.
    ///
    /// Cells are scanned row-major and each probes the four directions in
    /// `DIRECTIONS` order; the first run of four is reported. With several
    /// simultaneous lines this fixed order decides which one wins.
    pub fn evaluate(&self, color: Color) -> Evaluation {
        let target = Cell::from(color);
        for row in 0..ROWS {
            for col in 0..COLS {
                if self.cells[row][col] != target {
                    continue;
                }
                for (dr, dc) in DIRECTIONS {
                    if let Some(cells) = self.run_from((row, col), (dr, dc), target) {
                        return Evaluation::Win { cells };
                    }
                }
            }
        }

        if self.is_full() {
            Evaluation::Draw
        } else {
            Evaluation::Ongoing
        }
    }

    fn run_from(
        &self,
        origin: Coord,
        (dr, dc): (isize, isize),
        target: Cell,
    ) -> Option<[Coord; RUN_TO_WIN]> {
        let mut run = [origin; RUN_TO_WIN];
        for (step, slot) in run.iter_mut().enumerate().skip(1) {
            let row = origin.0.checked_add_signed(dr * step as isize)?;
            let col = origin.1.checked_add_signed(dc * step as isize)?;
            if row >= ROWS || col >= COLS || self.cells[row][col] != target {
                return None;
            }
            *slot = (row, col);
        }
        Some(run)
    }
}

/// Fresh all-empty grid for a new match.
pub fn empty_board() -> Board {
    Board::empty()
}
