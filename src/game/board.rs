use std::fmt;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Line directions checked for four in a row: horizontal, vertical, and both diagonals.
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

impl Cell {
    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Red => 'R',
            Cell::Yellow => 'Y',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
}

/// 6x7 grid. Row 0 is the top, row 5 the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
    heights: [u8; COLS],
    discs: u8,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
            heights: [0; COLS],
            discs: 0,
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Number of discs stacked in `col`.
    pub fn height(&self, col: usize) -> usize {
        self.heights[col] as usize
    }

    /// Total discs on the board, equal to the number of moves played.
    pub fn disc_count(&self) -> usize {
        self.discs as usize
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cell)
            .count()
    }

    pub fn is_column_full(&self, col: usize) -> bool {
        col >= COLS || self.heights[col] as usize == ROWS
    }

    pub fn is_full(&self) -> bool {
        self.discs as usize == ROWS * COLS
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn);
        }
        if self.is_column_full(col) {
            return Err(MoveError::ColumnFull);
        }

        let row = ROWS - 1 - self.heights[col] as usize;
        self.cells[row][col] = cell;
        self.heights[col] += 1;
        self.discs += 1;
        Ok(row)
    }

    /// Place a disc at an exact position without gravity. Used when rebuilding
    /// a board from an external grid; callers validate the result.
    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let previous = self.cells[row][col];
        if previous == cell {
            return;
        }
        self.cells[row][col] = cell;
        match (previous, cell) {
            (Cell::Empty, _) => self.discs += 1,
            (_, Cell::Empty) => self.discs -= 1,
            _ => {}
        }
        self.heights[col] = (0..ROWS)
            .find(|&r| self.cells[r][col] != Cell::Empty)
            .map_or(0, |top| (ROWS - top) as u8);
    }

    /// Check if the disc at (row, col) is part of four in a row.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(row, col, dr, dc, cell) + self.run_length(row, col, -dr, -dc, cell)
                >= 4
        })
    }

    /// True if `cell` has four in a row anywhere on the board.
    pub fn has_connect_four(&self, cell: Cell) -> bool {
        (0..ROWS).any(|row| (0..COLS).any(|col| self.cells[row][col] == cell && self.check_win(row, col)))
    }

    /// Consecutive discs equal to `cell` starting next to (row, col) along (dr, dc).
    fn run_length(&self, row: usize, col: usize, dr: i32, dc: i32, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as i32 + dr;
        let mut c = col as i32 + dc;
        while (0..ROWS as i32).contains(&r)
            && (0..COLS as i32).contains(&c)
            && self.cells[r as usize][c as usize] == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        write!(f, "0123456")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.disc_count(), 0);
        for col in 0..COLS {
            assert_eq!(board.height(col), 0);
            for row in 0..ROWS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
    }

    #[test]
    fn test_drop_piece_stacks() {
        let mut board = Board::new();

        assert_eq!(board.drop_piece(3, Cell::Red).unwrap(), 5);
        assert_eq!(board.drop_piece(3, Cell::Yellow).unwrap(), 4);
        assert_eq!(board.get(5, 3), Cell::Red);
        assert_eq!(board.get(4, 3), Cell::Yellow);
        assert_eq!(board.height(3), 2);
        assert_eq!(board.disc_count(), 2);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new();
        for _ in 0..ROWS {
            board.drop_piece(0, Cell::Red).unwrap();
        }

        assert!(board.is_column_full(0));
        assert_eq!(board.drop_piece(0, Cell::Yellow), Err(MoveError::ColumnFull));
        assert_eq!(board.height(0), ROWS);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new();
        assert_eq!(board.drop_piece(7, Cell::Red), Err(MoveError::InvalidColumn));
        assert!(board.is_column_full(7));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop_piece(col, Cell::Red).unwrap();
            }
        }
        assert!(board.is_full());
        assert_eq!(board.disc_count(), ROWS * COLS);
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new();
        for col in 0..4 {
            board.drop_piece(col, Cell::Red).unwrap();
        }
        assert!(board.check_win(5, 2));
        assert!(board.has_connect_four(Cell::Red));
        assert!(!board.has_connect_four(Cell::Yellow));
    }

    #[test]
    fn test_vertical_win() {
        let mut board = Board::new();
        for _ in 0..4 {
            board.drop_piece(3, Cell::Yellow).unwrap();
        }
        assert!(board.check_win(2, 3));
    }

    #[test]
    fn test_diagonal_wins() {
        // "/" diagonal ending at column 3
        let mut board = Board::new();
        board.drop_piece(0, Cell::Red).unwrap();
        board.drop_piece(1, Cell::Yellow).unwrap();
        board.drop_piece(1, Cell::Red).unwrap();
        for _ in 0..2 {
            board.drop_piece(2, Cell::Yellow).unwrap();
        }
        board.drop_piece(2, Cell::Red).unwrap();
        for _ in 0..3 {
            board.drop_piece(3, Cell::Yellow).unwrap();
        }
        let row = board.drop_piece(3, Cell::Red).unwrap();
        assert!(board.check_win(row, 3));

        // "\" diagonal mirrored
        let mut board = Board::new();
        board.drop_piece(6, Cell::Red).unwrap();
        board.drop_piece(5, Cell::Yellow).unwrap();
        board.drop_piece(5, Cell::Red).unwrap();
        for _ in 0..2 {
            board.drop_piece(4, Cell::Yellow).unwrap();
        }
        board.drop_piece(4, Cell::Red).unwrap();
        for _ in 0..3 {
            board.drop_piece(3, Cell::Yellow).unwrap();
        }
        let row = board.drop_piece(3, Cell::Red).unwrap();
        assert!(board.check_win(row, 3));
    }

    #[test]
    fn test_no_win_with_three() {
        let mut board = Board::new();
        for col in 0..3 {
            board.drop_piece(col, Cell::Red).unwrap();
        }
        assert!(!board.check_win(5, 1));
    }

    #[test]
    fn test_set_tracks_heights_and_discs() {
        let mut board = Board::new();
        board.set(5, 2, Cell::Red);
        board.set(4, 2, Cell::Yellow);
        assert_eq!(board.height(2), 2);
        assert_eq!(board.disc_count(), 2);

        board.set(4, 2, Cell::Empty);
        assert_eq!(board.height(2), 1);
        assert_eq!(board.disc_count(), 1);
    }

    #[test]
    fn test_display_renders_grid() {
        let mut board = Board::new();
        board.drop_piece(0, Cell::Red).unwrap();
        board.drop_piece(6, Cell::Yellow).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), ROWS + 1);
        assert_eq!(lines[5], "R.....Y");
        assert_eq!(lines[6], "0123456");
    }
}
