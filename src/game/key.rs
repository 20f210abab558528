//! Compact board fingerprints used as Q-table keys.

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, COLS, ROWS};

/// Bitboard fingerprint of a position: one 42-bit mask per colour.
///
/// Bit `col * ROWS + level` is set when the disc `level` rows above the bottom
/// of `col` belongs to that colour. The player to move is implied by the disc
/// count, so it is not part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub red: u64,
    pub yellow: u64,
}

impl StateKey {
    pub fn from_board(board: &Board) -> Self {
        let mut key = StateKey { red: 0, yellow: 0 };
        for col in 0..COLS {
            for level in 0..board.height(col) {
                let bit = 1u64 << (col * ROWS + level);
                match board.get(ROWS - 1 - level, col) {
                    Cell::Red => key.red |= bit,
                    Cell::Yellow => key.yellow |= bit,
                    Cell::Empty => {}
                }
            }
        }
        key
    }

    /// The left-right reflection of this position.
    pub fn mirrored(self) -> Self {
        StateKey {
            red: mirror_mask(self.red),
            yellow: mirror_mask(self.yellow),
        }
    }

    /// Symmetry-reduced key. The flag is true when the mirror was chosen, in
    /// which case columns must be mirrored with [`mirror_column`] as well.
    pub fn canonical(self) -> (Self, bool) {
        let mirror = self.mirrored();
        if mirror < self {
            (mirror, true)
        } else {
            (self, false)
        }
    }
}

pub fn mirror_column(col: usize) -> usize {
    COLS - 1 - col
}

fn mirror_mask(mask: u64) -> u64 {
    let column_bits = (1u64 << ROWS) - 1;
    (0..COLS).fold(0, |acc, col| {
        let bits = (mask >> (col * ROWS)) & column_bits;
        acc | (bits << (mirror_column(col) * ROWS))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from_moves(moves: &[(usize, Cell)]) -> Board {
        let mut board = Board::new();
        for &(col, cell) in moves {
            board.drop_piece(col, cell).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_key_is_zero() {
        let key = StateKey::from_board(&Board::new());
        assert_eq!(key, StateKey { red: 0, yellow: 0 });
        assert_eq!(key.canonical(), (key, false));
    }

    #[test]
    fn test_distinct_positions_have_distinct_keys() {
        let a = board_from_moves(&[(0, Cell::Red), (1, Cell::Yellow)]);
        let b = board_from_moves(&[(1, Cell::Red), (0, Cell::Yellow)]);
        assert_ne!(StateKey::from_board(&a), StateKey::from_board(&b));
    }

    #[test]
    fn test_mirror_positions_share_canonical_key() {
        let left = board_from_moves(&[(0, Cell::Red), (0, Cell::Yellow), (2, Cell::Red)]);
        let right = board_from_moves(&[(6, Cell::Red), (6, Cell::Yellow), (4, Cell::Red)]);

        let (left_key, left_flip) = StateKey::from_board(&left).canonical();
        let (right_key, right_flip) = StateKey::from_board(&right).canonical();
        assert_eq!(left_key, right_key);
        assert_ne!(left_flip, right_flip);
    }

    #[test]
    fn test_mirror_is_an_involution() {
        let board = board_from_moves(&[(1, Cell::Red), (3, Cell::Yellow), (3, Cell::Red), (5, Cell::Yellow)]);
        let key = StateKey::from_board(&board);
        assert_eq!(key.mirrored().mirrored(), key);
    }

    #[test]
    fn test_mirror_column() {
        assert_eq!(mirror_column(0), 6);
        assert_eq!(mirror_column(3), 3);
        assert_eq!(mirror_column(6), 0);
    }
}
