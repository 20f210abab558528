//! Core Connect Four game logic: board, players, immutable state transitions,
//! and the position fingerprints used by the Q-table.

mod board;
mod key;
mod player;
mod state;

pub use board::{Board, Cell, COLS, ROWS};
pub use key::{mirror_column, StateKey};
pub use player::Player;
pub use state::{GameOutcome, GameState, MoveError};

/// Legal columns of a position, in ascending order.
pub type LegalActions = Vec<usize>;
