use super::board::{self, Board, Cell, COLS, ROWS};
use super::{LegalActions, Player, StateKey};
use crate::error::GridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

impl GameOutcome {
    /// Final return for `player`: +1 win, 0 draw, -1 loss.
    pub fn reward_for(self, player: Player) -> f64 {
        match self {
            GameOutcome::Winner(winner) if winner == player => 1.0,
            GameOutcome::Winner(_) => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
    GameOver,
}

impl From<board::MoveError> for MoveError {
    fn from(e: board::MoveError) -> Self {
        match e {
            board::MoveError::ColumnFull => MoveError::ColumnFull,
            board::MoveError::InvalidColumn => MoveError::InvalidColumn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create initial game state
    pub fn initial() -> Self {
        GameState {
            board: Board::new(),
            current_player: Player::Red, // Red starts
            outcome: None,
        }
    }

    /// Rebuild a state from a 6x7 grid of {-1, 0, 1} (row 0 is the top,
    /// red = -1). The player to move is red when both colours have the same
    /// number of discs.
    pub fn from_grid(grid: &[[i8; COLS]; ROWS]) -> Result<Self, GridError> {
        let mut board = Board::new();
        for (row, cells) in grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                let cell = match value {
                    0 => Cell::Empty,
                    v => Player::from_sign(v)
                        .ok_or(GridError::InvalidCell { row, col, value })?
                        .to_cell(),
                };
                board.set(row, col, cell);
            }
        }

        for col in 0..COLS {
            // height() counts from the topmost disc, so any gap below it is a hole
            let top = ROWS - board.height(col);
            if let Some(row) = (top..ROWS).find(|&r| board.get(r, col) == Cell::Empty) {
                return Err(GridError::FloatingDisc { row, col });
            }
        }

        let red = board.count(Cell::Red);
        let yellow = board.count(Cell::Yellow);
        if red != yellow && red != yellow + 1 {
            return Err(GridError::InvalidCounts { red, yellow });
        }

        let red_won = board.has_connect_four(Cell::Red);
        let yellow_won = board.has_connect_four(Cell::Yellow);
        let outcome = match (red_won, yellow_won) {
            (true, true) => return Err(GridError::BothConnected),
            (true, false) if red == yellow + 1 => Some(GameOutcome::Winner(Player::Red)),
            (false, true) if red == yellow => Some(GameOutcome::Winner(Player::Yellow)),
            (true, false) | (false, true) => return Err(GridError::InvalidCounts { red, yellow }),
            (false, false) if board.is_full() => Some(GameOutcome::Draw),
            (false, false) => None,
        };

        let current_player = if red == yellow { Player::Red } else { Player::Yellow };
        Ok(GameState {
            board,
            current_player,
            outcome,
        })
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Number of moves played so far.
    pub fn move_count(&self) -> usize {
        self.board.disc_count()
    }

    /// Fingerprint of the position (not symmetry reduced).
    pub fn key(&self) -> StateKey {
        StateKey::from_board(&self.board)
    }

    /// Legal columns in ascending order; empty once the game is over.
    pub fn legal_actions(&self) -> LegalActions {
        if self.is_terminal() {
            return LegalActions::new();
        }

        (0..COLS)
            .filter(|&col| !self.board.is_column_full(col))
            .collect()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        let mut next = *self;
        next.apply_move_mut(column)?;
        Ok(next)
    }

    /// Apply a move in place. Used by playouts to avoid copying per ply.
    pub fn apply_move_mut(&mut self, column: usize) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let row = self
            .board
            .drop_piece(column, self.current_player.to_cell())?;

        if self.board.check_win(row, column) {
            self.outcome = Some(GameOutcome::Winner(self.current_player));
        } else if self.board.is_full() {
            self.outcome = Some(GameOutcome::Draw);
        }

        self.current_player = self.current_player.other();
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[usize]) -> GameState {
        moves
            .iter()
            .fold(GameState::initial(), |s, &col| s.apply_move(col).unwrap())
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::initial();
        assert_eq!(state.current_player(), Player::Red);
        assert!(!state.is_terminal());
        assert_eq!(state.legal_actions().len(), 7);
        assert_eq!(state.move_count(), 0);
    }

    #[test]
    fn test_apply_move_is_immutable() {
        let state = GameState::initial();
        let next = state.apply_move(3).unwrap();

        assert_eq!(state.board().get(5, 3), Cell::Empty);
        assert_eq!(next.current_player(), Player::Yellow);
        assert_eq!(next.board().get(5, 3), Cell::Red);
        assert_eq!(next.move_count(), 1);
    }

    #[test]
    fn test_win_detection() {
        // Red: 0,1,2,3 on the bottom row; Yellow stacks on top.
        let state = play(&[0, 0, 1, 1, 2, 2, 3]);
        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Player::Red)));
        assert!(state.legal_actions().is_empty());
        assert_eq!(state.apply_move(4), Err(MoveError::GameOver));
    }

    #[test]
    fn test_full_column_rejected() {
        let state = play(&[0, 0, 0, 0, 0, 0]);
        assert_eq!(state.apply_move(0), Err(MoveError::ColumnFull));
        assert_eq!(state.apply_move(9), Err(MoveError::InvalidColumn));
        assert!(!state.legal_actions().contains(&0));
    }

    #[test]
    fn test_draw() {
        // Columns filled in pairs of three with a shifted order never connect four.
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2, 4, 5, 4,
            5, 4, 5, 5, 4, 5, 4, 5, 4, 6, 6, 6, 6, 6, 6];
        let state = play(&order);
        assert_eq!(state.move_count(), 42);
        assert_eq!(state.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_reward_for() {
        let outcome = GameOutcome::Winner(Player::Yellow);
        assert_eq!(outcome.reward_for(Player::Yellow), 1.0);
        assert_eq!(outcome.reward_for(Player::Red), -1.0);
        assert_eq!(GameOutcome::Draw.reward_for(Player::Red), 0.0);
    }

    #[test]
    fn test_from_grid_matches_played_state() {
        let played = play(&[3, 3, 4]);
        let mut grid = [[0i8; COLS]; ROWS];
        grid[5][3] = -1;
        grid[4][3] = 1;
        grid[5][4] = -1;

        let rebuilt = GameState::from_grid(&grid).unwrap();
        assert_eq!(rebuilt, played);
        assert_eq!(rebuilt.current_player(), Player::Yellow);
    }

    #[test]
    fn test_from_grid_detects_winner() {
        let mut grid = [[0i8; COLS]; ROWS];
        for col in 0..4 {
            grid[5][col] = -1;
        }
        for col in 0..3 {
            grid[4][col] = 1;
        }
        let state = GameState::from_grid(&grid).unwrap();
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Player::Red)));
    }

    #[test]
    fn test_from_grid_rejects_invalid_grids() {
        let mut bad_value = [[0i8; COLS]; ROWS];
        bad_value[5][0] = 2;
        assert!(matches!(
            GameState::from_grid(&bad_value),
            Err(GridError::InvalidCell { row: 5, col: 0, value: 2 })
        ));

        let mut floating = [[0i8; COLS]; ROWS];
        floating[3][2] = -1;
        assert!(matches!(
            GameState::from_grid(&floating),
            Err(GridError::FloatingDisc { col: 2, .. })
        ));

        let mut counts = [[0i8; COLS]; ROWS];
        counts[5][0] = 1;
        assert!(matches!(
            GameState::from_grid(&counts),
            Err(GridError::InvalidCounts { red: 0, yellow: 1 })
        ));
    }
}
