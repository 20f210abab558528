use crate::error::PersistenceError;
use crate::game::{GameState, Player};

/// One move of a finished game, labelled with the mover's final return.
#[derive(Debug, Clone)]
pub struct Experience {
    /// Position before the move.
    pub state: GameState,
    pub action: usize,
    pub player: Player,
    /// Monte Carlo return for `player`: +1 win, 0 draw, -1 loss.
    pub reward: f64,
}

/// Metrics returned from a learning update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateMetrics {
    /// Number of Q entries written (0 when the learning rate is 0).
    pub updates: usize,
    pub mean_abs_td_error: f64,
}

impl UpdateMetrics {
    /// Fold a list of TD errors into summary metrics.
    pub fn from_td_errors(errors: &[f64]) -> Self {
        if errors.is_empty() {
            return Self::default();
        }
        UpdateMetrics {
            updates: errors.len(),
            mean_abs_td_error: errors.iter().map(|e| e.abs()).sum::<f64>() / errors.len() as f64,
        }
    }
}

/// Universal interface for all Connect Four players.
pub trait Agent {
    /// Select a column for the player to move in `state`.
    /// When `training` is true, the agent may learn from its own search.
    /// Returns `None` only when the game is already over.
    fn select_action(&mut self, state: &GameState, training: bool) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Learn from the moves of a finished game.
    fn batch_update(&mut self, _experiences: &[Experience]) -> UpdateMetrics {
        UpdateMetrics::default()
    }

    /// Write any learned state to durable storage.
    fn persist(&mut self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
