//! Learned (state, column) values used as the search prior.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::{mirror_column, Board, StateKey, COLS};

/// Value estimate for one (state, column) pair.
///
/// `value` lies in [-1, 1] and is expressed from the perspective of the
/// player to move in the state; `visits` counts the updates behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub value: f64,
    pub visits: u32,
}

impl QEntry {
    /// An entry is trusted as a prior once enough updates back it.
    pub fn is_trusted(&self, confidence_threshold: u32) -> bool {
        self.visits >= confidence_threshold
    }

    /// Value mapped from [-1, 1] onto [0, 1], the scale of the UCB1 exploitation term.
    pub fn normalized(&self) -> f64 {
        ((self.value + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Symmetry-reduced (state, column) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QKey {
    pub state: StateKey,
    pub action: u8,
}

impl QKey {
    pub fn new(board: &Board, action: usize) -> Self {
        let raw = StateKey::from_board(board);
        let (state, mirrored) = raw.canonical();
        let action = if mirrored {
            mirror_column(action)
        } else if raw == raw.mirrored() {
            // symmetric position: column c and its mirror are the same move
            action.min(mirror_column(action))
        } else {
            action
        };
        QKey {
            state,
            action: action as u8,
        }
    }
}

/// Q-table mapping canonical (state, column) pairs to value estimates.
///
/// Entries are only ever added or refined, never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QTable {
    entries: HashMap<QKey, QEntry>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, board: &Board, action: usize) -> Option<&QEntry> {
        self.entries.get(&QKey::new(board, action))
    }

    /// Value of a pair, 0.0 when it has never been updated.
    pub fn value(&self, board: &Board, action: usize) -> f64 {
        self.get(board, action).map_or(0.0, |e| e.value)
    }

    /// Entries for every column of `board`, `None` where nothing is stored.
    pub fn priors(&self, board: &Board) -> [Option<QEntry>; COLS] {
        std::array::from_fn(|col| self.get(board, col).copied())
    }

    /// Move Q(s, a) toward `target` with learning rate `alpha`:
    /// `Q_new = Q_old + alpha * (target - Q_old)`.
    ///
    /// Returns the TD error `target - Q_old`. With `alpha == 0` the table is
    /// left untouched, including visit counts.
    pub fn update(&mut self, board: &Board, action: usize, target: f64, alpha: f64) -> f64 {
        let key = QKey::new(board, action);
        let current = self.entries.get(&key).map_or(0.0, |e| e.value);
        let td_error = target - current;
        if alpha == 0.0 {
            return td_error;
        }

        let entry = self.entries.entry(key).or_default();
        entry.value = current + alpha * td_error;
        entry.visits = entry.visits.saturating_add(1);
        td_error
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QKey, &QEntry)> {
        self.entries.iter()
    }

    /// Sum of visit counts over all entries.
    pub fn total_visits(&self) -> u64 {
        self.entries.values().map(|e| e.visits as u64).sum()
    }
}
