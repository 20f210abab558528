use super::board::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Red,
    Yellow,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::Red => Player::Yellow,
            Player::Yellow => Player::Red,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::Red => Cell::Red,
            Player::Yellow => Cell::Yellow,
        }
    }

    /// Grid encoding used by external boards: red is -1, yellow is +1.
    pub fn sign(self) -> i8 {
        match self {
            Player::Red => -1,
            Player::Yellow => 1,
        }
    }

    pub fn from_sign(value: i8) -> Option<Player> {
        match value {
            -1 => Some(Player::Red),
            1 => Some(Player::Yellow),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Red => "Red",
            Player::Yellow => "Yellow",
        }
    }
}
