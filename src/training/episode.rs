use log::debug;

use crate::ai::{Agent, Experience, RandomAgent};
use crate::error::MatchError;
use crate::game::{GameOutcome, GameState, Player};

/// Moves and result of one finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// One experience per move, labelled with the mover's final return.
    pub experiences: Vec<Experience>,
    pub outcome: GameOutcome,
    pub length: usize,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            GameOutcome::Winner(p) => Some(p),
            GameOutcome::Draw => None,
        }
    }
}

/// Win/loss/draw counts for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl Tally {
    fn record(&mut self, reward: f64) {
        if reward > 0.0 {
            self.wins += 1;
        } else if reward < 0.0 {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }

    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }
}

/// Result of [`evaluate_against_random`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalReport {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl EvalReport {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games as f64
    }
}

/// Result of [`play_match`], counted from the first agent's side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    pub games: usize,
    /// First agent's results while playing red.
    pub as_red: Tally,
    /// First agent's results while playing yellow.
    pub as_yellow: Tally,
}

impl MatchReport {
    pub fn a_wins(&self) -> usize {
        self.as_red.wins + self.as_yellow.wins
    }

    pub fn b_wins(&self) -> usize {
        self.as_red.losses + self.as_yellow.losses
    }

    pub fn draws(&self) -> usize {
        self.as_red.draws + self.as_yellow.draws
    }
}

/// Ask `agent` for a column and check it against the legal moves.
fn choose(agent: &mut dyn Agent, state: &GameState, training: bool) -> Result<usize, MatchError> {
    let action = agent
        .select_action(state, training)
        .ok_or_else(|| MatchError::NoAction {
            agent: agent.name().to_string(),
        })?;

    let legal = state.legal_actions();
    if !legal.contains(&action) {
        return Err(MatchError::IllegalAction {
            agent: agent.name().to_string(),
            action,
            legal,
        });
    }
    Ok(action)
}

/// Play from the initial position until the game ends, asking `select` for every move.
fn run_game<F>(mut select: F) -> Result<GameRecord, MatchError>
where
    F: FnMut(&GameState) -> Result<usize, MatchError>,
{
    let mut state = GameState::initial();
    let mut move_records: Vec<(GameState, usize, Player)> = Vec::new();

    while !state.is_terminal() {
        let action = select(&state)?;
        move_records.push((state, action, state.current_player()));
        state.apply_move_mut(action).map_err(MatchError::Move)?;
    }

    let outcome = state.outcome().ok_or(MatchError::MissingOutcome)?;
    Ok(GameRecord {
        experiences: build_experiences(&move_records, outcome),
        length: move_records.len(),
        outcome,
    })
}

/// Label every move with its mover's Monte Carlo return.
pub fn build_experiences(
    move_records: &[(GameState, usize, Player)],
    outcome: GameOutcome,
) -> Vec<Experience> {
    move_records
        .iter()
        .map(|&(state, action, player)| Experience {
            state,
            action,
            player,
            reward: outcome.reward_for(player),
        })
        .collect()
}

/// Play one game without learning during the search.
pub fn play_game(red: &mut dyn Agent, yellow: &mut dyn Agent) -> Result<GameRecord, MatchError> {
    play_between(red, yellow, false)
}

/// Play one game with both agents in training mode.
pub fn play_training_game(red: &mut dyn Agent, yellow: &mut dyn Agent) -> Result<GameRecord, MatchError> {
    play_between(red, yellow, true)
}

fn play_between(red: &mut dyn Agent, yellow: &mut dyn Agent, training: bool) -> Result<GameRecord, MatchError> {
    run_game(|state| match state.current_player() {
        Player::Red => choose(red, state, training),
        Player::Yellow => choose(yellow, state, training),
    })
}

/// Play one training episode. Agent plays both sides.
pub fn play_self_play_game(agent: &mut dyn Agent) -> Result<GameRecord, MatchError> {
    run_game(|state| choose(agent, state, true))
}

/// Evaluate `agent` against a uniformly random opponent over `games` games,
/// alternating colours (the agent is red in the first game).
pub fn evaluate_against_random(
    agent: &mut dyn Agent,
    games: usize,
    seed: Option<u64>,
) -> Result<EvalReport, MatchError> {
    let mut random = match seed {
        Some(seed) => RandomAgent::with_seed(seed),
        None => RandomAgent::new(),
    };
    let mut tally = Tally::default();

    for game_idx in 0..games {
        let agent_player = if game_idx % 2 == 0 { Player::Red } else { Player::Yellow };
        let record = match agent_player {
            Player::Red => play_game(agent, &mut random)?,
            Player::Yellow => play_game(&mut random, agent)?,
        };
        tally.record(record.outcome.reward_for(agent_player));
    }

    let report = EvalReport {
        games,
        wins: tally.wins,
        losses: tally.losses,
        draws: tally.draws,
    };
    debug!(
        "{} vs Random: {}/{}/{} (W/L/D)",
        agent.name(),
        report.wins,
        report.losses,
        report.draws
    );
    Ok(report)
}

/// Head-to-head match. Odd-numbered games (1st, 3rd, ...) have `a` as red.
/// With `learn`, both agents search in training mode and learn from every game.
pub fn play_match(
    a: &mut dyn Agent,
    b: &mut dyn Agent,
    games: usize,
    learn: bool,
) -> Result<MatchReport, MatchError> {
    let mut report = MatchReport {
        games,
        ..Default::default()
    };

    for game_no in 1..=games {
        let a_is_red = game_no % 2 == 1;
        let record = if a_is_red {
            play_between(a, b, learn)?
        } else {
            play_between(b, a, learn)?
        };

        if learn {
            a.batch_update(&record.experiences);
            b.batch_update(&record.experiences);
        }

        if a_is_red {
            report.as_red.record(record.outcome.reward_for(Player::Red));
        } else {
            report.as_yellow.record(record.outcome.reward_for(Player::Yellow));
        }
    }

    Ok(report)
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    // FNV-1a style mixing
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
