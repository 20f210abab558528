use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::{Agent, BaselineConfig, MagnusAgent, RandomAgent, UctAgent};
use crate::error::MatchError;
use crate::game::Player;
use crate::training::episode::{
    episode_seed, evaluate_against_random, play_self_play_game, play_training_game, EvalReport,
    GameRecord,
};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};

/// Who the agent trains against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    #[default]
    VsRandom,
    /// Against the prior-free UCT search.
    VsBaseline,
    /// The agent plays both sides.
    SelfPlay,
}

/// Trainer configuration (`[training]` in the config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub episodes: usize,
    pub report_every: usize,
    /// Save the Q-table every N episodes (0 = only at the end).
    pub save_every: usize,
    /// Evaluate against random every N episodes (0 = never).
    pub eval_every: usize,
    pub metrics_window: usize,
    pub mode: TrainingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            episodes: 300,
            report_every: 50,
            save_every: 1,
            eval_every: 0,
            metrics_window: 100,
            mode: TrainingMode::VsRandom,
            seed: None,
        }
    }
}

/// Evaluation settings (`[evaluation]` in the config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub games: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            games: 100,
            seed: None,
        }
    }
}

/// Totals of a training run.
///
/// `wins`, `losses` and the first/second counters are from the agent's seat
/// and stay at zero in self-play, where the agent holds both seats; the
/// colour counters are filled in every mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub red_wins: usize,
    pub yellow_wins: usize,
    pub draws: usize,
    pub wins: usize,
    pub losses: usize,
    pub wins_as_first: usize,
    pub wins_as_second: usize,
    pub games_as_first: usize,
    pub q_entries: usize,
    pub last_eval: Option<EvalReport>,
}

impl TrainingReport {
    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.wins as f64 / self.episodes as f64
    }
}

/// Episode loop that trains a [`MagnusAgent`] from finished games.
pub struct Trainer {
    config: TrainerConfig,
    baseline: BaselineConfig,
    evaluation: EvaluationConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig, baseline: BaselineConfig, evaluation: EvaluationConfig) -> Self {
        Trainer {
            config,
            baseline,
            evaluation,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn opponent(&self) -> Option<Box<dyn Agent>> {
        match self.config.mode {
            TrainingMode::VsRandom => Some(Box::new(match self.config.seed {
                Some(seed) => RandomAgent::with_seed(episode_seed(seed, 0)),
                None => RandomAgent::new(),
            })),
            TrainingMode::VsBaseline => Some(Box::new(UctAgent::from_config(&self.baseline))),
            TrainingMode::SelfPlay => None,
        }
    }

    /// Run the full training loop, saving the Q-table as configured.
    pub fn train(&self, agent: &mut MagnusAgent) -> Result<TrainingReport, MatchError> {
        let mut metrics = TrainingMetrics::with_capacity(self.config.metrics_window);
        let mut report = TrainingReport::default();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut opponent = self.opponent();
        let total = self.config.episodes;

        info!(
            "Starting training for {} episodes ({:?}, Q-table has {} entries)",
            total,
            self.config.mode,
            agent.q_table().len()
        );

        for episode in 1..=total {
            if let Some(seed) = self.config.seed {
                agent.reseed(episode_seed(seed, episode));
            }

            let (record, agent_seat) = match opponent.as_deref_mut() {
                Some(opp) => {
                    if rng.random_bool(0.5) {
                        (play_training_game(agent, opp)?, Some(Player::Red))
                    } else {
                        (play_training_game(opp, agent)?, Some(Player::Yellow))
                    }
                }
                None => (play_self_play_game(agent)?, None),
            };

            let update = agent.learn_from_game(&record.experiences);
            metrics.record_update(update.mean_abs_td_error);
            let result = self.record_episode(&mut report, &record, agent_seat);
            metrics.record_episode(result);

            if self.config.report_every > 0 && episode % self.config.report_every == 0 {
                let window = self.config.report_every;
                info!(
                    "Episode {}/{} | win: {:.1}% | draw: {:.1}% | loss: {:.1}% | avg_len: {:.1} | td: {:.4} | Q: {}",
                    episode,
                    total,
                    metrics.win_rate(window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.loss_rate(window) * 100.0,
                    metrics.average_game_length(window),
                    metrics.average_td_error(window),
                    agent.q_table().len()
                );
            }

            if self.config.eval_every > 0 && episode % self.config.eval_every == 0 {
                let eval = evaluate_against_random(agent, self.evaluation.games, self.evaluation.seed)?;
                info!(
                    "  >> Eval vs Random ({} games): {:.1}% win rate",
                    eval.games,
                    eval.win_rate() * 100.0
                );
                report.last_eval = Some(eval);
            }

            if self.config.save_every > 0 && episode % self.config.save_every == 0 {
                agent.save()?;
            }
        }

        agent.save()?;
        report.q_entries = agent.q_table().len();

        info!(
            "Training complete: {} episodes, red {} / yellow {} / draw {}, agent {}W/{}L ({} wins first, {} wins second), Q-table {} entries",
            report.episodes,
            report.red_wins,
            report.yellow_wins,
            report.draws,
            report.wins,
            report.losses,
            report.wins_as_first,
            report.wins_as_second,
            report.q_entries
        );
        Ok(report)
    }

    /// Tally one game. `agent_seat` is `None` in self-play; the rolling
    /// metrics then read the game from red's side.
    fn record_episode(
        &self,
        report: &mut TrainingReport,
        record: &GameRecord,
        agent_seat: Option<Player>,
    ) -> EpisodeResult {
        report.episodes += 1;
        match record.winner() {
            Some(Player::Red) => report.red_wins += 1,
            Some(Player::Yellow) => report.yellow_wins += 1,
            None => report.draws += 1,
        }

        let Some(seat) = agent_seat else {
            return EpisodeResult {
                reward: record.outcome.reward_for(Player::Red),
                game_length: record.length,
            };
        };

        let first = seat == Player::Red;
        if first {
            report.games_as_first += 1;
        }
        let reward = record.outcome.reward_for(seat);
        if reward > 0.0 {
            report.wins += 1;
            if first {
                report.wins_as_first += 1;
            } else {
                report.wins_as_second += 1;
            }
        } else if reward < 0.0 {
            report.losses += 1;
        }

        EpisodeResult {
            reward,
            game_length: record.length,
        }
    }
}
