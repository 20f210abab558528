//! Game running and training: single games between agents, the training
//! loop, evaluation against a random player, head-to-head matches, and
//! rolling metrics.

pub mod episode;
pub mod metrics;
pub mod trainer;

pub use episode::{
    episode_seed, evaluate_against_random, play_game, play_match, play_self_play_game,
    play_training_game, EvalReport, GameRecord, MatchReport, Tally,
};
pub use metrics::{EpisodeResult, TrainingMetrics};
pub use trainer::{EvaluationConfig, Trainer, TrainerConfig, TrainingMode, TrainingReport};
