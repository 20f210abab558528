//! # Magnus Connect Four
//!
//! A Connect Four agent that runs Monte Carlo Tree Search with UCB1 selection
//! blended with a learned Q-value prior, and refines that prior by
//! Q-learning from finished games.
//!
//! ## Modules
//!
//! - [`game`]: board, players, immutable state transitions, position keys
//! - [`ai`]: agent trait, MCTS engine, Q-table, Magnus/UCT/random agents
//! - [`training`]: game runner, training loop, evaluation, matches, metrics
//! - [`checkpoint`]: Q-table persistence
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
