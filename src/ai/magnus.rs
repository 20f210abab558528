use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, Experience, UpdateMetrics};
use super::mcts::{LeafEvaluation, MctsEngine, SearchConfig, SearchError, SearchResult};
use super::q_table::{QKey, QTable};
use crate::checkpoint::{QStore, QTableMetadata};
use crate::error::{PersistenceError, PolicyError};
use crate::game::{GameState, COLS, ROWS};

/// Parameters of the Magnus agent (`[magnus]` in the config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnusConfig {
    pub simulations: usize,
    pub exploration_c: f64,
    /// Q-learning rate.
    pub alpha: f64,
    /// Weight of the Q prior in the selection score.
    pub beta: f64,
    pub confidence_threshold: u32,
    pub q_file: PathBuf,
    pub leaf_evaluation: LeafEvaluation,
    /// Update Q(root, column) from root child values after each training search.
    pub learn_from_search: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MagnusConfig {
    fn default() -> Self {
        MagnusConfig {
            simulations: 250,
            exploration_c: 2.0,
            alpha: 0.3,
            beta: 0.7,
            confidence_threshold: 50,
            q_file: PathBuf::from("magnus_q.pkl"),
            leaf_evaluation: LeafEvaluation::Rollout,
            learn_from_search: true,
            seed: None,
        }
    }
}

impl MagnusConfig {
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            simulations: self.simulations,
            exploration_c: self.exploration_c,
            beta: self.beta,
            confidence_threshold: self.confidence_threshold,
            leaf_evaluation: self.leaf_evaluation,
        }
    }
}

/// MCTS agent whose selection is guided by a learned Q-table.
pub struct MagnusAgent {
    config: MagnusConfig,
    engine: MctsEngine,
    q_table: QTable,
    store: QStore,
    games_learned: u64,
    last_search: Option<SearchResult>,
}

impl MagnusAgent {
    /// Agent with an empty Q-table. Nothing is read from disk.
    pub fn new(config: MagnusConfig) -> Self {
        let engine = match config.seed {
            Some(seed) => MctsEngine::with_seed(config.search_config(), seed),
            None => MctsEngine::new(config.search_config()),
        };
        MagnusAgent {
            store: QStore::new(&config.q_file),
            config,
            engine,
            q_table: QTable::new(),
            games_learned: 0,
            last_search: None,
        }
    }

    /// Agent with the Q-table loaded from `q_file`; a missing file starts empty.
    pub fn mount(config: MagnusConfig) -> Result<Self, PersistenceError> {
        let mut agent = Self::new(config);
        let saved = agent.store.load_or_default()?;
        agent.q_table = saved.table;
        agent.games_learned = saved.metadata.games_trained;
        debug!(
            "mounted Q-table from {} with {} entries",
            agent.store.path().display(),
            agent.q_table.len()
        );
        Ok(agent)
    }

    pub fn config(&self) -> &MagnusConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn games_learned(&self) -> u64 {
        self.games_learned
    }

    /// Result of the most recent search, if any.
    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }

    /// Search `state` and return the chosen column.
    pub fn act(&mut self, state: &GameState, training: bool) -> Result<usize, SearchError> {
        let result = self.engine.search(state, Some(&self.q_table))?;
        if training && self.config.learn_from_search {
            self.learn_from_search(state, &result);
        }
        let action = result.action;
        self.last_search = Some(result);
        Ok(action)
    }

    /// Choose a column for a 6x7 grid of {-1, 0, 1} (row 0 on top, red = -1).
    pub fn act_on_grid(&mut self, grid: &[[i8; COLS]; ROWS]) -> Result<usize, PolicyError> {
        let state = GameState::from_grid(grid)?;
        Ok(self.act(&state, false)?)
    }

    /// Pull Q(root, column) toward each searched child's mean value.
    ///
    /// Mirror columns of a symmetric position share one entry; their child
    /// means are averaged into a single update so each search counts once.
    pub fn learn_from_search(&mut self, state: &GameState, result: &SearchResult) -> UpdateMetrics {
        let board = state.board();
        let mut targets: Vec<(QKey, usize, f64, u32)> = Vec::with_capacity(COLS);
        for (col, mean) in result.mean_values.iter().enumerate() {
            let Some(mean) = *mean else { continue };
            let key = QKey::new(board, col);
            match targets.iter_mut().find(|t| t.0 == key) {
                Some(target) => {
                    target.2 += mean;
                    target.3 += 1;
                }
                None => targets.push((key, col, mean, 1)),
            }
        }

        let alpha = self.config.alpha;
        let errors: Vec<f64> = targets
            .iter()
            .map(|&(_, col, sum, n)| self.q_table.update(board, col, sum / n as f64, alpha))
            .collect();
        self.update_metrics(&errors)
    }

    /// Update every recorded move of a finished game toward its mover's final return.
    pub fn learn_from_game(&mut self, experiences: &[Experience]) -> UpdateMetrics {
        if experiences.is_empty() {
            return UpdateMetrics::default();
        }
        let errors: Vec<f64> = experiences
            .iter()
            .map(|exp| {
                self.q_table
                    .update(exp.state.board(), exp.action, exp.reward, self.config.alpha)
            })
            .collect();
        self.games_learned += 1;
        self.update_metrics(&errors)
    }

    /// With `alpha == 0` nothing is written, so no updates are reported.
    fn update_metrics(&self, errors: &[f64]) -> UpdateMetrics {
        let mut metrics = UpdateMetrics::from_td_errors(errors);
        if self.config.alpha == 0.0 {
            metrics.updates = 0;
        }
        metrics
    }

    /// Restart the search RNG from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }

    /// Write the Q-table to `q_file`.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let metadata = QTableMetadata::describe(&self.q_table, self.games_learned, self.config.alpha);
        self.store.save(&self.q_table, &metadata)
    }
}

impl Agent for MagnusAgent {
    fn select_action(&mut self, state: &GameState, training: bool) -> Option<usize> {
        self.act(state, training).ok()
    }

    fn name(&self) -> &str {
        "Magnus"
    }

    fn batch_update(&mut self, experiences: &[Experience]) -> UpdateMetrics {
        self.learn_from_game(experiences)
    }

    fn persist(&mut self) -> Result<(), PersistenceError> {
        self.save()
    }
}
