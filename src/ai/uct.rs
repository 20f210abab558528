use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::mcts::{MctsEngine, SearchConfig};
use crate::game::GameState;

/// Parameters of the UCT baseline opponent (`[baseline]` in the config file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub simulations: usize,
    pub exploration_c: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        BaselineConfig {
            simulations: 150,
            exploration_c: std::f64::consts::SQRT_2,
            seed: None,
        }
    }
}

/// Plain UCT baseline: the same search without any Q prior.
pub struct UctAgent {
    engine: MctsEngine,
    name: String,
}

impl UctAgent {
    pub fn new(simulations: usize, exploration_c: f64, seed: Option<u64>) -> Self {
        let config = SearchConfig {
            simulations,
            exploration_c,
            beta: 0.0,
            ..Default::default()
        };
        let engine = match seed {
            Some(seed) => MctsEngine::with_seed(config, seed),
            None => MctsEngine::new(config),
        };
        UctAgent {
            engine,
            name: format!("UCT-{simulations}"),
        }
    }

    pub fn from_config(config: &BaselineConfig) -> Self {
        Self::new(config.simulations, config.exploration_c, config.seed)
    }
}

impl Default for UctAgent {
    fn default() -> Self {
        Self::from_config(&BaselineConfig::default())
    }
}

impl Agent for UctAgent {
    fn select_action(&mut self, state: &GameState, _training: bool) -> Option<usize> {
        self.engine.search(state, None).ok().map(|r| r.action)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
