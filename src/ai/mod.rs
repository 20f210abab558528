mod agent;
mod magnus;
mod mcts;
mod q_table;
mod random;
mod uct;

pub use agent::{Agent, Experience, UpdateMetrics};
pub use magnus::{MagnusAgent, MagnusConfig};
pub use mcts::{
    blended_score, ucb1, LeafEvaluation, MctsEngine, SearchConfig, SearchError, SearchResult,
};
pub use q_table::{QEntry, QKey, QTable};
pub use random::RandomAgent;
pub use uct::{BaselineConfig, UctAgent};
