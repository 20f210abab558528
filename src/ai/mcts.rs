//! Monte Carlo Tree Search with UCB1 selection blended with a Q-table prior.
//!
//! The tree is an index arena that is rebuilt for every searched position.
//! Node values are stored from the perspective of the player who made the
//! move leading into the node, so every level maximizes its own mover's value.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::q_table::{QEntry, QTable};
use crate::game::{GameState, LegalActions, Player, COLS};

// ─── Config ──────────────────────────────────────────────────────────────────

/// What a freshly expanded leaf is scored with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafEvaluation {
    /// Uniformly random playout to the end of the game.
    #[default]
    Rollout,
    /// The leaf's trusted Q value when there is one, a rollout otherwise.
    QTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub simulations: usize,
    pub exploration_c: f64,
    /// Weight of the normalized Q prior in the selection score.
    pub beta: f64,
    /// Minimum visit count for a Q entry to be used as a prior.
    pub confidence_threshold: u32,
    pub leaf_evaluation: LeafEvaluation,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            simulations: 250,
            exploration_c: 2.0,
            beta: 0.7,
            confidence_threshold: 50,
            leaf_evaluation: LeafEvaluation::Rollout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no legal columns: the game is already over")]
    NoLegalMoves,
}

/// Outcome of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub action: usize,
    /// Visits of each root child; zero for unexpanded or illegal columns.
    pub visit_counts: [u32; COLS],
    /// Mean value of each root child from the searching player's perspective.
    pub mean_values: [Option<f64>; COLS],
    /// Simulations actually run (0 when the move was forced).
    pub simulations: usize,
}

impl SearchResult {
    fn forced(action: usize) -> Self {
        SearchResult {
            action,
            visit_counts: [0; COLS],
            mean_values: [None; COLS],
            simulations: 0,
        }
    }
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// UCB1 with the exploitation term on [0, 1]. Unvisited children score +inf.
pub fn ucb1(mean01: f64, visits: u32, parent_visits: u32, exploration_c: f64) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    let ln_parent = (parent_visits.max(1) as f64).ln();
    mean01 + exploration_c * (ln_parent / visits as f64).sqrt()
}

/// `beta * prior + (1 - beta) * ucb` when the prior is trusted, plain `ucb` otherwise.
pub fn blended_score(prior: Option<&QEntry>, ucb: f64, beta: f64, confidence_threshold: u32) -> f64 {
    if !ucb.is_finite() {
        return ucb;
    }
    match prior {
        Some(entry) if entry.is_trusted(confidence_threshold) => {
            beta * entry.normalized() + (1.0 - beta) * ucb
        }
        _ => ucb,
    }
}

// ─── Tree (arena-based) ──────────────────────────────────────────────────────

struct MctsNode {
    state: GameState,
    visit_count: u32,
    /// Cumulative value for the player who moved into this node.
    value_sum: f64,
    /// Q entry of the move leading here, cached at creation.
    prior: Option<QEntry>,
    children: [Option<usize>; COLS],
    untried: LegalActions,
}

impl MctsNode {
    fn new(state: GameState, prior: Option<QEntry>) -> Self {
        MctsNode {
            untried: state.legal_actions(),
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            children: [None; COLS],
        }
    }

    fn mean_value(&self) -> Option<f64> {
        (self.visit_count > 0).then(|| self.value_sum / self.visit_count as f64)
    }
}

struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    fn new() -> Self {
        MctsTree {
            nodes: Vec::with_capacity(1024),
        }
    }

    /// Reset the tree and install a fresh root node.
    fn init(&mut self, root_state: GameState) {
        self.nodes.clear();
        self.nodes.push(MctsNode::new(root_state, None));
    }

    fn add_child(&mut self, parent: usize, action: usize, state: GameState, prior: Option<QEntry>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(MctsNode::new(state, prior));
        self.nodes[parent].children[action] = Some(idx);
        idx
    }

    /// Propagate `leaf_value` back through `path`, negating it at each level.
    fn backup(&mut self, path: &[usize], leaf_value: f64) {
        let mut v = leaf_value;
        for &idx in path.iter().rev() {
            self.nodes[idx].visit_count += 1;
            self.nodes[idx].value_sum += v;
            v = -v;
        }
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct MctsEngine {
    config: SearchConfig,
    tree: MctsTree,
    rng: StdRng,
}

impl MctsEngine {
    pub fn new(config: SearchConfig) -> Self {
        MctsEngine {
            config,
            tree: MctsTree::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        MctsEngine {
            config,
            tree: MctsTree::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Search `state` and return the most visited column.
    ///
    /// `prior` is consulted for child priors and, with
    /// [`LeafEvaluation::QTable`], for leaf values. A position with a single
    /// legal column returns it without simulating.
    pub fn search(&mut self, state: &GameState, prior: Option<&QTable>) -> Result<SearchResult, SearchError> {
        let legal = state.legal_actions();
        match legal.as_slice() {
            [] => return Err(SearchError::NoLegalMoves),
            [only] => return Ok(SearchResult::forced(*only)),
            _ => {}
        }

        self.tree.init(*state);
        let simulations = self.config.simulations.max(1);
        for _ in 0..simulations {
            self.run_simulation(prior);
        }

        let root = &self.tree.nodes[0];
        let mut visit_counts = [0u32; COLS];
        let mut mean_values = [None; COLS];
        for (action, child) in root.children.iter().enumerate() {
            if let Some(ci) = *child {
                visit_counts[action] = self.tree.nodes[ci].visit_count;
                mean_values[action] = self.tree.nodes[ci].mean_value();
            }
        }

        let action = legal
            .iter()
            .copied()
            .max_by(|&a, &b| {
                let mean = |c: usize| mean_values[c].unwrap_or(f64::NEG_INFINITY);
                visit_counts[a]
                    .cmp(&visit_counts[b])
                    .then(mean(a).total_cmp(&mean(b)))
            })
            .unwrap_or(legal[0]);

        debug!(
            "mcts: {} simulations, {} nodes, chose column {} (visits {:?})",
            simulations,
            self.tree.nodes.len(),
            action,
            visit_counts
        );

        Ok(SearchResult {
            action,
            visit_counts,
            mean_values,
            simulations,
        })
    }

    /// Selection, expansion, evaluation, and backup from the root.
    fn run_simulation(&mut self, prior: Option<&QTable>) {
        let mut path = vec![0];
        let mut current = 0;

        loop {
            let node = &self.tree.nodes[current];
            if node.state.is_terminal() || !node.untried.is_empty() {
                break;
            }
            match self.select_child(current) {
                Some(child) => {
                    current = child;
                    path.push(current);
                }
                None => break,
            }
        }

        let node = &self.tree.nodes[current];
        if !node.state.is_terminal() && !node.untried.is_empty() {
            if let Some(child) = self.expand(current, prior) {
                current = child;
                path.push(current);
            }
        }

        let value = self.evaluate_leaf(current);
        self.tree.backup(&path, value);
    }

    /// Child with the highest blended score; ties are broken at random.
    fn select_child(&mut self, node_idx: usize) -> Option<usize> {
        let nodes = &self.tree.nodes;
        let node = &nodes[node_idx];

        let mut best: Vec<usize> = Vec::with_capacity(COLS);
        let mut best_score = f64::NEG_INFINITY;
        for &ci in node.children.iter().flatten() {
            let child = &nodes[ci];
            let mean01 = child.mean_value().map_or(0.5, |m| (m + 1.0) / 2.0);
            let ucb = ucb1(mean01, child.visit_count, node.visit_count, self.config.exploration_c);
            let score = blended_score(
                child.prior.as_ref(),
                ucb,
                self.config.beta,
                self.config.confidence_threshold,
            );

            if score > best_score {
                best_score = score;
                best.clear();
                best.push(ci);
            } else if score == best_score {
                best.push(ci);
            }
        }

        match best.len() {
            0 => None,
            1 => Some(best[0]),
            n => Some(best[self.rng.random_range(0..n)]),
        }
    }

    /// Add one untried column as a new leaf. Columns with a trusted prior are
    /// tried first, best prior first; otherwise the column is drawn at random.
    fn expand(&mut self, node_idx: usize, prior: Option<&QTable>) -> Option<usize> {
        let threshold = self.config.confidence_threshold;
        let state = self.tree.nodes[node_idx].state;
        let priors = prior.map(|table| table.priors(state.board()));

        let untried = &self.tree.nodes[node_idx].untried;
        let trusted_best = priors.and_then(|p| {
            untried
                .iter()
                .enumerate()
                .filter_map(|(i, &col)| p[col].filter(|e| e.is_trusted(threshold)).map(|e| (i, e.value)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
        });
        let pick = match trusted_best {
            Some(i) => i,
            None => self.rng.random_range(0..untried.len()),
        };

        let action = self.tree.nodes[node_idx].untried.swap_remove(pick);
        let child_state = state.apply_move(action).ok()?;
        let child_prior = priors.and_then(|p| p[action]);
        Some(self.tree.add_child(node_idx, action, child_state, child_prior))
    }

    /// Value of a leaf for the player who moved into it.
    fn evaluate_leaf(&mut self, node_idx: usize) -> f64 {
        let node = &self.tree.nodes[node_idx];
        let mover = node.state.current_player().other();

        if let Some(outcome) = node.state.outcome() {
            return outcome.reward_for(mover);
        }

        if self.config.leaf_evaluation == LeafEvaluation::QTable {
            if let Some(entry) = node.prior.filter(|e| e.is_trusted(self.config.confidence_threshold)) {
                return entry.value;
            }
        }

        let state = node.state;
        self.rollout(state, mover)
    }

    /// Play uniformly random columns until the game ends.
    fn rollout(&mut self, mut state: GameState, perspective: Player) -> f64 {
        while !state.is_terminal() {
            let legal = state.legal_actions();
            let col = legal[self.rng.random_range(0..legal.len())];
            if state.apply_move_mut(col).is_err() {
                break;
            }
        }
        state.outcome().map_or(0.0, |o| o.reward_for(perspective))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
