use std::collections::VecDeque;

/// Result of a single episode from the trained agent's point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    /// +1 win, 0 draw, -1 loss.
    pub reward: f64,
    pub game_length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    td_errors: VecDeque<f64>,
    capacity: usize,
    total_episodes: usize, // lifetime counts, never capped
    total_wins: usize,
    total_losses: usize,
    total_draws: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            td_errors: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            total_wins: 0,
            total_losses: 0,
            total_draws: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        if result.reward > 0.0 {
            self.total_wins += 1;
        } else if result.reward < 0.0 {
            self.total_losses += 1;
        } else {
            self.total_draws += 1;
        }

        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    /// Record the mean absolute TD error of one learning update.
    pub fn record_update(&mut self, mean_abs_td_error: f64) {
        self.td_errors.push_back(mean_abs_td_error);
        if self.td_errors.len() > self.capacity {
            self.td_errors.pop_front();
        }
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f64 / n as f64
    }

    /// Agent win rate in the last N episodes.
    pub fn win_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.reward > 0.0)
    }

    pub fn loss_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.reward < 0.0)
    }

    pub fn draw_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.reward == 0.0)
    }

    /// Average TD error over the last N updates.
    pub fn average_td_error(&self, last_n: usize) -> f64 {
        let n = self.td_errors.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.td_errors.iter().rev().take(n).sum();
        sum / n as f64
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f64 / n as f64
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_wins(&self) -> usize {
        self.total_wins
    }

    pub fn total_losses(&self) -> usize {
        self.total_losses
    }

    pub fn total_draws(&self) -> usize {
        self.total_draws
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(reward: f64, game_length: usize) -> EpisodeResult {
        EpisodeResult { reward, game_length }
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = TrainingMetrics::new();
        assert_eq!(metrics.win_rate(100), 0.0);
        assert_eq!(metrics.draw_rate(100), 0.0);
        assert_eq!(metrics.average_td_error(100), 0.0);
        assert_eq!(metrics.average_game_length(100), 0.0);
        assert_eq!(metrics.total_episodes(), 0);
    }

    #[test]
    fn test_rates() {
        let mut metrics = TrainingMetrics::new();
        metrics.record_episode(result(1.0, 10));
        metrics.record_episode(result(1.0, 12));
        metrics.record_episode(result(-1.0, 15));
        metrics.record_episode(result(0.0, 42));

        assert!((metrics.win_rate(4) - 0.5).abs() < 1e-12);
        assert!((metrics.loss_rate(4) - 0.25).abs() < 1e-12);
        assert!((metrics.draw_rate(4) - 0.25).abs() < 1e-12);
        assert!((metrics.average_game_length(4) - 19.75).abs() < 1e-12);
        // Last two only: one loss, one draw
        assert_eq!(metrics.win_rate(2), 0.0);
    }

    #[test]
    fn test_rolling_window_caps_but_totals_do_not() {
        let mut metrics = TrainingMetrics::with_capacity(3);
        for _ in 0..5 {
            metrics.record_episode(result(-1.0, 7));
        }
        metrics.record_episode(result(1.0, 7));

        assert!((metrics.win_rate(100) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.total_episodes(), 6);
        assert_eq!(metrics.total_losses(), 5);
        assert_eq!(metrics.total_wins(), 1);
        assert_eq!(metrics.total_draws(), 0);
    }

    #[test]
    fn test_average_td_error() {
        let mut metrics = TrainingMetrics::new();
        metrics.record_update(0.5);
        metrics.record_update(0.3);
        assert!((metrics.average_td_error(10) - 0.4).abs() < 1e-12);
        assert!((metrics.average_td_error(1) - 0.3).abs() < 1e-12);
    }
}
