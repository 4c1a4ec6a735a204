use tracing::debug;

use crate::config::SearchConfig;
use super::objective::Objective;

// ---------------------------------------------------------------------------
// Compass / pattern search
// ---------------------------------------------------------------------------

/// Result of a pattern search.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimum {
    pub params: Vec<f64>,
    pub score: f64,
    pub evaluations: usize,
}

/// Coordinate pattern search with a fixed, decreasing sequence of step sizes.
///
/// At each step size every coordinate is nudged up and down by the step, and
/// the single best neighbor is adopted if it strictly beats the incumbent. When
/// no neighbor improves, the search drops to the next step size. The result is
/// a local minimum only.
#[derive(Debug, Clone)]
pub struct PatternSearch {
    steps: Vec<f64>,
}

struct SearchState {
    current: Vec<f64>,
    score: f64,
    step: f64,
}

impl PatternSearch {
    pub fn new(steps: Vec<f64>) -> Self {
        Self { steps }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.step_sizes.clone())
    }

    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    /// Minimize `objective` starting from `initial`.
    ///
    /// The returned score never exceeds the score of `initial`.
    pub fn optimize<O>(&self, initial: &[f64], objective: &mut O) -> Optimum
    where
        O: Objective + ?Sized,
    {
        let mut state = SearchState {
            current: initial.to_vec(),
            score: objective.score(initial),
            step: self.steps.first().copied().unwrap_or(0.0),
        };
        let mut evaluations = 1;

        for &step in &self.steps {
            state.step = step;
            loop {
                let mut best: Option<(Vec<f64>, f64)> = None;
                for i in 0..state.current.len() {
                    for delta in [step, -step] {
                        let mut candidate = state.current.clone();
                        candidate[i] += delta;
                        let score = objective.score(&candidate);
                        evaluations += 1;
                        let better = match &best {
                            Some((_, best_score)) => score < *best_score,
                            None => true,
                        };
                        if better {
                            best = Some((candidate, score));
                        }
                    }
                }

                match best {
                    Some((candidate, score)) if score < state.score => {
                        state.current = candidate;
                        state.score = score;
                    }
                    _ => break,
                }
            }
            debug!(step = state.step, score = state.score, "pattern search step converged");
        }

        Optimum {
            params: state.current,
            score: state.score,
            evaluations,
        }
    }
}

impl Default for PatternSearch {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowl(p: &[f64]) -> f64 {
        (p[0] - 123.0).powi(2) + 2.0 * (p[1] + 45.0).powi(2)
    }

    #[test]
    fn converges_on_separable_bowl() {
        let search = PatternSearch::default();
        let mut f = bowl;
        let opt = search.optimize(&[0.0, 0.0], &mut f);
        assert_eq!(opt.params, vec![123.0, -45.0]);
        assert_eq!(opt.score, 0.0);
    }

    #[test]
    fn score_never_increases() {
        let search = PatternSearch::new(vec![7.0, 3.0, 0.5]);
        let landscapes: Vec<Box<dyn Fn(&[f64]) -> f64>> = vec![
            Box::new(|p: &[f64]| (p[0] * 0.3).sin() + (p[1] * 0.7).cos() * p[0].abs().sqrt()),
            Box::new(|p: &[f64]| (p[0] - p[1]).abs() + 0.01 * (p[0] + p[1]).powi(2)),
            Box::new(|p: &[f64]| -(p[0] * p[1]).cos()),
        ];
        let starts = [[0.0, 0.0], [13.0, -4.0], [-50.0, 22.5], [1.0, 1.0]];
        for f in &landscapes {
            for start in &starts {
                let before = f(&start[..]);
                let mut objective = |p: &[f64]| f(p);
                let opt = search.optimize(start, &mut objective);
                assert!(opt.score <= before, "score rose from {} to {}", before, opt.score);
                assert_eq!(opt.score, f(opt.params.as_slice()));
            }
        }
    }

    #[test]
    fn candidates_do_not_alias_incumbent() {
        // The objective sees the incumbent unchanged between neighbors: every
        // candidate differs from the start in exactly one coordinate.
        let search = PatternSearch::new(vec![1.0]);
        let start = [5.0, 5.0, 5.0];
        let mut seen = Vec::new();
        let mut objective = |p: &[f64]| {
            seen.push(p.to_vec());
            0.0
        };
        search.optimize(&start, &mut objective);
        assert_eq!(seen.len(), 1 + 6);
        for candidate in &seen[1..] {
            let moved = candidate.iter().zip(&start).filter(|(a, b)| a != b).count();
            assert_eq!(moved, 1);
        }
    }

    #[test]
    fn stalls_on_diagonal_valley() {
        // Improvement requires moving both coordinates together.
        let search = PatternSearch::new(vec![1.0]);
        let mut objective = |p: &[f64]| {
            let along = p[0] + p[1];
            let across = p[0] - p[1];
            -along + 10.0 * across.abs()
        };
        let opt = search.optimize(&[0.0, 0.0], &mut objective);
        assert_eq!(opt.params, vec![0.0, 0.0]);
    }

    #[test]
    fn empty_vector_is_scored_once() {
        let search = PatternSearch::default();
        let mut calls = 0;
        let mut objective = |_: &[f64]| {
            calls += 1;
            1.0
        };
        let opt = search.optimize(&[], &mut objective);
        assert!(opt.params.is_empty());
        assert_eq!(opt.evaluations, 1);
        assert_eq!(calls, 1);
    }
}
