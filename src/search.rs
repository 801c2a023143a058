// Depth-limited two-player alpha-beta search over the in-place move simulator.
//
// "Me" maximizes, "Enemy" minimizes. Depth is spent one unit per half-move: a search of
// depth D plays D alternating single-agent moves before falling back to static evaluation.
// Every move is made through a MoveGuard, so the shared GameState is back to its original
// value whenever control returns to a caller.

use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::evaluator::Evaluator;
use crate::game::{Action, GameState, Player, Rules};
use crate::profile;
use crate::simple_profiler;

/// Outcome of one root search
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Chosen action, `None` only if the root had no legal action
    pub action: Option<Action>,
    /// Minimax value of the chosen action
    pub value: f64,
    /// Value returned for each root action, in the order examined
    pub root_values: Vec<(Action, f64)>,
    /// Half-moves committed during the search
    pub nodes: u64,
    /// Alpha-beta cutoffs taken
    pub cutoffs: u64,
    /// The stop flag was raised before the search finished; action and value are partial
    pub aborted: bool,
}

/// Alpha-beta searcher for one side
pub struct Searcher {
    evaluator: Evaluator,
    nodes: u64,
    cutoffs: u64,
    stop: Option<Arc<AtomicBool>>,
}

impl Searcher {
    pub fn new(rules: &Rules) -> Self {
        Searcher {
            evaluator: Evaluator::new(rules),
            nodes: 0,
            cutoffs: 0,
            stop: None,
        }
    }

    /// Checks `stop` at every node and unwinds as soon as it is raised
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Best immediate action for "me" looking `depth` half-moves ahead
    pub fn choose_best_action(&mut self, state: &mut GameState, depth: u32) -> Option<Action> {
        self.search(state, depth).action
    }

    /// Root of the search: maximizes over my legal actions.
    ///
    /// Ties keep the first action found. The root keeps the full alpha-beta shape even
    /// though its beta bound is unbounded.
    pub fn search(&mut self, state: &mut GameState, depth: u32) -> SearchReport {
        self.nodes = 0;
        self.cutoffs = 0;

        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best: Option<(Action, f64)> = None;
        let mut root_values = Vec::new();

        for action in state.me.legal_actions() {
            self.nodes += 1;
            let value = {
                let mut child = state.play(Player::Me, action);
                self.reply_value(&mut child, Player::Enemy, alpha, beta, depth.saturating_sub(1))
            };
            debug!("  {:<10} {}", action.name(), value);
            root_values.push((action, value));

            let best_value = match best {
                Some((_, v)) if value <= v => v,
                _ => {
                    best = Some((action, value));
                    value
                }
            };

            if best_value >= beta {
                self.cutoffs += 1;
                break;
            }
            alpha = alpha.max(best_value);

            if self.stopped() {
                break;
            }
        }
        let aborted = self.stopped();

        debug!(
            "Search depth {}: {:?} (nodes: {}, cutoffs: {})",
            depth,
            best.map(|(a, _)| a.name()),
            self.nodes,
            self.cutoffs
        );

        SearchReport {
            action: best.map(|(a, _)| a),
            value: best.map(|(_, v)| v).unwrap_or(f64::NEG_INFINITY),
            root_values,
            nodes: self.nodes,
            cutoffs: self.cutoffs,
            aborted,
        }
    }

    /// Value of a position right after a half-move, with `next` to act
    fn reply_value(
        &mut self,
        state: &mut GameState,
        next: Player,
        alpha: f64,
        beta: f64,
        depth: u32,
    ) -> f64 {
        if state.is_terminal() {
            return self.evaluator.score(state);
        }
        match next {
            Player::Enemy => self.min_value(state, alpha, beta, depth),
            Player::Me => self.max_value(state, alpha, beta, depth),
        }
    }

    /// Enemy to move, minimizing
    fn min_value(&mut self, state: &mut GameState, alpha: f64, mut beta: f64, depth: u32) -> f64 {
        if depth < 1 || self.stopped() {
            return self.evaluator.score(state);
        }

        profile!("node", {
            let mut v = f64::INFINITY;
            for action in state.enemy.legal_actions() {
                self.nodes += 1;
                let value = {
                    let mut child = state.play(Player::Enemy, action);
                    self.reply_value(&mut child, Player::Me, alpha, beta, depth - 1)
                };
                v = v.min(value);

                if v <= alpha {
                    self.cutoffs += 1;
                    simple_profiler::record_alpha_beta_cutoff();
                    return v;
                }
                beta = beta.min(v);
            }
            v
        })
    }

    /// Me to move below the root, maximizing
    fn max_value(&mut self, state: &mut GameState, mut alpha: f64, beta: f64, depth: u32) -> f64 {
        if depth < 1 || self.stopped() {
            return self.evaluator.score(state);
        }

        profile!("node", {
            let mut v = f64::NEG_INFINITY;
            for action in state.me.legal_actions() {
                self.nodes += 1;
                let value = {
                    let mut child = state.play(Player::Me, action);
                    self.reply_value(&mut child, Player::Enemy, alpha, beta, depth - 1)
                };
                v = v.max(value);

                if v >= beta {
                    self.cutoffs += 1;
                    simple_profiler::record_alpha_beta_cutoff();
                    return v;
                }
                alpha = alpha.max(v);
            }
            v
        })
    }
}

/// Convenience wrapper: a fresh searcher for `state`'s rules
pub fn choose_best_action(state: &mut GameState, depth: u32) -> Option<Action> {
    Searcher::new(&state.rules).choose_best_action(state, depth)
}
