// Static evaluation of a game state from "my" side's point of view

use crate::game::{GameState, Rules};
use crate::profile;

/// Scores leaves of the search tree.
///
/// Decisive terminal states saturate to +/- infinity; everything else is the score
/// difference plus the health difference weighted by the initial health.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    health_weight: f64,
}

impl Evaluator {
    pub fn new(rules: &Rules) -> Self {
        Evaluator {
            health_weight: rules.init_health as f64,
        }
    }

    pub fn score(&self, state: &GameState) -> f64 {
        profile!("eval", {
            let difference = state.me.score as f64 - state.enemy.score as f64;

            if state.is_terminal() {
                if difference > 0.0 {
                    return f64::INFINITY;
                }
                if difference < 0.0 {
                    return f64::NEG_INFINITY;
                }
            }

            let health_lead = state.me.health as f64 - state.enemy.health as f64;
            difference + health_lead * self.health_weight
        })
    }
}
