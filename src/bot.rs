// Decision service: turns host snapshots into commands.
//
// Each decide call builds a fresh GameState from the snapshot, runs the fixed-depth search
// on tokio's blocking pool and waits for it at most `decision_timeout_ms`. When the wait runs
// out the service raises the search's stop flag and answers with the current facing; the
// abandoned search unwinds at its next node.

use log::{error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::game::{Action, GameState, Rules};
use crate::search::{SearchReport, Searcher};
use crate::simple_profiler;
use crate::types::{Command, EndRequest, StartRequest, WorldSnapshot};

/// Answer to one decide call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub turn: u32,
    pub action: Action,
    pub commands: Vec<Command>,
    /// True when the action is the keep-facing fallback rather than a search result
    pub fallback: bool,
}

/// Takes static configuration and exposes methods corresponding to the host calls
pub struct Bot {
    config: Config,
    /// Rules of the game in progress; replaced by the host's constants at start
    rules: RwLock<Rules>,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Self::with_logger(config, DebugLogger::disabled())
    }

    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        let rules = config.rules;
        Bot {
            config,
            rules: RwLock::new(rules),
            logger,
        }
    }

    /// Returns bot metadata
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "name": "trailbreaker",
            "version": env!("CARGO_PKG_VERSION"),
            "search_depth": self.config.search.depth,
        })
    }

    /// Called when a game starts with the host's tunables
    /// Corresponds to POST /start endpoint
    pub fn start(&self, request: &StartRequest) {
        info!("GAME START {}: {:?}", request.game_id, request.constants);
        *self.rules.write() = request.constants;
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, request: &EndRequest) {
        match request.winner {
            Some(side) => info!("GAME OVER {}: {:?} wins", request.game_id, side),
            None => info!("GAME OVER {}", request.game_id),
        }
    }

    /// Rules the next decision will be searched under
    pub fn rules(&self) -> Rules {
        *self.rules.read()
    }

    /// Computes the commands for this cycle
    /// Corresponds to POST /decide endpoint
    ///
    /// # Returns
    /// * `Err` only when the snapshot cannot be turned into a game state
    pub async fn decide(&self, snapshot: &WorldSnapshot) -> Result<Decision, String> {
        let start_time = Instant::now();
        let turn = snapshot.turn;

        let rules = self.rules();
        let state = snapshot.to_game_state(&rules)?;
        let keep_facing = Action::plain(state.me.direction);
        let depth = self.config.search.depth;
        let budget = Duration::from_millis(self.config.search.decision_timeout_ms);

        info!("Turn {}: Computing action (depth {})", turn, depth);

        let stop = Arc::new(AtomicBool::new(false));
        let search_stop = stop.clone();
        let task = tokio::task::spawn_blocking(move || {
            Bot::compute_best_action_until(state, depth, search_stop)
        });

        let (action, fallback) = match tokio::time::timeout(budget, task).await {
            Ok(Ok(report)) => match report.action {
                Some(action) => (action, false),
                None => {
                    warn!("Turn {}: No legal action at the root", turn);
                    (keep_facing, true)
                }
            },
            Ok(Err(e)) => {
                error!("Turn {}: Search task failed: {}", turn, e);
                (keep_facing, true)
            }
            Err(_) => {
                stop.store(true, Ordering::Relaxed);
                warn!(
                    "Turn {}: Search exceeded {}ms, keeping current facing",
                    turn,
                    budget.as_millis()
                );
                (keep_facing, true)
            }
        };

        info!(
            "Turn {}: Chose {}{} (time: {}ms)",
            turn,
            action.name(),
            if fallback { " [fallback]" } else { "" },
            start_time.elapsed().as_millis()
        );

        self.logger.log_decision(snapshot.clone(), rules, action, depth);

        Ok(Decision {
            turn,
            action,
            commands: Command::for_action(action),
            fallback,
        })
    }

    /// Runs one complete search on an owned state
    pub fn compute_best_action(state: GameState, depth: u32) -> SearchReport {
        Self::compute_best_action_until(state, depth, Arc::new(AtomicBool::new(false)))
    }

    /// Same as `compute_best_action`, abandoning the search once `stop` is raised
    pub fn compute_best_action_until(
        mut state: GameState,
        depth: u32,
        stop: Arc<AtomicBool>,
    ) -> SearchReport {
        let start_time = Instant::now();
        let report = Searcher::new(&state.rules)
            .with_stop_flag(stop)
            .search(&mut state, depth);

        if report.aborted {
            warn!(
                "Search aborted after {} nodes ({}ms)",
                report.nodes,
                start_time.elapsed().as_millis()
            );
            simple_profiler::merge_thread_local();
            return report;
        }

        info!(
            "Search complete. Best action: {:?}, Value: {}, Nodes: {}, Cutoffs: {}, Time: {}ms",
            report.action.map(|a| a.name()),
            report.value,
            report.nodes,
            report.cutoffs,
            start_time.elapsed().as_millis()
        );
        simple_profiler::merge_thread_local();

        report
    }
}
