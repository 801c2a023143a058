// Replay module for analyzing logged decisions and debugging the search
//
// This module provides functionality to:
// 1. Parse JSONL decision logs
// 2. Re-run the search on each logged snapshot (in parallel, one GameState per entry)
// 3. Compare logged vs replayed actions
// 4. Generate summary reports

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::bot::Bot;
use crate::config::Config;
use crate::game::{Action, Rules};
use crate::types::WorldSnapshot;

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub turn: u32,
    pub chosen_action: Action,
    pub depth: u32,
    pub rules: Rules,
    pub snapshot: WorldSnapshot,
    pub timestamp: String,
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: u32,
    pub original_action: Action,
    pub replayed_action: Action,
    pub matches: bool,
    pub replayed_value: f64,
    pub nodes: u64,
    pub search_depth: u32,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    depth_override: Option<u32>,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            config,
            verbose,
            depth_override: None,
        }
    }

    /// Searches every entry at `depth` instead of the depth it was logged with
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth_override = Some(depth);
        self
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Re-runs the search on one snapshot
    /// Returns the chosen action, its value and the number of nodes searched
    pub fn replay_turn(
        &self,
        snapshot: &WorldSnapshot,
        rules: &Rules,
        depth: u32,
    ) -> Result<(Action, f64, u64), String> {
        let state = snapshot.to_game_state(rules)?;
        let report = Bot::compute_best_action(state, depth);
        let action = report
            .action
            .ok_or_else(|| format!("Turn {}: no legal action at the root", snapshot.turn))?;

        Ok((action, report.value, report.nodes))
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let depth = self.depth_override.unwrap_or(entry.depth);
        let start_time = Instant::now();
        let (replayed_action, replayed_value, nodes) =
            self.replay_turn(&entry.snapshot, &entry.rules, depth)?;
        let computation_time = start_time.elapsed().as_millis();

        let matches = entry.chosen_action == replayed_action;

        let result = ReplayResult {
            turn: entry.turn,
            original_action: entry.chosen_action,
            replayed_action,
            matches,
            replayed_value,
            nodes,
            search_depth: depth,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} (value: {}, depth: {}, time: {}ms)",
                    entry.turn,
                    replayed_action.name(),
                    replayed_value,
                    depth,
                    computation_time
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (value: {}, depth: {}, time: {}ms)",
                    entry.turn,
                    entry.chosen_action.name(),
                    replayed_action.name(),
                    replayed_value,
                    depth,
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries, spreading them over rayon's thread pool
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let n = results.len() as f64;
            let avg_time = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>() / n;
            let avg_nodes = results.iter().map(|r| r.nodes as f64).sum::<f64>() / n;

            println!("Average Nodes Searched:     {:.0}", avg_nodes);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} (value: {}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_action.name(),
                    result.replayed_action.name(),
                    result.replayed_value,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }

        if self.config.debug.enabled {
            println!("(decision logging is enabled in the loaded config)");
        }
    }

    /// Validates that the logged action for each turn is one of the acceptable ones
    pub fn validate_expected_actions(
        &self,
        entries: &[LogEntry],
        expected: &[(u32, Vec<Action>)],
    ) -> Result<(), String> {
        for (turn, acceptable) in expected {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            if !acceptable.contains(&entry.chosen_action) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|a| a.name()).collect::<Vec<_>>(),
                    entry.chosen_action.name()
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Agent, Board, Direction, GameState, Position, Side};

    fn sample_entry(turn: u32, chosen_action: Action) -> LogEntry {
        let rules = Rules::default();
        let board = Board::arena(8);
        let me = Agent::new(Side::Blue, Direction::Down, Position::new(1, 1), &rules);
        let enemy = Agent::new(Side::Yellow, Direction::Left, Position::new(6, 6), &rules);
        let state = GameState::new(board, me, enemy, rules);

        LogEntry {
            turn,
            chosen_action,
            depth: 2,
            rules,
            snapshot: WorldSnapshot::from_game_state(turn, &state),
            timestamp: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn result(turn: u32, matches: bool) -> ReplayResult {
        ReplayResult {
            turn,
            original_action: Action::Down,
            replayed_action: if matches { Action::Down } else { Action::Right },
            matches,
            replayed_value: 0.0,
            nodes: 10,
            search_depth: 2,
            computation_time_ms: 1,
        }
    }

    #[test]
    fn test_generate_stats() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let results = [result(1, true), result(2, false), result(3, true), result(4, true)];
        let stats = engine.generate_stats(&results);

        assert_eq!(stats.total_turns, 4);
        assert_eq!(stats.matches, 3);
        assert_eq!(stats.mismatches, 1);
        assert!((stats.match_rate - 75.0).abs() < 1e-9);

        let empty = engine.generate_stats(&[]);
        assert_eq!(empty.match_rate, 0.0);
    }

    #[test]
    fn test_replay_entry_uses_logged_depth_unless_overridden() {
        let entry = sample_entry(3, Action::Down);

        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let replayed = engine.replay_entry(&entry).unwrap();
        assert_eq!(replayed.turn, 3);
        assert_eq!(replayed.search_depth, 2);
        assert_eq!(replayed.matches, replayed.replayed_action == Action::Down);

        let shallow = ReplayEngine::new(Config::default_hardcoded(), false).with_depth(1);
        assert_eq!(shallow.replay_entry(&entry).unwrap().search_depth, 1);
    }

    #[test]
    fn test_replay_all_keeps_log_order() {
        let entries: Vec<LogEntry> = (0..6).map(|t| sample_entry(t, Action::Down)).collect();
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);

        let results = engine.replay_all(&entries);
        let turns: Vec<u32> = results.iter().map(|r| r.turn).collect();
        assert_eq!(turns, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_replay_turns_reports_missing_turn() {
        let entries = vec![sample_entry(1, Action::Down)];
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);

        assert_eq!(engine.replay_turns(&entries, &[1]).unwrap().len(), 1);
        assert!(engine.replay_turns(&entries, &[1, 9]).is_err());
    }

    #[test]
    fn test_validate_expected_actions() {
        let entries = vec![sample_entry(4, Action::RightBreak)];
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);

        assert!(engine
            .validate_expected_actions(&entries, &[(4, vec![Action::Right, Action::RightBreak])])
            .is_ok());
        assert!(engine
            .validate_expected_actions(&entries, &[(4, vec![Action::Down])])
            .is_err());
        assert!(engine
            .validate_expected_actions(&entries, &[(5, vec![Action::Down])])
            .is_err());
    }

    #[test]
    fn test_log_line_parses() {
        let entry = sample_entry(7, Action::Up);
        let line = serde_json::to_string(&entry).unwrap();
        let parsed: LogEntry = serde_json::from_str(&line).unwrap();

        assert_eq!(parsed.turn, 7);
        assert_eq!(parsed.chosen_action, Action::Up);
        assert_eq!(parsed.snapshot, entry.snapshot);
    }
}
