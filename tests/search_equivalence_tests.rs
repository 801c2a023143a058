// Alpha-beta against a plain minimax reference
//
// The reference below walks the full tree with the same move order, depth accounting and
// terminal handling as the searcher, but never prunes. On every position both must agree
// on the chosen action and its value, and the pruned search must never visit more nodes.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use trailbreaker::evaluator::Evaluator;
use trailbreaker::game::{Action, Agent, Board, Direction, GameState, Player, Position, Rules, Side};
use trailbreaker::search::Searcher;

struct Minimax {
    evaluator: Evaluator,
    nodes: u64,
}

impl Minimax {
    fn value_after_move(&mut self, state: &mut GameState, next: Player, depth: u32) -> f64 {
        if state.is_terminal() || depth < 1 {
            return self.evaluator.score(state);
        }

        let actions = state.agent(next).legal_actions();
        let mut values = Vec::with_capacity(actions.len());
        for action in actions {
            self.nodes += 1;
            let mut child = state.play(next, action);
            values.push(self.value_after_move(&mut child, next.other(), depth - 1));
        }

        match next {
            Player::Me => values.into_iter().fold(f64::NEG_INFINITY, f64::max),
            Player::Enemy => values.into_iter().fold(f64::INFINITY, f64::min),
        }
    }

    fn root(&mut self, state: &mut GameState, depth: u32) -> (Option<Action>, f64) {
        let mut best: Option<(Action, f64)> = None;
        for action in state.me.legal_actions() {
            self.nodes += 1;
            let value = {
                let mut child = state.play(Player::Me, action);
                self.value_after_move(&mut child, Player::Enemy, depth.saturating_sub(1))
            };
            match best {
                Some((_, v)) if value <= v => {}
                _ => best = Some((action, value)),
            }
        }
        (best.map(|(a, _)| a), best.map(|(_, v)| v).unwrap_or(f64::NEG_INFINITY))
    }
}

/// A mid-game position reached by a seeded random walk from the opening
fn random_position(rng: &mut StdRng, n: usize, plies: usize) -> GameState {
    let mut rules = Rules::default();
    rules.wall_breaker_duration = 2;
    rules.wall_breaker_cooldown = 5;

    let corner = n as i32 - 2;
    let me = Agent::new(Side::Blue, Direction::Down, Position::new(1, 1), &rules);
    let enemy = Agent::new(Side::Yellow, Direction::Left, Position::new(corner, corner), &rules);
    let mut state = GameState::new(Board::arena(n), me, enemy, rules);

    let mut player = Player::Me;
    for _ in 0..plies {
        if state.is_terminal() {
            break;
        }
        let actions = state.agent(player).legal_actions();
        let action = *actions.choose(rng).unwrap();
        state.apply(player, action);
        player = player.other();
    }

    state
}

#[test]
fn test_alpha_beta_matches_minimax() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut positions = 0;

    while positions < 30 {
        let plies = 2 * (positions % 6);
        let mut state = random_position(&mut rng, 8, plies);
        if state.is_terminal() {
            continue;
        }
        positions += 1;

        for depth in 1..=4 {
            let mut reference = Minimax {
                evaluator: Evaluator::new(&state.rules),
                nodes: 0,
            };
            let (expected_action, expected_value) = reference.root(&mut state, depth);

            let report = Searcher::new(&state.rules).search(&mut state, depth);

            assert_eq!(
                report.action, expected_action,
                "action differs at depth {} after {} plies",
                depth, plies
            );
            assert_eq!(
                report.value, expected_value,
                "value differs at depth {} after {} plies",
                depth, plies
            );
            assert!(
                report.nodes <= reference.nodes,
                "pruned search visited {} nodes, full tree has {}",
                report.nodes,
                reference.nodes
            );
        }
    }
}

#[test]
fn test_search_leaves_state_unchanged() {
    let mut rng = StdRng::seed_from_u64(99);

    for plies in [0, 3, 8, 15] {
        let mut state = random_position(&mut rng, 10, plies);
        let original = state.clone();

        let _ = Searcher::new(&state.rules).search(&mut state, 5);

        assert_eq!(state, original);
    }
}

#[test]
fn test_search_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = random_position(&mut rng, 10, 6);

    let first = Searcher::new(&state.rules).search(&mut state, 4);
    let second = Searcher::new(&state.rules).search(&mut state, 4);

    assert_eq!(first.action, second.action);
    assert_eq!(first.value, second.value);
    assert_eq!(first.nodes, second.nodes);
}
