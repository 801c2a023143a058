// Move simulator scenarios
//
// Exercises commit/reverse through the public API:
// - Boundary collisions
// - Trail tolls with and without the wall-breaker
// - Mutual occupancy
// - Exact restoration over long random walks

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use trailbreaker::evaluator::Evaluator;
use trailbreaker::game::{Action, Agent, Board, Cell, Direction, GameState, Player, Position, Rules, Side};

fn arena_state(me: (i32, i32, Direction), enemy: (i32, i32, Direction)) -> GameState {
    let rules = Rules::default();
    let me = Agent::new(Side::Blue, me.2, Position::new(me.0, me.1), &rules);
    let enemy = Agent::new(Side::Yellow, enemy.2, Position::new(enemy.0, enemy.1), &rules);
    GameState::new(Board::arena(10), me, enemy, rules)
}

#[test]
fn test_boundary_collision_kills_without_moving() {
    let mut state = arena_state((1, 1, Direction::Down), (8, 8, Direction::Up));
    let original = state.clone();

    let token = state.commit(Player::Me, Action::Left);

    assert_eq!(state.me.health, 0);
    assert_eq!(state.me.score, 1 - 20);
    assert_eq!(state.me.position, Position::new(1, 1));
    assert_eq!(token.player(), Player::Me);
    assert_eq!(token.destination(), Position::new(1, 0));
    assert_eq!(token.destination_cell(), Cell::Boundary);
    assert_eq!(token.agent_before().health, 3);
    assert!(state.is_terminal());

    state.reverse(token);
    assert_eq!(state, original);
}

#[test]
fn test_boundary_collision_at_one_health() {
    let mut state = arena_state((1, 1, Direction::Right), (8, 8, Direction::Up));
    state.me.health = 1;
    let original = state.clone();

    let token = state.commit(Player::Me, Action::Up);

    assert_eq!(state.me.health, 0);
    assert_eq!(state.me.score, 1 - 20, "boundary crashes use the boundary score only");
    assert_eq!(state.me.position, Position::new(1, 1));
    assert_eq!(state.me.direction, Direction::Right);
    assert_eq!(token.debited(), None);
    assert_eq!(state.enemy.score, 0);
    assert!(state.is_terminal());

    state.reverse(token);
    assert_eq!(state, original);
}

#[test]
fn test_trail_toll_without_breaker() {
    let mut state = arena_state((2, 1, Direction::Down), (8, 8, Direction::Up));
    state.board.set(Position::new(3, 1), Cell::YellowTrail);
    let original = state.clone();

    let token = state.commit(Player::Me, Action::Down);

    assert_eq!(state.me.health, 2, "entering a trail costs one health");
    assert_eq!(state.me.score, 1);
    assert_eq!(state.enemy.score, -1, "the trail's owner pays the toll");
    assert_eq!(state.me.position, Position::new(3, 1));
    assert_eq!(state.board.get(Position::new(3, 1)), Cell::Empty);
    assert_eq!(state.board.get(Position::new(2, 1)), Cell::BlueTrail);
    assert_eq!(token.debited(), Some(Player::Enemy));
    assert!(!state.is_terminal());

    state.reverse(token);
    assert_eq!(state, original);
}

#[test]
fn test_breaker_passes_through_trails() {
    let mut state = arena_state((1, 1, Direction::Down), (8, 8, Direction::Up));
    state.board.set(Position::new(3, 1), Cell::YellowTrail);
    let original = state.clone();

    let first = state.commit(Player::Me, Action::DownBreak);
    assert!(state.me.is_breaker_active);
    assert!(!state.me.can_activate_breaker);
    assert_eq!(state.me.breaker_remaining, state.rules.wall_breaker_duration);

    let second = state.commit(Player::Me, Action::Down);
    assert_eq!(state.me.health, 3, "no damage while the breaker is active");
    assert_eq!(state.me.score, 2);
    assert_eq!(state.enemy.score, -1, "the toll is still paid");
    assert_eq!(state.me.position, Position::new(3, 1));

    state.reverse(second);
    state.reverse(first);
    assert_eq!(state, original);
}

#[test]
fn test_breaker_expires_after_duration() {
    let mut state = arena_state((1, 1, Direction::Down), (8, 8, Direction::Up));
    let duration = state.rules.wall_breaker_duration;
    let cooldown = state.rules.wall_breaker_cooldown;

    let _ = state.commit(Player::Me, Action::DownBreak);
    for step in 1..=duration {
        assert!(state.me.is_breaker_active, "still active before step {}", step);
        let _ = state.commit(Player::Me, Action::Down);
    }

    assert!(!state.me.is_breaker_active);
    assert_eq!(state.me.breaker_remaining, 0);
    assert_eq!(state.me.breaker_cooldown, cooldown - 1 - duration);
    assert!(!state.me.can_activate_breaker);
    assert_eq!(state.me.legal_actions().len(), 3);
}

#[test]
fn test_mutual_occupancy_is_terminal() {
    let mut state = arena_state((2, 2, Direction::Right), (2, 4, Direction::Left));

    let mine = state.commit(Player::Me, Action::Right);
    assert!(!state.is_terminal());
    let theirs = state.commit(Player::Enemy, Action::Left);

    assert_eq!(state.me.position, state.enemy.position);
    assert!(state.is_terminal());
    assert_eq!(Evaluator::new(&state.rules).score(&state), 0.0);

    state.reverse(theirs);
    state.reverse(mine);
    assert_eq!(state.me.position, Position::new(2, 2));
    assert_eq!(state.enemy.position, Position::new(2, 4));
}

#[test]
fn test_random_walks_reverse_exactly() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..25 {
        let mut state = arena_state((1, 1, Direction::Down), (8, 8, Direction::Left));
        let original = state.clone();
        let mut tokens = Vec::new();
        let mut snapshots = Vec::new();
        let mut player = Player::Me;

        while tokens.len() < 60 && !state.is_terminal() {
            let actions = state.agent(player).legal_actions();
            let action = *actions.choose(&mut rng).unwrap();

            snapshots.push(state.clone());
            tokens.push(state.commit(player, action));
            assert_eq!(state.stack_height() as usize, tokens.len());
            player = player.other();
        }

        while let Some(token) = tokens.pop() {
            state.reverse(token);
            assert_eq!(Some(&state), snapshots.last());
            snapshots.pop();
        }

        assert_eq!(state, original);
    }
}

#[test]
fn test_guard_restores_state_on_unwind() {
    let mut state = arena_state((1, 1, Direction::Down), (8, 8, Direction::Left));
    let original = state.clone();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut child = state.play(Player::Me, Action::Down);
        let _grandchild = child.play(Player::Enemy, Action::Left);
        panic!("search aborted");
    }));

    assert!(result.is_err());
    assert_eq!(state, original);
}
