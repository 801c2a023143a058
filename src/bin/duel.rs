// Self-play driver: pits the search against itself or a random opponent on an arena board
//
// Usage:
//   cargo run --release --bin duel -- [options]
//
// Options:
//   --size <n>            Arena side length (default: 20)
//   --depth <d>           Search depth for the engine (default: from config)
//   --opponent <kind>     "self" or "random" (default: self)
//   --seed <s>            Seed for the random opponent (default: 42)
//   --config <path>       Path to Trailbreaker.toml (default: Trailbreaker.toml)
//   --verbose             Print the board after every cycle
//
// Set TRAILBREAKER_PROFILE=1 to print a profile of the engine's searches at the end.

use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::env;
use std::process;
use std::time::Instant;

use trailbreaker::bot::Bot;
use trailbreaker::config::Config;
use trailbreaker::game::{Action, Agent, Board, Direction, GameState, Player, Position, Side};
use trailbreaker::simple_profiler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opponent {
    Engine,
    Random,
}

struct DuelOptions {
    size: usize,
    depth: Option<u32>,
    opponent: Opponent,
    seed: u64,
    config_path: String,
    verbose: bool,
}

fn print_usage() {
    eprintln!("Trailbreaker Duel");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  duel [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --size <n>            Arena side length (default: 20)");
    eprintln!("  --depth <d>           Search depth for the engine (default: from config)");
    eprintln!("  --opponent <kind>     self | random (default: self)");
    eprintln!("  --seed <s>            Seed for the random opponent (default: 42)");
    eprintln!("  --config <path>       Path to Trailbreaker.toml (default: Trailbreaker.toml)");
    eprintln!("  --verbose             Print the board after every cycle");
    eprintln!("  --help                Show this help message");
}

fn parse_args(args: &[String]) -> Result<DuelOptions, String> {
    let mut options = DuelOptions {
        size: 20,
        depth: None,
        opponent: Opponent::Engine,
        seed: 42,
        config_path: "Trailbreaker.toml".to_string(),
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = move || {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} requires an argument", flag))
        };

        match flag {
            "--size" => {
                let raw = value()?;
                options.size = raw
                    .parse()
                    .map_err(|e| format!("Invalid size '{}': {}", raw, e))?;
                if options.size < 6 {
                    return Err(format!("Arena size must be at least 6, got {}", options.size));
                }
                i += 1;
            }
            "--depth" => {
                let raw = value()?;
                let depth: u32 = raw
                    .parse()
                    .map_err(|e| format!("Invalid depth '{}': {}", raw, e))?;
                if depth < 1 {
                    return Err("Depth must be at least 1".to_string());
                }
                options.depth = Some(depth);
                i += 1;
            }
            "--opponent" => {
                options.opponent = match value()?.as_str() {
                    "self" => Opponent::Engine,
                    "random" => Opponent::Random,
                    other => return Err(format!("Unknown opponent '{}'", other)),
                };
                i += 1;
            }
            "--seed" => {
                let raw = value()?;
                options.seed = raw
                    .parse()
                    .map_err(|e| format!("Invalid seed '{}': {}", raw, e))?;
                i += 1;
            }
            "--config" => {
                options.config_path = value()?;
                i += 1;
            }
            "--verbose" => options.verbose = true,
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 1;
    }

    Ok(options)
}

/// The same position seen from the other side of the table
fn mirrored(state: &GameState) -> GameState {
    GameState::new(state.board.clone(), state.enemy, state.me, state.rules)
}

fn engine_action(state: &GameState, depth: u32) -> Action {
    let report = Bot::compute_best_action(state.clone(), depth);
    report
        .action
        .unwrap_or_else(|| Action::plain(state.me.direction))
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(0);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", options.config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });
    let rules = config.rules;
    let depth = options.depth.unwrap_or(config.search.depth);
    let n = options.size;

    let corner = n as i32 - 2;
    let blue = Agent::new(Side::Blue, Direction::Down, Position::new(1, 1), &rules);
    let yellow = Agent::new(Side::Yellow, Direction::Left, Position::new(corner, corner), &rules);
    let mut state = GameState::new(Board::arena(n), blue, yellow, rules);
    let mut rng = StdRng::seed_from_u64(options.seed);

    println!(
        "Duel on a {}x{} arena, depth {}, opponent: {:?}, max cycles: {}",
        n, n, depth, options.opponent, rules.max_cycles
    );
    println!("{}", state);

    let start = Instant::now();
    let mut cycle = 0;
    while cycle < rules.max_cycles && !state.is_terminal() {
        cycle += 1;

        let blue_action = engine_action(&state, depth);
        let yellow_action = match options.opponent {
            Opponent::Engine => engine_action(&mirrored(&state), depth),
            Opponent::Random => state
                .enemy
                .legal_actions()
                .choose(&mut rng)
                .copied()
                .unwrap_or_else(|| Action::plain(state.enemy.direction)),
        };

        info!(
            "Cycle {}: Blue {}, Yellow {}",
            cycle,
            blue_action.name(),
            yellow_action.name()
        );

        state.apply(Player::Me, blue_action);
        if !state.is_terminal() {
            state.apply(Player::Enemy, yellow_action);
        }

        if options.verbose {
            println!(
                "Cycle {}: Blue {} / Yellow {}",
                cycle,
                blue_action.name(),
                yellow_action.name()
            );
            println!("{}", state);
        }
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    if !options.verbose {
        println!("{}", state);
    }

    let outcome = match (state.me.score - state.enemy.score).signum() {
        1 => "Blue wins",
        -1 => "Yellow wins",
        _ => match state.me.health.cmp(&state.enemy.health) {
            std::cmp::Ordering::Greater => "Blue wins on health",
            std::cmp::Ordering::Less => "Yellow wins on health",
            std::cmp::Ordering::Equal => "Draw",
        },
    };

    println!(
        "{} after {} cycle(s) in {}ms (Blue {} / {} hp, Yellow {} / {} hp)",
        outcome,
        cycle,
        elapsed_ms,
        state.me.score,
        state.me.health,
        state.enemy.score,
        state.enemy.health
    );

    simple_profiler::print_report(elapsed_ms);
}
