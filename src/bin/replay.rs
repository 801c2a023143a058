// Standalone replay tool for analyzing Trailbreaker decision logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all turns
//   --turns <turn1,turn2>  Replay specific turns (comma-separated)
//   --validate             Run validation mode with expected actions
//   --verbose              Show detailed output for each turn
//   --config <path>        Path to Trailbreaker.toml (default: Trailbreaker.toml)
//   --depth <n>            Search depth to replay with (default: the logged depth)

use std::env;
use std::process;

use trailbreaker::config::Config;
use trailbreaker::game::Action;
use trailbreaker::replay::ReplayEngine;

enum Mode {
    All,
    Turns(String),
    Validate(String),
}

fn print_usage() {
    eprintln!("Trailbreaker Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all turns in the log");
    eprintln!("  --turns <T1,T2,...>     Replay specific turns (comma-separated)");
    eprintln!("  --validate <T:A,...>    Validate logged actions (format: turn:action,...)");
    eprintln!("  --verbose               Show detailed output for each turn");
    eprintln!("  --config <path>         Path to Trailbreaker.toml (default: Trailbreaker.toml)");
    eprintln!("  --depth <n>             Replay at this depth instead of the logged one");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all turns");
    eprintln!("  replay trailbreaker_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Replay specific turns at depth 6");
    eprintln!("  replay trailbreaker_debug.jsonl --turns 5,10,15 --depth 6");
    eprintln!();
    eprintln!("  # Validate expected actions ('|' separates acceptable alternatives)");
    eprintln!("  replay trailbreaker_debug.jsonl --validate 5:Up,10:Right|RightBreak");
}

fn parse_turns(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_actions(s: &str) -> Result<Vec<(u32, Vec<Action>)>, String> {
    s.split(',')
        .map(|pair| {
            let (turn, actions) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'turn:action'", pair))?;

            let turn = turn
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;

            let actions = actions
                .split('|')
                .map(Action::parse)
                .collect::<Result<Vec<Action>, String>>()?;

            Ok((turn, actions))
        })
        .collect()
}

fn next_arg(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut config_path = "Trailbreaker.toml".to_string();
    let mut verbose = false;
    let mut depth = None;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--turns" => {
                mode = Some(Mode::Turns(next_arg(&args, i, "--turns")));
                i += 1;
            }
            "--validate" => {
                mode = Some(Mode::Validate(next_arg(&args, i, "--validate")));
                i += 1;
            }
            "--config" => {
                config_path = next_arg(&args, i, "--config");
                i += 1;
            }
            "--depth" => {
                let raw = next_arg(&args, i, "--depth");
                match raw.parse::<u32>() {
                    Ok(d) if d >= 1 => depth = Some(d),
                    _ => {
                        eprintln!("Error: Invalid depth '{}'", raw);
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = match mode {
        Some(mode) => mode,
        None => {
            eprintln!("Error: Must specify --all, --turns, or --validate");
            print_usage();
            process::exit(1);
        }
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let mut engine = ReplayEngine::new(config, verbose);
    if let Some(depth) = depth {
        engine = engine.with_depth(depth);
    }

    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    match mode {
        Mode::All => {
            println!("Replaying all {} turns...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Turns(turn_arg) => {
            let turns = match parse_turns(&turn_arg) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Error parsing turns: {}", e);
                    process::exit(1);
                }
            };

            println!("Replaying {} specific turn(s)...\n", turns.len());
            match engine.replay_turns(&entries, &turns) {
                Ok(results) => {
                    engine.print_report(&results);
                }
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Validate(validate_arg) => {
            let expected = match parse_expected_actions(&validate_arg) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error parsing expected actions: {}", e);
                    process::exit(1);
                }
            };

            println!("Validating {} expected action(s)...\n", expected.len());
            match engine.validate_expected_actions(&entries, &expected) {
                Ok(()) => {
                    println!("✓ All expected actions validated successfully!");
                }
                Err(e) => {
                    eprintln!("✗ Validation failed: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
