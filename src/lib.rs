// Library exports for the Trailbreaker agent
// The service binary, the replay tool and the duel driver all share this core

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod evaluator;
pub mod game;
pub mod render;
pub mod replay;
pub mod search;
pub mod simple_profiler;
pub mod simulator;
pub mod types;
