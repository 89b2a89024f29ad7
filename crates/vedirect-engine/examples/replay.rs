//! Example: Replay a captured VE.Direct text log through the decoder.
//!
//! Usage: cargo run --example replay -- <log_file>

use std::env;
use std::fs;

use vedirect_engine::{replay_log, Decoder};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <log_file>", args[0]);
        std::process::exit(1);
    }

    let log = fs::read_to_string(&args[1]).expect("Failed to read log file");

    let mut decoder = Decoder::new(
        Box::new(|path, value| println!("data   {} = {}", path, value)),
        Box::new(|path, value| println!("change {} = {}", path, value)),
    );
    replay_log(&log, &mut decoder);
}
