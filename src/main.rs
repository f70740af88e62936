//! # satlp
//!
//! Command-line front end to the CDCL engine in the `satlp` library.
//!
//! ## Usage
//!
//! ```sh
//! # Solve a DIMACS file with the default heuristic and restart policy
//! satlp problem.cnf
//!
//! # Same, explicitly, with VSIDS and Luby restarts
//! satlp file --path problem.cnf --heuristic vsids --restart luby
//!
//! # Solve every .cnf file below a directory
//! satlp dir --path benchmarks/
//!
//! # Solve inline CNF under the hypotheses x1 and not x3
//! satlp text --input "1 2 0 -1 3 0" --hypotheses 1,-3 --print-solution
//!
//! # Shell completions
//! satlp completions zsh > _satlp
//! ```
//!
//! Logging goes through `env_logger`: `RUST_LOG=analysis=trace` follows
//! conflict analysis, `--debug` raises the default level to `debug`.
//!
//! Results follow the SAT competition output format: `c` comment lines, one
//! `s` status line, and with `--print-solution` a `v` line holding the model.

mod command_line;

use crate::command_line::cli::{
    Cli, Commands, CommonOptions, parse_text, solve_and_report, solve_dir, solve_path,
};
use clap::{CommandFactory, Parser};
use std::time::Instant;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// statistics.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(common: &CommonOptions) {
    let default = if common.debug { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Some(Commands::File { path, common }) => {
            init_logging(&common);
            solve_path(&path, &common)
        }
        Some(Commands::Dir { path, common }) => {
            init_logging(&common);
            solve_dir(&path, &common)
        }
        Some(Commands::Text { input, common }) => {
            init_logging(&common);
            let time = Instant::now();
            let cnf = parse_text(&input)?;
            solve_and_report(&cnf, &common, time.elapsed())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            init_logging(&cli.common);
            match cli.path {
                Some(path) => solve_path(&path, &cli.common),
                None => Err("No command provided. Use --help for more information.".to_string()),
            }
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
