#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use satlp::sat::cdcl::Cdcl;
use satlp::sat::cnf::Cnf;
use satlp::sat::configs::{
    CountFixed, CountLuby, CountNever, OrderFixed, OrderLuby, OrderNever, RandomFixed, RandomLuby,
    RandomNever, VsidsFixed, VsidsLuby, VsidsNever,
};
use satlp::sat::dimacs::{parse_dimacs, parse_file};
use satlp::sat::literal::Literal;
use satlp::sat::solver::{HypothesisOutcome, Options, SolveResult, Solver, SolverConfig, Stats};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "satlp",
    version,
    about = "A CDCL SAT engine with a hypothesis interface",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file to solve when no subcommand is given.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `dir`, `text`).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.cnf` file below a directory.
    Dir {
        /// The directory to walk.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal CNF input as a string (e.g. "1 -2 0 2 3 0").
        /// A `p cnf` header is optional; without one the largest variable
        /// mentioned sets the variable count.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Branching heuristics selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Heuristic {
    /// Most frequent live literal.
    #[default]
    Count,
    /// Smallest unassigned variable.
    Fixed,
    /// Seeded random choice.
    Random,
    /// Conflict activity.
    Vsids,
}

/// Restart policies selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RestartPolicy {
    /// After every 100 conflicts.
    #[default]
    Fixed,
    /// Luby sequence in units of 32 conflicts.
    Luby,
    /// Never.
    Never,
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging. `RUST_LOG` still takes precedence.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a found model against the input formula.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the model if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Branching heuristic.
    #[arg(long, value_enum, default_value_t = Heuristic::Count)]
    pub(crate) heuristic: Heuristic,

    /// Restart policy.
    #[arg(long, value_enum, default_value_t = RestartPolicy::Fixed)]
    pub(crate) restart: RestartPolicy,

    /// Seed for the random heuristic.
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,

    /// Give up with UNKNOWN after this many conflicts.
    #[arg(long)]
    pub(crate) max_conflicts: Option<usize>,

    /// Restart once an analysis takes this many resolution steps.
    #[arg(long)]
    pub(crate) max_resolution_steps: Option<usize>,

    /// Literals to fix at level 0 before solving, comma separated (e.g. `1,-3`).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub(crate) hypotheses: Vec<i32>,
}

impl CommonOptions {
    pub(crate) const fn options(&self) -> Options {
        Options {
            seed: self.seed,
            max_resolution_steps: self.max_resolution_steps,
            max_conflicts: self.max_conflicts,
        }
    }
}

/// What a single solve produced.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) result: SolveResult,
    pub(crate) stats: Stats,
    pub(crate) elapsed: Duration,
}

type SolveFn = fn(&Cnf, &CommonOptions) -> Result<Outcome, String>;

/// Picks the monomorphised solve for the chosen heuristic and restart policy.
pub(crate) fn solver_for(common: &CommonOptions) -> SolveFn {
    match (common.heuristic, common.restart) {
        (Heuristic::Count, RestartPolicy::Fixed) => solve_with::<CountFixed>,
        (Heuristic::Count, RestartPolicy::Luby) => solve_with::<CountLuby>,
        (Heuristic::Count, RestartPolicy::Never) => solve_with::<CountNever>,
        (Heuristic::Fixed, RestartPolicy::Fixed) => solve_with::<OrderFixed>,
        (Heuristic::Fixed, RestartPolicy::Luby) => solve_with::<OrderLuby>,
        (Heuristic::Fixed, RestartPolicy::Never) => solve_with::<OrderNever>,
        (Heuristic::Random, RestartPolicy::Fixed) => solve_with::<RandomFixed>,
        (Heuristic::Random, RestartPolicy::Luby) => solve_with::<RandomLuby>,
        (Heuristic::Random, RestartPolicy::Never) => solve_with::<RandomNever>,
        (Heuristic::Vsids, RestartPolicy::Fixed) => solve_with::<VsidsFixed>,
        (Heuristic::Vsids, RestartPolicy::Luby) => solve_with::<VsidsLuby>,
        (Heuristic::Vsids, RestartPolicy::Never) => solve_with::<VsidsNever>,
    }
}

/// Fixes the requested hypotheses, then runs the search.
///
/// # Errors
///
/// If a hypothesis is `0` or names a variable outside the formula.
pub(crate) fn solve_with<C: SolverConfig>(
    cnf: &Cnf,
    common: &CommonOptions,
) -> Result<Outcome, String> {
    let mut solver = Cdcl::<C>::new(cnf.clone(), common.options());

    if !common.hypotheses.is_empty() {
        let hypotheses = common
            .hypotheses
            .iter()
            .map(|&value| {
                Literal::from_i32(value).ok_or_else(|| format!("{value} is not a valid hypothesis"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match solver
            .assign_hypotheses(&hypotheses)
            .map_err(|e| e.to_string())?
        {
            HypothesisOutcome::Consistent { trail } => {
                log::info!("hypotheses fix {} literals at level 0", trail.len());
            }
            HypothesisOutcome::Contradictory { core } => {
                println!("c hypotheses contradict: {}", core.iter().join(" "));
            }
        }
    }

    let time = Instant::now();
    let result = solver.solve();
    let elapsed = time.elapsed();

    Ok(Outcome {
        result,
        stats: solver.stats(),
        elapsed,
    })
}

/// Parses a DIMACS file, solves it and reports the results.
///
/// # Errors
///
/// If the file cannot be parsed or a model fails verification.
pub(crate) fn solve_path(path: &Path, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let cnf = parse_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parse_time = time.elapsed();

    println!("c solving {}", path.display());
    solve_and_report(&cnf, common, parse_time)
}

/// Solves a directory of CNF files.
/// This function walks the directory, parses each `.cnf` file it finds,
/// solves it, and reports the results.
///
/// # Errors
///
/// If the path is not a directory, or on the first file that cannot be
/// parsed or whose model fails verification.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            log::debug!("skipping non-CNF file {}", file_path.display());
            continue;
        }

        solve_path(file_path, common)?;
    }

    Ok(())
}

/// Parses inline CNF text. Clauses end with `0` and may share a line; a
/// literal `\n` is read as a line break.
///
/// # Errors
///
/// If a token is not an integer or the clauses are rejected by [`Cnf::new`].
pub(crate) fn parse_text(input: &str) -> Result<Cnf, String> {
    let input = input.replace("\\n", "\n");

    if input.lines().any(|line| line.trim_start().starts_with('p')) {
        return parse_dimacs(input.as_bytes()).map_err(|e| e.to_string());
    }

    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current = Vec::new();
    for token in input
        .lines()
        .filter(|line| !line.trim_start().starts_with('c'))
        .flat_map(str::split_whitespace)
    {
        let value: i32 = token
            .parse()
            .map_err(|_| format!("invalid literal {token:?}"))?;
        if value == 0 {
            clauses.push(std::mem::take(&mut current));
        } else {
            current.push(value);
        }
    }
    if !current.is_empty() {
        clauses.push(current);
    }

    let num_vars = clauses
        .iter()
        .flatten()
        .map(|v| v.unsigned_abs() as usize)
        .max()
        .unwrap_or(0);

    Cnf::new(num_vars, clauses).map_err(|e| e.to_string())
}

/// Solves `cnf` and reports the results including stats and verification.
///
/// # Errors
///
/// If the hypotheses are invalid or a model fails verification.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    parse_time: Duration,
) -> Result<(), String> {
    let outcome = solver_for(common)(cnf, common)?;

    if common.verify {
        verify_solution(cnf, &outcome.result)?;
    }

    if common.stats {
        print_stats(parse_time, cnf, &outcome);
    }

    match (&outcome.result, common.print_solution) {
        (SolveResult::Sat(_), false) => println!("s SATISFIABLE"),
        (result, _) => println!("{result}"),
    }

    Ok(())
}

/// Checks a model against the input formula.
///
/// # Errors
///
/// If `result` holds a model that falsifies some clause of `cnf`.
pub(crate) fn verify_solution(cnf: &Cnf, result: &SolveResult) -> Result<(), String> {
    if let Some(model) = result.model() {
        if !cnf.verify(model) {
            return Err("model failed verification".to_string());
        }
        println!("c model verified");
    }
    Ok(())
}

/// Allocated and resident memory in MiB.
fn memory_usage() -> Result<(f64, f64), tikv_jemalloc_ctl::Error> {
    epoch::advance()?;
    let allocated = stats::allocated::mib()?.read()?;
    let resident = stats::resident::mib()?.read()?;
    Ok((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("c |  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("c |  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
pub(crate) fn print_stats(parse_time: Duration, cnf: &Cnf, outcome: &Outcome) {
    let elapsed_secs = outcome.elapsed.as_secs_f64();
    let s = &outcome.stats;

    println!("c =======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars());
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.iter().map(<[Literal]>::len).sum::<usize>());

    println!("c ========================[ Search Statistics ]========================");
    stat_line("Learned clauses", s.learned_clauses);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Restarts", s.restarts, elapsed_secs);
    match memory_usage() {
        Ok((allocated, resident)) => {
            stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
            stat_line("Resident memory (MiB)", format!("{resident:.2}"));
        }
        Err(e) => log::warn!("memory statistics unavailable: {e}"),
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("c =====================================================================");
}
