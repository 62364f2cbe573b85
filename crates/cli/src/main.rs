//! Stochastic-arithmetic sampling CLI.
//!
//! This binary hosts a `perturb` session the way an instrumented program would and reports how
//! the result of a small computation spreads under the selected rounding mode. It performs:
//! 1. **Configuration:** Optional JSON file, overridden by `--rounding-mode`, `--seed` and
//!    `--prandom-p`. Fatal configuration errors print one diagnostic and exit with status 42.
//! 2. **Sampling:** Sample `i` reseeds the session with `seed + i` and evaluates the computation
//!    inside one instrumentation scope.
//! 3. **Report:** Every sample, then mean, standard deviation, range and the estimated number of
//!    significant decimal digits.

use std::path::PathBuf;
use std::{fs, io, process};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use perturb_core::cli::BackendArgs;
use perturb_core::{BackendConfig, BackendInterface, ConfigError, RoundingMode, Session};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "perturb",
    author,
    version,
    about = "Sample a computation under a stochastic floating-point rounding mode",
    long_about = "Evaluate an arithmetic operation or a reference series repeatedly under a \
                  rounding mode and report the spread of the results.\n\nExamples:\n  \
                  perturb --rounding-mode random -n 20 eval div 1 3\n  \
                  perturb --rounding-mode average --seed 7 harmonic --terms 100000\n  \
                  perturb --config run.json eval fma 0.1 10 -1\n  \
                  perturb modes"
)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    /// JSON configuration file; command-line options take precedence.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    samples: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one intercepted operation.
    Eval {
        /// Operation to evaluate.
        #[arg(value_enum)]
        op: OpName,

        /// Operands: two for add/sub/mul/div, three for fma (a * b + c), one for cast.
        #[arg(allow_negative_numbers = true, required = true)]
        operands: Vec<f64>,

        /// Width the operation runs in (cast always narrows double to float).
        #[arg(long, value_enum, default_value_t = Precision::Double)]
        precision: Precision,
    },

    /// Sum the harmonic series 1/1 + 1/2 + ... + 1/terms.
    Harmonic {
        /// Number of terms.
        #[arg(long, default_value_t = 1000)]
        terms: u32,

        /// Width of the accumulation.
        #[arg(long, value_enum, default_value_t = Precision::Double)]
        precision: Precision,
    },

    /// List the rounding modes this backend accepts.
    Modes,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OpName {
    Add,
    Sub,
    Mul,
    Div,
    Fma,
    Cast,
}

impl OpName {
    const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Fma => "fma",
            Self::Cast => "cast",
        }
    }

    const fn arity(self) -> usize {
        match self {
            Self::Cast => 1,
            Self::Fma => 3,
            Self::Add | Self::Sub | Self::Mul | Self::Div => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Precision {
    Float,
    Double,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("config cannot read `{}`: {source}", .path.display())]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Distribution of the samples.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl Summary {
    fn of(samples: &[f64]) -> Self {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = if samples.len() > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        Self {
            mean,
            std_dev: variance.sqrt(),
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// `-log10(std / |mean|)`; `None` when every sample is identical.
    fn significant_digits(&self) -> Option<f64> {
        if self.min == self.max {
            None
        } else if self.mean == 0.0 {
            Some(0.0)
        } else {
            Some((-(self.std_dev / self.mean.abs()).log10()).max(0.0))
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (samples, computation) = match cli.command {
        Commands::Modes => {
            print_modes();
            return;
        }
        Commands::Eval { op, operands, precision } => {
            if operands.len() != op.arity() {
                Cli::command()
                    .error(
                        clap::error::ErrorKind::WrongNumberOfValues,
                        format!(
                            "`{}` takes {} operand(s), got {}",
                            op.name(),
                            op.arity(),
                            operands.len()
                        ),
                    )
                    .exit();
            }
            (cli.samples, Computation::Eval { op, operands, precision })
        }
        Commands::Harmonic { terms, precision } => {
            (cli.samples, Computation::Harmonic { terms, precision })
        }
    };

    let mut session = match open_session(cli.config.as_ref(), &cli.backend) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            process::exit(ConfigError::EXIT_CODE);
        }
    };

    let values = sample(&mut session, &computation, samples);
    print_report(session.default_rounding_mode(), &values);
    session.finalize();
}

/// Configures and initializes a session reporting on stderr.
fn open_session(config: Option<&PathBuf>, args: &BackendArgs) -> Result<Session, CliError> {
    let mut session = Session::pre_init(Box::new(io::stderr()));
    if let Some(path) = config {
        let json = fs::read_to_string(path)
            .map_err(|source| CliError::ReadConfig { path: path.clone(), source })?;
        session.configure(&BackendConfig::from_json(&json)?)?;
        debug!(path = %path.display(), "configuration file loaded");
    }
    session.apply_args(args)?;
    let _ = session.init()?;
    Ok(session)
}

enum Computation {
    Eval { op: OpName, operands: Vec<f64>, precision: Precision },
    Harmonic { terms: u32, precision: Precision },
}

impl Computation {
    fn run(&self, s: &mut Session) -> f64 {
        match *self {
            Self::Eval { op, ref operands, precision: Precision::Double } => {
                let x = |i: usize| operands[i];
                match op {
                    OpName::Add => s.add_f64(x(0), x(1)),
                    OpName::Sub => s.sub_f64(x(0), x(1)),
                    OpName::Mul => s.mul_f64(x(0), x(1)),
                    OpName::Div => s.div_f64(x(0), x(1)),
                    OpName::Fma => s.fma_f64(x(0), x(1), x(2)),
                    OpName::Cast => f64::from(s.cast_f64_to_f32(x(0))),
                }
            }
            Self::Eval { op, ref operands, precision: Precision::Float } => {
                let x = |i: usize| operands[i] as f32;
                f64::from(match op {
                    OpName::Add => s.add_f32(x(0), x(1)),
                    OpName::Sub => s.sub_f32(x(0), x(1)),
                    OpName::Mul => s.mul_f32(x(0), x(1)),
                    OpName::Div => s.div_f32(x(0), x(1)),
                    OpName::Fma => s.fma_f32(x(0), x(1), x(2)),
                    OpName::Cast => s.cast_f64_to_f32(operands[0]),
                })
            }
            Self::Harmonic { terms, precision: Precision::Double } => {
                (1..=terms).fold(0.0, |acc, k| {
                    let term = s.div_f64(1.0, f64::from(k));
                    s.add_f64(acc, term)
                })
            }
            Self::Harmonic { terms, precision: Precision::Float } => {
                f64::from((1..=terms).fold(0.0_f32, |acc, k| {
                    let term = s.div_f32(1.0, k as f32);
                    s.add_f32(acc, term)
                }))
            }
        }
    }
}

/// Evaluates `computation` once per sample, each inside its own instrumentation scope.
fn sample(session: &mut Session, computation: &Computation, samples: u32) -> Vec<f64> {
    let base = session.seed();
    info!(base_seed = base, samples, "sampling");
    (0..samples)
        .map(|i| {
            session.set_seed(base.wrapping_add(u64::from(i)));
            session.begin_instrumentation();
            let value = computation.run(session);
            session.end_instrumentation();
            value
        })
        .collect()
}

fn print_report(mode: RoundingMode, values: &[f64]) {
    for value in values {
        println!("{value:e}");
    }
    let summary = Summary::of(values);
    println!();
    println!("mode: {mode}  samples: {}", values.len());
    println!("mean: {:e}", summary.mean);
    println!("std: {:e}", summary.std_dev);
    println!("min: {:e}", summary.min);
    println!("max: {:e}", summary.max);
    match summary.significant_digits() {
        Some(digits) => println!("significant digits: {digits:.2}"),
        None => println!("significant digits: all samples identical"),
    }
}

fn print_modes() {
    for mode in RoundingMode::ALL {
        let note = if BackendInterface::for_mode(mode).is_ok() { "" } else { "  (not implemented)" };
        let random = if mode.is_randomized() { "  randomized" } else { "" };
        println!("{}{random}{note}", mode.name());
    }
}
