//! Backend option parsing.
//!
//! Hosts either flatten [`BackendArgs`] into their own clap parser or hand the backend its
//! option vector through `Session::parse_args`. Values are kept as strings until
//! [`BackendArgs::apply`] so that a bad value produces the backend's own diagnostic (and exit
//! status) instead of a generic usage error.
//!
//! Options:
//! - `--rounding-mode <MODE>`: one of [`RoundingMode::ACCEPTED_NAMES`], case-insensitive. Sets
//!   both the active and the default mode.
//! - `--seed <SEED>`: unsigned integer generator seed.
//! - `--prandom-p <P>`: PRANDOM probability of rounding up, in `[0, 1]`.

use clap::{Args, Parser};

use crate::common::ConfigError;
use crate::config::{BackendConfig, check_probability};
use crate::rounding::RoundingMode;

/// Backend command-line options.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendArgs {
    /// Rounding mode.
    #[arg(long = "rounding-mode", value_name = "MODE")]
    pub rounding_mode: Option<String>,

    /// Generator seed (unsigned integer).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<String>,

    /// Probability of rounding up under the PRANDOM modes.
    #[arg(long = "prandom-p", value_name = "P")]
    pub prandom_p: Option<String>,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct BackendOptions {
    #[command(flatten)]
    args: BackendArgs,
}

impl BackendArgs {
    /// Parses a bare option vector (no program name).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] for unknown options or missing values.
    pub fn parse_from<I, S>(argv: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BackendOptions::try_parse_from(argv.into_iter().map(Into::into))
            .map(|options| options.args)
            .map_err(|e| ConfigError::Cli(e.to_string().trim_end().to_owned()))
    }

    /// Writes the parsed values into `config`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] naming the first invalid option; `config` is left unchanged.
    pub fn apply(&self, config: &mut BackendConfig) -> Result<(), ConfigError> {
        let mut updated = config.clone();
        if let Some(name) = &self.rounding_mode {
            let mode: RoundingMode = name.parse()?;
            updated.rounding_mode = mode;
            updated.default_rounding_mode = Some(mode);
        }
        if let Some(seed) = &self.seed {
            let parsed = seed
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(seed.clone()))?;
            updated.seed = Some(parsed);
        }
        if let Some(p) = &self.prandom_p {
            let parsed = p
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidProbability(p.clone()))?;
            updated.prandom_p = Some(check_probability(parsed)?);
        }
        *config = updated;
        Ok(())
    }
}
