//! Host-owned backend context.
//!
//! A [`Session`] holds everything the intercepted arithmetic depends on. It provides:
//! 1. **Lifecycle:** `pre_init` (diagnostic stream), `configure` or `parse_args`, `init` (the
//!    active table), `finalize`.
//! 2. **Scoping:** `begin_instrumentation` switches to the configured default mode and rewinds
//!    the common random stream, `end_instrumentation` switches to round-to-nearest.
//! 3. **Arithmetic:** One entry point per primitive, dispatching through the active table.
//! 4. **Randomness control:** Seed and PRANDOM probability accessors.
//! 5. **Extensions:** Typed and raw user calls; failures are reported and ignored.
//!
//! There is no process-wide state. A session is `Send` and is meant to be owned by one thread;
//! a multi-threaded host creates one session per thread. Free-running draws are then
//! reproducible per thread for a fixed seed, and independent of how threads interleave.

use std::fmt;
use std::io::{self, Write};

use tracing::{info, trace, warn};

use crate::backend::{BackendInterface, backend_name, backend_version};
use crate::cli::BackendArgs;
use crate::common::{ConfigError, ExtensionError};
use crate::config::{BackendConfig, check_probability, resolve_seed};
use crate::extension::{RawValue, UserCall};
use crate::random::RandomSource;
use crate::rounding::RoundingMode;
use crate::stats::ExactnessProfile;

/// Mutable state threaded through every primitive.
#[derive(Clone, Debug)]
pub struct RoundingState {
    /// Generator streams and PRANDOM probability.
    pub random: RandomSource,
    /// Exactness counters.
    pub profile: ExactnessProfile,
}

impl RoundingState {
    /// State seeded with `seed`.
    pub fn new(seed: u64, prandom_p: Option<f64>) -> Self {
        Self { random: RandomSource::new(seed, prandom_p), profile: ExactnessProfile::default() }
    }
}

/// Backend context owned by the host.
pub struct Session {
    config: BackendConfig,
    active_mode: RoundingMode,
    state: RoundingState,
    table: BackendInterface,
    default_table: BackendInterface,
    nearest_table: BackendInterface,
    diagnostics: Box<dyn Write + Send>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("active_mode", &self.active_mode)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::pre_init(Box::new(io::stderr()))
    }
}

impl Session {
    /// Creates an unconfigured round-to-nearest session reporting on `diagnostics`.
    pub fn pre_init(diagnostics: Box<dyn Write + Send>) -> Self {
        let config = BackendConfig::default();
        let nearest = BackendInterface::nearest();
        Self {
            state: RoundingState::new(resolve_seed(config.seed), config.prandom_p),
            config,
            active_mode: RoundingMode::Nearest,
            table: nearest,
            default_table: nearest,
            nearest_table: nearest,
            diagnostics,
        }
    }

    /// Applies `config`: builds the tables, then replaces modes and seed.
    ///
    /// # Errors
    ///
    /// Fails without modifying the session when a value is out of range or a mode has no
    /// implementation.
    pub fn configure(&mut self, config: &BackendConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let table = BackendInterface::for_mode(config.rounding_mode)?;
        let default_table = BackendInterface::for_mode(config.default_mode())?;

        let seed = resolve_seed(config.seed);
        self.config = config.clone();
        self.active_mode = config.rounding_mode;
        self.table = table;
        self.default_table = default_table;
        self.state.random.reconfigure(seed, config.prandom_p);
        info!(
            mode = %self.active_mode,
            default_mode = %config.default_mode(),
            seed,
            prandom_p = self.state.random.prandom_p(),
            "session configured"
        );
        Ok(())
    }

    /// Parses the backend's option vector and applies it on top of the current configuration.
    ///
    /// Writes the `ROUNDING MODE : <NAME>` banner to the diagnostic stream on success.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the first invalid option; the host terminates with
    /// [`ConfigError::EXIT_CODE`].
    pub fn parse_args<I, S>(&mut self, argv: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = BackendArgs::parse_from(argv)?;
        self.apply_args(&args)
    }

    /// Applies already parsed options on top of the current configuration.
    ///
    /// # Errors
    ///
    /// As [`Session::parse_args`].
    pub fn apply_args(&mut self, args: &BackendArgs) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        args.apply(&mut config)?;
        self.configure(&config)?;
        let mode = self.active_mode;
        self.diagnose(format_args!("ROUNDING MODE : {mode}"));
        Ok(())
    }

    /// Returns the active table, rewinding the generator to the start of the seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unimplemented`] when the active mode has no table.
    pub fn init(&mut self) -> Result<BackendInterface, ConfigError> {
        let table = BackendInterface::for_mode(self.active_mode)?;
        self.table = table;
        self.state.random.restart();
        info!(
            backend = backend_name(),
            version = backend_version(),
            mode = %self.active_mode,
            "backend initialized"
        );
        Ok(table)
    }

    /// Reports the exactness counters when profiling and releases the session.
    pub fn finalize(mut self) {
        if ExactnessProfile::ENABLED {
            let profile = self.state.profile;
            self.diagnose(format_args!("{profile}"));
        }
        let _ = self.diagnostics.flush();
    }

    /// Switches to the default mode and rewinds the common random stream.
    pub fn begin_instrumentation(&mut self) {
        self.active_mode = self.default_table.mode;
        self.table = self.default_table;
        self.state.random.restart_common();
        trace!(mode = %self.active_mode, "begin instrumentation");
    }

    /// Switches to round-to-nearest.
    pub fn end_instrumentation(&mut self) {
        self.active_mode = RoundingMode::Nearest;
        self.table = self.nearest_table;
        trace!("end instrumentation");
    }

    /// Mode of the active table.
    pub const fn rounding_mode(&self) -> RoundingMode {
        self.active_mode
    }

    /// Mode restored by [`Session::begin_instrumentation`].
    pub const fn default_rounding_mode(&self) -> RoundingMode {
        self.default_table.mode
    }

    /// Current configuration.
    pub const fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Active table. Hosts calling through a copied table re-fetch it after scope switches.
    pub const fn table(&self) -> BackendInterface {
        self.table
    }

    /// State to pass to the table's primitives.
    pub const fn state_mut(&mut self) -> &mut RoundingState {
        &mut self.state
    }

    /// Replaces the seed and reseeds every stream.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
        self.state.random.reseed(seed);
    }

    /// Rewinds every stream to the start of the current seed.
    pub fn reset_seed(&mut self) {
        self.state.random.restart();
    }

    /// Seed in effect (resolved when none was configured).
    pub const fn seed(&self) -> u64 {
        self.state.random.seed()
    }

    /// Free-stream output recorded when the seed was last replaced.
    pub const fn last_seed(&self) -> u64 {
        self.state.random.last_seed()
    }

    /// Pins the PRANDOM probability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProbability`] outside `[0, 1]`.
    pub fn set_prandom_p(&mut self, p: f64) -> Result<(), ConfigError> {
        let p = check_probability(p)?;
        self.config.prandom_p = Some(p);
        self.state.random.set_prandom_p(p);
        Ok(())
    }

    /// Draws a new PRANDOM probability from the generator and returns it.
    pub fn update_prandom_p(&mut self) -> f64 {
        self.config.prandom_p = None;
        self.state.random.update_prandom_p()
    }

    /// PRANDOM probability of rounding up.
    pub const fn prandom_p(&self) -> f64 {
        self.state.random.prandom_p()
    }

    /// Exactness counters.
    pub const fn profiling(&self) -> ExactnessProfile {
        self.state.profile
    }

    /// Zeroes the exactness counters.
    pub fn reset_profiling(&mut self) {
        self.state.profile.reset();
    }

    /// Executes a typed extension call.
    pub fn user_call(&mut self, call: UserCall<'_>) {
        trace!(call = call.name(), "user call");
        call.apply(self.state.random.free());
    }

    /// Decodes and executes a raw extension call.
    ///
    /// # Errors
    ///
    /// Unknown identifiers and value types are reported on the diagnostic stream, logged and
    /// returned; the session is unchanged.
    pub fn user_call_raw(&mut self, id: u32, value: RawValue<'_>) -> Result<(), ExtensionError> {
        match UserCall::decode(id, value) {
            Ok(call) => {
                self.user_call(call);
                Ok(())
            }
            Err(err) => {
                warn!(id, error = %err, "ignoring user call");
                self.diagnose(format_args!("{err}"));
                Err(err)
            }
        }
    }

    /// `f32` addition.
    #[inline]
    pub fn add_f32(&mut self, a: f32, b: f32) -> f32 {
        (self.table.add_float)(a, b, &mut self.state)
    }

    /// `f32` subtraction.
    #[inline]
    pub fn sub_f32(&mut self, a: f32, b: f32) -> f32 {
        (self.table.sub_float)(a, b, &mut self.state)
    }

    /// `f32` multiplication.
    #[inline]
    pub fn mul_f32(&mut self, a: f32, b: f32) -> f32 {
        (self.table.mul_float)(a, b, &mut self.state)
    }

    /// `f32` division.
    #[inline]
    pub fn div_f32(&mut self, a: f32, b: f32) -> f32 {
        (self.table.div_float)(a, b, &mut self.state)
    }

    /// `f64` addition.
    #[inline]
    pub fn add_f64(&mut self, a: f64, b: f64) -> f64 {
        (self.table.add_double)(a, b, &mut self.state)
    }

    /// `f64` subtraction.
    #[inline]
    pub fn sub_f64(&mut self, a: f64, b: f64) -> f64 {
        (self.table.sub_double)(a, b, &mut self.state)
    }

    /// `f64` multiplication.
    #[inline]
    pub fn mul_f64(&mut self, a: f64, b: f64) -> f64 {
        (self.table.mul_double)(a, b, &mut self.state)
    }

    /// `f64` division.
    #[inline]
    pub fn div_f64(&mut self, a: f64, b: f64) -> f64 {
        (self.table.div_double)(a, b, &mut self.state)
    }

    /// `f32` fused multiply-add `a * b + c`.
    #[inline]
    pub fn fma_f32(&mut self, a: f32, b: f32, c: f32) -> f32 {
        (self.table.fma_float)(a, b, c, &mut self.state)
    }

    /// `f64` fused multiply-add `a * b + c`.
    #[inline]
    pub fn fma_f64(&mut self, a: f64, b: f64, c: f64) -> f64 {
        (self.table.fma_double)(a, b, c, &mut self.state)
    }

    /// `f64 -> f32` narrowing.
    #[inline]
    pub fn cast_f64_to_f32(&mut self, a: f64) -> f32 {
        (self.table.cast_double_to_float)(a, &mut self.state)
    }

    fn diagnose(&mut self, line: fmt::Arguments<'_>) {
        // The diagnostic stream is best effort.
        let _ = writeln!(self.diagnostics, "{line}");
    }
}
