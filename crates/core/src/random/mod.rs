//! Seedable randomness for the stochastic policies.
//!
//! All randomized policies draw from one [`RandomSource`] owned by the session. The source holds
//! three streams derived from the configured seed, one per consumption
//! [`Discipline`](discipline::Discipline):
//! 1. **Free-running:** Advances on every draw. Reproducible for a fixed sequence of operations,
//!    but the draw an operation sees depends on every operation evaluated before it.
//! 2. **Per-operation:** Reseeded before each draw from the seed and the operation's kind, width
//!    and operand bits, so the same operation on the same operands always sees the same draw.
//!    Reseeding happens on every inexact operation, so this stream is a SplitMix64
//!    [`OperationRng`] rather than ChaCha8.
//! 3. **Common:** Reseeded from the seed whenever an instrumentation scope begins; every
//!    operation in the scope draws from the same stream in evaluation order.
//!
//! The source also carries the PRANDOM bias `p` and the generator output recorded when the seed
//! was last replaced.

/// The three consumption protocols.
pub mod discipline;

pub use discipline::{Common, Discipline, FreeRunning, PerOperation};

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const COMMON_STREAM: u64 = 0x636f_6d6d_6f6e_0001;
const OPERATION_STREAM: u64 = 0x6f70_6572_6174_0002;
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// SplitMix64 finalizer.
#[inline(always)]
pub const fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// SplitMix64 stream, cheap enough to reseed for every operation.
#[derive(Clone, Debug, Default)]
pub struct OperationRng {
    state: u64,
}

impl OperationRng {
    /// Stream starting at `state`.
    pub const fn new(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for OperationRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        let out = splitmix64(self.state);
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        out
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Generator state of a session.
#[derive(Clone, Debug)]
pub struct RandomSource {
    seed: u64,
    last_seed: u64,
    prandom_p: f64,
    pinned_p: bool,
    free: ChaCha8Rng,
    common: ChaCha8Rng,
    operation_base: u64,
    operation: OperationRng,
}

impl RandomSource {
    /// Seeds every stream from `seed`.
    ///
    /// With `prandom_p == None` the PRANDOM bias is drawn uniformly from the free stream.
    pub fn new(seed: u64, prandom_p: Option<f64>) -> Self {
        let mut source = Self {
            seed,
            last_seed: 0,
            prandom_p: 0.5,
            pinned_p: prandom_p.is_some(),
            free: ChaCha8Rng::seed_from_u64(seed),
            common: ChaCha8Rng::seed_from_u64(splitmix64(seed ^ COMMON_STREAM)),
            operation_base: splitmix64(seed ^ OPERATION_STREAM),
            operation: OperationRng::default(),
        };
        match prandom_p {
            Some(p) => source.prandom_p = p,
            None => source.prandom_p = source.free.random(),
        }
        source
    }

    /// Replaces the seed, discarding all generator state.
    ///
    /// The next output of the outgoing free stream is kept as [`RandomSource::last_seed`].
    pub fn reseed(&mut self, seed: u64) {
        self.last_seed = self.free.next_u64();
        self.seed = seed;
        self.restart();
    }

    /// Replaces the seed and the PRANDOM probability together.
    ///
    /// With `prandom_p == None` the probability is redrawn from the new seed.
    pub fn reconfigure(&mut self, seed: u64, prandom_p: Option<f64>) {
        self.pinned_p = prandom_p.is_some();
        if let Some(p) = prandom_p {
            self.prandom_p = p;
        }
        self.reseed(seed);
    }

    /// Rewinds every stream to the start of the current seed.
    pub fn restart(&mut self) {
        self.free = ChaCha8Rng::seed_from_u64(self.seed);
        self.operation_base = splitmix64(self.seed ^ OPERATION_STREAM);
        self.restart_common();
        if !self.pinned_p {
            self.prandom_p = self.free.random();
        }
    }

    /// Rewinds the common stream only.
    pub fn restart_common(&mut self) {
        self.common = ChaCha8Rng::seed_from_u64(splitmix64(self.seed ^ COMMON_STREAM));
    }

    /// Current seed.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Free-stream output recorded by the last [`RandomSource::reseed`].
    pub const fn last_seed(&self) -> u64 {
        self.last_seed
    }

    /// PRANDOM probability of emitting the upper bracket.
    pub const fn prandom_p(&self) -> f64 {
        self.prandom_p
    }

    /// Pins the PRANDOM probability. The caller validates `0 <= p <= 1`.
    pub fn set_prandom_p(&mut self, p: f64) {
        debug_assert!((0.0..=1.0).contains(&p));
        self.prandom_p = p;
        self.pinned_p = true;
    }

    /// Draws a fresh PRANDOM probability from the free stream and unpins it.
    pub fn update_prandom_p(&mut self) -> f64 {
        self.prandom_p = self.free.random();
        self.pinned_p = false;
        self.prandom_p
    }

    /// Free-running stream.
    #[inline(always)]
    pub fn free(&mut self) -> &mut ChaCha8Rng {
        &mut self.free
    }

    /// Scope stream.
    #[inline(always)]
    pub fn common(&mut self) -> &mut ChaCha8Rng {
        &mut self.common
    }

    /// Operation stream, reseeded from `key`.
    #[inline(always)]
    pub fn operation(&mut self, key: u64) -> &mut OperationRng {
        self.operation = OperationRng::new(self.operation_base ^ splitmix64(key));
        &mut self.operation
    }
}
