//! Rounding modes.
//!
//! This module defines the selectable rounding behaviors and their policies. It provides:
//! 1. **Tags:** [`RoundingMode`], the configuration-time selector, with its canonical names and
//!    case-insensitive parsing.
//! 2. **Policies:** One zero-sized [`policy::RoundingPolicy`] type per implemented mode, turning an
//!    operation's `(nearest, error)` pair into the emitted value.
//!
//! `FTZ` is accepted as a name but has no policy; selecting it is a configuration error.

/// Policy types and the bracket helpers they share.
pub mod policy;

pub use policy::RoundingPolicy;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::ConfigError;

/// A rounding behavior selectable at configuration time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum RoundingMode {
    /// IEEE round-to-nearest-even, the hardware default.
    #[default]
    Nearest,
    /// Smallest representable value not below the exact result.
    Upward,
    /// Largest representable value not above the exact result.
    Downward,
    /// Bracket of the exact result with the smaller magnitude.
    TowardZero,
    /// Either bracket with probability 1/2, free-running generator.
    Random,
    /// As `Random`, reseeded per operation from its operands.
    RandomDet,
    /// As `Random`, drawing from the stream shared by an instrumentation scope.
    RandomComDet,
    /// Upper bracket with probability `p`, free-running generator.
    PRandom,
    /// As `PRandom`, reseeded per operation from its operands.
    PRandomDet,
    /// As `PRandom`, drawing from the scope stream.
    PRandomComDet,
    /// Far bracket with probability proportional to the distance to it, free-running generator.
    Average,
    /// As `Average`, reseeded per operation from its operands.
    AverageDet,
    /// As `Average`, drawing from the scope stream.
    AverageComDet,
    /// The bracket round-to-nearest did not choose.
    Farthest,
    /// Operation recomputed in single precision.
    Float,
    /// Hardware result, identical to `Nearest`.
    Native,
    /// Flush-to-zero; not implemented.
    Ftz,
}

impl RoundingMode {
    /// Every mode in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Nearest,
        Self::Upward,
        Self::Downward,
        Self::TowardZero,
        Self::Random,
        Self::RandomDet,
        Self::RandomComDet,
        Self::PRandom,
        Self::PRandomDet,
        Self::PRandomComDet,
        Self::Average,
        Self::AverageDet,
        Self::AverageComDet,
        Self::Farthest,
        Self::Float,
        Self::Native,
        Self::Ftz,
    ];

    /// Accepted names, as listed in diagnostics.
    pub const ACCEPTED_NAMES: &'static str = "nearest, upward, downward, toward_zero, random, \
         random_det, random_comdet, prandom, prandom_det, prandom_comdet, average, average_det, \
         average_comdet, farthest, float, native, ftz";

    /// Canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nearest => "NEAREST",
            Self::Upward => "UPWARD",
            Self::Downward => "DOWNWARD",
            Self::TowardZero => "TOWARD_ZERO",
            Self::Random => "RANDOM",
            Self::RandomDet => "RANDOM_DET",
            Self::RandomComDet => "RANDOM_COMDET",
            Self::PRandom => "PRANDOM",
            Self::PRandomDet => "PRANDOM_DET",
            Self::PRandomComDet => "PRANDOM_COMDET",
            Self::Average => "AVERAGE",
            Self::AverageDet => "AVERAGE_DET",
            Self::AverageComDet => "AVERAGE_COMDET",
            Self::Farthest => "FARTHEST",
            Self::Float => "FLOAT",
            Self::Native => "NATIVE",
            Self::Ftz => "FTZ",
        }
    }

    /// True for modes that draw from the generator.
    pub const fn is_randomized(self) -> bool {
        matches!(
            self,
            Self::Random
                | Self::RandomDet
                | Self::RandomComDet
                | Self::PRandom
                | Self::PRandomDet
                | Self::PRandomComDet
                | Self::Average
                | Self::AverageDet
                | Self::AverageComDet
        )
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownRoundingMode(s.to_owned()))
    }
}

impl TryFrom<String> for RoundingMode {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
