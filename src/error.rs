/// Error taxonomy of the gameplay core.
///
/// Both variants are programming errors: the session aborts the current
/// update step instead of continuing with a corrupted score or health.
use core::fmt;

use crate::entities::{Category, EntityId};

#[derive(Clone, Debug, PartialEq)]
pub enum CoreError {
    /// A caller handed the core a value it can never act on.
    InvalidArgument(InvalidArgument),
    /// Internal bookkeeping reached a state the design rules out.
    InvariantViolation(InvariantViolation),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InvalidArgument {
    NegativeDelay { delay_ms: f64 },
    UnknownCategoryPair { a: Category, b: Category },
    CategoryMismatch { id: EntityId, reported: Category, actual: Category },
    EmptyDelayBand { min_ms: f64, max_ms: f64 },
    WideningTier { tier: usize },
    NoEnabledVariants,
    Config { key: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum InvariantViolation {
    UnknownEntity { id: EntityId },
    DeadEntity { id: EntityId },
    BossTransition { from: &'static str, to: &'static str },
    SecondBoss,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(inner) => write!(f, "invalid argument: {inner}"),
            Self::InvariantViolation(inner) => write!(f, "invariant violation: {inner}"),
        }
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDelay { delay_ms } => {
                write!(f, "timer delay must be a finite, non-negative value (got {delay_ms})")
            }
            Self::UnknownCategoryPair { a, b } => {
                write!(f, "no reaction rule for overlap {a:?} x {b:?}")
            }
            Self::CategoryMismatch { id, reported, actual } => write!(
                f,
                "entity {} reported as {reported:?} but is {actual:?}",
                id.0
            ),
            Self::EmptyDelayBand { min_ms, max_ms } => {
                write!(f, "delay band [{min_ms}, {max_ms}] is empty or negative")
            }
            Self::WideningTier { tier } => {
                write!(f, "difficulty tier {tier} widens the delay band")
            }
            Self::NoEnabledVariants => write!(f, "at least one enemy variant must be enabled"),
            Self::Config { key, reason } => write!(f, "config key `{key}`: {reason}"),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity { id } => write!(f, "entity {} was never spawned", id.0),
            Self::DeadEntity { id } => write!(f, "entity {} is already destroyed", id.0),
            Self::BossTransition { from, to } => {
                write!(f, "illegal boss transition {from} -> {to}")
            }
            Self::SecondBoss => write!(f, "a boss is already in play"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<InvalidArgument> for CoreError {
    fn from(inner: InvalidArgument) -> Self {
        Self::InvalidArgument(inner)
    }
}

impl From<InvariantViolation> for CoreError {
    fn from(inner: InvariantViolation) -> Self {
        Self::InvariantViolation(inner)
    }
}
