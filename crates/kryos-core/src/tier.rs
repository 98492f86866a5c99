//! Generation tiering for brainrot notifications.
//!
//! The client reports generation as free text (`"3,000,000/s"`, `"$1.5M"`).
//! Everything but digits and dots is stripped, the leading decimal is read,
//! and the value is bucketed by ascending threshold into a destination tier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationFailure;

/// Generations below this are not worth a notification.
pub const MIN_GENERATION: f64 = 250_000.0;

/// Notification tier, each with its own destination and embed color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// 250 000 up to 1 000 000 inclusive.
    #[serde(rename = "250k")]
    T250k,
    /// Above 1 000 000.
    #[serde(rename = "1m")]
    T1m,
    /// Above 5 000 000.
    #[serde(rename = "5m")]
    T5m,
    /// Above 10 000 000.
    #[serde(rename = "10m")]
    T10m,
    /// Above 50 000 000.
    #[serde(rename = "50m")]
    T50m,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 5] = [Self::T250k, Self::T1m, Self::T5m, Self::T10m, Self::T50m];

    /// Buckets a generation value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure::GenerationTooLow` below `MIN_GENERATION`
    /// or for NaN. Positive infinity, which overlong digit strings parse to,
    /// lands in the top tier.
    pub fn for_generation(generation: f64) -> Result<Self, ValidationFailure> {
        if generation.is_nan() || generation < MIN_GENERATION {
            return Err(ValidationFailure::GenerationTooLow);
        }

        Ok(if generation > 50_000_000.0 {
            Self::T50m
        } else if generation > 10_000_000.0 {
            Self::T10m
        } else if generation > 5_000_000.0 {
            Self::T5m
        } else if generation > 1_000_000.0 {
            Self::T1m
        } else {
            Self::T250k
        })
    }

    /// Extracts the generation from client text and buckets it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure::GenerationTooLow` when no number can be
    /// read or the number is below `MIN_GENERATION`.
    pub fn from_generation_text(text: &str) -> Result<Self, ValidationFailure> {
        let generation = parse_generation(text).ok_or(ValidationFailure::GenerationTooLow)?;
        Self::for_generation(generation)
    }

    /// Embed color for this tier.
    pub const fn color(self) -> u32 {
        match self {
            Self::T250k => 0x34_98_DB,
            Self::T1m => 0x00_FF_00,
            Self::T5m => 0xFF_CC_00,
            Self::T10m => 0xFF_66_00,
            Self::T50m => 0xFF_00_00,
        }
    }

    /// Short label, e.g. `"10m"`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::T250k => "250k",
            Self::T1m => "1m",
            Self::T5m => "5m",
            Self::T10m => "10m",
            Self::T50m => "50m",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reads a generation number out of free text.
///
/// Keeps only ASCII digits and `.`, then parses the longest leading decimal
/// (digits with at most one dot, at least one digit). `"1.2.3"` reads as
/// `1.2`; `"..."` and `""` read as nothing.
pub fn parse_generation(text: &str) -> Option<f64> {
    let stripped: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    let mut seen_dot = false;
    let mut end = 0;
    for (index, c) in stripped.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = index + 1;
    }

    let number = &stripped[..end];
    if !number.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    number.parse().ok()
}
