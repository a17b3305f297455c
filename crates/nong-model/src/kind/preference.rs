use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Declared wish of a registrant about how many partners they want.
///
/// Only `PrefersTwo` needs a global capacity decision; the other two
/// preferences always resolve to a single partner.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preference {
    /// Wants two partners if the pool allows it.
    PrefersTwo,
    /// No preference; gets one partner.
    #[default]
    Neutral,
    /// Explicitly wants a single partner.
    DeclinesTwo,
}

impl Preference {
    /// All preferences in snapshot-table order.
    pub const ALL: [Preference; 3] = [
        Preference::PrefersTwo,
        Preference::Neutral,
        Preference::DeclinesTwo,
    ];

    /// Returns `true` when the quota for this preference depends on global pool accounting.
    #[inline]
    pub fn requires_global_accounting(&self) -> bool {
        matches!(self, Preference::PrefersTwo)
    }

    /// Row index inside a [`crate::QuotaSnapshot`].
    #[inline]
    pub(crate) fn as_index(&self) -> usize {
        match self {
            Preference::PrefersTwo => 0,
            Preference::Neutral => 1,
            Preference::DeclinesTwo => 2,
        }
    }

    /// Returns the preference as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::PrefersTwo => "prefers-two",
            Preference::Neutral => "neutral",
            Preference::DeclinesTwo => "declines-two",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefers-two" | "prefers_two" | "two" | "yes" => Ok(Preference::PrefersTwo),
            "" | "neutral" | "any" => Ok(Preference::Neutral),
            "declines-two" | "declines_two" | "one" | "no" => Ok(Preference::DeclinesTwo),
            other => Err(ModelError::UnknownPreference(other.to_string())),
        }
    }
}
