//! Item state definitions for tracking crawl progress
//!
//! Every identifier moves through `Pending → Fetching → {Routed | Skipped | ExhaustedRetries}`.

use std::fmt;

/// Represents the current state of one identifier in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    // ===== Active States =====
    /// Identifier has been read but not yet fetched (or must be fetched again)
    Pending,

    /// Detail lookup is in progress
    Fetching,

    // ===== Terminal States =====
    /// Record written to an output table and logged as processed
    Routed,

    /// Lookup answered but nothing was written (negative answer, unknown type,
    /// unresolvable parent reference)
    Skipped,

    /// Every attempt failed; logged as permanently failed
    ExhaustedRetries,
}

impl ItemState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching)
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Routed => "routed",
            Self::Skipped => "skipped",
            Self::ExhaustedRetries => "exhausted_retries",
        }
    }

    /// Parses a state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "fetching" => Some(Self::Fetching),
            "routed" => Some(Self::Routed),
            "skipped" => Some(Self::Skipped),
            "exhausted_retries" => Some(Self::ExhaustedRetries),
            _ => None,
        }
    }

    /// Returns all possible item states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Pending,
            Self::Fetching,
            Self::Routed,
            Self::Skipped,
            Self::ExhaustedRetries,
        ]
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
