//! Strongly-typed identifiers for Outcall entities.
//!
//! All internally-assigned identifiers are:
//! - **Strongly typed**: prevents mixing up different ID types at compile time
//! - **Lexicographically sortable**: ULIDs encode creation time and sort naturally
//! - **Globally unique**: no coordination required for generation
//!
//! [`ProviderCallId`] is the exception: the voice-call provider assigns it,
//! so it is an opaque string rather than a ULID.
//!
//! # Example
//!
//! ```rust
//! use outcall_core::id::{CallTaskId, SeriesId};
//!
//! let task = CallTaskId::generate();
//! let series = SeriesId::generate();
//!
//! // IDs are different types - this won't compile:
//! // let wrong: CallTaskId = series;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::{Error, Result};

/// A unique identifier for a scheduled call task.
///
/// The task ID doubles as the correlation ID: it is embedded in the
/// outbound call request's metadata and echoed back by the provider's
/// completion webhook, which is what makes reconciliation possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallTaskId(Ulid);

impl CallTaskId {
    /// Generates a new unique task ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Creates a task ID from a raw ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for CallTaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CallTaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ulid::from_string(s).map(Self).map_err(|e| Error::InvalidId {
            message: format!("invalid call task ID '{s}': {e}"),
        })
    }
}

/// A unique identifier for an interview series.
///
/// A series groups the recurring calls to one subject; conversation context
/// is looked up by series so each call is briefed with the latest prior
/// interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(Ulid);

impl SeriesId {
    /// Generates a new unique series ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Creates a series ID from a raw ULID.
    #[must_use]
    pub const fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeriesId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ulid::from_string(s).map(Self).map_err(|e| Error::InvalidId {
            message: format!("invalid series ID '{s}': {e}"),
        })
    }
}

/// The provider-assigned identifier for a placed call.
///
/// Opaque: the provider controls its format, so no parsing is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderCallId(String);

impl ProviderCallId {
    /// Wraps a provider-assigned call ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderCallId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
