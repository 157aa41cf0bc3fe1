//! Error types for rilgraph.
//!
//! Every error is fatal: configuration defects are reported once and resolution
//! never continues with approximate data.

use crate::emit::RuntimeError;
use crate::negotiation::NegotiationError;
use thiserror::Error;

/// Result type alias using rilgraph's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rilgraph operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration does not match the schema (unknown key, index beyond capacity,
    /// unknown kind/encoding/pattern name, invalid value).
    #[error("schema error at '{location}': {reason}")]
    Schema {
        /// Where in the configuration the problem is (e.g. `render.input0.rect`).
        location: String,
        /// What is wrong.
        reason: String,
    },

    /// Connections do not form a valid topology.
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Both `rect` and `fullscreen` were given for one renderer input.
    #[error("'{port}': rect and fullscreen are mutually exclusive")]
    MutualExclusion {
        /// Offending port.
        port: String,
    },

    /// Format resolution failed.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// A runtime call failed while executing a build plan.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Configuration is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a schema error.
    pub fn schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Invalid connection structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Two components share a name.
    #[error("duplicate component name '{name}'")]
    DuplicateComponent {
        /// The repeated name.
        name: String,
    },

    /// A connection names a component that does not exist.
    #[error("'{port}' connects to unknown component '{target}'")]
    UnknownComponent {
        /// Output port declaring the connection.
        port: String,
        /// Missing component name.
        target: String,
    },

    /// A connection names an input index the target does not have.
    #[error("'{port}' connects to '{target}.input{index}', but {target} has {capacity} input(s)")]
    NoSuchInput {
        /// Output port declaring the connection.
        port: String,
        /// Target component.
        target: String,
        /// Requested input index.
        index: usize,
        /// Input capacity of the target.
        capacity: usize,
    },

    /// An input port is fed by more than one output port.
    #[error("'{input}' is driven by both '{first}' and '{second}'")]
    DoubleDrive {
        /// Input port claimed twice.
        input: String,
        /// First output port claiming it.
        first: String,
        /// Second output port claiming it.
        second: String,
    },
}
