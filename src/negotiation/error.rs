//! Negotiation error types.

use crate::format::{Attribute, AttributeValue};
use std::fmt;
use thiserror::Error;

/// Error during format resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    /// Two values for the same attribute met during one propagation pass.
    #[error("conflicting {attribute} on '{port}': {incoming} (from '{origin}') vs. {existing}")]
    Conflict {
        /// Port receiving the value.
        port: String,
        /// Attribute in conflict.
        attribute: Attribute,
        /// Port the incoming value was propagated from.
        origin: String,
        /// Value being propagated.
        incoming: AttributeValue,
        /// Value already on the port.
        existing: AttributeValue,
    },

    /// Forward and backward passes resolved an attribute to different values.
    #[error("forward and backward passes disagree on {attribute} of '{port}': {forward} vs. {backward}")]
    MergeConflict {
        /// Port in conflict.
        port: String,
        /// Attribute in conflict.
        attribute: Attribute,
        /// Value found by the forward pass.
        forward: AttributeValue,
        /// Value found by the backward pass.
        backward: AttributeValue,
    },

    /// Required attributes were determined by neither pass.
    #[error("unresolvable attribute(s): {}", join(.missing))]
    Unresolvable {
        /// Every missing attribute, in declaration order.
        missing: Vec<MissingAttribute>,
    },
}

/// A port attribute no pass could determine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAttribute {
    /// Port name, e.g. `isp.input0`.
    pub port: String,
    /// The undetermined attribute.
    pub attribute: Attribute,
}

impl fmt::Display for MissingAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.port, self.attribute)
    }
}

fn join(missing: &[MissingAttribute]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
