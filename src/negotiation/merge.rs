//! Reconciling the forward and backward tables.

use super::error::{MissingAttribute, NegotiationError};
use super::table::FormatTable;
use crate::format::{Attribute, PortFormat};
use crate::graph::Graph;

/// Combine two pass results into one table.
///
/// Attributes known to both passes must agree; attributes known to one are
/// adopted. Every required port must end up complete, otherwise all missing
/// attributes are reported together. A port that is not required keeps its
/// format only when the passes determined it completely.
pub fn merge(
    graph: &Graph,
    forward: &FormatTable,
    backward: &FormatTable,
) -> Result<FormatTable, NegotiationError> {
    combine(graph, forward, backward, true)
}

/// Like [`merge`], but keeps partial formats and inert ports.
pub(crate) fn reconcile(
    graph: &Graph,
    forward: &FormatTable,
    backward: &FormatTable,
) -> Result<FormatTable, NegotiationError> {
    combine(graph, forward, backward, false)
}

fn combine(
    graph: &Graph,
    forward: &FormatTable,
    backward: &FormatTable,
    strict: bool,
) -> Result<FormatTable, NegotiationError> {
    let mut merged = FormatTable::empty(graph);
    let mut missing = Vec::new();

    for port in graph.ports() {
        let ahead = forward.format(port);
        let behind = backward.format(port);
        let required = graph.is_required(port);
        if ahead.is_empty() && behind.is_empty() && !required {
            continue;
        }

        let mut format = PortFormat::UNKNOWN;
        for attribute in Attribute::ALL {
            match (ahead.get(attribute), behind.get(attribute)) {
                (Some(f), Some(b)) if f != b => {
                    return Err(NegotiationError::MergeConflict {
                        port: graph.port_name(port),
                        attribute,
                        forward: f,
                        backward: b,
                    });
                }
                (Some(value), _) | (None, Some(value)) => format.set(attribute, value),
                (None, None) => {
                    if strict && required {
                        missing.push(MissingAttribute {
                            port: graph.port_name(port),
                            attribute,
                        });
                    }
                }
            }
        }

        if strict && !required && format.fixate().is_none() {
            tracing::debug!(port = %graph.port_name(port), %format, "inert port left unresolved");
            continue;
        }
        merged.set(port, format);
    }

    if !missing.is_empty() {
        return Err(NegotiationError::Unresolvable { missing });
    }
    Ok(merged)
}
