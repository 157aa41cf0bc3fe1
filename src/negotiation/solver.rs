//! Format solver for component graphs.

use super::error::NegotiationError;
use super::merge::{merge, reconcile};
use super::propagate::{EncodingFallback, resolve_backward, resolve_forward};
use super::table::FormatTable;
use crate::component::PortId;
use crate::error::Result;
use crate::format::{Attribute, VideoFormat};
use crate::graph::Graph;

/// Resolves every port format of a graph.
///
/// Resolution first propagates in both directions without inventing encodings,
/// reconciling the two tables and repeating until nothing new is learned. A final
/// round starts from that result, lets root ports without any encoding fall back
/// to [`Encoding::Opaque`](crate::format::Encoding::Opaque), and merges strictly.
#[derive(Debug)]
pub struct FormatSolver<'g> {
    graph: &'g Graph,
}

impl<'g> FormatSolver<'g> {
    /// Create a solver for a graph.
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Run resolution.
    pub fn solve(&self) -> std::result::Result<FormatTable, NegotiationError> {
        let graph = self.graph;
        let mut known = FormatTable::declared(graph);
        let mut rounds = 0;
        loop {
            rounds += 1;
            let forward = resolve_forward(graph, &known, EncodingFallback::Defer)?;
            let backward = resolve_backward(graph, &known, EncodingFallback::Defer)?;
            let next = reconcile(graph, &forward, &backward)?;
            if next == known {
                break;
            }
            known = next;
        }
        tracing::debug!(rounds, "partial resolution stable");

        let forward = resolve_forward(graph, &known, EncodingFallback::Opaque)?;
        let backward = resolve_backward(graph, &known, EncodingFallback::Opaque)?;
        let resolved = merge(graph, &forward, &backward)?;

        self.verify_connections(&resolved)?;

        tracing::info!(
            components = graph.component_count(),
            connections = graph.connection_count(),
            "formats resolved"
        );
        Ok(resolved)
    }

    fn verify_connections(&self, table: &FormatTable) -> std::result::Result<(), NegotiationError> {
        for connection in self.graph.connections() {
            let source = table.format(connection.source);
            let sink = table.format(connection.sink);
            for attribute in Attribute::ALL {
                if let (Some(incoming), Some(existing)) = (source.get(attribute), sink.get(attribute))
                    && incoming != existing
                {
                    return Err(NegotiationError::Conflict {
                        port: self.graph.port_name(connection.sink),
                        attribute,
                        origin: self.graph.port_name(connection.source),
                        incoming,
                        existing,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A graph together with its resolved port formats.
#[derive(Debug)]
pub struct ResolvedGraph {
    graph: Graph,
    formats: FormatTable,
}

impl ResolvedGraph {
    /// Resolve all formats of `graph`.
    pub fn resolve(graph: Graph) -> Result<Self> {
        let formats = FormatSolver::new(&graph).solve()?;
        Ok(Self { graph, formats })
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Resolved format of a port; `None` for inert ports left undetermined.
    pub fn format(&self, port: PortId) -> Option<VideoFormat> {
        self.formats.format(port).fixate()
    }

    /// The full format table.
    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    /// Resolved ports in declaration order.
    pub fn resolved_ports(&self) -> impl Iterator<Item = (PortId, VideoFormat)> + '_ {
        self.graph
            .ports()
            .filter_map(|port| self.format(port).map(|format| (port, format)))
    }
}
