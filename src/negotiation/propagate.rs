//! Directional propagation passes.
//!
//! Each pass starts from a copy of a format table and pushes known attributes
//! along one direction of the graph until no assignment happens. Ports to visit
//! are kept on a pass-local worklist in declaration order.

use super::error::NegotiationError;
use super::table::FormatTable;
use crate::component::{PortDirection, PortId, Role};
use crate::format::{Attribute, Encoding};
use crate::graph::Graph;
use std::collections::{HashSet, VecDeque};
use std::fmt;

const EVERY: &[Attribute] = &Attribute::ALL;

/// Direction of a propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// From producers towards consumers.
    Forward,
    /// From consumers towards producers.
    Backward,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Forward => "forward",
            Pass::Backward => "backward",
        })
    }
}

/// What a root port without an encoding gets when its peer has none either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EncodingFallback {
    /// Use [`Encoding::Opaque`].
    #[default]
    Opaque,
    /// Leave the encoding unknown.
    Defer,
}

/// Run the forward pass over a copy of `start`.
pub fn resolve_forward(
    graph: &Graph,
    start: &FormatTable,
    fallback: EncodingFallback,
) -> Result<FormatTable, NegotiationError> {
    Propagation::new(graph, Pass::Forward, start.clone(), fallback).run()
}

/// Run the backward pass over a copy of `start`.
pub fn resolve_backward(
    graph: &Graph,
    start: &FormatTable,
    fallback: EncodingFallback,
) -> Result<FormatTable, NegotiationError> {
    Propagation::new(graph, Pass::Backward, start.clone(), fallback).run()
}

struct Propagation<'g> {
    graph: &'g Graph,
    pass: Pass,
    fallback: EncodingFallback,
    table: FormatTable,
    worklist: VecDeque<PortId>,
    queued: HashSet<PortId>,
    assignments: usize,
}

impl<'g> Propagation<'g> {
    fn new(graph: &'g Graph, pass: Pass, table: FormatTable, fallback: EncodingFallback) -> Self {
        Self {
            graph,
            pass,
            fallback,
            table,
            worklist: VecDeque::new(),
            queued: HashSet::new(),
            assignments: 0,
        }
    }

    fn run(mut self) -> Result<FormatTable, NegotiationError> {
        // Anything already known is a root in both directions.
        let graph = self.graph;
        for port in graph.ports() {
            if !self.table.format(port).is_empty() {
                self.enqueue(port);
            }
        }
        self.drain()?;

        self.seed();
        self.drain()?;

        tracing::debug!(
            pass = %self.pass,
            assignments = self.assignments,
            "propagation reached fixpoint"
        );
        Ok(self.table)
    }

    /// Root the ports of producer (forward) or consumer (backward) components.
    fn seed(&mut self) {
        let graph = self.graph;
        for (id, component) in graph.components() {
            let roots: Vec<(PortId, Option<PortId>)> = match (self.pass, component.kind().role()) {
                (Pass::Forward, Role::Producer) => (0..component.outputs().len())
                    .map(|i| PortId::output(id, i))
                    .filter_map(|port| graph.target_of(port).map(|peer| (port, Some(peer))))
                    .collect(),
                (Pass::Backward, Role::Consumer) => (0..component.inputs().len())
                    .map(|i| {
                        let port = PortId::input(id, i);
                        (port, graph.feeder_of(port))
                    })
                    .collect(),
                _ => continue,
            };

            for (port, peer) in roots {
                self.seed_encoding(port, peer);
                self.enqueue(port);
            }
        }
    }

    fn seed_encoding(&mut self, port: PortId, peer: Option<PortId>) {
        if self.table.format(port).encoding.is_some() {
            return;
        }
        let adopted = peer.and_then(|peer| self.table.format(peer).encoding);
        let encoding = match (adopted, self.fallback) {
            (Some(encoding), _) => encoding,
            (None, EncodingFallback::Opaque) => Encoding::Opaque,
            (None, EncodingFallback::Defer) => return,
        };
        if let Some(slot) = self.table.get_mut(port) {
            slot.encoding = Some(encoding);
            self.assignments += 1;
            tracing::trace!(
                pass = %self.pass,
                port = %self.graph.port_name(port),
                %encoding,
                "seeded root encoding"
            );
        }
    }

    fn enqueue(&mut self, port: PortId) {
        if self.queued.insert(port) {
            self.worklist.push_back(port);
        }
    }

    fn drain(&mut self) -> Result<(), NegotiationError> {
        while let Some(port) = self.worklist.pop_front() {
            self.queued.remove(&port);
            for (to, attributes) in self.edges(port) {
                self.push(port, to, attributes)?;
            }
        }
        Ok(())
    }

    /// Ports reachable from `port` in one step, with the attributes carried.
    fn edges(&self, port: PortId) -> Vec<(PortId, &'static [Attribute])> {
        let component = self.graph.component(port.component);
        let kind = component.kind();

        match (self.pass, port.direction) {
            // Across the component.
            (Pass::Forward, PortDirection::Input) => (0..component.outputs().len())
                .map(|i| (PortId::output(port.component, i), kind.transfer().attributes()))
                .collect(),
            (Pass::Backward, PortDirection::Output) => (0..component.inputs().len())
                .map(|i| (PortId::input(port.component, i), kind.transfer().attributes()))
                .collect(),

            // Across a connection.
            (Pass::Forward, PortDirection::Output) if kind.role() != Role::Consumer => self
                .graph
                .target_of(port)
                .map(|to| (to, EVERY))
                .into_iter()
                .collect(),
            (Pass::Backward, PortDirection::Input) if kind.role() != Role::Producer => self
                .graph
                .feeder_of(port)
                .map(|to| (to, EVERY))
                .into_iter()
                .collect(),

            _ => Vec::new(),
        }
    }

    fn push(
        &mut self,
        from: PortId,
        to: PortId,
        attributes: &[Attribute],
    ) -> Result<(), NegotiationError> {
        let mut assigned = false;
        for &attribute in attributes {
            if self.table.propagate(self.graph, from, to, attribute)? {
                self.assignments += 1;
                assigned = true;
            }
        }
        if assigned {
            tracing::trace!(
                pass = %self.pass,
                from = %self.graph.port_name(from),
                to = %self.graph.port_name(to),
                format = %self.table.format(to),
                "propagated"
            );
            self.enqueue(to);
        }
        Ok(())
    }
}
