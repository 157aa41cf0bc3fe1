//! Per-port format state for one resolution pass.

use super::error::NegotiationError;
use crate::component::{PortDirection, PortId};
use crate::format::{Attribute, PortFormat};
use crate::graph::Graph;

/// Format known for every port of a graph.
///
/// Tables are shaped like the graph they were created from. Each propagation pass
/// works on its own table, so the graph itself never carries pass state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatTable {
    inputs: Vec<Vec<PortFormat>>,
    outputs: Vec<Vec<PortFormat>>,
}

impl FormatTable {
    /// A table with nothing known.
    pub fn empty(graph: &Graph) -> Self {
        let mut table = Self::default();
        for (_, component) in graph.components() {
            table
                .inputs
                .push(vec![PortFormat::UNKNOWN; component.inputs().len()]);
            table
                .outputs
                .push(vec![PortFormat::UNKNOWN; component.outputs().len()]);
        }
        table
    }

    /// A table holding the formats declared in configuration.
    pub fn declared(graph: &Graph) -> Self {
        let mut table = Self::empty(graph);
        for port in graph.ports() {
            table.set(port, *graph.port(port).declared_format());
        }
        table
    }

    fn slots(&self, direction: PortDirection) -> &Vec<Vec<PortFormat>> {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Get the format of a port.
    pub fn get(&self, port: PortId) -> Option<&PortFormat> {
        self.slots(port.direction)
            .get(port.component.index())?
            .get(port.index)
    }

    /// Get the format of a port mutably.
    pub fn get_mut(&mut self, port: PortId) -> Option<&mut PortFormat> {
        let slots = match port.direction {
            PortDirection::Input => &mut self.inputs,
            PortDirection::Output => &mut self.outputs,
        };
        slots.get_mut(port.component.index())?.get_mut(port.index)
    }

    /// Format of a port, unknown if the port is not in the table.
    pub fn format(&self, port: PortId) -> PortFormat {
        self.get(port).copied().unwrap_or_default()
    }

    /// Replace the format of a port.
    pub fn set(&mut self, port: PortId, format: PortFormat) {
        if let Some(slot) = self.get_mut(port) {
            *slot = format;
        }
    }

    /// Copy one attribute from `from` onto `to`.
    ///
    /// Returns `Ok(true)` if `to` did not have the attribute and now does. A source
    /// without the attribute propagates nothing; a destination that already has a
    /// different value is a conflict.
    pub fn propagate(
        &mut self,
        graph: &Graph,
        from: PortId,
        to: PortId,
        attribute: Attribute,
    ) -> Result<bool, NegotiationError> {
        let Some(incoming) = self.format(from).get(attribute) else {
            return Ok(false);
        };
        let Some(slot) = self.get_mut(to) else {
            return Ok(false);
        };

        match slot.get(attribute) {
            Some(existing) if existing == incoming => Ok(false),
            Some(existing) => Err(NegotiationError::Conflict {
                port: graph.port_name(to),
                attribute,
                origin: graph.port_name(from),
                incoming,
                existing,
            }),
            None => {
                slot.set(attribute, incoming);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::format::{AttributeValue, Encoding};
    use serde_json::json;

    fn graph() -> Graph {
        config::from_value(json!({
            "source": {
                "component": "vc.ril.source",
                "output0": { "width": 100, "encoding": "rgb24", "connect_to": ["sink", 0] }
            },
            "sink": {
                "component": "vc.ril.null_sink",
                "input0": { "width": 200 }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_declared_table() {
        let graph = graph();
        let table = FormatTable::declared(&graph);
        let out = graph.port_id("source", PortDirection::Output, 0).unwrap();
        assert_eq!(table.format(out).width, Some(100));
        assert_eq!(table.format(out).encoding, Some(Encoding::Rgb24));
        assert_eq!(table.format(out).height, None);
    }

    #[test]
    fn test_propagate_sets_missing_attribute() {
        let graph = graph();
        let mut table = FormatTable::declared(&graph);
        let out = graph.port_id("source", PortDirection::Output, 0).unwrap();
        let sink = graph.port_id("sink", PortDirection::Input, 0).unwrap();

        assert!(table
            .propagate(&graph, out, sink, Attribute::Encoding)
            .unwrap());
        // Already set, same value
        assert!(!table
            .propagate(&graph, out, sink, Attribute::Encoding)
            .unwrap());
        // Source does not know the height
        assert!(!table.propagate(&graph, out, sink, Attribute::Height).unwrap());
        assert_eq!(table.format(sink).height, None);
    }

    #[test]
    fn test_propagate_conflict_names_both_values() {
        let graph = graph();
        let mut table = FormatTable::declared(&graph);
        let out = graph.port_id("source", PortDirection::Output, 0).unwrap();
        let sink = graph.port_id("sink", PortDirection::Input, 0).unwrap();

        let err = table
            .propagate(&graph, out, sink, Attribute::Width)
            .unwrap_err();
        assert_eq!(
            err,
            NegotiationError::Conflict {
                port: "sink.input0".into(),
                attribute: Attribute::Width,
                origin: "source.output0".into(),
                incoming: AttributeValue::Dimension(100),
                existing: AttributeValue::Dimension(200),
            }
        );
        assert_eq!(
            err.to_string(),
            "conflicting width on 'sink.input0': 100 (from 'source.output0') vs. 200"
        );
    }
}
