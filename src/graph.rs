//! Component graph structure using daggy's petgraph.
//!
//! The graph owns the components in declaration order and indexes the connections
//! declared on their output ports. Both directions of every connection are indexed
//! once at construction: output to input (`target_of`) and input to output
//! (`feeder_of`). After construction the topology never changes.

use crate::component::{Component, ComponentId, Port, PortDirection, PortId};
use crate::error::{Error, Result, TopologyError};
use daggy::NodeIndex;
use daggy::petgraph::dot::Dot;
use daggy::petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::fmt;

/// A resolved connection between an output port and an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Output port sending frames.
    pub source: PortId,
    /// Input port receiving frames.
    pub sink: PortId,
}

/// Edge weight in the topology graph.
#[derive(Debug, Clone, Copy)]
struct Link {
    source_port: usize,
    sink_port: usize,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output{} -> input{}", self.source_port, self.sink_port)
    }
}

/// A component graph with validated connections.
pub struct Graph {
    /// Components in declaration order; `ComponentId(i)` is `components[i]`.
    components: Vec<Component>,
    /// Name-to-id mapping for quick lookup.
    by_name: HashMap<String, ComponentId>,
    /// Node `i` is component `i`; edges are in declaration order.
    topology: DiGraph<String, Link>,
    /// Output port -> input port it feeds.
    targets: HashMap<PortId, PortId>,
    /// Input port -> output port feeding it.
    feeders: HashMap<PortId, PortId>,
}

impl Graph {
    /// Build a graph from components in declaration order.
    ///
    /// Fails on duplicate names, connections to missing components or input
    /// indices, and inputs driven by more than one output.
    pub fn new(components: Vec<Component>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(components.len());
        let mut topology = DiGraph::with_capacity(components.len(), components.len());

        for (i, component) in components.iter().enumerate() {
            if by_name
                .insert(component.name().to_string(), ComponentId(i))
                .is_some()
            {
                return Err(TopologyError::DuplicateComponent {
                    name: component.name().to_string(),
                }
                .into());
            }
            topology.add_node(component.name().to_string());
        }

        let mut graph = Self {
            components,
            by_name,
            topology,
            targets: HashMap::new(),
            feeders: HashMap::new(),
        };
        graph.index_connections()?;

        tracing::debug!(
            components = graph.components.len(),
            connections = graph.topology.edge_count(),
            "graph built"
        );
        Ok(graph)
    }

    fn index_connections(&mut self) -> Result<()> {
        for (i, component) in self.components.iter().enumerate() {
            for port in component.outputs() {
                let Some(endpoint) = port.connect_to() else {
                    continue;
                };
                let source = PortId::output(ComponentId(i), port.index());

                let target_id = self.by_name.get(&endpoint.component).copied().ok_or_else(|| {
                    TopologyError::UnknownComponent {
                        port: format!("{}.{}", component.name(), port.key()),
                        target: endpoint.component.clone(),
                    }
                })?;
                let target = &self.components[target_id.0];
                let capacity = target.inputs().len();
                if endpoint.index >= capacity {
                    return Err(TopologyError::NoSuchInput {
                        port: format!("{}.{}", component.name(), port.key()),
                        target: endpoint.component.clone(),
                        index: endpoint.index,
                        capacity,
                    }
                    .into());
                }
                let sink = PortId::input(target_id, endpoint.index);

                if let Some(&first) = self.feeders.get(&sink) {
                    return Err(TopologyError::DoubleDrive {
                        input: endpoint.to_string(),
                        first: self.port_name(first),
                        second: format!("{}.{}", component.name(), port.key()),
                    }
                    .into());
                }

                self.feeders.insert(sink, source);
                self.targets.insert(source, sink);
                self.topology.add_edge(
                    NodeIndex::new(i),
                    NodeIndex::new(target_id.0),
                    Link {
                        source_port: source.index,
                        sink_port: sink.index,
                    },
                );
            }
        }
        Ok(())
    }

    /// Iterate over components in declaration order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components
            .iter()
            .enumerate()
            .map(|(i, c)| (ComponentId(i), c))
    }

    /// Get a component by id.
    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    /// Get a component id by name.
    pub fn component_id(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Get a port by id.
    pub fn port(&self, id: PortId) -> &Port {
        &self.component(id.component).ports(id.direction)[id.index]
    }

    /// Look up a port by component name, direction and index.
    pub fn port_id(&self, name: &str, direction: PortDirection, index: usize) -> Option<PortId> {
        let component = self.component_id(name)?;
        (index < self.component(component).ports(direction).len()).then_some(PortId {
            component,
            direction,
            index,
        })
    }

    /// The input port an output port feeds, if connected.
    pub fn target_of(&self, output: PortId) -> Option<PortId> {
        self.targets.get(&output).copied()
    }

    /// The output port feeding an input port, if connected.
    pub fn feeder_of(&self, input: PortId) -> Option<PortId> {
        self.feeders.get(&input).copied()
    }

    /// Iterate over connections in declaration order.
    pub fn connections(&self) -> impl Iterator<Item = Connection> {
        self.topology.raw_edges().iter().map(|edge| Connection {
            source: PortId::output(ComponentId(edge.source().index()), edge.weight.source_port),
            sink: PortId::input(ComponentId(edge.target().index()), edge.weight.sink_port),
        })
    }

    /// Iterate over every port: components in declaration order, inputs before outputs.
    pub fn ports(&self) -> impl Iterator<Item = PortId> {
        self.components().flat_map(|(id, component)| {
            let inputs = (0..component.inputs().len()).map(move |i| PortId::input(id, i));
            let outputs = (0..component.outputs().len()).map(move |i| PortId::output(id, i));
            inputs.chain(outputs)
        })
    }

    /// Human-readable port name, e.g. `isp.input0`.
    pub fn port_name(&self, id: PortId) -> String {
        format!(
            "{}.{}{}",
            self.component(id.component).name(),
            id.direction.key_prefix(),
            id.index
        )
    }

    /// True if the port must end up with a complete format.
    ///
    /// A port is required when it is connected, when configuration mentions it, or
    /// when it is the only port of its direction on its component. Spare ports of
    /// multi-port components (camera outputs, splitter outputs) are otherwise inert.
    pub fn is_required(&self, id: PortId) -> bool {
        let connected = match id.direction {
            PortDirection::Input => self.feeders.contains_key(&id),
            PortDirection::Output => self.targets.contains_key(&id),
        };
        connected
            || self.port(id).is_configured()
            || self.component(id.component).ports(id.direction).len() == 1
    }

    /// Get the number of components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Get the number of connections.
    pub fn connection_count(&self) -> usize {
        self.topology.edge_count()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Render the topology in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.topology))
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("components", &self.component_count())
            .field("connections", &self.connection_count())
            .finish()
    }
}

impl TryFrom<Vec<Component>> for Graph {
    type Error = Error;

    fn try_from(components: Vec<Component>) -> Result<Self> {
        Graph::new(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentKind, PortSettings};

    fn chain() -> Vec<Component> {
        let mut source = Component::new("source", ComponentKind::Source);
        source
            .configure_output(0, PortSettings::new().connect_to("split", 0))
            .unwrap();

        let mut split = Component::new("split", ComponentKind::VideoSplitter);
        split
            .configure_output(0, PortSettings::new().connect_to("render", 0))
            .unwrap();
        split
            .configure_output(1, PortSettings::new().connect_to("sink", 0))
            .unwrap();

        let render = Component::new("render", ComponentKind::VideoRender);
        let sink = Component::new("sink", ComponentKind::NullSink);
        vec![source, split, render, sink]
    }

    #[test]
    fn test_graph_creation() {
        let graph = Graph::new(chain()).unwrap();
        assert_eq!(graph.component_count(), 4);
        assert_eq!(graph.connection_count(), 3);
        assert!(!graph.is_empty());
        assert_eq!(graph.component_id("render"), Some(ComponentId(2)));
    }

    #[test]
    fn test_target_and_feeder_indices() {
        let graph = Graph::new(chain()).unwrap();
        let split_out1 = graph.port_id("split", PortDirection::Output, 1).unwrap();
        let sink_in = graph.port_id("sink", PortDirection::Input, 0).unwrap();

        assert_eq!(graph.target_of(split_out1), Some(sink_in));
        assert_eq!(graph.feeder_of(sink_in), Some(split_out1));
        assert_eq!(graph.port_name(sink_in), "sink.input0");

        let split_out2 = graph.port_id("split", PortDirection::Output, 2).unwrap();
        assert_eq!(graph.target_of(split_out2), None);
        assert!(graph.port_id("split", PortDirection::Output, 4).is_none());
    }

    #[test]
    fn test_connections_in_declaration_order() {
        let graph = Graph::new(chain()).unwrap();
        let names: Vec<_> = graph
            .connections()
            .map(|c| format!("{} -> {}", graph.port_name(c.source), graph.port_name(c.sink)))
            .collect();
        assert_eq!(
            names,
            vec![
                "source.output0 -> split.input0",
                "split.output0 -> render.input0",
                "split.output1 -> sink.input0",
            ]
        );
    }

    #[test]
    fn test_unknown_target() {
        let mut source = Component::new("source", ComponentKind::Source);
        source
            .configure_output(0, PortSettings::new().connect_to("nowhere", 0))
            .unwrap();

        let err = Graph::new(vec![source]).unwrap_err();
        assert!(matches!(
            err,
            Error::Topology(TopologyError::UnknownComponent { ref target, .. }) if target == "nowhere"
        ));
    }

    #[test]
    fn test_target_index_out_of_range() {
        let mut source = Component::new("source", ComponentKind::Source);
        source
            .configure_output(0, PortSettings::new().connect_to("render", 1))
            .unwrap();
        let render = Component::new("render", ComponentKind::VideoRender);

        let err = Graph::new(vec![source, render]).unwrap_err();
        assert!(matches!(
            err,
            Error::Topology(TopologyError::NoSuchInput {
                index: 1,
                capacity: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_double_drive_rejected() {
        let mut a = Component::new("a", ComponentKind::Source);
        a.configure_output(0, PortSettings::new().connect_to("render", 0))
            .unwrap();
        let mut b = Component::new("b", ComponentKind::RawCam);
        b.configure_output(0, PortSettings::new().connect_to("render", 0))
            .unwrap();
        let render = Component::new("render", ComponentKind::VideoRender);

        let err = Graph::new(vec![a, b, render]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "topology error: 'render.input0' is driven by both 'a.output0' and 'b.output0'"
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Graph::new(vec![
            Component::new("x", ComponentKind::Isp),
            Component::new("x", ComponentKind::Resize),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Topology(TopologyError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn test_required_ports() {
        let graph = Graph::new(chain()).unwrap();
        let port = |name, direction, index| graph.port_id(name, direction, index).unwrap();

        // Connected
        assert!(graph.is_required(port("split", PortDirection::Output, 0)));
        // Spare splitter outputs are inert
        assert!(!graph.is_required(port("split", PortDirection::Output, 3)));
        // Single-port direction
        assert!(graph.is_required(port("render", PortDirection::Input, 0)));
    }

    #[test]
    fn test_to_dot() {
        let graph = Graph::new(chain()).unwrap();
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"split\""));
        assert!(dot.contains("output1 -> input0"));
    }
}
