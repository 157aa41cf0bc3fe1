//! Ordered runtime operations for a resolved graph.

use crate::component::{ComponentKind, PortDirection, PortId};
use crate::format::{DisplayRegion, Rect, SOURCE_PATTERN_SEED, SourcePattern, VideoFormat};
use crate::graph::{Connection, Graph};
use crate::negotiation::ResolvedGraph;
use std::fmt;

/// A port, addressed by component name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    /// Owning component.
    pub component: String,
    /// Port direction.
    pub direction: PortDirection,
    /// Port index.
    pub index: usize,
}

impl PortRef {
    fn new(graph: &Graph, port: PortId) -> Self {
        Self {
            component: graph.component(port.component).name().to_string(),
            direction: port.direction,
            index: port.index,
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}",
            self.component,
            self.direction.key_prefix(),
            self.index
        )
    }
}

/// A connection, addressed by its two ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionRef {
    /// Output port.
    pub source: PortRef,
    /// Input port.
    pub sink: PortRef,
}

impl ConnectionRef {
    fn new(graph: &Graph, connection: Connection) -> Self {
        Self {
            source: PortRef::new(graph, connection.source),
            sink: PortRef::new(graph, connection.sink),
        }
    }

    /// Handle name, `conn_<src>_<i>_<dst>_<j>`.
    pub fn handle(&self) -> String {
        format!(
            "conn_{}_{}_{}_{}",
            self.source.component, self.source.index, self.sink.component, self.sink.index
        )
    }
}

impl fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.sink)
    }
}

/// How a connection moves buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    /// Ports exchange buffers directly; no callbacks run on the host.
    #[default]
    Tunnelling,
}

/// A handle that must be declared before the init routine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Component handle, `cp_<name>`.
    Component(String),
    /// Connection handle.
    Connection(ConnectionRef),
}

impl Declaration {
    /// Handle name.
    pub fn handle(&self) -> String {
        match self {
            Declaration::Component(name) => component_handle(name),
            Declaration::Connection(connection) => connection.handle(),
        }
    }
}

pub(crate) fn component_handle(name: &str) -> String {
    format!("cp_{name}")
}

/// One runtime call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create a component of a kind.
    CreateComponent {
        /// Component name.
        component: String,
        /// Component kind.
        kind: ComponentKind,
    },
    /// Enable the component's control port.
    EnableControl {
        /// Component name.
        component: String,
    },
    /// Select the physical camera.
    SetCameraNumber {
        /// Component name.
        component: String,
        /// Camera index.
        camera_num: u32,
    },
    /// Commit a port format.
    SetFormat {
        /// Target port.
        port: PortRef,
        /// Resolved format.
        format: VideoFormat,
    },
    /// Draw a renderer input into a rectangle.
    SetDisplayRect {
        /// Target port.
        port: PortRef,
        /// Destination rectangle.
        rect: Rect,
    },
    /// Toggle fullscreen on a renderer input.
    SetFullscreen {
        /// Target port.
        port: PortRef,
        /// Fullscreen flag.
        fullscreen: bool,
    },
    /// Select a test pattern on a synthetic source output.
    SetSourcePattern {
        /// Target port.
        port: PortRef,
        /// Pattern.
        pattern: SourcePattern,
        /// Pattern parameter.
        seed: u32,
    },
    /// Enable a component.
    EnableComponent {
        /// Component name.
        component: String,
    },
    /// Create a connection.
    CreateConnection {
        /// Connection.
        connection: ConnectionRef,
        /// Buffer exchange mode.
        mode: ConnectionMode,
    },
    /// Enable a connection.
    EnableConnection {
        /// Connection.
        connection: ConnectionRef,
    },
    /// Disable a connection.
    DisableConnection {
        /// Connection.
        connection: ConnectionRef,
    },
    /// Destroy a connection.
    DestroyConnection {
        /// Connection.
        connection: ConnectionRef,
    },
    /// Reset a connection handle.
    ClearConnection {
        /// Connection.
        connection: ConnectionRef,
    },
    /// Disable a component.
    DisableComponent {
        /// Component name.
        component: String,
    },
    /// Destroy a component.
    DestroyComponent {
        /// Component name.
        component: String,
    },
    /// Reset a component handle.
    ClearComponent {
        /// Component name.
        component: String,
    },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateComponent { component, kind } => {
                write!(f, "create {component} ({kind})")
            }
            Operation::EnableControl { component } => write!(f, "enable {component}.control"),
            Operation::SetCameraNumber {
                component,
                camera_num,
            } => write!(f, "set {component}.control camera_num {camera_num}"),
            Operation::SetFormat { port, format } => write!(f, "set {port} format {format}"),
            Operation::SetDisplayRect { port, rect } => write!(
                f,
                "set {port} display rect {},{} {}x{}",
                rect.x, rect.y, rect.width, rect.height
            ),
            Operation::SetFullscreen { port, fullscreen } => {
                write!(f, "set {port} fullscreen {fullscreen}")
            }
            Operation::SetSourcePattern {
                port,
                pattern,
                seed,
            } => write!(f, "set {port} source pattern {pattern} {seed:#x}"),
            Operation::EnableComponent { component } => write!(f, "enable {component}"),
            Operation::CreateConnection { connection, mode } => {
                write!(f, "connect {connection} ({mode:?})")
            }
            Operation::EnableConnection { connection } => write!(f, "enable {connection}"),
            Operation::DisableConnection { connection } => write!(f, "disable {connection}"),
            Operation::DestroyConnection { connection } => write!(f, "destroy {connection}"),
            Operation::ClearConnection { connection } => {
                write!(f, "clear {}", connection.handle())
            }
            Operation::DisableComponent { component } => write!(f, "disable {component}"),
            Operation::DestroyComponent { component } => write!(f, "destroy {component}"),
            Operation::ClearComponent { component } => {
                write!(f, "clear {}", component_handle(component))
            }
        }
    }
}

/// Handle declarations plus the init and finalize sequences of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Handles, in declaration order.
    pub declarations: Vec<Declaration>,
    /// Operations that materialize the graph.
    pub init: Vec<Operation>,
    /// Operations that tear it down again.
    pub finalize: Vec<Operation>,
}

impl BuildPlan {
    /// Walk a resolved graph in declaration order.
    pub fn from_resolved(resolved: &ResolvedGraph) -> Self {
        let graph = resolved.graph();
        let connections: Vec<ConnectionRef> = graph
            .connections()
            .map(|connection| ConnectionRef::new(graph, connection))
            .collect();

        let mut declarations = Vec::new();
        for (_, component) in graph.components() {
            declarations.push(Declaration::Component(component.name().to_string()));
            declarations.extend(
                connections
                    .iter()
                    .filter(|c| c.source.component == component.name())
                    .cloned()
                    .map(Declaration::Connection),
            );
        }

        let mut init = Vec::new();
        for (_, component) in graph.components() {
            let name = component.name().to_string();
            init.push(Operation::CreateComponent {
                component: name.clone(),
                kind: component.kind(),
            });
            // The camera number only takes effect while the control port is disabled.
            if let Some(camera_num) = component.control().camera_num {
                init.push(Operation::SetCameraNumber {
                    component: name.clone(),
                    camera_num,
                });
            }
            init.push(Operation::EnableControl { component: name });
        }

        for (id, component) in graph.components() {
            let ports = (0..component.inputs().len())
                .map(|i| PortId::input(id, i))
                .chain((0..component.outputs().len()).map(|i| PortId::output(id, i)));
            for port in ports {
                push_port_setup(&mut init, resolved, port);
            }
            init.push(Operation::EnableComponent {
                component: component.name().to_string(),
            });
        }

        for connection in &connections {
            init.push(Operation::CreateConnection {
                connection: connection.clone(),
                mode: ConnectionMode::Tunnelling,
            });
            init.push(Operation::EnableConnection {
                connection: connection.clone(),
            });
        }

        let mut finalize = Vec::new();
        for connection in connections.iter().rev() {
            finalize.push(Operation::DisableConnection {
                connection: connection.clone(),
            });
            finalize.push(Operation::DestroyConnection {
                connection: connection.clone(),
            });
            finalize.push(Operation::ClearConnection {
                connection: connection.clone(),
            });
        }
        for (_, component) in graph.components().collect::<Vec<_>>().into_iter().rev() {
            let component = component.name().to_string();
            finalize.push(Operation::DisableComponent {
                component: component.clone(),
            });
            finalize.push(Operation::DestroyComponent {
                component: component.clone(),
            });
            finalize.push(Operation::ClearComponent { component });
        }

        tracing::debug!(
            declarations = declarations.len(),
            init = init.len(),
            finalize = finalize.len(),
            "build plan ready"
        );
        Self {
            declarations,
            init,
            finalize,
        }
    }
}

fn push_port_setup(init: &mut Vec<Operation>, resolved: &ResolvedGraph, port: PortId) {
    let graph = resolved.graph();
    let Some(format) = resolved.format(port) else {
        return;
    };
    let settings = graph.port(port);
    let port_ref = PortRef::new(graph, port);

    if !settings.hooks().is_empty() {
        tracing::warn!(
            port = %port_ref,
            "port hooks are not emitted; tunnelled connections bypass callbacks"
        );
    }

    init.push(Operation::SetFormat {
        port: port_ref.clone(),
        format,
    });
    match settings.display_region() {
        Some(DisplayRegion::Rect(rect)) => init.push(Operation::SetDisplayRect {
            port: port_ref.clone(),
            rect,
        }),
        Some(DisplayRegion::Fullscreen(fullscreen)) => init.push(Operation::SetFullscreen {
            port: port_ref.clone(),
            fullscreen,
        }),
        None => {}
    }
    if let Some(pattern) = settings.source_pattern() {
        init.push(Operation::SetSourcePattern {
            port: port_ref,
            pattern,
            seed: SOURCE_PATTERN_SEED,
        });
    }
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "handles:")?;
        for declaration in &self.declarations {
            writeln!(f, "  {}", declaration.handle())?;
        }
        writeln!(f, "init:")?;
        for operation in &self.init {
            writeln!(f, "  {operation}")?;
        }
        writeln!(f, "finalize:")?;
        for operation in &self.finalize {
            writeln!(f, "  {operation}")?;
        }
        Ok(())
    }
}
