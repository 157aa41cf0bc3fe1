//! Port abstraction for component inputs and outputs.
//!
//! Ports are the connection points of components. Each component owns a fixed
//! number of input and output ports, addressed by index. A port's configuration
//! (declared format, connection target, side attributes) is set once while the
//! graph is built and read-only afterwards.

use crate::format::{DisplayRegion, Encoding, PortFormat, SourcePattern};
use std::fmt;

/// Direction of a port (input or output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortDirection {
    /// An input port (receives frames from upstream).
    Input,
    /// An output port (sends frames downstream).
    Output,
}

impl PortDirection {
    /// Prefix used in configuration keys and port names.
    pub fn key_prefix(self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        }
    }
}

/// Index of a component in its graph (declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    /// Get the underlying index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Address of a port within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    /// Owning component.
    pub component: ComponentId,
    /// Port direction.
    pub direction: PortDirection,
    /// Port index within its direction.
    pub index: usize,
}

impl PortId {
    /// Input port `index` of `component`.
    pub fn input(component: ComponentId, index: usize) -> Self {
        Self {
            component,
            direction: PortDirection::Input,
            index,
        }
    }

    /// Output port `index` of `component`.
    pub fn output(component: ComponentId, index: usize) -> Self {
        Self {
            component,
            direction: PortDirection::Output,
            index,
        }
    }
}

/// Connection target named in configuration: an input port by component name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Target component name.
    pub component: String,
    /// Target input index.
    pub index: usize,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(component: impl Into<String>, index: usize) -> Self {
        Self {
            component: component.into(),
            index,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.input{}", self.component, self.index)
    }
}

/// Callback identifiers attached to a port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortHooks {
    /// Called once after the port has been configured.
    pub post_setup: Option<String>,
    /// Called for every buffer crossing the port.
    pub buffer: Option<String>,
}

impl PortHooks {
    /// True if no hook is set.
    pub fn is_empty(&self) -> bool {
        self.post_setup.is_none() && self.buffer.is_none()
    }
}

/// Settings applied to a port while building a component.
///
/// ```rust
/// use rilgraph::component::PortSettings;
/// use rilgraph::format::Encoding;
///
/// let settings = PortSettings::new()
///     .size(1920, 1080)
///     .encoding(Encoding::Rgb24)
///     .connect_to("render", 0);
/// assert_eq!(settings.format.width, Some(1920));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortSettings {
    /// Declared (possibly partial) format.
    pub format: PortFormat,
    /// Connection target (outputs only).
    pub connect_to: Option<Endpoint>,
    /// Display region (renderer inputs only).
    pub display_region: Option<DisplayRegion>,
    /// Test pattern (synthetic source outputs only).
    pub source_pattern: Option<SourcePattern>,
    /// Callback identifiers.
    pub hooks: PortHooks,
}

impl PortSettings {
    /// Empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare width.
    pub fn width(mut self, width: u32) -> Self {
        self.format.width = Some(width);
        self
    }

    /// Declare height.
    pub fn height(mut self, height: u32) -> Self {
        self.format.height = Some(height);
        self
    }

    /// Declare width and height.
    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    /// Declare encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.format.encoding = Some(encoding);
        self
    }

    /// Connect to input `index` of component `component`.
    pub fn connect_to(mut self, component: impl Into<String>, index: usize) -> Self {
        self.connect_to = Some(Endpoint::new(component, index));
        self
    }

    /// Set the display region.
    pub fn display_region(mut self, region: DisplayRegion) -> Self {
        self.display_region = Some(region);
        self
    }

    /// Set the test pattern.
    pub fn source_pattern(mut self, pattern: SourcePattern) -> Self {
        self.source_pattern = Some(pattern);
        self
    }

    /// Set callback identifiers.
    pub fn hooks(mut self, hooks: PortHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// A port instance on a component.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    direction: PortDirection,
    index: usize,
    settings: PortSettings,
    configured: bool,
}

impl Port {
    pub(crate) fn new(direction: PortDirection, index: usize) -> Self {
        Self {
            direction,
            index,
            settings: PortSettings::default(),
            configured: false,
        }
    }

    pub(crate) fn configure(&mut self, settings: PortSettings) {
        self.settings = settings;
        self.configured = true;
    }

    /// Get the port's direction.
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Get the port's index within its direction.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Format declared in configuration.
    pub fn declared_format(&self) -> &PortFormat {
        &self.settings.format
    }

    /// Connection target, for output ports.
    pub fn connect_to(&self) -> Option<&Endpoint> {
        self.settings.connect_to.as_ref()
    }

    /// Display region, for renderer inputs.
    pub fn display_region(&self) -> Option<DisplayRegion> {
        self.settings.display_region
    }

    /// Test pattern, for synthetic source outputs.
    pub fn source_pattern(&self) -> Option<SourcePattern> {
        self.settings.source_pattern
    }

    /// Callback identifiers.
    pub fn hooks(&self) -> &PortHooks {
        &self.settings.hooks
    }

    /// True if configuration mentioned this port at all.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Configuration key for this port (`input0`, `output2`, ...).
    pub fn key(&self) -> String {
        format!("{}{}", self.direction.key_prefix(), self.index)
    }
}
