//! Components and their ports.
//!
//! A [`Component`] is a named instance of a [`ComponentKind`]. Its kind fixes how
//! many input and output ports it has; all ports exist from construction on and
//! are addressed by index. Configuration only fills in what is known about them.
//!
//! # Example
//!
//! ```rust
//! use rilgraph::component::{Component, ComponentKind, PortSettings};
//! use rilgraph::format::Encoding;
//!
//! let mut source = Component::new("source", ComponentKind::Source);
//! source
//!     .configure_output(
//!         0,
//!         PortSettings::new()
//!             .size(1920, 1080)
//!             .encoding(Encoding::Rgb24)
//!             .connect_to("render", 0),
//!     )
//!     .unwrap();
//!
//! // Synthetic sources have no inputs.
//! assert!(source.configure_input(0, PortSettings::new()).is_err());
//! ```

mod kind;
mod port;

pub use kind::{CATALOG, ComponentKind, KindInfo, Role, Transfer};
pub use port::{
    ComponentId, Endpoint, Port, PortDirection, PortHooks, PortId, PortSettings,
};

use crate::error::{Error, Result};

/// Control port settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSettings {
    /// Physical camera index (cameras only).
    pub camera_num: Option<u32>,
}

/// A component with its ports.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    kind: ComponentKind,
    control: ControlSettings,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
}

impl Component {
    /// Create a component with all ports unconfigured.
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        let inputs = (0..kind.input_capacity())
            .map(|i| Port::new(PortDirection::Input, i))
            .collect();
        let outputs = (0..kind.output_capacity())
            .map(|i| Port::new(PortDirection::Output, i))
            .collect();

        Self {
            name: name.into(),
            kind,
            control: ControlSettings::default(),
            inputs,
            outputs,
        }
    }

    /// Get the component's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the component's kind.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Control port settings.
    pub fn control(&self) -> &ControlSettings {
        &self.control
    }

    /// Input ports.
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Output ports.
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Ports in one direction.
    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Select the physical camera.
    pub fn set_camera_num(&mut self, camera_num: u32) -> Result<()> {
        if !self.kind.info().camera_num {
            return Err(Error::schema(
                format!("{}.control.camera_num", self.name),
                format!("{} has no camera_num", self.kind),
            ));
        }
        self.control.camera_num = Some(camera_num);
        Ok(())
    }

    /// Configure input port `index`.
    pub fn configure_input(&mut self, index: usize, settings: PortSettings) -> Result<()> {
        self.configure(PortDirection::Input, index, settings)
    }

    /// Configure output port `index`.
    pub fn configure_output(&mut self, index: usize, settings: PortSettings) -> Result<()> {
        self.configure(PortDirection::Output, index, settings)
    }

    fn configure(
        &mut self,
        direction: PortDirection,
        index: usize,
        settings: PortSettings,
    ) -> Result<()> {
        let info = self.kind.info();
        let location = format!("{}.{}{}", self.name, direction.key_prefix(), index);

        let capacity = self.ports(direction).len();
        if index >= capacity {
            return Err(Error::schema(
                location,
                format!(
                    "{} has {} {} port(s)",
                    self.kind,
                    capacity,
                    direction.key_prefix()
                ),
            ));
        }

        if self.ports(direction)[index].is_configured() {
            return Err(Error::schema(location, "port configured more than once"));
        }

        for (value, attribute) in [
            (settings.format.width, "width"),
            (settings.format.height, "height"),
        ] {
            if value == Some(0) {
                return Err(Error::schema(
                    format!("{location}.{attribute}"),
                    "must be positive",
                ));
            }
        }

        let is_input = direction == PortDirection::Input;
        if is_input && settings.connect_to.is_some() {
            return Err(Error::schema(
                format!("{location}.connect_to"),
                "only output ports declare connections",
            ));
        }
        if settings.display_region.is_some() && (!is_input || !info.display_region) {
            return Err(Error::schema(
                location,
                format!("{} does not accept a display region here", self.kind),
            ));
        }
        if settings.source_pattern.is_some() && (is_input || !info.source_pattern) {
            return Err(Error::schema(
                format!("{location}.source_pattern"),
                format!("{} does not accept a source pattern here", self.kind),
            ));
        }

        let port = match direction {
            PortDirection::Input => &mut self.inputs[index],
            PortDirection::Output => &mut self.outputs[index],
        };
        port.configure(settings);
        Ok(())
    }
}
