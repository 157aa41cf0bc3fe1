//! C source rendering of a build plan.
//!
//! The generated translation unit declares one `static` handle per component and
//! connection and defines `int <prefix>_init(void)` and `int <prefix>_finl(void)`.
//! Every runtime call is wrapped in `check_mmal(...)`, which the support header
//! is expected to define to return non-zero on failure. The header also provides
//! the `set_port_*` helpers and the `cb_nop` control callback.

use super::plan::{BuildPlan, ConnectionRef, Declaration, Operation, PortRef, component_handle};
use crate::component::PortDirection;
use std::fmt::Write;

/// Options for C rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSourceOptions {
    /// Support header to `#include`.
    pub header: String,
    /// Prefix of the generated function names.
    pub prefix: String,
}

impl Default for CSourceOptions {
    fn default() -> Self {
        Self {
            header: "genmmal_internal.h".to_string(),
            prefix: "genmmal".to_string(),
        }
    }
}

impl CSourceOptions {
    /// Set the support header.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the function prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Components,
    Ports,
    Connections,
}

fn section(operation: &Operation) -> Section {
    match operation {
        Operation::CreateComponent { .. }
        | Operation::EnableControl { .. }
        | Operation::SetCameraNumber { .. }
        | Operation::DisableComponent { .. }
        | Operation::DestroyComponent { .. }
        | Operation::ClearComponent { .. } => Section::Components,
        Operation::SetFormat { .. }
        | Operation::SetDisplayRect { .. }
        | Operation::SetFullscreen { .. }
        | Operation::SetSourcePattern { .. }
        | Operation::EnableComponent { .. } => Section::Ports,
        Operation::CreateConnection { .. }
        | Operation::EnableConnection { .. }
        | Operation::DisableConnection { .. }
        | Operation::DestroyConnection { .. }
        | Operation::ClearConnection { .. } => Section::Connections,
    }
}

fn port(port: &PortRef) -> String {
    let array = match port.direction {
        PortDirection::Input => "input",
        PortDirection::Output => "output",
    };
    format!("{}->{}[{}]", component_handle(&port.component), array, port.index)
}

fn connection_ports(connection: &ConnectionRef) -> String {
    format!("{}, {}", port(&connection.source), port(&connection.sink))
}

/// The C statement performing one operation.
pub fn statement(operation: &Operation) -> String {
    let call = match operation {
        Operation::CreateComponent { component, kind } => format!(
            "mmal_component_create(\"{}\", &{})",
            kind.runtime_name(),
            component_handle(component)
        ),
        Operation::EnableControl { component } => {
            format!("mmal_port_enable({}->control, cb_nop)", component_handle(component))
        }
        Operation::SetCameraNumber {
            component,
            camera_num,
        } => format!(
            "mmal_port_parameter_set_int32({}->control, MMAL_PARAMETER_CAMERA_NUM, {})",
            component_handle(component),
            camera_num
        ),
        Operation::SetFormat { port: p, format } => format!(
            "set_port_format({}, {}, {}, {})",
            port(p),
            format.encoding.runtime_name(),
            format.width,
            format.height
        ),
        Operation::SetDisplayRect { port: p, rect } => format!(
            "set_port_displayregion_rect({}, {}, {}, {}, {})",
            port(p),
            rect.x,
            rect.y,
            rect.width,
            rect.height
        ),
        Operation::SetFullscreen {
            port: p,
            fullscreen,
        } => format!(
            "set_port_displayregion_fullscreen({}, {})",
            port(p),
            u8::from(*fullscreen)
        ),
        Operation::SetSourcePattern {
            port: p,
            pattern,
            seed,
        } => format!(
            "set_port_video_source_pattern({}, {}, {:#x})",
            port(p),
            pattern.runtime_name(),
            seed
        ),
        Operation::EnableComponent { component } => {
            format!("mmal_component_enable({})", component_handle(component))
        }
        Operation::CreateConnection { connection, .. } => format!(
            "mmal_connection_create(&{}, {}, MMAL_CONNECTION_FLAG_TUNNELLING)",
            connection.handle(),
            connection_ports(connection)
        ),
        Operation::EnableConnection { connection } => {
            format!("mmal_connection_enable({})", connection.handle())
        }
        Operation::DisableConnection { connection } => {
            format!("mmal_connection_disable({})", connection.handle())
        }
        Operation::DestroyConnection { connection } => {
            format!("mmal_connection_destroy({})", connection.handle())
        }
        Operation::DisableComponent { component } => {
            format!("mmal_component_disable({})", component_handle(component))
        }
        Operation::DestroyComponent { component } => {
            format!("mmal_component_destroy({})", component_handle(component))
        }
        // Handle resets are plain assignments.
        Operation::ClearConnection { connection } => {
            return format!("{} = NULL;", connection.handle());
        }
        Operation::ClearComponent { component } => {
            return format!("{} = NULL;", component_handle(component));
        }
    };
    format!("check_mmal({call});")
}

/// Render a plan as a C translation unit.
pub fn render_c(plan: &BuildPlan, options: &CSourceOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "#include \"{}\"", options.header);
    let _ = writeln!(out);

    for declaration in &plan.declarations {
        let ty = match declaration {
            Declaration::Component(_) => "MMAL_COMPONENT_T",
            Declaration::Connection(_) => "MMAL_CONNECTION_T",
        };
        let _ = writeln!(out, "static {ty} *{} = NULL;", declaration.handle());
    }
    let _ = writeln!(out);

    function(&mut out, &format!("{}_init", options.prefix), &plan.init);
    let _ = writeln!(out);
    function(&mut out, &format!("{}_finl", options.prefix), &plan.finalize);
    out
}

fn function(out: &mut String, name: &str, operations: &[Operation]) {
    let _ = writeln!(out, "int {name}(void)");
    let _ = writeln!(out, "{{");
    let mut previous = None;
    for operation in operations {
        let current = section(operation);
        if previous.is_some_and(|previous| previous != current) {
            let _ = writeln!(out);
        }
        previous = Some(current);
        let _ = writeln!(out, "\t{}", statement(operation));
    }
    if previous.is_some() {
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "\treturn 0;");
    let _ = writeln!(out, "}}");
}
