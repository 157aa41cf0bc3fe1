//! Init and finalize sequences for resolved graphs.
//!
//! A [`BuildPlan`] lists, in declaration order, the handles a graph needs and the
//! runtime calls that bring it up and tear it down:
//!
//! - init: create and enable the control port of every component, configure every
//!   resolved port and enable its component, then create and enable every
//!   connection;
//! - finalize: disable, destroy and clear connections in reverse order, then the
//!   same for components.
//!
//! A plan can be executed against any [`Runtime`] (the first failing call stops
//! the sequence) or rendered as C source with [`render_c`].
//!
//! # Example
//!
//! ```rust
//! use rilgraph::config;
//! use rilgraph::emit::{BuildPlan, RecordingRuntime, run_init};
//! use rilgraph::negotiation::ResolvedGraph;
//!
//! let graph = config::from_str(r#"{
//!     "source": {
//!         "component": "vc.ril.source",
//!         "output0": { "width": 320, "height": 240, "encoding": "i420",
//!                      "connect_to": ["sink", 0] }
//!     },
//!     "sink": { "component": "vc.ril.null_sink" }
//! }"#)?;
//! let plan = BuildPlan::from_resolved(&ResolvedGraph::resolve(graph)?);
//!
//! let mut runtime = RecordingRuntime::new();
//! run_init(&plan, &mut runtime)?;
//! assert_eq!(runtime.executed().len(), plan.init.len());
//! # Ok::<(), rilgraph::Error>(())
//! ```

mod c;
mod plan;
mod runtime;

pub use c::{CSourceOptions, render_c, statement};
pub use plan::{BuildPlan, ConnectionMode, ConnectionRef, Declaration, Operation, PortRef};
pub use runtime::{
    Phase, RecordingRuntime, Runtime, RuntimeError, RuntimeStatus, run_finalize, run_init,
};
