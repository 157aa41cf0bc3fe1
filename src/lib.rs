//! # rilgraph
//!
//! Format resolution and init/finalize code generation for MMAL component graphs.
//!
//! A graph is a set of fixed-shape components (camera, ISP, resize, splitter,
//! renderer, ...) whose output ports connect pairwise to input ports. Every port
//! carries a format: width, height and pixel encoding. Users declare formats on
//! only some ports; rilgraph infers the rest and fails on any conflict or any
//! port left undetermined.
//!
//! ## Features
//!
//! - **Strict configuration**: JSON documents with a closed schema
//! - **Bidirectional inference**: forward and backward passes, reconciled per attribute
//! - **Typed plans**: ordered init/finalize operations, runnable or renderable as C
//!
//! ## Quick Start
//!
//! ```rust
//! use rilgraph::prelude::*;
//!
//! let graph = config::from_str(r#"{
//!     "camera": {
//!         "component": "vc.ril.camera",
//!         "output0": { "connect_to": ["isp", 0] }
//!     },
//!     "isp": {
//!         "component": "vc.ril.isp",
//!         "input0": { "width": 1920, "height": 1080, "encoding": "opaque" },
//!         "output0": { "width": 640, "height": 480, "encoding": "i420",
//!                      "connect_to": ["render", 0] }
//!     },
//!     "render": { "component": "vc.ril.video_render" }
//! }"#)?;
//!
//! let resolved = ResolvedGraph::resolve(graph)?;
//! let plan = BuildPlan::from_resolved(&resolved);
//! let source = render_c(&plan, &CSourceOptions::default());
//! assert!(source.contains("int genmmal_init(void)"));
//! # Ok::<(), rilgraph::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod config;
pub mod emit;
pub mod error;
pub mod format;
pub mod graph;
pub mod negotiation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::component::{Component, ComponentKind, PortDirection, PortId, PortSettings};
    pub use crate::config;
    pub use crate::emit::{BuildPlan, CSourceOptions, Runtime, render_c, run_finalize, run_init};
    pub use crate::error::{Error, Result};
    pub use crate::format::{Encoding, PortFormat, VideoFormat};
    pub use crate::graph::Graph;
    pub use crate::negotiation::{FormatSolver, ResolvedGraph};
}

pub use error::{Error, Result};
