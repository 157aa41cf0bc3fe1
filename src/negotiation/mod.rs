//! Format resolution for component graphs.
//!
//! Users declare formats on only some ports. Resolution infers the rest by
//! propagating known attributes over connections and through components, in two
//! independent directions:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FormatSolver                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. Declared formats form the starting table                 │
//! │  2. Forward pass: producers -> consumers, to fixpoint        │
//! │  3. Backward pass: consumers -> producers, to fixpoint       │
//! │  4. Reconcile both tables; repeat while anything is learned  │
//! │  5. Final passes with opaque fallback, strict merge          │
//! │  6. Check both ends of every connection agree                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each pass is a pure function from a graph and a starting [`FormatTable`] to a
//! new table; the graph never carries pass state. Any conflicting or missing
//! attribute is an error, there is no best-effort result.
//!
//! # Example
//!
//! ```rust
//! use rilgraph::component::PortDirection;
//! use rilgraph::config;
//! use rilgraph::negotiation::ResolvedGraph;
//!
//! let graph = config::from_str(r#"{
//!     "source": {
//!         "component": "vc.ril.source",
//!         "output0": { "width": 1920, "height": 1080, "encoding": "rgb24",
//!                      "connect_to": ["render", 0] }
//!     },
//!     "render": { "component": "vc.ril.video_render" }
//! }"#)?;
//!
//! let resolved = ResolvedGraph::resolve(graph)?;
//! let render = resolved.graph().port_id("render", PortDirection::Input, 0).unwrap();
//! assert_eq!(resolved.format(render).unwrap().to_string(), "1920x1080 MMAL_ENCODING_RGB24");
//! # Ok::<(), rilgraph::Error>(())
//! ```

mod error;
mod merge;
mod propagate;
mod solver;
mod table;

pub use error::{MissingAttribute, NegotiationError};
pub use merge::merge;
pub use propagate::{EncodingFallback, Pass, resolve_backward, resolve_forward};
pub use solver::{FormatSolver, ResolvedGraph};
pub use table::FormatTable;
