//! Catalog of component kinds.
//!
//! Every per-kind fact the resolver and the loader need lives in [`CATALOG`]:
//! port capacities, whether the kind starts or ends inference, how formats cross
//! it, and which side attributes it accepts. Adding a kind means adding one enum
//! variant and one catalog row.

use crate::format::{Attribute, UnknownName};
use std::fmt;
use std::str::FromStr;

/// Component kinds known to the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Camera with preview, video and still outputs.
    Camera,
    /// Raw sensor capture.
    RawCam,
    /// Synthetic pattern generator.
    Source,
    /// Image signal processor (arbitrary size and encoding conversion).
    Isp,
    /// Scaler. Changes size, keeps encoding.
    Resize,
    /// Fans one input out to several identical outputs.
    VideoSplitter,
    /// Video renderer.
    VideoRender,
    /// Discards everything it receives.
    NullSink,
}

/// Where a kind sits in the data flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Originates data; seeds the forward pass and stops the backward pass.
    Producer,
    /// Passes data through.
    Filter,
    /// Terminates data; seeds the backward pass and stops the forward pass.
    Consumer,
}

/// How format attributes cross a component from its inputs to its outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transfer {
    /// Outputs carry the same format as the input.
    PassThrough,
    /// Outputs keep the input encoding but may change size.
    EncodingOnly,
    /// Outputs are unrelated to the input.
    Opaque,
}

impl Transfer {
    /// Attributes that cross the component, in either direction.
    pub fn attributes(self) -> &'static [Attribute] {
        match self {
            Transfer::PassThrough => &Attribute::ALL,
            Transfer::EncodingOnly => &[Attribute::Encoding],
            Transfer::Opaque => &[],
        }
    }
}

/// Static description of a component kind.
#[derive(Debug)]
pub struct KindInfo {
    /// The kind described by this row.
    pub kind: ComponentKind,
    /// Name passed to the runtime when creating the component.
    pub runtime_name: &'static str,
    /// Number of input ports.
    pub inputs: usize,
    /// Number of output ports.
    pub outputs: usize,
    /// Data-flow role.
    pub role: Role,
    /// Transfer rule across the component.
    pub transfer: Transfer,
    /// Accepts `camera_num` on its control port.
    pub camera_num: bool,
    /// Input ports accept `rect` / `fullscreen`.
    pub display_region: bool,
    /// Output ports accept `source_pattern`.
    pub source_pattern: bool,
}

/// The full catalog, one row per kind.
pub static CATALOG: [KindInfo; 8] = [
    KindInfo {
        kind: ComponentKind::Camera,
        runtime_name: "vc.ril.camera",
        inputs: 0,
        outputs: 3,
        role: Role::Producer,
        transfer: Transfer::PassThrough,
        camera_num: true,
        display_region: false,
        source_pattern: false,
    },
    KindInfo {
        kind: ComponentKind::RawCam,
        runtime_name: "vc.ril.rawcam",
        inputs: 0,
        outputs: 1,
        role: Role::Producer,
        transfer: Transfer::PassThrough,
        camera_num: false,
        display_region: false,
        source_pattern: false,
    },
    KindInfo {
        kind: ComponentKind::Source,
        runtime_name: "vc.ril.source",
        inputs: 0,
        outputs: 1,
        role: Role::Producer,
        transfer: Transfer::PassThrough,
        camera_num: false,
        display_region: false,
        source_pattern: true,
    },
    KindInfo {
        kind: ComponentKind::Isp,
        runtime_name: "vc.ril.isp",
        inputs: 1,
        outputs: 1,
        role: Role::Filter,
        transfer: Transfer::Opaque,
        camera_num: false,
        display_region: false,
        source_pattern: false,
    },
    KindInfo {
        kind: ComponentKind::Resize,
        runtime_name: "vc.ril.resize",
        inputs: 1,
        outputs: 1,
        role: Role::Filter,
        transfer: Transfer::EncodingOnly,
        camera_num: false,
        display_region: false,
        source_pattern: false,
    },
    KindInfo {
        kind: ComponentKind::VideoSplitter,
        runtime_name: "vc.ril.video_splitter",
        inputs: 1,
        outputs: 4,
        role: Role::Filter,
        transfer: Transfer::PassThrough,
        camera_num: false,
        display_region: false,
        source_pattern: false,
    },
    KindInfo {
        kind: ComponentKind::VideoRender,
        runtime_name: "vc.ril.video_render",
        inputs: 1,
        outputs: 0,
        role: Role::Consumer,
        transfer: Transfer::PassThrough,
        camera_num: false,
        display_region: true,
        source_pattern: false,
    },
    KindInfo {
        kind: ComponentKind::NullSink,
        runtime_name: "vc.ril.null_sink",
        inputs: 1,
        outputs: 0,
        role: Role::Consumer,
        transfer: Transfer::PassThrough,
        camera_num: false,
        display_region: false,
        source_pattern: false,
    },
];

impl ComponentKind {
    /// Catalog row for this kind.
    pub fn info(self) -> &'static KindInfo {
        // Rows are in variant order.
        &CATALOG[self as usize]
    }

    /// Runtime component name (e.g. `vc.ril.isp`).
    pub fn runtime_name(self) -> &'static str {
        self.info().runtime_name
    }

    /// Number of input ports.
    pub fn input_capacity(self) -> usize {
        self.info().inputs
    }

    /// Number of output ports.
    pub fn output_capacity(self) -> usize {
        self.info().outputs
    }

    /// Data-flow role.
    pub fn role(self) -> Role {
        self.info().role
    }

    /// Transfer rule.
    pub fn transfer(self) -> Transfer {
        self.info().transfer
    }

    /// True for kinds that seed the forward pass.
    pub fn is_producer_root(self) -> bool {
        self.role() == Role::Producer
    }

    /// True for kinds that seed the backward pass.
    pub fn is_consumer_root(self) -> bool {
        self.role() == Role::Consumer
    }
}

impl FromStr for ComponentKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .find(|info| info.runtime_name == s)
            .map(|info| info.kind)
            .ok_or_else(|| UnknownName::new("component kind", s))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.runtime_name())
    }
}
