//! JSON graph configuration.
//!
//! A configuration document maps component names to descriptions. Key order in
//! the document is the declaration order of the graph:
//!
//! ```json
//! {
//!     "camera": {
//!         "component": "vc.ril.camera",
//!         "control": { "camera_num": 0 },
//!         "output0": { "connect_to": ["render", 0] }
//!     },
//!     "render": {
//!         "component": "vc.ril.video_render",
//!         "input0": { "width": 640, "height": 480, "fullscreen": true }
//!     }
//! }
//! ```
//!
//! The schema is strict: unknown keys at any level, port indices beyond the
//! kind's capacity, zero sizes and unknown names are all errors.

use crate::component::{Component, ComponentKind, PortDirection, PortHooks, PortSettings};
use crate::error::{Error, Result};
use crate::format::{DisplayRegion, Encoding, Rect, SourcePattern};
use crate::graph::Graph;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlConfig {
    camera_num: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputConfig {
    width: Option<u32>,
    height: Option<u32>,
    encoding: Option<String>,
    rect: Option<RectConfig>,
    fullscreen: Option<Fullscreen>,
    hooks: Option<HooksConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputConfig {
    width: Option<u32>,
    height: Option<u32>,
    encoding: Option<String>,
    connect_to: Option<(String, usize)>,
    source_pattern: Option<String>,
    hooks: Option<HooksConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RectConfig {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HooksConfig {
    post_setup: Option<String>,
    buffer: Option<String>,
}

/// `fullscreen` is accepted as a boolean or an integer flag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Fullscreen {
    Flag(bool),
    Int(i64),
}

impl Fullscreen {
    fn enabled(&self) -> bool {
        match *self {
            Fullscreen::Flag(flag) => flag,
            Fullscreen::Int(value) => value != 0,
        }
    }
}

impl From<HooksConfig> for PortHooks {
    fn from(hooks: HooksConfig) -> Self {
        PortHooks {
            post_setup: hooks.post_setup,
            buffer: hooks.buffer,
        }
    }
}

/// Load a graph from a JSON string.
pub fn from_str(json: &str) -> Result<Graph> {
    from_value(serde_json::from_str(json)?)
}

/// Load a graph from a reader.
pub fn from_reader<R: Read>(reader: R) -> Result<Graph> {
    from_value(serde_json::from_reader(reader)?)
}

/// Load a graph from a file.
pub fn from_path(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading configuration");
    let text = std::fs::read_to_string(path)?;
    from_str(&text)
}

/// Load a graph from an already parsed JSON document.
pub fn from_value(value: Value) -> Result<Graph> {
    let Value::Object(document) = value else {
        return Err(Error::schema("<root>", "expected an object of components"));
    };

    let components = document
        .into_iter()
        .map(|(name, description)| component(name, description))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(components = components.len(), "configuration parsed");
    Graph::new(components)
}

fn component(name: String, description: Value) -> Result<Component> {
    let Value::Object(mut description) = description else {
        return Err(Error::schema(name, "expected an object"));
    };

    let kind = match description.remove("component") {
        Some(Value::String(kind)) => kind
            .parse::<ComponentKind>()
            .map_err(|e| Error::schema(format!("{name}.component"), e.to_string()))?,
        Some(_) => {
            return Err(Error::schema(
                format!("{name}.component"),
                "expected a string",
            ));
        }
        None => return Err(Error::schema(name, "missing key 'component'")),
    };

    let mut component = Component::new(name, kind);
    for (key, value) in description {
        configure_key(&mut component, &key, value)?;
    }
    Ok(component)
}

fn configure_key(component: &mut Component, key: &str, value: Value) -> Result<()> {
    let location = format!("{}.{}", component.name(), key);

    if key == "control" {
        let control: ControlConfig = section(&location, value)?;
        if let Some(camera_num) = control.camera_num {
            component.set_camera_num(camera_num)?;
        }
        return Ok(());
    }

    match port_key(key) {
        Some((PortDirection::Input, index)) => {
            let settings = input_settings(&location, section(&location, value)?)?;
            component.configure_input(index, settings)
        }
        Some((PortDirection::Output, index)) => {
            let settings = output_settings(&location, section(&location, value)?)?;
            component.configure_output(index, settings)
        }
        None => Err(Error::schema(location, "unknown key")),
    }
}

/// Split `input3` / `output0` into direction and index.
fn port_key(key: &str) -> Option<(PortDirection, usize)> {
    let (direction, digits) = if let Some(digits) = key.strip_prefix("input") {
        (PortDirection::Input, digits)
    } else {
        (PortDirection::Output, key.strip_prefix("output")?)
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((direction, digits.parse().ok()?))
}

fn section<T: DeserializeOwned>(location: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::schema(location, e.to_string()))
}

fn encoding(location: &str, name: Option<String>) -> Result<Option<Encoding>> {
    name.map(|name| {
        name.parse::<Encoding>()
            .map_err(|e| Error::schema(format!("{location}.encoding"), e.to_string()))
    })
    .transpose()
}

fn input_settings(location: &str, config: InputConfig) -> Result<PortSettings> {
    let display_region = match (config.rect, config.fullscreen) {
        (Some(_), Some(_)) => {
            return Err(Error::MutualExclusion {
                port: location.to_string(),
            });
        }
        (Some(rect), None) => Some(DisplayRegion::Rect(Rect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        })),
        (None, Some(fullscreen)) => Some(DisplayRegion::Fullscreen(fullscreen.enabled())),
        (None, None) => None,
    };

    let mut settings = PortSettings::new();
    settings.format.width = config.width;
    settings.format.height = config.height;
    settings.format.encoding = encoding(location, config.encoding)?;
    settings.display_region = display_region;
    settings.hooks = config.hooks.map(Into::into).unwrap_or_default();
    Ok(settings)
}

fn output_settings(location: &str, config: OutputConfig) -> Result<PortSettings> {
    let source_pattern = config
        .source_pattern
        .map(|name| {
            name.parse::<SourcePattern>().map_err(|e| {
                Error::schema(format!("{location}.source_pattern"), e.to_string())
            })
        })
        .transpose()?;

    let mut settings = PortSettings::new();
    settings.format.width = config.width;
    settings.format.height = config.height;
    settings.format.encoding = encoding(location, config.encoding)?;
    settings.source_pattern = source_pattern;
    settings.hooks = config.hooks.map(Into::into).unwrap_or_default();
    if let Some((component, index)) = config.connect_to {
        settings = settings.connect_to(component, index);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TopologyError;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_declaration_order_follows_document() {
        let graph = from_value(json!({
            "zeta": { "component": "vc.ril.null_sink" },
            "alpha": { "component": "vc.ril.null_sink" },
            "mid": { "component": "vc.ril.isp" }
        }))
        .unwrap();
        let names: Vec<_> = graph.components().map(|(_, c)| c.name().to_string()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_full_port_description() {
        let graph = from_value(json!({
            "source": {
                "component": "vc.ril.source",
                "output0": {
                    "width": 640, "height": 480, "encoding": "RGBA",
                    "source_pattern": "blocks",
                    "connect_to": ["render", 0],
                    "hooks": { "post_setup": "on_setup" }
                }
            },
            "render": {
                "component": "vc.ril.video_render",
                "input0": { "rect": { "x": 10, "y": -5, "width": 320, "height": 240 } }
            }
        }))
        .unwrap();

        let source = graph.component(graph.component_id("source").unwrap());
        let out = &source.outputs()[0];
        assert_eq!(out.declared_format().encoding, Some(Encoding::Rgba));
        assert_eq!(out.source_pattern(), Some(SourcePattern::Blocks));
        assert_eq!(out.hooks().post_setup.as_deref(), Some("on_setup"));
        assert_eq!(out.connect_to().unwrap().to_string(), "render.input0");

        let render = graph.component(graph.component_id("render").unwrap());
        assert_eq!(
            render.inputs()[0].display_region(),
            Some(DisplayRegion::Rect(Rect {
                x: 10,
                y: -5,
                width: 320,
                height: 240
            }))
        );
    }

    #[test]
    fn test_fullscreen_accepts_bool_and_int() {
        for (value, expected) in [(json!(true), true), (json!(0), false), (json!(1), true)] {
            let graph = from_value(json!({
                "render": { "component": "vc.ril.video_render", "input0": { "fullscreen": value } }
            }))
            .unwrap();
            let render = graph.component(graph.component_id("render").unwrap());
            assert_eq!(
                render.inputs()[0].display_region(),
                Some(DisplayRegion::Fullscreen(expected))
            );
        }
    }

    #[test]
    fn test_rect_and_fullscreen_are_exclusive() {
        let err = from_value(json!({
            "render": {
                "component": "vc.ril.video_render",
                "input0": {
                    "rect": { "x": 0, "y": 0, "width": 10, "height": 10 },
                    "fullscreen": 1
                }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::MutualExclusion { ref port } if port == "render.input0"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let cases = [
            json!({ "isp": { "component": "vc.ril.isp", "bogus": {} } }),
            json!({ "isp": { "component": "vc.ril.isp", "input0": { "depth": 8 } } }),
            json!({ "isp": { "component": "vc.ril.isp", "control": { "gain": 2 } } }),
            json!({ "isp": { "component": "vc.ril.isp", "input": {} } }),
            json!({ "src": { "component": "vc.ril.source", "output0": { "rect": {} } } }),
            json!({ "r": { "component": "vc.ril.video_render",
                           "input0": { "rect": { "x": 0, "y": 0, "width": 1, "height": 1, "z": 0 } } } }),
            json!({ "r": { "component": "vc.ril.video_render",
                           "input0": { "hooks": { "eos": "f" } } } }),
        ];
        for case in cases {
            let err = from_value(case.clone()).unwrap_err();
            assert!(matches!(err, Error::Schema { .. }), "{case}: {err}");
        }
    }

    #[test]
    fn test_unknown_names_rejected() {
        let err = from_value(json!({ "x": { "component": "vc.ril.encoder" } })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema error at 'x.component': unknown component kind 'vc.ril.encoder'"
        );

        let err = from_value(json!({
            "x": { "component": "vc.ril.isp", "input0": { "encoding": "yuyv" } }
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema error at 'x.input0.encoding': unknown encoding 'yuyv'"
        );

        let err = from_value(json!({
            "x": { "component": "vc.ril.source", "output0": { "source_pattern": "plaid" } }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Schema { ref location, .. } if location == "x.output0.source_pattern"));
    }

    #[test]
    fn test_capacity_and_kind_checks() {
        let err = from_value(json!({ "r": { "component": "vc.ril.video_render", "input1": {} } }))
            .unwrap_err();
        assert!(matches!(err, Error::Schema { ref location, .. } if location == "r.input1"));

        let err = from_value(json!({ "isp": { "component": "vc.ril.isp", "control": { "camera_num": 1 } } }))
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));

        let graph = from_value(json!({ "cam": { "component": "vc.ril.camera", "control": { "camera_num": 1 } } }))
            .unwrap();
        assert_eq!(graph.component(graph.component_id("cam").unwrap()).control().camera_num, Some(1));

        let err = from_value(json!({ "isp": { "component": "vc.ril.isp", "output0": { "width": 0 } } }))
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_port_keys_with_same_index_rejected() {
        let err = from_value(json!({
            "isp": {
                "component": "vc.ril.isp",
                "input0": { "width": 640 },
                "input00": { "width": 320 }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Schema { ref location, .. } if location == "isp.input0"));
    }

    #[test]
    fn test_topology_errors_surface() {
        let err = from_value(json!({
            "src": { "component": "vc.ril.source", "output0": { "connect_to": ["missing", 0] } }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Topology(TopologyError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(from_str("{ not json"), Err(Error::Json(_))));
        assert!(matches!(from_str("[1, 2]"), Err(Error::Schema { .. })));
        assert!(matches!(
            from_value(json!({ "x": { "input0": {} } })),
            Err(Error::Schema { ref reason, .. }) if reason == "missing key 'component'"
        ));
        assert!(matches!(
            from_value(json!({ "x": { "component": 5 } })),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "sink": {{ "component": "vc.ril.null_sink", "input0": {{ "encoding": "i420" }} }} }}"#
        )
        .unwrap();

        let graph = from_path(file.path()).unwrap();
        assert_eq!(graph.component_count(), 1);

        let missing = file.path().with_extension("absent");
        assert!(matches!(from_path(missing), Err(Error::Io(_))));
    }
}
