//! Integration tests for build plans and their execution.

use rilgraph::Error;
use rilgraph::component::PortDirection;
use rilgraph::config;
use rilgraph::emit::{
    BuildPlan, CSourceOptions, ConnectionMode, Operation, Phase, RecordingRuntime, Runtime,
    RuntimeStatus, render_c, run_finalize, run_init,
};
use rilgraph::negotiation::ResolvedGraph;
use serde_json::{Value, json};

fn plan(doc: Value) -> BuildPlan {
    let resolved = ResolvedGraph::resolve(config::from_value(doc).unwrap()).unwrap();
    BuildPlan::from_resolved(&resolved)
}

fn chain() -> Value {
    json!({
        "camera": {
            "component": "vc.ril.camera",
            "output0": { "connect_to": ["isp", 0] }
        },
        "isp": {
            "component": "vc.ril.isp",
            "input0": { "width": 1920, "height": 1080, "encoding": "opaque" },
            "output0": { "width": 640, "height": 480, "encoding": "rgb24", "connect_to": ["render", 0] }
        },
        "render": { "component": "vc.ril.video_render", "input0": { "fullscreen": 1 } }
    })
}

fn position(plan: &BuildPlan, predicate: impl Fn(&Operation) -> bool) -> usize {
    plan.init.iter().position(predicate).unwrap()
}

/// The renderer's format is set before the renderer is enabled.
#[test]
fn test_format_set_before_enable() {
    let plan = plan(json!({
        "source": {
            "component": "vc.ril.source",
            "output0": {
                "width": 1920, "height": 1080, "encoding": "rgb24",
                "connect_to": ["renderer", 0]
            }
        },
        "renderer": { "component": "vc.ril.video_render", "input0": {} }
    }));

    let set_format = position(&plan, |op| {
        matches!(op, Operation::SetFormat { port, .. }
            if port.component == "renderer" && port.direction == PortDirection::Input)
    });
    let enable = position(&plan, |op| {
        matches!(op, Operation::EnableComponent { component } if component == "renderer")
    });
    assert!(set_format < enable);
}

#[test]
fn test_init_stages_are_ordered() {
    let plan = plan(chain());

    // Every component is created before any port is configured, and every
    // component is enabled before any connection is made.
    let last_create = plan
        .init
        .iter()
        .rposition(|op| matches!(op, Operation::CreateComponent { .. }))
        .unwrap();
    let first_format = position(&plan, |op| matches!(op, Operation::SetFormat { .. }));
    let last_enable = plan
        .init
        .iter()
        .rposition(|op| matches!(op, Operation::EnableComponent { .. }))
        .unwrap();
    let first_connection = position(&plan, |op| matches!(op, Operation::CreateConnection { .. }));
    assert!(last_create < first_format);
    assert!(last_enable < first_connection);

    // Each component is enabled exactly once.
    let enables = plan
        .init
        .iter()
        .filter(|op| matches!(op, Operation::EnableComponent { .. }))
        .count();
    assert_eq!(enables, 3);

    // Connections are tunnelled and enabled right after creation.
    let creates: Vec<_> = plan
        .init
        .iter()
        .enumerate()
        .filter_map(|(i, op)| match op {
            Operation::CreateConnection { connection, mode } => Some((i, connection, *mode)),
            _ => None,
        })
        .collect();
    assert_eq!(creates.len(), 2);
    for (i, connection, mode) in creates {
        assert_eq!(mode, ConnectionMode::Tunnelling);
        assert_eq!(
            plan.init[i + 1],
            Operation::EnableConnection {
                connection: connection.clone()
            }
        );
    }
}

#[test]
fn test_finalize_mirrors_init() {
    let plan = plan(chain());
    let lines: Vec<_> = plan.finalize.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "disable isp.output0 -> render.input0",
            "destroy isp.output0 -> render.input0",
            "clear conn_isp_0_render_0",
            "disable camera.output0 -> isp.input0",
            "destroy camera.output0 -> isp.input0",
            "clear conn_camera_0_isp_0",
            "disable render",
            "destroy render",
            "clear cp_render",
            "disable isp",
            "destroy isp",
            "clear cp_isp",
            "disable camera",
            "destroy camera",
            "clear cp_camera",
        ]
    );
}

#[test]
fn test_execution_stops_at_first_failure() {
    let plan = plan(chain());
    let fail_at = plan
        .init
        .iter()
        .position(|op| matches!(op, Operation::SetFullscreen { .. }))
        .unwrap();

    let mut runtime = RecordingRuntime::failing_at(fail_at, RuntimeStatus(0x10));
    let err = run_init(&plan, &mut runtime).unwrap_err();
    assert_eq!(err.phase, Phase::Init);
    assert_eq!(err.step, fail_at);
    assert_eq!(runtime.executed(), &plan.init[..fail_at]);

    let err = Error::from(err);
    assert!(err.to_string().contains("set render.input0 fullscreen true"));
}

/// A runtime that only counts calls.
struct Counter(usize);

impl Runtime for Counter {
    fn execute(&mut self, _operation: &Operation) -> Result<(), RuntimeStatus> {
        self.0 += 1;
        Ok(())
    }
}

#[test]
fn test_custom_runtime() {
    let plan = plan(chain());
    let mut counter = Counter(0);
    run_init(&plan, &mut counter).unwrap();
    run_finalize(&plan, &mut counter).unwrap();
    assert_eq!(counter.0, plan.init.len() + plan.finalize.len());

    let mut runtime = RecordingRuntime::failing_at(0, RuntimeStatus(1));
    let err = run_finalize(&plan, &mut runtime).unwrap_err();
    assert_eq!(err.phase, Phase::Finalize);
    assert_eq!(err.step, 0);
}

#[test]
fn test_c_source_for_chain() {
    let plan = plan(chain());
    let source = render_c(&plan, &CSourceOptions::default().with_prefix("chain"));

    for line in [
        "static MMAL_COMPONENT_T *cp_camera = NULL;",
        "static MMAL_CONNECTION_T *conn_camera_0_isp_0 = NULL;",
        "int chain_init(void)",
        "\tcheck_mmal(set_port_format(cp_camera->output[0], MMAL_ENCODING_OPAQUE, 1920, 1080));",
        "\tcheck_mmal(set_port_format(cp_render->input[0], MMAL_ENCODING_RGB24, 640, 480));",
        "\tcheck_mmal(set_port_displayregion_fullscreen(cp_render->input[0], 1));",
        "\tcheck_mmal(mmal_connection_create(&conn_isp_0_render_0, cp_isp->output[0], cp_render->input[0], MMAL_CONNECTION_FLAG_TUNNELLING));",
        "int chain_finl(void)",
        "\tcp_camera = NULL;",
    ] {
        assert!(
            source.lines().any(|l| l == line),
            "missing line {line:?} in\n{source}"
        );
    }
}

/// Unconnected splitter outputs still receive the resolved format.
#[test]
fn test_spare_splitter_outputs_are_configured() {
    let plan = plan(json!({
        "source": {
            "component": "vc.ril.source",
            "output0": { "width": 640, "height": 480, "encoding": "i420", "connect_to": ["split", 0] }
        },
        "split": {
            "component": "vc.ril.video_splitter",
            "output0": { "connect_to": ["sink", 0] }
        },
        "sink": { "component": "vc.ril.null_sink" }
    }));

    let configured: Vec<_> = plan
        .init
        .iter()
        .filter_map(|op| match op {
            Operation::SetFormat { port, format }
                if port.component == "split" && port.direction == PortDirection::Output =>
            {
                Some((port.index, format.to_string()))
            }
            _ => None,
        })
        .collect();
    let expected: Vec<_> = (0..4)
        .map(|i| (i, "640x480 MMAL_ENCODING_I420".to_string()))
        .collect();
    assert_eq!(configured, expected);
}
