//! End-to-end transpile requests through the default and custom graphs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use qbridge_transpiler::{
    Conversion, ConversionFn, ConversionGraph, ConversionScheme, IonQProgram, Program, ProgramType,
    ProgramTypeRegistry, Qasm2, Qasm3, TranspileError, Transpiler, qasm_program_from_text,
    transpile, translate,
};

#[derive(Debug, Clone, PartialEq)]
struct Label(&'static str);

#[derive(Debug, Clone, PartialEq)]
struct Mid(&'static str);

#[derive(Debug, Clone, PartialEq)]
struct Done(&'static str);

fn mock_types() -> Arc<ProgramTypeRegistry> {
    let mut types = ProgramTypeRegistry::new();
    types.register::<Label>("a").unwrap();
    types.register::<Mid>("b").unwrap();
    types.register::<Done>("c").unwrap();
    Arc::new(types)
}

fn broken(name: &str, message: &'static str) -> ConversionFn {
    ConversionFn::new(name, move |_| Err(message.into()))
}

#[test]
fn all_failed_paths_are_reported() {
    let graph = ConversionGraph::from_conversions([
        Conversion::new("a", "c", broken("a_to_c", "direct edge is broken")).unwrap(),
        Conversion::new(
            "a",
            "b",
            ConversionFn::new("a_to_b", |p: Program| {
                let Label(s) = p.downcast::<Label>().ok_or("not a")?;
                Ok(Program::new(Mid(s)))
            }),
        )
        .unwrap(),
        Conversion::new("b", "c", broken("b_to_c", "second hop is broken")).unwrap(),
    ]);
    let transpiler = Transpiler::new().with_types(mock_types()).with_graph(graph);

    let err = transpiler
        .transpile(&Program::new(Label("x")), "c")
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("2 path(s) attempted"));
    assert!(message.contains("a -> c: direct edge is broken"));
    assert!(message.contains("a -> b -> c: second hop is broken"));

    match err {
        TranspileError::AllPathsFailed { from, to, attempts } => {
            assert_eq!(from.as_str(), "a");
            assert_eq!(to.as_str(), "c");
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[0].path, "a -> c");
        }
        other => panic!("expected AllPathsFailed, got {other:?}"),
    }
}

#[test]
fn later_path_succeeds_after_failure() {
    let graph = ConversionGraph::from_conversions([
        Conversion::new("a", "c", broken("a_to_c", "nope")).unwrap(),
        Conversion::new(
            "a",
            "b",
            ConversionFn::new("a_to_b", |p: Program| {
                let Label(s) = p.downcast::<Label>().ok_or("not a")?;
                Ok(Program::new(Mid(s)))
            }),
        )
        .unwrap(),
        Conversion::new(
            "b",
            "c",
            ConversionFn::new("b_to_c", |p: Program| {
                let Mid(s) = p.downcast::<Mid>().ok_or("not b")?;
                Ok(Program::new(Done(s)))
            }),
        )
        .unwrap(),
    ]);
    let transpiler = Transpiler::new().with_types(mock_types()).with_graph(graph);

    let input = Program::new(Label("x"));
    let out = transpiler.transpile(&input, "c").unwrap();
    assert_eq!(out.downcast_ref::<Done>(), Some(&Done("x")));
    assert_eq!(input.downcast_ref::<Label>(), Some(&Label("x")));
}

#[test]
fn max_path_attempts_limits_tries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counting = |name: &str| {
        let calls = calls.clone();
        ConversionFn::new(name, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("fails".into())
        })
    };
    let graph = ConversionGraph::from_conversions([
        Conversion::new("a", "c", counting("a_to_c")).unwrap(),
        Conversion::new("a", "b", counting("a_to_b")).unwrap(),
        Conversion::new("b", "c", counting("b_to_c")).unwrap(),
    ]);
    let transpiler = Transpiler::new()
        .with_types(mock_types())
        .with_graph(graph)
        .with_scheme(ConversionScheme::new().with_max_path_attempts(1));

    let err = transpiler
        .transpile(&Program::new(Label("x")), "c")
        .unwrap_err();
    assert!(err.to_string().contains("1 path(s) attempted"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn qasm3_with_crx_reaches_ionq_through_decomposition() {
    let program = Program::new(Qasm3(
        "OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[2] q;\nh q[0];\ncrx(0.5) q[0], q[1];\n"
            .into(),
    ));
    let out = transpile(&program, "ionq").unwrap();
    let ionq = out.downcast::<IonQProgram>().unwrap();

    let gates: Vec<&str> = ionq.circuit.iter().map(|g| g.gate.as_str()).collect();
    assert_eq!(gates, ["h", "rz", "ry", "cnot", "ry", "cnot", "rz"]);
    assert_eq!(ionq.circuit[2].rotation, Some(0.25));
    assert_eq!(ionq.circuit[4].rotation, Some(-0.25));
}

#[test]
fn unsupported_gate_without_decomposition_fails_with_chain() {
    let program = Program::new(Qasm3(
        "OPENQASM 3.0;\nqubit[2] q;\nccx q[0], q[1], q[0];\n".into(),
    ));
    let err = transpile(&program, "ionq").unwrap_err();
    assert!(err.to_string().contains("qasm3 -> ionq: gate 'ccx' is not supported by IonQ"));
}

#[test]
fn qasm2_text_round_trips_through_qasm3() {
    let text = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0], q[1];\nmeasure q -> c;\n";
    let program = qasm_program_from_text(text).unwrap();
    let out = translate(&program, &["qasm3", "qasm2"]).unwrap();
    assert_eq!(out.downcast::<Qasm2>().unwrap().0, text);
}

#[test]
fn qasm2_conditional_round_trips_through_qasm3() {
    let text = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nmeasure q[0] -> c[0];\nif (c == 1) x q[0];\n";
    let program = qasm_program_from_text(text).unwrap();
    let out = translate(&program, &["qasm3", "qasm2"]).unwrap();
    assert_eq!(out.downcast::<Qasm2>().unwrap().0, text);
}

#[test]
fn scheme_graph_pruned_for_target() {
    let mut scheme = ConversionScheme::new().with_max_path_depth(Some(1));
    scheme
        .update_graph_for_target(&[ProgramType::from("qasm3")])
        .unwrap();
    let transpiler = Transpiler::new().with_scheme(scheme);

    let qasm2 = Program::new(Qasm2("OPENQASM 2.0;\nqreg q[1];\n".into()));
    assert!(transpiler.transpile(&qasm2, "qasm3").unwrap().is::<Qasm3>());

    let err = transpiler.transpile(&qasm2, "ionq").unwrap_err();
    assert!(err.is_lookup());
}

#[test]
fn depth_limit_is_a_no_path_error() {
    let transpiler =
        Transpiler::new().with_scheme(ConversionScheme::new().with_max_path_depth(Some(1)));
    let qasm2 = Program::new(Qasm2("OPENQASM 2.0;\nqreg q[1];\n".into()));
    let err = transpiler.transpile(&qasm2, "ionq").unwrap_err();
    assert!(err.is_no_path());
    assert!(matches!(err, TranspileError::NoPathWithinDepth { max_depth: 1, .. }));
}
