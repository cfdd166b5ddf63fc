//! Integration tests for the waypath CLI.
//!
//! These run the compiled binary against `docs/fixtures/campus_graph.json`,
//! a 4x4 campus grid with one diagonal footpath (6-11), an isolated pair of
//! nodes (100, 101) and one edge pointing at a missing node.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures/campus_graph.json")
        .canonicalize()
        .expect("campus fixture present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("waypath-cli");
    cmd.env("RUST_LOG", "error").env_remove("WAYPATH_GRAPH_PATH");
    cmd
}

fn with_graph() -> Command {
    let mut cmd = cli();
    cmd.arg("--graph").arg(fixture_path());
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn route_prints_summary_and_steps() {
    with_graph()
        .args(["route", "--from", "1", "--to", "16"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Route (shortest): 5 hops, 547.8 m, cost 547.8 meters, 0 turns",
        ))
        .stdout(predicate::str::contains("  0: 1 (12.971600, 77.594600)"))
        .stdout(predicate::str::contains("  5: 16 (12.974300, 77.597300)"));
}

#[test]
fn compact_route_joins_ids() {
    with_graph()
        .args(["route", "--from", "1", "--to", "16", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 -> 5 -> 6 -> 11 -> 12 -> 16"));
}

#[test]
fn least_turn_json_reports_turns() {
    let value = json_stdout(with_graph().args([
        "--format",
        "json",
        "route",
        "--from",
        "2",
        "--to",
        "15",
        "--mode",
        "least-turn",
    ]));

    assert_eq!(value["mode"], "least_turn");
    assert_eq!(value["path_node_ids"], serde_json::json!([2, 6, 11, 15]));
    assert_eq!(value["turn_count"], 2);
    assert_eq!(value["cost_units"], "meters_with_turn_penalty");
    let cost = value["total_cost"].as_f64().unwrap();
    let distance = value["total_distance_m"].as_f64().unwrap();
    assert!((cost - distance - 100.0).abs() < 1e-6);
}

#[test]
fn energy_mode_scales_cost() {
    let value = json_stdout(with_graph().args([
        "route",
        "--from",
        "1",
        "--to",
        "11",
        "--mode",
        "energy_efficient",
        "--format",
        "json",
    ]));
    let cost = value["total_cost"].as_f64().unwrap();
    assert!((cost - 414.12).abs() < 1e-6);
    assert_eq!(value["cost_units"], "energy_units");
}

#[test]
fn coordinate_endpoints_snap_to_nodes() {
    with_graph()
        .args([
            "route",
            "--from",
            "12.97162,77.59461",
            "--to",
            "12.97339,77.59639",
            "--compact",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 -> 5 -> 6 -> 11"));
}

#[test]
fn disconnected_nodes_report_no_route() {
    with_graph()
        .args(["route", "--from", "1", "--to", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No route found between 1 and 100."));
}

#[test]
fn unknown_node_is_reported() {
    with_graph()
        .args(["route", "--from", "1", "--to", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Node 999 is not in the graph."));
}

#[test]
fn expansion_limit_suggests_raising_it() {
    with_graph()
        .args(["route", "--from", "1", "--to", "16", "--max-expansions", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-expansions"));
}

#[test]
fn unknown_mode_is_rejected_by_parser() {
    with_graph()
        .args(["route", "--from", "1", "--to", "2", "--mode", "fastest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown routing mode"));
}

#[test]
fn nearest_snaps_within_limit() {
    with_graph()
        .args(["nearest", "--lat", "12.97339", "--lon", "77.59639"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Nearest node: 11 "));
}

#[test]
fn nearest_json_includes_distance() {
    let value = json_stdout(with_graph().args([
        "--format", "json", "nearest", "--lat", "12.9716", "--lon", "77.5946",
    ]));
    assert_eq!(value["node_id"], 1);
    assert_eq!(value["distance_m"].as_f64(), Some(0.0));
}

#[test]
fn nearest_rejects_far_points() {
    with_graph()
        .args([
            "nearest",
            "--lat",
            "12.9716",
            "--lon",
            "77.6046",
            "--max-snap-distance",
            "150",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-snap-distance"));
}

#[test]
fn snap_distance_must_be_positive() {
    for bad in ["NaN", "0"] {
        with_graph()
            .args([
                "nearest",
                "--lat",
                "12.9716",
                "--lon",
                "77.6046",
                "--max-snap-distance",
                bad,
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("positive number of metres"));
    }

    with_graph()
        .args([
            "route",
            "--from",
            "12.9716,77.6046",
            "--to",
            "16",
            "--max-snap-distance",
            "nan",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number of metres"));
}

#[test]
fn inspect_summarises_fixture() {
    with_graph()
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 18"))
        .stdout(predicate::str::contains("Edges: 26"))
        .stdout(predicate::str::contains("Skipped edges: 1"));
}

#[test]
fn graph_can_come_from_environment() {
    cli()
        .env("WAYPATH_GRAPH_PATH", fixture_path())
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 18"));
}

#[test]
fn missing_graph_is_an_error() {
    cli()
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no graph given"));
}

#[test]
fn malformed_graph_file_fails_to_load() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(br#"{"nodes":[{"id":1,"lat":200.0,"lon":0.0}],"edges":[]}"#)
        .expect("write");

    cli()
        .arg("--graph")
        .arg(file.path())
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load graph"))
        .stderr(predicate::str::contains("malformed graph"));
}
