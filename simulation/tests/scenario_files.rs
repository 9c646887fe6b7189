//! Runs the scenario files shipped with the simulator

use std::path::PathBuf;

use cgr_routing::CgrConfig;
use cgr_simulation::Scenario;

fn load(name: &str) -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name);
    Scenario::load(&path).unwrap()
}

#[test]
fn test_every_scenario_validates() {
    for name in ["single_hop.json", "excluded_neighbor.json", "relay_branching.json"] {
        load(name).validate().unwrap();
    }
}

#[test]
fn test_single_hop() {
    let outcome = load("single_hop.json").run(None).unwrap();
    assert_eq!(outcome.state, "done");
    assert_eq!(outcome.report.len(), 1);
    assert_eq!(outcome.report.routes[0].pbat, 1);
}

#[test]
fn test_excluded_neighbor_counts_as_suppressed() {
    let outcome = load("excluded_neighbor.json").run(None).unwrap();
    assert_eq!(outcome.state, "done");
    assert_eq!(outcome.neighbors_found, 2);
    assert_eq!(outcome.suppressed, 1);
}

#[test]
fn test_relay_runs_under_every_preset() {
    let scenario = load("relay_branching.json");
    for config in [CgrConfig::suggested(), CgrConfig::enhanced(), CgrConfig::ccsds_sabr()] {
        let outcome = scenario.run(Some(config)).unwrap();
        assert!(outcome.requests >= 1);
        let text = outcome.report.to_string();
        assert!(text.contains("CANDIDATE ROUTES"));
    }
}
