//! Integration tests for butterfly-path
//!
//! Exercise the graph store, the path engine and the route graph builder
//! through the public API only, plus the `path` subcommand of the binary.

use std::collections::BTreeMap;
use std::io::Write;
use std::process::Command;

use butterfly_path::{
    build_from_segments, haversine_distance, nearest_node, shortest_path, Adjacency, Coordinate, Error,
    ErrorKind, GraphStore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scenario_store() -> GraphStore {
    let mut graph = GraphStore::new();
    graph.add_node("A", 0.0, 0.0).unwrap();
    graph.add_node("B", 0.0, 0.001).unwrap();
    graph.add_node("C", 0.0, 0.002).unwrap();
    graph.add_or_update_edge("A", "B", Some(10.0)).unwrap();
    graph.add_or_update_edge("B", "C", Some(5.0)).unwrap();
    graph
}

fn assert_symmetric(adjacency: &Adjacency) {
    for (from, neighbors) in adjacency {
        for (to, weight) in neighbors {
            assert_eq!(
                adjacency.get(to).and_then(|n| n.get(from)),
                Some(weight),
                "edge {from} -> {to} has no mirror"
            );
        }
    }
}

#[test]
fn test_shortest_path_over_store() {
    let graph = scenario_store();
    let result = shortest_path(graph.adjacency(), "A", "C").unwrap();

    assert_eq!(result.path, vec!["A", "B", "C"]);
    assert_eq!(result.total_distance(), Some(15.0));
    assert_eq!(result.distance("A"), Some(0.0));
}

#[test]
fn test_default_weight_is_great_circle_distance() {
    let mut graph = scenario_store();
    let edge = graph.add_or_update_edge("A", "C", None).unwrap();

    assert_eq!(edge.weight, haversine_distance(0.0, 0.0, 0.0, 0.002));
    assert_eq!(graph.weight("C", "A"), Some(edge.weight));

    // 222m direct edge loses to the 15m detour
    let result = shortest_path(graph.adjacency(), "A", "C").unwrap();
    assert_eq!(result.path, vec!["A", "B", "C"]);
}

#[test]
fn test_store_mutations_keep_edges_mirrored() {
    let mut graph = scenario_store();
    graph.add_node("D", 0.001, 0.001).unwrap();
    graph.add_or_update_edge("D", "B", Some(3.0)).unwrap();
    graph.add_or_update_edge("B", "D", Some(4.0)).unwrap();
    assert_symmetric(graph.adjacency());
    assert_eq!(graph.weight("D", "B"), Some(4.0));

    graph.update_node("B", "hub", 0.0, 0.001).unwrap();
    assert_symmetric(graph.adjacency());
    assert!(!graph.contains("B"));
    assert_eq!(graph.weight("A", "hub"), Some(10.0));
    assert_eq!(graph.weight("hub", "D"), Some(4.0));

    graph.delete_node("hub").unwrap();
    assert_symmetric(graph.adjacency());
    assert!(graph.adjacency().values().all(|n| !n.contains_key("hub")));
    assert!(!graph.is_connected());
}

#[test]
fn test_delete_missing_edge_is_not_found() {
    let mut graph = scenario_store();
    let err = graph.delete_edge("A", "C").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Nothing else was touched
    assert_eq!(graph.weight("A", "B"), Some(10.0));
    assert_eq!(graph.weight("B", "C"), Some(5.0));
}

#[test]
fn test_error_kinds_across_the_api() {
    let mut graph = scenario_store();
    assert_eq!(graph.add_node("A", 1.0, 1.0).unwrap_err().kind(), ErrorKind::Conflict);
    assert_eq!(graph.add_node("", 1.0, 1.0).unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(graph.delete_node("Z").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        graph.add_or_update_edge("A", "B", Some(-1.0)).unwrap_err().kind(),
        ErrorKind::InvalidInput
    );

    let mut negative = Adjacency::new();
    negative.entry("x".into()).or_default().insert("y".into(), -2.0);
    assert!(matches!(shortest_path(&negative, "x", "y"), Err(Error::InvalidInput(_))));
}

#[test]
fn test_disconnected_components_have_no_path() {
    let mut graph = scenario_store();
    graph.add_node("island", 10.0, 10.0).unwrap();

    let result = shortest_path(graph.adjacency(), "A", "island").unwrap();
    assert!(result.path.is_empty());
    assert_eq!(result.total_distance(), None);
    assert!(result.distances["island"].is_infinite());
}

#[test]
fn test_route_graph_from_segments() {
    let nodes: BTreeMap<String, Coordinate> = [
        ("1", 0.0, 0.0),
        ("2", 0.0, 0.001),
        ("3", 0.0, 0.002),
        ("4", 0.001, 0.002),
    ]
    .iter()
    .map(|(id, lat, lng)| (id.to_string(), Coordinate::new(*lat, *lng)))
    .collect();
    let segments = vec![
        vec!["1".to_string(), "2".to_string(), "3".to_string()],
        vec!["3".to_string(), "4".to_string()],
    ];

    let adjacency = build_from_segments(&nodes, &segments);
    assert_symmetric(&adjacency);

    let start = nearest_node(Coordinate::new(0.00001, 0.0), &nodes).unwrap();
    let end = nearest_node(Coordinate::new(0.0011, 0.0021), &nodes).unwrap();
    let result = shortest_path(&adjacency, &start, &end).unwrap();
    assert_eq!(result.path, vec!["1", "2", "3", "4"]);
}

/// All-pairs shortest distances by Floyd-Warshall
fn floyd_warshall(ids: &[String], adjacency: &Adjacency) -> BTreeMap<(String, String), f64> {
    let mut dist = BTreeMap::new();
    for a in ids {
        for b in ids {
            let d = if a == b {
                0.0
            } else {
                adjacency[a].get(b).copied().unwrap_or(f64::INFINITY)
            };
            dist.insert((a.clone(), b.clone()), d);
        }
    }
    for k in ids {
        for i in ids {
            for j in ids {
                let via = dist[&(i.clone(), k.clone())] + dist[&(k.clone(), j.clone())];
                if via < dist[&(i.clone(), j.clone())] {
                    dist.insert((i.clone(), j.clone()), via);
                }
            }
        }
    }
    dist
}

#[test]
fn test_shortest_path_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x6275_7474);

    for _ in 0..200 {
        let n = rng.gen_range(1..=8);
        let mut graph = GraphStore::new();
        let ids: Vec<String> = (0..n).map(|i| format!("n{i}")).collect();
        for id in &ids {
            graph.add_node(id, rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)).unwrap();
        }
        for a in 0..n {
            for b in (a + 1)..n {
                if rng.gen_bool(0.35) {
                    // Integer weights keep sums exact regardless of order
                    let weight = rng.gen_range(0..20) as f64;
                    graph.add_or_update_edge(&ids[a], &ids[b], Some(weight)).unwrap();
                }
            }
        }

        let expected = floyd_warshall(&ids, graph.adjacency());
        let start = &ids[rng.gen_range(0..n)];
        let end = &ids[rng.gen_range(0..n)];
        let result = shortest_path(graph.adjacency(), start, end).unwrap();
        let optimal = expected[&(start.clone(), end.clone())];

        if optimal.is_infinite() {
            assert!(result.path.is_empty());
            assert_eq!(result.total_distance(), None);
            continue;
        }

        assert_eq!(result.total_distance(), Some(optimal));
        assert_eq!(result.path.first(), Some(start));
        assert_eq!(result.path.last(), Some(end));

        let walked: f64 = result
            .path
            .windows(2)
            .map(|pair| graph.weight(&pair[0], &pair[1]).unwrap())
            .sum();
        assert_eq!(walked, optimal);
    }
}

#[test]
fn test_path_subcommand() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"A": {{"B": 10, "C": 40}}, "B": {{"A": 10, "C": 5}}, "C": {{"A": 40, "B": 5}}}}"#
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_butterfly-path"))
        .arg("path")
        .arg(file.path())
        .args(["--start", "A", "--end", "C"])
        .output()
        .expect("Failed to run butterfly-path");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("A -> B -> C"), "unexpected output: {stdout}");
    assert!(stdout.contains("distance: 15"));
}

#[test]
fn test_path_subcommand_reports_errors() {
    let output = Command::new(env!("CARGO_BIN_EXE_butterfly-path"))
        .args(["path", "/nonexistent/graph.json", "--start", "A", "--end", "B"])
        .output()
        .expect("Failed to run butterfly-path");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("❌ Error"), "unexpected stderr: {stderr}");
}
