use std::fs;
use std::path::PathBuf;

use scout_terminal::api::{parse_player_json, parse_player_options_json, parse_similarity_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_player_search_fixture() {
    let raw = read_fixture("player_search.json");
    let options = parse_player_options_json(&raw).expect("fixture should parse");
    assert_eq!(options.len(), 3);
    assert_eq!(options[0].id, 42);
    assert_eq!(options[0].label, "Alice Moreau");
    // String ids and padded names are normalised.
    assert_eq!(options[1].id, 7);
    assert_eq!(options[1].label, "Alicia Tavares");
    assert_eq!(options[2].label, "");
}

#[test]
fn parses_wrapped_search_response() {
    let raw = read_fixture("player_search_wrapped.json");
    let options = parse_player_options_json(&raw).expect("fixture should parse");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, 42);
}

#[test]
fn empty_search_bodies_are_no_candidates() {
    assert!(parse_player_options_json("").expect("empty").is_empty());
    assert!(parse_player_options_json("null").expect("null").is_empty());
    assert!(parse_player_options_json("[]").expect("array").is_empty());
}

#[test]
fn parses_player_detail_fixture() {
    let raw = read_fixture("player_detail.json");
    let player = parse_player_json(&raw).expect("fixture should parse");
    assert_eq!(player.id, 42);
    assert_eq!(player.name, "Alice Moreau");
    assert_eq!(player.positions, vec!["ST".to_string(), "LW".to_string()]);
    assert_eq!(player.birth.as_deref(), Some("1998-04-12"));
    assert_eq!(player.height, Some(171.0));
    assert_eq!(player.weight, Some(63.0));
    assert_eq!(player.attributes.len(), 5);
    assert_eq!(player.attributes.get("shooting"), Some(&84.0));
    assert!(!player.attributes.contains_key("defending"));
}

#[test]
fn player_detail_null_is_an_error() {
    assert!(parse_player_json("null").is_err());
    assert!(parse_player_json("   ").is_err());
}

#[test]
fn player_detail_without_optional_fields_still_parses() {
    let player = parse_player_json(r#"{"id":"9","name":"X","positions":null}"#).expect("should parse");
    assert_eq!(player.id, 9);
    assert!(player.positions.is_empty());
    assert!(player.attributes.is_empty());
    assert_eq!(player.height, None);
}

#[test]
fn parses_similarity_fixture_in_backend_order() {
    let raw = read_fixture("similarity_kmeans.json");
    let result = parse_similarity_json(&raw).expect("fixture should parse");
    assert_eq!(result.id, Some(42));
    assert_eq!(result.name, "Alice Moreau");
    let ids = result.similar_players.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![11, 44, 35]);
    assert_eq!(result.similar_players[1].similarity, Some(0.887));
    assert_eq!(result.similar_players[2].height, None);
    assert_eq!(
        result.graph_url.as_deref(),
        Some("http://localhost:8000/static/graph_42_kmeans.png")
    );
    assert_eq!(result.execution_proc.len(), 1);
    assert_eq!(result.execution_proc[0].execution_name, "KMeans");
    assert_eq!(result.execution_proc[0].execution_time, Some(912.0));
}

#[test]
fn similarity_with_null_graph_and_two_timings() {
    let raw = read_fixture("similarity_louvain.json");
    let result = parse_similarity_json(&raw).expect("fixture should parse");
    assert!(result.graph_url.is_none());
    let names = result
        .execution_proc
        .iter()
        .map(|p| p.execution_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["KMeans", "Louvain"]);
    assert_eq!(result.execution_proc[1].execution_time, Some(2410.5));
}

#[test]
fn similarity_missing_lists_default_to_empty() {
    let result = parse_similarity_json(r#"{"name":"Solo","similarPlayer":null}"#).expect("should parse");
    assert!(result.similar_players.is_empty());
    assert!(result.execution_proc.is_empty());
    assert_eq!(result.id, None);
    assert!(parse_similarity_json("null").is_err());
    assert!(parse_similarity_json("{not json").is_err());
}
