use std::fs;
use std::path::PathBuf;

use scout_terminal::export::export_similarity;
use scout_terminal::memo::{SimilarityMemo, TableObject};
use scout_terminal::persist::{load_store_from, save_store_to};
use scout_terminal::state::{Algorithm, ExecutionProc, SimilarPlayer, SimilarityResult};
use scout_terminal::store::{SharedStore, StoreAction};

fn scratch_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("scout_terminal_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn kmeans_result() -> SimilarityResult {
    SimilarityResult {
        id: Some(42),
        name: "Alice Moreau".to_string(),
        similar_players: vec![
            SimilarPlayer {
                id: 11,
                name: "Carla Jensen".to_string(),
                height: Some(168.0),
                weight: Some(60.0),
                similarity: Some(0.912),
            },
            SimilarPlayer {
                id: 44,
                name: "Kaito Mori".to_string(),
                height: None,
                weight: Some(65.0),
                similarity: Some(0.887),
            },
        ],
        graph_url: Some("http://localhost:8000/static/g.png".to_string()),
        execution_proc: vec![ExecutionProc {
            execution_name: "KMeans".to_string(),
            execution_time: Some(912.0),
        }],
    }
}

fn recorded_table() -> TableObject {
    let mut memo = SimilarityMemo::new();
    memo.record(42, Algorithm::KMeans, &kmeans_result());
    memo.table().clone()
}

#[test]
fn store_roundtrips_through_disk() {
    let dir = scratch_dir("store");
    let path = dir.join("store.json");

    let mut store = SharedStore::default();
    store.dispatch(StoreAction::SetPlayerId(42));
    store.dispatch(StoreAction::SetDataObject(recorded_table()));
    save_store_to(&path, &store).expect("save store");

    let loaded = load_store_from(&path).expect("store should load");
    assert_eq!(loaded.player_id(), Some(42));
    assert_eq!(loaded.data_object(), store.data_object());
    assert_eq!(loaded.revision(), 0, "revision is not persisted");

    let raw = fs::read_to_string(&path).expect("read store");
    assert!(raw.contains("\"playerId\":42"));
    assert!(raw.contains("\"KMeans\""));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_or_foreign_store_files_load_as_none() {
    let dir = scratch_dir("store_bad");
    assert!(load_store_from(&dir.join("absent.json")).is_none());

    let wrong_version = dir.join("old.json");
    fs::write(&wrong_version, r#"{"version":99,"store":{}}"#).expect("write");
    assert!(load_store_from(&wrong_version).is_none());

    let garbage = dir.join("garbage.json");
    fs::write(&garbage, "not json").expect("write");
    assert!(load_store_from(&garbage).is_none());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn export_writes_a_sheet_per_recorded_algorithm() {
    let dir = scratch_dir("export");
    let path = dir.join("similar.xlsx");

    let report = export_similarity(&path, &recorded_table()).expect("export");
    assert_eq!(report.sheets, 2, "KMeans plus Timings");
    assert_eq!(report.rows, 3);
    let meta = fs::metadata(&path).expect("workbook exists");
    assert!(meta.len() > 0);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn export_refuses_an_empty_table() {
    let dir = scratch_dir("export_empty");
    let path = dir.join("empty.xlsx");
    assert!(export_similarity(&path, &TableObject::default()).is_err());
    assert!(!path.exists());
    let _ = fs::remove_dir_all(dir);
}
