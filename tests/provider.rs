use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Result, anyhow};

use scout_terminal::demo_source::DemoSource;
use scout_terminal::provider::{PlayerSource, handle_command};
use scout_terminal::state::{
    Algorithm, AppState, Delta, Player, PlayerOption, ProviderCommand, Screen, SimilarityResult,
    apply_delta,
};

/// Counts calls and answers with canned data.
#[derive(Default)]
struct CountingSource {
    searches: Vec<String>,
    similar_calls: Vec<(u32, Algorithm)>,
    fail_similar: bool,
}

impl PlayerSource for CountingSource {
    fn search_players(&mut self, query: &str) -> Result<Vec<PlayerOption>> {
        self.searches.push(query.to_string());
        Ok(vec![PlayerOption {
            id: 42,
            label: "Alice Moreau".to_string(),
        }])
    }

    fn player_detail(&mut self, player_id: u32) -> Result<Player> {
        Err(anyhow!("player {player_id} not found"))
    }

    fn similar_players(&mut self, player_id: u32, algorithm: Algorithm) -> Result<SimilarityResult> {
        self.similar_calls.push((player_id, algorithm));
        if self.fail_similar {
            return Err(anyhow!("HTTP 503"));
        }
        Ok(SimilarityResult {
            id: Some(player_id),
            name: "Alice Moreau".to_string(),
            similar_players: Vec::new(),
            graph_url: None,
            execution_proc: Vec::new(),
        })
    }
}

#[test]
fn each_submit_reaches_the_source() {
    let mut source = CountingSource::default();
    let (tx, rx) = mpsc::channel();
    let mut state = AppState::new();
    state.select_similar_player(PlayerOption {
        id: 42,
        label: "Alice Moreau".to_string(),
    });

    for _ in 0..2 {
        let cmd = state.submit_similarity().expect("fetch");
        handle_command(&mut source, cmd, &tx);
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut state, delta);
        }
    }

    assert_eq!(
        source.similar_calls,
        vec![(42, Algorithm::KMeans), (42, Algorithm::KMeans)]
    );
    assert_eq!(state.similar.memo.called(), &[Algorithm::KMeans]);
}

#[test]
fn source_errors_become_failure_deltas() {
    let mut source = CountingSource {
        fail_similar: true,
        ..CountingSource::default()
    };
    let (tx, rx) = mpsc::channel();

    handle_command(
        &mut source,
        ProviderCommand::FetchSimilar {
            seq: 3,
            player_id: 42,
            algorithm: Algorithm::Hierarchical,
        },
        &tx,
    );
    match rx.recv_timeout(Duration::from_secs(1)) {
        Ok(Delta::SimilarityFailed {
            seq,
            algorithm,
            error,
        }) => {
            assert_eq!(seq, 3);
            assert_eq!(algorithm, Algorithm::Hierarchical);
            assert!(error.contains("503"));
        }
        other => panic!("expected SimilarityFailed, got {other:?}"),
    }

    handle_command(
        &mut source,
        ProviderCommand::FetchPlayerDetail {
            seq: 1,
            player_id: 9,
        },
        &tx,
    );
    assert!(matches!(
        rx.recv_timeout(Duration::from_secs(1)),
        Ok(Delta::PlayerDetailFailed { seq: 1, .. })
    ));
}

#[test]
fn search_results_carry_page_and_seq() {
    let mut source = CountingSource::default();
    let (tx, rx) = mpsc::channel();
    handle_command(
        &mut source,
        ProviderCommand::SearchPlayers {
            page: Screen::Communities,
            seq: 5,
            query: "ali".to_string(),
        },
        &tx,
    );
    assert_eq!(source.searches, vec!["ali".to_string()]);
    match rx.recv_timeout(Duration::from_secs(1)) {
        Ok(Delta::SearchResults { page, seq, options }) => {
            assert_eq!(page, Screen::Communities);
            assert_eq!(seq, 5);
            assert_eq!(options.len(), 1);
        }
        other => panic!("expected SearchResults, got {other:?}"),
    }
}

#[test]
fn demo_source_searches_case_insensitively() {
    let mut demo = DemoSource::new();
    let hits = demo.search_players("aLiCe").expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 42);
    assert!(demo.search_players("  ").expect("search").is_empty());
}

#[test]
fn demo_similarity_excludes_the_player_and_sorts_descending() {
    let mut demo = DemoSource::new();
    let res = demo.similar_players(42, Algorithm::KMeans).expect("similar");
    assert_eq!(res.id, Some(42));
    assert_eq!(res.similar_players.len(), 5);
    assert!(res.similar_players.iter().all(|p| p.id != 42));
    let scores = res
        .similar_players
        .iter()
        .map(|p| p.similarity.unwrap_or_default())
        .collect::<Vec<_>>();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn demo_timings_accumulate_per_player() {
    let mut demo = DemoSource::new();
    demo.similar_players(42, Algorithm::KMeans).expect("kmeans");
    let res = demo.similar_players(42, Algorithm::Louvain).expect("louvain");
    let names = res
        .execution_proc
        .iter()
        .map(|p| p.execution_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["KMeans", "Louvain"]);

    let other = demo.similar_players(7, Algorithm::Louvain).expect("louvain");
    assert_eq!(other.execution_proc.len(), 1);
    assert!(demo.similar_players(9999, Algorithm::KMeans).is_err());
}
