use serde::{Deserialize, Serialize};

use crate::state::{Algorithm, SimilarityResult};

/// Last recorded similarity result per algorithm for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableObject {
    #[serde(rename = "playerId", default)]
    pub player_id: Option<u32>,
    #[serde(rename = "KMeans", default)]
    pub kmeans: Option<SimilarityResult>,
    #[serde(rename = "Louvain", default)]
    pub louvain: Option<SimilarityResult>,
    #[serde(rename = "Hierarchical", default)]
    pub hierarchical: Option<SimilarityResult>,
}

impl TableObject {
    pub fn get(&self, algorithm: Algorithm) -> Option<&SimilarityResult> {
        match algorithm {
            Algorithm::KMeans => self.kmeans.as_ref(),
            Algorithm::Louvain => self.louvain.as_ref(),
            Algorithm::Hierarchical => self.hierarchical.as_ref(),
        }
    }

    fn slot_mut(&mut self, algorithm: Algorithm) -> &mut Option<SimilarityResult> {
        match algorithm {
            Algorithm::KMeans => &mut self.kmeans,
            Algorithm::Louvain => &mut self.louvain,
            Algorithm::Hierarchical => &mut self.hierarchical,
        }
    }

    /// Recorded results in algorithm order.
    pub fn recorded(&self) -> Vec<(Algorithm, &SimilarityResult)> {
        Algorithm::ALL
            .into_iter()
            .filter_map(|alg| self.get(alg).map(|result| (alg, result)))
            .collect()
    }
}

/// Per-session memo for the similar-players view.
///
/// Invariant: each algorithm is recorded at most once per player; recording for a
/// different player drops everything first.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMemo {
    called: Vec<Algorithm>,
    table: TableObject,
}

impl SimilarityMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn called(&self) -> &[Algorithm] {
        &self.called
    }

    pub fn is_called(&self, algorithm: Algorithm) -> bool {
        self.called.contains(&algorithm)
    }

    pub fn table(&self) -> &TableObject {
        &self.table
    }

    pub fn is_empty(&self) -> bool {
        self.called.is_empty()
    }

    /// Records `result` unless `algorithm` was already recorded for `player_id`.
    /// Returns whether the memo changed.
    pub fn record(&mut self, player_id: u32, algorithm: Algorithm, result: &SimilarityResult) -> bool {
        if self.table.player_id.is_some_and(|id| id != player_id) {
            self.clear();
        }
        if self.is_called(algorithm) {
            return false;
        }
        self.called.push(algorithm);
        self.table.player_id = Some(player_id);
        *self.table.slot_mut(algorithm) = Some(result.clone());
        true
    }

    pub fn clear(&mut self) {
        self.called.clear();
        self.table = TableObject::default();
    }
}
