use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::provider::PlayerSource;
use crate::state::{Algorithm, ExecutionProc, Player, PlayerOption, SimilarPlayer, SimilarityResult};

const DEMO_SEED: u64 = 0x5c07;
const SIMILAR_LIMIT: usize = 5;

/// Offline backend over a fixed roster, for running without a server.
pub struct DemoSource {
    players: Vec<Player>,
    rng: StdRng,
    // Per player: algorithms in first-call order with their simulated runtime.
    timings: HashMap<u32, Vec<(Algorithm, f64)>>,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSource {
    pub fn new() -> Self {
        Self::with_seed(DEMO_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            players: seed_players(),
            rng: StdRng::seed_from_u64(seed),
            timings: HashMap::new(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    fn player(&self, id: u32) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow!("player {id} not found"))
    }

    fn record_timing(&mut self, player_id: u32, algorithm: Algorithm) -> Vec<ExecutionProc> {
        let base = match algorithm {
            Algorithm::KMeans => 900.0,
            Algorithm::Louvain => 2400.0,
            Algorithm::Hierarchical => 5200.0,
        };
        let jitter: f64 = self.rng.gen_range(0.8..1.25);
        let entry = self.timings.entry(player_id).or_default();
        if !entry.iter().any(|(alg, _)| *alg == algorithm) {
            entry.push((algorithm, (base * jitter).round()));
        }
        entry
            .iter()
            .map(|(alg, time)| ExecutionProc {
                execution_name: alg.wire_name().to_string(),
                execution_time: Some(*time),
            })
            .collect()
    }
}

impl PlayerSource for DemoSource {
    fn search_players(&mut self, query: &str) -> Result<Vec<PlayerOption>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .map(|p| PlayerOption {
                id: p.id,
                label: p.name.clone(),
            })
            .collect())
    }

    fn player_detail(&mut self, player_id: u32) -> Result<Player> {
        self.player(player_id).cloned()
    }

    fn similar_players(&mut self, player_id: u32, algorithm: Algorithm) -> Result<SimilarityResult> {
        let target = self.player(player_id)?.clone();
        let mut ranked = self
            .players
            .iter()
            .filter(|p| p.id != player_id)
            .map(|p| {
                let score = similarity(algorithm, &target.attributes, &p.attributes);
                SimilarPlayer {
                    id: p.id,
                    name: p.name.clone(),
                    height: p.height,
                    weight: p.weight,
                    similarity: Some((score * 1000.0).round() / 1000.0),
                }
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(SIMILAR_LIMIT);

        let execution_proc = self.record_timing(player_id, algorithm);
        Ok(SimilarityResult {
            id: Some(target.id),
            name: target.name,
            similar_players: ranked,
            graph_url: None,
            execution_proc,
        })
    }
}

fn similarity(algorithm: Algorithm, a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    let pairs = a
        .iter()
        .filter_map(|(k, va)| b.get(k).map(|vb| (*va, *vb)))
        .collect::<Vec<_>>();
    if pairs.is_empty() {
        return 0.0;
    }
    match algorithm {
        Algorithm::KMeans => {
            let dist = pairs.iter().map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt();
            1.0 / (1.0 + dist / 100.0)
        }
        Algorithm::Louvain => {
            let dot = pairs.iter().map(|(x, y)| x * y).sum::<f64>();
            let na = pairs.iter().map(|(x, _)| x * x).sum::<f64>().sqrt();
            let nb = pairs.iter().map(|(_, y)| y * y).sum::<f64>().sqrt();
            if na == 0.0 || nb == 0.0 {
                0.0
            } else {
                dot / (na * nb)
            }
        }
        Algorithm::Hierarchical => {
            let mad = pairs.iter().map(|(x, y)| (x - y).abs()).sum::<f64>() / pairs.len() as f64;
            (1.0 - mad / 100.0).max(0.0)
        }
    }
}

fn seed_players() -> Vec<Player> {
    vec![
        seed_player(42, "Alice Moreau", &["ST", "LW"], "1998-04-12", 171.0, 63.0, [88, 84, 72, 86, 35, 70]),
        seed_player(7, "Bruno Tavares", &["CM", "CAM"], "1996-09-30", 178.0, 72.0, [74, 70, 88, 82, 58, 68]),
        seed_player(11, "Carla Jensen", &["RW", "ST"], "2000-01-19", 168.0, 60.0, [91, 80, 70, 88, 30, 62]),
        seed_player(15, "Dario Okafor", &["CB"], "1995-06-02", 190.0, 86.0, [64, 38, 60, 55, 87, 88]),
        seed_player(19, "Elin Sato", &["LB", "LWB"], "1999-11-08", 166.0, 58.0, [86, 52, 74, 78, 76, 66]),
        seed_player(23, "Felix Brandt", &["GK"], "1993-03-21", 194.0, 90.0, [48, 20, 58, 30, 40, 80]),
        seed_player(27, "Greta Lind", &["CDM", "CM"], "1997-07-14", 174.0, 67.0, [70, 60, 82, 72, 80, 78]),
        seed_player(31, "Hugo Reyes", &["ST"], "1994-12-25", 185.0, 80.0, [78, 89, 64, 74, 36, 85]),
        seed_player(35, "Iris Novak", &["CAM", "RW"], "2001-05-05", 165.0, 57.0, [84, 76, 86, 90, 34, 58]),
        seed_player(39, "Jonas Weber", &["RB"], "1998-08-17", 180.0, 74.0, [82, 50, 72, 70, 78, 76]),
        seed_player(44, "Kaito Mori", &["LW", "LM"], "1999-02-28", 172.0, 65.0, [90, 78, 74, 87, 32, 64]),
        seed_player(48, "Lena Costa", &["CB", "CDM"], "1996-10-10", 183.0, 76.0, [68, 42, 70, 60, 86, 84]),
    ]
}

fn seed_player(
    id: u32,
    name: &str,
    positions: &[&str],
    birth: &str,
    height: f64,
    weight: f64,
    stats: [u8; 6],
) -> Player {
    const LABELS: [&str; 6] = ["pace", "shooting", "passing", "dribbling", "defending", "physical"];
    let attributes = LABELS
        .iter()
        .zip(stats)
        .map(|(label, value)| (label.to_string(), f64::from(value)))
        .collect();
    Player {
        id,
        name: name.to_string(),
        positions: positions.iter().map(|p| p.to_string()).collect(),
        birth: Some(birth.to_string()),
        height: Some(height),
        weight: Some(weight),
        attributes,
    }
}
