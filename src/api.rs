use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::http_cache::{get_fresh, get_revalidated};
use crate::http_client::http_client;
use crate::state::{Algorithm, Player, PlayerOption, SimilarityResult};

const DETAIL_ATTEMPTS: usize = 3;
const DETAIL_RETRY_PAUSE: Duration = Duration::from_millis(300);

/// Client for the player-analytics backend.
#[derive(Debug, Clone)]
pub struct PlayerApi {
    base: String,
    timeout: Duration,
    use_cache: bool,
}

impl PlayerApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base: config.api_base.trim_end_matches('/').to_string(),
            timeout: config.http_timeout,
            use_cache: config.http_cache,
        }
    }

    pub fn search_url(&self, name: &str) -> Result<Url> {
        Url::parse_with_params(&format!("{}/player", self.base), &[("name", name)])
            .context("invalid search url")
    }

    pub fn detail_url(&self, player_id: u32) -> Result<Url> {
        Url::parse(&format!("{}/player/{player_id}", self.base)).context("invalid detail url")
    }

    pub fn community_url(&self, player_id: u32, algorithm: Algorithm) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/graph/community", self.base),
            &[
                ("playerId", player_id.to_string().as_str()),
                ("algorithm", algorithm.wire_name()),
            ],
        )
        .context("invalid community url")
    }

    /// Candidates whose name matches `name`; an empty fragment never hits the backend.
    pub fn search_players(&self, name: &str) -> Result<Vec<PlayerOption>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.search_url(name)?;
        let body = self.get(url.as_str(), self.use_cache)?;
        parse_player_options_json(&body)
    }

    pub fn fetch_player_detail(&self, player_id: u32) -> Result<Player> {
        let url = self.detail_url(player_id)?;
        let mut last_err = None;
        for attempt in 0..DETAIL_ATTEMPTS {
            let parsed = self
                .get(url.as_str(), self.use_cache)
                .and_then(|body| parse_player_json(&body));
            match parsed {
                Ok(player) => return Ok(player),
                Err(err) => {
                    last_err = Some(err);
                    if attempt + 1 < DETAIL_ATTEMPTS {
                        std::thread::sleep(DETAIL_RETRY_PAUSE);
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("player fetch failed")))
    }

    /// One request per call; similarity results are never served from the disk cache.
    pub fn fetch_similar_players(
        &self,
        player_id: u32,
        algorithm: Algorithm,
    ) -> Result<SimilarityResult> {
        let url = self.community_url(player_id, algorithm)?;
        let body = self.get(url.as_str(), false)?;
        parse_similarity_json(&body)
    }

    fn get(&self, url: &str, cached: bool) -> Result<String> {
        let client = http_client(self.timeout)?;
        if cached {
            get_revalidated(client, url)
        } else {
            get_fresh(client, url)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Bare(Vec<SearchRow>),
    Wrapped { data: Vec<SearchRow> },
}

#[derive(Debug, Deserialize)]
struct SearchRow {
    #[serde(deserialize_with = "lenient_id")]
    id: u32,
    #[serde(default, deserialize_with = "string_or_default")]
    name: String,
}

pub fn parse_player_options_json(raw: &str) -> Result<Vec<PlayerOption>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let parsed: SearchResponse = serde_json::from_str(trimmed).context("invalid search json")?;
    let rows = match parsed {
        SearchResponse::Bare(rows) => rows,
        SearchResponse::Wrapped { data } => data,
    };
    Ok(rows
        .into_iter()
        .map(|row| PlayerOption {
            id: row.id,
            label: row.name,
        })
        .collect())
}

pub fn parse_player_json(raw: &str) -> Result<Player> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty player response"));
    }
    serde_json::from_str(trimmed).context("invalid player json")
}

pub fn parse_similarity_json(raw: &str) -> Result<SimilarityResult> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty similarity response"));
    }
    serde_json::from_str(trimmed).context("invalid similarity json")
}

pub(crate) fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

pub(crate) fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let rendered = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(rendered)
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

pub(crate) fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    value_as_id(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {value}")))
}

pub(crate) fn lenient_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_id(&value))
}

/// Attribute maps keep only entries with a numeric value.
pub(crate) fn lenient_attributes<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, raw)| value_as_f64(&raw).map(|v| (name, v)))
        .collect())
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn value_as_id(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> PlayerApi {
        PlayerApi::new(&AppConfig {
            api_base: "http://scout.test/api/".to_string(),
            ..AppConfig::default()
        })
    }

    #[test]
    fn search_url_encodes_the_fragment() {
        let url = api().search_url("Ali ce&x").unwrap();
        assert_eq!(url.as_str(), "http://scout.test/api/player?name=Ali+ce%26x");
    }

    #[test]
    fn community_url_carries_id_and_algorithm() {
        let url = api().community_url(42, Algorithm::Louvain).unwrap();
        assert_eq!(
            url.as_str(),
            "http://scout.test/api/graph/community?playerId=42&algorithm=Louvain"
        );
    }

    #[test]
    fn empty_search_returns_no_candidates_without_a_request() {
        let options = api().search_players("   ").unwrap();
        assert!(options.is_empty());
    }
}
