use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

use crate::persist::cache_dir;

const CACHE_VERSION: u32 = 1;
const CACHE_FILE: &str = "http_cache.json";
const MAX_ENTRIES: usize = 512;

static CACHE: Mutex<Option<ResponseCache>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ResponseCache {
    version: u32,
    entries: HashMap<String, CachedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedResponse {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

/// GET `url` and return the body, revalidating against the on-disk copy when one exists.
///
/// A request always goes out; a `304 Not Modified` answer is served from the stored body.
pub fn get_revalidated(client: &Client, url: &str) -> Result<String> {
    let stored = with_cache(|cache| cache.entries.get(url).cloned());

    let mut req = json_request(client, url);
    if let Some(entry) = stored.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        let entry = stored.ok_or_else(|| anyhow!("received 304 without a stored body"))?;
        let body = entry.body.clone();
        store_entry(url, CachedResponse {
            fetched_at: now_secs(),
            ..entry
        });
        return Ok(body);
    }

    let etag = header_string(resp.headers(), ETAG);
    let last_modified = header_string(resp.headers(), LAST_MODIFIED);
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {}", truncate_body(&body)));
    }

    if etag.is_some() || last_modified.is_some() {
        store_entry(url, CachedResponse {
            body: body.clone(),
            etag,
            last_modified,
            fetched_at: now_secs(),
        });
    }
    Ok(body)
}

/// GET `url` without touching the cache.
pub fn get_fresh(client: &Client, url: &str) -> Result<String> {
    let resp = json_request(client, url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {}", truncate_body(&body)));
    }
    Ok(body)
}

fn json_request(client: &Client, url: &str) -> RequestBuilder {
    client.get(url).header(ACCEPT, "application/json")
}

fn header_string(headers: &reqwest::header::HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn truncate_body(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

fn with_cache<T>(f: impl FnOnce(&mut ResponseCache) -> T) -> T {
    let mut guard = CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let cache = guard.get_or_insert_with(load_cache_file);
    f(cache)
}

fn store_entry(key: &str, entry: CachedResponse) {
    with_cache(|cache| {
        cache.version = CACHE_VERSION;
        cache.entries.insert(key.to_string(), entry);
        evict_oldest(&mut cache.entries, MAX_ENTRIES);
        let _ = save_cache_file(cache);
    });
}

fn evict_oldest(entries: &mut HashMap<String, CachedResponse>, max: usize) {
    if entries.len() <= max {
        return;
    }
    let mut by_age: Vec<(u64, String)> = entries
        .iter()
        .map(|(key, entry)| (entry.fetched_at, key.clone()))
        .collect();
    by_age.sort();
    let excess = entries.len() - max;
    for (_, key) in by_age.into_iter().take(excess) {
        entries.remove(&key);
    }
}

fn load_cache_file() -> ResponseCache {
    let Some(path) = cache_path() else {
        return ResponseCache::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return ResponseCache::default();
    };
    let cache = serde_json::from_str::<ResponseCache>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return ResponseCache::default();
    }
    cache
}

fn save_cache_file(cache: &ResponseCache) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, &path).context("swap http cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fetched_at: u64) -> CachedResponse {
        CachedResponse {
            body: "[]".to_string(),
            etag: None,
            last_modified: None,
            fetched_at,
        }
    }

    #[test]
    fn eviction_drops_the_oldest_entries_first() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), entry(30));
        entries.insert("b".to_string(), entry(10));
        entries.insert("c".to_string(), entry(20));

        evict_oldest(&mut entries, 2);

        assert_eq!(entries.len(), 2);
        assert!(!entries.contains_key("b"));
        assert!(entries.contains_key("a"));
        assert!(entries.contains_key("c"));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(500);
        assert_eq!(truncate_body(&body).len(), 200);
        assert_eq!(truncate_body("  short  "), "short");
    }
}
