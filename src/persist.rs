use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::SharedStore;

const CACHE_DIR: &str = "scout_terminal";
const STORE_FILE: &str = "store.json";
const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    store: SharedStore,
}

/// `$XDG_CACHE_HOME/scout_terminal`, falling back to `~/.cache/scout_terminal`.
pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn store_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(STORE_FILE))
}

pub fn load_store() -> Option<SharedStore> {
    load_store_from(&store_path()?)
}

pub fn save_store(store: &SharedStore) -> Result<()> {
    let Some(path) = store_path() else {
        return Ok(());
    };
    save_store_to(&path, store)
}

/// Missing, unreadable or version-mismatched files all load as `None`.
pub fn load_store_from(path: &Path) -> Option<SharedStore> {
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<StoreFile>(&raw).ok()?;
    if file.version != STORE_VERSION {
        return None;
    }
    Some(file.store)
}

pub fn save_store_to(path: &Path, store: &SharedStore) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create store dir {}", dir.display()))?;
    }
    let file = StoreFile {
        version: STORE_VERSION,
        store: store.clone(),
    };
    let json = serde_json::to_string(&file).context("serialize store")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write store")?;
    fs::rename(&tmp, path).context("swap store")?;
    Ok(())
}
