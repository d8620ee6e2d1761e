use std::env;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_NO_IMAGE_URL: &str = "http://localhost:3000/no-image-available.png";
const DEFAULT_EXPORT_PATH: &str = "similar_players.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Http,
    Demo,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub source: SourceKind,
    pub http_timeout: Duration,
    pub search_debounce: Duration,
    pub no_image_url: String,
    pub export_path: String,
    pub http_cache: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            source: SourceKind::Http,
            http_timeout: Duration::from_secs(10),
            search_debounce: Duration::from_millis(400),
            no_image_url: DEFAULT_NO_IMAGE_URL.to_string(),
            export_path: DEFAULT_EXPORT_PATH.to_string(),
            http_cache: true,
        }
    }
}

impl AppConfig {
    /// Reads `SCOUT_*` variables; anything missing or unparsable keeps its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_base = non_empty_env("SCOUT_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let source = match env::var("SCOUT_SOURCE")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "demo" | "fake" | "offline" => SourceKind::Demo,
            _ => SourceKind::Http,
        };
        let timeout_secs = env::var("SCOUT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(1, 120);
        let debounce_ms = env::var("SCOUT_SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(400)
            .clamp(50, 5000);
        let http_cache = env::var("SCOUT_HTTP_CACHE")
            .ok()
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            api_base,
            source,
            http_timeout: Duration::from_secs(timeout_secs),
            search_debounce: Duration::from_millis(debounce_ms),
            no_image_url: non_empty_env("SCOUT_NO_IMAGE_URL").unwrap_or(defaults.no_image_url),
            export_path: non_empty_env("SCOUT_EXPORT_PATH").unwrap_or(defaults.export_path),
            http_cache,
        }
    }
}

/// Loads `.env.local` then `.env` from the working directory, ignoring missing files.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
