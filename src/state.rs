use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::api::{
    lenient_attributes, lenient_f64, lenient_id, lenient_opt_id, string_or_default, vec_or_default,
};
use crate::config::AppConfig;
use crate::memo::{SimilarityMemo, TableObject};
use crate::search::SearchBox;
use crate::store::{SharedStore, StoreAction};

pub const MISSING_PLAYER_MESSAGE: &str = "Please enter player name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Communities,
    Similar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    KMeans,
    Louvain,
    Hierarchical,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::KMeans, Algorithm::Louvain, Algorithm::Hierarchical];

    /// Name the backend expects in the `algorithm` query parameter.
    pub fn wire_name(self) -> &'static str {
        match self {
            Algorithm::KMeans => "KMeans",
            Algorithm::Louvain => "Louvain",
            Algorithm::Hierarchical => "Hierarchical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::KMeans => "K-Means",
            Algorithm::Louvain => "Louvain",
            Algorithm::Hierarchical => "Hierarchical",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.wire_name().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn next(self) -> Self {
        match self {
            Algorithm::KMeans => Algorithm::Louvain,
            Algorithm::Louvain => Algorithm::Hierarchical,
            Algorithm::Hierarchical => Algorithm::KMeans,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Algorithm::KMeans => Algorithm::Hierarchical,
            Algorithm::Louvain => Algorithm::KMeans,
            Algorithm::Hierarchical => Algorithm::Louvain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Defence,
    Physical,
    Speed,
    Vision,
    Attack,
    Technique,
    Aerial,
    Mental,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Defence,
        Category::Physical,
        Category::Speed,
        Category::Vision,
        Category::Attack,
        Category::Technique,
        Category::Aerial,
        Category::Mental,
    ];

    pub fn value(self) -> &'static str {
        match self {
            Category::Defence => "defence",
            Category::Physical => "physical",
            Category::Speed => "speed",
            Category::Vision => "vision",
            Category::Attack => "attack",
            Category::Technique => "technique",
            Category::Aerial => "aerial",
            Category::Mental => "mental",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Defence => "Defence",
            Category::Physical => "Physical",
            Category::Speed => "Speed",
            Category::Vision => "Vision",
            Category::Attack => "Attack",
            Category::Technique => "Technique",
            Category::Aerial => "Aerial",
            Category::Mental => "Mental",
        }
    }
}

/// One autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOption {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(deserialize_with = "lenient_id")]
    pub id: u32,
    #[serde(default, deserialize_with = "string_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "vec_or_default")]
    pub positions: Vec<String>,
    #[serde(default)]
    pub birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPlayer {
    #[serde(deserialize_with = "lenient_id")]
    pub id: u32,
    #[serde(default, deserialize_with = "string_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionProc {
    #[serde(rename = "executionName", default, deserialize_with = "string_or_default")]
    pub execution_name: String,
    #[serde(rename = "executionTime", default, deserialize_with = "lenient_f64")]
    pub execution_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    #[serde(default, deserialize_with = "lenient_opt_id")]
    pub id: Option<u32>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub name: String,
    #[serde(rename = "similarPlayer", default, deserialize_with = "vec_or_default")]
    pub similar_players: Vec<SimilarPlayer>,
    #[serde(rename = "graphURL", default)]
    pub graph_url: Option<String>,
    #[serde(rename = "executionProc", default, deserialize_with = "vec_or_default")]
    pub execution_proc: Vec<ExecutionProc>,
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub search: SearchBox,
    pub selected: Option<PlayerOption>,
    pub detail: Option<Player>,
    pub detail_error: Option<String>,
    pub detail_seq: u64,
}

impl HomePage {
    fn new(debounce: Duration) -> Self {
        Self {
            search: SearchBox::new(debounce),
            selected: None,
            detail: None,
            detail_error: None,
            detail_seq: 0,
        }
    }

    /// Waiting on the detail fetch for the current selection.
    pub fn is_loading(&self) -> bool {
        self.selected.is_some() && self.detail.is_none() && self.detail_error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct CommunitiesPage {
    pub search: SearchBox,
    pub selected: Option<PlayerOption>,
    pub categories: Vec<Category>,
    pub category_cursor: usize,
}

impl CommunitiesPage {
    fn new(debounce: Duration) -> Self {
        Self {
            search: SearchBox::new(debounce),
            selected: None,
            categories: Vec::new(),
            category_cursor: 0,
        }
    }

    pub fn is_checked(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

#[derive(Debug, Clone)]
pub struct SimilarPage {
    pub search: SearchBox,
    pub selected: Option<PlayerOption>,
    pub algorithm: Algorithm,
    pub displayed: Option<SimilarityResult>,
    pub displayed_algorithm: Algorithm,
    pub memo: SimilarityMemo,
    pub notification: Option<String>,
    pub latest_seq: u64,
    pub loading: bool,
    pub table_scroll: usize,
}

impl SimilarPage {
    fn new(debounce: Duration) -> Self {
        Self {
            search: SearchBox::new(debounce),
            selected: None,
            algorithm: Algorithm::KMeans,
            displayed: None,
            displayed_algorithm: Algorithm::KMeans,
            memo: SimilarityMemo::new(),
            notification: None,
            latest_seq: 0,
            loading: false,
            table_scroll: 0,
        }
    }

    pub fn has_result(&self) -> bool {
        self.displayed.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub path: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub home: HomePage,
    pub communities: CommunitiesPage,
    pub similar: SimilarPage,
    pub store: SharedStore,
    pub no_image_url: String,
    pub export_path: String,
    pub export: Option<ExportState>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(&AppConfig::default())
    }

    pub fn with_config(config: &AppConfig) -> Self {
        Self {
            screen: Screen::Home,
            home: HomePage::new(config.search_debounce),
            communities: CommunitiesPage::new(config.search_debounce),
            similar: SimilarPage::new(config.search_debounce),
            store: SharedStore::default(),
            no_image_url: config.no_image_url.clone(),
            export_path: config.export_path.clone(),
            export: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn search_box(&self, page: Screen) -> &SearchBox {
        match page {
            Screen::Home => &self.home.search,
            Screen::Communities => &self.communities.search,
            Screen::Similar => &self.similar.search,
        }
    }

    pub fn search_box_mut(&mut self, page: Screen) -> &mut SearchBox {
        match page {
            Screen::Home => &mut self.home.search,
            Screen::Communities => &mut self.communities.search,
            Screen::Similar => &mut self.similar.search,
        }
    }

    /// Search requests whose debounce window has elapsed, across all pages.
    pub fn due_searches(&mut self, now: Instant) -> Vec<ProviderCommand> {
        let mut commands = Vec::new();
        for page in [Screen::Home, Screen::Communities, Screen::Similar] {
            if let Some((seq, query)) = self.search_box_mut(page).poll_due(now) {
                commands.push(ProviderCommand::SearchPlayers { page, seq, query });
            }
        }
        commands
    }

    /// Commits the highlighted candidate of `page`'s search box as that page's selection.
    pub fn choose_search_option(&mut self, page: Screen) -> Option<ProviderCommand> {
        let option = self.search_box_mut(page).choose()?;
        match page {
            Screen::Home => Some(self.select_home_player(option)),
            Screen::Communities => {
                self.push_log(format!("[INFO] Community player: {}", option.label));
                self.communities.selected = Some(option);
                None
            }
            Screen::Similar => {
                self.select_similar_player(option);
                None
            }
        }
    }

    pub fn select_home_player(&mut self, option: PlayerOption) -> ProviderCommand {
        self.home.detail = None;
        self.home.detail_error = None;
        self.home.detail_seq += 1;
        let player_id = option.id;
        self.home.selected = Some(option);
        ProviderCommand::FetchPlayerDetail {
            seq: self.home.detail_seq,
            player_id,
        }
    }

    pub fn remove_home_player(&mut self) {
        self.home.search.reset();
        self.home.selected = None;
        self.home.detail = None;
        self.home.detail_error = None;
        self.home.detail_seq += 1;
    }

    pub fn remove_community_player(&mut self) {
        self.communities.search.reset();
        self.communities.selected = None;
    }

    pub fn move_category_cursor(&mut self, forward: bool) {
        let len = Category::ALL.len();
        self.communities.category_cursor = if forward {
            (self.communities.category_cursor + 1) % len
        } else {
            (self.communities.category_cursor + len - 1) % len
        };
    }

    pub fn toggle_category(&mut self) {
        let Some(category) = Category::ALL.get(self.communities.category_cursor).copied() else {
            return;
        };
        let selected = &mut self.communities.categories;
        if let Some(pos) = selected.iter().position(|c| *c == category) {
            selected.remove(pos);
        } else {
            selected.push(category);
        }
        let values = self
            .communities
            .categories
            .iter()
            .map(|c| c.value())
            .collect::<Vec<_>>()
            .join(", ");
        self.push_log(format!("[INFO] Selected categories: [{values}]"));
    }

    pub fn select_similar_player(&mut self, option: PlayerOption) {
        let switching = self
            .similar
            .selected
            .as_ref()
            .is_some_and(|current| current.id != option.id);
        if switching {
            // In-flight answers belong to the previous player.
            self.similar.memo.clear();
            self.similar.latest_seq += 1;
            self.similar.loading = false;
        }
        self.store.dispatch(StoreAction::SetPlayerId(option.id));
        self.similar.selected = Some(option);
    }

    pub fn cycle_algorithm(&mut self, forward: bool) {
        self.similar.algorithm = if forward {
            self.similar.algorithm.next()
        } else {
            self.similar.algorithm.prev()
        };
    }

    /// "Find similar players": returns the fetch to issue, or raises the notification
    /// when no player is selected.
    pub fn submit_similarity(&mut self) -> Option<ProviderCommand> {
        let Some(selected) = self.similar.selected.as_ref() else {
            self.similar.notification = Some(MISSING_PLAYER_MESSAGE.to_string());
            return None;
        };
        let player_id = selected.id;
        self.similar.latest_seq += 1;
        self.similar.loading = true;
        Some(ProviderCommand::FetchSimilar {
            seq: self.similar.latest_seq,
            player_id,
            algorithm: self.similar.algorithm,
        })
    }

    pub fn close_notification(&mut self) {
        self.similar.notification = None;
    }

    /// "Clear result": drops the selection, the displayed result and the memo.
    pub fn clear_similarity(&mut self) {
        self.similar.search.reset();
        self.similar.selected = None;
        self.similar.displayed = None;
        self.similar.memo.clear();
        self.similar.latest_seq += 1;
        self.similar.loading = false;
        self.similar.table_scroll = 0;
    }

    pub fn request_export(&mut self) -> Option<ProviderCommand> {
        if self.similar.memo.is_empty() {
            self.push_log("[INFO] Nothing to export yet");
            return None;
        }
        Some(ProviderCommand::ExportSimilarity {
            path: self.export_path.clone(),
            table: self.similar.memo.table().clone(),
        })
    }

    pub fn scroll_similar_table(&mut self, down: bool) {
        let rows = self
            .similar
            .displayed
            .as_ref()
            .map(|r| r.similar_players.len())
            .unwrap_or(0);
        if down {
            if self.similar.table_scroll + 1 < rows {
                self.similar.table_scroll += 1;
            }
        } else {
            self.similar.table_scroll = self.similar.table_scroll.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SearchResults {
        page: Screen,
        seq: u64,
        options: Vec<PlayerOption>,
    },
    SearchFailed {
        page: Screen,
        seq: u64,
        error: String,
    },
    SetPlayerDetail {
        seq: u64,
        player: Player,
    },
    PlayerDetailFailed {
        seq: u64,
        error: String,
    },
    SetSimilarity {
        seq: u64,
        player_id: u32,
        algorithm: Algorithm,
        result: SimilarityResult,
    },
    SimilarityFailed {
        seq: u64,
        algorithm: Algorithm,
        error: String,
    },
    ExportStarted {
        path: String,
    },
    ExportFinished {
        path: String,
        sheets: usize,
        rows: usize,
        error: Option<String>,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    SearchPlayers {
        page: Screen,
        seq: u64,
        query: String,
    },
    FetchPlayerDetail {
        seq: u64,
        player_id: u32,
    },
    FetchSimilar {
        seq: u64,
        player_id: u32,
        algorithm: Algorithm,
    },
    ExportSimilarity {
        path: String,
        table: TableObject,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SearchResults { page, seq, options } => {
            state.search_box_mut(page).apply_results(seq, options);
        }
        Delta::SearchFailed { page, seq, error } => {
            if state.search_box_mut(page).apply_failure(seq) {
                state.push_log(format!("[WARN] Player search error: {error}"));
            }
        }
        Delta::SetPlayerDetail { seq, player } => {
            // A newer selection (or Remove) supersedes this response.
            if seq != state.home.detail_seq || state.home.selected.is_none() {
                return;
            }
            state.home.detail = Some(player);
        }
        Delta::PlayerDetailFailed { seq, error } => {
            if seq != state.home.detail_seq || state.home.selected.is_none() {
                return;
            }
            state.push_log(format!("[WARN] Player detail error: {error}"));
            state.home.detail_error = Some(error);
        }
        Delta::SetSimilarity {
            seq,
            player_id,
            algorithm,
            result,
        } => {
            if seq != state.similar.latest_seq {
                state.push_log(format!(
                    "[INFO] Dropped stale {} response for player {player_id}",
                    algorithm.wire_name()
                ));
                return;
            }
            state.similar.loading = false;
            state.similar.table_scroll = 0;
            state.similar.displayed_algorithm = algorithm;
            if state.similar.memo.record(player_id, algorithm, &result) {
                let snapshot = state.similar.memo.table().clone();
                state.store.dispatch(StoreAction::SetDataObject(snapshot));
            }
            state.similar.displayed = Some(result);
        }
        Delta::SimilarityFailed {
            seq,
            algorithm,
            error,
        } => {
            if seq != state.similar.latest_seq {
                state.push_log(format!(
                    "[INFO] Dropped stale {} error: {error}",
                    algorithm.wire_name()
                ));
                return;
            }
            state.similar.loading = false;
            state.push_log(format!(
                "[WARN] Similar players ({}) error: {error}",
                algorithm.wire_name()
            ));
        }
        Delta::ExportStarted { path } => {
            state.export = Some(ExportState {
                active: true,
                path: Some(path),
                message: "Exporting".to_string(),
            });
        }
        Delta::ExportFinished {
            path,
            sheets,
            rows,
            error,
        } => {
            let message = match error {
                Some(err) => {
                    state.push_log(format!("[WARN] Export failed: {err}"));
                    format!("Export failed: {err}")
                }
                None => {
                    state.push_log(format!(
                        "[INFO] Exported {rows} rows in {sheets} sheets to {path}"
                    ));
                    format!("Saved {rows} rows to {path}")
                }
            };
            state.export = Some(ExportState {
                active: false,
                path: Some(path),
                message,
            });
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Home => "SEARCH",
        Screen::Communities => "COMMUNITIES",
        Screen::Similar => "SIMILAR PLAYERS",
    }
}
