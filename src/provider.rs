use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::Result;

use crate::api::PlayerApi;
use crate::config::{AppConfig, SourceKind};
use crate::demo_source::DemoSource;
use crate::export;
use crate::state::{Algorithm, Delta, Player, PlayerOption, ProviderCommand, SimilarityResult};

/// The three remote reads the pages depend on.
pub trait PlayerSource: Send {
    fn search_players(&mut self, query: &str) -> Result<Vec<PlayerOption>>;
    fn player_detail(&mut self, player_id: u32) -> Result<Player>;
    fn similar_players(&mut self, player_id: u32, algorithm: Algorithm) -> Result<SimilarityResult>;
}

impl PlayerSource for PlayerApi {
    fn search_players(&mut self, query: &str) -> Result<Vec<PlayerOption>> {
        PlayerApi::search_players(self, query)
    }

    fn player_detail(&mut self, player_id: u32) -> Result<Player> {
        self.fetch_player_detail(player_id)
    }

    fn similar_players(&mut self, player_id: u32, algorithm: Algorithm) -> Result<SimilarityResult> {
        self.fetch_similar_players(player_id, algorithm)
    }
}

pub fn source_from_config(config: &AppConfig) -> Box<dyn PlayerSource> {
    match config.source {
        SourceKind::Http => Box::new(PlayerApi::new(config)),
        SourceKind::Demo => Box::new(DemoSource::new()),
    }
}

/// Runs commands on a background thread until the command channel closes.
pub fn spawn_provider(
    mut source: Box<dyn PlayerSource>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            handle_command(source.as_mut(), cmd, &tx);
        }
    })
}

pub fn handle_command(source: &mut dyn PlayerSource, cmd: ProviderCommand, tx: &Sender<Delta>) {
    match cmd {
        ProviderCommand::SearchPlayers { page, seq, query } => {
            let delta = match source.search_players(&query) {
                Ok(options) => Delta::SearchResults { page, seq, options },
                Err(err) => Delta::SearchFailed {
                    page,
                    seq,
                    error: format!("{err:#}"),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchPlayerDetail { seq, player_id } => {
            let delta = match source.player_detail(player_id) {
                Ok(player) => Delta::SetPlayerDetail { seq, player },
                Err(err) => Delta::PlayerDetailFailed {
                    seq,
                    error: format!("{err:#}"),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::FetchSimilar {
            seq,
            player_id,
            algorithm,
        } => {
            let delta = match source.similar_players(player_id, algorithm) {
                Ok(result) => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] {} returned {} similar players for {player_id}",
                        algorithm.wire_name(),
                        result.similar_players.len()
                    )));
                    Delta::SetSimilarity {
                        seq,
                        player_id,
                        algorithm,
                        result,
                    }
                }
                Err(err) => Delta::SimilarityFailed {
                    seq,
                    algorithm,
                    error: format!("{err:#}"),
                },
            };
            let _ = tx.send(delta);
        }
        ProviderCommand::ExportSimilarity { path, table } => {
            let tx = tx.clone();
            thread::spawn(move || {
                let _ = tx.send(Delta::ExportStarted { path: path.clone() });
                let target = PathBuf::from(&path);
                let delta = match export::export_similarity(&target, &table) {
                    Ok(report) => Delta::ExportFinished {
                        path,
                        sheets: report.sheets,
                        rows: report.rows,
                        error: None,
                    },
                    Err(err) => Delta::ExportFinished {
                        path,
                        sheets: 0,
                        rows: 0,
                        error: Some(format!("{err:#}")),
                    },
                };
                let _ = tx.send(delta);
            });
        }
    }
}
