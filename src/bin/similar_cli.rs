use anyhow::{Context, Result, bail};

use scout_terminal::config::{self, AppConfig};
use scout_terminal::format::{
    format_execution_time, format_measure, format_similarity, graph_image_url,
};
use scout_terminal::memo::SimilarityMemo;
use scout_terminal::provider::{self, PlayerSource};
use scout_terminal::state::Algorithm;

fn main() -> Result<()> {
    config::load_dotenv();
    let config = AppConfig::from_env();

    let mut args = std::env::args().skip(1);
    let Some(name) = args.next() else {
        eprintln!("usage: similar_cli <player name> [KMeans|Louvain|Hierarchical ...]");
        std::process::exit(2);
    };
    let mut algorithms = Vec::new();
    for raw in args {
        match Algorithm::from_wire(&raw) {
            Some(alg) => algorithms.push(alg),
            None => bail!("unknown algorithm: {raw}"),
        }
    }
    if algorithms.is_empty() {
        algorithms.push(Algorithm::KMeans);
    }

    let mut source = provider::source_from_config(&config);
    let candidates = source
        .search_players(&name)
        .with_context(|| format!("search players for {name:?}"))?;
    let Some(player) = candidates.first() else {
        eprintln!("No player matches {name:?}.");
        return Ok(());
    };
    println!("Player: {} (id={})", player.label, player.id);
    if candidates.len() > 1 {
        println!("({} other candidates ignored)", candidates.len() - 1);
    }

    let mut memo = SimilarityMemo::new();
    for algorithm in algorithms {
        let result = source
            .similar_players(player.id, algorithm)
            .with_context(|| format!("similar players ({})", algorithm.wire_name()))?;
        if !memo.record(player.id, algorithm, &result) {
            println!("\n{} already recorded, showing the latest response", algorithm.label());
        }

        println!("\n== {} ==", algorithm.label());
        println!(
            "{:<24} {:>8} {:>10} {:>10} {:>10}",
            "Name", "Id", "Height", "Weight", "Similarity"
        );
        for row in &result.similar_players {
            println!(
                "{:<24} {:>8} {:>10} {:>10} {:>10}",
                row.name,
                row.id,
                format_measure(row.height, "cm"),
                format_measure(row.weight, "kg"),
                format_similarity(row.similarity)
            );
        }
        println!("Graph: {}", graph_image_url(&result, &config.no_image_url));
        for proc in &result.execution_proc {
            println!(
                "  {:<14} {}",
                proc.execution_name,
                format_execution_time(proc.execution_time)
            );
        }
    }

    let recorded = memo
        .called()
        .iter()
        .map(|alg| alg.wire_name())
        .collect::<Vec<_>>()
        .join(", ");
    println!("\nRecorded: [{recorded}]");
    Ok(())
}
