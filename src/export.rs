use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::memo::TableObject;
use crate::state::SimilarityResult;

pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
}

/// Writes every recorded algorithm of `table` to its own sheet plus a `Timings` sheet.
pub fn export_similarity(path: &Path, table: &TableObject) -> Result<ExportReport> {
    let recorded = table.recorded();
    if recorded.is_empty() {
        return Err(anyhow::anyhow!("no similarity results recorded"));
    }

    let mut workbook = Workbook::new();
    let mut rows_written = 0usize;

    for (algorithm, result) in &recorded {
        let rows = similar_rows(table.player_id, result);
        rows_written += rows.len().saturating_sub(1);
        let sheet = workbook.add_worksheet();
        sheet.set_name(algorithm.wire_name())?;
        write_rows(sheet, &rows)?;
    }

    let timings = timing_rows(table);
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Timings")?;
        write_rows(sheet, &timings)?;
    }
    rows_written += timings.len().saturating_sub(1);

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        sheets: recorded.len() + 1,
        rows: rows_written,
    })
}

fn similar_rows(player_id: Option<u32>, result: &SimilarityResult) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Player ID".to_string(),
        "Player".to_string(),
        "Rank".to_string(),
        "Similar ID".to_string(),
        "Similar Player".to_string(),
        "Height (cm)".to_string(),
        "Weight (kg)".to_string(),
        "Similarity".to_string(),
    ]];
    let queried_id = result.id.or(player_id);
    for (rank, item) in result.similar_players.iter().enumerate() {
        rows.push(vec![
            opt_to_string(queried_id),
            result.name.clone(),
            (rank + 1).to_string(),
            item.id.to_string(),
            item.name.clone(),
            opt_to_string(item.height),
            opt_to_string(item.weight),
            opt_to_string(item.similarity),
        ]);
    }
    rows
}

fn timing_rows(table: &TableObject) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Queried With".to_string(),
        "Execution".to_string(),
        "Time (us)".to_string(),
    ]];
    for (algorithm, result) in table.recorded() {
        for proc in &result.execution_proc {
            rows.push(vec![
                algorithm.wire_name().to_string(),
                proc.execution_name.clone(),
                opt_to_string(proc.execution_time),
            ]);
        }
    }
    rows
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
