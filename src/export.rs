use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::pipeline::PredictionRow;

pub const RESULT_COLUMNS: [&str; 6] = [
    "Match",
    "Home_Score",
    "Draw_Score",
    "Away_Score",
    "Prediction",
    "TotalScore",
];

pub struct ExportReport {
    pub rows: usize,
}

/// Write the result table to a one-sheet workbook.
pub fn export_predictions_xlsx(path: &Path, rows: &[PredictionRow]) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions")?;
        write_header(sheet)?;
        for (idx, row) in rows.iter().enumerate() {
            write_prediction(sheet, (idx + 1) as u32, row)?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "predictions exported");
    Ok(ExportReport { rows: rows.len() })
}

fn write_header(sheet: &mut Worksheet) -> Result<()> {
    for (col, name) in RESULT_COLUMNS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *name)
            .with_context(|| format!("write header ({col})"))?;
    }
    Ok(())
}

fn write_prediction(sheet: &mut Worksheet, row_idx: u32, row: &PredictionRow) -> Result<()> {
    let p = &row.prediction;
    sheet
        .write_string(row_idx, 0, &row.label)
        .with_context(|| format!("write cell ({row_idx},0)"))?;
    for (col, value) in [(1u16, p.home_score), (2, p.draw_score), (3, p.away_score)] {
        sheet
            .write_number(row_idx, col, value)
            .with_context(|| format!("write cell ({row_idx},{col})"))?;
    }
    sheet
        .write_string(row_idx, 4, p.outcome.label())
        .with_context(|| format!("write cell ({row_idx},4)"))?;
    sheet
        .write_number(row_idx, 5, row.total_score)
        .with_context(|| format!("write cell ({row_idx},5)"))?;
    Ok(())
}

/// The same table as CSV text, scores printed with two decimals.
pub fn predictions_to_csv(rows: &[PredictionRow]) -> String {
    let mut out = RESULT_COLUMNS.join(",");
    out.push('\n');
    for row in rows {
        let p = &row.prediction;
        out.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{},{:.2}\n",
            csv_field(&row.label),
            p.home_score,
            p.draw_score,
            p.away_score,
            p.outcome.label(),
            row.total_score
        ));
    }
    out
}

/// Full result rows, including per-side form and retrieval status, as pretty JSON.
pub fn predictions_to_json(rows: &[PredictionRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("failed serializing predictions")
}

fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
