use anyhow::Context;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::html::{next_tag_block_ci, row_cells, table_by_id, to_lower};
use crate::http_client::fetch_text;
use crate::retrieval::Retrieval;

const INJURIES_TABLE_ID: &str = "injuries";

/// A team's current absence list as published. Collected for display only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjuryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InjuryTable {
    pub fn absences(&self) -> usize {
        self.rows.len()
    }
}

pub fn fetch_team_injuries(client: &Client, team_url: &str) -> Retrieval<InjuryTable> {
    let result = fetch_text(client, team_url)
        .context("injuries request failed")
        .map(|page| parse_injuries_table(&page));
    match &result {
        Ok(Some(table)) => debug!(team_url, absences = table.absences(), "injuries fetched"),
        Ok(None) => debug!(team_url, "no injuries table on page"),
        Err(err) => warn!(team_url, "injuries fetch failed: {err:#}"),
    }
    Retrieval::from_result(result)
}

/// Extract the `<table id="injuries">` from a team page.
///
/// Header cells come from `<thead>` when present, otherwise from the first row. Rows with no
/// cells are skipped.
pub fn parse_injuries_table(page: &str) -> Option<InjuryTable> {
    let table = table_by_id(page, INJURIES_TABLE_ID)?;
    let lc = to_lower(table);

    let (headers, body_from) = match next_tag_block_ci(table, "<thead", "</thead>", 0) {
        Some((start, end)) => {
            let head = &table[start..end];
            let headers = next_tag_block_ci(head, "<tr", "</tr>", 0)
                .map(|(s, e)| row_cells(&head[s..e]))
                .unwrap_or_default();
            (headers, end)
        }
        None => (Vec::new(), 0),
    };

    let mut rows = Vec::new();
    let mut pos = body_from;
    while let Some((start, end)) = next_tag_block_ci(table, "<tr", "</tr>", pos) {
        let cells = row_cells(&table[start..end]);
        if !cells.is_empty() {
            rows.push(cells);
        }
        pos = end;
    }

    let mut headers = headers;
    if headers.is_empty() && !lc.contains("<thead") && !rows.is_empty() {
        headers = rows.remove(0);
    }
    Some(InjuryTable { headers, rows })
}
