use std::fs;
use std::mem::take;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use crate::predict::{DEFAULT_VOTE, MatchInput};

const COL_HOME: &str = "home";
const COL_AWAY: &str = "away";
const COL_HOME_VOTE: &str = "homevote";
const COL_DRAW_VOTE: &str = "drawvote";
const COL_AWAY_VOTE: &str = "awayvote";
const COL_HOME_INJURIES: &str = "homeinjuriesurl";
const COL_AWAY_INJURIES: &str = "awayinjuriesurl";

pub fn load_matches_csv(path: &Path) -> Result<Vec<MatchInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    parse_matches_csv(&raw).with_context(|| format!("invalid match file {}", path.display()))
}

/// Parse the uploaded match table. `Home` and `Away` columns are required; vote columns are
/// optional and fall back to 0.33 per cell.
pub fn parse_matches_csv(text: &str) -> Result<Vec<MatchInput>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = parse_rows(text, ',').into_iter();
    let header = rows.next().ok_or_else(|| anyhow!("empty match file"))?;
    let cols = Columns::from_header(&header)?;

    let mut out = Vec::new();
    for (idx, row) in rows.enumerate() {
        let line = idx + 2;
        let home = cell(&row, Some(cols.home)).to_string();
        let away = cell(&row, Some(cols.away)).to_string();
        if home.is_empty() && away.is_empty() {
            continue;
        }
        out.push(MatchInput {
            home_vote: vote_cell(&row, cols.home_vote, line, "HomeVote"),
            draw_vote: vote_cell(&row, cols.draw_vote, line, "DrawVote"),
            away_vote: vote_cell(&row, cols.away_vote, line, "AwayVote"),
            home_injuries_url: optional_cell(&row, cols.home_injuries),
            away_injuries_url: optional_cell(&row, cols.away_injuries),
            home,
            away,
        });
    }
    Ok(out)
}

struct Columns {
    home: usize,
    away: usize,
    home_vote: Option<usize>,
    draw_vote: Option<usize>,
    away_vote: Option<usize>,
    home_injuries: Option<usize>,
    away_injuries: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            home: find(COL_HOME).ok_or_else(|| anyhow!("missing required column Home"))?,
            away: find(COL_AWAY).ok_or_else(|| anyhow!("missing required column Away"))?,
            home_vote: find(COL_HOME_VOTE),
            draw_vote: find(COL_DRAW_VOTE),
            away_vote: find(COL_AWAY_VOTE),
            home_injuries: find(COL_HOME_INJURIES),
            away_injuries: find(COL_AWAY_INJURIES),
        })
    }
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

fn optional_cell(row: &[String], idx: Option<usize>) -> Option<String> {
    let value = cell(row, idx);
    if value.is_empty() { None } else { Some(value.to_string()) }
}

fn vote_cell(row: &[String], idx: Option<usize>, line: usize, column: &str) -> f64 {
    let raw = cell(row, idx);
    if raw.is_empty() {
        return DEFAULT_VOTE;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            warn!(line, column, value = raw, "non-numeric vote share, using default");
            DEFAULT_VOTE
        }
    }
}

/// Minimal CSV parser: quoted fields, doubled-quote escapes, CRLF line endings.
/// Blank lines are dropped.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    row.push(field);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_and_crlf() {
        let rows = parse_rows("a,\"b,c\"\r\n\r\n\"say \"\"hi\"\"\",d", ',');
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b,c".to_string()],
                vec!["say \"hi\"".to_string(), "d".to_string()],
            ]
        );
    }

    #[test]
    fn trailing_newline_adds_no_row() {
        assert_eq!(parse_rows("x,y\n", ',').len(), 1);
    }
}
