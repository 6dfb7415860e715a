use anyhow::{Context, Result};
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::form::{MatchRecord, most_recent};
use crate::http_client::fetch_text;
use crate::retrieval::Retrieval;

const HISTORY_MARKER: &str = "\"history\"";

/// Team page on the statistics source, e.g. `https://understat.com/team/Manchester_City/2023`.
pub fn stats_page_url(stats_url: &str, team: &str, season: u16) -> String {
    let slug = team.trim().replace(' ', "_");
    format!("{}/{}/{}", stats_url.trim_end_matches('/'), slug, season)
}

/// URL actually requested: the team page itself, or the proxy wrapping it.
pub fn request_url(config: &Config, team: &str, season: u16) -> Result<String> {
    let target = stats_page_url(&config.stats_url, team, season);
    match config.proxy_url.as_deref() {
        Some(proxy) => {
            let url = Url::parse_with_params(proxy, &[("url", target.as_str())])
                .with_context(|| format!("invalid proxy url {proxy}"))?;
            Ok(url.to_string())
        }
        None => Ok(target),
    }
}

/// Fetch the most recent match records for a team. Never fails; errors become `Failed`.
pub fn fetch_team_history(
    client: &Client,
    config: &Config,
    team: &str,
    season: u16,
) -> Retrieval<Vec<MatchRecord>> {
    if team.trim().is_empty() {
        return Retrieval::Empty;
    }
    let result = fetch_history_inner(client, config, team, season);
    if let Err(err) = &result {
        warn!(team, season, "team history fetch failed: {err:#}");
    }
    Retrieval::from_result(result.map(|records| {
        debug!(team, season, records = records.len(), "team history fetched");
        if records.is_empty() { None } else { Some(records) }
    }))
}

fn fetch_history_inner(
    client: &Client,
    config: &Config,
    team: &str,
    season: u16,
) -> Result<Vec<MatchRecord>> {
    let url = request_url(config, team, season)?;
    let body = fetch_text(client, &url).context("team history request failed")?;
    let page = if config.proxy_url.is_some() {
        unwrap_proxy_body(&body)?
    } else {
        body
    };
    parse_history(&page)
}

/// The proxy answers `{"contents": "<page>", ...}`.
pub fn unwrap_proxy_body(raw: &str) -> Result<String> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid proxy json")?;
    Ok(root
        .get("contents")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string())
}

/// Pull the embedded `"history"` array out of a team page and keep the last five matches.
///
/// A page without the marker has no history and yields an empty list.
pub fn parse_history(page: &str) -> Result<Vec<MatchRecord>> {
    let Some(marker) = page.find(HISTORY_MARKER) else {
        return Ok(Vec::new());
    };
    let start = page[marker..]
        .find('[')
        .map(|i| marker + i)
        .context("history array start not found")?;
    let end = page[start..]
        .find(']')
        .map(|i| start + i + 1)
        .context("history array end not found")?;

    let entries: Vec<Value> =
        serde_json::from_str(&page[start..end]).context("invalid history json")?;
    let records = entries.iter().filter_map(parse_record).collect();
    Ok(most_recent(records))
}

fn parse_record(v: &Value) -> Option<MatchRecord> {
    Some(MatchRecord {
        xg: number_field(v, "xG")?,
        xga: number_field(v, "xGA")?,
    })
}

fn number_field(v: &Value, key: &str) -> Option<f64> {
    let value = match v.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|x| x.is_finite())
}
