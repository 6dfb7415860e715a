use std::time::Instant;

use anyhow::Result;
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::fetch_cache::FetchCache;
use crate::form::{MatchRecord, TeamForm, recent_form};
use crate::http_client::http_client;
use crate::injuries::{InjuryTable, fetch_team_injuries};
use crate::predict::{MatchInput, MatchPrediction, ScoringParams, predict_match, round2};
use crate::retrieval::{Retrieval, RetrievalStatus};
use crate::understat::fetch_team_history;

/// Where recent-form and absence data come from.
pub trait FormSource {
    fn team_history(&mut self, team: &str, season: u16) -> Retrieval<Vec<MatchRecord>>;
    fn team_injuries(&mut self, team_url: &str) -> Retrieval<InjuryTable>;
}

/// HTTP-backed source memoizing results per `(team, season)` and per injuries URL.
///
/// Failed fetches are not memoized, so the next pass retries them.
pub struct FormService {
    client: &'static Client,
    config: Config,
    history: FetchCache<(String, u16), Retrieval<Vec<MatchRecord>>>,
    injuries: FetchCache<String, Retrieval<InjuryTable>>,
}

impl FormService {
    pub fn new(config: Config) -> Result<Self> {
        let client = http_client(config.http_timeout)?;
        Ok(Self {
            client,
            history: FetchCache::new(config.cache_ttl),
            injuries: FetchCache::new(config.cache_ttl),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clear_cache(&mut self) {
        self.history.clear();
        self.injuries.clear();
    }

    pub fn invalidate_team(&mut self, team: &str, season: u16) -> bool {
        self.history.invalidate(&(team.to_string(), season))
    }

    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        self.history.purge_expired(now) + self.injuries.purge_expired(now)
    }

    pub fn cached_entries(&self) -> usize {
        self.history.len() + self.injuries.len()
    }
}

impl FormSource for FormService {
    fn team_history(&mut self, team: &str, season: u16) -> Retrieval<Vec<MatchRecord>> {
        let key = (team.to_string(), season);
        if let Some(hit) = self.history.get(&key) {
            debug!(team, season, "team history memo hit");
            return hit;
        }
        let fetched = fetch_team_history(self.client, &self.config, team, season);
        if !fetched.is_failed() {
            self.history.insert(key, fetched.clone());
        }
        fetched
    }

    fn team_injuries(&mut self, team_url: &str) -> Retrieval<InjuryTable> {
        let key = team_url.to_string();
        if let Some(hit) = self.injuries.get(&key) {
            return hit;
        }
        let fetched = fetch_team_injuries(self.client, team_url);
        if !fetched.is_failed() {
            self.injuries.insert(key, fetched.clone());
        }
        fetched
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideReport {
    pub team: String,
    pub form: TeamForm,
    pub form_status: RetrievalStatus,
    pub form_error: Option<String>,
    pub matches_used: usize,
    /// Published absences; shown only, never applied to the score.
    pub absences: Option<usize>,
    pub injuries_status: Option<RetrievalStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub label: String,
    pub input: MatchInput,
    pub prediction: MatchPrediction,
    pub total_score: f64,
    pub home: SideReport,
    pub away: SideReport,
}

impl PredictionRow {
    pub fn degraded(&self) -> bool {
        self.home.form_status != RetrievalStatus::Retrieved
            || self.away.form_status != RetrievalStatus::Retrieved
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// One sequential pass over the inputs: fetch both sides, score, collect.
pub fn analyze_matches(
    inputs: &[MatchInput],
    source: &mut dyn FormSource,
    season: u16,
    params: ScoringParams,
    mut on_progress: impl FnMut(AnalysisProgress),
) -> Vec<PredictionRow> {
    let total = inputs.len();
    let mut rows = Vec::with_capacity(total);
    for (idx, input) in inputs.iter().enumerate() {
        let label = input.label();
        on_progress(AnalysisProgress {
            current: idx,
            total,
            message: format!("Fetching {label}"),
        });

        let home = side_report(
            source,
            &input.home,
            input.home_injuries_url.as_deref(),
            season,
        );
        let away = side_report(
            source,
            &input.away,
            input.away_injuries_url.as_deref(),
            season,
        );
        let prediction = predict_match(input, home.form, away.form, params);
        debug!(
            %label,
            home = prediction.home_score,
            draw = prediction.draw_score,
            away = prediction.away_score,
            pick = prediction.outcome.label(),
            "match scored"
        );
        rows.push(PredictionRow {
            label,
            input: input.clone(),
            total_score: prediction.total_score(),
            prediction,
            home,
            away,
        });
    }
    on_progress(AnalysisProgress {
        current: total,
        total,
        message: "Analysis complete".to_string(),
    });
    info!(matches = total, "analysis pass finished");
    rows
}

fn side_report(
    source: &mut dyn FormSource,
    team: &str,
    injuries_url: Option<&str>,
    season: u16,
) -> SideReport {
    let history = source.team_history(team, season);
    let form_status = history.status();
    let form_error = match &history {
        Retrieval::Failed(reason) => Some(reason.clone()),
        _ => None,
    };
    let records = history.into_value_or_default();
    let (absences, injuries_status) = match injuries_url {
        Some(url) => {
            let fetched = source.team_injuries(url);
            let status = fetched.status();
            let count = match fetched {
                Retrieval::Retrieved(table) => Some(table.absences()),
                _ => None,
            };
            (count, Some(status))
        }
        None => (None, None),
    };
    SideReport {
        team: team.to_string(),
        form: recent_form(&records),
        form_status,
        form_error,
        matches_used: records.len(),
        absences,
        injuries_status,
    }
}

/// Sum of the three reported scores across all rows.
pub fn grand_total(rows: &[PredictionRow]) -> f64 {
    round2(rows.iter().map(|r| r.total_score).sum())
}
