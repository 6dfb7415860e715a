use std::collections::HashMap;

use matchpick_terminal::form::{MatchRecord, TeamForm};
use matchpick_terminal::injuries::InjuryTable;
use matchpick_terminal::pipeline::{
    AnalysisProgress, FormSource, analyze_matches, grand_total,
};
use matchpick_terminal::predict::{MatchInput, Outcome, ScoringParams};
use matchpick_terminal::retrieval::{Retrieval, RetrievalStatus};

#[derive(Default)]
struct StubSource {
    history: HashMap<String, Retrieval<Vec<MatchRecord>>>,
    injuries: HashMap<String, Retrieval<InjuryTable>>,
    history_calls: Vec<(String, u16)>,
    injury_calls: Vec<String>,
}

impl FormSource for StubSource {
    fn team_history(&mut self, team: &str, season: u16) -> Retrieval<Vec<MatchRecord>> {
        self.history_calls.push((team.to_string(), season));
        self.history.get(team).cloned().unwrap_or(Retrieval::Empty)
    }

    fn team_injuries(&mut self, team_url: &str) -> Retrieval<InjuryTable> {
        self.injury_calls.push(team_url.to_string());
        self.injuries
            .get(team_url)
            .cloned()
            .unwrap_or(Retrieval::Empty)
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn injuries(n: usize) -> InjuryTable {
    InjuryTable {
        headers: vec!["Player".to_string(), "Reason".to_string()],
        rows: (0..n)
            .map(|i| vec![format!("Player {i}"), "Knock".to_string()])
            .collect(),
    }
}

#[test]
fn sequential_pass_scores_every_match() {
    let mut source = StubSource::default();
    source.history.insert(
        "Arsenal".to_string(),
        Retrieval::Retrieved(vec![MatchRecord { xg: 2.0, xga: 0.5 }]),
    );
    source.history.insert(
        "Chelsea".to_string(),
        Retrieval::Retrieved(vec![MatchRecord { xg: 1.0, xga: 1.5 }]),
    );
    let inputs = vec![
        MatchInput::new("Arsenal", "Chelsea").with_votes(0.5, 0.2, 0.3),
        MatchInput::new("Leeds", "Burnley"),
    ];

    let mut progress: Vec<AnalysisProgress> = Vec::new();
    let rows = analyze_matches(
        &inputs,
        &mut source,
        2023,
        ScoringParams::default(),
        |p| progress.push(p),
    );

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "Arsenal vs Chelsea");
    assert_eq!(rows[0].prediction.outcome, Outcome::HomeWin);
    assert!(close(rows[0].total_score, 1.58));
    assert!(!rows[0].degraded());

    assert_eq!(rows[1].home.form, TeamForm::NEUTRAL);
    assert_eq!(rows[1].home.form_status, RetrievalStatus::Empty);
    assert_eq!(rows[1].prediction.outcome, Outcome::Draw);
    assert!(rows[1].degraded());

    assert_eq!(
        source.history_calls,
        vec![
            ("Arsenal".to_string(), 2023),
            ("Chelsea".to_string(), 2023),
            ("Leeds".to_string(), 2023),
            ("Burnley".to_string(), 2023),
        ]
    );
    assert_eq!(progress.len(), 3);
    assert_eq!(progress.last().map(|p| p.current), Some(2));
    assert!(close(grand_total(&rows), rows[0].total_score + rows[1].total_score));
}

#[test]
fn failed_fetch_degrades_to_neutral_and_reports_reason() {
    let mut source = StubSource::default();
    source.history.insert(
        "Arsenal".to_string(),
        Retrieval::Failed("request failed: timed out".to_string()),
    );
    let rows = analyze_matches(
        &[MatchInput::new("Arsenal", "Chelsea")],
        &mut source,
        2023,
        ScoringParams::default(),
        |_| {},
    );
    let home = &rows[0].home;
    assert_eq!(home.form, TeamForm::NEUTRAL);
    assert_eq!(home.form_status, RetrievalStatus::Failed);
    assert_eq!(home.form_error.as_deref(), Some("request failed: timed out"));
    assert_eq!(home.matches_used, 0);
    assert!(close(rows[0].prediction.home_score, 0.48));
}

#[test]
fn injuries_are_reported_but_not_scored() {
    let url = "https://fbref.com/en/squads/18bb7c10/Arsenal-Stats";
    let mut source = StubSource::default();
    source
        .injuries
        .insert(url.to_string(), Retrieval::Retrieved(injuries(4)));

    let plain = MatchInput::new("Arsenal", "Chelsea");
    let mut with_url = plain.clone();
    with_url.home_injuries_url = Some(url.to_string());

    let rows = analyze_matches(
        &[plain, with_url],
        &mut source,
        2023,
        ScoringParams::default(),
        |_| {},
    );
    assert_eq!(rows[0].home.absences, None);
    assert_eq!(rows[0].home.injuries_status, None);
    assert_eq!(rows[1].home.absences, Some(4));
    assert_eq!(rows[1].home.injuries_status, Some(RetrievalStatus::Retrieved));
    assert_eq!(rows[0].prediction, rows[1].prediction);
    assert_eq!(source.injury_calls, vec![url.to_string()]);
}

#[test]
fn empty_input_yields_no_rows() {
    let mut source = StubSource::default();
    let mut progress = Vec::new();
    let rows = analyze_matches(&[], &mut source, 2023, ScoringParams::default(), |p| {
        progress.push(p)
    });
    assert!(rows.is_empty());
    assert_eq!(progress.len(), 1);
    assert!(source.history_calls.is_empty());
}
