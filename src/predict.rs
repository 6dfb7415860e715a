use serde::Serialize;

use crate::form::TeamForm;

pub const DEFAULT_VOTE: f64 = 0.33;
pub const RECENT_WEIGHT: f64 = 0.7;
/// Flat availability multiplier applied to both sides. Scraped injury tables do not change it.
pub const INJURY_FACTOR: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInput {
    pub home: String,
    pub away: String,
    pub home_vote: f64,
    pub draw_vote: f64,
    pub away_vote: f64,
    pub home_injuries_url: Option<String>,
    pub away_injuries_url: Option<String>,
}

impl MatchInput {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
            home_vote: DEFAULT_VOTE,
            draw_vote: DEFAULT_VOTE,
            away_vote: DEFAULT_VOTE,
            home_injuries_url: None,
            away_injuries_url: None,
        }
    }

    pub fn with_votes(mut self, home: f64, draw: f64, away: f64) -> Self {
        self.home_vote = home;
        self.draw_vote = draw;
        self.away_vote = away;
        self
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    pub w_recent: f64,
    pub injury_factor_home: f64,
    pub injury_factor_away: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            w_recent: RECENT_WEIGHT,
            injury_factor_home: INJURY_FACTOR,
            injury_factor_away: INJURY_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::HomeWin => "home win",
            Outcome::Draw => "draw",
            Outcome::AwayWin => "away win",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchPrediction {
    pub home_score: f64,
    pub draw_score: f64,
    pub away_score: f64,
    pub outcome: Outcome,
}

impl MatchPrediction {
    pub fn total_score(&self) -> f64 {
        round2(self.home_score + self.draw_score + self.away_score)
    }
}

/// Score a match from both sides' recent form and the crowd vote shares.
///
/// The outcome is picked on the unrounded scores; only the reported scores are rounded to two
/// decimals. A side wins only with a strictly greatest score, everything else is a draw.
pub fn predict_match(
    input: &MatchInput,
    home_form: TeamForm,
    away_form: TeamForm,
    params: ScoringParams,
) -> MatchPrediction {
    let recent = 1.0 + params.w_recent;
    let home_score = ((home_form.xg + (2.0 - away_form.xga)) / 2.0 * recent)
        * input.home_vote
        * params.injury_factor_home;
    let away_score = ((away_form.xg + (2.0 - home_form.xga)) / 2.0 * recent)
        * input.away_vote
        * params.injury_factor_away;
    let draw_score = ((home_score + away_score) / 2.0) * input.draw_vote;

    let outcome = if home_score > away_score.max(draw_score) {
        Outcome::HomeWin
    } else if away_score > home_score.max(draw_score) {
        Outcome::AwayWin
    } else {
        Outcome::Draw
    };

    MatchPrediction {
        home_score: round2(home_score),
        draw_score: round2(draw_score),
        away_score: round2(away_score),
        outcome,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
