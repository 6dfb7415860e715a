use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::pipeline::PredictionRow;
use crate::predict::MatchInput;
use crate::vote_pick::{VOTE_ROWS, VoteBatch, VoteRow, analyze_vote_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Predictor,
    Votes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteField {
    Label,
    Odds,
    Votes,
}

impl VoteField {
    pub fn next(self) -> Self {
        match self {
            VoteField::Label => VoteField::Odds,
            VoteField::Odds => VoteField::Votes,
            VoteField::Votes => VoteField::Label,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            VoteField::Label => VoteField::Votes,
            VoteField::Odds => VoteField::Label,
            VoteField::Votes => VoteField::Odds,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            VoteField::Label => "Match",
            VoteField::Odds => "Odds (W,D,L)",
            VoteField::Votes => "Votes % (W,D,L)",
        }
    }
}

/// Free-text path entry for loading a match file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPrompt {
    pub buffer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStatus {
    pub running: bool,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub source_path: Option<PathBuf>,
    pub inputs: Vec<MatchInput>,
    pub predictions: Vec<PredictionRow>,
    pub selected: usize,
    pub analysis: AnalysisStatus,
    pub analyzed_at: Option<DateTime<Local>>,
    pub path_prompt: Option<PathPrompt>,
    pub vote_rows: Vec<VoteRow>,
    pub vote_row: usize,
    pub vote_field: VoteField,
    pub vote_result: Option<VoteBatch>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Predictor,
            source_path: None,
            inputs: Vec::new(),
            predictions: Vec::new(),
            selected: 0,
            analysis: AnalysisStatus::default(),
            analyzed_at: None,
            path_prompt: None,
            vote_rows: vec![VoteRow::default(); VOTE_ROWS],
            vote_row: 0,
            vote_field: VoteField::Label,
            vote_result: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn selected_prediction(&self) -> Option<&PredictionRow> {
        self.predictions.get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.predictions.len().max(self.inputs.len());
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn vote_cell(&self, row: usize, field: VoteField) -> &str {
        let Some(r) = self.vote_rows.get(row) else {
            return "";
        };
        match field {
            VoteField::Label => &r.label,
            VoteField::Odds => &r.odds,
            VoteField::Votes => &r.votes,
        }
    }

    fn vote_cell_mut(&mut self) -> Option<&mut String> {
        let field = self.vote_field;
        let r = self.vote_rows.get_mut(self.vote_row)?;
        Some(match field {
            VoteField::Label => &mut r.label,
            VoteField::Odds => &mut r.odds,
            VoteField::Votes => &mut r.votes,
        })
    }

    pub fn vote_type(&mut self, ch: char) {
        if let Some(cell) = self.vote_cell_mut() {
            cell.push(ch);
        }
    }

    pub fn vote_backspace(&mut self) {
        if let Some(cell) = self.vote_cell_mut() {
            cell.pop();
        }
    }

    pub fn vote_next_field(&mut self) {
        if self.vote_field == VoteField::Votes {
            self.vote_row = (self.vote_row + 1) % VOTE_ROWS;
        }
        self.vote_field = self.vote_field.next();
    }

    pub fn vote_prev_field(&mut self) {
        if self.vote_field == VoteField::Label {
            self.vote_row = (self.vote_row + VOTE_ROWS - 1) % VOTE_ROWS;
        }
        self.vote_field = self.vote_field.prev();
    }

    pub fn vote_down(&mut self) {
        self.vote_row = (self.vote_row + 1).min(VOTE_ROWS - 1);
    }

    pub fn vote_up(&mut self) {
        self.vote_row = self.vote_row.saturating_sub(1);
    }

    pub fn run_vote_picker(&mut self) {
        let batch = analyze_vote_rows(&self.vote_rows);
        match &batch {
            VoteBatch::Blank => self.push_log("[WARN] Vote sheet is empty"),
            VoteBatch::Picks(lines) => {
                self.push_log(format!("[INFO] Picked {} vote rows", lines.len()))
            }
        }
        self.vote_result = Some(batch);
    }

    pub fn clear_votes(&mut self) {
        self.vote_rows = vec![VoteRow::default(); VOTE_ROWS];
        self.vote_row = 0;
        self.vote_field = VoteField::Label;
        self.vote_result = None;
    }
}

/// Requests from the dashboard to the analysis worker.
#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Analyze(Vec<MatchInput>),
    ClearCache,
}

/// Updates from the analysis worker.
#[derive(Debug, Clone)]
pub enum Delta {
    AnalysisStarted { total: usize },
    AnalysisProgress { current: usize, total: usize, message: String },
    SetPredictions(Vec<PredictionRow>),
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::AnalysisStarted { total } => {
            state.analysis = AnalysisStatus {
                running: true,
                current: 0,
                total,
                message: "Starting analysis".to_string(),
            };
        }
        Delta::AnalysisProgress {
            current,
            total,
            message,
        } => {
            state.analysis.current = current;
            state.analysis.total = total;
            state.analysis.message = message;
        }
        Delta::SetPredictions(rows) => {
            let degraded = rows.iter().filter(|r| r.degraded()).count();
            if degraded > 0 {
                state.push_log(format!(
                    "[WARN] {degraded} of {} matches scored with neutral form",
                    rows.len()
                ));
            }
            state.push_log(format!("[INFO] Analysis complete: {} matches", rows.len()));
            state.predictions = rows;
            if state.selected >= state.predictions.len() {
                state.selected = state.predictions.len().saturating_sub(1);
            }
            state.analysis.running = false;
            state.analysis.message = "Analysis complete".to_string();
            state.analyzed_at = Some(Local::now());
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
