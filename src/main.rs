use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState,
};
use tracing::{info, warn};

use matchpick_terminal::config::Config;
use matchpick_terminal::export::export_predictions_xlsx;
use matchpick_terminal::logging::init_file_logging;
use matchpick_terminal::match_input::load_matches_csv;
use matchpick_terminal::pipeline::grand_total;
use matchpick_terminal::predict::{MatchPrediction, Outcome};
use matchpick_terminal::state::{
    AppState, Delta, PathPrompt, ProviderCommand, Screen, VoteField, apply_delta,
};
use matchpick_terminal::vote_pick::{VOTE_ROWS, VoteBatch, VotePick};
use matchpick_terminal::worker::spawn_analysis_worker;

struct App {
    state: AppState,
    config: Config,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: Config, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            config,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::F(1) => {
                self.state.screen = Screen::Predictor;
                return;
            }
            KeyCode::F(2) => {
                self.state.screen = Screen::Votes;
                return;
            }
            _ => {}
        }
        if self.state.path_prompt.is_some() {
            self.on_prompt_key(key);
            return;
        }
        match self.state.screen {
            Screen::Predictor => self.on_predictor_key(key),
            Screen::Votes => self.on_votes_key(key),
        }
    }

    fn on_predictor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Predictor,
            KeyCode::Char('2') => self.state.screen = Screen::Votes,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('o') => {
                let buffer = self
                    .state
                    .source_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.state.path_prompt = Some(PathPrompt { buffer });
            }
            KeyCode::Char('r') => self.request_analysis(),
            KeyCode::Char('c') => self.send(ProviderCommand::ClearCache),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_votes_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.state.screen = Screen::Predictor,
            KeyCode::Char('l') if ctrl => self.state.clear_votes(),
            KeyCode::Tab | KeyCode::Right => self.state.vote_next_field(),
            KeyCode::BackTab | KeyCode::Left => self.state.vote_prev_field(),
            KeyCode::Down => self.state.vote_down(),
            KeyCode::Up => self.state.vote_up(),
            KeyCode::Backspace => self.state.vote_backspace(),
            KeyCode::Enter => self.state.run_vote_picker(),
            KeyCode::Char(ch) if !ctrl => self.state.vote_type(ch),
            _ => {}
        }
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.state.path_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.path_prompt = None,
            KeyCode::Backspace => {
                prompt.buffer.pop();
            }
            KeyCode::Char(ch) => prompt.buffer.push(ch),
            KeyCode::Enter => {
                let raw = prompt.buffer.trim().to_string();
                self.state.path_prompt = None;
                if raw.is_empty() {
                    self.state.push_log("[WARN] No match file given");
                } else {
                    self.load_file(PathBuf::from(raw));
                }
            }
            _ => {}
        }
    }

    fn load_file(&mut self, path: PathBuf) {
        match load_matches_csv(&path) {
            Ok(inputs) => {
                info!(path = %path.display(), matches = inputs.len(), "match file loaded");
                self.state
                    .push_log(format!("[INFO] Loaded {} matches from {}", inputs.len(), path.display()));
                self.state.inputs = inputs;
                self.state.predictions.clear();
                self.state.selected = 0;
                self.state.source_path = Some(path);
                self.request_analysis();
            }
            Err(err) => {
                warn!("match file rejected: {err:#}");
                self.state.push_log(format!("[WARN] {err:#}"));
            }
        }
    }

    fn request_analysis(&mut self) {
        if self.state.inputs.is_empty() {
            self.state.push_log("[WARN] Load a match file first (o)");
            return;
        }
        if self.state.analysis.running {
            self.state.push_log("[INFO] Analysis already running");
            return;
        }
        self.send(ProviderCommand::Analyze(self.state.inputs.clone()));
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Analysis worker unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Analysis worker stopped");
        }
    }

    fn export(&mut self) {
        if self.state.predictions.is_empty() {
            self.state.push_log("[WARN] Nothing to export yet");
            return;
        }
        let path = self.config.export_path.clone();
        match export_predictions_xlsx(&path, &self.state.predictions) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} rows to {}",
                report.rows,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let _log_guard = match config.log_file_or_default() {
        Some(path) => init_file_logging(&path).ok(),
        None => None,
    };
    config.log_warnings();
    info!(season = config.season, "starting dashboard");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_analysis_worker(config.clone(), tx, cmd_rx);

    let mut app = App::new(config, Some(cmd_tx));
    for msg in app.config.warnings.clone() {
        app.state.push_log(format!("[WARN] {msg}"));
    }
    if let Some(path) = std::env::args().nth(1) {
        app.load_file(PathBuf::from(path));
    }
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state, &app.config))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Predictor => render_predictor(frame, chunks[1], &app.state),
        Screen::Votes => render_votes(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if let Some(prompt) = &app.state.path_prompt {
        render_path_prompt(frame, frame.size(), prompt);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState, config: &Config) -> String {
    let title = match state.screen {
        Screen::Predictor => {
            let source = state
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "no file".to_string());
            format!("MATCHPICK | FORM PREDICTOR | {source} | Season {}", config.season)
        }
        Screen::Votes => format!("MATCHPICK | VOTE PICKER | {VOTE_ROWS} rows"),
    };
    let status = if state.analysis.running {
        format!(
            "Analyzing {}/{}: {}",
            state.analysis.current, state.analysis.total, state.analysis.message
        )
    } else if let Some(at) = state.analyzed_at {
        format!(
            "Last run {} | {} matches | total score {:.2}",
            at.format("%H:%M:%S"),
            state.predictions.len(),
            grand_total(&state.predictions)
        )
    } else {
        "Idle".to_string()
    };
    format!("{title}\n{status}")
}

fn footer_text(state: &AppState) -> String {
    if state.path_prompt.is_some() {
        return "Enter Load | Esc Cancel".to_string();
    }
    match state.screen {
        Screen::Predictor => {
            "1 Predictor | 2 Votes | o Open CSV | r Rerun | c Clear cache | x Export | j/k Move | ? Help | q Quit".to_string()
        }
        Screen::Votes => {
            "F1 Predictor | Tab/←/→ Field | ↑/↓ Row | Enter Pick | Ctrl-L Clear | Esc Back".to_string()
        }
    }
}

fn render_predictor(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(34)])
        .split(rows[1]);

    render_inputs_table(frame, top[0], state);
    render_results_table(frame, top[1], state);
    render_score_chart(frame, bottom[0], state);

    let detail = Paragraph::new(detail_text(state))
        .block(Block::default().title("Detail").borders(Borders::ALL));
    frame.render_widget(detail, bottom[1]);
}

fn render_inputs_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Input").borders(Borders::ALL);
    if state.inputs.is_empty() {
        let empty = Paragraph::new("Open a CSV with Home, Away[, HomeVote, DrawVote, AwayVote]")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }
    let header = Row::new(["Home", "Away", "H", "D", "A"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let body = state.inputs.iter().map(|m| {
        Row::new([
            Cell::from(m.home.clone()),
            Cell::from(m.away.clone()),
            Cell::from(format!("{:.2}", m.home_vote)),
            Cell::from(format!("{:.2}", m.draw_vote)),
            Cell::from(format!("{:.2}", m.away_vote)),
        ])
    });
    let widths = [
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
    ];
    let table = Table::new(body, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_results_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Result").borders(Borders::ALL);
    if state.predictions.is_empty() {
        let msg = if state.analysis.running {
            "Fetching recent form..."
        } else {
            "No predictions yet"
        };
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }
    let header = Row::new(["Match", "Home", "Draw", "Away", "Prediction", "Total"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let body = state.predictions.iter().map(|r| {
        let p = &r.prediction;
        let mark = if r.degraded() { "*" } else { "" };
        Row::new([
            Cell::from(format!("{}{mark}", r.label)),
            Cell::from(format!("{:.2}", p.home_score)),
            Cell::from(format!("{:.2}", p.draw_score)),
            Cell::from(format!("{:.2}", p.away_score)),
            Cell::from(p.outcome.label()).style(outcome_style(p.outcome)),
            Cell::from(format!("{:.2}", r.total_score)),
        ])
    });
    let widths = [
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(6),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().fg(Color::White).bg(Color::DarkGray));
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_score_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Home / Draw / Away score")
        .borders(Borders::ALL);
    if state.predictions.is_empty() {
        frame.render_widget(block, area);
        return;
    }
    let mut chart = BarChart::default()
        .block(block)
        .bar_width(BAR_WIDTH)
        .bar_gap(0)
        .group_gap(3);
    for row in &state.predictions {
        chart = chart.data(score_group(&row.label, &row.prediction));
    }
    frame.render_widget(chart, area);
}

const BAR_WIDTH: u16 = 5;

/// Three bars per match; the bar of the picked outcome carries the pick as its label.
fn score_group(label: &str, p: &MatchPrediction) -> BarGroup<'static> {
    let bars: Vec<Bar<'static>> = [
        (p.home_score, Color::Blue, Outcome::HomeWin),
        (p.draw_score, Color::Gray, Outcome::Draw),
        (p.away_score, Color::Red, Outcome::AwayWin),
    ]
    .into_iter()
    .map(|(score, color, outcome)| {
        let mut style = Style::default().fg(color);
        let mut bar = Bar::default()
            .value((score * 100.0).round().max(0.0) as u64)
            .text_value(format!("{score:.2}"));
        if outcome == p.outcome {
            style = style.add_modifier(Modifier::BOLD);
            bar = bar.label(Line::from(p.outcome.label()));
        } else {
            bar = bar.label(Line::from(short_outcome(outcome)));
        }
        bar.style(style)
    })
    .collect();
    BarGroup::default()
        .label(Line::from(short_match(label)))
        .bars(&bars)
}

fn short_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::HomeWin => "H",
        Outcome::Draw => "D",
        Outcome::AwayWin => "A",
    }
}

fn short_match(label: &str) -> String {
    const MAX: usize = 17;
    if label.chars().count() <= MAX {
        return label.to_string();
    }
    let cut: String = label.chars().take(MAX - 1).collect();
    format!("{cut}…")
}

fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::HomeWin => Style::default().fg(Color::Blue),
        Outcome::Draw => Style::default().fg(Color::Gray),
        Outcome::AwayWin => Style::default().fg(Color::Red),
    }
}

fn detail_text(state: &AppState) -> String {
    let Some(row) = state.selected_prediction() else {
        return "No match selected".to_string();
    };
    let mut lines = vec![row.label.clone(), String::new()];
    for (side, report) in [("Home", &row.home), ("Away", &row.away)] {
        lines.push(format!(
            "{side}: xG {:.2} xGA {:.2}",
            report.form.xg, report.form.xga
        ));
        lines.push(format!(
            "  form: {} ({} matches)",
            report.form_status.label(),
            report.matches_used
        ));
        match (report.absences, report.injuries_status) {
            (Some(n), _) => lines.push(format!("  absences: {n} (not applied)")),
            (None, Some(status)) => lines.push(format!("  absences: {}", status.label())),
            (None, None) => {}
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Votes H/D/A: {:.2}/{:.2}/{:.2}",
        row.input.home_vote, row.input.draw_vote, row.input.away_vote
    ));
    lines.push(format!("Pick: {}", row.prediction.outcome.label()));
    lines.join("\n")
}

fn render_votes(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let header = Row::new([
        "#",
        VoteField::Label.title(),
        VoteField::Odds.title(),
        VoteField::Votes.title(),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let body = (0..VOTE_ROWS).map(|idx| {
        let cells = [VoteField::Label, VoteField::Odds, VoteField::Votes].map(|field| {
            let text = state.vote_cell(idx, field).to_string();
            let editing = idx == state.vote_row && field == state.vote_field;
            if editing {
                Cell::from(format!("{text}_"))
                    .style(Style::default().fg(Color::Black).bg(Color::Yellow))
            } else {
                Cell::from(text)
            }
        });
        let mut row = vec![Cell::from(format!("{}", idx + 1))];
        row.extend(cells);
        Row::new(row)
    });
    let widths = [
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(16),
        Constraint::Length(16),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().title("Vote sheet").borders(Borders::ALL));
    frame.render_widget(table, cols[0]);

    let picks = Paragraph::new(vote_result_lines(state))
        .block(Block::default().title("Picks").borders(Borders::ALL));
    frame.render_widget(picks, cols[1]);
}

fn vote_result_lines(state: &AppState) -> Vec<Line<'static>> {
    let Some(batch) = &state.vote_result else {
        return vec![Line::from("Press Enter to analyze")];
    };
    match batch {
        VoteBatch::Blank => vec![Line::styled(
            batch.messages().join(""),
            Style::default().fg(Color::Yellow),
        )],
        VoteBatch::Picks(lines) => lines
            .iter()
            .map(|line| {
                let style = match line.pick {
                    VotePick::Decisive(_) => Style::default().fg(Color::Green),
                    VotePick::ConsiderMultiple => Style::default(),
                    VotePick::DataError => Style::default().fg(Color::Red),
                };
                Line::styled(line.message(), style)
            })
            .collect(),
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_path_prompt(frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
    let popup = centered_rect(60, 20, area);
    frame.render_widget(Clear, popup);
    let input = Paragraph::new(format!("{}_", prompt.buffer))
        .block(Block::default().title("Match CSV path").borders(Borders::ALL));
    frame.render_widget(input, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Matchpick - Help",
        "",
        "Predictor:",
        "  o            Open match CSV",
        "  r            Rerun analysis",
        "  c            Clear fetch cache",
        "  x            Export predictions (xlsx)",
        "  j/k or ↑/↓   Select match",
        "  2 / F2       Vote picker",
        "  q            Quit",
        "",
        "Vote picker:",
        "  Tab / ←/→    Next/previous field",
        "  ↑/↓          Row",
        "  Enter        Analyze votes",
        "  Ctrl-L       Clear sheet",
        "  Esc / F1     Back",
        "",
        "* after a match: scored with neutral form",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
