/// Number of rows on the vote sheet.
pub const VOTE_ROWS: usize = 14;
/// A vote share at or above this percentage is a single pick.
pub const DECISIVE_THRESHOLD: f64 = 70.0;

pub const BLANK_BATCH_WARNING: &str = "Enter match data first";

/// Win/draw/loss from the home side's point of view, in the order votes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Win,
    Draw,
    Loss,
}

impl VoteOutcome {
    const ORDER: [VoteOutcome; 3] = [VoteOutcome::Win, VoteOutcome::Draw, VoteOutcome::Loss];

    pub fn label(self) -> &'static str {
        match self {
            VoteOutcome::Win => "win",
            VoteOutcome::Draw => "draw",
            VoteOutcome::Loss => "loss",
        }
    }
}

/// One row of free-text input. The odds text is carried along but never read by the picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteRow {
    pub label: String,
    pub odds: String,
    pub votes: String,
}

impl VoteRow {
    pub fn new(label: impl Into<String>, odds: impl Into<String>, votes: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            odds: odds.into(),
            votes: votes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VotePick {
    Decisive(VoteOutcome),
    ConsiderMultiple,
    DataError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VotePickLine {
    pub label: String,
    pub pick: VotePick,
}

impl VotePickLine {
    pub fn message(&self) -> String {
        match self.pick {
            VotePick::Decisive(outcome) => {
                format!("{} -> single pick ({})", self.label, outcome.label())
            }
            VotePick::ConsiderMultiple => format!("{} -> consider multiple outcomes", self.label),
            VotePick::DataError => format!("{} -> data error", self.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoteBatch {
    /// Every match label was blank; nothing was evaluated.
    Blank,
    Picks(Vec<VotePickLine>),
}

impl VoteBatch {
    pub fn messages(&self) -> Vec<String> {
        match self {
            VoteBatch::Blank => vec![BLANK_BATCH_WARNING.to_string()],
            VoteBatch::Picks(lines) => lines.iter().map(VotePickLine::message).collect(),
        }
    }
}

/// Parse `"win,draw,loss"` percentages. Exactly three finite numbers are accepted.
pub fn parse_votes(raw: &str) -> Option<[f64; 3]> {
    let mut out = [0.0; 3];
    let mut parts = raw.split(',');
    for slot in &mut out {
        let value = parts.next()?.trim().parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Highest share wins, first of win/draw/loss on ties; below the threshold nothing is picked.
pub fn pick_for_votes(votes: [f64; 3]) -> VotePick {
    let mut best = 0usize;
    for (idx, value) in votes.iter().enumerate().skip(1) {
        if *value > votes[best] {
            best = idx;
        }
    }
    if votes[best] >= DECISIVE_THRESHOLD {
        VotePick::Decisive(VoteOutcome::ORDER[best])
    } else {
        VotePick::ConsiderMultiple
    }
}

pub fn pick_row(row: &VoteRow) -> VotePickLine {
    let pick = match parse_votes(&row.votes) {
        Some(votes) => pick_for_votes(votes),
        None => VotePick::DataError,
    };
    VotePickLine {
        label: row.label.clone(),
        pick,
    }
}

pub fn analyze_vote_rows(rows: &[VoteRow]) -> VoteBatch {
    if rows.iter().all(|row| row.label.trim().is_empty()) {
        return VoteBatch::Blank;
    }
    VoteBatch::Picks(rows.iter().map(pick_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_arity_rejected() {
        assert_eq!(parse_votes("80,20"), None);
        assert_eq!(parse_votes("80,10,5,5"), None);
        assert_eq!(parse_votes(""), None);
    }

    #[test]
    fn whitespace_tolerated() {
        assert_eq!(parse_votes(" 80 , 10,10 "), Some([80.0, 10.0, 10.0]));
    }

    #[test]
    fn non_finite_rejected() {
        assert_eq!(parse_votes("nan,10,10"), None);
        assert_eq!(parse_votes("inf,10,10"), None);
    }
}
