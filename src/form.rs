use serde::Serialize;

/// Number of most recent matches that feed a team's form.
pub const RECENT_MATCHES: usize = 5;

/// One observed match from a team's point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRecord {
    pub xg: f64,
    pub xga: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamForm {
    pub xg: f64,
    pub xga: f64,
}

impl TeamForm {
    /// Used whenever a team has no retrievable history.
    pub const NEUTRAL: TeamForm = TeamForm { xg: 1.0, xga: 1.0 };
}

impl Default for TeamForm {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Mean xG/xGA over the given records, or the neutral form when there are none.
///
/// Callers hand in at most [`RECENT_MATCHES`] records; longer slices are averaged as given.
pub fn recent_form(history: &[MatchRecord]) -> TeamForm {
    if history.is_empty() {
        return TeamForm::NEUTRAL;
    }
    let n = history.len() as f64;
    let xg = history.iter().map(|m| m.xg).sum::<f64>() / n;
    let xga = history.iter().map(|m| m.xga).sum::<f64>() / n;
    TeamForm { xg, xga }
}

/// Keep only the last [`RECENT_MATCHES`] entries of a chronologically ordered history.
pub fn most_recent<T>(mut history: Vec<T>) -> Vec<T> {
    if history.len() > RECENT_MATCHES {
        history.drain(..history.len() - RECENT_MATCHES);
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_recent_keeps_tail() {
        let kept = most_recent((1..=8).collect::<Vec<_>>());
        assert_eq!(kept, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn most_recent_short_history_untouched() {
        assert_eq!(most_recent(vec![1, 2]), vec![1, 2]);
    }
}
