use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchpick_terminal::form::{MatchRecord, recent_form};
use matchpick_terminal::injuries::parse_injuries_table;
use matchpick_terminal::match_input::parse_matches_csv;
use matchpick_terminal::predict::{MatchInput, ScoringParams, predict_match};
use matchpick_terminal::understat::parse_history;
use matchpick_terminal::vote_pick::{VOTE_ROWS, VoteRow, analyze_vote_rows};

fn history_page(entries: usize) -> String {
    let items: Vec<String> = (0..entries)
        .map(|i| {
            format!(
                r#"{{"h_a":"h","xG":{:.2},"xGA":{:.2},"scored":1,"missed":1}}"#,
                1.0 + (i % 7) as f64 * 0.1,
                0.8 + (i % 5) as f64 * 0.1
            )
        })
        .collect();
    format!(
        "<script>var datesData = {{\"history\":[{}]}};</script>",
        items.join(",")
    )
}

fn injuries_page(rows: usize) -> String {
    let body: String = (0..rows)
        .map(|i| format!("<tr><th scope=\"row\"><a href=\"/p/{i}\">Player {i}</a></th><td>Knock</td><td>Soon</td></tr>"))
        .collect();
    format!(
        "<table id=\"injuries\"><thead><tr><th>Player</th><th>Reason</th><th>Return</th></tr></thead><tbody>{body}</tbody></table>"
    )
}

fn bench_scoring(c: &mut Criterion) {
    let history: Vec<MatchRecord> = (0..5)
        .map(|i| MatchRecord {
            xg: 1.0 + i as f64 * 0.2,
            xga: 1.4 - i as f64 * 0.1,
        })
        .collect();
    let input = MatchInput::new("Arsenal", "Chelsea").with_votes(0.5, 0.25, 0.25);
    c.bench_function("predict_match", |b| {
        b.iter(|| {
            let home = recent_form(black_box(&history));
            let away = recent_form(black_box(&history[..2]));
            predict_match(black_box(&input), home, away, ScoringParams::default())
        })
    });
}

fn bench_parsers(c: &mut Criterion) {
    let page = history_page(38);
    c.bench_function("parse_history_38", |b| {
        b.iter(|| parse_history(black_box(&page)).expect("valid history"))
    });

    let injuries = injuries_page(25);
    c.bench_function("parse_injuries_25", |b| {
        b.iter(|| parse_injuries_table(black_box(&injuries)))
    });

    let mut csv = String::from("Home,Away,HomeVote,DrawVote,AwayVote\n");
    for i in 0..200 {
        csv.push_str(&format!("Home {i},Away {i},0.4,0.3,0.3\n"));
    }
    c.bench_function("parse_matches_csv_200", |b| {
        b.iter(|| parse_matches_csv(black_box(&csv)).expect("valid csv"))
    });

    let rows: Vec<VoteRow> = (0..VOTE_ROWS)
        .map(|i| VoteRow::new(format!("Match {i}"), "1.8,3.4,4.2", "72,18,10"))
        .collect();
    c.bench_function("analyze_vote_rows", |b| {
        b.iter(|| analyze_vote_rows(black_box(&rows)))
    });
}

criterion_group!(benches, bench_scoring, bench_parsers);
criterion_main!(benches);
