use std::fs;
use std::path::PathBuf;

use matchpick_terminal::form::recent_form;
use matchpick_terminal::injuries::parse_injuries_table;
use matchpick_terminal::match_input::{load_matches_csv, parse_matches_csv};
use matchpick_terminal::understat::{parse_history, unwrap_proxy_body};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn history_keeps_last_five_matches() {
    let page = read_fixture("understat_team.html");
    let history = parse_history(&page).expect("fixture should parse");
    assert_eq!(history.len(), 5);
    assert!(close(history[0].xg, 1.5));
    assert!(close(history[0].xga, 0.9));
    assert!(close(history[4].xg, 1.4));

    let form = recent_form(&history);
    assert!(close(form.xg, 1.6));
    assert!(close(form.xga, 1.0));
}

#[test]
fn history_through_proxy_envelope() {
    let page = read_fixture("understat_team.html");
    let body = serde_json::json!({ "contents": page, "status": { "http_code": 200 } }).to_string();
    let unwrapped = unwrap_proxy_body(&body).expect("proxy json should parse");
    assert_eq!(parse_history(&unwrapped).expect("page should parse").len(), 5);
}

#[test]
fn proxy_envelope_without_contents_is_empty_page() {
    let unwrapped = unwrap_proxy_body(r#"{"contents": null}"#).expect("valid json");
    assert!(unwrapped.is_empty());
    assert!(parse_history(&unwrapped).expect("empty page").is_empty());
}

#[test]
fn page_without_history_is_empty() {
    let page = read_fixture("understat_no_history.html");
    assert!(parse_history(&page).expect("no marker is not an error").is_empty());
}

#[test]
fn broken_history_json_is_an_error() {
    assert!(parse_history(r#"var x = {"history":[{"xG": 1.0, "xGA": }]}"#).is_err());
    assert!(parse_history(r#""history" but no array"#).is_err());
}

#[test]
fn injuries_table_extracted() {
    let page = read_fixture("fbref_injuries.html");
    let table = parse_injuries_table(&page).expect("injuries table should be found");
    assert_eq!(table.headers, vec!["Player", "Reason", "Expected Return"]);
    assert_eq!(table.absences(), 3);
    assert_eq!(table.rows[1], vec!["Thomas Partey", "Thigh", "November"]);
    assert_eq!(table.rows[0][1], "ACL injury");
}

#[test]
fn injuries_table_missing() {
    let page = read_fixture("understat_no_history.html");
    assert!(parse_injuries_table(&page).is_none());
}

#[test]
fn matches_csv_fixture() {
    let matches = load_matches_csv(&fixture_path("matches.csv")).expect("fixture should load");
    assert_eq!(matches.len(), 4);

    assert_eq!(matches[0].home, "Arsenal");
    assert_eq!(matches[0].away, "Chelsea");
    assert!(close(matches[0].home_vote, 0.55));
    assert!(close(matches[0].draw_vote, 0.25));
    assert!(close(matches[0].away_vote, 0.20));

    assert_eq!(matches[1].home, "Manchester City");
    assert!(close(matches[1].home_vote, 0.33));
    assert!(close(matches[1].away_vote, 0.35));

    // Non-numeric share falls back to the default.
    assert!(close(matches[2].home_vote, 0.33));
    assert_eq!(matches[3].away, "Wolverhampton Wanderers");
}

#[test]
fn vote_columns_are_optional() {
    let matches = parse_matches_csv("home,AWAY\nLeeds,Burnley\n").expect("valid csv");
    assert_eq!(matches.len(), 1);
    assert!(close(matches[0].home_vote, 0.33));
    assert!(close(matches[0].draw_vote, 0.33));
    assert!(close(matches[0].away_vote, 0.33));
    assert_eq!(matches[0].home_injuries_url, None);
}

#[test]
fn injuries_url_columns_are_read() {
    let csv = "Home,Away,HomeInjuriesUrl\nArsenal,Chelsea,https://fbref.com/en/squads/18bb7c10/Arsenal-Stats\n";
    let matches = parse_matches_csv(csv).expect("valid csv");
    assert_eq!(
        matches[0].home_injuries_url.as_deref(),
        Some("https://fbref.com/en/squads/18bb7c10/Arsenal-Stats")
    );
    assert_eq!(matches[0].away_injuries_url, None);
}

#[test]
fn missing_required_column_is_rejected() {
    let err = parse_matches_csv("Home,HomeVote\nArsenal,0.5\n").expect_err("Away is required");
    assert!(format!("{err:#}").contains("Away"));
    assert!(parse_matches_csv("").is_err());
}
