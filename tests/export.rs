use matchpick_terminal::export::{
    export_predictions_xlsx, predictions_to_csv, predictions_to_json,
};
use matchpick_terminal::pipeline::analyze_matches;
use matchpick_terminal::pipeline::FormSource;
use matchpick_terminal::form::MatchRecord;
use matchpick_terminal::injuries::InjuryTable;
use matchpick_terminal::predict::{MatchInput, ScoringParams};
use matchpick_terminal::retrieval::Retrieval;

struct NoData;

impl FormSource for NoData {
    fn team_history(&mut self, _team: &str, _season: u16) -> Retrieval<Vec<MatchRecord>> {
        Retrieval::Empty
    }

    fn team_injuries(&mut self, _team_url: &str) -> Retrieval<InjuryTable> {
        Retrieval::Empty
    }
}

fn rows() -> Vec<matchpick_terminal::pipeline::PredictionRow> {
    analyze_matches(
        &[
            MatchInput::new("Arsenal", "Chelsea"),
            MatchInput::new("Brighton, Hove", "Spurs").with_votes(0.8, 0.1, 0.1),
        ],
        &mut NoData,
        2023,
        ScoringParams::default(),
        |_| {},
    )
}

#[test]
fn csv_table_has_result_columns() {
    let csv = predictions_to_csv(&rows());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Match,Home_Score,Draw_Score,Away_Score,Prediction,TotalScore"
    );
    assert_eq!(lines[1], "Arsenal vs Chelsea,0.48,0.16,0.48,draw,1.12");
    assert!(lines[2].starts_with("\"Brighton, Hove vs Spurs\","));
    assert!(lines[2].contains(",home win,"));
}

#[test]
fn xlsx_export_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("predictions.xlsx");
    let report = export_predictions_xlsx(&path, &rows()).expect("export should succeed");
    assert_eq!(report.rows, 2);
    let meta = std::fs::metadata(&path).expect("workbook should exist");
    assert!(meta.len() > 0);
}

#[test]
fn json_dump_carries_side_status() {
    let json = predictions_to_json(&rows()).expect("rows should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let first = &value[0];
    assert_eq!(first["label"], "Arsenal vs Chelsea");
    assert_eq!(first["prediction"]["outcome"], "draw");
    assert_eq!(first["total_score"], 1.12);
    assert_eq!(first["home"]["form_status"], "empty");
    assert_eq!(first["home"]["form"]["xg"], 1.0);
    assert_eq!(value[1]["prediction"]["outcome"], "home_win");
}
