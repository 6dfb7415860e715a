use std::path::PathBuf;

use anyhow::{Context, bail};

use matchpick_terminal::config::Config;
use matchpick_terminal::export::{
    export_predictions_xlsx, predictions_to_csv, predictions_to_json,
};
use matchpick_terminal::logging::init_stderr_logging;
use matchpick_terminal::match_input::load_matches_csv;
use matchpick_terminal::pipeline::{FormService, analyze_matches};
use matchpick_terminal::predict::ScoringParams;

// Headless run of the form predictor: prints the result table as CSV (or JSON) on stdout.
fn main() -> anyhow::Result<()> {
    init_stderr_logging();
    let config = Config::load();
    config.log_warnings();

    let mut args = std::env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut xlsx: Option<PathBuf> = None;
    let mut json = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--xlsx" => {
                let path = args.next().context("--xlsx needs an output path")?;
                xlsx = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            path if input.is_none() => input = Some(PathBuf::from(path)),
            other => bail!("unexpected argument {other}"),
        }
    }
    let Some(input) = input else {
        bail!("usage: predict_csv <matches.csv> [--json] [--xlsx <out.xlsx>]");
    };

    let inputs = load_matches_csv(&input)?;
    let season = config.season;
    let mut service = FormService::new(config)?;
    let rows = analyze_matches(
        &inputs,
        &mut service,
        season,
        ScoringParams::default(),
        |progress| {
            tracing::debug!(
                current = progress.current,
                total = progress.total,
                "{}",
                progress.message
            )
        },
    );

    if json {
        println!("{}", predictions_to_json(&rows)?);
    } else {
        print!("{}", predictions_to_csv(&rows));
    }
    for row in rows.iter().filter(|r| r.degraded()) {
        eprintln!(
            "note: {} scored with home form {} / away form {}",
            row.label,
            row.home.form_status.label(),
            row.away.form_status.label()
        );
    }

    if let Some(path) = xlsx {
        let report = export_predictions_xlsx(&path, &rows)?;
        eprintln!("wrote {} rows to {}", report.rows, path.display());
    }
    Ok(())
}
