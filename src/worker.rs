use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use tracing::{info, warn};

use crate::config::Config;
use crate::pipeline::{FormService, analyze_matches};
use crate::predict::ScoringParams;
use crate::state::{Delta, ProviderCommand};

/// Run the analysis worker on its own thread. Each `Analyze` command is one sequential pass; the
/// memo cache lives for as long as the worker does.
pub fn spawn_analysis_worker(config: Config, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let season = config.season;
        let mut service = match FormService::new(config) {
            Ok(service) => service,
            Err(err) => {
                warn!("analysis worker unavailable: {err:#}");
                let _ = tx.send(Delta::Log(format!("[WARN] Analysis unavailable: {err:#}")));
                return;
            }
        };

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Analyze(inputs) => {
                    let purged = service.purge_expired();
                    if purged > 0 {
                        info!(purged, "expired memo entries dropped");
                    }
                    let _ = tx.send(Delta::AnalysisStarted {
                        total: inputs.len(),
                    });
                    let rows = analyze_matches(
                        &inputs,
                        &mut service,
                        season,
                        ScoringParams::default(),
                        |progress| {
                            let _ = tx.send(Delta::AnalysisProgress {
                                current: progress.current,
                                total: progress.total,
                                message: progress.message,
                            });
                        },
                    );
                    if tx.send(Delta::SetPredictions(rows)).is_err() {
                        return;
                    }
                }
                ProviderCommand::ClearCache => {
                    let dropped = service.cached_entries();
                    service.clear_cache();
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Cleared {dropped} cached fetches"
                    )));
                }
            }
        }
    });
}
