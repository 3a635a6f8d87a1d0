use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::Settings;
use crate::games;
use crate::hitter_temps;
use crate::mlb_api::MlbApi;
use crate::pitcher_metrics;
use crate::state::{Delta, ProviderCommand};

/// Runs fetch commands off the UI thread. Every command answers with exactly one result
/// delta, plus log lines for degraded secondary sources.
pub fn spawn_provider(settings: Settings, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let pool = build_fetch_pool(settings.fetch_parallelism);
        let api = match MlbApi::new(&settings) {
            Ok(api) => {
                let _ = tx.send(Delta::Log(format!("[INFO] Using API {}", api.base())));
                Ok(api)
            }
            Err(err) => {
                let msg = format!("http client unavailable: {err:#}");
                let _ = tx.send(Delta::Log(format!("[WARN] {msg}")));
                Err(msg)
            }
        };

        for cmd in cmd_rx.iter() {
            let tx = tx.clone();
            let api = api.clone();
            let job = move || {
                let deltas = match api {
                    Ok(api) => execute(&api, cmd),
                    Err(msg) => vec![failed(cmd, msg)],
                };
                for delta in deltas {
                    let _ = tx.send(delta);
                }
            };
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
    });
}

/// Performs one command against the API. The result delta is always last.
pub fn execute(api: &MlbApi, cmd: ProviderCommand) -> Vec<Delta> {
    let mut deltas = Vec::new();
    let result = match cmd {
        ProviderCommand::FetchTeamTemps { id, season } => Delta::SetTeamTemps {
            id,
            result: api.team_temps(season).map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::FetchPitcherMetrics { id, date } => Delta::SetPitcherMetrics {
            id,
            result: pitcher_metrics::fetch_pitcher_metrics(api, date)
                .map(|fetch| {
                    warn_all(&mut deltas, fetch.errors);
                    fetch.rows
                })
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::FetchHitterTemps { id, date } => Delta::SetHitterTemps {
            id,
            result: hitter_temps::fetch_hitter_temps(api, date).map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::FetchGames { id, date } => Delta::SetGames {
            id,
            result: games::fetch_games(api, date)
                .map(|fetch| {
                    warn_all(&mut deltas, fetch.errors);
                    (fetch.rows, fetch.context)
                })
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::FetchTeamSeries { id, team, season } => Delta::SetTeamSeries {
            id,
            result: api
                .team_temp_series(&team, season)
                .map_err(|err| format!("{err:#}")),
        },
        ProviderCommand::FetchProfitability { id } => Delta::SetProfitability {
            id,
            result: api.profitability().map_err(|err| format!("{err:#}")),
        },
    };
    deltas.push(result);
    deltas
}

/// The failure delta matching `cmd`, for when no request could be made at all.
pub fn failed(cmd: ProviderCommand, msg: String) -> Delta {
    match cmd {
        ProviderCommand::FetchTeamTemps { id, .. } => Delta::SetTeamTemps { id, result: Err(msg) },
        ProviderCommand::FetchPitcherMetrics { id, .. } => Delta::SetPitcherMetrics {
            id,
            result: Err(msg),
        },
        ProviderCommand::FetchHitterTemps { id, .. } => Delta::SetHitterTemps {
            id,
            result: Err(msg),
        },
        ProviderCommand::FetchGames { id, .. } => Delta::SetGames { id, result: Err(msg) },
        ProviderCommand::FetchTeamSeries { id, .. } => Delta::SetTeamSeries {
            id,
            result: Err(msg),
        },
        ProviderCommand::FetchProfitability { id } => Delta::SetProfitability {
            id,
            result: Err(msg),
        },
    }
}

fn warn_all(deltas: &mut Vec<Delta>, errors: Vec<String>) {
    deltas.extend(
        errors
            .into_iter()
            .map(|err| Delta::Log(format!("[WARN] {err}"))),
    );
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("mlb-fetch-{idx}"))
        .build()
        .ok()
}
