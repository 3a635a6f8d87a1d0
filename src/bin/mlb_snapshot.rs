use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use mlb_terminal::config::{Settings, parse_date};
use mlb_terminal::games::{self, GameRow};
use mlb_terminal::hitter_temps::{self, HitterRow};
use mlb_terminal::mlb_api::MlbApi;
use mlb_terminal::pitcher_metrics::{self, PitcherMatchupRow};
use mlb_terminal::profitability;
use mlb_terminal::records::{ProfitabilityLine, TeamTemp};
use mlb_terminal::series::{MetricSelector, project};
use mlb_terminal::table_view::{TableRow, TableView};
use mlb_terminal::team_temps;

const USAGE: &str = "usage: mlb_snapshot <teams|pitchers|hitters|games|profitability|series> \
[--date=YYYY-MM-DD] [--season=N] [--team=CODE] [--sort=KEY] [--filter=TEXT] [--limit=N] [--json]";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut settings = Settings::from_env();
    if let Some(raw) = parse_str_arg("date") {
        settings.date = parse_date(&raw).with_context(|| format!("invalid --date {raw}"))?;
    }
    if let Some(season) = parse_str_arg("season").and_then(|raw| raw.parse::<i32>().ok()) {
        settings.season = season;
    }
    let opts = Options {
        sort: parse_str_arg("sort"),
        filter: parse_str_arg("filter"),
        limit: parse_str_arg("limit").and_then(|raw| raw.parse::<usize>().ok()),
        json: has_flag("json"),
    };

    let view = std::env::args()
        .nth(1)
        .filter(|arg| !arg.starts_with("--"))
        .ok_or_else(|| anyhow!(USAGE))?;
    let api = MlbApi::new(&settings)?;
    let date = settings.date;

    match view.as_str() {
        "teams" => {
            let rows: Vec<TeamTemp> = api.team_temps(settings.season)?;
            emit(team_temps::team_temps_view(rows), &opts)
        }
        "pitchers" => {
            let fetch = pitcher_metrics::fetch_pitcher_metrics(&api, date)?;
            warn_all(&fetch.errors);
            let rows: Vec<PitcherMatchupRow> = fetch.rows;
            emit(pitcher_metrics::pitcher_metrics_view(rows), &opts)
        }
        "hitters" => {
            let rows: Vec<HitterRow> = hitter_temps::fetch_hitter_temps(&api, date)?;
            emit(hitter_temps::hitter_temps_view(rows), &opts)
        }
        "games" => {
            let fetch = games::fetch_games(&api, date)?;
            warn_all(&fetch.errors);
            let rows: Vec<GameRow> = fetch.rows;
            if !opts.json {
                for row in &rows {
                    println!("{}  {}", row.game.time, row.matchup);
                    println!("    {}", row.pitcher_card(false));
                    println!("    {}", row.pitcher_card(true));
                }
                println!();
            }
            emit(games::games_view(rows), &opts)
        }
        "profitability" => {
            let rows: Vec<ProfitabilityLine> = api.profitability()?;
            emit(profitability::profitability_view(rows), &opts)
        }
        "series" => {
            let team = parse_str_arg("team").unwrap_or_else(|| "PHI".to_string());
            let records = api.team_temp_series(&team, settings.season)?;
            for metric in MetricSelector::ALL {
                let projection = project(&records, metric);
                println!("{} ({} points)", metric.label(), projection.timestamps.len());
                for series in &projection.series {
                    let tail: Vec<String> = series
                        .values
                        .iter()
                        .rev()
                        .take(5)
                        .rev()
                        .map(|v| format!("{v:.2}"))
                        .collect();
                    println!("  {}: ... {}", series.label, tail.join(" "));
                }
            }
            Ok(())
        }
        other => Err(anyhow!("unknown view {other}\n{USAGE}")),
    }
}

struct Options {
    sort: Option<String>,
    filter: Option<String>,
    limit: Option<usize>,
    json: bool,
}

fn emit<R: TableRow + Serialize>(mut view: TableView<R>, opts: &Options) -> Result<()> {
    if let Some(key) = opts.sort.as_deref() {
        if !view.set_sort(key) {
            eprintln!("[WARN] column {key} is not sortable; keeping default order");
        }
    }
    if let Some(filter) = opts.filter.as_deref() {
        view.set_filter(filter);
    }
    let limit = opts.limit.unwrap_or(usize::MAX);

    if opts.json {
        let rows: Vec<&R> = view.rows().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let columns = R::columns();
    let cells: Vec<Vec<String>> = view
        .rows()
        .take(limit)
        .map(|row| columns.iter().map(|column| row.display(column)).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            cells
                .iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(column.title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| format!("{:<width$}", column.title))
        .collect();
    println!("{}", header.join("  "));
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
    println!(
        "{} of {} rows | sort {} {}",
        cells.len(),
        view.base().len(),
        view.sort().key,
        view.sort().direction.arrow()
    );
    Ok(())
}

fn warn_all(errors: &[String]) {
    for err in errors {
        eprintln!("[WARN] {err}");
    }
}

fn parse_str_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == format!("--{name}") {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    let flag = format!("--{name}");
    std::env::args().skip(1).any(|arg| arg == flag)
}
