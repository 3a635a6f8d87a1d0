use std::collections::HashMap;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mlb_terminal::derive::extract_percentage;
use mlb_terminal::pitcher_metrics::{merge_pitcher_metrics, pitcher_metrics_view};
use mlb_terminal::records::{GamePreview, PitcherTrend, TeamTemp, parse_game_previews_json};
use mlb_terminal::series::{MetricSelector, project};
use mlb_terminal::team_temps::team_temps_view;

const TEAMS: [&str; 6] = ["Phillies", "Mets", "Braves", "Marlins", "Nationals", "Cubs"];

fn sample_previews(games: usize) -> Vec<GamePreview> {
    (0..games)
        .map(|idx| GamePreview {
            id: format!("g-{idx}"),
            date: "2024-09-29T00:00:00".to_string(),
            time: format!("{}:{:02} PM", 1 + idx % 9, (idx * 7) % 60),
            home_team: TEAMS[idx % TEAMS.len()].to_string(),
            away_team: TEAMS[(idx + 1) % TEAMS.len()].to_string(),
            venue: format!("Park {idx}"),
            home_pitcher: format!("home{idx:03}"),
            away_pitcher: format!("away{idx:03}"),
            preview_link: String::new(),
            temperature: Some(60.0 + (idx % 25) as f64),
            wind_speed: Some((idx % 15) as f64),
            wind_gusts: None,
            wind_description: "Out to CF".to_string(),
            rain_probability: Some((idx % 10) as f64 * 10.0),
        })
        .collect()
}

fn sample_trends(games: usize) -> Vec<PitcherTrend> {
    (0..games)
        .filter(|idx| idx % 3 != 0)
        .map(|idx| PitcherTrend {
            pitcher: format!("home{idx:03}"),
            performance_status: "HOT".to_string(),
            message: Some(format!("HOT, {}.{}% better than career", idx % 40, idx % 10)),
        })
        .collect()
}

fn sample_names(games: usize) -> HashMap<String, String> {
    (0..games)
        .filter(|idx| idx % 2 == 0)
        .map(|idx| (format!("home{idx:03}"), format!("Pitcher {idx}")))
        .collect()
}

fn sample_team_series(days: usize) -> Vec<TeamTemp> {
    (0..days)
        .map(|idx| TeamTemp {
            team: "PHI".to_string(),
            current_temp: Some(50.0 + (idx % 37) as f64),
            wins: Some((idx / 2) as f64),
            loses: Some((idx / 3) as f64),
            win_perc: Some(0.5),
            rs: Some((idx % 11) as f64),
            ra: Some((idx % 7) as f64),
            pythag_perc: Some(0.52),
            streak: "W1".to_string(),
            last_result: "W".to_string(),
            previous_temp: None,
            // Reverse order so the projection has to sort.
            date: format!("2024-{:02}-{:02}", 9 - (idx / 28) % 6, 28 - idx % 28),
            game_number: Some(idx as f64),
        })
        .collect()
}

fn bench_pitcher_merge(c: &mut Criterion) {
    let previews = sample_previews(60);
    let trends = sample_trends(60);
    let names = sample_names(60);
    c.bench_function("pitcher_metrics_merge", |b| {
        b.iter(|| {
            let rows = merge_pitcher_metrics(
                black_box(previews.clone()),
                black_box(trends.clone()),
                black_box(&names),
            );
            black_box(rows.len());
        })
    });
}

fn bench_table_sort_filter(c: &mut Criterion) {
    let rows = merge_pitcher_metrics(sample_previews(200), sample_trends(200), &HashMap::new());
    c.bench_function("pitcher_view_sort_filter", |b| {
        b.iter(|| {
            let mut view = pitcher_metrics_view(black_box(rows.clone()));
            view.set_sort("homePercentage");
            view.set_sort("homePercentage");
            view.set_filter(black_box("phil"));
            black_box(view.len());
            view.clear_filter();
            black_box(view.len());
        })
    });

    let teams = sample_team_series(180);
    c.bench_function("team_view_sort", |b| {
        b.iter(|| {
            let mut view = team_temps_view(black_box(teams.clone()));
            view.set_sort("team");
            view.set_sort("gameNumber");
            black_box(view.row(0).map(|row| row.game_number));
        })
    });
}

fn bench_series_projection(c: &mut Criterion) {
    let records = sample_team_series(162);
    c.bench_function("team_series_project", |b| {
        b.iter(|| {
            for metric in MetricSelector::ALL {
                let projection = project(black_box(&records), metric);
                black_box(projection.value_bounds());
            }
        })
    });
}

fn bench_message_parse(c: &mut Criterion) {
    let messages = [
        "COLD, 12.5% worse than last year",
        "HOT in 3 starts, 40% better than career",
        "No data available",
        "CONSISTENT with his season line",
    ];
    c.bench_function("trend_percentage_extract", |b| {
        b.iter(|| {
            for message in messages {
                black_box(extract_percentage(black_box(Some(message))));
            }
        })
    });
}

fn bench_preview_parse(c: &mut Criterion) {
    c.bench_function("game_previews_parse", |b| {
        b.iter(|| {
            let games = parse_game_previews_json(black_box(PREVIEWS_JSON)).unwrap();
            black_box(games.len());
        })
    });
}

criterion_group!(
    benches,
    bench_pitcher_merge,
    bench_table_sort_filter,
    bench_series_projection,
    bench_message_parse,
    bench_preview_parse
);
criterion_main!(benches);

const PREVIEWS_JSON: &str = r#"[
  {"id": "g-1", "date": "2024-09-29T00:00:00", "time": "1:05 PM", "homeTeam": "Phillies", "awayTeam": "Nationals",
   "venue": "Citizens Bank Park", "homePitcher": "wheelza01", "awayPitcher": "gorech01", "previewLink": "",
   "temperature": 71, "windSpeed": "9", "windGusts": 14, "windDescription": "Out to CF", "rainProbability": 10},
  {"id": "g-2", "date": "2024-09-29T00:00:00", "time": "3:10 PM", "homeTeam": "Red Sox", "awayTeam": "Rays",
   "venue": "Fenway Park", "homePitcher": "crawfku01", "awayPitcher": "", "previewLink": "",
   "temperature": 64, "windSpeed": 12, "windGusts": null, "windDescription": "L to R", "rainProbability": 35}
]"#;
