use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use mlb_terminal::records::parse_team_temps_json;
use mlb_terminal::series::{MetricSelector, project};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).expect("valid date")
}

#[test]
fn projection_orders_by_date_and_skips_bad_dates() {
    let records =
        parse_team_temps_json(&read_fixture("team_series.json")).expect("fixture should parse");
    assert_eq!(records.len(), 4);

    let projection = project(&records, MetricSelector::CurrentTemp);
    assert_eq!(projection.timestamps, vec![day(1), day(2), day(3)]);
    assert_eq!(
        projection.get("Current Temperature"),
        Some(&[70.0, 69.25, 71.5][..])
    );
    assert_eq!(projection.value_bounds(), Some((69.25, 71.5)));
}

#[test]
fn runs_pair_projects_two_aligned_series() {
    let records =
        parse_team_temps_json(&read_fixture("team_series.json")).expect("fixture should parse");
    let projection = project(&records, MetricSelector::RunsScoredAllowed);
    assert_eq!(projection.series.len(), 2);
    // A missing run total plots as zero.
    assert_eq!(projection.get("Runs Scored (RS)"), Some(&[5.0, 0.0, 12.0][..]));
    assert_eq!(projection.get("Runs Allowed (RA)"), Some(&[4.0, 6.0, 9.0][..]));
    assert!(projection.get("Current Temperature").is_none());
}

#[test]
fn empty_input_projects_nothing() {
    let projection = project(&[], MetricSelector::RunsScored);
    assert!(projection.is_empty());
    assert_eq!(projection.value_bounds(), None);
}

#[test]
fn metric_cycle_visits_every_selector() {
    let mut metric = MetricSelector::CurrentTemp;
    let mut seen = Vec::new();
    for _ in 0..MetricSelector::ALL.len() {
        seen.push(metric);
        metric = metric.next();
    }
    assert_eq!(metric, MetricSelector::CurrentTemp);
    assert_eq!(seen, MetricSelector::ALL.to_vec());
    assert_eq!(MetricSelector::RunsScoredAllowed.axis_title(), "Runs Scored / Allowed");
}
