use std::fs;
use std::path::PathBuf;

use mlb_terminal::hitter_temps::{HitterRow, hitter_temps_view, merge_hitter_temps};
use mlb_terminal::profitability::profitability_view;
use mlb_terminal::records::{
    parse_hitter_temps_json, parse_profitability_json, parse_trailing_logs_json,
};
use mlb_terminal::table_view::{SortDirection, TableRow, UNAVAILABLE};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn hitters() -> Vec<HitterRow> {
    let temps =
        parse_hitter_temps_json(&read_fixture("hitter_temps.json")).expect("fixture should parse");
    let logs =
        parse_trailing_logs_json(&read_fixture("trailing_logs.json")).expect("fixture should parse");
    merge_hitter_temps(temps, logs)
}

fn cell(row: &HitterRow, key: &str) -> String {
    let column = HitterRow::columns()
        .iter()
        .find(|column| column.key == key)
        .expect("known column");
    row.display(column)
}

#[test]
fn hitters_without_a_split_are_kept() {
    let rows = hitters();
    assert_eq!(rows.len(), 3);
    let rookie = &rows[2];
    assert!(rookie.log.is_unavailable());
    assert_eq!(cell(rookie, "ops"), UNAVAILABLE);
    assert_eq!(cell(rookie, "currentTemp"), "51.00");
}

#[test]
fn later_split_rows_replace_earlier_ones() {
    let rows = hitters();
    let judge = rows[1].log.found().expect("split row");
    assert_eq!(judge.hr, Some(4.0));
    assert_eq!(cell(&rows[1], "pa"), "31");
}

#[test]
fn split_cells_are_rounded_for_display_only() {
    let rows = hitters();
    assert_eq!(cell(&rows[0], "ba"), "0.313");
    assert_eq!(cell(&rows[0], "splitParkFactor"), "1.02");
    assert_eq!(cell(&rows[0], "date"), "2024-09-28");
}

#[test]
fn default_view_is_hottest_first_with_missing_last() {
    let mut view = hitter_temps_view(hitters());
    assert_eq!(view.sort().direction, SortDirection::Descending);
    let ids: Vec<&str> = view.rows().map(|row| row.hitter.bbref_id.as_str()).collect();
    assert_eq!(ids, vec!["judgeaa01", "harpebr03", "rookie99"]);

    assert!(view.set_sort("hr"));
    let ids: Vec<&str> = view.rows().map(|row| row.hitter.bbref_id.as_str()).collect();
    assert_eq!(ids, vec!["harpebr03", "judgeaa01", "rookie99"]);

    view.set_filter("JUDGE");
    assert_eq!(view.len(), 1);
}

#[test]
fn profitability_rows_sort_by_team_name() {
    let rows =
        parse_profitability_json(&read_fixture("profitability.json")).expect("fixture should parse");
    let mut view = profitability_view(rows);
    let players: Vec<&str> = view.rows().map(|row| row.player.as_str()).collect();
    assert_eq!(players, vec!["Athletics", "Dodgers"]);

    assert!(view.set_sort("stat4"));
    assert!(view.set_sort("stat4"));
    let players: Vec<&str> = view.rows().map(|row| row.player.as_str()).collect();
    assert_eq!(players, vec!["Athletics", "Dodgers"]);
}
