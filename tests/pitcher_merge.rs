use std::collections::HashMap;

use mlb_terminal::derive::{Direction, NO_DATA_MARKER, TrendStatus};
use mlb_terminal::pitcher_metrics::{
    BLANK_TREND_STATUS, MISSING_TREND_STATUS, PitcherMatchupRow, merge_pitcher_metrics, pitcher_ids,
    pitcher_metrics_view,
};
use mlb_terminal::records::{
    GamePreview, PitcherTrend, parse_pitcher_trends_json, parse_player_names_json,
};
use mlb_terminal::table_view::{SortDirection, TableRow};

fn preview(
    id: &str,
    time: &str,
    home: &str,
    away: &str,
    home_pitcher: &str,
    away_pitcher: &str,
) -> GamePreview {
    GamePreview {
        id: id.to_string(),
        date: "2024-09-29T00:00:00".to_string(),
        time: time.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        venue: format!("{home} Park"),
        home_pitcher: home_pitcher.to_string(),
        away_pitcher: away_pitcher.to_string(),
        preview_link: String::new(),
        temperature: None,
        wind_speed: None,
        wind_gusts: None,
        wind_description: String::new(),
        rain_probability: None,
    }
}

fn trend(pitcher: &str, status: &str, message: &str) -> PitcherTrend {
    PitcherTrend {
        pitcher: pitcher.to_string(),
        performance_status: status.to_string(),
        message: Some(message.to_string()),
    }
}

fn three_games() -> Vec<GamePreview> {
    vec![
        preview("g1", "1:05 PM", "Phillies", "Mets", "pitchA", ""),
        preview("g2", "4:10 PM", "Braves", "Marlins", "pitchB", ""),
        preview("g3", "7:05 PM", "Cubs", "Reds", "pitchC", ""),
    ]
}

#[test]
fn every_game_survives_partial_secondary_sources() {
    let trends = vec![
        trend("pitchA", "HOT", "HOT, 18.2% better than career"),
        trend("pitchC", "COLD", "COLD, 12.5% worse than last year"),
    ];
    let names: HashMap<String, String> = [
        ("pitchA".to_string(), "Alan Arrow".to_string()),
        ("pitchB".to_string(), "Bert Bolt".to_string()),
    ]
    .into();

    let rows = merge_pitcher_metrics(three_games(), trends, &names);
    assert_eq!(rows.len(), 3);

    let a = &rows[0].home;
    assert_eq!(a.pitcher, "Alan Arrow");
    assert_eq!(a.status, TrendStatus::Hot);
    assert_eq!(a.percentage, 18.2);

    let b = &rows[1].home;
    assert_eq!(b.pitcher, "Bert Bolt");
    assert_eq!(b.status, TrendStatus::Unknown);
    assert_eq!(b.percentage, 0.0);
    assert_eq!(b.performance_status, MISSING_TREND_STATUS);
    assert_eq!(b.message, NO_DATA_MARKER);

    let c = &rows[2].home;
    // No name came back for pitchC, so the raw id is shown.
    assert_eq!(c.pitcher, "pitchC");
    assert_eq!(c.pitcher_id, "pitchC");
    assert_eq!(c.status, TrendStatus::Cold);
    assert_eq!(c.percentage, 12.5);
}

#[test]
fn consistent_trend_reads_direction_from_message() {
    let trends = vec![
        trend("pitchA", "HOT", "HOT, 18.2% better than career"),
        trend("pitchC", "CONSISTENT", "CONSISTENT, 3.5% worse than last season"),
    ];
    let names: HashMap<String, String> = [
        ("pitchA".to_string(), "Alan Arrow".to_string()),
        ("pitchB".to_string(), "Bert Bolt".to_string()),
    ]
    .into();
    let rows = merge_pitcher_metrics(three_games(), trends, &names);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].home.status.label(), "Unknown");
    assert_eq!(rows[1].home.percentage, 0.0);
    assert_eq!(rows[2].home.pitcher, "pitchC");
    assert_eq!(rows[2].home.status, TrendStatus::Consistent(Direction::Worse));
    assert_eq!(rows[2].home.percentage, 3.5);
}

#[test]
fn blank_trend_message_reads_as_no_data() {
    let trends = parse_pitcher_trends_json(
        r#"[{"pitcher": "pitchA", "performanceStatus": "HOT", "message": "  "}]"#,
    )
    .expect("valid json");
    let rows = merge_pitcher_metrics(three_games(), trends, &HashMap::new());
    let a = &rows[0].home;
    assert_eq!(a.performance_status, BLANK_TREND_STATUS);
    assert_eq!(a.status, TrendStatus::Unknown);
    assert_eq!(a.percentage, 0.0);
}

#[test]
fn empty_away_pitcher_is_unavailable_not_dropped() {
    let rows = merge_pitcher_metrics(three_games(), Vec::new(), &HashMap::new());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].away.pitcher, "");
    assert_eq!(rows[0].away.performance_status, MISSING_TREND_STATUS);
    assert_eq!(rows[0].matchup, "Mets @ Phillies");
    assert_eq!(rows[0].date, "2024-09-29");
}

#[test]
fn trend_without_a_pitcher_never_fills_an_unannounced_side() {
    let trends = parse_pitcher_trends_json(
        r#"[{"performanceStatus": "HOT", "message": "HOT, 40% better"}]"#,
    )
    .expect("valid json");
    let rows = merge_pitcher_metrics(three_games(), trends, &HashMap::new());
    for row in &rows {
        assert_eq!(row.away.status, TrendStatus::Unknown);
        assert_eq!(row.away.percentage, 0.0);
        assert_eq!(row.away.performance_status, MISSING_TREND_STATUS);
    }
}

#[test]
fn duplicate_trend_entries_keep_the_last() {
    let trends = vec![
        trend("pitchA", "COLD", "COLD, 9% worse"),
        trend("pitchA", "HOT", "HOT, 4% better"),
    ];
    let rows = merge_pitcher_metrics(three_games(), trends, &HashMap::new());
    assert_eq!(rows[0].home.status, TrendStatus::Hot);
    assert_eq!(rows[0].home.percentage, 4.0);
}

#[test]
fn batch_request_ids_are_distinct_and_non_empty() {
    let mut games = three_games();
    games.push(preview("g4", "9:40 PM", "Dodgers", "Padres", "pitchA", "pitchD"));
    assert_eq!(pitcher_ids(&games), vec!["pitchA", "pitchB", "pitchC", "pitchD"]);
}

#[test]
fn null_names_fall_back_to_id() {
    let names = parse_player_names_json(r#"{"pitchA": "Alan Arrow", "pitchC": null}"#)
        .expect("valid json");
    let rows = merge_pitcher_metrics(three_games(), Vec::new(), &names);
    assert_eq!(rows[0].home.pitcher, "Alan Arrow");
    assert_eq!(rows[2].home.pitcher, "pitchC");
}

#[test]
fn view_sorts_by_percentage_and_filters_on_home_team() {
    let trends = vec![
        trend("pitchA", "HOT", "HOT, 18.2% better than career"),
        trend("pitchB", "COLD", "COLD, -6% worse"),
        trend("pitchC", "COLD", "COLD, 12.5% worse than last year"),
    ];
    let rows = merge_pitcher_metrics(three_games(), trends, &HashMap::new());
    let mut view = pitcher_metrics_view(rows);
    assert_eq!(view.sort().key, "time");

    assert!(view.set_sort("homePercentage"));
    view.set_sort("homePercentage");
    assert_eq!(view.sort().direction, SortDirection::Descending);
    let order: Vec<&str> = view.rows().map(|row| row.home_team.as_str()).collect();
    assert_eq!(order, vec!["Phillies", "Cubs", "Braves"]);

    // Status cells are not sortable.
    assert!(!view.set_sort("homePitcherStatus"));

    view.set_filter("cub");
    assert_eq!(view.len(), 1);
    view.set_filter("mets");
    assert!(view.is_empty());

    let columns = PitcherMatchupRow::columns();
    view.clear_filter();
    let top = view.row(0).expect("row exists");
    let status = columns
        .iter()
        .find(|column| column.key == "homePitcherStatus")
        .expect("status column");
    assert!(top.display(status).ends_with("HOT"));
}
