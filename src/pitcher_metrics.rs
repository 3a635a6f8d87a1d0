use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::derive::{
    NO_DATA_MARKER, TrendStatus, classify_status, extract_percentage, truncate_date,
};
use crate::join::{
    ConflictPolicy, Joined, Lookup, SecondaryIndex, distinct_ids, join_indexed, resolve_display,
};
use crate::keys::player_key;
use crate::mlb_api::MlbApi;
use crate::records::{GamePreview, PitcherTrend};
use crate::table_view::{
    CellFormat, Column, FieldValue, SortSpec, TableRow, TableView, format_cell,
};

/// Performance status shown when the trend source has no entry for a pitcher.
pub const MISSING_TREND_STATUS: &str = "N/A";
/// Performance status for entries whose message is blank.
pub const BLANK_TREND_STATUS: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherSide {
    pub pitcher_id: String,
    /// Full name when the batch lookup knew it, otherwise the raw id.
    pub pitcher: String,
    pub performance_status: String,
    pub message: String,
    pub status: TrendStatus,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherMatchupRow {
    pub game_id: String,
    pub timestamp: String,
    pub date: String,
    pub time: String,
    pub home_team: String,
    pub away_team: String,
    pub venue: String,
    pub matchup: String,
    pub home: PitcherSide,
    pub away: PitcherSide,
}

pub struct PitcherMetricsFetch {
    pub rows: Vec<PitcherMatchupRow>,
    pub errors: Vec<String>,
}

/// Previews and trends are fetched together; the name batch needs the preview ids first.
pub fn fetch_pitcher_metrics(api: &MlbApi, date: NaiveDate) -> Result<PitcherMetricsFetch> {
    let (previews, trends) = rayon::join(|| api.game_previews(date), || api.pitcher_trends(date));
    let previews = previews?;
    let trends = trends?;

    let mut errors = Vec::new();
    let ids = pitcher_ids(&previews);
    let names = match api.player_names(&ids) {
        Ok(names) => names,
        Err(err) => {
            errors.push(format!("player names unavailable: {err:#}"));
            HashMap::new()
        }
    };

    Ok(PitcherMetricsFetch {
        rows: merge_pitcher_metrics(previews, trends, &names),
        errors,
    })
}

pub fn pitcher_ids(previews: &[GamePreview]) -> Vec<String> {
    distinct_ids(previews, |game| {
        [game.home_pitcher.as_str(), game.away_pitcher.as_str()]
    })
}

pub fn merge_pitcher_metrics(
    previews: Vec<GamePreview>,
    trends: Vec<PitcherTrend>,
    names: &HashMap<String, String>,
) -> Vec<PitcherMatchupRow> {
    let index = SecondaryIndex::build(
        trends.into_iter().map(blank_message_as_no_data),
        |trend: &PitcherTrend| player_key(&trend.pitcher),
        ConflictPolicy::LastWriteWins,
    );
    let with_home = join_indexed(previews, &index, |game: &GamePreview| {
        player_key(&game.home_pitcher)
    });
    let with_both = join_indexed(with_home, &index, |joined: &Joined<GamePreview, PitcherTrend>| {
        player_key(&joined.primary.away_pitcher)
    });

    with_both
        .into_iter()
        .map(|joined| {
            let away_trend = joined.secondary;
            let Joined {
                primary: game,
                secondary: home_trend,
            } = joined.primary;
            let home = pitcher_side(&game.home_pitcher, home_trend, names);
            let away = pitcher_side(&game.away_pitcher, away_trend, names);
            PitcherMatchupRow {
                game_id: game.id,
                date: truncate_date(&game.date).to_string(),
                timestamp: game.date,
                time: game.time,
                matchup: format!("{} @ {}", game.away_team, game.home_team),
                home_team: game.home_team,
                away_team: game.away_team,
                venue: game.venue,
                home,
                away,
            }
        })
        .collect()
}

fn blank_message_as_no_data(trend: PitcherTrend) -> PitcherTrend {
    let blank = trend
        .message
        .as_deref()
        .is_none_or(|message| message.trim().is_empty());
    if !blank {
        return trend;
    }
    PitcherTrend {
        pitcher: trend.pitcher,
        performance_status: BLANK_TREND_STATUS.to_string(),
        message: Some(NO_DATA_MARKER.to_string()),
    }
}

fn pitcher_side(
    pitcher_id: &str,
    trend: Lookup<PitcherTrend>,
    names: &HashMap<String, String>,
) -> PitcherSide {
    let (performance_status, message) = match trend {
        Lookup::Found(trend) => (
            trend.performance_status,
            trend.message.unwrap_or_else(|| NO_DATA_MARKER.to_string()),
        ),
        Lookup::Unavailable => (MISSING_TREND_STATUS.to_string(), NO_DATA_MARKER.to_string()),
    };
    PitcherSide {
        pitcher_id: pitcher_id.to_string(),
        pitcher: resolve_display(names, pitcher_id),
        status: classify_status(Some(message.as_str())),
        percentage: extract_percentage(Some(message.as_str())),
        performance_status,
        message,
    }
}

const COLUMNS: &[Column] = &[
    Column::new("date", "Date", CellFormat::Date),
    Column::new("time", "Time", CellFormat::Text),
    Column::new("homeTeam", "Home", CellFormat::Text),
    Column::new("awayTeam", "Away", CellFormat::Text),
    Column::unsorted("venue", "Venue", CellFormat::Text),
    Column::unsorted("homePitcher", "Home SP", CellFormat::Text),
    Column::unsorted("homePitcherStatus", "Status", CellFormat::Text),
    Column::new("homePercentage", "Home %", CellFormat::Percent),
    Column::unsorted("awayPitcher", "Away SP", CellFormat::Text),
    Column::unsorted("awayPitcherStatus", "Status", CellFormat::Text),
    Column::new("awayPercentage", "Away %", CellFormat::Percent),
];

impl TableRow for PitcherMatchupRow {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn value(&self, key: &str) -> FieldValue<'_> {
        match key {
            "date" => FieldValue::Text(&self.date),
            "time" => FieldValue::Text(&self.time),
            "homeTeam" => FieldValue::Text(&self.home_team),
            "awayTeam" => FieldValue::Text(&self.away_team),
            "venue" => FieldValue::Text(&self.venue),
            "homePitcher" => FieldValue::Text(&self.home.pitcher),
            "homePitcherStatus" => FieldValue::Text(self.home.status.label()),
            "homePercentage" => FieldValue::Number(self.home.percentage),
            "awayPitcher" => FieldValue::Text(&self.away.pitcher),
            "awayPitcherStatus" => FieldValue::Text(self.away.status.label()),
            "awayPercentage" => FieldValue::Number(self.away.percentage),
            _ => FieldValue::Missing,
        }
    }

    fn filter_text(&self) -> &str {
        &self.home_team
    }

    fn display(&self, column: &Column) -> String {
        match column.key {
            "homePitcherStatus" => status_cell(&self.home),
            "awayPitcherStatus" => status_cell(&self.away),
            _ => format_cell(self.value(column.key), column.format),
        }
    }
}

fn status_cell(side: &PitcherSide) -> String {
    format!("{} {}", side.status.icon(), side.status.label())
}

pub fn default_sort() -> SortSpec {
    SortSpec::ascending("time")
}

pub fn pitcher_metrics_view(rows: Vec<PitcherMatchupRow>) -> TableView<PitcherMatchupRow> {
    TableView::new(rows, default_sort())
}
