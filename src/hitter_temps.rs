use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::join::{ConflictPolicy, Lookup, join};
use crate::keys::player_key;
use crate::mlb_api::MlbApi;
use crate::records::{HitterTemp, TrailingGameLog};
use crate::table_view::{CellFormat, Column, FieldValue, SortSpec, TableRow, TableView};

/// A hitter's temperature line with its last-seven-games split, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitterRow {
    pub hitter: HitterTemp,
    pub log: Lookup<TrailingGameLog>,
}

pub fn fetch_hitter_temps(api: &MlbApi, date: NaiveDate) -> Result<Vec<HitterRow>> {
    let (temps, logs) = rayon::join(|| api.hitter_temps(date), || api.trailing_logs());
    Ok(merge_hitter_temps(temps?, logs?))
}

/// Every hitter is kept; a hitter without a split row shows `N/A` in the split columns.
pub fn merge_hitter_temps(temps: Vec<HitterTemp>, logs: Vec<TrailingGameLog>) -> Vec<HitterRow> {
    join(
        temps,
        logs,
        |hitter: &HitterTemp| player_key(&hitter.bbref_id),
        |log: &TrailingGameLog| player_key(&log.bbref_id),
        ConflictPolicy::LastWriteWins,
    )
    .into_iter()
    .map(|joined| HitterRow {
        hitter: joined.primary,
        log: joined.secondary,
    })
    .collect()
}

const COLUMNS: &[Column] = &[
    Column::new("date", "Date", CellFormat::Date),
    Column::new("bbrefId", "Player", CellFormat::Text),
    Column::new("team", "Team", CellFormat::Text),
    Column::new("currentTemp", "Temp", CellFormat::Temp),
    Column::new("trailingTemp1", "T-1", CellFormat::Temp),
    Column::new("trailingTemp2", "T-2", CellFormat::Temp),
    Column::new("trailingTemp3", "T-3", CellFormat::Temp),
    Column::new("trailingTemp4", "T-4", CellFormat::Temp),
    Column::new("trailingTemp5", "T-5", CellFormat::Temp),
    Column::new("trailingTemp6", "T-6", CellFormat::Temp),
    Column::new("splitParkFactor", "Park F", CellFormat::Temp),
    Column::new("g", "G", CellFormat::Integer),
    Column::new("pa", "PA", CellFormat::Integer),
    Column::new("hr", "HR", CellFormat::Integer),
    Column::new("ba", "BA", CellFormat::Rate),
    Column::new("ops", "OPS", CellFormat::Rate),
    Column::new("homeGames", "Home G", CellFormat::Integer),
    Column::new("awayGames", "Away G", CellFormat::Integer),
];

impl TableRow for HitterRow {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn value(&self, key: &str) -> FieldValue<'_> {
        let hitter = &self.hitter;
        match key {
            "date" => FieldValue::Text(&hitter.date),
            "bbrefId" => FieldValue::Text(&hitter.bbref_id),
            "team" => FieldValue::Text(&hitter.team),
            "currentTemp" => hitter.current_temp.into(),
            "trailingTemp1" => hitter.trailing_temps[0].into(),
            "trailingTemp2" => hitter.trailing_temps[1].into(),
            "trailingTemp3" => hitter.trailing_temps[2].into(),
            "trailingTemp4" => hitter.trailing_temps[3].into(),
            "trailingTemp5" => hitter.trailing_temps[4].into(),
            "trailingTemp6" => hitter.trailing_temps[5].into(),
            _ => self.log_value(key),
        }
    }

    fn filter_text(&self) -> &str {
        &self.hitter.bbref_id
    }
}

impl HitterRow {
    fn log_value(&self, key: &str) -> FieldValue<'_> {
        let Some(log) = self.log.found() else {
            return FieldValue::Missing;
        };
        let value = match key {
            "splitParkFactor" => log.split_park_factor,
            "g" => log.g,
            "pa" => log.pa,
            "hr" => log.hr,
            "ba" => log.ba,
            "ops" => log.ops,
            "homeGames" => log.home_games,
            "awayGames" => log.away_games,
            _ => None,
        };
        value.into()
    }
}

pub fn default_sort() -> SortSpec {
    SortSpec::descending("currentTemp")
}

pub fn hitter_temps_view(rows: Vec<HitterRow>) -> TableView<HitterRow> {
    TableView::new(rows, default_sort())
}
