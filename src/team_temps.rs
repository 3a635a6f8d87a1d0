use crate::records::TeamTemp;
use crate::table_view::{CellFormat, Column, FieldValue, SortSpec, TableRow, TableView};

const COLUMNS: &[Column] = &[
    Column::new("team", "Team", CellFormat::Text),
    Column::new("currentTemp", "Temp", CellFormat::Temp),
    Column::new("wins", "W", CellFormat::Integer),
    Column::new("loses", "L", CellFormat::Integer),
    Column::new("winPerc", "Win%", CellFormat::Rate),
    Column::new("rs", "RS", CellFormat::Integer),
    Column::new("ra", "RA", CellFormat::Integer),
    Column::new("pythagPerc", "Pythag%", CellFormat::Rate),
    Column::new("streak", "Streak", CellFormat::Text),
    Column::new("lastResult", "Last", CellFormat::Text),
    Column::new("previousTemp", "Prev Temp", CellFormat::Temp),
    Column::new("date", "Date", CellFormat::Date),
    Column::new("gameNumber", "G#", CellFormat::Integer),
];

impl TableRow for TeamTemp {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn value(&self, key: &str) -> FieldValue<'_> {
        match key {
            "team" => FieldValue::Text(&self.team),
            "currentTemp" => self.current_temp.into(),
            "wins" => self.wins.into(),
            "loses" => self.loses.into(),
            "winPerc" => self.win_perc.into(),
            "rs" => self.rs.into(),
            "ra" => self.ra.into(),
            "pythagPerc" => self.pythag_perc.into(),
            "streak" => FieldValue::Text(&self.streak),
            "lastResult" => FieldValue::Text(&self.last_result),
            "previousTemp" => self.previous_temp.into(),
            "date" => FieldValue::Text(&self.date),
            "gameNumber" => self.game_number.into(),
            _ => FieldValue::Missing,
        }
    }

    fn filter_text(&self) -> &str {
        &self.team
    }
}

pub fn default_sort() -> SortSpec {
    SortSpec::descending("currentTemp")
}

pub fn team_temps_view(rows: Vec<TeamTemp>) -> TableView<TeamTemp> {
    TableView::new(rows, default_sort())
}
