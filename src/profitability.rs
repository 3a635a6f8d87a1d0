use crate::records::ProfitabilityLine;
use crate::table_view::{CellFormat, Column, FieldValue, SortSpec, TableRow, TableView};

const COLUMNS: &[Column] = &[
    Column::new("player", "Player", CellFormat::Text),
    Column::new("stat1", "Stat 1", CellFormat::Temp),
    Column::new("stat2", "Stat 2", CellFormat::Temp),
    Column::new("stat3", "Stat 3", CellFormat::Temp),
    Column::new("stat4", "Stat 4", CellFormat::Temp),
    Column::new("date", "Date", CellFormat::Date),
];

impl TableRow for ProfitabilityLine {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn value(&self, key: &str) -> FieldValue<'_> {
        match key {
            "player" => FieldValue::Text(&self.player),
            "stat1" => self.stats[0].into(),
            "stat2" => self.stats[1].into(),
            "stat3" => self.stats[2].into(),
            "stat4" => self.stats[3].into(),
            "date" => FieldValue::Text(&self.date),
            _ => FieldValue::Missing,
        }
    }

    fn filter_text(&self) -> &str {
        &self.player
    }
}

pub fn default_sort() -> SortSpec {
    SortSpec::ascending("player")
}

pub fn profitability_view(rows: Vec<ProfitabilityLine>) -> TableView<ProfitabilityLine> {
    TableView::new(rows, default_sort())
}
