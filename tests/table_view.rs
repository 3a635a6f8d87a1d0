use mlb_terminal::records::parse_team_temps_json;
use mlb_terminal::table_view::{
    CellFormat, Column, FieldValue, SortDirection, SortSpec, TableRow, TableView, UNAVAILABLE,
    format_cell,
};
use mlb_terminal::team_temps::team_temps_view;

#[derive(Debug, Clone, PartialEq)]
struct Row {
    name: &'static str,
    temp: Option<f64>,
}

const COLUMNS: &[Column] = &[
    Column::new("name", "Name", CellFormat::Text),
    Column::new("temp", "Temp", CellFormat::Temp),
    Column::unsorted("note", "Note", CellFormat::Text),
];

impl TableRow for Row {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn value(&self, key: &str) -> FieldValue<'_> {
        match key {
            "name" => FieldValue::Text(self.name),
            "temp" => self.temp.into(),
            _ => FieldValue::Missing,
        }
    }

    fn filter_text(&self) -> &str {
        self.name
    }
}

fn row(name: &'static str, temp: Option<f64>) -> Row {
    Row { name, temp }
}

fn names(view: &TableView<Row>) -> Vec<&'static str> {
    view.rows().map(|row| row.name).collect()
}

fn sample() -> Vec<Row> {
    vec![
        row("PHI", Some(81.2)),
        row("nym", Some(64.0)),
        row("ATL", None),
        row("LAD", Some(90.5)),
        row("Mia", Some(64.0)),
    ]
}

#[test]
fn default_sort_is_applied_on_build() {
    let view = TableView::new(sample(), SortSpec::descending("temp"));
    assert_eq!(names(&view), vec!["LAD", "PHI", "nym", "Mia", "ATL"]);
}

#[test]
fn new_key_sorts_ascending_then_toggles() {
    let mut view = TableView::new(sample(), SortSpec::ascending("name"));
    assert!(view.set_sort("temp"));
    assert_eq!(view.sort().direction, SortDirection::Ascending);
    // Ties keep the order of the previous sort.
    assert_eq!(names(&view), vec!["Mia", "nym", "PHI", "LAD", "ATL"]);

    assert!(view.set_sort("temp"));
    assert_eq!(view.sort().direction, SortDirection::Descending);
    // Missing values stay last in both directions.
    assert_eq!(names(&view), vec!["LAD", "PHI", "Mia", "nym", "ATL"]);
}

#[test]
fn text_sort_folds_case() {
    let view = TableView::new(sample(), SortSpec::ascending("name"));
    assert_eq!(names(&view), vec!["ATL", "LAD", "Mia", "nym", "PHI"]);
}

#[test]
fn sort_is_stable_when_all_keys_are_equal() {
    let rows = vec![
        row("first", Some(1.0)),
        row("second", Some(1.0)),
        row("third", Some(1.0)),
    ];
    let mut view = TableView::new(rows, SortSpec::ascending("temp"));
    assert_eq!(names(&view), vec!["first", "second", "third"]);
    view.set_sort("temp");
    assert_eq!(names(&view), vec!["first", "second", "third"]);
}

#[test]
fn unsortable_and_unknown_columns_are_rejected() {
    let mut view = TableView::new(sample(), SortSpec::ascending("name"));
    assert!(!view.set_sort("note"));
    assert!(!view.set_sort("nope"));
    assert_eq!(view.sort(), &SortSpec::ascending("name"));
}

#[test]
fn filter_is_case_insensitive_substring() {
    let mut view = TableView::new(sample(), SortSpec::ascending("name"));
    view.set_filter("m");
    assert_eq!(names(&view), vec!["Mia", "nym"]);
    view.set_filter("  ");
    assert_eq!(view.len(), 5);
    view.set_filter("zzz");
    assert!(view.is_empty());
    assert!(view.selected_row().is_none());
}

#[test]
fn clearing_filter_restores_sorted_order() {
    let mut view = TableView::new(sample(), SortSpec::descending("temp"));
    let before = names(&view);
    view.set_filter("a");
    assert_eq!(names(&view), vec!["LAD", "Mia", "ATL"]);
    view.clear_filter();
    assert_eq!(names(&view), before);
    assert_eq!(view.base().len(), 5);
}

#[test]
fn sorting_while_filtered_keeps_the_filter() {
    let mut view = TableView::new(sample(), SortSpec::ascending("name"));
    view.set_filter("a");
    view.set_sort("temp");
    assert_eq!(names(&view), vec!["Mia", "LAD", "ATL"]);
    assert_eq!(view.filter(), "a");
}

#[test]
fn selection_wraps_and_clamps() {
    let mut view = TableView::new(sample(), SortSpec::ascending("name"));
    view.select_prev();
    assert_eq!(view.selected_row().map(|row| row.name), Some("PHI"));
    view.select_next();
    assert_eq!(view.selected(), 0);
    for _ in 0..4 {
        view.select_next();
    }
    view.set_filter("ph");
    assert_eq!(view.selected(), 0);
    assert_eq!(view.selected_row().map(|row| row.name), Some("PHI"));
}

#[test]
fn missing_cells_render_as_unavailable() {
    let view = TableView::new(sample(), SortSpec::ascending("name"));
    let atl = view.row(0).expect("row exists");
    assert_eq!(atl.display(&COLUMNS[1]), UNAVAILABLE);
    let phi = view.row(4).expect("row exists");
    assert_eq!(phi.display(&COLUMNS[1]), "81.20");
}

#[test]
fn non_finite_values_sort_last_like_missing() {
    let mut rows = sample();
    rows.push(row("SEA", Some(f64::NAN)));
    rows.push(row("TEX", Some(70.0)));
    let view = TableView::new(rows, SortSpec::descending("temp"));
    assert_eq!(
        names(&view),
        vec!["LAD", "PHI", "TEX", "nym", "Mia", "ATL", "SEA"]
    );
    let sea = view.row(6).expect("row exists");
    assert_eq!(sea.display(&COLUMNS[1]), UNAVAILABLE);
}

#[test]
fn nan_strings_from_the_wire_keep_numeric_order() {
    let body: Vec<String> = (0..2000)
        .map(|idx| {
            let temp = if idx % 7 == 0 {
                "\"NaN\"".to_string()
            } else {
                format!("{}", (idx * 37) % 101)
            };
            format!(r#"{{"team": "T{idx}", "currentTemp": {temp}}}"#)
        })
        .collect();
    let rows = parse_team_temps_json(&format!("[{}]", body.join(","))).expect("valid json");
    assert_eq!(rows.iter().filter(|row| row.current_temp.is_none()).count(), 286);

    let view = team_temps_view(rows);
    assert_eq!(view.sort().direction, SortDirection::Descending);
    let temps: Vec<Option<f64>> = view.rows().map(|row| row.current_temp).collect();
    let present: Vec<f64> = temps.iter().map_while(|temp| *temp).collect();
    assert_eq!(present.len(), 2000 - 286);
    assert!(present.windows(2).all(|pair| pair[0] >= pair[1]));
    assert!(temps[present.len()..].iter().all(Option::is_none));
}

#[test]
fn percentages_show_the_parsed_value() {
    assert_eq!(format_cell(FieldValue::Number(12.55), CellFormat::Percent), "12.55%");
    assert_eq!(format_cell(FieldValue::Number(40.0), CellFormat::Percent), "40%");
    assert_eq!(format_cell(FieldValue::Number(-3.5), CellFormat::Percent), "-3.5%");
}
