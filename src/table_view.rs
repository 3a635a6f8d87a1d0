use std::cmp::Ordering;

use crate::derive::{format_rate, format_temp, truncate_date};

/// Cell text for a join miss.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Text,
    Integer,
    /// Three decimals (batting average, win percentage).
    Rate,
    /// Two decimals (temperatures, park factors).
    Temp,
    /// Extracted trend percentage, shown as parsed.
    Percent,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
    pub format: CellFormat,
    pub sortable: bool,
}

impl Column {
    pub const fn new(key: &'static str, title: &'static str, format: CellFormat) -> Self {
        Self {
            key,
            title,
            format,
            sortable: true,
        }
    }

    pub const fn unsorted(key: &'static str, title: &'static str, format: CellFormat) -> Self {
        Self {
            key,
            title,
            format,
            sortable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl<'a> From<Option<f64>> for FieldValue<'a> {
    fn from(value: Option<f64>) -> Self {
        value
            .filter(|n| n.is_finite())
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Missing)
    }
}

/// A merged row that can be shown, sorted and filtered by [`TableView`].
pub trait TableRow {
    fn columns() -> &'static [Column]
    where
        Self: Sized;

    /// Unrounded value behind a column; sorting always uses this.
    fn value(&self, key: &str) -> FieldValue<'_>;

    /// The identifier field the free-text filter matches against.
    fn filter_text(&self) -> &str;

    /// Display text; override for derived cells such as status icons.
    fn display(&self, column: &Column) -> String {
        format_cell(self.value(column.key), column.format)
    }
}

pub fn format_cell(value: FieldValue<'_>, format: CellFormat) -> String {
    match value {
        FieldValue::Missing => UNAVAILABLE.to_string(),
        FieldValue::Text(text) => match format {
            CellFormat::Date => truncate_date(text).to_string(),
            _ => text.to_string(),
        },
        FieldValue::Number(n) => match format {
            CellFormat::Rate => format_rate(n),
            CellFormat::Temp => format_temp(n),
            CellFormat::Percent => format!("{n}%"),
            CellFormat::Integer => format!("{n:.0}"),
            CellFormat::Text | CellFormat::Date => n.to_string(),
        },
    }
}

/// Owned sort and filter state over a base row set that is never mutated.
#[derive(Debug, Clone)]
pub struct TableView<R> {
    base: Vec<R>,
    // Every base index in current sort order.
    ordered: Vec<usize>,
    // The subset of `ordered` that passes the filter.
    visible: Vec<usize>,
    sort: SortSpec,
    filter: String,
    selected: usize,
}

impl<R: TableRow> TableView<R> {
    pub fn new(rows: Vec<R>, default_sort: SortSpec) -> Self {
        let ordered: Vec<usize> = (0..rows.len()).collect();
        let mut view = Self {
            base: rows,
            visible: ordered.clone(),
            ordered,
            sort: default_sort,
            filter: String::new(),
            selected: 0,
        };
        view.apply_sort();
        view
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn base(&self) -> &[R] {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &R> + '_ {
        self.visible.iter().filter_map(|idx| self.base.get(*idx))
    }

    pub fn row(&self, position: usize) -> Option<&R> {
        self.visible.get(position).and_then(|idx| self.base.get(*idx))
    }

    /// Same key flips the direction; a new key starts ascending.
    /// Returns false for keys that are not sortable columns.
    pub fn set_sort(&mut self, key: &str) -> bool {
        let sortable = R::columns()
            .iter()
            .any(|column| column.key == key && column.sortable);
        if !sortable {
            return false;
        }
        if self.sort.key == key {
            self.sort.direction = self.sort.direction.flipped();
        } else {
            self.sort = SortSpec::ascending(key);
        }
        self.apply_sort();
        true
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.to_string();
        self.refilter();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.refilter();
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.row(self.selected)
    }

    pub fn select_next(&mut self) {
        let total = self.visible.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible.len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    fn clamp_selection(&mut self) {
        let total = self.visible.len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    fn apply_sort(&mut self) {
        let key = self.sort.key.as_str();
        let direction = self.sort.direction;
        let base = &self.base;
        // Stable; sorting the full order and re-filtering equals sorting the visible subset.
        self.ordered.sort_by(|a, b| {
            compare_values(base[*a].value(key), base[*b].value(key), direction)
        });
        self.refilter();
    }

    fn refilter(&mut self) {
        let query = self.filter.trim().to_lowercase();
        if query.is_empty() {
            self.visible = self.ordered.clone();
        } else {
            let base = &self.base;
            self.visible = self
                .ordered
                .iter()
                .copied()
                .filter(|idx| base[*idx].filter_text().to_lowercase().contains(&query))
                .collect();
        }
        self.clamp_selection();
    }
}

/// Numbers compare numerically, everything else by folded text.
/// Missing values go last whichever way the column is sorted.
pub fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (FieldValue::Missing, FieldValue::Missing) => return Ordering::Equal,
        (FieldValue::Missing, _) => return Ordering::Greater,
        (_, FieldValue::Missing) => return Ordering::Less,
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(&y),
        (x, y) => locale_cmp(&text_of(x), &text_of(y)),
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn text_of(value: FieldValue<'_>) -> String {
    match value {
        FieldValue::Text(text) => text.to_string(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Missing => String::new(),
    }
}

fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::{locale_cmp, FieldValue, SortDirection, compare_values};
    use std::cmp::Ordering;

    #[test]
    fn locale_cmp_ignores_case_first() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Greater);
    }

    #[test]
    fn missing_sorts_last_both_ways() {
        let asc = compare_values(FieldValue::Missing, FieldValue::Number(1.0), SortDirection::Ascending);
        let desc = compare_values(FieldValue::Missing, FieldValue::Number(1.0), SortDirection::Descending);
        assert_eq!(asc, Ordering::Greater);
        assert_eq!(desc, Ordering::Greater);
    }
}
