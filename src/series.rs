use chrono::NaiveDate;

use crate::config::parse_date;
use crate::derive::truncate_date;
use crate::records::TeamTemp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSelector {
    CurrentTemp,
    RunsScored,
    RunsAllowed,
    /// Runs scored and allowed as two series on one axis.
    RunsScoredAllowed,
}

impl MetricSelector {
    pub const ALL: [MetricSelector; 4] = [
        MetricSelector::CurrentTemp,
        MetricSelector::RunsScored,
        MetricSelector::RunsAllowed,
        MetricSelector::RunsScoredAllowed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricSelector::CurrentTemp => "Current Temperature",
            MetricSelector::RunsScored => "Runs Scored (RS)",
            MetricSelector::RunsAllowed => "Runs Allowed (RA)",
            MetricSelector::RunsScoredAllowed => "Both RS and RA",
        }
    }

    pub fn axis_title(self) -> &'static str {
        match self {
            MetricSelector::CurrentTemp => "Temperature",
            _ => "Runs Scored / Allowed",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn metrics(self) -> &'static [Metric] {
        match self {
            MetricSelector::CurrentTemp => &[Metric::CurrentTemp],
            MetricSelector::RunsScored => &[Metric::Rs],
            MetricSelector::RunsAllowed => &[Metric::Ra],
            MetricSelector::RunsScoredAllowed => &[Metric::Rs, Metric::Ra],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Metric {
    CurrentTemp,
    Rs,
    Ra,
}

impl Metric {
    fn label(self) -> &'static str {
        match self {
            Metric::CurrentTemp => "Current Temperature",
            Metric::Rs => "Runs Scored (RS)",
            Metric::Ra => "Runs Allowed (RA)",
        }
    }

    fn read(self, record: &TeamTemp) -> f64 {
        let value = match self {
            Metric::CurrentTemp => record.current_temp,
            Metric::Rs => record.rs,
            Metric::Ra => record.ra,
        };
        value.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Parallel series sharing one ascending date axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesProjection {
    pub timestamps: Vec<NaiveDate>,
    pub series: Vec<NamedSeries>,
}

impl SeriesProjection {
    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Min and max across every series, for chart bounds.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut values = self.series.iter().flat_map(|s| s.values.iter().copied());
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Records with an unparseable date are skipped; the rest are ordered by date.
pub fn project(records: &[TeamTemp], metric: MetricSelector) -> SeriesProjection {
    let mut dated: Vec<(NaiveDate, &TeamTemp)> = records
        .iter()
        .filter_map(|record| parse_date(truncate_date(&record.date)).map(|d| (d, record)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let timestamps = dated.iter().map(|(date, _)| *date).collect();
    let series = metric
        .metrics()
        .iter()
        .map(|m| NamedSeries {
            label: m.label().to_string(),
            values: dated.iter().map(|(_, record)| m.read(record)).collect(),
        })
        .collect();
    SeriesProjection { timestamps, series }
}
