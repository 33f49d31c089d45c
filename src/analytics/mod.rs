//! Aggregate statistics for the analytics dashboard.
//!
//! The dashboard shows nine series computed from the survey tables. All of
//! them are fetched in parallel (one scoped thread per series) and joined into
//! an [`AnalyticsReport`]. A series whose queries fail is logged and reported
//! as unavailable; the others are still shown.

use std::fmt;
use std::time::Instant;

use tracing::{debug, warn};

use crate::fmt::{format_column_name, percentage};
use crate::model::{EntityKind, Value};
use crate::store::{Filter, RecordStore, StoreError};

/// Chart a series is drawn as on the web dashboard. The terminal renders all
/// of them as bar lists; the kind is kept as metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Doughnut,
    Bar,
    HorizontalBar,
    Line,
    PolarArea,
    Radar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal bar",
            ChartKind::Line => "line",
            ChartKind::PolarArea => "polar area",
            ChartKind::Radar => "radar",
        };
        f.write_str(name)
    }
}

/// Where the points of a series come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    /// Grouped counts of one column.
    Distribution {
        kind: EntityKind,
        column: &'static str,
    },
    /// Grouped counts with each label rendered as `"{prefix} {value}"`.
    PrefixedDistribution {
        kind: EntityKind,
        column: &'static str,
        prefix: &'static str,
    },
    /// Numeric column bucketed into fixed hour ranges.
    HourBuckets {
        kind: EntityKind,
        column: &'static str,
    },
    /// Number of "yes" answers per column.
    YesCounts {
        kind: EntityKind,
        columns: &'static [&'static str],
    },
}

/// Static definition of one dashboard series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesDef {
    pub title: &'static str,
    pub chart: ChartKind,
    pub source: SeriesSource,
}

pub static SERIES: [SeriesDef; 9] = [
    SeriesDef {
        title: "Device Usage Patterns",
        chart: ChartKind::Pie,
        source: SeriesSource::Distribution {
            kind: EntityKind::Student,
            column: "device_usage",
        },
    },
    SeriesDef {
        title: "Daily Device Hours",
        chart: ChartKind::HorizontalBar,
        source: SeriesSource::HourBuckets {
            kind: EntityKind::Student,
            column: "device_hours",
        },
    },
    SeriesDef {
        title: "Reported Anxiety Levels",
        chart: ChartKind::Doughnut,
        source: SeriesSource::Distribution {
            kind: EntityKind::Student,
            column: "feel_lonely",
        },
    },
    SeriesDef {
        title: "Sleep Issues Due to Device Usage",
        chart: ChartKind::Line,
        source: SeriesSource::Distribution {
            kind: EntityKind::Student,
            column: "night_use",
        },
    },
    SeriesDef {
        title: "Grade Distribution",
        chart: ChartKind::PolarArea,
        source: SeriesSource::PrefixedDistribution {
            kind: EntityKind::Student,
            column: "grade",
            prefix: "Grade",
        },
    },
    SeriesDef {
        title: "Gender Distribution",
        chart: ChartKind::Pie,
        source: SeriesSource::Distribution {
            kind: EntityKind::Student,
            column: "gender",
        },
    },
    SeriesDef {
        title: "Behavioral Patterns",
        chart: ChartKind::Radar,
        source: SeriesSource::YesCounts {
            kind: EntityKind::Student,
            columns: &[
                "skip_studies",
                "irritated_without_phone",
                "night_use",
                "tried_smoking_gambling",
                "excessive_use",
            ],
        },
    },
    SeriesDef {
        title: "Counseling Interest",
        chart: ChartKind::Bar,
        source: SeriesSource::Distribution {
            kind: EntityKind::Student,
            column: "interested_counseling",
        },
    },
    SeriesDef {
        title: "Observed Addiction Signs",
        chart: ChartKind::Pie,
        source: SeriesSource::Distribution {
            kind: EntityKind::Teacher,
            column: "observed_addiction",
        },
    },
];

/// Upper bounds (exclusive) and labels of the hour buckets; the last bucket
/// is open-ended.
const HOUR_BUCKETS: [(f64, &str); 5] = [
    (2.0, "0-2"),
    (4.0, "2-4"),
    (6.0, "4-6"),
    (8.0, "6-8"),
    (f64::INFINITY, "8+"),
];

/// One labelled value of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub label: String,
    pub value: u64,
    /// Rounded share of the series total, in percent.
    pub percentage: u64,
}

/// A fetched series, or the reason it is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    pub title: &'static str,
    pub chart: ChartKind,
    pub points: Result<Vec<DataPoint>, StoreError>,
}

impl SeriesReport {
    pub fn total(&self) -> u64 {
        match &self.points {
            Ok(points) => points.iter().map(|p| p.value).sum(),
            Err(_) => 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.points.is_ok()
    }
}

/// All dashboard series, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsReport {
    pub series: Vec<SeriesReport>,
}

impl AnalyticsReport {
    pub fn unavailable(&self) -> usize {
        self.series.iter().filter(|s| !s.is_available()).count()
    }
}

/// Fetches every dashboard series in parallel.
pub fn fetch_report(store: &dyn RecordStore) -> AnalyticsReport {
    let started = Instant::now();
    let series = std::thread::scope(|s| {
        let handles: Vec<_> = SERIES
            .iter()
            .map(|def| (def, s.spawn(move || fetch_series(store, def))))
            .collect();
        handles
            .into_iter()
            .map(|(def, handle)| {
                let points = handle
                    .join()
                    .unwrap_or_else(|_| Err(StoreError::Query("series worker panicked".to_string())));
                if let Err(e) = &points {
                    warn!(series = def.title, error = %e, "analytics series unavailable");
                }
                SeriesReport {
                    title: def.title,
                    chart: def.chart,
                    points,
                }
            })
            .collect::<Vec<_>>()
    });
    debug!(
        series = series.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analytics report fetched"
    );
    AnalyticsReport { series }
}

/// Fetches and labels the points of one series.
pub fn fetch_series(store: &dyn RecordStore, def: &SeriesDef) -> Result<Vec<DataPoint>, StoreError> {
    let counts = match def.source {
        SeriesSource::Distribution { kind, column } => {
            let dist = store.distribution(kind.table_name(), column)?;
            labelled(dist, |v| format_column_name(&v.to_string()))
        }
        SeriesSource::PrefixedDistribution {
            kind,
            column,
            prefix,
        } => {
            let dist = store.distribution(kind.table_name(), column)?;
            labelled(dist, |v| format!("{} {}", prefix, v))
        }
        SeriesSource::HourBuckets { kind, column } => {
            let dist = store.distribution(kind.table_name(), column)?;
            bucket_hours(&dist)
        }
        SeriesSource::YesCounts { kind, columns } => {
            let mut counts = Vec::with_capacity(columns.len());
            for column in columns {
                let n = store.count(kind.table_name(), Some(&Filter::eq(*column, "yes")))?;
                counts.push((format_column_name(column), n));
            }
            counts
        }
    };
    Ok(with_percentages(counts))
}

/// Labels grouped counts, dropping the null group.
fn labelled(dist: Vec<(Value, u64)>, label: impl Fn(&Value) -> String) -> Vec<(String, u64)> {
    dist.into_iter()
        .filter(|(v, _)| !v.is_null())
        .map(|(v, n)| (label(&v), n))
        .collect()
}

/// Sums grouped hour values into the fixed buckets. Every bucket is present,
/// empty ones with zero. Values that are not numbers are ignored.
fn bucket_hours(dist: &[(Value, u64)]) -> Vec<(String, u64)> {
    let mut counts = [0u64; HOUR_BUCKETS.len()];
    for (value, n) in dist {
        let hours = match value {
            Value::Number(h) => *h,
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(h) => h,
                Err(_) => continue,
            },
            _ => continue,
        };
        if let Some(i) = HOUR_BUCKETS.iter().position(|(upper, _)| hours < *upper) {
            counts[i] += n;
        }
    }
    HOUR_BUCKETS
        .iter()
        .zip(counts)
        .map(|((_, range), n)| (format!("{} hrs", range), n))
        .collect()
}

fn with_percentages(counts: Vec<(String, u64)>) -> Vec<DataPoint> {
    let total: u64 = counts.iter().map(|(_, n)| n).sum();
    counts
        .into_iter()
        .map(|(label, value)| DataPoint {
            label,
            value,
            percentage: percentage(value, total),
        })
        .collect()
}
