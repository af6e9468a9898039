//! Reduces a filtered list of entries into summary statistics and chart series.
//!
//! Callers pass entries already narrowed to one production type and one
//! date window. None of these functions fail; empty input yields zeros and
//! empty series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::metrics::{round_half_up, round_one_decimal};
use crate::model::entry::{ProductionEntry, ProductionType, QualityGrade};
use crate::model::stats::{ChartMode, ChartPoint, DayBucket, GradeCount, ProductionStats};
use crate::time::day_label;

#[derive(Default)]
struct DayTotals {
    production: f64,
    efficiency: i64,
    hours: f64,
    count: usize,
    defects: u64,
    grade_a: usize,
}

pub fn summarize<'a, I>(entries: I, kind: ProductionType) -> ProductionStats
where
    I: IntoIterator<Item = &'a ProductionEntry>,
{
    let mut total_entries = 0usize;
    let mut efficiency_sum = 0i64;
    let mut production = 0.0;
    let mut total_defects = 0u64;
    let mut grade_a = 0usize;
    let mut minutes = 0i64;

    for entry in entries {
        total_entries += 1;
        efficiency_sum += entry.efficiency();
        production += production_for(entry, kind);
        total_defects += defects_for(entry, kind);
        if is_grade_a(entry) {
            grade_a += 1;
        }
        minutes += entry.record.total_minutes;
    }

    if total_entries == 0 {
        return ProductionStats::default();
    }

    let count = total_entries as f64;
    ProductionStats {
        total_entries,
        avg_efficiency: round_half_up(efficiency_sum as f64 / count),
        total_production: round_half_up(production),
        quality_grade_a_percent: round_half_up(grade_a as f64 / count * 100.0),
        total_defects,
        avg_hours: round_one_decimal(minutes as f64 / 60.0 / count),
    }
}

/// One bucket per calendar date, ascending by date.
pub fn build_daily_series<'a, I>(entries: I, kind: ProductionType) -> Vec<DayBucket>
where
    I: IntoIterator<Item = &'a ProductionEntry>,
{
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();

    for entry in entries {
        let day = days.entry(entry.date()).or_default();
        day.production += production_for(entry, kind);
        day.efficiency += entry.efficiency();
        day.hours += entry.record.total_hours();
        day.count += 1;
        day.defects += defects_for(entry, kind);
        if is_grade_a(entry) {
            day.grade_a += 1;
        }
    }

    days.into_iter()
        .map(|(date, day)| {
            let count = day.count as f64;
            DayBucket {
                date,
                label: day_label(date),
                production: day.production,
                efficiency: round_half_up(day.efficiency as f64 / count),
                hours: day.hours,
                count: day.count,
                defects: day.defects,
                grade_a: day.grade_a,
                grade_a_percent: round_half_up(day.grade_a as f64 / count * 100.0),
            }
        })
        .collect()
}

/// Count per grade, always listing A, B, C and Reject in that order.
pub fn quality_distribution<'a, I>(entries: I) -> Vec<GradeCount>
where
    I: IntoIterator<Item = &'a ProductionEntry>,
{
    let mut counts = [0usize; QualityGrade::ALL.len()];
    for entry in entries {
        if let Some(grade) = entry.quality_grade() {
            if let Some(slot) = QualityGrade::ALL.iter().position(|g| *g == grade) {
                counts[slot] += 1;
            }
        }
    }

    QualityGrade::ALL
        .iter()
        .zip(counts)
        .map(|(grade, count)| GradeCount { grade: *grade, count })
        .collect()
}

pub fn chart_series(mode: ChartMode, daily: &[DayBucket], distribution: &[GradeCount]) -> Vec<ChartPoint> {
    match mode {
        ChartMode::Daily => daily
            .iter()
            .map(|d| ChartPoint { label: d.label.clone(), value: d.production })
            .collect(),
        ChartMode::Efficiency => daily
            .iter()
            .map(|d| ChartPoint { label: d.label.clone(), value: d.efficiency as f64 })
            .collect(),
        ChartMode::Defects => daily
            .iter()
            .map(|d| ChartPoint { label: d.label.clone(), value: d.defects as f64 })
            .collect(),
        ChartMode::Quality => distribution
            .iter()
            .map(|g| ChartPoint { label: g.grade.label().to_string(), value: g.count as f64 })
            .collect(),
    }
}

fn production_for(entry: &ProductionEntry, kind: ProductionType) -> f64 {
    if entry.kind() != kind {
        debug!(id = %entry.id, entry_type = %entry.kind(), report_type = %kind, "entry outside report type counted as zero production");
        return 0.0;
    }
    entry.record.details.production_quantity()
}

// Dyeing records carry no defect counts and no grade, so they add nothing
// to defect totals and never count as grade A. Extending the dyeing schema
// would change these figures.
fn defects_for(entry: &ProductionEntry, kind: ProductionType) -> u64 {
    if entry.kind() != kind {
        return 0;
    }
    entry.record.details.defect_total()
}

fn is_grade_a(entry: &ProductionEntry) -> bool {
    entry.quality_grade() == Some(QualityGrade::A)
}
