use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::model::entry::{ProductionEntry, ProductionType};
use crate::model::stats::{ChartMode, ChartPoint, DayBucket, GradeCount, ProductionStats};
use crate::service::aggregation::{build_daily_series, chart_series, quality_distribution, summarize};
use crate::service::dto::EntryRow;
use crate::service::filter::EntryFilter;

/// Rows shown in the recent entries table.
pub const RECENT_ENTRIES: usize = 10;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProductionReport {
    pub production_type: ProductionType,
    pub matched: usize,
    pub stats: ProductionStats,
    pub daily: Vec<DayBucket>,
    pub distribution: Vec<GradeCount>,
    pub recent: Vec<EntryRow>,
}

impl ProductionReport {
    pub fn chart(&self, mode: ChartMode) -> Vec<ChartPoint> {
        chart_series(mode, &self.daily, &self.distribution)
    }
}

pub struct ReportUseCase;

impl ReportUseCase {
    /// Narrows `entries` to one type and the filter, then aggregates.
    /// `entries` keep the store's newest-first order for the recent rows.
    pub fn build(
        entries: &[ProductionEntry],
        kind: ProductionType,
        filter: &EntryFilter,
        today: NaiveDate,
    ) -> ProductionReport {
        let selected: Vec<&ProductionEntry> = filter
            .apply(entries, today)
            .into_iter()
            .filter(|e| e.kind() == kind)
            .collect();
        debug!(total = entries.len(), matched = selected.len(), entry_type = %kind, "building report");

        ProductionReport {
            production_type: kind,
            matched: selected.len(),
            stats: summarize(selected.iter().copied(), kind),
            daily: build_daily_series(selected.iter().copied(), kind),
            distribution: quality_distribution(selected.iter().copied()),
            recent: selected
                .iter()
                .take(RECENT_ENTRIES)
                .map(|e| EntryRow::from_entity(e))
                .collect(),
        }
    }
}
