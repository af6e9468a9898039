use anyhow::Result;
use millrun_core::time::today;
use millrun_core::{
    DateRange, EntryFilter, EntryService, EntryStore, Notifier, ProductionReport, ProductionType, ReportUseCase,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

use crate::entries::entry_table;

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct GradeRow {
    #[tabled(rename = "Grade")]
    grade: &'static str,
    #[tabled(rename = "Entries")]
    count: usize,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    label: String,
    #[tabled(rename = "Entries")]
    count: usize,
    #[tabled(rename = "Production")]
    production: String,
    #[tabled(rename = "Efficiency")]
    efficiency: String,
    #[tabled(rename = "Grade A")]
    grade_a: String,
    #[tabled(rename = "Defects")]
    defects: u64,
    #[tabled(rename = "Hours")]
    hours: String,
}

pub fn show<S: EntryStore, N: Notifier>(
    service: &EntryService<S, N>,
    owner: Option<&str>,
    kind: ProductionType,
    range: DateRange,
) -> Result<()> {
    if owner.is_none() {
        println!("Please log in to view production analytics.");
        return Ok(());
    }

    let entries = service.list(owner, kind)?;
    let report = ReportUseCase::build(&entries, kind, &EntryFilter::with_range(range), today());
    print_report(&report, range);
    Ok(())
}

fn print_report(report: &ProductionReport, range: DateRange) {
    let kind = report.production_type;
    println!("\n\x1b[1;36m{}\x1b[0m ({})", kind.label(), range.label());

    if report.matched == 0 {
        println!("No entries in this period.");
        return;
    }

    let stats = &report.stats;
    let unit = kind.unit();
    let mut rows = vec![
        StatRow { metric: "Total entries", value: stats.total_entries.to_string() },
        StatRow { metric: "Total production", value: format!("{} {}", stats.total_production, unit) },
        StatRow { metric: "Average hours", value: format!("{:.1}", stats.avg_hours) },
    ];
    // Dyeing records carry neither efficiency, grade nor defect counts.
    if kind != ProductionType::Dyeing {
        rows.insert(1, StatRow { metric: "Average efficiency", value: format!("{}%", stats.avg_efficiency) });
        rows.push(StatRow { metric: "Grade A", value: format!("{}%", stats.quality_grade_a_percent) });
        rows.push(StatRow { metric: "Total defects", value: stats.total_defects.to_string() });
    }
    println!("{}", styled(Table::new(rows)));

    if kind != ProductionType::Dyeing {
        let grades: Vec<GradeRow> = report
            .distribution
            .iter()
            .map(|g| GradeRow { grade: g.grade.label(), count: g.count })
            .collect();
        println!("\nQuality distribution");
        println!("{}", styled(Table::new(grades)));
    }

    let days: Vec<DayRow> = report
        .daily
        .iter()
        .map(|d| DayRow {
            label: d.label.clone(),
            count: d.count,
            production: format!("{} {}", d.production, unit),
            efficiency: format!("{}%", d.efficiency),
            grade_a: format!("{}%", d.grade_a_percent),
            defects: d.defects,
            hours: format!("{:.1}", d.hours),
        })
        .collect();
    println!("\nDaily production");
    println!("{}", styled(Table::new(days)));

    println!("\nRecent entries");
    println!("{}", entry_table(report.recent.clone()));
}

fn styled(mut table: Table) -> Table {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}
