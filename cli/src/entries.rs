use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::NaiveDate;
use millrun_core::service::entry_service::SIGN_IN_TO_SAVE;
use millrun_core::time::{parse_human_date, today};
use millrun_core::{
    expand_key, parse_fields, EntryDraft, EntryError, EntryFilter, EntryRow, EntryService, EntryStore,
    Notifier, ProductionEntry, ProductionType, Severity,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

use crate::display::{or_dash, truncate};

const TEXT_COLUMN_WIDTH: usize = 18;

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Shift")]
    shift: String,
    #[tabled(rename = "Machine")]
    machine: String,
    #[tabled(rename = "Operator")]
    operator: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Production")]
    production: String,
    #[tabled(rename = "Eff.")]
    efficiency: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Defects")]
    defects: u64,
    #[tabled(rename = "Hours")]
    hours: String,
}

impl From<EntryRow> for ListRow {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.short_id,
            date: row.date,
            shift: row.shift,
            machine: or_dash(&truncate(&row.machine_no, TEXT_COLUMN_WIDTH)),
            operator: or_dash(&truncate(&row.operator, TEXT_COLUMN_WIDTH)),
            product: or_dash(&truncate(&row.product, TEXT_COLUMN_WIDTH)),
            production: row.production,
            efficiency: row.efficiency,
            grade: row.grade,
            defects: row.defects,
            hours: row.hours,
        }
    }
}

pub fn entry_table(rows: Vec<EntryRow>) -> Table {
    let rows: Vec<ListRow> = rows.into_iter().map(ListRow::from).collect();
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}

pub fn add<S: EntryStore, N: Notifier>(
    service: &EntryService<S, N>,
    owner: Option<&str>,
    kind: ProductionType,
    args: &[String],
) -> Result<()> {
    let mut draft = EntryDraft::new(kind, today());
    apply_args(&mut draft, args)?;

    let id = service.save(owner, &draft)?;
    print_saved(&id, &draft);
    Ok(())
}

pub fn edit<S: EntryStore, N: Notifier>(
    service: &EntryService<S, N>,
    owner: Option<&str>,
    id: &str,
    args: &[String],
) -> Result<()> {
    let Some(owner) = owner else {
        service.notifier().show_toast(SIGN_IN_TO_SAVE, Severity::Warning);
        return Err(EntryError::NotSignedIn.into());
    };

    let entry = service.find(owner, id)?;
    let mut draft = EntryDraft::from_entry(&entry);
    apply_args(&mut draft, args)?;

    let id = service.save(Some(owner), &draft)?;
    print_saved(&id, &draft);
    Ok(())
}

pub fn delete<S: EntryStore, N: Notifier>(
    service: &EntryService<S, N>,
    owner: Option<&str>,
    id: &str,
    yes: bool,
) -> Result<()> {
    // Resolve short ids before asking, so the prompt names a real entry.
    let entry = match owner {
        Some(owner) => Some(service.find(owner, id)?),
        None => None,
    };

    if let Some(entry) = &entry {
        if !yes && !confirm(&describe(entry))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let id = entry.as_ref().map(|e| e.id.as_str()).unwrap_or(id);
    service.delete(owner, id)
}

pub fn list<S: EntryStore, N: Notifier>(
    service: &EntryService<S, N>,
    owner: Option<&str>,
    kind: ProductionType,
    filter: &EntryFilter,
) -> Result<()> {
    if owner.is_none() {
        println!("Please log in to view production entries.");
        return Ok(());
    }

    let entries = service.list(owner, kind)?;
    let matched = filter.apply(&entries, today());
    if matched.is_empty() {
        if entries.is_empty() {
            println!("No {} entries yet. Add one with `millrun add`.", kind);
        } else {
            println!("No entries match the current filters.");
        }
        return Ok(());
    }

    println!("{} ({} of {} entries)", kind.label(), matched.len(), entries.len());
    let rows = matched.into_iter().map(EntryRow::from_entity).collect();
    println!("{}", entry_table(rows));
    Ok(())
}

/// Prints every field `add`/`edit` accept for `kind`.
pub fn fields(kind: ProductionType) {
    println!("{} fields (key:value, keys may be shortened):", kind.label());
    for name in EntryDraft::field_names(kind) {
        println!("  {}", name);
    }
}

fn apply_args(draft: &mut EntryDraft, args: &[String]) -> Result<()> {
    let parsed = parse_fields(args);
    let names = EntryDraft::field_names(draft.kind());

    for (key, value) in parsed.fields {
        let field = expand_key(&key, &names)?;
        if field == "date" {
            let date = parse_human_date(&value, today())?;
            draft.set(&field, &date.format("%Y-%m-%d").to_string())?;
        } else {
            draft.set(&field, &value)?;
        }
    }

    if !parsed.notes.is_empty() {
        draft.set("notes", &parsed.notes)?;
    }
    Ok(())
}

fn print_saved(id: &str, draft: &EntryDraft) {
    let record = draft.record();
    println!("  ID: {}", id);
    println!("  Type: {}", draft.kind());
    println!("  Date: {} ({})", record.date, record.shift.label());
    println!("  Machine: {}  Operator: {}", record.machine_no, record.operator);
    println!("  Total hours: {}", record.total_hours_label());
    if draft.kind() != ProductionType::Dyeing {
        println!("  Efficiency: {}%", record.details.efficiency());
    }
}

fn describe(entry: &ProductionEntry) -> String {
    format!(
        "{} entry {} on {} ({}, machine {})",
        entry.kind(),
        EntryRow::from_entity(entry).short_id,
        format_date(entry.date()),
        entry.record.shift,
        or_dash(&entry.record.machine_no),
    )
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn confirm(what: &str) -> Result<bool> {
    println!("Deleting {}.", what);
    print!("Are you sure you want to delete this entry? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
