use serde::{Deserialize, Serialize};

use crate::model::entry::{EntryDetails, ProductionEntry};

const SHORT_ID_LEN: usize = 8;

/// One entry flattened to display strings, as the entry tables show it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EntryRow {
    pub id: String,
    pub short_id: String,
    pub date: String,
    pub shift: String,
    pub machine_no: String,
    pub operator: String,
    /// Fabric type, color or style, whichever describes the variant.
    pub product: String,
    pub production: String,
    pub efficiency: String,
    pub grade: String,
    pub defects: u64,
    pub hours: String,
}

impl EntryRow {
    pub fn from_entity(entry: &ProductionEntry) -> Self {
        let record = &entry.record;
        let details = &record.details;
        let unit = entry.kind().unit();

        // Dyeing has neither efficiency nor grade to show.
        let (product, efficiency, grade) = match details {
            EntryDetails::Knitting(k) => (
                k.fabric_type.clone(),
                format!("{}%", k.efficiency),
                k.quality_grade.to_string(),
            ),
            EntryDetails::Dyeing(d) => (d.color.clone(), "-".to_string(), "-".to_string()),
            EntryDetails::Garments(g) => (
                g.style.clone(),
                format!("{}%", g.efficiency),
                g.quality_grade.to_string(),
            ),
        };

        Self {
            id: entry.id.clone(),
            short_id: entry.id.chars().take(SHORT_ID_LEN).collect(),
            date: record.date.format("%Y-%m-%d").to_string(),
            shift: record.shift.to_string(),
            machine_no: record.machine_no.clone(),
            operator: record.operator.clone(),
            product,
            production: format!("{} {}", details.production_quantity(), unit),
            efficiency,
            grade,
            defects: details.defect_total(),
            hours: record.total_hours_label(),
        }
    }
}
