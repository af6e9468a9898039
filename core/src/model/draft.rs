use chrono::{NaiveDate, NaiveDateTime};

use crate::error::EntryError;
use crate::metrics::{coerce_count, coerce_number, compute_efficiency, compute_total_minutes};
use crate::model::entry::{EntryDetails, EntryRecord, ProductionEntry, ProductionType};
use crate::time::parse_local_datetime;

const COMMON_FIELDS: [&str; 8] = [
    "date",
    "shift",
    "operator",
    "supervisor",
    "machineNo",
    "startDateTime",
    "endDateTime",
    "notes",
];

const KNITTING_FIELDS: [&str; 15] = [
    "fabricType",
    "yarnType",
    "yarnLot",
    "gauge",
    "gsm",
    "width",
    "targetProduction",
    "actualProduction",
    "defects.holes",
    "defects.dropStitches",
    "defects.yarnBreaks",
    "defects.other",
    "qualityGrade",
    "rpm",
    "needleBreaks",
];

const DYEING_FIELDS: [&str; 18] = [
    "fabricType",
    "color",
    "dyeType",
    "batchWeight",
    "liquorRatio",
    "temperature",
    "pH",
    "processTime",
    "chemicalConsumption.dyes",
    "chemicalConsumption.salt",
    "chemicalConsumption.soda",
    "chemicalConsumption.auxiliaries",
    "qualityResults.colorMatch",
    "qualityResults.fastness",
    "qualityResults.uniformity",
    "waterConsumption",
    "energyConsumption",
    "wasteGenerated",
];

const GARMENTS_FIELDS: [&str; 15] = [
    "style",
    "size",
    "color",
    "targetQuantity",
    "completedQuantity",
    "defects.stitchingDefects",
    "defects.measurementDefects",
    "defects.fabricDefects",
    "defects.other",
    "operations.cutting",
    "operations.sewing",
    "operations.finishing",
    "operations.packing",
    "qualityGrade",
    "rework",
];

const DERIVED_FIELDS: [&str; 3] = ["efficiency", "totalHours", "totalMinutes"];

/// Which derived field a raw edit invalidates.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Derived {
    Nothing,
    TotalHours,
    Efficiency,
}

/// Form state for one entry being created or edited.
///
/// Raw edits go through [`EntryDraft::set`], which recomputes only the
/// derived field that depends on the edited input.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    record: EntryRecord,
    editing: Option<String>,
}

impl EntryDraft {
    pub fn new(kind: ProductionType, today: NaiveDate) -> Self {
        Self {
            record: EntryRecord::new(kind, today),
            editing: None,
        }
    }

    pub fn from_entry(entry: &ProductionEntry) -> Self {
        Self {
            record: entry.record.clone(),
            editing: Some(entry.id.clone()),
        }
    }

    pub fn kind(&self) -> ProductionType {
        self.record.kind()
    }

    pub fn record(&self) -> &EntryRecord {
        &self.record
    }

    /// Id of the stored entry this draft replaces, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn field_names(kind: ProductionType) -> Vec<&'static str> {
        let specific: &[&'static str] = match kind {
            ProductionType::Knitting => &KNITTING_FIELDS,
            ProductionType::Dyeing => &DYEING_FIELDS,
            ProductionType::Garments => &GARMENTS_FIELDS,
        };
        COMMON_FIELDS.iter().chain(specific.iter()).copied().collect()
    }

    pub fn set(&mut self, field: &str, raw: &str) -> Result<(), EntryError> {
        if DERIVED_FIELDS.contains(&field) {
            return Err(EntryError::DerivedField(field.to_string()));
        }

        let derived = match field {
            "date" => {
                self.record.date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| invalid(field, raw))?;
                Derived::Nothing
            }
            "shift" => {
                self.record.shift = raw.parse()?;
                Derived::Nothing
            }
            "operator" => {
                self.record.operator = text(raw);
                Derived::Nothing
            }
            "supervisor" => {
                self.record.supervisor = text(raw);
                Derived::Nothing
            }
            "machineNo" => {
                self.record.machine_no = text(raw);
                Derived::Nothing
            }
            "startDateTime" => {
                self.record.start_date_time = timestamp(field, raw)?;
                Derived::TotalHours
            }
            "endDateTime" => {
                self.record.end_date_time = timestamp(field, raw)?;
                Derived::TotalHours
            }
            "notes" => {
                let notes = raw.trim();
                self.record.notes = if notes.is_empty() { None } else { Some(notes.to_string()) };
                Derived::Nothing
            }
            _ => self.set_detail(field, raw)?,
        };

        match derived {
            Derived::TotalHours => self.recompute_total_hours(),
            Derived::Efficiency => self.recompute_efficiency(),
            Derived::Nothing => {}
        }
        Ok(())
    }

    fn set_detail(&mut self, field: &str, raw: &str) -> Result<Derived, EntryError> {
        let kind = self.kind();
        let unknown = || EntryError::UnknownField {
            field: field.to_string(),
            kind,
        };

        match &mut self.record.details {
            EntryDetails::Knitting(k) => match field {
                "fabricType" => k.fabric_type = text(raw),
                "yarnType" => k.yarn_type = text(raw),
                "yarnLot" => k.yarn_lot = text(raw),
                "gauge" => k.gauge = text(raw),
                "gsm" => k.gsm = coerce_number(raw),
                "width" => k.width = coerce_number(raw),
                "targetProduction" => {
                    k.target_production = coerce_number(raw);
                    return Ok(Derived::Efficiency);
                }
                "actualProduction" => {
                    k.actual_production = coerce_number(raw);
                    return Ok(Derived::Efficiency);
                }
                "defects.holes" => k.defects.holes = coerce_count(raw),
                "defects.dropStitches" => k.defects.drop_stitches = coerce_count(raw),
                "defects.yarnBreaks" => k.defects.yarn_breaks = coerce_count(raw),
                "defects.other" => k.defects.other = coerce_count(raw),
                "qualityGrade" => k.quality_grade = raw.parse()?,
                "rpm" => k.rpm = coerce_number(raw),
                "needleBreaks" => k.needle_breaks = coerce_count(raw),
                _ => return Err(unknown()),
            },
            EntryDetails::Dyeing(d) => match field {
                "fabricType" => d.fabric_type = text(raw),
                "color" => d.color = text(raw),
                "dyeType" => d.dye_type = text(raw),
                "batchWeight" => d.batch_weight = coerce_number(raw),
                "liquorRatio" => d.liquor_ratio = coerce_number(raw),
                "temperature" => d.temperature = coerce_number(raw),
                "pH" => d.ph = coerce_number(raw),
                "processTime" => d.process_time = coerce_number(raw),
                "chemicalConsumption.dyes" => d.chemical_consumption.dyes = coerce_number(raw),
                "chemicalConsumption.salt" => d.chemical_consumption.salt = coerce_number(raw),
                "chemicalConsumption.soda" => d.chemical_consumption.soda = coerce_number(raw),
                "chemicalConsumption.auxiliaries" => {
                    d.chemical_consumption.auxiliaries = coerce_number(raw)
                }
                "qualityResults.colorMatch" => d.quality_results.color_match = raw.parse()?,
                "qualityResults.fastness" => d.quality_results.fastness = raw.parse()?,
                "qualityResults.uniformity" => d.quality_results.uniformity = raw.parse()?,
                "waterConsumption" => d.water_consumption = coerce_number(raw),
                "energyConsumption" => d.energy_consumption = coerce_number(raw),
                "wasteGenerated" => d.waste_generated = coerce_number(raw),
                _ => return Err(unknown()),
            },
            EntryDetails::Garments(g) => match field {
                "style" => g.style = text(raw),
                "size" => g.size = text(raw),
                "color" => g.color = text(raw),
                "targetQuantity" => {
                    g.target_quantity = coerce_number(raw);
                    return Ok(Derived::Efficiency);
                }
                "completedQuantity" => {
                    g.completed_quantity = coerce_number(raw);
                    return Ok(Derived::Efficiency);
                }
                "defects.stitchingDefects" => g.defects.stitching_defects = coerce_count(raw),
                "defects.measurementDefects" => g.defects.measurement_defects = coerce_count(raw),
                "defects.fabricDefects" => g.defects.fabric_defects = coerce_count(raw),
                "defects.other" => g.defects.other = coerce_count(raw),
                "operations.cutting" => g.operations.cutting = coerce_count(raw),
                "operations.sewing" => g.operations.sewing = coerce_count(raw),
                "operations.finishing" => g.operations.finishing = coerce_count(raw),
                "operations.packing" => g.operations.packing = coerce_count(raw),
                "qualityGrade" => g.quality_grade = raw.parse()?,
                "rework" => g.rework = coerce_count(raw),
                _ => return Err(unknown()),
            },
        }
        Ok(Derived::Nothing)
    }

    pub fn recompute_total_hours(&mut self) {
        self.record.total_minutes =
            compute_total_minutes(self.record.start_date_time, self.record.end_date_time);
    }

    pub fn recompute_efficiency(&mut self) {
        match &mut self.record.details {
            EntryDetails::Knitting(k) => {
                k.efficiency = compute_efficiency(k.actual_production, k.target_production)
            }
            EntryDetails::Garments(g) => {
                g.efficiency = compute_efficiency(g.completed_quantity, g.target_quantity)
            }
            EntryDetails::Dyeing(_) => {}
        }
    }

    pub fn validate(&self) -> Result<(), EntryError> {
        let r = &self.record;
        let mut missing = Vec::new();
        if r.operator.trim().is_empty() {
            missing.push("operator");
        }
        if r.supervisor.trim().is_empty() {
            missing.push("supervisor");
        }
        if r.machine_no.trim().is_empty() {
            missing.push("machineNo");
        }
        if r.start_date_time.is_none() {
            missing.push("startDateTime");
        }
        if r.end_date_time.is_none() {
            missing.push("endDateTime");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EntryError::MissingFields(missing))
        }
    }
}

fn text(raw: &str) -> String {
    raw.trim().to_string()
}

fn timestamp(field: &str, raw: &str) -> Result<Option<NaiveDateTime>, EntryError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_local_datetime(raw)
        .map(Some)
        .map_err(|_| invalid(field, raw))
}

fn invalid(field: &str, raw: &str) -> EntryError {
    EntryError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::QualityGrade;
    use chrono::{TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn knitting_efficiency(draft: &EntryDraft) -> i64 {
        draft.record().details.efficiency()
    }

    #[test]
    fn test_efficiency_follows_actual_and_target() {
        let mut draft = EntryDraft::new(ProductionType::Knitting, day());
        draft.set("targetProduction", "500").unwrap();
        assert_eq!(knitting_efficiency(&draft), 0);
        draft.set("actualProduction", "450").unwrap();
        assert_eq!(knitting_efficiency(&draft), 90);
        draft.set("targetProduction", "").unwrap();
        assert_eq!(knitting_efficiency(&draft), 0);
    }

    #[test]
    fn test_garments_efficiency_uses_quantities() {
        let mut draft = EntryDraft::new(ProductionType::Garments, day());
        draft.set("targetQuantity", "200").unwrap();
        draft.set("completedQuantity", "150").unwrap();
        assert_eq!(draft.record().details.efficiency(), 75);
    }

    #[test]
    fn test_total_hours_follows_timestamps() {
        let mut draft = EntryDraft::new(ProductionType::Dyeing, day());
        draft.set("startDateTime", "2024-01-01T08:00").unwrap();
        assert_eq!(draft.record().total_hours_label(), "0 Hrs 0 Min");
        draft.set("endDateTime", "2024-01-01T16:45").unwrap();
        assert_eq!(draft.record().total_minutes, 525);
        assert_eq!(draft.record().total_hours_label(), "8 Hrs 45 Min");
        draft.set("endDateTime", "2024-01-01T07:00").unwrap();
        assert_eq!(draft.record().total_minutes, 0);
    }

    #[test]
    fn test_only_affected_field_is_recomputed() {
        let mut draft = EntryDraft::new(ProductionType::Knitting, day());
        draft.set("targetProduction", "500").unwrap();
        draft.set("actualProduction", "450").unwrap();

        let mut entry = ProductionEntry {
            id: "e1".to_string(),
            user_id: "u".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            record: draft.record().clone(),
        };
        // A stored value the current inputs would not produce.
        if let EntryDetails::Knitting(k) = &mut entry.record.details {
            k.efficiency = 55;
        }
        entry.record.total_minutes = 42;

        let mut edit = EntryDraft::from_entry(&entry);
        edit.set("startDateTime", "2024-01-01T08:00").unwrap();
        assert_eq!(knitting_efficiency(&edit), 55);
        assert_eq!(edit.record().total_minutes, 0);

        edit.set("fabricType", "Cotton").unwrap();
        assert_eq!(knitting_efficiency(&edit), 55);

        edit.set("actualProduction", "450").unwrap();
        assert_eq!(knitting_efficiency(&edit), 90);
    }

    #[test]
    fn test_recompute_twice_is_stable() {
        let mut draft = EntryDraft::new(ProductionType::Garments, day());
        draft.set("targetQuantity", "300").unwrap();
        draft.set("completedQuantity", "251").unwrap();
        draft.set("startDateTime", "2024-01-01T06:00").unwrap();
        draft.set("endDateTime", "2024-01-01T14:10").unwrap();
        let once = draft.clone();
        draft.recompute_efficiency();
        draft.recompute_total_hours();
        draft.recompute_efficiency();
        draft.recompute_total_hours();
        assert_eq!(draft, once);
    }

    #[test]
    fn test_bad_numbers_coerce_to_zero() {
        let mut draft = EntryDraft::new(ProductionType::Knitting, day());
        draft.set("targetProduction", "lots").unwrap();
        draft.set("actualProduction", "450").unwrap();
        draft.set("defects.holes", "-2").unwrap();
        assert_eq!(knitting_efficiency(&draft), 0);
        assert_eq!(draft.record().details.defect_total(), 0);
    }

    #[test]
    fn test_field_errors() {
        let mut draft = EntryDraft::new(ProductionType::Dyeing, day());
        assert!(matches!(
            draft.set("actualProduction", "1"),
            Err(EntryError::UnknownField { kind: ProductionType::Dyeing, .. })
        ));
        assert_eq!(
            draft.set("efficiency", "99"),
            Err(EntryError::DerivedField("efficiency".to_string()))
        );
        assert!(matches!(draft.set("shift", "evening"), Err(EntryError::InvalidValue { .. })));
        assert!(matches!(draft.set("startDateTime", "noon"), Err(EntryError::InvalidValue { .. })));
        assert!(matches!(draft.set("qualityResults.fastness", "meh"), Err(EntryError::InvalidValue { .. })));
    }

    #[test]
    fn test_grade_and_nested_fields() {
        let mut draft = EntryDraft::new(ProductionType::Garments, day());
        draft.set("qualityGrade", "reject").unwrap();
        draft.set("defects.fabricDefects", "3").unwrap();
        draft.set("defects.other", "1").unwrap();
        assert_eq!(draft.record().details.quality_grade(), Some(QualityGrade::Reject));
        assert_eq!(draft.record().details.defect_total(), 4);
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let mut draft = EntryDraft::new(ProductionType::Knitting, day());
        draft.set("operator", "Asha").unwrap();
        draft.set("endDateTime", "2024-01-01T16:00").unwrap();
        assert_eq!(
            draft.validate(),
            Err(EntryError::MissingFields(vec!["supervisor", "machineNo", "startDateTime"]))
        );

        draft.set("supervisor", "Ravi").unwrap();
        draft.set("machineNo", "K-12").unwrap();
        draft.set("startDateTime", "2024-01-01T08:00").unwrap();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_field_names_cover_type_specific_fields() {
        let names = EntryDraft::field_names(ProductionType::Dyeing);
        assert!(names.contains(&"machineNo"));
        assert!(names.contains(&"pH"));
        assert!(!names.contains(&"actualProduction"));
    }
}
