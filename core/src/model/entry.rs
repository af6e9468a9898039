use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::metrics::format_total_hours;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ProductionType {
    Knitting,
    Dyeing,
    Garments,
}

impl Default for ProductionType {
    fn default() -> Self {
        ProductionType::Knitting
    }
}

impl ProductionType {
    pub const ALL: [ProductionType; 3] = [
        ProductionType::Knitting,
        ProductionType::Dyeing,
        ProductionType::Garments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionType::Knitting => "knitting",
            ProductionType::Dyeing => "dyeing",
            ProductionType::Garments => "garments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductionType::Knitting => "Knitting Production",
            ProductionType::Dyeing => "Dyeing Production",
            ProductionType::Garments => "Garments Production",
        }
    }

    /// Unit of the quantity counted as "production" for this type.
    pub fn unit(&self) -> &'static str {
        match self {
            ProductionType::Knitting | ProductionType::Dyeing => "kg",
            ProductionType::Garments => "pcs",
        }
    }
}

impl fmt::Display for ProductionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionType {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "knitting" | "k" => Ok(ProductionType::Knitting),
            "dyeing" | "d" => Ok(ProductionType::Dyeing),
            "garments" | "garment" | "g" => Ok(ProductionType::Garments),
            _ => Err(invalid("type", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

impl Default for Shift {
    fn default() -> Self {
        Shift::Morning
    }
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Night => "night",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Shift::Morning => "Morning (6 AM - 2 PM)",
            Shift::Afternoon => "Afternoon (2 PM - 10 PM)",
            Shift::Night => "Night (10 PM - 6 AM)",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "m" => Ok(Shift::Morning),
            "afternoon" | "a" => Ok(Shift::Afternoon),
            "night" | "n" => Ok(Shift::Night),
            _ => Err(invalid("shift", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityGrade {
    A,
    B,
    C,
    Reject,
}

impl Default for QualityGrade {
    fn default() -> Self {
        QualityGrade::A
    }
}

impl QualityGrade {
    /// Canonical order used by distributions and charts.
    pub const ALL: [QualityGrade; 4] = [
        QualityGrade::A,
        QualityGrade::B,
        QualityGrade::C,
        QualityGrade::Reject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::Reject => "Reject",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::A => "Grade A (Premium)",
            QualityGrade::B => "Grade B (Standard)",
            QualityGrade::C => "Grade C (Below Standard)",
            QualityGrade::Reject => "Reject",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityGrade {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" => Ok(QualityGrade::A),
            "b" => Ok(QualityGrade::B),
            "c" => Ok(QualityGrade::C),
            "reject" | "r" => Ok(QualityGrade::Reject),
            _ => Err(invalid("qualityGrade", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl Default for QualityRating {
    fn default() -> Self {
        QualityRating::Excellent
    }
}

impl FromStr for QualityRating {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excellent" => Ok(QualityRating::Excellent),
            "good" => Ok(QualityRating::Good),
            "acceptable" => Ok(QualityRating::Acceptable),
            "poor" => Ok(QualityRating::Poor),
            _ => Err(invalid("quality rating", s)),
        }
    }
}

fn invalid(field: &str, value: &str) -> EntryError {
    EntryError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KnittingDefects {
    pub holes: u32,
    pub drop_stitches: u32,
    pub yarn_breaks: u32,
    pub other: u32,
}

impl KnittingDefects {
    pub fn total(&self) -> u64 {
        self.holes as u64 + self.drop_stitches as u64 + self.yarn_breaks as u64 + self.other as u64
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GarmentDefects {
    pub stitching_defects: u32,
    pub measurement_defects: u32,
    pub fabric_defects: u32,
    pub other: u32,
}

impl GarmentDefects {
    pub fn total(&self) -> u64 {
        self.stitching_defects as u64
            + self.measurement_defects as u64
            + self.fabric_defects as u64
            + self.other as u64
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GarmentOperations {
    pub cutting: u32,
    pub sewing: u32,
    pub finishing: u32,
    pub packing: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct ChemicalConsumption {
    pub dyes: f64,
    pub salt: f64,
    pub soda: f64,
    pub auxiliaries: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityResults {
    pub color_match: QualityRating,
    pub fastness: QualityRating,
    pub uniformity: QualityRating,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KnittingDetails {
    pub fabric_type: String,
    pub yarn_type: String,
    pub yarn_lot: String,
    pub gauge: String,
    pub gsm: f64,
    pub width: f64,
    pub target_production: f64,
    pub actual_production: f64,
    pub efficiency: i64,
    pub defects: KnittingDefects,
    pub quality_grade: QualityGrade,
    pub rpm: f64,
    pub needle_breaks: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DyeingDetails {
    pub fabric_type: String,
    pub color: String,
    pub dye_type: String,
    pub batch_weight: f64,
    pub liquor_ratio: f64,
    pub temperature: f64,
    #[serde(rename = "pH")]
    pub ph: f64,
    pub process_time: f64,
    pub chemical_consumption: ChemicalConsumption,
    pub quality_results: QualityResults,
    pub water_consumption: f64,
    pub energy_consumption: f64,
    pub waste_generated: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GarmentsDetails {
    pub style: String,
    pub size: String,
    pub color: String,
    pub target_quantity: f64,
    pub completed_quantity: f64,
    pub efficiency: i64,
    pub defects: GarmentDefects,
    pub operations: GarmentOperations,
    pub quality_grade: QualityGrade,
    pub rework: u32,
}

/// Variant-specific payload, tagged by `type` in the stored document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryDetails {
    Knitting(KnittingDetails),
    Dyeing(DyeingDetails),
    Garments(GarmentsDetails),
}

impl EntryDetails {
    pub fn empty(kind: ProductionType) -> Self {
        match kind {
            ProductionType::Knitting => EntryDetails::Knitting(KnittingDetails::default()),
            ProductionType::Dyeing => EntryDetails::Dyeing(DyeingDetails::default()),
            ProductionType::Garments => EntryDetails::Garments(GarmentsDetails::default()),
        }
    }

    pub fn kind(&self) -> ProductionType {
        match self {
            EntryDetails::Knitting(_) => ProductionType::Knitting,
            EntryDetails::Dyeing(_) => ProductionType::Dyeing,
            EntryDetails::Garments(_) => ProductionType::Garments,
        }
    }

    /// Dyeing has no target/actual pair, so it reports 0.
    pub fn efficiency(&self) -> i64 {
        match self {
            EntryDetails::Knitting(k) => k.efficiency,
            EntryDetails::Dyeing(_) => 0,
            EntryDetails::Garments(g) => g.efficiency,
        }
    }

    pub fn quality_grade(&self) -> Option<QualityGrade> {
        match self {
            EntryDetails::Knitting(k) => Some(k.quality_grade),
            EntryDetails::Dyeing(_) => None,
            EntryDetails::Garments(g) => Some(g.quality_grade),
        }
    }

    pub fn production_quantity(&self) -> f64 {
        match self {
            EntryDetails::Knitting(k) => k.actual_production,
            EntryDetails::Dyeing(d) => d.batch_weight,
            EntryDetails::Garments(g) => g.completed_quantity,
        }
    }

    pub fn defect_total(&self) -> u64 {
        match self {
            EntryDetails::Knitting(k) => k.defects.total(),
            EntryDetails::Dyeing(_) => 0,
            EntryDetails::Garments(g) => g.defects.total(),
        }
    }

    /// Free-text fields matched by the search filter, besides the common ones.
    pub fn descriptive_fields(&self) -> Vec<&str> {
        match self {
            EntryDetails::Knitting(k) => vec![k.fabric_type.as_str()],
            EntryDetails::Dyeing(d) => vec![d.color.as_str(), d.fabric_type.as_str()],
            EntryDetails::Garments(g) => vec![g.style.as_str(), g.color.as_str()],
        }
    }
}

/// Everything the operator composes; the store adds id, owner and timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub shift: Shift,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub supervisor: String,
    #[serde(default)]
    pub machine_no: String,
    #[serde(default)]
    pub start_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl EntryRecord {
    pub fn new(kind: ProductionType, date: NaiveDate) -> Self {
        Self {
            date,
            shift: Shift::default(),
            operator: String::new(),
            supervisor: String::new(),
            machine_no: String::new(),
            start_date_time: None,
            end_date_time: None,
            total_minutes: 0,
            notes: None,
            details: EntryDetails::empty(kind),
        }
    }

    pub fn kind(&self) -> ProductionType {
        self.details.kind()
    }

    pub fn total_hours(&self) -> f64 {
        self.total_minutes as f64 / 60.0
    }

    pub fn total_hours_label(&self) -> String {
        format_total_hours(self.total_minutes)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEntry {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub record: EntryRecord,
}

impl ProductionEntry {
    pub fn kind(&self) -> ProductionType {
        self.record.kind()
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn efficiency(&self) -> i64 {
        self.record.details.efficiency()
    }

    pub fn quality_grade(&self) -> Option<QualityGrade> {
        self.record.details.quality_grade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_shape_is_flat_and_tagged() {
        let mut record = EntryRecord::new(
            ProductionType::Dyeing,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        if let EntryDetails::Dyeing(d) = &mut record.details {
            d.batch_weight = 250.0;
            d.ph = 6.5;
        }
        let entry = ProductionEntry {
            id: "doc-1".to_string(),
            user_id: "u1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            record,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "dyeing");
        assert_eq!(json["batchWeight"], 250.0);
        assert_eq!(json["pH"], 6.5);
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["qualityResults"]["colorMatch"], "excellent");

        let back: ProductionEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_reads_sparse_document() {
        let json = r#"{
            "id": "x", "userId": "u", "timestamp": "2024-01-02T00:00:00Z",
            "type": "knitting", "date": "2024-01-01",
            "actualProduction": 120, "qualityGrade": "Reject",
            "defects": {"holes": 2, "dropStitches": 1, "yarnBreaks": 0, "other": 3}
        }"#;
        let entry: ProductionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind(), ProductionType::Knitting);
        assert_eq!(entry.quality_grade(), Some(QualityGrade::Reject));
        assert_eq!(entry.record.details.production_quantity(), 120.0);
        assert_eq!(entry.record.details.defect_total(), 6);
        assert_eq!(entry.record.shift, Shift::Morning);
    }

    #[test]
    fn test_dyeing_has_no_grade_or_efficiency() {
        let details = EntryDetails::empty(ProductionType::Dyeing);
        assert_eq!(details.quality_grade(), None);
        assert_eq!(details.efficiency(), 0);
        assert_eq!(details.defect_total(), 0);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Garments".parse::<ProductionType>().unwrap(), ProductionType::Garments);
        assert_eq!("night".parse::<Shift>().unwrap(), Shift::Night);
        assert_eq!("reject".parse::<QualityGrade>().unwrap(), QualityGrade::Reject);
        assert!("weaving".parse::<ProductionType>().is_err());
    }
}
