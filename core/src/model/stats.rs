use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::model::entry::QualityGrade;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductionStats {
    pub total_entries: usize,
    pub avg_efficiency: i64,
    pub total_production: i64,
    pub quality_grade_a_percent: i64,
    pub total_defects: u64,
    pub avg_hours: f64,
}

/// All entries sharing one calendar date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    pub label: String,
    pub production: f64,
    pub efficiency: i64,
    pub hours: f64,
    pub count: usize,
    pub defects: u64,
    pub grade_a: usize,
    pub grade_a_percent: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeCount {
    pub grade: QualityGrade,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Daily,
    Efficiency,
    Quality,
    Defects,
}

impl Default for ChartMode {
    fn default() -> Self {
        ChartMode::Daily
    }
}

impl ChartMode {
    pub const ALL: [ChartMode; 4] = [
        ChartMode::Daily,
        ChartMode::Efficiency,
        ChartMode::Quality,
        ChartMode::Defects,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChartMode::Daily => "Daily Production",
            ChartMode::Efficiency => "Efficiency Trend",
            ChartMode::Quality => "Quality Distribution",
            ChartMode::Defects => "Defects Analysis",
        }
    }

    pub fn next(&self) -> ChartMode {
        match self {
            ChartMode::Daily => ChartMode::Efficiency,
            ChartMode::Efficiency => ChartMode::Quality,
            ChartMode::Quality => ChartMode::Defects,
            ChartMode::Defects => ChartMode::Daily,
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ChartMode {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(ChartMode::Daily),
            "efficiency" => Ok(ChartMode::Efficiency),
            "quality" => Ok(ChartMode::Quality),
            "defects" => Ok(ChartMode::Defects),
            _ => Err(EntryError::InvalidValue {
                field: "chart".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}
