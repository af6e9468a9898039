use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::model::entry::{ProductionEntry, Shift};

/// Reporting window counted back from today.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
    #[serde(rename = "all")]
    All,
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::All
    }
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::Last7Days,
        DateRange::Last30Days,
        DateRange::Last90Days,
        DateRange::All,
    ];

    pub fn days(&self) -> Option<i64> {
        match self {
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::Last90Days => Some(90),
            DateRange::All => None,
        }
    }

    /// First day inside the window, or `None` when unrestricted.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|days| today - Duration::days(days))
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.cutoff(today) {
            Some(cutoff) => date >= cutoff,
            None => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "Last 7 days",
            DateRange::Last30Days => "Last 30 days",
            DateRange::Last90Days => "Last 90 days",
            DateRange::All => "All time",
        }
    }

    pub fn next(&self) -> DateRange {
        match self {
            DateRange::Last7Days => DateRange::Last30Days,
            DateRange::Last30Days => DateRange::Last90Days,
            DateRange::Last90Days => DateRange::All,
            DateRange::All => DateRange::Last7Days,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DateRange {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7" | "7d" | "7days" => Ok(DateRange::Last7Days),
            "30" | "30d" | "30days" => Ok(DateRange::Last30Days),
            "90" | "90d" | "90days" => Ok(DateRange::Last90Days),
            "all" => Ok(DateRange::All),
            _ => Err(EntryError::InvalidValue {
                field: "range".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Conjunction of the list filters; an unset field matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFilter {
    pub range: DateRange,
    pub search: Option<String>,
    pub date: Option<NaiveDate>,
    pub shift: Option<Shift>,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            range: DateRange::All,
            search: None,
            date: None,
            shift: None,
        }
    }
}

impl EntryFilter {
    pub fn with_range(range: DateRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &ProductionEntry, today: NaiveDate) -> bool {
        let record = &entry.record;

        if !self.range.contains(record.date, today) {
            return false;
        }
        if let Some(date) = self.date {
            if record.date != date {
                return false;
            }
        }
        if let Some(shift) = self.shift {
            if record.shift != shift {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [
                    record.operator.as_str(),
                    record.supervisor.as_str(),
                    record.machine_no.as_str(),
                ]
                .into_iter()
                .chain(record.details.descriptive_fields())
                .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    pub fn apply<'a>(&self, entries: &'a [ProductionEntry], today: NaiveDate) -> Vec<&'a ProductionEntry> {
        entries.iter().filter(|e| self.matches(e, today)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::{EntryDetails, EntryRecord, ProductionType};
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn entry(kind: ProductionType, date: NaiveDate, shift: Shift, operator: &str) -> ProductionEntry {
        let mut record = EntryRecord::new(kind, date);
        record.shift = shift;
        record.operator = operator.to_string();
        record.supervisor = "Meera".to_string();
        record.machine_no = "M-01".to_string();
        match &mut record.details {
            EntryDetails::Knitting(k) => k.fabric_type = "Single Jersey".to_string(),
            EntryDetails::Dyeing(d) => d.color = "Navy Blue".to_string(),
            EntryDetails::Garments(g) => g.style = "Polo Shirt".to_string(),
        }
        ProductionEntry {
            id: format!("{}-{}-{}", operator, date, shift),
            user_id: "u".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap(),
            record,
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let today = today();
        let edge = NaiveDate::from_ymd_opt(2024, 6, 23).unwrap();
        let outside = NaiveDate::from_ymd_opt(2024, 6, 22).unwrap();
        assert!(DateRange::Last7Days.contains(edge, today));
        assert!(!DateRange::Last7Days.contains(outside, today));
        assert!(DateRange::All.contains(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(), today));
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let entries = vec![
            entry(ProductionType::Knitting, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), Shift::Night, "Asha"),
            entry(ProductionType::Knitting, today(), Shift::Morning, "Bala"),
        ];
        assert_eq!(EntryFilter::default().apply(&entries, today()).len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_and_type_aware() {
        let dyeing = entry(ProductionType::Dyeing, today(), Shift::Morning, "Asha");
        let garments = entry(ProductionType::Garments, today(), Shift::Morning, "Bala");
        let knitting = entry(ProductionType::Knitting, today(), Shift::Morning, "Chitra");

        let filter = EntryFilter {
            search: Some("navy".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&dyeing, today()));
        assert!(!filter.matches(&garments, today()));

        let filter = EntryFilter {
            search: Some("POLO".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&garments, today()));

        let filter = EntryFilter {
            search: Some("jersey".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&knitting, today()));

        let filter = EntryFilter {
            search: Some("m-01".to_string()),
            ..EntryFilter::default()
        };
        assert!(filter.matches(&knitting, today()));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let entries = vec![
            entry(ProductionType::Knitting, day, Shift::Night, "Asha"),
            entry(ProductionType::Knitting, day, Shift::Morning, "Asha"),
            entry(ProductionType::Knitting, today(), Shift::Night, "Asha"),
            entry(ProductionType::Knitting, day, Shift::Night, "Bala"),
        ];
        let filter = EntryFilter {
            range: DateRange::Last7Days,
            search: Some("asha".to_string()),
            date: Some(day),
            shift: Some(Shift::Night),
        };
        let matched = filter.apply(&entries, today());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, entries[0].id);
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("7days".parse::<DateRange>().unwrap(), DateRange::Last7Days);
        assert_eq!("90".parse::<DateRange>().unwrap(), DateRange::Last90Days);
        assert_eq!("all".parse::<DateRange>().unwrap(), DateRange::All);
        assert!("week".parse::<DateRange>().is_err());
    }
}
