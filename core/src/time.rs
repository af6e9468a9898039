use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use anyhow::{anyhow, Result};

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a form timestamp as a naive local time.
///
/// Accepts `datetime-local` style input (`2024-01-01T08:00`, optional
/// seconds, space or `T` separator) and RFC 3339, which is converted to the
/// host's local time. No further timezone handling is applied.
pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Empty timestamp"));
    }

    for format in LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    Err(anyhow!("Could not parse timestamp: {}", input))
}

/// Parses a calendar day relative to `today`.
///
/// Understands `today`, `yesterday`, `-Nd`/`-Nw` offsets and `YYYY-MM-DD`.
pub fn parse_human_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yest" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix('-') {
        if rest.len() < 2 {
            return Err(anyhow!("Invalid relative date: {}", input));
        }
        let (num_str, unit) = rest.split_at(rest.len() - 1);
        let count: i64 = num_str.parse().map_err(|_| anyhow!("Invalid relative date: {}", input))?;
        return match unit {
            "d" => Ok(today - Duration::days(count)),
            "w" => Ok(today - Duration::weeks(count)),
            _ => Err(anyhow!("Unknown unit in relative date: {}", unit)),
        };
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| anyhow!("Could not parse date: {}", input))
}

/// Short chart label for a day, e.g. `Jan 5`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
