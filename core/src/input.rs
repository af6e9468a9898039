use anyhow::{anyhow, Result};

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    /// `key:value` pairs in the order given.
    pub fields: Vec<(String, String)>,
    /// Remaining words, joined; used as entry notes.
    pub notes: String,
}

/// Splits CLI words into `key:value` fields and free text.
/// Only the first colon separates, so timestamps survive as values.
pub fn parse_fields(args: &[String]) -> ParsedInput {
    let mut note_parts = Vec::new();
    let mut fields = Vec::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && !key.contains(char::is_whitespace) {
                fields.push((key.to_string(), value.to_string()));
                continue;
            }
        }
        note_parts.push(arg.as_str());
    }

    ParsedInput {
        fields,
        notes: note_parts.join(" "),
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // Case-insensitive prefix, so `machine` finds `machineNo`.
    let lowered = key.to_lowercase();
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.to_lowercase().starts_with(&lowered))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let args = vec![
            "op:Asha".to_string(),
            "start:2024-01-01T08:00".to_string(),
            "yarn".to_string(),
            "lot".to_string(),
            "changed".to_string(),
            "defects.holes:2".to_string(),
        ];
        let parsed = parse_fields(&args);
        assert_eq!(parsed.notes, "yarn lot changed");
        assert_eq!(
            parsed.fields,
            vec![
                ("op".to_string(), "Asha".to_string()),
                ("start".to_string(), "2024-01-01T08:00".to_string()),
                ("defects.holes".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_leading_colon_is_text() {
        let parsed = parse_fields(&[":)".to_string()]);
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.notes, ":)");
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["operator", "machineNo", "startDateTime", "supervisor", "shift"];

        assert_eq!(expand_key("o", &candidates).unwrap(), "operator");
        assert_eq!(expand_key("machine", &candidates).unwrap(), "machineNo");
        assert_eq!(expand_key("start", &candidates).unwrap(), "startDateTime");
        assert_eq!(expand_key("shift", &candidates).unwrap(), "shift");
        assert_eq!(expand_key("su", &candidates).unwrap(), "supervisor");

        // Ambiguous
        assert!(expand_key("s", &candidates).is_err());
        assert!(expand_key("sh", &candidates).is_ok());

        // Unknown
        assert!(expand_key("x", &candidates).is_err());
    }
}
