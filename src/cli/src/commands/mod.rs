//! CLI subcommands.

pub mod page;
pub mod walk;

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

/// One record of a page, rendered for table output.
#[derive(Tabled, Serialize)]
pub struct RecordRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Record")]
    pub record: String,
}

const RECORD_WIDTH: usize = 72;

impl RecordRow {
    pub fn rows(records: &[Value], offset: usize) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| Self {
                index: offset + i + 1,
                id: record
                    .get("id")
                    .map(|id| match id {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "-".to_string()),
                record: truncate(&record.to_string(), RECORD_WIDTH),
            })
            .collect()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_number_from_offset() {
        let rows = RecordRow::rows(&[json!({"id": 7}), json!({"id": "b"}), json!({"x": 1})], 4);
        assert_eq!(rows[0].index, 5);
        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[1].id, "b");
        assert_eq!(rows[2].id, "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
