use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{DocumentTaskRow, DocumentType};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Extraction row plus the derived presentation fields.
///
/// Derivations that depend on `completed_at` stay None for unfinished tasks;
/// downstream filtering and aggregation treat None as "no value", never as
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: i64,
    pub total_value: BigDecimal,
    pub document_type: DocumentType,
    pub task_name: String,
    pub task_status: String,
    pub supplier_tax_id: Option<String>,
    pub supplier_city: Option<String>,
    pub supplier_state: Option<String>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub lead_time_hours: Option<f64>,
    pub posting_date: Option<NaiveDate>,
    pub formatted_tax_id: Option<String>,
}

impl EnrichedRecord {
    /// Pure enrichment step: elapsed hours, posting date, display tax id.
    pub fn from_row(row: DocumentTaskRow) -> Self {
        let lead_time_hours = row
            .completed_at
            .map(|done| (done - row.created_at).num_seconds() as f64 / SECONDS_PER_HOUR);
        let posting_date = row.completed_at.map(|done| done.date());
        let formatted_tax_id = row.supplier_tax_id.as_deref().and_then(format_tax_id);

        Self {
            id: row.id,
            total_value: row.total_value,
            document_type: row.document_type,
            task_name: row.task_name,
            task_status: row.task_status,
            supplier_tax_id: row.supplier_tax_id,
            supplier_city: row.supplier_city,
            supplier_state: row.supplier_state,
            created_at: row.created_at,
            completed_at: row.completed_at,
            lead_time_hours,
            posting_date,
            formatted_tax_id,
        }
    }
}

/// Display mask for a 14-digit supplier identification number:
/// `12345678000195` -> `12.345.678/0001-95`.
///
/// The input is zero-padded to 14 digits first. Values that do not pad to
/// exactly 14 ASCII digits have no display form.
pub fn format_tax_id(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.len() > 14 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{:0>14}", raw);
    Some(format!(
        "{}.{}.{}/{}-{}",
        &padded[..2],
        &padded[2..5],
        &padded[5..8],
        &padded[8..12],
        &padded[12..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(created: NaiveDateTime, completed: Option<NaiveDateTime>) -> DocumentTaskRow {
        DocumentTaskRow {
            id: 1,
            total_value: BigDecimal::from(100),
            document_type: DocumentType::MaterialInvoice,
            task_name: "Posting".to_string(),
            task_status: "Posted".to_string(),
            supplier_tax_id: Some("12345678000195".to_string()),
            supplier_city: Some("Campinas".to_string()),
            supplier_state: Some("SP".to_string()),
            created_at: created,
            completed_at: completed,
        }
    }

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn masks_a_full_14_digit_identifier() {
        assert_eq!(
            format_tax_id("12345678000195").as_deref(),
            Some("12.345.678/0001-95")
        );
    }

    #[test]
    fn zero_pads_short_identifiers_to_14_digits() {
        assert_eq!(format_tax_id("195").as_deref(), Some("00.000.000/0001-95"));
    }

    #[test]
    fn formatted_id_round_trips_when_separators_are_stripped() {
        let raw = "12345678000195";
        let masked = format_tax_id(raw).unwrap();
        let stripped: String = masked.chars().filter(|c| c.is_ascii_digit()).collect();
        assert_eq!(stripped, raw);
    }

    #[test]
    fn rejects_overlong_and_non_digit_identifiers() {
        assert_eq!(format_tax_id("123456780001950"), None);
        assert_eq!(format_tax_id("12.345.678/0001-95"), None);
        assert_eq!(format_tax_id(""), None);
    }

    #[test]
    fn lead_time_and_posting_date_derive_from_completion() {
        let enriched = EnrichedRecord::from_row(row(
            dt(2024, 1, 1, 6),
            Some(dt(2024, 1, 3, 6)),
        ));
        assert_eq!(enriched.lead_time_hours, Some(48.0));
        assert_eq!(
            enriched.posting_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
        );
    }

    #[test]
    fn unfinished_tasks_have_no_derived_time_fields() {
        let enriched = EnrichedRecord::from_row(row(dt(2024, 1, 1, 6), None));
        assert_eq!(enriched.lead_time_hours, None);
        assert_eq!(enriched.posting_date, None);
        assert!(enriched.formatted_tax_id.is_some());
    }
}
