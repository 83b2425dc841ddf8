use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::models::{DocumentType, EnrichedRecord};

/// Conjunction of predicates the sidebar applies to the enriched snapshot.
///
/// Semantics mirror the dashboard multiselects: a record matches iff its
/// posting date is present and inside `[date_min, date_max]` and every
/// categorical value is a member of the corresponding allowed set. An empty
/// set matches nothing. A record with no state matches no state set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_min: NaiveDate,
    pub date_max: NaiveDate,
    pub document_types: HashSet<DocumentType>,
    pub task_names: HashSet<String>,
    pub statuses: HashSet<String>,
    pub states: HashSet<String>,
}

impl FilterSpec {
    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        let in_range = match record.posting_date {
            Some(date) => date >= self.date_min && date <= self.date_max,
            None => false,
        };
        if !in_range {
            return false;
        }
        if !self.document_types.contains(&record.document_type) {
            return false;
        }
        if !self.task_names.contains(&record.task_name) {
            return false;
        }
        if !self.statuses.contains(&record.task_status) {
            return false;
        }
        match &record.supplier_state {
            Some(state) => self.states.contains(state),
            None => false,
        }
    }

    /// Filter the snapshot, preserving input ordering.
    pub fn apply(&self, records: &[EnrichedRecord]) -> Vec<EnrichedRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

/// Distinct values the filter sidebar offers, computed over the unfiltered
/// snapshot. Categorical lists keep first-seen order; null states are not
/// offered (they can never match a set anyway).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub document_types: Vec<DocumentType>,
    pub task_names: Vec<String>,
    pub statuses: Vec<String>,
    pub states: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let mut document_types: IndexSet<DocumentType> = IndexSet::new();
        let mut task_names: IndexSet<String> = IndexSet::new();
        let mut statuses: IndexSet<String> = IndexSet::new();
        let mut states: IndexSet<String> = IndexSet::new();
        let mut date_min: Option<NaiveDate> = None;
        let mut date_max: Option<NaiveDate> = None;

        for record in records {
            document_types.insert(record.document_type);
            task_names.insert(record.task_name.clone());
            statuses.insert(record.task_status.clone());
            if let Some(state) = &record.supplier_state {
                states.insert(state.clone());
            }
            if let Some(date) = record.posting_date {
                date_min = Some(date_min.map_or(date, |d| d.min(date)));
                date_max = Some(date_max.map_or(date, |d| d.max(date)));
            }
        }

        Self {
            date_min,
            date_max,
            document_types: document_types.into_iter().collect(),
            task_names: task_names.into_iter().collect(),
            statuses: statuses.into_iter().collect(),
            states: states.into_iter().collect(),
        }
    }

    /// The widest filter over this snapshot: full date range, every
    /// categorical value allowed. None when the snapshot has no posted rows.
    pub fn select_all(&self) -> Option<FilterSpec> {
        Some(FilterSpec {
            date_min: self.date_min?,
            date_max: self.date_max?,
            document_types: self.document_types.iter().copied().collect(),
            task_names: self.task_names.iter().cloned().collect(),
            statuses: self.statuses.iter().cloned().collect(),
            states: self.states.iter().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentTaskRow;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDateTime;

    fn record(id: i64, state: Option<&str>, completed_day: u32) -> EnrichedRecord {
        let created = dt(2024, 1, completed_day, 0);
        EnrichedRecord::from_row(DocumentTaskRow {
            id,
            total_value: BigDecimal::from(100),
            document_type: DocumentType::MaterialInvoice,
            task_name: "Posting".to_string(),
            task_status: "Posted".to_string(),
            supplier_tax_id: Some("12345678000195".to_string()),
            supplier_city: Some("Campinas".to_string()),
            supplier_state: state.map(str::to_string),
            created_at: created,
            completed_at: Some(dt(2024, 1, completed_day, 8)),
        })
    }

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn allow_all(date_min: NaiveDate, date_max: NaiveDate) -> FilterSpec {
        FilterSpec {
            date_min,
            date_max,
            document_types: [DocumentType::MaterialInvoice].into_iter().collect(),
            task_names: ["Posting".to_string()].into_iter().collect(),
            statuses: ["Posted".to_string()].into_iter().collect(),
            states: ["SP".to_string()].into_iter().collect(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn date_max_is_inclusive_and_the_next_day_is_excluded() {
        let records = vec![record(1, Some("SP"), 10), record(2, Some("SP"), 11)];
        let spec = allow_all(day(1), day(10));
        let kept = spec.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn empty_allowed_set_matches_nothing() {
        let records = vec![record(1, Some("SP"), 10)];
        let mut spec = allow_all(day(1), day(31));
        spec.statuses.clear();
        assert!(spec.apply(&records).is_empty());
    }

    #[test]
    fn null_state_is_not_a_member_of_any_state_set() {
        let records = vec![record(1, None, 10), record(2, Some("SP"), 10)];
        let spec = allow_all(day(1), day(31));
        let kept = spec.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn filtering_is_idempotent_and_order_preserving() {
        let records = vec![
            record(3, Some("SP"), 5),
            record(1, Some("SP"), 9),
            record(2, Some("SP"), 7),
        ];
        let spec = allow_all(day(1), day(31));
        let once = spec.apply(&records);
        let twice = spec.apply(&once);
        let ids: Vec<i64> = once.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(once.len(), twice.len());
        assert_eq!(ids, twice.iter().map(|r| r.id).collect::<Vec<_>>());
    }

    #[test]
    fn options_keep_first_seen_order_and_drop_null_states() {
        let records = vec![
            record(1, Some("MG"), 3),
            record(2, None, 4),
            record(3, Some("SP"), 5),
            record(4, Some("MG"), 6),
        ];
        let options = FilterOptions::from_records(&records);
        assert_eq!(options.states, vec!["MG".to_string(), "SP".to_string()]);
        assert_eq!(options.date_min, Some(day(3)));
        assert_eq!(options.date_max, Some(day(6)));

        let spec = options.select_all().unwrap();
        // the null-state record stays out even under the widest filter
        assert_eq!(spec.apply(&records).len(), 3);
    }
}
