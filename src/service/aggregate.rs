use std::collections::{BTreeMap, HashSet};

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::EnrichedRecord;

/// Pareto view size: top suppliers by spend shown on the dashboard.
pub const TOP_SUPPLIERS: usize = 10;

/// KPI row shown above the charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_spend: BigDecimal,
    pub document_count: usize,
    pub mean_lead_time_hours: Option<f64>,
    pub supplier_count: usize,
}

/// One supplier's slice of the Pareto view, keyed by display tax id.
/// A None key groups the records with no displayable identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierSpend {
    pub supplier: Option<String>,
    pub total_spend: BigDecimal,
    pub document_count: u64,
}

/// Document count per (state, city) pair for the hierarchical share chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoCount {
    pub state: Option<String>,
    pub city: Option<String>,
    pub document_count: u64,
}

/// Document count per posting date for the daily volume series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyVolume {
    pub posting_date: Option<NaiveDate>,
    pub document_count: u64,
}

pub fn summarize(records: &[EnrichedRecord]) -> Summary {
    let mut total_spend = BigDecimal::zero();
    let mut lead_time_sum = 0.0;
    let mut lead_time_count = 0usize;
    let mut suppliers: HashSet<&str> = HashSet::new();

    for record in records {
        total_spend += &record.total_value;
        if let Some(hours) = record.lead_time_hours {
            lead_time_sum += hours;
            lead_time_count += 1;
        }
        if let Some(tax_id) = record.supplier_tax_id.as_deref() {
            suppliers.insert(tax_id);
        }
    }

    Summary {
        total_spend,
        document_count: records.len(),
        mean_lead_time_hours: (lead_time_count > 0)
            .then(|| lead_time_sum / lead_time_count as f64),
        supplier_count: suppliers.len(),
    }
}

/// Total spend and document count per supplier, descending by spend,
/// truncated to `top_n`.
///
/// Groups accumulate in first-seen order and the sort is stable, so ties
/// keep the original record order. Records with no display tax id form
/// their own group rather than being dropped.
pub fn supplier_pareto(records: &[EnrichedRecord], top_n: usize) -> Vec<SupplierSpend> {
    let mut groups: IndexMap<Option<String>, (BigDecimal, u64)> = IndexMap::new();

    for record in records {
        let entry = groups
            .entry(record.formatted_tax_id.clone())
            .or_insert_with(|| (BigDecimal::zero(), 0));
        entry.0 += &record.total_value;
        entry.1 += 1;
    }

    let mut ranked: Vec<SupplierSpend> = groups
        .into_iter()
        .map(|(supplier, (total_spend, document_count))| SupplierSpend {
            supplier,
            total_spend,
            document_count,
        })
        .collect();
    ranked.sort_by(|a, b| b.total_spend.cmp(&a.total_spend));
    ranked.truncate(top_n);
    ranked
}

/// Document count per (state, city) pair, first-seen order, null keys kept.
pub fn geo_distribution(records: &[EnrichedRecord]) -> Vec<GeoCount> {
    let mut groups: IndexMap<(Option<String>, Option<String>), u64> = IndexMap::new();

    for record in records {
        let key = (record.supplier_state.clone(), record.supplier_city.clone());
        *groups.entry(key).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((state, city), document_count)| GeoCount {
            state,
            city,
            document_count,
        })
        .collect()
}

/// Document count per posting date, ascending. Records with no posting date
/// are kept as their own group, sorted first.
pub fn daily_volume(records: &[EnrichedRecord]) -> Vec<DailyVolume> {
    let mut groups: BTreeMap<Option<NaiveDate>, u64> = BTreeMap::new();

    for record in records {
        *groups.entry(record.posting_date).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(posting_date, document_count)| DailyVolume {
            posting_date,
            document_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentTaskRow, DocumentType};
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(
        id: i64,
        spend: i64,
        tax_id: Option<&str>,
        state: Option<&str>,
        city: Option<&str>,
        day: u32,
    ) -> EnrichedRecord {
        EnrichedRecord::from_row(DocumentTaskRow {
            id,
            total_value: BigDecimal::from(spend),
            document_type: DocumentType::MaterialInvoice,
            task_name: "Posting".to_string(),
            task_status: "Posted".to_string(),
            supplier_tax_id: tax_id.map(str::to_string),
            supplier_city: city.map(str::to_string),
            supplier_state: state.map(str::to_string),
            created_at: dt(day, 0),
            completed_at: Some(dt(day, 12)),
        })
    }

    #[test]
    fn summary_totals_and_distinct_suppliers() {
        let records = vec![
            record(1, 100, Some("1"), Some("SP"), Some("Santos"), 1),
            record(2, 200, Some("2"), Some("SP"), Some("Santos"), 2),
            record(3, 50, Some("1"), None, None, 3),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_spend, BigDecimal::from(350));
        assert_eq!(summary.document_count, 3);
        assert_eq!(summary.supplier_count, 2);
        assert_eq!(summary.mean_lead_time_hours, Some(12.0));
    }

    #[test]
    fn pareto_ranks_descending_and_truncates() {
        let mut records = Vec::new();
        for i in 0..12i64 {
            // distinct 14-digit ids, spend grows with i
            let tax_id = format!("{:014}", i + 1);
            records.push(record(i, (i + 1) * 10, Some(&tax_id), None, None, 1));
        }
        let ranked = supplier_pareto(&records, TOP_SUPPLIERS);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].total_spend, BigDecimal::from(120));
        assert!(ranked.windows(2).all(|w| w[0].total_spend >= w[1].total_spend));

        // top-10 spend is strictly below the full total when >10 suppliers
        let top_sum = ranked
            .iter()
            .fold(BigDecimal::zero(), |acc, s| acc + &s.total_spend);
        let full_sum = summarize(&records).total_spend;
        assert!(top_sum < full_sum);
    }

    #[test]
    fn pareto_covers_everything_with_ten_or_fewer_suppliers() {
        let records = vec![
            record(1, 100, Some("00000000000001"), None, None, 1),
            record(2, 200, Some("00000000000002"), None, None, 1),
            record(3, 300, Some("00000000000001"), None, None, 1),
        ];
        let ranked = supplier_pareto(&records, TOP_SUPPLIERS);
        assert_eq!(ranked.len(), 2);
        let top_sum = ranked
            .iter()
            .fold(BigDecimal::zero(), |acc, s| acc + &s.total_spend);
        assert_eq!(top_sum, summarize(&records).total_spend);
    }

    #[test]
    fn pareto_ties_keep_first_seen_order_and_null_key_survives() {
        let records = vec![
            record(1, 100, Some("00000000000009"), None, None, 1),
            record(2, 100, None, None, None, 1),
            record(3, 100, Some("00000000000001"), None, None, 1),
        ];
        let ranked = supplier_pareto(&records, TOP_SUPPLIERS);
        let keys: Vec<Option<String>> = ranked.iter().map(|s| s.supplier.clone()).collect();
        assert_eq!(
            keys,
            vec![
                Some("00.000.000/0000-09".to_string()),
                None,
                Some("00.000.000/0000-01".to_string()),
            ]
        );
    }

    #[test]
    fn geo_groups_keep_null_pairs() {
        let records = vec![
            record(1, 100, None, Some("SP"), Some("Santos"), 1),
            record(2, 100, None, Some("SP"), Some("Campinas"), 1),
            record(3, 100, None, None, None, 1),
            record(4, 100, None, Some("SP"), Some("Santos"), 2),
        ];
        let geo = geo_distribution(&records);
        assert_eq!(geo.len(), 3);
        assert_eq!(geo[0].document_count, 2);
        assert!(geo.iter().any(|g| g.state.is_none() && g.city.is_none()));
    }

    #[test]
    fn daily_volume_is_ascending_by_date() {
        let records = vec![
            record(1, 100, None, None, None, 9),
            record(2, 100, None, None, None, 3),
            record(3, 100, None, None, None, 9),
        ];
        let series = daily_volume(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(
            series[0].posting_date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
        );
        assert_eq!(series[1].document_count, 2);
    }
}
