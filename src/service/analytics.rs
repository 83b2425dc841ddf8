use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::db::queries;
use crate::error::{AnalyticsError, Result};
use crate::export::{self, ExportFormat};
use crate::models::{EnrichedRecord, FilterOptions, FilterSpec};
use crate::service::aggregate::{
    self, DailyVolume, GeoCount, Summary, SupplierSpend, TOP_SUPPLIERS,
};

const SHEET_NAME: &str = "Filtered Data";

/// Everything one dashboard render needs for a given filter.
/// `row_count == 0` is the valid "no data for this filter" state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub row_count: usize,
    pub summary: Summary,
    pub supplier_pareto: Vec<SupplierSpend>,
    pub geo_distribution: Vec<GeoCount>,
    pub daily_volume: Vec<DailyVolume>,
}

/// Analytics pipeline orchestrator.
///
/// Owns the pool, the extraction snapshot and the export cache. The
/// extraction query takes no parameters, so the snapshot is keyed by
/// nothing and invalidated only by an explicit refresh. Export bytes are
/// keyed by a digest of the filtered content; a hit can never belong to a
/// different filter configuration.
pub struct AnalyticsService {
    pool: PgPool,
    snapshot: RwLock<Option<Arc<Vec<EnrichedRecord>>>>,
    export_cache: DashMap<String, Arc<Vec<u8>>>,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            snapshot: RwLock::new(None),
            export_cache: DashMap::new(),
        }
    }

    /// The enriched snapshot, extracting on first use.
    pub async fn records(&self) -> Result<Arc<Vec<EnrichedRecord>>> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(snapshot.clone());
        }
        self.reload().await
    }

    /// Drop the cached snapshot and re-extract. Returns the new row count.
    pub async fn refresh(&self) -> Result<usize> {
        let snapshot = self.reload().await?;
        Ok(snapshot.len())
    }

    async fn reload(&self) -> Result<Arc<Vec<EnrichedRecord>>> {
        let started = Instant::now();
        let rows = queries::fetch_document_tasks(&self.pool).await?;
        let records: Vec<EnrichedRecord> =
            rows.into_iter().map(EnrichedRecord::from_row).collect();
        let snapshot = Arc::new(records);

        *self.snapshot.write().await = Some(snapshot.clone());
        // stale export bytes must not outlive the snapshot they came from
        self.export_cache.clear();

        info!(
            "extraction snapshot loaded: {} records in {:?}",
            snapshot.len(),
            started.elapsed()
        );
        Ok(snapshot)
    }

    pub async fn filter_options(&self) -> Result<FilterOptions> {
        let records = self.records().await?;
        Ok(FilterOptions::from_records(&records))
    }

    /// One filter-and-render cycle: filter the snapshot, aggregate for
    /// presentation.
    pub async fn dashboard(&self, filter: &FilterSpec) -> Result<DashboardData> {
        let records = self.records().await?;
        let filtered = filter.apply(&records);
        Ok(DashboardData {
            row_count: filtered.len(),
            summary: aggregate::summarize(&filtered),
            supplier_pareto: aggregate::supplier_pareto(&filtered, TOP_SUPPLIERS),
            geo_distribution: aggregate::geo_distribution(&filtered),
            daily_volume: aggregate::daily_volume(&filtered),
        })
    }

    pub async fn export_xlsx(&self, filter: &FilterSpec) -> Result<Arc<Vec<u8>>> {
        self.export_with(filter, ExportFormat::Xlsx).await
    }

    pub async fn export_csv(&self, filter: &FilterSpec) -> Result<Arc<Vec<u8>>> {
        self.export_with(filter, ExportFormat::Csv).await
    }

    async fn export_with(
        &self,
        filter: &FilterSpec,
        format: ExportFormat,
    ) -> Result<Arc<Vec<u8>>> {
        let records = self.records().await?;
        let filtered = filter.apply(&records);
        let key = format!("{}:{}", format.tag(), content_digest(&filtered)?);

        if let Some(hit) = self.export_cache.get(&key) {
            debug!("export cache hit ({} rows)", filtered.len());
            return Ok(hit.clone());
        }

        let bytes = match format {
            ExportFormat::Xlsx => export::write_xlsx(&filtered, SHEET_NAME)?,
            ExportFormat::Csv => export::write_csv(&filtered)?,
        };
        let bytes = Arc::new(bytes);
        self.export_cache.insert(key, bytes.clone());
        Ok(bytes)
    }
}

/// Canonical digest of a record set's content, used as the export cache key.
fn content_digest(records: &[EnrichedRecord]) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update((records.len() as u64).to_le_bytes());
    for record in records {
        let bytes = serde_json::to_vec(record)
            .map_err(|e| AnalyticsError::DataShape(e.to_string()))?;
        hasher.update(&bytes);
        hasher.update([0x1e]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentTaskRow, DocumentType};
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn record(id: i64, spend: i64) -> EnrichedRecord {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        EnrichedRecord::from_row(DocumentTaskRow {
            id,
            total_value: BigDecimal::from(spend),
            document_type: DocumentType::MaterialInvoice,
            task_name: "Posting".to_string(),
            task_status: "Posted".to_string(),
            supplier_tax_id: Some("12345678000195".to_string()),
            supplier_city: None,
            supplier_state: None,
            created_at: created,
            completed_at: Some(created + chrono::Duration::hours(4)),
        })
    }

    #[test]
    fn digest_is_stable_for_identical_content() {
        let a = vec![record(1, 100), record(2, 200)];
        let b = vec![record(1, 100), record(2, 200)];
        assert_eq!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
    }

    #[test]
    fn digest_changes_with_content() {
        let a = vec![record(1, 100)];
        let b = vec![record(1, 101)];
        let c: Vec<EnrichedRecord> = Vec::new();
        assert_ne!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
        assert_ne!(content_digest(&a).unwrap(), content_digest(&c).unwrap());
    }
}
