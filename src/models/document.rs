use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Tax document category, stored as varchar in `tax_documents.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    MaterialInvoice,
    ServiceInvoice,
    TransportationInvoice,
}

#[derive(Debug, Error)]
#[error("unknown document type: {0}")]
pub struct UnknownDocumentType(pub String);

impl TryFrom<String> for DocumentType {
    type Error = UnknownDocumentType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "MaterialInvoice" => Ok(Self::MaterialInvoice),
            "ServiceInvoice" => Ok(Self::ServiceInvoice),
            "TransportationInvoice" => Ok(Self::TransportationInvoice),
            _ => Err(UnknownDocumentType(value)),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MaterialInvoice => "MaterialInvoice",
            Self::ServiceInvoice => "ServiceInvoice",
            Self::TransportationInvoice => "TransportationInvoice",
        };
        f.write_str(s)
    }
}

/// One row of the document/task extraction join.
///
/// City and state come through a LEFT JOIN and stay None when the supplier
/// has no city linkage. `completed_at` is NULL until the task finishes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DocumentTaskRow {
    pub id: i64,
    pub total_value: BigDecimal,
    #[sqlx(try_from = "String")]
    pub document_type: DocumentType,
    pub task_name: String,
    pub task_status: String,
    pub supplier_tax_id: Option<String>,
    pub supplier_city: Option<String>,
    pub supplier_state: Option<String>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

/// One row of the monthly posting report (previous calendar month,
/// successfully posted material invoices, purchase orders aggregated).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MonthlyReportRow {
    pub id: i64,
    pub number: Option<i64>,
    pub purchase_orders: Option<String>,
    pub supplier_tax_id: Option<String>,
    pub supplier_city: String,
    pub customer_tax_id: Option<String>,
    pub customer_city: String,
    pub posting_date: String,
}
