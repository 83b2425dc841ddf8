pub mod csv;
pub mod xlsx;

pub use self::csv::write_csv;
pub use self::xlsx::write_xlsx;

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::models::{EnrichedRecord, MonthlyReportRow};

/// Download formats offered for the filtered record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
        }
    }
}

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Textual form for CSV output; Empty renders as an empty field.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(v) => v.clone(),
            Cell::Number(v) => v.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// A record type that can be laid out as one spreadsheet row.
/// Headers carry the display column names in record-schema order.
pub trait SheetRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

fn money_cell(value: &BigDecimal) -> Cell {
    // Totals fit in f64 comfortably; fall back to text if one ever doesn't.
    match value.to_f64() {
        Some(v) => Cell::Number(v),
        None => Cell::Text(value.to_string()),
    }
}

fn opt_text(value: Option<&str>) -> Cell {
    match value {
        Some(v) => Cell::Text(v.to_string()),
        None => Cell::Empty,
    }
}

impl SheetRow for EnrichedRecord {
    const HEADERS: &'static [&'static str] = &[
        "Document ID",
        "Total Value",
        "Document Type",
        "Task",
        "Status",
        "Supplier Tax ID",
        "Supplier City",
        "Supplier State",
        "Created At",
        "Completed At",
        "Lead Time (h)",
        "Posting Date",
        "Formatted Tax ID",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Number(self.id as f64),
            money_cell(&self.total_value),
            Cell::Text(self.document_type.to_string()),
            Cell::Text(self.task_name.clone()),
            Cell::Text(self.task_status.clone()),
            opt_text(self.supplier_tax_id.as_deref()),
            opt_text(self.supplier_city.as_deref()),
            opt_text(self.supplier_state.as_deref()),
            Cell::Text(self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            match self.completed_at {
                Some(done) => Cell::Text(done.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Cell::Empty,
            },
            match self.lead_time_hours {
                Some(hours) => Cell::Number(hours),
                None => Cell::Empty,
            },
            match self.posting_date {
                Some(date) => Cell::Text(date.format("%Y-%m-%d").to_string()),
                None => Cell::Empty,
            },
            opt_text(self.formatted_tax_id.as_deref()),
        ]
    }
}

impl SheetRow for MonthlyReportRow {
    const HEADERS: &'static [&'static str] = &[
        "Document ID",
        "Document Number",
        "Purchase Orders",
        "Supplier Tax ID",
        "Supplier City",
        "Customer Tax ID",
        "Customer City",
        "Posting Date",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Number(self.id as f64),
            match self.number {
                Some(n) => Cell::Number(n as f64),
                None => Cell::Empty,
            },
            opt_text(self.purchase_orders.as_deref()),
            opt_text(self.supplier_tax_id.as_deref()),
            Cell::Text(self.supplier_city.clone()),
            opt_text(self.customer_tax_id.as_deref()),
            Cell::Text(self.customer_city.clone()),
            Cell::Text(self.posting_date.clone()),
        ]
    }
}
