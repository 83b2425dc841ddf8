pub mod document;
pub mod enriched;
pub mod filter;

pub use document::{DocumentTaskRow, DocumentType, MonthlyReportRow, UnknownDocumentType};
pub use enriched::{format_tax_id, EnrichedRecord};
pub use filter::{FilterOptions, FilterSpec};
