pub mod aggregate;
pub mod analytics;

pub use aggregate::{DailyVolume, GeoCount, Summary, SupplierSpend, TOP_SUPPLIERS};
pub use analytics::{AnalyticsService, DashboardData};
