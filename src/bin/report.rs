//! Monthly posting report: extracts the previous calendar month's
//! successfully posted material invoices and writes a dated .xlsx in the
//! working directory. No flags.

use chrono::Local;
use fiscal_analytics_rust::db::queries;
use fiscal_analytics_rust::{create_pool, export, AppConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    println!("STARTING REPORT GENERATION...");
    if let Err(e) = run().await {
        eprintln!("report generation failed: {}", e);
        std::process::exit(1);
    }
    println!("DONE.");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database.url()).await?;

    println!("Connected, extracting previous month's posted documents...");
    let rows = queries::fetch_monthly_report(&pool).await?;

    if rows.is_empty() {
        println!("No data found for the previous month");
        return Ok(());
    }

    let bytes = export::write_xlsx(&rows, "Monthly Report")?;
    let filename = format!(
        "tax_document_report_{}.xlsx",
        Local::now().format("%Y-%m-%d")
    );
    std::fs::write(&filename, bytes)?;

    let path = std::fs::canonicalize(&filename)?;
    println!("Report written: {} ({} rows)", path.display(), rows.len());
    Ok(())
}
