//! Fixture generator: previous-month posted material invoices with a
//! concentrated supplier portfolio, so the Pareto view has something to
//! show. Takes one optional argument, the number of documents (default 100).

use bigdecimal::BigDecimal;
use chrono::{Duration, Datelike, Local, NaiveDateTime};
use fiscal_analytics_rust::db::queries::{POSTING_SUCCESS_STATUS_ID, POSTING_TASK_DEFINITION_ID};
use fiscal_analytics_rust::{create_pool, AppConfig};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::{Postgres, Transaction};
use std::str::FromStr;

const BASE_ID: i64 = 2000;
const CUSTOMER_TAX_ID: &str = "99999999000199";
// the first suppliers carry most of the spend (rough 80/20 shape)
const SUPPLIER_WEIGHTS: &[f64] = &[0.30, 0.20, 0.15, 0.10, 0.10, 0.05, 0.05, 0.05];
const ITEM_DESCRIPTIONS: &[&str] = &["Cement", "Steel", "Cable", "Breaker", "Notebook", "Monitor"];
const CITY_IDS: &[i32] = &[1, 2, 3, 10, 11, 12, 13, 14];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let n_records: i64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(100);

    if let Err(e) = run(n_records).await {
        eprintln!("seeding failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(n_records: i64) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database.url()).await?;
    let mut tx = pool.begin().await?;

    seed_reference_rows(&mut tx).await?;

    println!("Generating {} documents with a weighted supplier portfolio...", n_records);
    let mut rng = StdRng::from_entropy();
    let suppliers: Vec<String> = (0..SUPPLIER_WEIGHTS.len())
        .map(|_| random_tax_id(&mut rng))
        .collect();
    let supplier_picker = WeightedIndex::new(SUPPLIER_WEIGHTS)?;

    // previous calendar month window
    let today = Local::now().date_naive();
    let first_this_month = today
        .with_day(1)
        .ok_or("failed to compute the current month start")?;
    let last_prev_month = first_this_month - Duration::days(1);
    let first_prev_month = last_prev_month
        .with_day(1)
        .ok_or("failed to compute the previous month start")?;
    let span_days = (last_prev_month - first_prev_month).num_days();

    for i in 0..n_records {
        let id = BASE_ID + i;

        sqlx::query("INSERT INTO process_instances (id, type) VALUES ($1, 'Inbound')")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let supplier_city = CITY_IDS[rng.gen_range(0..CITY_IDS.len())];
        let customer_city = CITY_IDS[rng.gen_range(0..CITY_IDS.len())];
        let supplier_tax_id = suppliers[supplier_picker.sample(&mut rng)].clone();
        let total = round2(rng.gen_range(500.0..15000.0))?;

        sqlx::query(
            r#"
            INSERT INTO tax_documents (
                id, number, type, total_value,
                supplier_identification_number, customer_identification_number,
                supplier_city_id, customer_city_id, process_instance_id
            ) VALUES ($1, $2, 'MaterialInvoice', $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(rng.gen_range(10000..100000i64))
        .bind(&total)
        .bind(&supplier_tax_id)
        .bind(CUSTOMER_TAX_ID)
        .bind(supplier_city)
        .bind(customer_city)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        // a few items per document so the report's purchase-order
        // aggregation has something to collapse
        let item_count = rng.gen_range(1..=3i64);
        let item_value = round2(total_as_f64(&total) / item_count as f64)?;
        for k in 0..item_count {
            sqlx::query(
                r#"
                INSERT INTO items (id, description, unit_price, total_value, purchase_order, tax_document_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id * 10 + k)
            .bind(ITEM_DESCRIPTIONS[rng.gen_range(0..ITEM_DESCRIPTIONS.len())])
            .bind(&item_value)
            .bind(&item_value)
            .bind(format!("PO-2026-{}", rng.gen_range(100..1000)))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        // completion spread across the previous month, lead time 2-72h
        let completed_day = first_prev_month + Duration::days(rng.gen_range(0..=span_days));
        let completed: NaiveDateTime = completed_day
            .and_hms_opt(rng.gen_range(8..18), 0, 0)
            .ok_or("failed to compute completion time")?;
        let created = completed - Duration::hours(rng.gen_range(2..=72));

        sqlx::query(
            r#"
            INSERT INTO tasks (id, created_at, completed_at, task_definition_id, status_id, process_instance_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(created)
        .bind(completed)
        .bind(POSTING_TASK_DEFINITION_ID)
        .bind(POSTING_SUCCESS_STATUS_ID)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    println!("Done, {} documents inserted.", n_records);
    Ok(())
}

/// Reference rows the fixtures point at; no-ops when already present.
async fn seed_reference_rows(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), Box<dyn std::error::Error>> {
    let states: &[(i32, &str)] = &[(1, "Minas Gerais"), (2, "São Paulo")];
    for (id, name) in states {
        sqlx::query("INSERT INTO states (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(name)
            .execute(&mut **tx)
            .await?;
    }

    let cities: &[(i32, &str, i32)] = &[
        (1, "Belo Horizonte", 1),
        (2, "Contagem", 1),
        (3, "São Paulo", 2),
        (10, "Uberlândia", 1),
        (11, "Juiz de Fora", 1),
        (12, "Campinas", 2),
        (13, "Santos", 2),
        (14, "Ribeirão Preto", 2),
    ];
    for (id, name, state_id) in cities {
        sqlx::query(
            "INSERT INTO cities (id, name, state_id) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .bind(state_id)
        .execute(&mut **tx)
        .await?;
    }

    let task_definitions: &[(i32, &str)] = &[
        (10, "Duplicate Verification"),
        (11, "Divergence Verification"),
        (12, "Posting"),
        (13, "Payment"),
    ];
    for (id, name) in task_definitions {
        sqlx::query(
            "INSERT INTO task_definitions (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(name)
        .execute(&mut **tx)
        .await?;
    }

    let statuses: &[(i32, &str)] = &[
        (100, "Duplicated"),
        (101, "Not Duplicated"),
        (110, "With Divergence"),
        (111, "No Divergence"),
        (120, "Posted"),
        (121, "Posting Failed"),
        (130, "Paid"),
        (131, "Not Paid"),
    ];
    for (id, name) in statuses {
        sqlx::query("INSERT INTO status (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(name)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

fn random_tax_id(rng: &mut StdRng) -> String {
    let mut digits = String::with_capacity(14);
    digits.push(char::from(b'1' + rng.gen_range(0..9)));
    for _ in 1..14 {
        digits.push(char::from(b'0' + rng.gen_range(0..10)));
    }
    digits
}

fn round2(value: f64) -> Result<BigDecimal, Box<dyn std::error::Error>> {
    Ok(BigDecimal::from_str(&format!("{:.2}", value))?)
}

fn total_as_f64(value: &BigDecimal) -> f64 {
    use bigdecimal::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}
