//! Chaos fixture generator: 90 days of history across every document type
//! and workflow stage, including a small share of unfinished tasks, so the
//! dashboard filters have every scenario to chew on. Takes one optional
//! argument, the number of documents (default 200).

use bigdecimal::BigDecimal;
use chrono::{Duration, Local, NaiveDateTime};
use fiscal_analytics_rust::models::DocumentType;
use fiscal_analytics_rust::{create_pool, AppConfig};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::{Postgres, Transaction};
use std::str::FromStr;

const BASE_ID: i64 = 10000;
const CUSTOMER_TAX_ID: &str = "99999999000199";
const SUPPLIER_COUNT: usize = 12;
const HISTORY_DAYS: i64 = 90;
const UNFINISHED_SHARE: f64 = 0.05;
const CITY_IDS: &[i32] = &[1, 2, 3, 10, 11, 12, 13, 14, 15, 16];

// (task definition, its possible outcome statuses); posting carries the
// most weight since it is the stage the dashboard audits
const TASK_RULES: &[(i32, &[i32])] = &[
    (10, &[100, 101]),
    (11, &[110, 111]),
    (12, &[120, 121]),
    (13, &[130, 131]),
];
const TASK_WEIGHTS: &[f64] = &[0.1, 0.1, 0.6, 0.2];

const DOCUMENT_TYPES: &[DocumentType] = &[
    DocumentType::MaterialInvoice,
    DocumentType::ServiceInvoice,
    DocumentType::TransportationInvoice,
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let n_records: i64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(200);

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

    println!("Generating {} documents across all workflow scenarios...", n_records);
    let mut rng = StdRng::from_entropy();
    let suppliers: Vec<String> = (0..SUPPLIER_COUNT).map(|_| random_tax_id(&mut rng)).collect();
    let task_picker = WeightedIndex::new(TASK_WEIGHTS)?;
    let start = Local::now().naive_local() - Duration::days(HISTORY_DAYS);

    for i in 0..n_records {
        let id = BASE_ID + i;

        let (task_definition_id, statuses) = TASK_RULES[task_picker.sample(&mut rng)];
        let status_id = statuses[rng.gen_range(0..statuses.len())];
        let document_type = DOCUMENT_TYPES[rng.gen_range(0..DOCUMENT_TYPES.len())];

        sqlx::query("INSERT INTO process_instances (id, type) VALUES ($1, 'Inbound')")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO tax_documents (
                id, number, type, total_value,
                supplier_identification_number, customer_identification_number,
                supplier_city_id, customer_city_id, process_instance_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(rng.gen_range(1000..100000i64))
        .bind(document_type.to_string())
        .bind(round2(rng.gen_range(100.0..50000.0))?)
        .bind(&suppliers[rng.gen_range(0..suppliers.len())])
        .bind(CUSTOMER_TAX_ID)
        .bind(CITY_IDS[rng.gen_range(0..CITY_IDS.len())])
        .bind(CITY_IDS[rng.gen_range(0..CITY_IDS.len())])
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let created: NaiveDateTime = start + Duration::days(rng.gen_range(0..HISTORY_DAYS));
        // most tasks finish 1-72h later; a few stay open with no completion
        let completed: Option<NaiveDateTime> = if rng.gen_bool(UNFINISHED_SHARE) {
            None
        } else {
            Some(created + Duration::hours(rng.gen_range(1..=72)))
        };

        sqlx::query(
            r#"
            INSERT INTO tasks (id, created_at, completed_at, task_definition_id, status_id, process_instance_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(created)
        .bind(completed)
        .bind(task_definition_id)
        .bind(status_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    println!("Done, {} documents inserted across all scenarios.", n_records);
    Ok(())
}

/// Reference rows for all three states and the full stage/status table.
async fn seed_reference_rows(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), Box<dyn std::error::Error>> {
    let states: &[(i32, &str)] = &[(1, "Minas Gerais"), (2, "São Paulo"), (3, "Paraná")];
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
        (15, "Curitiba", 3),
        (16, "Londrina", 3),
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
