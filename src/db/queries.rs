use crate::models::{DocumentTaskRow, MonthlyReportRow};
use sqlx::PgPool;

/// Task definition id of the posting stage.
pub const POSTING_TASK_DEFINITION_ID: i32 = 12;
/// Status id meaning the posting stage finished successfully.
pub const POSTING_SUCCESS_STATUS_ID: i32 = 120;

/// Full-history extraction behind the dashboard: every document joined to
/// its task lineage through the shared process instance.
///
/// Cities and states are LEFT JOINed so a document with no supplier city
/// linkage keeps its row. Ordered by completion time ascending; NULL
/// completions sort last under Postgres defaults.
pub async fn fetch_document_tasks(pool: &PgPool) -> Result<Vec<DocumentTaskRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentTaskRow>(
        r#"
        SELECT
            td.id,
            td.total_value,
            td.type AS document_type,
            td_def.name AS task_name,
            st.name AS task_status,
            td.supplier_identification_number AS supplier_tax_id,
            c.name AS supplier_city,
            s.name AS supplier_state,
            t.created_at,
            t.completed_at
        FROM tax_documents td
        INNER JOIN tasks t ON td.process_instance_id = t.process_instance_id
        LEFT JOIN cities c ON td.supplier_city_id = c.id
        LEFT JOIN states s ON c.state_id = s.id
        INNER JOIN task_definitions td_def ON t.task_definition_id = td_def.id
        INNER JOIN status st ON t.status_id = st.id
        ORDER BY t.completed_at
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Previous-calendar-month report: material invoices whose posting task
/// completed successfully, one row per document with its purchase orders
/// aggregated, newest first.
pub async fn fetch_monthly_report(pool: &PgPool) -> Result<Vec<MonthlyReportRow>, sqlx::Error> {
    sqlx::query_as::<_, MonthlyReportRow>(
        r#"
        SELECT
            td.id,
            td.number,
            STRING_AGG(DISTINCT i.purchase_order, ', ') AS purchase_orders,
            td.supplier_identification_number AS supplier_tax_id,
            supplier_city.name AS supplier_city,
            td.customer_identification_number AS customer_tax_id,
            customer_city.name AS customer_city,
            TO_CHAR(t.completed_at, 'DD/MM/YYYY') AS posting_date
        FROM tax_documents td
        INNER JOIN tasks t ON td.process_instance_id = t.process_instance_id
        INNER JOIN cities supplier_city ON td.supplier_city_id = supplier_city.id
        INNER JOIN cities customer_city ON td.customer_city_id = customer_city.id
        LEFT JOIN items i ON td.id = i.tax_document_id
        WHERE
            td.type = 'MaterialInvoice'
            AND t.task_definition_id = $1
            AND t.status_id = $2
            AND t.completed_at >= DATE_TRUNC('month', CURRENT_DATE - INTERVAL '1 month')
            AND t.completed_at < DATE_TRUNC('month', CURRENT_DATE)
        GROUP BY
            td.id, td.number, td.supplier_identification_number,
            supplier_city.name, td.customer_identification_number,
            customer_city.name, t.completed_at
        ORDER BY
            t.completed_at DESC
        "#,
    )
    .bind(POSTING_TASK_DEFINITION_ID)
    .bind(POSTING_SUCCESS_STATUS_ID)
    .fetch_all(pool)
    .await
}
