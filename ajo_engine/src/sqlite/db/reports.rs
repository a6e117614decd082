use chrono::Utc;
use sqlx::SqliteConnection;

use super::is_foreign_key_violation;
use crate::{
    db_types::{NewReport, Report},
    traits::LedgerError,
};

pub async fn insert_report(report: NewReport, conn: &mut SqliteConnection) -> Result<Report, LedgerError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO reports (group_id, reporter_id, subject, message, is_resolved, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING *;
        "#,
    )
    .bind(report.group_id)
    .bind(&report.reporter_id)
    .bind(&report.subject)
    .bind(&report.message)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(report) => Ok(report),
        Err(e) if is_foreign_key_violation(&e) => Err(LedgerError::GroupNotFound(report.group_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_report(report_id: i64, conn: &mut SqliteConnection) -> Result<Option<Report>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reports WHERE id = $1").bind(report_id).fetch_optional(conn).await
}

pub async fn fetch_reports_for_group(group_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Report>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reports WHERE group_id = $1 ORDER BY is_resolved, id DESC")
        .bind(group_id)
        .fetch_all(conn)
        .await
}

pub async fn resolve_report(report_id: i64, conn: &mut SqliteConnection) -> Result<Option<Report>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE reports SET is_resolved = TRUE, resolved_at = COALESCE(resolved_at, $2)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(report_id)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await
}
