use chrono::{NaiveDate, Utc};
use log::*;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CycleRoll, HistoryEntry},
    helpers::cycle_period,
};

/// Moves the group into the billing period containing `today`.
///
/// The update only matches while the group is still in an earlier period (or has never been rolled), which makes it a
/// compare-and-set on `current_cycle_month`: of any number of concurrent callers, exactly one sees the row come back
/// and writes the `unpaid` history entries for the period being closed.
///
/// Returns `None` if the group does not exist or is already in the current period.
pub async fn roll_cycle(
    group_id: i64,
    today: NaiveDate,
    conn: &mut SqliteConnection,
) -> Result<Option<CycleRoll>, sqlx::Error> {
    let new_period = cycle_period(today);
    let rolled: Option<(Option<NaiveDate>,)> = sqlx::query_as(
        r#"
        UPDATE groups SET
            previous_cycle_month = current_cycle_month,
            current_cycle_month = $2,
            monthly_total = 0,
            unpaid_count = (SELECT COUNT(*) FROM memberships WHERE memberships.group_id = groups.id)
        WHERE id = $1 AND (current_cycle_month IS NULL OR current_cycle_month < $2)
        RETURNING previous_cycle_month
        "#,
    )
    .bind(group_id)
    .bind(new_period)
    .fetch_optional(&mut *conn)
    .await?;
    let Some((previous,)) = rolled else {
        trace!("📆️ Group #{group_id} is already in the {new_period} cycle");
        return Ok(None);
    };
    let closed_period = previous.unwrap_or(new_period);
    let result = sqlx::query(
        r#"
        INSERT INTO contribution_history (group_id, membership_id, amount, status, period, created_at)
        SELECT group_id, id, 0, 'unpaid', $2, $3 FROM memberships WHERE group_id = $1
        "#,
    )
    .bind(group_id)
    .bind(closed_period)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    let unpaid_entries = result.rows_affected();
    debug!("📆️ Group #{group_id} rolled from {closed_period} to {new_period}. {unpaid_entries} history entries written");
    Ok(Some(CycleRoll { group_id, closed_period, new_period, unpaid_entries }))
}

pub async fn fetch_history_for_group(
    group_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<HistoryEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM contribution_history WHERE group_id = $1 ORDER BY period DESC, id DESC")
        .bind(group_id)
        .fetch_all(conn)
        .await
}
