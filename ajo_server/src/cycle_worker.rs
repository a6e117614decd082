use std::time::Duration;

use ajo_engine::{db_types::CycleRoll, events::EventProducers, CycleApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the cycle roll worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Cycles also roll lazily whenever a group is read or credited, so this worker only keeps the aggregates and unpaid
/// history fresh for groups that nobody touches around the turn of the month.
pub fn start_cycle_worker(db: SqliteDatabase, producers: EventProducers, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = CycleApi::new(db, producers);
        info!("🕰️ Cycle roll worker started. Checking groups every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running cycle roll job");
            match api.roll_all_groups().await {
                Ok(rolls) if rolls.is_empty() => trace!("🕰️ No group needed a new cycle"),
                Ok(rolls) => info!("🕰️ {} groups moved into a new cycle: {}", rolls.len(), roll_list(&rolls)),
                Err(e) => error!("🕰️ Error running cycle roll job: {e}"),
            }
        }
    })
}

fn roll_list(rolls: &[CycleRoll]) -> String {
    rolls
        .iter()
        .map(|r| format!("[#{}] {} -> {} ({} unpaid)", r.group_id, r.closed_period, r.new_period, r.unpaid_entries))
        .collect::<Vec<String>>()
        .join(", ")
}
