use ajo_engine::{
    events::{ContributionCompletedEvent, CycleRolledEvent, EventHandlers, EventHooks},
    NotificationApi,
    SqliteDatabase,
};
use futures::future::BoxFuture;
use log::*;

pub const NOTIFICATION_EVENT_BUFFER_SIZE: usize = 25;

/// Assigns the event handlers that keep user inboxes up to date.
///
/// 1. ContributionCompletedEvent - The member is told their payment has landed. If they paid for themselves, the
///    organizer is told as well.
/// 2. CycleRolledEvent - Every member of the group is told that a new cycle has opened and what they owe for it.
///
/// A failure to write a notification is logged. It never affects the ledger.
pub fn create_notification_event_handlers(api: NotificationApi<SqliteDatabase>) -> EventHandlers {
    let mut hooks = EventHooks::default();
    let api_clone = api.clone();
    // --- On ContributionCompleted Handler ---
    hooks.on_contribution_completed(move |ev| notify_contribution(api_clone.clone(), ev));
    // --- On CycleRolled Handler ---
    hooks.on_cycle_rolled(move |ev| notify_cycle_rolled(api.clone(), ev));
    EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks)
}

fn notify_contribution(api: NotificationApi<SqliteDatabase>, ev: ContributionCompletedEvent) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        match api.contribution_completed(&ev).await {
            Ok(n) => debug!("📬️ Contribution #{} announced to {n} users", ev.contribution.id),
            Err(e) => error!("📬️ Could not write notifications for contribution #{}. {e}", ev.contribution.id),
        }
    })
}

fn notify_cycle_rolled(api: NotificationApi<SqliteDatabase>, ev: CycleRolledEvent) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let group_id = ev.roll.group_id;
        match api.cycle_rolled(&ev).await {
            Ok(n) => debug!("📬️ The {} cycle of group #{group_id} announced to {n} members", ev.roll.new_period),
            Err(e) => error!("📬️ Could not write notifications for the new cycle of group #{group_id}. {e}"),
        }
    })
}
