use crate::{
    db_types::{NewNotification, Notification},
    traits::LedgerError,
};

/// Storage for user inboxes.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement: Clone {
    /// Writes all the notifications in one transaction. Returns the number written.
    async fn insert_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64, LedgerError>;

    /// The user's notifications, newest first.
    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, LedgerError>;

    /// Marks the notification as read, provided it belongs to `user_id`. Returns `None` otherwise.
    async fn mark_notification_read(
        &self,
        notification_id: i64,
        user_id: &str,
    ) -> Result<Option<Notification>, LedgerError>;
}
