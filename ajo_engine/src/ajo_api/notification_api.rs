use std::fmt::Debug;

use log::*;

use crate::{
    ajo_api::errors::GroupApiError,
    db_types::{Group, NewNotification, Notification, PaidBy},
    events::{ContributionCompletedEvent, CycleRolledEvent},
    traits::{GroupManagement, NotificationManagement},
};

/// `NotificationApi` writes ledger events into user inboxes and serves those inboxes.
///
/// Delivery beyond the inbox (email, SMS) is left to other systems.
pub struct NotificationApi<B> {
    db: B,
}

impl<B> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}

impl<B: Clone> Clone for NotificationApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> NotificationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement + GroupManagement
{
    /// Lets the member know their contribution has landed. When the member paid for themselves, the organizer is told
    /// as well. Returns the number of notifications written.
    pub async fn contribution_completed(&self, event: &ContributionCompletedEvent) -> Result<u64, GroupApiError> {
        let contribution = &event.contribution;
        let group = self.fetch_group(event.group_id).await?;
        let member = self
            .db
            .fetch_membership(contribution.membership_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Membership #{}", contribution.membership_id)))?;
        let amount = contribution.amount;
        let mut notifications = Vec::with_capacity(2);
        match contribution.paid_by {
            PaidBy::Member => {
                let message = format!("Your contribution of {amount} to {} has been received.", group.name);
                notifications.push(NewNotification::new(&member.user_id, group.id, message));
                if member.user_id != group.organizer_id {
                    let message = format!("{} paid {amount} into {}.", member.user_id, group.name);
                    notifications.push(NewNotification::new(&group.organizer_id, group.id, message));
                }
            },
            PaidBy::Organizer => {
                let message = format!("The organizer of {} recorded a contribution of {amount} for you.", group.name);
                notifications.push(NewNotification::new(&member.user_id, group.id, message));
            },
        }
        let written = self.db.insert_notifications(notifications).await?;
        debug!("📬️ {written} notifications sent for contribution #{}", contribution.id);
        Ok(written)
    }

    /// Tells every member that a new cycle has opened and what they owe for it.
    pub async fn cycle_rolled(&self, event: &CycleRolledEvent) -> Result<u64, GroupApiError> {
        let roll = &event.roll;
        let group = self.fetch_group(roll.group_id).await?;
        let members = self.db.fetch_members_of_group(group.id).await?;
        let message = format!(
            "The {} cycle of {} has started. Your contribution of {} is due.",
            roll.new_period.format("%B %Y"),
            group.name,
            group.contribution_amount
        );
        let notifications =
            members.iter().map(|m| NewNotification::new(&m.user_id, group.id, message.clone())).collect::<Vec<_>>();
        let written = self.db.insert_notifications(notifications).await?;
        debug!("📬️ {written} members of group #{} told about the {} cycle", group.id, roll.new_period);
        Ok(written)
    }

    /// The user's inbox, newest first.
    pub async fn notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, GroupApiError> {
        Ok(self.db.fetch_notifications_for_user(user_id).await?)
    }

    /// Users can only mark their own notifications. Anyone else's look like they do not exist.
    pub async fn mark_read(&self, user_id: &str, notification_id: i64) -> Result<Notification, GroupApiError> {
        self.db
            .mark_notification_read(notification_id, user_id)
            .await?
            .ok_or_else(|| GroupApiError::NotFound(format!("Notification #{notification_id}")))
    }

    async fn fetch_group(&self, group_id: i64) -> Result<Group, GroupApiError> {
        self.db.fetch_group(group_id).await?.ok_or_else(|| GroupApiError::NotFound(format!("Group #{group_id}")))
    }
}
