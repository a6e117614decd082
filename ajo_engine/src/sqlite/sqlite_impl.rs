//! `SqliteDatabase` is the concrete ledger backend.
//!
//! It implements all the store traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::{NaiveDate, Utc};
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{
    contributions,
    contributions::NewLedgerEntry,
    cycles,
    db_url,
    groups,
    memberships,
    new_pool,
    notifications,
    payment_intents,
    payouts,
    reports,
};
use crate::{
    db_types::{
        ConfirmationSource,
        Contribution,
        CycleRoll,
        Group,
        HistoryEntry,
        ManualContribution,
        Membership,
        NewGroup,
        NewNotification,
        NewPaymentIntent,
        NewPayout,
        NewReport,
        Notification,
        PaidBy,
        PaymentIntent,
        PaymentStatus,
        Payout,
        Report,
        UserInfo,
    },
    helpers::cycle_period,
    traits::{
        GroupManagement,
        LedgerDatabase,
        LedgerError,
        LedgerQueries,
        NotificationManagement,
        PaymentConfirmation,
        PayoutManagement,
        ReportManagement,
        TransitionOutcome,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let intent = payment_intents::insert_intent(intent, &mut conn).await?;
        debug!("🗃️ Payment intent {} saved for membership #{}", intent.reference, intent.membership_id);
        Ok(intent)
    }

    async fn fetch_payment_intent(&self, reference: &str) -> Result<Option<PaymentIntent>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let intent = payment_intents::fetch_intent_by_reference(reference, &mut conn).await?;
        Ok(intent)
    }

    async fn mark_intent_failed(&self, reference: &str) -> Result<Option<PaymentIntent>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let intent = payment_intents::mark_failed(reference, &mut conn).await?;
        if intent.is_some() {
            debug!("🗃️ Payment intent {reference} marked as failed");
        }
        Ok(intent)
    }

    /// In a single atomic transaction:
    /// * marks the intent as `success`. If this does not return a row, the transaction is abandoned and the reason is
    ///   reported as the outcome.
    /// * rolls the group cycle if the month has changed since the last roll,
    /// * writes the completed contribution. A unique violation here means another transaction beat us to it.
    /// * credits the group aggregates.
    async fn complete_payment(&self, confirmation: PaymentConfirmation) -> Result<TransitionOutcome, LedgerError> {
        let PaymentConfirmation { reference, amount, source } = confirmation;
        let now = Utc::now();
        let today = now.date_naive();
        let mut tx = self.pool.begin().await?;
        let intent = match payment_intents::mark_success(&reference, amount, now, &mut tx).await? {
            Some(intent) => intent,
            None => {
                let outcome = match payment_intents::fetch_intent_by_reference(&reference, &mut tx).await? {
                    None => TransitionOutcome::UnknownReference,
                    Some(intent) if intent.status == PaymentStatus::Success => TransitionOutcome::AlreadyProcessed,
                    Some(intent) => TransitionOutcome::AmountMismatch { expected: intent.amount, received: amount },
                };
                tx.rollback().await?;
                trace!("🗃️ Success transition for {reference} not applied: {outcome:?}");
                return Ok(outcome);
            },
        };
        let group = groups::fetch_group_for_membership(intent.membership_id, &mut tx)
            .await?
            .ok_or(LedgerError::MembershipNotFound(intent.membership_id))?;
        let roll = cycles::roll_cycle(group.id, today, &mut tx).await?;
        if let Some(roll) = &roll {
            info!("📆️ Group #{} rolled over to {} while applying payment {reference}", group.id, roll.new_period);
        }
        let cycle_month = roll
            .map(|r| r.new_period)
            .or(group.current_cycle_month)
            .unwrap_or_else(|| cycle_period(today));
        let entry = NewLedgerEntry::for_intent(&intent, source, cycle_month);
        let Some(contribution) = contributions::insert_contribution(entry, &mut tx).await? else {
            tx.rollback().await?;
            warn!("🗃️ Payment {reference} was already recorded in the ledger. Rolled back the duplicate transition.");
            return Ok(TransitionOutcome::AlreadyProcessed);
        };
        groups::credit_group(group.id, intent.amount, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Payment {reference} applied via {source}. Contribution #{} of {} for membership #{}",
            contribution.id, contribution.amount, contribution.membership_id
        );
        Ok(TransitionOutcome::Applied(contribution))
    }

    async fn roll_group_cycle(&self, group_id: i64, today: NaiveDate) -> Result<Option<CycleRoll>, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let roll = cycles::roll_cycle(group_id, today, &mut tx).await?;
        tx.commit().await?;
        Ok(roll)
    }

    async fn fetch_group_for_reference(&self, reference: &str) -> Result<Option<Group>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let group = groups::fetch_group_for_reference(reference, &mut conn).await?;
        Ok(group)
    }

    async fn fetch_all_group_ids(&self) -> Result<Vec<i64>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let ids = groups::fetch_all_group_ids(&mut conn).await?;
        Ok(ids)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl GroupManagement for SqliteDatabase {
    async fn insert_group(
        &self,
        organizer: &UserInfo,
        group: NewGroup,
        referral_code: &str,
    ) -> Result<Group, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let group = groups::insert_group(&organizer.user_id, group, referral_code, Utc::now(), &mut tx).await?;
        memberships::insert_membership(group.id, organizer, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Group #{} ({}) created by {} with code {}", group.id, group.name, group.organizer_id, referral_code);
        Ok(group)
    }

    async fn fetch_group(&self, group_id: i64) -> Result<Option<Group>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let group = groups::fetch_group(group_id, &mut conn).await?;
        Ok(group)
    }

    async fn fetch_group_by_referral_code(&self, code: &str) -> Result<Option<Group>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let group = groups::fetch_group_by_referral_code(code, &mut conn).await?;
        Ok(group)
    }

    async fn fetch_group_for_membership(&self, membership_id: i64) -> Result<Option<Group>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let group = groups::fetch_group_for_membership(membership_id, &mut conn).await?;
        Ok(group)
    }

    async fn fetch_groups_for_organizer(&self, user_id: &str) -> Result<Vec<Group>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let groups = groups::fetch_groups_for_organizer(user_id, &mut conn).await?;
        Ok(groups)
    }

    async fn insert_membership(&self, group_id: i64, user: &UserInfo) -> Result<Membership, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let membership = memberships::insert_membership(group_id, user, &mut tx).await?;
        groups::refresh_unpaid_count(group_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User {} joined group #{group_id} as member #{}", user.user_id, membership.id);
        Ok(membership)
    }

    async fn fetch_membership(&self, membership_id: i64) -> Result<Option<Membership>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let membership = memberships::fetch_membership(membership_id, &mut conn).await?;
        Ok(membership)
    }

    async fn fetch_membership_for_user(&self, group_id: i64, user_id: &str) -> Result<Option<Membership>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let membership = memberships::fetch_membership_for_user(group_id, user_id, &mut conn).await?;
        Ok(membership)
    }

    async fn fetch_memberships_for_user(&self, user_id: &str) -> Result<Vec<Membership>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let memberships = memberships::fetch_memberships_for_user(user_id, &mut conn).await?;
        Ok(memberships)
    }

    async fn fetch_members_of_group(&self, group_id: i64) -> Result<Vec<Membership>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let members = memberships::fetch_members_of_group(group_id, &mut conn).await?;
        Ok(members)
    }

    async fn delete_membership(&self, group_id: i64, user_id: &str) -> Result<bool, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let deleted = memberships::delete_membership(group_id, user_id, &mut tx).await?;
        if deleted {
            groups::refresh_unpaid_count(group_id, &mut tx).await?;
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn record_manual_contribution(&self, contribution: ManualContribution) -> Result<Contribution, LedgerError> {
        let ManualContribution { membership_id, amount, note } = contribution;
        let today = Utc::now().date_naive();
        // The owning group never changes, so it is safe to look it up before the write transaction starts.
        let group = self
            .fetch_group_for_membership(membership_id)
            .await?
            .ok_or(LedgerError::MembershipNotFound(membership_id))?;
        let mut tx = self.pool.begin().await?;
        let roll = cycles::roll_cycle(group.id, today, &mut tx).await?;
        let cycle_month = match roll {
            Some(roll) => roll.new_period,
            None => groups::fetch_group(group.id, &mut tx)
                .await?
                .and_then(|g| g.current_cycle_month)
                .unwrap_or_else(|| cycle_period(today)),
        };
        let entry = NewLedgerEntry {
            membership_id,
            amount,
            payment_reference: None,
            paid_by: PaidBy::Organizer,
            source: ConfirmationSource::Manual,
            note,
            cycle_month,
        };
        let contribution = contributions::insert_contribution(entry, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::DatabaseError("Manual contribution could not be inserted".into()))?;
        groups::credit_group(group.id, amount, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Manual contribution #{} of {amount} recorded for membership #{membership_id}", contribution.id);
        Ok(contribution)
    }
}

impl LedgerQueries for SqliteDatabase {
    async fn fetch_contributions_for_group(&self, group_id: i64) -> Result<Vec<Contribution>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = contributions::fetch_contributions_for_group(group_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_contributions_for_membership(&self, membership_id: i64) -> Result<Vec<Contribution>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = contributions::fetch_contributions_for_membership(membership_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_contribution_for_reference(&self, reference: &str) -> Result<Option<Contribution>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = contributions::fetch_contribution_for_reference(reference, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_history_for_group(&self, group_id: i64) -> Result<Vec<HistoryEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = cycles::fetch_history_for_group(group_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_payment_intents_for_membership(
        &self,
        membership_id: i64,
    ) -> Result<Vec<PaymentIntent>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = payment_intents::fetch_intents_for_membership(membership_id, &mut conn).await?;
        Ok(result)
    }
}

impl PayoutManagement for SqliteDatabase {
    async fn insert_payout(&self, payout: NewPayout) -> Result<Payout, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payout = payouts::insert_payout(payout, &mut conn).await?;
        debug!("🗃️ Payout #{} of {} recorded for group #{}", payout.id, payout.total_amount, payout.group_id);
        Ok(payout)
    }

    async fn fetch_payout(&self, payout_id: i64) -> Result<Option<Payout>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payout = payouts::fetch_payout(payout_id, &mut conn).await?;
        Ok(payout)
    }

    async fn mark_payout_distributed(&self, payout_id: i64) -> Result<Option<Payout>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payout = payouts::mark_distributed(payout_id, &mut conn).await?;
        Ok(payout)
    }

    async fn fetch_payouts_for_group(&self, group_id: i64) -> Result<Vec<Payout>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payouts = payouts::fetch_payouts_for_group(group_id, &mut conn).await?;
        Ok(payouts)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn insert_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let written = notifications::insert_notifications(&notifications, &mut tx).await?;
        tx.commit().await?;
        Ok(written)
    }

    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = notifications::fetch_notifications_for_user(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn mark_notification_read(
        &self,
        notification_id: i64,
        user_id: &str,
    ) -> Result<Option<Notification>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = notifications::mark_read(notification_id, user_id, &mut conn).await?;
        Ok(result)
    }
}

impl ReportManagement for SqliteDatabase {
    async fn insert_report(&self, report: NewReport) -> Result<Report, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let report = reports::insert_report(report, &mut conn).await?;
        debug!("🗃️ Report #{} filed by {} in group #{}", report.id, report.reporter_id, report.group_id);
        Ok(report)
    }

    async fn fetch_report(&self, report_id: i64) -> Result<Option<Report>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let report = reports::fetch_report(report_id, &mut conn).await?;
        Ok(report)
    }

    async fn fetch_reports_for_group(&self, group_id: i64) -> Result<Vec<Report>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let result = reports::fetch_reports_for_group(group_id, &mut conn).await?;
        Ok(result)
    }

    async fn resolve_report(&self, report_id: i64) -> Result<Option<Report>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let report = reports::resolve_report(report_id, &mut conn).await?;
        Ok(report)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using `AJO_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Migrations are embedded in the binary.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
