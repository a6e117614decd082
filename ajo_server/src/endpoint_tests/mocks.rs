use ajo_engine::{
    db_types::{
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
        PaymentIntent,
        Payout,
        Report,
        UserInfo,
    },
    traits::{
        GatewayError,
        GroupManagement,
        LedgerDatabase,
        LedgerError,
        LedgerQueries,
        NotificationManagement,
        PaymentConfirmation,
        PaymentGateway,
        PayoutManagement,
        ReportManagement,
        TransitionOutcome,
    },
};
use chrono::NaiveDate;
use mockall::mock;
use paystack_tools::{InitializeTransaction, TransactionAuthorization, VerifiedTransaction};

mock! {
    pub Ledger {}
    impl Clone for Ledger {
        fn clone(&self) -> Self;
    }
    impl LedgerDatabase for Ledger {
        fn url(&self) -> &str;
        async fn insert_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, LedgerError>;
        async fn fetch_payment_intent(&self, reference: &str) -> Result<Option<PaymentIntent>, LedgerError>;
        async fn mark_intent_failed(&self, reference: &str) -> Result<Option<PaymentIntent>, LedgerError>;
        async fn complete_payment(&self, confirmation: PaymentConfirmation) -> Result<TransitionOutcome, LedgerError>;
        async fn roll_group_cycle(&self, group_id: i64, today: NaiveDate) -> Result<Option<CycleRoll>, LedgerError>;
        async fn fetch_group_for_reference(&self, reference: &str) -> Result<Option<Group>, LedgerError>;
        async fn fetch_all_group_ids(&self) -> Result<Vec<i64>, LedgerError>;
    }
    impl GroupManagement for Ledger {
        async fn insert_group(&self, organizer: &UserInfo, group: NewGroup, referral_code: &str) -> Result<Group, LedgerError>;
        async fn fetch_group(&self, group_id: i64) -> Result<Option<Group>, LedgerError>;
        async fn fetch_group_by_referral_code(&self, code: &str) -> Result<Option<Group>, LedgerError>;
        async fn fetch_group_for_membership(&self, membership_id: i64) -> Result<Option<Group>, LedgerError>;
        async fn fetch_groups_for_organizer(&self, user_id: &str) -> Result<Vec<Group>, LedgerError>;
        async fn insert_membership(&self, group_id: i64, user: &UserInfo) -> Result<Membership, LedgerError>;
        async fn fetch_membership(&self, membership_id: i64) -> Result<Option<Membership>, LedgerError>;
        async fn fetch_membership_for_user(&self, group_id: i64, user_id: &str) -> Result<Option<Membership>, LedgerError>;
        async fn fetch_memberships_for_user(&self, user_id: &str) -> Result<Vec<Membership>, LedgerError>;
        async fn fetch_members_of_group(&self, group_id: i64) -> Result<Vec<Membership>, LedgerError>;
        async fn delete_membership(&self, group_id: i64, user_id: &str) -> Result<bool, LedgerError>;
        async fn record_manual_contribution(&self, contribution: ManualContribution) -> Result<Contribution, LedgerError>;
    }
    impl LedgerQueries for Ledger {
        async fn fetch_contributions_for_group(&self, group_id: i64) -> Result<Vec<Contribution>, LedgerError>;
        async fn fetch_contributions_for_membership(&self, membership_id: i64) -> Result<Vec<Contribution>, LedgerError>;
        async fn fetch_contribution_for_reference(&self, reference: &str) -> Result<Option<Contribution>, LedgerError>;
        async fn fetch_history_for_group(&self, group_id: i64) -> Result<Vec<HistoryEntry>, LedgerError>;
        async fn fetch_payment_intents_for_membership(&self, membership_id: i64) -> Result<Vec<PaymentIntent>, LedgerError>;
    }
    impl PayoutManagement for Ledger {
        async fn insert_payout(&self, payout: NewPayout) -> Result<Payout, LedgerError>;
        async fn fetch_payout(&self, payout_id: i64) -> Result<Option<Payout>, LedgerError>;
        async fn mark_payout_distributed(&self, payout_id: i64) -> Result<Option<Payout>, LedgerError>;
        async fn fetch_payouts_for_group(&self, group_id: i64) -> Result<Vec<Payout>, LedgerError>;
    }
    impl NotificationManagement for Ledger {
        async fn insert_notifications(&self, notifications: Vec<NewNotification>) -> Result<u64, LedgerError>;
        async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, LedgerError>;
        async fn mark_notification_read(&self, notification_id: i64, user_id: &str) -> Result<Option<Notification>, LedgerError>;
    }
    impl ReportManagement for Ledger {
        async fn insert_report(&self, report: NewReport) -> Result<Report, LedgerError>;
        async fn fetch_report(&self, report_id: i64) -> Result<Option<Report>, LedgerError>;
        async fn fetch_reports_for_group(&self, group_id: i64) -> Result<Vec<Report>, LedgerError>;
        async fn resolve_report(&self, report_id: i64) -> Result<Option<Report>, LedgerError>;
    }
}

mock! {
    pub Gateway {}
    impl Clone for Gateway {
        fn clone(&self) -> Self;
    }
    impl PaymentGateway for Gateway {
        async fn initialize(&self, request: &InitializeTransaction) -> Result<TransactionAuthorization, GatewayError>;
        async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError>;
        fn validate_signature(&self, payload: &[u8], signature: &str) -> bool;
    }
}

/// The copy of the store that the lazy cycle roller gets. It only ever reports that no roll was needed.
pub fn cycle_store() -> MockLedger {
    let mut store = MockLedger::new();
    store.expect_roll_group_cycle().returning(|_, _| Ok(None));
    store
}

/// A store whose clones are [`cycle_store`]s.
pub fn ledger() -> MockLedger {
    let mut store = MockLedger::new();
    store.expect_clone().returning(cycle_store);
    store
}
