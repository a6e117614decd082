use ajo_engine::db_types::{
    ConfirmationSource,
    Contribution,
    ContributionCycle,
    ContributionStatus,
    Group,
    Kobo,
    Membership,
    Notification,
    PaidBy,
    PaymentIntent,
    PaymentStatus,
    Report,
};
use chrono::{TimeZone, Utc};
use paystack_tools::{TransactionStatus, VerifiedTransaction};

pub const REFERENCE: &str = "ajo_4f1c9a2b";
pub const CONTRIBUTION: i64 = 500_000;

pub fn group(id: i64, organizer_id: &str) -> Group {
    Group {
        id,
        name: "Ikeja traders".into(),
        description: "Shop owners on Allen Avenue".into(),
        organizer_id: organizer_id.into(),
        contribution_cycle: ContributionCycle::Monthly,
        contribution_amount: Kobo::from(CONTRIBUTION),
        withdrawal_schedule: "end of month".into(),
        fee_percent: 1.0,
        referral_code: "K7QX2M".into(),
        monthly_total: Kobo::from(0),
        unpaid_count: 3,
        current_cycle_month: None,
        created_at: Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap(),
    }
}

pub fn membership(id: i64, group_id: i64, user_id: &str) -> Membership {
    Membership {
        id,
        user_id: user_id.into(),
        user_email: format!("{user_id}@example.com"),
        group_id,
        joined_at: Utc.with_ymd_and_hms(2024, 10, 2, 9, 0, 0).unwrap(),
    }
}

pub fn intent(status: PaymentStatus) -> PaymentIntent {
    let now = Utc.with_ymd_and_hms(2024, 10, 5, 12, 30, 0).unwrap();
    PaymentIntent {
        id: 11,
        membership_id: 2,
        amount: Kobo::from(CONTRIBUTION),
        reference: REFERENCE.into(),
        status,
        paid_by: PaidBy::Member,
        created_at: now,
        updated_at: now,
    }
}

pub fn contribution(source: ConfirmationSource) -> Contribution {
    Contribution {
        id: 7,
        membership_id: 2,
        amount: Kobo::from(CONTRIBUTION),
        status: ContributionStatus::Completed,
        payment_reference: Some(REFERENCE.into()),
        paid_by: PaidBy::Member,
        source,
        note: None,
        cycle_month: None,
        created_at: Utc.with_ymd_and_hms(2024, 10, 5, 12, 31, 0).unwrap(),
    }
}

pub fn notification(id: i64, user_id: &str) -> Notification {
    Notification {
        id,
        user_id: user_id.into(),
        group_id: Some(1),
        message: "ada paid ₦5000.00 into Ikeja traders.".into(),
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2024, 10, 5, 12, 31, 5).unwrap(),
    }
}

pub fn report(id: i64, group_id: i64, reporter_id: &str) -> Report {
    Report {
        id,
        group_id,
        reporter_id: reporter_id.into(),
        subject: "Late payout".into(),
        message: "The October pot has not been paid out".into(),
        is_resolved: false,
        created_at: Utc.with_ymd_and_hms(2024, 10, 28, 8, 15, 0).unwrap(),
        resolved_at: None,
    }
}

pub fn verified(status: TransactionStatus, amount: i64) -> VerifiedTransaction {
    VerifiedTransaction {
        reference: REFERENCE.into(),
        status,
        amount: Kobo::from(amount),
        currency: Some("NGN".into()),
        gateway_response: Some("Approved".into()),
    }
}

pub fn charge_success_payload(amount: i64) -> String {
    format!(r#"{{"event":"charge.success","data":{{"reference":"{REFERENCE}","status":"success","amount":{amount}}}}}"#)
}
