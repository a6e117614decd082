//! Plain data types stored in, and returned from, the ledger store.
use std::{fmt::Display, str::FromStr};

pub use ajo_common::Kobo;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------   ContributionCycle   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContributionCycle {
    Weekly,
    Monthly,
}

impl ContributionCycle {
    /// The number of weeks between two consecutive contributions.
    pub fn weeks(&self) -> i64 {
        match self {
            ContributionCycle::Weekly => 1,
            ContributionCycle::Monthly => 4,
        }
    }
}

impl Display for ContributionCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionCycle::Weekly => write!(f, "weekly"),
            ContributionCycle::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for ContributionCycle {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            s => Err(ConversionError(format!("Invalid contribution cycle: {s}"))),
        }
    }
}

//--------------------------------------         Group         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub organizer_id: String,
    pub contribution_cycle: ContributionCycle,
    pub contribution_amount: Kobo,
    pub withdrawal_schedule: String,
    pub fee_percent: f64,
    pub referral_code: String,
    /// Sum of the completed contributions in the current cycle
    pub monthly_total: Kobo,
    /// Number of members who have not paid yet in the current cycle
    pub unpaid_count: i64,
    /// The first day of the month the aggregates above refer to. `None` until the first cycle roll.
    pub current_cycle_month: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_FEE_PERCENT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub contribution_cycle: ContributionCycle,
    pub contribution_amount: Kobo,
    #[serde(default)]
    pub withdrawal_schedule: String,
    #[serde(default = "default_fee_percent")]
    pub fee_percent: f64,
}

fn default_fee_percent() -> f64 {
    DEFAULT_FEE_PERCENT
}

impl NewGroup {
    pub fn new<S: Into<String>>(name: S, contribution_cycle: ContributionCycle, contribution_amount: Kobo) -> Self {
        Self {
            name: name.into(),
            description: String::default(),
            contribution_cycle,
            contribution_amount,
            withdrawal_schedule: String::default(),
            fee_percent: DEFAULT_FEE_PERCENT,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_withdrawal_schedule<S: Into<String>>(mut self, schedule: S) -> Self {
        self.withdrawal_schedule = schedule.into();
        self
    }

    pub fn with_fee_percent(mut self, fee_percent: f64) -> Self {
        self.fee_percent = fee_percent;
        self
    }
}

//--------------------------------------       UserInfo        ---------------------------------------------------------
/// The identity of a caller, as vouched for by the upstream authenticating proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
}

impl UserInfo {
    pub fn new<S: Into<String>>(user_id: S, email: S) -> Self {
        Self { user_id: user_id.into(), email: email.into() }
    }
}

//--------------------------------------      Membership       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Membership {
    pub id: i64,
    pub user_id: String,
    pub user_email: String,
    pub group_id: i64,
    pub joined_at: DateTime<Utc>,
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// A reference has been assigned and the gateway has been (or is about to be) asked to start a transaction.
    Initiated,
    /// The gateway confirmed the payment. Terminal.
    Success,
    /// The gateway could not start the transaction, or reported a terminal failure. Terminal.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Initiated => write!(f, "initiated"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

//--------------------------------------         PaidBy        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize, Default)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaidBy {
    #[default]
    Member,
    /// The organizer paid on the member's behalf
    Organizer,
}

impl Display for PaidBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaidBy::Member => write!(f, "member"),
            PaidBy::Organizer => write!(f, "organizer"),
        }
    }
}

//--------------------------------------     PaymentIntent     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: i64,
    pub membership_id: i64,
    pub amount: Kobo,
    pub reference: String,
    pub status: PaymentStatus,
    pub paid_by: PaidBy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentIntent {
    pub membership_id: i64,
    pub amount: Kobo,
    pub reference: String,
    pub paid_by: PaidBy,
}

impl NewPaymentIntent {
    pub fn new<S: Into<String>>(membership_id: i64, amount: Kobo, reference: S, paid_by: PaidBy) -> Self {
        Self { membership_id, amount, reference: reference.into(), paid_by }
    }
}

//--------------------------------------  ContributionStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    Pending,
    Completed,
}

//--------------------------------------  ConfirmationSource   ---------------------------------------------------------
/// Which path confirmed a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationSource {
    /// The contributor's browser returned from the gateway and the payment was verified synchronously
    Callback,
    /// The gateway pushed a signed event
    Webhook,
    /// The organizer recorded an offline payment
    Manual,
}

impl Display for ConfirmationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationSource::Callback => write!(f, "callback"),
            ConfirmationSource::Webhook => write!(f, "webhook"),
            ConfirmationSource::Manual => write!(f, "manual"),
        }
    }
}

//--------------------------------------      Contribution     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub membership_id: i64,
    pub amount: Kobo,
    pub status: ContributionStatus,
    pub payment_reference: Option<String>,
    pub paid_by: PaidBy,
    pub source: ConfirmationSource,
    pub note: Option<String>,
    /// The group cycle this contribution was counted towards
    pub cycle_month: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualContribution {
    pub membership_id: i64,
    pub amount: Kobo,
    pub note: Option<String>,
}

//--------------------------------------     HistoryStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Paid,
    Unpaid,
}

//--------------------------------------     HistoryEntry      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub group_id: i64,
    pub membership_id: i64,
    pub amount: Kobo,
    pub status: HistoryStatus,
    /// The first day of the month this entry closes
    pub period: NaiveDate,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       CycleRoll       ---------------------------------------------------------
/// The result of moving a group into a new billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRoll {
    pub group_id: i64,
    /// The period that was closed off
    pub closed_period: NaiveDate,
    /// The period the group is now in
    pub new_period: NaiveDate,
    /// Number of `unpaid` history entries written for the closed period
    pub unpaid_entries: u64,
}

//--------------------------------------         Payout        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payout {
    pub id: i64,
    pub group_id: i64,
    pub total_amount: Kobo,
    pub fee_deducted: Kobo,
    pub recipient_id: Option<String>,
    pub distributed: bool,
    pub paid_at: DateTime<Utc>,
    /// The cycle whose pot this payout settles.
    pub cycle_month: Option<NaiveDate>,
}

impl Payout {
    pub fn net_amount(&self) -> Kobo {
        self.total_amount - self.fee_deducted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayout {
    pub group_id: i64,
    pub total_amount: Kobo,
    pub fee_deducted: Kobo,
    pub recipient_id: Option<String>,
    pub cycle_month: NaiveDate,
}

//--------------------------------------      Notification     ---------------------------------------------------------
/// A message in a user's inbox.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub group_id: Option<i64>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub group_id: Option<i64>,
    pub message: String,
}

impl NewNotification {
    pub fn new<S: Into<String>>(user_id: S, group_id: i64, message: String) -> Self {
        Self { user_id: user_id.into(), group_id: Some(group_id), message }
    }
}

//--------------------------------------         Report        ---------------------------------------------------------
/// A problem raised by a member with their group's organizer.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub group_id: i64,
    pub reporter_id: String,
    pub subject: String,
    pub message: String,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub group_id: i64,
    pub reporter_id: String,
    pub subject: String,
    pub message: String,
}
