use std::fmt::Display;

use ajo_common::Kobo;
use serde::{Deserialize, Serialize};

/// The envelope Paystack wraps around every API response.
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackResponse<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

//--------------------------------------   Initialize   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: Kobo,
    pub reference: String,
    pub callback_url: String,
}

impl InitializeTransaction {
    pub fn new<S: Into<String>>(email: S, amount: Kobo, reference: S, callback_url: S) -> Self {
        Self { email: email.into(), amount, reference: reference.into(), callback_url: callback_url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAuthorization {
    pub authorization_url: String,
    #[serde(default)]
    pub access_code: String,
    pub reference: String,
}

//--------------------------------------     Verify     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Success,
    Failed,
    Abandoned,
    Reversed,
    Pending,
    Ongoing,
    Processing,
    Queued,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// True for statuses from which the transaction can never become successful.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Abandoned | Self::Reversed)
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Reversed => "reversed",
            Self::Pending => "pending",
            Self::Ongoing => "ongoing",
            Self::Processing => "processing",
            Self::Queued => "queued",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedTransaction {
    pub reference: String,
    pub status: TransactionStatus,
    pub amount: Kobo,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
}

//--------------------------------------    Webhooks    ---------------------------------------------------------
pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookData {
    pub reference: String,
    #[serde(default)]
    pub status: Option<String>,
    pub amount: Kobo,
}

impl WebhookEvent {
    pub fn charge_success<S: Into<String>>(reference: S, amount: Kobo) -> Self {
        Self {
            event: CHARGE_SUCCESS_EVENT.to_string(),
            data: WebhookData { reference: reference.into(), status: Some("success".into()), amount },
        }
    }

    pub fn is_charge_success(&self) -> bool {
        self.event == CHARGE_SUCCESS_EVENT
    }
}
