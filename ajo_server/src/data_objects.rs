use std::fmt::Display;

use ajo_engine::{db_types::Kobo, StartedPayment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Paystack appends both `trxref` and `reference` to the callback URL. They carry the same value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackParams {
    pub reference: Option<String>,
    pub trxref: Option<String>,
}

impl CallbackParams {
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref().or(self.trxref.as_deref()).map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGroupParams {
    pub referral_code: String,
}

/// Start a contribution. Organizers may pay for another member by naming them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionParams {
    #[serde(default)]
    pub member_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualContributionParams {
    pub member_id: String,
    pub amount: Kobo,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutParams {
    #[serde(default)]
    pub recipient_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportParams {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStartedResponse {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
    pub amount: Kobo,
}

impl From<StartedPayment> for PaymentStartedResponse {
    fn from(started: StartedPayment) -> Self {
        Self {
            reference: started.intent.reference,
            authorization_url: started.authorization_url,
            access_code: started.access_code,
            amount: started.intent.amount,
        }
    }
}
