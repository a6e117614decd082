use log::*;
use paystack_tools::{
    InitializeTransaction,
    PaystackApi,
    PaystackApiError,
    TransactionAuthorization,
    VerifiedTransaction,
};
use thiserror::Error;

/// The engine's view of the payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Starts a transaction for a reference that has already been persisted.
    async fn initialize(&self, request: &InitializeTransaction) -> Result<TransactionAuthorization, GatewayError>;

    /// Asks the provider for the current state of the transaction.
    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError>;

    /// Checks a webhook signature against the exact bytes that were received.
    fn validate_signature(&self, payload: &[u8], signature: &str) -> bool;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("The payment gateway did not respond in time")]
    Timeout,
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    #[error("The payment gateway sent a response we could not understand: {0}")]
    InvalidResponse(String),
}

impl From<PaystackApiError> for GatewayError {
    fn from(e: PaystackApiError) -> Self {
        match e {
            PaystackApiError::Timeout => GatewayError::Timeout,
            PaystackApiError::Initialization(s) | PaystackApiError::RestResponseError(s) => {
                GatewayError::Unavailable(s)
            },
            PaystackApiError::QueryError { status, message } => {
                GatewayError::Rejected(format!("Error {status}. {message}"))
            },
            PaystackApiError::Unsuccessful(s) => GatewayError::Rejected(s),
            PaystackApiError::JsonError(s) => GatewayError::InvalidResponse(s),
            PaystackApiError::EmptyResponse => GatewayError::InvalidResponse(e.to_string()),
        }
    }
}

impl PaymentGateway for PaystackApi {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<TransactionAuthorization, GatewayError> {
        PaystackApi::initialize(self, request).await.map_err(|e| {
            warn!("💳️ Paystack could not initialize transaction {}. {e}", request.reference);
            GatewayError::from(e)
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        PaystackApi::verify(self, reference).await.map_err(|e| {
            warn!("💳️ Paystack could not verify transaction {reference}. {e}");
            GatewayError::from(e)
        })
    }

    fn validate_signature(&self, payload: &[u8], signature: &str) -> bool {
        PaystackApi::validate_signature(self, payload, signature)
    }
}
