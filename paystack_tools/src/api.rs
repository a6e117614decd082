use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::PaystackConfig,
    data_objects::{InitializeTransaction, PaystackResponse, TransactionAuthorization, VerifiedTransaction},
    signature::signatures_match,
    PaystackApiError,
};

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for PaystackApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaystackApi ({})", self.config.base_url)
    }
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(bearer.as_str()).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    pub fn config(&self) -> &PaystackConfig {
        &self.config
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            // Paystack puts a human-readable reason in the envelope, even on errors
            let message = serde_json::from_str::<PaystackResponse<serde_json::Value>>(&text)
                .map(|r| r.message)
                .unwrap_or(text);
            return Err(PaystackApiError::QueryError { status: status.as_u16(), message });
        }
        trace!("REST query successful. {status}");
        let envelope = serde_json::from_str::<PaystackResponse<T>>(&text)
            .map_err(|e| PaystackApiError::JsonError(format!("{e}. Body: {text}")))?;
        if !envelope.status {
            return Err(PaystackApiError::Unsuccessful(envelope.message));
        }
        envelope.data.ok_or(PaystackApiError::EmptyResponse)
    }

    /// Creates a new transaction on Paystack. The caller is responsible for generating a unique reference _before_
    /// calling this method.
    pub async fn initialize(
        &self,
        request: &InitializeTransaction,
    ) -> Result<TransactionAuthorization, PaystackApiError> {
        debug!("Initializing transaction {} for {}", request.reference, request.amount);
        let result = self
            .rest_query::<TransactionAuthorization, _>(Method::POST, "/transaction/initialize", Some(request))
            .await?;
        info!("Transaction {} initialized", result.reference);
        Ok(result)
    }

    /// Fetches the current state of the transaction with the given reference.
    pub async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, PaystackApiError> {
        let path = format!("/transaction/verify/{reference}");
        debug!("Verifying transaction {reference}");
        let result = self.rest_query::<VerifiedTransaction, ()>(Method::GET, &path, None).await?;
        info!("Transaction {reference} has status {}", result.status);
        Ok(result)
    }

    /// Checks the signature Paystack attached to a webhook against the raw body bytes.
    pub fn validate_signature(&self, payload: &[u8], signature: &str) -> bool {
        signatures_match(self.config.secret_key.reveal(), payload, signature)
    }
}
