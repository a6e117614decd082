//! A scriptable stand-in for the payment gateway.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use paystack_tools::{
    calculate_signature,
    signatures_match,
    InitializeTransaction,
    TransactionAuthorization,
    TransactionStatus,
    VerifiedTransaction,
    WebhookEvent,
};

use crate::{
    db_types::Kobo,
    traits::{GatewayError, PaymentGateway},
};

pub const MOCK_SECRET: &str = "sk_test_mock_gateway";

#[derive(Debug, Default)]
struct GatewayState {
    transactions: HashMap<String, VerifiedTransaction>,
    initialized: Vec<InitializeTransaction>,
    failing_initialize: bool,
    unavailable: bool,
    verify_calls: usize,
}

#[derive(Debug, Clone)]
pub struct MockGateway {
    secret: String,
    state: Arc<Mutex<GatewayState>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new(MOCK_SECRET)
    }
}

impl MockGateway {
    pub fn new(secret: &str) -> Self {
        Self { secret: secret.to_string(), state: Arc::new(Mutex::new(GatewayState::default())) }
    }

    /// Sets the gateway-side status and amount of a transaction, as `verify` will report it.
    pub fn settle(&self, reference: &str, status: TransactionStatus, amount: Kobo) {
        let tx = VerifiedTransaction {
            reference: reference.to_string(),
            status,
            amount,
            currency: Some("NGN".into()),
            gateway_response: None,
        };
        self.state.lock().unwrap().transactions.insert(reference.to_string(), tx);
    }

    /// Marks the payment as successful for the amount it was initialized with.
    pub fn succeed(&self, reference: &str) {
        let amount = self.initialized_amount(reference).expect("Transaction was never initialized");
        self.settle(reference, TransactionStatus::Success, amount);
    }

    pub fn set_failing_initialize(&self, failing: bool) {
        self.state.lock().unwrap().failing_initialize = failing;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    pub fn initialized(&self) -> Vec<InitializeTransaction> {
        self.state.lock().unwrap().initialized.clone()
    }

    pub fn initialized_amount(&self, reference: &str) -> Option<Kobo> {
        self.state.lock().unwrap().initialized.iter().find(|t| t.reference == reference).map(|t| t.amount)
    }

    pub fn verify_calls(&self) -> usize {
        self.state.lock().unwrap().verify_calls
    }

    pub fn sign(&self, payload: &[u8]) -> String {
        calculate_signature(&self.secret, payload)
    }

    /// A `charge.success` webhook body, and its signature.
    pub fn signed_charge_success(&self, reference: &str, amount: Kobo) -> (Vec<u8>, String) {
        let body = serde_json::to_vec(&WebhookEvent::charge_success(reference, amount)).expect("Serializable event");
        let signature = self.sign(&body);
        (body, signature)
    }
}

impl PaymentGateway for MockGateway {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<TransactionAuthorization, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_initialize {
            return Err(GatewayError::Unavailable("The mock gateway is refusing new transactions".into()));
        }
        state.initialized.push(request.clone());
        let pending = VerifiedTransaction {
            reference: request.reference.clone(),
            status: TransactionStatus::Pending,
            amount: request.amount,
            currency: Some("NGN".into()),
            gateway_response: None,
        };
        state.transactions.insert(request.reference.clone(), pending);
        Ok(TransactionAuthorization {
            authorization_url: format!("https://checkout.mock/{}", request.reference),
            access_code: format!("access_{}", request.reference),
            reference: request.reference.clone(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.verify_calls += 1;
        if state.unavailable {
            return Err(GatewayError::Timeout);
        }
        state
            .transactions
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("Error 400. Transaction reference not found".into()))
    }

    fn validate_signature(&self, payload: &[u8], signature: &str) -> bool {
        signatures_match(&self.secret, payload, signature)
    }
}
