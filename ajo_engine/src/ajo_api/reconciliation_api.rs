use std::fmt::Debug;

use log::*;
use paystack_tools::{data_objects::CHARGE_SUCCESS_EVENT, InitializeTransaction, TransactionStatus, WebhookData};
use serde::Deserialize;

use crate::{
    ajo_api::{
        cycle_api::CycleApi,
        errors::ReconciliationError,
        objects::{CallbackOutcome, ContributionRequest, StartedPayment, WebhookOutcome},
    },
    db_types::{ConfirmationSource, NewPaymentIntent, PaymentIntent, PaymentStatus},
    events::{ContributionCompletedEvent, EventProducers},
    helpers::new_payment_reference,
    traits::{LedgerDatabase, LedgerError, PaymentConfirmation, PaymentGateway, TransitionOutcome},
};

pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:8460/payment/callback";

/// Only the envelope is parsed up front, since the shape of `data` depends on the event type.
#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// `ReconciliationApi` turns gateway signals into ledger state.
///
/// Two independent paths converge on the same success transition:
/// * [`Self::verify_callback`] runs when the contributor's browser comes back from the gateway. It asks the gateway
///   for the transaction status.
/// * [`Self::process_webhook`] runs when the gateway pushes a signed event.
///
/// Both may fire, in any order and any number of times, for the same reference. The store guarantees that exactly one
/// contribution is written per reference, and a [`ContributionCompletedEvent`] is only published for that one.
pub struct ReconciliationApi<B, G> {
    db: B,
    gateway: G,
    cycles: CycleApi<B>,
    producers: EventProducers,
    callback_url: String,
    reference_generator: fn() -> String,
}

impl<B, G> Debug for ReconciliationApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({})", self.callback_url)
    }
}

impl<B: Clone, G> ReconciliationApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        let cycles = CycleApi::new(db.clone(), producers.clone());
        Self {
            db,
            gateway,
            cycles,
            producers,
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
            reference_generator: new_payment_reference,
        }
    }

    /// Where the gateway sends the contributor's browser after checkout.
    pub fn with_callback_url<S: Into<String>>(mut self, url: S) -> Self {
        self.callback_url = url.into();
        self
    }

    /// Replaces the payment reference generator. Only useful for testing.
    pub fn with_reference_generator(mut self, f: fn() -> String) -> Self {
        self.reference_generator = f;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> ReconciliationApi<B, G>
where
    B: LedgerDatabase,
    G: PaymentGateway,
{
    /// Starts a contribution payment.
    ///
    /// A fresh reference is generated and persisted in an `initiated` intent *before* the gateway is contacted. If the
    /// gateway call fails, the intent is marked `failed`, so a retry always gets a new reference.
    pub async fn start_contribution(&self, request: ContributionRequest) -> Result<StartedPayment, ReconciliationError> {
        let reference = (self.reference_generator)();
        let new_intent = NewPaymentIntent::new(request.membership_id, request.amount, reference, request.paid_by);
        let intent = self.db.insert_payment_intent(new_intent).await.map_err(|e| {
            if let LedgerError::DuplicateReference(r) = &e {
                error!("🔄️ Payment reference {r} was generated twice. The payment has been aborted.");
            }
            ReconciliationError::from(e)
        })?;
        let checkout =
            InitializeTransaction::new(request.email, intent.amount, intent.reference.clone(), self.callback_url.clone());
        match self.gateway.initialize(&checkout).await {
            Ok(auth) => {
                info!(
                    "🔄️ Payment {} of {} started for membership #{}",
                    intent.reference, intent.amount, intent.membership_id
                );
                Ok(StartedPayment { intent, authorization_url: auth.authorization_url, access_code: auth.access_code })
            },
            Err(e) => {
                warn!("🔄️ Could not start payment {}. Retiring the reference. {e}", intent.reference);
                if let Err(db_err) = self.db.mark_intent_failed(&intent.reference).await {
                    error!("🔄️ Could not mark payment intent {} as failed. {db_err}", intent.reference);
                }
                Err(e.into())
            },
        }
    }

    /// Handles the contributor's return from the gateway.
    ///
    /// Unknown references are rejected without contacting the gateway. Intents that are already `success` are reported
    /// as such, also without contacting the gateway.
    pub async fn verify_callback(&self, reference: &str) -> Result<CallbackOutcome, ReconciliationError> {
        let intent = self
            .db
            .fetch_payment_intent(reference)
            .await?
            .ok_or_else(|| ReconciliationError::NotFound(format!("Payment reference {reference}")))?;
        if intent.status == PaymentStatus::Success {
            debug!("🔄️ Payment {reference} has already been processed");
            return Ok(CallbackOutcome::Paid(TransitionOutcome::AlreadyProcessed));
        }
        let tx = self.gateway.verify(reference).await?;
        match tx.status {
            TransactionStatus::Success => {
                let confirmation = PaymentConfirmation::new(reference, tx.amount, ConfirmationSource::Callback);
                match self.apply_success(confirmation).await? {
                    TransitionOutcome::UnknownReference => {
                        Err(ReconciliationError::NotFound(format!("Payment reference {reference}")))
                    },
                    outcome => Ok(CallbackOutcome::Paid(outcome)),
                }
            },
            status if status.is_terminal_failure() => {
                self.apply_failure(reference).await?;
                Ok(CallbackOutcome::Declined(status))
            },
            status => {
                debug!("🔄️ Payment {reference} is still {status}");
                Ok(CallbackOutcome::Pending(status))
            },
        }
    }

    /// Handles a webhook pushed by the gateway.
    ///
    /// `payload` must be the raw request body, exactly as received. The signature is checked before anything is parsed,
    /// and a mismatch leaves the ledger untouched.
    pub async fn process_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome, ReconciliationError> {
        let authentic = signature.map(|sig| self.gateway.validate_signature(payload, sig)).unwrap_or(false);
        if !authentic {
            warn!("🔐️ Rejected a webhook with a missing or invalid signature");
            return Err(ReconciliationError::InvalidSignature);
        }
        let envelope: WebhookEnvelope =
            serde_json::from_slice(payload).map_err(|e| ReconciliationError::MalformedPayload(e.to_string()))?;
        if envelope.event != CHARGE_SUCCESS_EVENT {
            info!("🔄️ Ignoring {} webhook", envelope.event);
            return Ok(WebhookOutcome::Ignored(envelope.event));
        }
        let data: WebhookData =
            serde_json::from_value(envelope.data).map_err(|e| ReconciliationError::MalformedPayload(e.to_string()))?;
        let confirmation = PaymentConfirmation::new(data.reference, data.amount, ConfirmationSource::Webhook);
        let outcome = self.apply_success(confirmation).await?;
        Ok(WebhookOutcome::Processed(outcome))
    }

    /// Applies the success transition for a confirmed payment.
    ///
    /// An amount that differs from the intent is an error. Unknown references and replays are not.
    pub async fn apply_success(
        &self,
        confirmation: PaymentConfirmation,
    ) -> Result<TransitionOutcome, ReconciliationError> {
        let reference = confirmation.reference.clone();
        let group = self.db.fetch_group_for_reference(&reference).await?;
        if let Some(group) = &group {
            self.cycles.roll_group(group.id).await?;
        }
        let outcome = self.db.complete_payment(confirmation).await?;
        match (&outcome, group) {
            (TransitionOutcome::Applied(contribution), Some(group)) => {
                info!("🔄️ Payment {reference} applied. {} credited to group #{}", contribution.amount, group.id);
                let event = ContributionCompletedEvent::new(group.id, contribution.clone());
                self.producers.publish_contribution_completed(event).await;
            },
            (TransitionOutcome::Applied(_), None) => {
                warn!("🔄️ Payment {reference} was applied, but its group was not found beforehand. No event published.");
            },
            (TransitionOutcome::AlreadyProcessed, _) => {
                debug!("🔄️ Payment {reference} has already been processed");
            },
            (TransitionOutcome::UnknownReference, _) => {
                info!("🔄️ There is no payment intent with reference {reference}. Nothing to do.");
            },
            (TransitionOutcome::AmountMismatch { expected, received }, _) => {
                error!("🔄️ Payment {reference} was expected to be {expected}, but the gateway says {received}");
                return Err(ReconciliationError::AmountMismatch {
                    reference,
                    expected: *expected,
                    received: *received,
                });
            },
        }
        Ok(outcome)
    }

    /// Applies the failure transition. Only `initiated` intents can fail; anything else is left alone.
    pub async fn apply_failure(&self, reference: &str) -> Result<Option<PaymentIntent>, ReconciliationError> {
        let intent = self.db.mark_intent_failed(reference).await?;
        match &intent {
            Some(_) => info!("🔄️ Payment {reference} failed"),
            None => debug!("🔄️ Payment {reference} was not in the initiated state. Failure not applied."),
        }
        Ok(intent)
    }
}
