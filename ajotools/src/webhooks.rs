use ajo_common::Kobo;
use anyhow::{Context, Result};
use log::*;
use paystack_tools::{calculate_signature, WebhookEvent, PAYSTACK_SIGNATURE_HEADER};
use reqwest::header::CONTENT_TYPE;

use crate::{SignParams, WebhookParams};

pub fn print_signature(params: SignParams) -> Result<()> {
    let payload =
        std::fs::read(&params.file).with_context(|| format!("Could not read {}", params.file.display()))?;
    println!("{}", calculate_signature(&params.secret, &payload));
    Ok(())
}

pub fn charge_success_payload(reference: &str, amount: Kobo) -> Result<Vec<u8>> {
    let event = WebhookEvent::charge_success(reference, amount);
    Ok(serde_json::to_vec(&event)?)
}

/// Flips the last hex digit, so the signature is well-formed but wrong.
pub fn tamper(signature: &str) -> String {
    let mut chars = signature.chars().collect::<Vec<char>>();
    if let Some(last) = chars.last_mut() {
        *last = if *last == '0' { '1' } else { '0' };
    }
    chars.into_iter().collect()
}

pub async fn send_webhook(params: WebhookParams) -> Result<()> {
    let payload = charge_success_payload(&params.reference, Kobo::from(params.amount))?;
    let mut signature = calculate_signature(&params.secret, &payload);
    if params.tamper {
        signature = tamper(&signature);
        info!("🔐️ Sending a tampered signature");
    }
    let url = format!("{}/webhook/paystack", params.url.trim_end_matches('/'));
    debug!("📬️ POST {url} for {}", params.reference);
    let response = reqwest::Client::new()
        .post(&url)
        .header(PAYSTACK_SIGNATURE_HEADER, signature)
        .header(CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .await
        .with_context(|| format!("Could not reach {url}"))?;
    let status = response.status();
    let body = response.text().await?;
    println!("{status}");
    println!("{body}");
    Ok(())
}
