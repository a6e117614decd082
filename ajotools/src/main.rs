use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::*;

mod cycles;
mod formatting;
mod gateway;
mod webhooks;

use crate::{
    cycles::roll_cycles,
    formatting::print_join_qr_code,
    gateway::print_verification,
    webhooks::{print_signature, send_webhook},
};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Operator tools for the ajo contribution ledger")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(name = "sign", about = "Print the Paystack signature of a webhook payload")]
    Sign(SignParams),
    #[clap(name = "webhook", about = "Send a signed charge.success webhook to an ajo server")]
    Webhook(WebhookParams),
    #[clap(name = "verify", about = "Ask Paystack for the status of a payment reference")]
    Verify(VerifyParams),
    #[clap(name = "roll", about = "Move every group into the current contribution month")]
    Roll(RollParams),
    #[clap(name = "qr", about = "Print a QR code for a group's join link")]
    Qr(QrParams),
}

#[derive(Debug, Args)]
pub struct SignParams {
    /// The Paystack secret key
    #[arg(short = 's', long = "secret", env = "AJO_PAYSTACK_SECRET_KEY", hide_env_values = true)]
    secret: String,
    /// A file holding the exact webhook body
    file: PathBuf,
}

#[derive(Debug, Args)]
pub struct WebhookParams {
    /// The root URL of the ajo server
    #[arg(short = 'u', long = "url", default_value = "http://localhost:8460")]
    url: String,
    /// The Paystack secret key the server was configured with
    #[arg(short = 's', long = "secret", env = "AJO_PAYSTACK_SECRET_KEY", hide_env_values = true)]
    secret: String,
    /// The payment reference to confirm
    #[arg(short = 'r', long = "reference")]
    reference: String,
    /// The amount paid, in kobo
    #[arg(short = 'a', long = "amount")]
    amount: i64,
    /// Corrupt the signature. The server should reject the webhook.
    #[arg(long = "tamper", default_value_t = false)]
    tamper: bool,
}

#[derive(Debug, Args)]
pub struct VerifyParams {
    /// The payment reference to look up
    #[arg(short = 'r', long = "reference")]
    reference: String,
    /// Overrides AJO_PAYSTACK_BASE_URL
    #[arg(short = 'b', long = "base-url")]
    base_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct RollParams {
    #[arg(short = 'd', long = "database-url", env = "AJO_DATABASE_URL", default_value = "sqlite://data/ajo_ledger.db")]
    database_url: String,
    /// Roll as if today were this date (YYYY-MM-DD). Groups are never rolled backwards.
    #[arg(long = "date")]
    date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct QrParams {
    /// The root URL of the web app that members open to join
    #[arg(short = 'b', long = "base-url", default_value = "http://localhost:3000")]
    base_url: String,
    /// The group's referral code
    code: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let result = match cli.command {
        Command::Sign(params) => print_signature(params),
        Command::Webhook(params) => send_webhook(params).await,
        Command::Verify(params) => print_verification(params).await,
        Command::Roll(params) => roll_cycles(params).await,
        Command::Qr(params) => {
            print_join_qr_code(&params.base_url, &params.code);
            Ok(())
        },
    };
    if let Err(e) = result {
        error!("{e:#}");
        eprintln!("🚨️ {e:#}");
        std::process::exit(1);
    }
}
