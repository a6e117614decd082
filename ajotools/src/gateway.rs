use anyhow::Result;
use paystack_tools::{PaystackApi, PaystackConfig};

use crate::{formatting::format_transaction, VerifyParams};

pub async fn print_verification(params: VerifyParams) -> Result<()> {
    let mut config = PaystackConfig::new_from_env_or_default();
    if let Some(url) = params.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    let api = PaystackApi::new(config)?;
    let tx = api.verify(&params.reference).await?;
    print!("{}", format_transaction(&tx)?);
    Ok(())
}
