use ajo_engine::{events::EventProducers, CycleApi, SqliteDatabase};
use anyhow::Result;
use chrono::Utc;
use log::*;

use crate::{formatting::format_rolls, RollParams};

pub async fn roll_cycles(params: RollParams) -> Result<()> {
    let db = SqliteDatabase::new_with_url(&params.database_url, 1).await?;
    db.run_migrations().await?;
    let today = params.date.unwrap_or_else(|| Utc::now().date_naive());
    info!("📆️ Rolling groups in {} as of {today}", params.database_url);
    let api = CycleApi::new(db, EventProducers::default());
    let rolls = api.roll_all_groups_at(today).await?;
    if rolls.is_empty() {
        println!("Every group is already in the {} cycle.", today.format("%B %Y"));
    } else {
        println!("{}", format_rolls(&rolls));
    }
    Ok(())
}
