use std::fmt::Write;

use ajo_engine::db_types::CycleRoll;
use anyhow::Result;
use paystack_tools::VerifiedTransaction;
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use qrcode::{render::unicode, QrCode};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

pub fn format_rolls(rolls: &[CycleRoll]) -> String {
    let mut table = Table::new();
    table.set_titles(row!["Group", "Closed", "Now in", "Unpaid entries"]);
    rolls.iter().for_each(|r| {
        table.add_row(row![r.group_id, r.closed_period, r.new_period, r.unpaid_entries]);
    });
    table.set_format(markdown_format());
    table.to_string()
}

pub fn format_transaction(tx: &VerifiedTransaction) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "Reference: {}", tx.reference)?;
    writeln!(f, "Status: {}", tx.status)?;
    writeln!(f, "Amount: {} ({} kobo)", tx.amount, tx.amount.value())?;
    writeln!(f, "Currency: {}", tx.currency.as_deref().unwrap_or("-"))?;
    writeln!(f, "Gateway response: {}", tx.gateway_response.as_deref().unwrap_or("-"))?;
    Ok(f)
}

pub fn join_link(base_url: &str, code: &str) -> String {
    format!("{}/join/{}", base_url.trim_end_matches('/'), code.trim().to_ascii_uppercase())
}

pub fn print_join_qr_code(base_url: &str, code: &str) {
    let link = join_link(base_url, code);
    let qr = QrCode::new(&link)
        .map(|code| {
            code.render::<unicode::Dense1x2>()
                .dark_color(unicode::Dense1x2::Dark)
                .light_color(unicode::Dense1x2::Light)
                .build()
        })
        .unwrap_or_default();
    println!("{qr}");
    println!("{link}");
}
