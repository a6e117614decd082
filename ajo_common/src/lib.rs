mod kobo;

pub mod op;
mod secret;

pub use kobo::{Kobo, KoboConversionError, NAIRA_CURRENCY_CODE};
pub use secret::Secret;
