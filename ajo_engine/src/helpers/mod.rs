mod codes;
mod dates;

pub use codes::{new_payment_reference, new_referral_code, PAYMENT_REFERENCE_PREFIX, REFERRAL_CODE_LENGTH};
pub use dates::{cycle_period, next_due_date};
