use rand::{distributions::Alphanumeric, Rng};

pub const REFERRAL_CODE_LENGTH: usize = 6;
pub const PAYMENT_REFERENCE_PREFIX: &str = "ajo_";
const REFERRAL_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERENCE_ENTROPY_CHARS: usize = 20;

/// Generates a random 6-character referral code made of uppercase letters and digits.
///
/// Codes are not guaranteed to be unique. The store enforces uniqueness and the caller regenerates on collision.
pub fn new_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| {
            let i = rng.gen_range(0..REFERRAL_ALPHABET.len());
            REFERRAL_ALPHABET[i] as char
        })
        .collect()
}

/// Generates a fresh payment reference, e.g. `ajo_q3ZkP0w8r2LmXa9TbC1d`.
///
/// 20 alphanumeric characters give ~119 bits of entropy, so a collision means something is badly wrong.
pub fn new_payment_reference() -> String {
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(REFERENCE_ENTROPY_CHARS).map(char::from).collect();
    format!("{PAYMENT_REFERENCE_PREFIX}{suffix}")
}
