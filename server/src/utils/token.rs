use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::utils::error::{AppError, AppResult};

pub const TICKET_TOKEN_LEN: usize = 8;

static TOKEN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque 8-character token printed on a ticket.
///
/// The hash input mixes a nanosecond timestamp with a process-local
/// sequence so two tokens minted in the same tick still differ. Uniqueness
/// across processes is left to the `token` unique constraint.
pub fn generate_ticket_token() -> AppResult<String> {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .ok_or_else(|| AppError::InternalServerError("clock out of range".to_string()))?;
    let sequence = TOKEN_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(nanos.to_be_bytes());
    hasher.update(sequence.to_be_bytes());
    let encoded = STANDARD.encode(hasher.finalize());

    let token: String = encoded
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(TICKET_TOKEN_LEN)
        .collect();

    if token.len() < TICKET_TOKEN_LEN {
        return Err(AppError::InternalServerError(
            "failed to generate ticket token".to_string(),
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_eight_alphanumeric_chars() {
        let token = generate_ticket_token().unwrap();
        assert_eq!(token.len(), TICKET_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_ten_thousand_tokens_do_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let token = generate_ticket_token().unwrap();
            assert_eq!(token.len(), TICKET_TOKEN_LEN);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(seen.insert(token), "duplicate token generated");
        }
    }
}
