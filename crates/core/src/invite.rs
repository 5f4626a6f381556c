//! Invitation token generation and hashing.
//!
//! Lives in `core` (zero internal deps) so both the repository layer and the
//! API can share it. Tokens travel to the invitee by email; the database
//! only ever sees the SHA-256 digest.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::types::Timestamp;

/// Length of the generated invitation token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 48;

/// How long an invitation stays redeemable.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// The result of generating a new invitation token.
pub struct GeneratedInviteToken {
    /// The plaintext token (emailed to the invitee, never stored).
    pub plaintext: String,
    /// The SHA-256 hex digest of the plaintext (stored in the database).
    pub hash: String,
}

/// Generate a new random invitation token.
pub fn generate_invite_token() -> GeneratedInviteToken {
    let token: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();

    let hash = hash_invite_token(&token);

    GeneratedInviteToken {
        plaintext: token,
        hash,
    }
}

/// Compute the SHA-256 hex digest of a token.
///
/// Used both at creation (to store the hash) and at redemption (to look the
/// invitation up by hash).
pub fn hash_invite_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Expiry timestamp for an invitation created at `now`.
pub fn default_expiry(now: Timestamp) -> Timestamp {
    now + chrono::Duration::days(INVITATION_TTL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_correct_length() {
        assert_eq!(generate_invite_token().plaintext.len(), TOKEN_LENGTH);
    }

    #[test]
    fn generated_token_is_alphanumeric() {
        let token = generate_invite_token();
        assert!(token.plaintext.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn hash_is_sha256_hex() {
        let token = generate_invite_token();
        assert_eq!(token.hash.len(), 64);
        assert!(token.hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_matches_regeneration() {
        let token = generate_invite_token();
        assert_eq!(token.hash, hash_invite_token(&token.plaintext));
    }

    #[test]
    fn different_tokens_produce_different_hashes() {
        let a = generate_invite_token();
        let b = generate_invite_token();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn expiry_is_one_week_out() {
        let now = chrono::Utc::now();
        assert_eq!(default_expiry(now) - now, chrono::Duration::days(7));
    }
}
