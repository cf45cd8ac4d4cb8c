//! Form nonces: short tokens proving a save request came from a form this
//! site rendered for this user recently.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::expiry::Clock;

/// Creates and verifies action-bound form tokens.
pub trait NonceVerifier: Send + Sync {
    fn create(&self, action: &str, user_id: u64) -> String;

    fn verify(&self, token: &str, action: &str, user_id: u64) -> bool;
}

/// Time-windowed nonces: a SHA-256 over the tick, action, user and secret,
/// shortened to ten hex characters. A token stays valid for the tick it was
/// made in and the one after, so for between half and all of the lifetime.
pub struct HashNonces {
    secret: String,
    lifetime_secs: i64,
    clock: Arc<dyn Clock>,
}

impl HashNonces {
    pub fn new(secret: impl Into<String>, lifetime_hours: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs: i64::from(lifetime_hours.max(1)) * 3600,
            clock,
        }
    }

    fn tick(&self) -> i64 {
        let half = self.lifetime_secs / 2;
        let now = self.clock.now().and_utc().timestamp();
        (now + half - 1).div_euclid(half)
    }

    fn token_for(&self, tick: i64, action: &str, user_id: u64) -> String {
        let digest = Sha256::digest(format!("{tick}|{action}|{user_id}|{}", self.secret).as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        hex[hex.len() - 12..hex.len() - 2].to_string()
    }
}

/// Equal-length comparison that does not stop at the first difference.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

impl NonceVerifier for HashNonces {
    fn create(&self, action: &str, user_id: u64) -> String {
        self.token_for(self.tick(), action, user_id)
    }

    fn verify(&self, token: &str, action: &str, user_id: u64) -> bool {
        if token.is_empty() {
            return false;
        }
        let tick = self.tick();
        [tick, tick - 1]
            .iter()
            .any(|t| constant_time_eq(token, &self.token_for(*t, action, user_id)))
    }
}
