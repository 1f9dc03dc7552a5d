//! Ephemeral email-verification codes.
//!
//! One registry instance per flow (manual signup, Google signup, password
//! reset), all sharing the same shape: a 6-digit code keyed by lower-cased
//! email, at most one pending entry per email, newest code wins. Signup
//! flows consume the entry on verification; password reset checks without
//! consuming and only consumes when the new password is applied.
//!
//! Expiry is checked lazily on access and swept periodically; a wrong code,
//! a missing entry, and an expired entry are indistinguishable to callers so
//! the API cannot be used to probe which emails have requests pending.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::Mutex;

struct Entry<P> {
    code: String,
    payload: P,
    created_at: Instant,
}

pub struct CodeRegistry<P> {
    ttl: Duration,
    inner: Mutex<HashMap<String, Entry<P>>>,
}

impl<P: Clone> CodeRegistry<P> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Store a fresh code for this email, replacing any prior pending entry,
    /// and return the code so the caller can email it.
    pub async fn issue(&self, email: &str, payload: P) -> String {
        let code = generate_code();
        let mut inner = self.inner.lock().await;
        inner.insert(
            email.to_lowercase(),
            Entry {
                code: code.clone(),
                payload,
                created_at: Instant::now(),
            },
        );
        code
    }

    /// Validate without consuming; the reset flow's intermediate step.
    pub async fn peek(&self, email: &str, code: &str) -> bool {
        let inner = self.inner.lock().await;
        matches!(
            inner.get(&email.to_lowercase()),
            Some(entry) if entry.code == code && entry.created_at.elapsed() <= self.ttl
        )
    }

    /// Validate and consume; returns the payload stored at issue time.
    pub async fn consume(&self, email: &str, code: &str) -> Option<P> {
        let key = email.to_lowercase();
        let mut inner = self.inner.lock().await;
        let valid = matches!(
            inner.get(&key),
            Some(entry) if entry.code == code && entry.created_at.elapsed() <= self.ttl
        );
        if !valid {
            return None;
        }
        inner.remove(&key).map(|entry| entry.payload)
    }

    /// Drop entries past their TTL.
    pub async fn expire_stale(&self) {
        let mut inner = self.inner.lock().await;
        inner.retain(|_, entry| entry.created_at.elapsed() <= self.ttl);
    }

    #[cfg(test)]
    pub async fn backdate(&self, email: &str, age: Duration) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.get_mut(&email.to_lowercase()) {
            entry.created_at = Instant::now() - age;
        }
    }
}

/// 6-digit numeric code, uniform in `[100000, 999999]`.
fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CodeRegistry<String> {
        CodeRegistry::new(Duration::from_secs(600))
    }

    #[tokio::test]
    async fn generated_codes_are_six_digits() {
        for _ in 0..256 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[tokio::test]
    async fn consume_succeeds_once_with_matching_code() {
        let reg = registry();
        let code = reg.issue("a@gmail.com", "payload".into()).await;

        assert_eq!(reg.consume("a@gmail.com", &code).await.as_deref(), Some("payload"));
        assert!(reg.consume("a@gmail.com", &code).await.is_none());
    }

    #[tokio::test]
    async fn email_key_is_case_folded() {
        let reg = registry();
        let code = reg.issue("A@Gmail.COM", "p".into()).await;
        assert!(reg.consume("a@gmail.com", &code).await.is_some());
    }

    #[tokio::test]
    async fn wrong_code_or_wrong_email_both_fail() {
        let reg = registry();
        let code = reg.issue("a@gmail.com", "p".into()).await;

        assert!(reg.consume("a@gmail.com", "000000").await.is_none());
        assert!(reg.consume("b@gmail.com", &code).await.is_none());
        // The entry survives failed attempts.
        assert!(reg.consume("a@gmail.com", &code).await.is_some());
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_code() {
        let reg = registry();
        let first = reg.issue("a@gmail.com", "one".into()).await;
        let second = reg.issue("a@gmail.com", "two".into()).await;

        if first != second {
            assert!(!reg.peek("a@gmail.com", &first).await);
        }
        assert_eq!(reg.consume("a@gmail.com", &second).await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn peek_does_not_consume() {
        let reg = registry();
        let code = reg.issue("a@gmail.com", "p".into()).await;

        assert!(reg.peek("a@gmail.com", &code).await);
        assert!(reg.peek("a@gmail.com", &code).await);
        assert!(reg.consume("a@gmail.com", &code).await.is_some());
        assert!(!reg.peek("a@gmail.com", &code).await);
    }

    #[tokio::test]
    async fn expired_entries_fail_lazily_and_sweep() {
        let reg = registry();
        let code = reg.issue("a@gmail.com", "p".into()).await;
        reg.backdate("a@gmail.com", Duration::from_secs(3600)).await;

        assert!(!reg.peek("a@gmail.com", &code).await);
        assert!(reg.consume("a@gmail.com", &code).await.is_none());

        reg.expire_stale().await;
        let inner = reg.inner.lock().await;
        assert!(inner.is_empty());
    }
}
