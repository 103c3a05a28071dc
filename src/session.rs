//! Session store: opaque bearer tokens mapped to identities.
//!
//! Thread-safe token registry using DashMap for concurrent access. A new
//! login always issues a fresh token; older tokens for the same identity
//! stay valid (no single-session-per-user constraint). Sessions never
//! expire unless the store is built with a TTL.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// One issued session.
#[derive(Debug, Clone)]
pub struct SessionRecord<I> {
    pub identity: I,
    pub created_at: DateTime<Utc>,
}

/// Token -> identity registry.
///
/// Generic over the identity payload so the end-user store and the
/// dashboard store share one implementation but can never mix tokens.
pub struct SessionStore<I> {
    sessions: DashMap<String, SessionRecord<I>>,
    ttl: Option<Duration>,
}

impl<I: Clone> SessionStore<I> {
    /// Store without expiry (the demo default).
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: None,
        }
    }

    /// Store whose sessions expire `ttl` after creation.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Issue a fresh unguessable token for `identity`.
    pub fn issue(&self, identity: I) -> String {
        let token = generate_token();
        self.sessions.insert(
            token.clone(),
            SessionRecord {
                identity,
                created_at: Utc::now(),
            },
        );
        token
    }

    /// Look up a token. Expired sessions are dropped on access.
    pub fn resolve(&self, token: &str) -> Option<I> {
        let token = token.trim();
        let record = self.sessions.get(token)?;

        if let Some(ttl) = self.ttl {
            if Utc::now() - record.created_at > ttl {
                drop(record); // release the shard lock before removing
                self.sessions.remove(token);
                return None;
            }
        }

        Some(record.identity.clone())
    }

    /// Explicit logout. Returns whether the token existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token.trim()).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<I: Clone> Default for SessionStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// 32 random bytes, hex encoded: 256 bits of entropy, 64 chars on the wire.
fn generate_token() -> String {
    let raw: [u8; 32] = rand::random();
    hex::encode(raw)
}
