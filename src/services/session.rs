//! Participant sessions and join passwords.
//!
//! ARCHITECTURE
//! ============
//! Joining a poll hands out a random bearer token that maps to one
//! participant of one poll. Signing in again returns the same token, and
//! logging out revokes it everywhere. Tokens live only in memory; after a
//! restart a participant re-joins with the same name (and password, if one
//! was set).
//!
//! Passwords are optional. When present they are stored as
//! `sha256(salt || password)` with a per-participant random salt.

use std::fmt::Write;

use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::state::{AppState, PasswordHash, Session};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Hash a password with a fresh salt.
#[must_use]
pub fn hash_password(password: &str) -> PasswordHash {
    let salt = generate_salt();
    let hash = digest(&salt, password);
    PasswordHash { salt, hash }
}

#[must_use]
pub fn verify_password(stored: &PasswordHash, password: &str) -> bool {
    digest(&stored.salt, password) == stored.hash
}

/// Token for `name` in `poll_id`. A participant who signs in again gets
/// the token already issued to them, so the table holds at most one entry
/// per participant.
pub async fn create_session(state: &AppState, poll_id: Uuid, name: &str) -> String {
    let session = Session { poll_id, name: name.to_owned() };
    let mut sessions = state.sessions.write().await;
    if let Some(token) = sessions.token_for(&session) {
        return token.to_owned();
    }
    let token = generate_token();
    sessions.insert(token.clone(), session);
    token
}

/// Resolve a bearer token.
pub async fn validate_session(state: &AppState, token: &str) -> Option<Session> {
    let sessions = state.sessions.read().await;
    sessions.get(token).cloned()
}

/// Forget a token. Returns whether it existed.
pub async fn delete_session(state: &AppState, token: &str) -> bool {
    let mut sessions = state.sessions.write().await;
    sessions.remove(token).is_some()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
