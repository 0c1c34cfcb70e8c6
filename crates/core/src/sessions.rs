//! Session management and password hashing.
//!
//! Wraps identity for the API layer: registration hashes passwords with
//! PBKDF2 (PHC string format), login verifies a password and issues an
//! opaque session token, and the token resolves back to the account
//! identifier on each request. Sessions live in process memory and do not
//! survive a restart.

use crate::{CareError, CareResult};
use carebook_uuid::ShardableUuid;
use pbkdf2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Pbkdf2,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Hashes a password for storage, producing a PHC format string.
///
/// # Errors
///
/// Returns `CareError::InvalidInput` for an empty password, or
/// `CareError::PasswordHash` if hashing itself fails.
pub fn hash_password(password: &str) -> CareResult<String> {
    if password.trim().is_empty() {
        return Err(CareError::InvalidInput("password cannot be empty".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CareError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC hash string.
///
/// An unparseable stored hash verifies as false rather than erroring; a
/// corrupt record must not let a login through.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Pbkdf2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// In-memory session token registry.
///
/// Tokens are opaque canonical UUID strings. The registry maps a token to
/// the account it authenticates; account data itself always comes from the
/// user store, so role or approval changes take effect on the next request.
#[derive(Clone, Default)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<String, ShardableUuid>>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for an account.
    pub fn issue(&self, user_id: ShardableUuid) -> String {
        let token = ShardableUuid::new().to_string();
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(token.clone(), user_id);
        token
    }

    /// Resolves a token to the account it authenticates.
    pub fn resolve(&self, token: &str) -> Option<ShardableUuid> {
        self.sessions
            .read()
            .expect("session lock poisoned")
            .get(token)
            .cloned()
    }

    /// Invalidates a token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(token)
            .is_some()
    }
}
