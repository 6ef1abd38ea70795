//! Credential store - the single shared access/refresh credential
//!
//! Readers take a snapshot (`Arc<Credential>`) and never wait on a refresh.
//! Refreshes are serialized by a separate guard and replace the whole value.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::result::Result;
use crate::domain::{AccessGrant, Credential};

/// Holds the current credential and renews it at most once per expiry
#[derive(Debug)]
pub struct CredentialStore {
    current: RwLock<Arc<Credential>>,
    refresh_guard: Mutex<()>,
}

impl CredentialStore {
    pub fn new(credential: Credential) -> Self {
        Self {
            current: RwLock::new(Arc::new(credential)),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Snapshot of the current credential
    pub fn get(&self) -> Arc<Credential> {
        // The slot only ever holds a complete value, so a poisoned lock is still valid.
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn will_expire_shortly(credential: &Credential, now: DateTime<Utc>) -> bool {
        credential.will_expire_shortly(now)
    }

    /// Return a credential that is valid for at least the safety margin
    ///
    /// `refresh` receives the current refresh token and is called only when
    /// the credential is still expiring after the guard has been acquired, so
    /// concurrent callers hitting the same expiry trigger a single refresh.
    /// On failure the stored credential is left untouched.
    pub fn refresh_if_needed<F>(&self, refresh: F) -> Result<Arc<Credential>>
    where
        F: FnOnce(&str) -> Result<AccessGrant>,
    {
        let snapshot = self.get();
        if !Self::will_expire_shortly(&snapshot, Utc::now()) {
            return Ok(snapshot);
        }

        let _guard = self
            .refresh_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self.get();
        if !Self::will_expire_shortly(&current, Utc::now()) {
            debug!("Credential already refreshed by another caller");
            return Ok(current);
        }

        info!(
            expires_at = ?current.access_expires_at(),
            "Access token expiring, refreshing"
        );
        let grant = refresh(current.refresh_token())?;
        let renewed = Arc::new(current.renewed(grant, Utc::now()));
        self.replace(Arc::clone(&renewed));
        Ok(renewed)
    }

    fn replace(&self, credential: Arc<Credential>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = credential;
    }
}
