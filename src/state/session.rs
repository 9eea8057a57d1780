//! Session lifecycle: who is signed in, with which token, and whether the
//! stored session is still being confirmed.
//!
//! DESIGN
//! ======
//! The phase is derived from the fields rather than stored:
//!
//! ```text
//! Uninitialized -> Loading        initialize()
//! Loading       -> Authenticated  stored token and the user fetch succeeds
//! Loading       -> Anonymous      no stored token, or the fetch fails or is empty
//! Authenticated -> Anonymous      logout(), or refresh_user() cannot confirm the user
//! Anonymous     -> Authenticated  login() or register()
//! ```
//!
//! Every remote operation takes a generation number from a counter inside
//! the state lock. A result is applied only if no later operation has begun,
//! and logout advances the counter too, so a slow response can never
//! resurrect a session that was ended after it was requested.
//!
//! ERROR HANDLING
//! ==============
//! Fail-closed: any refresh that cannot confirm the stored identity revokes
//! the session instead of surfacing an error. Only explicit login/register
//! report failures to the caller. Storage failures are logged and ignored.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::nav::Navigator;
use crate::config::ClientConfig;
use crate::net::api::CanteenApi;
use crate::net::types::{ApiError, Credentials, User};
use crate::storage::{AUTH_TOKEN_KEY, KeyValueStore, USER_ID_KEY};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Registration payload lacks a string field needed for the follow-up login.
    #[error("registration payload missing `{0}`")]
    MissingField(&'static str),

    /// The account exists now; only the automatic login failed.
    #[error("account created but login failed: {0}")]
    RegisteredButLoginFailed(#[source] ApiError),

    /// A later login, refresh or logout started while this one was in flight.
    #[error("login result discarded: superseded by a newer session operation")]
    Superseded,
}

// =============================================================================
// PUBLIC STATE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

/// Point-in-time copy of the session for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_loading: bool,
    pub phase: SessionPhase,
}

/// Lifetime of the front-end that owns a store. Once unmounted, pending
/// async results are dropped instead of applied.
#[derive(Clone, Debug)]
pub struct Scope {
    mounted: Arc<AtomicBool>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self { mounted: Arc::new(AtomicBool::new(true)) }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug)]
struct Inner {
    user: Option<User>,
    token: Option<String>,
    is_loading: bool,
    initialized: bool,
    generation: u64,
}

impl Inner {
    fn phase(&self) -> SessionPhase {
        if self.user.is_some() && self.token.is_some() {
            SessionPhase::Authenticated
        } else if self.is_loading && !self.initialized {
            SessionPhase::Uninitialized
        } else if self.is_loading {
            SessionPhase::Loading
        } else {
            SessionPhase::Anonymous
        }
    }
}

pub struct SessionStore {
    api: Arc<dyn CanteenApi>,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    device_name: String,
    home_path: String,
    inner: Mutex<Inner>,
}

impl SessionStore {
    #[must_use]
    pub fn new(
        api: Arc<dyn CanteenApi>,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            api,
            storage,
            navigator,
            device_name: config.device_name.clone(),
            home_path: config.home_path.clone(),
            inner: Mutex::new(Inner { user: None, token: None, is_loading: true, initialized: false, generation: 0 }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            user: inner.user.clone(),
            token: inner.token.clone(),
            is_loading: inner.is_loading,
            phase: inner.phase(),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    // -------------------------------------------------------------------------
    // Initialization
    // -------------------------------------------------------------------------

    /// Restore the persisted session. Runs once per store; later calls return
    /// immediately. The loading flag is cleared at the end unless `scope` was
    /// unmounted while the user fetch was in flight.
    pub async fn initialize(&self, scope: &Scope) {
        {
            let mut inner = self.lock();
            if inner.initialized {
                debug!("session already initialized");
                return;
            }
            inner.initialized = true;
            inner.is_loading = true;
        }

        if let Some(token) = self.read_key(AUTH_TOKEN_KEY) {
            if scope.is_mounted() {
                self.lock().token = Some(token);
            }
            self.refresh(Some(scope)).await;
        }

        if scope.is_mounted() {
            self.lock().is_loading = false;
        } else {
            debug!("scope unmounted during session initialization");
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Sign in and persist the resulting session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] when the backend rejects or cannot serve
    /// the request (the session is left unchanged), and
    /// [`SessionError::Superseded`] when another session operation started
    /// before the response arrived.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let generation = self.begin();
        let credentials = Credentials {
            email: email.to_owned(),
            password: password.to_owned(),
            device_name: self.device_name.clone(),
        };
        let auth = self.api.login(&credentials).await?;

        {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!(generation, latest = inner.generation, "discarding stale login response");
                return Err(SessionError::Superseded);
            }
            self.write_key(AUTH_TOKEN_KEY, &auth.token);
            self.write_key(USER_ID_KEY, &auth.user.id);
            inner.token = Some(auth.token);
            inner.user = Some(auth.user.clone());
            inner.is_loading = false;
        }

        info!(user_id = %auth.user.id, "login succeeded");
        Ok(auth.user)
    }

    /// Create an account from `fields` (sent unmodified), then sign in with
    /// its `email` and `password`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingField`] before any request when
    /// `email`/`password` are absent, [`SessionError::Api`] when registration
    /// fails, and [`SessionError::RegisteredButLoginFailed`] when the account
    /// was created but the follow-up login was rejected.
    pub async fn register(&self, fields: Map<String, Value>) -> Result<User, SessionError> {
        let email = string_field(&fields, "email")?;
        let password = string_field(&fields, "password")?;

        self.api.register(&fields).await?;
        info!(%email, "account registered");

        self.login(&email, &password).await.map_err(|e| match e {
            SessionError::Api(api) => SessionError::RegisteredButLoginFailed(api),
            other => other,
        })
    }

    /// End the session. Local state is cleared and the navigator sent home
    /// before the backend is told, so a login that starts while the remote
    /// call is in flight is never undone by it. The remote call is
    /// best-effort. Safe to call when already signed out.
    pub async fn logout(&self) {
        let token = {
            let mut inner = self.lock();
            let token = inner.token.take().or_else(|| self.read_key(AUTH_TOKEN_KEY));
            self.clear_locked(&mut inner);
            token
        };
        info!("logged out");
        self.navigator.navigate(&self.home_path);

        if let Some(token) = token {
            if let Err(e) = self.api.logout(&token).await {
                warn!(error = %e, "remote logout failed; local session already cleared");
            }
        }
    }

    /// Re-fetch the signed-in user by the persisted id. Any failure to
    /// confirm the identity revokes the session.
    pub async fn refresh_user(&self) {
        self.refresh(None).await;
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn begin(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.generation
    }

    async fn refresh(&self, scope: Option<&Scope>) {
        let Some(user_id) = self.read_key(USER_ID_KEY) else {
            if scope.is_none_or(Scope::is_mounted) {
                self.revoke(None, "no stored user id");
            }
            return;
        };

        let generation = self.begin();
        let token = self.lock().token.clone().or_else(|| self.read_key(AUTH_TOKEN_KEY));
        let Some(token) = token else {
            if scope.is_none_or(Scope::is_mounted) {
                self.revoke(Some(generation), "no stored token");
            }
            return;
        };

        let result = self.api.get_user(Some(&token), &user_id).await;

        if scope.is_some_and(|s| !s.is_mounted()) {
            debug!(%user_id, "scope unmounted; dropping user refresh result");
            return;
        }

        match result {
            Ok(Some(user)) => {
                let mut inner = self.lock();
                if inner.generation != generation {
                    debug!(generation, latest = inner.generation, "discarding stale user refresh");
                    return;
                }
                if inner.token.is_none() {
                    inner.token = Some(token);
                }
                inner.user = Some(user);
            }
            Ok(None) => {
                warn!(%user_id, "stored user not found");
                self.revoke(Some(generation), "user not found");
            }
            Err(e) => {
                warn!(%user_id, error = %e, "user refresh failed");
                self.revoke(Some(generation), "user refresh failed");
            }
        }
    }

    /// Local-only logout for identities that could not be confirmed. With a
    /// generation, applies only if no newer operation has begun.
    fn revoke(&self, generation: Option<u64>, reason: &str) {
        {
            let mut inner = self.lock();
            if generation.is_some_and(|g| g != inner.generation) {
                debug!(reason, "skipping revoke for stale operation");
                return;
            }
            self.clear_locked(&mut inner);
        }
        info!(reason, "session revoked");
        self.navigator.navigate(&self.home_path);
    }

    fn clear_locked(&self, inner: &mut Inner) {
        self.remove_key(AUTH_TOKEN_KEY);
        self.remove_key(USER_ID_KEY);
        inner.token = None;
        inner.user = None;
        inner.is_loading = false;
        inner.generation += 1;
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    fn write_key(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key, error = %e, "storage write failed");
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!(key, error = %e, "storage remove failed");
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &'static str) -> Result<String, SessionError> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or(SessionError::MissingField(key))
}
