//! Async driver around [`Session`].
//!
//! The client owns the single writer for a session: transitions happen under
//! a short-lived lock that is never held across an `.await`, backend calls are
//! bounded by [`SessionConfig::validation_timeout`], and every applied change
//! is published on a `watch` channel so UI code can redirect on `expired`.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use fleetgate_auth::{AuthError, Principal};

use crate::state::{Completion, PendingTicket, Session, SessionSnapshot, TransitionError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A bearer token together with the principal it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub principal: Principal,
}

/// Remote authentication service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<IssuedToken, AuthError>;

    /// Re-validate a stored token (startup rehydration).
    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;

    async fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError>;
}

/// Where the current bearer token survives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot().clone()
    }

    fn save(&self, token: &str) {
        *self.slot() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub validation_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validation_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The session moved on (logout, newer attempt) before the result arrived.
    #[error("result discarded: session changed while the request was in flight")]
    Discarded,
}

pub struct SessionClient {
    backend: Arc<dyn AuthBackend>,
    tokens: Arc<dyn TokenStore>,
    config: SessionConfig,
    session: Mutex<Session>,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionClient {
    pub fn new(backend: Arc<dyn AuthBackend>, tokens: Arc<dyn TokenStore>, config: SessionConfig) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            backend,
            tokens,
            config,
            session: Mutex::new(Session::new()),
            updates,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Principal, SessionError> {
        let ticket = self.transition(Session::start_login)?;
        tracing::debug!(email = %credentials.email, "login started");

        let outcome = self.bounded(self.backend.login(credentials)).await;
        let (result, token) = match outcome {
            Ok(issued) => (Ok(issued.principal), Some(issued.token)),
            Err(err) => (Err(err), None),
        };

        self.settle(ticket, result, |tokens, applied| {
            if let (Some(token), Ok(_)) = (&token, applied) {
                tokens.save(token);
            }
        })
    }

    /// Validate the stored token, if any. A rejected token is cleared and the
    /// session returns to `anonymous`; that is reported as `Ok(None)`.
    pub async fn rehydrate(&self) -> Result<Option<Principal>, SessionError> {
        let Some(token) = self.tokens.load() else {
            return Ok(None);
        };
        let ticket = self.transition(Session::start_rehydrate)?;

        let result = self.bounded(self.backend.validate(&token)).await;
        match self.settle(ticket, result, |tokens, applied| {
            if applied.is_err() {
                tokens.clear();
            }
        }) {
            Ok(principal) => Ok(Some(principal)),
            Err(SessionError::Auth(err)) => {
                tracing::info!(code = err.code.as_str(), "stored token rejected");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Exchange the current token for a fresh one. Failure expires the session.
    pub async fn refresh(&self) -> Result<Principal, SessionError> {
        let ticket = self.transition(Session::begin_refresh)?;

        let result = match self.tokens.load() {
            Some(token) => self.bounded(self.backend.refresh(&token)).await,
            None => Err(AuthError::unauthenticated()),
        };
        let (result, token) = match result {
            Ok(issued) => (Ok(issued.principal), Some(issued.token)),
            Err(err) => (Err(err), None),
        };

        self.settle(ticket, result, |tokens, applied| match (&token, applied) {
            (Some(token), Ok(_)) => tokens.save(token),
            _ => tokens.clear(),
        })
    }

    /// The server rejected the token mid-session (e.g. a 401 on an API call).
    pub fn invalidate_token(&self) -> Result<(), SessionError> {
        let mut session = self.lock();
        session.token_invalidated()?;
        self.tokens.clear();
        self.updates.send_replace(session.snapshot());
        tracing::info!("session expired");
        Ok(())
    }

    pub fn logout(&self) {
        let mut session = self.lock();
        session.logout();
        self.tokens.clear();
        self.updates.send_replace(session.snapshot());
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(
        &self,
        start: impl FnOnce(&mut Session) -> Result<PendingTicket, TransitionError>,
    ) -> Result<PendingTicket, SessionError> {
        let mut session = self.lock();
        let ticket = start(&mut *session)?;
        self.updates.send_replace(session.snapshot());
        Ok(ticket)
    }

    /// Apply a backend result. `persist` runs under the session lock, only
    /// when the result was applied, so a racing logout cannot be undone by a
    /// late token write.
    fn settle(
        &self,
        ticket: PendingTicket,
        result: Result<Principal, AuthError>,
        persist: impl FnOnce(&dyn TokenStore, &Result<Principal, AuthError>),
    ) -> Result<Principal, SessionError> {
        let mut session = self.lock();
        match session.complete(ticket, result.clone()) {
            Completion::Discarded => Err(SessionError::Discarded),
            Completion::Applied(state) => {
                persist(self.tokens.as_ref(), &result);
                self.updates.send_replace(session.snapshot());
                tracing::debug!(attempt = ?ticket.attempt(), state = %state, "session updated");
                result.map_err(SessionError::from)
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, AuthError>>) -> Result<T, AuthError> {
        match tokio::time::timeout(self.config.validation_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.validation_timeout.as_millis() as u64,
                    "authentication request timed out"
                );
                Err(AuthError::network_failure("Authentication service did not respond"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use fleetgate_auth::{AuthErrorCode, Role};
    use tokio::sync::Notify;

    use super::*;
    use crate::state::SessionState;

    /// Backend that accepts `"good"` passwords and tokens, optionally waiting
    /// for a release signal before answering.
    #[derive(Default)]
    struct FakeBackend {
        gate: Option<Arc<Notify>>,
        hang: bool,
    }

    impl FakeBackend {
        fn gated(gate: Arc<Notify>) -> Self {
            Self { gate: Some(gate), hang: false }
        }

        async fn wait(&self) {
            if self.hang {
                std::future::pending::<()>().await;
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
    }

    fn principal() -> Principal {
        Principal::scoped("user-1", Role::Manager, "co-1")
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn login(&self, credentials: &Credentials) -> Result<IssuedToken, AuthError> {
            self.wait().await;
            if credentials.password == "good" {
                Ok(IssuedToken {
                    token: "token-1".to_string(),
                    principal: principal(),
                })
            } else {
                Err(AuthError::invalid_credentials("Invalid email or password").with_field("password"))
            }
        }

        async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
            self.wait().await;
            match token {
                "token-1" => Ok(principal()),
                _ => Err(AuthError::expired_token()),
            }
        }

        async fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
            self.wait().await;
            match token {
                "token-1" => Ok(IssuedToken {
                    token: "token-2".to_string(),
                    principal: principal(),
                }),
                _ => Err(AuthError::expired_token()),
            }
        }
    }

    fn creds(password: &str) -> Credentials {
        Credentials {
            email: "ops@acme.test".to_string(),
            password: password.to_string(),
        }
    }

    fn client(backend: FakeBackend, tokens: Arc<InMemoryTokenStore>) -> Arc<SessionClient> {
        Arc::new(SessionClient::new(Arc::new(backend), tokens, SessionConfig::default()))
    }

    async fn wait_for_pending(client: &SessionClient) {
        let mut rx = client.subscribe();
        rx.wait_for(|s| s.state == SessionState::Pending).await.unwrap();
    }

    #[tokio::test]
    async fn login_persists_token_and_publishes() {
        let tokens = Arc::new(InMemoryTokenStore::new());
        let client = client(FakeBackend::default(), tokens.clone());
        let rx = client.subscribe();

        let p = client.login(&creds("good")).await.unwrap();
        assert_eq!(p, principal());
        assert_eq!(tokens.load().as_deref(), Some("token-1"));
        assert_eq!(rx.borrow().state, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn failed_login_lands_in_error_with_field() {
        let tokens = Arc::new(InMemoryTokenStore::new());
        let client = client(FakeBackend::default(), tokens.clone());

        let err = client.login(&creds("bad")).await.unwrap_err();
        let SessionError::Auth(err) = err else {
            panic!("expected auth error, got {err:?}");
        };
        assert_eq!(err.code, AuthErrorCode::InvalidCredentials);
        assert_eq!(err.field.as_deref(), Some("password"));

        let snap = client.snapshot();
        assert_eq!(snap.state, SessionState::Error);
        assert!(tokens.load().is_none());

        // retry is allowed from error
        client.login(&creds("good")).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_login_is_rejected() {
        let gate = Arc::new(Notify::new());
        let client = client(FakeBackend::gated(gate.clone()), Arc::new(InMemoryTokenStore::new()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.login(&creds("good")).await }
        });
        wait_for_pending(&client).await;

        let second = client.login(&creds("good")).await;
        assert_eq!(second, Err(SessionError::Transition(TransitionError::AlreadyPending)));

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Ok(principal()));
    }

    #[tokio::test]
    async fn login_result_after_logout_is_discarded() {
        let gate = Arc::new(Notify::new());
        let tokens = Arc::new(InMemoryTokenStore::new());
        let client = client(FakeBackend::gated(gate.clone()), tokens.clone());

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.login(&creds("good")).await }
        });
        wait_for_pending(&client).await;

        client.logout();
        gate.notify_one();

        assert_eq!(pending.await.unwrap(), Err(SessionError::Discarded));
        assert_eq!(client.snapshot(), SessionSnapshot::default());
        assert!(tokens.load().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_backend_times_out_as_network_failure() {
        let backend = FakeBackend {
            gate: None,
            hang: true,
        };
        let client = client(backend, Arc::new(InMemoryTokenStore::new()));

        let err = client.login(&creds("good")).await.unwrap_err();
        assert!(matches!(err, SessionError::Auth(ref e) if e.code == AuthErrorCode::NetworkFailure));
        assert_eq!(client.snapshot().state, SessionState::Error);
    }

    #[tokio::test]
    async fn rehydrate_with_valid_token_authenticates() {
        let tokens = Arc::new(InMemoryTokenStore::with_token("token-1"));
        let client = client(FakeBackend::default(), tokens.clone());

        assert_eq!(client.rehydrate().await.unwrap(), Some(principal()));
        assert_eq!(client.snapshot().state, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn rehydrate_with_rejected_token_clears_it() {
        let tokens = Arc::new(InMemoryTokenStore::with_token("stale"));
        let client = client(FakeBackend::default(), tokens.clone());

        assert_eq!(client.rehydrate().await.unwrap(), None);
        let snap = client.snapshot();
        assert_eq!(snap.state, SessionState::Anonymous);
        assert_eq!(snap.last_error.map(|e| e.code), Some(AuthErrorCode::ExpiredToken));
        assert!(tokens.load().is_none());
    }

    #[tokio::test]
    async fn rehydrate_without_token_is_a_no_op() {
        let client = client(FakeBackend::default(), Arc::new(InMemoryTokenStore::new()));
        assert_eq!(client.rehydrate().await.unwrap(), None);
        assert_eq!(client.snapshot(), SessionSnapshot::default());
    }

    #[tokio::test]
    async fn refresh_rotates_token() {
        let tokens = Arc::new(InMemoryTokenStore::new());
        let client = client(FakeBackend::default(), tokens.clone());
        client.login(&creds("good")).await.unwrap();

        client.refresh().await.unwrap();
        assert_eq!(tokens.load().as_deref(), Some("token-2"));
        assert_eq!(client.snapshot().state, SessionState::Authenticated);

        // token-2 is not refreshable by the fake backend
        assert!(client.refresh().await.is_err());
        assert_eq!(client.snapshot().state, SessionState::Expired);
        assert!(tokens.load().is_none());
    }

    #[tokio::test]
    async fn invalidation_publishes_expired() {
        let tokens = Arc::new(InMemoryTokenStore::new());
        let client = client(FakeBackend::default(), tokens.clone());
        client.login(&creds("good")).await.unwrap();
        let mut rx = client.subscribe();

        client.invalidate_token().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().state, SessionState::Expired);
        assert!(tokens.load().is_none());

        assert!(client.invalidate_token().is_err());
    }
}
