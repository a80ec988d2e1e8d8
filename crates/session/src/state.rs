//! Client-side session lifecycle.
//!
//! [`Session`] is a plain value: every transition is a method, and every
//! asynchronous step is split into a `start_*` call that hands out a
//! [`PendingTicket`] and a [`Session::complete`] call that presents it back.
//! A ticket is only honoured while the session's generation is unchanged, so
//! a result that arrives after `logout` (or after a newer attempt) is dropped
//! instead of resurrecting a principal.

use serde::Serialize;
use thiserror::Error;

use fleetgate_auth::{AuthError, Principal};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Anonymous,
    Pending,
    Authenticated,
    Error,
    Expired,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Pending => "pending",
            SessionState::Authenticated => "authenticated",
            SessionState::Error => "error",
            SessionState::Expired => "expired",
        }
    }
}

impl core::fmt::Display for SessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an in-flight ticket was issued for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Attempt {
    Login,
    Rehydrate,
    Refresh,
}

/// Proof that an asynchronous step was started at a given generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PendingTicket {
    generation: u64,
    attempt: Attempt,
}

impl PendingTicket {
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("an authentication attempt is already in flight")]
    AlreadyPending,

    #[error("cannot {event} while {from}")]
    InvalidTransition { from: SessionState, event: &'static str },
}

/// Outcome of presenting a ticket.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied(SessionState),
    /// The ticket was stale; the session is unchanged.
    Discarded,
}

/// Read-only copy of the session, published to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<AuthError>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    principal: Option<Principal>,
    last_error: Option<AuthError>,
    generation: u64,
    refreshing: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn last_error(&self) -> Option<&AuthError> {
        self.last_error.as_ref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            principal: self.principal.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// `anonymous | error -> pending`.
    pub fn start_login(&mut self) -> Result<PendingTicket, TransitionError> {
        match self.state {
            SessionState::Anonymous | SessionState::Error => Ok(self.enter_pending(Attempt::Login)),
            SessionState::Pending => Err(TransitionError::AlreadyPending),
            from => Err(TransitionError::InvalidTransition { from, event: "start login" }),
        }
    }

    /// `anonymous -> pending`, validating a stored token at startup.
    pub fn start_rehydrate(&mut self) -> Result<PendingTicket, TransitionError> {
        match self.state {
            SessionState::Anonymous => Ok(self.enter_pending(Attempt::Rehydrate)),
            SessionState::Pending => Err(TransitionError::AlreadyPending),
            from => Err(TransitionError::InvalidTransition { from, event: "rehydrate" }),
        }
    }

    /// Start a token refresh. The session stays `authenticated` meanwhile.
    pub fn begin_refresh(&mut self) -> Result<PendingTicket, TransitionError> {
        match self.state {
            SessionState::Authenticated if self.refreshing => Err(TransitionError::AlreadyPending),
            SessionState::Authenticated => {
                self.refreshing = true;
                Ok(self.issue(Attempt::Refresh))
            }
            SessionState::Pending => Err(TransitionError::AlreadyPending),
            from => Err(TransitionError::InvalidTransition { from, event: "refresh" }),
        }
    }

    /// Apply the result of the step `ticket` was issued for.
    pub fn complete(&mut self, ticket: PendingTicket, result: Result<Principal, AuthError>) -> Completion {
        if ticket.generation != self.generation {
            tracing::info!(attempt = ?ticket.attempt, "discarding stale session result");
            return Completion::Discarded;
        }

        match (ticket.attempt, self.state) {
            (Attempt::Login, SessionState::Pending) => match result {
                Ok(principal) => self.authenticate(principal),
                Err(err) => {
                    self.state = SessionState::Error;
                    self.principal = None;
                    self.last_error = Some(err);
                }
            },
            (Attempt::Rehydrate, SessionState::Pending) => match result {
                Ok(principal) => self.authenticate(principal),
                Err(err) => {
                    self.state = SessionState::Anonymous;
                    self.principal = None;
                    self.last_error = Some(err);
                }
            },
            (Attempt::Refresh, SessionState::Authenticated) if self.refreshing => {
                self.refreshing = false;
                match result {
                    Ok(principal) if self.same_subject(&principal) => {
                        self.principal = Some(principal);
                        self.last_error = None;
                    }
                    Ok(_) => {
                        self.expire(AuthError::invalid_credentials("Refreshed token belongs to another subject"));
                    }
                    Err(err) => self.expire(err),
                }
            }
            _ => return Completion::Discarded,
        }

        self.generation += 1;
        Completion::Applied(self.state)
    }

    /// `authenticated -> expired`.
    pub fn token_invalidated(&mut self) -> Result<(), TransitionError> {
        match self.state {
            SessionState::Authenticated => {
                self.expire(AuthError::expired_token());
                self.generation += 1;
                Ok(())
            }
            from => Err(TransitionError::InvalidTransition { from, event: "invalidate token" }),
        }
    }

    /// Any state `-> anonymous`. In-flight tickets become stale.
    pub fn logout(&mut self) {
        self.state = SessionState::Anonymous;
        self.principal = None;
        self.last_error = None;
        self.refreshing = false;
        self.generation += 1;
    }

    fn enter_pending(&mut self, attempt: Attempt) -> PendingTicket {
        self.state = SessionState::Pending;
        self.principal = None;
        self.last_error = None;
        self.issue(attempt)
    }

    fn issue(&mut self, attempt: Attempt) -> PendingTicket {
        self.generation += 1;
        PendingTicket {
            generation: self.generation,
            attempt,
        }
    }

    fn authenticate(&mut self, principal: Principal) {
        self.state = SessionState::Authenticated;
        self.principal = Some(principal);
        self.last_error = None;
    }

    fn expire(&mut self, err: AuthError) {
        self.state = SessionState::Expired;
        self.principal = None;
        self.refreshing = false;
        self.last_error = Some(err);
    }

    fn same_subject(&self, principal: &Principal) -> bool {
        self.principal
            .as_ref()
            .is_some_and(|current| current.subject_id() == principal.subject_id())
    }
}

#[cfg(test)]
mod tests {
    use fleetgate_auth::{AuthErrorCode, Role};

    use super::*;

    fn manager() -> Principal {
        Principal::scoped("user-7", Role::Manager, "co-1")
    }

    fn logged_in() -> Session {
        let mut s = Session::new();
        let t = s.start_login().unwrap();
        assert_eq!(s.complete(t, Ok(manager())), Completion::Applied(SessionState::Authenticated));
        s
    }

    #[test]
    fn login_success_authenticates() {
        let s = logged_in();
        assert_eq!(s.state(), SessionState::Authenticated);
        assert_eq!(s.principal(), Some(&manager()));
        assert!(s.last_error().is_none());
    }

    #[test]
    fn login_failure_then_retry() {
        let mut s = Session::new();
        let t = s.start_login().unwrap();
        s.complete(t, Err(AuthError::invalid_credentials("bad password").with_field("password")));
        assert_eq!(s.state(), SessionState::Error);
        assert_eq!(s.last_error().map(|e| e.code), Some(AuthErrorCode::InvalidCredentials));

        let retry = s.start_login().unwrap();
        assert_eq!(s.state(), SessionState::Pending);
        assert!(s.last_error().is_none());
        s.complete(retry, Ok(manager()));
        assert_eq!(s.state(), SessionState::Authenticated);
    }

    #[test]
    fn second_login_while_pending_is_rejected() {
        let mut s = Session::new();
        let _t = s.start_login().unwrap();
        assert_eq!(s.start_login(), Err(TransitionError::AlreadyPending));
        assert_eq!(s.start_rehydrate(), Err(TransitionError::AlreadyPending));
    }

    #[test]
    fn no_login_from_authenticated_or_expired() {
        let mut s = logged_in();
        assert!(matches!(
            s.start_login(),
            Err(TransitionError::InvalidTransition { from: SessionState::Authenticated, .. })
        ));

        s.token_invalidated().unwrap();
        assert!(matches!(
            s.start_login(),
            Err(TransitionError::InvalidTransition { from: SessionState::Expired, .. })
        ));

        s.logout();
        assert!(s.start_login().is_ok());
    }

    #[test]
    fn result_after_logout_is_discarded() {
        let mut s = Session::new();
        let t = s.start_login().unwrap();
        s.logout();
        assert_eq!(s.complete(t, Ok(manager())), Completion::Discarded);
        assert_eq!(s.state(), SessionState::Anonymous);
        assert!(s.principal().is_none());
    }

    #[test]
    fn stale_ticket_from_earlier_attempt_is_discarded() {
        let mut s = Session::new();
        let first = s.start_login().unwrap();
        s.logout();
        let second = s.start_login().unwrap();

        assert_eq!(s.complete(first, Ok(Principal::admin("someone-else"))), Completion::Discarded);
        assert_eq!(s.state(), SessionState::Pending);
        assert_eq!(s.complete(second, Ok(manager())), Completion::Applied(SessionState::Authenticated));
        assert_eq!(s.principal(), Some(&manager()));
    }

    #[test]
    fn ticket_is_single_use() {
        let mut s = Session::new();
        let t = s.start_login().unwrap();
        s.complete(t, Ok(manager()));
        assert_eq!(s.complete(t, Err(AuthError::expired_token())), Completion::Discarded);
        assert_eq!(s.state(), SessionState::Authenticated);
    }

    #[test]
    fn rehydrate_failure_returns_to_anonymous() {
        let mut s = Session::new();
        let t = s.start_rehydrate().unwrap();
        s.complete(t, Err(AuthError::expired_token()));
        assert_eq!(s.state(), SessionState::Anonymous);
        assert_eq!(s.last_error().map(|e| e.code), Some(AuthErrorCode::ExpiredToken));
    }

    #[test]
    fn rehydrate_only_from_anonymous() {
        let mut s = logged_in();
        assert!(s.start_rehydrate().is_err());
    }

    #[test]
    fn token_invalidation_expires_session() {
        let mut s = logged_in();
        s.token_invalidated().unwrap();
        assert_eq!(s.state(), SessionState::Expired);
        assert!(s.principal().is_none());
        assert_eq!(s.last_error().map(|e| e.code), Some(AuthErrorCode::ExpiredToken));

        assert!(s.token_invalidated().is_err());
    }

    #[test]
    fn logout_from_every_state() {
        for setup in [
            Session::new(),
            logged_in(),
            {
                let mut s = logged_in();
                s.token_invalidated().unwrap();
                s
            },
        ] {
            let mut s = setup;
            s.logout();
            assert_eq!(s.snapshot(), SessionSnapshot::default());
        }
    }

    #[test]
    fn refresh_keeps_session_authenticated() {
        let mut s = logged_in();
        let t = s.begin_refresh().unwrap();
        assert_eq!(s.state(), SessionState::Authenticated);
        assert_eq!(s.begin_refresh(), Err(TransitionError::AlreadyPending));

        assert_eq!(s.complete(t, Ok(manager())), Completion::Applied(SessionState::Authenticated));
        assert!(!s.is_refreshing());
    }

    #[test]
    fn failed_refresh_expires_session() {
        let mut s = logged_in();
        let t = s.begin_refresh().unwrap();
        s.complete(t, Err(AuthError::expired_token()));
        assert_eq!(s.state(), SessionState::Expired);
    }

    #[test]
    fn refresh_for_another_subject_is_rejected() {
        let mut s = logged_in();
        let t = s.begin_refresh().unwrap();
        s.complete(t, Ok(Principal::admin("intruder")));
        assert_eq!(s.state(), SessionState::Expired);
        assert!(s.principal().is_none());
    }

    #[test]
    fn refresh_result_after_logout_is_discarded() {
        let mut s = logged_in();
        let t = s.begin_refresh().unwrap();
        s.logout();
        assert_eq!(s.complete(t, Ok(manager())), Completion::Discarded);
        assert_eq!(s.state(), SessionState::Anonymous);
    }
}
