//! Client-side authentication session: a state machine over
//! `anonymous | pending | authenticated | error | expired`, and an async
//! client that drives it against an authentication backend.

pub mod client;
pub mod state;

pub use client::{
    AuthBackend, Credentials, InMemoryTokenStore, IssuedToken, SessionClient, SessionConfig, SessionError,
    TokenStore,
};
pub use state::{Attempt, Completion, PendingTicket, Session, SessionSnapshot, SessionState, TransitionError};
