//! Process-wide session holder.
//!
//! One writer, many readers: the holder owns a `watch` channel carrying the
//! current [`SessionState`], every view reads through a receiver or a
//! borrowed snapshot, and nothing else may mutate the session. The holder is
//! also the single owner of post-authentication navigation, via
//! [`AuthChange::destination`].

use std::sync::Arc;
use tokio::sync::watch;

use crate::models::session::{AuthChange, Session, SessionState};

pub struct SessionHolder {
    tx: watch::Sender<SessionState>,
}

impl SessionHolder {
    /// New holder in the loading state: no session, initial check pending.
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = watch::channel(SessionState::default());
        Arc::new(Self { tx })
    }

    /// Resolve the initial session check.
    ///
    /// Nothing is persisted locally, so a fresh process passes `None` here;
    /// the call exists to clear the loading flag exactly once at startup.
    pub fn resolve_initial(&self, existing: Option<Session>) {
        self.tx.send_modify(|state| {
            state.session = existing;
            state.loading = false;
        });
    }

    /// Apply an auth change, overwriting the held session, and report the
    /// destination the caller should navigate to.
    pub fn apply(&self, change: AuthChange) -> &'static str {
        let destination = change.destination();
        self.tx.send_modify(|state| {
            state.loading = false;
            state.session = match change {
                AuthChange::SignedIn(session) => Some(session),
                AuthChange::SignedOut => None,
            };
        });
        destination
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Receiver for observing changes; dropped on teardown, which ends the
    /// subscription.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
