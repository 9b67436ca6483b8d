use std::sync::{mpsc, Arc, Mutex};

use super::session::Session;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Nothing has been dispatched yet.
    #[default]
    Unset,
    Active(Session),
    /// Fixed marker left behind by a logout. Distinct from `Unset`.
    LoggedOut,
}

impl SessionState {
    pub fn user(&self) -> Option<&Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::Unset | Self::LoggedOut => None,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Unset => "SESSION_UNSET",
            Self::Active(_) => "SESSION_ACTIVE",
            Self::LoggedOut => "SESSION_LOGGED_OUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Login(Session),
    Logout,
    Update(Session),
}

impl SessionAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Update(_) => "UPDATE",
        }
    }
}

/// Pure transition function for the signed-in user.
///
/// `Update` replaces the whole record with the payload; fields absent from
/// the payload are dropped, not merged.
pub fn reduce(state: &mut SessionState, action: SessionAction) {
    *state = match action {
        SessionAction::Login(session) | SessionAction::Update(session) => {
            SessionState::Active(session)
        }
        SessionAction::Logout => SessionState::LoggedOut,
    };
}

/// Shared handle over the session reducer. The only writer of session state.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionStoreState>>,
}

#[derive(Debug, Default)]
struct SessionStoreState {
    state: SessionState,
    subscribers: Vec<mpsc::Sender<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: SessionAction) {
        let name = action.name();
        if let Ok(mut inner) = self.inner.lock() {
            reduce(&mut inner.state, action);
            let payload = inner.state.clone();
            tracing::debug!(action = name, state = payload.as_label(), "session dispatched");
            inner
                .subscribers
                .retain(|sub| sub.send(payload.clone()).is_ok());
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner
            .lock()
            .map(|inner| inner.state.clone())
            .unwrap_or_default()
    }

    pub fn current_user(&self) -> Option<Session> {
        self.snapshot().user().cloned()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn subscribe(&self) -> mpsc::Receiver<SessionState> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            let _ = tx.send(inner.state.clone());
            inner.subscribers.push(tx);
        }
        rx
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;
    use crate::{domain::session::Role, test_support::sample_session};

    fn with_extra(session: &mut Session, value: Value) {
        let Value::Object(map) = value else {
            panic!("extra fixture must be an object");
        };
        session.extra = map;
    }

    #[test]
    fn login_payload_round_trips_unchanged() {
        let session = sample_session("7", Role::Trainer);

        let mut state = SessionState::Unset;
        reduce(&mut state, SessionAction::Login(session.clone()));

        assert_eq!(state, SessionState::Active(session));
    }

    #[test]
    fn logout_yields_marker_not_unset() {
        let mut state = SessionState::Active(sample_session("7", Role::Client));
        reduce(&mut state, SessionAction::Logout);

        assert_eq!(state, SessionState::LoggedOut);
        assert_ne!(state, SessionState::Unset);
        assert!(state.user().is_none());
    }

    #[test]
    fn update_replaces_shallow_object_without_deep_merge() {
        let mut current = sample_session("7", Role::Client);
        with_extra(&mut current, json!({ "a": 1, "b": 2 }));
        let mut payload = sample_session("7", Role::Client);
        with_extra(&mut payload, json!({ "b": 3, "c": 4 }));

        let mut state = SessionState::Active(current);
        reduce(&mut state, SessionAction::Update(payload.clone()));

        let user = state.user().expect("state should hold a user");
        let expected: Map<String, Value> = json!({ "b": 3, "c": 4 })
            .as_object()
            .cloned()
            .expect("object literal");
        assert_eq!(user.extra, expected);
        assert!(!user.extra.contains_key("a"));
        assert_eq!(user, &payload);
    }

    #[test]
    fn store_emits_initial_snapshot_and_updates_to_subscribers() {
        let store = SessionStore::new();
        let rx = store.subscribe();
        assert_eq!(rx.recv().expect("initial snapshot"), SessionState::Unset);

        store.dispatch(SessionAction::Login(sample_session("1", Role::Trainer)));
        store.dispatch(SessionAction::Logout);

        assert_eq!(rx.recv().expect("login").as_label(), "SESSION_ACTIVE");
        assert_eq!(rx.recv().expect("logout"), SessionState::LoggedOut);
        assert_eq!(store.snapshot(), SessionState::LoggedOut);
        assert!(store.current_user().is_none());
    }
}
