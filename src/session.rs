use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Pages the application can be on
///
/// Navigation is a four-state machine: sign-up and login are reachable while
/// signed out, marks and report once a user is active. Every failed action
/// stays on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Login,
    SignUp,
    Marks,
    Report,
}

impl Page {
    /// URL path serving this page
    pub fn path(&self) -> &'static str {
        match self {
            Page::Login => "/login",
            Page::SignUp => "/signup",
            Page::Marks => "/marks",
            Page::Report => "/report",
        }
    }
}

/// Per-browser session data
///
/// Tracks which page is active and who, if anyone, is logged in. Sessions are
/// process-lifetime; nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Currently active page
    pub page: Page,

    /// Display name of the logged-in user, if any
    pub username: Option<String>,
}

impl Session {
    /// Whether a user is logged in
    pub fn is_signed_in(&self) -> bool {
        self.username.is_some()
    }

    /// Record a successful login and move to the marks page
    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
        self.page = Page::Marks;
    }

    /// Clear the active user and reset navigation to login
    pub fn sign_out(&mut self) {
        self.username = None;
        self.page = Page::Login;
    }
}

/// In-memory session registry
///
/// Maps browser cookie ids to their sessions. Lives in the application state
/// rather than a global, so handlers receive sessions explicitly and tests
/// can build registries of their own.
#[derive(Debug, Default)]
pub struct Sessions {
    inner: RwLock<HashMap<String, Session>>,
}

impl Sessions {
    pub fn new() -> Self {
        Sessions::default()
    }

    /// Create a fresh session and return its id
    ///
    /// # Returns
    /// * `String` - A unique session id, suitable for a cookie value
    pub fn create(&self) -> String {
        let session_id = Uuid::new_v4().to_string();

        let mut sessions = self.inner.write().unwrap();
        sessions.insert(session_id.clone(), Session::default());

        session_id
    }

    /// Look up the session for an id
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let sessions = self.inner.read().unwrap();
        sessions.get(session_id).cloned()
    }

    /// Replace the session stored under an id
    pub fn set(&self, session_id: &str, session: Session) {
        let mut sessions = self.inner.write().unwrap();
        sessions.insert(session_id.to_string(), session);
    }

    /// Drop the session for an id, if any
    pub fn remove(&self, session_id: &str) {
        let mut sessions = self.inner.write().unwrap();
        sessions.remove(session_id);
    }
}
