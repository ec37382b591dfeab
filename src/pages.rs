use crate::credentials::{self, UserRecord};
use crate::marks;
use crate::session::{Page, Session};
use crate::store::Store;
use chrono::NaiveDate;
use log::warn;
use serde::Deserialize;

/// Sign-up form data
///
/// Received from the sign-up page. The date of birth arrives as the
/// `YYYY-MM-DD` string a date input produces.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub phone: String,
    pub dob: String,
    pub email: String,
    pub password: String,
}

/// Login form data
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Marks entry form data, one bounded score per fixed subject
#[derive(Debug, Clone, Deserialize)]
pub struct MarksForm {
    pub english: u32,
    pub math: u32,
    pub science: u32,
}

impl MarksForm {
    /// Scores in fixed subject order
    pub fn scores(&self) -> [u32; 3] {
        [self.english, self.math, self.science]
    }
}

/// A user action, one per button press or navigation choice
#[derive(Debug, Clone)]
pub enum Action {
    /// Navigation: show the login page (signed-out sidebar choice)
    ShowLogin,
    /// Navigation: show the sign-up page (signed-out sidebar choice)
    ShowSignUp,
    SignUp(SignUpForm),
    LogIn(LoginForm),
    SubmitMarks(MarksForm),
    SignOut,
}

/// Result of applying one action: the next session plus the inline message
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Session,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Transition {
    fn to(session: Session) -> Self {
        Transition {
            session,
            notice: None,
            error: None,
        }
    }

    fn notice(session: Session, message: impl Into<String>) -> Self {
        Transition {
            session,
            notice: Some(message.into()),
            error: None,
        }
    }

    fn error(session: Session, message: impl Into<String>) -> Self {
        Transition {
            session,
            notice: None,
            error: Some(message.into()),
        }
    }
}

/// Apply one user action to a session
///
/// The single dispatch point of the application: reads form input, talks to
/// the stores, and returns the next session state together with the notice or
/// error to render inline. Failed actions leave the session unchanged.
pub fn apply(store: &dyn Store, session: Session, action: Action) -> Transition {
    match action {
        Action::ShowLogin => show(session, Page::Login),
        Action::ShowSignUp => show(session, Page::SignUp),
        Action::SignUp(form) => sign_up(store, session, form),
        Action::LogIn(form) => log_in(store, session, form),
        Action::SubmitMarks(form) => submit_marks(store, session, form),
        Action::SignOut => sign_out(session),
    }
}

/// Signed-out navigation between the login and sign-up pages
fn show(mut session: Session, page: Page) -> Transition {
    if !session.is_signed_in() {
        session.page = page;
    }
    Transition::to(session)
}

fn sign_up(store: &dyn Store, session: Session, form: SignUpForm) -> Transition {
    if form.name.is_empty()
        || form.phone.is_empty()
        || form.dob.is_empty()
        || form.email.is_empty()
        || form.password.is_empty()
    {
        return Transition::error(session, "Please fill in all the fields.");
    }

    // A date input posts YYYY-MM-DD or an empty string.
    let dob = match NaiveDate::parse_from_str(&form.dob, "%Y-%m-%d") {
        Ok(dob) => dob,
        Err(_) => return Transition::error(session, "Please enter a valid date of birth."),
    };

    if credentials::credentials_exist(store, &form.email) {
        return Transition::error(
            session,
            "A user with this email already exists. Please log in.",
        );
    }

    let record = UserRecord {
        name: form.name,
        email: form.email,
        password: form.password,
        phone: form.phone,
        dob,
    };

    match credentials::save_credentials(store, &record) {
        Ok(()) => {
            let mut session = session;
            session.page = Page::Login;
            Transition::notice(session, "Sign up successful! Redirecting to login...")
        }
        Err(e) => {
            warn!("sign-up failed to persist credentials: {}", e);
            Transition::error(session, e)
        }
    }
}

fn log_in(store: &dyn Store, session: Session, form: LoginForm) -> Transition {
    let key = credentials::identity_key(&form.email);

    let record = match credentials::load_credentials(store, key) {
        Ok(record) => record,
        Err(e) => {
            warn!("login failed to load credentials for {:?}: {}", key, e);
            return Transition::error(session, e);
        }
    };

    // Exact comparison, case-sensitive, no trimming. A missing user and a
    // wrong password are indistinguishable to the caller.
    match record {
        Some(record) if record.password == form.password => {
            let mut session = session;
            session.sign_in(record.name);
            Transition::notice(session, "Login successful! Redirecting to marks page...")
        }
        _ => Transition::error(session, "Invalid email or password."),
    }
}

fn submit_marks(store: &dyn Store, session: Session, form: MarksForm) -> Transition {
    let username = match &session.username {
        Some(username) => username.clone(),
        None => return Transition::error(session, "Please log in first."),
    };

    match marks::save_marks(store, &username, form.scores()) {
        Ok(()) => {
            let mut session = session;
            session.page = Page::Report;
            Transition::notice(
                session,
                "Marks saved successfully! Redirecting to report page...",
            )
        }
        Err(e) => {
            warn!("marks submission failed for {:?}: {}", username, e);
            Transition::error(session, e)
        }
    }
}

fn sign_out(mut session: Session) -> Transition {
    session.sign_out();
    Transition::to(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsStore;
    use tempfile::TempDir;

    fn signup_form() -> SignUpForm {
        SignUpForm {
            name: "Alice".to_string(),
            phone: "5550001".to_string(),
            dob: "2000-01-01".to_string(),
            email: "alice@example.com".to_string(),
            password: "s3cret".to_string(),
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn sign_up_persists_and_lands_on_login() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let t = apply(&store, Session::default(), Action::SignUp(signup_form()));

        assert_eq!(t.session.page, Page::Login);
        assert!(t.error.is_none());
        assert!(t.notice.is_some());

        let record = credentials::load_credentials(&store, "alice")
            .unwrap()
            .unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.password, "s3cret");
    }

    #[test]
    fn sign_up_with_missing_field_stays_put_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let mut form = signup_form();
        form.phone = String::new();

        let session = Session {
            page: Page::SignUp,
            username: None,
        };
        let t = apply(&store, session.clone(), Action::SignUp(form));

        assert_eq!(t.session, session);
        assert_eq!(t.error.as_deref(), Some("Please fill in all the fields."));
        assert!(!credentials::credentials_exist(&store, "alice@example.com"));
    }

    #[test]
    fn sign_up_conflict_leaves_existing_record_untouched() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        apply(&store, Session::default(), Action::SignUp(signup_form()));
        let before = store.get("alice/credentials.json").unwrap().unwrap();

        // Same identity key, different everything else.
        let mut form = signup_form();
        form.name = "Impostor".to_string();
        form.email = "alice@elsewhere.org".to_string();
        form.password = "other".to_string();

        let session = Session {
            page: Page::SignUp,
            username: None,
        };
        let t = apply(&store, session.clone(), Action::SignUp(form));

        assert_eq!(t.session, session);
        assert!(t.error.unwrap().contains("already exists"));
        assert_eq!(store.get("alice/credentials.json").unwrap().unwrap(), before);
    }

    #[test]
    fn login_succeeds_only_on_exact_password() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        apply(&store, Session::default(), Action::SignUp(signup_form()));

        let t = apply(
            &store,
            Session::default(),
            Action::LogIn(login_form("alice@example.com", "s3cret")),
        );
        assert_eq!(t.session.page, Page::Marks);
        assert_eq!(t.session.username.as_deref(), Some("Alice"));

        for wrong in ["S3cret", " s3cret", "s3cret ", ""] {
            let t = apply(
                &store,
                Session::default(),
                Action::LogIn(login_form("alice@example.com", wrong)),
            );
            assert_eq!(t.session, Session::default());
            assert_eq!(t.error.as_deref(), Some("Invalid email or password."));
        }
    }

    #[test]
    fn login_unknown_user_gets_the_same_generic_error() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let t = apply(
            &store,
            Session::default(),
            Action::LogIn(login_form("ghost@example.com", "whatever")),
        );

        assert_eq!(t.session, Session::default());
        assert_eq!(t.error.as_deref(), Some("Invalid email or password."));
    }

    #[test]
    fn marks_submission_requires_a_user() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let form = MarksForm {
            english: 80,
            math: 60,
            science: 100,
        };
        let t = apply(&store, Session::default(), Action::SubmitMarks(form));

        assert_eq!(t.session, Session::default());
        assert!(t.error.is_some());
    }

    #[test]
    fn marks_submission_persists_and_lands_on_report() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let mut session = Session::default();
        session.sign_in("Alice");

        let form = MarksForm {
            english: 80,
            math: 60,
            science: 100,
        };
        let t = apply(&store, session, Action::SubmitMarks(form));

        assert_eq!(t.session.page, Page::Report);
        let rows = marks::load_marks(&store, "Alice").unwrap().unwrap();
        assert_eq!(rows.iter().map(|r| r.score).collect::<Vec<_>>(), [80, 60, 100]);
    }

    #[test]
    fn sign_out_clears_user_and_resets_navigation() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        for page in [Page::Login, Page::SignUp, Page::Marks, Page::Report] {
            let session = Session {
                page,
                username: Some("Alice".to_string()),
            };
            let t = apply(&store, session, Action::SignOut);

            assert_eq!(t.session, Session::default());
        }
    }

    #[test]
    fn navigation_actions_only_apply_while_signed_out() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let t = apply(&store, Session::default(), Action::ShowSignUp);
        assert_eq!(t.session.page, Page::SignUp);

        let t = apply(&store, t.session, Action::ShowLogin);
        assert_eq!(t.session.page, Page::Login);

        let mut signed_in = Session::default();
        signed_in.sign_in("Alice");
        let t = apply(&store, signed_in.clone(), Action::ShowSignUp);
        assert_eq!(t.session, signed_in);
    }

    #[test]
    fn full_walk_through_the_state_machine() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        // login -> signup (navigation)
        let t = apply(&store, Session::default(), Action::ShowSignUp);
        assert_eq!(t.session.page, Page::SignUp);

        // signup -> login (successful sign-up)
        let t = apply(&store, t.session, Action::SignUp(signup_form()));
        assert_eq!(t.session.page, Page::Login);

        // login -> marks (successful login)
        let t = apply(
            &store,
            t.session,
            Action::LogIn(login_form("alice@example.com", "s3cret")),
        );
        assert_eq!(t.session.page, Page::Marks);

        // marks -> report (successful submission)
        let form = MarksForm {
            english: 80,
            math: 60,
            science: 100,
        };
        let t = apply(&store, t.session, Action::SubmitMarks(form));
        assert_eq!(t.session.page, Page::Report);

        // any -> login (sign-out)
        let t = apply(&store, t.session, Action::SignOut);
        assert_eq!(t.session, Session::default());
    }
}
