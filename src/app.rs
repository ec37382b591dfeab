use axum::{
    Form, Router,
    extract::{Path as AxumPath, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::graph::{self, GraphOptions};
use crate::pages::{self, Action, LoginForm, MarksForm, SignUpForm, Transition};
use crate::report::{self, ChartKind};
use crate::session::{Page, Session, Sessions};
use crate::store::FsStore;

pub struct AppState {
    store: FsStore,
    sessions: Sessions,
}

const SESSION_COOKIE: &str = "session";

/// Inline messages carried across a redirect in the query string
#[derive(Debug, Default, Deserialize)]
struct Flash {
    notice: Option<String>,
    error: Option<String>,
}

pub async fn run(addr: &str, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Setup app state
    let state = Arc::new(AppState {
        store: FsStore::new(data_dir),
        sessions: Sessions::new(),
    });

    // Build router
    let app = Router::new()
        .route("/", get(index))
        .route("/login", get(serve_login_page).post(handle_login))
        .route("/signup", get(serve_signup_page).post(handle_signup))
        .route("/marks", get(serve_marks_page).post(handle_marks))
        .route("/report", get(serve_report_page))
        .route("/report/chart/:kind", get(serve_chart))
        .route("/signout", post(handle_signout))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve the request's session, creating one when the cookie is missing or
/// stale. The returned flag says whether a new cookie must be set.
fn current_session(state: &AppState, jar: &CookieJar) -> (String, Session, bool) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(session) = state.sessions.get(cookie.value()) {
            return (cookie.value().to_string(), session, false);
        }
    }

    let id = state.sessions.create();
    (id, Session::default(), true)
}

fn session_jar(jar: CookieJar, id: &str, is_new: bool) -> CookieJar {
    if is_new {
        jar.add(Cookie::new(SESSION_COOKIE, id.to_string()))
    } else {
        jar
    }
}

/// Redirect to the transition's page, with its message in the query string
fn redirect_to_session(t: &Transition) -> Redirect {
    let mut query = Vec::new();
    if let Some(notice) = &t.notice {
        query.push(format!("notice={}", urlencoding::encode(notice)));
    }
    if let Some(error) = &t.error {
        query.push(format!("error={}", urlencoding::encode(error)));
    }

    let path = t.session.page.path();
    if query.is_empty() {
        Redirect::to(path)
    } else {
        Redirect::to(&format!("{}?{}", path, query.join("&")))
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn flash_banner(flash: &Flash) -> String {
    let mut banner = String::new();
    if let Some(error) = &flash.error {
        banner.push_str(&format!(
            "<p class=\"flash error\">{}</p>",
            escape_html(error)
        ));
    }
    if let Some(notice) = &flash.notice {
        banner.push_str(&format!(
            "<p class=\"flash notice\">{}</p>",
            escape_html(notice)
        ));
    }
    banner
}

fn render(template: &str, flash: &Flash) -> String {
    template.replace("<!-- flash -->", &flash_banner(flash))
}

async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (id, session, is_new) = current_session(&state, &jar);
    (
        session_jar(jar, &id, is_new),
        Redirect::to(session.page.path()),
    )
}

async fn serve_login_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(flash): Query<Flash>,
) -> Response {
    let (id, session, is_new) = current_session(&state, &jar);
    let jar = session_jar(jar, &id, is_new);

    // Signed-in users have no login/signup navigation.
    if session.is_signed_in() {
        return (jar, Redirect::to(session.page.path())).into_response();
    }

    let t = pages::apply(&state.store, session, Action::ShowLogin);
    state.sessions.set(&id, t.session);

    let html = render(include_str!("./static/login.html"), &flash);
    (jar, Html(html)).into_response()
}

async fn serve_signup_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(flash): Query<Flash>,
) -> Response {
    let (id, session, is_new) = current_session(&state, &jar);
    let jar = session_jar(jar, &id, is_new);

    if session.is_signed_in() {
        return (jar, Redirect::to(session.page.path())).into_response();
    }

    let t = pages::apply(&state.store, session, Action::ShowSignUp);
    state.sessions.set(&id, t.session);

    let html = render(include_str!("./static/signup.html"), &flash);
    (jar, Html(html)).into_response()
}

async fn serve_marks_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(flash): Query<Flash>,
) -> Response {
    let (id, mut session, is_new) = current_session(&state, &jar);
    let jar = session_jar(jar, &id, is_new);

    let Some(username) = session.username.clone() else {
        return (jar, Redirect::to("/login?error=Please+log+in+first.")).into_response();
    };

    session.page = Page::Marks;
    state.sessions.set(&id, session);

    let html = render(include_str!("./static/marks.html"), &flash)
        .replace("{{username}}", &escape_html(&username));
    (jar, Html(html)).into_response()
}

const CHARTS_HTML: &str = r#"<section>
  <h2>Average Marks Bar Chart</h2>
  <img src="/report/chart/bar" alt="Average marks bar chart">
</section>
<section>
  <h2>Marks per Subject - Line Graph</h2>
  <img src="/report/chart/line" alt="Marks per subject line graph">
</section>
<section>
  <h2>Marks per Subject - Pie Chart</h2>
  <img src="/report/chart/pie" alt="Marks distribution pie chart">
</section>"#;

async fn serve_report_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(flash): Query<Flash>,
) -> Response {
    let (id, mut session, is_new) = current_session(&state, &jar);
    let jar = session_jar(jar, &id, is_new);

    let Some(username) = session.username.clone() else {
        return (jar, Redirect::to("/login?error=Please+log+in+first.")).into_response();
    };

    session.page = Page::Report;
    state.sessions.set(&id, session);

    // Without a marks table the page carries the error and nothing further.
    let (flash, charts) = match report::build_report(&state.store, &username) {
        Ok(_) => (flash, CHARTS_HTML),
        Err(e) => (
            Flash {
                notice: None,
                error: Some(e),
            },
            "",
        ),
    };

    let html = render(include_str!("./static/report.html"), &flash).replace("{{report}}", charts);
    (jar, Html(html)).into_response()
}

async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let (id, session, is_new) = current_session(&state, &jar);

    let t = pages::apply(&state.store, session, Action::LogIn(form));
    state.sessions.set(&id, t.session.clone());

    (session_jar(jar, &id, is_new), redirect_to_session(&t))
}

async fn handle_signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> impl IntoResponse {
    let (id, session, is_new) = current_session(&state, &jar);

    let t = pages::apply(&state.store, session, Action::SignUp(form));
    state.sessions.set(&id, t.session.clone());

    (session_jar(jar, &id, is_new), redirect_to_session(&t))
}

async fn handle_marks(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<MarksForm>,
) -> impl IntoResponse {
    let (id, session, is_new) = current_session(&state, &jar);

    let t = pages::apply(&state.store, session, Action::SubmitMarks(form));
    state.sessions.set(&id, t.session.clone());

    (session_jar(jar, &id, is_new), redirect_to_session(&t))
}

async fn handle_signout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    // Blank the cookie; the next request starts a fresh session on login.
    (
        jar.add(Cookie::new(SESSION_COOKIE, "")),
        Redirect::to("/login"),
    )
}

async fn serve_chart(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    AxumPath(kind): AxumPath<String>,
) -> Response {
    let (_, session, _) = current_session(&state, &jar);
    let Some(username) = session.username else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let Some(kind) = ChartKind::from_slug(&kind) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let report = match report::build_report(&state.store, &username) {
        Ok(report) => report,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    match graph::render_chart(&report.chart(kind), &GraphOptions::default()) {
        Ok(png) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/png")
            .body(axum::body::Body::from(png))
            .unwrap(),
        Err(e) => {
            warn!("failed to render {} chart for {:?}: {}", kind.slug(), username, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
