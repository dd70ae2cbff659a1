// Copyright (C) 2025 Kevin Exton
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Registration;
use crate::flow::{FlowController, GenerateOutcome, LoginOutcome, RegisterOutcome, ResetOutcome, Tab};
use crate::session::Session;
use crate::trip_service::TripPlan;

/// Idle sessions older than this are dropped; the next request with their
/// cookie starts over as Anonymous.
const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// A retained session and the time of its last request.
pub struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

/// Shared application state. Sessions are process-local, keyed per client
/// by the `sid` cookie; they do not survive a restart. Only sessions that
/// carry state are retained, and idle entries are swept past
/// [`SESSION_TTL`], so cookie-less traffic cannot grow the map.
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<FlowController>,
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    pub fn new(flow: Arc<FlowController>) -> Self {
        Self { flow, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("account store failure: {0}")]
    Account(#[from] AccountError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<p>Internal server error</p>".to_string()),
        )
            .into_response()
    }
}

pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/reset/open", post(reset_open))
        .route("/reset/close", post(reset_close))
        .route("/reset", post(reset_confirm))
        .route("/logout", post(logout))
        .route("/generate", post(generate))
        .with_state(state)
}

// --- Session cookie plumbing ---

fn cookie_session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|part| part.trim().strip_prefix("sid="))
        .and_then(|v| Uuid::parse_str(v).ok())
}

async fn load_session(
    sessions: &RwLock<HashMap<Uuid, SessionEntry>>,
    headers: &HeaderMap,
) -> (Uuid, Session) {
    if let Some(id) = cookie_session_id(headers) {
        if let Some(entry) = sessions.read().await.get(&id) {
            if entry.last_seen.elapsed() < SESSION_TTL {
                return (id, entry.session.clone());
            }
        }
    }
    (Uuid::new_v4(), Session::new())
}

/// Write a session back. An empty session is dropped rather than stored
/// (logout evicts its entry this way), and expired entries are swept on
/// every write, so the map is bounded by the number of live sessions.
async fn store_session(
    sessions: &RwLock<HashMap<Uuid, SessionEntry>>,
    id: Uuid,
    session: Session,
) {
    let mut sessions = sessions.write().await;
    sessions.retain(|_, entry| entry.last_seen.elapsed() < SESSION_TTL);
    if session.is_empty() {
        sessions.remove(&id);
    } else {
        sessions.insert(id, SessionEntry { session, last_seen: Instant::now() });
    }
}

/// Wrap a rendered page with the session cookie.
fn page(id: Uuid, body: String) -> Response {
    (
        [(header::SET_COOKIE, format!("sid={id}; Path=/; HttpOnly"))],
        Html(body),
    )
        .into_response()
}

// --- Request payloads ---

#[derive(Deserialize)]
struct PageQuery {
    tab: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    identifier: String,
    password: String,
}

#[derive(Deserialize)]
struct RegisterForm {
    firstname: String,
    lastname: String,
    username: String,
    email: String,
    mobile: String,
    password: String,
}

#[derive(Deserialize)]
struct ResetForm {
    identifier: String,
    new_password: String,
    confirm_password: String,
}

#[derive(Deserialize)]
struct GenerateForm {
    city: String,
    interests: String,
}

// --- Handlers ---

async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let (id, mut session) = load_session(&state.sessions, &headers).await;
    let body = if session.logged_in {
        planner_page(&session.username, None, &[])
    } else {
        let tab = Tab::from_query(query.tab.as_deref());
        let mut notices = Vec::new();
        if session.take_login_failed() {
            notices.push(Notice::error("Invalid credentials. Please try again."));
        }
        anon_page(tab, session.show_reset_panel, &notices)
    };
    store_session(&state.sessions, id, session).await;
    page(id, body)
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, ServerError> {
    let (id, mut session) = load_session(&state.sessions, &headers).await;
    let body = match state.flow.login(&mut session, &form.identifier, &form.password)? {
        LoginOutcome::LoggedIn { firstname } => {
            let welcome = Notice::success(format!("Welcome {firstname}!"));
            planner_page(&session.username, None, &[welcome])
        }
        LoginOutcome::InvalidCredentials => {
            let mut notices = Vec::new();
            if session.take_login_failed() {
                notices.push(Notice::error("Invalid credentials. Please try again."));
            }
            anon_page(Tab::Login, session.show_reset_panel, &notices)
        }
    };
    store_session(&state.sessions, id, session).await;
    Ok(page(id, body))
}

async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ServerError> {
    let (id, session) = load_session(&state.sessions, &headers).await;
    let reg = Registration {
        firstname: form.firstname,
        lastname: form.lastname,
        username: form.username,
        email: form.email,
        mobile: form.mobile,
        password: form.password,
    };
    let body = match state.flow.register(&reg)? {
        RegisterOutcome::Created => {
            // Switch to the login tab; registration never auto-authenticates.
            let done = Notice::success("Registration successful! You can now log in.");
            anon_page(Tab::Login, session.show_reset_panel, &[done])
        }
        RegisterOutcome::Duplicate => {
            let dup = Notice::error("Username or Email already exists.");
            anon_page(Tab::Register, session.show_reset_panel, &[dup])
        }
        RegisterOutcome::Invalid { bad_phone, bad_password } => {
            let mut notices = Vec::new();
            if bad_phone {
                notices.push(Notice::error("Enter a valid phone number."));
            }
            if bad_password {
                notices.push(Notice::error("Password doesn't meet the required criteria."));
            }
            anon_page(Tab::Register, session.show_reset_panel, &notices)
        }
    };
    store_session(&state.sessions, id, session).await;
    Ok(page(id, body))
}

async fn reset_open(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, mut session) = load_session(&state.sessions, &headers).await;
    state.flow.show_reset_panel(&mut session, true);
    let body = anon_page(Tab::Login, session.show_reset_panel, &[]);
    store_session(&state.sessions, id, session).await;
    page(id, body)
}

async fn reset_close(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, mut session) = load_session(&state.sessions, &headers).await;
    state.flow.show_reset_panel(&mut session, false);
    let body = anon_page(Tab::Login, session.show_reset_panel, &[]);
    store_session(&state.sessions, id, session).await;
    page(id, body)
}

async fn reset_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ResetForm>,
) -> Result<Response, ServerError> {
    let (id, mut session) = load_session(&state.sessions, &headers).await;
    let outcome = state.flow.confirm_reset(
        &mut session,
        &form.identifier,
        &form.new_password,
        &form.confirm_password,
    )?;
    let notice = match outcome {
        ResetOutcome::Updated => Notice::success("Password updated successfully!"),
        ResetOutcome::MissingIdentifier => Notice::error("Please enter your username/email."),
        ResetOutcome::WeakPassword => {
            Notice::error("Password doesn't meet the required criteria.")
        }
        ResetOutcome::PasswordMismatch => Notice::error("Passwords do not match."),
        ResetOutcome::UnknownIdentifier => Notice::error("Username/Email not found."),
    };
    let body = anon_page(Tab::Login, session.show_reset_panel, &[notice]);
    store_session(&state.sessions, id, session).await;
    Ok(page(id, body))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, mut session) = load_session(&state.sessions, &headers).await;
    state.flow.logout(&mut session);
    let body = anon_page(Tab::Login, false, &[]);
    store_session(&state.sessions, id, session).await;
    page(id, body)
}

async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Response {
    let (id, session) = load_session(&state.sessions, &headers).await;
    let body = match state.flow.generate(&session, &form.city, &form.interests).await {
        GenerateOutcome::Plan(plan) => planner_page(&session.username, Some(&plan), &[]),
        GenerateOutcome::NotAuthenticated => {
            anon_page(Tab::Login, false, &[Notice::error("Please log in first.")])
        }
        GenerateOutcome::MissingInput => {
            let notice = Notice::error("Please enter a city and at least one interest.");
            planner_page(&session.username, None, &[notice])
        }
        GenerateOutcome::ServiceUnavailable => {
            let notice =
                Notice::error("The itinerary service is unavailable right now. Please try again.");
            planner_page(&session.username, None, &[notice])
        }
    };
    store_session(&state.sessions, id, session).await;
    page(id, body)
}

// --- Rendering ---

enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Notice::Success(text.into())
    }

    fn error(text: impl Into<String>) -> Self {
        Notice::Error(text.into())
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn notices_html(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| match n {
            Notice::Success(text) => {
                format!("<p class=\"success\">{}</p>\n", escape_html(text))
            }
            Notice::Error(text) => format!("<p class=\"error\">{}</p>\n", escape_html(text)),
        })
        .collect()
}

const PASSWORD_HINT: &str = "<ul class=\"hint\">\
    <li>Minimum 8 characters</li>\
    <li>At least one uppercase letter (A-Z)</li>\
    <li>At least one lowercase letter (a-z)</li>\
    <li>At least one digit (0-9)</li>\
    <li>At least one special character (!@#$%^&amp;*(),.?&quot;:{}|&lt;&gt;)</li>\
    </ul>";

/// Login/register page with optional reset panel (Anonymous state).
fn anon_page(tab: Tab, show_reset_panel: bool, notices: &[Notice]) -> String {
    let mut body = String::from("<h1>SmartSafar</h1>\n");
    body.push_str(
        "<p><a href=\"/?tab=login\">Login</a> | <a href=\"/?tab=register\">Register</a></p>\n",
    );
    body.push_str(&notices_html(notices));

    match tab {
        Tab::Login => {
            body.push_str(
                "<h2>User Login</h2>\n\
                 <form method=\"post\" action=\"/login\">\n\
                 <input name=\"identifier\" placeholder=\"Username/Email\">\n\
                 <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
                 <button type=\"submit\">Login</button>\n\
                 </form>\n\
                 <form method=\"post\" action=\"/reset/open\">\n\
                 <button type=\"submit\">Forgot Password?</button>\n\
                 </form>\n",
            );
            if show_reset_panel {
                body.push_str("<h3>Reset Your Password</h3>\n");
                body.push_str(PASSWORD_HINT);
                body.push_str(
                    "<form method=\"post\" action=\"/reset\">\n\
                     <input name=\"identifier\" placeholder=\"Username/Email\">\n\
                     <input name=\"new_password\" type=\"password\" placeholder=\"New Password\">\n\
                     <input name=\"confirm_password\" type=\"password\" placeholder=\"Confirm Password\">\n\
                     <button type=\"submit\">Confirm Reset</button>\n\
                     </form>\n\
                     <form method=\"post\" action=\"/reset/close\">\n\
                     <button type=\"submit\">Close</button>\n\
                     </form>\n",
                );
            }
        }
        Tab::Register => {
            body.push_str("<h2>User Registration</h2>\n");
            body.push_str(PASSWORD_HINT);
            body.push_str(
                "<form method=\"post\" action=\"/register\">\n\
                 <input name=\"firstname\" placeholder=\"First Name\">\n\
                 <input name=\"lastname\" placeholder=\"Last Name\">\n\
                 <input name=\"username\" placeholder=\"Username\">\n\
                 <input name=\"email\" placeholder=\"Email\">\n\
                 <input name=\"mobile\" placeholder=\"Phone Number\">\n\
                 <input name=\"password\" type=\"password\" placeholder=\"Password\">\n\
                 <button type=\"submit\">Register</button>\n\
                 </form>\n",
            );
        }
    }
    body
}

/// Planner page (Authenticated state). The itinerary text is shown
/// verbatim; the weather and fun-fact results are plain annotated lines.
fn planner_page(username: &str, plan: Option<&TripPlan>, notices: &[Notice]) -> String {
    let mut body = String::from("<h1>SmartSafar</h1>\n");
    body.push_str(&format!("<p>Logged in as: {}</p>\n", escape_html(username)));
    body.push_str(
        "<form method=\"post\" action=\"/logout\">\n\
         <button type=\"submit\">Logout</button>\n\
         </form>\n",
    );
    body.push_str(&notices_html(notices));
    body.push_str(
        "<h2>Plan Your Next Trip!</h2>\n\
         <form method=\"post\" action=\"/generate\">\n\
         <input name=\"city\" placeholder=\"e.g., Ahmedabad\">\n\
         <input name=\"interests\" placeholder=\"e.g., Food, Culture, Adventure\">\n\
         <button type=\"submit\">Generate Itinerary</button>\n\
         </form>\n",
    );
    if let Some(plan) = plan {
        body.push_str(&format!(
            "<div class=\"itinerary\"><pre>{}</pre></div>\n<p>{}</p>\n<p>{}</p>\n",
            escape_html(&plan.itinerary),
            escape_html(&plan.weather),
            escape_html(&plan.fun_fact),
        ));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_session_id_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("theme=dark; sid={id}; other=1").parse().unwrap(),
        );
        assert_eq!(cookie_session_id(&headers), Some(id));

        headers.insert(header::COOKIE, "sid=not-a-uuid".parse().unwrap());
        assert_eq!(cookie_session_id(&headers), None);

        assert_eq!(cookie_session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"a\" & b</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; b&lt;/b&gt;"
        );
    }

    #[test]
    fn test_anon_page_tabs_and_reset_panel() {
        let login = anon_page(Tab::Login, false, &[]);
        assert!(login.contains("User Login"));
        assert!(!login.contains("Reset Your Password"));

        let with_panel = anon_page(Tab::Login, true, &[]);
        assert!(with_panel.contains("Reset Your Password"));

        let register = anon_page(Tab::Register, false, &[]);
        assert!(register.contains("User Registration"));
        assert!(register.contains("Minimum 8 characters"));
    }

    #[test]
    fn test_planner_page_renders_plan() {
        let plan = TripPlan {
            itinerary: "09:00 breakfast".to_string(),
            weather: "Current weather in Paris: Sunny, 21°C".to_string(),
            fun_fact: "Fun Fact: ...".to_string(),
        };
        let body = planner_page("alice", Some(&plan), &[]);
        assert!(body.contains("Logged in as: alice"));
        assert!(body.contains("09:00 breakfast"));
        assert!(body.contains("Sunny, 21°C"));
    }

    #[tokio::test]
    async fn test_cookie_less_requests_do_not_accumulate_sessions() {
        let sessions = RwLock::new(HashMap::new());
        for _ in 0..1000 {
            let (id, session) = load_session(&sessions, &HeaderMap::new()).await;
            store_session(&sessions, id, session).await;
        }
        assert!(sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_logged_in_session_retained_then_evicted_on_logout() {
        let sessions = RwLock::new(HashMap::new());
        let (id, mut session) = load_session(&sessions, &HeaderMap::new()).await;
        session.log_in("alice");
        store_session(&sessions, id, session).await;
        assert_eq!(sessions.read().await.len(), 1);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, format!("sid={id}").parse().unwrap());
        let (loaded_id, mut session) = load_session(&sessions, &headers).await;
        assert_eq!(loaded_id, id);
        assert!(session.logged_in);

        session.log_out();
        store_session(&sessions, loaded_id, session).await;
        assert!(sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_sessions_ignored_and_swept() {
        let sessions = RwLock::new(HashMap::new());
        let stale_id = Uuid::new_v4();
        let mut stale = Session::new();
        stale.log_in("bob");
        sessions.write().await.insert(
            stale_id,
            SessionEntry {
                session: stale,
                last_seen: Instant::now() - SESSION_TTL - Duration::from_secs(1),
            },
        );

        // An expired cookie resolves to a fresh Anonymous session.
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, format!("sid={stale_id}").parse().unwrap());
        let (_, session) = load_session(&sessions, &headers).await;
        assert!(!session.logged_in);

        // The next write sweeps the stale entry out of the map.
        let (id, mut session) = load_session(&sessions, &HeaderMap::new()).await;
        session.log_in("carol");
        store_session(&sessions, id, session).await;
        let map = sessions.read().await;
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&stale_id));
    }

    #[test]
    fn test_notices_render_with_level_class() {
        let html = notices_html(&[Notice::success("ok"), Notice::error("bad & worse")]);
        assert!(html.contains("class=\"success\">ok"));
        assert!(html.contains("class=\"error\">bad &amp; worse"));
    }
}
