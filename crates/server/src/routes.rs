//! HTTP surface for the claim system.
//!
//! - `GET  /`                                    — home page (current identity)
//! - `GET  /login`                               — login form metadata
//! - `POST /login`                               — start a session
//! - `POST /logout`                              — end the session
//! - `GET  /claims`                              — the caller's own claims
//! - `GET  /claims/new`                          — claim form metadata
//! - `POST /claims/new`                          — create a claim (multipart, with documents)
//! - `GET  /claims/{id}`                         — one claim, owner only
//! - `POST /claims/{id}/status`                  — set a claim status (reviewers)
//! - `GET  /coordinator/claims`                  — review queue (reviewers)
//! - `GET  /coordinator/claims/{id}/review`      — one claim for review
//! - `POST /coordinator/claims/{id}/review`      — approve / reject / request changes
//!
//! Failures follow the navigation rules: an expired session redirects to
//! login, a role violation redirects home, recoverable input problems come
//! back as 422 with field errors so the caller's input can be re-displayed,
//! and anything unexpected lands on the claim list with a generic message.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use claimdesk_core::auth::RequestContext;
use claimdesk_core::domain::claim::{ClaimId, ClaimStatus};
use claimdesk_core::domain::identity::Role;
use claimdesk_core::errors::{Navigation, WorkflowError};
use claimdesk_core::session::{self, SessionStore};
use claimdesk_core::validation::{ClaimDraft, MONTH_RANGE, YEAR_RANGE};
use claimdesk_core::workflow::{ClaimWorkflow, StagedUpload, SubmitAction};
use claimdesk_db::SqlClaimRepository;

use crate::sessions::{self, SessionHandle, SessionManager};
use crate::storage::LocalDocumentStore;

pub type Workflow = ClaimWorkflow<SqlClaimRepository, LocalDocumentStore>;

/// One-shot messages surfaced on the next page load, then discarded.
const FLASH_KEY: &str = "FlashMessage";

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub sessions: SessionManager,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/claims", get(list_claims))
        // The default 2MB body cap would reject uploads the policy allows;
        // leave headroom for several attachments plus form fields.
        .route(
            "/claims/new",
            get(new_claim_page)
                .post(create_claim)
                .layer(DefaultBodyLimit::max(32 * 1024 * 1024)),
        )
        .route("/claims/{id}", get(claim_detail))
        .route("/claims/{id}/status", post(update_claim_status))
        .route("/coordinator/claims", get(review_queue))
        .route("/coordinator/claims/{id}/review", get(review_detail).post(review_decision))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    /// Accepted but never inspected or stored; there is no credential store.
    pub password: SecretString,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionForm {
    pub action: String,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

fn session_for(state: &AppState, headers: &HeaderMap) -> SessionHandle {
    state.sessions.attach(sessions::token_from_headers(headers).as_deref())
}

fn take_flash(session: &SessionHandle) -> Option<String> {
    let message = session.get(FLASH_KEY).filter(|message| !message.is_empty());
    if message.is_some() {
        session.set(FLASH_KEY, "");
    }
    message
}

fn redirect_to(location: &str) -> Response {
    Redirect::to(location).into_response()
}

/// Maps a workflow failure onto its navigation outcome. Redirect targets
/// carry the user-facing message as a flash value; recoverable input
/// problems come back inline as 422 so the form can re-render.
fn fail(session: &SessionHandle, error: WorkflowError) -> Response {
    warn!(
        event_name = "claims.http.request_failed",
        error = %error,
        "request failed"
    );

    let message = error.user_message();
    match error.navigation() {
        Navigation::Login => redirect_to("/login"),
        Navigation::Home => {
            session.set(FLASH_KEY, &message);
            redirect_to("/")
        }
        Navigation::ClaimList => {
            session.set(FLASH_KEY, &message);
            redirect_to("/claims")
        }
        Navigation::Retain => {
            let field_errors: Vec<serde_json::Value> = match &error {
                WorkflowError::Validation(errors) => errors
                    .iter()
                    .map(|(field, messages)| json!({ "field": field, "messages": messages }))
                    .collect(),
                _ => Vec::new(),
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": message, "errors": field_errors })),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = session_for(&state, &headers);
    let identity = RequestContext::from_session(&session).identity;

    Json(json!({
        "message": take_flash(&session),
        "email": identity.as_ref().map(|identity| identity.email.clone()),
        "role": identity.as_ref().map(|identity| identity.role.to_string()),
    }))
    .into_response()
}

async fn login_page() -> Response {
    Json(json!({
        "roles": [
            Role::Lecturer.to_string(),
            Role::Coordinator.to_string(),
            Role::Manager.to_string(),
        ],
    }))
    .into_response()
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let LoginForm { email, password: _password, role } = form;

    let email = email.trim().to_string();
    if email.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Email is required." })),
        )
            .into_response();
    }

    let Ok(role) = role.parse::<Role>() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Please select a valid role." })),
        )
            .into_response();
    };

    // Every login gets a fresh token; nothing from a prior session carries
    // over, and a replaced cookie's session is dropped outright.
    if let Some(previous) = sessions::token_from_headers(&headers) {
        state.sessions.discard(&previous);
    }
    let session = state.sessions.attach(None);
    session::login(&session, &email, role);

    info!(
        event_name = "claims.auth.login",
        email = %email,
        role = %role,
        "user logged in"
    );

    (
        [(header::SET_COOKIE, sessions::set_cookie_value(session.token()))],
        redirect_to("/"),
    )
        .into_response()
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = session_for(&state, &headers);
    session::logout(&session);

    info!(event_name = "claims.auth.logout", "user logged out");

    ([(header::SET_COOKIE, sessions::clear_cookie_value())], redirect_to("/login"))
        .into_response()
}

// ---------------------------------------------------------------------------
// Lecturer routes
// ---------------------------------------------------------------------------

async fn list_claims(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    match state.workflow.claims_for_owner(&ctx).await {
        Ok(claims) => {
            Json(json!({ "message": take_flash(&session), "claims": claims })).into_response()
        }
        Err(error) => fail(&session, error),
    }
}

/// Everything a client needs to render the claim form: field ranges, the
/// accepted actions, and the active upload constraints.
async fn new_claim_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    if let Err(error) = ctx.authenticated() {
        return fail(&session, error);
    }

    let policy = state.workflow.upload_policy();
    Json(json!({
        "month_range": [*MONTH_RANGE.start(), *MONTH_RANGE.end()],
        "year_range": [*YEAR_RANGE.start(), *YEAR_RANGE.end()],
        "actions": ["save", "submit"],
        "max_upload_bytes": policy.max_size_bytes,
        "allowed_extensions": policy.allowed_extensions.clone(),
    }))
    .into_response()
}

async fn create_claim(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    let form = match parse_claim_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    match state.workflow.create(&ctx, form.draft, form.action, form.files).await {
        Ok(receipt) => {
            session.set(FLASH_KEY, &receipt.message);
            redirect_to("/claims")
        }
        Err(error) => fail(&session, error),
    }
}

async fn claim_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    match state.workflow.claim_for_owner(&ctx, &ClaimId(id)).await {
        Ok(claim) => Json(json!({ "claim": claim })).into_response(),
        Err(error) => fail(&session, error),
    }
}

async fn update_claim_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<StatusForm>,
) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    let Ok(status) = form.status.parse::<ClaimStatus>() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": format!("Unknown claim status '{}'.", form.status) })),
        )
            .into_response();
    };

    let notes = form.notes.unwrap_or_default();
    match state.workflow.update_status(&ctx, &ClaimId(id), status, &notes).await {
        Ok(receipt) => {
            Json(json!({ "message": receipt.message, "claim": receipt.claim })).into_response()
        }
        Err(error) => fail(&session, error),
    }
}

// ---------------------------------------------------------------------------
// Coordinator routes
// ---------------------------------------------------------------------------

async fn review_queue(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    match state.workflow.review_queue(&ctx).await {
        Ok(claims) => {
            Json(json!({ "message": take_flash(&session), "claims": claims })).into_response()
        }
        Err(error) => fail(&session, error),
    }
}

async fn review_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    match state.workflow.claim_for_review(&ctx, &ClaimId(id)).await {
        Ok(claim) => {
            let outcomes: Vec<String> =
                ClaimStatus::review_outcomes().iter().map(ToString::to_string).collect();
            Json(json!({ "claim": claim, "outcomes": outcomes })).into_response()
        }
        Err(error) => fail(&session, error),
    }
}

async fn review_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<DecisionForm>,
) -> Response {
    let session = session_for(&state, &headers);
    let ctx = RequestContext::from_session(&session);

    let Some(status) = decision_status(&form.action) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": format!("Unknown review action '{}'.", form.action) })),
        )
            .into_response();
    };

    let notes = form.notes.unwrap_or_default();
    match state.workflow.update_status(&ctx, &ClaimId(id), status, &notes).await {
        Ok(receipt) => {
            session.set(FLASH_KEY, &receipt.message);
            redirect_to("/coordinator/claims")
        }
        Err(error) => fail(&session, error),
    }
}

fn decision_status(action: &str) -> Option<ClaimStatus> {
    match action.trim().to_ascii_lowercase().as_str() {
        "approve" => Some(ClaimStatus::Approved),
        "reject" => Some(ClaimStatus::Rejected),
        "request_changes" | "changes" => Some(ClaimStatus::ChangesRequested),
        other => other.parse::<ClaimStatus>().ok(),
    }
}

// ---------------------------------------------------------------------------
// Multipart parsing
// ---------------------------------------------------------------------------

struct ParsedClaimForm {
    draft: ClaimDraft,
    action: SubmitAction,
    files: Vec<StagedUpload>,
}

/// Reads the claim form out of a multipart body. Unparseable month and
/// year values are kept as zero so they surface as field validation errors
/// rather than a blunt 400; a malformed items payload or a broken stream is
/// a 400 because there is no input left to re-display.
async fn parse_claim_form(mut multipart: Multipart) -> Result<ParsedClaimForm, Response> {
    let mut draft = ClaimDraft { month: 0, year: 0, items: Vec::new() };
    let mut action = SubmitAction::SaveDraft;
    let mut files = Vec::new();

    while let Some(field) =
        multipart.next_field().await.map_err(|error| bad_request(error.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else { continue };

        match name.as_str() {
            "month" => {
                let text = field.text().await.map_err(|error| bad_request(error.to_string()))?;
                draft.month = text.trim().parse().unwrap_or(0);
            }
            "year" => {
                let text = field.text().await.map_err(|error| bad_request(error.to_string()))?;
                draft.year = text.trim().parse().unwrap_or(0);
            }
            "items" => {
                let text = field.text().await.map_err(|error| bad_request(error.to_string()))?;
                if !text.trim().is_empty() {
                    draft.items = serde_json::from_str(&text).map_err(|error| {
                        bad_request(format!("items payload is not valid JSON: {error}"))
                    })?;
                }
            }
            "action" => {
                let text = field.text().await.map_err(|error| bad_request(error.to_string()))?;
                action = text.parse().unwrap_or(SubmitAction::SaveDraft);
            }
            "documents" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(|error| bad_request(error.to_string()))?;
                if !bytes.is_empty() {
                    files.push(StagedUpload { file_name, bytes: bytes.to_vec() });
                }
            }
            _ => {}
        }
    }

    Ok(ParsedClaimForm { draft, action, files })
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
}
