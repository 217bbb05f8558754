//! REST endpoints for guard status and wizard error resolution.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RedirectTargets;
use crate::gate::{GateView, GuardKind};
use crate::session::{
    OnboardingSnapshot, ProfileService, ProfileSnapshot, SessionService, SessionSnapshot,
};
use crate::wizard::{ErrorNode, Resolution, forms};

/// Shared state for the API routes.
#[derive(Clone)]
pub struct ApiState {
    pub session: Arc<SessionService>,
    pub profile: Arc<ProfileService>,
    pub redirects: RedirectTargets,
    pub wizard_fallback_step: Option<u32>,
}

/// Build the API router.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/session", put(put_session))
        .route("/api/profile", put(put_profile))
        .route("/api/gate/{guard}", get(get_gate))
        .route("/api/wizard/{form}/steps", get(get_steps))
        .route("/api/wizard/{form}/resolve", post(resolve_errors))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(serde_json::json!({ "error": message.to_string() }))).into_response()
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "funeral-desk"
    }))
}

// ── Session feed ────────────────────────────────────────────────────────

/// PUT /api/session
///
/// Mirrors the auth provider's current session.
async fn put_session(
    State(state): State<ApiState>,
    Json(snapshot): Json<SessionSnapshot>,
) -> impl IntoResponse {
    match (snapshot.loading, snapshot.user) {
        (true, _) => state.session.begin_resolve(),
        (false, Some(user)) => state.session.sign_in(user),
        (false, None) => state.session.sign_out(),
    }
    StatusCode::NO_CONTENT
}

/// PUT /api/profile
///
/// Mirrors the signed-in user's profile row.
async fn put_profile(
    State(state): State<ApiState>,
    Json(snapshot): Json<ProfileSnapshot>,
) -> impl IntoResponse {
    if snapshot.loading {
        state.profile.begin_load();
    } else {
        state.profile.set_profile(snapshot.profile);
    }
    StatusCode::NO_CONTENT
}

// ── Gate ────────────────────────────────────────────────────────────────

/// GET /api/gate/{guard}
///
/// Classifies the current session for the named guard. Clients perform the
/// redirect themselves. Onboarding state is derived from the session and
/// profile read here, so a feed update is visible to the next request.
async fn get_gate(State(state): State<ApiState>, Path(guard): Path<String>) -> Response {
    let kind: GuardKind = match guard.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(StatusCode::NOT_FOUND, e),
    };
    let session = state.session.snapshot();
    let onboarding = OnboardingSnapshot::derive(&session, &state.profile.snapshot());
    let decision = kind.classify(&session, &onboarding, &state.redirects);
    debug!(guard = %kind, status = %decision.status(), "Gate check");

    Json(GateView {
        guard: kind,
        status: decision.status(),
        redirect: decision.redirect().map(str::to_string),
    })
    .into_response()
}

// ── Wizard ──────────────────────────────────────────────────────────────

/// GET /api/wizard/{form}/steps
async fn get_steps(Path(form): Path<String>) -> Response {
    match forms::find(&form).and_then(|f| f.describe()) {
        Ok(description) => Json(description).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    step: Option<u32>,
    field: Option<String>,
    fallback: bool,
    unmapped: Vec<String>,
}

/// POST /api/wizard/{form}/resolve
///
/// Body is the form layer's error object. Returns the step the wizard
/// should move to, if any.
async fn resolve_errors(
    State(state): State<ApiState>,
    Path(form): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let resolver = match forms::find(&form).and_then(|f| f.resolver(state.wizard_fallback_step)) {
        Ok(resolver) => resolver,
        Err(e) => return error_response(StatusCode::NOT_FOUND, e),
    };
    let tree = match ErrorNode::from_json(&body) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(form = %form, error = %e, "Rejected malformed error tree");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e);
        }
    };

    let unmapped = resolver.unmapped_errors(&tree);
    let response = match resolver.first_error_step(&tree) {
        Some(Resolution {
            step,
            field,
            fallback,
        }) => ResolveResponse {
            step: Some(step),
            field,
            fallback,
            unmapped,
        },
        None => ResolveResponse {
            step: None,
            field: None,
            fallback: false,
            unmapped,
        },
    };
    Json(response).into_response()
}
