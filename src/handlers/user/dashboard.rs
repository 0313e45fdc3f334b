// handlers/user/dashboard.rs - GET /api/user/dashboard handler

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::app::AppState;
use crate::auth::{Session, SessionError, SessionProvider};
use crate::database::{DatabaseError, User, UserQuery, UserStore};
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE, UNAUTHORIZED_MESSAGE, USER_NOT_FOUND_MESSAGE};

/// Everything that can go wrong while loading the dashboard that is not an
/// expected client outcome.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("session lookup failed: {0}")]
    Session(#[from] SessionError),

    #[error("user lookup failed: {0}")]
    Database(#[from] DatabaseError),
}

/// Result of a dashboard request before it is turned into an HTTP response.
#[derive(Debug)]
pub enum DashboardOutcome {
    Unauthenticated,
    NotFound,
    Success(User),
    Unexpected(DashboardError),
}

impl IntoResponse for DashboardOutcome {
    fn into_response(self) -> Response {
        match self {
            DashboardOutcome::Success(user) => (StatusCode::OK, Json(user)).into_response(),
            DashboardOutcome::Unauthenticated => ApiError::unauthorized(UNAUTHORIZED_MESSAGE).into_response(),
            DashboardOutcome::NotFound => ApiError::not_found(USER_NOT_FOUND_MESSAGE).into_response(),
            // Detail stays in the server log
            DashboardOutcome::Unexpected(_) => ApiError::internal_server_error(INTERNAL_ERROR_MESSAGE).into_response(),
        }
    }
}

/// GET /api/user/dashboard - the signed-in user with all of their
/// curriculums (newest first), each with its personal info.
///
/// Responses:
/// - 200: the user object, `curriculums` ordered by `updatedAt` descending
/// - 401: `{ "error": "Não autorizado" }`
/// - 404: `{ "error": "Usuário não encontrado" }`
/// - 500: `{ "error": "Erro interno do servidor" }`
#[tracing::instrument(name = "[GET] user dashboard", skip_all)]
pub async fn dashboard_get(State(state): State<AppState>, headers: HeaderMap) -> DashboardOutcome {
    load_dashboard(state.sessions.as_ref(), state.users.as_ref(), &headers).await
}

/// Resolve the session, then load the matching user. Failures of either
/// collaborator are logged once here and reported as `Unexpected`.
pub async fn load_dashboard(
    sessions: &dyn SessionProvider,
    users: &dyn UserStore,
    headers: &HeaderMap,
) -> DashboardOutcome {
    match fetch_dashboard(sessions, users, headers).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "error while fetching user dashboard data");
            DashboardOutcome::Unexpected(err)
        }
    }
}

async fn fetch_dashboard(
    sessions: &dyn SessionProvider,
    users: &dyn UserStore,
    headers: &HeaderMap,
) -> Result<DashboardOutcome, DashboardError> {
    let session = sessions.current_session(headers).await?;

    let Some(email) = session.as_ref().and_then(Session::email) else {
        return Ok(DashboardOutcome::Unauthenticated);
    };

    let query = UserQuery::dashboard(email);
    match users.find_user(&query).await? {
        Some(user) => Ok(DashboardOutcome::Success(user)),
        None => {
            tracing::debug!("No user record for signed-in email {}", email);
            Ok(DashboardOutcome::NotFound)
        }
    }
}
