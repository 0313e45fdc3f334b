use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnFailure, TraceLayer},
};

use crate::auth::SessionProvider;
use crate::config::{AppConfig, Environment, SecurityConfig};
use crate::database::UserStore;
use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};
use crate::handlers;

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionProvider>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(sessions: impl SessionProvider + 'static, users: impl UserStore + 'static) -> Self {
        Self {
            sessions: Arc::new(sessions),
            users: Arc::new(users),
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/health", get(handlers::health))
        // Session-scoped
        .merge(user_routes())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.environment, &config.security));
    }

    if config.api.enable_request_logging {
        // Server errors are already logged where they are handled
        router = router.layer(
            TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(tracing::Level::WARN)),
        );
    }

    router
}

fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new().route("/api/user/dashboard", get(user::dashboard_get))
}

fn cors_layer(environment: &Environment, security: &SecurityConfig) -> CorsLayer {
    if *environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    ApiError::internal_server_error(INTERNAL_ERROR_MESSAGE).into_response()
}
