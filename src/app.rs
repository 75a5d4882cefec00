use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenGenerator;
use crate::config;
use crate::database::Repositories;
use crate::handlers;
use crate::middleware::{jwt_auth_middleware, validate_department_middleware};
use crate::services::{ActionItemsManagement, MessageCatalog};

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub tokens: TokenGenerator,
    pub messages: Arc<MessageCatalog>,
    pub actions: ActionItemsManagement,
    /// Header the login token is returned in and accepted from
    pub auth_header: HeaderName,
    pub min_password_length: usize,
}

impl AppState {
    pub fn new(repos: Repositories, tokens: TokenGenerator) -> Self {
        let security = &config::config().security;
        let auth_header = HeaderName::from_bytes(security.auth_header.as_bytes()).unwrap_or_else(|_| {
            tracing::warn!("Invalid auth header name '{}', using X-Auth-Token", security.auth_header);
            HeaderName::from_static("x-auth-token")
        });

        Self {
            actions: ActionItemsManagement::new(repos.clone()),
            repos,
            tokens,
            messages: Arc::new(MessageCatalog::default()),
            auth_header,
            min_password_length: security.min_password_length,
        }
    }
}

/// The complete HTTP surface
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(login_routes())
        // Protected
        .merge(department_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn login_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/login", post(auth::login))
        .route("/api/login", post(auth::login))
}

/// Health department routes: token plus department staff membership
fn department_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{actions, cases};

    Router::new()
        .route("/api/hd/actions", get(actions::actions_list))
        .route("/api/hd/actions/:id", get(actions::actions_get))
        .route("/api/hd/actions/:id/resolve", put(actions::actions_resolve))
        .route("/api/hd/cases/:id", get(cases::case_get))
        // Layers run bottom up: authenticate first, then check the department
        .route_layer(middleware::from_fn_with_state(state.clone(), validate_department_middleware))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// Account self-service, open to tracked people as well
fn user_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::user;

    Router::new()
        .route("/api/user/me/password", put(user::password_put))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()).collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
}
