/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use firmrate_api::{app::AppState, config::Config};
/// use firmrate_shared::mail::SmtpMailer;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = Arc::new(SmtpMailer::new(config.mail_config())?);
/// let state = AppState::new(pool, config, mailer)?;
/// let app = firmrate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::headers::ResponseHeadersLayer};
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use firmrate_shared::auth::{jwt, middleware::AuthContext};
use firmrate_shared::collation::NameCollator;
use firmrate_shared::mail::Mailer;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; every
/// field is either a pool or an Arc, so the clone is cheap. The mailer and
/// collator live here explicitly — there is no module-level mutable state
/// anywhere in the service.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Notification collaborator (SMTP in production, noop in tests)
    pub mailer: Arc<dyn Mailer>,

    /// Locale-aware collator for name listings
    pub collator: Arc<NameCollator>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Returns an error if the configured collation locale has no
    /// collation data.
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> anyhow::Result<Self> {
        let collator = NameCollator::new(&config.app.collation_locale)?;

        Ok(Self {
            db,
            config: Arc::new(config),
            mailer,
            collator: Arc::new(collator),
        })
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Liveness + DB ping (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register            # Create account, welcome mail
///     │   ├── POST /login               # Password login, tokens
///     │   └── POST /refresh             # New access token
///     ├── /companies
///     │   ├── GET  /                    # All names, collation-sorted (public)
///     │   ├── GET  /search?q=           # Substring search (public)
///     │   └── POST /                    # Register a company
///     ├── /reviews
///     │   ├── GET    /recent            # Homepage feed (public)
///     │   ├── POST   /                  # Submit (goes to moderation)
///     │   ├── PUT    /:id               # Edit within the window
///     │   └── DELETE /:id               # Withdraw (anonymize)
///     ├── /account
///     │   ├── GET    /                  # Profile + own reviews
///     │   ├── POST   /email             # Change email
///     │   ├── POST   /password          # Change password
///     │   ├── POST   /data-request      # GDPR data copy request
///     │   └── DELETE /                  # Delete account
///     └── /admin                        # role = admin only (DB-checked)
///         ├── GET    /pending           # Moderation queue
///         ├── POST   /pending/:id/approve
///         ├── POST   /pending/:id/reject
///         └── DELETE /reviews/:id       # Retract published review
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Public read-only routes
    let public_routes = Router::new()
        .route("/companies", get(routes::companies::list_companies))
        .route("/companies/search", get(routes::companies::search_companies))
        .route("/reviews/recent", get(routes::reviews::recent_reviews))
        .nest("/auth", auth_routes);

    // Everything below requires a valid access token
    let protected_routes = Router::new()
        .route("/companies", post(routes::companies::create_company))
        .route("/reviews", post(routes::reviews::submit_review))
        .route(
            "/reviews/:id",
            put(routes::reviews::edit_review).delete(routes::reviews::withdraw_review),
        )
        .route(
            "/account",
            get(routes::account::account_overview).delete(routes::account::delete_account),
        )
        .route("/account/email", post(routes::account::change_email))
        .route("/account/password", post(routes::account::change_password))
        .route(
            "/account/data-request",
            post(routes::account::request_data_copy),
        )
        .route("/admin/pending", get(routes::admin::moderation_queue))
        .route(
            "/admin/pending/:id/approve",
            post(routes::admin::approve_pending),
        )
        .route(
            "/admin/pending/:id/reject",
            post(routes::admin::reject_pending),
        )
        .route("/admin/reviews/:id", delete(routes::admin::retract_review))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = public_routes.merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .layer(ResponseHeadersLayer::new())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects an AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(&claims);

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
