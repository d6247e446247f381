//! Route Protection
//!
//! The dashboard does not issue credentials. An external backend signs HS256
//! access tokens; the browser (or the CLI) carries them in the `accessToken`
//! cookie and this module decides, per request, whether a path may be served.
//!
//! # Module Structure
//!
//! - [`auth::jwt`](crate::auth::jwt) - Token verification against the shared secret
//! - [`auth::middleware`](crate::auth::middleware) - Route classification, the guard layer and extractors
//!
//! # Rules
//!
//! 1. Public prefixes are checked first and always pass.
//! 2. Protected prefixes need a cookie whose token verifies; otherwise the
//!    request is redirected to `{login_path}?redirect={original path}`.
//! 3. Everything else passes through.
//!
//! ## Middleware
//!
//! ```ignore
//! use ecodairy::auth::middleware::route_guard;
//!
//! let app = Router::new()
//!     .nest("/dashboard", dashboard_routes)
//!     .layer(axum::middleware::from_fn_with_state(config_manager, route_guard));
//! ```
//!
//! ## Extracting Claims in Handlers
//!
//! ```ignore
//! async fn overview(AuthUser(claims): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {:?}!", claims.subject())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET_KEY"
//! cookie_name = "accessToken"
//!
//! [routes]
//! login_path = "/dashboard/login"
//! public_prefixes = ["/dashboard/login", "/dashboard/register", "/"]
//! protected_prefixes = ["/dashboard"]
//! ```

/// HS256 access-token verification.
pub mod jwt;
/// Route-protection middleware and extractors.
pub mod middleware;
