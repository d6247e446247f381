use crate::auth::jwt::TokenVerifier;
use crate::types::Claims;
use crate::utils::toml_config::{DairyConfig, DairyConfigManager, RoutesConfig};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// How the route table classifies a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
    Unmatched,
}

/// Outcome of the guard for one request.
#[derive(Debug, Clone)]
pub enum GuardDecision {
    /// Public or unmatched path.
    Pass,
    /// Protected path with a verified token.
    Authorized(Claims),
    /// Send the browser to this location.
    Redirect(String),
}

/// Segment-aware prefix test.
///
/// `/dashboard` matches `/dashboard` and `/dashboard/x` but not
/// `/dashboards`. The root prefix matches only `/` itself.
pub fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Public prefixes win over protected ones.
pub fn classify(routes: &RoutesConfig, path: &str) -> RouteClass {
    if routes
        .public_prefixes
        .iter()
        .any(|prefix| prefix_matches(prefix, path))
    {
        RouteClass::Public
    } else if routes
        .protected_prefixes
        .iter()
        .any(|prefix| prefix_matches(prefix, path))
    {
        RouteClass::Protected
    } else {
        RouteClass::Unmatched
    }
}

/// `{login_path}?redirect={original}` with the original path form-encoded.
pub fn login_redirect(login_path: &str, original: &str) -> String {
    match reqwest::Url::parse("http://localhost") {
        Ok(mut url) => {
            url.set_path(login_path);
            url.query_pairs_mut().append_pair("redirect", original);
            format!("{}?{}", url.path(), url.query().unwrap_or_default())
        }
        Err(_) => login_path.to_string(),
    }
}

/// Reads a cookie by name from every `Cookie` header on the request.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Decides what to do with a request for `path` carrying `token`.
///
/// A missing JWT secret fails closed: protected paths redirect.
pub fn decide(config: &DairyConfig, path: &str, token: Option<&str>) -> GuardDecision {
    let routes = &config.routes;

    match classify(routes, path) {
        RouteClass::Public | RouteClass::Unmatched => GuardDecision::Pass,
        RouteClass::Protected => {
            let redirect = || GuardDecision::Redirect(login_redirect(&routes.login_path, path));

            let Some(token) = token else {
                info!(path, "No access token, redirecting to login");
                return redirect();
            };

            let secret = match config.jwt_secret() {
                Ok(secret) => secret,
                Err(e) => {
                    error!("Cannot verify access token: {}", e);
                    return redirect();
                }
            };

            match TokenVerifier::new(&secret).verify(token) {
                Ok(claims) => {
                    debug!(path, user = ?claims.subject(), "Access token verified");
                    GuardDecision::Authorized(claims)
                }
                Err(e) => {
                    info!(path, "Rejected access token: {}", e);
                    redirect()
                }
            }
        }
    }
}

/// Route-protection middleware.
///
/// Reads the route table and secret from the live configuration on every
/// request and inserts verified [`Claims`] into the request extensions.
pub async fn route_guard(
    State(config_manager): State<Arc<DairyConfigManager>>,
    mut req: Request,
    next: Next,
) -> Response {
    let config = config_manager.config();
    let path = req.uri().path().to_string();
    let token = cookie_value(req.headers(), &config.auth.cookie_name);

    match decide(&config, &path, token.as_deref()) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::Authorized(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        GuardDecision::Redirect(location) => Redirect::temporary(&location).into_response(),
    }
}

/// Extractor for the claims attached by [`route_guard`].
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
