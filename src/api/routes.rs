use crate::AppState;
use crate::api::handlers::{chat, dashboard, messaging};
use crate::auth::middleware::route_guard;
use crate::types::AppError;
use axum::{
    Json, Router,
    http::Uri,
    middleware,
    routing::{get, post},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcoDairy.AI",
        description = "Dairy herd dashboard, feed recommendations, AI chat relay and WhatsApp reports"
    ),
    paths(
        chat::chat,
        messaging::send_whatsapp_message,
        dashboard::overview,
        dashboard::feed_optimization,
        dashboard::recommendations,
        dashboard::notifications_page,
        dashboard::marketplace,
        dashboard::history,
        dashboard::statistics,
        dashboard::cow_analysis,
        dashboard::login_page,
        dashboard::register_page,
        dashboard::landing,
    ),
    tags(
        (name = "ai", description = "AI advisor"),
        (name = "messaging", description = "Report delivery"),
        (name = "dashboard", description = "Protected dashboard pages"),
        (name = "pages", description = "Public pages")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No page at {}", uri.path()))
}

/// Proxy endpoints under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/ai/chat", post(chat::chat))
        .route(
            "/send-whatsapp-message",
            post(messaging::send_whatsapp_message),
        )
}

/// Dashboard pages, mounted at `/dashboard`.
pub fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::overview))
        .route("/login", get(dashboard::login_page))
        .route("/register", get(dashboard::register_page))
        .route("/feed-optimization", get(dashboard::feed_optimization))
        .route(
            "/feed-optimization/recommendations",
            post(dashboard::recommendations),
        )
        .route("/notifications", get(dashboard::notifications_page))
        .route("/marketplace", get(dashboard::marketplace))
        .route("/history/{cow_name}/{date}", get(dashboard::history))
        .route("/statistics", get(dashboard::statistics))
        .route("/cows/{id}/analysis", get(dashboard::cow_analysis))
}

/// The complete application: pages, proxies, docs and the route guard.
///
/// The guard wraps every route, including the fallback, and classifies
/// paths from the live route table.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::landing))
        .route("/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/dashboard", dashboard_router())
        .nest("/api", api_router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.config_manager.clone(),
            route_guard,
        ))
        .with_state(state)
}
