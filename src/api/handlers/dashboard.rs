//! Dashboard page documents.
//!
//! Each handler returns the data one dashboard page renders. Everything
//! under `/dashboard` except the login and register pages sits behind the
//! route guard.

use crate::{
    auth::middleware::AuthUser,
    dashboard::{
        HistoricalFeedPlan, Listing, ListingFilter, Notification, find_feed_plan, notifications,
        search_listings, unread_count,
    },
    herd::{Cow, dashboard_cows, find_cow, find_cow_by_name},
    mock::{
        HealthStatus, MethaneLevel, MethaneReading, MetricComparison, MetricKind, MonthlyPoint,
        MonthlyTrend, analysis::generate_monthly_data, feed::generate_feed_recommendation,
        methane::simulate_series, round_to,
    },
    types::{AppError, RecommendationRequest, RecommendationResponse, Result},
};
use axum::{
    Json,
    extract::{Path, Query, rejection::JsonRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Seconds between simulated methane readings.
const METHANE_INTERVAL_SECS: i64 = 3;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CowSummary {
    #[serde(flatten)]
    pub cow: Cow,
    pub feed_efficiency: f64,
    pub needs_attention: bool,
}

impl From<Cow> for CowSummary {
    fn from(cow: Cow) -> Self {
        Self {
            feed_efficiency: round_to(cow.feed_efficiency(), 2),
            needs_attention: cow.needs_attention(),
            cow,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethaneStatus {
    pub reading: MethaneReading,
    pub level: MethaneLevel,
    pub color: String,
}

impl MethaneStatus {
    fn from_reading(reading: MethaneReading) -> Self {
        let level = MethaneLevel::classify(reading.value);
        Self {
            color: level.color().to_string(),
            level,
            reading,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub user_id: Option<String>,
    pub herd: Vec<CowSummary>,
    pub average_feed_efficiency: f64,
    pub cows_needing_attention: Vec<String>,
    pub methane: Option<MethaneStatus>,
    pub unread_notifications: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeedOptimizationQuery {
    /// Preselect the cow with this exact name
    pub cow_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedOptimizationPage {
    pub cows: Vec<Cow>,
    pub health_statuses: Vec<HealthStatus>,
    pub selected_cow_id: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsPage {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MarketplaceQuery {
    /// Case-insensitive title search
    pub q: Option<String>,
    /// `all`, `buyer`, `feed` or `service`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketplacePage {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub listings: Vec<Listing>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CowAttention {
    pub id: u32,
    pub name: String,
    pub needs_attention: bool,
    pub current_methane_emission: f64,
    pub milk_yield: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsPage {
    pub methane_series: Vec<MethaneReading>,
    pub current: Option<MethaneStatus>,
    pub cows: Vec<CowAttention>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CowAnalysis {
    pub cow: Cow,
    pub monthly_data: Vec<MonthlyPoint>,
    pub trend: Option<MonthlyTrend>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Where to go after a successful login
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthPage {
    pub title: String,
    pub description: String,
    /// Relative endpoint of the external auth backend
    pub endpoint: String,
    pub redirect: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LandingPage {
    pub name: String,
    pub tagline: String,
    pub headline: String,
    pub links: Vec<String>,
}

/// Dashboard overview
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Herd overview", body = DashboardOverview),
        (status = 307, description = "Not logged in")
    ),
    tag = "dashboard"
)]
pub async fn overview(AuthUser(claims): AuthUser) -> Json<DashboardOverview> {
    let cows = dashboard_cows();
    let average_feed_efficiency = if cows.is_empty() {
        0.0
    } else {
        round_to(
            cows.iter().map(Cow::feed_efficiency).sum::<f64>() / cows.len() as f64,
            2,
        )
    };
    let cows_needing_attention = cows
        .iter()
        .filter(|cow| cow.needs_attention())
        .map(|cow| cow.name.clone())
        .collect();

    let methane = simulate_series(&mut rand::rng(), 1, METHANE_INTERVAL_SECS, Utc::now())
        .pop()
        .map(MethaneStatus::from_reading);

    Json(DashboardOverview {
        user_id: claims.subject(),
        herd: cows.into_iter().map(CowSummary::from).collect(),
        average_feed_efficiency,
        cows_needing_attention,
        methane,
        unread_notifications: unread_count(&notifications()),
    })
}

/// Feed optimization page
#[utoipa::path(
    get,
    path = "/dashboard/feed-optimization",
    params(FeedOptimizationQuery),
    responses((status = 200, description = "Cow and health options", body = FeedOptimizationPage)),
    tag = "dashboard"
)]
pub async fn feed_optimization(
    Query(query): Query<FeedOptimizationQuery>,
) -> Json<FeedOptimizationPage> {
    let selected_cow_id = query
        .cow_name
        .as_deref()
        .and_then(find_cow_by_name)
        .map(|cow| cow.id);

    Json(FeedOptimizationPage {
        cows: dashboard_cows(),
        health_statuses: HealthStatus::ALL.to_vec(),
        selected_cow_id,
    })
}

/// Generate a feed recommendation
#[utoipa::path(
    post,
    path = "/dashboard/feed-optimization/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Generated plan", body = RecommendationResponse),
        (status = 400, description = "Malformed body or unknown health status"),
        (status = 404, description = "Unknown cow")
    ),
    tag = "dashboard"
)]
pub async fn recommendations(
    payload: std::result::Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let cow = find_cow(request.cow_id)
        .ok_or_else(|| AppError::NotFound(format!("Cow {} not found", request.cow_id)))?;
    let health: HealthStatus = request.health_status.parse()?;

    let recommendation = generate_feed_recommendation(&cow, health);
    let milk_comparison = MetricComparison::new(
        MetricKind::Milk,
        cow.milk_yield,
        recommendation.predicted_milk_yield,
    );
    let methane_comparison = MetricComparison::new(
        MetricKind::Methane,
        cow.current_methane_emission,
        recommendation.predicted_methane_emission,
    );

    Ok(Json(RecommendationResponse {
        cow,
        health_status: health,
        recommendation,
        milk_comparison,
        methane_comparison,
    }))
}

/// Notification feed
#[utoipa::path(
    get,
    path = "/dashboard/notifications",
    responses((status = 200, description = "Notifications", body = NotificationsPage)),
    tag = "dashboard"
)]
pub async fn notifications_page() -> Json<NotificationsPage> {
    let notifications = notifications();
    Json(NotificationsPage {
        unread_count: unread_count(&notifications),
        notifications,
    })
}

/// Marketplace listings
#[utoipa::path(
    get,
    path = "/dashboard/marketplace",
    params(MarketplaceQuery),
    responses(
        (status = 200, description = "Matching listings", body = MarketplacePage),
        (status = 400, description = "Unknown listing type")
    ),
    tag = "dashboard"
)]
pub async fn marketplace(Query(query): Query<MarketplaceQuery>) -> Result<Json<MarketplacePage>> {
    let search = query.q.unwrap_or_default();
    let kind = query.kind.unwrap_or_else(|| "all".to_string());
    let filter: ListingFilter = kind.parse()?;

    Ok(Json(MarketplacePage {
        listings: search_listings(&search, filter),
        query: search,
        kind,
    }))
}

/// Historical feed plan for one cow on one day
#[utoipa::path(
    get,
    path = "/dashboard/history/{cow_name}/{date}",
    params(
        ("cow_name" = String, Path, description = "Cow name"),
        ("date" = String, Path, description = "Plan date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Feed plan", body = HistoricalFeedPlan),
        (status = 404, description = "No plan for that cow and date")
    ),
    tag = "dashboard"
)]
pub async fn history(
    Path((cow_name, date)): Path<(String, String)>,
) -> Result<Json<HistoricalFeedPlan>> {
    find_feed_plan(&cow_name, &date)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No feed plan for {} on {}", cow_name, date)))
}

/// Live statistics
#[utoipa::path(
    get,
    path = "/dashboard/statistics",
    responses((status = 200, description = "Methane monitor and herd flags", body = StatisticsPage)),
    tag = "dashboard"
)]
pub async fn statistics() -> Json<StatisticsPage> {
    let methane_series = simulate_series(
        &mut rand::rng(),
        crate::mock::methane::WINDOW,
        METHANE_INTERVAL_SECS,
        Utc::now(),
    );
    let current = methane_series.last().cloned().map(MethaneStatus::from_reading);

    let cows = dashboard_cows()
        .into_iter()
        .map(|cow| CowAttention {
            needs_attention: cow.needs_attention(),
            id: cow.id,
            current_methane_emission: cow.current_methane_emission,
            milk_yield: cow.milk_yield,
            name: cow.name,
        })
        .collect();

    Json(StatisticsPage {
        methane_series,
        current,
        cows,
    })
}

/// Thirty-day analysis of one cow
#[utoipa::path(
    get,
    path = "/dashboard/cows/{id}/analysis",
    params(("id" = u32, Path, description = "Cow id")),
    responses(
        (status = 200, description = "Monthly series and trend", body = CowAnalysis),
        (status = 404, description = "Unknown cow")
    ),
    tag = "dashboard"
)]
pub async fn cow_analysis(Path(id): Path<u32>) -> Result<Json<CowAnalysis>> {
    let cow = find_cow(id).ok_or_else(|| AppError::NotFound(format!("Cow {} not found", id)))?;
    let monthly_data = generate_monthly_data(&mut rand::rng(), &cow, Utc::now().date_naive());
    let trend = MonthlyTrend::from_series(&cow, &monthly_data);

    Ok(Json(CowAnalysis {
        cow,
        monthly_data,
        trend,
    }))
}

fn redirect_target(query: LoginQuery) -> String {
    query
        .redirect
        // Same-origin paths only; `//host` is protocol-relative
        .filter(|target| target.starts_with('/') && !target.starts_with("//"))
        .unwrap_or_else(|| "/dashboard".to_string())
}

/// Login page
#[utoipa::path(
    get,
    path = "/dashboard/login",
    params(LoginQuery),
    responses((status = 200, description = "Login form description", body = AuthPage)),
    tag = "pages"
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        title: "We are glad to have you back".to_string(),
        description: "Please enter your details to access the system".to_string(),
        endpoint: "/login/".to_string(),
        redirect: redirect_target(query),
    })
}

/// Registration page
#[utoipa::path(
    get,
    path = "/dashboard/register",
    params(LoginQuery),
    responses((status = 200, description = "Registration form description", body = AuthPage)),
    tag = "pages"
)]
pub async fn register_page(Query(query): Query<LoginQuery>) -> Json<AuthPage> {
    Json(AuthPage {
        title: "Create your EcoDairy.AI account".to_string(),
        description: "Register to start optimizing your herd's feed".to_string(),
        endpoint: "/register/".to_string(),
        redirect: redirect_target(query),
    })
}

/// Landing page
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing document", body = LandingPage)),
    tag = "pages"
)]
pub async fn landing() -> Json<LandingPage> {
    Json(LandingPage {
        name: "EcoDairy.AI".to_string(),
        tagline: "Powered by Artificial Intelligence".to_string(),
        headline: "AI-Powered Feed Management for Sustainable Dairy Farming".to_string(),
        links: vec!["/dashboard/login".to_string(), "/dashboard/register".to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_target_defaults_to_dashboard() {
        assert_eq!(redirect_target(LoginQuery { redirect: None }), "/dashboard");
        assert_eq!(
            redirect_target(LoginQuery {
                redirect: Some("/dashboard/statistics".to_string())
            }),
            "/dashboard/statistics"
        );
        assert_eq!(
            redirect_target(LoginQuery {
                redirect: Some("https://elsewhere.example".to_string())
            }),
            "/dashboard"
        );
    }

    #[test]
    fn test_cow_summary_flattens_cow() {
        let cow = find_cow(1).unwrap();
        let json = serde_json::to_value(CowSummary::from(cow)).unwrap();
        assert_eq!(json["name"], "Bessie");
        assert_eq!(json["needsAttention"], true);
        assert_eq!(json["feedEfficiency"], 0.67);
    }
}
