//! HTTP API Handlers and Routes
//!
//! This module provides the HTTP layer for EcoDairy, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # Endpoints
//!
//! ## Proxies (`/api`)
//! - `POST /api/ai/chat` - Stream an answer from the dairy advisor
//! - `POST /api/send-whatsapp-message` - Send a WhatsApp message
//!
//! ## Dashboard (`/dashboard`, protected)
//! - `GET /dashboard` - Herd overview
//! - `GET /dashboard/feed-optimization` - Cow and health options
//! - `POST /dashboard/feed-optimization/recommendations` - Generate a feed plan
//! - `GET /dashboard/notifications` - Notification feed
//! - `GET /dashboard/marketplace` - Listings search
//! - `GET /dashboard/history/{cow_name}/{date}` - Historical feed plan
//! - `GET /dashboard/statistics` - Methane monitor
//! - `GET /dashboard/cows/{id}/analysis` - Thirty-day analysis
//!
//! ## Public
//! - `GET /`, `GET /dashboard/login`, `GET /dashboard/register`
//! - `GET /health` - Health check
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # Authentication
//!
//! Protected pages need the `accessToken` cookie; see [`crate::auth`].

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
