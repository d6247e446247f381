#![allow(dead_code)]

pub mod mocks;

use axum::http::{HeaderValue, header};
use axum_test::TestServer;
use ecodairy::{
    AppState, DairyConfig, DairyConfigManager, api::routes::create_router,
    auth::jwt::issue_token,
};
use mocks::{MockLLMClient, MockLLMFactory, MockMessenger};
use std::sync::Arc;

pub const TEST_SECRET_ENV: &str = "ECODAIRY_TEST_JWT_SECRET";
pub const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Default configuration pointed at the test secret.
pub fn test_config() -> DairyConfig {
    // SAFETY: every test writes the same value to this variable
    unsafe {
        std::env::set_var(TEST_SECRET_ENV, TEST_SECRET);
    }
    let mut config = DairyConfig::default();
    config.auth.jwt_secret_env = TEST_SECRET_ENV.to_string();
    config
}

pub fn test_state(llm: MockLLMClient, messenger: MockMessenger) -> AppState {
    let config_manager = Arc::new(DairyConfigManager::from_config(test_config()));
    AppState {
        config_manager,
        llm_factory: Arc::new(MockLLMFactory::new(llm)),
        messenger: Arc::new(messenger),
    }
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

/// `Cookie` header carrying a valid access token for user 42.
pub fn auth_cookie() -> (header::HeaderName, HeaderValue) {
    let token = issue_token(TEST_SECRET, "42", chrono::Duration::hours(1))
        .expect("token should be issued");
    (
        header::COOKIE,
        HeaderValue::from_str(&format!("accessToken={}", token)).expect("valid header"),
    )
}
