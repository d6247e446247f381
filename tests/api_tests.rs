mod common;

use axum::http::{HeaderValue, StatusCode, header};
use common::mocks::{MockLLMClient, MockMessenger};
use common::{auth_cookie, test_server, test_state};
use ecodairy::mock::feed::feed_type_names;
use rstest::rstest;
use serde_json::{Value, json};

fn default_server() -> axum_test::TestServer {
    test_server(test_state(MockLLMClient::new(&["ok"]), MockMessenger::new()))
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect should carry a location")
        .to_string()
}

// ============= Public pages =============

#[tokio::test]
async fn test_health_check() {
    let server = default_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_landing_page_is_public() {
    let server = default_server();

    let response = server.get("/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "EcoDairy.AI");
}

#[tokio::test]
async fn test_login_page_echoes_redirect() {
    let server = default_server();

    let response = server
        .get("/dashboard/login")
        .add_query_param("redirect", "/dashboard/statistics")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["redirect"], "/dashboard/statistics");
    assert_eq!(body["endpoint"], "/login/");
}

#[tokio::test]
async fn test_login_page_ignores_external_redirect() {
    let server = default_server();

    let response = server
        .get("/dashboard/login")
        .add_query_param("redirect", "https://evil.example.com")
        .await;
    let body: Value = response.json();
    assert_eq!(body["redirect"], "/dashboard");

    let response = server
        .get("/dashboard/login")
        .add_query_param("redirect", "//evil.example.com/dashboard")
        .await;
    let body: Value = response.json();
    assert_eq!(body["redirect"], "/dashboard");
}

#[tokio::test]
async fn test_register_page_is_public() {
    let server = default_server();

    server.get("/dashboard/register").await.assert_status_ok();
}

// ============= Route guard =============

#[rstest]
#[case("/dashboard", "/dashboard/login?redirect=%2Fdashboard")]
#[case(
    "/dashboard/statistics",
    "/dashboard/login?redirect=%2Fdashboard%2Fstatistics"
)]
#[case(
    "/dashboard/notifications",
    "/dashboard/login?redirect=%2Fdashboard%2Fnotifications"
)]
#[case(
    "/dashboard/history/Bessie/2023-06-01",
    "/dashboard/login?redirect=%2Fdashboard%2Fhistory%2FBessie%2F2023-06-01"
)]
#[case(
    "/dashboard/does-not-exist",
    "/dashboard/login?redirect=%2Fdashboard%2Fdoes-not-exist"
)]
#[tokio::test]
async fn test_protected_paths_redirect_without_cookie(
    #[case] path: &str,
    #[case] expected: &str,
) {
    let server = default_server();

    let response = server.get(path).await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), expected);
}

#[tokio::test]
async fn test_invalid_token_redirects() {
    let server = default_server();

    let response = server
        .get("/dashboard/statistics")
        .add_header(header::COOKIE, HeaderValue::from_static("accessToken=not-a-jwt"))
        .await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_redirects() {
    let server = default_server();
    let token = ecodairy::auth::jwt::issue_token(
        "some-other-secret-that-is-long-enough",
        "42",
        chrono::Duration::hours(1),
    )
    .unwrap();

    let response = server
        .get("/dashboard")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("accessToken={}", token)).unwrap(),
        )
        .await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_valid_cookie_opens_overview() {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server.get("/dashboard").add_header(name, value).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["userId"], "42");
    assert_eq!(body["herd"].as_array().unwrap().len(), 3);
    assert_eq!(body["herd"][0]["name"], "Bessie");
    assert_eq!(body["herd"][0]["feedEfficiency"], 0.67);
    assert!(
        body["cowsNeedingAttention"]
            .as_array()
            .unwrap()
            .contains(&json!("Bessie"))
    );
    assert_eq!(body["unreadNotifications"], 3);
}

#[tokio::test]
async fn test_api_routes_are_not_guarded() {
    let server = default_server();

    let response = server
        .post("/api/ai/chat")
        .json(&json!({ "message": "hello" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = default_server();

    let response = server.get("/nowhere").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("/nowhere"));
}

// ============= Dashboard documents =============

#[tokio::test]
async fn test_recommendation_for_healthy_bessie() {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server
        .post("/dashboard/feed-optimization/recommendations")
        .add_header(name, value)
        .json(&json!({ "cowId": 1, "healthStatus": "Healthy" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["cow"]["name"], "Bessie");
    assert_eq!(body["healthStatus"], "Healthy");

    let plan = &body["recommendation"];
    let feed = plan["dryMatterIntake"]["type"].as_str().unwrap();
    assert!(feed_type_names().contains(&feed));

    let predicted = plan["predictedMilkYield"].as_f64().unwrap();
    assert!((9.0..=40.0).contains(&predicted));
    assert!(plan["predictedMethaneEmission"].as_f64().unwrap().is_finite());

    let days: Vec<u64> = plan["milkYieldMethaneData"]
        .as_array()
        .unwrap()
        .iter()
        .map(|point| point["day"].as_u64().unwrap())
        .collect();
    assert_eq!(days, vec![1, 2, 3, 4, 5]);

    assert_eq!(body["milkComparison"]["currentValue"], 22.0);
}

#[tokio::test]
async fn test_recommendation_rejects_unknown_cow_and_health() {
    let server = default_server();

    let (name, value) = auth_cookie();
    let response = server
        .post("/dashboard/feed-optimization/recommendations")
        .add_header(name, value)
        .json(&json!({ "cowId": 99, "healthStatus": "Healthy" }))
        .await;
    response.assert_status_not_found();

    let (name, value) = auth_cookie();
    let response = server
        .post("/dashboard/feed-optimization/recommendations")
        .add_header(name, value)
        .json(&json!({ "cowId": 1, "healthStatus": "Grumpy" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_recommendation_malformed_body_is_json_bad_request() {
    let server = default_server();

    for body in [
        json!({ "cowId": "one", "healthStatus": "Healthy" }),
        json!({ "cowId": 1 }),
    ] {
        let (name, value) = auth_cookie();
        let response = server
            .post("/dashboard/feed-optimization/recommendations")
            .add_header(name, value)
            .json(&body)
            .await;
        response.assert_status_bad_request();

        let error: Value = response.json();
        assert!(error["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }
}

#[tokio::test]
async fn test_feed_optimization_preselects_cow_by_name() {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server
        .get("/dashboard/feed-optimization")
        .add_query_param("cowName", "Molly")
        .add_header(name, value)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["selectedCowId"], 3);
    assert_eq!(
        body["healthStatuses"],
        json!(["Healthy", "Injured", "Chronically Sick"])
    );
}

#[tokio::test]
async fn test_history_lookup() {
    let server = default_server();

    let (name, value) = auth_cookie();
    let response = server
        .get("/dashboard/history/Daisy/2023-06-01")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["healthStatus"], "Injured");

    let (name, value) = auth_cookie();
    let response = server
        .get("/dashboard/history/Daisy/1999-01-01")
        .add_header(name, value)
        .await;
    response.assert_status_not_found();
}

#[rstest]
#[case("feed", 1)]
#[case("all", 3)]
#[case("service", 1)]
#[tokio::test]
async fn test_marketplace_filters_by_type(#[case] kind: &str, #[case] expected: usize) {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server
        .get("/dashboard/marketplace")
        .add_query_param("type", kind)
        .add_header(name, value)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let listings = body["listings"].as_array().unwrap();
    assert_eq!(listings.len(), expected);
    if kind != "all" {
        assert!(listings.iter().all(|l| l["type"] == kind));
    }
}

#[tokio::test]
async fn test_marketplace_rejects_unknown_type() {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server
        .get("/dashboard/marketplace")
        .add_query_param("type", "tractors")
        .add_header(name, value)
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_statistics_window() {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server.get("/dashboard/statistics").add_header(name, value).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["methaneSeries"].as_array().unwrap().len(), 40);
    assert_eq!(body["cows"].as_array().unwrap().len(), 3);
    assert!(body["current"]["color"].is_string());
}

#[tokio::test]
async fn test_cow_analysis() {
    let server = default_server();

    let (name, value) = auth_cookie();
    let response = server
        .get("/dashboard/cows/2/analysis")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["cow"]["name"], "Daisy");
    assert_eq!(body["monthlyData"].as_array().unwrap().len(), 30);

    let (name, value) = auth_cookie();
    let response = server
        .get("/dashboard/cows/7/analysis")
        .add_header(name, value)
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_notifications_page() {
    let server = default_server();
    let (name, value) = auth_cookie();

    let response = server
        .get("/dashboard/notifications")
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["notifications"].as_array().unwrap().len(), 6);
    assert_eq!(body["unreadCount"], 3);
}

// ============= AI chat proxy =============

#[tokio::test]
async fn test_chat_streams_fragments_verbatim() {
    let llm = MockLLMClient::new(&["## Bessie\n", "Increase **silage**", " slightly."]);
    let server = test_server(test_state(llm.clone(), MockMessenger::new()));

    let response = server
        .post("/api/ai/chat")
        .json(&json!({ "message": "How is Bessie doing?", "userId": "u-1" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    response.assert_text("## Bessie\nIncrease **silage** slightly.");

    let prompt = llm.last_prompt().expect("prompt should reach the model");
    assert!(prompt.contains("Here is the current data for the farm's cows:"));
    assert!(prompt.contains("Bessie"));
    assert!(prompt.ends_with("User: How is Bessie doing?"));
}

#[tokio::test]
async fn test_chat_upstream_failure_returns_fixed_error() {
    let server = test_server(test_state(MockLLMClient::failing(), MockMessenger::new()));

    let response = server
        .post("/api/ai/chat")
        .json(&json!({ "message": "hello" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Failed to process request" }));
}

#[tokio::test]
async fn test_chat_malformed_body_returns_fixed_error() {
    let server = default_server();

    let response = server.post("/api/ai/chat").text("{not json").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Failed to process request" }));
}

#[tokio::test]
async fn test_chat_mid_stream_failure_ends_body() {
    let llm = MockLLMClient::breaking_after(&["partial ", "answer"]);
    let server = test_server(test_state(llm, MockMessenger::new()));

    let response = server
        .post("/api/ai/chat")
        .json(&json!({ "message": "hello" }))
        .await;
    response.assert_status_ok();
    response.assert_text("partial answer");
}

// ============= Messaging proxy =============

#[tokio::test]
async fn test_send_whatsapp_message() {
    let messenger = MockMessenger::new();
    let server = test_server(test_state(MockLLMClient::new(&["ok"]), messenger.clone()));

    let response = server
        .post("/api/send-whatsapp-message")
        .json(&json!({ "to": "+254700000000", "message": "Your monthly report is ready!" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["messageId"].as_str().unwrap().starts_with("SM"));
    assert_eq!(
        messenger.sent(),
        vec![(
            "+254700000000".to_string(),
            "Your monthly report is ready!".to_string()
        )]
    );
}

#[tokio::test]
async fn test_send_whatsapp_message_failure() {
    let server = test_server(test_state(
        MockLLMClient::new(&["ok"]),
        MockMessenger::failing(),
    ));

    let response = server
        .post("/api/send-whatsapp-message")
        .json(&json!({ "to": "nope", "message": "hi" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "success": false, "error": "Failed to send message" }));
}

#[tokio::test]
async fn test_send_whatsapp_message_missing_field() {
    let server = default_server();

    let response = server
        .post("/api/send-whatsapp-message")
        .json(&json!({ "to": "+254700000000" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "success": false, "error": "Failed to send message" }));
}

// ============= OpenAPI =============

#[tokio::test]
async fn test_openapi_document_lists_proxies() {
    let server = default_server();

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/ai/chat"].is_object());
    assert!(body["paths"]["/api/send-whatsapp-message"].is_object());
    assert!(body["paths"]["/dashboard/statistics"].is_object());
}
