use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{any, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yelp_client::{ApiError, Error, Params, YelpClient};

fn client_for(server: &MockServer, api_key: &str) -> YelpClient {
    YelpClient::new(api_key)
        .with_base_url(server.uri())
        .expect("mock server URI is a valid base URL")
}

#[tokio::test]
async fn search_sends_expected_query_and_returns_payload_unchanged() {
    let server = MockServer::start().await;
    let body = json!({
        "total": 1,
        "businesses": [{"id": "amys-ice-creams-austin-3", "name": "Amy's Ice Creams"}],
    });

    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .and(query_param("term", "ice cream"))
        .and(query_param("location", "austin, tx"))
        .and(query_param("sort_by", "rating"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let params = Params::new()
        .with("term", "ice cream")
        .with("location", "austin, tx")
        .with("sort_by", "rating")
        .with("limit", 5);

    let response = client.search(&params).await.expect("search succeeds");
    assert_eq!(response, body);
}

#[tokio::test]
async fn search_without_location_issues_zero_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let error = client
        .search(&Params::new().with("term", "ice cream"))
        .await
        .expect_err("location missing");

    assert!(matches!(error, Error::MissingLocation { endpoint: "search" }));
}

#[tokio::test]
async fn absent_parameters_are_never_transmitted() {
    let server = MockServer::start().await;

    // Matching on the exact query string proves `radius` never made it onto
    // the wire, not merely that it was empty.
    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .and(query_param("location", "austin, tx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let params = Params::new()
        .with("location", "austin, tx")
        .with_opt("radius", None::<i64>)
        .with_opt("open_now", None::<bool>);

    client.search(&params).await.expect("search succeeds");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("radius"));
    assert!(!query.contains("open_now"));
}

#[tokio::test]
async fn fusion_error_payload_becomes_typed_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "VALIDATION_ERROR",
                "description": "BAD_SORT is not a valid sort_by",
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let error = client
        .search(&Params::new().with("location", "austin, tx").with("sort_by", "BAD_SORT"))
        .await
        .expect_err("API rejects the sort");

    match error {
        Error::Api(api) => {
            assert_eq!(api.to_string(), "VALIDATION_ERROR: BAD_SORT is not a valid sort_by");
            assert_eq!(api.code(), "VALIDATION_ERROR");
            assert!(matches!(api, ApiError::Fusion { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn legacy_error_payload_keeps_id_and_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "id": "INVALID_PARAMETER",
                "text": "One or more parameters are invalid in request",
                "field": "sort",
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let error = client
        .search(&Params::new().with("location", "austin, tx"))
        .await
        .expect_err("API reports legacy error");

    match error {
        Error::Api(ApiError::Legacy { id, text, field }) => {
            assert_eq!(id, "INVALID_PARAMETER");
            assert_eq!(text, "One or more parameters are invalid in request");
            assert_eq!(field.as_deref(), Some("sort"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_json_body_is_a_distinct_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/businesses/fake-business"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("<html><body>Not Found</body></html>"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let error = client
        .business("fake-business", &Params::new())
        .await
        .expect_err("HTML is not JSON");

    assert!(matches!(error, Error::InvalidJson { .. }));
}

#[tokio::test]
async fn path_arguments_become_url_segments_and_empty_ones_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/transactions/delivery/search"))
        .and(query_param("location", "dallas, tx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    client
        .transaction_search("delivery", &Params::new().with("location", "dallas, tx"))
        .await
        .expect("transaction search succeeds");

    // An empty path segment is rejected before any request is built.
    let error = client
        .event("", &Params::new())
        .await
        .expect_err("empty id");
    assert!(matches!(
        error,
        Error::MissingParameter {
            endpoint: "event",
            parameter: "id"
        }
    ));
}

#[tokio::test]
async fn configured_timeout_bounds_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"events": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key").with_timeout(Duration::from_millis(50));
    let error = client
        .event_search(&Params::new())
        .await
        .expect_err("deadline expires first");

    match error {
        Error::Request(source) => assert!(source.is_timeout()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn no_timeout_means_slow_responses_still_complete() {
    let server = MockServer::start().await;
    let body = json!({"events": [{"id": "austin-fun-run"}]});
    Mock::given(method("GET"))
        .and(path("/v3/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body.clone())
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "test-key");
    let response = client
        .event_search(&Params::new())
        .await
        .expect("no deadline configured");
    assert_eq!(response, body);
}

#[tokio::test]
async fn client_credentials_flow_fetches_one_token_and_uses_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=app-id"))
        .and(body_string_contains("client_secret=app-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "granted-token",
            "token_type": "Bearer",
            "expires_in": 15_552_000,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .and(header("authorization", "Bearer granted-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = YelpClient::from_client_credentials_at(server.uri(), "app-id", "app-secret")
        .await
        .expect("token exchange succeeds");

    // Two calls, still one token fetch.
    let params = Params::new().with("location", "austin, tx");
    client.search(&params).await.expect("first search");
    client.search(&params).await.expect("second search");
}

#[tokio::test]
async fn client_credentials_flow_surfaces_api_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "CLIENT_ERROR",
                "description": "client_id or client_secret parameters are invalid",
            }
        })))
        .mount(&server)
        .await;

    let error = YelpClient::from_client_credentials_at(server.uri(), "bad", "creds")
        .await
        .expect_err("credentials rejected");

    match error {
        Error::Api(api) => assert_eq!(api.code(), "CLIENT_ERROR"),
        other => panic!("unexpected error: {other}"),
    }
}
