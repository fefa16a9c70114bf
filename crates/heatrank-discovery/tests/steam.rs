//! Integration tests for `SteamClient` using wiremock HTTP mocks.

use heatrank_discovery::{DiscoveryError, SteamClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SteamClient {
    SteamClient::with_base_url(base_url, 5, "heatrank-test/0.1", 1, 0)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn current_players_returns_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ISteamUserStats/GetNumberOfCurrentPlayers/v1/"))
        .and(query_param("appid", "730"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": { "player_count": 1_234_567, "result": 1 }
        })))
        .mount(&server)
        .await;

    let players = test_client(&server.uri())
        .current_players("730")
        .await
        .expect("should parse");
    assert_eq!(players, Some(1_234_567));
}

#[tokio::test]
async fn unknown_app_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ISteamUserStats/GetNumberOfCurrentPlayers/v1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "response": { "result": 42 } })),
        )
        .mount(&server)
        .await;

    let players = test_client(&server.uri())
        .current_players("999999999")
        .await
        .expect("should parse");
    assert_eq!(players, None);
}

#[tokio::test]
async fn server_error_is_retried_then_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ISteamUserStats/GetNumberOfCurrentPlayers/v1/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .current_players("730")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::UnexpectedStatus { status: 502, .. }
    ));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ISteamUserStats/GetNumberOfCurrentPlayers/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .current_players("730")
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Deserialize { .. }));
}
