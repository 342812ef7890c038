//! Integration tests for the Portal HTTP client

use portal_http::{
    ClientError, LoginRequest, PublicPortalClient, RegisterRequest, SocialProvider,
    TypedClientBuilder,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "a@b.com".to_string(),
        password: "x".to_string(),
    }
}

#[tokio::test]
async fn test_login_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_data": { "id": 1, "fullName": "John Doe", "role": "admin",
                           "ability": [{ "action": "manage", "subject": "all" }] },
            "access_token": "T1",
            "refresh_token": "T2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();
    let response = client.login(&login_request()).await.unwrap();

    assert_eq!(response.access_token, "T1");
    assert_eq!(response.refresh_token.as_deref(), Some("T2"));
    assert_eq!(response.user.role.as_deref(), Some("admin"));
    assert_eq!(response.user.display_name(), "John Doe");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();
    let result = client.login(&login_request()).await;

    match result {
        Err(ClientError::AuthRejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_without_refresh_token_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "role": "admin" },
            "access_token": "T1"
        })))
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();
    let result = client.login(&login_request()).await;
    assert!(matches!(result, Err(ClientError::Protocol(_))));
}

#[tokio::test]
async fn test_network_failure() {
    // Bind only to learn a free port, then release it so nothing is listening
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = PublicPortalClient::new(uri).unwrap();
    let result = client.login(&login_request()).await;

    let err = result.unwrap_err();
    assert!(err.is_network_failure(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_register_field_errors_in_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "username": "johndoe",
            "email": "admin@demo.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "email": "This email is already in use.",
                "username": null
            }
        })))
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();
    let result = client
        .register(&RegisterRequest {
            username: "johndoe".to_string(),
            email: "admin@demo.com".to_string(),
            password: "secret".to_string(),
        })
        .await;

    let Err(ClientError::ValidationFailed(fields)) = result else {
        panic!("expected validation failure");
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["email"], "This email is already in use.");
}

#[tokio::test]
async fn test_register_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": { "id": 55, "username": "newbie", "role": "client", "ability": [] },
            "access_token": "T9"
        })))
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();
    let response = client
        .register(&RegisterRequest {
            username: "newbie".to_string(),
            email: "newbie@demo.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.access_token, "T9");
    assert_eq!(response.user.user_id(), "55");
    assert_eq!(response.refresh_token, None);
}

#[tokio::test]
async fn test_refresh_success_and_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jwt/refresh-token"))
        .and(body_json(json!({ "refresh_token": "good" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T3",
            "refreshToken": "T4"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/jwt/refresh-token"))
        .and(body_json(json!({ "refresh_token": "expired" })))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "jwt expired" })))
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();

    let refreshed = client.refresh("good").await.unwrap();
    assert_eq!(refreshed.access_token, "T3");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("T4"));

    let result = client.refresh("expired").await;
    assert!(matches!(result, Err(ClientError::TokenInvalid(ref m)) if m == "jwt expired"));
}

#[tokio::test]
async fn test_refresh_rejection_with_error_object_is_token_invalid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jwt/refresh-token"))
        .and(body_json(json!({ "refresh_token": "stale" })))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": { "token": "jwt expired" } })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/jwt/refresh-token"))
        .and(body_json(json!({ "refresh_token": "revoked" })))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "error": { "token": null } })))
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();

    let result = client.refresh("stale").await;
    assert!(
        matches!(result, Err(ClientError::TokenInvalid(ref m)) if m == "token: jwt expired"),
        "unexpected result: {result:?}"
    );

    let result = client.refresh("revoked").await;
    assert!(
        matches!(result, Err(ClientError::TokenInvalid(ref m)) if m == "Refresh token rejected"),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn test_social_exchange_uses_provider_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/google"))
        .and(body_json(json!({ "access_token": "google-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "email": "g@demo.com", "role": "client" },
            "access_token": "G1",
            "refresh_token": "G2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/facebook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PublicPortalClient::new(mock_server.uri()).unwrap();

    let response = client
        .exchange_provider_token(SocialProvider::Google, "google-token")
        .await
        .unwrap();
    assert_eq!(response.access_token, "G1");

    let result = client
        .exchange_provider_token(SocialProvider::Facebook, "fb-token")
        .await;
    assert!(matches!(
        result,
        Err(ClientError::ServerError { status: 500, ref message }) if message == "upstream down"
    ));
}

#[tokio::test]
async fn test_logout_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/jwt/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TypedClientBuilder::new()
        .base_url(mock_server.uri())
        .build_authenticated("T1")
        .unwrap();

    client.logout().await.unwrap();
}

#[tokio::test]
async fn test_authenticated_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 2 })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(&mock_server)
        .await;

    let public = PublicPortalClient::new(mock_server.uri()).unwrap();

    let body: serde_json::Value = public
        .clone()
        .authenticate("T1")
        .get_json("/api/users")
        .await
        .unwrap();
    assert_eq!(body["total"], 2);

    let result: Result<serde_json::Value, _> =
        public.authenticate("wrong").get_json("/api/users").await;
    assert!(matches!(result, Err(ClientError::AuthRejected { status: 401, .. })));
}
