//! End-to-end HTTP tests
//!
//! The Google token endpoint and the messaging gateway are both served by a
//! local wiremock server; requests are signed with the fixture
//! service-account key.

use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ara_fcm_push::config::Settings;
use ara_fcm_push::credentials::{
    AssertionClaims, CredentialProvider, GoogleTokenFetcher, MemoryTokenStore, ProviderOptions,
    ServiceAccountKey, TokenFetcher,
};
use ara_fcm_push::delivery::{create_dispatcher, HttpTransport, PushDispatcher};
use ara_fcm_push::error::PushError;
use ara_fcm_push::message::MessageDescriptor;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/service_account.json");
const PUBLIC_KEY: &[u8] = include_bytes!("fixtures/test_public_key.pem");
const SEND_PATH: &str = "/v1/projects/ara-push-test/messages:send";
const SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

fn service_account(server: &MockServer) -> ServiceAccountKey {
    let mut key = ServiceAccountKey::from_file(FIXTURE).unwrap();
    key.token_uri = format!("{}/token", server.uri());
    key
}

fn fetcher(server: &MockServer) -> GoogleTokenFetcher {
    GoogleTokenFetcher::new(service_account(server), SCOPE, reqwest::Client::new()).unwrap()
}

fn dispatcher(server: &MockServer) -> PushDispatcher {
    let provider = Arc::new(CredentialProvider::new(
        Arc::new(fetcher(server)),
        Arc::new(MemoryTokenStore::new()),
        ProviderOptions::default(),
    ));
    let transport = HttpTransport::new(reqwest::Client::new(), format!("{}{}", server.uri(), SEND_PATH));

    PushDispatcher::new(provider, Arc::new(transport))
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn gateway_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"name": "projects/ara-push-test/messages/0:1"}))
}

// =============================================================================
// Token endpoint
// =============================================================================

mod token_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_exchanges_signed_assertion() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, 1).await;

        let fetcher = fetcher(&server);
        let token = fetcher.fetch().await.unwrap();
        assert_eq!(token.access_token, "ya29.test-token");
        assert!(token.remaining_seconds() > 3500);

        let requests = server.received_requests().await.unwrap();
        let form = String::from_utf8(requests[0].body.clone()).unwrap();
        let assertion = form
            .split('&')
            .find_map(|pair| pair.strip_prefix("assertion="))
            .unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[format!("{}/token", server.uri())]);
        let claims = decode::<AssertionClaims>(
            assertion,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY).unwrap(),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(claims.iss, "push-sender@ara-push-test.iam.gserviceaccount.com");
        assert_eq!(claims.sub, claims.iss);
        assert_eq!(claims.scope, SCOPE);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_rejected_assertion_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })))
            .mount(&server)
            .await;

        let err = fetcher(&server).fetch().await.unwrap_err();
        match err {
            PushError::Auth(message) => assert!(message.contains("400")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_response_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(matches!(
            fetcher(&server).fetch().await,
            Err(PushError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_expires_in_is_auth_error() {
        for expires_in in [json!(9_000_000_000_000_000i64), json!(0), json!(-5)] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "access_token": "t",
                    "expires_in": expires_in.clone()
                })))
                .mount(&server)
                .await;

            let fetcher = fetcher(&server);
            assert_eq!(fetcher.service_account().token_uri, format!("{}/token", server.uri()));

            match tokio::spawn(async move { fetcher.fetch().await }).await {
                Ok(Err(PushError::Auth(message))) => {
                    assert!(message.contains("Malformed token response"))
                }
                other => panic!("expected auth error for {}, got {:?}", expires_in, other),
            }
        }
    }
}

// =============================================================================
// Gateway
// =============================================================================

mod gateway_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_tokens_end_to_end() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, 1).await;

        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(header("authorization", "Bearer ya29.test-token"))
            .respond_with(gateway_ok())
            .expect(3)
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);
        let message = MessageDescriptor::new().title("Hi").data([("n", json!(1))]);

        let result = dispatcher.send(message.clone(), ["a", "b"]).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.report().unwrap().delivered, 2);
        assert_eq!(
            result.report().unwrap().message_names[0],
            "projects/ara-push-test/messages/0:1"
        );

        // Second send reuses the cached token
        dispatcher.send(message, ["c"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_envelope_body_on_the_wire() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, 1).await;

        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({
                "message": {
                    "condition": "'a' in topics",
                    "notification": {"title": "Hi"},
                    "data": {"meta": "{\"x\":1}"},
                    "fcm_options": {"analytics_label": "wire"}
                }
            })))
            .respond_with(gateway_ok())
            .expect(1)
            .mount(&server)
            .await;

        let message = MessageDescriptor::new()
            .title("Hi")
            .condition("'a' in topics")
            .data([("meta", json!({"x": 1}))])
            .analytics_label("wire");

        dispatcher(&server).send(message, ["ignored"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_404_ignored_500_fatal() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, 1).await;

        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"message": {"token": "stale"}})))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "status": "NOT_FOUND"}
            })))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .and(body_partial_json(json!({"message": {"token": "broken"}})))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(gateway_ok())
            .mount(&server)
            .await;

        let dispatcher = dispatcher(&server);

        let ok = dispatcher
            .send(MessageDescriptor::new().title("Hi"), ["a", "stale", "b"])
            .await
            .unwrap();
        assert_eq!(ok.report().unwrap().ignored, 1);
        assert!(ok.is_success());

        let err = dispatcher
            .send(MessageDescriptor::new().title("Hi"), ["a", "broken", "b"])
            .await
            .unwrap_err();
        match err {
            PushError::Delivery { status_code, body } => {
                assert_eq!(status_code, 500);
                assert_eq!(body, "internal");
            }
            other => panic!("expected delivery error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auth_failure_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(gateway_ok())
            .expect(0)
            .mount(&server)
            .await;

        let err = dispatcher(&server)
            .send(MessageDescriptor::new().title("Hi"), ["a"])
            .await
            .unwrap_err();
        assert!(matches!(err, PushError::Auth(_)));
    }
}

// =============================================================================
// Settings-driven wiring
// =============================================================================

mod factory_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_dispatcher_from_settings() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, 1).await;
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(gateway_ok())
            .expect(1)
            .mount(&server)
            .await;

        let mut document: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(FIXTURE).unwrap()).unwrap();
        document["token_uri"] = json!(format!("{}/token", server.uri()));

        let credentials_path =
            std::env::temp_dir().join(format!("ara-fcm-push-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&credentials_path, document.to_string()).unwrap();

        let settings: Settings = serde_json::from_value(json!({
            "firebase": {
                "project_id": "ara-push-test",
                "credentials_path": credentials_path.to_string_lossy(),
                "api_base_url": format!("{}/v1", server.uri()),
                "request_timeout_seconds": 5
            },
            "delivery": {"batch_policy": "collect_all", "max_concurrency": 4}
        }))
        .unwrap();

        let dispatcher = create_dispatcher(&settings).await.unwrap();
        assert_eq!(dispatcher.policy().as_str(), "collect_all");

        let result = dispatcher
            .send(MessageDescriptor::new().topic("news").title("Hi"), ["x"])
            .await
            .unwrap();
        assert!(result.is_success());

        std::fs::remove_file(credentials_path).ok();
    }

    #[tokio::test]
    async fn test_missing_credentials_file() {
        let settings: Settings = serde_json::from_value(json!({
            "firebase": {
                "project_id": "p",
                "credentials_path": "/nonexistent/credentials.json"
            }
        }))
        .unwrap();

        assert!(matches!(
            create_dispatcher(&settings).await,
            Err(PushError::Auth(_))
        ));
    }
}
