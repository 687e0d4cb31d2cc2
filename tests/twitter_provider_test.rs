// TwitterProvider against a mock Twitter API
use serde_json::json;
use twitter_auth::oauth::{
    ClientCredentials, IdentityProvider, ProviderError, TemporaryCredentials, TokenCredentials,
    TwitterProvider,
};
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK: &str = "https://forum.example.com/auth/twitter";

fn client() -> ClientCredentials {
    ClientCredentials {
        identifier: "consumer-key".to_string(),
        secret: "consumer-secret".to_string(),
        callback_uri: CALLBACK.to_string(),
    }
}

fn provider(server: &MockServer) -> TwitterProvider {
    TwitterProvider::with_base_url(&server.uri()).expect("provider")
}

fn authorization_header(request: &wiremock::Request) -> String {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .expect("authorization header")
        .to_string()
}

#[tokio::test]
async fn temporary_credentials_are_signed_with_callback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=tmp-token&oauth_token_secret=tmp-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let temporary = provider(&server)
        .temporary_credentials(&client())
        .await
        .expect("temporary credentials");
    assert_eq!(temporary, TemporaryCredentials::new("tmp-token", "tmp-secret"));

    let requests = server.received_requests().await.expect("recorded requests");
    let header = authorization_header(&requests[0]);
    assert!(header.starts_with("OAuth "));
    assert!(header.contains(r#"oauth_callback="https%3A%2F%2Fforum.example.com%2Fauth%2Ftwitter""#));
    assert!(header.contains(r#"oauth_consumer_key="consumer-key""#));
    assert!(header.contains(r#"oauth_signature_method="HMAC-SHA1""#));
    assert!(!header.contains("oauth_token="));
}

#[tokio::test]
async fn unconfirmed_callback_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=tmp-token&oauth_token_secret=tmp-secret"),
        )
        .mount(&server)
        .await;

    let result = provider(&server).temporary_credentials(&client()).await;
    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
}

#[tokio::test]
async fn rejected_consumer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"errors":[{"code":32,"message":"Could not authenticate you."}]}"#,
        ))
        .mount(&server)
        .await;

    let result = provider(&server).temporary_credentials(&client()).await;
    match result {
        Err(ProviderError::Rejected(message)) => {
            assert!(message.contains("401"));
            assert!(message.contains("Could not authenticate you."));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn token_exchange_sends_verifier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string_contains("oauth_verifier=ver456"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=access-token&oauth_token_secret=access-secret&user_id=42&screen_name=alice",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let token = provider(&server)
        .token_credentials(&client(), &TemporaryCredentials::new("tok123", "tmp-secret"), "ver456")
        .await
        .expect("token credentials");
    assert_eq!(token.identifier, "access-token");
    assert_eq!(token.secret, "access-secret");

    let requests = server.received_requests().await.expect("recorded requests");
    let header = authorization_header(&requests[0]);
    assert!(header.contains(r#"oauth_token="tok123""#));
    assert!(!header.contains("oauth_callback="));
}

#[tokio::test]
async fn token_exchange_errors_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid oauth_verifier parameter"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let temporary = TemporaryCredentials::new("tok123", "tmp-secret");

    let rejected = provider.token_credentials(&client(), &temporary, "ver456").await;
    assert!(matches!(rejected, Err(ProviderError::Rejected(_))));

    let unavailable = provider.token_credentials(&client(), &temporary, "ver456").await;
    assert!(matches!(unavailable, Err(ProviderError::Communication(_))));
}

#[tokio::test]
async fn profile_is_mapped_from_verify_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "id_str": "42",
            "screen_name": "alice",
            "name": "Alice",
            "profile_image_url": "https://img/x_normal.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = TokenCredentials {
        identifier: "access-token".to_string(),
        secret: "access-secret".to_string(),
    };
    let profile = provider(&server)
        .fetch_profile(&client(), &token)
        .await
        .expect("profile");

    assert_eq!(profile.uid, "42");
    assert_eq!(profile.nickname, "alice");
    assert_eq!(profile.image_url.as_deref(), Some("https://img/x_normal.png"));
}

#[tokio::test]
async fn malformed_profile_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let token = TokenCredentials {
        identifier: "access-token".to_string(),
        secret: "access-secret".to_string(),
    };
    let result = provider(&server).fetch_profile(&client(), &token).await;
    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
}

#[tokio::test]
async fn unreachable_provider_is_communication_error() {
    // Nothing listens on port 1
    let provider = TwitterProvider::with_base_url("http://127.0.0.1:1").expect("provider");

    let result = provider.temporary_credentials(&client()).await;
    assert!(matches!(result, Err(ProviderError::Communication(_))));
}
