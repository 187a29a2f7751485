use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use urlindex_client::{
    AccessTokenProvider, GoogleIndexingClient, IndexingClient, IndexingError, NotificationType,
    ServiceAccountAuth, StaticToken,
};

const TEST_KEY: &str = include_str!("fixtures/test_key.pem");

const PUBLISH_PATH: &str = "/v3/urlNotifications:publish";

fn client_for(server: &ServerGuard) -> GoogleIndexingClient {
    GoogleIndexingClient::builder()
        .auth(Arc::new(StaticToken::new("test-token")))
        .base_url(server.url())
        .build()
        .unwrap()
}

fn write_key_file(token_uri: &str) -> tempfile::NamedTempFile {
    let key = json!({
        "type": "service_account",
        "project_id": "demo-project",
        "private_key_id": "key-1",
        "private_key": TEST_KEY,
        "client_email": "indexer@demo-project.iam.gserviceaccount.com",
        "client_id": "1234567890",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": token_uri,
        "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
        "client_x509_cert_url": "https://www.googleapis.com/robot/v1/metadata/x509/indexer"
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(key.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_publish_sends_notification_with_bearer_token() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", PUBLISH_PATH)
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(json!({"url": "https://a.test/1", "type": "URL_UPDATED"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "urlNotificationMetadata": {
                    "url": "https://a.test/1",
                    "latestUpdate": {
                        "url": "https://a.test/1",
                        "type": "URL_UPDATED",
                        "notifyTime": "2024-01-01T00:00:00.000Z"
                    }
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .publish("https://a.test/1", NotificationType::UrlUpdated)
        .await
        .unwrap();

    assert_eq!(response["urlNotificationMetadata"]["url"], "https://a.test/1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_publish_delete_notification() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", PUBLISH_PATH)
        .match_body(Matcher::Json(json!({"url": "https://a.test/gone", "type": "URL_DELETED"})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    client
        .publish("https://a.test/gone", NotificationType::UrlDeleted)
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_message_is_extracted() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", PUBLISH_PATH)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "code": 403,
                    "message": "Permission denied. Failed to verify the URL ownership.",
                    "status": "PERMISSION_DENIED"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .publish("https://a.test/1", NotificationType::UrlUpdated)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(
        err.describe(),
        "Permission denied. Failed to verify the URL ownership."
    );
}

#[tokio::test]
async fn test_api_error_without_body_uses_status_text() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", PUBLISH_PATH)
        .with_status(429)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .publish("https://a.test/1", NotificationType::UrlUpdated)
        .await
        .unwrap_err();

    assert!(matches!(err, IndexingError::Api { status: 429, .. }));
    assert_eq!(err.describe(), "Too Many Requests");
}

#[tokio::test]
async fn test_get_metadata_passes_url_query() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/v3/urlNotifications/metadata")
        .match_query(Matcher::UrlEncoded("url".into(), "https://a.test/1?x=1".into()))
        .with_status(200)
        .with_body(json!({"url": "https://a.test/1?x=1"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let metadata = client.get_metadata("https://a.test/1?x=1").await.unwrap();

    assert_eq!(metadata["url"], "https://a.test/1?x=1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_account_token_is_exchanged_once_and_cached() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer".into(),
            ),
            Matcher::Regex("assertion=".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "access_token": "minted-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let publish_mock = server
        .mock("POST", PUBLISH_PATH)
        .match_header("authorization", "Bearer minted-token")
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;

    let key_file = write_key_file(&format!("{}/token", server.url()));
    let auth = Arc::new(ServiceAccountAuth::from_path(key_file.path()));

    assert!(auth.check_setup().await.is_valid);

    let client = GoogleIndexingClient::builder()
        .auth(auth.clone())
        .base_url(server.url())
        .build()
        .unwrap();

    client
        .publish("https://a.test/1", NotificationType::UrlUpdated)
        .await
        .unwrap();
    client
        .publish("https://a.test/2", NotificationType::UrlUpdated)
        .await
        .unwrap();

    assert_eq!(auth.access_token().await.unwrap(), "minted-token");

    token_mock.assert_async().await;
    publish_mock.assert_async().await;
}

#[tokio::test]
async fn test_token_endpoint_rejection_is_auth_error() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(
            json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })
            .to_string(),
        )
        .create_async()
        .await;

    let key_file = write_key_file(&format!("{}/token", server.url()));
    let auth = ServiceAccountAuth::from_path(key_file.path());

    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, IndexingError::Auth(_)));
    assert_eq!(
        err.describe(),
        "Authentication failed: invalid_grant: Invalid JWT Signature."
    );
}

#[tokio::test]
async fn test_stalled_token_endpoint_gives_up() {
    // Accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let key_file = write_key_file(&format!("http://{}/token", addr));
    let auth = ServiceAccountAuth::from_path(key_file.path())
        .with_timeout(Duration::from_millis(200));

    let first = tokio::time::timeout(Duration::from_secs(5), auth.access_token())
        .await
        .expect("token request should time out");
    assert!(matches!(first, Err(IndexingError::Http(_))));

    // The cache lock is released, so a later caller fails the same way
    let second = tokio::time::timeout(Duration::from_secs(5), auth.access_token())
        .await
        .expect("second token request should time out");
    assert!(second.is_err());
}

#[tokio::test]
async fn test_missing_credentials_fail_publish_without_remote_call() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", PUBLISH_PATH)
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let auth = Arc::new(ServiceAccountAuth::from_path("/nonexistent/service_account.json"));
    let client = GoogleIndexingClient::builder()
        .auth(auth)
        .base_url(server.url())
        .build()
        .unwrap();

    let err = client
        .publish("https://a.test/1", NotificationType::UrlUpdated)
        .await
        .unwrap_err();

    assert!(matches!(err, IndexingError::Credentials(_)));
    assert!(err.describe().contains("Service account file not found"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparsable_key_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();

    let auth = ServiceAccountAuth::from_path(file.path());
    let status = auth.check_setup().await;

    assert!(!status.is_valid);
    assert!(status
        .error
        .unwrap()
        .starts_with("Failed to read or parse service account file"));
}
