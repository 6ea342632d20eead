//! End-to-end delivery against a local webhook.

use std::collections::HashMap;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use jira_notify::notify::{Notifier, SendStatus};
use jira_notify::site::{Credentials, SiteConfig, SiteRegistry};
use jira_notify::webhook::token::{AUDIENCE, ISSUER};
use jira_notify::webhook::{
    ErrorKind, JWT_CONTENT_TYPE, ReqwestClient, RetryPolicy, WebhookClaims, WebhookClient,
};

fn webhook_url(server: &MockServer) -> url::Url {
    url::Url::parse(&format!("{}/webhook", server.uri())).unwrap()
}

fn client() -> WebhookClient<ReqwestClient> {
    let http = ReqwestClient::with_timeouts(Duration::from_secs(5), Duration::from_secs(2)).unwrap();
    WebhookClient::new(http)
}

fn decode_claims(token: &str, secret: &str) -> WebhookClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);

    jsonwebtoken::decode::<WebhookClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .unwrap()
    .claims
}

fn only_request(requests: &[Request]) -> &Request {
    assert_eq!(requests.len(), 1);
    &requests[0]
}

#[tokio::test]
async fn signed_delivery_carries_payload_in_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(header("content-type", JWT_CONTENT_TYPE))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"acceptedBuilds":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let reply: Value = client()
        .send_signed(&webhook_url(&server), "s3cr3t", &json!({"status": "ok"}))
        .await
        .unwrap();

    assert_eq!(reply, json!({"acceptedBuilds": []}));

    let requests = server.received_requests().await.unwrap();
    let token = std::str::from_utf8(&only_request(&requests).body).unwrap();
    assert_eq!(token.split('.').count(), 3);

    let claims = decode_claims(token, "s3cr3t");
    assert_eq!(claims.exp - claims.iat, 300);
    let body: Value = serde_json::from_str(&claims.request_body_json).unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn unsigned_delivery_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook"))
        .and(body_json(json!({"status": "ok"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let reply: Value = client()
        .send(&webhook_url(&server), &json!({"status": "ok"}))
        .await
        .unwrap();

    assert_eq!(reply, json!({}));
}

#[tokio::test]
async fn error_status_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client()
        .send::<_, Value>(&webhook_url(&server), &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
}

#[tokio::test]
async fn empty_body_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = client()
        .send::<_, Value>(&webhook_url(&server), &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
}

#[tokio::test]
async fn notifier_redelivers_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"acceptedDeployments":[{"pipelineId":"p"}]}"#),
        )
        .mount(&server)
        .await;

    let site = SiteConfig {
        site: "example.atlassian.net".to_string(),
        webhook_url: webhook_url(&server),
        credentials_id: Some("jira".to_string()),
    };
    let credentials =
        Credentials::new(HashMap::from([("jira".to_string(), "s3cr3t".to_string())]))
            .without_env();
    let notifier = Notifier::new(client(), SiteRegistry::new(vec![site]), credentials)
        .with_retry_policy(
            RetryPolicy::new()
                .with_max_attempts(2)
                .with_initial_delay(Duration::from_millis(10)),
        );

    let response = notifier
        .send_deployment(None, &json!({"deployments": []}))
        .await;

    assert_eq!(response.status, SendStatus::SuccessDeploymentAccepted);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
