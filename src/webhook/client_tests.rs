//! Tests for `ReqwestClient` against a local mock server.

use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{HttpClient, HttpError, HttpRequest, JSON_CONTENT_TYPE, ReqwestClient};

fn url_for(server: &MockServer, route: &str) -> url::Url {
    url::Url::parse(&format!("{}{route}", server.uri())).unwrap()
}

mod construction {
    use super::*;

    #[test]
    fn default_creates_same_as_new() {
        let debug_new = format!("{:?}", ReqwestClient::new());
        let debug_default = format!("{:?}", ReqwestClient::default());

        assert!(debug_new.contains("ReqwestClient"));
        assert!(debug_default.contains("ReqwestClient"));
    }

    #[test]
    fn with_timeouts_builds_client() {
        let client = ReqwestClient::with_timeouts(Duration::from_secs(30), Duration::from_secs(5));

        assert!(client.is_ok());
    }

    #[test]
    fn from_client_accepts_custom_client() {
        let custom = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();
        let client = ReqwestClient::from_client(custom);

        let _ = format!("{client:?}");
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestClient>();
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn forwards_method_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(header("content-type", JSON_CONTENT_TYPE))
            .and(body_string(r#"{"status":"ok"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let request = HttpRequest::post(url_for(&server, "/webhook"))
            .with_content_type(JSON_CONTENT_TYPE)
            .with_body(br#"{"status":"ok"}"#.to_vec());
        let response = ReqwestClient::new().request(request).await.unwrap();

        assert_eq!(response.status, http::StatusCode::OK);
        assert_eq!(response.body_text(), Some(r#"{"ok":true}"#));
    }

    #[tokio::test]
    async fn error_status_is_returned_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let response = ReqwestClient::new()
            .request(HttpRequest::post(url_for(&server, "/webhook")))
            .await
            .unwrap();

        assert_eq!(response.status, http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body_text(), Some("maintenance"));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client =
            ReqwestClient::with_timeouts(Duration::from_millis(100), Duration::from_secs(1))
                .unwrap();
        let result = client
            .request(HttpRequest::post(url_for(&server, "/webhook")))
            .await;

        assert!(matches!(result, Err(HttpError::Timeout)));
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        // Start and drop a server so its port is very likely closed.
        let url = {
            let server = MockServer::start().await;
            url_for(&server, "/webhook")
        };

        let result = ReqwestClient::new().request(HttpRequest::post(url)).await;

        match result {
            Err(HttpError::Connection(_)) => {}
            Ok(resp) if !resp.is_success() => {} // proxy answered instead
            other => panic!("Expected connection error, got {other:?}"),
        }
    }
}
