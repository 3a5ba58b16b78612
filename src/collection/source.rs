//! Where collections get their data from
//!
//! `RecordSource` is the fetch seam: `HttpSource` talks to the REST API with
//! reqwest, tests plug in an in-memory source.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;

use super::error::{CollectionError, CollectionResult};

/// Produces the raw JSON elements backing a collection URL.
pub trait RecordSource: Send + Sync {
    fn fetch_raw(
        &self,
        url: &Url,
    ) -> impl Future<Output = CollectionResult<Vec<serde_json::Value>>> + Send;
}

/// HTTP-backed source for REST list endpoints
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new HTTP source
    pub fn new(timeout: Duration, auth_header: Option<&str>) -> CollectionResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(value) = auth_header {
            let mut value = HeaderValue::from_str(value)
                .map_err(|e| CollectionError::Config(format!("Invalid auth header: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CollectionError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl RecordSource for HttpSource {
    async fn fetch_raw(&self, url: &Url) -> CollectionResult<Vec<serde_json::Value>> {
        tracing::debug!("GET {}", url);

        let resp = self.client.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CollectionError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CollectionError::UnexpectedShape(format!("Invalid JSON body: {}", e)))?;

        records_from_body(body)
    }
}

/// Extract the list of raw records from a response body.
///
/// Accepts a bare JSON array or a paginated envelope with a `results` array.
pub fn records_from_body(body: serde_json::Value) -> CollectionResult<Vec<serde_json::Value>> {
    match body {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(CollectionError::UnexpectedShape(
                "object without a `results` array".into(),
            )),
        },
        other => Err(CollectionError::UnexpectedShape(format!(
            "expected a list, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// In-memory source returning queued responses in order
    #[derive(Clone, Default)]
    pub(crate) struct StaticSource {
        responses: Arc<Mutex<Vec<CollectionResult<Vec<serde_json::Value>>>>>,
        pub(crate) requested: Arc<Mutex<Vec<String>>>,
    }

    impl StaticSource {
        pub(crate) fn push(&self, response: CollectionResult<Vec<serde_json::Value>>) {
            self.responses.lock().unwrap().push(response);
        }
    }

    impl RecordSource for StaticSource {
        async fn fetch_raw(&self, url: &Url) -> CollectionResult<Vec<serde_json::Value>> {
            self.requested.lock().unwrap().push(url.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(Vec::new());
            }
            responses.remove(0)
        }
    }

    /// Serve one canned HTTP response; yields the raw request text
    pub(crate) async fn serve_once(
        status_line: &'static str,
        body: String,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        (url, handle)
    }

    #[test]
    fn test_records_from_array() {
        let items = records_from_body(serde_json::json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_records_from_envelope() {
        let body = serde_json::json!({"count": 1, "next": null, "results": [{"id": 1}]});
        let items = records_from_body(body).unwrap();
        assert_eq!(items, vec![serde_json::json!({"id": 1})]);
    }

    #[test]
    fn test_records_from_bad_shape() {
        let err = records_from_body(serde_json::json!({"detail": "nope"})).unwrap_err();
        assert!(matches!(err, CollectionError::UnexpectedShape(_)));

        let err = records_from_body(serde_json::json!("text")).unwrap_err();
        assert_eq!(
            err,
            CollectionError::UnexpectedShape("expected a list, got a string".into())
        );
    }

    #[test]
    fn test_invalid_auth_header() {
        let err = HttpSource::new(Duration::from_secs(1), Some("bad\nvalue"));
        assert!(matches!(err, Err(CollectionError::Config(_))));
    }

    #[tokio::test]
    async fn test_http_fetch_sends_headers() {
        let (base, server) = serve_once("200 OK", r#"[{"id": 3}]"#.to_string()).await;
        let url = base.join("/api/items/").unwrap();

        let source = HttpSource::new(Duration::from_secs(5), Some("JWT token-123")).unwrap();
        let items = source.fetch_raw(&url).await.unwrap();
        assert_eq!(items, vec![serde_json::json!({"id": 3})]);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/items/ http/1.1"));
        assert!(request.contains("accept: application/json"));
        assert!(request.contains("authorization: jwt token-123"));
    }

    #[tokio::test]
    async fn test_http_fetch_status_error() {
        let (base, server) = serve_once("403 Forbidden", r#"{"detail": "denied"}"#.to_string()).await;

        let source = HttpSource::new(Duration::from_secs(5), None).unwrap();
        let err = source.fetch_raw(&base).await.unwrap_err();
        server.await.unwrap();

        match err {
            CollectionError::Status { status, url } => {
                assert_eq!(status, 403);
                assert_eq!(url, base.to_string());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
