//! Document retrieval over HTTP(S) or from a local file.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Credentials;
use crate::error::CliError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Where and how to fetch the document.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions<'a> {
    /// Accept invalid TLS certificates.
    pub ignore_ssl_errors: bool,
    /// Basic auth credentials.
    pub credentials: Option<&'a Credentials>,
}

/// Whether the source is an `http(s)` URL rather than a path.
pub fn is_remote(source: &str) -> bool {
    Url::parse(source).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Fetch and decode the document.
pub async fn fetch_document(source: &str, options: FetchOptions<'_>) -> Result<Value, CliError> {
    let body = if is_remote(source) {
        fetch_remote(source, options).await?
    } else {
        read_local(Path::new(source)).await?
    };
    serde_json::from_str(&body).map_err(|source_err| CliError::Json {
        origin: source.to_string(),
        source: source_err,
    })
}

fn build_client(options: FetchOptions<'_>) -> Result<reqwest::Client, reqwest::Error> {
    if options.ignore_ssl_errors {
        warn!("TLS certificate validation is disabled");
    }
    reqwest::Client::builder()
        .danger_accept_invalid_certs(options.ignore_ssl_errors)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

async fn fetch_remote(url: &str, options: FetchOptions<'_>) -> Result<String, CliError> {
    let http_error = |source| CliError::Http {
        url: url.to_string(),
        source,
    };
    let client = build_client(options).map_err(http_error)?;

    let mut request = client.get(url);
    if let Some(credentials) = options.credentials {
        request = request.basic_auth(&credentials.user, credentials.password.as_deref());
    }

    info!(%url, "Fetching OpenAPI document");
    let response = request.send().await.map_err(http_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Status {
            url: url.to_string(),
            status,
        });
    }
    let body = response.text().await.map_err(http_error)?;
    debug!(%url, bytes = body.len(), "Fetched OpenAPI document");
    Ok(body)
}

async fn read_local(path: &Path) -> Result<String, CliError> {
    info!(path = %path.display(), "Reading OpenAPI document");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const DOC: &str = r#"{ "paths": {}, "components": { "schemas": {} } }"#;

    fn no_auth() -> FetchOptions<'static> {
        FetchOptions {
            ignore_ssl_errors: false,
            credentials: None,
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/openapi.json"));
        assert!(is_remote("http://localhost:8080/v3/api-docs"));
        assert!(!is_remote("specs/openapi.json"));
        assert!(!is_remote("/abs/openapi.json"));
        assert!(!is_remote("file:///abs/openapi.json"));
    }

    #[tokio::test]
    async fn test_fetch_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOC))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Credentials {
            user: "user".into(),
            password: Some("pass".into()),
        };
        let options = FetchOptions {
            ignore_ssl_errors: false,
            credentials: Some(&credentials),
        };
        let doc = fetch_document(&format!("{}/openapi.json", server.uri()), options)
            .await
            .unwrap();
        assert!(doc.get("paths").is_some());
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_document(&format!("{}/missing.json", server.uri()), no_auth())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Status { status, .. } if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn test_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("openapi.json");
        std::fs::write(&file, DOC).unwrap();

        let doc = fetch_document(file.to_str().unwrap(), no_auth()).await.unwrap();
        assert!(doc.get("components").is_some());

        let missing = dir.path().join("absent.json");
        let err = fetch_document(missing.to_str().unwrap(), no_auth())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "openapi: 3.0.0").unwrap();
        let err = fetch_document(file.to_str().unwrap(), no_auth())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Json { .. }));
    }
}
