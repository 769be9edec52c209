//! Page fetching
//!
//! One GET per run, no retries. The response must be HTML.

use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

/// Content types accepted as HTML pages
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Build the shared HTTP client from the run configuration
pub fn build_client(config: &Config) -> Result<ReqwestClient> {
    let client = ReqwestClient::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Parse a user supplied URL, requiring an http(s) scheme and a host
pub fn parse_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Strip parameters from a content-type header value
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Retrieves raw HTML for a URL
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: ReqwestClient,
}

impl PageFetcher {
    /// Create a fetcher on top of an existing client
    pub fn new(client: ReqwestClient) -> Self {
        Self { client }
    }

    /// Fetch the page body as text
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let fetch_error = |source| Error::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(value) = response.headers().get(CONTENT_TYPE) {
            let content_type = media_type(value.to_str().unwrap_or_default());
            if !HTML_CONTENT_TYPES.contains(&content_type.as_str()) {
                return Err(Error::UnsupportedContentType {
                    url: url.to_string(),
                    content_type,
                });
            }
        }

        let body = response.text().await.map_err(fetch_error)?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> PageFetcher {
        PageFetcher::new(build_client(&Config::default()).unwrap())
    }

    #[test]
    fn test_parse_url() {
        let url = parse_url("https://example.com/page").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));

        assert!(matches!(
            parse_url("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_url("ftp://example.com/file"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("text/HTML; charset=utf-8"), "text/html");
        assert_eq!(media_type("image/png"), "image/png");
        assert_eq!(media_type(""), "");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<h1>Hi</h1>")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/page", server.url())).unwrap();
        let body = fetcher().fetch(&url).await.unwrap();
        assert_eq!(body, "<h1>Hi</h1>");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing", server.url())).unwrap();
        let result = fetcher().fetch(&url).await;
        assert!(matches!(result, Err(Error::Status { status: 404, .. })));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/data.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/data.json", server.url())).unwrap();
        let result = fetcher().fetch(&url).await;
        match result {
            Err(Error::UnsupportedContentType { content_type, .. }) => {
                assert_eq!(content_type, "application/json");
            }
            other => panic!("Expected UnsupportedContentType, got {:?}", other),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let result = fetcher().fetch(&url).await;
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }
}
