//! restcountries flag directory client
//!
//! `GET {base_url}/{name}?fullText=true` returns a JSON array of matching
//! countries; the first entry's SVG flag (PNG as a fallback) is used.

use crate::{FlagLookupError, Result};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Public restcountries name endpoint
pub const RESTCOUNTRIES_NAME_URL: &str = "https://restcountries.com/v3.1/name/";

/// Resolves a directory name to a flag image URL.
///
/// Implementations report "no such country" as
/// [`FlagLookupError::NotFound`].
pub trait FlagLookup: Send + Sync {
    fn lookup_flag(&self, name: &str) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagClientConfig {
    /// Name endpoint; the country name is appended as a path segment
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_sec: u64,
}

impl Default for FlagClientConfig {
    fn default() -> Self {
        Self {
            base_url: RESTCOUNTRIES_NAME_URL.to_string(),
            timeout_sec: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    #[serde(default)]
    flags: Option<FlagImages>,
}

#[derive(Debug, Deserialize)]
struct FlagImages {
    svg: Option<String>,
    png: Option<String>,
}

/// HTTP client for the flag directory
#[derive(Debug, Clone)]
pub struct FlagClient {
    config: FlagClientConfig,
    client: reqwest::Client,
}

impl FlagClient {
    /// Client for the public restcountries API
    pub fn restcountries() -> Result<Self> {
        Self::new(FlagClientConfig::default())
    }

    pub fn new(config: FlagClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FlagClientConfig {
        &self.config
    }

    /// Full lookup URL for `name`, percent-encoded as one path segment
    pub fn request_url(&self, name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| FlagLookupError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| FlagLookupError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .push(name);
        url.query_pairs_mut().append_pair("fullText", "true");

        Ok(url)
    }
}

impl FlagLookup for FlagClient {
    async fn lookup_flag(&self, name: &str) -> Result<String> {
        let url = self.request_url(name)?;
        debug!("Flag lookup: {}", url);

        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FlagLookupError::NotFound(name.to_string())),
            status if !status.is_success() => return Err(FlagLookupError::Status(status.as_u16())),
            _ => {}
        }

        let body = response.text().await?;
        parse_flag_response(name, &body)
    }
}

/// Extract the flag URL from a directory response body
pub fn parse_flag_response(name: &str, body: &str) -> Result<String> {
    let entries: Vec<CountryEntry> =
        serde_json::from_str(body).map_err(|e| FlagLookupError::Malformed(e.to_string()))?;

    let first = entries
        .into_iter()
        .next()
        .ok_or_else(|| FlagLookupError::NotFound(name.to_string()))?;

    first
        .flags
        .and_then(|f| f.svg.or(f.png))
        .ok_or_else(|| FlagLookupError::Malformed(format!("no flag image for {:?}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port, return the base URL
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}/v3.1/name/", addr)
    }

    fn client_for(base_url: String) -> FlagClient {
        FlagClient::new(FlagClientConfig {
            base_url,
            timeout_sec: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_request_url_encodes_name() {
        let client = FlagClient::restcountries().unwrap();

        let url = client.request_url("United States").unwrap();
        assert_eq!(
            url.as_str(),
            "https://restcountries.com/v3.1/name/United%20States?fullText=true"
        );

        let url = client.request_url("Bosnia/Herzegovina").unwrap();
        assert!(url.path().ends_with("/name/Bosnia%2FHerzegovina"));
    }

    #[test]
    fn test_request_url_without_trailing_slash() {
        let client = client_for("https://flags.example/v3.1/name".to_string());
        let url = client.request_url("Chad").unwrap();
        assert_eq!(url.as_str(), "https://flags.example/v3.1/name/Chad?fullText=true");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = client_for("not a url".to_string());
        assert!(matches!(
            client.request_url("Chad"),
            Err(FlagLookupError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_prefers_svg() {
        let body = r#"[{"name": {"common": "Chile"},
            "flags": {"png": "https://flagcdn.com/w320/cl.png", "svg": "https://flagcdn.com/cl.svg"}}]"#;
        assert_eq!(
            parse_flag_response("Chile", body).unwrap(),
            "https://flagcdn.com/cl.svg"
        );
    }

    #[test]
    fn test_parse_falls_back_to_png() {
        let body = r#"[{"flags": {"png": "https://flagcdn.com/w320/td.png"}}]"#;
        assert_eq!(
            parse_flag_response("Chad", body).unwrap(),
            "https://flagcdn.com/w320/td.png"
        );
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_flag_response("X", "[]"),
            Err(FlagLookupError::NotFound(_))
        ));
        assert!(matches!(
            parse_flag_response("X", r#"[{"name": "X"}]"#),
            Err(FlagLookupError::Malformed(_))
        ));
        assert!(matches!(
            parse_flag_response("X", r#"{"status": 404, "message": "Not Found"}"#),
            Err(FlagLookupError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_against_local_server() {
        let base = serve_once(
            "200 OK",
            r#"[{"flags": {"svg": "https://flagcdn.com/jp.svg"}}]"#,
        )
        .await;

        let url = client_for(base).lookup_flag("Japan").await.unwrap();
        assert_eq!(url, "https://flagcdn.com/jp.svg");
    }

    #[tokio::test]
    async fn test_lookup_not_found_status() {
        let base = serve_once("404 Not Found", r#"{"status": 404, "message": "Not Found"}"#).await;

        let err = client_for(base).lookup_flag("Atlantis").await.unwrap_err();
        assert!(matches!(err, FlagLookupError::NotFound(name) if name == "Atlantis"));
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let base = serve_once("503 Service Unavailable", "{}").await;

        let err = client_for(base).lookup_flag("Japan").await.unwrap_err();
        assert!(matches!(err, FlagLookupError::Status(503)));
    }
}
