//! HTTP transport to the deploy endpoint.

use reqwest::multipart::Form;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use thiserror::Error;

/// Endpoint base used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Errors talking to the deploy endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Server(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Endpoint location and credentials, resolved by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub api_url: Url,
    pub token: Option<String>,
}

impl Session {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, TransportError> {
        Ok(Self {
            api_url: Url::parse(api_url)?,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Web-server configuration report returned alongside a vps deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NginxReport {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Structured body of a deploy response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeployResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub nginx: Option<NginxReport>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

/// Extracts a human-readable reason from an error response body.
fn error_reason(body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    match (parsed.detail, parsed.message) {
        (Some(serde_json::Value::String(detail)), _) => detail,
        (Some(detail), _) if !detail.is_null() => detail.to_string(),
        (_, Some(message)) => message,
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}

/// Client for the `/deploy/` endpoint.
#[derive(Debug, Clone)]
pub struct DeployClient {
    http: Client,
    session: Session,
}

impl DeployClient {
    pub fn new(session: Session) -> Result<Self, TransportError> {
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { http, session })
    }

    pub fn user_agent() -> &'static str {
        concat!("pageship/", env!("CARGO_PKG_VERSION"))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The deploy endpoint, relative to the session's API base.
    pub fn endpoint(&self) -> Result<Url, TransportError> {
        let mut base = self.session.api_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join("deploy/")?)
    }

    /// Posts a multipart deploy form and parses the structured response.
    pub async fn submit(&self, form: Form) -> Result<DeployResponse, TransportError> {
        let url = self.endpoint()?;
        tracing::debug!(%url, "submitting deployment");

        let mut req = self.http.post(url).multipart(form);
        if let Some(token) = &self.session.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        Self::handle(resp).await
    }

    async fn handle(resp: Response) -> Result<DeployResponse, TransportError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let reason = error_reason(&bytes);
            return Err(TransportError::Server(format!("status {status}: {reason}")));
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::InvalidResponse(format!("failed to parse body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(api_url: &str) -> DeployClient {
        DeployClient::new(Session::new(api_url, None).unwrap()).unwrap()
    }

    #[test]
    fn endpoint_keeps_base_path() {
        assert_eq!(
            client("http://localhost:8000/api").endpoint().unwrap().as_str(),
            "http://localhost:8000/api/deploy/"
        );
        assert_eq!(
            client("https://build.test/v1/").endpoint().unwrap().as_str(),
            "https://build.test/v1/deploy/"
        );
        assert_eq!(
            client("https://build.test").endpoint().unwrap().as_str(),
            "https://build.test/deploy/"
        );
    }

    #[test]
    fn blank_token_is_dropped() {
        let session = Session::new(DEFAULT_API_URL, Some("  ".into())).unwrap();
        assert_eq!(session.token, None);
    }

    #[test]
    fn debug_redacts_token() {
        let session = Session::new(DEFAULT_API_URL, Some("sekrit".into())).unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains("sekrit"));
    }

    #[test]
    fn error_reason_prefers_detail() {
        assert_eq!(
            error_reason(br#"{"detail":"bad credentials","message":"x"}"#),
            "bad credentials"
        );
        assert_eq!(error_reason(br#"{"message":"quota exceeded"}"#), "quota exceeded");
        assert_eq!(
            error_reason(br#"{"detail":[{"loc":["host"]}]}"#),
            r#"[{"loc":["host"]}]"#
        );
        assert_eq!(error_reason(b"Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let resp: DeployResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(resp.message, "");
        assert_eq!(resp.url, None);
        assert_eq!(resp.nginx, None);
    }

    #[test]
    fn invalid_api_url() {
        assert!(matches!(
            Session::new("not a url", None),
            Err(TransportError::Url(_))
        ));
    }
}
