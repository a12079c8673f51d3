//! Deployment targets and results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default SSH port for self-hosted targets.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default directory the site is unpacked into on a self-hosted target.
pub const DEFAULT_DEPLOY_PATH: &str = "/var/www/my-site";

/// Connection and configuration parameters for a self-hosted server.
///
/// Field names follow the deploy endpoint's form fields, so a profile in the
/// config file reads the same as the request it produces.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VpsTarget {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(rename = "deploy_path", default = "default_deploy_path")]
    pub remote_path: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(rename = "email", default)]
    pub cert_email: Option<String>,
    #[serde(rename = "nginx_config", default)]
    pub configure_proxy: bool,
    #[serde(rename = "enable_ssl", default)]
    pub enable_tls: bool,
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_deploy_path() -> String {
    DEFAULT_DEPLOY_PATH.to_string()
}

/// Error returned when a self-hosted target is missing a required parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTarget(&'static str);

impl InvalidTarget {
    /// Name of the first missing field.
    pub fn field(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for InvalidTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vps target is missing required field '{}'", self.0)
    }
}

impl std::error::Error for InvalidTarget {}

impl VpsTarget {
    /// Creates a target with default port and deploy path.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            username: username.into(),
            password: password.into(),
            remote_path: DEFAULT_DEPLOY_PATH.to_string(),
            domain: None,
            cert_email: None,
            configure_proxy: false,
            enable_tls: false,
        }
    }

    /// Checks that host, username, password and deploy path are present.
    pub fn validate(&self) -> Result<(), InvalidTarget> {
        let required = [
            ("host", &self.host),
            ("username", &self.username),
            ("password", &self.password),
            ("deploy_path", &self.remote_path),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(InvalidTarget(name)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for VpsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VpsTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remote_path", &self.remote_path)
            .field("domain", &self.domain)
            .field("cert_email", &self.cert_email)
            .field("configure_proxy", &self.configure_proxy)
            .field("enable_tls", &self.enable_tls)
            .finish()
    }
}

/// Where a bundle is deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    /// A caller-supplied server.
    Vps(VpsTarget),
    /// The builder's own hosting; the remote side resolves everything.
    Managed,
}

impl DeployTarget {
    /// The `deploy_type` discriminator sent to the endpoint.
    pub fn deploy_type(&self) -> &'static str {
        match self {
            DeployTarget::Vps(_) => "vps",
            DeployTarget::Managed => "builder_vps",
        }
    }
}

/// Identifier of the saved project a deployment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectRef(u64);

impl ProjectRef {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniform outcome of a deploy action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DeployResult {
    pub fn succeeded(message: impl Into<String>, url: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            url,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            url: None,
        }
    }
}
