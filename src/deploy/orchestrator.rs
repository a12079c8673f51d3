use thiserror::Error;

use super::client::{DeployClient, DeployResponse, TransportError};
use super::form::{build_form, form_fields};
use crate::domain::{Bundle, DeployResult, DeployTarget, InvalidTarget, ProjectRef};
use crate::export::{ArchiveError, build_site_archive};

/// Everything that can stop a deployment before a result comes back.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),

    #[error("failed to build site archive: {0}")]
    Archive(#[from] ArchiveError),

    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to build deploy form: {0}")]
    Form(#[source] reqwest::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Packages `bundle`, submits it for `target`, and reports the outcome.
///
/// Never returns an error: validation, archive, network and server failures
/// all come back as `success == false` with a message.
pub async fn deploy(
    client: &DeployClient,
    bundle: Bundle,
    target: &DeployTarget,
    project: Option<ProjectRef>,
) -> DeployResult {
    match try_deploy(client, bundle, target, project).await {
        Ok(response) => interpret(response),
        Err(err) => {
            tracing::warn!(error = %err, deploy_type = target.deploy_type(), "deployment failed");
            DeployResult::failed(err.to_string())
        }
    }
}

async fn try_deploy(
    client: &DeployClient,
    bundle: Bundle,
    target: &DeployTarget,
    project: Option<ProjectRef>,
) -> Result<DeployResponse, DeployError> {
    if let DeployTarget::Vps(vps) = target {
        vps.validate()?;
    }

    let archive = tokio::task::spawn_blocking(move || build_site_archive(&bundle)).await??;
    tracing::info!(
        bytes = archive.len(),
        deploy_type = target.deploy_type(),
        "transmitting site archive"
    );

    let form = build_form(archive, form_fields(target, project)).map_err(DeployError::Form)?;
    Ok(client.submit(form).await?)
}

fn interpret(response: DeployResponse) -> DeployResult {
    if let Some(nginx) = &response.nginx {
        if nginx.success {
            tracing::info!(message = %nginx.message, "web server configured");
        } else {
            tracing::warn!(message = %nginx.message, "web server configuration failed");
        }
    }

    if response.success {
        let message = if response.message.is_empty() {
            "Deployment successful".to_string()
        } else {
            response.message
        };
        tracing::info!(url = response.url.as_deref().unwrap_or("-"), "deployment succeeded");
        DeployResult::succeeded(message, response.url)
    } else {
        let message = if response.message.is_empty() {
            "Deployment failed".to_string()
        } else {
            response.message
        };
        tracing::warn!(%message, "deployment rejected");
        DeployResult::failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::Session;
    use crate::domain::{AssetMap, VpsTarget};
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn bundle() -> Bundle {
        Bundle::new("<html></html>".into(), "p{}".into(), AssetMap::new())
    }

    fn client(api_url: &str, token: Option<&str>) -> DeployClient {
        DeployClient::new(Session::new(api_url, token.map(str::to_string)).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn managed_deploy_succeeds() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/deploy/")
                    .header("authorization", "Bearer t0ken")
                    .body_includes(r#"name="site_zip"; filename="site.zip""#)
                    .body_includes(r#"name="deploy_type""#)
                    .body_includes("builder_vps")
                    .body_includes(r#"name="project_id""#)
                    .body_excludes(r#"name="host""#)
                    .body_excludes(r#"name="password""#);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"success":true,"message":"Deployed","url":"https://site.test"}"#);
            })
            .await;

        let client = client(&server.url("/api"), Some("t0ken"));
        let project = Some(ProjectRef::new(7));
        let result = deploy(&client, bundle(), &DeployTarget::Managed, project).await;

        mock.assert_async().await;
        assert_eq!(
            result,
            DeployResult::succeeded("Deployed", Some("https://site.test".into()))
        );
    }

    #[tokio::test]
    async fn vps_deploy_sends_connection_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/deploy/")
                    .body_includes(r#"name="site_zip"; filename="site.zip""#)
                    .body_includes(r#"name="deploy_type""#)
                    .body_includes(r#"name="host""#)
                    .body_includes("203.0.113.10")
                    .body_includes(r#"name="password""#)
                    .body_includes("hunter2")
                    .body_includes(r#"name="deploy_path""#)
                    .body_includes(r#"name="nginx_config""#)
                    .body_includes(r#"name="enable_ssl""#)
                    .body_excludes("builder_vps")
                    .body_excludes(r#"name="domain""#)
                    .body_excludes(r#"name="email""#);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"success":true,"message":"Deployed to vps"}"#);
            })
            .await;

        let client = client(&server.url("/api"), None);
        let vps = VpsTarget::new("203.0.113.10", "deploy", "hunter2");
        let result = deploy(&client, bundle(), &DeployTarget::Vps(vps), None).await;

        mock.assert_async().await;
        assert_eq!(result, DeployResult::succeeded("Deployed to vps", None));
    }

    #[tokio::test]
    async fn server_error_detail_becomes_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/deploy/");
                then.status(500)
                    .header("content-type", "application/json")
                    .body(r#"{"detail":"SSH authentication failed"}"#);
            })
            .await;

        let client = client(&server.url("/api"), None);
        let vps = VpsTarget::new("203.0.113.10", "deploy", "pw");
        let result = deploy(&client, bundle(), &DeployTarget::Vps(vps), None).await;

        assert!(!result.success);
        assert!(result.message.contains("SSH authentication failed"));
        assert_eq!(result.url, None);
    }

    #[tokio::test]
    async fn unsuccessful_structured_response_is_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/deploy/");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"success":false,"message":"Disk full","nginx":{"success":false,"message":"skipped"}}"#);
            })
            .await;

        let client = client(&server.url("/api"), None);
        let result = deploy(&client, bundle(), &DeployTarget::Managed, None).await;

        assert_eq!(result, DeployResult::failed("Disk full"));
    }

    #[tokio::test]
    async fn malformed_response_is_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/deploy/");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let client = client(&server.url("/api"), None);
        let result = deploy(&client, bundle(), &DeployTarget::Managed, None).await;

        assert!(!result.success);
        assert!(result.message.contains("failed to parse body"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_normalized() {
        let client = client("http://127.0.0.1:1/api", None);
        let result = deploy(&client, bundle(), &DeployTarget::Managed, None).await;

        assert!(!result.success);
        assert!(!result.message.is_empty());
        assert_eq!(result.url, None);
    }

    #[tokio::test]
    async fn invalid_vps_is_rejected_before_transmission() {
        let client = client("http://127.0.0.1:1/api", None);
        let vps = VpsTarget::new("203.0.113.10", "deploy", "");
        let result = deploy(&client, bundle(), &DeployTarget::Vps(vps), None).await;

        assert!(!result.success);
        assert!(result.message.contains("password"));
    }

    #[test]
    fn empty_messages_get_defaults() {
        let ok = interpret(DeployResponse {
            success: true,
            message: String::new(),
            url: None,
            nginx: None,
        });
        assert_eq!(ok.message, "Deployment successful");

        let failed = interpret(DeployResponse {
            success: false,
            message: String::new(),
            url: Some("ignored".into()),
            nginx: None,
        });
        assert_eq!(failed, DeployResult::failed("Deployment failed"));
    }
}
