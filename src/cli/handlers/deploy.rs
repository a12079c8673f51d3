//! Handler for the `deploy` command.

use anyhow::{Context, Result, bail};

use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat};
use crate::cli::{DeployArgs, VpsArgs};
use crate::deploy::DeployClient;
use crate::domain::{DeployResult, DeployTarget, ProjectRef, VpsTarget};
use crate::export::pipeline;

use super::{document_shell, file_source};

fn apply_overrides(target: &mut VpsTarget, args: &VpsArgs) {
    if let Some(host) = &args.host {
        target.host = host.clone();
    }
    if let Some(port) = args.port {
        target.port = port;
    }
    if let Some(username) = &args.username {
        target.username = username.clone();
    }
    if let Some(password) = &args.password {
        target.password = password.clone();
    }
    if let Some(path) = &args.deploy_path {
        target.remote_path = path.clone();
    }
    if let Some(domain) = &args.domain {
        target.domain = Some(domain.clone());
    }
    if let Some(email) = &args.email {
        target.cert_email = Some(email.clone());
    }
    if args.nginx_config {
        target.configure_proxy = true;
    }
    if args.enable_ssl {
        target.enable_tls = true;
    }
}

/// Decide where to deploy.
///
/// Precedence order:
/// 1. `--managed`
/// 2. `--target NAME` (saved profile, flags override its fields)
/// 3. `--host` and friends
/// 4. Config file `default_target`
pub fn resolve_target(args: &DeployArgs, config: &Config) -> Result<DeployTarget> {
    if args.managed {
        return Ok(DeployTarget::Managed);
    }

    let saved = match (&args.target, &args.vps.host) {
        (Some(name), _) => Some(config.target(name)?.clone()),
        (None, Some(_)) => None,
        (None, None) => match &config.default_target {
            Some(name) => Some(
                config
                    .target(name)
                    .context("config default_target is invalid")?
                    .clone(),
            ),
            None => bail!("no deploy target given (see --managed, --target and --host)"),
        },
    };

    let mut vps = saved.unwrap_or_else(|| VpsTarget::new("", "", ""));
    apply_overrides(&mut vps, &args.vps);
    Ok(DeployTarget::Vps(vps))
}

/// Handle the `deploy` command.
///
/// Exits unsuccessfully when the deployment result is unsuccessful.
pub async fn handle_deploy(args: &DeployArgs, config: &Config) -> Result<()> {
    let target = resolve_target(args, config)?;
    let session = config.session(args.api_url.as_deref(), args.token.as_deref())?;
    tracing::debug!(?session, deploy_type = target.deploy_type(), "resolved deploy session");
    let client = DeployClient::new(session).context("failed to build HTTP client")?;

    let source = file_source(&args.source);
    let shell = document_shell(&args.source)?;
    let prepared = pipeline::site_bundle(&source, &shell)?;

    let project = args.project_id.map(ProjectRef::new);
    let result = prepared.transmit(&client, &target, project).await;

    print_result(args.format, &result)?;
    if !result.success {
        bail!("deployment failed: {}", result.message);
    }
    Ok(())
}

/// Print the result in the requested format.
fn print_result(format: OutputFormat, result: &DeployResult) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if result.success {
                println!("{}", result.message);
                if let Some(url) = &result.url {
                    println!("Live at {}", url);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", Output::new(result).to_json()?);
        }
        OutputFormat::Paths => {
            if let Some(url) = &result.url {
                println!("{}", url);
            }
        }
    }
    Ok(())
}
