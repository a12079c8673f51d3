//! Handler for the `targets` command.

use anyhow::Result;

use crate::cli::TargetsArgs;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat, TargetListing};

/// Saved targets in name order.
pub fn target_listings(config: &Config) -> Vec<TargetListing> {
    let default = config.default_target.as_deref();
    config
        .targets
        .iter()
        .map(|(name, target)| TargetListing {
            name: name.clone(),
            host: target.host.clone(),
            port: target.port,
            username: target.username.clone(),
            deploy_path: target.remote_path.clone(),
            domain: target.domain.clone(),
            default: Some(name.as_str()) == default,
        })
        .collect()
}

/// Handle the targets command - list saved deploy targets.
pub fn handle_targets(args: &TargetsArgs, config: &Config) -> Result<()> {
    let listings = target_listings(config);

    match args.format {
        OutputFormat::Human => {
            if listings.is_empty() {
                println!("No targets configured.");
                println!();
                println!("Add targets to your config file ({}):", Config::config_path().display());
                println!();
                println!("  [targets.prod]");
                println!("  host = \"203.0.113.10\"");
                println!("  username = \"deploy\"");
                println!("  password = \"...\"");
                println!();
                println!("  # Optional: deploy here when no target is given");
                println!("  default_target = \"prod\"");
            } else {
                for listing in &listings {
                    let marker = if listing.default { " (default)" } else { "" };
                    println!(
                        "{}{}: {}@{}:{} -> {}",
                        listing.name,
                        marker,
                        listing.username,
                        listing.host,
                        listing.port,
                        listing.deploy_path
                    );
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", Output::new(&listings).to_json()?);
        }
        OutputFormat::Paths => {
            for listing in &listings {
                println!("{}", listing.name);
            }
        }
    }

    Ok(())
}
