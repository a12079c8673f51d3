//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use url::Url;

use output::OutputFormat;

/// pageship - format, bundle and deploy single-page sites
#[derive(Parser, Debug)]
#[command(name = "pageship", version, about, long_about = None)]
pub struct Cli {
    /// Config file (overrides the default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a markup or stylesheet file in canonical form
    Format(FormatArgs),

    /// Export a page as source files, a bundle, an archive or a single file
    Export(ExportArgs),

    /// Package a page and submit it to the deploy endpoint
    Deploy(DeployArgs),

    /// List saved deploy targets
    Targets(TargetsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Kind of text handled by `format`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceLang {
    /// HTML markup
    Markup,
    /// CSS rules
    Styles,
}

/// Arguments for the `format` command
#[derive(Parser, Debug)]
pub struct FormatArgs {
    /// File to format
    pub file: PathBuf,

    /// Treat the file as markup or styles (default: from the extension)
    #[arg(long, value_enum)]
    pub lang: Option<SourceLang>,
}

/// Page input shared by `export` and `deploy`
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Markup file
    #[arg(long)]
    pub markup: PathBuf,

    /// Stylesheet file
    #[arg(long)]
    pub styles: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    pub title: Option<String>,

    /// Document language
    #[arg(long = "page-lang")]
    pub page_lang: Option<String>,

    /// Custom document shell template
    #[arg(long)]
    pub template: Option<PathBuf>,
}

/// What `export` produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportMode {
    /// Formatted index.html and styles.css
    #[default]
    Files,
    /// Formatted index.html and styles.css in export.zip
    Archive,
    /// Deployable bundle with extracted images, as a directory
    Bundle,
    /// Deployable bundle with extracted images, as site.zip
    BundleArchive,
    /// One HTML file with remote assets and styles embedded
    SingleFile,
}

/// Arguments for the `export` command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory, or file for archive and single-file modes
    #[arg(short, long)]
    pub output: PathBuf,

    /// Export mode
    #[arg(short, long, value_enum, default_value_t = ExportMode::Files)]
    pub mode: ExportMode,

    /// Base URL for relative references (single-file mode)
    #[arg(long)]
    pub base_url: Option<Url>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Connection parameters for a self-hosted target
#[derive(Args, Debug, Default)]
pub struct VpsArgs {
    /// Server host
    #[arg(long)]
    pub host: Option<String>,

    /// SSH port [default: 22]
    #[arg(long)]
    pub port: Option<u16>,

    /// SSH user
    #[arg(long)]
    pub username: Option<String>,

    /// SSH password
    #[arg(long, env = "PAGESHIP_VPS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Directory the site is unpacked into [default: /var/www/my-site]
    #[arg(long)]
    pub deploy_path: Option<String>,

    /// Domain served by the site
    #[arg(long)]
    pub domain: Option<String>,

    /// Email for the TLS certificate
    #[arg(long)]
    pub email: Option<String>,

    /// Configure nginx for the site
    #[arg(long)]
    pub nginx_config: bool,

    /// Request a TLS certificate
    #[arg(long)]
    pub enable_ssl: bool,
}

/// Arguments for the `deploy` command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Deploy to managed hosting
    #[arg(long, conflicts_with_all = ["target", "host"])]
    pub managed: bool,

    /// Saved target from the config file
    #[arg(long, conflicts_with = "host")]
    pub target: Option<String>,

    #[command(flatten)]
    pub vps: VpsArgs,

    /// Project the deployment belongs to
    #[arg(long)]
    pub project_id: Option<u64>,

    /// Deploy API base URL
    #[arg(long, env = "PAGESHIP_API_URL")]
    pub api_url: Option<String>,

    /// Deploy API token
    #[arg(long, env = "PAGESHIP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `targets` command
#[derive(Parser, Debug)]
pub struct TargetsArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
