use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use team_scope::api::RetryPolicy;
use team_scope::commands::{self, RunOptions};
use team_scope::models::MetadataSource;

/// Sync monitoring team scope filters with Kubernetes namespace labels or annotations.
///
/// "--label" and "--annotation" are mutually exclusive; specify one or the other.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["label", "annotation"])))]
struct Cli {
    /// Label to look for (match key for team rows without a key column)
    #[arg(long, env = "LABEL", value_name = "KEY")]
    label: Option<String>,

    /// Annotation to look for (match key for team rows without a key column)
    #[arg(long, env = "ANNOTATION", value_name = "KEY")]
    annotation: Option<String>,

    /// API URL, e.g. https://app.au1.sysdig.com
    #[arg(long, env = "API_URL")]
    api_url: String,

    /// Team config CSV
    #[arg(long, env = "TEAM_CONFIG")]
    team_config: PathBuf,

    /// Context list CSV, one kubeconfig context per line
    #[arg(long, env = "CONTEXT_CONFIG")]
    context_config: PathBuf,

    /// Zone config CSV
    #[arg(long, env = "ZONE_CONFIG")]
    zone_config: Option<PathBuf>,

    /// Where to write the team -> namespace preview
    #[arg(long, default_value = "todo.csv")]
    output: PathBuf,

    /// Run without user interaction (do not prompt to proceed)
    #[arg(long)]
    silent: bool,

    /// Stop at the first team that fails to update
    #[arg(long)]
    fail_fast: bool,

    /// Retries for rate-limited or timed-out API calls
    #[arg(long, default_value_t = 5)]
    max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    #[arg(long, env = "SECURE_API_TOKEN", hide = true, hide_env_values = true)]
    api_token: Option<String>,
}

impl Cli {
    /// Which metadata map to read, and the key it names.
    fn source(&self) -> (MetadataSource, Option<String>) {
        match (&self.label, &self.annotation) {
            (_, Some(key)) => (MetadataSource::Annotation, Some(key.clone())),
            (label, None) => (MetadataSource::Label, label.clone()),
        }
    }

    fn into_options(self) -> anyhow::Result<RunOptions> {
        let api_token = self.api_token.clone().ok_or_else(|| {
            anyhow::anyhow!("Please set the SECURE_API_TOKEN environment variable to continue")
        })?;

        let (source, default_key) = self.source();

        Ok(RunOptions {
            source,
            default_key,
            api_url: self.api_url,
            api_token,
            team_config: self.team_config,
            context_config: self.context_config,
            zone_config: self.zone_config,
            output: self.output,
            silent: self.silent,
            fail_fast: self.fail_fast,
            timeout: Duration::from_secs(self.timeout),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let summary = commands::run(&cli.into_options()?).await?;

    if summary.failed() > 0 {
        anyhow::bail!("{} team(s) failed to update", summary.failed());
    }
    Ok(())
}
