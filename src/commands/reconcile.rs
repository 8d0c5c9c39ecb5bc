use std::path::PathBuf;
use std::time::Duration;

use crate::api::{build_payload, ApiClient, RetryPolicy, Sleeper, TeamsApi};
use crate::commands::{confirm, kubeconfig, matcher, namespaces, preview};
use crate::error::{Error, Result};
use crate::models::{config, MetadataSource, RunSummary, TeamMatch, TeamOutcome};

/// Everything one reconciliation run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: MetadataSource,
    /// Key for team rows that only carry a prefix.
    pub default_key: Option<String>,
    pub api_url: String,
    pub api_token: String,
    pub team_config: PathBuf,
    pub context_config: PathBuf,
    pub zone_config: Option<PathBuf>,
    pub output: PathBuf,
    pub silent: bool,
    pub fail_fast: bool,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

/// collect → match → preview → confirm → apply.
///
/// A blank `api_token` is refused up front. The CLI already requires the
/// variable to be set; this also covers library callers and a token that is
/// set but empty.
pub async fn run(opts: &RunOptions) -> Result<RunSummary> {
    if opts.api_token.trim().is_empty() {
        return Err(Error::Config("set SECURE_API_TOKEN to continue".to_string()));
    }
    let client = ApiClient::new(&opts.api_url, &opts.api_token, opts.timeout, opts.retry.clone())?;

    let rows = config::load_team_config(&opts.team_config, opts.default_key.as_deref())?;
    let contexts = config::load_contexts(&opts.context_config)?;
    let zones = match &opts.zone_config {
        Some(path) => config::load_zone_config(path)?,
        None => Vec::new(),
    };

    let kubeconfig = kubeconfig::load_kubeconfig()?;
    let missing = kubeconfig::missing_contexts(&kubeconfig, &contexts);
    if !missing.is_empty() {
        return Err(Error::Kubeconfig(format!(
            "context(s) not found: {}",
            missing.join(", ")
        )));
    }

    let keys = matcher::match_keys(&rows);
    let index = namespaces::collect(&kubeconfig, &contexts, opts.source, &keys).await?;
    let teams = matcher::match_teams(&rows, &index, &zones);

    preview::write_preview_file(&opts.output, &teams)?;

    if opts.silent {
        log::info!("running with --silent, continuing");
    } else if !confirm::confirm_run(&opts.output)? {
        return Err(Error::Aborted);
    }

    apply(&TeamsApi::new(client), &teams, opts.source, opts.fail_fast).await
}

/// GETs, rewrites and PUTs every team that matched at least one namespace.
///
/// A failed team is recorded and the next one is tried, unless `fail_fast`
/// is set, in which case the error is returned and later teams are untouched.
pub async fn apply<S: Sleeper>(
    api: &TeamsApi<S>,
    teams: &[TeamMatch],
    source: MetadataSource,
    fail_fast: bool,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for team in teams {
        log::info!(
            "teams: processing '{}' ({}), matching {source} found in {:?}",
            team.team_name,
            team.team_id,
            team.namespace_names()
        );

        let outcome = if team.namespaces.is_empty() {
            log::info!("teams: no matching {source} for '{}', skipping", team.team_name);
            TeamOutcome::Skipped
        } else {
            match update_team(api, team).await {
                Ok(status) => {
                    log::info!("teams: '{}' updated, result code {status}", team.team_name);
                    TeamOutcome::Updated { status }
                }
                Err(error) if fail_fast => return Err(error),
                Err(error) => {
                    log::error!("teams: '{}' ({}) failed: {error}", team.team_name, team.team_id);
                    TeamOutcome::Failed { error }
                }
            }
        };

        summary.teams.push((team.team_id.clone(), outcome));
    }

    log::info!(
        "teams: {} updated, {} skipped, {} failed",
        summary.updated(),
        summary.skipped(),
        summary.failed()
    );
    Ok(summary)
}

async fn update_team<S: Sleeper>(api: &TeamsApi<S>, team: &TeamMatch) -> Result<u16> {
    let current = api.get_team(&team.team_id).await?;
    let payload = build_payload(&current, &team.namespaces, &team.zones);
    api.update_team(&team.team_id, &payload).await
}
