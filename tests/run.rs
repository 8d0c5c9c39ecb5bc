use std::fs;
use std::path::Path;
use std::time::Duration;

use team_scope::api::RetryPolicy;
use team_scope::commands::{run, RunOptions};
use team_scope::models::MetadataSource;
use team_scope::Error;
use tempfile::TempDir;
use wiremock::MockServer;

fn options(dir: &Path, api: &MockServer) -> RunOptions {
    RunOptions {
        source: MetadataSource::Label,
        default_key: None,
        api_url: api.uri(),
        api_token: "secret".to_string(),
        team_config: dir.join("teams.csv"),
        context_config: dir.join("contexts.csv"),
        zone_config: None,
        output: dir.join("todo.csv"),
        silent: true,
        fail_fast: false,
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        },
    }
}

fn inputs(contexts: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("teams.csv"),
        "team_name,team_id,key,prefix\nTeamA,100,env,prod\n",
    )
    .unwrap();
    let mut list = String::from("context\n");
    for context in contexts {
        list += &format!("{context}\n");
    }
    fs::write(dir.path().join("contexts.csv"), list).unwrap();
    dir
}

#[tokio::test]
async fn unknown_context_stops_the_run_before_any_call() {
    let api = MockServer::start().await;
    let dir = inputs(&["one", "ghost"]);
    let kubeconfig = dir.path().join("kubeconfig");
    fs::write(
        &kubeconfig,
        "apiVersion: v1\nkind: Config\nclusters:\n- name: one\n  cluster:\n    server: http://127.0.0.1:1\ncontexts:\n- name: one\n  context:\n    cluster: one\n",
    )
    .unwrap();
    // only test in this binary that loads a kubeconfig
    std::env::set_var("KUBECONFIG", &kubeconfig);

    let opts = options(dir.path(), &api);
    let err = run(&opts).await.unwrap_err();

    match err {
        Error::Kubeconfig(message) => {
            assert!(message.contains("ghost"), "{message}");
            assert!(!message.contains("one"), "{message}");
        }
        other => panic!("expected a kubeconfig error, got {other}"),
    }
    assert!(api.received_requests().await.unwrap_or_default().is_empty());
    assert!(!opts.output.exists());
}

#[tokio::test]
async fn missing_team_config_is_a_config_error() {
    let api = MockServer::start().await;
    let dir = inputs(&["one"]);
    fs::remove_file(dir.path().join("teams.csv")).unwrap();

    let err = run(&options(dir.path(), &api)).await.unwrap_err();

    assert!(matches!(err, Error::Config(ref m) if m.contains("teams.csv")), "{err}");
    assert!(api.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn blank_token_is_rejected_by_the_library() {
    let api = MockServer::start().await;
    let dir = inputs(&["one"]);
    let mut opts = options(dir.path(), &api);
    opts.api_token = "  ".to_string();

    let err = run(&opts).await.unwrap_err();

    assert!(matches!(err, Error::Config(ref m) if m.contains("SECURE_API_TOKEN")), "{err}");
    assert!(api.received_requests().await.unwrap_or_default().is_empty());
}
