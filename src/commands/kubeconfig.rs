use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::error::{Error, Result};

// ── helpers ───────────────────────────────────────────────────────────────────

/// Appends the clusters, users and contexts of `extra`. The first file that
/// names a current context keeps it.
fn merge_kubeconfig(mut base: Kubeconfig, extra: Kubeconfig) -> Kubeconfig {
    base.clusters.extend(extra.clusters);
    base.auth_infos.extend(extra.auth_infos);
    base.contexts.extend(extra.contexts);
    if base.current_context.is_none() {
        base.current_context = extra.current_context;
    }
    base
}

/// Candidate kubeconfig files in `dir`: regular files whose name does not
/// start with '.', in name order.
fn scan_kube_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::Kubeconfig(format!("cannot read {}: {e}", dir.display())))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'))
        })
        .collect();

    paths.sort();
    Ok(paths)
}

/// Merges every file in `paths` that parses as a kubeconfig. Files that do
/// not parse are skipped; if none parse, the error lists each one and why.
fn load_from_paths(dir: &Path, paths: &[PathBuf]) -> Result<Kubeconfig> {
    let mut merged: Option<Kubeconfig> = None;
    let mut rejected = Vec::new();

    for path in paths {
        match Kubeconfig::read_from(path) {
            Ok(cfg) => {
                log::debug!("kubeconfig: {} context(s) from {}", cfg.contexts.len(), path.display());
                merged = Some(match merged.take() {
                    None => cfg,
                    Some(base) => merge_kubeconfig(base, cfg),
                });
            }
            Err(e) => rejected.push(format!("{} ({e})", path.display())),
        }
    }

    match merged {
        Some(kubeconfig) => {
            if !rejected.is_empty() {
                log::debug!("kubeconfig: ignored {}", rejected.join(", "));
            }
            Ok(kubeconfig)
        }
        None if rejected.is_empty() => Err(Error::Kubeconfig(format!(
            "no kubeconfig files in {}",
            dir.display()
        ))),
        None => Err(Error::Kubeconfig(format!(
            "no valid kubeconfig in {}: {}",
            dir.display(),
            rejected.join(", ")
        ))),
    }
}

/// Names of the requested contexts that `kubeconfig` does not define.
pub fn missing_contexts<'a>(kubeconfig: &Kubeconfig, wanted: &'a [String]) -> Vec<&'a str> {
    wanted
        .iter()
        .filter(|name| !kubeconfig.contexts.iter().any(|c| &c.name == *name))
        .map(String::as_str)
        .collect()
}

// ── loading ───────────────────────────────────────────────────────────────────

/// Loads the merged kubeconfig.
///
/// Resolution order:
/// 1. If `KUBECONFIG` is set, `Kubeconfig::read()` merges every listed file
///    with the same semantics as kubectl.
/// 2. Otherwise every regular file in `~/.kube` is parsed and all valid
///    kubeconfigs are merged, so `~/.kube/config` and any sibling files
///    contribute contexts.
pub fn load_kubeconfig() -> Result<Kubeconfig> {
    let kube_env = std::env::var("KUBECONFIG").unwrap_or_default();

    let kubeconfig = if !kube_env.is_empty() {
        log::debug!("kubeconfig: KUBECONFIG = {kube_env:?}");
        Kubeconfig::read().map_err(|e| Error::Kubeconfig(e.to_string()))?
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Kubeconfig("cannot determine home directory".to_string()))?;
        let kube_dir = home.join(".kube");
        log::debug!("kubeconfig: KUBECONFIG not set, scanning {}", kube_dir.display());

        load_from_paths(&kube_dir, &scan_kube_dir(&kube_dir)?)?
    };

    log::info!("kubeconfig: {} context(s) available", kubeconfig.contexts.len());
    Ok(kubeconfig)
}

/// Builds a client bound to `context` of an already loaded kubeconfig.
pub async fn client_for_context(kubeconfig: &Kubeconfig, context: &str) -> Result<Client> {
    let cluster_err = |message: String| Error::Cluster {
        context: context.to_string(),
        message,
    };

    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let config = Config::from_custom_kubeconfig(kubeconfig.clone(), &options)
        .await
        .map_err(|e| cluster_err(e.to_string()))?;

    Client::try_from(config).map_err(|e| cluster_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use kube::config::NamedContext;

    use super::*;

    fn named(name: &str) -> NamedContext {
        NamedContext {
            name: name.to_string(),
            context: None,
        }
    }

    #[test]
    fn merge_keeps_base_current_context() {
        let base = Kubeconfig {
            current_context: Some("a".into()),
            contexts: vec![named("a")],
            ..Default::default()
        };
        let extra = Kubeconfig {
            current_context: Some("b".into()),
            contexts: vec![named("b")],
            ..Default::default()
        };

        let merged = merge_kubeconfig(base, extra);

        assert_eq!(merged.current_context.as_deref(), Some("a"));
        assert_eq!(merged.contexts.len(), 2);
    }

    #[test]
    fn reports_unknown_contexts() {
        let kc = Kubeconfig {
            contexts: vec![named("prod-eu"), named("prod-us")],
            ..Default::default()
        };
        let wanted = vec!["prod-eu".to_string(), "staging".to_string()];
        assert_eq!(missing_contexts(&kc, &wanted), vec!["staging"]);
    }

    #[test]
    fn scan_skips_hidden_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config"), "").unwrap();
        fs::write(dir.path().join(".DS_Store"), "").unwrap();
        fs::create_dir(dir.path().join("cache")).unwrap();

        let paths = scan_kube_dir(dir.path()).unwrap();

        assert_eq!(paths, vec![dir.path().join("config")]);
    }

    #[test]
    fn load_merges_every_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let one = "apiVersion: v1\nkind: Config\ncontexts:\n- name: one\n  context:\n    cluster: c1\n";
        let two = "apiVersion: v1\nkind: Config\ncontexts:\n- name: two\n  context:\n    cluster: c2\n";
        fs::write(dir.path().join("a-config"), one).unwrap();
        fs::write(dir.path().join("b-config"), two).unwrap();
        fs::write(dir.path().join("notes.txt"), "not: [yaml").unwrap();

        let paths = scan_kube_dir(dir.path()).unwrap();
        let merged = load_from_paths(dir.path(), &paths).unwrap();

        let names: Vec<&str> = merged.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let err = scan_kube_dir(&missing).unwrap_err();

        assert!(matches!(err, Error::Kubeconfig(ref m) if m.contains("absent")), "{err}");
    }

    #[test]
    fn no_valid_file_names_every_rejected_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("known_hosts"), "not: [yaml").unwrap();
        fs::write(dir.path().join("notes.txt"), "- just\n- a list\n").unwrap();

        let paths = scan_kube_dir(dir.path()).unwrap();
        let err = load_from_paths(dir.path(), &paths).unwrap_err();

        match err {
            Error::Kubeconfig(message) => {
                assert!(message.contains("known_hosts"), "{message}");
                assert!(message.contains("notes.txt"), "{message}");
            }
            other => panic!("expected a kubeconfig error, got {other}"),
        }
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_from_paths(dir.path(), &[]).unwrap_err();

        assert!(matches!(err, Error::Kubeconfig(ref m) if m.starts_with("no kubeconfig files")), "{err}");
    }
}
