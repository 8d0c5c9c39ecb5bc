use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::TeamMatch;

pub const PREVIEW_HEADER: [&str; 3] = ["Team Name", "Team ID", "Namespace"];

/// Writes one `(team name, team id, namespace)` row per matched namespace.
/// Returns the number of rows written.
pub fn write_preview<W: Write>(out: W, teams: &[TeamMatch]) -> csv::Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(PREVIEW_HEADER)?;

    let mut rows = 0;
    for team in teams {
        for namespace in team.namespaces.keys() {
            writer.write_record([&team.team_name, &team.team_id, namespace])?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

/// Overwrites `path` with the preview.
pub fn write_preview_file(path: &Path, teams: &[TeamMatch]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let rows = write_preview(file, teams).map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("preview: {rows} row(s) written to {}", path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::NamespaceValues;

    fn team(id: &str, name: &str, namespaces: &[&str]) -> TeamMatch {
        TeamMatch {
            team_id: id.into(),
            team_name: name.into(),
            namespaces: namespaces
                .iter()
                .map(|ns| (ns.to_string(), format!("prod-{ns}")))
                .collect::<NamespaceValues>(),
            zones: BTreeSet::new(),
        }
    }

    #[test]
    fn one_row_per_namespace_and_none_for_empty_teams() {
        let teams = vec![
            team("100", "TeamA", &["ns2", "ns1"]),
            team("200", "TeamB", &[]),
            team("300", "Team, C", &["web"]),
        ];
        let mut out = Vec::new();

        let rows = write_preview(&mut out, &teams).unwrap();

        assert_eq!(rows, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Team Name,Team ID,Namespace\nTeamA,100,ns1\nTeamA,100,ns2\n\"Team, C\",300,web\n"
        );
    }

    #[test]
    fn file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.csv");
        std::fs::write(&path, "stale contents that are longer than the new preview\n".repeat(10)).unwrap();

        write_preview_file(&path, &[team("100", "TeamA", &["ns1"])]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Team Name,Team ID,Namespace\nTeamA,100,ns1\n"
        );
    }
}
