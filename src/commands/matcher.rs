use std::collections::BTreeSet;

use crate::models::{MetadataIndex, NamespaceValues, TeamConfigRow, TeamMatch, ZoneConfigRow};

/// Every distinct match key referenced by the team config.
pub fn match_keys(rows: &[TeamConfigRow]) -> BTreeSet<String> {
    rows.iter().map(|row| row.match_key.clone()).collect()
}

/// Namespaces whose `match_key` value starts with `match_prefix`, plus the
/// zones configured for the row's team. An uncollected key yields no
/// namespaces.
pub fn match_team(
    row: &TeamConfigRow,
    index: &MetadataIndex,
    zones: &[ZoneConfigRow],
) -> (NamespaceValues, BTreeSet<i64>) {
    let namespaces = index
        .get(&row.match_key)
        .map(|values| {
            values
                .iter()
                .filter(|(_, value)| value.starts_with(&row.match_prefix))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    let zone_ids = zones
        .iter()
        .filter(|zone| zone.team_id == row.team_id)
        .map(|zone| zone.zone_id)
        .collect();

    (namespaces, zone_ids)
}

/// Matches every row and folds rows that share a team id into one
/// [`TeamMatch`], in order of first appearance.
pub fn match_teams(
    rows: &[TeamConfigRow],
    index: &MetadataIndex,
    zones: &[ZoneConfigRow],
) -> Vec<TeamMatch> {
    let mut teams: Vec<TeamMatch> = Vec::new();

    for row in rows {
        let (namespaces, zone_ids) = match_team(row, index, zones);
        log::debug!(
            "matcher: team '{}' ({}) {}={}* -> {} namespace(s)",
            row.team_name,
            row.team_id,
            row.match_key,
            row.match_prefix,
            namespaces.len()
        );

        match teams.iter_mut().find(|t| t.team_id == row.team_id) {
            Some(team) => {
                team.namespaces.extend(namespaces);
                team.zones.extend(zone_ids);
            }
            None => teams.push(TeamMatch {
                team_id: row.team_id.clone(),
                team_name: row.team_name.clone(),
                namespaces,
                zones: zone_ids,
            }),
        }
    }

    teams
}
