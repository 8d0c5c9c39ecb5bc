// Input tables: team config, context list, zone config.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{Error, Result};

/// One row of the team config: which namespaces belong to which team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamConfigRow {
    pub team_name: String,
    pub team_id: String,
    /// Label or annotation name compared against `match_prefix`.
    pub match_key: String,
    pub match_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfigRow {
    pub zone_name: String,
    pub team_id: String,
    pub zone_id: i64,
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Header row is consumed by the reader; rows may have differing widths.
fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::Config(format!("cannot open {}: {e}", path.display())))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn read_records<R: Read>(rdr: R, path: &Path) -> Result<Vec<StringRecord>> {
    reader(rdr)
        .into_records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| Error::Csv {
            path: path.to_path_buf(),
            source,
        })
}

// ── team config ───────────────────────────────────────────────────────────────

/// Parses `(team_name, team_id, match_key, match_prefix)` rows.
///
/// Three-column rows `(team_name, team_id, match_prefix)` take their key from
/// `default_key`; without one they are a configuration error. Rows of any
/// other width are skipped with a warning.
pub fn parse_team_config<R: Read>(
    rdr: R,
    path: &Path,
    default_key: Option<&str>,
) -> Result<Vec<TeamConfigRow>> {
    let mut rows = Vec::new();

    for record in read_records(rdr, path)? {
        let row = match record.len() {
            4 => TeamConfigRow {
                team_name: record[0].to_string(),
                team_id: record[1].to_string(),
                match_key: record[2].to_string(),
                match_prefix: record[3].to_string(),
            },
            3 => {
                let key = default_key.ok_or_else(|| Error::InvalidRow {
                    path: path.to_path_buf(),
                    line: line_of(&record),
                    reason: "row has no match key and neither --label nor --annotation named one".to_string(),
                })?;
                TeamConfigRow {
                    team_name: record[0].to_string(),
                    team_id: record[1].to_string(),
                    match_key: key.to_string(),
                    match_prefix: record[2].to_string(),
                }
            }
            n => {
                log::warn!(
                    "team config: skip line {} of {} ({n} column(s))",
                    line_of(&record),
                    path.display()
                );
                continue;
            }
        };

        if row.team_id.is_empty() || row.match_key.is_empty() {
            return Err(Error::InvalidRow {
                path: path.to_path_buf(),
                line: line_of(&record),
                reason: "team id and match key must not be empty".to_string(),
            });
        }

        rows.push(row);
    }

    Ok(rows)
}

pub fn load_team_config(path: &Path, default_key: Option<&str>) -> Result<Vec<TeamConfigRow>> {
    log::info!("team config: processing {}", path.display());
    parse_team_config(open(path)?, path, default_key)
}

// ── context list ──────────────────────────────────────────────────────────────

/// One context per line, first column only; blank lines are ignored.
pub fn parse_contexts<R: Read>(rdr: R, path: &Path) -> Result<Vec<String>> {
    Ok(read_records(rdr, path)?
        .iter()
        .filter_map(|record| record.get(0))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn load_contexts(path: &Path) -> Result<Vec<String>> {
    let contexts = parse_contexts(open(path)?, path)?;
    if contexts.is_empty() {
        return Err(Error::Config(format!("no contexts listed in {}", path.display())));
    }
    Ok(contexts)
}

// ── zone config ───────────────────────────────────────────────────────────────

/// Parses `(zone_name, team_id, zone_id)` rows. A non-integer zone id names
/// the offending line.
pub fn parse_zone_config<R: Read>(rdr: R, path: &Path) -> Result<Vec<ZoneConfigRow>> {
    let mut rows = Vec::new();

    for record in read_records(rdr, path)? {
        if record.len() < 3 {
            log::warn!(
                "zone config: skip line {} of {} ({} column(s))",
                line_of(&record),
                path.display(),
                record.len()
            );
            continue;
        }

        let zone_id = record[2].parse::<i64>().map_err(|e| Error::InvalidRow {
            path: path.to_path_buf(),
            line: line_of(&record),
            reason: format!("zone id {:?}: {e}", &record[2]),
        })?;

        rows.push(ZoneConfigRow {
            zone_name: record[0].to_string(),
            team_id: record[1].to_string(),
            zone_id,
        });
    }

    Ok(rows)
}

pub fn load_zone_config(path: &Path) -> Result<Vec<ZoneConfigRow>> {
    log::info!("zone config: processing {}", path.display());
    parse_zone_config(open(path)?, path)
}
