use std::collections::BTreeSet;

use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::retry::{ApiClient, Sleeper};
use crate::error::{Error, Result};
use crate::models::NamespaceValues;

/// Shape of `GET /api/teams/{id}`; only the team record is kept.
#[derive(Debug, Deserialize)]
struct TeamEnvelope {
    team: Option<Value>,
}

/// `kubernetes.namespace.name in ("a","b")`, in the set's iteration order.
pub fn namespace_filter<'a>(namespaces: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = namespaces.into_iter().map(|ns| format!("\"{ns}\"")).collect();
    format!("kubernetes.namespace.name in ({})", quoted.join(","))
}

/// Copies the remote team record and overwrites only `filter`, `zoneIds` and
/// `allZones`. With no zones the team is scoped to all zones.
pub fn build_payload(team: &Value, namespaces: &NamespaceValues, zones: &BTreeSet<i64>) -> Value {
    let mut payload = team.clone();
    let Some(fields) = payload.as_object_mut() else {
        return payload;
    };

    fields.insert(
        "filter".to_string(),
        Value::String(namespace_filter(namespaces.keys().map(String::as_str))),
    );
    fields.insert("zoneIds".to_string(), json!(zones));
    fields.insert("allZones".to_string(), Value::Bool(zones.is_empty()));

    payload
}

/// Team endpoints of the monitoring API.
pub struct TeamsApi<S> {
    client: ApiClient<S>,
}

impl<S: Sleeper> TeamsApi<S> {
    pub fn new(client: ApiClient<S>) -> Self {
        Self { client }
    }

    fn team_url(&self, team_id: &str) -> String {
        self.client.url(&format!("api/teams/{team_id}"))
    }

    /// Fetches the current team record (the `team` member of the response).
    pub async fn get_team(&self, team_id: &str) -> Result<Value> {
        let url = self.team_url(team_id);
        let resp = self.client.request(Method::GET, &url, None).await?;

        let envelope: TeamEnvelope = resp
            .json()
            .await
            .map_err(|source| Error::Request { url, source })?;

        match envelope.team {
            Some(team @ Value::Object(_)) => Ok(team),
            _ => Err(Error::InvalidTeam {
                team_id: team_id.to_string(),
                reason: "response has no team object".to_string(),
            }),
        }
    }

    /// Replaces the team record; returns the response status code.
    pub async fn update_team(&self, team_id: &str, payload: &Value) -> Result<u16> {
        let url = self.team_url(team_id);
        let resp = self.client.request(Method::PUT, &url, Some(payload)).await?;
        Ok(resp.status().as_u16())
    }
}
