use std::collections::BTreeSet;

use crate::models::k8s::NamespaceValues;

/// Everything the apply phase needs to know about one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMatch {
    pub team_id: String,
    /// Name from the first config row for this team.
    pub team_name: String,
    pub namespaces: NamespaceValues,
    pub zones: BTreeSet<i64>,
}

impl TeamMatch {
    pub fn namespace_names(&self) -> Vec<&str> {
        self.namespaces.keys().map(String::as_str).collect()
    }
}

#[derive(Debug)]
pub enum TeamOutcome {
    /// PUT accepted; carries the returned status code.
    Updated { status: u16 },
    /// No namespace matched; nothing was sent.
    Skipped,
    Failed { error: crate::Error },
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub teams: Vec<(String, TeamOutcome)>,
}

impl RunSummary {
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, TeamOutcome::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TeamOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TeamOutcome::Failed { .. }))
    }

    pub fn outcome(&self, team_id: &str) -> Option<&TeamOutcome> {
        self.teams
            .iter()
            .find(|(id, _)| id == team_id)
            .map(|(_, outcome)| outcome)
    }

    fn count(&self, pred: impl Fn(&TeamOutcome) -> bool) -> usize {
        self.teams.iter().filter(|(_, o)| pred(o)).count()
    }
}
