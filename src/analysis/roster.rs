//! Roster assembly
//!
//! Runs every per-document stage, settles duplicate agent names, then detects
//! relationships over the surviving set.

use crate::agent::parse_document;
use crate::agent::types::{ParsedAgent, RawDocument};
use crate::analysis::phases::{detect_phase, WorkflowPhase};
use crate::analysis::relationships::{detect_relationships, AgentRelationship};
use crate::analysis::stats::{derive_stats, AgentStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("Duplicate agent names: {}", .0.join(", "))]
    DuplicateAgents(Vec<String>),
}

/// What to do when two documents declare the same agent name
/// (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    /// Later document takes the earlier one's place.
    Replace,
    /// Later document is dropped.
    Skip,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Reject => write!(f, "reject"),
            DuplicatePolicy::Replace => write!(f, "replace"),
            DuplicatePolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "replace" => Ok(DuplicatePolicy::Replace),
            "skip" => Ok(DuplicatePolicy::Skip),
            _ => Err(format!(
                "Unknown duplicate policy: {}. Must be one of: reject, replace, skip",
                s
            )),
        }
    }
}

/// A parsed agent enriched with its stat card and pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDossier {
    pub id: String,
    #[serde(flatten)]
    pub parsed: ParsedAgent,
    pub stats: AgentStats,
    pub phase: WorkflowPhase,
}

impl AgentDossier {
    pub fn from_parsed(parsed: ParsedAgent) -> Self {
        let stats = derive_stats(&parsed);
        let phase = detect_phase(&parsed);
        debug!(agent = parsed.name(), phase = %phase, ?stats, "Agent enriched");
        Self {
            id: Uuid::new_v4().to_string(),
            parsed,
            stats,
            phase,
        }
    }

    pub fn name(&self) -> &str {
        self.parsed.name()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub agents: Vec<AgentDossier>,
    pub relationships: Vec<AgentRelationship>,
}

impl Roster {
    pub fn agent(&self, name: &str) -> Option<&AgentDossier> {
        self.agents.iter().find(|a| same_name(a.name(), name))
    }

    pub fn outgoing<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AgentRelationship> {
        self.relationships
            .iter()
            .filter(move |r| same_name(&r.source_agent, name))
    }

    pub fn incoming<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AgentRelationship> {
        self.relationships
            .iter()
            .filter(move |r| same_name(&r.target_agent, name))
    }

    /// Agents grouped into pipeline columns. Empty columns are left out,
    /// except `unassigned` which is always last.
    pub fn by_phase(&self) -> Vec<(WorkflowPhase, Vec<&AgentDossier>)> {
        WorkflowPhase::ALL
            .iter()
            .map(|&phase| {
                let members: Vec<&AgentDossier> =
                    self.agents.iter().filter(|a| a.phase == phase).collect();
                (phase, members)
            })
            .filter(|(phase, members)| *phase == WorkflowPhase::Unassigned || !members.is_empty())
            .collect()
    }
}

/// Agent names compare case-insensitively, Unicode-aware, everywhere.
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn build_roster(
    documents: &[RawDocument],
    policy: DuplicatePolicy,
) -> Result<Roster, RosterError> {
    let parsed: Vec<ParsedAgent> = documents.iter().map(parse_document).collect();
    let agents = resolve_duplicates(parsed, policy)?;
    let relationships = detect_relationships(&agents);

    let agents: Vec<AgentDossier> = agents.into_iter().map(AgentDossier::from_parsed).collect();

    info!(
        documents = documents.len(),
        agents = agents.len(),
        relationships = relationships.len(),
        "Roster built"
    );

    Ok(Roster {
        agents,
        relationships,
    })
}

fn resolve_duplicates(
    agents: Vec<ParsedAgent>,
    policy: DuplicatePolicy,
) -> Result<Vec<ParsedAgent>, RosterError> {
    let mut kept: Vec<ParsedAgent> = Vec::with_capacity(agents.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut duplicates: Vec<String> = Vec::new();

    for agent in agents {
        let key = agent.name().to_lowercase();
        let Some(&pos) = positions.get(&key) else {
            positions.insert(key, kept.len());
            kept.push(agent);
            continue;
        };

        match policy {
            DuplicatePolicy::Reject => {
                let first = kept[pos].name().to_string();
                if !duplicates.contains(&first) {
                    duplicates.push(first);
                }
            }
            DuplicatePolicy::Replace => {
                debug!(
                    agent = agent.name(),
                    replaced = %kept[pos].filename,
                    by = %agent.filename,
                    "Duplicate agent replaced"
                );
                kept[pos] = agent;
            }
            DuplicatePolicy::Skip => {
                debug!(agent = agent.name(), file = %agent.filename, "Duplicate agent skipped");
            }
        }
    }

    if duplicates.is_empty() {
        Ok(kept)
    } else {
        Err(RosterError::DuplicateAgents(duplicates))
    }
}
