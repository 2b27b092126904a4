//! Cross-document relationship detection
//!
//! Phrase patterns are matched against each agent's raw text and the
//! captured names are resolved against the names of the agents in the
//! same run. Names that do not resolve never become edges.

use crate::agent::types::{ParsedAgent, SectionCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Invokes,
    References,
    ReportsTo,
    Reviews,
    ProvidesTo,
}

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Invokes => "invokes",
            RelationshipType::References => "references",
            RelationshipType::ReportsTo => "reports_to",
            RelationshipType::Reviews => "reviews",
            RelationshipType::ProvidesTo => "provides_to",
        }
    }

    /// Human wording used in relationship descriptions, e.g. "reports to".
    pub fn label(self) -> String {
        self.as_str().replacen('_', " ", 1)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge between two agents of the same run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRelationship {
    pub id: String,
    pub source_agent: String,
    pub target_agent: String,
    pub relationship_type: RelationshipType,
    pub description: String,
    pub evidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Current document's agent -> captured agent.
    Outgoing,
    /// Captured agent -> current document's agent.
    Incoming,
}

const RELATIONSHIP_PATTERNS: &[(&str, RelationshipType, Direction)] = &[
    (
        r"(?i)when invoked by (\w[\w\s-]*\w)",
        RelationshipType::ReportsTo,
        Direction::Incoming,
    ),
    (
        r"(?i)(\w[\w\s-]*\w) provides",
        RelationshipType::ProvidesTo,
        Direction::Incoming,
    ),
    (
        r"(?i)route\s+\w+\s+(?:issues?\s+)?to\s+(\w[\w\s-]*\w)",
        RelationshipType::Invokes,
        Direction::Outgoing,
    ),
    (
        r"(?i)invoke[sd]?\s+(?:the\s+)?(\w[\w\s-]*\w?)(?:\s+agent)?",
        RelationshipType::Invokes,
        Direction::Outgoing,
    ),
    (
        r"(?i)reviews?\s+(?:output\s+of\s+)?(\w[\w\s-]*\w)",
        RelationshipType::Reviews,
        Direction::Outgoing,
    ),
];

fn compiled_patterns() -> &'static [(Regex, RelationshipType, Direction)] {
    static PATTERNS: OnceLock<Vec<(Regex, RelationshipType, Direction)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RELATIONSHIP_PATTERNS
            .iter()
            .map(|(pattern, kind, direction)| {
                (
                    Regex::new(pattern).expect("valid relationship pattern"),
                    *kind,
                    *direction,
                )
            })
            .collect()
    })
}

fn agent_suffix() -> &'static Regex {
    static AGENT_SUFFIX: OnceLock<Regex> = OnceLock::new();
    AGENT_SUFFIX.get_or_init(|| Regex::new(r"(?i)\s+agent\b.*$").expect("valid regex"))
}

/// Lowercase name -> canonical name for the agents of one detection run,
/// in input order.
#[derive(Debug, Default)]
pub struct KnownAgents {
    names: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl KnownAgents {
    pub fn from_agents(agents: &[ParsedAgent]) -> Self {
        let mut known = Self::default();
        for agent in agents {
            known.insert(agent.name());
        }
        known
    }

    /// A later agent with the same lowercase name takes over the canonical
    /// spelling but keeps the first one's position.
    fn insert(&mut self, canonical: &str) {
        let lower = canonical.to_lowercase();
        match self.index.get(&lower) {
            Some(&i) => self.names[i].1 = canonical.to_string(),
            None => {
                self.index.insert(lower.clone(), self.names.len());
                self.names.push((lower, canonical.to_string()));
            }
        }
    }

    fn exact(&self, lower: &str) -> Option<&str> {
        self.index.get(lower).map(|&i| self.names[i].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(l, c)| (l.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolves a lowercased captured phrase to a known agent name.
    ///
    /// Tries an exact match, then the phrase with an "agent ..." tail cut
    /// off, then any known name that is a whitespace-delimited prefix of the
    /// phrase ("developer agent for fixes" -> "Developer").
    pub fn resolve(&self, matched_lower: &str) -> Option<&str> {
        if let Some(name) = self.exact(matched_lower) {
            return Some(name);
        }

        let stripped = agent_suffix().replace(matched_lower, "");
        if stripped != matched_lower {
            if let Some(name) = self.exact(&stripped) {
                return Some(name);
            }
        }

        self.names
            .iter()
            .find(|(lower, _)| is_delimited_prefix(lower, matched_lower))
            .map(|(_, canonical)| canonical.as_str())
    }
}

fn is_delimited_prefix(name: &str, phrase: &str) -> bool {
    match phrase.strip_prefix(name) {
        Some("") => true,
        Some(rest) => rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Accumulates edges, dropping self-edges and repeated
/// `(source, target, type)` triples.
#[derive(Debug, Default)]
struct EdgeSet {
    seen: HashSet<(String, String, RelationshipType)>,
    edges: Vec<AgentRelationship>,
}

impl EdgeSet {
    fn add(
        &mut self,
        source: &str,
        target: &str,
        kind: RelationshipType,
        description: String,
        evidence: String,
    ) {
        if source.to_lowercase() == target.to_lowercase() {
            return;
        }
        let key = (source.to_string(), target.to_string(), kind);
        if !self.seen.insert(key) {
            return;
        }

        trace!(source, target, kind = %kind, evidence = %evidence, "Relationship detected");
        self.edges.push(AgentRelationship {
            id: Uuid::new_v4().to_string(),
            source_agent: source.to_string(),
            target_agent: target.to_string(),
            relationship_type: kind,
            description,
            evidence,
        });
    }
}

/// Detects deduplicated relationships across a full set of parsed agents.
pub fn detect_relationships(agents: &[ParsedAgent]) -> Vec<AgentRelationship> {
    let known = KnownAgents::from_agents(agents);
    let mut edges = EdgeSet::default();

    for agent in agents {
        detect_pattern_edges(agent, &known, &mut edges);
        detect_mention_edges(agent, &known, &mut edges);
    }

    debug!(
        agents = agents.len(),
        relationships = edges.edges.len(),
        "Relationship detection completed"
    );
    edges.edges
}

fn detect_pattern_edges(agent: &ParsedAgent, known: &KnownAgents, edges: &mut EdgeSet) {
    let own_name = agent.name();
    let own_lower = own_name.to_lowercase();

    for (re, kind, direction) in compiled_patterns() {
        for cap in re.captures_iter(&agent.raw_markdown) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            let matched_lower = name.as_str().trim().to_lowercase();
            let Some(resolved) = known.resolve(&matched_lower) else {
                continue;
            };
            if resolved.to_lowercase() == own_lower {
                continue;
            }

            let (source, target) = match direction {
                Direction::Outgoing => (own_name, resolved),
                Direction::Incoming => (resolved, own_name),
            };
            edges.add(
                source,
                target,
                *kind,
                format!("{} {} {}", source, kind.label(), target),
                whole.as_str().trim().to_string(),
            );
        }
    }
}

fn detect_mention_edges(agent: &ParsedAgent, known: &KnownAgents, edges: &mut EdgeSet) {
    let own_name = agent.name();
    let own_lower = own_name.to_lowercase();

    let behavior = agent
        .mapped_sections
        .content_of(SectionCategory::Behavior)
        .to_lowercase();
    for (other_lower, other) in known.iter() {
        if other_lower != own_lower && behavior.contains(other_lower) {
            edges.add(
                own_name,
                other,
                RelationshipType::References,
                format!("{} references {} in behavior", own_name, other),
                "Mention in behavior section".to_string(),
            );
        }
    }

    let cross_refs = agent
        .mapped_sections
        .content_of(SectionCategory::CrossReferences)
        .to_lowercase();
    if cross_refs.is_empty() {
        return;
    }
    for (other_lower, other) in known.iter() {
        if other_lower != own_lower && cross_refs.contains(other_lower) {
            edges.add(
                own_name,
                other,
                RelationshipType::References,
                format!("{} cross-references {}", own_name, other),
                "Listed in Cross-References section".to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::parse_agent;

    fn agent(name: &str, body: &str) -> ParsedAgent {
        let md = format!("---\nname: {}\n---\n{}", name, body);
        parse_agent(&md, &format!("{}.md", name.to_lowercase().replace(' ', "-")))
    }

    fn has_edge(
        rels: &[AgentRelationship],
        source: &str,
        target: &str,
        kind: RelationshipType,
    ) -> bool {
        rels.iter().any(|r| {
            r.source_agent == source && r.target_agent == target && r.relationship_type == kind
        })
    }

    #[test]
    fn test_invoked_by_is_incoming_reports_to() {
        let architect = agent("Architect", "## Behavior\n\nWhen invoked by Task Manager, design.");
        let manager = agent("Task Manager", "## Behavior\n\nCoordinates.");

        let rels = detect_relationships(&[architect, manager]);
        let edge = rels
            .iter()
            .find(|r| r.relationship_type == RelationshipType::ReportsTo)
            .unwrap();
        assert_eq!(edge.source_agent, "Task Manager");
        assert_eq!(edge.target_agent, "Architect");
        assert_eq!(edge.description, "Task Manager reports to Architect");
        assert!(edge.evidence.to_lowercase().starts_with("when invoked by task manager"));
    }

    #[test]
    fn test_route_to_is_outgoing_invokes() {
        let manager = agent("Task Manager", "## Behavior\n\nRoute failures to Developer.");
        let developer = agent("Developer", "## Behavior\n\nWrites code.");

        let rels = detect_relationships(&[manager, developer]);
        assert!(has_edge(&rels, "Task Manager", "Developer", RelationshipType::Invokes));
    }

    #[test]
    fn test_provides_is_incoming() {
        // the capture runs back across whitespace, so keep the heading out of it
        let developer = agent("Developer", "## Inputs\n\nNote: Architect provides the ADRs.");
        let architect = agent("Architect", "## Behavior\n\nDecides.");

        let rels = detect_relationships(&[developer, architect]);
        assert!(has_edge(&rels, "Architect", "Developer", RelationshipType::ProvidesTo));
    }

    #[test]
    fn test_reviews_output_of() {
        let reviewer = agent("Code Reviewer", "## Process\n\nReviews output of Developer.");
        let developer = agent("Developer", "## Outputs\n\n- Code");

        let rels = detect_relationships(&[reviewer, developer]);
        assert!(has_edge(&rels, "Code Reviewer", "Developer", RelationshipType::Reviews));
    }

    #[test]
    fn test_behavior_mention_is_reference() {
        let a = agent("Agent A", "## Behavior\nThis agent works with Agent B to complete tasks.");
        let b = agent("Agent B", "## Behavior\nDoes things independently.");

        let rels = detect_relationships(&[a, b]);
        let edge = rels
            .iter()
            .find(|r| r.source_agent == "Agent A" && r.target_agent == "Agent B")
            .unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::References);
        assert_eq!(edge.evidence, "Mention in behavior section");
    }

    #[test]
    fn test_cross_reference_mention() {
        let a = agent("Architect", "## See Also\n\n- Developer");
        let b = agent("Developer", "## Behavior\nCodes.");

        let rels = detect_relationships(&[a, b]);
        let edge = rels
            .iter()
            .find(|r| r.source_agent == "Architect" && r.target_agent == "Developer")
            .unwrap();
        assert_eq!(edge.evidence, "Listed in Cross-References section");
        assert_eq!(edge.description, "Architect cross-references Developer");
    }

    #[test]
    fn test_cross_reference_link_definitions() {
        let agents = vec![
            agent("Architect", "## See Also\n\n[Developer]: ./developer.md\n"),
            agent("Developer", ""),
        ];
        let rels = detect_relationships(&agents);

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_agent, "Architect");
        assert_eq!(rels[0].target_agent, "Developer");
        assert_eq!(rels[0].evidence, "Listed in Cross-References section");
    }

    #[test]
    fn test_behavior_mention_wins_over_cross_reference() {
        let a = agent(
            "Architect",
            "## Behavior\nHands designs to Developer.\n\n## Cross References\n- Developer",
        );
        let b = agent("Developer", "## Behavior\nCodes.");

        let rels = detect_relationships(&[a, b]);
        let refs: Vec<_> = rels
            .iter()
            .filter(|r| r.relationship_type == RelationshipType::References)
            .collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].evidence, "Mention in behavior section");
    }

    #[test]
    fn test_no_self_edges() {
        let solo = agent(
            "Self Ref",
            "## Behavior\nSelf Ref agent invokes Self Ref for testing.\n\n## Cross References\nSee: Self Ref",
        );
        assert!(detect_relationships(&[solo]).is_empty());
    }

    #[test]
    fn test_empty_and_single_inputs() {
        assert!(detect_relationships(&[]).is_empty());
        let solo = agent("Solo", "## Behavior\nWorks alone. Invokes Developer.");
        assert!(detect_relationships(&[solo]).is_empty());
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let a = agent("Alpha", "## Behavior\nInvokes the Gamma agent. Route bugs to Delta.");
        let b = agent("Beta", "## Behavior\nQuiet.");
        assert!(detect_relationships(&[a, b]).is_empty());
    }

    #[test]
    fn test_deduplicates_triples() {
        let a = agent(
            "Lead",
            "## Behavior\nInvokes Developer. Invokes Developer again. Route bugs to Developer.",
        );
        let b = agent("Developer", "## Behavior\nCodes.");

        let rels = detect_relationships(&[a, b]);
        let invokes = rels
            .iter()
            .filter(|r| r.relationship_type == RelationshipType::Invokes)
            .count();
        assert_eq!(invokes, 1);

        let keys: HashSet<_> = rels
            .iter()
            .map(|r| (&r.source_agent, &r.target_agent, r.relationship_type))
            .collect();
        assert_eq!(keys.len(), rels.len());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = agent("Lead", "## Behavior\nInvokes Developer. Reviews Tester.");
        let b = agent("Developer", "## Behavior\nCodes.");
        let c = agent("Tester", "## Behavior\nTests. Invoked by Lead.");

        let rels = detect_relationships(&[a, b, c]);
        let ids: HashSet<_> = rels.iter().map(|r| r.id.as_str()).collect();
        assert!(rels.len() >= 2);
        assert_eq!(ids.len(), rels.len());
    }

    #[test]
    fn test_resolve_exact_suffix_and_prefix() {
        let known = KnownAgents::from_agents(&[
            agent("Developer", ""),
            agent("Task Manager", ""),
        ]);

        assert_eq!(known.resolve("developer"), Some("Developer"));
        assert_eq!(known.resolve("task manager agent"), Some("Task Manager"));
        assert_eq!(
            known.resolve("developer agent for implementation"),
            Some("Developer")
        );
        assert_eq!(known.resolve("developer\nfixes"), Some("Developer"));
        assert_eq!(known.resolve("developers"), None);
        assert_eq!(known.resolve("the architect"), None);
    }

    #[test]
    fn test_known_agents_keep_first_position() {
        let known = KnownAgents::from_agents(&[
            agent("Developer", ""),
            agent("Tester", ""),
            agent("DEVELOPER", ""),
        ]);
        let names: Vec<_> = known.iter().map(|(_, c)| c).collect();
        assert_eq!(names, vec!["DEVELOPER", "Tester"]);
    }

    #[test]
    fn test_relationship_type_serialization() {
        let json = serde_json::to_string(&RelationshipType::ReportsTo).unwrap();
        assert_eq!(json, "\"reports_to\"");
        assert_eq!(RelationshipType::ProvidesTo.label(), "provides to");
    }
}
