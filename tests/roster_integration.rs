//! Roster integration tests: relationships, phases and stat cards across
//! the agent fixtures.

mod support;

use dossier::analysis::stats::StatInputs;
use dossier::{
    build_roster, derive_stats, detect_phase, parse_document, DuplicatePolicy, RawDocument,
    RelationshipType, Roster, RosterError, WorkflowPhase,
};
use std::collections::HashSet;
use support::{fixture, fixtures};
use yare::parameterized;

fn team() -> Roster {
    build_roster(
        &fixtures(&["architect", "task-manager", "developer"]),
        DuplicatePolicy::Reject,
    )
    .expect("Roster build failed")
}

fn has_edge(roster: &Roster, source: &str, target: &str, kind: RelationshipType) -> bool {
    roster.relationships.iter().any(|r| {
        r.source_agent == source && r.target_agent == target && r.relationship_type == kind
    })
}

#[test]
fn test_team_relationships() {
    let roster = team();

    assert_eq!(roster.agents.len(), 3);
    assert_eq!(roster.relationships.len(), 7, "{:#?}", roster.relationships);

    assert!(has_edge(&roster, "Task Manager", "Architect", RelationshipType::ReportsTo));
    assert!(has_edge(&roster, "Architect", "Task Manager", RelationshipType::References));
    assert!(has_edge(&roster, "Task Manager", "Architect", RelationshipType::Invokes));
    assert!(has_edge(&roster, "Task Manager", "Developer", RelationshipType::Invokes));
    assert!(has_edge(&roster, "Task Manager", "Architect", RelationshipType::References));
    assert!(has_edge(&roster, "Task Manager", "Developer", RelationshipType::References));
    assert!(has_edge(&roster, "Developer", "Architect", RelationshipType::References));
}

#[test]
fn test_reports_to_evidence() {
    let roster = team();
    let edge = roster
        .relationships
        .iter()
        .find(|r| r.relationship_type == RelationshipType::ReportsTo)
        .unwrap();

    assert_eq!(edge.description, "Task Manager reports to Architect");
    assert_eq!(edge.evidence, "When invoked by Task Manager");
}

#[test]
fn test_route_evidence() {
    let roster = team();
    let edge = roster
        .outgoing("Task Manager")
        .find(|r| {
            r.target_agent == "Developer" && r.relationship_type == RelationshipType::Invokes
        })
        .unwrap();

    assert_eq!(edge.evidence, "Route coding issues to Developer");
    assert_eq!(edge.description, "Task Manager invokes Developer");
}

#[test]
fn test_cross_reference_edge() {
    let roster = team();
    let edge = roster.outgoing("Developer").next().unwrap();

    assert_eq!(edge.target_agent, "Architect");
    assert_eq!(edge.description, "Developer cross-references Architect");
    assert_eq!(edge.evidence, "Listed in Cross-References section");
    assert_eq!(roster.outgoing("Developer").count(), 1);
}

#[test]
fn test_relationship_invariants() {
    let roster = team();
    let names: HashSet<&str> = roster.agents.iter().map(|a| a.name()).collect();

    let mut ids = HashSet::new();
    let mut triples = HashSet::new();
    for rel in &roster.relationships {
        assert!(names.contains(rel.source_agent.as_str()));
        assert!(names.contains(rel.target_agent.as_str()));
        assert_ne!(rel.source_agent, rel.target_agent);
        assert!(ids.insert(rel.id.clone()), "duplicate id {}", rel.id);
        assert!(triples.insert((
            rel.source_agent.clone(),
            rel.target_agent.clone(),
            rel.relationship_type
        )));
    }
}

#[test]
fn test_unresolved_names_make_no_edges() {
    let roster =
        build_roster(&fixtures(&["task-manager"]), DuplicatePolicy::Reject).unwrap();
    assert!(roster.relationships.is_empty());
}

#[test]
fn test_incoming_lookup_is_case_insensitive() {
    let roster = team();
    assert_eq!(roster.incoming("architect").count(), 4);
    assert!(roster.agent("TASK MANAGER").is_some());
}

#[parameterized(
    architect = { "architect", WorkflowPhase::Architecture },
    developer = { "developer", WorkflowPhase::Implementation },
    minimal = { "minimal", WorkflowPhase::Unassigned },
    malformed = { "malformed", WorkflowPhase::Unassigned },
)]
fn test_fixture_phase(name: &str, expected: WorkflowPhase) {
    let agent = parse_document(&fixture(name));
    assert_eq!(detect_phase(&agent), expected);
}

#[test]
fn test_roster_phase_matches_detector() {
    let roster = team();
    for agent in &roster.agents {
        assert_eq!(agent.phase, detect_phase(&agent.parsed));
        assert_eq!(agent.stats, derive_stats(&agent.parsed));
    }
}

#[test]
fn test_by_phase_columns() {
    let all = fixtures(&[
        "architect",
        "complete",
        "developer",
        "malformed",
        "minimal",
        "task-manager",
    ]);
    let roster = build_roster(&all, DuplicatePolicy::Reject).unwrap();
    let columns = roster.by_phase();

    let (last_phase, unassigned) = columns.last().unwrap();
    assert_eq!(*last_phase, WorkflowPhase::Unassigned);
    let unassigned: Vec<&str> = unassigned.iter().map(|a| a.name()).collect();
    assert!(unassigned.contains(&"Minimal"));
    assert!(unassigned.contains(&"Malformed"));

    let placed: usize = columns.iter().map(|(_, members)| members.len()).sum();
    assert_eq!(placed, 6);
}

#[test]
fn test_minimal_stats() {
    let agent = parse_document(&fixture("minimal"));
    let stats = derive_stats(&agent);

    assert_eq!(stats.scope, 2);
    assert_eq!(stats.autonomy, 10);
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.rigor, 2);
    assert_eq!(stats.complexity, 1);
}

#[test]
fn test_complete_stats() {
    let complete = parse_document(&fixture("complete"));
    let minimal = parse_document(&fixture("minimal"));
    let inputs = StatInputs::collect(&complete);
    let stats = inputs.stats();

    assert_eq!(inputs.modes, 2);
    assert_eq!(inputs.checkboxes, 3);
    assert!(inputs.has_ask_tool);
    assert_eq!(stats.scope, 10);
    assert_eq!(stats.autonomy, 4);

    let baseline = derive_stats(&minimal);
    assert!(stats.scope >= baseline.scope);
    assert!(stats.rigor > baseline.rigor);
    assert!(stats.complexity > baseline.complexity);
}

#[test]
fn test_stats_stay_in_range() {
    let roster = build_roster(
        &fixtures(&["architect", "complete", "developer", "malformed", "minimal"]),
        DuplicatePolicy::Reject,
    )
    .unwrap();

    for agent in &roster.agents {
        let s = agent.stats;
        for value in [s.scope, s.autonomy, s.connections, s.rigor, s.complexity] {
            assert!((1..=10).contains(&value), "{} out of range", value);
        }
    }
}

fn duplicate_architects() -> Vec<RawDocument> {
    let mut second = fixture("architect");
    second.filename = "architect-copy.md".to_string();
    vec![fixture("architect"), fixture("minimal"), second]
}

#[test]
fn test_duplicates_rejected() {
    let err = build_roster(&duplicate_architects(), DuplicatePolicy::Reject).unwrap_err();
    assert_eq!(err, RosterError::DuplicateAgents(vec!["Architect".to_string()]));
    assert_eq!(err.to_string(), "Duplicate agent names: Architect");
}

#[parameterized(
    replace = { DuplicatePolicy::Replace, "architect-copy.md" },
    skip = { DuplicatePolicy::Skip, "architect.md" },
)]
fn test_duplicate_policy(policy: DuplicatePolicy, kept_file: &str) {
    let roster = build_roster(&duplicate_architects(), policy).unwrap();

    assert_eq!(roster.agents.len(), 2);
    assert_eq!(roster.agents[0].name(), "Architect");
    assert_eq!(roster.agents[0].parsed.filename, kept_file);
    assert_eq!(roster.agents[1].name(), "Minimal");
}
