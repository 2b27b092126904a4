//! Cross-document analysis: relationships, phases, stat cards and the
//! assembled roster.

pub mod phases;
pub mod relationships;
pub mod roster;
pub mod stats;

pub use phases::{detect_phase, phase_scores, PhaseScores, WorkflowPhase};
pub use relationships::{detect_relationships, AgentRelationship, RelationshipType};
pub use roster::{build_roster, AgentDossier, DuplicatePolicy, Roster, RosterError};
pub use stats::{derive_stats, AgentStats, StatInputs};
