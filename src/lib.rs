//! dossier - structured records from agent definition markdown
//!
//! Agent definitions are markdown documents with a YAML frontmatter block
//! followed by heading-delimited sections. This library turns a set of them
//! into per-agent records, a stat card and workflow phase for each agent, and
//! the relationships between agents.
//!
//! # Pipeline
//!
//! 1. [`agent::frontmatter`] splits off and normalizes the metadata block
//! 2. [`agent::sections`] segments the body and [`agent::mapping`] files each
//!    section under a canonical key
//! 3. [`agent::communication`] collects free-text invocation hints
//! 4. [`analysis::stats`] and [`analysis::phases`] score every agent
//! 5. [`analysis::relationships`] resolves hints against the whole set
//!
//! [`analysis::roster::build_roster`] runs all of them.
//!
//! # Example
//!
//! ```
//! use dossier::{build_roster, DuplicatePolicy, RawDocument, WorkflowPhase};
//!
//! let docs = vec![
//!     RawDocument::new("---\nname: Architect\n---\n## Behavior\nWhen invoked by Task Manager, decide.", "architect.md"),
//!     RawDocument::new("---\nname: Task Manager\n---\n## Behavior\nCoordinates.", "task-manager.md"),
//! ];
//! let roster = build_roster(&docs, DuplicatePolicy::Reject).unwrap();
//!
//! assert_eq!(roster.agents[0].phase, WorkflowPhase::Architecture);
//! assert_eq!(roster.incoming("Architect").count(), 1);
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod heuristics;
pub mod loader;
pub mod util;

pub use agent::{parse_agent, parse_document, ParsedAgent, RawDocument};
pub use analysis::{
    build_roster, derive_stats, detect_phase, detect_relationships, AgentDossier,
    AgentRelationship, AgentStats, DuplicatePolicy, RelationshipType, Roster, RosterError,
    WorkflowPhase,
};
pub use config::{ConfigError, DossierConfig};
pub use loader::{DocumentLoader, LoadError, LoaderConfig};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const NAME: &str = env!("CARGO_PKG_NAME");
