//! Workflow phase classification
//!
//! Every phase carries a list of signal patterns. A phase's score is the
//! total number of matches of its signals in the raw document, boosted by an
//! explicit `"phase": "<name>"` declaration and by hints in the agent name.

use crate::agent::types::ParsedAgent;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    Requirements,
    Architecture,
    Design,
    Implementation,
    Review,
    Testing,
    Documentation,
    Unassigned,
}

impl WorkflowPhase {
    /// Scored phases in tie-break order.
    pub const SCORED: [WorkflowPhase; 7] = [
        WorkflowPhase::Requirements,
        WorkflowPhase::Architecture,
        WorkflowPhase::Design,
        WorkflowPhase::Implementation,
        WorkflowPhase::Review,
        WorkflowPhase::Testing,
        WorkflowPhase::Documentation,
    ];

    /// Pipeline column order.
    pub const ALL: [WorkflowPhase; 8] = [
        WorkflowPhase::Requirements,
        WorkflowPhase::Architecture,
        WorkflowPhase::Design,
        WorkflowPhase::Implementation,
        WorkflowPhase::Review,
        WorkflowPhase::Testing,
        WorkflowPhase::Documentation,
        WorkflowPhase::Unassigned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowPhase::Requirements => "requirements",
            WorkflowPhase::Architecture => "architecture",
            WorkflowPhase::Design => "design",
            WorkflowPhase::Implementation => "implementation",
            WorkflowPhase::Review => "review",
            WorkflowPhase::Testing => "testing",
            WorkflowPhase::Documentation => "documentation",
            WorkflowPhase::Unassigned => "unassigned",
        }
    }

    fn index(self) -> Option<usize> {
        Self::SCORED.iter().position(|p| *p == self)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WorkflowPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown workflow phase: {}", s))
    }
}

const DECLARATION_BOOST: u32 = 20;
const NAME_HINT_BOOST: u32 = 15;

const PHASE_SIGNALS: [(WorkflowPhase, &[&str]); 7] = [
    (
        WorkflowPhase::Requirements,
        &[
            r"(?i)\brequirements?\b",
            r"\bREQ-",
            r"(?i)\bstakeholder\b",
            r"(?i)\bneeds\b",
            r"(?i)acceptance criteria",
            r"(?i)elicit",
        ],
    ),
    (
        WorkflowPhase::Architecture,
        &[
            r"(?i)\barchitect\b",
            r"\bADR\b",
            r"(?i)technology choice",
            r"(?i)quality attributes",
            r#"(?i)phase:\s*"?architecture"#,
        ],
    ),
    (
        WorkflowPhase::Design,
        &[
            r"(?i)\bdesign\b",
            r"(?i)design-docs/",
            r#"(?i)phase:\s*"?design"#,
            r"(?i)\btemplate\b",
            r"(?i)\borchestrator\b",
        ],
    ),
    (
        WorkflowPhase::Implementation,
        &[
            r"(?i)\bdeveloper\b",
            r"(?i)\bcoder\b",
            r"(?i)\bimplement",
            r#"(?i)phase:\s*"?(?:development|implementation)"#,
        ],
    ),
    (
        WorkflowPhase::Review,
        &[
            r"(?i)\breview",
            r"(?i)code-reviewer",
            r"\bREVIEW_PASS\b",
            r"\bREVIEW_FAIL\b",
            r#"(?i)phase:\s*"?review"#,
        ],
    ),
    (
        WorkflowPhase::Testing,
        &[
            r"(?i)\btest\b",
            r"(?i)test-coder",
            r"(?i)\bcoverage\b",
            r#"(?i)phase:\s*"?testing"#,
            r"(?i)test plan",
            r"(?i)test runner",
        ],
    ),
    (
        WorkflowPhase::Documentation,
        &[
            r"(?i)\bdocumentation\b",
            r"(?i)\bdocs\b",
            r"(?i)user-docs/",
            r"(?i)developer-docs/",
            r#"(?i)phase:\s*"?documentation"#,
        ],
    ),
];

/// Substrings of the lowercased agent name that hint at a phase.
const NAME_HINTS: [(&str, WorkflowPhase); 7] = [
    ("architect", WorkflowPhase::Architecture),
    ("design", WorkflowPhase::Design),
    ("developer", WorkflowPhase::Implementation),
    ("review", WorkflowPhase::Review),
    ("test", WorkflowPhase::Testing),
    ("document", WorkflowPhase::Documentation),
    ("requirement", WorkflowPhase::Requirements),
];

fn compiled_signals() -> &'static [(WorkflowPhase, Vec<Regex>)] {
    static SIGNALS: OnceLock<Vec<(WorkflowPhase, Vec<Regex>)>> = OnceLock::new();
    SIGNALS.get_or_init(|| {
        PHASE_SIGNALS
            .iter()
            .map(|(phase, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("valid phase signal"))
                    .collect();
                (*phase, compiled)
            })
            .collect()
    })
}

fn declaration_regex() -> &'static Regex {
    static DECLARATION: OnceLock<Regex> = OnceLock::new();
    DECLARATION.get_or_init(|| {
        Regex::new(r#"(?i)["']phase["']\s*:\s*["'](\w+)["']"#).expect("valid regex")
    })
}

/// Per-phase totals in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseScores([u32; 7]);

impl PhaseScores {
    pub fn get(&self, phase: WorkflowPhase) -> u32 {
        phase.index().map(|i| self.0[i]).unwrap_or(0)
    }

    fn add(&mut self, phase: WorkflowPhase, amount: u32) {
        if let Some(i) = phase.index() {
            self.0[i] += amount;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkflowPhase, u32)> + '_ {
        WorkflowPhase::SCORED.iter().copied().zip(self.0.iter().copied())
    }

    /// Strictly highest score wins; ties go to the earlier phase. All-zero
    /// scores mean no signal at all.
    pub fn winner(&self) -> WorkflowPhase {
        let mut best = WorkflowPhase::Unassigned;
        let mut best_score = 0;
        for (phase, score) in self.iter() {
            if score > best_score {
                best = phase;
                best_score = score;
            }
        }
        best
    }
}

impl Serialize for PhaseScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (phase, score) in self.iter() {
            map.serialize_entry(phase.as_str(), &score)?;
        }
        map.end()
    }
}

/// Computes the full score table for an agent.
pub fn phase_scores(agent: &ParsedAgent) -> PhaseScores {
    let text = &agent.raw_markdown;
    let mut scores = PhaseScores::default();

    for (phase, signals) in compiled_signals() {
        let hits: usize = signals.iter().map(|re| re.find_iter(text).count()).sum();
        scores.add(*phase, hits as u32);
    }

    if let Some(declared) = declared_phase(text) {
        trace!(agent = agent.name(), declared = %declared, "Explicit phase declaration");
        if let Ok(phase) = declared.parse::<WorkflowPhase>() {
            scores.add(phase, DECLARATION_BOOST);
        }
        if declared == "development" {
            scores.add(WorkflowPhase::Implementation, DECLARATION_BOOST);
        }
    }

    let name = agent.name().to_lowercase();
    for (hint, phase) in NAME_HINTS {
        if name.contains(hint) {
            scores.add(phase, NAME_HINT_BOOST);
        }
    }

    scores
}

/// First `"phase": "<word>"` assignment in the text, lowercased.
fn declared_phase(text: &str) -> Option<String> {
    declaration_regex()
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_lowercase())
}

pub fn detect_phase(agent: &ParsedAgent) -> WorkflowPhase {
    phase_scores(agent).winner()
}
