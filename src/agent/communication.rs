//! Raw communication hints
//!
//! A cheap regex pass over the whole document. Captured names are free text
//! and are only resolved against real agents by the relationship detector.

use crate::agent::types::AgentCommunication;
use regex::Regex;
use std::sync::OnceLock;

struct CommunicationPatterns {
    invoked_by: Regex,
    route_to: Regex,
    invoke: Regex,
}

fn patterns() -> &'static CommunicationPatterns {
    static PATTERNS: OnceLock<CommunicationPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CommunicationPatterns {
        invoked_by: Regex::new(r"(?i)(?:when )?invoked by (\w[\w\s-]*\w)").expect("valid regex"),
        route_to: Regex::new(r"(?i)route\s+\w+\s+to\s+(\w[\w\s-]*\w)").expect("valid regex"),
        invoke: Regex::new(r"(?i)invoke[sd]?\s+(?:the\s+)?(\w[\w\s-]*\w?)(?:\s+agent)?")
            .expect("valid regex"),
    })
}

/// Generic "invoke X" captures outside this length window are noise.
const MIN_INVOKE_TARGET_LEN: usize = 3;
const MAX_INVOKE_TARGET_LEN: usize = 49;

pub fn derive_communication(markdown: &str) -> AgentCommunication {
    let patterns = patterns();
    let mut communication = AgentCommunication::default();

    for name in captures(&patterns.invoked_by, markdown) {
        communication.add_receives_from(name);
    }

    for name in captures(&patterns.route_to, markdown) {
        communication.add_talks_to(name);
    }

    for name in captures(&patterns.invoke, markdown) {
        let len = name.chars().count();
        if (MIN_INVOKE_TARGET_LEN..=MAX_INVOKE_TARGET_LEN).contains(&len) {
            communication.add_talks_to(name);
        }
    }

    communication
}

fn captures<'t>(re: &'t Regex, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
    re.captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
}
