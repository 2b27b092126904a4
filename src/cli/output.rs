//! Output formatting for multiple formats
//!
//! JSON and YAML serialize the records as-is. The human format is a terminal
//! summary and is not meant to be parsed.

use anyhow::{Context, Result};

use crate::analysis::roster::{AgentDossier, Roster};
use crate::analysis::stats::AgentStats;
use crate::config::DossierConfig;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";
const BRANCH: &str = "\u{251C}\u{2500}";
const LAST_BRANCH: &str = "\u{2514}\u{2500}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_roster(&self, roster: &Roster) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(roster).context("Failed to serialize roster to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(roster).context("Failed to serialize roster to YAML")
            }
            OutputFormat::Human => Ok(self.format_roster_human(roster)),
        }
    }

    pub fn format_agent(&self, agent: &AgentDossier) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(agent).context("Failed to serialize agent to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(agent).context("Failed to serialize agent to YAML")
            }
            OutputFormat::Human => Ok(self.format_agent_human(agent)),
        }
    }

    pub fn format_config(&self, config: &DossierConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&config.to_display_map())
                .context("Failed to serialize config to YAML"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_roster_human(&self, roster: &Roster) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Agent Roster\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!(
            "Agents: {}   Relationships: {}\n\n",
            roster.agents.len(),
            roster.relationships.len()
        ));

        output.push_str("Pipeline:\n");
        let columns = roster.by_phase();
        for (i, (phase, members)) in columns.iter().enumerate() {
            let connector = if i == columns.len() - 1 { LAST_BRANCH } else { BRANCH };
            let names = if members.is_empty() {
                "(none)".to_string()
            } else {
                members.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
            };
            output.push_str(&format!("{} {:<15} {}\n", connector, phase, names));
        }
        output.push('\n');

        output.push_str("Agents:\n");
        for agent in &roster.agents {
            output.push_str(&format!("  {} ({})\n", agent.name(), agent.parsed.filename));
            output.push_str(&format!("  {} Phase:    {}\n", BRANCH, agent.phase));
            let keys: Vec<&str> = agent.parsed.mapped_sections.keys().collect();
            output.push_str(&format!("  {} Sections: {}\n", BRANCH, list_or_none(&keys)));
            output.push_str(&format!("  {} Stats:    {}\n", LAST_BRANCH, stat_line(&agent.stats)));
        }

        if !roster.relationships.is_empty() {
            output.push_str("\nRelationships:\n");
            for rel in &roster.relationships {
                output.push_str(&format!(
                    "  {} --{}--> {}\n      \"{}\"\n",
                    rel.source_agent, rel.relationship_type, rel.target_agent, rel.evidence
                ));
            }
        }

        output
    }

    fn format_agent_human(&self, agent: &AgentDossier) -> String {
        let parsed = &agent.parsed;
        let fm = &parsed.frontmatter;
        let mut output = String::new();

        output.push_str(&format!("\u{2713} {}\n", fm.name));
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("File:         {}\n", parsed.filename));
        if !fm.description.is_empty() {
            output.push_str(&format!("Description:  {}\n", fm.description));
        }
        output.push_str(&format!("Tools:        {}\n", list_or_none(&fm.tools)));
        if let Some(ref model) = fm.model {
            output.push_str(&format!("Model:        {}\n", model));
        }
        output.push_str(&format!("Phase:        {}\n\n", agent.phase));

        output.push_str("Stats:\n");
        let stats = [
            ("Scope", agent.stats.scope),
            ("Autonomy", agent.stats.autonomy),
            ("Connections", agent.stats.connections),
            ("Rigor", agent.stats.rigor),
            ("Complexity", agent.stats.complexity),
        ];
        for (i, (label, value)) in stats.iter().enumerate() {
            let connector = if i == stats.len() - 1 { LAST_BRANCH } else { BRANCH };
            output.push_str(&format!(
                "{} {:<12} {} {}\n",
                connector,
                label,
                stat_bar(*value),
                value
            ));
        }
        output.push('\n');

        output.push_str("Sections:\n");
        if parsed.all_sections.is_empty() {
            output.push_str("  (none)\n");
        }
        for section in &parsed.all_sections {
            let indent = "  ".repeat(section.level.saturating_sub(1));
            output.push_str(&format!(
                "{}{} {}\n",
                indent,
                "#".repeat(section.level),
                section.heading
            ));
        }

        output.push_str(&format!(
            "\nMapped: {}\n",
            list_or_none(&parsed.mapped_sections.keys().collect::<Vec<_>>())
        ));

        let comm = &parsed.communication;
        if !comm.talks_to.is_empty() || !comm.receives_from.is_empty() {
            output.push_str("\nCommunication:\n");
            output.push_str(&format!(
                "{} Talks to:      {}\n",
                BRANCH,
                list_or_none(&comm.talks_to)
            ));
            output.push_str(&format!(
                "{} Receives from: {}\n",
                LAST_BRANCH,
                list_or_none(&comm.receives_from)
            ));
        }

        output
    }
}

fn list_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
    }
}

fn stat_bar(value: u8) -> String {
    let filled = usize::from(value.min(10));
    "\u{2588}".repeat(filled) + &"\u{2591}".repeat(10 - filled)
}

fn stat_line(stats: &AgentStats) -> String {
    format!(
        "SCO {} AUT {} CON {} RIG {} CPX {}",
        stats.scope, stats.autonomy, stats.connections, stats.rigor, stats.complexity
    )
}
