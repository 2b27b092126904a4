// Score logging for the phase and stat heuristics
use crate::analysis::phases::phase_scores;
use crate::analysis::roster::{AgentDossier, Roster};
use crate::analysis::stats::StatInputs;
use serde::{Serialize, Serializer};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

#[derive(Serialize)]
struct ScoreEntry<'a, I, O>
where
    I: Serialize,
    O: Serialize,
{
    stage: &'a str,
    agent: &'a str,
    #[serde(serialize_with = "serialize_as_json")]
    input: I,
    #[serde(serialize_with = "serialize_as_json")]
    output: O,
    timestamp: u64,
}

fn serialize_as_json<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let json_string = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&json_string)
}

/// Appends one JSON line per agent per scoring stage.
#[derive(Clone)]
pub struct ScoreLogger {
    writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl ScoreLogger {
    /// Opens `log_file` for appending. An unopenable file leaves the logger
    /// disabled.
    pub fn new(log_file: Option<&Path>) -> Self {
        let writer = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(Arc::new(Mutex::new(BufWriter::new(file)))),
                Err(e) => {
                    warn!("Failed to open score log file {:?}: {}", path, e);
                    None
                }
            }
        });

        Self { writer }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn log_stage<I, O>(&self, stage: &str, agent: &str, input: &I, output: &O)
    where
        I: Serialize,
        O: Serialize,
    {
        let Some(writer) = &self.writer else {
            return;
        };

        let entry = ScoreEntry {
            stage,
            agent,
            input,
            output,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize score entry for stage {}: {}", stage, e);
                return;
            }
        };

        if let Ok(mut writer) = writer.lock() {
            if let Err(e) = writeln!(writer, "{}", json) {
                warn!("Failed to write score log entry: {}", e);
            }
            if let Err(e) = writer.flush() {
                warn!("Failed to flush score log: {}", e);
            }
        }

        debug!("Score log: stage={} agent={}", stage, agent);
    }

    /// Records the phase and stats decisions behind one enriched agent.
    pub fn log_agent(&self, agent: &AgentDossier) {
        if !self.is_enabled() {
            return;
        }
        let scores = phase_scores(&agent.parsed);
        self.log_stage("phase", agent.name(), &scores, &agent.phase);

        let inputs = StatInputs::collect(&agent.parsed);
        self.log_stage("stats", agent.name(), &inputs, &agent.stats);
    }

    pub fn log_roster(&self, roster: &Roster) {
        for agent in &roster.agents {
            self.log_agent(agent);
        }
    }
}
