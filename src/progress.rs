//! Fetch progress reporting.
//!
//! Reports what `catalog fetch` is doing: the listing it found, each plugin
//! as it is built, notes about artifacts that degraded to empty content,
//! and per-plugin failures. Progress is emitted on **stderr** so the run
//! summary on stdout stays parseable for scripts.

use anyhow::{bail, Result};
use std::io::Write;
use std::path::PathBuf;

/// A single progress event for a fetch run.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchEvent {
    /// The root listing was parsed.
    ListingFound { total: u64 },
    /// Starting plugin `n` of `total`.
    EntityStarted { id: String, n: u64, total: u64 },
    /// Plugin built and kept.
    EntityFinished {
        id: String,
        agents: u64,
        commands: u64,
    },
    /// Plugin skipped.
    EntityFailed { id: String, error: String },
    /// An artifact was missing or unreadable and was replaced with a fallback.
    Note { id: String, message: String },
    /// Fixed pause between batches.
    Pausing { after: u64, millis: u64 },
    /// Catalog written.
    Saved { path: PathBuf, plugins: u64 },
}

impl FetchEvent {
    /// Notes and failures are shown even when routine progress is not.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            FetchEvent::Note { .. } | FetchEvent::EntityFailed { .. }
        )
    }
}

/// Receives fetch progress. Implementations write to stderr (human or JSON).
pub trait FetchReporter: Send + Sync {
    /// Emit a progress event. Called from the ingest pipeline.
    fn report(&self, event: FetchEvent);
}

/// Human-friendly progress on stderr: "fetch  12 / 140  git-helper".
pub struct StderrProgress;

impl FetchReporter for StderrProgress {
    fn report(&self, event: FetchEvent) {
        write_stderr(&human_line(&event));
    }
}

fn human_line(event: &FetchEvent) -> String {
    match event {
        FetchEvent::ListingFound { total } => {
            format!("fetch  found {} plugins in listing\n", format_number(*total))
        }
        FetchEvent::EntityStarted { id, n, total } => format!(
            "fetch  {} / {}  {}\n",
            format_number(*n),
            format_number(*total),
            id
        ),
        FetchEvent::EntityFinished {
            id,
            agents,
            commands,
        } => format!(
            "fetch  ok  {}  ({} agents, {} commands)\n",
            id, agents, commands
        ),
        FetchEvent::EntityFailed { id, error } => {
            format!("fetch  FAILED  {}: {}\n", id, error)
        }
        FetchEvent::Note { id, message } => format!("warning: {}: {}\n", id, message),
        FetchEvent::Pausing { after, millis } => format!(
            "fetch  pausing {}ms after {} plugins\n",
            millis,
            format_number(*after)
        ),
        FetchEvent::Saved { path, plugins } => format!(
            "fetch  saved {} plugins to {}\n",
            format_number(*plugins),
            path.display()
        ),
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl FetchReporter for JsonProgress {
    fn report(&self, event: FetchEvent) {
        if let Ok(line) = serde_json::to_string(&json_event(&event)) {
            write_stderr(&format!("{}\n", line));
        }
    }
}

fn json_event(event: &FetchEvent) -> serde_json::Value {
    match event {
        FetchEvent::ListingFound { total } => serde_json::json!({
            "event": "listing",
            "total": total
        }),
        FetchEvent::EntityStarted { id, n, total } => serde_json::json!({
            "event": "progress",
            "id": id,
            "n": n,
            "total": total
        }),
        FetchEvent::EntityFinished {
            id,
            agents,
            commands,
        } => serde_json::json!({
            "event": "finished",
            "id": id,
            "agents": agents,
            "commands": commands
        }),
        FetchEvent::EntityFailed { id, error } => serde_json::json!({
            "event": "failed",
            "id": id,
            "error": error
        }),
        FetchEvent::Note { id, message } => serde_json::json!({
            "event": "note",
            "id": id,
            "message": message
        }),
        FetchEvent::Pausing { after, millis } => serde_json::json!({
            "event": "pause",
            "after": after,
            "millis": millis
        }),
        FetchEvent::Saved { path, plugins } => serde_json::json!({
            "event": "saved",
            "path": path.display().to_string(),
            "plugins": plugins
        }),
    }
}

/// Human lines for notes and failures only. Used when stderr is not a
/// terminal so degraded artifacts still leave a trace in logs.
pub struct WarningsOnly;

impl FetchReporter for WarningsOnly {
    fn report(&self, event: FetchEvent) {
        if event.is_warning() {
            write_stderr(&human_line(&event));
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl FetchReporter for NoProgress {
    fn report(&self, _event: FetchEvent) {}
}

fn write_stderr(line: &str) {
    let mut err = std::io::stderr().lock();
    let _ = err.write_all(line.as_bytes());
    let _ = err.flush();
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    /// Notes and failures only.
    Warnings,
    Human,
    Json,
}

impl ProgressMode {
    /// Resolve an `[output] progress` setting. `auto` is human progress when
    /// stderr is a TTY, otherwise warnings only.
    pub fn from_setting(setting: &str) -> Result<Self> {
        Ok(match setting {
            "auto" => Self::default_for_tty(),
            "human" => ProgressMode::Human,
            "json" => ProgressMode::Json,
            "off" => ProgressMode::Off,
            other => bail!("Unknown progress mode: '{}'", other),
        })
    }

    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Warnings
        }
    }

    /// Build a reporter for this mode. Caller can pass it to ingest.
    pub fn reporter(&self) -> Box<dyn FetchReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Warnings => Box::new(WarningsOnly),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn only_notes_and_failures_are_warnings() {
        assert!(FetchEvent::Note {
            id: "a".into(),
            message: "m".into()
        }
        .is_warning());
        assert!(FetchEvent::EntityFailed {
            id: "a".into(),
            error: "e".into()
        }
        .is_warning());
        assert!(!FetchEvent::ListingFound { total: 3 }.is_warning());
    }

    #[test]
    fn human_lines() {
        let line = human_line(&FetchEvent::EntityStarted {
            id: "git-helper".into(),
            n: 12,
            total: 1400,
        });
        assert_eq!(line, "fetch  12 / 1,400  git-helper\n");
        let line = human_line(&FetchEvent::Note {
            id: "x".into(),
            message: "no README".into(),
        });
        assert_eq!(line, "warning: x: no README\n");
    }

    #[test]
    fn json_events_are_tagged() {
        let v = json_event(&FetchEvent::Pausing {
            after: 10,
            millis: 1000,
        });
        assert_eq!(v["event"], "pause");
        assert_eq!(v["millis"], 1000);
    }

    #[test]
    fn settings_resolve() {
        assert_eq!(ProgressMode::from_setting("json").unwrap(), ProgressMode::Json);
        assert_eq!(ProgressMode::from_setting("off").unwrap(), ProgressMode::Off);
        assert!(ProgressMode::from_setting("loud").is_err());
    }
}
