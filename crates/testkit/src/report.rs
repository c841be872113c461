//! Summary report written at the end of a headless run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Overall run outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    /// Run completed.
    Pass,
    /// Run aborted.
    Fail,
}

/// Counters gathered over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Ticks simulated.
    pub ticks: u64,
    /// Ticks with at least one fuel slot burning.
    pub burning_ticks: u64,
    /// Fuel items consumed.
    pub fuel_consumed: u64,
    /// Smelts completed.
    pub smelted: u64,
    /// Visual/lighting refresh notifications.
    pub refreshes: u64,
}

/// Top-level run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub name: String,
    /// Timestamp when the report was built (RFC 3339).
    pub timestamp: String,
    /// Outcome.
    pub result: RunResult,
    /// Counters.
    pub counters: RunCounters,
    /// Phase when the run stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_phase: Option<String>,
    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
}

impl RunReport {
    /// Passing report stamped with the current time.
    pub fn new(name: impl Into<String>, counters: RunCounters) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            result: RunResult::Pass,
            counters,
            final_phase: None,
            duration_seconds: 0.0,
        }
    }

    /// Set the final phase label.
    pub fn final_phase(mut self, phase: impl Into<String>) -> Self {
        self.final_phase = Some(phase.into());
        self
    }

    /// Set the wall-clock duration.
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Set the outcome.
    pub fn result(mut self, result: RunResult) -> Self {
        self.result = result;
        self
    }
}

/// Writes run reports as pretty JSON.
pub struct RunReportSink {
    path: PathBuf,
}

impl RunReportSink {
    /// Create a sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Write `report`, replacing any previous file.
    pub fn write(&self, report: &RunReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("Failed to create report {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
