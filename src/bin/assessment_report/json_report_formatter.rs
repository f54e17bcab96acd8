use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use pronunciation_rs::alignment::report::AggregateReport;
use pronunciation_rs::AssessmentReport;
use serde::Serialize;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub vocab_path: String,
    pub lexicon_path: String,
    pub sample_rate_hz: u32,
    pub fallback_policy: String,
    pub case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub audio_path: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CaseError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<AssessmentReport>,
    /// Selected normalized prediction, space-joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseError {
    pub code: String,
    pub detail: String,
}

pub fn write_report(path: &Path, report: &Report) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create report file '{}': {err}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|err| {
        format!(
            "Failed to serialize report JSON '{}': {err}",
            path.display()
        )
    })?;
    file.write_all(b"\n")
        .map_err(|err| format!("Failed to finalize report file '{}': {err}", path.display()))?;
    Ok(())
}
