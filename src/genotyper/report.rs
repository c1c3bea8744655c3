
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::database::reference_table::TableMetadata;
use crate::genotyper::matcher::MatchResult;
use crate::genotyper::sample::ObservedSample;
use crate::util::file_io::{save_json, save_line};

/// Written in place of a label when no pair matched
pub const NO_MATCH_LABEL: &str = "NO_MATCH";

/// The single-line answer for a sample: the best label, or `NO_MATCH_LABEL`
pub fn report_line(result: &MatchResult) -> String {
    match result.best() {
        Some(pair) => pair.label().to_string(),
        None => NO_MATCH_LABEL.to_string()
    }
}

/// Writes the single-line report for a sample
/// # Errors
/// * if the file cannot be written
pub fn save_report_line(result: &MatchResult, filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    save_line(&report_line(result), filename)
}

/// One candidate in the detailed report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateSummary {
    pub label: String,
    pub total_cnv: u32,
    pub ranking: u8
}

/// Detailed report for a single sample, intended for debugging a call
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleReport {
    /// Version of the tool that made the call
    pub tool_version: String,
    /// Metadata of the reference table used
    pub table_metadata: TableMetadata,
    /// Sample label
    pub sample_name: String,
    /// The copy number filter, if any
    pub observed_cnv: Option<u32>,
    /// The calls that were matched
    pub marker_calls: BTreeMap<String, String>,
    /// Best label or NO_MATCH
    pub best: String,
    /// Every matching pair, best first
    pub candidates: Vec<CandidateSummary>
}

impl SampleReport {
    pub fn new(table_metadata: &TableMetadata, sample: &ObservedSample, result: &MatchResult) -> SampleReport {
        SampleReport {
            tool_version: crate::cli::core::FULL_VERSION.to_string(),
            table_metadata: table_metadata.clone(),
            sample_name: sample.sample_name().to_string(),
            observed_cnv: result.observed_cnv(),
            marker_calls: sample.marker_calls().iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            best: report_line(result),
            candidates: result.candidates().iter()
                .map(|p| CandidateSummary {
                    label: p.label().to_string(),
                    total_cnv: p.total_cnv(),
                    ranking: p.ranking()
                })
                .collect()
        }
    }

    /// Writes the report as JSON
    pub fn save(&self, filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
        save_json(self, filename)
    }
}
