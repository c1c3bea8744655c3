
use log::{info, warn};
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};
use simple_error::bail;
use std::path::{Path, PathBuf};

use crate::database::reference_table::ReferencePairTable;
use crate::genotyper::matcher::{match_batch, MatchResult};
use crate::genotyper::report::{report_line, save_report_line, SampleReport};
use crate::genotyper::sample::{load_cnv_value, load_vcf_sample, ObservedSample};

/// Name of the per-batch summary file
pub const SUMMARY_FILENAME: &str = "summary.tsv";

/// One row of the batch manifest
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ManifestEntry {
    /// Sample label, also used for the report filenames
    pub sample: String,
    /// The sample VCF
    pub vcf: PathBuf,
    /// Optional copy-number assay output
    #[serde(default)]
    pub cnv: Option<PathBuf>
}

/// Loads a batch manifest: tab-delimited with a `sample`, `vcf`, and optional `cnv` column.
/// Relative paths are resolved against the manifest folder.
/// # Errors
/// * if the manifest cannot be read or parsed
/// * if a sample label is repeated or cannot be used as a filename
pub fn load_manifest(filename: &Path) -> Result<Vec<ManifestEntry>, Box<dyn std::error::Error>> {
    let base_dir: PathBuf = filename.parent().map(|p| p.to_path_buf()).unwrap_or_default();
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(filename)?;

    let mut entries: Vec<ManifestEntry> = vec![];
    let mut observed: HashSet<String> = Default::default();
    for result in csv_reader.deserialize() {
        let mut entry: ManifestEntry = result?;
        if entry.sample.is_empty() || entry.sample.contains(std::path::is_separator) {
            bail!("Sample label {:?} cannot be used for output files", entry.sample);
        }
        if !observed.insert(entry.sample.clone()) {
            bail!("Sample {} is listed more than once", entry.sample);
        }

        if entry.vcf.is_relative() {
            entry.vcf = base_dir.join(&entry.vcf);
        }
        entry.cnv = entry.cnv
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| if p.is_relative() { base_dir.join(p) } else { p });
        entries.push(entry);
    }
    Ok(entries)
}

/// Loads the VCF calls and the optional copy number for one manifest entry.
/// The manifest label replaces the VCF sample name.
/// An assay copy number that disagrees with the VCF copy-number record is an error.
/// # Arguments
/// * `entry` - the manifest row
/// * `marker_filter` - see `load_vcf_sample`
pub fn load_entry(entry: &ManifestEntry, marker_filter: Option<&HashSet<String>>) -> Result<ObservedSample, Box<dyn std::error::Error>> {
    let mut sample = load_vcf_sample(&entry.vcf, marker_filter)?;
    sample.set_sample_name(entry.sample.clone());
    if let Some(cnv_fn) = entry.cnv.as_ref() {
        sample.apply_assay_cnv(load_cnv_value(cnv_fn)?)?;
    }
    Ok(sample)
}

/// Outcome class for a sample in the summary
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum_macros::Display, strum_macros::EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SampleStatus {
    Match,
    NoMatch,
    InputError
}

/// One row of the summary file
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SummaryRow {
    pub sample: String,
    pub status: SampleStatus,
    /// Best label, NO_MATCH, or empty for input errors
    pub best: String,
    /// Number of matching pairs
    pub num_candidates: usize,
    /// Error description for input errors
    pub message: String
}

impl SummaryRow {
    fn from_result(sample: &str, result: &MatchResult) -> SummaryRow {
        let status = if result.is_no_match() {
            SampleStatus::NoMatch
        } else {
            SampleStatus::Match
        };
        SummaryRow {
            sample: sample.to_string(),
            status,
            best: report_line(result),
            num_candidates: result.candidates().len(),
            message: String::new()
        }
    }

    fn input_error(sample: &str, message: String) -> SummaryRow {
        SummaryRow {
            sample: sample.to_string(),
            status: SampleStatus::InputError,
            best: String::new(),
            num_candidates: 0,
            message
        }
    }
}

/// Genotypes every sample in a manifest against one table.
/// Each sample gets "{sample}.txt" and "{sample}.json" reports in the output folder, except for input errors.
/// A failure in one sample is recorded in the summary and never stops the rest.
/// # Arguments
/// * `table` - the reference table
/// * `entries` - manifest rows, the summary follows this order
/// * `marker_filter` - optional VCF marker filter, see `load_vcf_sample`
/// * `output_folder` - existing folder for the reports and summary
/// # Errors
/// * if a report or the summary cannot be written
pub fn run_batch(
    table: &ReferencePairTable, entries: &[ManifestEntry],
    marker_filter: Option<&HashSet<String>>, output_folder: &Path
) -> Result<Vec<SummaryRow>, Box<dyn std::error::Error>> {
    // loading is I/O so it stays serial, the matching goes parallel
    let mut load_errors: Vec<Option<String>> = Vec::with_capacity(entries.len());
    let mut samples: Vec<ObservedSample> = vec![];
    for entry in entries.iter() {
        match load_entry(entry, marker_filter) {
            Ok(sample) => {
                load_errors.push(None);
                samples.push(sample);
            },
            Err(e) => {
                warn!("Failed to load {}: {e}", entry.sample);
                load_errors.push(Some(e.to_string()));
            }
        };
    }

    info!("Matching {} samples...", samples.len());
    let mut match_results = match_batch(table, &samples).into_iter().zip(samples.iter());

    let mut summary: Vec<SummaryRow> = Vec::with_capacity(entries.len());
    for (entry, load_error) in entries.iter().zip(load_errors.into_iter()) {
        if let Some(message) = load_error {
            summary.push(SummaryRow::input_error(&entry.sample, message));
            continue;
        }

        let (result, sample) = match match_results.next() {
            Some(r) => r,
            None => bail!("Missing match result for {}", entry.sample)
        };
        match result {
            Ok(match_result) => {
                save_report_line(&match_result, &output_folder.join(format!("{}.txt", entry.sample)))?;
                SampleReport::new(table.table_metadata(), sample, &match_result)
                    .save(&output_folder.join(format!("{}.json", entry.sample)))?;
                summary.push(SummaryRow::from_result(&entry.sample, &match_result));
            },
            Err(e) => {
                warn!("Failed to genotype {}: {e}", entry.sample);
                summary.push(SummaryRow::input_error(&entry.sample, e.to_string()));
            }
        };
    }

    save_summary(&summary, &output_folder.join(SUMMARY_FILENAME))?;
    Ok(summary)
}

/// Writes the batch summary as a TSV
pub fn save_summary(summary: &[SummaryRow], filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(filename)?;
    for row in summary.iter() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::build_database::tests::test_data_table;

    fn universe(table: &ReferencePairTable) -> HashSet<String> {
        table.markers().iter().cloned().collect()
    }

    #[test]
    fn test_load_manifest() {
        let entries = load_manifest(Path::new("test_data/samples/manifest.tsv")).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], ManifestEntry {
            sample: "sample_1_4".to_string(),
            vcf: PathBuf::from("test_data/samples/sample_1_4.vcf"),
            cnv: Some(PathBuf::from("test_data/samples/sample_1_4.cnv.txt"))
        });
        assert_eq!(entries[1].cnv, None);
        assert_eq!(entries[2].vcf, PathBuf::from("test_data/samples/sample_extra_marker.vcf"));
    }

    #[test]
    fn test_bad_manifest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("manifest.tsv");
        std::fs::write(&path, "sample\tvcf\tcnv\na\ta.vcf\t\na\tb.vcf\t\n").unwrap();
        assert!(load_manifest(&path).is_err());

        std::fs::write(&path, "sample\tvcf\tcnv\nsub/a\ta.vcf\t\n").unwrap();
        assert!(load_manifest(&path).is_err());
    }

    #[test]
    fn test_summary_status() {
        assert_eq!(SampleStatus::NoMatch.to_string(), "NO_MATCH");
        assert_eq!(SampleStatus::InputError.to_string(), "INPUT_ERROR");
        assert_eq!(serde_json::to_string(&SampleStatus::Match).unwrap(), "\"MATCH\"");
    }

    #[test]
    fn test_run_batch() {
        let table = test_data_table();
        let mut entries = load_manifest(Path::new("test_data/samples/manifest.tsv")).unwrap();
        entries.push(ManifestEntry {
            sample: "missing".to_string(),
            vcf: PathBuf::from("test_data/samples/does_not_exist.vcf"),
            cnv: None
        });

        let temp_dir = tempfile::tempdir().unwrap();
        let summary = run_batch(&table, &entries, None, temp_dir.path()).unwrap();
        let statuses: Vec<(&str, SampleStatus, &str)> = summary.iter()
            .map(|r| (r.sample.as_str(), r.status, r.best.as_str()))
            .collect();
        assert_eq!(statuses, vec![
            ("sample_1_4", SampleStatus::Match, "CYP2D6*1/CYP2D6*4"),
            ("sample_2_10", SampleStatus::Match, "CYP2D6*2/CYP2D6*10"),
            ("sample_extra", SampleStatus::InputError, ""),
            ("missing", SampleStatus::InputError, "")
        ]);
        assert_eq!(summary[0].num_candidates, 2);
        assert_eq!(summary[1].num_candidates, 3);

        let line = std::fs::read_to_string(temp_dir.path().join("sample_1_4.txt")).unwrap();
        assert_eq!(line, "CYP2D6*1/CYP2D6*4\n");
        assert!(temp_dir.path().join("sample_2_10.json").exists());
        assert!(!temp_dir.path().join("sample_extra.txt").exists());
        assert!(!temp_dir.path().join("missing.txt").exists());

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(temp_dir.path().join(SUMMARY_FILENAME))
            .unwrap();
        let reloaded: Vec<SummaryRow> = csv_reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(reloaded, summary);
    }

    #[test]
    fn test_run_batch_vcf_cnv() {
        let table = test_data_table();
        let temp_dir = tempfile::tempdir().unwrap();
        let other_cnv = temp_dir.path().join("other.cnv.txt");
        std::fs::write(&other_cnv, "CYP2D6_CNV\t3\n").unwrap();

        let vcf = PathBuf::from("test_data/samples/sample_1_4_cnv.vcf");
        let entries = vec![
            ManifestEntry { sample: "vcf_only".to_string(), vcf: vcf.clone(), cnv: None },
            ManifestEntry { sample: "agree".to_string(), vcf: vcf.clone(), cnv: Some(PathBuf::from("test_data/samples/sample_1_4.cnv.txt")) },
            ManifestEntry { sample: "conflict".to_string(), vcf, cnv: Some(other_cnv) }
        ];
        let out_dir = temp_dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let summary = run_batch(&table, &entries, None, &out_dir).unwrap();

        assert_eq!(summary[0].status, SampleStatus::Match);
        assert_eq!(summary[0].best, "CYP2D6*1/CYP2D6*4");
        assert_eq!(summary[0].num_candidates, 2);
        assert_eq!(summary[1], SummaryRow { sample: "agree".to_string(), ..summary[0].clone() });
        assert_eq!(summary[2].status, SampleStatus::InputError);
        assert!(summary[2].message.contains("conflicts"));
        assert!(!out_dir.join("conflict.txt").exists());
    }

    #[test]
    fn test_run_batch_filtered() {
        let table = test_data_table();
        let entries = load_manifest(Path::new("test_data/samples/manifest.tsv")).unwrap();
        let marker_filter = universe(&table);

        let temp_dir = tempfile::tempdir().unwrap();
        let summary = run_batch(&table, &entries, Some(&marker_filter), temp_dir.path()).unwrap();
        assert_eq!(summary[2].status, SampleStatus::NoMatch);
        assert_eq!(summary[2].best, "NO_MATCH");
        let line = std::fs::read_to_string(temp_dir.path().join("sample_extra.txt")).unwrap();
        assert_eq!(line, "NO_MATCH\n");
    }
}
