
use clap::Args;
use log::{debug, info};
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{AFTER_HELP, check_optional_filename, check_required_filename};

#[derive(Args, Clone, Default)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct GenotypeSettings {
    /// Input reference table file (JSON)
    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "database")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_database: PathBuf,

    /// Input marker genotypes in VCF format, the first sample is used
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "vcf")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub vcf_filename: PathBuf,

    /// Copy-number assay output, "<label> <integer>" on the first data line
    #[clap(long = "cnv")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub cnv_filename: Option<PathBuf>,

    /// Output report, a single line with the best diplotype or NO_MATCH
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-calls")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub report_filename: PathBuf,

    /// Optional detailed report with every candidate pair
    #[clap(long = "output-json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub json_filename: Option<PathBuf>,

    /// Overrides the sample name from the VCF header
    #[clap(long = "sample-name")]
    #[clap(value_name = "NAME")]
    #[clap(help_heading = Some("Genotype options"))]
    pub sample_name: Option<String>,

    /// Ignore VCF records whose ID is outside the marker universe instead of failing the sample
    #[clap(long = "ignore-unknown-markers")]
    #[clap(help_heading = Some("Genotype options"))]
    pub ignore_unknown_markers: bool,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_genotype_settings(settings: GenotypeSettings) -> Result<GenotypeSettings, Box<dyn std::error::Error>> {
    // inputs
    check_required_filename(&settings.input_database, "Reference table JSON");
    check_required_filename(&settings.vcf_filename, "VCF file");
    check_optional_filename(settings.cnv_filename.as_deref(), "CNV file");

    if let Some(name) = settings.sample_name.as_ref() {
        if name.trim().is_empty() {
            bail!("--sample-name cannot be empty");
        }
    }

    info!("Inputs:");
    info!("\tReference table: {:?}", settings.input_database);
    info!("\tVCF: {:?}", settings.vcf_filename);
    match settings.cnv_filename.as_ref() {
        Some(filename) => info!("\tCNV: {filename:?}"),
        None => info!("\tCNV: not provided, copy number is unconstrained")
    };

    info!("Outputs:");
    info!("\tReport: {:?}", settings.report_filename);
    if let Some(filename) = settings.json_filename.as_ref() {
        info!("\tDetailed report: {filename:?}");
    }

    if let Some(name) = settings.sample_name.as_ref() {
        debug!("\tSample name: {name}");
    }
    info!("Unknown markers: {}", if settings.ignore_unknown_markers { "IGNORED" } else { "REJECTED" });

    Ok(settings)
}
