
use clap::Args;
use log::info;
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{AFTER_HELP, check_required_filename};

#[derive(Args, Clone, Default)]
#[clap(author, about,
    after_help = &**AFTER_HELP)]
pub struct BatchSettings {
    /// Input reference table file (JSON)
    #[clap(required = true)]
    #[clap(short = 'd')]
    #[clap(long = "database")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_database: PathBuf,

    /// Sample manifest with "sample", "vcf", and optional "cnv" columns
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "manifest")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub manifest_filename: PathBuf,

    /// Output folder for the per-sample reports and the summary
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-folder")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Ignore VCF records whose ID is outside the marker universe instead of failing the sample
    #[clap(long = "ignore-unknown-markers")]
    #[clap(help_heading = Some("Genotype options"))]
    pub ignore_unknown_markers: bool,

    /// Number of threads used for matching
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[clap(help_heading = Some("Genotype options"))]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_batch_settings(settings: BatchSettings) -> Result<BatchSettings, Box<dyn std::error::Error>> {
    check_required_filename(&settings.input_database, "Reference table JSON");
    check_required_filename(&settings.manifest_filename, "Manifest");

    if settings.threads == 0 {
        bail!("--threads must be at least 1");
    }

    info!("Inputs:");
    info!("\tReference table: {:?}", settings.input_database);
    info!("\tManifest: {:?}", settings.manifest_filename);
    info!("Outputs:");
    info!("\tOutput folder: {:?}", settings.output_folder);
    info!("Unknown markers: {}", if settings.ignore_unknown_markers { "IGNORED" } else { "REJECTED" });
    info!("Threads: {}", settings.threads);

    Ok(settings)
}
