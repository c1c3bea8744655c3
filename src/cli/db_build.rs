
use clap::Args;
use log::info;
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{AFTER_HELP, check_optional_filename, check_required_filename};

#[derive(Clone, Args)]
#[clap(author, about, 
    after_help = &**AFTER_HELP)]
pub struct BuildSettings {
    /// Marker filter list, one rsID per line; this defines the marker universe
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "markers")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Input/Output"))]
    pub markers_filename: PathBuf,

    /// Cleaned PharmVar haplotype table
    #[clap(required = true)]
    #[clap(short = 't')]
    #[clap(long = "haplotypes")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub haplotypes_filename: PathBuf,

    /// Output reference table location (JSON, gzip if it ends with .gz)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-db")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_database: PathBuf,

    /// Optional flat export of the reference table
    #[clap(long = "output-tsv")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_tsv: Option<PathBuf>,

    /// Optional build options file, defaults to the curated CYP2D6 settings
    #[clap(long = "build-options")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Build options"))]
    pub build_options: Option<PathBuf>,

    /// Version label stored in the table, e.g. the PharmVar release
    #[clap(long = "catalogue-version")]
    #[clap(value_name = "VERSION")]
    #[clap(default_value = "unknown")]
    #[clap(help_heading = Some("Build options"))]
    pub catalogue_version: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_build_settings(settings: BuildSettings) -> Result<BuildSettings, Box<dyn std::error::Error>> {
    // inputs
    check_required_filename(&settings.markers_filename, "Marker list");
    check_required_filename(&settings.haplotypes_filename, "Haplotype table");
    check_optional_filename(settings.build_options.as_deref(), "Build options");

    if settings.catalogue_version.trim().is_empty() {
        bail!("--catalogue-version cannot be empty");
    }

    // dump stuff to the logger
    info!("Inputs:");
    info!("\tMarker list: {:?}", settings.markers_filename);
    info!("\tHaplotype table: {:?}", settings.haplotypes_filename);
    if let Some(filename) = settings.build_options.as_ref() {
        info!("\tBuild options: {filename:?}");
    }
    info!("\tCatalogue version: {}", settings.catalogue_version);

    info!("Outputs:");
    info!("\tReference table: {:?}", settings.output_database);
    if let Some(filename) = settings.output_tsv.as_ref() {
        info!("\tReference table TSV: {filename:?}");
    }
    Ok(settings)
}
