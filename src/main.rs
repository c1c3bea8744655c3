
use log::{LevelFilter, error, info, warn};
use rustc_hash::FxHashSet as HashSet;
use std::path::Path;
use strum::IntoEnumIterator;

use d6typer::cli::batch::{BatchSettings, check_batch_settings};
use d6typer::cli::core::{Commands, get_cli};
use d6typer::cli::db_build::{BuildSettings, check_build_settings};
use d6typer::cli::db_stat::{DbStatSettings, check_db_stat_settings};
use d6typer::cli::genotype::{GenotypeSettings, check_genotype_settings};
use d6typer::database::db_config::CatalogueBuildOptions;
use d6typer::database::reference_table::ReferencePairTable;
use d6typer::genotyper::batch::{load_manifest, run_batch, SampleStatus};
use d6typer::genotyper::matcher::match_sample;
use d6typer::genotyper::report::{report_line, save_report_line, SampleReport};
use d6typer::genotyper::sample::{load_cnv_value, load_vcf_sample, ObservedSample};
use d6typer::util::file_io::{load_json, save_json};

/// Sets up the logger, must be called before anything else
/// # Arguments
/// * `verbosity` - the number of "-v" flags
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Loads and validates a reference table, exiting on any failure
/// # Arguments
/// * `filename` - the JSON table, optionally gzipped
fn load_reference_table(filename: &Path) -> ReferencePairTable {
    info!("Loading reference table from {filename:?}...");
    let table: ReferencePairTable = match load_json(filename) {
        Ok(t) => t,
        Err(e) => {
            error!("Error while loading reference table file: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // we also need to validate that the table is complete enough to run
    if let Err(e) = table.validate() {
        error!("Error while validating reference table file: {e}");
        std::process::exit(exitcode::DATAERR);
    }
    let metadata = table.table_metadata();
    info!("Reference table loaded: catalogue version {}, {} pairs.", metadata.catalogue_version, table.pairs().len());
    if metadata.tool_version != *d6typer::cli::core::FULL_VERSION {
        warn!("Reference table was built with version {}, this is {}", metadata.tool_version, *d6typer::cli::core::FULL_VERSION);
    }
    table
}

/// The marker filter used when unknown VCF markers are ignored
fn marker_filter(table: &ReferencePairTable, ignore_unknown_markers: bool) -> Option<HashSet<String>> {
    if ignore_unknown_markers {
        Some(table.markers().iter().cloned().collect())
    } else {
        None
    }
}

/// This will run the "build" mode of the tool
/// # Arguments
/// * `settings` - the BuildSettings object
fn run_build(settings: BuildSettings) {
    init_logging(settings.verbosity);

    // okay, now we can check all the other settings
    let cli_settings: BuildSettings = match check_build_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    // now create our build options, this should also be fast and likely never fail
    let build_options: CatalogueBuildOptions = if let Some(bo_filename) = cli_settings.build_options.as_ref() {
        match load_json(bo_filename) {
            Ok(bo) => bo,
            Err(e) => {
                error!("Error while loading build options: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    } else {
        CatalogueBuildOptions::default()
    };
    info!("Build options: {build_options:#?}");

    // all the work
    let table: ReferencePairTable = match d6typer::build_database::build_reference_table(
        &cli_settings.markers_filename,
        &cli_settings.haplotypes_filename,
        &build_options,
        &cli_settings.catalogue_version
    ) {
        Ok(t) => t,
        Err(e) => {
            error!("Error while building reference table: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    info!("Saving reference table to {:?}", cli_settings.output_database);
    if let Err(e) = save_json(&table, &cli_settings.output_database) {
        error!("Error while writing reference table to file: {e}");
        std::process::exit(exitcode::IOERR);
    }

    if let Some(filename) = cli_settings.output_tsv.as_ref() {
        info!("Saving reference table TSV to {filename:?}");
        if let Err(e) = table.save_tsv(filename) {
            error!("Error while writing reference table TSV: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

/// This will run the "genotype" mode of the tool
/// # Arguments
/// * `settings` - the GenotypeSettings object
fn run_genotype(settings: GenotypeSettings) {
    init_logging(settings.verbosity);

    let cli_settings: GenotypeSettings = match check_genotype_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    let table = load_reference_table(&cli_settings.input_database);
    let filter = marker_filter(&table, cli_settings.ignore_unknown_markers);

    info!("Loading sample from {:?}...", cli_settings.vcf_filename);
    let mut sample: ObservedSample = match load_vcf_sample(&cli_settings.vcf_filename, filter.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while loading VCF file: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    if let Some(filename) = cli_settings.cnv_filename.as_ref() {
        let assay_cnv = match load_cnv_value(filename) {
            Ok(v) => v,
            Err(e) => {
                error!("Error while loading CNV file: {e}");
                std::process::exit(exitcode::DATAERR);
            }
        };
        if let Err(e) = sample.apply_assay_cnv(assay_cnv) {
            error!("Error while combining copy numbers: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    }
    if let Some(name) = cli_settings.sample_name.as_ref() {
        sample.set_sample_name(name.clone());
    }
    info!("Loaded {} marker calls for {}, CNV: {:?}", sample.marker_calls().len(), sample.sample_name(), sample.observed_cnv());

    // malformed input never produces a report
    let result = match match_sample(&table, &sample) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while matching {}: {e}", sample.sample_name());
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Best diplotype for {}: {} ({} candidates)", sample.sample_name(), report_line(&result), result.candidates().len());

    info!("Saving report to {:?}", cli_settings.report_filename);
    if let Err(e) = save_report_line(&result, &cli_settings.report_filename) {
        error!("Error while writing report: {e}");
        std::process::exit(exitcode::IOERR);
    }

    if let Some(filename) = cli_settings.json_filename.as_ref() {
        info!("Saving detailed report to {filename:?}");
        let report = SampleReport::new(table.table_metadata(), &sample, &result);
        if let Err(e) = report.save(filename) {
            error!("Error while writing detailed report: {e}");
            std::process::exit(exitcode::IOERR);
        }
    }
}

/// This will run the "batch" mode of the tool
/// # Arguments
/// * `settings` - the BatchSettings object
fn run_batch_mode(settings: BatchSettings) {
    init_logging(settings.verbosity);

    let cli_settings: BatchSettings = match check_batch_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(cli_settings.threads)
        .build_global() {
        error!("Error while creating thread pool: {e}");
        std::process::exit(exitcode::OSERR);
    }

    info!("Creating output folder at {:?}...", cli_settings.output_folder);
    if let Err(e) = std::fs::create_dir_all(&cli_settings.output_folder) {
        error!("Error while creating output folder: {e}");
        std::process::exit(exitcode::IOERR);
    }

    let table = load_reference_table(&cli_settings.input_database);
    let filter = marker_filter(&table, cli_settings.ignore_unknown_markers);

    info!("Loading manifest from {:?}...", cli_settings.manifest_filename);
    let entries = match load_manifest(&cli_settings.manifest_filename) {
        Ok(e) => e,
        Err(e) => {
            error!("Error while loading manifest: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Found {} samples.", entries.len());

    let summary = match run_batch(&table, &entries, filter.as_ref(), &cli_settings.output_folder) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while running batch: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Batch complete:");
    for status in SampleStatus::iter() {
        let count = summary.iter().filter(|r| r.status == status).count();
        info!("\t{status}: {count}");
    }
}

/// This will run the "db_stat" mode of the tool
/// # Arguments
/// * `settings` - the DbStatSettings object
fn run_db_stat(settings: DbStatSettings) {
    init_logging(settings.verbosity);

    let cli_settings: DbStatSettings = check_db_stat_settings(settings);
    let table = load_reference_table(&cli_settings.input_database);

    // display the table statistics
    d6typer::db_stat::print_stats(&table);
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Build(settings) => {
            run_build(*settings);
        },
        Commands::Genotype(settings) => {
            run_genotype(*settings);
        },
        Commands::Batch(settings) => {
            run_batch_mode(*settings);
        },
        Commands::DbStat(settings) => {
            run_db_stat(*settings);
        }
    }

    info!("Process finished successfully.");
}
