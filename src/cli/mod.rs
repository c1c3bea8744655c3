
/// the batch CLI subcommand for genotyping a manifest of samples
pub mod batch;
/// the main CLI module
pub mod core;
/// The build CLI subcommand for constructing the reference pair table
pub mod db_build;
/// The db-stat CLI subcommand
pub mod db_stat;
/// the genotype CLI subcommand for calling a single sample
pub mod genotype;
