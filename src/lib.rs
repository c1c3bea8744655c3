/// Contains functionality for constructing the reference table from local files
pub mod build_database;
/// Contains all the CLI related functionality
pub mod cli;
/// Contains functionality for constructing or using the reference table
pub mod database;
/// Contains any specialized data types that are shared across the tooling
pub mod data_types;
/// Contains functionality for displaying reference table statistics
pub mod db_stat;
/// Contains the functionality for genotyping samples against the reference table
pub mod genotyper;
/// Contains generic utilities that are handy wrappers
pub mod util;
