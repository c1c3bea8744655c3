
/// Contains the haplotype catalogue built from the PharmVar rows
pub mod catalogue;
/// Contains the copy-number and hybrid expansion of the catalogue
pub mod cnv_expander;
/// Contains builder options for reference table construction
pub mod db_config;
/// Constants that are hard-coded and typically written to the build options
pub mod db_const;
/// Errors raised while building the reference table
pub mod errors;
/// Contains the exhaustive pair generation
pub mod pair_builder;
/// Contains the reader for the cleaned PharmVar haplotype table
pub mod pharmvar_table;
/// Contains the persisted, versioned reference pair table
pub mod reference_table;
