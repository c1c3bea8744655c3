
/// Batch genotyping of a sample manifest
pub mod batch;
/// Errors for individual samples
pub mod errors;
/// Matching a sample against the reference table
pub mod matcher;
/// Report writers
pub mod report;
/// Loading observed samples from VCF and copy-number assay files
pub mod sample;
