
/// Errors for a single sample; these fail that sample, but never the rest of a batch
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum MatchError {
    #[error("sample marker {marker} is not part of catalogue {catalogue_version}, the sample and reference table do not match")]
    SchemaMismatch { marker: String, catalogue_version: String },
    #[error("sample has no marker calls")]
    EmptySample
}
