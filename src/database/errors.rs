
/// Errors that make the catalogue or its overrides inconsistent; any of these aborts a build
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("marker list is empty")]
    EmptyMarkerUniverse,
    #[error("marker {0} is listed more than once")]
    DuplicateMarker(String),
    #[error("haplotype {0} is defined more than once")]
    DuplicateHaplotype(String),
    #[error("haplotype name {0:?} contains the pair separator \"/\"")]
    InvalidHaplotypeName(String),
    #[error("haplotype {haplotype} has conflicting variant alleles for {marker}: {first} and {second}")]
    ConflictingVariant { haplotype: String, marker: String, first: String, second: String },
    #[error("invalid allele {allele:?} for {haplotype} at {marker}")]
    InvalidAllele { haplotype: String, marker: String, allele: String },
    #[error("haplotype {haplotype} does not cover the marker universe")]
    IncompleteHaplotype { haplotype: String },
    #[error("hybrid {hybrid} references {member}, which is not in the catalogue")]
    MissingHybridMember { hybrid: String, member: String },
    #[error("hybrid definition must have at least two members: {0:?}")]
    UndersizedHybrid(Vec<String>),
    #[error("pair override references {0}, which is not in the catalogue")]
    MissingOverrideHaplotype(String),
    #[error("pair override for {0} conflicts with an earlier override")]
    ConflictingOverride(String),
    #[error("total copy number for {0} does not fit in 32 bits")]
    CopyNumberOverflow(String),
    #[error("pair {0} was generated more than once")]
    DuplicatePair(String)
}
