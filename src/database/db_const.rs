
use lazy_static::lazy_static;

// haplotype names referenced directly by code, to prevent dev typos
pub const CYP2D6_STAR1: &str = "CYP2D6*1";
pub const CYP2D6_STAR5: &str = "CYP2D6*5";

/// Placeholder call for a marker that never shows up in the PharmVar table
pub const UNDEFINED_ALLELE: &str = "-";

/// Separator used when naming hybrid haplotypes from their members
pub const HYBRID_SEPARATOR: &str = "+";

lazy_static! {
    /// Haplotypes that must always be present.
    /// *1 has no variants so it never appears in the PharmVar rows, and *5 is a full gene deletion.
    pub static ref REQUIRED_HAPLOTYPES: Vec<&'static str> = vec![
        CYP2D6_STAR5, CYP2D6_STAR1
    ];

    /// Curated hybrid (tandem) arrangements and the exon 9 copy number each one contributes.
    /// Members are listed in the order they appear in the hybrid name.
    pub static ref HYBRID_DEFINITIONS: Vec<(Vec<&'static str>, u32)> = vec![
        (vec!["CYP2D6*1", "CYP2D6*38"], 2),
        (vec!["CYP2D6*4.013", "CYP2D6*4"], 1),
        (vec!["CYP2D6*13", "CYP2D6*1"], 2),
        (vec!["CYP2D6*13", "CYP2D6*2"], 2),
        (vec!["CYP2D6*13", "CYP2D6*68", "CYP2D6*4"], 3),
        (vec!["CYP2D6*17", "CYP2D6*17"], 2),
        (vec!["CYP2D6*36", "CYP2D6*10"], 1),
        (vec!["CYP2D6*36", "CYP2D6*10.007"], 1),
        (vec!["CYP2D6*36.004", "CYP2D6*10.002"], 1),
        (vec!["CYP2D6*57", "CYP2D6*10"], 2),
        (vec!["CYP2D6*68", "CYP2D6*2"], 2),
        (vec!["CYP2D6*68", "CYP2D6*4"], 2),
        (vec!["CYP2D6*1", "CYP2D6*90"], 2)
    ];

    /// Alleles with no exon 9 copy: the *5 deletion and the CYP2D7 exon 9 conversions
    pub static ref NULL_COPY_HAPLOTYPES: Vec<&'static str> = vec![
        "CYP2D6*4.013", "CYP2D6*4.031", "CYP2D6*36", "CYP2D6*36.001",
        "CYP2D6*36.002", "CYP2D6*36.003", "CYP2D6*36.004", "CYP2D6*36.005",
        "CYP2D6*83", "CYP2D6*83.001", "CYP2D6*83.0012", "CYP2D6*83.0013",
        "CYP2D6*141", "CYP2D6*141.001", CYP2D6_STAR5
    ];

    /// Alleles with a described duplication (x2)
    pub static ref DUPLICATED_HAPLOTYPES: Vec<&'static str> = vec![
        "CYP2D6*1", "CYP2D6*2", "CYP2D6*3", "CYP2D6*4", "CYP2D6*4.013", "CYP2D6*6",
        "CYP2D6*9", "CYP2D6*10", "CYP2D6*17", "CYP2D6*27.002", "CYP2D6*29",
        "CYP2D6*35", "CYP2D6*41", "CYP2D6*43", "CYP2D6*45", "CYP2D6*146.001"
    ];

    /// Alleles with a described triplication (x3); to date only these four have more than two copies
    pub static ref TRIPLICATED_HAPLOTYPES: Vec<&'static str> = vec![
        "CYP2D6*1", "CYP2D6*2", "CYP2D6*4", "CYP2D6*41"
    ];

    // Tiers follow the allele and phenotype frequency overview in
    // "CYP2D6 Overview: Allele and Phenotype Frequencies", M. Kane, 2021.

    /// The common, well-characterized alleles
    pub static ref TOP_TIER_HAPLOTYPES: Vec<&'static str> = vec![
        "CYP2D6*1", "CYP2D6*2", "CYP2D6*3", "CYP2D6*4", "CYP2D6*5", "CYP2D6*6",
        "CYP2D6*9", "CYP2D6*10", "CYP2D6*17", "CYP2D6*29", "CYP2D6*41"
    ];

    /// Less common alleles that are still on the recommended testing panels
    pub static ref SECOND_TIER_HAPLOTYPES: Vec<&'static str> = vec![
        "CYP2D6*7", "CYP2D6*8", "CYP2D6*12", "CYP2D6*14", "CYP2D6*15", "CYP2D6*21",
        "CYP2D6*31", "CYP2D6*40", "CYP2D6*42", "CYP2D6*49", "CYP2D6*56", "CYP2D6*59"
    ];
}
