
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::data_types::allele_call::AlleleCall;

lazy_static! {
    /// Pulls the core star-allele number out of a name, e.g. "CYP2D6*41x3" -> 41
    static ref STAR_NUMBER: Regex = Regex::new(r"\*([0-9]+)").unwrap();
}

/// Coarse clinical-impact classification for a haplotype; higher is more significant/common
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::Display)]
pub enum HaplotypeTier {
    /// Anything not on a curated list
    #[default]
    #[strum(to_string = "0")]
    Other,
    /// Second tier, also used for hybrid alleles
    #[strum(to_string = "1")]
    SecondTier,
    /// Top tier, the common and well-characterized alleles
    #[strum(to_string = "2")]
    TopTier
}

impl HaplotypeTier {
    /// The numeric rank of this tier: 0, 1, or 2
    pub fn value(&self) -> u8 {
        match self {
            HaplotypeTier::Other => 0,
            HaplotypeTier::SecondTier => 1,
            HaplotypeTier::TopTier => 2
        }
    }
}

/// A single named haplotype with a call for every marker in the catalogue
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Haplotype {
    /// Unique name, e.g. "CYP2D6*4.013", "CYP2D6*2x2", or "CYP2D6*68+CYP2D6*4"
    name: String,
    /// Marker ID -> allele call; keys are the full marker universe
    allele_calls: BTreeMap<String, AlleleCall>,
    /// Number of copies this haplotype contributes to the copy-number assay
    copy_number: u32,
    /// Clinical impact ranking
    tier: HaplotypeTier,
    /// Hybrids carry a fixed copy number rather than a derived one
    is_hybrid: bool
}

impl Haplotype {
    /// Constructor for a normal, single copy haplotype
    /// # Arguments
    /// * `name` - the haplotype name
    /// * `allele_calls` - the calls for the full marker universe
    pub fn new(name: String, allele_calls: BTreeMap<String, AlleleCall>) -> Haplotype {
        Haplotype {
            name,
            allele_calls,
            copy_number: 1,
            tier: HaplotypeTier::Other,
            is_hybrid: false
        }
    }

    /// Constructor for a hybrid haplotype, which has a fixed copy number
    pub fn new_hybrid(name: String, allele_calls: BTreeMap<String, AlleleCall>, copy_number: u32) -> Haplotype {
        Haplotype {
            name,
            allele_calls,
            copy_number,
            tier: HaplotypeTier::SecondTier,
            is_hybrid: true
        }
    }

    /// Creates a copy-number variant of this haplotype, e.g. "*2" -> "*2x2".
    /// Calls, tier, and hybrid status are preserved.
    /// # Arguments
    /// * `copy_number` - the copy number of the new variant
    pub fn with_copies(&self, copy_number: u32) -> Haplotype {
        Haplotype {
            name: format!("{}x{copy_number}", self.name),
            allele_calls: self.allele_calls.clone(),
            copy_number,
            tier: self.tier,
            is_hybrid: self.is_hybrid
        }
    }

    pub fn set_copy_number(&mut self, copy_number: u32) {
        self.copy_number = copy_number;
    }

    pub fn set_tier(&mut self, tier: HaplotypeTier) {
        self.tier = tier;
    }

    /// If this is a sub-allele (e.g. "CYP2D6*4.013"), returns the core allele name ("CYP2D6*4")
    pub fn core_allele(&self) -> Option<&str> {
        self.name.split_once('.').map(|(core, _sub)| core)
    }

    // getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allele_calls(&self) -> &BTreeMap<String, AlleleCall> {
        &self.allele_calls
    }

    pub fn copy_number(&self) -> u32 {
        self.copy_number
    }

    pub fn tier(&self) -> HaplotypeTier {
        self.tier
    }

    pub fn is_hybrid(&self) -> bool {
        self.is_hybrid
    }
}

/// Returns the star-allele number of a haplotype name, or 0 if there is none
pub fn star_number(name: &str) -> u64 {
    STAR_NUMBER.captures(name)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

/// The fixed total order for haplotype names: star-allele number first, then the full name.
/// This keeps "*2" before "*10", and is still total because names are unique.
pub fn allele_order(a: &str, b: &str) -> Ordering {
    star_number(a).cmp(&star_number(b))
        .then_with(|| a.cmp(b))
}
