
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::data_types::allele_call::AlleleCall;
use crate::data_types::haplotype::allele_order;

/// Separates the two member names in a pair label
pub const PAIR_SEPARATOR: char = '/';

/// An unordered pair of haplotype names, stored in canonical order.
/// Constructing from (A, B) or (B, A) produces the same key.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct PairKey {
    haplotype_1: String,
    haplotype_2: String
}

impl PairKey {
    /// Creates the canonical key for two haplotype names, self-pairs are allowed
    pub fn new(a: &str, b: &str) -> PairKey {
        let (haplotype_1, haplotype_2) = if allele_order(a, b) == Ordering::Greater {
            (b, a)
        } else {
            (a, b)
        };
        PairKey {
            haplotype_1: haplotype_1.to_string(),
            haplotype_2: haplotype_2.to_string()
        }
    }

    /// The canonical "name1/name2" label
    pub fn label(&self) -> String {
        format!("{}{PAIR_SEPARATOR}{}", self.haplotype_1, self.haplotype_2)
    }

    pub fn is_homozygous(&self) -> bool {
        self.haplotype_1 == self.haplotype_2
    }

    // getters
    pub fn haplotype_1(&self) -> &str {
        &self.haplotype_1
    }

    pub fn haplotype_2(&self) -> &str {
        &self.haplotype_2
    }
}

impl From<(String, String)> for PairKey {
    fn from(value: (String, String)) -> Self {
        PairKey::new(&value.0, &value.1)
    }
}

impl From<PairKey> for (String, String) {
    fn from(value: PairKey) -> Self {
        (value.haplotype_1, value.haplotype_2)
    }
}

impl Ord for PairKey {
    fn cmp(&self, other: &Self) -> Ordering {
        allele_order(&self.haplotype_1, &other.haplotype_1)
            .then_with(|| allele_order(&self.haplotype_2, &other.haplotype_2))
    }
}

impl PartialOrd for PairKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.haplotype_1, self.haplotype_2)
    }
}

/// A candidate diplotype: two catalogue haplotypes and everything derived from them
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReferencePair {
    /// The two members, in canonical order
    members: PairKey,
    /// Canonical "name1/name2" label, this is the table key
    label: String,
    /// Marker ID -> merged call of both members
    allele_calls: BTreeMap<String, AlleleCall>,
    /// Total copy number for the pair
    total_cnv: u32,
    /// Combined ranking, higher is preferred when matching
    ranking: u8
}

impl ReferencePair {
    /// Constructor, the label is always derived from the members
    pub fn new(members: PairKey, allele_calls: BTreeMap<String, AlleleCall>, total_cnv: u32, ranking: u8) -> ReferencePair {
        let label = members.label();
        ReferencePair {
            members,
            label,
            allele_calls,
            total_cnv,
            ranking
        }
    }

    /// Returns true if this pair agrees with every provided call.
    /// Markers missing from the pair never match.
    /// # Arguments
    /// * `calls` - marker ID -> observed call
    pub fn matches_calls(&self, calls: &BTreeMap<String, AlleleCall>) -> bool {
        calls.iter()
            .all(|(marker, call)| self.allele_calls.get(marker) == Some(call))
    }

    // getters
    pub fn members(&self) -> &PairKey {
        &self.members
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn allele_calls(&self) -> &BTreeMap<String, AlleleCall> {
        &self.allele_calls
    }

    pub fn total_cnv(&self) -> u32 {
        self.total_cnv
    }

    pub fn ranking(&self) -> u8 {
        self.ranking
    }
}
