
use serde::{Deserialize, Serialize};
use simple_error::{SimpleError, bail};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

/// Separator used for heterozygous (or otherwise multi-allele) calls
pub const ALLELE_SEPARATOR: char = '/';
/// Phased VCF-style separator, accepted on input but never rendered
const PHASED_SEPARATOR: char = '|';

/// The allele(s) observed or expected at a single marker.
/// Internally this is an unordered set, so "A/G", "G/A", and "A|G" are all the same call and "G/G" collapses to "G".
/// The rendered form is always the sorted, slash-joined set.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlleleCall {
    alleles: BTreeSet<String>
}

impl AlleleCall {
    /// Creates a call for a single allele
    /// # Arguments
    /// * `allele` - the allele sequence or symbol, e.g. "G" or "-"
    /// # Errors
    /// * if the allele is empty or contains a separator
    pub fn single(allele: &str) -> Result<AlleleCall, SimpleError> {
        let allele = allele.trim();
        if allele.is_empty() {
            bail!("Allele call cannot be empty");
        }
        if allele.contains(ALLELE_SEPARATOR) || allele.contains(PHASED_SEPARATOR) {
            bail!("Single allele cannot contain a separator: {allele:?}");
        }
        Ok(AlleleCall {
            alleles: BTreeSet::from([allele.to_string()])
        })
    }

    /// Creates a call from any collection of alleles, duplicates are collapsed.
    /// # Errors
    /// * if no alleles are provided or any allele is empty
    pub fn from_alleles<'a>(alleles: impl IntoIterator<Item = &'a str>) -> Result<AlleleCall, SimpleError> {
        let mut ret: BTreeSet<String> = Default::default();
        for allele in alleles {
            let single = AlleleCall::single(allele)?;
            ret.extend(single.alleles);
        }
        if ret.is_empty() {
            bail!("Allele call requires at least one allele");
        }
        Ok(AlleleCall { alleles: ret })
    }

    /// Merges two calls into a new one, this is how two haplotype calls combine into a diplotype call.
    /// Equal calls stay as-is, unequal calls become the union.
    pub fn merge(&self, other: &AlleleCall) -> AlleleCall {
        AlleleCall {
            alleles: self.alleles.union(&other.alleles).cloned().collect()
        }
    }

    /// Returns true if more than one distinct allele is present
    pub fn is_heterozygous(&self) -> bool {
        self.alleles.len() > 1
    }
}

impl FromStr for AlleleCall {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlleleCall::from_alleles(s.split([ALLELE_SEPARATOR, PHASED_SEPARATOR]))
    }
}

impl TryFrom<String> for AlleleCall {
    type Error = SimpleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlleleCall> for String {
    fn from(value: AlleleCall) -> Self {
        value.to_string()
    }
}

impl Display for AlleleCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for allele in self.alleles.iter() {
            if !first {
                write!(f, "{ALLELE_SEPARATOR}")?;
            }
            write!(f, "{allele}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_order_independent_equality() {
        let ag: AlleleCall = "A/G".parse().unwrap();
        let ga: AlleleCall = "G/A".parse().unwrap();
        let phased: AlleleCall = "G|A".parse().unwrap();
        assert_eq!(ag, ga);
        assert_eq!(ag, phased);
        assert_eq!(ga.to_string(), "A/G");

        // hashing must agree with equality
        let hash_set: HashSet<AlleleCall> = [ag, ga, phased].into_iter().collect();
        assert_eq!(hash_set.len(), 1);
    }

    #[test]
    fn test_homozygous_collapse() {
        let gg: AlleleCall = "G/G".parse().unwrap();
        let g = AlleleCall::single("G").unwrap();
        assert_eq!(gg, g);
        assert!(!gg.is_heterozygous());
        assert_eq!(gg.to_string(), "G");
    }

    #[test]
    fn test_merge() {
        let g = AlleleCall::single("G").unwrap();
        let a = AlleleCall::single("A").unwrap();
        assert_eq!(g.merge(&g).to_string(), "G");
        assert_eq!(g.merge(&a).to_string(), "A/G");
        assert_eq!(a.merge(&g).to_string(), "A/G");

        // indels and multi-allele hybrids merge as sets too
        let hybrid: AlleleCall = "AT/A".parse().unwrap();
        assert_eq!(hybrid.merge(&a).to_string(), "A/AT");
        assert!(hybrid.merge(&a).is_heterozygous());
    }

    #[test]
    fn test_invalid_calls() {
        assert!(AlleleCall::single("").is_err());
        assert!(AlleleCall::single("A/G").is_err());
        assert!("A//G".parse::<AlleleCall>().is_err());
        assert!("".parse::<AlleleCall>().is_err());
    }

    #[test]
    fn test_serde_string_form() {
        let call: AlleleCall = "G/A".parse().unwrap();
        let json = serde_json::to_string(&call).unwrap();
        assert_eq!(json, "\"A/G\"");
        let back: AlleleCall = serde_json::from_str(&json).unwrap();
        assert_eq!(back, call);
        assert!(serde_json::from_str::<AlleleCall>("\"\"").is_err());
    }
}
