
use itertools::Itertools;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};

use crate::data_types::allele_call::AlleleCall;
use crate::data_types::haplotype::{Haplotype, allele_order};
use crate::data_types::reference_pair::{PairKey, ReferencePair};
use crate::database::catalogue::HaplotypeCatalogue;
use crate::database::db_config::{PairOverrides, RankingStrategy};
use crate::database::errors::ConfigurationError;

/// Builds a single reference pair from two haplotypes, member order does not matter.
/// # Arguments
/// * `hap_1` - one member
/// * `hap_2` - the other member, can be the same haplotype
/// * `overrides` - fixed copy numbers and rankings for specific pairs
/// * `ranking_strategy` - how the member tiers are combined when there is no override
/// # Errors
/// * if the member copy numbers overflow when added
pub fn build_pair(hap_1: &Haplotype, hap_2: &Haplotype, overrides: &PairOverrides, ranking_strategy: RankingStrategy) -> Result<ReferencePair, ConfigurationError> {
    let members = PairKey::new(hap_1.name(), hap_2.name());

    // both members cover the same markers, so a union over either is the full universe
    let allele_calls: BTreeMap<String, AlleleCall> = hap_1.allele_calls().iter()
        .map(|(marker, call_1)| {
            let merged = match hap_2.allele_calls().get(marker) {
                Some(call_2) => call_1.merge(call_2),
                None => call_1.clone()
            };
            (marker.clone(), merged)
        })
        .collect();

    let total_cnv = match overrides.total_cnv(&members) {
        Some(cnv) => cnv,
        None => hap_1.copy_number().checked_add(hap_2.copy_number())
            .ok_or_else(|| ConfigurationError::CopyNumberOverflow(members.label()))?
    };
    let ranking = overrides.ranking(&members)
        .unwrap_or_else(|| ranking_strategy.combine(hap_1.tier(), hap_2.tier()));

    Ok(ReferencePair::new(members, allele_calls, total_cnv, ranking))
}

/// Enumerates every unordered pair of catalogue haplotypes, including self-pairs.
/// For n haplotypes this is exactly n * (n + 1) / 2 pairs.
/// # Arguments
/// * `catalogue` - the expanded catalogue
/// * `overrides` - fixed copy numbers and rankings for specific pairs
/// * `ranking_strategy` - how the member tiers are combined
/// # Errors
/// * if two pairs end up with the same label, which means the catalogue names are not unique
/// * if a pair copy number overflows
pub fn build_reference_pairs(catalogue: &HaplotypeCatalogue, overrides: &PairOverrides, ranking_strategy: RankingStrategy) -> Result<BTreeMap<String, ReferencePair>, ConfigurationError> {
    // sort into the canonical order first so the enumeration is the same every time
    let ordered: Vec<&Haplotype> = catalogue.haplotypes().values()
        .sorted_by(|a, b| allele_order(a.name(), b.name()))
        .collect();
    let expected = ordered.len() * (ordered.len() + 1) / 2;
    debug!("Generating {expected} pairs from {} haplotypes", ordered.len());

    let mut pairs: BTreeMap<String, ReferencePair> = Default::default();
    for combination in ordered.into_iter().combinations_with_replacement(2) {
        let pair = build_pair(combination[0], combination[1], overrides, ranking_strategy)?;
        trace!("{} => cnv={}, ranking={}", pair.label(), pair.total_cnv(), pair.ranking());
        match pairs.entry(pair.label().to_string()) {
            Vacant(entry) => {
                entry.insert(pair);
            },
            Occupied(entry) => return Err(ConfigurationError::DuplicatePair(entry.key().clone()))
        };
    }
    assert_eq!(pairs.len(), expected);
    Ok(pairs)
}
