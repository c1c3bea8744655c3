
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry::{Occupied, Vacant};

use crate::data_types::haplotype::HaplotypeTier;
use crate::data_types::reference_pair::PairKey;
use crate::database::db_const::{DUPLICATED_HAPLOTYPES, HYBRID_DEFINITIONS, HYBRID_SEPARATOR, NULL_COPY_HAPLOTYPES, REQUIRED_HAPLOTYPES, SECOND_TIER_HAPLOTYPES, TOP_TIER_HAPLOTYPES, TRIPLICATED_HAPLOTYPES};
use crate::database::errors::ConfigurationError;

/// How two haplotype tiers are combined into a pair ranking
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum_macros::Display)]
pub enum RankingStrategy {
    /// The more impactful member decides the ranking
    #[default]
    MaxTier,
    /// Sum of both tiers
    SumTiers,
    /// The less impactful member decides the ranking
    MinTier
}

impl RankingStrategy {
    /// Combines two haplotype tiers into a pair ranking
    pub fn combine(&self, tier_1: HaplotypeTier, tier_2: HaplotypeTier) -> u8 {
        let (v1, v2) = (tier_1.value(), tier_2.value());
        match self {
            RankingStrategy::MaxTier => v1.max(v2),
            RankingStrategy::SumTiers => v1 + v2,
            RankingStrategy::MinTier => v1.min(v2)
        }
    }
}

/// A curated hybrid arrangement of two or more haplotypes
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HybridDefinition {
    /// Ordered member names
    pub members: Vec<String>,
    /// Clinically assigned copy number for the whole arrangement
    pub copy_number: u32
}

impl HybridDefinition {
    /// The catalogue name for the hybrid, e.g. "CYP2D6*68+CYP2D6*4"
    pub fn name(&self) -> String {
        self.members.join(HYBRID_SEPARATOR)
    }
}

/// A fixed value for one specific unordered pair of haplotypes
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PairOverride {
    /// The two haplotypes, order does not matter
    pub haplotypes: (String, String),
    /// Replaces the sum of the member copy numbers
    #[serde(default)]
    pub total_cnv: Option<u32>,
    /// Replaces the combined tier ranking
    #[serde(default)]
    pub ranking: Option<u8>
}

/// Side-table of per-pair overrides, consulted before the default copy number and ranking rules
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PairOverrides {
    total_cnv: BTreeMap<PairKey, u32>,
    ranking: BTreeMap<PairKey, u8>
}

impl PairOverrides {
    /// Builds the side-table from the configured overrides.
    /// The same pair may be listed more than once as long as the values agree.
    /// # Errors
    /// * if two overrides for the same pair set different copy numbers or rankings
    pub fn new(overrides: &[PairOverride]) -> Result<PairOverrides, ConfigurationError> {
        let mut ret = PairOverrides::default();
        for po in overrides.iter() {
            let key = PairKey::new(&po.haplotypes.0, &po.haplotypes.1);
            if let Some(cnv) = po.total_cnv {
                insert_override(&mut ret.total_cnv, &key, cnv)?;
            }
            if let Some(ranking) = po.ranking {
                insert_override(&mut ret.ranking, &key, ranking)?;
            }
        }
        Ok(ret)
    }

    /// Fixed copy number for the pair, if any
    pub fn total_cnv(&self, key: &PairKey) -> Option<u32> {
        self.total_cnv.get(key).copied()
    }

    /// Fixed ranking for the pair, if any
    pub fn ranking(&self, key: &PairKey) -> Option<u8> {
        self.ranking.get(key).copied()
    }

    /// All haplotype names referenced by any override
    pub fn haplotype_names(&self) -> BTreeSet<&str> {
        self.total_cnv.keys()
            .chain(self.ranking.keys())
            .flat_map(|k| [k.haplotype_1(), k.haplotype_2()])
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total_cnv.is_empty() && self.ranking.is_empty()
    }
}

/// Adds one override value, an identical repeat is fine
fn insert_override<T: Copy + PartialEq>(table: &mut BTreeMap<PairKey, T>, key: &PairKey, value: T) -> Result<(), ConfigurationError> {
    match table.entry(key.clone()) {
        Vacant(entry) => {
            entry.insert(value);
            Ok(())
        },
        Occupied(entry) if *entry.get() == value => Ok(()),
        Occupied(entry) => Err(ConfigurationError::ConflictingOverride(entry.key().label()))
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Options for building the reference pair table; the defaults are the curated CYP2D6 values
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct CatalogueBuildOptions {
    /// Haplotypes added with all-reference calls when the source data does not define them
    pub required_haplotypes: Vec<String>,
    /// Hybrid arrangements with fixed copy numbers
    pub hybrid_definitions: Vec<HybridDefinition>,
    /// Haplotypes that contribute no copy to the copy-number assay
    pub null_copy_haplotypes: BTreeSet<String>,
    /// Haplotypes that get an "x2" variant
    pub duplicated_haplotypes: Vec<String>,
    /// Haplotypes that get an "x3" variant
    pub triplicated_haplotypes: Vec<String>,
    /// Tier 2 haplotypes
    pub top_tier_haplotypes: BTreeSet<String>,
    /// Tier 1 haplotypes
    pub second_tier_haplotypes: BTreeSet<String>,
    /// Per-pair copy number and ranking overrides
    pub pair_overrides: Vec<PairOverride>,
    /// How member tiers combine into a pair ranking
    pub ranking_strategy: RankingStrategy
}

impl Default for CatalogueBuildOptions {
    fn default() -> Self {
        Self {
            required_haplotypes: to_strings(&REQUIRED_HAPLOTYPES),
            hybrid_definitions: HYBRID_DEFINITIONS.iter()
                .map(|(members, copy_number)| HybridDefinition {
                    members: to_strings(members),
                    copy_number: *copy_number
                })
                .collect(),
            null_copy_haplotypes: to_strings(&NULL_COPY_HAPLOTYPES).into_iter().collect(),
            duplicated_haplotypes: to_strings(&DUPLICATED_HAPLOTYPES),
            triplicated_haplotypes: to_strings(&TRIPLICATED_HAPLOTYPES),
            top_tier_haplotypes: to_strings(&TOP_TIER_HAPLOTYPES).into_iter().collect(),
            second_tier_haplotypes: to_strings(&SECOND_TIER_HAPLOTYPES).into_iter().collect(),
            pair_overrides: vec![],
            ranking_strategy: RankingStrategy::default()
        }
    }
}

impl CatalogueBuildOptions {
    /// Assigns the tier for a base (non-CNV) haplotype name
    pub fn tier(&self, name: &str) -> HaplotypeTier {
        if self.top_tier_haplotypes.contains(name) {
            HaplotypeTier::TopTier
        } else if self.second_tier_haplotypes.contains(name) {
            HaplotypeTier::SecondTier
        } else {
            HaplotypeTier::Other
        }
    }

    /// Every haplotype name the expansion step refers to.
    /// These are kept in the catalogue even if the marker filter removes all their variants.
    pub fn referenced_haplotypes(&self) -> BTreeSet<String> {
        let mut ret: BTreeSet<String> = Default::default();
        for hd in self.hybrid_definitions.iter() {
            ret.extend(hd.members.iter().cloned());
        }
        ret.extend(self.duplicated_haplotypes.iter().cloned());
        ret.extend(self.triplicated_haplotypes.iter().cloned());
        for po in self.pair_overrides.iter() {
            ret.insert(po.haplotypes.0.clone());
            ret.insert(po.haplotypes.1.clone());
        }
        ret
    }

    /// # Errors
    /// * if the configured overrides conflict, see `PairOverrides::new`
    pub fn pair_override_table(&self) -> Result<PairOverrides, ConfigurationError> {
        PairOverrides::new(&self.pair_overrides)
    }
}
