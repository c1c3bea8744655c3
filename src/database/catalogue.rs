
use log::{debug, trace};
use rustc_hash::FxHashSet as HashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry::{Occupied, Vacant};

use crate::data_types::allele_call::AlleleCall;
use crate::data_types::haplotype::Haplotype;
use crate::data_types::reference_pair::PAIR_SEPARATOR;
use crate::database::db_config::CatalogueBuildOptions;
use crate::database::db_const::{CYP2D6_STAR1, UNDEFINED_ALLELE};
use crate::database::errors::ConfigurationError;
use crate::database::pharmvar_table::PharmvarRow;

/// The set of named haplotypes for one catalogue version.
/// Every haplotype has a call for every marker in `markers`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HaplotypeCatalogue {
    /// The marker universe, in the order of the marker list
    markers: Vec<String>,
    /// Haplotype name -> definition
    haplotypes: BTreeMap<String, Haplotype>
}

impl HaplotypeCatalogue {
    /// Creates an empty catalogue over a marker universe
    /// # Errors
    /// * if the marker list is empty or contains duplicates
    pub fn new(markers: Vec<String>) -> Result<HaplotypeCatalogue, ConfigurationError> {
        if markers.is_empty() {
            return Err(ConfigurationError::EmptyMarkerUniverse);
        }
        let mut observed: HashSet<&str> = Default::default();
        for marker in markers.iter() {
            if !observed.insert(marker.as_str()) {
                return Err(ConfigurationError::DuplicateMarker(marker.clone()));
            }
        }
        Ok(HaplotypeCatalogue {
            markers,
            haplotypes: Default::default()
        })
    }

    /// Builds the base catalogue from PharmVar rows.
    /// This restricts to the marker list, fills in reference calls, adds the required haplotypes,
    /// collapses redundant sub-alleles, and assigns tiers. Copy-number variants and hybrids are added later.
    /// # Arguments
    /// * `markers` - the marker universe
    /// * `rows` - the cleaned PharmVar rows
    /// * `options` - curated build options
    /// # Errors
    /// * if the marker list is invalid
    /// * if any allele fails to parse or a haplotype has conflicting variants at one marker
    pub fn from_pharmvar_rows(markers: Vec<String>, rows: &[PharmvarRow], options: &CatalogueBuildOptions) -> Result<HaplotypeCatalogue, ConfigurationError> {
        let mut catalogue = HaplotypeCatalogue::new(markers)?;
        let marker_set: HashSet<&str> = catalogue.markers.iter().map(|m| m.as_str()).collect();

        // first pass collects reference alleles and the per-haplotype variants on our markers
        let mut reference_alleles: BTreeMap<&str, AlleleCall> = Default::default();
        let mut variants: BTreeMap<&str, BTreeMap<&str, AlleleCall>> = Default::default();
        let mut source_names: BTreeSet<&str> = Default::default();
        for row in rows.iter() {
            let name: &str = &row.haplotype_name;
            source_names.insert(name);
            if !marker_set.contains(row.marker.as_str()) {
                continue;
            }

            let parse_allele = |allele: &str| AlleleCall::single(allele)
                .map_err(|_e| ConfigurationError::InvalidAllele {
                    haplotype: name.to_string(),
                    marker: row.marker.clone(),
                    allele: allele.to_string()
                });
            let reference_call = parse_allele(&row.reference_allele)?;
            let variant_call = parse_allele(&row.variant_allele)?;

            reference_alleles.entry(row.marker.as_str()).or_insert(reference_call);
            match variants.entry(name).or_default().entry(row.marker.as_str()) {
                Vacant(entry) => {
                    entry.insert(variant_call);
                },
                Occupied(entry) => {
                    if *entry.get() != variant_call {
                        return Err(ConfigurationError::ConflictingVariant {
                            haplotype: name.to_string(),
                            marker: row.marker.clone(),
                            first: entry.get().to_string(),
                            second: variant_call.to_string()
                        });
                    }
                }
            };
        }
        debug!("Found {} haplotypes with variants on the {} markers", variants.len(), catalogue.markers.len());

        // protected names are never collapsed, and are kept if they exist anywhere in the source
        let required: BTreeSet<&str> = options.required_haplotypes.iter().map(|s| s.as_str()).collect();
        let referenced: BTreeSet<String> = options.referenced_haplotypes();
        let mut names: BTreeSet<&str> = variants.keys().copied().collect();
        names.extend(required.iter().copied());
        for name in referenced.iter() {
            if source_names.contains(name.as_str()) {
                names.insert(name.as_str());
            }
        }

        let mut default_calls: BTreeMap<String, AlleleCall> = Default::default();
        for marker in catalogue.markers.iter() {
            let call = match reference_alleles.get(marker.as_str()) {
                Some(call) => call.clone(),
                None => {
                    trace!("No reference allele for {marker}, using {UNDEFINED_ALLELE:?}");
                    AlleleCall::single(UNDEFINED_ALLELE)
                        .map_err(|_e| ConfigurationError::InvalidAllele {
                            haplotype: CYP2D6_STAR1.to_string(),
                            marker: marker.clone(),
                            allele: UNDEFINED_ALLELE.to_string()
                        })?
                }
            };
            default_calls.insert(marker.clone(), call);
        }

        for name in names.into_iter() {
            let mut allele_calls = default_calls.clone();
            if let Some(hap_variants) = variants.get(name) {
                for (&marker, call) in hap_variants.iter() {
                    allele_calls.insert(marker.to_string(), call.clone());
                }
            }
            let mut haplotype = Haplotype::new(name.to_string(), allele_calls);
            haplotype.set_tier(options.tier(name));
            catalogue.insert(haplotype)?;
        }

        // sub-alleles that look exactly like their core allele on these markers add nothing
        let redundant: Vec<String> = catalogue.haplotypes.values()
            .filter(|h| {
                let protected = required.contains(h.name()) || referenced.contains(h.name());
                match h.core_allele() {
                    Some(core) if !protected => catalogue.haplotypes.get(core)
                        .map(|c| c.allele_calls() == h.allele_calls())
                        .unwrap_or(false),
                    _ => false
                }
            })
            .map(|h| h.name().to_string())
            .collect();
        for name in redundant.iter() {
            trace!("Removing sub-allele {name}, identical to core allele");
            catalogue.haplotypes.remove(name);
        }
        debug!("Collapsed {} redundant sub-alleles", redundant.len());

        Ok(catalogue)
    }

    /// Adds a haplotype to the catalogue
    /// # Errors
    /// * if the name contains the pair label separator
    /// * if the name is already present
    /// * if the haplotype calls do not cover exactly the marker universe
    pub fn insert(&mut self, haplotype: Haplotype) -> Result<(), ConfigurationError> {
        // pair labels are "name1/name2", so a "/" in a name makes them ambiguous
        if haplotype.name().contains(PAIR_SEPARATOR) {
            return Err(ConfigurationError::InvalidHaplotypeName(haplotype.name().to_string()));
        }
        let covers_universe = haplotype.allele_calls().len() == self.markers.len() &&
            self.markers.iter().all(|m| haplotype.allele_calls().contains_key(m));
        if !covers_universe {
            return Err(ConfigurationError::IncompleteHaplotype { haplotype: haplotype.name().to_string() });
        }
        match self.haplotypes.entry(haplotype.name().to_string()) {
            Vacant(entry) => {
                entry.insert(haplotype);
                Ok(())
            },
            Occupied(entry) => Err(ConfigurationError::DuplicateHaplotype(entry.key().clone()))
        }
    }

    pub fn get(&self, name: &str) -> Option<&Haplotype> {
        self.haplotypes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Haplotype> {
        self.haplotypes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.haplotypes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.haplotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.haplotypes.is_empty()
    }

    // getters
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn haplotypes(&self) -> &BTreeMap<String, Haplotype> {
        &self.haplotypes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::haplotype::HaplotypeTier;

    fn markers() -> Vec<String> {
        vec!["rs1".to_string(), "rs2".to_string(), "rs3".to_string()]
    }

    fn empty_options() -> CatalogueBuildOptions {
        CatalogueBuildOptions {
            required_haplotypes: vec!["CYP2D6*1".to_string()],
            hybrid_definitions: vec![],
            null_copy_haplotypes: Default::default(),
            duplicated_haplotypes: vec![],
            triplicated_haplotypes: vec![],
            top_tier_haplotypes: ["CYP2D6*1".to_string()].into_iter().collect(),
            second_tier_haplotypes: Default::default(),
            pair_overrides: vec![],
            ranking_strategy: Default::default()
        }
    }

    #[test]
    fn test_marker_universe() {
        assert_eq!(HaplotypeCatalogue::new(vec![]), Err(ConfigurationError::EmptyMarkerUniverse));
        assert_eq!(
            HaplotypeCatalogue::new(vec!["rs1".to_string(), "rs1".to_string()]),
            Err(ConfigurationError::DuplicateMarker("rs1".to_string()))
        );
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*4", "rs2", "C", "T"),
            PharmvarRow::new("CYP2D6*4", "rs99", "C", "T"), // not in the marker list
            PharmvarRow::new("CYP2D6*10", "rs2", "C", "G"),
            PharmvarRow::new("CYP2D6*99", "rs99", "A", "T") // nothing on our markers
        ];
        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &empty_options()).unwrap();
        let names: Vec<&str> = catalogue.haplotypes().keys().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["CYP2D6*1", "CYP2D6*10", "CYP2D6*4"]);

        // *1 is all reference, rs3 never appears so it is undefined
        let star1 = catalogue.get("CYP2D6*1").unwrap();
        assert_eq!(star1.allele_calls()["rs1"].to_string(), "G");
        assert_eq!(star1.allele_calls()["rs2"].to_string(), "C");
        assert_eq!(star1.allele_calls()["rs3"].to_string(), "-");
        assert_eq!(star1.tier(), HaplotypeTier::TopTier);

        let star4 = catalogue.get("CYP2D6*4").unwrap();
        assert_eq!(star4.allele_calls()["rs1"].to_string(), "A");
        assert_eq!(star4.allele_calls()["rs2"].to_string(), "T");
        assert_eq!(star4.tier(), HaplotypeTier::Other);
        assert_eq!(star4.copy_number(), 1);

        let star10 = catalogue.get("CYP2D6*10").unwrap();
        assert_eq!(star10.allele_calls()["rs1"].to_string(), "G");
        assert_eq!(star10.allele_calls()["rs2"].to_string(), "G");
    }

    #[test]
    fn test_sub_allele_collapse() {
        let rows = vec![
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*4.001", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*4.002", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*4.002", "rs2", "C", "T"),
            PharmvarRow::new("CYP2D6*4.013", "rs1", "G", "A")
        ];
        let mut options = empty_options();
        options.duplicated_haplotypes.push("CYP2D6*4.013".to_string());

        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &options).unwrap();
        // *4.001 is identical to *4, *4.002 differs, *4.013 is named by the options
        assert!(!catalogue.contains("CYP2D6*4.001"));
        assert!(catalogue.contains("CYP2D6*4.002"));
        assert!(catalogue.contains("CYP2D6*4.013"));
        assert_eq!(catalogue.len(), 4);
    }

    #[test]
    fn test_referenced_haplotypes_retained() {
        // *68 has no variants on our markers, but a hybrid references it
        let rows = vec![
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*68", "rs99", "C", "T")
        ];
        let mut options = empty_options();
        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &options).unwrap();
        assert!(!catalogue.contains("CYP2D6*68"));

        options.hybrid_definitions.push(crate::database::db_config::HybridDefinition {
            members: vec!["CYP2D6*68".to_string(), "CYP2D6*4".to_string()],
            copy_number: 2
        });
        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &options).unwrap();
        assert!(catalogue.contains("CYP2D6*68"));
        assert_eq!(catalogue.get("CYP2D6*68").unwrap().allele_calls(), catalogue.get("CYP2D6*1").unwrap().allele_calls());
    }

    #[test]
    fn test_conflicting_rows() {
        let rows = vec![
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "T")
        ];
        let result = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &empty_options());
        assert!(matches!(result, Err(ConfigurationError::ConflictingVariant { .. })));

        let rows = vec![
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "")
        ];
        let result = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &empty_options());
        assert!(matches!(result, Err(ConfigurationError::InvalidAllele { .. })));
    }

    #[test]
    fn test_insert_checks() {
        let mut catalogue = HaplotypeCatalogue::new(markers()).unwrap();
        let partial: BTreeMap<String, AlleleCall> = [
            ("rs1".to_string(), AlleleCall::single("G").unwrap())
        ].into_iter().collect();
        assert_eq!(
            catalogue.insert(Haplotype::new("CYP2D6*1".to_string(), partial)),
            Err(ConfigurationError::IncompleteHaplotype { haplotype: "CYP2D6*1".to_string() })
        );

        let full: BTreeMap<String, AlleleCall> = markers().into_iter()
            .map(|m| (m, AlleleCall::single("G").unwrap()))
            .collect();
        catalogue.insert(Haplotype::new("CYP2D6*1".to_string(), full.clone())).unwrap();
        assert_eq!(
            catalogue.insert(Haplotype::new("CYP2D6*1".to_string(), full)),
            Err(ConfigurationError::DuplicateHaplotype("CYP2D6*1".to_string()))
        );

        let full: BTreeMap<String, AlleleCall> = markers().into_iter()
            .map(|m| (m, AlleleCall::single("A").unwrap()))
            .collect();
        assert_eq!(
            catalogue.insert(Haplotype::new("CYP2D6*1/CYP2D6*4".to_string(), full)),
            Err(ConfigurationError::InvalidHaplotypeName("CYP2D6*1/CYP2D6*4".to_string()))
        );
        assert_eq!(catalogue.len(), 1);
    }

    #[test]
    fn test_separator_in_source_name() {
        let rows = vec![
            PharmvarRow::new("CYP2D6*4/CYP2D6*10", "rs1", "G", "A")
        ];
        let result = HaplotypeCatalogue::from_pharmvar_rows(markers(), &rows, &empty_options());
        assert!(matches!(result, Err(ConfigurationError::InvalidHaplotypeName(_))));
    }
}
