
use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::data_types::allele_call::AlleleCall;
use crate::data_types::haplotype::Haplotype;
use crate::database::catalogue::HaplotypeCatalogue;
use crate::database::db_config::{CatalogueBuildOptions, HybridDefinition};
use crate::database::errors::ConfigurationError;

/// Adds all the copy-number related entries to a base catalogue.
/// This sets the null-copy alleles, builds the hybrid haplotypes, and then the duplications and triplications.
/// The pair overrides are also checked here so that nothing inconsistent reaches pair generation.
/// # Arguments
/// * `catalogue` - the base catalogue, consumed
/// * `options` - curated build options
/// # Errors
/// * if a hybrid definition references a haplotype that is not in the catalogue
/// * if a pair override references a haplotype that is not in the expanded catalogue
/// * if any generated name collides with an existing haplotype
pub fn expand_catalogue(mut catalogue: HaplotypeCatalogue, options: &CatalogueBuildOptions) -> Result<HaplotypeCatalogue, ConfigurationError> {
    // check the whole hybrid table up front, we never want a partial closure
    for hybrid in options.hybrid_definitions.iter() {
        validate_hybrid(&catalogue, hybrid)?;
    }

    // exon 9 conversions and the deletion do not show up in the copy-number assay
    for name in options.null_copy_haplotypes.iter() {
        if let Some(haplotype) = catalogue.get_mut(name) {
            debug!("Setting copy number of {name} to 0");
            haplotype.set_copy_number(0);
        }
    }

    for hybrid in options.hybrid_definitions.iter() {
        let haplotype = build_hybrid(&catalogue, hybrid)?;
        debug!("Adding hybrid {} with copy number {}", haplotype.name(), haplotype.copy_number());
        catalogue.insert(haplotype)?;
    }

    // multiplications are copies of the base entry
    let multiplications = options.duplicated_haplotypes.iter().map(|n| (n, 2))
        .chain(options.triplicated_haplotypes.iter().map(|n| (n, 3)));
    let mut num_multiplied = 0;
    for (name, copies) in multiplications {
        let cnv_haplotype = match catalogue.get(name) {
            Some(haplotype) => haplotype.with_copies(copies),
            None => {
                warn!("Copy-number variant requested for {name}, but it is not in the catalogue; skipping.");
                continue;
            }
        };
        catalogue.insert(cnv_haplotype)?;
        num_multiplied += 1;
    }
    debug!("Added {num_multiplied} duplication/triplication variants");

    let pair_overrides = options.pair_override_table()?;
    if !pair_overrides.is_empty() {
        debug!("Checking pair overrides for {} haplotypes", pair_overrides.haplotype_names().len());
    }
    for name in pair_overrides.haplotype_names() {
        if !catalogue.contains(name) {
            return Err(ConfigurationError::MissingOverrideHaplotype(name.to_string()));
        }
    }

    info!("Expanded catalogue contains {} haplotypes", catalogue.len());
    Ok(catalogue)
}

/// Makes sure a hybrid definition can be built from this catalogue
fn validate_hybrid(catalogue: &HaplotypeCatalogue, hybrid: &HybridDefinition) -> Result<(), ConfigurationError> {
    if hybrid.members.len() < 2 {
        return Err(ConfigurationError::UndersizedHybrid(hybrid.members.clone()));
    }
    for member in hybrid.members.iter() {
        if !catalogue.contains(member) {
            return Err(ConfigurationError::MissingHybridMember {
                hybrid: hybrid.name(),
                member: member.clone()
            });
        }
    }
    Ok(())
}

/// Builds the hybrid haplotype; each marker call is the union of the member calls
fn build_hybrid(catalogue: &HaplotypeCatalogue, hybrid: &HybridDefinition) -> Result<Haplotype, ConfigurationError> {
    validate_hybrid(catalogue, hybrid)?;
    let members: Vec<&Haplotype> = hybrid.members.iter()
        .filter_map(|m| catalogue.get(m))
        .collect();

    let allele_calls: BTreeMap<String, AlleleCall> = catalogue.markers().iter()
        .filter_map(|marker| {
            members.iter()
                .filter_map(|h| h.allele_calls().get(marker))
                .cloned()
                .reduce(|acc, call| acc.merge(&call))
                .map(|call| (marker.clone(), call))
        })
        .collect();

    Ok(Haplotype::new_hybrid(hybrid.name(), allele_calls, hybrid.copy_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data_types::haplotype::HaplotypeTier;
    use crate::database::db_config::PairOverride;
    use crate::database::pharmvar_table::PharmvarRow;

    fn base_catalogue(options: &CatalogueBuildOptions) -> HaplotypeCatalogue {
        let markers = vec!["rs1".to_string(), "rs2".to_string()];
        let rows = vec![
            PharmvarRow::new("CYP2D6*4", "rs1", "G", "A"),
            PharmvarRow::new("CYP2D6*68", "rs2", "C", "T"),
            PharmvarRow::new("CYP2D6*36", "rs2", "C", "T")
        ];
        HaplotypeCatalogue::from_pharmvar_rows(markers, &rows, options).unwrap()
    }

    fn test_options() -> CatalogueBuildOptions {
        CatalogueBuildOptions {
            required_haplotypes: vec!["CYP2D6*1".to_string()],
            hybrid_definitions: vec![HybridDefinition {
                members: vec!["CYP2D6*68".to_string(), "CYP2D6*4".to_string()],
                copy_number: 2
            }],
            null_copy_haplotypes: ["CYP2D6*36".to_string()].into_iter().collect(),
            duplicated_haplotypes: vec!["CYP2D6*4".to_string(), "CYP2D6*1000".to_string()],
            triplicated_haplotypes: vec!["CYP2D6*4".to_string()],
            top_tier_haplotypes: ["CYP2D6*1".to_string(), "CYP2D6*4".to_string()].into_iter().collect(),
            second_tier_haplotypes: Default::default(),
            pair_overrides: vec![],
            ranking_strategy: Default::default()
        }
    }

    #[test]
    fn test_expansion() {
        let options = test_options();
        let catalogue = expand_catalogue(base_catalogue(&options), &options).unwrap();
        // *1, *4, *36, *68, hybrid, *4x2, *4x3; *1000 is skipped
        assert_eq!(catalogue.len(), 7);

        let dup = catalogue.get("CYP2D6*4x2").unwrap();
        assert_eq!(dup.copy_number(), 2);
        assert_eq!(dup.tier(), HaplotypeTier::TopTier);
        assert_eq!(dup.allele_calls(), catalogue.get("CYP2D6*4").unwrap().allele_calls());
        let trip = catalogue.get("CYP2D6*4x3").unwrap();
        assert_eq!(trip.copy_number(), 3);
        assert_eq!(trip.tier(), HaplotypeTier::TopTier);

        assert_eq!(catalogue.get("CYP2D6*36").unwrap().copy_number(), 0);
        assert_eq!(catalogue.get("CYP2D6*4").unwrap().copy_number(), 1);
    }

    #[test]
    fn test_hybrid() {
        let options = test_options();
        let catalogue = expand_catalogue(base_catalogue(&options), &options).unwrap();
        let hybrid = catalogue.get("CYP2D6*68+CYP2D6*4").unwrap();
        assert!(hybrid.is_hybrid());
        assert_eq!(hybrid.copy_number(), 2);
        assert_eq!(hybrid.tier(), HaplotypeTier::SecondTier);
        // *68 is G at rs1 and T at rs2, *4 is A at rs1 and C at rs2
        assert_eq!(hybrid.allele_calls()["rs1"].to_string(), "A/G");
        assert_eq!(hybrid.allele_calls()["rs2"].to_string(), "C/T");
    }

    #[test]
    fn test_missing_hybrid_member() {
        let mut options = test_options();
        options.hybrid_definitions.push(HybridDefinition {
            members: vec!["CYP2D6*13".to_string(), "CYP2D6*2".to_string()],
            copy_number: 2
        });
        let result = expand_catalogue(base_catalogue(&options), &options);
        assert_eq!(result, Err(ConfigurationError::MissingHybridMember {
            hybrid: "CYP2D6*13+CYP2D6*2".to_string(),
            member: "CYP2D6*13".to_string()
        }));

        let mut options = test_options();
        options.hybrid_definitions.push(HybridDefinition {
            members: vec!["CYP2D6*4".to_string()],
            copy_number: 1
        });
        let result = expand_catalogue(base_catalogue(&options), &options);
        assert!(matches!(result, Err(ConfigurationError::UndersizedHybrid(_))));
    }

    #[test]
    fn test_pair_override_validation() {
        let mut options = test_options();
        options.pair_overrides.push(PairOverride {
            haplotypes: ("CYP2D6*4x2".to_string(), "CYP2D6*68+CYP2D6*4".to_string()),
            total_cnv: Some(3),
            ranking: None
        });
        assert!(expand_catalogue(base_catalogue(&options), &options).is_ok());

        options.pair_overrides.push(PairOverride {
            haplotypes: ("CYP2D6*1".to_string(), "CYP2D6*2x2".to_string()),
            total_cnv: Some(3),
            ranking: None
        });
        let result = expand_catalogue(base_catalogue(&options), &options);
        assert_eq!(result, Err(ConfigurationError::MissingOverrideHaplotype("CYP2D6*2x2".to_string())));
    }
}
