
use log::info;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleError, bail};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::data_types::haplotype::Haplotype;
use crate::data_types::reference_pair::{PairKey, ReferencePair};
use crate::database::catalogue::HaplotypeCatalogue;
use crate::database::cnv_expander::expand_catalogue;
use crate::database::db_config::{CatalogueBuildOptions, RankingStrategy};
use crate::database::errors::ConfigurationError;
use crate::database::pair_builder::build_reference_pairs;

/// Contains metadata about the construction of the reference table
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableMetadata {
    /// The version of the tool that built the table
    pub tool_version: String,
    /// User-facing version of the catalogue, e.g. the PharmVar release
    pub catalogue_version: String,
    /// The strategy used to combine tiers into pair rankings
    pub ranking_strategy: RankingStrategy,
    /// The time the table was constructed
    pub build_time: chrono::DateTime<chrono::Utc>
}

/// The persisted, immutable reference table: every unordered haplotype pair for one catalogue version
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReferencePairTable {
    /// Metadata for the table
    table_metadata: TableMetadata,
    /// The marker universe, in marker list order
    markers: Vec<String>,
    /// The expanded haplotype catalogue the pairs were built from
    haplotypes: BTreeMap<String, Haplotype>,
    /// Canonical label -> pair
    pairs: BTreeMap<String, ReferencePair>
}

impl ReferencePairTable {
    /// Runs the full build: CNV expansion of the base catalogue, then pair generation.
    /// Nothing is returned unless every step succeeds.
    /// # Arguments
    /// * `base_catalogue` - the catalogue straight from the PharmVar rows
    /// * `options` - curated build options
    /// * `catalogue_version` - label stored in the metadata
    /// # Errors
    /// * if the expansion or pairing detects an inconsistency
    pub fn build(base_catalogue: HaplotypeCatalogue, options: &CatalogueBuildOptions, catalogue_version: &str) -> Result<ReferencePairTable, ConfigurationError> {
        info!("Expanding copy-number variants and hybrids...");
        let catalogue = expand_catalogue(base_catalogue, options)?;

        info!("Generating reference pairs...");
        let pair_overrides = options.pair_override_table()?;
        let pairs = build_reference_pairs(&catalogue, &pair_overrides, options.ranking_strategy)?;
        info!("Generated {} reference pairs", pairs.len());

        let table_metadata = TableMetadata {
            tool_version: crate::cli::core::FULL_VERSION.to_string(),
            catalogue_version: catalogue_version.to_string(),
            ranking_strategy: options.ranking_strategy,
            build_time: chrono::Utc::now()
        };

        Ok(ReferencePairTable {
            table_metadata,
            markers: catalogue.markers().to_vec(),
            haplotypes: catalogue.haplotypes().clone(),
            pairs
        })
    }

    /// Validates a loaded table where possible.
    /// This will not catch a table built from bad data, but it will catch a truncated or hand-edited one.
    /// # Errors
    /// * if the pair count does not match the haplotype count
    /// * if any pair has a non-canonical label, unknown members, or does not cover the marker universe
    pub fn validate(&self) -> Result<(), SimpleError> {
        if self.markers.is_empty() {
            bail!("Reference table has no markers");
        }
        let num_haplotypes = self.haplotypes.len();
        let expected = num_haplotypes * (num_haplotypes + 1) / 2;
        if self.pairs.len() != expected {
            bail!("Reference table has {} pairs, expected {expected} for {num_haplotypes} haplotypes", self.pairs.len());
        }

        for (label, pair) in self.pairs.iter() {
            let members = pair.members();
            let canonical = PairKey::new(members.haplotype_1(), members.haplotype_2());
            if label != pair.label() || canonical.label() != *label {
                bail!("Reference pair {label:?} is not stored under its canonical label");
            }
            for name in [members.haplotype_1(), members.haplotype_2()] {
                if !self.haplotypes.contains_key(name) {
                    bail!("Reference pair {label} references unknown haplotype {name}");
                }
            }
            let covers_universe = pair.allele_calls().len() == self.markers.len() &&
                self.markers.iter().all(|m| pair.allele_calls().contains_key(m));
            if !covers_universe {
                bail!("Reference pair {label} does not cover the marker universe");
            }
        }
        Ok(())
    }

    /// Writes the table in a flat, tab-delimited format: one row per pair, one column per marker.
    /// # Arguments
    /// * `filename` - the output TSV path
    /// # Errors
    /// * if the file cannot be created or written
    pub fn save_tsv(&self, filename: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(filename)?;

        let mut header: Vec<&str> = vec!["Genotype"];
        header.extend(self.markers.iter().map(|m| m.as_str()));
        header.extend(["CNV", "Ranking"]);
        csv_writer.write_record(&header)?;

        for (label, pair) in self.pairs.iter() {
            let mut record: Vec<String> = vec![label.clone()];
            for marker in self.markers.iter() {
                let call = pair.allele_calls().get(marker)
                    .ok_or_else(|| SimpleError::new(format!("{label} is missing {marker}")))?;
                record.push(call.to_string());
            }
            record.push(pair.total_cnv().to_string());
            record.push(pair.ranking().to_string());
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    // getters
    pub fn table_metadata(&self) -> &TableMetadata {
        &self.table_metadata
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn haplotypes(&self) -> &BTreeMap<String, Haplotype> {
        &self.haplotypes
    }

    pub fn pairs(&self) -> &BTreeMap<String, ReferencePair> {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::database::db_config::{HybridDefinition, PairOverride};
    use crate::genotyper::matcher::match_sample;
    use crate::genotyper::matcher::tests::sample;
    use crate::database::pharmvar_table::PharmvarRow;
    use crate::util::file_io::{load_json, save_json};

    fn small_options() -> CatalogueBuildOptions {
        CatalogueBuildOptions {
            required_haplotypes: vec!["CYP2D6*1".to_string()],
            hybrid_definitions: vec![],
            null_copy_haplotypes: Default::default(),
            duplicated_haplotypes: vec![],
            triplicated_haplotypes: vec![],
            top_tier_haplotypes: ["CYP2D6*1".to_string()].into_iter().collect(),
            second_tier_haplotypes: Default::default(),
            pair_overrides: vec![],
            ranking_strategy: RankingStrategy::MaxTier
        }
    }

    fn small_table(options: &CatalogueBuildOptions) -> ReferencePairTable {
        let rows = vec![PharmvarRow::new("CYP2D6*4", "rs1", "G", "A")];
        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(vec!["rs1".to_string()], &rows, options).unwrap();
        ReferencePairTable::build(catalogue, options, "test").unwrap()
    }

    #[test]
    fn test_end_to_end_pairs() {
        // *1 is tier 2 with all reference calls, *4 is tier 0 with rs1 = A
        let table = small_table(&small_options());
        assert!(table.validate().is_ok());
        assert_eq!(table.pairs().len(), 3);
        assert_eq!(table.table_metadata().catalogue_version, "test");

        let p11 = &table.pairs()["CYP2D6*1/CYP2D6*1"];
        assert_eq!(p11.allele_calls()["rs1"].to_string(), "G");
        assert_eq!(p11.total_cnv(), 2);
        assert_eq!(p11.ranking(), 2);

        let p14 = &table.pairs()["CYP2D6*1/CYP2D6*4"];
        assert_eq!(p14.allele_calls()["rs1"].to_string(), "A/G");
        assert_eq!(p14.total_cnv(), 2);
        assert_eq!(p14.ranking(), 2);

        let p44 = &table.pairs()["CYP2D6*4/CYP2D6*4"];
        assert_eq!(p44.allele_calls()["rs1"].to_string(), "A");
        assert_eq!(p44.total_cnv(), 2);
        assert_eq!(p44.ranking(), 0);

        // a heterozygous sample with no copy number only fits *1/*4
        let observed = sample(&[("rs1", "A/G")], None);
        let result = match_sample(&table, &observed).unwrap();
        assert_eq!(result.candidates().len(), 1);
        assert_eq!(result.best().unwrap().label(), "CYP2D6*1/CYP2D6*4");
    }

    #[test]
    fn test_failed_build() {
        let mut options = small_options();
        options.hybrid_definitions.push(HybridDefinition {
            members: vec!["CYP2D6*68".to_string(), "CYP2D6*4".to_string()],
            copy_number: 2
        });
        let rows = vec![PharmvarRow::new("CYP2D6*4", "rs1", "G", "A")];
        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(vec!["rs1".to_string()], &rows, &options).unwrap();
        let result = ReferencePairTable::build(catalogue, &options, "test");
        assert!(matches!(result, Err(ConfigurationError::MissingHybridMember { .. })));

        let mut options = small_options();
        for total_cnv in [3, 4] {
            options.pair_overrides.push(PairOverride {
                haplotypes: ("CYP2D6*4".to_string(), "CYP2D6*1".to_string()),
                total_cnv: Some(total_cnv),
                ranking: None
            });
        }
        let catalogue = HaplotypeCatalogue::from_pharmvar_rows(vec!["rs1".to_string()], &rows, &options).unwrap();
        let result = ReferencePairTable::build(catalogue, &options, "test");
        assert_eq!(result, Err(ConfigurationError::ConflictingOverride("CYP2D6*1/CYP2D6*4".to_string())));
    }

    #[test]
    fn test_json_reload() {
        let table = small_table(&small_options());
        let temp_dir = tempfile::tempdir().unwrap();
        for filename in ["table.json", "table.json.gz"] {
            let path = temp_dir.path().join(filename);
            save_json(&table, &path).unwrap();
            let loaded: ReferencePairTable = load_json(&path).unwrap();
            assert!(loaded.validate().is_ok());
            assert_eq!(loaded, table);
        }
    }

    #[test]
    fn test_validate_truncated() {
        let table = small_table(&small_options());
        let mut truncated = table.clone();
        truncated.pairs.remove("CYP2D6*1/CYP2D6*4");
        assert!(truncated.validate().is_err());

        let mut relabeled = table.clone();
        let pair = relabeled.pairs.remove("CYP2D6*1/CYP2D6*4").unwrap();
        relabeled.pairs.insert("CYP2D6*4/CYP2D6*1".to_string(), pair);
        assert!(relabeled.validate().is_err());

        let mut unknown = table;
        unknown.haplotypes.remove("CYP2D6*4");
        unknown.haplotypes.insert("CYP2D6*10".to_string(), Haplotype::new("CYP2D6*10".to_string(), Default::default()));
        assert!(unknown.validate().is_err());
    }

    #[test]
    fn test_save_tsv() {
        let table = small_table(&small_options());
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("table.tsv");
        table.save_tsv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec![
            "Genotype\trs1\tCNV\tRanking",
            "CYP2D6*1/CYP2D6*1\tG\t2\t2",
            "CYP2D6*1/CYP2D6*4\tA/G\t2\t2",
            "CYP2D6*4/CYP2D6*4\tA\t2\t0"
        ]);
    }
}
