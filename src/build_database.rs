
use log::{debug, info};
use std::path::Path;

use crate::database::catalogue::HaplotypeCatalogue;
use crate::database::db_config::CatalogueBuildOptions;
use crate::database::pharmvar_table::{load_pharmvar_table, PharmvarRow};
use crate::database::reference_table::ReferencePairTable;
use crate::util::file_io::load_marker_list;

// PharmVar gene information with useful download: https://www.pharmvar.org/gene/CYP2D6
//   the haplotype TSV is expected to be cleaned down to one rsID per row before it gets here

/// This is the primary call to build the reference table from local files.
/// # Arguments
/// * `markers_fn` - the marker filter list, this becomes the marker universe
/// * `haplotypes_fn` - the cleaned PharmVar haplotype TSV
/// * `options` - curated build options
/// * `catalogue_version` - user facing version label for the table
/// # Errors
/// * if either input file cannot be loaded
/// * if the catalogue, CNV expansion, or pairing is inconsistent
/// * if the final table fails validation
pub fn build_reference_table(markers_fn: &Path, haplotypes_fn: &Path, options: &CatalogueBuildOptions, catalogue_version: &str) -> Result<ReferencePairTable, Box<dyn std::error::Error>> {
    info!("Loading marker list from {markers_fn:?}...");
    let markers: Vec<String> = load_marker_list(markers_fn)?;
    info!("\tFound {} markers.", markers.len());
    debug!("\tMarkers: {markers:?}");

    info!("Loading PharmVar haplotypes from {haplotypes_fn:?}...");
    let rows: Vec<PharmvarRow> = load_pharmvar_table(haplotypes_fn)?;
    info!("\tFound {} rows.", rows.len());

    let catalogue = HaplotypeCatalogue::from_pharmvar_rows(markers, &rows, options)?;
    info!("Base catalogue contains {} haplotypes.", catalogue.len());

    let table = ReferencePairTable::build(catalogue, options, catalogue_version)?;
    table.validate()?;
    info!("Reference table complete: {} haplotypes, {} pairs.", table.haplotypes().len(), table.pairs().len());
    Ok(table)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use crate::util::file_io::load_json;

    /// Reference table built from the files in test_data/catalogue
    pub(crate) fn test_data_table() -> ReferencePairTable {
        let options: CatalogueBuildOptions = load_json(Path::new("test_data/catalogue/build_options.json")).unwrap();
        build_reference_table(
            Path::new("test_data/catalogue/markers.txt"),
            Path::new("test_data/catalogue/haplotypes.tsv"),
            &options,
            "test_data"
        ).unwrap()
    }

    #[test]
    fn test_build_from_files() {
        let table = test_data_table();
        assert_eq!(table.markers(), &["rs1065852", "rs3892097", "rs16947", "rs1135840"]);

        // *4.001 collapses into *4, then *1x2, *2x2, *2x3, and *4x2 are added
        let names: Vec<&str> = table.haplotypes().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec![
            "CYP2D6*1", "CYP2D6*10", "CYP2D6*1x2", "CYP2D6*2", "CYP2D6*2x2", "CYP2D6*2x3",
            "CYP2D6*4", "CYP2D6*41", "CYP2D6*4x2", "CYP2D6*5"
        ]);
        assert_eq!(table.pairs().len(), 55);
        assert_eq!(table.table_metadata().catalogue_version, "test_data");

        let pair = &table.pairs()["CYP2D6*2/CYP2D6*10"];
        let calls: Vec<String> = table.markers().iter()
            .map(|m| pair.allele_calls()[m].to_string())
            .collect();
        assert_eq!(calls, vec!["A/G", "C", "A/G", "G"]);
        assert_eq!(pair.total_cnv(), 2);
        assert_eq!(pair.ranking(), 2);

        let pair = &table.pairs()["CYP2D6*5/CYP2D6*41"];
        assert_eq!(pair.total_cnv(), 1);

        let pair = &table.pairs()["CYP2D6*2x3/CYP2D6*2x3"];
        assert_eq!(pair.total_cnv(), 6);
    }

    #[test]
    fn test_default_options_fail() {
        // the curated hybrids reference haplotypes that are not in the small test table
        let result = build_reference_table(
            Path::new("test_data/catalogue/markers.txt"),
            Path::new("test_data/catalogue/haplotypes.tsv"),
            &CatalogueBuildOptions::default(),
            "test_data"
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = build_reference_table(
            Path::new("test_data/catalogue/does_not_exist.txt"),
            Path::new("test_data/catalogue/haplotypes.tsv"),
            &CatalogueBuildOptions::default(),
            "test_data"
        );
        assert!(result.is_err());
    }
}
