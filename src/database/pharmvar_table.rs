
use log::debug;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One variant of one haplotype from the PharmVar TSV download.
/// The download has additional columns, those are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PharmvarRow {
    /// e.g. "CYP2D6*4.001"
    #[serde(rename = "Haplotype Name")]
    pub haplotype_name: String,
    /// the marker ID, e.g. "rs3892097"
    #[serde(rename = "rsID")]
    pub marker: String,
    /// reference allele at the marker
    #[serde(rename = "Reference Allele")]
    pub reference_allele: String,
    /// allele carried by this haplotype
    #[serde(rename = "Variant Allele")]
    pub variant_allele: String
}

impl PharmvarRow {
    pub fn new(haplotype_name: &str, marker: &str, reference_allele: &str, variant_allele: &str) -> PharmvarRow {
        PharmvarRow {
            haplotype_name: haplotype_name.to_string(),
            marker: marker.to_string(),
            reference_allele: reference_allele.to_string(),
            variant_allele: variant_allele.to_string()
        }
    }
}

/// Loads all the haplotype rows from a tab-delimited PharmVar table.
/// Lines starting with "#" are skipped and the first remaining line must be the header.
/// # Arguments
/// * `filename` - the TSV file
/// # Errors
/// * if the file cannot be opened
/// * if a required column is missing or any row fails to parse
pub fn load_pharmvar_table(filename: &Path) -> Result<Vec<PharmvarRow>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(filename)?;
    let rows = read_pharmvar_table(file)?;
    debug!("Loaded {} PharmVar rows from {filename:?}", rows.len());
    Ok(rows)
}

/// Same as `load_pharmvar_table`, but from any reader
pub fn read_pharmvar_table<R: Read>(reader: R) -> Result<Vec<PharmvarRow>, Box<dyn std::error::Error>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = vec![];
    for result in csv_reader.deserialize() {
        let row: PharmvarRow = result?;
        rows.push(row);
    }
    Ok(rows)
}
