
use log::{debug, trace, warn};
use rust_htslib::bcf;
use rust_htslib::bcf::Read;
use rust_htslib::bcf::record::GenotypeAllele;
use rustc_hash::FxHashSet as HashSet;
use serde::Serialize;
use simple_error::bail;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::data_types::allele_call::AlleleCall;

/// Placeholder for a missing VCF ID column
const MISSING_ID: &str = ".";

/// ID of the VCF record that carries the copy number instead of a genotype
pub const CNV_RECORD_ID: &str = "CYP2D6_CNV";

/// Everything observed for one sample: the marker calls and an optional copy-number assay result
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObservedSample {
    /// Label used in reports
    sample_name: String,
    /// Marker ID -> observed call
    marker_calls: BTreeMap<String, AlleleCall>,
    /// Exon 9 copy number from the assay, if one was run
    observed_cnv: Option<u32>
}

impl ObservedSample {
    pub fn new(sample_name: String, marker_calls: BTreeMap<String, AlleleCall>, observed_cnv: Option<u32>) -> ObservedSample {
        ObservedSample {
            sample_name,
            marker_calls,
            observed_cnv
        }
    }

    pub fn set_sample_name(&mut self, sample_name: String) {
        self.sample_name = sample_name;
    }

    /// Applies the copy number from an assay output file.
    /// A copy number already read from the VCF is fine if it agrees.
    /// # Errors
    /// * if the VCF copy number is different from the assay value
    pub fn apply_assay_cnv(&mut self, assay_cnv: u32) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(vcf_cnv) = self.observed_cnv {
            if vcf_cnv != assay_cnv {
                bail!("Assay copy number {assay_cnv} conflicts with VCF copy number {vcf_cnv} for {}", self.sample_name);
            }
        }
        self.observed_cnv = Some(assay_cnv);
        Ok(())
    }

    // getters
    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn marker_calls(&self) -> &BTreeMap<String, AlleleCall> {
        &self.marker_calls
    }

    pub fn observed_cnv(&self) -> Option<u32> {
        self.observed_cnv
    }
}

/// Loads the marker calls for the first sample in a VCF file.
/// Only records with an ID are used, the ID is the marker and the GT field is translated into allele sequences.
/// A record with the ID "CYP2D6_CNV" is the exception: its GT value is the observed copy number.
/// # Arguments
/// * `vcf_fn` - the VCF file, does not need to be indexed
/// * `marker_filter` - if provided, IDs outside this set are ignored; otherwise every ID is kept
/// # Errors
/// * if the VCF cannot be opened or parsed
/// * if the VCF has no samples
/// * if a marker ID or the copy-number record is present more than once
/// * if a genotype index points outside the record alleles
/// * if the copy-number record does not hold a single value
pub fn load_vcf_sample(vcf_fn: &Path, marker_filter: Option<&HashSet<String>>) -> Result<ObservedSample, Box<dyn std::error::Error>> {
    let mut vcf_reader: bcf::Reader = bcf::Reader::from_path(vcf_fn)?;
    let sample_name: String = match vcf_reader.header().samples().first() {
        Some(s) => std::str::from_utf8(s)?.to_string(),
        None => bail!("No samples found in VCF: {vcf_fn:?}")
    };

    let mut marker_calls: BTreeMap<String, AlleleCall> = Default::default();
    let mut observed_cnv: Option<u32> = None;
    for record_result in vcf_reader.records() {
        let record: bcf::Record = record_result?;
        let marker: String = String::from_utf8(record.id())?;
        if marker == MISSING_ID {
            trace!("Skipping record without ID at {}", record.pos());
            continue;
        }
        if marker == CNV_RECORD_ID {
            let cnv = read_cnv_record(&record)?;
            debug!("Copy number from {CNV_RECORD_ID} record: {cnv}");
            if observed_cnv.replace(cnv).is_some() {
                bail!("{CNV_RECORD_ID} is present more than once in {vcf_fn:?}");
            }
            continue;
        }
        if let Some(filter) = marker_filter {
            if !filter.contains(&marker) {
                trace!("Skipping {marker}, not in the marker universe");
                continue;
            }
        }

        let alleles: Vec<&str> = record.alleles().iter()
            .map(|a| std::str::from_utf8(a))
            .collect::<Result<Vec<&str>, _>>()?;

        // TODO: if we want to allow for multi-sample VCFs, we need to adjust this
        let all_genotypes = record.genotypes()?;
        let genotype = all_genotypes.get(0);
        let indices: Option<Vec<usize>> = genotype.iter()
            .map(|ga| match ga {
                GenotypeAllele::Unphased(at) |
                GenotypeAllele::Phased(at) => Some(*at as usize),
                GenotypeAllele::UnphasedMissing |
                GenotypeAllele::PhasedMissing => None
            })
            .collect();
        let indices = match indices {
            Some(i) if !i.is_empty() => i,
            _ => {
                warn!("Incomplete genotype for {marker}, ignoring: {alleles:?} => {genotype:?}");
                continue;
            }
        };

        let mut call_alleles: Vec<&str> = Vec::with_capacity(indices.len());
        for index in indices.into_iter() {
            match alleles.get(index) {
                Some(&allele) => call_alleles.push(allele),
                None => bail!("Genotype index {index} is out of range for {marker} with alleles {alleles:?}")
            };
        }
        let call = AlleleCall::from_alleles(call_alleles)?;
        trace!("{marker} => {call}");

        match marker_calls.entry(marker) {
            Vacant(entry) => {
                entry.insert(call);
            },
            Occupied(entry) => bail!("Marker {} is present more than once in {vcf_fn:?}", entry.key())
        };
    }

    let num_heterozygous = marker_calls.values().filter(|c| c.is_heterozygous()).count();
    debug!("Loaded {} marker calls for {sample_name}, {num_heterozygous} heterozygous", marker_calls.len());
    Ok(ObservedSample::new(sample_name, marker_calls, observed_cnv))
}

/// Pulls the copy number out of the GT field of a copy-number record, e.g. "2"
fn read_cnv_record(record: &bcf::Record) -> Result<u32, Box<dyn std::error::Error>> {
    let all_genotypes = record.genotypes()?;
    let genotype = all_genotypes.get(0);
    let values: Vec<i32> = genotype.iter()
        .filter_map(|ga| match ga {
            GenotypeAllele::Unphased(v) |
            GenotypeAllele::Phased(v) => Some(*v),
            GenotypeAllele::UnphasedMissing |
            GenotypeAllele::PhasedMissing => None
        })
        .collect();
    match values.as_slice() {
        [v] => Ok(u32::try_from(*v)?),
        _ => bail!("Expected a single copy number in the {CNV_RECORD_ID} record, found: {genotype:?}")
    }
}

/// Loads the copy number from an assay output file.
/// The first line that is not blank or a "#" comment must be "<label> <integer>".
/// # Arguments
/// * `filename` - the assay output file
/// # Errors
/// * if the file cannot be read
/// * if there is no data line or it is malformed
pub fn load_cnv_value(filename: &Path) -> Result<u32, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(filename)?;
    read_cnv_value(BufReader::new(file))
}

/// Same as `load_cnv_value`, but from any buffered reader
pub fn read_cnv_value<R: BufRead>(reader: R) -> Result<u32, Box<dyn std::error::Error>> {
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 2 {
            bail!("Expected \"<label> <integer>\" for the copy number, found: {trimmed:?}");
        }
        let value: u32 = match fields[1].parse() {
            Ok(v) => v,
            Err(e) => bail!("Failed to parse copy number from {trimmed:?}: {e}")
        };
        debug!("Copy number for {}: {value}", fields[0]);
        return Ok(value);
    }
    bail!("No copy number found in assay output");
}
