
use log::{debug, trace};
use rayon::prelude::*;
use rustc_hash::FxHashSet as HashSet;

use crate::data_types::reference_pair::ReferencePair;
use crate::database::reference_table::ReferencePairTable;
use crate::genotyper::errors::MatchError;
use crate::genotyper::sample::ObservedSample;

/// The outcome of matching one sample, borrowing the pairs from the table
#[derive(Clone, Debug)]
pub struct MatchResult<'a> {
    /// Matching pairs, best first
    candidates: Vec<&'a ReferencePair>,
    /// The copy number the candidates were filtered on, if any
    observed_cnv: Option<u32>
}

impl<'a> MatchResult<'a> {
    /// The preferred pair, None when nothing matched
    pub fn best(&self) -> Option<&'a ReferencePair> {
        self.candidates.first().copied()
    }

    pub fn is_no_match(&self) -> bool {
        self.candidates.is_empty()
    }

    // getters
    pub fn candidates(&self) -> &[&'a ReferencePair] {
        &self.candidates
    }

    pub fn observed_cnv(&self) -> Option<u32> {
        self.observed_cnv
    }
}

/// Finds every reference pair consistent with a sample.
/// Pairs must agree on every marker the sample provides; markers absent from the sample are unconstrained.
/// If the sample has a copy number, pairs must also match it exactly.
/// Candidates are sorted by ranking (descending) and then by label so the best pair is deterministic.
/// The label tie-break is a plain byte-wise string comparison, so "CYP2D6*1/CYP2D6*10" comes before "CYP2D6*1/CYP2D6*2"
/// even though each label puts its own members in star number order.
/// # Arguments
/// * `table` - the reference table
/// * `sample` - the observed calls and optional copy number
/// # Errors
/// * if the sample has no marker calls
/// * if the sample has a marker that the table does not know about
pub fn match_sample<'a>(table: &'a ReferencePairTable, sample: &ObservedSample) -> Result<MatchResult<'a>, MatchError> {
    let sample_calls = sample.marker_calls();
    if sample_calls.is_empty() {
        return Err(MatchError::EmptySample);
    }

    let universe: HashSet<&str> = table.markers().iter().map(|m| m.as_str()).collect();
    if let Some(marker) = sample_calls.keys().find(|m| !universe.contains(m.as_str())) {
        return Err(MatchError::SchemaMismatch {
            marker: marker.clone(),
            catalogue_version: table.table_metadata().catalogue_version.clone()
        });
    }

    let observed_cnv = sample.observed_cnv();
    let mut candidates: Vec<&ReferencePair> = table.pairs().values()
        .filter(|pair| pair.matches_calls(sample_calls))
        .filter(|pair| match observed_cnv {
            Some(cnv) => pair.total_cnv() == cnv,
            None => true
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.ranking().cmp(&a.ranking())
            // lexical, not star number order
            .then_with(|| a.label().cmp(b.label()))
    });

    debug!("{}: {} candidate pairs", sample.sample_name(), candidates.len());
    for c in candidates.iter() {
        trace!("\t{} cnv={} ranking={}", c.label(), c.total_cnv(), c.ranking());
    }

    Ok(MatchResult {
        candidates,
        observed_cnv
    })
}

/// Matches many samples against one table in parallel.
/// Results are in the same order as the samples, and one failed sample does not affect the others.
pub fn match_batch<'a>(table: &'a ReferencePairTable, samples: &[ObservedSample]) -> Vec<Result<MatchResult<'a>, MatchError>> {
    samples.par_iter()
        .map(|sample| match_sample(table, sample))
        .collect()
}
