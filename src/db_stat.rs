
use std::collections::BTreeMap;

use crate::database::db_const::CYP2D6_STAR1;
use crate::database::reference_table::ReferencePairTable;

/// Prints the statistics for a given reference table
/// # Arguments
/// * `table` - the table to print the statistics for
pub fn print_stats(table: &ReferencePairTable) {
    // display the table metadata
    let metadata = table.table_metadata();
    println!("Table metadata:");
    println!("\tVersion: {}", metadata.tool_version);
    println!("\tCatalogue version: {}", metadata.catalogue_version);
    println!("\tRanking strategy: {}", metadata.ranking_strategy);
    println!("\tBuild time: {}", metadata.build_time);

    let haplotypes = table.haplotypes();
    let pairs = table.pairs();
    println!("Table statistics:");
    println!("\tMarkers: {}", table.markers().len());
    println!("\tHaplotypes: {}", haplotypes.len());
    println!("\t\tHybrids: {}", haplotypes.values().filter(|h| h.is_hybrid()).count());
    println!("\tReference pairs: {}", pairs.len());
    println!("\t\tSelf pairs: {}", pairs.values().filter(|p| p.members().is_homozygous()).count());

    let mut tier_counts: BTreeMap<String, usize> = Default::default();
    for haplotype in haplotypes.values() {
        *tier_counts.entry(haplotype.tier().to_string()).or_insert(0) += 1;
    }
    println!("\tHaplotypes by tier:");
    for (tier, count) in tier_counts.iter() {
        println!("\t\t{tier}: {count}");
    }

    let mut cnv_counts: BTreeMap<u32, usize> = Default::default();
    let mut ranking_counts: BTreeMap<u8, usize> = Default::default();
    for pair in pairs.values() {
        *cnv_counts.entry(pair.total_cnv()).or_insert(0) += 1;
        *ranking_counts.entry(pair.ranking()).or_insert(0) += 1;
    }
    println!("\tPairs by total CNV:");
    for (cnv, count) in cnv_counts.iter() {
        println!("\t\t{cnv}: {count}");
    }
    println!("\tPairs by ranking:");
    for (ranking, count) in ranking_counts.iter() {
        println!("\t\t{ranking}: {count}");
    }

    // per-haplotype listing only with elevated verbosity
    if log::log_enabled!(log::Level::Debug) {
        println!();
        println!("Haplotype statistics:");
        println!("haplotype\tcopy_number\ttier\thybrid\tvariant_markers");
        // variant markers are counted relative to *1, which has all reference calls
        let reference_hap = haplotypes.get(CYP2D6_STAR1);
        for (name, haplotype) in haplotypes.iter() {
            let variant_markers = match reference_hap {
                Some(rh) => haplotype.allele_calls().iter()
                    .filter(|(marker, call)| rh.allele_calls().get(marker.as_str()) != Some(*call))
                    .count(),
                None => 0
            };
            println!("{name}\t{}\t{}\t{}\t{variant_markers}", haplotype.copy_number(), haplotype.tier(), haplotype.is_hybrid());
        }
        println!();
    }
}
