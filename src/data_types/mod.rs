
/// Contains the order-independent allele call value type
pub mod allele_call;
/// Contains the named haplotype with per-marker calls, copy number, and tier
pub mod haplotype;
/// Contains the unordered haplotype pair and its merged signature
pub mod reference_pair;
