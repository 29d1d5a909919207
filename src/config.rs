//! Tunable constants for the pipeline, with the defaults the original
//! analyzer ships. Every field is overridable from the command line
//! (`args::AnalyzeArgs`).

/// Ambiguity-handling policy for contigs whose best alignments tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AmbiguityUsage {
    /// Drop all tied alignments; count the contig as ambiguous.
    None,
    /// Keep only the first tied alignment.
    One,
    /// Keep every tied alignment.
    All,
}

impl Default for AmbiguityUsage {
    fn default() -> Self {
        AmbiguityUsage::One
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Contigs with fewer than this many unaligned bases are treated as
    /// fully captured by their best alignment family.
    pub maxun: u64,
    /// Fractional-identity tie-break window for the top alignment family.
    pub epsilon: f64,
    /// Threshold (in contig bases) above which an unaligned stretch
    /// between aligned pieces is "significant".
    pub significant_part_size: u64,
    /// Indel/local-misassembly boundary, in bases.
    pub max_indel_length: u64,
    /// Reference-gap threshold above which a same-reference discordance
    /// is extensive rather than local.
    pub extensive_misassembly_threshold: u64,
    /// Indel-length boundary between "short" and "long" fake indels.
    pub short_indel_threshold: u64,
    /// Maximum `|inconsistency|` for a same-reference, same-strand gap to
    /// be considered a scaffold gap.
    pub scaffolds_gap_threshold: u64,
    /// Minimum N-run length, on the contig between two alignments, for
    /// scaffold-gap classification.
    pub ns_break_threshold: u64,
    /// Fraction of aligned contig bases below which a contig is
    /// reclassified as partially-unaligned-with-misassembly.
    pub unaligned_misassembly_threshold: f64,
    /// SV matcher breakpoint tolerance, in reference bases.
    pub max_error: u64,

    /// Relative overlap threshold for the extra near-duplicate pruning
    /// pass (fraction of the shorter alignment's length).
    pub overlap_relative_threshold: f64,
    /// Absolute overlap threshold, in bases, for the same pass.
    pub overlap_absolute_threshold: u64,
    /// Maximum gap, in bases, between two chosen alignments for the
    /// near-duplicate pruning pass to consider them adjacent.
    pub overlap_detecting_gap: u64,

    /// Alignment count above which redundancy pruning (solid-alignment
    /// detection) runs before the best-set search.
    pub critical_number_of_alignments: usize,

    pub ambiguity_usage: AmbiguityUsage,
    pub scaffolds: bool,
    pub meta: bool,
    pub combined_reference: bool,
    pub check_fragmented_reference: bool,
    pub cyclic: bool,

    pub threads: usize,
}

impl Config {
    /// `extensive_penalty` for a contig of length `ctg_len` (§4.4).
    pub fn extensive_penalty(&self, ctg_len: u64) -> i64 {
        let bound = (self.extensive_misassembly_threshold / 4).min((ctg_len as f64 * 0.05) as u64);
        50_i64.max(bound as i64) - 1
    }

    /// `local_penalty` for a contig of length `ctg_len` (§4.4).
    pub fn local_penalty(&self, ctg_len: u64) -> i64 {
        let bound = (self.max_indel_length / 2).min((ctg_len as f64 * 0.01) as u64);
        2_i64.max(bound as i64) - 1
    }

    /// SV matcher's `max_gap` (§4.6).
    pub fn sv_max_gap(&self) -> u64 {
        self.extensive_misassembly_threshold / 4
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            maxun: 10,
            epsilon: 0.99,
            significant_part_size: 500,
            max_indel_length: 85,
            extensive_misassembly_threshold: 1000,
            short_indel_threshold: 5,
            scaffolds_gap_threshold: 1000,
            ns_break_threshold: 10,
            unaligned_misassembly_threshold: 0.5,
            max_error: 100,

            overlap_relative_threshold: 0.9,
            overlap_absolute_threshold: 25,
            overlap_detecting_gap: 1000,

            critical_number_of_alignments: 200,

            ambiguity_usage: AmbiguityUsage::One,
            scaffolds: false,
            meta: false,
            combined_reference: false,
            check_fragmented_reference: false,
            cyclic: false,

            threads: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensive_penalty_matches_floor() {
        let cfg = Config::default();
        // ctg_len large enough that the threshold/4 term (250) wins over 50
        assert_eq!(cfg.extensive_penalty(1_000_000), 249);
        // tiny contig: 0.05*ctg_len dominates downward, floor of 50 applies
        assert_eq!(cfg.extensive_penalty(100), 49);
    }

    #[test]
    fn local_penalty_matches_floor() {
        let cfg = Config::default();
        assert_eq!(cfg.local_penalty(1_000_000), 41);
        assert_eq!(cfg.local_penalty(10), 1);
    }
}
