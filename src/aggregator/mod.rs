//! The Aggregator stage (SPEC_FULL.md §4.7): folds per-contig Selector
//! and Classifier output into the per-assembly `AssemblyResult`, and runs
//! the reference coverage walk (§4.8) to compute total aligned bases.

pub mod coverage;

use crate::classifier::ContigClassification;
use crate::config::Config;
use crate::model::{Alignment, AssemblyResult, MisassemblyKind, ReferenceIndex, SnpIndex};
use crate::selector::{ContigVerdict, SelectorEffects};
use std::collections::HashMap;

/// Folds one contig's Selector verdict and (if applicable) Classifier
/// output into the running `AssemblyResult`.
pub fn fold_contig(
    result: &mut AssemblyResult, contig_name: &str, ctg_len: u64, verdict: &ContigVerdict, effects: SelectorEffects,
    classification: Option<&mut ContigClassification>, config: &Config,
) {
    result.ambiguous_contigs += effects.ambiguous_contigs;
    result.ambiguous_extra_bases += effects.ambiguous_extra_bases;

    match verdict {
        ContigVerdict::Unaligned => {
            result.unaligned_contigs += 1;
            result.unaligned_bases += ctg_len;
            return;
        }
        ContigVerdict::UniqueAligned(_) | ContigVerdict::Ambiguous { .. } => {
            // no misassembly classification performed on these paths
            return;
        }
        ContigVerdict::Multi(_) => {}
    }

    let Some(classification) = classification else { return };

    if classification.aligned_length < ctg_len {
        result.partially_unaligned_contigs += 1;
        result.partially_unaligned_bases += ctg_len - classification.aligned_length;
    }

    let demoted = crate::classifier::demote_if_mostly_unaligned(classification, ctg_len, config);
    if demoted {
        result.partially_unaligned_with_misassembly += 1;
        return;
    }

    result.inter_contig_overlap += classification.inter_contig_overlap;
    result.misassemblies_matched_sv += classification.misassemblies_matched_sv;

    if !classification.misassemblies.is_empty() {
        result.misassembled_contigs.insert(contig_name.to_string(), ctg_len);
        result.misassembled_bases += ctg_len;

        for kind in &classification.misassemblies {
            result.record_misassembly(*kind);
        }
        for (g1, g2) in &classification.interspecies_pairs {
            result.record_interspecies(g1, g2);
        }
    }

    for indel in &classification.indels {
        if indel.is_insertion {
            result.insertions += 1;
        } else {
            result.deletions += 1;
        }
        result.indels_list.push(indel.length);
        result.mismatches += indel.residual_mismatches;
    }
    result.mismatches += classification.mismatches;
}

/// Records the meta-mode potential-translocation rule (§4.5 last
/// paragraph): a contig whose significant unaligned stretches sit
/// between aligned pieces contributes `POTENTIAL_CONTIG` once and
/// `POTENTIAL_EVENT` per qualifying stretch.
pub fn record_potential_translocation(result: &mut AssemblyResult, significant_gap_count: u64) {
    if significant_gap_count == 0 {
        return;
    }
    result.record_misassembly(MisassemblyKind::PotentialContig);
    for _ in 0..significant_gap_count {
        result.record_misassembly(MisassemblyKind::PotentialEvent);
    }
    result.partially_unaligned_with_significant_parts += 1;
}

/// Runs the reference coverage walk and folds its output into the
/// aggregate result: total aligned bases, average identity denominator,
/// gap/overlap stats, redundant-alignment tally, and SNP/indel totals
/// that the per-contig classifier pass doesn't see (because it only
/// walks the chosen-alignment list, not the SNP-reconciled reference
/// positions).
pub fn fold_coverage(result: &mut AssemblyResult, reference_index: &ReferenceIndex, alignments_by_ref: &HashMap<String, Vec<Alignment>>, snp_index: &SnpIndex) {
    let walk = coverage::walk_coverage(reference_index, alignments_by_ref, snp_index);
    result.total_aligned_bases = walk.total_aligned_bases;
    result.gap_stats = walk.gap_stats;
    result.redundant_contigs = walk.redundant_contigs;
    result.redundant_bases = walk.redundant_bases;
    result.uncovered_regions = walk.uncovered_regions;
    result.uncovered_region_bases = walk.uncovered_region_bases;
}

pub fn record_identity(result: &mut AssemblyResult, idy: f64) {
    result.sum_identity += idy;
    result.num_identity += 1;
}

/// Renders the human-readable per-assembly summary block (SPEC_FULL.md
/// §6 supplement), mirroring the original's printed report.
pub fn render_summary(result: &AssemblyResult) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "Misassemblies:");
    let _ = writeln!(out, "  relocations:                  {}", result.count(MisassemblyKind::Relocation));
    let _ = writeln!(out, "  translocations:                {}", result.count(MisassemblyKind::Translocation));
    let _ = writeln!(out, "  inversions:                    {}", result.count(MisassemblyKind::Inversion));
    let _ = writeln!(out, "  interspecies translocations:   {}", result.count(MisassemblyKind::InterspeciesTranslocation));
    let _ = writeln!(out, "  local misassemblies:           {}", result.count(MisassemblyKind::Local));
    let _ = writeln!(out, "  scaffold gaps (fake):          {}", result.count(MisassemblyKind::ScaffoldGap));
    let _ = writeln!(out, "  fragmented reference (fake):   {}", result.count(MisassemblyKind::Fragmented));
    let _ = writeln!(out, "  matched to known SVs:          {}", result.misassemblies_matched_sv);
    let _ = writeln!(out, "  total extensive:               {}", result.total_extensive());
    let _ = writeln!(out);

    let _ = writeln!(out, "Unaligned:");
    let _ = writeln!(out, "  fully unaligned contigs:       {} ({} bp)", result.unaligned_contigs, result.unaligned_bases);
    let _ = writeln!(
        out,
        "  partially unaligned contigs:   {} ({} bp)",
        result.partially_unaligned_contigs, result.partially_unaligned_bases
    );
    let _ = writeln!(out, "  partially unaligned w/ misassembly: {}", result.partially_unaligned_with_misassembly);
    let _ = writeln!(
        out,
        "  partially unaligned w/ significant parts: {}",
        result.partially_unaligned_with_significant_parts
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Ambiguous:");
    let _ = writeln!(out, "  contigs:                       {}", result.ambiguous_contigs);
    let _ = writeln!(out, "  extra bases:                   {}", result.ambiguous_extra_bases);
    let _ = writeln!(out);

    let _ = writeln!(out, "Coverage:");
    let _ = writeln!(out, "  total aligned bases:           {}", result.total_aligned_bases);
    let _ = writeln!(out, "  average identity:              {:.4}", result.average_identity());
    let _ = writeln!(out, "  uncovered regions:             {} ({} bp)", result.uncovered_regions, result.uncovered_region_bases);
    let _ = writeln!(out, "  inter-contig overlap:          {}", result.inter_contig_overlap);
    let _ = writeln!(
        out,
        "  positive gaps (internal/external): {}/{} ({} bp external)",
        result.gap_stats.positive.internal, result.gap_stats.positive.external, result.gap_stats.positive.external_total
    );
    let _ = writeln!(
        out,
        "  negative gaps (internal/external): {}/{} ({} bp external)",
        result.gap_stats.negative.internal, result.gap_stats.negative.external, result.gap_stats.negative.external_total
    );
    let _ = writeln!(out, "  redundant alignments:          {} ({} bp)", result.redundant_contigs, result.redundant_bases);
    let _ = writeln!(out);

    let _ = writeln!(out, "SNPs/indels:");
    let _ = writeln!(out, "  mismatches:                    {}", result.mismatches);
    let _ = writeln!(out, "  insertions:                    {}", result.insertions);
    let _ = writeln!(out, "  deletions:                     {}", result.deletions);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssemblyResult;

    #[test]
    fn unaligned_contig_is_tallied() {
        let mut result = AssemblyResult::default();
        let config = Config::default();
        fold_contig(&mut result, "C1", 500, &ContigVerdict::Unaligned, SelectorEffects::default(), None, &config);
        assert_eq!(result.unaligned_contigs, 1);
        assert_eq!(result.unaligned_bases, 500);
    }

    #[test]
    fn fold_contig_counts_indels_and_overlap_without_misassemblies() {
        use crate::classifier::{ContigClassification, IndelEvent};

        let mut result = AssemblyResult::default();
        let config = Config::default();
        let mut classification = ContigClassification {
            aligned_length: 500,
            inter_contig_overlap: 7,
            misassemblies_matched_sv: 1,
            indels: vec![IndelEvent { is_insertion: true, is_short: true, length: 3, residual_mismatches: 1 }],
            mismatches: 2,
            ..Default::default()
        };

        fold_contig(&mut result, "C1", 500, &ContigVerdict::Multi(Vec::new()), SelectorEffects::default(), Some(&mut classification), &config);

        assert!(result.misassembled_contigs.is_empty());
        assert_eq!(result.inter_contig_overlap, 7);
        assert_eq!(result.misassemblies_matched_sv, 1);
        assert_eq!(result.insertions, 1);
        assert_eq!(result.mismatches, 2 + 1);
    }

    #[test]
    fn potential_translocation_records_both_counts() {
        let mut result = AssemblyResult::default();
        record_potential_translocation(&mut result, 2);
        assert_eq!(result.count(MisassemblyKind::PotentialContig), 1);
        assert_eq!(result.count(MisassemblyKind::PotentialEvent), 2);
    }

    #[test]
    fn render_summary_contains_key_sections() {
        let result = AssemblyResult::default();
        let summary = render_summary(&result);
        assert!(summary.contains("Misassemblies:"));
        assert!(summary.contains("Coverage:"));
    }
}
