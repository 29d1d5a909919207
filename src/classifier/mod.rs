//! The Classifier stage (SPEC_FULL.md §4.5): walks a contig's chosen
//! alignments in contig order, classifies every adjacent pair, and emits
//! misassembly events plus the post-classification "partially unaligned
//! with misassembly" and "potential translocation" rules.

pub mod rules;
pub mod sv_matcher;

use crate::config::Config;
use crate::model::{Alignment, MisassemblyKind, ReferenceIndex, StructuralVariations};
use crate::selector::surgery;
use rules::{compute_geometry, count_non_n};
use std::collections::HashMap;

/// A single indel (fake-misassembly) event folded into SNP/indel totals.
#[derive(Debug, Clone, Copy)]
pub struct IndelEvent {
    pub is_insertion: bool,
    pub is_short: bool,
    pub length: u64,
    pub residual_mismatches: u64,
}

/// Everything the Classifier produces for one contig, consumed by the
/// Aggregator.
#[derive(Debug, Default)]
pub struct ContigClassification {
    pub misassemblies: Vec<MisassemblyKind>,
    pub interspecies_pairs: Vec<(String, String)>,
    pub misassemblies_matched_sv: u64,
    pub indels: Vec<IndelEvent>,
    pub mismatches: u64,
    pub aligned_length: u64,
    pub inter_contig_overlap: u64,
    pub adjusted_alignments: Vec<Alignment>,
}

/// Looks up the reference group for a reference name, defaulting to the
/// reference name itself when the group table doesn't know it (single
/// reference, non-meta run).
fn group_of<'a>(ref_groups: &'a HashMap<String, String>, ref_name: &'a str) -> &'a str {
    ref_groups.get(ref_name).map(String::as_str).unwrap_or(ref_name)
}

/// Classifies the full ordered sequence of chosen alignments for one
/// contig (§4.5). `contig_seq` is used for N-run detection in the
/// scaffold-gap and fake-indel rules.
#[allow(clippy::too_many_arguments)]
pub fn classify_contig(
    mut alignments: Vec<Alignment>, contig_seq: &[u8], ctg_len: u64, reference_index: &ReferenceIndex, ref_groups: &HashMap<String, String>,
    sv_table: &StructuralVariations, config: &Config,
) -> ContigClassification {
    let mut out = ContigClassification::default();
    if alignments.is_empty() {
        return out;
    }

    alignments.sort_by_key(|a| a.ctg_start());

    let ref_lengths: HashMap<String, u64> = reference_index.iter().map(|(name, entry)| (name.clone(), entry.length)).collect();

    out.aligned_length += alignments[0].clen;

    let mut i = 0;
    while i + 1 < alignments.len() {
        let (mut p, mut q) = (alignments[i].clone(), alignments[i + 1].clone());
        let mut geometry = compute_geometry(&p, &q, &ref_lengths, config.cyclic, config.extensive_misassembly_threshold);

        // 1. Scaffold gap
        let mut classified = false;
        if config.scaffolds && geometry.same_ref && !geometry.strand_mismatch && geometry.inconsistency.unsigned_abs() <= config.scaffolds_gap_threshold {
            let gap_start = p.ctg_end() + 1;
            let gap_end = q.ctg_start().saturating_sub(1);
            let gap_len = gap_end.saturating_sub(gap_start).saturating_add(1);
            if gap_len >= config.ns_break_threshold {
                let non_n = count_non_n(contig_seq, gap_start, gap_end);
                if gap_len > 0 && (non_n as f64) < 0.05 * gap_len as f64 {
                    out.misassemblies.push(MisassemblyKind::ScaffoldGap);
                    classified = true;
                }
            }
        }

        // 2. SV-explained
        if !classified && sv_matcher::is_explained_by_sv(&p, &q, sv_table, config, geometry.inconsistency) {
            out.misassemblies_matched_sv += 1;
            classified = true;
        }

        if !classified {
            if !geometry.same_ref {
                // 3. Cross-reference
                if config.combined_reference && group_of(ref_groups, &p.ref_name) != group_of(ref_groups, &q.ref_name) {
                    out.misassemblies.push(MisassemblyKind::InterspeciesTranslocation);
                    out.interspecies_pairs
                        .push((group_of(ref_groups, &p.ref_name).to_string(), group_of(ref_groups, &q.ref_name).to_string()));
                } else if config.check_fragmented_reference
                    && within_indel_of_ref_end(&p, reference_index, config.max_indel_length)
                    && within_indel_of_ref_start(&q, reference_index, config.max_indel_length)
                {
                    out.misassemblies.push(MisassemblyKind::Fragmented);
                    // strand1 := strand2, open question preserved verbatim
                    let p_gap_to_end = reference_end_gap(&p, reference_index);
                    let q_gap_to_start = q.rs.saturating_sub(1);
                    geometry.inconsistency = (p_gap_to_end + q_gap_to_start) as i64;
                } else {
                    out.misassemblies.push(MisassemblyKind::Translocation);
                }
                classified = true;
            }
        }

        if !classified {
            // 4. Same reference, large inconsistency or strand mismatch
            if geometry.inconsistency.unsigned_abs() > config.extensive_misassembly_threshold || geometry.strand_mismatch {
                if geometry.strand_mismatch {
                    out.misassemblies.push(MisassemblyKind::Inversion);
                } else {
                    out.misassemblies.push(MisassemblyKind::Relocation);
                }
                classified = true;
            }
        }

        if !classified {
            // 5. Near-boundary region
            if geometry.inconsistency == 0 && geometry.cyclic_moment {
                // fake: circular genome linear representation
            } else if geometry.inconsistency.unsigned_abs() <= config.max_indel_length {
                let gap_start = p.ctg_end() + 1;
                let gap_end = q.ctg_start().saturating_sub(1);
                let non_n_gap = count_non_n(contig_seq, gap_start, gap_end);
                if non_n_gap <= config.max_indel_length {
                    if geometry.inconsistency == 0 {
                        out.mismatches += non_n_gap;
                    } else {
                        let length = geometry.inconsistency.unsigned_abs();
                        let residual = (non_n_gap as i64 - geometry.inconsistency.abs()).max(0) as u64;
                        out.indels.push(IndelEvent {
                            is_insertion: geometry.inconsistency < 0,
                            is_short: length <= config.short_indel_threshold,
                            length,
                            residual_mismatches: residual,
                        });
                    }
                } else {
                    out.misassemblies.push(MisassemblyKind::Local);
                }
            } else {
                out.misassemblies.push(MisassemblyKind::Local);
            }
        }

        // Side effect: internal-overlap exclusion for same-ref pairs (or
        // cross-ref & fake-translocation path, i.e. Fragmented).
        if geometry.contig_gap < 0 && (geometry.same_ref || matches!(out.misassemblies.last(), Some(MisassemblyKind::Fragmented))) {
            let removed = surgery::exclude_internal_overlap(&mut p, &mut q, config.ambiguity_usage);
            out.inter_contig_overlap += removed;
            alignments[i] = p.clone();
            alignments[i + 1] = q.clone();
            if removed <= out.aligned_length {
                out.aligned_length -= removed;
            }
        }

        out.aligned_length += alignments[i + 1].clen;
        i += 1;
    }

    out.adjusted_alignments = alignments;
    out
}

fn reference_end_gap(a: &Alignment, reference_index: &ReferenceIndex) -> u64 {
    reference_index.get(&a.ref_name).map(|entry| entry.length.saturating_sub(a.re)).unwrap_or(0)
}

fn within_indel_of_ref_end(a: &Alignment, reference_index: &ReferenceIndex, max_indel_length: u64) -> bool {
    reference_end_gap(a, reference_index) <= max_indel_length
}

fn within_indel_of_ref_start(a: &Alignment, _reference_index: &ReferenceIndex, max_indel_length: u64) -> bool {
    a.rs.saturating_sub(1) <= max_indel_length
}

/// Applies the partially-unaligned-with-misassembly rule (§4.5): if the
/// aligned contig bases fall below `unaligned_misassembly_threshold *
/// ctg_len`, the misassembly events are discarded from the
/// misassembled-contig accounting (individual alignments remain aligned
/// regions).
pub fn demote_if_mostly_unaligned(classification: &mut ContigClassification, ctg_len: u64, config: &Config) -> bool {
    if (classification.aligned_length as f64) < config.unaligned_misassembly_threshold * ctg_len as f64 {
        classification.misassemblies.clear();
        classification.interspecies_pairs.clear();
        true
    } else {
        false
    }
}

/// Scans the chosen alignments for significant unaligned stretches
/// (non-`N`, `>= significant_part_size`) between aligned pieces, used by
/// the meta-mode potential-translocation rule (§4.5 last paragraph).
pub fn count_significant_gaps(alignments: &[Alignment], contig_seq: &[u8], config: &Config) -> u64 {
    let mut sorted = alignments.to_vec();
    sorted.sort_by_key(|a| a.ctg_start());
    let mut count = 0;
    for pair in sorted.windows(2) {
        let gap_start = pair[0].ctg_end() + 1;
        let gap_end = pair[1].ctg_start().saturating_sub(1);
        if gap_end < gap_start {
            continue;
        }
        let non_n = count_non_n(contig_seq, gap_start, gap_end);
        if non_n >= config.significant_part_size {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReferenceEntry;

    fn ref_index() -> ReferenceIndex {
        let mut idx = ReferenceIndex::default();
        idx.insert(
            "R".to_string(),
            ReferenceEntry { sequence: vec![b'A'; 10_000], length: 10_000, group: "g1".to_string() },
        );
        idx
    }

    #[test]
    fn e2_inversion_classified() {
        let config = Config::default();
        let p = Alignment::new("R", 1, 400, 1, 400, 100.0, "C2");
        let q = Alignment::new("R", 401, 800, 800, 401, 100.0, "C2");
        let seq = vec![b'A'; 800];
        let result = classify_contig(vec![p, q], &seq, 800, &ref_index(), &HashMap::new(), &StructuralVariations::default(), &config);
        assert_eq!(result.misassemblies, vec![MisassemblyKind::Inversion]);
    }

    #[test]
    fn e6_local_from_small_overlap() {
        let config = Config::default();
        let p = Alignment::new("R", 1, 500, 1, 500, 100.0, "C6");
        let q = Alignment::new("R", 700, 1200, 480, 980, 100.0, "C6");
        let seq = vec![b'A'; 1000];
        let result = classify_contig(vec![p, q], &seq, 1000, &ref_index(), &HashMap::new(), &StructuralVariations::default(), &config);
        assert_eq!(result.misassemblies, vec![MisassemblyKind::Local]);
        assert_eq!(result.inter_contig_overlap, 21);
    }

    #[test]
    fn e3_scaffold_gap_of_ns() {
        let mut config = Config::default();
        config.scaffolds = true;
        let p = Alignment::new("R", 1, 500, 1, 500, 100.0, "C3");
        let q = Alignment::new("R", 601, 1100, 701, 1200, 100.0, "C3");
        let mut seq = vec![b'A'; 1200];
        for b in seq.iter_mut().take(700).skip(500) {
            *b = b'N';
        }
        let result = classify_contig(vec![p, q], &seq, 1200, &ref_index(), &HashMap::new(), &StructuralVariations::default(), &config);
        assert_eq!(result.misassemblies, vec![MisassemblyKind::ScaffoldGap]);
    }

    #[test]
    fn e4_interspecies_translocation() {
        let mut config = Config::default();
        config.combined_reference = true;
        let mut idx = ref_index();
        idx.insert(
            "A".to_string(),
            ReferenceEntry { sequence: vec![b'A'; 300], length: 300, group: "g1".to_string() },
        );
        idx.insert(
            "B".to_string(),
            ReferenceEntry { sequence: vec![b'A'; 300], length: 300, group: "g2".to_string() },
        );
        let mut groups = HashMap::new();
        groups.insert("A".to_string(), "g1".to_string());
        groups.insert("B".to_string(), "g2".to_string());

        let p = Alignment::new("A", 1, 300, 1, 300, 100.0, "C4");
        let q = Alignment::new("B", 1, 300, 301, 600, 100.0, "C4");
        let seq = vec![b'A'; 600];
        let result = classify_contig(vec![p, q], &seq, 600, &idx, &groups, &StructuralVariations::default(), &config);
        assert_eq!(result.misassemblies, vec![MisassemblyKind::InterspeciesTranslocation]);
        assert_eq!(result.interspecies_pairs, vec![("g1".to_string(), "g2".to_string())]);
    }
}
