//! The reference coverage walk (SPEC_FULL.md §4.8): for each reference,
//! walks its alignments left to right over its regions, tallies gaps and
//! overlaps, reconciles SNPs against a contig-position cursor, and groups
//! consecutive indel SNPs into single `indels_list` entries.

use crate::model::{Alignment, GapStats, Region, ReferenceIndex, Snp, SnpIndex, SnpKind};

#[derive(Debug, Default)]
pub struct CoverageWalkResult {
    pub total_aligned_bases: u64,
    pub gap_stats: GapStats,
    pub indels_list: Vec<u64>,
    pub mismatches: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub redundant_contigs: u64,
    pub redundant_bases: u64,
    pub uncovered_regions: u64,
    pub uncovered_region_bases: u64,
}

/// Reconciles the SNP events attached to one alignment against a
/// contig-position cursor advanced `±1` per reference base, grouping
/// consecutive deletions/insertions into single indel entries (testable
/// property 8).
fn reconcile_snps(alignment: &Alignment, snps_at: impl Fn(u64) -> Vec<Snp>, result: &mut CoverageWalkResult) {
    let strand: i64 = if alignment.is_forward() { 1 } else { -1 };
    let mut ctg_estimate = alignment.cs as i64;

    let mut pending_deletion_run: Option<(u64, u64)> = None; // (start_ref_pos, length)
    let mut pending_insertion_run: Option<(u64, u64)> = None; // (ctg_pos, length)

    let (lo, hi) = (alignment.rs, alignment.re);
    for ref_pos in lo..=hi {
        let events = snps_at(ref_pos);
        for snp in events {
            if (ctg_estimate - snp.ctg_pos as i64).unsigned_abs() > 2 {
                continue;
            }
            match snp.kind {
                SnpKind::Substitution => {
                    flush_deletion(&mut pending_deletion_run, result);
                    flush_insertion(&mut pending_insertion_run, result);
                    result.mismatches += 1;
                }
                SnpKind::Deletion => {
                    flush_insertion(&mut pending_insertion_run, result);
                    match pending_deletion_run {
                        Some((start, len)) if ref_pos == start + len => {
                            pending_deletion_run = Some((start, len + 1));
                        }
                        _ => {
                            flush_deletion(&mut pending_deletion_run, result);
                            pending_deletion_run = Some((ref_pos, 1));
                        }
                    }
                }
                SnpKind::Insertion => {
                    flush_deletion(&mut pending_deletion_run, result);
                    match pending_insertion_run {
                        Some((ctg_pos, len)) if snp.ctg_pos as i64 == ctg_pos as i64 + strand * len as i64 => {
                            pending_insertion_run = Some((ctg_pos, len + 1));
                        }
                        _ => {
                            flush_insertion(&mut pending_insertion_run, result);
                            pending_insertion_run = Some((snp.ctg_pos, 1));
                        }
                    }
                }
            }
        }
        ctg_estimate += strand;
    }

    flush_deletion(&mut pending_deletion_run, result);
    flush_insertion(&mut pending_insertion_run, result);
}

fn flush_deletion(run: &mut Option<(u64, u64)>, result: &mut CoverageWalkResult) {
    if let Some((_, len)) = run.take() {
        result.deletions += 1;
        result.indels_list.push(len);
    }
}

fn flush_insertion(run: &mut Option<(u64, u64)>, result: &mut CoverageWalkResult) {
    if let Some((_, len)) = run.take() {
        result.insertions += 1;
        result.indels_list.push(len);
    }
}

/// Runs the coverage walk over one reference's alignments (already
/// filtered to that reference, in any order) against its region list.
fn walk_one_reference(mut alignments: Vec<Alignment>, regions: &[Region], snp_index: &SnpIndex, ref_name: &str, result: &mut CoverageWalkResult) {
    alignments.sort_by_key(|a| a.rs);

    for region in regions {
        let mut covered_any = false;
        let mut idx = 0;
        // advance past alignments ending before this region
        while idx < alignments.len() && alignments[idx].re < region.start {
            idx += 1;
        }

        let mut prev: Option<&Alignment> = None;
        let mut cursor = idx;
        while cursor < alignments.len() && alignments[cursor].rs <= region.end {
            let current = &alignments[cursor];

            if let Some(prev_align) = prev {
                if current.re <= prev_align.re {
                    result.redundant_contigs += 1;
                    result.redundant_bases += current.rlen;
                    cursor += 1;
                    continue;
                }
                let gap = current.rs as i64 - prev_align.re as i64 - 1;
                let internal = prev_align.contig_name == current.contig_name;
                if gap > 0 {
                    let tally = if internal { &mut result.gap_stats.positive.internal } else { &mut result.gap_stats.positive.external };
                    *tally += 1;
                    if !internal {
                        result.gap_stats.positive.external_total += gap as u64;
                    }
                } else if gap < 0 {
                    let tally = if internal { &mut result.gap_stats.negative.internal } else { &mut result.gap_stats.negative.external };
                    *tally += 1;
                    if !internal {
                        result.gap_stats.negative.external_total += (-gap) as u64;
                    }
                }
            }

            let clipped_start = current.rs.max(region.start);
            let clipped_end = current.re.min(region.end);
            if clipped_start <= clipped_end {
                result.total_aligned_bases += clipped_end - clipped_start + 1;
                covered_any = true;
            }

            if let Some(locus) = snp_index.get(&(ref_name.to_string(), current.contig_name.clone())) {
                let locus = locus.clone();
                reconcile_snps(current, |pos| locus.get(&pos).cloned().unwrap_or_default(), result);
            }

            prev = Some(current);
            cursor += 1;
        }

        if !covered_any {
            result.uncovered_regions += 1;
            result.uncovered_region_bases += region.len();
        }
    }
}

pub fn walk_coverage(reference_index: &ReferenceIndex, alignments_by_ref: &std::collections::HashMap<String, Vec<Alignment>>, snp_index: &SnpIndex) -> CoverageWalkResult {
    let mut result = CoverageWalkResult::default();

    for (ref_name, entry) in reference_index {
        let regions = entry.regions();
        let alignments = alignments_by_ref.get(ref_name).cloned().unwrap_or_default();
        walk_one_reference(alignments, &regions, snp_index, ref_name, &mut result);
    }

    result
}
