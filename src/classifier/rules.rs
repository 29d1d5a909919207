//! The pure pair-classification rules shared by the Selector's best-set
//! scoring (which only needs the penalty bucket) and the Classifier's
//! full state machine (which needs the complete verdict to emit events).
//! Keeping one function as the source of truth avoids the two stages
//! drifting apart on what counts as "extensive" vs "local".

use crate::config::Config;
use crate::model::{Alignment, StructuralVariations};
use std::collections::HashMap;

/// The reference-relative geometry of a pair of contig-adjacent
/// alignments, computed once and reused by every classification rule.
#[derive(Debug, Clone, Copy)]
pub struct PairGeometry {
    pub contig_gap: i64,
    pub ref_gap: i64,
    pub inconsistency: i64,
    pub cyclic_moment: bool,
    pub same_ref: bool,
    pub strand_mismatch: bool,
}

/// Computes `contig_gap`, `ref_gap`, `inconsistency` and the cyclic
/// adjustment for an adjacent pair `(p, q)` (SPEC_FULL.md §4.5).
pub fn compute_geometry(p: &Alignment, q: &Alignment, ref_lengths: &HashMap<String, u64>, cyclic: bool, extensive_misassembly_threshold: u64) -> PairGeometry {
    let contig_gap = q.ctg_start() as i64 - p.ctg_end() as i64 - 1;
    let same_ref = p.ref_name == q.ref_name;
    let strand_mismatch = p.is_forward() != q.is_forward();

    let mut ref_gap = if same_ref {
        if p.is_forward() && q.is_forward() {
            q.rs as i64 - p.re as i64 - 1
        } else if !p.is_forward() && !q.is_forward() {
            p.rs as i64 - q.re as i64 - 1
        } else {
            q.rs as i64 - p.re as i64 - 1
        }
    } else {
        0
    };

    let mut cyclic_moment = false;
    if cyclic && same_ref {
        if let Some(&length) = ref_lengths.get(&p.ref_name) {
            let length = length as i64;
            let threshold = extensive_misassembly_threshold as i64;
            for candidate in [ref_gap + length, ref_gap - length] {
                if candidate.abs() < threshold && candidate.abs() < ref_gap.abs() {
                    ref_gap = candidate;
                    cyclic_moment = true;
                }
            }
        }
    }

    let inconsistency = ref_gap - contig_gap;

    PairGeometry {
        contig_gap,
        ref_gap,
        inconsistency,
        cyclic_moment,
        same_ref,
        strand_mismatch,
    }
}

/// The bucket used only for best-set scoring penalties (§4.4). Does not
/// distinguish fake sub-kinds that don't affect the penalty schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyKind {
    Extensive,
    Local,
    ScaffoldGap,
    Other,
}

/// Cheap approximation of the full classifier used only to price a pair
/// during best-set search: scaffold-gap / extensive / local / other,
/// skipping SV-table lookups and N-run inspection (those never change
/// which bucket a pair lands in for scoring purposes, only whether it is
/// later counted as "fake").
pub fn penalty_kind(geometry: &PairGeometry, config: &Config) -> PenaltyKind {
    if config.scaffolds && geometry.same_ref && !geometry.strand_mismatch && geometry.inconsistency.unsigned_abs() <= config.scaffolds_gap_threshold {
        return PenaltyKind::ScaffoldGap;
    }
    if !geometry.same_ref {
        return PenaltyKind::Extensive;
    }
    if geometry.inconsistency.unsigned_abs() > config.extensive_misassembly_threshold || geometry.strand_mismatch {
        return PenaltyKind::Extensive;
    }
    if geometry.inconsistency.unsigned_abs() > config.max_indel_length {
        return PenaltyKind::Local;
    }
    PenaltyKind::Other
}

/// Returns the penalty value for a pair given its bucket (§4.4's table).
pub fn penalty_value(kind: PenaltyKind, config: &Config, ctg_len: u64) -> i64 {
    match kind {
        PenaltyKind::Extensive => config.extensive_penalty(ctg_len),
        PenaltyKind::Local => config.local_penalty(ctg_len),
        PenaltyKind::ScaffoldGap => 5,
        PenaltyKind::Other => 0,
    }
}

/// Counts non-`N` bases in `seq[start..=end]` (1-based inclusive,
/// clamped to the sequence bounds). Used by the scaffold-gap and
/// fake-indel rules to check the contig gap is mostly/ entirely `N`.
pub fn count_non_n(seq: &[u8], start: u64, end: u64) -> u64 {
    if start > end || seq.is_empty() {
        return 0;
    }
    let lo = (start.saturating_sub(1)) as usize;
    let hi = (end as usize).min(seq.len());
    if lo >= hi {
        return 0;
    }
    seq[lo..hi].iter().filter(|&&b| b != b'N').count() as u64
}

/// Explicit structural-variation table reference, kept alongside the
/// reference-group table so the full classifier (not this module) can
/// invoke the SV matcher; exposed here only so callers don't need two
/// imports.
pub type SvTable = StructuralVariations;
