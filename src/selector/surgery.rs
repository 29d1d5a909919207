//! Interval surgery on overlapping alignments (SPEC_FULL.md §4.3, first
//! half): endpoint shifts already live on `Alignment`; this module adds
//! the internal-overlap exclusion policy applied between two alignments
//! adjacent on the contig.

use crate::config::AmbiguityUsage;
use crate::model::Alignment;

/// Resolves an overlap between two contig-adjacent alignments according
/// to `policy`. `first` precedes `second` on the contig. Returns the
/// number of contig bases removed from `first` (used by the caller to
/// correct aligned-length accounting).
///
/// Overlap is `contig_gap = min(second.cs,second.ce) - max(first.cs,
/// first.ce) - 1 < 0`; callers should only invoke this when that holds.
pub fn exclude_internal_overlap(first: &mut Alignment, second: &mut Alignment, policy: AmbiguityUsage) -> u64 {
    let overlap_end = first.ctg_end();
    let overlap_start = second.ctg_start();
    if overlap_start > overlap_end {
        return 0;
    }

    match policy {
        AmbiguityUsage::All => 0,
        AmbiguityUsage::One => {
            // shift the endpoint of the shorter alignment to remove the overlap
            if first.clen <= second.clen {
                let original_first_clen = first.clen;
                let new_end = overlap_start.saturating_sub(1).max(first.ctg_start());
                if new_end < first.ctg_start() {
                    return first.clen;
                }
                first.shift_contig_end(new_end);
                original_first_clen - first.clen
            } else {
                let new_start = (overlap_end + 1).min(second.ctg_end());
                second.shift_contig_start(new_start);
                0
            }
        }
        AmbiguityUsage::None => {
            // Remove the overlap from both alignments independently, each
            // shifted off its own pre-shift endpoint (`contigs_analyzer.py`
            // lines 571-575): align1's end moves back to just before
            // align2's original start, align2's start moves forward to
            // just after align1's original end. This leaves a real gap
            // between the two where the overlap used to be, not a
            // midpoint split.
            let original_first_clen = first.clen;
            let new_first_end = overlap_start.saturating_sub(1);
            let new_second_start = overlap_end + 1;

            if new_first_end < first.ctg_start() {
                original_first_clen
            } else {
                first.shift_contig_end(new_first_end);
                second.shift_contig_start(new_second_start);
                original_first_clen - first.clen
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alignment;

    #[test]
    fn policy_all_leaves_alignments_untouched() {
        let mut a = Alignment::new("r", 1, 100, 1, 100, 100.0, "c");
        let mut b = Alignment::new("r", 50, 150, 50, 150, 100.0, "c");
        let removed = exclude_internal_overlap(&mut a, &mut b, AmbiguityUsage::All);
        assert_eq!(removed, 0);
        assert_eq!(a.ce, 100);
        assert_eq!(b.cs, 50);
    }

    #[test]
    fn policy_none_leaves_a_real_gap_not_a_midpoint_split() {
        let mut a = Alignment::new("r", 1, 100, 1, 100, 100.0, "c");
        let mut b = Alignment::new("r", 50, 150, 50, 150, 100.0, "c");
        let removed = exclude_internal_overlap(&mut a, &mut b, AmbiguityUsage::None);
        assert_eq!(removed, 51);
        assert_eq!(a.ctg_start(), 1);
        assert_eq!(a.ctg_end(), 49);
        assert_eq!(b.ctg_start(), 101);
        assert_eq!(b.ctg_end(), 150);
        assert_eq!(a.rlen, a.re - a.rs + 1);
        assert_eq!(b.rlen, b.re - b.rs + 1);
    }

    #[test]
    fn policy_one_removed_count_matches_actual_shrinkage() {
        let mut a = Alignment::new("r", 1, 100, 1, 100, 100.0, "c");
        let mut b = Alignment::new("r", 1, 200, 1, 200, 100.0, "c");
        let removed = exclude_internal_overlap(&mut a, &mut b, AmbiguityUsage::One);
        assert_eq!(removed, a.clen.abs_diff(100));
        assert_eq!(a.ctg_start(), a.ctg_end());
        assert_eq!(a.rlen, a.re - a.rs + 1);
    }

    #[test]
    fn policy_one_shifts_shorter_alignment() {
        let mut a = Alignment::new("r", 1, 100, 1, 100, 100.0, "c");
        let mut b = Alignment::new("r", 50, 200, 50, 200, 100.0, "c");
        let _ = exclude_internal_overlap(&mut a, &mut b, AmbiguityUsage::One);
        assert!(a.ctg_end() < b.ctg_start() || a.ctg_end() == b.ctg_start() - 1 || a.clen < 100);
        assert_eq!(a.rlen, a.re - a.rs + 1);
        assert_eq!(b.rlen, b.re - b.rs + 1);
    }
}
