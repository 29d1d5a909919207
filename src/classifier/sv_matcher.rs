//! The SV matcher V (SPEC_FULL.md §4.6): a pure predicate deciding
//! whether a pair of adjacent alignments is explained by a known
//! structural variation from the optional SV hints BED.

use crate::config::Config;
use crate::model::{Alignment, StructuralVariations, SvBreakpoint};

fn within_error(bp: &SvBreakpoint, pos: u64, max_error: u64) -> bool {
    let lo = bp.start.saturating_sub(max_error);
    let hi = bp.end + max_error;
    pos >= lo && pos <= hi
}

/// Checks a translocation SV: `{p.ref, q.ref} == {bp1.ref, bp2.ref}` and
/// the inner breakpoints (`p.re`, `q.rs`) fall within `±max_error` of the
/// matching SV breakpoint's reference interval.
fn matches_translocation(p: &Alignment, q: &Alignment, bp1: &SvBreakpoint, bp2: &SvBreakpoint, max_error: u64) -> bool {
    let (p_bp, q_bp) = if bp1.ref_name == p.ref_name && bp2.ref_name == q.ref_name {
        (bp1, bp2)
    } else if bp1.ref_name == q.ref_name && bp2.ref_name == p.ref_name {
        (bp2, bp1)
    } else {
        return false;
    };
    within_error(p_bp, p.re, max_error) && within_error(q_bp, q.rs, max_error)
}

/// Checks an inversion SV: same reference, strand mismatch, inconsistency
/// within the extensive threshold, and either the pair's starts or ends
/// fall within the breakpoint confidence intervals.
fn matches_inversion(p: &Alignment, q: &Alignment, bp1: &SvBreakpoint, bp2: &SvBreakpoint, max_error: u64, inconsistency: i64, extensive_threshold: u64) -> bool {
    if p.ref_name != q.ref_name || bp1.ref_name != p.ref_name {
        return false;
    }
    if p.is_forward() == q.is_forward() {
        // same strand, no inversion
        return false;
    }
    if inconsistency.unsigned_abs() >= extensive_threshold {
        return false;
    }
    let starts_match = within_error(bp1, p.rs, max_error) && within_error(bp2, q.rs, max_error);
    let ends_match = within_error(bp1, p.re, max_error) && within_error(bp2, q.re, max_error);
    starts_match || ends_match
}

/// Checks a (possibly chained) relocation SV: `bp1.ref == p.ref` and
/// `p.re` matches `bp1`, then walks the chain forward while consecutive
/// SV starts are separated by at most `max_gap`, looking for a `bp2`
/// matching `q.rs` (SPEC_FULL.md §9, chain-merge note).
fn matches_relocation(p: &Alignment, q: &Alignment, relocations: &[(SvBreakpoint, SvBreakpoint)], max_error: u64, max_gap: u64) -> bool {
    let Some(start_idx) = relocations
        .iter()
        .position(|(bp1, _)| bp1.ref_name == p.ref_name && within_error(bp1, p.re, max_error))
    else {
        return false;
    };

    let mut current_bp2 = &relocations[start_idx].1;
    if current_bp2.ref_name == q.ref_name && within_error(current_bp2, q.rs, max_error) {
        return true;
    }

    for (bp1, bp2) in relocations.iter().skip(start_idx + 1) {
        if bp1.ref_name != current_bp2.ref_name {
            break;
        }
        if bp1.start.saturating_sub(current_bp2.end) > max_gap {
            break;
        }
        current_bp2 = bp2;
        if current_bp2.ref_name == q.ref_name && within_error(current_bp2, q.rs, max_error) {
            return true;
        }
    }

    false
}

/// Returns `true` if the pair `(p, q)` is explained by any entry in
/// `svs`. A pure function: identical inputs always yield the identical
/// verdict (testable property 6).
pub fn is_explained_by_sv(p: &Alignment, q: &Alignment, svs: &StructuralVariations, config: &Config, inconsistency: i64) -> bool {
    let max_error = config.max_error;
    let max_gap = config.sv_max_gap();

    if svs
        .translocations
        .iter()
        .any(|(bp1, bp2)| matches_translocation(p, q, bp1, bp2, max_error))
    {
        return true;
    }

    if svs.inversions.iter().any(|(bp1, bp2)| {
        matches_inversion(p, q, bp1, bp2, max_error, inconsistency, config.extensive_misassembly_threshold)
    }) {
        return true;
    }

    matches_relocation(p, q, &svs.relocations, max_error, max_gap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(ref_name: &str, start: u64, end: u64) -> SvBreakpoint {
        SvBreakpoint { ref_name: ref_name.to_string(), start, end }
    }

    #[test]
    fn translocation_matches_within_error() {
        let config = Config::default();
        let p = Alignment::new("A", 1, 300, 1, 300, 100.0, "C");
        let q = Alignment::new("B", 1, 300, 301, 600, 100.0, "C");
        let svs = StructuralVariations {
            translocations: vec![(bp("A", 295, 305), bp("B", 0, 5))],
            ..Default::default()
        };
        assert!(is_explained_by_sv(&p, &q, &svs, &config, 0));
    }

    #[test]
    fn is_idempotent() {
        let config = Config::default();
        let p = Alignment::new("A", 1, 300, 1, 300, 100.0, "C");
        let q = Alignment::new("B", 1, 300, 301, 600, 100.0, "C");
        let svs = StructuralVariations::default();
        let first = is_explained_by_sv(&p, &q, &svs, &config, 0);
        let second = is_explained_by_sv(&p, &q, &svs, &config, 0);
        assert_eq!(first, second);
    }
}
