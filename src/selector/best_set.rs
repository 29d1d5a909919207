//! Redundancy pruning and the best-set search (SPEC_FULL.md §4.3 second
//! half and §4.4), run on the multi-alignment path after alignments are
//! sorted by reference end.

use crate::classifier::rules::{compute_geometry, penalty_kind, penalty_value};
use crate::config::Config;
use crate::model::Alignment;
use std::collections::HashMap;

/// Drops alignments whose contig interval lies entirely inside the union
/// of "solid" intervals — alignments with a contig span longer than
/// `2 * extensive_penalty` not covered by any later alignment in
/// end-sorted order. Only runs when `alignments.len() >
/// config.critical_number_of_alignments`; returns the input unchanged
/// otherwise.
pub fn prune_redundant(alignments: Vec<Alignment>, config: &Config, ctg_len: u64) -> Vec<Alignment> {
    if alignments.len() <= config.critical_number_of_alignments {
        return alignments;
    }

    let extensive_penalty = config.extensive_penalty(ctg_len).max(0) as u64;
    let solid_min_len = 2 * extensive_penalty;

    let n = alignments.len();
    let mut solid_intervals: Vec<(u64, u64)> = Vec::new();

    for i in 0..n {
        let (start_i, end_i) = (alignments[i].ctg_start(), alignments[i].ctg_end());
        if end_i - start_i + 1 <= solid_min_len {
            continue;
        }
        // "not covered by any later alignment in end-sorted order":
        // check every alignment after i (alignments is end-sorted).
        let mut covered_later = false;
        for later in alignments.iter().skip(i + 1) {
            let (ls, le) = (later.ctg_start(), later.ctg_end());
            if ls <= start_i && le >= end_i {
                covered_later = true;
                break;
            }
        }
        if !covered_later {
            solid_intervals.push((start_i, end_i));
        }
    }

    if solid_intervals.is_empty() {
        return alignments;
    }

    alignments
        .into_iter()
        .filter(|a| {
            let (s, e) = (a.ctg_start(), a.ctg_end());
            !solid_intervals.iter().any(|&(ss, se)| ss <= s && e <= se)
        })
        .collect()
}

#[derive(Clone)]
struct FrontierState {
    score: i64,
    covered: Vec<(u64, u64)>,
    chosen: Vec<usize>,
}

fn added_covered_length(covered: &[(u64, u64)], start: u64, end: u64) -> u64 {
    // union-aware incremental coverage: sum of the portion of [start,end]
    // not already covered by any interval in `covered`.
    let mut points = vec![false; (end - start + 1) as usize];
    for &(cs, ce) in covered {
        let lo = cs.max(start);
        let hi = ce.min(end);
        if lo > hi {
            continue;
        }
        for p in lo..=hi {
            points[(p - start) as usize] = true;
        }
    }
    points.iter().filter(|&&p| !p).count() as u64
}

/// Runs the O(n^2) best-set DP search described in §4.4: chooses the
/// subsequence (in contig-end order) of `alignments` maximizing newly
/// covered contig length minus inter-alignment classification penalties.
pub fn best_set_search(
    alignments: Vec<Alignment>, config: &Config, ctg_len: u64, ref_lengths: &HashMap<String, u64>, cyclic: bool,
) -> Vec<Alignment> {
    let n = alignments.len();
    if n == 0 {
        return alignments;
    }
    if n == 1 {
        return alignments;
    }

    let mut by_end = alignments;
    by_end.sort_by_key(|a| a.ctg_end());

    let mut dp: Vec<FrontierState> = Vec::with_capacity(n);
    for i in 0..n {
        let a = &by_end[i];
        let mut best = FrontierState {
            score: added_covered_length(&[], a.ctg_start(), a.ctg_end()) as i64,
            covered: vec![(a.ctg_start(), a.ctg_end())],
            chosen: vec![i],
        };

        for j in 0..i {
            let prev = &dp[j];
            let b = &by_end[j];
            let gained = added_covered_length(&prev.covered, a.ctg_start(), a.ctg_end());
            let geometry = compute_geometry(b, a, ref_lengths, cyclic, config.extensive_misassembly_threshold);
            let penalty = penalty_value(penalty_kind(&geometry, config), config, ctg_len);
            let candidate_score = prev.score + gained as i64 - penalty;

            if candidate_score > best.score {
                let mut covered = prev.covered.clone();
                covered.push((a.ctg_start(), a.ctg_end()));
                let mut chosen = prev.chosen.clone();
                chosen.push(i);
                best = FrontierState { score: candidate_score, covered, chosen };
            }
        }

        dp.push(best);
    }

    let best_final = dp.iter().max_by_key(|s| s.score).expect("non-empty dp");
    let mut chosen_indices = best_final.chosen.clone();
    chosen_indices.sort_unstable();

    chosen_indices.into_iter().map(|idx| by_end[idx].clone()).collect()
}

/// The extra near-duplicate pruning pass (SPEC_FULL.md §4.3 supplement),
/// grounded on `contigs_analyzer.py` lines 1193-1217: for contigs with
/// >= 3 chosen alignments, walk only the *middle* alignments of the
/// sorted chain (never the first or last). For each middle candidate,
/// `gap` is the distance from the last *retained* alignment's end to the
/// *next* alignment's start (skipping over the candidate itself), and
/// `overlap` is the sum of both overhangs — the retained end's overhang
/// into the candidate, and the candidate's overhang past the next
/// alignment's start — relative to the candidate's own `clen`. A
/// candidate found redundant is always the one dropped; the retained end
/// then stays put instead of advancing to the dropped candidate.
pub fn drop_near_duplicate_alignments(mut chosen: Vec<Alignment>, config: &Config) -> Vec<Alignment> {
    if chosen.len() < 3 {
        return chosen;
    }
    chosen.sort_by_key(|a| a.ctg_start());

    let n = chosen.len();
    let mut to_remove = vec![false; n];
    let mut prev_end = chosen[0].ctg_end() as i64;

    for i in 1..n - 1 {
        let middle_start = chosen[i].ctg_start() as i64;
        let middle_end = chosen[i].ctg_end() as i64;
        let succ_start = chosen[i + 1].ctg_start() as i64;

        let gap = succ_start - prev_end - 1;
        if gap > config.overlap_detecting_gap as i64 {
            prev_end = middle_end;
            continue;
        }

        let mut overlap: i64 = 0;
        if prev_end - middle_start + 1 > 0 {
            overlap += prev_end - middle_start + 1;
        }
        if middle_end - succ_start + 1 > 0 {
            overlap += middle_end - succ_start + 1;
        }

        let is_redundant =
            gap < config.overlap_absolute_threshold as i64 || (overlap as f64 / chosen[i].clen as f64) > config.overlap_relative_threshold;

        if is_redundant {
            to_remove[i] = true;
        } else {
            prev_end = middle_end;
        }
    }

    chosen.into_iter().enumerate().filter(|(idx, _)| !to_remove[*idx]).map(|(_, a)| a).collect()
}
