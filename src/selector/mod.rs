//! The Selector stage (SPEC_FULL.md §4.2): for each contig, decides
//! whether it is unaligned, uniquely aligned, ambiguously aligned, or
//! needs the multi-alignment best-set search.

pub mod best_set;
pub mod surgery;

use crate::config::{AmbiguityUsage, Config};
use crate::model::Alignment;
use std::collections::HashMap;

/// The outcome of selecting alignments for one contig.
#[derive(Debug, Clone)]
pub enum ContigVerdict {
    Unaligned,
    UniqueAligned(Alignment),
    Ambiguous { top_set: Vec<Alignment>, policy: AmbiguityUsage },
    Multi(Vec<Alignment>),
}

/// Side effects the Selector records directly on the aggregator-facing
/// counters, returned alongside the verdict so the caller can fold them
/// into the per-assembly result without the Selector needing a mutable
/// aggregator reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorEffects {
    pub ambiguous_contigs: u64,
    pub ambiguous_extra_bases: i64,
}

/// Runs the full per-contig selection procedure (§4.2 steps 1-3).
pub fn select_for_contig(
    mut alignments: Vec<Alignment>, ctg_len: u64, config: &Config, ref_lengths: &HashMap<String, u64>, cyclic: bool,
) -> (ContigVerdict, SelectorEffects) {
    if alignments.is_empty() {
        return (ContigVerdict::Unaligned, SelectorEffects::default());
    }

    // 1. Sort alignments by descending (clen * idy, clen).
    alignments.sort_by(|a, b| {
        let score_a = a.clen as f64 * a.idy();
        let score_b = b.clen as f64 * b.idy();
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.clen.cmp(&a.clen))
    });

    let top = alignments[0].clone();
    let top_score = top.clen as f64 * top.idy();

    // 2. Single-family capture check.
    if top.clen as f64 > ctg_len as f64 * config.epsilon || ctg_len.saturating_sub(top.clen) < config.maxun {
        let top_set: Vec<Alignment> = alignments
            .iter()
            .filter(|a| {
                let score = a.clen as f64 * a.idy();
                top_score > 0.0 && (score / top_score) > config.epsilon
            })
            .cloned()
            .collect();

        if top_set.len() == 1 {
            return (ContigVerdict::UniqueAligned(top), SelectorEffects::default());
        }

        let mut effects = SelectorEffects::default();
        match config.ambiguity_usage {
            AmbiguityUsage::None => {
                effects.ambiguous_contigs = 1;
                effects.ambiguous_extra_bases = -(top.clen as i64);
            }
            AmbiguityUsage::One => {}
            AmbiguityUsage::All => {
                effects.ambiguous_extra_bases = top_set.iter().skip(1).map(|a| a.clen as i64).sum();
            }
        }

        return (
            ContigVerdict::Ambiguous { top_set, policy: config.ambiguity_usage },
            effects,
        );
    }

    // 3. Multi-alignment path: sort by reference end, prune, best-set search.
    let mut by_ref_end = alignments;
    by_ref_end.sort_by_key(|a| a.re);

    let pruned = best_set::prune_redundant(by_ref_end, config, ctg_len);
    let chosen = best_set::best_set_search(pruned, config, ctg_len, ref_lengths, cyclic);
    let chosen = best_set::drop_near_duplicate_alignments(chosen, config);

    (ContigVerdict::Multi(chosen), SelectorEffects::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alignment;

    fn lengths() -> HashMap<String, u64> {
        [("R".to_string(), 10_000)].into_iter().collect()
    }

    #[test]
    fn e1_unique_alignment() {
        let cfg = Config::default();
        let a = Alignment::new("R", 100, 599, 1, 500, 100.0, "C1");
        let (verdict, effects) = select_for_contig(vec![a], 500, &cfg, &lengths(), false);
        assert!(matches!(verdict, ContigVerdict::UniqueAligned(_)));
        assert_eq!(effects.ambiguous_contigs, 0);
    }

    #[test]
    fn e5_ambiguous_policy_none() {
        let mut cfg = Config::default();
        cfg.ambiguity_usage = AmbiguityUsage::None;
        let a = Alignment::new("R", 1, 400, 1, 400, 100.0, "C5");
        let b = Alignment::new("R", 1000, 1399, 1, 400, 100.0, "C5");
        let (verdict, effects) = select_for_contig(vec![a, b], 400, &cfg, &lengths(), false);
        assert!(matches!(verdict, ContigVerdict::Ambiguous { .. }));
        assert_eq!(effects.ambiguous_contigs, 1);
        assert_eq!(effects.ambiguous_extra_bases, -400);
    }

    #[test]
    fn unaligned_contig_has_no_alignments() {
        let cfg = Config::default();
        let (verdict, _) = select_for_contig(vec![], 500, &cfg, &lengths(), false);
        assert!(matches!(verdict, ContigVerdict::Unaligned));
    }
}
