//! End-to-end literal scenarios E1-E6 (spec.md §8), driving the full
//! Loader -> Selector -> Classifier -> Aggregator pipeline against the
//! same alignment geometries the spec spells out, rather than unit tests
//! calling one stage at a time (each stage's own scenario subset is
//! covered in its colocated `#[cfg(test)]` module).

use misassembly_analyzer::config::{AmbiguityUsage, Config};
use misassembly_analyzer::model::{Alignment, MisassemblyKind, ReferenceEntry, ReferenceIndex, StructuralVariations};
use misassembly_analyzer::{aggregator, classifier, selector};
use std::collections::HashMap;

fn ref_index_with(name: &str, length: u64, group: &str) -> ReferenceIndex {
    let mut idx = ReferenceIndex::default();
    idx.insert(name.to_string(), ReferenceEntry { sequence: vec![b'A'; length as usize], length, group: group.to_string() });
    idx
}

fn ref_lengths(idx: &ReferenceIndex) -> HashMap<String, u64> {
    idx.iter().map(|(n, e)| (n.clone(), e.length)).collect()
}

/// E1 - Unique alignment: one alignment covers the whole contig.
#[test]
fn e1_unique_alignment() {
    let config = Config::default();
    let ref_idx = ref_index_with("R", 1000, "g");
    let lengths = ref_lengths(&ref_idx);

    let a = Alignment::new("R", 100, 599, 1, 500, 100.0, "C1");
    let (verdict, effects) = selector::select_for_contig(vec![a.clone()], 500, &config, &lengths, false);

    let mut result = Default::default();
    aggregator::fold_contig(&mut result, "C1", 500, &verdict, effects, None, &config);
    let mut by_ref = HashMap::new();
    by_ref.insert("R".to_string(), vec![a]);
    aggregator::fold_coverage(&mut result, &ref_idx, &by_ref, &Default::default());

    assert!(matches!(verdict, selector::ContigVerdict::UniqueAligned(_)));
    assert_eq!(result.unaligned_contigs, 0);
    assert_eq!(result.partially_unaligned_contigs, 0);
    assert_eq!(result.total_aligned_bases, 500);
}

/// E2 - Inversion: two alignments on opposite strands of the same
/// reference, covering the whole contig between them.
#[test]
fn e2_inversion() {
    let config = Config::default();
    let ref_idx = ref_index_with("R", 10_000, "g");
    let lengths = ref_lengths(&ref_idx);

    let p = Alignment::new("R", 1, 400, 1, 400, 100.0, "C2");
    let q = Alignment::new("R", 401, 800, 800, 401, 100.0, "C2");
    let seq = vec![b'A'; 800];

    let (verdict, effects) = selector::select_for_contig(vec![p.clone(), q.clone()], 800, &config, &lengths, false);
    let selector::ContigVerdict::Multi(chosen) = verdict.clone() else {
        panic!("expected the multi-alignment path for two disjoint, covering alignments");
    };

    let mut classification = classifier::classify_contig(chosen, &seq, 800, &ref_idx, &HashMap::new(), &StructuralVariations::default(), &config);
    let mut result = Default::default();
    aggregator::fold_contig(&mut result, "C2", 800, &verdict, effects, Some(&mut classification), &config);

    assert_eq!(result.count(MisassemblyKind::Inversion), 1);
    assert!(result.misassembled_contigs.contains_key("C2"));
}

/// E3 - Scaffold gap: an N-run between two same-strand alignments on the
/// same reference, in scaffolds mode.
#[test]
fn e3_scaffold_gap() {
    let mut config = Config::default();
    config.scaffolds = true;
    let ref_idx = ref_index_with("R", 10_000, "g");

    let p = Alignment::new("R", 1, 500, 1, 500, 100.0, "C3");
    let q = Alignment::new("R", 601, 1100, 701, 1200, 100.0, "C3");
    let mut seq = vec![b'A'; 1200];
    for b in seq.iter_mut().take(700).skip(500) {
        *b = b'N';
    }

    let mut classification = classifier::classify_contig(vec![p, q], &seq, 1200, &ref_idx, &HashMap::new(), &StructuralVariations::default(), &config);
    let verdict = selector::ContigVerdict::Multi(classification.adjusted_alignments.clone());
    let mut result = Default::default();
    aggregator::fold_contig(&mut result, "C3", 1200, &verdict, Default::default(), Some(&mut classification), &config);

    assert_eq!(result.count(MisassemblyKind::ScaffoldGap), 1);
    assert_eq!(result.total_extensive(), 0);
    assert!(!result.misassembled_contigs.contains_key("C3"), "scaffold gaps are fake, not real misassemblies");
}

/// E4 - Interspecies translocation: combined-reference mode, two
/// references in distinct reference groups.
#[test]
fn e4_interspecies_translocation() {
    let mut config = Config::default();
    config.combined_reference = true;

    let mut ref_idx = ref_index_with("A", 300, "g1");
    ref_idx.insert("B".to_string(), ReferenceEntry { sequence: vec![b'A'; 300], length: 300, group: "g2".to_string() });
    let mut groups = HashMap::new();
    groups.insert("A".to_string(), "g1".to_string());
    groups.insert("B".to_string(), "g2".to_string());

    let p = Alignment::new("A", 1, 300, 1, 300, 100.0, "C4");
    let q = Alignment::new("B", 1, 300, 301, 600, 100.0, "C4");
    let seq = vec![b'A'; 600];

    let mut classification = classifier::classify_contig(vec![p, q], &seq, 600, &ref_idx, &groups, &StructuralVariations::default(), &config);
    let verdict = selector::ContigVerdict::Multi(classification.adjusted_alignments.clone());
    let mut result = Default::default();
    aggregator::fold_contig(&mut result, "C4", 600, &verdict, Default::default(), Some(&mut classification), &config);

    assert_eq!(result.count(MisassemblyKind::InterspeciesTranslocation), 1);
    assert_eq!(*result.interspecies_matrix.get("g1").and_then(|m| m.get("g2")).unwrap(), 1);
    assert_eq!(*result.interspecies_matrix.get("g2").and_then(|m| m.get("g1")).unwrap(), 1);
}

/// E5 - Ambiguous policy `none`: two alignments tie for best coverage.
#[test]
fn e5_ambiguous_policy_none() {
    let mut config = Config::default();
    config.ambiguity_usage = AmbiguityUsage::None;
    let ref_idx = ref_index_with("R", 10_000, "g");
    let lengths = ref_lengths(&ref_idx);

    let a = Alignment::new("R", 1, 400, 1, 400, 100.0, "C5");
    let b = Alignment::new("R", 1000, 1399, 1, 400, 100.0, "C5");

    let (verdict, effects) = selector::select_for_contig(vec![a, b], 400, &config, &lengths, false);
    let mut result = Default::default();
    aggregator::fold_contig(&mut result, "C5", 400, &verdict, effects, None, &config);

    assert!(matches!(verdict, selector::ContigVerdict::Ambiguous { .. }));
    assert_eq!(result.ambiguous_contigs, 1);
    assert_eq!(result.ambiguous_extra_bases, -400);
}

/// E6 - Local misassembly from a small overlap between two alignments.
#[test]
fn e6_local_misassembly() {
    let config = Config::default();
    let ref_idx = ref_index_with("R", 10_000, "g");

    let p = Alignment::new("R", 1, 500, 1, 500, 100.0, "C6");
    let q = Alignment::new("R", 700, 1200, 480, 980, 100.0, "C6");
    let seq = vec![b'A'; 1000];

    let mut classification = classifier::classify_contig(vec![p, q], &seq, 1000, &ref_idx, &HashMap::new(), &StructuralVariations::default(), &config);
    assert_eq!(classification.misassemblies, vec![MisassemblyKind::Local]);
    assert_eq!(classification.inter_contig_overlap, 21);

    let verdict = selector::ContigVerdict::Multi(classification.adjusted_alignments.clone());
    let mut result = Default::default();
    aggregator::fold_contig(&mut result, "C6", 1000, &verdict, Default::default(), Some(&mut classification), &config);

    assert_eq!(result.count(MisassemblyKind::Local), 1);
    assert_eq!(result.inter_contig_overlap, 21);
}
