//! The outer driver (SPEC_FULL.md §2 ambient, §5): runs the Loader ->
//! Selector -> Classifier -> Aggregator stages per assembly and fans the
//! assembly list out across a `rayon` thread pool sized
//! `min(num_assemblies, max_threads)`, mirroring the teacher's
//! `align_all`/`par_bridge` pattern (`processes/standalone/aligner/mod.rs`)
//! and QUAST's `joblib.Parallel` driver (`contigs_analyzer.py::do`).

use crate::aggregator::{self, ContigClassification};
use crate::classifier;
use crate::config::{AmbiguityUsage, Config};
use crate::error::AnalyzerError;
use crate::loader::{self, fasta::FastaRecord};
use crate::model::{Alignment, AssemblyResult, ReferenceIndex, StructuralVariations};
use crate::selector::{self, ContigVerdict};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

/// One assembly's set of input paths, as assembled by `args::AnalyzeArgs`.
#[derive(Debug, Clone)]
pub struct AssemblyInput {
    pub name: String,
    pub contigs_path: PathBuf,
    pub coords_path: PathBuf,
    pub snps_path: PathBuf,
}

/// One contig's diagnostic trail, destined for the per-contig event log.
#[derive(Debug, Clone)]
pub struct ContigEvent {
    pub contig_name: String,
    pub description: String,
}

/// Everything the pipeline produces for one assembly, consumed by the
/// reporter collaborator.
pub struct AssemblyOutcome {
    pub name: String,
    pub result: Option<AssemblyResult>,
    pub events: Vec<ContigEvent>,
    /// Alignments surviving interval surgery, same schema as the input
    /// coords stream (§6 "Filtered coords output").
    pub filtered_alignments: Vec<Alignment>,
    /// `ref_name -> contig_name list`, for the alignments table output.
    pub alignments_table: HashMap<String, Vec<String>>,
    pub misassembled_sequences: Vec<(String, Vec<u8>)>,
    pub error: Option<AnalyzerError>,
}

/// Runs every stage for one assembly. Never panics on malformed input;
/// `AnalyzerError::NoAlignments`/`AlignerFailed` surface as
/// `AssemblyOutcome::error` so the caller can mark this assembly `ERROR`
/// without affecting the others (§5 "Cancellation").
pub fn run_assembly(
    input: &AssemblyInput, reference_index: &ReferenceIndex, ref_groups: &HashMap<String, String>, sv_table: &StructuralVariations, config: &Config,
) -> AssemblyOutcome {
    let mut outcome = AssemblyOutcome {
        name: input.name.clone(),
        result: None,
        events: Vec::new(),
        filtered_alignments: Vec::new(),
        alignments_table: HashMap::new(),
        misassembled_sequences: Vec::new(),
        error: None,
    };

    let loaded = match loader::load_assembly(&input.name, &input.coords_path, &input.snps_path, &input.contigs_path, reference_index.clone(), None) {
        Ok(loaded) => loaded,
        Err(err) => {
            outcome.error = Some(err);
            return outcome;
        }
    };

    let ref_lengths: HashMap<String, u64> = reference_index.iter().map(|(name, entry)| (name.clone(), entry.length)).collect();

    let mut result = AssemblyResult::default();
    let mut alignments_by_ref: HashMap<String, Vec<Alignment>> = HashMap::new();
    let mut contig_names: HashMap<String, Vec<u8>> = HashMap::new();

    for record in &loaded.contigs {
        let FastaRecord { name, sequence } = record;
        contig_names.insert(name.clone(), sequence.clone());
        let ctg_len = sequence.len() as u64;
        let alignments = loaded.alignments.get(name).cloned().unwrap_or_default();

        let (verdict, effects) = selector::select_for_contig(alignments, ctg_len, config, &ref_lengths, config.cyclic);

        let mut classification: Option<ContigClassification> = None;
        let kept_alignments: Vec<Alignment> = match &verdict {
            ContigVerdict::Unaligned => {
                outcome.events.push(ContigEvent { contig_name: name.clone(), description: "unaligned".to_string() });
                Vec::new()
            }
            ContigVerdict::UniqueAligned(a) => {
                outcome.events.push(ContigEvent { contig_name: name.clone(), description: "uniquely aligned, no misassembly".to_string() });
                aggregator::record_identity(&mut result, a.idy());
                vec![a.clone()]
            }
            ContigVerdict::Ambiguous { top_set, policy } => {
                outcome
                    .events
                    .push(ContigEvent { contig_name: name.clone(), description: format!("ambiguous ({} tied alignments)", top_set.len()) });
                match policy {
                    AmbiguityUsage::None => Vec::new(),
                    AmbiguityUsage::One => top_set.first().cloned().into_iter().collect(),
                    AmbiguityUsage::All => top_set.clone(),
                }
            }
            ContigVerdict::Multi(chosen) => {
                let mut c = classifier::classify_contig(chosen.clone(), sequence, ctg_len, reference_index, ref_groups, sv_table, config);
                for a in &c.adjusted_alignments {
                    aggregator::record_identity(&mut result, a.idy());
                }
                if config.meta {
                    let gaps = classifier::count_significant_gaps(&c.adjusted_alignments, sequence, config);
                    aggregator::record_potential_translocation(&mut result, gaps);
                }
                let kept = c.adjusted_alignments.clone();
                outcome.events.push(ContigEvent {
                    contig_name: name.clone(),
                    description: format!("{} misassembly event(s)", c.misassemblies.len()),
                });
                aggregator::fold_contig(&mut result, name, ctg_len, &verdict, effects, Some(&mut c), config);
                classification = Some(c);
                kept
            }
        };

        if !matches!(&verdict, ContigVerdict::Multi(_)) {
            aggregator::fold_contig(&mut result, name, ctg_len, &verdict, effects, classification.as_mut(), config);
        }

        for a in &kept_alignments {
            outcome.alignments_table.entry(a.ref_name.clone()).or_default().push(name.clone());
            alignments_by_ref.entry(a.ref_name.clone()).or_default().push(a.clone());
        }
        outcome.filtered_alignments.extend(kept_alignments);
    }

    aggregator::fold_coverage(&mut result, reference_index, &alignments_by_ref, &loaded.snp_index);

    for (name, length) in &result.misassembled_contigs {
        if let Some(seq) = contig_names.get(name) {
            outcome.misassembled_sequences.push((name.clone(), seq[..(*length as usize).min(seq.len())].to_vec()));
        }
    }

    outcome.result = Some(result);
    outcome
}

/// Runs every assembly in `inputs`, fanning them out across a thread pool
/// of size `min(inputs.len(), config.threads)` (§5 "Outer parallelism").
/// Assemblies never share mutable state; the returned `Vec` preserves
/// input order regardless of completion order.
pub fn run_all(inputs: &[AssemblyInput], reference_index: &ReferenceIndex, ref_groups: &HashMap<String, String>, sv_table: &StructuralVariations, config: &Config) -> Vec<AssemblyOutcome> {
    let num_threads = inputs.len().max(1).min(config.threads.max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .expect("building the assembly worker pool");

    pool.install(|| inputs.par_iter().map(|input| run_assembly(input, reference_index, ref_groups, sv_table, config)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReferenceEntry;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile_shim::TempPath {
        tempfile_shim::write(contents)
    }

    /// Minimal stand-in for a temp-file crate: the teacher doesn't pull in
    /// `tempfile`, so this mirrors its habit of writing scratch files under
    /// `std::env::temp_dir()` directly (see `processes::standalone` test
    /// helpers).
    mod tempfile_shim {
        use std::io::Write;
        use std::path::{Path, PathBuf};

        pub struct TempPath(pub PathBuf);
        impl Drop for TempPath {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
        impl AsRef<Path> for TempPath {
            fn as_ref(&self) -> &Path {
                &self.0
            }
        }

        pub fn write(contents: &str) -> TempPath {
            let mut path = std::env::temp_dir();
            path.push(format!("misassembly-analyzer-test-{}-{}", std::process::id(), contents.len()));
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            TempPath(path)
        }
    }

    #[test]
    fn e1_unique_alignment_end_to_end() {
        let coords = "h1\nh2\n100 599 | 1 500 | 500 500 | 100.00 | R C1\n\n";
        let snps = "";
        let contigs = ">C1\n".to_string() + &"A".repeat(500) + "\n";

        let coords_path = write_temp(coords);
        let snps_path = write_temp(snps);
        let contigs_path = write_temp(&contigs);

        let mut reference_index = ReferenceIndex::default();
        reference_index.insert(
            "R".to_string(),
            ReferenceEntry { sequence: vec![b'A'; 1000], length: 1000, group: "g".to_string() },
        );

        let input = AssemblyInput {
            name: "asm1".to_string(),
            contigs_path: contigs_path.0.clone(),
            coords_path: coords_path.0.clone(),
            snps_path: snps_path.0.clone(),
        };
        let config = Config::default();
        let outcome = run_assembly(&input, &reference_index, &HashMap::new(), &StructuralVariations::default(), &config);

        let result = outcome.result.expect("assembly should load");
        assert_eq!(result.unaligned_contigs, 0);
        assert_eq!(result.total_aligned_bases, 500);
    }
}
