//! The Loader stage (SPEC_FULL.md §4.1): turns the external collaborators'
//! raw text/FASTA streams into the typed `ContigAlignments`, reference
//! index, SNP index and SV table the rest of the pipeline consumes.

pub mod coords;
pub mod fasta;
pub mod snps;
pub mod sv;

use crate::error::AnalyzerError;
use crate::model::{ContigAlignments, ReferenceEntry, ReferenceIndex, SnpIndex, StructuralVariations};
use coords::IdentityAccumulator;
use std::io::BufReader;
use std::path::Path;

/// Everything the Loader produces for one assembly run.
pub struct LoadedInputs {
    pub alignments: ContigAlignments,
    pub reference_index: ReferenceIndex,
    pub contigs: Vec<fasta::FastaRecord>,
    pub snp_index: SnpIndex,
    pub sv_table: StructuralVariations,
    pub mean_identity: f64,
}

/// Loads one reference FASTA into the reference index, assigning every
/// sequence the same `group` label (used for meta/combined-reference
/// runs where the caller loads several reference FASTAs under distinct
/// groups; see `load_reference_group`).
pub fn load_reference(path: &Path, group: &str) -> Result<ReferenceIndex, AnalyzerError> {
    let reader = fasta::open_fasta_file(path)?;
    let mut index = ReferenceIndex::default();
    for record in reader {
        let length = record.sequence.len() as u64;
        index.insert(
            record.name,
            ReferenceEntry {
                sequence: record.sequence,
                length,
                group: group.to_string(),
            },
        );
    }
    Ok(index)
}

/// Merges `other` into `index`, keeping `index`'s entries on key
/// collision. Used to build a combined reference index across multiple
/// reference groups in meta mode.
pub fn merge_reference_index(index: &mut ReferenceIndex, other: ReferenceIndex) {
    for (name, entry) in other {
        index.entry(name).or_insert(entry);
    }
}

/// Loads the full contig FASTA for one assembly.
pub fn load_contigs(path: &Path) -> Result<Vec<fasta::FastaRecord>, AnalyzerError> {
    let reader = fasta::open_fasta_file(path)?;
    Ok(reader.collect())
}

/// Parses the assembly's coords and SNP streams and (optionally) the
/// shared SV hints stream, returning an assembly-ready `LoadedInputs`.
///
/// `AnalyzerError::NoAlignments` is returned if the coords stream yields
/// no accepted alignments at all (§7).
pub fn load_assembly(
    assembly_name: &str, coords_path: &Path, snps_path: &Path, contigs_path: &Path, reference_index: ReferenceIndex,
    sv_path: Option<&Path>,
) -> Result<LoadedInputs, AnalyzerError> {
    let coords_file = std::fs::File::open(coords_path)
        .map_err(|source| AnalyzerError::Io { context: format!("opening coords file {}", coords_path.display()), source })?;
    let mut identity = IdentityAccumulator::default();
    let alignments = coords::parse_coords_stream(BufReader::new(coords_file), &mut identity);

    if alignments.is_empty() {
        return Err(AnalyzerError::NoAlignments { assembly: assembly_name.to_string() });
    }

    let snps_file = std::fs::File::open(snps_path)
        .map_err(|source| AnalyzerError::Io { context: format!("opening SNP file {}", snps_path.display()), source })?;
    let snp_index = snps::parse_snp_stream(BufReader::new(snps_file));

    let sv_table = match sv_path {
        Some(path) => {
            let sv_file = std::fs::File::open(path)
                .map_err(|source| AnalyzerError::Io { context: format!("opening SV BED {}", path.display()), source })?;
            sv::parse_sv_stream(BufReader::new(sv_file))
        }
        None => StructuralVariations::default(),
    };

    let contigs = load_contigs(contigs_path)?;

    Ok(LoadedInputs {
        alignments,
        reference_index,
        contigs,
        snp_index,
        sv_table,
        mean_identity: identity.mean(),
    })
}
