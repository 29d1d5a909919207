//! Output writers for the reporter collaborator (SPEC_FULL.md §6): the
//! filtered-coords stream, the per-contig event log, the misassembly-info
//! text and FASTA, the alignments table, and the human-readable summary.
//! Plain `BufWriter<File>` plumbing, the same shape the teacher uses for
//! its non-FASTQ text outputs, without the gzip/stdout `WriteFileZipStdout`
//! enum this crate's outputs never need (every output here is a small
//! per-assembly report file, not a bulk sequence stream).

use crate::aggregator;
use crate::error::{AnalyzerError, WithContext};
use crate::model::{Alignment, AssemblyResult};
use crate::pipeline::{AssemblyOutcome, ContigEvent};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

fn create(path: &Path) -> Result<std::io::BufWriter<std::fs::File>, AnalyzerError> {
    let file = std::fs::File::create(path).with_file_context("creating output file", path)?;
    Ok(std::io::BufWriter::new(file))
}

/// Writes one alignment in the same 13-token schema the Loader accepts
/// (§6 input 1), used for the "filtered coords output" (kept alignments
/// after interval surgery).
fn write_coords_line<W: Write>(w: &mut W, a: &Alignment) -> std::io::Result<()> {
    writeln!(
        w,
        "{} {} | {} {} | {} {} | {:.2} | {} {}",
        a.rs, a.re, a.cs, a.ce, a.rlen, a.clen, a.idy(), a.ref_name, a.contig_name
    )
}

/// Writes the filtered-coords output for one assembly: the alignments
/// that survived selection and interval surgery, in the input schema.
pub fn write_filtered_coords(path: &Path, alignments: &[Alignment]) -> Result<(), AnalyzerError> {
    let mut w = create(path)?;
    writeln!(w, "filtered alignments").with_context("writing filtered coords header")?;
    writeln!(w).with_context("writing filtered coords header")?;
    for a in alignments {
        write_coords_line(&mut w, a).with_context("writing filtered coords record")?;
    }
    writeln!(w).with_context("writing filtered coords trailer")?;
    Ok(())
}

/// Writes the per-contig event log: one line per contig describing its
/// Selector verdict and (if applicable) classification outcome.
pub fn write_event_log(path: &Path, events: &[ContigEvent]) -> Result<(), AnalyzerError> {
    let mut w = create(path)?;
    for event in events {
        writeln!(w, "{}\t{}", event.contig_name, event.description).with_context("writing event log line")?;
    }
    Ok(())
}

/// Writes the per-contig misassembly info: one line per misassembled
/// contig with its length, followed by the human-readable summary block
/// (SPEC_FULL.md §6 supplement).
pub fn write_misassembly_info(path: &Path, result: &AssemblyResult) -> Result<(), AnalyzerError> {
    let mut w = create(path)?;
    writeln!(w, "Misassembled contigs:").with_context("writing misassembly info")?;
    let mut names: Vec<_> = result.misassembled_contigs.iter().collect();
    names.sort_by(|a, b| a.0.cmp(b.0));
    for (name, length) in names {
        writeln!(w, "  {name}\t{length}").with_context("writing misassembly info")?;
    }
    writeln!(w).with_context("writing misassembly info")?;
    write!(w, "{}", aggregator::render_summary(result)).with_context("writing misassembly info")?;
    Ok(())
}

/// Writes the misassembled-contig FASTA.
pub fn write_misassembled_fasta(path: &Path, sequences: &[(String, Vec<u8>)]) -> Result<(), AnalyzerError> {
    let mut w = create(path)?;
    for (name, seq) in sequences {
        writeln!(w, ">{name}").with_context("writing misassembled-contig FASTA")?;
        for chunk in seq.chunks(70) {
            w.write_all(chunk).with_context("writing misassembled-contig FASTA")?;
            writeln!(w).with_context("writing misassembled-contig FASTA")?;
        }
    }
    Ok(())
}

/// Writes the alignments table: `ref_name -> contig_name list` (§6
/// "Alignments table keyed by reference name").
pub fn write_alignments_table(path: &Path, table: &HashMap<String, Vec<String>>) -> Result<(), AnalyzerError> {
    let mut w = create(path)?;
    let mut ref_names: Vec<_> = table.keys().collect();
    ref_names.sort();
    for ref_name in ref_names {
        let mut contigs = table[ref_name].clone();
        contigs.sort();
        contigs.dedup();
        writeln!(w, "{}\t{}", ref_name, contigs.join(",")).with_context("writing alignments table")?;
    }
    Ok(())
}

/// Writes every output file for one assembly outcome under
/// `output_dir/<assembly_name>.*`. Skips the files that only make sense
/// when the assembly actually produced a result (a failed assembly still
/// gets an empty-ish event log so its place in the reporter's directory
/// listing is never silently missing).
pub fn write_assembly_outputs(output_dir: &Path, outcome: &AssemblyOutcome) -> Result<(), AnalyzerError> {
    let stem = output_dir.join(&outcome.name);

    write_event_log(&stem.with_extension("events.log"), &outcome.events)?;
    write_filtered_coords(&stem.with_extension("filtered.coords"), &outcome.filtered_alignments)?;
    write_alignments_table(&stem.with_extension("alignments_table.tsv"), &outcome.alignments_table)?;

    if let Some(result) = &outcome.result {
        write_misassembly_info(&stem.with_extension("misassemblies.txt"), result)?;
        write_misassembled_fasta(&stem.with_extension("misassembled.fasta"), &outcome.misassembled_sequences)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alignment;
    use std::io::Read;

    #[test]
    fn filtered_coords_round_trips_through_the_loader_schema() {
        let dir = std::env::temp_dir().join(format!("misassembly-analyzer-io-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.coords");

        let a = Alignment::new("R", 100, 599, 1, 500, 99.5, "C1");
        write_filtered_coords(&path, &[a]).unwrap();

        let mut contents = String::new();
        std::fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert!(contents.contains("100 599 | 1 500 | 500 500 | 99.50 | R C1"));

        let mut acc = crate::loader::coords::IdentityAccumulator::default();
        let reparsed = crate::loader::coords::parse_coords_stream(std::io::BufReader::new(std::fs::File::open(&path).unwrap()), &mut acc);
        assert_eq!(reparsed.get("C1").unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
