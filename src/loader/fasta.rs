//! A small streaming FASTA reader. The core never trims or aligns
//! sequence data itself, so it only needs enough of a FASTA reader to hand
//! the Loader whole records; this does not reach for the teacher's
//! `zoe`-backed `FastXReader`/`FastQReader`, which carry SIMD alignment
//! and FASTQ-quality machinery this crate has no caller for.

use crate::error::{AnalyzerError, WithContext};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// One FASTA record: header line (without the leading `>`, truncated at
/// the first whitespace) and uppercased sequence with newlines removed.
#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// A streaming iterator over FASTA records backed by any `Read`.
pub struct FastaReader<R: Read> {
    lines: std::io::Lines<BufReader<R>>,
    pending_header: Option<String>,
}

impl<R: Read> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            pending_header: None,
        }
    }
}

/// Opens a FASTA file, transparently decompressing it if the filename
/// ends in `.gz`, mirroring the teacher's `open_fastq_file` gzip-sniffing
/// convention.
pub fn open_fasta_file(path: &Path) -> Result<FastaReader<Box<dyn Read>>, AnalyzerError> {
    let file = File::open(path).with_file_context("Failed to open FASTA file", path)?;
    let is_gz = path.extension().is_some_and(|ext| ext == "gz");
    let reader: Box<dyn Read> = if is_gz {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(FastaReader::new(reader))
}

impl<R: Read> Iterator for FastaReader<R> {
    type Item = FastaRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let mut name = match self.pending_header.take() {
            Some(name) => name,
            None => loop {
                let line = self.lines.by_ref().next()?.ok()?;
                if let Some(header) = line.strip_prefix('>') {
                    break header.split_whitespace().next().unwrap_or("").to_string();
                }
            },
        };
        let mut sequence = Vec::new();

        for line in self.lines.by_ref() {
            let Ok(line) = line else { break };
            if let Some(header) = line.strip_prefix('>') {
                self.pending_header = Some(header.split_whitespace().next().unwrap_or("").to_string());
                return Some(FastaRecord {
                    name: std::mem::take(&mut name),
                    sequence,
                });
            }
            sequence.extend(line.trim_end().bytes().map(|b| b.to_ascii_uppercase()));
        }

        Some(FastaRecord {
            name: std::mem::take(&mut name),
            sequence,
        })
    }
}
