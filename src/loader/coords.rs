//! Parses the alignment coords stream (SPEC_FULL.md §6, input 1):
//! fixed-field text, two header lines, one record per line, terminated by
//! a trailing blank line. Each accepted record has 13 whitespace-separated
//! tokens with required pipe characters at columns 3, 6, 9, 11:
//!
//! ```text
//! rs e1 | cs e2 | rlen clen | idy | ref_name contig_name
//! ```

use crate::model::{Alignment, ContigAlignments};
use std::io::BufRead;

/// Running identity accumulator used to compute the mean identity over all
/// accepted records, independent of any per-assembly result.
#[derive(Debug, Default)]
pub struct IdentityAccumulator {
    pub sum: f64,
    pub count: u64,
}

impl IdentityAccumulator {
    pub fn record(&mut self, idy: f64) {
        self.sum += idy;
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.sum / self.count as f64 }
    }
}

/// Parses one coords record line. Returns `None` if malformed; malformed
/// records are dropped, never cause the stream to abort (§4.1).
fn parse_record(line: &str) -> Option<Alignment> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 13 {
        return None;
    }
    if tokens[2] != "|" || tokens[5] != "|" || tokens[8] != "|" || tokens[10] != "|" {
        return None;
    }

    let rs: u64 = tokens[0].parse().ok()?;
    let re: u64 = tokens[1].parse().ok()?;
    let cs: u64 = tokens[3].parse().ok()?;
    let ce: u64 = tokens[4].parse().ok()?;
    let _rlen: u64 = tokens[6].parse().ok()?;
    let _clen: u64 = tokens[7].parse().ok()?;
    let idy: f64 = tokens[9].parse().ok()?;
    if !(0.0..=100.0).contains(&idy) {
        return None;
    }
    let ref_name = tokens[11].to_string();
    let contig_name = tokens[12].to_string();

    if rs > re {
        return None;
    }

    Some(Alignment::new(ref_name, rs, re, cs, ce, idy, contig_name))
}

/// Parses a full coords stream: skips the first two header lines, reads
/// records until a blank line or EOF, accumulating mean identity as it
/// goes. Returns the accepted alignments grouped by contig.
pub fn parse_coords_stream<R: BufRead>(reader: R, identity: &mut IdentityAccumulator) -> ContigAlignments {
    let mut out: ContigAlignments = ContigAlignments::default();
    let mut lines = reader.lines();

    // two header lines, tolerated if absent (a too-short stream just
    // yields no records below)
    let _ = lines.next();
    let _ = lines.next();

    for line in lines {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            break;
        }
        let Some(alignment) = parse_record(&line) else {
            continue;
        };
        identity.record(alignment.idy());
        out.entry(alignment.contig_name.clone()).or_default().push(alignment);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
header line one
header line two
100 599 | 1 500 | 500 500 | 100.00 | R C1

";

    #[test]
    fn parses_accepted_record_and_skips_headers() {
        let mut acc = IdentityAccumulator::default();
        let parsed = parse_coords_stream(Cursor::new(SAMPLE.as_bytes()), &mut acc);
        let aligns = parsed.get("C1").expect("C1 present");
        assert_eq!(aligns.len(), 1);
        assert_eq!(aligns[0].rs, 100);
        assert_eq!(aligns[0].re, 599);
        assert_eq!(aligns[0].cs, 1);
        assert_eq!(aligns[0].ce, 500);
        assert_eq!(acc.count, 1);
    }

    #[test]
    fn drops_malformed_record_without_aborting() {
        let data = "h1\nh2\nnot a valid record\n100 599 | 1 500 | 500 500 | 100.00 | R C1\n\n";
        let mut acc = IdentityAccumulator::default();
        let parsed = parse_coords_stream(Cursor::new(data.as_bytes()), &mut acc);
        assert_eq!(parsed.get("C1").unwrap().len(), 1);
        assert_eq!(acc.count, 1);
    }

    #[test]
    fn empty_stream_yields_no_alignments() {
        let mut acc = IdentityAccumulator::default();
        let parsed = parse_coords_stream(Cursor::new(b"h1\nh2\n\n".as_slice()), &mut acc);
        assert!(parsed.is_empty());
        assert_eq!(acc.count, 0);
    }
}
