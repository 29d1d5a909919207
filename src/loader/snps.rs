//! Parses the SNP/indel report (SPEC_FULL.md §6, input 2): tab-delimited
//! fixed-field text, `ref_pos ref_base ctg_base ctg_pos ... ref_name
//! contig_name`. Consecutive duplicate records are deduplicated; a
//! non-numeric first field drops the line.

use crate::model::{Snp, SnpIndex, SnpKind};
use std::io::BufRead;

/// A raw, unvalidated copy of a parsed line's fields, used only to detect
/// consecutive duplicates before building the typed `Snp`.
#[derive(PartialEq, Eq, Clone)]
struct RawFields(Vec<String>);

fn parse_line(line: &str) -> Option<(RawFields, String, String, Snp)> {
    let tokens: Vec<&str> = line.split('\t').collect();
    if tokens.len() < 6 {
        return None;
    }
    let ref_pos: u64 = tokens[0].trim().parse().ok()?;
    let ref_base = tokens[1].trim().as_bytes().first().copied()?;
    let ctg_base = tokens[2].trim().as_bytes().first().copied()?;
    let ctg_pos: u64 = tokens[3].trim().parse().ok()?;
    let ref_name = tokens[tokens.len() - 2].trim().to_string();
    let contig_name = tokens[tokens.len() - 1].trim().to_string();

    let kind = SnpKind::from_bases(ref_base, ctg_base);
    let snp = Snp {
        ref_pos,
        ctg_pos,
        ref_base,
        ctg_base,
        kind,
    };
    let raw = RawFields(tokens.iter().map(|s| s.to_string()).collect());
    Some((raw, ref_name, contig_name, snp))
}

/// Parses a SNP stream into the `(ref_name, contig_name) -> ref_pos ->
/// events` index required by §3, deduplicating consecutive identical
/// records.
pub fn parse_snp_stream<R: BufRead>(reader: R) -> SnpIndex {
    let mut index: SnpIndex = SnpIndex::default();
    let mut previous: Option<RawFields> = None;

    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let Some((raw, ref_name, contig_name, snp)) = parse_line(&line) else {
            continue;
        };
        if previous.as_ref() == Some(&raw) {
            continue;
        }
        previous = Some(raw);

        index
            .entry((ref_name, contig_name))
            .or_default()
            .entry(snp.ref_pos)
            .or_default()
            .push(snp);
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn dedups_consecutive_duplicates() {
        let data = "10\tA\tG\t10\t0\tR\tC1\n10\tA\tG\t10\t0\tR\tC1\n20\tA\t.\t20\t0\tR\tC1\n";
        let index = parse_snp_stream(Cursor::new(data.as_bytes()));
        let locus = index.get(&("R".to_string(), "C1".to_string())).unwrap();
        assert_eq!(locus.get(&10).unwrap().len(), 1);
        assert_eq!(locus.get(&20).unwrap().len(), 1);
    }

    #[test]
    fn non_consecutive_duplicates_are_kept() {
        let data = "10\tA\tG\t10\t0\tR\tC1\n20\tA\tG\t20\t0\tR\tC1\n10\tA\tG\t10\t0\tR\tC1\n";
        let index = parse_snp_stream(Cursor::new(data.as_bytes()));
        let locus = index.get(&("R".to_string(), "C1".to_string())).unwrap();
        assert_eq!(locus.get(&10).unwrap().len(), 2);
    }

    #[test]
    fn classifies_insertion_and_deletion() {
        let data = "10\t.\tG\t10\t0\tR\tC1\n20\tA\t.\t20\t0\tR\tC1\n";
        let index = parse_snp_stream(Cursor::new(data.as_bytes()));
        let locus = index.get(&("R".to_string(), "C1".to_string())).unwrap();
        assert_eq!(locus[&10][0].kind, SnpKind::Insertion);
        assert_eq!(locus[&20][0].kind, SnpKind::Deletion);
    }
}
