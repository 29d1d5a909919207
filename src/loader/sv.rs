//! Parses the optional BED of SV hints (SPEC_FULL.md §6, input 4):
//! `chrA startA endA chrB startB endB tag`, comments beginning with `#`.
//!
//! - `chrA == chrB` and tag contains `INV` → inversion
//! - `chrA == chrB` and tag contains `DEL` → relocation
//! - `chrA != chrB` → translocation
//! - anything else is silently skipped (§4.1)

use crate::model::{StructuralVariations, SvBreakpoint};
use std::io::BufRead;

fn parse_line(line: &str) -> Option<(SvBreakpoint, SvBreakpoint, String)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return None;
    }
    let chr_a = tokens[0].to_string();
    let start_a: u64 = tokens[1].parse().ok()?;
    let end_a: u64 = tokens[2].parse().ok()?;
    let chr_b = tokens[3].to_string();
    let start_b: u64 = tokens[4].parse().ok()?;
    let end_b: u64 = tokens[5].parse().ok()?;
    let tag = tokens.get(6).copied().unwrap_or("").to_string();

    Some((
        SvBreakpoint { ref_name: chr_a, start: start_a, end: end_a },
        SvBreakpoint { ref_name: chr_b, start: start_b, end: end_b },
        tag,
    ))
}

pub fn parse_sv_stream<R: BufRead>(reader: R) -> StructuralVariations {
    let mut svs = StructuralVariations::default();

    for line in reader.lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((bp1, bp2, tag)) = parse_line(trimmed) else {
            continue;
        };

        if bp1.ref_name == bp2.ref_name {
            if tag.contains("INV") {
                svs.inversions.push((bp1, bp2));
            } else if tag.contains("DEL") {
                svs.relocations.push((bp1, bp2));
            }
            // else: silently skipped, no tag match on same chromosome
        } else {
            svs.translocations.push((bp1, bp2));
        }
    }

    svs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn classifies_by_chromosome_and_tag() {
        let data = "\
# comment
R 100 200 R 5000 5100 INV
R 100 200 R 5000 5100 DEL
A 100 200 B 100 200 whatever
R 100 200 R 5000 5100 other
";
        let svs = parse_sv_stream(Cursor::new(data.as_bytes()));
        assert_eq!(svs.inversions.len(), 1);
        assert_eq!(svs.relocations.len(), 1);
        assert_eq!(svs.translocations.len(), 1);
        assert_eq!(svs.count(), 3);
    }
}
