//! Core data model shared by every pipeline stage: alignments, the
//! reference index, SNP events, structural variations and the closed set
//! of misassembly kinds.

use std::collections::HashMap;

/// A local alignment between a region of a reference sequence and a region
/// of a contig.
///
/// `rs <= re` always. Strand is encoded by the relative order of `cs`/`ce`:
/// `cs < ce` is the forward strand, `cs > ce` is the reverse strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub ref_name:    String,
    pub rs:          u64,
    pub re:          u64,
    pub cs:          u64,
    pub ce:          u64,
    pub rlen:        u64,
    pub clen:        u64,
    /// Percent identity, stored as an integer-scaled fixed point
    /// (`idy_milli = round(idy * 1000)`) so that `Alignment` can derive
    /// `Eq`/`Hash`-friendly equality used by the redundancy-pruning and
    /// best-set search code without fighting float comparison.
    pub idy_milli:   u32,
    pub contig_name: String,
}

impl Alignment {
    pub fn new(ref_name: impl Into<String>, rs: u64, re: u64, cs: u64, ce: u64, idy: f64, contig_name: impl Into<String>) -> Self {
        let rlen = re - rs + 1;
        let clen = cs.abs_diff(ce) + 1;
        Self {
            ref_name: ref_name.into(),
            rs,
            re,
            cs,
            ce,
            rlen,
            clen,
            idy_milli: (idy * 1000.0).round() as u32,
            contig_name: contig_name.into(),
        }
    }

    #[inline]
    pub fn idy(&self) -> f64 {
        self.idy_milli as f64 / 1000.0
    }

    /// Start of the alignment on the contig (always `<=` end).
    #[inline]
    pub fn ctg_start(&self) -> u64 {
        self.cs.min(self.ce)
    }

    /// End of the alignment on the contig (always `>=` start).
    #[inline]
    pub fn ctg_end(&self) -> u64 {
        self.cs.max(self.ce)
    }

    #[inline]
    pub fn is_forward(&self) -> bool {
        self.cs < self.ce
    }

    /// Recomputes `rlen`/`clen` from the current endpoints. Must be called
    /// after any direct mutation of `rs`/`re`/`cs`/`ce` (endpoint-shift
    /// surgery, §4.3).
    pub fn recompute_lengths(&mut self) {
        self.rlen = self.re - self.rs + 1;
        self.clen = self.cs.abs_diff(self.ce) + 1;
    }

    /// Shifts the contig-side start to `new_start`, adjusting the opposite
    /// reference endpoint by the same signed distance and preserving
    /// strand. `new_start` must lie within the current contig span.
    pub fn shift_contig_start(&mut self, new_start: u64) {
        if self.is_forward() {
            let delta = new_start as i64 - self.cs as i64;
            self.rs = (self.rs as i64 + delta) as u64;
            self.cs = new_start;
        } else {
            let delta = new_start as i64 - self.cs as i64;
            self.re = (self.re as i64 - delta) as u64;
            self.cs = new_start;
        }
        self.recompute_lengths();
    }

    /// Shifts the contig-side end to `new_end`, adjusting the opposite
    /// reference endpoint by the same signed distance and preserving
    /// strand.
    pub fn shift_contig_end(&mut self, new_end: u64) {
        if self.is_forward() {
            let delta = self.ce as i64 - new_end as i64;
            self.re = (self.re as i64 - delta) as u64;
            self.ce = new_end;
        } else {
            let delta = self.ce as i64 - new_end as i64;
            self.rs = (self.rs as i64 + delta) as u64;
            self.ce = new_end;
        }
        self.recompute_lengths();
    }
}

/// Mapping `contig_name -> alignments`, as produced by the Loader.
pub type ContigAlignments = HashMap<String, Vec<Alignment>>;

/// One entry of the reference index: sequence, length, and the group label
/// used to tell apart chromosomes of distinct reference genomes in
/// multi-reference ("meta") mode.
#[derive(Debug, Clone)]
pub struct ReferenceEntry {
    pub sequence: Vec<u8>,
    pub length:   u64,
    pub group:    String,
}

impl ReferenceEntry {
    /// The default region list for this reference: a single region
    /// spanning the whole sequence. See SPEC_FULL.md §3 (Reference
    /// regions).
    pub fn regions(&self) -> [Region; 1] {
        [Region { start: 1, end: self.length }]
    }
}

/// A reference-relative region, 1-based inclusive, used by the coverage
/// walk (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: u64,
    pub end:   u64,
}

impl Region {
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// `ref_name -> ReferenceEntry`.
pub type ReferenceIndex = HashMap<String, ReferenceEntry>;

/// The kind of a SNP-file event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnpKind {
    Substitution,
    Insertion,
    Deletion,
}

impl SnpKind {
    pub fn from_bases(ref_base: u8, ctg_base: u8) -> Self {
        if ref_base == b'.' {
            SnpKind::Insertion
        } else if ctg_base == b'.' {
            SnpKind::Deletion
        } else {
            SnpKind::Substitution
        }
    }
}

/// A single SNP/indel event read from the aligner's SNP report.
#[derive(Debug, Clone)]
pub struct Snp {
    pub ref_pos:  u64,
    pub ctg_pos:  u64,
    pub ref_base: u8,
    pub ctg_base: u8,
    pub kind:     SnpKind,
}

/// `(ref_name, contig_name) -> ref_pos -> events at that locus`, the
/// indexing scheme required by §3 to allow multiple events to share a
/// reference locus.
pub type SnpIndex = HashMap<(String, String), HashMap<u64, Vec<Snp>>>;

/// One breakpoint of a structural-variation record: reference-only
/// coordinates, no contig information.
#[derive(Debug, Clone)]
pub struct SvBreakpoint {
    pub ref_name: String,
    pub start:    u64,
    pub end:      u64,
}

/// The three classes of structural variation the SV matcher (§4.6) can
/// use to explain away an otherwise-extensive discordance.
#[derive(Debug, Clone, Default)]
pub struct StructuralVariations {
    pub inversions:     Vec<(SvBreakpoint, SvBreakpoint)>,
    pub relocations:    Vec<(SvBreakpoint, SvBreakpoint)>,
    pub translocations: Vec<(SvBreakpoint, SvBreakpoint)>,
}

impl StructuralVariations {
    pub fn count(&self) -> usize {
        self.inversions.len() + self.relocations.len() + self.translocations.len()
    }
}

/// The closed set of misassembly/event kinds the Classifier can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MisassemblyKind {
    Local,
    Relocation,
    Translocation,
    Inversion,
    InterspeciesTranslocation,
    ScaffoldGap,
    Fragmented,
    PotentialContig,
    PotentialEvent,
}

impl MisassemblyKind {
    /// The four kinds that count as "extensive" misassemblies.
    pub fn is_extensive(self) -> bool {
        matches!(
            self,
            MisassemblyKind::Relocation
                | MisassemblyKind::Translocation
                | MisassemblyKind::Inversion
                | MisassemblyKind::InterspeciesTranslocation
        )
    }

    /// Kinds that are "fake" (explained away) and never counted in the
    /// misassembly totals.
    pub fn is_fake(self) -> bool {
        matches!(self, MisassemblyKind::ScaffoldGap | MisassemblyKind::Fragmented)
    }
}

/// Tally of positive (gap) or negative (overlap) regions recorded by the
/// reference-coverage walk, split into same-contig ("internal") and
/// cross-contig ("external") occurrences. SPEC_FULL.md §3 supplement.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapTally {
    pub internal:      u64,
    pub external:      u64,
    pub external_total: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GapStats {
    pub positive: GapTally,
    pub negative: GapTally,
}

/// Per-assembly accumulated result, §3/§4.7.
#[derive(Debug, Clone, Default)]
pub struct AssemblyResult {
    pub misassemblies_by_kind: HashMap<MisassemblyKind, u64>,
    /// `reference_group -> reference_group -> count`, populated only for
    /// `InterspeciesTranslocation`.
    pub interspecies_matrix: HashMap<String, HashMap<String, u64>>,
    pub misassemblies_matched_sv: u64,

    pub ambiguous_contigs: u64,
    pub ambiguous_extra_bases: i64,

    pub unaligned_contigs: u64,
    pub unaligned_bases: u64,
    pub partially_unaligned_contigs: u64,
    pub partially_unaligned_bases: u64,
    pub partially_unaligned_with_misassembly: u64,
    pub partially_unaligned_with_significant_parts: u64,

    pub misassembled_contigs: HashMap<String, u64>,
    pub misassembled_bases: u64,
    pub inter_contig_overlap: u64,

    pub mismatches: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub indels_list: Vec<u64>,

    pub total_aligned_bases: u64,
    pub sum_identity: f64,
    pub num_identity: u64,

    pub redundant_contigs: u64,
    pub redundant_bases: u64,
    pub gap_stats: GapStats,

    pub uncovered_regions: u64,
    pub uncovered_region_bases: u64,
}

impl AssemblyResult {
    pub fn record_misassembly(&mut self, kind: MisassemblyKind) {
        *self.misassemblies_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: MisassemblyKind) -> u64 {
        self.misassemblies_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Misassemblies excluding LOCAL and the two "fake" kinds, matching
    /// the original's `len(region_misassemblies) - LOCAL - SCAFFOLD_GAP -
    /// FRAGMENTED` total.
    pub fn total_extensive(&self) -> u64 {
        self.count(MisassemblyKind::Relocation)
            + self.count(MisassemblyKind::Translocation)
            + self.count(MisassemblyKind::Inversion)
            + self.count(MisassemblyKind::InterspeciesTranslocation)
    }

    pub fn average_identity(&self) -> f64 {
        if self.num_identity == 0 {
            0.0
        } else {
            self.sum_identity / self.num_identity as f64
        }
    }

    pub fn record_interspecies(&mut self, group1: &str, group2: &str) {
        *self
            .interspecies_matrix
            .entry(group1.to_string())
            .or_default()
            .entry(group2.to_string())
            .or_insert(0) += 1;
        *self
            .interspecies_matrix
            .entry(group2.to_string())
            .or_default()
            .entry(group1.to_string())
            .or_insert(0) += 1;
    }
}
