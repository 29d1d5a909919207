//! Command-line surface (SPEC_FULL.md §2 ambient): one `analyze`
//! subcommand exposing every named constant from §4.2/4.4/4.5/4.6 as an
//! overridable flag, mirroring the teacher's `Args`-derived structs
//! (`TrimmerArgs`, `AlignerArgs`) which hold one field per tunable.

use crate::Cli;
use crate::config::{AmbiguityUsage, Config};
use crate::error::AnalyzerError;
use crate::pipeline::AssemblyInput;
use clap::{Args, CommandFactory, Subcommand, error::ErrorKind};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Classifies structural differences between one or more assemblies
    /// and a reference genome from pre-computed local alignments.
    Analyze(AnalyzeArgs),
}

/// Aborts clap with a given error `message` due to a custom parsing error.
///
/// The subcommand should be specified as a lowercase string with `subcommand`
/// if available. This ensures the help message is as informative as possible.
/// If an invalid subcommand is passed, it will be ignored.
pub(crate) fn abort_clap(kind: ErrorKind, message: impl std::fmt::Display, subcommand: Option<&str>) -> ! {
    let mut command = Cli::command();

    let matched = subcommand.and_then(|name| command.get_subcommands_mut().find(|c| c.get_name() == name));
    match matched {
        Some(c) => c.error(kind, message).exit(),
        None => command.error(kind, message).exit(),
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Reference FASTA. Repeat to supply multiple reference genomes in
    /// `--meta` mode; each file becomes its own reference group, labelled
    /// by its file stem.
    #[arg(long = "reference", required = true, num_args = 1..)]
    pub references: Vec<PathBuf>,

    /// Contig FASTA for one assembly. Repeat for multiple assemblies.
    #[arg(long = "contigs", required = true, num_args = 1..)]
    pub contigs: Vec<PathBuf>,

    /// Coords file for each assembly, in the same order as `--contigs`.
    #[arg(long = "coords", required = true, num_args = 1..)]
    pub coords: Vec<PathBuf>,

    /// SNP report for each assembly, in the same order as `--contigs`.
    #[arg(long = "snps", required = true, num_args = 1..)]
    pub snps: Vec<PathBuf>,

    /// Optional BED of structural-variation hints, shared across every
    /// assembly in this run.
    #[arg(long = "sv-bed")]
    pub sv_bed: Option<PathBuf>,

    /// Directory the per-assembly reports/filtered-coords/event-logs are
    /// written under.
    #[arg(short = 'o', long, default_value = "analyzer_out")]
    pub output_dir: PathBuf,

    /// Contigs with fewer than this many unaligned bases are treated as
    /// fully captured by their best alignment family (§4.2 `maxun`).
    #[arg(long, default_value_t = 10)]
    pub max_unaligned_bases: u64,

    /// Fractional-identity tie-break window for the top alignment family
    /// (§4.2 `epsilon`).
    #[arg(long, default_value_t = 0.99)]
    pub epsilon: f64,

    /// Unaligned-stretch length (non-`N` contig bases) above which it is
    /// "significant" (§4.2, §4.5 last paragraph).
    #[arg(long, default_value_t = 500)]
    pub significant_part_size: u64,

    /// Indel/local-misassembly boundary, in bases (§4.2 `MAX_INDEL_LENGTH`).
    #[arg(long, default_value_t = 85)]
    pub max_indel_length: u64,

    /// Reference-gap threshold above which a same-reference discordance
    /// is extensive rather than local (§4.4/§4.5).
    #[arg(long, default_value_t = 1000)]
    pub extensive_misassembly_threshold: u64,

    /// Indel-length boundary between "short" and "long" fake indels
    /// (§4.5).
    #[arg(long, default_value_t = 5)]
    pub short_indel_threshold: u64,

    /// Maximum `|inconsistency|` for a same-reference, same-strand gap to
    /// be a scaffold gap (§4.5 rule 1).
    #[arg(long, default_value_t = 1000)]
    pub scaffolds_gap_threshold: u64,

    /// Minimum N-run length, on the contig between two alignments, for
    /// scaffold-gap classification (§4.5 rule 1).
    #[arg(long, default_value_t = 10)]
    pub ns_break_threshold: u64,

    /// Policy for contigs whose best alignments tie (§4.2).
    #[arg(long, value_enum, default_value_t = AmbiguityUsage::One)]
    pub ambiguity_usage: AmbiguityUsage,

    /// Enables scaffold-gap detection (contigs were assembled with `N`
    /// gaps between scaffolded pieces).
    #[arg(long)]
    pub scaffolds: bool,

    /// Multi-reference ("meta") mode: enables the per-reference-group
    /// interspecies-translocation matrix and the potential-translocation
    /// rule.
    #[arg(long)]
    pub meta: bool,

    /// In meta mode, classifies cross-reference-group discordances as
    /// `INTERSPECIES_TRANSLOCATION` instead of `TRANSLOCATION`.
    #[arg(long)]
    pub combined_reference: bool,

    /// Treats alignments landing near both references' ends/starts as a
    /// fragmented-reference artifact instead of a translocation.
    #[arg(long)]
    pub check_fragmented_reference: bool,

    /// Treats every reference as circular (enables the cyclic-gap
    /// adjustment in §4.5).
    #[arg(long)]
    pub cyclic: bool,

    /// Worker-pool size for the outer per-assembly parallelism (§5).
    /// Defaults to the number of logical CPUs.
    #[arg(long)]
    pub threads: Option<usize>,
}

impl AnalyzeArgs {
    /// Builds the `Config` this run's pipeline stages share, applying the
    /// CLI overrides on top of the original analyzer's defaults.
    pub fn to_config(&self) -> Config {
        Config {
            maxun: self.max_unaligned_bases,
            epsilon: self.epsilon,
            significant_part_size: self.significant_part_size,
            max_indel_length: self.max_indel_length,
            extensive_misassembly_threshold: self.extensive_misassembly_threshold,
            short_indel_threshold: self.short_indel_threshold,
            scaffolds_gap_threshold: self.scaffolds_gap_threshold,
            ns_break_threshold: self.ns_break_threshold,
            ambiguity_usage: self.ambiguity_usage,
            scaffolds: self.scaffolds,
            meta: self.meta,
            combined_reference: self.combined_reference,
            check_fragmented_reference: self.check_fragmented_reference,
            cyclic: self.cyclic,
            threads: self.threads.unwrap_or_else(num_cpus::get),
            ..Config::default()
        }
    }

    /// Zips `--contigs`/`--coords`/`--snps` into one `AssemblyInput` per
    /// assembly, naming each by its contig file's stem. Aborts with a
    /// clap usage error (not a panic) if the three lists disagree on
    /// length, matching the teacher's `abort_clap` validation idiom for
    /// cross-field argument constraints clap can't express declaratively.
    pub fn assembly_inputs(&self) -> Vec<AssemblyInput> {
        if self.contigs.len() != self.coords.len() || self.contigs.len() != self.snps.len() {
            abort_clap(
                ErrorKind::ArgumentConflict,
                format!(
                    "--contigs ({}), --coords ({}) and --snps ({}) must be given the same number of times",
                    self.contigs.len(),
                    self.coords.len(),
                    self.snps.len()
                ),
                Some("analyze"),
            );
        }

        self.contigs
            .iter()
            .zip(&self.coords)
            .zip(&self.snps)
            .map(|((contigs_path, coords_path), snps_path)| AssemblyInput {
                name: contigs_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| contigs_path.display().to_string()),
                contigs_path: contigs_path.clone(),
                coords_path: coords_path.clone(),
                snps_path: snps_path.clone(),
            })
            .collect()
    }

    /// Reference-group label for a reference FASTA path: its file stem.
    /// Every chromosome loaded from the same `--reference` file shares
    /// this group (§3 "Reference index").
    pub fn group_label(path: &std::path::Path) -> String {
        path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
    }
}

/// Reported when an output directory can't be created; the only
/// fallible step of argument handling that isn't a clap usage error.
pub fn ensure_output_dir(path: &std::path::Path) -> Result<(), AnalyzerError> {
    use crate::error::WithContext;
    std::fs::create_dir_all(path).with_file_context("creating output directory", path)
}
