//! `misassembly-analyzer`: classifies structural differences between
//! assembled contigs and a reference genome from pre-computed local
//! alignments.
//!
//! The pipeline is four stages plus a shared predicate (SPEC_FULL.md §2):
//! [`loader`] (L) parses the external aligner's coords/SNP/SV streams and
//! the FASTA inputs; [`selector`] (S) picks the alignment subset to
//! interpret per contig; [`classifier`] (C) walks each contig's chosen
//! alignments and classifies every adjacent pair, invoking
//! [`classifier::sv_matcher`] (V) along the way; [`aggregator`] (A) folds
//! per-contig output into the per-assembly result. [`pipeline`] is the
//! ambient outer driver tying the stages together per assembly and
//! fanning assemblies out across a thread pool.

pub mod aggregator;
pub mod args;
pub mod classifier;
pub mod config;
pub mod error;
pub mod io;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod selector;

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: args::Commands,
}
