use clap::Parser;
use misassembly_analyzer::args::{self, AnalyzeArgs, Commands};
use misassembly_analyzer::model::ReferenceIndex;
use misassembly_analyzer::{Cli, io, loader, pipeline};
use std::collections::HashMap;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(analyze_args) => run_analyze(analyze_args),
    }
}

/// Loads every reference FASTA (one reference group per `--reference`
/// file), runs every assembly, and writes the per-assembly outputs.
/// Exits `0` if at least one assembly produced a result, non-zero if
/// every assembly failed (§6 "Exit codes").
fn run_analyze(analyze_args: AnalyzeArgs) -> ExitCode {
    if let Err(err) = args::ensure_output_dir(&analyze_args.output_dir) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let mut reference_index = ReferenceIndex::default();
    let mut ref_groups: HashMap<String, String> = HashMap::new();
    for reference_path in &analyze_args.references {
        let group = AnalyzeArgs::group_label(reference_path);
        match loader::load_reference(reference_path, &group) {
            Ok(group_index) => {
                for ref_name in group_index.keys() {
                    ref_groups.insert(ref_name.clone(), group.clone());
                }
                loader::merge_reference_index(&mut reference_index, group_index);
            }
            Err(err) => {
                eprintln!("error: failed to load reference {}: {err}", reference_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let sv_table = match &analyze_args.sv_bed {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => loader::sv::parse_sv_stream(std::io::BufReader::new(file)),
            Err(err) => {
                eprintln!("error: failed to open SV BED {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Default::default(),
    };

    let config = analyze_args.to_config();
    let inputs = analyze_args.assembly_inputs();

    let outcomes = pipeline::run_all(&inputs, &reference_index, &ref_groups, &sv_table, &config);

    let mut any_succeeded = false;
    for outcome in &outcomes {
        match &outcome.error {
            Some(err) => eprintln!("assembly '{}': ERROR ({err})", outcome.name),
            None => {
                any_succeeded = true;
                if let Err(err) = io::write_assembly_outputs(&analyze_args.output_dir, outcome) {
                    eprintln!("assembly '{}': failed to write outputs: {err}", outcome.name);
                }
            }
        }
    }

    if any_succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
