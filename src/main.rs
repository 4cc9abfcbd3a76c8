//! `tubsync` command-line client: query the alignment and annotation backend
//! without a viewer attached.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tubsync::annotations::aggregate_chain_annotations;
use tubsync::error::SyncError;
use tubsync::mapping::build_mapping;
use tubsync::options::Options;
use tubsync::service::{AlignmentRequest, DataService, HttpDataService};
use tubsync::structure::ChainRef;

#[derive(Parser, Debug)]
#[command(name = "tubsync")]
#[command(about = "Query the tubulin alignment and annotation backend")]
struct Cli {
    /// Options file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides the options file.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the master alignment and summarize it.
    Master,
    /// Align a raw sequence and print its column mapping.
    Align {
        /// One-letter residue codes.
        sequence: String,
        /// Residue number of the first residue.
        #[arg(long, default_value_t = 1)]
        start: i32,
    },
    /// Fetch and aggregate the annotations of one chain.
    Annotations {
        /// Structure id, e.g. 5JCO.
        rcsb: String,
        /// Author chain id.
        chain: String,
    },
}

fn master(
    service: &dyn DataService,
    out: &mut impl Write,
) -> Result<(), SyncError> {
    let alignment = service.master_alignment()?;
    log::info!(
        "master alignment: {} rows x {} columns",
        alignment.sequences.len(),
        alignment.alignment_length
    );
    for seq in &alignment.sequences {
        let residues = seq.sequence.chars().filter(|&c| c != '-').count();
        writeln!(out, "{}\t{residues}", seq.id)?;
    }
    Ok(())
}

fn align(
    service: &dyn DataService,
    sequence: &str,
    start: i32,
    out: &mut impl Write,
) -> Result<(), SyncError> {
    let sequence = sequence.trim().to_ascii_uppercase();
    let ids: Vec<i32> = (start..).take(sequence.chars().count()).collect();
    let response = service.align(&AlignmentRequest {
        sequence: sequence.clone(),
        sequence_id: Some("cli".to_owned()),
        auth_seq_ids: Some(ids.clone()),
        annotations: None,
    })?;
    let mapping = build_mapping(&ids, response.column_mapping(ids.len())?);
    log::info!("{} of {} residues placed", mapping.len(), ids.len());

    writeln!(out, "{}", response.aligned_sequence)?;
    for (column, auth_seq_id) in mapping.iter() {
        writeln!(out, "{column}\t{auth_seq_id}")?;
    }
    Ok(())
}

fn annotations(
    service: &dyn DataService,
    options: &Options,
    chain: &ChainRef,
    out: &mut impl Write,
) -> Result<(), SyncError> {
    let response = service.chain_annotations(chain)?;
    let annotations =
        aggregate_chain_annotations(chain, &response, None, &options.colors);
    log::info!(
        "{chain}: {} ligand sites, {} mutations",
        annotations.ligand_sites.len(),
        annotations.mutations.len()
    );

    for site in &annotations.ligand_sites {
        writeln!(
            out,
            "site\t{}\t{}\tresidues={:?}\tcolumns={:?}",
            site.id, site.ligand_name, site.auth_seq_ids, site.master_indices
        )?;
    }
    for mutation in &annotations.mutations {
        writeln!(
            out,
            "mutation\t{}\t{}",
            mutation.label,
            mutation.phenotype.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), SyncError> {
    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if let Some(base_url) = cli.base_url {
        options.service.base_url = base_url;
    }
    let service = HttpDataService::new(&options.service);
    log::debug!("backend: {}", service.base_url());

    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Master => master(&service, &mut out),
        Command::Align { sequence, start } => {
            align(&service, &sequence, start, &mut out)
        }
        Command::Annotations { rcsb, chain } => annotations(
            &service,
            &options,
            &ChainRef::new(&rcsb, &chain),
            &mut out,
        ),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
