//! Command-line front end: inspect TAP images and check that they survive
//! a play/capture round trip.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use format_spectrum_tap::{TapFile, TapHeader};
use log::info;
use spectrum_tape::{SavePhase, TapeConfig, blocks_from_tap, load_tap, replay};

#[derive(Parser)]
#[command(name = "spectrum-tape", version, about = "ZX Spectrum tape codec")]
struct Cli {
    /// JSON file overriding timing and ROM settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the blocks and header records of a TAP image.
    Info { tap: PathBuf },
    /// Play every block and decode it again, reporting mismatches.
    Verify { tap: PathBuf },
}

fn load_config(path: Option<&Path>) -> Result<TapeConfig> {
    let Some(path) = path else {
        return Ok(TapeConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    TapeConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

fn describe(header: &TapHeader) -> String {
    format!(
        "{:?} \"{}\" length {} param1 {} param2 {}",
        header.kind,
        header.name(),
        header.data_length,
        header.param1,
        header.param2
    )
}

fn list_blocks(tap: &TapFile) {
    for (index, block) in tap.blocks.iter().enumerate() {
        let raw = block.to_raw();
        let summary = match TapHeader::parse(&raw) {
            Some(header) => describe(&header),
            None if block.is_header() => "header-flagged block".to_string(),
            None => "data".to_string(),
        };
        println!(
            "{index:3}: flag ${:02X}, {:5} bytes  {summary}",
            block.flag,
            raw.len()
        );
    }
}

fn verify(tap: &TapFile, config: &TapeConfig) -> bool {
    let blocks = blocks_from_tap(tap, config.default_pause_ms);
    let result = replay(blocks, config, 0);
    info!("replayed {} tacts", result.end_tact);

    let mut ok = result.final_phase != SavePhase::Error;
    if result.captured.len() != tap.blocks.len() {
        println!(
            "captured {} of {} blocks",
            result.captured.len(),
            tap.blocks.len()
        );
        ok = false;
    }
    for (index, (block, captured)) in tap.blocks.iter().zip(&result.captured).enumerate() {
        let same = captured.block.payload() == block.to_raw().as_slice();
        println!("{index:3}: {}", if same { "ok" } else { "MISMATCH" });
        ok &= same;
    }
    ok
}

fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Info { tap } => {
            let tap = load_tap(tap).with_context(|| format!("loading {}", tap.display()))?;
            list_blocks(&tap);
            Ok(true)
        }
        Command::Verify { tap } => {
            let tap = load_tap(tap).with_context(|| format!("loading {}", tap.display()))?;
            Ok(verify(&tap, &config))
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
