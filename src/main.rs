//! VM Manager - Main Entry Point
//!
//! Translates a file of 16-bit virtual addresses against a 256-page backing
//! store, printing the physical address and stored value for each, followed
//! by fault and TLB hit statistics.
//!
//! Usage: vm_manager [OPTIONS] <BACKING_STORE> <ADDRESSES>

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use vm_manager::io::{read_addresses, write_report};
use vm_manager::{
    AddressMode, AddressTranslator, BackingStore, NUM_FRAMES, Replacement, Result, TLB_ENTRIES,
    TranslatorConfig, VmError,
};

#[derive(Parser, Debug)]
#[command(name = "vm_manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backing store file (exactly 65536 bytes)
    backing_store: PathBuf,

    /// File with one virtual address per line
    addresses: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of physical frames
    #[arg(long, default_value_t = NUM_FRAMES)]
    frames: usize,

    /// Number of TLB entries
    #[arg(long, default_value_t = TLB_ENTRIES)]
    tlb_entries: usize,

    /// Policy when a page fault finds memory full
    #[arg(long, value_enum, default_value_t = ReplacementArg::None)]
    replacement: ReplacementArg,

    /// Keep the low 16 bits of oversized addresses instead of rejecting them
    #[arg(long)]
    wrap: bool,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReplacementArg {
    None,
    Fifo,
    Lru,
}

impl From<ReplacementArg> for Replacement {
    fn from(arg: ReplacementArg) -> Self {
        match arg {
            ReplacementArg::None => Replacement::None,
            ReplacementArg::Fifo => Replacement::Fifo,
            ReplacementArg::Lru => Replacement::Lru,
        }
    }
}

impl Cli {
    fn translator_config(&self) -> TranslatorConfig {
        TranslatorConfig {
            frames: self.frames,
            tlb_entries: self.tlb_entries,
            replacement: self.replacement.into(),
            address_mode: if self.wrap {
                AddressMode::Wrap
            } else {
                AddressMode::Strict
            },
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    // Run the VM manager and handle any errors
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Main logic separated from main() for cleaner error handling
fn run(cli: &Cli) -> Result<()> {
    let config = cli.translator_config();
    config.validate()?;

    // Configuration and IO errors are fatal before any translation
    let store = BackingStore::open(&cli.backing_store)?;
    let addresses = read_addresses(&cli.addresses)?;

    let mut translator = AddressTranslator::new(store, config)?;
    let records = translator.translate_all(addresses)?;
    let stats = translator.statistics();

    let (mut out, label): (Box<dyn Write>, PathBuf) = match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| VmError::Io {
                path: path.clone(),
                source: e,
            })?;
            (Box::new(BufWriter::new(file)), path.clone())
        }
        None => (Box::new(io::stdout().lock()), PathBuf::from("<stdout>")),
    };

    write_report(&mut out, &records, &stats, cli.quiet)
        .map_err(|source| VmError::Io { path: label, source })
}
