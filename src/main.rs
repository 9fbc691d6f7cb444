//! # AMOS
//!
//! `amos transpile` writes the compiled listing of a tokenized program,
//! `amos run` executes it in the terminal.

mod term;

use amos::lang::table::{bytes_from_c_array, CORE_HEADER_SKIP};
use amos::lang::{cipher, parse, TokenTable};
use amos::mach::{codegen, Program};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const HUNK_MAGIC: [u8; 4] = [0x00, 0x00, 0x03, 0xF3];

#[derive(Parser, Debug)]
#[command(name = "amos", version)]
#[command(about = "Compile and run tokenized AMOS BASIC programs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the compiled program listing
    Transpile {
        /// Tokenized .AMOS source
        input: PathBuf,

        /// Listing file, defaults to the input with a .lst extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        vocabulary: Vocabulary,
    },
    /// Execute a program in the terminal
    Run {
        /// Tokenized .AMOS source
        input: PathBuf,

        #[command(flatten)]
        vocabulary: Vocabulary,
    },
}

#[derive(Args, Debug)]
struct Vocabulary {
    /// Core token table: an extension binary, or a C header holding one
    #[arg(long)]
    base: Option<PathBuf>,

    /// Extension token table loaded into a slot
    #[arg(long = "extension", value_name = "SLOT=FILE", value_parser = parse_extension)]
    extensions: Vec<(u8, PathBuf)>,
}

impl Vocabulary {
    fn load(&self) -> Result<TokenTable> {
        let mut table = TokenTable::new();
        match &self.base {
            Some(path) => {
                let count = table.load(&read_extension(path)?, 0, CORE_HEADER_SKIP)?;
                info!(count, "loaded core vocabulary from {}", path.display());
            }
            None => warn!("no --base vocabulary, every instruction decodes as a placeholder"),
        }
        for (slot, path) in &self.extensions {
            let count = table.load(&read_extension(path)?, *slot, CORE_HEADER_SKIP)?;
            info!(slot, count, "loaded extension from {}", path.display());
        }
        Ok(table)
    }
}

fn parse_extension(arg: &str) -> std::result::Result<(u8, PathBuf), String> {
    let (slot, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=FILE, got `{}`", arg))?;
    let slot: u8 = slot
        .trim()
        .parse()
        .map_err(|_| format!("invalid slot `{}`", slot))?;
    if !(1..=25).contains(&slot) {
        return Err(format!("slot {} is outside 1..=25", slot));
    }
    Ok((slot, PathBuf::from(path)))
}

fn read_extension(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    if bytes.starts_with(&HUNK_MAGIC) {
        return Ok(bytes);
    }
    Ok(bytes_from_c_array(&String::from_utf8_lossy(&bytes))?)
}

fn compile(input: &Path, vocabulary: &Vocabulary) -> Result<Program> {
    let table = vocabulary.load()?;
    let mut file = fs::read(input)?;
    let unlocked = cipher::unlock_procedures(&mut file)?;
    if unlocked > 0 {
        info!(unlocked, "decrypted procedures");
    }
    let parsed = parse(&file, &table)?;
    for warning in &parsed.warnings {
        warn!("{}", warning);
    }
    let program = codegen(&parsed.ir, &parsed.labels)?.with_checksum(parsed.checksum);
    info!(ops = program.len(), "compiled {}", input.display());
    Ok(program)
}

fn transpile(input: &Path, output: Option<&Path>, vocabulary: &Vocabulary) -> Result<()> {
    let program = compile(input, vocabulary)?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("lst"),
    };
    fs::write(&output, program.to_string())?;
    info!("wrote {}", output.display());
    Ok(())
}

fn run(input: &Path, vocabulary: &Vocabulary) -> Result<()> {
    let program = Rc::new(compile(input, vocabulary)?);
    term::run(&program)?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Transpile {
            input,
            output,
            vocabulary,
        } => transpile(input, output.as_deref(), vocabulary),
        Command::Run { input, vocabulary } => run(input, vocabulary),
    };
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
