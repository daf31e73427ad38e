//! `abx` — command line Android backup extractor.
//!
//! All terminal concerns (colors, prompt, progress bar) live here; the
//! library underneath only ever returns structured errors and byte-count
//! callbacks.

use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use abx::{read_header, Password, Pipeline};

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

fn main() {
    println!("\n{BOLD}Android Backup Extractor{RESET}\n");

    if let Err(e) = run() {
        eprintln!("\n{RED}{e:#}{RESET}\n\n{BOLD}{RED}✗ Something went wrong!{RESET}\n");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("Usage: abx <backup.ab> <output.tar> [password]");
    }
    let input = Path::new(&args[0]);
    let output = Path::new(&args[1]);
    let cli_password = args.get(2).map(|p| Password::new(p.clone()));

    let metadata = fs::metadata(input)
        .with_context(|| format!("backup file does not exist: {}", input.display()))?;
    if metadata.len() == 0 {
        bail!("file too small in size");
    }

    println!("Input File: {}", file_name(input));

    let header = read_header(&mut BufReader::new(File::open(input)?))?;
    println!("File Version: {}", header.version);
    println!("Compressed: {}", header.compressed);
    println!(
        "Encryption: {}",
        if header.is_encrypted() { "AES-256" } else { "none" }
    );
    println!("Header length: {} bytes", header.payload_offset);
    println!("Backup size: {} MB", metadata.len() / (1024 * 1024));
    println!("\n{GREEN}Backup file appears to be valid!{RESET}");

    println!(
        "\nCreating {ITALIC}{}{RESET}, please wait...\n",
        file_name(output)
    );

    let source = BufReader::new(File::open(input)?);
    let mut sink = BufWriter::new(
        File::create(output)
            .with_context(|| format!("cannot create output file: {}", output.display()))?,
    );

    // Interactive fallback: asked once up front when no CLI password was
    // given, then again after every failed attempt.
    let had_cli_password = cli_password.is_some();
    let mut prompts: u32 = 0;
    let mut prompt = move || {
        if prompts > 0 || had_cli_password {
            println!("\n{BOLD}{RED}✗ Incorrect password. Please try again.{RESET}");
        } else {
            println!("\n{YELLOW}Backup is encrypted. Please enter the password to decrypt.{RESET}");
        }
        prompts += 1;
        rpassword::prompt_password(format!("\n{BOLD}Password: {RESET}"))
            .ok()
            .map(Password::new)
    };

    let mut bar = ProgressBar::default();
    let mut observer = |written: u64, total: u64| bar.update(written, total);

    Pipeline::new().run(
        &header,
        source,
        &mut sink,
        cli_password,
        &mut prompt,
        Some(&mut observer),
    )?;

    println!("\n\n{GREEN}{BOLD}✓ Backup extraction complete!{RESET}");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 40-cell textual progress bar, redrawn in place.
///
/// The percentage compares bytes emitted by the pipeline against the
/// input file size, so inflating payloads can outrun the input — clamped
/// at 100%.
#[derive(Default)]
struct ProgressBar;

impl ProgressBar {
    const CELLS: u64 = 40;

    fn update(&mut self, written: u64, total_input: u64) {
        let percent = if total_input == 0 {
            100
        } else {
            (written * 100 / total_input).min(100)
        };
        let filled = (percent * Self::CELLS / 100) as usize;
        let empty = Self::CELLS as usize - filled;
        print!(
            "\r\x1b[2K{CYAN}{}{} {RESET}{percent}% ",
            "█".repeat(filled),
            "░".repeat(empty)
        );
        let _ = io::stdout().flush();
    }
}
