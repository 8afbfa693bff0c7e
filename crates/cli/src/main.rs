//! CLI tool for generating ESL sound-alike exercise decks.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use esl_core::{
    validate_slide_count, validate_words, DeckBuilder, Error, FailurePolicy, Progress,
    SlideAssembler,
};
use esl_pptx::{PptxReader, PptxWriter};
use esl_services::{ChatDecoyGenerator, StabilityImageSynthesizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Create PowerPoint exercises that test whether students can tell similar
/// sounding or looking English words apart.
///
/// Each slide shows a generated picture of a word next to three lettered
/// choices: the word itself and two decoys (e.g. electricity, elasticity,
/// electrician). Hand out A, B and C cards, show a slide, and have students
/// hold up the letter matching the picture.
#[derive(Parser, Debug)]
#[command(name = "esl-deck")]
#[command(author, version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an exercise deck, one slide per word
    Generate(GenerateArgs),
    /// List the slides of a generated deck
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Target words, one slide each (prompted for when omitted)
    words: Vec<String>,

    /// Number of slides to prompt for when no words are given (1-10)
    #[arg(short = 'n', long, default_value = "2")]
    count: usize,

    /// Output file (default: ESL_Exercise.pptx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (default: esl-deck.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for choice order and colors, for reproducible decks
    #[arg(long)]
    seed: Option<u64>,

    /// Skip words whose image generation fails instead of aborting the deck
    #[arg(long)]
    skip_failed: bool,

    /// Override the text-generation model
    #[arg(long)]
    model: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Generated .pptx file
    input: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Generate(args) => generate(args),
        Command::Inspect(args) => inspect(&args).map(|()| ExitCode::SUCCESS),
    }
}

/// Exit code for input that failed validation.
const EXIT_INVALID_INPUT: u8 = 2;

fn generate(args: GenerateArgs) -> Result<ExitCode> {
    let words = match collect_words(&args) {
        Ok(words) => words,
        Err(Error::ValidationError(msg)) => return Ok(warn_invalid(&msg)),
        Err(e) => return Err(e.into()),
    };

    // Nothing below runs unless every word is present.
    let targets = match validate_words(&words) {
        Ok(targets) => targets,
        Err(Error::ValidationError(msg)) => return Ok(warn_invalid(&msg)),
        Err(e) => return Err(e.into()),
    };

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(model) = &args.model {
        config.text.model = model.clone();
    }
    log::debug!("Using config: {:?}", config);

    let decoys = ChatDecoyGenerator::from_config(&config.text)?;
    let images = StabilityImageSynthesizer::from_config(&config.image)?;

    let mut writer = PptxWriter::new();
    if let Some(size) = config.deck.font_size_pt {
        writer = writer.with_font_size(size);
    }
    let assembler = SlideAssembler::new().with_palette(config.deck.palette()?);

    let policy = if args.skip_failed {
        FailurePolicy::SkipSlide
    } else {
        config.deck.failure_policy
    };

    let builder = DeckBuilder::new(&decoys, &images)
        .with_assembler(assembler)
        .with_policy(policy);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let words: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
    eprintln!(
        "Generating presentation for {} word(s)... this may take a few minutes.",
        words.len()
    );

    let mut report_progress = |event: Progress<'_>| match event {
        Progress::SlideCreated { number, total, word } => {
            eprintln!("Created slide {}/{}: {}", number, total, word);
        }
        Progress::SlideSkipped {
            position,
            total,
            word,
            error,
        } => {
            eprintln!("Skipped word {}/{} '{}': {}", position, total, word, error);
        }
    };

    let (artifact, report) = builder
        .build_artifact(&words, &mut rng, &mut report_progress, &writer)
        .context("Failed to generate the exercise deck")?;

    for degraded in &report.degraded {
        eprintln!(
            "Warning: slide for '{}' has fewer than three choices ({})",
            degraded.word, degraded.reason
        );
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    write_output(&output_path, &artifact.bytes)?;

    println!("{}", output_path.display());
    log::info!(
        "Wrote {} ({}, {} bytes)",
        output_path.display(),
        artifact.mime_type,
        artifact.bytes.len()
    );

    Ok(ExitCode::SUCCESS)
}

/// Words from the command line, or prompted for one at a time.
fn collect_words(args: &GenerateArgs) -> esl_core::Result<Vec<String>> {
    if !args.words.is_empty() {
        return Ok(args.words.clone());
    }

    let count = validate_slide_count(args.count)?;
    let mut words = Vec::with_capacity(count);
    for i in 0..count {
        let word: String = dialoguer::Input::new()
            .with_prompt(format!("Word {}", i + 1))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::IoError(std::io::Error::other(e.to_string())))?;
        words.push(word);
    }
    Ok(words)
}

fn warn_invalid(msg: &str) -> ExitCode {
    eprintln!("Warning: {}", msg);
    ExitCode::from(EXIT_INVALID_INPUT)
}

/// Print a per-slide summary of a generated deck.
fn inspect(args: &InspectArgs) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let summaries = PptxReader::new()
        .read(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "Slide {} ({} picture{})",
            summary.number,
            summary.pictures,
            if summary.pictures == 1 { "" } else { "s" }
        );
        for label in &summary.labels {
            println!("  {}", label);
        }
    }

    Ok(())
}

/// Write the artifact bytes to a file.
fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    std::fs::write(path, bytes).with_context(|| format!("Failed to write to {}", path.display()))
}
