//! pdf2outline - Extract a title and an H1/H2/H3 outline from a PDF.
//!
//! Reads one PDF (a file, or the first `*.pdf` in a directory by name),
//! detects its headings and writes the outline as pretty-printed JSON.
//! Exits non-zero when there is no input or nothing to write.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use pdfoutline_core::{
    Embedder, HashingEmbedder, Outline, OutlineError, OutlineOutcome, OutlineParams,
    extract_outline_from_path,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Detect headings in a PDF and write its outline as JSON.
#[derive(Parser, Debug)]
#[command(name = "pdf2outline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF file, or a directory whose first PDF (by name) is processed
    #[arg(default_value = "/app/input")]
    input: PathBuf,

    /// Output JSON file, or a directory that receives `<stem>.json`
    #[arg(short, long, default_value = "/app/output")]
    output: PathBuf,

    /// JSON file with (possibly partial) outline parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fraction of the page height ignored at the top and bottom
    #[arg(long)]
    margin: Option<f64>,

    /// Combined-score threshold for H1
    #[arg(long = "sim-high")]
    sim_high: Option<f64>,

    /// Combined-score threshold for H2
    #[arg(long = "sim-low")]
    sim_low: Option<f64>,

    /// Maximum number of headings kept per page
    #[arg(long = "max-per-page")]
    max_per_page: Option<usize>,

    /// Dimension of the hashing embedder
    #[arg(long = "embedding-dim", default_value_t = HashingEmbedder::DEFAULT_DIMENSION)]
    embedding_dim: usize,

    /// Local sentence-embedding model directory (needs the `candle` feature)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// How a run ended when nothing went wrong.
#[derive(Debug, PartialEq, Eq)]
enum RunStatus {
    Written(PathBuf),
    EmptyDocument,
    NoHeadings,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolves the input argument to a single PDF file.
fn find_input(input: &Path) -> Result<PathBuf> {
    if input.is_file() {
        return Ok(input.to_path_buf());
    }
    if input.is_dir() {
        let mut pdfs: Vec<PathBuf> = fs::read_dir(input)
            .with_context(|| format!("failed to read directory {}", input.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_extension(path, "pdf"))
            .collect();
        pdfs.sort();
        if let Some(first) = pdfs.into_iter().next() {
            return Ok(first);
        }
    }
    Err(OutlineError::InputMissing(input.to_path_buf()).into())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// A `.json` output is a file; anything else is a directory.
fn output_path(output: &Path, input: &Path) -> PathBuf {
    if has_extension(output, "json") {
        return output.to_path_buf();
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "outline".to_string());
    output.join(format!("{stem}.json"))
}

fn load_params(args: &Args) -> Result<OutlineParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => OutlineParams::default(),
    };

    if let Some(margin) = args.margin {
        params = params.with_margin(margin);
    }
    if args.sim_high.is_some() || args.sim_low.is_some() {
        let (high, low) = params.sim_thr;
        params = params.with_sim_thr(args.sim_high.unwrap_or(high), args.sim_low.unwrap_or(low));
    }
    if let Some(cap) = args.max_per_page {
        params = params.with_max_headings_per_page(cap);
    }
    params.validate()?;
    Ok(params)
}

/// The hashing embedder unless a model directory was given.
fn build_embedder(args: &Args) -> Result<Box<dyn Embedder>> {
    match &args.model {
        None => Ok(Box::new(HashingEmbedder::new(args.embedding_dim)?)),
        Some(dir) => load_model(dir),
    }
}

#[cfg(feature = "candle")]
fn load_model(dir: &Path) -> Result<Box<dyn Embedder>> {
    let embedder = pdfoutline_core::SentenceEmbedder::from_dir(dir)
        .with_context(|| format!("failed to load model {}", dir.display()))?;
    Ok(Box::new(embedder))
}

#[cfg(not(feature = "candle"))]
fn load_model(dir: &Path) -> Result<Box<dyn Embedder>> {
    anyhow::bail!(
        "cannot load model {}: pdf2outline was built without the `candle` feature",
        dir.display()
    )
}

fn write_outline(outline: &Outline, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(outline)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn run(args: &Args) -> Result<RunStatus> {
    let params = load_params(args)?;
    let input = find_input(&args.input)?;
    let mut embedder = build_embedder(args)?;

    info!(input = %input.display(), "processing");
    let outcome = extract_outline_from_path(&input, embedder.as_mut(), &params)
        .with_context(|| format!("failed to process {}", input.display()))?;

    match outcome {
        OutlineOutcome::Built(outline) => {
            let path = output_path(&args.output, &input);
            write_outline(&outline, &path)?;
            Ok(RunStatus::Written(path))
        }
        OutlineOutcome::EmptyDocument => Ok(RunStatus::EmptyDocument),
        OutlineOutcome::NoHeadings => Ok(RunStatus::NoHeadings),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(RunStatus::Written(path)) => {
            println!("Outline written to {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(RunStatus::EmptyDocument) => {
            eprintln!("No text lines found in {}", args.input.display());
            ExitCode::FAILURE
        }
        Ok(RunStatus::NoHeadings) => {
            eprintln!("No headings detected in {}", args.input.display());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
