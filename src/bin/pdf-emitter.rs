//! PDF Emitter CLI tool
//!
//! Writes PDFs from finished content streams and inspects the result.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use glob::glob;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

use pdf_emitter::layout::PageDimensions;
use pdf_emitter::pdf::{inspect, DocumentInfo, Writer, WriterOptions};

/// PDF Emitter - Build PDFs from content streams
#[derive(Parser)]
#[command(name = "pdf-emitter")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # One page per content stream file, in order
    pdf-emitter build -o output.pdf page1.txt page2.txt

    # Expand a glob, A4 paper, with a title
    pdf-emitter build -o report.pdf --paper a4 --title \"Report\" \"pages/*.txt\"

    # Show what a PDF contains
    pdf-emitter info output.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a PDF with one page per content stream file
    Build {
        /// Content stream files (in order). Supports glob patterns like "*.txt"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Paper size for the page tree media box (letter, a4)
        #[arg(long, default_value = "letter")]
        paper: String,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document author
        #[arg(long)]
        author: Option<String>,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { inputs, output, paper, title, author } => {
            cmd_build(inputs, output, paper, title, author)
        }
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
///
/// Literal paths keep their command-line order; matches of one pattern are sorted.
fn expand_globs(patterns: Vec<String>) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => log::warn!("glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Write one page per input file
fn cmd_build(
    inputs: Vec<String>,
    output: PathBuf,
    paper: String,
    title: Option<String>,
    author: Option<String>,
) -> anyhow::Result<()> {
    let inputs = expand_globs(inputs)?;

    let media_box = match PageDimensions::from_name(&paper) {
        Some(dims) => dims,
        None => bail!("Unknown paper size: {} (expected letter or a4)", paper),
    };

    let options = WriterOptions {
        media_box,
        info: DocumentInfo {
            title,
            author,
            producer: Some(format!("pdf-emitter {}", env!("CARGO_PKG_VERSION"))),
            creation_date: Some(chrono::Local::now().naive_local()),
        },
        ..Default::default()
    };

    let file = File::create(&output)
        .with_context(|| format!("Cannot create {}", output.display()))?;
    let mut writer = Writer::with_options(BufWriter::new(file), options)?;

    for path in &inputs {
        let content = std::fs::read(path)
            .with_context(|| format!("Cannot read content stream {}", path.display()))?;
        writer.add_page(content)?;
    }

    eprintln!("Writing {} pages...", inputs.len());
    writer.finish()?;

    eprintln!("Output: {}", output.display());
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let summary = inspect(&input)
        .with_context(|| format!("Cannot inspect {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", summary.page_count);
    println!("Objects: {}", summary.object_count);

    if let Some(title) = summary.title {
        println!("Title: {}", title);
    }
    if let Some(author) = summary.author {
        println!("Author: {}", author);
    }
    for font in summary.fonts {
        println!("Font: {}", font);
    }

    Ok(())
}
