//! Interactive console for building and querying a count sketch
//!
//! Ingests a newline-separated input file (each line adds a count of 1 for
//! that item), optionally preloads a previously saved counter table, then
//! answers frequency queries from stdin until `q`. `s` saves the current
//! counter table as text.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use streamfreq::frequency::{depth_for_failure, width_for_error, CountSketch};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "streamfreq",
    version,
    about = "Count sketch frequency estimation console"
)]
struct Args {
    /// Input file with one item per line; each line adds a count of 1
    #[arg(long)]
    input: PathBuf,

    /// Previously saved plain-text counter table to preload
    #[arg(long)]
    table: Option<PathBuf>,

    /// Where `s` writes the counter table
    #[arg(long, default_value = "count_sketch.txt")]
    save_path: PathBuf,

    /// Target additive error fraction
    #[arg(long, default_value_t = 0.01)]
    epsilon: f64,

    /// Target probability of a bad estimate
    #[arg(long, default_value_t = 0.01)]
    delta: f64,

    /// Explicit table width (overrides --epsilon)
    #[arg(long, requires = "depth")]
    width: Option<usize>,

    /// Explicit table depth (overrides --delta)
    #[arg(long, requires = "width")]
    depth: Option<usize>,

    /// Seed for the integer-path hash coefficients
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let (width, depth) = match (args.width, args.depth) {
        (Some(width), Some(depth)) => (width, depth),
        _ => (width_for_error(args.epsilon), depth_for_failure(args.delta)),
    };
    if width == 0 || depth == 0 || width > i32::MAX as usize || depth > i32::MAX as usize {
        bail!("width and depth must be positive 32-bit values (got {}x{})", width, depth);
    }

    let mut sketch = CountSketch::with_seed(width, depth, args.seed);
    info!(width, depth, seed = args.seed, "created sketch");

    if let Some(path) = &args.table {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading table {}", path.display()))?;
        sketch
            .load_text_table(&text)
            .with_context(|| format!("loading table {}", path.display()))?;
        info!(table = %path.display(), "loaded counter table");
    }

    ingest(&args.input, &mut sketch)?;
    info!(total_weight = sketch.total_weight(), "ingest complete");

    println!("To exit type `q` and hit <Enter>.");
    println!("To save table type `s` and hit <Enter>.");
    println!("========================================");
    println!("Enter a word to estimate:");

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        match line.trim() {
            "q" => {
                println!("Exit!");
                break;
            }
            "s" => {
                fs::write(&args.save_path, sketch.to_text_table())
                    .with_context(|| format!("saving table {}", args.save_path.display()))?;
                println!("Saved to {}", args.save_path.display());
            }
            "" => {}
            word => {
                println!(
                    "Estimated frequency for {} is {}",
                    word,
                    sketch.estimate(word.as_bytes())
                );
            }
        }
    }

    Ok(())
}

fn ingest(path: &Path, sketch: &mut CountSketch) -> Result<()> {
    let file =
        fs::File::open(path).with_context(|| format!("opening input {}", path.display()))?;
    let mut lines = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line.context("reading input")?;
        sketch.add(line.as_bytes(), 1)?;
        lines += 1;
    }
    info!(lines, input = %path.display(), "ingested input file");
    Ok(())
}
