use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use morphmatch::report::{Aggregation, TextReport};
use morphmatch::{ImageSource, MatchingPipeline};

#[derive(Parser)]
#[command(name = "morphmatch")]
#[command(about = "Rank images by morphological similarity to a query image")]
struct Cli {
    /// Path to the query image
    #[arg(value_name = "QUERY")]
    query: PathBuf,

    /// Paths to the dataset images
    #[arg(value_name = "DATASET", required = true)]
    dataset: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Order results by an aggregate of the feature distances
    #[arg(long, value_enum, default_value_t = Aggregation::None)]
    aggregate: Aggregation,

    /// Process dataset images one at a time
    #[arg(long)]
    sequential: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut pipeline = MatchingPipeline::new().with_parallel(!args.sequential);
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let query = ImageSource::from(args.query);
    let dataset: Vec<ImageSource> = args.dataset.into_iter().map(ImageSource::from).collect();

    let results = pipeline.run(&query, &dataset)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("\n=== Morphological Similarity Results ===");
        println!("Query: {}", query.id());
        println!("Dataset images: {}\n", results.len());
        print!("{}", TextReport::new(&results, args.aggregate));
    }

    Ok(())
}
