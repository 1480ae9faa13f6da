use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use tagtree::{
    error::Result,
    load_with_config,
    parser::config::{ParserConfig, DEFAULT_MAX_DEPTH},
    Query,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Markup file to load
    file: PathBuf,

    /// Path query to run, e.g. `map/name$` or `map:width` (repeatable)
    #[arg(short, long = "query")]
    queries: Vec<String>,

    /// Print the parsed tree as an outline
    #[arg(long)]
    outline: bool,

    /// Fail when the first line is not the expected header
    #[arg(long)]
    strict_header: bool,

    /// Maximum nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() {
    // Initialize the default subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    // Compile every query first so a typo fails before any file access
    let queries = args
        .queries
        .iter()
        .map(|q| q.parse::<Query>())
        .collect::<Result<Vec<_>>>()?;

    let config = ParserConfig::default()
        .with_strict_header(args.strict_header)
        .with_max_depth(args.max_depth);

    info!("Loading file: {}", args.file.display());
    let file = load_with_config(&args.file, config)?;
    let Some(tree) = file.tree() else {
        return Ok(());
    };

    if args.outline {
        print!("{}", tree);
    }

    for query in &queries {
        match query.resolve(tree) {
            Ok(value) => println!("{} = {}", query, value),
            Err(e) if e.is_not_found() => println!("{}: not found", query),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
