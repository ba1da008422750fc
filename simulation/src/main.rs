//! Family Tree Generator
//!
//! Builds one tree and prints population reports for it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use simulation::{FamilyTree, PersonFactory, QueryEngine, TreeConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate a random family tree and report on its population
#[derive(Parser, Debug)]
#[command(name = "family-tree")]
#[command(about = "Generate a random family tree and report on its population")]
struct Args {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Founders' birth year
    #[arg(long)]
    start_year: Option<i32>,

    /// Last year in which anyone may be born
    #[arg(long)]
    until_year: Option<i32>,

    /// Which report to print
    #[arg(long, value_enum, default_value_t = Query::All)]
    query: Query,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Query {
    All,
    Total,
    Decades,
    Years,
    Duplicates,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TreeConfig::from_json_file(path)?,
        None => TreeConfig::default(),
    };
    if let Some(year) = args.start_year {
        config.start_year = year;
    }
    if let Some(year) = args.until_year {
        config.end_year = year;
    }
    config.validate()?;
    // Always run seeded so any tree can be regenerated
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);

    info!(
        "Building family tree {}-{} (seed {})",
        config.start_year, config.end_year, seed
    );

    let factory = PersonFactory::builtin(config.factory.clone());
    let mut tree = FamilyTree::new(factory, &config);
    tree.build(config.end_year);

    let queries = QueryEngine::new(&tree);
    match args.format {
        Format::Json => print_json(&queries, args.query)?,
        Format::Text => print_text(&queries, args.query),
    }

    Ok(())
}

fn print_json(q: &QueryEngine<'_>, query: Query) -> anyhow::Result<()> {
    let json = match query {
        Query::All => serde_json::to_string_pretty(&q.report())?,
        Query::Total => serde_json::to_string_pretty(&serde_json::json!({ "total": q.total() }))?,
        Query::Decades => serde_json::to_string_pretty(&q.by_decade())?,
        Query::Years => serde_json::to_string_pretty(&q.by_year())?,
        Query::Duplicates => serde_json::to_string_pretty(&q.duplicate_names())?,
    };
    println!("{json}");
    Ok(())
}

fn print_text(q: &QueryEngine<'_>, query: Query) {
    if matches!(query, Query::All | Query::Total) {
        println!("Total people: {}", q.total());
    }
    if matches!(query, Query::All | Query::Decades) {
        for (decade, count) in q.by_decade() {
            println!("{decade}s: {count}");
        }
    }
    if query == Query::Years {
        for (year, count) in q.by_year() {
            println!("{year}: {count}");
        }
    }
    if matches!(query, Query::All | Query::Duplicates) {
        let dups = q.duplicate_names();
        if dups.is_empty() {
            println!("No duplicate full names found.");
        }
        for dup in dups {
            println!("{}: {}", dup.name, dup.count);
        }
    }
}
