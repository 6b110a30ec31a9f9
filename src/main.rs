use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talpa::engine::SearchEngine;
use talpa::extract::run_extract;
use talpa::fetch::DirFetcher;

mod cli;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract {
            input,
            output,
            route_prefix,
        } => {
            if let Err(e) = run_extract(Path::new(&input), Path::new(&output), &route_prefix) {
                eprintln!("❌ {}", e);
                return ExitCode::FAILURE;
            }
        }
        Commands::Search {
            corpus,
            query,
            limit,
        } => {
            if let Err(e) = run_search(&corpus, &query, limit) {
                eprintln!("❌ {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_search(corpus: &str, query: &str, limit: usize) -> Result<(), talpa::engine::EngineError> {
    let mut engine = SearchEngine::new();
    engine.init(&DirFetcher, corpus)?;

    let results = engine.search(query)?;
    let total = results.len();
    for result in results.into_iter().take(limit) {
        println!("{}  {}", result.href, result.breadcrumbs.join(" › "));
    }
    if total > limit {
        eprintln!("   ... and {} more", total - limit);
    }
    eprintln!("{} results for \"{}\"", total, query);
    Ok(())
}
