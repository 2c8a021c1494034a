//! One-shot acquisition: fetch a URL through the strategy chain and print
//! the extracted article text.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use newsprobe::{
    acquisition::{Acquire, Acquirer, AcquisitionResult},
    config::Config,
    extractor::UNAVAILABLE_SENTINEL,
    telemetry,
};

#[derive(Parser, Debug)]
#[command(name = "acquire")]
#[command(about = "Fetch an article and print its main text", long_about = None)]
struct Cli {
    /// Article URL
    #[arg(value_name = "URL")]
    url: String,

    /// Minimum characters an extraction must exceed to be accepted
    #[arg(long, value_name = "N")]
    min_chars: Option<usize>,

    /// Print strategy, heuristic and language before the text
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init(if cli.verbose { "newsprobe=debug,warn" } else { "warn" });

    let config = Config::from_env().context("Failed to load configuration")?;
    let mut fetch = config.fetch().clone();
    if let Some(min_chars) = cli.min_chars {
        fetch.min_extract_chars = min_chars;
    }
    let acquirer = Acquirer::from_config(&fetch)?;

    match acquirer.acquire(&cli.url).await {
        AcquisitionResult::Text(article) => {
            if cli.verbose {
                eprintln!(
                    "url: {}\nstrategy: {}\nheuristic: {}\nlanguage: {}\nchars: {}\n",
                    article.url,
                    article.strategy,
                    article.heuristic,
                    article.language.as_deref().unwrap_or("unknown"),
                    article.text.chars().count()
                );
            }
            println!("{}", article.text);
            Ok(ExitCode::SUCCESS)
        }
        AcquisitionResult::Blocked { status } => {
            eprintln!("{}", UNAVAILABLE_SENTINEL);
            eprintln!("Access blocked (HTTP {})", status);
            Ok(ExitCode::from(2))
        }
        AcquisitionResult::Unavailable { reason } => {
            eprintln!("{}", UNAVAILABLE_SENTINEL);
            eprintln!("{}", reason);
            Ok(ExitCode::from(1))
        }
    }
}
