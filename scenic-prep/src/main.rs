mod run_assemble;
mod run_rss;
mod run_summarize;

use crate::run_assemble::*;
use crate::run_rss::*;
use crate::run_summarize::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble per-sample 10x matrices into a loom file for SCENIC
    Assemble(AssembleArgs),

    /// Export SCENIC results (AUC, regulons) and regulon specificity
    /// scores from an annotated loom file
    Summarize(SummarizeArgs),

    /// Regulon specificity scores from an AUC csv file
    Rss(RssArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Assemble(args) => {
            run_assemble_loom(args.clone())?;
        }
        Commands::Summarize(args) => {
            run_summarize_loom(args.clone())?;
        }
        Commands::Rss(args) => {
            run_rss_csv(args.clone())?;
        }
    }

    Ok(())
}
