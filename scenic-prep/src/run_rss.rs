use scenic_prep::common::*;
use scenic_prep::config::*;
use scenic_prep::summarize::run_rss_from_csv;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct RssArgs {
    /// AUC csv file (cells x regulons)
    #[arg(long, short = 'a', required = true)]
    auc: Box<str>,

    /// cell metadata csv (first column: cell ID)
    #[arg(long, short = 'm', required = true)]
    meta: Box<str>,

    /// output csv file (regulons x cell types)
    #[arg(long, short = 'o', required = true)]
    out: Box<str>,

    /// metadata column of cell types
    #[arg(long, short = 'c', default_value = DEFAULT_CELL_TYPE_COLUMN)]
    cell_type_column: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_rss_csv(args: RssArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let rss = run_rss_from_csv(&RssConfig {
        auc_file: args.auc,
        meta_file: args.meta,
        out_file: args.out,
        cell_type_column: args.cell_type_column,
    })?;

    info!(
        "{} cell types x {} regulons",
        rss.mat.nrows(),
        rss.mat.ncols()
    );
    Ok(())
}
