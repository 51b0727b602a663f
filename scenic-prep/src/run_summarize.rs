use scenic_prep::common::*;
use scenic_prep::config::*;
use scenic_prep::summarize::run_summarize;

use clap::Parser;
use loom_beans::loom_io::LoomFile;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct SummarizeArgs {
    /// loom file with `RegulonsAUC`, `Regulons` and `MetaData` from
    /// pySCENIC
    #[arg(long, short = 'l', required = true)]
    loom: Box<str>,

    /// cell metadata csv (first column: cell ID)
    #[arg(long, short = 'm', required = true)]
    meta: Box<str>,

    /// output directory
    #[arg(long, short = 'o', required = true)]
    out_dir: Box<str>,

    /// output file prefix (default: loom file name without
    /// `_pyscenic`)
    #[arg(long, short = 'p')]
    prefix: Option<Box<str>>,

    /// metadata column of cell types
    #[arg(long, short = 'c', default_value = DEFAULT_CELL_TYPE_COLUMN)]
    cell_type_column: Box<str>,

    /// also write `<prefix>_scenic_thresholds.csv`
    #[arg(long, default_value_t = false)]
    thresholds: bool,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

pub fn run_summarize_loom(args: SummarizeArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let loom = LoomFile::new(&*args.loom);
    let prefix = args.prefix.unwrap_or_else(|| default_prefix(&loom));

    let config = SummarizeConfig {
        loom,
        meta_file: args.meta,
        out_dir: PathBuf::from(&*args.out_dir),
        prefix,
        cell_type_column: args.cell_type_column,
        write_thresholds: args.thresholds,
    };

    let files = run_summarize(&config)?;
    info!("done: {}, {}, {}", files.auc, files.regulons, files.rss);
    Ok(())
}
