use scenic_prep::assemble::run_assemble;
use scenic_prep::common::*;
use scenic_prep::config::*;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct AssembleArgs {
    /// cell barcodes to keep (first word of each line), in the order
    /// of the output columns
    #[arg(long, short = 'b', required = true)]
    barcodes: Box<str>,

    /// cell metadata csv (first column: cell barcode)
    #[arg(long, short = 'm', required = true)]
    meta: Box<str>,

    /// directory of `<library>_filtered.h5` files
    #[arg(long, short = 'i', required = true)]
    input_dir: Box<str>,

    /// output directory
    #[arg(long, short = 'o', required = true)]
    out_dir: Box<str>,

    /// library names (comma-separated) to be paired with the unique
    /// values of `--sample-column` in order of appearance
    #[arg(long, short = 'l', value_delimiter(','))]
    libraries: Vec<Box<str>>,

    /// explicit `library=sample` pairs (comma-separated)
    #[arg(long, short = 's', value_delimiter(','))]
    samples: Vec<Box<str>>,

    /// extra `from=to` substitutions (comma-separated) applied to
    /// sample names after `_` -> `-` to make cell ID prefixes
    #[arg(long, short = 'r', value_delimiter(','))]
    replace: Vec<Box<str>>,

    /// output loom file name
    #[arg(long, default_value = DEFAULT_LOOM_NAME)]
    loom_name: Box<str>,

    /// metadata column of sample names
    #[arg(long, default_value = DEFAULT_SAMPLE_COLUMN)]
    sample_column: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

impl AssembleArgs {
    fn to_config(&self) -> anyhow::Result<AssembleConfig> {
        let samples = match (self.samples.is_empty(), self.libraries.is_empty()) {
            (false, true) => SampleMapping::Explicit(parse_sample_specs(&self.samples)?),
            (true, false) => SampleMapping::Libraries(self.libraries.clone()),
            (false, false) => {
                return Err(anyhow::anyhow!(
                    "use either `--samples` or `--libraries`, not both"
                ));
            }
            (true, true) => {
                return Err(anyhow::anyhow!("need `--samples` or `--libraries`"));
            }
        };

        let mut substitutions = default_substitutions();
        substitutions.extend(parse_key_value_pairs(&self.replace, "substitution")?);

        Ok(AssembleConfig {
            barcode_file: self.barcodes.clone(),
            meta_file: self.meta.clone(),
            input_dir: PathBuf::from(&*self.input_dir),
            out_dir: PathBuf::from(&*self.out_dir),
            samples,
            substitutions,
            loom_name: self.loom_name.clone(),
            sample_column: self.sample_column.clone(),
        })
    }
}

pub fn run_assemble_loom(args: AssembleArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = args.to_config()?;
    let loom = run_assemble(&config)?;
    info!("done: {}", loom);
    Ok(())
}
