use loom_beans::loom_io::LoomFile;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOOM_NAME: &str = "scenic_input.loom";
pub const DEFAULT_SAMPLE_COLUMN: &str = "orig.ident";
pub const DEFAULT_CELL_TYPE_COLUMN: &str = "cluster";

const SAMPLE_FILE_SUFFIX: &str = "_filtered.h5";

/// One sequencing library and the sample name its cells are given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSpec {
    pub library: Box<str>,
    pub sample: Box<str>,
}

/// How libraries are mapped to sample names
#[derive(Debug, Clone)]
pub enum SampleMapping {
    /// `library=sample` pairs
    Explicit(Vec<SampleSpec>),
    /// libraries to be zipped with the unique sample names of the
    /// metadata table (in order of appearance)
    Libraries(Vec<Box<str>>),
}

/// Everything the matrix assembly needs
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// whitelist of cell IDs (first word of each line)
    pub barcode_file: Box<str>,
    /// metadata csv with cells in rows
    pub meta_file: Box<str>,
    /// where `<library>_filtered.h5` files are found
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
    pub samples: SampleMapping,
    /// substitutions applied to a sample name to make a cell ID prefix,
    /// in this order
    pub substitutions: Vec<(Box<str>, Box<str>)>,
    pub loom_name: Box<str>,
    pub sample_column: Box<str>,
}

impl AssembleConfig {
    pub fn sample_file(&self, library: &str) -> PathBuf {
        self.input_dir
            .join(format!("{}{}", library, SAMPLE_FILE_SUFFIX))
    }

    pub fn loom_file(&self) -> LoomFile {
        LoomFile::new(self.out_dir.join(&*self.loom_name))
    }

    /// `<prefix>_<barcode>` where the prefix is the rewritten sample name
    pub fn cell_id(&self, sample: &str, barcode: &str) -> Box<str> {
        let prefix = self
            .substitutions
            .iter()
            .fold(sample.to_string(), |acc, (from, to)| {
                acc.replace(&**from, to)
            });
        format!("{}_{}", prefix, barcode).into_boxed_str()
    }
}

/// `_` in a sample name becomes `-` before any configured substitution
pub fn default_substitutions() -> Vec<(Box<str>, Box<str>)> {
    vec![(Box::from("_"), Box::from("-"))]
}

/// Everything the regulon summary needs
#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    /// loom file annotated by regulon inference
    pub loom: LoomFile,
    pub meta_file: Box<str>,
    pub out_dir: PathBuf,
    /// output file name prefix
    pub prefix: Box<str>,
    pub cell_type_column: Box<str>,
    /// also export the regulon thresholds
    pub write_thresholds: bool,
}

impl SummarizeConfig {
    /// `<out_dir>/<prefix>_<name>.csv`
    pub fn output_file(&self, name: &str) -> anyhow::Result<Box<str>> {
        path_to_str(&self.out_dir.join(format!("{}_{}.csv", self.prefix, name)))
    }
}

/// Take a prefix from the loom file name, e.g., `HT280` for
/// `HT280_pyscenic.loom`
pub fn default_prefix(loom: &LoomFile) -> Box<str> {
    let stem = loom
        .path()
        .file_stem()
        .and_then(|x| x.to_str())
        .unwrap_or("scenic");
    let stem = stem.strip_suffix("_pyscenic").unwrap_or(stem);
    Box::from(stem)
}

/// Recompute specificity scores from csv files
#[derive(Debug, Clone)]
pub struct RssConfig {
    /// cells x regulons csv
    pub auc_file: Box<str>,
    pub meta_file: Box<str>,
    pub out_file: Box<str>,
    pub cell_type_column: Box<str>,
}

/// Parse `key=value` items
/// * `items` - e.g., `["AO22_HT280=HT280_1", ...]`
/// * `what` - what the items are, for error messages
pub fn parse_key_value_pairs(
    items: &[Box<str>],
    what: &str,
) -> anyhow::Result<Vec<(Box<str>, Box<str>)>> {
    items
        .iter()
        .map(|item| {
            let (key, value) = item
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("{} `{}` should look like `a=b`", what, item))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow::anyhow!("{} `{}` has an empty left side", what, item));
            }
            Ok((Box::from(key), Box::from(value.trim())))
        })
        .collect()
}

pub fn parse_sample_specs(items: &[Box<str>]) -> anyhow::Result<Vec<SampleSpec>> {
    Ok(parse_key_value_pairs(items, "sample")?
        .into_iter()
        .map(|(library, sample)| SampleSpec { library, sample })
        .collect())
}

pub fn path_to_str(path: &Path) -> anyhow::Result<Box<str>> {
    path.to_str()
        .map(Box::from)
        .ok_or_else(|| anyhow::anyhow!("non UTF-8 path: {:?}", path))
}
