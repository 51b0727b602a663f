use crate::cell_meta::*;
use crate::common::*;
use crate::config::*;

use fnv::FnvHashMap as HashMap;
use fnv::FnvHashSet as HashSet;
use loom_beans::loom_io::{LoomFile, LoomWriter};
use loom_beans::tenx_h5::{read_10x_h5, SampleMatrix};
use matrix_util::common_io::read_first_words;
use matrix_util::sparse_util::*;
use matrix_util::utils::make_names_unique;

/// Gene x cell counts of one or more samples
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    pub genes: Vec<Box<str>>,
    pub cells: Vec<Box<str>>,
    /// sample name of each cell
    pub samples: Vec<Box<str>>,
    pub counts: CscMat,
}

impl ExpressionMatrix {
    /// Tag the cells of a 10x matrix with the sample name: cell IDs
    /// become `<prefix>_<barcode>` and repeated gene names get `-1`,
    /// `-2`, ... suffixes.
    pub fn from_sample(sample: &str, data: SampleMatrix, config: &AssembleConfig) -> Self {
        let cells = data
            .barcodes
            .iter()
            .map(|b| config.cell_id(sample, b))
            .collect::<Vec<_>>();

        ExpressionMatrix {
            genes: make_names_unique(&data.genes, "-"),
            samples: vec![Box::from(sample); cells.len()],
            cells,
            counts: data.counts,
        }
    }

    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Stack samples side by side, keeping the genes shared by all of
    /// them in the gene order of the first one.
    pub fn concatenate(parts: &[ExpressionMatrix]) -> anyhow::Result<Self> {
        let first = parts
            .first()
            .ok_or_else(|| anyhow::anyhow!("nothing to concatenate"))?;

        let mut shared: HashSet<&str> = first.genes.iter().map(|g| &g[..]).collect();
        for part in parts.iter().skip(1) {
            let genes: HashSet<&str> = part.genes.iter().map(|g| &g[..]).collect();
            shared.retain(|g| genes.contains(g));
        }

        let genes: Vec<Box<str>> = first
            .genes
            .iter()
            .filter(|g| shared.contains(&g[..]))
            .cloned()
            .collect();

        if genes.len() < first.num_genes() {
            info!(
                "{} genes shared by {} samples ({} in the first)",
                genes.len(),
                parts.len(),
                first.num_genes()
            );
        }

        let gene_position: HashMap<&str, usize> = genes
            .iter()
            .enumerate()
            .map(|(i, g)| (&g[..], i))
            .collect();

        let row_maps: Vec<Vec<Option<usize>>> = parts
            .iter()
            .map(|part| {
                part.genes
                    .iter()
                    .map(|g| gene_position.get(&g[..]).copied())
                    .collect()
            })
            .collect();

        let mats: Vec<(&CscMat, &[Option<usize>])> = parts
            .iter()
            .zip(row_maps.iter())
            .map(|(part, row_map)| (&part.counts, row_map.as_slice()))
            .collect();

        let counts = hstack_with_row_maps(&mats, genes.len())?;

        Ok(ExpressionMatrix {
            genes,
            cells: parts.iter().flat_map(|p| p.cells.iter().cloned()).collect(),
            samples: parts.iter().flat_map(|p| p.samples.iter().cloned()).collect(),
            counts,
        })
    }

    /// Take exactly the listed cells in the listed order. Listed cells
    /// that are missing, listed twice or found more than once are
    /// errors.
    pub fn select_cells(&self, whitelist: &[Box<str>]) -> anyhow::Result<Self> {
        if whitelist.is_empty() {
            return Err(anyhow::anyhow!("empty cell barcode list"));
        }

        let mut cell_to_col: HashMap<&str, usize> = HashMap::default();
        let mut ambiguous: HashSet<&str> = HashSet::default();
        for (j, c) in self.cells.iter().enumerate() {
            if cell_to_col.insert(&c[..], j).is_some() {
                ambiguous.insert(&c[..]);
            }
        }

        let mut listed: HashSet<&str> = HashSet::default();
        let mut repeated = vec![];
        let mut missing = vec![];
        let mut found_twice = vec![];
        let mut columns = Vec::with_capacity(whitelist.len());

        for c in whitelist.iter().map(|c| &c[..]) {
            if !listed.insert(c) {
                repeated.push(c);
            } else if ambiguous.contains(c) {
                found_twice.push(c);
            } else if let Some(&j) = cell_to_col.get(c) {
                columns.push(j);
            } else {
                missing.push(c);
            }
        }

        if !missing.is_empty() {
            return Err(anyhow::anyhow!(
                "{} of {} listed barcodes not found in the assembled matrix: {}",
                missing.len(),
                whitelist.len(),
                abbreviate(&missing, 10)
            ));
        }

        if !repeated.is_empty() {
            return Err(anyhow::anyhow!(
                "{} barcodes listed more than once: {}",
                repeated.len(),
                abbreviate(&repeated, 10)
            ));
        }

        if !found_twice.is_empty() {
            return Err(anyhow::anyhow!(
                "{} listed barcodes match more than one cell: {}",
                found_twice.len(),
                abbreviate(&found_twice, 10)
            ));
        }

        Ok(ExpressionMatrix {
            genes: self.genes.clone(),
            cells: columns.iter().map(|&j| self.cells[j].clone()).collect(),
            samples: columns.iter().map(|&j| self.samples[j].clone()).collect(),
            counts: select_columns(&self.counts, &columns)?,
        })
    }

    /// number of expressed genes in each cell
    pub fn genes_per_cell(&self) -> Vec<u32> {
        self.counts
            .column_nnz()
            .into_iter()
            .map(|n| n as u32)
            .collect()
    }

    /// total count of each cell
    pub fn umi_per_cell(&self) -> Vec<f32> {
        self.counts
            .column_sums()
            .into_iter()
            .map(|s| s as f32)
            .collect()
    }

    /// Write a loom file with `Gene`, `CellID`, `sample`, `nGene` and
    /// `nUMI` attributes
    pub fn to_loom(&self, loom: &LoomFile) -> anyhow::Result<LoomFile> {
        let mut writer = LoomWriter::create(loom)?;
        writer.write_matrix(&self.counts)?;
        writer.write_row_attr_strings("Gene", &self.genes)?;
        writer.write_col_attr_strings("CellID", &self.cells)?;
        writer.write_col_attr_strings("sample", &self.samples)?;
        writer.write_col_attr_numbers("nGene", &self.genes_per_cell())?;
        writer.write_col_attr_numbers("nUMI", &self.umi_per_cell())?;
        writer.finish()
    }
}

/// Pair libraries with sample names. Without explicit pairs, the
/// libraries are zipped with the unique values of the sample column.
pub fn resolve_samples(
    config: &AssembleConfig,
    meta: &CellMetadata,
) -> anyhow::Result<Vec<SampleSpec>> {
    let ret = match &config.samples {
        SampleMapping::Explicit(specs) => specs.clone(),
        SampleMapping::Libraries(libraries) => {
            let samples = meta.unique_values(&config.sample_column)?;
            if samples.len() != libraries.len() {
                return Err(anyhow::anyhow!(
                    "{} libraries but {} samples in `{}`: [{}]",
                    libraries.len(),
                    samples.len(),
                    config.sample_column,
                    samples.join(", ")
                ));
            }
            libraries
                .iter()
                .zip(samples)
                .map(|(library, sample)| SampleSpec {
                    library: library.clone(),
                    sample,
                })
                .collect()
        }
    };

    if ret.is_empty() {
        return Err(anyhow::anyhow!("no samples to assemble"));
    }

    for s in ret.iter() {
        info!("library {} -> sample {}", s.library, s.sample);
    }
    Ok(ret)
}

/// Read every sample's `<library>_filtered.h5`; missing files are
/// skipped.
pub fn read_samples(
    config: &AssembleConfig,
    specs: &[SampleSpec],
) -> anyhow::Result<Vec<ExpressionMatrix>> {
    let mut parts = vec![];
    for spec in specs {
        let h5_file = config.sample_file(&spec.library);
        if !h5_file.is_file() {
            warn!("skipping {}: no such file", h5_file.display());
            continue;
        }
        let data = read_10x_h5(&path_to_str(&h5_file)?)?;
        parts.push(ExpressionMatrix::from_sample(&spec.sample, data, config));
    }

    if parts.is_empty() {
        return Err(anyhow::anyhow!(
            "none of the {} sample files found in {}",
            specs.len(),
            config.input_dir.display()
        ));
    }
    Ok(parts)
}

/// Assemble per-sample 10x matrices into one loom file of the listed
/// cells
pub fn run_assemble(config: &AssembleConfig) -> anyhow::Result<LoomFile> {
    let whitelist = read_first_words(&config.barcode_file)?;
    info!("{} barcodes in {}", whitelist.len(), config.barcode_file);

    let meta = CellMetadata::read(&config.meta_file)?;
    let specs = resolve_samples(config, &meta)?;

    let parts = read_samples(config, &specs)?;
    let merged = ExpressionMatrix::concatenate(&parts)?;
    info!(
        "assembled {} genes x {} cells from {} samples",
        merged.num_genes(),
        merged.num_cells(),
        parts.len()
    );

    let selected = merged.select_cells(&whitelist)?;
    selected.to_loom(&config.loom_file())
}
