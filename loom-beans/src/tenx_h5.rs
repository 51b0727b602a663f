use crate::misc::*;
use log::info;
use matrix_util::sparse_util::*;

/// A feature-barcode count matrix of one sample (gene x cell)
#[derive(Debug, Clone)]
pub struct SampleMatrix {
    pub genes: Vec<Box<str>>,
    pub barcodes: Vec<Box<str>>,
    pub counts: CscMatrix<f32>,
}

/// Read a 10x Genomics (Cell Ranger / CellBender) `.h5` matrix.
///
/// ```text
/// (v3)                          (v2)
/// matrix                        <genome>
///  ├── data                      ├── data
///  ├── indices (gene index)      ├── indices
///  ├── indptr  (cell pointers)   ├── indptr
///  ├── shape                     ├── shape
///  ├── barcodes                  ├── barcodes
///  └── features                  ├── genes
///       ├── id                   └── gene_names
///       ├── name
///       └── feature_type
/// ```
///
/// Gene symbols are used as gene names and only `Gene Expression`
/// features are kept when feature types are recorded.
pub fn read_10x_h5(h5_file: &str) -> anyhow::Result<SampleMatrix> {
    let file = hdf5::File::open(h5_file)?;
    info!("Opened 10X H5 file: {}", h5_file);

    let root = if file.link_exists("matrix") {
        file.group("matrix")?
    } else {
        let genome = file
            .member_names()?
            .into_iter()
            .find(|name| {
                file.group(name)
                    .map(|g| g.link_exists("indptr"))
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow::anyhow!("no count matrix group found in {}", h5_file))?;
        info!("legacy 10x layout under `{}`", genome);
        file.group(&genome)?
    };

    let values = root
        .dataset("data")
        .map_err(|_| anyhow::anyhow!("missing 'data' dataset in {}", h5_file))?
        .read_1d::<f32>()?
        .to_vec();
    let indices = root
        .dataset("indices")
        .map_err(|_| anyhow::anyhow!("missing 'indices' dataset in {}", h5_file))?
        .read_1d::<u64>()?
        .to_vec();
    let indptr = root
        .dataset("indptr")
        .map_err(|_| anyhow::anyhow!("missing 'indptr' dataset in {}", h5_file))?
        .read_1d::<u64>()?
        .to_vec();

    let barcodes = read_hdf5_strings(
        root.dataset("barcodes")
            .map_err(|_| anyhow::anyhow!("missing 'barcodes' dataset in {}", h5_file))?,
    )?;

    let (genes, gene_types) = if root.link_exists("features") {
        let features = root.group("features")?;
        let names = read_hdf5_strings(features.dataset("name")?)?;
        let types = match features.dataset("feature_type") {
            Ok(types) => Some(read_hdf5_strings(types)?),
            _ => None,
        };
        (names, types)
    } else if root.link_exists("gene_names") {
        (read_hdf5_strings(root.dataset("gene_names")?)?, None)
    } else {
        (read_hdf5_strings(root.dataset("genes")?)?, None)
    };

    let (nrows, ncols) = match root.dataset("shape") {
        Ok(shape) => {
            let shape = shape.read_1d::<u64>()?.to_vec();
            if shape.len() != 2 {
                return Err(anyhow::anyhow!("invalid shape {:?} in {}", shape, h5_file));
            }
            (shape[0] as usize, shape[1] as usize)
        }
        _ => (genes.len(), indptr.len().saturating_sub(1)),
    };

    if genes.len() != nrows || barcodes.len() != ncols {
        return Err(anyhow::anyhow!(
            "{}: {} genes and {} barcodes for a {} x {} matrix",
            h5_file,
            genes.len(),
            barcodes.len(),
            nrows,
            ncols
        ));
    }

    let counts = ValuesIndicesPointers {
        values: &values,
        indices: &indices,
        indptr: &indptr,
    }
    .to_csc(nrows, ncols)?;

    info!(
        "Read {} non-zero elements in {} x {}",
        counts.nnz(),
        nrows,
        ncols
    );

    let ret = SampleMatrix {
        genes,
        barcodes,
        counts,
    };

    match gene_types {
        Some(types) => ret.retain_gene_expression(&types),
        None => Ok(ret),
    }
}

impl SampleMatrix {
    fn retain_gene_expression(self, gene_types: &[Box<str>]) -> anyhow::Result<Self> {
        let select_pattern = "gene expression";

        let keep: Vec<bool> = gene_types
            .iter()
            .map(|x| x.to_lowercase().contains(select_pattern))
            .collect();

        let nkeep = keep.iter().filter(|&&k| k).count();
        if nkeep == self.genes.len() {
            return Ok(self);
        }

        info!(
            "Filtering features: {} -> {} rows of gene expression type",
            self.genes.len(),
            nkeep
        );

        let mut row_map = vec![None; self.genes.len()];
        let mut genes = Vec::with_capacity(nkeep);
        for (i, &k) in keep.iter().enumerate() {
            if k {
                row_map[i] = Some(genes.len());
                genes.push(self.genes[i].clone());
            }
        }

        let counts = hstack_with_row_maps(&[(&self.counts, &row_map[..])], nkeep)?;

        Ok(SampleMatrix {
            genes,
            barcodes: self.barcodes,
            counts,
        })
    }
}

/// Write a sample matrix in the 10x v3 layout (`matrix/...`).
///
/// * `h5_file` - output file (overwritten)
/// * `sample` - gene x cell counts with names
/// * `feature_types` - per-gene types; all `Gene Expression` if `None`
pub fn write_10x_h5(
    h5_file: &str,
    sample: &SampleMatrix,
    feature_types: Option<&[Box<str>]>,
) -> anyhow::Result<()> {
    let counts = &sample.counts;
    let (nrows, ncols) = (counts.nrows(), counts.ncols());

    if sample.genes.len() != nrows || sample.barcodes.len() != ncols {
        return Err(anyhow::anyhow!(
            "{} genes and {} barcodes for a {} x {} matrix",
            sample.genes.len(),
            sample.barcodes.len(),
            nrows,
            ncols
        ));
    }

    let default_types = vec![Box::<str>::from("Gene Expression"); nrows];
    let feature_types = feature_types.unwrap_or(&default_types);

    let file = hdf5::File::create(h5_file)?;
    let root = file.create_group("matrix")?;

    let indices: Vec<i64> = counts.row_indices().iter().map(|&i| i as i64).collect();
    let indptr: Vec<i64> = counts.col_offsets().iter().map(|&p| p as i64).collect();
    let shape: Vec<i32> = vec![nrows as i32, ncols as i32];

    root.new_dataset::<f32>()
        .shape(counts.nnz())
        .create("data")?
        .write(counts.values())?;
    root.new_dataset::<i64>()
        .shape(indices.len())
        .create("indices")?
        .write(&indices)?;
    root.new_dataset::<i64>()
        .shape(indptr.len())
        .create("indptr")?
        .write(&indptr)?;
    root.new_dataset::<i32>()
        .shape(2)
        .create("shape")?
        .write(&shape)?;

    let barcodes = to_var_len_unicode(&sample.barcodes)?;
    root.new_dataset::<hdf5::types::VarLenUnicode>()
        .shape(barcodes.len())
        .create("barcodes")?
        .write(&barcodes)?;

    let features = root.create_group("features")?;
    for (key, names) in [
        ("id", &sample.genes[..]),
        ("name", &sample.genes[..]),
        ("feature_type", feature_types),
    ] {
        let names = to_var_len_unicode(names)?;
        features
            .new_dataset::<hdf5::types::VarLenUnicode>()
            .shape(names.len())
            .create(key)?
            .write(&names)?;
    }

    file.flush()?;
    info!("wrote {} x {} matrix to {}", nrows, ncols, h5_file);
    Ok(())
}
