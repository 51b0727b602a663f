use crate::misc::*;
use hdf5::types::VarLenUnicode;
use hdf5::H5Type;
use log::info;
use matrix_util::common_io::{mkdir, remove_file};
use matrix_util::sparse_util::CscMatrix;
use matrix_util::utils::generate_minibatch_intervals;
use ndarray::{s, Array2};
use std::path::{Path, PathBuf};

pub const LOOM_SPEC_VERSION: &str = "3.0.0";

const CHUNK_SIZE: usize = 64;
const COLUMN_BLOCK_SIZE: usize = 512;
const COMPRESSION_LEVEL: u8 = 4;

/// A loom file on disk: the hand-over between matrix assembly, the
/// external regulon inference and the summary steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoomFile {
    path: PathBuf,
}

impl LoomFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_str(&self) -> anyhow::Result<&str> {
        self.path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non UTF-8 path: {:?}", self.path))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl std::fmt::Display for LoomFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Write a loom container (gene x cell)
///
/// ```text
/// (root)
///     ├── matrix       (gene x cell, float32)
///     ├── row_attrs    (one dataset per gene attribute)
///     ├── col_attrs    (one dataset per cell attribute)
///     ├── layers
///     ├── row_graphs
///     ├── col_graphs
///     └── attrs
///         └── LOOM_SPEC_VERSION
/// ```
pub struct LoomWriter {
    loom: LoomFile,
    backend: hdf5::File,
    shape: Option<(usize, usize)>,
}

impl LoomWriter {
    /// Create a new loom file; an existing file will be overwritten
    pub fn create(loom: &LoomFile) -> anyhow::Result<Self> {
        let file_name = loom.path_str()?;
        mkdir(file_name)?;

        if loom.exists() {
            info!("Removing existing loom file: {}", file_name);
            remove_file(file_name)?;
        }

        let backend = hdf5::File::create(file_name)?;

        for group in ["row_attrs", "col_attrs", "layers", "row_graphs", "col_graphs"] {
            backend.create_group(group)?;
        }

        let version: VarLenUnicode = LOOM_SPEC_VERSION
            .parse()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        backend
            .create_group("attrs")?
            .new_dataset::<VarLenUnicode>()
            .shape(())
            .create("LOOM_SPEC_VERSION")?
            .write_scalar(&version)?;

        // loom 2 readers look for a root attribute
        backend
            .new_attr::<VarLenUnicode>()
            .create("LOOM_SPEC_VERSION")?
            .write_scalar(&version)?;

        Ok(Self {
            loom: loom.clone(),
            backend,
            shape: None,
        })
    }

    /// Write the main matrix block by block of columns
    /// * `counts` - gene x cell sparse matrix
    pub fn write_matrix(&mut self, counts: &CscMatrix<f32>) -> anyhow::Result<()> {
        let (nrows, ncols) = (counts.nrows(), counts.ncols());

        let builder = self.backend.new_dataset::<f32>().shape((nrows, ncols));

        let matrix = if nrows > 0 && ncols > 0 {
            builder
                .chunk((nrows.min(CHUNK_SIZE), ncols.min(CHUNK_SIZE)))
                .deflate(COMPRESSION_LEVEL)
                .create("matrix")?
        } else {
            builder.create("matrix")?
        };

        for (lb, ub) in generate_minibatch_intervals(ncols, COLUMN_BLOCK_SIZE) {
            let mut block = Array2::<f32>::zeros((nrows, ub - lb));
            for (jj, j) in (lb..ub).enumerate() {
                let col = counts.col(j);
                for (&i, &x_ij) in col.row_indices().iter().zip(col.values()) {
                    block[(i, jj)] = x_ij;
                }
            }
            matrix.write_slice(&block, s![.., lb..ub])?;
        }

        self.backend.flush()?;
        self.shape = Some((nrows, ncols));

        info!(
            "{}: wrote {} x {} matrix with {} non-zeros",
            self.loom,
            nrows,
            ncols,
            counts.nnz()
        );
        Ok(())
    }

    fn check_length(&self, key: &str, n: usize, axis: usize) -> anyhow::Result<()> {
        let (nrows, ncols) = self
            .shape
            .ok_or_else(|| anyhow::anyhow!("write the matrix before `{}`", key))?;
        let expected = if axis == 0 { nrows } else { ncols };
        if n != expected {
            return Err(anyhow::anyhow!(
                "`{}` has {} elements, but the matrix has {} along axis {}",
                key,
                n,
                expected,
                axis
            ));
        }
        Ok(())
    }

    fn write_strings(&self, group: &str, key: &str, names: &[Box<str>]) -> anyhow::Result<()> {
        let names = to_var_len_unicode(names)?;
        self.backend
            .group(group)?
            .new_dataset::<VarLenUnicode>()
            .shape(names.len())
            .create(key)?
            .write(&names)?;
        Ok(())
    }

    fn write_numbers<T: H5Type>(&self, group: &str, key: &str, values: &[T]) -> anyhow::Result<()> {
        self.backend
            .group(group)?
            .new_dataset::<T>()
            .shape(values.len())
            .create(key)?
            .write(values)?;
        Ok(())
    }

    /// Add a gene attribute of strings, e.g., `Gene`
    pub fn write_row_attr_strings(&mut self, key: &str, names: &[Box<str>]) -> anyhow::Result<()> {
        self.check_length(key, names.len(), 0)?;
        self.write_strings("row_attrs", key, names)
    }

    /// Add a cell attribute of strings, e.g., `CellID`
    pub fn write_col_attr_strings(&mut self, key: &str, names: &[Box<str>]) -> anyhow::Result<()> {
        self.check_length(key, names.len(), 1)?;
        self.write_strings("col_attrs", key, names)
    }

    /// Add a numeric cell attribute, e.g., `nUMI`
    pub fn write_col_attr_numbers<T: H5Type>(
        &mut self,
        key: &str,
        values: &[T],
    ) -> anyhow::Result<()> {
        self.check_length(key, values.len(), 1)?;
        self.write_numbers("col_attrs", key, values)
    }

    /// Flush everything and hand over the file
    pub fn finish(self) -> anyhow::Result<LoomFile> {
        self.backend.flush()?;
        info!("created loom file: {}", self.loom);
        Ok(self.loom)
    }
}
