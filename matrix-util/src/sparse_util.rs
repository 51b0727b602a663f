pub use nalgebra_sparse::{coo::CooMatrix, csc::CscMatrix};
use rayon::prelude::*;

/// Compressed sparse vectors as stored on disk, e.g., 10x `data`,
/// `indices` and `indptr` datasets
pub struct ValuesIndicesPointers<'a> {
    pub values: &'a [f32],
    pub indices: &'a [u64],
    pub indptr: &'a [u64],
}

impl ValuesIndicesPointers<'_> {
    /// Build a CSC matrix treating each pointer interval as a column.
    /// Indices need not be sorted; duplicate entries are summed up.
    ///
    /// * `nrows` - number of rows (indices must be below this)
    /// * `ncols` - number of columns (`indptr.len() == ncols + 1`)
    pub fn to_csc(&self, nrows: usize, ncols: usize) -> anyhow::Result<CscMatrix<f32>> {
        let nelem = self.values.len();

        if nelem != self.indices.len() {
            return Err(anyhow::anyhow!(
                "`values` and `indices` have different sizes: {} vs {}",
                nelem,
                self.indices.len()
            ));
        }

        if self.indptr.len() != ncols + 1 {
            return Err(anyhow::anyhow!(
                "`indptr` has {} elements for {} columns",
                self.indptr.len(),
                ncols
            ));
        }

        let mut coo = CooMatrix::<f32>::new(nrows, ncols);

        for (j, bounds) in self.indptr.windows(2).enumerate() {
            let (start, end) = (bounds[0] as usize, bounds[1] as usize);
            if start > end || end > nelem {
                return Err(anyhow::anyhow!(
                    "invalid pointer interval [{}, {}) at column {}",
                    start,
                    end,
                    j
                ));
            }
            for (&i, &x_ij) in self.indices[start..end]
                .iter()
                .zip(self.values[start..end].iter())
            {
                let i = i as usize;
                if i >= nrows {
                    return Err(anyhow::anyhow!(
                        "row index {} out of bound {} at column {}",
                        i,
                        nrows,
                        j
                    ));
                }
                coo.push(i, j, x_ij);
            }
        }

        Ok(CscMatrix::from(&coo))
    }
}

/// Per-column summary statistics of a sparse matrix
pub trait ColumnStatOps {
    /// number of non-zero elements in each column
    fn column_nnz(&self) -> Vec<usize>;

    /// sum of elements in each column
    fn column_sums(&self) -> Vec<f64>;
}

impl ColumnStatOps for CscMatrix<f32> {
    fn column_nnz(&self) -> Vec<usize> {
        (0..self.ncols())
            .into_par_iter()
            .map(|j| self.col(j).values().iter().filter(|&&x| x != 0.0).count())
            .collect()
    }

    fn column_sums(&self) -> Vec<f64> {
        (0..self.ncols())
            .into_par_iter()
            .map(|j| self.col(j).values().iter().map(|&x| x as f64).sum())
            .collect()
    }
}

/// Take columns of a CSC matrix in the given order (repetition allowed)
///
/// * `columns` - column indexes into `mat`
pub fn select_columns(mat: &CscMatrix<f32>, columns: &[usize]) -> anyhow::Result<CscMatrix<f32>> {
    let nnz: usize = columns
        .iter()
        .map(|&j| {
            if j < mat.ncols() {
                Ok(mat.col(j).nnz())
            } else {
                Err(anyhow::anyhow!("column {} out of bound {}", j, mat.ncols()))
            }
        })
        .sum::<anyhow::Result<usize>>()?;

    let mut offsets = Vec::with_capacity(columns.len() + 1);
    let mut row_indices = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);

    offsets.push(0);
    for &j in columns {
        let col = mat.col(j);
        row_indices.extend_from_slice(col.row_indices());
        values.extend_from_slice(col.values());
        offsets.push(row_indices.len());
    }

    CscMatrix::try_from_csc_data(mat.nrows(), columns.len(), offsets, row_indices, values)
        .map_err(|e| anyhow::anyhow!("failed to select columns: {}", e))
}

/// Stack CSC matrices side by side after mapping each one's rows onto
/// a shared row space. Rows mapped to `None` are dropped.
///
/// * `mats` - matrices with their row maps (`row_map[i]` for row `i`)
/// * `nrows` - number of rows in the shared space
pub fn hstack_with_row_maps(
    mats: &[(&CscMatrix<f32>, &[Option<usize>])],
    nrows: usize,
) -> anyhow::Result<CscMatrix<f32>> {
    let ncols: usize = mats.iter().map(|(m, _)| m.ncols()).sum();
    let nnz: usize = mats.iter().map(|(m, _)| m.nnz()).sum();

    let mut offsets = Vec::with_capacity(ncols + 1);
    let mut row_indices = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);
    let mut entries: Vec<(usize, f32)> = vec![];

    offsets.push(0);
    for (mat, row_map) in mats {
        if row_map.len() != mat.nrows() {
            return Err(anyhow::anyhow!(
                "row map of length {} for a matrix with {} rows",
                row_map.len(),
                mat.nrows()
            ));
        }
        for col in mat.col_iter() {
            entries.clear();
            entries.extend(
                col.row_indices()
                    .iter()
                    .zip(col.values())
                    .filter_map(|(&i, &x)| row_map[i].map(|ii| (ii, x))),
            );
            entries.sort_by_key(|&(ii, _)| ii);
            for &(ii, x) in entries.iter() {
                if ii >= nrows {
                    return Err(anyhow::anyhow!("mapped row {} out of bound {}", ii, nrows));
                }
                row_indices.push(ii);
                values.push(x);
            }
            offsets.push(row_indices.len());
        }
    }

    CscMatrix::try_from_csc_data(nrows, ncols, offsets, row_indices, values)
        .map_err(|e| anyhow::anyhow!("failed to stack columns: {}", e))
}
