use crate::common::*;
use fnv::FnvHashMap as HashMap;
use matrix_util::csv_table::CsvTable;
use matrix_util::membership::unique_in_order;

/// Cell metadata table: one row per cell, indexed by its cell ID
/// (barcode), with named columns such as `orig.ident` and `cluster`
#[derive(Debug, Clone)]
pub struct CellMetadata {
    table: CsvTable,
}

impl CellMetadata {
    pub fn read(meta_file: &str) -> anyhow::Result<Self> {
        let table = CsvTable::read(meta_file)?;
        if table.num_rows() == 0 {
            return Err(anyhow::anyhow!("no cells in {}", meta_file));
        }
        info!(
            "Read {} cells x {} columns of metadata from {}",
            table.num_rows(),
            table.columns.len(),
            meta_file
        );
        Ok(Self { table })
    }

    pub fn num_cells(&self) -> usize {
        self.table.num_rows()
    }

    pub fn cells(&self) -> &[Box<str>] {
        &self.table.index
    }

    pub fn column(&self, name: &str) -> anyhow::Result<Vec<Box<str>>> {
        self.table.column(name)
    }

    /// Unique values of a column in order of first appearance, e.g.,
    /// sample names in `orig.ident`
    pub fn unique_values(&self, name: &str) -> anyhow::Result<Vec<Box<str>>> {
        Ok(unique_in_order(&self.column(name)?))
    }

    /// Labels of the given cells taken from a column. Every cell must
    /// have a row; rows of other cells are ignored.
    /// * `cells` - cell IDs in the order of the output
    /// * `name` - label column, e.g., `cluster`
    pub fn labels_for(&self, cells: &[Box<str>], name: &str) -> anyhow::Result<Vec<Box<str>>> {
        let values = self.column(name)?;

        let mut cell_to_row: HashMap<&str, usize> = HashMap::default();
        for (i, c) in self.cells().iter().enumerate() {
            if cell_to_row.insert(&c[..], i).is_some() {
                return Err(anyhow::anyhow!("cell `{}` appears twice in the metadata", c));
            }
        }

        let mut missing = vec![];
        let mut labels = Vec::with_capacity(cells.len());
        for c in cells {
            match cell_to_row.get(&c[..]) {
                Some(&i) => labels.push(values[i].clone()),
                None => missing.push(&c[..]),
            }
        }

        if !missing.is_empty() {
            return Err(anyhow::anyhow!(
                "{} cell(s) have no metadata: {}",
                missing.len(),
                abbreviate(&missing, 10)
            ));
        }

        let nignored = self.num_cells().saturating_sub(cells.len());
        if nignored > 0 {
            info!("{} metadata rows with no matching cells ignored", nignored);
        }

        Ok(labels)
    }
}

/// `a, b, c ... (+n more)`
pub fn abbreviate(names: &[&str], max_shown: usize) -> String {
    let shown = names[..names.len().min(max_shown)].join(", ");
    if names.len() > max_shown {
        format!("{} ... (+{} more)", shown, names.len() - max_shown)
    } else {
        shown
    }
}
