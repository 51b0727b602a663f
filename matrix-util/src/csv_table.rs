use crate::common_io::{mkdir, open_buf_reader, open_buf_writer};
use crate::traits::*;
pub use nalgebra::DMatrix;

use std::fmt::Debug;
use std::str::FromStr;

/// A csv table of strings indexed by its first column
///
/// Both header conventions are accepted: pandas writes an (often
/// empty) index name in the first header field, while R's
/// `write.csv(row.names=TRUE)` may leave it out altogether.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub columns: Vec<Box<str>>,
    pub index: Vec<Box<str>>,
    pub records: Vec<Vec<Box<str>>>,
}

impl CsvTable {
    /// Read a csv file (gzipped or not) with a header line
    pub fn read(csv_file: &str) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(open_buf_reader(csv_file)?);

        let header: Vec<Box<str>> = rdr.headers()?.iter().map(Box::from).collect();

        let mut columns: Option<Vec<Box<str>>> = None;
        let mut index = vec![];
        let mut records = vec![];

        for (line, rec) in rdr.records().enumerate() {
            let rec = rec?;
            if rec.is_empty() || (rec.len() == 1 && rec[0].trim().is_empty()) {
                continue;
            }

            let ncol = rec.len() - 1;
            let expected = columns.get_or_insert_with(|| {
                if header.len() == rec.len() {
                    header[1..].to_vec()
                } else {
                    header.clone()
                }
            });

            if expected.len() != ncol {
                return Err(anyhow::anyhow!(
                    "{}: line {} has {} fields, but the header expects {}",
                    csv_file,
                    line + 2,
                    rec.len(),
                    expected.len() + 1
                ));
            }

            index.push(Box::from(&rec[0]));
            records.push(rec.iter().skip(1).map(Box::from).collect());
        }

        let columns = match columns {
            Some(columns) => columns,
            None => header.into_iter().skip(1).collect(),
        };

        Ok(Self {
            columns,
            index,
            records,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    /// Position of a named column (index column excluded)
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|x| &**x == name)
    }

    /// Take out a named column
    pub fn column(&self, name: &str) -> anyhow::Result<Vec<Box<str>>> {
        let j = self.column_position(name).ok_or_else(|| {
            anyhow::anyhow!(
                "column `{}` not found among [{}]",
                name,
                self.columns.join(", ")
            )
        })?;
        Ok(self.records.iter().map(|rec| rec[j].clone()).collect())
    }
}

impl<T> CsvOps for MatWithNames<DMatrix<T>>
where
    T: nalgebra::Scalar + CsvValue + FromStr + Copy,
    <T as FromStr>::Err: Debug,
{
    type Mat = Self;

    fn to_csv_with_names(&self, csv_file: &str) -> anyhow::Result<()> {
        let (nrows, ncols) = self.mat.shape();

        if self.rows.len() != nrows || self.cols.len() != ncols {
            return Err(anyhow::anyhow!(
                "names ({} x {}) don't match the matrix ({} x {})",
                self.rows.len(),
                self.cols.len(),
                nrows,
                ncols
            ));
        }

        mkdir(csv_file)?;
        let mut wtr = csv::Writer::from_writer(open_buf_writer(csv_file)?);

        wtr.write_record(std::iter::once("").chain(self.cols.iter().map(|x| &**x)))?;

        for (i, row_name) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(ncols + 1);
            record.push(row_name.to_string());
            record.extend((0..ncols).map(|j| self.mat[(i, j)].to_csv_field()));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn from_csv_with_names(csv_file: &str) -> anyhow::Result<Self> {
        let CsvTable {
            columns,
            index,
            records,
        } = CsvTable::read(csv_file)?;

        let nrows = index.len();
        let ncols = columns.len();

        let mut data = Vec::with_capacity(nrows * ncols);
        for (i, rec) in records.iter().enumerate() {
            for (j, x) in rec.iter().enumerate() {
                let x = x.trim().parse::<T>().map_err(|e| {
                    anyhow::anyhow!(
                        "{}: failed to parse `{}` at ({}, {}): {:?}",
                        csv_file,
                        x,
                        index[i],
                        columns[j],
                        e
                    )
                })?;
                data.push(x);
            }
        }

        Ok(MatWithNames {
            rows: index,
            cols: columns,
            mat: DMatrix::<T>::from_row_iterator(nrows, ncols, data),
        })
    }
}

impl<T> MatWithNames<DMatrix<T>>
where
    T: nalgebra::Scalar,
{
    /// Swap rows and columns along with their names
    pub fn transpose(&self) -> Self {
        MatWithNames {
            rows: self.cols.clone(),
            cols: self.rows.clone(),
            mat: self.mat.transpose(),
        }
    }
}
