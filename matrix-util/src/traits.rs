/// A matrix with names attached to its rows and columns
#[derive(Debug, Clone)]
pub struct MatWithNames<M> {
    pub rows: Vec<Box<str>>,
    pub cols: Vec<Box<str>>,
    pub mat: M,
}

/// How a value is spelled out in a csv cell
pub trait CsvValue {
    fn to_csv_field(&self) -> String;
}

/// Read and write named matrices from and to csv files. The first
/// column holds the row names, and the header holds the column names
/// after an empty index field.
pub trait CsvOps {
    type Mat;

    fn to_csv_with_names(&self, csv_file: &str) -> anyhow::Result<()>;

    fn from_csv_with_names(csv_file: &str) -> anyhow::Result<Self::Mat>;
}

macro_rules! impl_csv_value_float {
    ($($t:ty),*) => {
        $(impl CsvValue for $t {
            fn to_csv_field(&self) -> String {
                // `{:?}` keeps the trailing `.0` of integral floats
                format!("{:?}", self)
            }
        })*
    };
}

macro_rules! impl_csv_value_int {
    ($($t:ty),*) => {
        $(impl CsvValue for $t {
            fn to_csv_field(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_csv_value_float!(f32, f64);
impl_csv_value_int!(i32, i64, u32, u64, usize);
