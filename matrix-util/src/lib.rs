pub mod common_io; // line-oriented text I/O (gzipped or not)
pub mod csv_table; // named tables to and from csv files
pub mod membership; // group labels and indicator vectors
pub mod sparse_util; // CSC matrix construction and column statistics
pub mod traits;
pub mod utils;
