#![allow(dead_code)]

pub use log::{info, warn};

pub use matrix_util::traits::MatWithNames;

pub type Mat = nalgebra::DMatrix<f64>;
pub type CscMat = nalgebra_sparse::CscMatrix<f32>;

/// cells x regulons
pub type AucMatrix = MatWithNames<Mat>;
/// genes x regulons (membership)
pub type RegulonTable = MatWithNames<nalgebra::DMatrix<i64>>;
/// cell types x regulons
pub type RssMatrix = MatWithNames<Mat>;
