pub mod compound; // compound datasets with fields only known at run time
pub mod loom_io; // loom container writer
pub mod misc;
pub mod pipeline_meta; // base64 + zlib + json metadata blob
pub mod scenic_loom; // reading back a SCENIC-annotated loom
pub mod tenx_h5; // 10x Genomics filtered feature-barcode matrix
