pub mod assemble; // 10x matrices -> one loom file
pub mod cell_meta; // per-cell metadata table
pub mod common;
pub mod config; // run configurations
pub mod regulon_names;
pub mod rss; // regulon specificity scores
pub mod summarize; // annotated loom -> csv tables
