use crate::cell_meta::*;
use crate::common::*;
use crate::config::*;
use crate::regulon_names::*;
use crate::rss::*;

use fnv::FnvHashSet as HashSet;
use loom_beans::compound::CompoundColumns;
use loom_beans::pipeline_meta::RegulonThreshold;
use loom_beans::scenic_loom::read_scenic_loom;
use matrix_util::common_io::{mkdir, open_buf_writer};
use matrix_util::traits::{CsvOps, CsvValue};

/// Files written by [`run_summarize`]
#[derive(Debug, Clone)]
pub struct SummaryFiles {
    pub auc: Box<str>,
    pub regulons: Box<str>,
    pub rss: Box<str>,
    pub thresholds: Option<Box<str>>,
}

/// cells x regulons
pub fn auc_matrix(cell_ids: &[Box<str>], auc: &CompoundColumns) -> AucMatrix {
    let mat = Mat::from_fn(auc.num_records, auc.names.len(), |i, j| auc.values[j][i]);
    MatWithNames {
        rows: cell_ids.to_vec(),
        cols: normalize_regulon_names(&auc.names),
        mat,
    }
}

/// genes x regulons with 0-based row numbers as row names
pub fn regulon_table(regulons: &CompoundColumns) -> RegulonTable {
    let mat = nalgebra::DMatrix::<i64>::from_fn(regulons.num_records, regulons.names.len(), |i, j| {
        regulons.values[j][i].round() as i64
    });
    MatWithNames {
        rows: (0..regulons.num_records)
            .map(|i| i.to_string().into_boxed_str())
            .collect(),
        cols: normalize_regulon_names(&regulons.names),
        mat,
    }
}

/// Write `regulon,defaultThresholdName,defaultThresholdValue` rows
pub fn write_thresholds(thresholds: &[RegulonThreshold], csv_file: &str) -> anyhow::Result<()> {
    mkdir(csv_file)?;
    let mut wtr = csv::Writer::from_writer(open_buf_writer(csv_file)?);
    wtr.write_record(["regulon", "defaultThresholdName", "defaultThresholdValue"])?;
    for t in thresholds {
        let name = t.default_threshold_name.clone().unwrap_or_default();
        let value = t
            .default_threshold_value
            .map(|v| v.to_csv_field())
            .unwrap_or_default();
        wtr.write_record([t.regulon.as_str(), name.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export regulon inference results as csv tables and score how
/// specific each regulon is to each cell type
pub fn run_summarize(config: &SummarizeConfig) -> anyhow::Result<SummaryFiles> {
    let mut data = read_scenic_loom(&config.loom)?;

    let auc = auc_matrix(&data.cell_ids, &data.auc);
    let regulons = regulon_table(&data.regulons);

    for t in data.metadata.regulon_thresholds.iter_mut() {
        t.regulon = normalize_regulon_name(&t.regulon).to_string();
    }

    {
        let known: HashSet<&str> = auc.cols.iter().map(|x| &x[..]).collect();
        let unknown = data
            .metadata
            .regulon_thresholds
            .iter()
            .filter(|t| !known.contains(t.regulon.as_str()))
            .count();
        if unknown > 0 {
            warn!("{} regulon thresholds without AUC scores", unknown);
        }
    }

    // no file is written until the scores are computed
    let meta = CellMetadata::read(&config.meta_file)?;
    let labels = meta.labels_for(&auc.rows, &config.cell_type_column)?;
    let type_order = meta.unique_values(&config.cell_type_column)?;
    let rss = regulon_specificity_scores_ordered(&auc, &labels, &type_order)?;

    let files = SummaryFiles {
        auc: config.output_file("scenic_AUC")?,
        regulons: config.output_file("scenic_regulons")?,
        rss: config.output_file("regulon_specificity_scores")?,
        thresholds: if config.write_thresholds {
            Some(config.output_file("scenic_thresholds")?)
        } else {
            None
        },
    };

    auc.to_csv_with_names(&files.auc)?;
    info!("wrote {}", files.auc);

    regulons.to_csv_with_names(&files.regulons)?;
    info!("wrote {}", files.regulons);

    if let Some(thresholds_file) = files.thresholds.as_ref() {
        write_thresholds(&data.metadata.regulon_thresholds, thresholds_file)?;
        info!("wrote {}", thresholds_file);
    }

    rss.transpose().to_csv_with_names(&files.rss)?;
    info!("wrote {}", files.rss);

    Ok(files)
}

/// Score regulon specificity from an AUC csv file (cells x regulons)
pub fn run_rss_from_csv(config: &RssConfig) -> anyhow::Result<RssMatrix> {
    let auc = AucMatrix::from_csv_with_names(&config.auc_file)?;
    info!(
        "Read {} cells x {} regulons from {}",
        auc.mat.nrows(),
        auc.mat.ncols(),
        config.auc_file
    );

    let meta = CellMetadata::read(&config.meta_file)?;
    let labels = meta.labels_for(&auc.rows, &config.cell_type_column)?;
    let type_order = meta.unique_values(&config.cell_type_column)?;

    let rss = regulon_specificity_scores_ordered(&auc, &labels, &type_order)?;
    rss.transpose().to_csv_with_names(&config.out_file)?;
    info!("wrote {}", config.out_file);

    Ok(rss)
}
