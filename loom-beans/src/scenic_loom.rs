use crate::compound::*;
use crate::loom_io::LoomFile;
use crate::misc::*;
use crate::pipeline_meta::*;
use log::info;

/// What regulon inference (pySCENIC) adds to a loom file
///
/// ```text
/// (root)
///     ├── col_attrs
///     │   ├── CellID
///     │   └── RegulonsAUC   (cell records, one field per regulon)
///     ├── row_attrs
///     │   ├── Gene
///     │   └── Regulons      (gene records, one field per regulon)
///     └── attrs
///         └── MetaData      (base64 + zlib + json; a root attribute in loom 2)
/// ```
#[derive(Debug, Clone)]
pub struct ScenicLoomData {
    pub cell_ids: Vec<Box<str>>,
    pub genes: Vec<Box<str>>,
    pub auc: CompoundColumns,
    pub regulons: CompoundColumns,
    pub metadata: PipelineMetadata,
}

/// Read the regulon inference output. The file is only opened for
/// reading.
pub fn read_scenic_loom(loom: &LoomFile) -> anyhow::Result<ScenicLoomData> {
    let file_name = loom.path_str()?;
    let file = hdf5::File::open(file_name)
        .map_err(|e| anyhow::anyhow!("failed to open loom file {}: {}", file_name, e))?;
    info!("Opened {}", file_name);

    let col_attrs = file
        .group("col_attrs")
        .map_err(|_| anyhow::anyhow!("{}: no `col_attrs` group", file_name))?;
    let row_attrs = file
        .group("row_attrs")
        .map_err(|_| anyhow::anyhow!("{}: no `row_attrs` group", file_name))?;

    let cell_ids = read_hdf5_strings(
        col_attrs
            .dataset("CellID")
            .map_err(|_| anyhow::anyhow!("{}: no `col_attrs/CellID`", file_name))?,
    )?;

    let auc = read_compound_columns(
        &col_attrs
            .dataset("RegulonsAUC")
            .map_err(|_| anyhow::anyhow!("{}: no `col_attrs/RegulonsAUC`", file_name))?,
    )?;

    if auc.num_records != cell_ids.len() {
        return Err(anyhow::anyhow!(
            "{}: {} AUC records for {} cells",
            file_name,
            auc.num_records,
            cell_ids.len()
        ));
    }
    info!("{} cells x {} regulons of AUC", cell_ids.len(), auc.names.len());

    let regulons = read_compound_columns(
        &row_attrs
            .dataset("Regulons")
            .map_err(|_| anyhow::anyhow!("{}: no `row_attrs/Regulons`", file_name))?,
    )?;

    let genes = match row_attrs.dataset("Gene") {
        Ok(genes) => read_hdf5_strings(genes)?,
        _ => {
            info!("row (gene) names not found");
            (0..regulons.num_records)
                .map(|x| x.to_string().into_boxed_str())
                .collect()
        }
    };

    if regulons.num_records != genes.len() {
        return Err(anyhow::anyhow!(
            "{}: {} regulon records for {} genes",
            file_name,
            regulons.num_records,
            genes.len()
        ));
    }

    let blob = read_metadata_blob(&file)
        .map_err(|e| anyhow::anyhow!("{}: cannot proceed without metadata: {}", file_name, e))?;

    let metadata = read_pipeline_metadata(&blob)
        .map_err(|e| anyhow::anyhow!("{}: {}", file_name, e))?;

    info!(
        "{} regulon thresholds in the metadata",
        metadata.regulon_thresholds.len()
    );

    Ok(ScenicLoomData {
        cell_ids,
        genes,
        auc,
        regulons,
        metadata,
    })
}

fn read_metadata_blob(file: &hdf5::File) -> anyhow::Result<String> {
    if let Ok(attrs) = file.group("attrs") {
        if let Ok(ds) = attrs.dataset("MetaData") {
            return read_hdf5_string_scalar(ScalarSource::Dataset(ds));
        }
    }

    match file.attr("MetaData") {
        Ok(attr) => read_hdf5_string_scalar(ScalarSource::Attribute(attr)),
        Err(_) => Err(anyhow::anyhow!(
            "`MetaData` found neither in `/attrs` nor as a root attribute"
        )),
    }
}
