use approx::assert_abs_diff_eq;
use base64::Engine;
use flate2::write::ZlibEncoder;
use hdf5::types::{FixedAscii, VarLenUnicode};
use loom_beans::loom_io::*;
use loom_beans::pipeline_meta::*;
use loom_beans::scenic_loom::*;
use matrix_util::common_io::create_temp_dir_file;
use matrix_util::sparse_util::*;
use rand::{Rng, SeedableRng};
use std::io::Write;

#[derive(hdf5::H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct AucRecord {
    #[hdf5(rename = "Sox2(+)")]
    sox2: f64,
    #[hdf5(rename = "Pax6(+)")]
    pax6: f32,
}

#[derive(hdf5::H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct RegulonRecord {
    #[hdf5(rename = "Sox2(+)")]
    sox2: i32,
    #[hdf5(rename = "Pax6(+)")]
    pax6: u8,
}

const METADATA_JSON: &str = r#"{
  "regulonThresholds": [
    {"regulon": "Sox2(+)", "defaultThresholdValue": 0.25, "defaultThresholdName": "gaussian_mixture_split", "motifData": "sox2.png"},
    {"regulon": "Pax6(+)", "defaultThresholdValue": 0.1}
  ],
  "embeddings": []
}"#;

fn encode_metadata(json: &str) -> anyhow::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(json.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
}

fn boxed(xs: &[&str]) -> Vec<Box<str>> {
    xs.iter().map(|&x| Box::from(x)).collect()
}

/// 3 genes x 2 cells with regulon annotations
fn annotated_loom(with_metadata: bool) -> anyhow::Result<LoomFile> {
    let loom = LoomFile::new(create_temp_dir_file(".loom")?);

    let counts = ValuesIndicesPointers {
        values: &[1.0, 2.0, 3.0],
        indices: &[0, 1, 2],
        indptr: &[0, 2, 3],
    }
    .to_csc(3, 2)?;

    let mut writer = LoomWriter::create(&loom)?;
    writer.write_matrix(&counts)?;
    writer.write_row_attr_strings("Gene", &boxed(&["Sox2", "Pax6", "Gapdh"]))?;
    writer.write_col_attr_strings("CellID", &boxed(&["s1_AAAC-1", "s1_TTTG-1"]))?;
    let loom = writer.finish()?;

    let file = hdf5::File::open_rw(loom.path())?;

    let auc = [
        AucRecord {
            sox2: 0.5,
            pax6: 0.25,
        },
        AucRecord {
            sox2: 0.0,
            pax6: 0.75,
        },
    ];
    file.group("col_attrs")?
        .new_dataset::<AucRecord>()
        .shape(auc.len())
        .create("RegulonsAUC")?
        .write(&auc)?;

    let regulons = [
        RegulonRecord { sox2: 1, pax6: 0 },
        RegulonRecord { sox2: 1, pax6: 1 },
        RegulonRecord { sox2: 0, pax6: 0 },
    ];
    file.group("row_attrs")?
        .new_dataset::<RegulonRecord>()
        .shape(regulons.len())
        .create("Regulons")?
        .write(&regulons)?;

    if with_metadata {
        let blob: VarLenUnicode = encode_metadata(METADATA_JSON)?
            .parse()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        file.new_attr::<VarLenUnicode>()
            .create("MetaData")?
            .write_scalar(&blob)?;
    }

    file.flush()?;
    Ok(loom)
}

#[test]
fn read_annotated_loom() -> anyhow::Result<()> {
    let loom = annotated_loom(true)?;
    let data = read_scenic_loom(&loom)?;

    assert_eq!(data.cell_ids, boxed(&["s1_AAAC-1", "s1_TTTG-1"]));
    assert_eq!(data.genes, boxed(&["Sox2", "Pax6", "Gapdh"]));

    assert_eq!(data.auc.names, boxed(&["Sox2(+)", "Pax6(+)"]));
    assert_eq!(data.auc.num_records, 2);
    assert_abs_diff_eq!(data.auc.values[0][0], 0.5);
    assert_abs_diff_eq!(data.auc.values[1][1], 0.75);

    assert_eq!(data.regulons.names, data.auc.names);
    assert_eq!(data.regulons.values[0], vec![1.0, 1.0, 0.0]);
    assert_eq!(data.regulons.values[1], vec![0.0, 1.0, 0.0]);

    let thresholds = &data.metadata.regulon_thresholds;
    assert_eq!(thresholds.len(), 2);
    assert_eq!(thresholds[0].regulon, "Sox2(+)");
    assert_eq!(thresholds[0].default_threshold_value, Some(0.25));
    assert_eq!(thresholds[1].default_threshold_name, None);
    assert!(thresholds[0].other.contains_key("motifData"));
    assert!(data.metadata.other.contains_key("embeddings"));
    Ok(())
}

#[test]
fn missing_metadata_is_fatal() -> anyhow::Result<()> {
    let loom = annotated_loom(false)?;
    let err = read_scenic_loom(&loom).unwrap_err();
    assert!(err.to_string().contains("metadata"));
    Ok(())
}

#[test]
fn plain_loom_has_no_regulons() -> anyhow::Result<()> {
    let loom = LoomFile::new(create_temp_dir_file(".loom")?);
    let counts = ValuesIndicesPointers {
        values: &[1.0],
        indices: &[0],
        indptr: &[0, 1],
    }
    .to_csc(1, 1)?;

    let mut writer = LoomWriter::create(&loom)?;
    writer.write_matrix(&counts)?;
    writer.write_col_attr_strings("CellID", &boxed(&["c1"]))?;
    let loom = writer.finish()?;

    let err = read_scenic_loom(&loom).unwrap_err();
    assert!(err.to_string().contains("RegulonsAUC"));
    Ok(())
}

#[test]
fn metadata_blob_stages() -> anyhow::Result<()> {
    let blob = encode_metadata(METADATA_JSON)?;

    // line-wrapped base64 is fine
    let wrapped: String = blob
        .as_bytes()
        .chunks(20)
        .map(|c| String::from_utf8_lossy(c).to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let meta = read_pipeline_metadata(&wrapped)?;
    assert_eq!(meta.regulon_thresholds.len(), 2);

    let meta = read_pipeline_metadata(METADATA_JSON)?;
    assert_eq!(meta.regulon_thresholds[1].regulon, "Pax6(+)");

    let err = read_pipeline_metadata("%%% not base64 %%%").unwrap_err();
    assert!(err.to_string().contains("base64"));

    let not_zlib = base64::engine::general_purpose::STANDARD.encode(b"plain bytes");
    let err = read_pipeline_metadata(&not_zlib).unwrap_err();
    assert!(err.to_string().contains("inflate"));

    let err = read_pipeline_metadata(&encode_metadata(r#"{"embeddings": []}"#)?).unwrap_err();
    assert!(err.to_string().contains("json"));

    assert!(read_pipeline_metadata("  ").is_err());
    Ok(())
}

/// pySCENIC metadata with `n` thresholds of random values, large enough
/// that the encoded blob does not fit in a short fixed-length string
fn many_thresholds(n: usize) -> (String, Vec<f64>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let values: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
    let items: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!(r#"{{"regulon": "TF{}(+)", "defaultThresholdValue": {:?}}}"#, i, v))
        .collect();
    (format!(r#"{{"regulonThresholds": [{}]}}"#, items.join(", ")), values)
}

fn fixed_ascii_blob(json: &str) -> anyhow::Result<FixedAscii<8192>> {
    let blob = encode_metadata(json)?;
    assert!(blob.len() > 1024 && blob.len() < 8192);
    FixedAscii::<8192>::from_ascii(blob.as_bytes()).map_err(|e| anyhow::anyhow!("{:?}", e))
}

fn assert_thresholds(data: &ScenicLoomData, values: &[f64]) {
    let thresholds = &data.metadata.regulon_thresholds;
    assert_eq!(thresholds.len(), values.len());
    for (i, (t, &v)) in thresholds.iter().zip(values.iter()).enumerate() {
        assert_eq!(t.regulon, format!("TF{}(+)", i));
        assert_abs_diff_eq!(t.default_threshold_value.unwrap_or(-1.0), v, epsilon = 1e-12);
    }
}

#[test]
fn long_fixed_ascii_metadata_attribute() -> anyhow::Result<()> {
    let (json, values) = many_thresholds(300);
    let blob = fixed_ascii_blob(&json)?;

    let loom = annotated_loom(false)?;
    {
        let file = hdf5::File::open_rw(loom.path())?;
        file.new_attr::<FixedAscii<8192>>()
            .create("MetaData")?
            .write_scalar(&blob)?;
        file.flush()?;
    }

    let data = read_scenic_loom(&loom)?;
    assert_thresholds(&data, &values);
    Ok(())
}

#[test]
fn long_fixed_ascii_metadata_dataset() -> anyhow::Result<()> {
    let (json, values) = many_thresholds(300);
    let blob = fixed_ascii_blob(&json)?;

    let loom = annotated_loom(false)?;
    {
        let file = hdf5::File::open_rw(loom.path())?;
        file.group("attrs")?
            .new_dataset::<FixedAscii<8192>>()
            .shape(())
            .create("MetaData")?
            .write_scalar(&blob)?;
        file.flush()?;
    }

    let data = read_scenic_loom(&loom)?;
    assert_thresholds(&data, &values);
    Ok(())
}
