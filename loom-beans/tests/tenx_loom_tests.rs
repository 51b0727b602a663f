use loom_beans::loom_io::*;
use loom_beans::misc::*;
use loom_beans::tenx_h5::*;
use matrix_util::common_io::create_temp_dir_file;
use matrix_util::sparse_util::*;

fn boxed(xs: &[&str]) -> Vec<Box<str>> {
    xs.iter().map(|&x| Box::from(x)).collect()
}

/// 3 genes x 2 cells
/// ```text
/// [1 0]
/// [0 7]
/// [2 3]
/// ```
fn toy_sample() -> anyhow::Result<SampleMatrix> {
    let counts = ValuesIndicesPointers {
        values: &[1.0, 2.0, 7.0, 3.0],
        indices: &[0, 2, 1, 2],
        indptr: &[0, 2, 4],
    }
    .to_csc(3, 2)?;

    Ok(SampleMatrix {
        genes: boxed(&["Sox2", "Pax6", "Sox2"]),
        barcodes: boxed(&["AAAC-1", "TTTG-1"]),
        counts,
    })
}

#[test]
fn tenx_round_trip() -> anyhow::Result<()> {
    let h5_file = create_temp_dir_file("_filtered.h5")?;
    let h5_file = h5_file.to_str().unwrap();

    let sample = toy_sample()?;
    write_10x_h5(h5_file, &sample, None)?;

    let back = read_10x_h5(h5_file)?;
    assert_eq!(back.genes, sample.genes);
    assert_eq!(back.barcodes, sample.barcodes);
    assert_eq!(back.counts.nnz(), 4);
    assert_eq!(back.counts.col(1).row_indices(), &[1, 2]);
    assert_eq!(back.counts.col(1).values(), &[7.0, 3.0]);
    Ok(())
}

#[test]
fn tenx_keeps_gene_expression_only() -> anyhow::Result<()> {
    let h5_file = create_temp_dir_file(".h5")?;
    let h5_file = h5_file.to_str().unwrap();

    let types = boxed(&["Gene Expression", "Antibody Capture", "Gene Expression"]);
    write_10x_h5(h5_file, &toy_sample()?, Some(&types))?;

    let back = read_10x_h5(h5_file)?;
    assert_eq!(back.genes, boxed(&["Sox2", "Sox2"]));
    assert_eq!(back.counts.nrows(), 2);
    assert_eq!(back.counts.col(1).row_indices(), &[1]);
    assert_eq!(back.counts.col(1).values(), &[3.0]);
    Ok(())
}

#[test]
fn loom_writer_layout() -> anyhow::Result<()> {
    let loom_file = create_temp_dir_file(".loom")?;
    let loom = LoomFile::new(&loom_file);

    let sample = toy_sample()?;

    let mut writer = LoomWriter::create(&loom)?;
    writer.write_matrix(&sample.counts)?;
    writer.write_row_attr_strings("Gene", &boxed(&["Sox2", "Pax6", "Sox2-1"]))?;
    writer.write_col_attr_strings("CellID", &sample.barcodes)?;
    writer.write_col_attr_numbers("nGene", &[2_u32, 2])?;
    writer.write_col_attr_numbers("nUMI", &[3.0_f32, 10.0])?;

    // a gene attribute with the wrong length is refused
    assert!(writer
        .write_row_attr_strings("Bad", &boxed(&["only-one"]))
        .is_err());

    let loom = writer.finish()?;
    assert!(loom.exists());

    let file = hdf5::File::open(loom.path())?;
    let matrix = file.dataset("matrix")?.read_2d::<f32>()?;
    assert_eq!(matrix.shape(), &[3, 2]);
    assert_eq!(matrix[(1, 1)], 7.0);
    assert_eq!(matrix[(2, 0)], 2.0);
    assert_eq!(matrix[(1, 0)], 0.0);

    let cells = read_hdf5_strings(file.dataset("col_attrs/CellID")?)?;
    assert_eq!(cells, sample.barcodes);

    let n_umi = file.dataset("col_attrs/nUMI")?.read_1d::<f32>()?.to_vec();
    assert_eq!(n_umi, vec![3.0, 10.0]);

    let version =
        read_hdf5_string_scalar(ScalarSource::Dataset(file.dataset("attrs/LOOM_SPEC_VERSION")?))?;
    assert_eq!(version, LOOM_SPEC_VERSION);

    let version = read_hdf5_string_scalar(ScalarSource::Attribute(file.attr("LOOM_SPEC_VERSION")?))?;
    assert_eq!(version, LOOM_SPEC_VERSION);

    for group in ["layers", "row_graphs", "col_graphs"] {
        assert!(file.link_exists(group));
    }
    Ok(())
}

#[test]
fn loom_attrs_need_matrix_first() -> anyhow::Result<()> {
    let loom_file = create_temp_dir_file(".loom")?;
    let mut writer = LoomWriter::create(&LoomFile::new(&loom_file))?;
    let err = writer
        .write_col_attr_strings("CellID", &boxed(&["c1"]))
        .unwrap_err();
    assert!(err.to_string().contains("matrix"));
    Ok(())
}
