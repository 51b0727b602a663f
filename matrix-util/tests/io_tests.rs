use matrix_util::common_io::*;
use matrix_util::csv_table::*;
use matrix_util::traits::{CsvOps, MatWithNames};

fn boxed(xs: &[&str]) -> Vec<Box<str>> {
    xs.iter().map(|&x| Box::from(x)).collect()
}

#[test]
fn first_words_skip_comments_and_blanks() -> anyhow::Result<()> {
    let file = create_temp_dir_file("barcodes.txt.gz")?;
    let file = file.to_str().unwrap();

    write_lines(
        &boxed(&["# barcodes", "c1 A extra", "", "c2\tB", "  ", "c3"]),
        file,
    )?;

    let barcodes = read_first_words(file)?;
    assert_eq!(barcodes, boxed(&["c1", "c2", "c3"]));
    Ok(())
}

#[test]
fn words_with_header() -> anyhow::Result<()> {
    let file = create_temp_dir_file(".txt")?;
    let file = file.to_str().unwrap();

    write_lines(&boxed(&["cell group", "c1 A", "c2 B"]), file)?;

    let out = read_lines_of_words(file, 0)?;
    assert_eq!(out.header, boxed(&["cell", "group"]));
    assert_eq!(out.lines.len(), 2);
    assert_eq!(out.lines[1], boxed(&["c2", "B"]));
    Ok(())
}

#[test]
fn csv_table_pandas_and_r_headers() -> anyhow::Result<()> {
    let pandas = create_temp_dir_file(".csv")?;
    let pandas = pandas.to_str().unwrap();
    write_lines(
        &boxed(&[
            ",orig.ident,cluster",
            "c1,S1,A",
            "c2,S1,\"A, B\"",
        ]),
        pandas,
    )?;

    let table = CsvTable::read(pandas)?;
    assert_eq!(table.columns, boxed(&["orig.ident", "cluster"]));
    assert_eq!(table.index, boxed(&["c1", "c2"]));
    assert_eq!(table.column("cluster")?, boxed(&["A", "A, B"]));

    let r_style = create_temp_dir_file(".csv")?;
    let r_style = r_style.to_str().unwrap();
    write_lines(
        &boxed(&["\"orig.ident\",\"cluster\"", "\"c1\",\"S1\",\"A\""]),
        r_style,
    )?;

    let table = CsvTable::read(r_style)?;
    assert_eq!(table.columns, boxed(&["orig.ident", "cluster"]));
    assert_eq!(table.index, boxed(&["c1"]));
    assert_eq!(table.column("orig.ident")?, boxed(&["S1"]));

    let err = table.column("celltype").unwrap_err();
    assert!(err.to_string().contains("celltype"));
    Ok(())
}

#[test]
fn csv_table_ragged_line() -> anyhow::Result<()> {
    let file = create_temp_dir_file(".csv")?;
    let file = file.to_str().unwrap();
    write_lines(&boxed(&[",a,b", "r1,1,2", "r2,3"]), file)?;

    let err = CsvTable::read(file).unwrap_err();
    assert!(err.to_string().contains("line 3"));
    Ok(())
}

#[test]
fn named_matrix_csv() -> anyhow::Result<()> {
    let file = create_temp_dir_file(".csv")?;
    let file = file.to_str().unwrap();

    let xx = MatWithNames {
        rows: boxed(&["c1", "c2"]),
        cols: boxed(&["Sox2_(+)", "Pax6_(+)", "Klf4_(+)"]),
        mat: DMatrix::<f64>::from_row_slice(2, 3, &[1.0, 0.25, 0.0, 0.5, 0.125, 1e-3]),
    };
    xx.to_csv_with_names(file)?;

    let lines = read_lines(file)?;
    assert_eq!(&*lines[0], ",Sox2_(+),Pax6_(+),Klf4_(+)");
    assert_eq!(&*lines[1], "c1,1.0,0.25,0.0");

    let yy = MatWithNames::<DMatrix<f64>>::from_csv_with_names(file)?;
    assert_eq!(yy.rows, xx.rows);
    assert_eq!(yy.cols, xx.cols);
    approx::assert_abs_diff_eq!(yy.mat, xx.mat);

    let tt = xx.transpose();
    assert_eq!(tt.rows, xx.cols);
    assert_eq!(tt.mat[(2, 1)], 1e-3);
    Ok(())
}

#[test]
fn named_matrix_shape_mismatch() {
    let xx = MatWithNames {
        rows: boxed(&["c1"]),
        cols: boxed(&["a", "b"]),
        mat: DMatrix::<i64>::zeros(2, 2),
    };
    assert!(xx.to_csv_with_names("stdout").is_err());
}
