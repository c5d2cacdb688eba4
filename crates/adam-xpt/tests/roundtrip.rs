use adam_xpt::{
    MissingValue, XptColumn, XptDataset, XptError, XptReader, XptValue, XptWriter, read_xpt,
    write_xpt,
};
use tempfile::tempdir;

fn sample_dataset() -> XptDataset {
    let mut dataset = XptDataset::with_columns(
        "DM",
        vec![
            XptColumn::character("USUBJID", 11).with_label("Unique Subject Identifier"),
            XptColumn::numeric("AGE").with_label("Age"),
            XptColumn::character("SEX", 1),
            XptColumn::numeric("RFXSTDT").with_format("DATE", 9, 0),
        ],
    )
    .with_label("Demographics");

    dataset.add_row(vec![
        XptValue::character("01-701-1015"),
        XptValue::numeric(63.0),
        XptValue::character("F"),
        XptValue::numeric(19_359.0),
    ]);
    dataset.add_row(vec![
        XptValue::character("01-701-1023"),
        XptValue::numeric(64.5),
        XptValue::character(""),
        XptValue::numeric_missing(),
    ]);
    dataset.add_row(vec![
        XptValue::character("01-701-1028"),
        XptValue::numeric_missing_with(MissingValue::Special('A')),
        XptValue::character("M"),
        XptValue::numeric(-3.25),
    ]);
    dataset
}

#[test]
fn file_roundtrip_preserves_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dm.xpt");
    let dataset = sample_dataset();

    write_xpt(&path, &dataset).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len() % 80, 0);

    let parsed = read_xpt(&path).unwrap();
    assert_eq!(parsed.name, "DM");
    assert_eq!(parsed.label.as_deref(), Some("Demographics"));
    assert_eq!(parsed.columns, dataset.columns);
    assert_eq!(parsed.rows, dataset.rows);
}

#[test]
fn in_memory_roundtrip() {
    let dataset = sample_dataset();
    let mut buffer = Vec::new();
    XptWriter::new(&mut buffer).write_dataset(&dataset).unwrap();

    let parsed = XptReader::new(buffer.as_slice()).read_dataset().unwrap();
    assert_eq!(parsed.num_rows(), 3);
    assert_eq!(parsed.rows[1][2], XptValue::character(""));
    assert!(parsed.rows[2][1].is_missing());
}

#[test]
fn empty_dataset_roundtrip() {
    let dataset = XptDataset::with_columns(
        "SUPPDM",
        vec![
            XptColumn::character("USUBJID", 11),
            XptColumn::character("QNAM", 8),
            XptColumn::character("QVAL", 1),
        ],
    );
    let mut buffer = Vec::new();
    XptWriter::new(&mut buffer).write_dataset(&dataset).unwrap();

    let parsed = XptReader::new(buffer.as_slice()).read_dataset().unwrap();
    assert_eq!(parsed.columns.len(), 3);
    assert_eq!(parsed.num_rows(), 0);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = read_xpt(&dir.path().join("ex.xpt")).unwrap_err();
    assert!(matches!(err, XptError::FileNotFound { .. }));
}

#[test]
fn invalid_dataset_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.xpt");
    let dataset = XptDataset::new("TOOLONGNAME");

    assert!(write_xpt(&path, &dataset).is_err());
    assert!(!path.exists());
}

#[cfg(feature = "polars")]
#[test]
fn reads_into_dataframe() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dm.xpt");
    write_xpt(&path, &sample_dataset()).unwrap();

    let df = adam_xpt::read_xpt_to_dataframe(&path).unwrap();
    assert_eq!(df.shape(), (3, 4));
    assert_eq!(df.column("AGE").unwrap().null_count(), 1);
}
