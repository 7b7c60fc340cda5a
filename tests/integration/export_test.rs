use std::fs;

use arrow::array::{Array, Date32Array, Float64Array, Int32Array, StringArray};
use arrow::datatypes::DataType;
use wrds_parquet::writer::read_last_modified;
use wrds_parquet::{
    ColumnType, ExportError, ExportOutcome, InMemorySource, TableDescriptor, wrds_to_parquet,
};

use crate::utils::{
    MSF_STAMP, clean_msf_rows, msf_info, msf_source, read_parquet, sentinel_msf_rows, test_config,
};

fn msf_descriptor() -> TableDescriptor {
    TableDescriptor::new("msf", "crsp")
        .fix_missing(true)
        .col_type("permno", ColumnType::Integer)
        .col_type("permco", ColumnType::Integer)
}

fn exported(outcome: ExportOutcome) -> wrds_parquet::ExportStats {
    match outcome {
        ExportOutcome::Exported(stats) => stats,
        ExportOutcome::UpToDate { table, .. } => panic!("{table} was skipped"),
    }
}

#[test]
fn test_export_writes_typed_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = msf_source(sentinel_msf_rows());

    let stats = exported(wrds_to_parquet(&source, &msf_descriptor(), &config).unwrap());
    assert_eq!(stats.table, "crsp.msf");
    assert_eq!(stats.path, dir.path().join("crsp").join("msf.parquet"));
    assert_eq!(stats.rows, 5);
    assert_eq!(stats.columns, 5);
    assert!(stats.bytes > 0);

    let (schema, batch) = read_parquet(&stats.path);
    let types: Vec<&DataType> = schema.fields().iter().map(|f| f.data_type()).collect();
    assert_eq!(
        types,
        vec![
            &DataType::Utf8,
            &DataType::Int32,
            &DataType::Int32,
            &DataType::Date32,
            &DataType::Float64,
        ]
    );

    let permno = batch.column(1).as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(permno.values().to_vec(), vec![10000, 10000, 10000, 10001, 10001]);

    let date = batch.column(3).as_any().downcast_ref::<Date32Array>().unwrap();
    // 1986-01-31 is day 5874 after the epoch
    assert_eq!(date.value(0), 5874);
    assert_eq!(date.value(3), 5874);

    let ret = batch.column(4).as_any().downcast_ref::<Float64Array>().unwrap();
    assert!(ret.is_null(0));
    assert!(ret.is_null(1));
    assert!(ret.is_null(2));
    assert!(ret.is_null(3));
    assert!((ret.value(4) - 0.020408).abs() < 1e-12);

    let cusip = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(cusip.value(0), "68391610");
}

#[test]
fn test_integer_columns_hold_only_int32_or_null() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = clean_msf_rows();
    rows[2][1] = Some(".".to_string());
    rows[3][2] = Some("Z".to_string());
    let source = msf_source(rows);

    let stats = exported(wrds_to_parquet(&source, &msf_descriptor(), &test_config(dir.path())).unwrap());
    let (_, batch) = read_parquet(&stats.path);

    let permno = batch.column(1).as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(permno.null_count(), 1);
    assert!(permno.is_null(2));

    let permco = batch.column(2).as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(permco.null_count(), 1);
    assert!(permco.is_null(3));
    assert_eq!(permco.value(4), 7953);
}

#[test]
fn test_without_overrides_source_types_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let source = msf_source(clean_msf_rows());
    let descriptor = TableDescriptor::new("msf", "crsp").fix_missing(true);

    let stats = exported(wrds_to_parquet(&source, &descriptor, &test_config(dir.path())).unwrap());
    let (schema, _) = read_parquet(&stats.path);

    for (field, column) in schema.fields().iter().zip(msf_info().columns) {
        assert_eq!(field.name(), &column.name);
        assert_eq!(field.data_type(), &column.column_type.arrow_type());
        assert!(field.is_nullable());
    }
}

#[test]
fn test_fix_missing_without_sentinels_is_byte_identical() {
    let fixed_dir = tempfile::tempdir().unwrap();
    let plain_dir = tempfile::tempdir().unwrap();
    let source = msf_source(clean_msf_rows());

    let fixed = wrds_to_parquet(&source, &msf_descriptor(), &test_config(fixed_dir.path())).unwrap();
    let plain = wrds_to_parquet(
        &source,
        &msf_descriptor().fix_missing(false),
        &test_config(plain_dir.path()),
    )
    .unwrap();

    assert_eq!(fs::read(fixed.path()).unwrap(), fs::read(plain.path()).unwrap());
}

#[test]
fn test_special_missing_without_fix_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = msf_source(sentinel_msf_rows());
    let descriptor = msf_descriptor().fix_missing(false);

    let err = wrds_to_parquet(&source, &descriptor, &test_config(dir.path())).unwrap_err();
    match err {
        ExportError::Coercion {
            column, row, value, ..
        } => {
            assert_eq!(column, "ret");
            assert_eq!(row, 1);
            assert_eq!(value, "C");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("crsp").join("msf.parquet").exists());
}

#[test]
fn test_fractional_integer_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = clean_msf_rows();
    rows[4][1] = Some("12.5".to_string());
    let source = msf_source(rows);

    let err = wrds_to_parquet(&source, &msf_descriptor(), &test_config(dir.path())).unwrap_err();
    match err {
        ExportError::Coercion {
            column,
            row,
            value,
            target,
        } => {
            assert_eq!(column, "permno");
            assert_eq!(row, 4);
            assert_eq!(value, "12.5");
            assert_eq!(target, ColumnType::Integer);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_failed_export_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let good = wrds_to_parquet(&msf_source(clean_msf_rows()), &msf_descriptor(), &config).unwrap();
    let before = fs::read(good.path()).unwrap();

    let mut rows = clean_msf_rows();
    rows[3][2] = Some("not a number".to_string());
    let forced = wrds_parquet::ExportConfig {
        force: true,
        ..config
    };
    let err = wrds_to_parquet(&msf_source(rows), &msf_descriptor(), &forced).unwrap_err();
    assert!(err.is_coercion());

    assert_eq!(fs::read(good.path()).unwrap(), before);
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("crsp"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("msf.parquet")]);
}

#[test]
fn test_forced_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = wrds_parquet::ExportConfig {
        force: true,
        ..test_config(dir.path())
    };
    let source = msf_source(sentinel_msf_rows());

    let first = exported(wrds_to_parquet(&source, &msf_descriptor(), &config).unwrap());
    let first_bytes = fs::read(&first.path).unwrap();

    let second = exported(wrds_to_parquet(&source, &msf_descriptor(), &config).unwrap());
    assert_eq!(fs::read(&second.path).unwrap(), first_bytes);
}

#[test]
fn test_rerun_skips_up_to_date_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = msf_source(clean_msf_rows());

    let first = wrds_to_parquet(&source, &msf_descriptor(), &config).unwrap();
    assert!(first.was_exported());
    assert_eq!(
        read_last_modified(first.path()).unwrap().as_deref(),
        Some(MSF_STAMP)
    );

    let second = wrds_to_parquet(&source, &msf_descriptor(), &config).unwrap();
    assert!(!second.was_exported());
    assert_eq!(second.path(), first.path());

    // A newer stamp in the source triggers a fresh export
    let newer = InMemorySource::new().with_table(
        msf_info().with_last_modified("2024-03-06 09:00:00"),
        clean_msf_rows(),
    );
    let third = wrds_to_parquet(&newer, &msf_descriptor(), &config).unwrap();
    assert!(third.was_exported());
    assert_eq!(
        read_last_modified(third.path()).unwrap().as_deref(),
        Some("2024-03-06 09:00:00")
    );
}

#[test]
fn test_table_without_stamp_is_always_exported() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let mut info = msf_info();
    info.last_modified = None;
    let source = InMemorySource::new().with_table(info, clean_msf_rows());

    for _ in 0..2 {
        let outcome = wrds_to_parquet(&source, &msf_descriptor(), &config).unwrap();
        assert!(outcome.was_exported());
        assert_eq!(read_last_modified(outcome.path()).unwrap(), None);
    }
}

#[test]
fn test_unknown_table() {
    let dir = tempfile::tempdir().unwrap();
    let source = msf_source(clean_msf_rows());
    let descriptor = TableDescriptor::new("msfx", "crsp");

    let err = wrds_to_parquet(&source, &descriptor, &test_config(dir.path())).unwrap_err();
    assert!(err.is_table_not_found());
    assert!(!dir.path().join("crsp").exists());
}

#[test]
fn test_unknown_override_column() {
    let dir = tempfile::tempdir().unwrap();
    let source = msf_source(clean_msf_rows());
    let descriptor = msf_descriptor().col_type("permnoo", ColumnType::Integer);

    let err = wrds_to_parquet(&source, &descriptor, &test_config(dir.path())).unwrap_err();
    match err {
        ExportError::UnknownColumn { table, column } => {
            assert_eq!(table, "crsp.msf");
            assert_eq!(column, "permnoo");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unreachable_source() {
    let dir = tempfile::tempdir().unwrap();
    let err = wrds_to_parquet(
        &InMemorySource::offline(),
        &msf_descriptor(),
        &test_config(dir.path()),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::Connection(_)));
}

#[test]
fn test_keep_drop_rename_and_obs() {
    let dir = tempfile::tempdir().unwrap();
    let source = msf_source(clean_msf_rows());
    let descriptor = msf_descriptor()
        .keep(["permno", "date", "ret", "cusip"])
        .drop_columns(["cusip"])
        .rename("ret", "monthly_return")
        .obs(3)
        .alt_table_name("msf_sample");

    let stats = exported(wrds_to_parquet(&source, &descriptor, &test_config(dir.path())).unwrap());
    assert_eq!(stats.path, dir.path().join("crsp").join("msf_sample.parquet"));
    assert_eq!(stats.rows, 3);

    let (schema, batch) = read_parquet(&stats.path);
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    // Source order is kept regardless of the order in `keep`
    assert_eq!(names, vec!["permno", "date", "monthly_return"]);
    assert_eq!(schema.field(0).data_type(), &DataType::Int32);
    assert_eq!(batch.num_rows(), 3);
}

#[test]
fn test_fix_cr_replaces_line_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = clean_msf_rows();
    rows[0][0] = Some("6839\r\n1610".to_string());
    rows[1][0] = Some("6839\n16\r10".to_string());
    let source = msf_source(rows);

    let stats = exported(
        wrds_to_parquet(&source, &msf_descriptor().fix_cr(true), &test_config(dir.path())).unwrap(),
    );
    let (_, batch) = read_parquet(&stats.path);
    let cusip = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(cusip.value(0), "6839 1610");
    assert_eq!(cusip.value(1), "6839 16 10");
}

#[test]
fn test_empty_table_writes_schema_only_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = msf_source(Vec::new());

    let stats = exported(wrds_to_parquet(&source, &msf_descriptor(), &test_config(dir.path())).unwrap());
    assert_eq!(stats.rows, 0);

    let (schema, batch) = read_parquet(&stats.path);
    assert_eq!(schema.fields().len(), 5);
    assert_eq!(batch.num_rows(), 0);
}

#[test]
fn test_invalid_descriptor_fails_before_source() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = TableDescriptor::new("", "crsp");
    let err = wrds_to_parquet(
        &InMemorySource::offline(),
        &descriptor,
        &test_config(dir.path()),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::Config(_)));
}
