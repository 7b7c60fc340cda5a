use std::fs;

use wrds_parquet::{ColumnType, ExportError, ExportJob, InMemorySource, TableDescriptor};

use crate::utils::{clean_msf_rows, msf_info, sentinel_msf_rows, test_config};

#[test]
fn test_manifest_job_runs_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("job.json");
    fs::write(
        &manifest,
        r#"{"tables": [
            {"table": "msf", "schema": "crsp", "fix_missing": true,
             "col_types": {"permno": "integer", "permco": "int4"}},
            {"table": "msf", "schema": "crsp", "alt_table_name": "msf_head", "obs": 1}
        ]}"#,
    )
    .unwrap();

    let job = ExportJob::from_json_file(&manifest).unwrap();
    assert_eq!(job.tables().len(), 2);
    assert_eq!(job.tables()[0].override_for("permco"), Some(ColumnType::Integer));

    let source = InMemorySource::new().with_table(msf_info(), sentinel_msf_rows());
    let data_dir = dir.path().join("data");
    // The second table has no fix_missing, but `obs` stops before the sentinels
    let outcomes = job.run(&source, &test_config(&data_dir)).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].path(), data_dir.join("crsp").join("msf.parquet"));
    assert_eq!(outcomes[1].path(), data_dir.join("crsp").join("msf_head.parquet"));
}

#[test]
fn test_job_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemorySource::new().with_table(msf_info(), clean_msf_rows());
    let job = ExportJob::new(vec![
        TableDescriptor::new("msf", "crsp"),
        TableDescriptor::new("dsedelist", "crsp"),
        TableDescriptor::new("msf", "crsp").alt_table_name("never_written"),
    ]);

    let err = job.run(&source, &test_config(dir.path())).unwrap_err();
    assert!(matches!(err, ExportError::TableNotFound { .. }));
    assert!(dir.path().join("crsp").join("msf.parquet").exists());
    assert!(!dir.path().join("crsp").join("never_written.parquet").exists());
}

#[test]
fn test_manifest_with_unknown_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("job.json");
    fs::write(
        &manifest,
        r#"{"tables": [{"table": "msf", "schema": "crsp", "col_types": {"permno": "int128"}}]}"#,
    )
    .unwrap();

    let err = ExportJob::from_json_file(&manifest).unwrap_err();
    assert!(matches!(err, ExportError::Json(_)));
}
