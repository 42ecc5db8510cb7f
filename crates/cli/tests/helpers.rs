use std::fs;
use std::path::Path;

use cgscope::{
    exit_code, infer_scenario_name, parse_counts, resolve_dir, AnalysisConfig, ArgError,
    CountsError, RunSummary, EXIT_ARGS, EXIT_COUNTS_PARSE, EXIT_COUNTS_RANGE, EXIT_FAILURE,
};
use tempfile::tempdir;

#[test]
fn parse_counts_reads_comma_separated_values() {
    assert_eq!(parse_counts("5,10, 20").unwrap(), vec![5, 10, 20]);
    assert_eq!(parse_counts("7").unwrap(), vec![7]);
    assert!(parse_counts("").unwrap().is_empty());
    assert!(parse_counts(" , ").unwrap().is_empty());
}

#[test]
fn parse_counts_classifies_errors() {
    let err = parse_counts("1,x").unwrap_err();
    assert!(matches!(&err, CountsError::Parse { value, .. } if value == "x"));
    assert_eq!(err.exit_code(), EXIT_COUNTS_PARSE);

    assert_eq!(parse_counts("0").unwrap_err(), CountsError::NotPositive(0));
    let err = parse_counts("4,-3").unwrap_err();
    assert_eq!(err, CountsError::NotPositive(-3));
    assert_eq!(err.exit_code(), EXIT_COUNTS_RANGE);
}

#[test]
fn exit_codes_follow_the_error_kind() {
    let counts = anyhow::Error::from(CountsError::NotPositive(0));
    assert_eq!(exit_code(&counts), EXIT_COUNTS_RANGE);

    let args = anyhow::Error::from(ArgError::Missing { role: "system", path: "x".into() });
    assert_eq!(exit_code(&args), EXIT_ARGS);

    let other = anyhow::anyhow!("disk full");
    assert_eq!(exit_code(&other), EXIT_FAILURE);
}

#[test]
fn resolve_dir_returns_absolute_existing_directories() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let resolved = resolve_dir(&nested.display().to_string(), "system").expect("resolve");
    assert!(resolved.is_absolute());
    assert_eq!(resolved, nested.canonicalize().unwrap());
}

#[test]
fn resolve_dir_rejects_missing_paths_and_files() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("missing");
    let err = resolve_dir(&missing.display().to_string(), "micro").unwrap_err();
    assert!(matches!(err, ArgError::Missing { role: "micro", .. }));

    let file = tmp.path().join("file.txt");
    fs::write(&file, "x").unwrap();
    let err = resolve_dir(&file.display().to_string(), "out").unwrap_err();
    assert!(matches!(err, ArgError::NotADirectory { role: "out", .. }));
    assert!(err.to_string().contains("out dir"));
}

#[test]
fn infer_scenario_name_uses_last_path_component() {
    assert_eq!(infer_scenario_name(Path::new("/data/bleve-query")), "bleve-query");
    assert_eq!(infer_scenario_name(Path::new("/")), "unnamed-scenario");
}

#[test]
fn analysis_config_resolves_all_directories() {
    let tmp = tempdir().expect("tempdir");
    let system = tmp.path().join("etcd-put");
    let micro = tmp.path().join("micro");
    for dir in [&system, &micro] {
        fs::create_dir_all(dir).unwrap();
    }
    let dir = |p: &Path| p.display().to_string();

    let config =
        AnalysisConfig::from_args("a/,b/", &dir(&system), &dir(&micro), &dir(tmp.path()))
            .expect("config");
    assert_eq!(config.scenario, "etcd-put");
    assert_eq!(config.projects.as_slice(), ["a/", "b/"]);
    assert_eq!(config.out_dir, tmp.path().canonicalize().unwrap());
}

#[test]
fn run_summary_records_each_file_once() {
    let tmp = tempdir().expect("tempdir");
    let d = tmp.path().display().to_string();
    let config = AnalysisConfig::from_args("p/", &d, &d, &d).expect("config");

    let mut summary = RunSummary::new("overlap", &config, 2);
    summary.add_file(Path::new("/out/a.csv"));
    summary.add_file(Path::new("/out/b.csv"));
    summary.add_file(Path::new("/out/a.csv"));
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.files[0], Path::new("/out/a.csv"));
}
