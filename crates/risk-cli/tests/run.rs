//! End-to-end runs of the CLI driver against files in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use risk_cli::cli::Cli;
use risk_cli::commands::{engine_config, run};

const SCORES: &str = "\
CKD-EPI:
  variables: [age, creatinine]
  formula: score = 141 * creatinine
ratio:
  variables: [weight]
  formula: score = weight / 0
";

const SYNONYMS: &str = "\
age: [Age]
creatinine: [Creatinine, Creat]
weight: Weight
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(table_name: &str, table: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(table_name), table).expect("write table");
        fs::write(dir.path().join("scores.yaml"), SCORES).expect("write scores");
        fs::write(dir.path().join("synonyms.yaml"), SYNONYMS).expect("write synonyms");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn out(&self) -> PathBuf {
        self.path("out")
    }

    fn cli(&self, table_name: &str, extra: &[&str]) -> Cli {
        let mut args: Vec<String> = vec!["risk-engine".into()];
        for (flag, path) in [
            ("-i", self.path(table_name)),
            ("-s", self.path("scores.yaml")),
            ("-y", self.path("synonyms.yaml")),
            ("-o", self.out()),
        ] {
            args.push(flag.into());
            args.push(path.display().to_string());
        }
        args.extend(extra.iter().map(|arg| (*arg).to_string()));
        Cli::try_parse_from(args).expect("parse args")
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

#[test]
fn scores_every_patient_and_writes_reports() {
    let fixture = Fixture::new(
        "patients.csv",
        "patient_id,Age,Creatinine,Weight\nA1,60,1.2,80\nA2,70,NA,75\n",
    );
    let cli = fixture.cli("patients.csv", &["--index-column", "patient_id", "--format", "all"]);
    let result = run(&cli).expect("run");

    assert!(!result.transposed);
    assert_eq!(result.summary.record_count(), 2);
    assert_eq!(result.summary.total_computed(), 1);
    assert_eq!(result.warnings, 2);
    assert_eq!(result.reports_written, 6);
    assert_eq!(result.report_failures, 0);
    assert_eq!(
        result.aliases,
        vec![
            ("age".to_string(), "Age".to_string()),
            ("creatinine".to_string(), "Creatinine".to_string()),
            ("weight".to_string(), "Weight".to_string()),
        ]
    );
    assert_eq!(
        read(&result.summary_path),
        "patient_id,computed_scores,missed_scores\nA1,CKD-EPI,ratio\nA2,,CKD-EPI;ratio\n"
    );
    for name in ["patient_A1.xlsx", "patient_A1.html", "patient_A2.json"] {
        assert!(fixture.out().join(name).is_file(), "{name} missing");
    }
    let json: String = read(&fixture.out().join("patient_A2.json"));
    assert!(json.contains("\"creatinine\""));
}

#[test]
fn patients_in_columns_are_transposed() {
    let fixture = Fixture::new(
        "wide.csv",
        ",A1,A2\nAge,60,70\nCreatinine,1.2,0.9\nWeight,80,75\n",
    );
    let result = run(&fixture.cli("wide.csv", &["--format", "none"])).expect("run");

    assert!(result.transposed);
    assert_eq!(
        read(&result.summary_path),
        "patient_id,computed_scores,missed_scores\nA1,CKD-EPI,ratio\nA2,CKD-EPI,ratio\n"
    );
    let entries: Vec<_> = fs::read_dir(fixture.out())
        .expect("list out")
        .filter_map(|entry| entry.ok().map(|entry| entry.file_name()))
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("summary.csv")]);
}

#[test]
fn parallel_run_matches_sequential_run() {
    let fixture = Fixture::new(
        "patients.csv",
        "Age,Creatinine,Weight\n60,1.2,80\n71,,90\n45,0.8,\n52,1.1,66\n",
    );
    let sequential = run(&fixture.cli("patients.csv", &["--format", "none"])).expect("run");
    let sequential_summary = read(&sequential.summary_path);
    let parallel = run(&fixture.cli(
        "patients.csv",
        &["--format", "none", "--parallel", "--threads", "3"],
    ))
    .expect("parallel run");
    assert_eq!(parallel.summary, sequential.summary);
    assert_eq!(read(&parallel.summary_path), sequential_summary);
}

#[test]
fn load_failures_are_errors() {
    let fixture = Fixture::new("patients.csv", "Age,Creatinine,Weight\n60,1.2,80\n");
    fs::remove_file(fixture.path("scores.yaml")).expect("remove scores");
    let error = run(&fixture.cli("patients.csv", &[])).expect_err("missing scores");
    assert!(format!("{error:#}").contains("load score definitions"));
    assert!(!fixture.out().join("summary.csv").exists());
}

#[test]
fn flags_override_config_file() {
    let fixture = Fixture::new("patients.csv", "Age\n60\n");
    fs::write(
        fixture.path("engine.toml"),
        "[matching]\ncutoff = 90\n\n[evaluation]\ntimeout_ms = 100\n",
    )
    .expect("write config");
    let config_path = fixture.path("engine.toml").display().to_string();
    let cli = fixture.cli(
        "patients.csv",
        &["--config", &config_path, "--cutoff", "70", "--parallel", "--threads", "2"],
    );
    let config = engine_config(&cli).expect("config");
    assert_eq!(config.matching.cutoff, 70);
    assert_eq!(config.evaluation.timeout_ms, 100);
    assert!(config.execution.parallel);
    assert_eq!(config.execution.threads, Some(2));
    assert!(config.detect_orientation);
}

#[test]
fn out_of_range_flags_are_rejected() {
    let base = ["risk-engine", "-i", "a.csv", "-s", "s.yaml", "-y", "y.yaml", "-o", "out"];
    let mut with_cutoff = base.to_vec();
    with_cutoff.extend(["--cutoff", "101"]);
    assert!(Cli::try_parse_from(with_cutoff).is_err());
    let mut with_threads = base.to_vec();
    with_threads.extend(["--threads", "0"]);
    assert!(Cli::try_parse_from(with_threads).is_err());
    assert!(Cli::try_parse_from(["risk-engine", "-i", "a.csv"]).is_err());
}
