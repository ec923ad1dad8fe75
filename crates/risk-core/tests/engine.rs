use proptest::prelude::*;
use risk_core::{
    EngineConfig, ExecutionConfig, ExecutionMode, ScoreEngine, Severity, process, records,
    run_pipeline,
};
use risk_formula::EvalLimits;
use risk_map::build_alias_map;
use risk_model::{
    AliasMap, CellValue, FORMULA_ERROR, MissReason, ScoreDefinition, ScoreDefinitions,
    SynonymDictionary, Table,
};

fn synonyms(entries: &[(&str, &[&str])]) -> SynonymDictionary {
    let mut dictionary = SynonymDictionary::new();
    for (variable, candidates) in entries {
        dictionary.insert(*variable, candidates.iter().copied());
    }
    dictionary
}

fn ckd_epi(formula: &str) -> ScoreDefinitions {
    [(
        "CKD-EPI",
        ScoreDefinition::new(["age", "creatinine"], formula),
    )]
    .into_iter()
    .collect()
}

fn age_creat_table(creat: CellValue) -> Table {
    Table::from_rows(
        vec!["Age".into(), "Creat".into()],
        vec![vec![CellValue::Number(60.0), creat]],
    )
    .expect("table")
}

fn ckd_synonyms() -> SynonymDictionary {
    synonyms(&[("age", &["Age"]), ("creatinine", &["Creat", "Cr"])])
}

fn score_single(table: &Table, definitions: &ScoreDefinitions) -> risk_model::RecordScores {
    let aliases = build_alias_map(table, &ckd_synonyms());
    let engine = ScoreEngine::new(definitions, EvalLimits::default());
    let output = process(table, &aliases, &engine, ExecutionMode::Sequential).expect("run");
    assert_eq!(output.outcomes.len(), 1);
    output.outcomes[0].scores.clone()
}

#[test]
fn complete_record_is_computed() {
    let table = age_creat_table(CellValue::Number(1.2));
    let aliases = build_alias_map(&table, &ckd_synonyms());
    let expected: AliasMap = [("age", "Age"), ("creatinine", "Creat")].into_iter().collect();
    assert_eq!(aliases, expected);

    let scores = score_single(&table, &ckd_epi("score = 141 * creatinine"));
    let value = scores.value("CKD-EPI").expect("computed");
    assert!((value - 169.2).abs() < 1e-9);
    assert!(scores.missed().is_empty());
}

#[test]
fn missing_cell_reports_the_variable() {
    let table = age_creat_table(CellValue::Missing);
    let scores = score_single(&table, &ckd_epi("score = 141 * creatinine"));
    assert!(scores.computed().is_empty());
    assert_eq!(
        scores.miss_reason("CKD-EPI").map(MissReason::reasons),
        Some(vec!["creatinine".to_string()])
    );
}

#[test]
fn failing_formula_is_contained() {
    let table = age_creat_table(CellValue::Number(1.2));
    let mut definitions = ckd_epi("score = 1/0");
    definitions.insert("Age only", ScoreDefinition::new(["age"], "score = age / 10"));
    let scores = score_single(&table, &definitions);
    assert_eq!(
        scores.miss_reason("CKD-EPI").map(MissReason::reasons),
        Some(vec![FORMULA_ERROR.to_string()])
    );
    assert_eq!(scores.value("Age only"), Some(6.0));
}

#[test]
fn variables_as_rows_are_transposed() {
    let canonical = ["age", "sbp", "heart_rate", "creatinine", "bilirubin"];
    let table = Table::with_index(
        vec!["p1".into(), "p2".into()],
        canonical.iter().map(|name| (*name).to_string()).collect(),
        vec![
            vec![CellValue::Number(61.0), CellValue::Number(72.0)],
            vec![CellValue::Number(120.0), CellValue::Number(135.0)],
            vec![CellValue::Number(80.0), CellValue::Number(64.0)],
            vec![CellValue::Number(1.1), CellValue::Missing],
            vec![CellValue::Number(0.4), CellValue::Number(1.8)],
        ],
    )
    .expect("table");
    let dictionary: SynonymDictionary = canonical
        .iter()
        .map(|name| (*name, vec![(*name).to_string()]))
        .collect();
    let definitions: ScoreDefinitions = [(
        "renal",
        ScoreDefinition::new(["creatinine", "age"], "score = creatinine * age"),
    )]
    .into_iter()
    .collect();

    let output =
        run_pipeline(table, &dictionary, &definitions, &EngineConfig::default()).expect("run");
    let orientation = output.orientation.expect("orientation report");
    assert!(orientation.transpose);
    assert_eq!(output.table.index(), &["p1".to_string(), "p2".to_string()]);
    assert_eq!(output.resolution.aliases.len(), 5);

    let outcomes = &output.run.outcomes;
    assert_eq!(outcomes[0].record_id, "p1");
    assert!((outcomes[0].scores.value("renal").expect("p1 scored") - 67.1).abs() < 1e-9);
    assert_eq!(
        outcomes[1].scores.miss_reason("renal").map(MissReason::reasons),
        Some(vec!["creatinine".to_string()])
    );
}

#[test]
fn orientation_can_be_disabled() {
    let table = age_creat_table(CellValue::Number(1.2));
    let config = EngineConfig {
        detect_orientation: false,
        ..EngineConfig::default()
    };
    let output = run_pipeline(table, &ckd_synonyms(), &ckd_epi("score = age"), &config)
        .expect("run");
    assert!(output.orientation.is_none());
    assert_eq!(output.run.outcomes[0].scores.value("CKD-EPI"), Some(60.0));
}

#[test]
fn summary_counts_outcomes() {
    let table = Table::from_rows(
        vec!["Age".into(), "Creat".into()],
        vec![
            vec![CellValue::Number(60.0), CellValue::Number(1.0)],
            vec![CellValue::Number(70.0), CellValue::Missing],
            vec![CellValue::Number(0.0), CellValue::Number(2.0)],
        ],
    )
    .expect("table");
    let definitions = ckd_epi("score = creatinine / age");
    let aliases = build_alias_map(&table, &ckd_synonyms());
    let engine = ScoreEngine::new(&definitions, EvalLimits::default());
    let output = process(&table, &aliases, &engine, ExecutionMode::Sequential).expect("run");

    let summary = output.summary();
    assert_eq!(summary.record_count(), 3);
    assert_eq!(summary.rows[0].computed, vec!["CKD-EPI".to_string()]);
    assert_eq!(summary.rows[1].missed, vec!["CKD-EPI".to_string()]);
    let tally = &summary.scores[0];
    assert_eq!(
        (tally.computed, tally.missing_variables, tally.formula_errors),
        (1, 1, 1)
    );
    assert_eq!(output.diagnostics.warning_count(), 1);
    let warning = output
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Warning)
        .expect("warning");
    assert_eq!(warning.record_id.as_deref(), Some("2"));
}

#[test]
fn lazy_records_match_batch_processing() {
    let table = age_creat_table(CellValue::Number(1.2));
    let aliases = build_alias_map(&table, &ckd_synonyms());
    let engine = ScoreEngine::new(&ckd_epi("score = age + creatinine"), EvalLimits::default());
    let lazy: Vec<_> = records(&table, &aliases, &engine)
        .map(|(outcome, _)| outcome)
        .collect();
    let batch = process(&table, &aliases, &engine, ExecutionMode::Sequential).expect("run");
    assert_eq!(lazy, batch.outcomes);
}

fn arbitrary_table() -> impl Strategy<Value = Table> {
    let cell = prop_oneof![
        3 => (-5.0f64..200.0).prop_map(CellValue::Number),
        1 => Just(CellValue::Missing),
        1 => Just(CellValue::Text("n/a-ish".to_string())),
    ];
    prop::collection::vec(prop::collection::vec(cell, 3), 0..40).prop_map(|rows| {
        Table::from_rows(vec!["Age".into(), "Creat".into(), "SBP".into()], rows)
            .expect("rectangular rows")
    })
}

fn mixed_definitions() -> ScoreDefinitions {
    [
        ("ratio", ScoreDefinition::new(["age", "creatinine"], "score = age / creatinine")),
        ("bp", ScoreDefinition::new(["sbp"], "score = 1 if sbp > 140 else 0")),
        ("weight", ScoreDefinition::new(["weight"], "score = weight")),
        ("log_age", ScoreDefinition::new(["age"], "score = log(age)")),
    ]
    .into_iter()
    .collect()
}

fn mixed_synonyms() -> SynonymDictionary {
    synonyms(&[
        ("age", &["Age"]),
        ("creatinine", &["Creat"]),
        ("sbp", &["SBP"]),
        ("weight", &["Weight"]),
    ])
}

proptest! {
    #[test]
    fn every_score_lands_in_exactly_one_map(table in arbitrary_table()) {
        let definitions = mixed_definitions();
        let aliases = build_alias_map(&table, &mixed_synonyms());
        let engine = ScoreEngine::new(&definitions, EvalLimits::default());
        let output = process(&table, &aliases, &engine, ExecutionMode::Sequential).expect("run");
        prop_assert_eq!(output.outcomes.len(), table.row_count());
        for (position, outcome) in output.outcomes.iter().enumerate() {
            prop_assert_eq!(outcome.index, position);
            prop_assert_eq!(outcome.scores.len(), definitions.len());
            for name in definitions.names() {
                let computed = outcome.scores.value(name).is_some();
                let missed = outcome.scores.miss_reason(name).is_some();
                prop_assert!(computed ^ missed, "{} on record {}", name, position);
            }
        }
    }

    #[test]
    fn parallel_matches_sequential(table in arbitrary_table(), threads in 1usize..4) {
        let definitions = mixed_definitions();
        let aliases = build_alias_map(&table, &mixed_synonyms());
        let engine = ScoreEngine::new(&definitions, EvalLimits::default());
        let sequential = process(&table, &aliases, &engine, ExecutionMode::Sequential)
            .expect("sequential");
        let parallel = process(
            &table,
            &aliases,
            &engine,
            ExecutionConfig { parallel: true, threads: Some(threads) }.mode(),
        )
        .expect("parallel");
        prop_assert_eq!(sequential, parallel);
    }

    #[test]
    fn evaluation_is_deterministic(table in arbitrary_table()) {
        let definitions = mixed_definitions();
        let aliases = build_alias_map(&table, &mixed_synonyms());
        let engine = ScoreEngine::new(&definitions, EvalLimits::default());
        let first = process(&table, &aliases, &engine, ExecutionMode::Sequential).expect("run");
        let second = process(&table, &aliases, &engine, ExecutionMode::Sequential).expect("run");
        prop_assert_eq!(first, second);
    }
}

#[test]
fn config_file_drives_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("engine.toml");
    std::fs::write(
        &path,
        "detect_orientation = false\n\n[execution]\nparallel = true\nthreads = 2\n",
    )
    .expect("write config");
    let config = EngineConfig::load(&path).expect("config");
    assert_eq!(
        config.execution.mode(),
        ExecutionMode::Parallel { threads: Some(2) }
    );

    let table = age_creat_table(CellValue::Number(1.2));
    let output = run_pipeline(table, &ckd_synonyms(), &ckd_epi("score = 141 * creatinine"), &config)
        .expect("run");
    assert!(output.orientation.is_none());
    assert_eq!(output.run.outcomes.len(), 1);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = EngineConfig::load(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(error.to_string().contains("absent.toml"));
}
