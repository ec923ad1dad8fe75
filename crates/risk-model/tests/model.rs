//! Tests for risk-model types.

use risk_model::{
    AliasMap, CellValue, MissReason, RecordScores, ScoreDefinition, ScoreDefinitions,
    ScoreOutcome, SynonymDictionary, Table,
};

#[test]
fn synonym_dictionary_keeps_definition_order() {
    let dictionary: SynonymDictionary = serde_json::from_str(
        r#"{"sbp": ["SBP", "Systolic"], "age": ["Age"], "creatinine": ["Creat", "Cr"]}"#,
    )
    .expect("parse synonyms");
    let variables: Vec<&str> = dictionary.variables().collect();
    assert_eq!(variables, vec!["sbp", "age", "creatinine"]);
    assert_eq!(
        dictionary.candidates("creatinine"),
        Some(&["Creat".to_string(), "Cr".to_string()][..])
    );
}

#[test]
fn score_definition_drops_repeated_variables() {
    let definition = ScoreDefinition::new(["age", "sex", "age"], "score = age");
    assert_eq!(definition.variables(), ["age", "sex"]);
    assert_eq!(definition.formula(), "score = age");
}

#[test]
fn score_definitions_iterate_in_insertion_order() {
    let definitions: ScoreDefinitions = [
        ("MELD", ScoreDefinition::new(["bilirubin"], "score = bilirubin")),
        ("CKD-EPI", ScoreDefinition::new(["creatinine"], "score = creatinine")),
    ]
    .into_iter()
    .collect();
    let names: Vec<&str> = definitions.names().collect();
    assert_eq!(names, vec!["MELD", "CKD-EPI"]);
}

#[test]
fn alias_map_allows_shared_columns() {
    let aliases: AliasMap = [("weight", "Wt"), ("mass", "Wt")].into_iter().collect();
    assert_eq!(aliases.column("weight"), Some("Wt"));
    assert_eq!(aliases.column("mass"), Some("Wt"));
    assert_eq!(aliases.len(), 2);
}

#[test]
fn record_scores_serialize_tagged_reasons() {
    let mut scores = RecordScores::new();
    scores.record("CKD-EPI", ScoreOutcome::Computed(169.2));
    scores.record(
        "MELD",
        ScoreOutcome::Missed(MissReason::MissingVariables {
            variables: vec!["inr".to_string()],
        }),
    );
    let json = serde_json::to_value(&scores).expect("serialize scores");
    assert_eq!(json["computed"]["CKD-EPI"], 169.2);
    assert_eq!(json["missed"]["MELD"]["kind"], "missing_variables");
    assert_eq!(json["missed"]["MELD"]["variables"][0], "inr");
}

#[test]
fn table_records_follow_input_order() {
    let table = Table::from_rows(
        vec!["Age".to_string()],
        vec![
            vec![CellValue::Number(60.0)],
            vec![CellValue::Missing],
            vec![CellValue::Text("71".to_string())],
        ],
    )
    .expect("valid table");
    let ids: Vec<&str> = table.records().map(|record| record.id()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
    let rows: Vec<usize> = table.records().map(|record| record.row()).collect();
    assert_eq!(rows, vec![0, 1, 2]);
    let third = table.record(2).expect("third record");
    assert_eq!(third.row(), 2);
    assert_eq!(third.present("Age").and_then(CellValue::as_f64), Some(71.0));
}
