mod common;

use fairvis::assessment::AssessmentClass;
use fairvis::indicators::load_indicators;
use fairvis::table::Table;
use std::collections::BTreeMap;

#[test]
fn counts_cover_every_model() {
    let summary = load_indicators(&common::template_table(), &common::models()).unwrap();

    assert_eq!(summary.n_models, 2);
    assert_eq!(summary.len(), 5);
    for indicator in &summary.indicators {
        assert_eq!(indicator.counts.total(), 2, "{}", indicator.id);
    }

    // alpha = [1, .5, NA, 0, 1], beta = [1, 1, .5, NA, NA]
    assert_eq!(summary.get("F1").unwrap().counts.get(AssessmentClass::One), 2);
    assert_eq!(summary.get("A1").unwrap().counts.as_array(), [0, 0, 1, 1]);
    assert_eq!(summary.get("R1").unwrap().counts.as_array(), [1, 0, 1, 0]);
    assert_eq!(summary.get("F2").unwrap().counts.as_array(), [1, 1, 0, 0]);
    assert_eq!(summary.get("I1").unwrap().counts.as_array(), [1, 0, 0, 1]);
}

#[test]
fn model_rows_are_matched_by_id() {
    // Same scores as alpha but listed in reverse order, plus one unknown ID
    let rows = [
        ("X9", "Model", Some(1.0)),
        ("I1", "Archive", Some(1.0)),
        ("F2", "Archive", Some(0.0)),
        ("A1", "Model", Some(0.5)),
        ("F1", "Model", Some(1.0)),
    ];
    let shuffled = fairvis::assessment::Assessment::from_table(
        "shuffled",
        common::assessment_table("shuffled", &rows),
    )
    .unwrap();
    let mut models = BTreeMap::new();
    models.insert("shuffled".to_string(), shuffled);

    let summary = load_indicators(&common::template_table(), &models).unwrap();
    assert!(summary.get("X9").is_none());
    assert_eq!(summary.get("A1").unwrap().counts.as_array(), [0, 0, 1, 0]);
    // R1 is not listed at all
    assert_eq!(summary.get("R1").unwrap().counts.as_array(), [1, 0, 0, 0]);
    assert_eq!(summary.get("F2").unwrap().counts.as_array(), [0, 1, 0, 0]);
}

#[test]
fn summary_table_has_one_column_per_class() {
    let summary = load_indicators(&common::template_table(), &common::models()).unwrap();
    let table = summary.table();

    assert_eq!(
        table.columns(),
        &["ID", "Category", "Subcategory", "Priority", "Indicator", "NA", "0.0", "0.5", "1.0"]
            .map(String::from)[..]
    );
    assert_eq!(table.len(), 5);
    assert_eq!(table.text(0, "ID"), Some("F1".to_string()));
    assert_eq!(table.number(0, "1.0"), Some(2.0));
    assert!(!table.has_column("Description"));
}

#[test]
fn duplicate_template_ids_are_ignored() {
    let template = common::assessment_table(
        "template",
        &[("F1", "Model", None), ("F1", "Archive", None), ("A1", "Model", None)],
    );
    let summary = load_indicators(&template, &BTreeMap::new()).unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.get("F1").unwrap().category, "Model");
    assert_eq!(summary.n_models, 0);
    assert!(summary.indicators.iter().all(|i| i.counts.total() == 0));
}

#[test]
fn template_needs_id_and_category() {
    let template = Table::new("template", vec!["ID".to_string()]);
    assert!(load_indicators(&template, &BTreeMap::new()).is_err());
}
