use fairvis::table::{Table, Value};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn parse_recognises_numbers_text_and_missing_markers() {
    assert_eq!(Value::parse("0.5"), Value::Number(0.5));
    assert_eq!(Value::parse(" 1 "), Value::Number(1.0));
    assert_eq!(Value::parse("Model metadata"), Value::Text("Model metadata".to_string()));
    for missing in ["", "  ", "NA", "N/A", "NaN", "nan", "null"] {
        assert_eq!(Value::parse(missing), Value::Empty, "{:?} should be empty", missing);
    }
}

#[test]
fn value_display_and_accessors() {
    assert_eq!(Value::Number(1.0).to_string(), "1");
    assert_eq!(Value::Number(0.5).to_string(), "0.5");
    assert_eq!(Value::Empty.to_string(), "");
    assert_eq!(Value::Number(0.5).as_f64(), Some(0.5));
    assert_eq!(Value::from("x").as_f64(), None);
    assert_eq!(Value::Empty.as_text(), None);
    assert_eq!(Value::Number(2.0).as_text(), Some("2".to_string()));
}

#[test]
fn rows_are_padded_and_truncated_to_header_width() {
    let table = Table::from_rows(
        "t",
        names(&["a", "b", "c"]),
        vec![
            vec![Value::Number(1.0)],
            vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0), Value::Number(4.0)],
        ],
    );
    assert_eq!(table.len(), 2);
    assert!(table.rows().iter().all(|r| r.len() == 3));
    assert_eq!(table.value(0, "c"), Some(&Value::Empty));
    assert_eq!(table.number(1, "c"), Some(3.0));
}

#[test]
fn drop_add_and_select_columns() {
    let mut table = Table::from_rows(
        "t",
        names(&["ID", "Description", "Assessment"]),
        vec![vec![Value::from("F1"), Value::from("long text"), Value::Number(1.0)]],
    );
    assert!(table.drop_column("Description"));
    assert!(!table.drop_column("Description"));
    assert_eq!(table.columns(), &names(&["ID", "Assessment"])[..]);

    table.add_column("Comment", vec![Value::from("ok")]);
    assert_eq!(table.text(0, "Comment"), Some("ok".to_string()));

    let selected = table.select(&["Comment", "ID"]).unwrap();
    assert_eq!(selected.columns(), &names(&["Comment", "ID"])[..]);
    assert_eq!(selected.text(0, "ID"), Some("F1".to_string()));

    assert!(table.select(&["Missing"]).is_err());
}

#[test]
fn require_column_names_the_table() {
    let table = Table::new("indicators", names(&["ID"]));
    let err = table.require_column("Category").unwrap_err();
    assert_eq!(err.to_string(), "table 'indicators' has no column 'Category'");
}

#[test]
fn inner_join_keeps_left_order_and_suffixes_clashes() {
    let left = Table::from_rows(
        "indicators",
        names(&["ID", "Category", "Indicator"]),
        vec![
            vec![Value::from("F1"), Value::from("Model"), Value::from("Identifier")],
            vec![Value::from("A1"), Value::from("Model"), Value::from("Access")],
            vec![Value::from("R1"), Value::from("Archive"), Value::from("License")],
        ],
    );
    let right = Table::from_rows(
        "m1",
        names(&["ID", "Assessment", "Category"]),
        vec![
            vec![Value::from("R1"), Value::Number(0.5), Value::from("Archive")],
            vec![Value::from("F1"), Value::Number(1.0), Value::from("Model")],
            vec![Value::from("X9"), Value::Number(0.0), Value::from("Model")],
        ],
    );

    let joined = left.inner_join(&right, "ID").unwrap();
    assert_eq!(
        joined.columns(),
        &names(&["ID", "Category_x", "Indicator", "Assessment", "Category_y"])[..]
    );
    assert_eq!(joined.len(), 2);
    assert_eq!(joined.text(0, "ID"), Some("F1".to_string()));
    assert_eq!(joined.number(0, "Assessment"), Some(1.0));
    assert_eq!(joined.text(1, "ID"), Some("R1".to_string()));
    assert_eq!(joined.number(1, "Assessment"), Some(0.5));
}

#[test]
fn display_renders_aligned_rows() {
    let table = Table::from_rows(
        "t",
        names(&["ID", "Assessment"]),
        vec![
            vec![Value::from("MOD-F1-01"), Value::Number(1.0)],
            vec![Value::from("A1"), Value::Empty],
        ],
    );
    let text = table.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "ID        | Assessment");
    assert_eq!(lines[2], "MOD-F1-01 | 1");
    assert_eq!(lines[3], "A1        |");
}
