#![allow(dead_code)]

use fairvis::assessment::Assessment;
use fairvis::table::{Table, Value};
use std::collections::BTreeMap;

pub const ASSESSMENT_COLUMNS: [&str; 9] = [
    "ID",
    "Category",
    "Subcategory",
    "Priority",
    "Indicator",
    "Description",
    "Assessment details",
    "Assessment",
    "Comment",
];

// (id, category) pairs of a small indicator template
pub const INDICATORS: [(&str, &str); 5] = [
    ("F1", "Model"),
    ("A1", "Model"),
    ("R1", "Model"),
    ("F2", "Archive"),
    ("I1", "Archive"),
];

fn columns() -> Vec<String> {
    ASSESSMENT_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Assessment sheet with the full template columns
pub fn assessment_table(name: &str, rows: &[(&str, &str, Option<f64>)]) -> Table {
    let rows = rows
        .iter()
        .map(|(id, category, score)| {
            vec![
                Value::from(*id),
                Value::from(*category),
                Value::from("Findable"),
                Value::from("Essential"),
                Value::from(format!("Indicator {}", id)),
                Value::from("Description text"),
                Value::from("How to score"),
                Value::from(*score),
                Value::Empty,
            ]
        })
        .collect();
    Table::from_rows(name, columns(), rows)
}

pub fn template_table() -> Table {
    let rows: Vec<(&str, &str, Option<f64>)> = INDICATORS.iter().map(|(id, c)| (*id, *c, None)).collect();
    assessment_table("template", &rows)
}

/// Assessment of the template indicators with the given scores, in order
pub fn model(model_id: &str, scores: [Option<f64>; 5]) -> Assessment {
    let rows: Vec<(&str, &str, Option<f64>)> = INDICATORS
        .iter()
        .zip(scores)
        .map(|((id, c), s)| (*id, *c, s))
        .collect();
    Assessment::from_table(model_id, assessment_table(model_id, &rows)).unwrap()
}

pub fn models() -> BTreeMap<String, Assessment> {
    let mut models = BTreeMap::new();
    for m in [
        model("alpha", [Some(1.0), Some(0.5), None, Some(0.0), Some(1.0)]),
        model("beta", [Some(1.0), Some(1.0), Some(0.5), None, None]),
    ] {
        models.insert(m.model_id.clone(), m);
    }
    models
}

/// CSV text of an assessment sheet
pub fn assessment_csv(rows: &[(&str, &str, &str)]) -> String {
    let mut csv = ASSESSMENT_COLUMNS.join(",");
    csv.push('\n');
    for (id, category, score) in rows {
        csv.push_str(&format!(
            "{},{},Findable,Essential,Indicator {},\"Description, with comma\",How to score,{},\n",
            id, category, id, score
        ));
    }
    csv
}

#[cfg(feature = "web")]
pub fn write_xlsx(path: &std::path::Path, sheets: &[(&str, Vec<Vec<Value>>)]) {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                match value {
                    Value::Number(n) => {
                        worksheet.write_number(r as u32, c as u16, *n).unwrap();
                    }
                    Value::Text(s) => {
                        worksheet.write_string(r as u32, c as u16, s).unwrap();
                    }
                    Value::Empty => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

pub fn text_row(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::parse(v)).collect()
}
