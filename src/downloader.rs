use crate::table::{Table, Value};

#[cfg(feature = "web")]
use crate::assessment::{ASSESSMENT, CATEGORY, COMMENT, ID, INDICATOR, PRIORITY, SUBCATEGORY};
#[cfg(feature = "web")]
use crate::error::Result;
#[cfg(feature = "web")]
use crate::indicators::IndicatorSummary;

/// Convert a table to CSV format
///
/// Writes the column names as header row. Fields containing commas, quotes
/// or newlines are quoted with inner quotes doubled.
///
/// # Arguments
/// * `table` - Reference to the table to convert
///
/// # Returns
/// * `String` - CSV content, one line per row after the header
///
/// # Examples
/// ```
/// use fairvis::table::{Table, Value};
/// use fairvis::downloader::to_csv;
///
/// let table = Table::from_rows(
///     "scores",
///     vec!["ID".to_string(), "Assessment".to_string()],
///     vec![vec![Value::from("F1"), Value::Number(0.5)]],
/// );
/// assert_eq!(to_csv(&table), "ID,Assessment\nF1,0.5\n");
/// ```
pub fn to_csv(table: &Table) -> String {
    let mut csv_content = String::new();

    let header: Vec<String> = table.columns().iter().map(|c| escape_field(c)).collect();
    csv_content.push_str(&header.join(","));
    csv_content.push('\n');

    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|v| escape_field(&v.to_string())).collect();
        csv_content.push_str(&fields.join(","));
        csv_content.push('\n');
    }

    csv_content
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Convert a table to XLSX format
///
/// Numbers are written as numbers, the header row is bold. The sheet is
/// named after the table, cut to what Excel accepts.
///
/// # Arguments
/// * `table` - Reference to the table to convert
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use fairvis::table::{Table, Value};
/// use fairvis::downloader::to_xlsx;
///
/// let table = Table::from_rows(
///     "scores",
///     vec!["ID".to_string(), "Assessment".to_string()],
///     vec![vec![Value::from("F1"), Value::Number(1.0)]],
/// );
/// match to_xlsx(&table) {
///     Ok(xlsx_data) => println!("XLSX generated: {} bytes", xlsx_data.len()),
///     Err(e) => eprintln!("Failed to generate XLSX: {}", e),
/// }
/// ```
#[cfg(feature = "web")]
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(&table.name))?;

    let bold = Format::new().set_bold();
    for (c, column) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, column, &bold)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let (r, c) = ((r + 1) as u32, c as u16);
            match value {
                Value::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                Value::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Value::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Blank assessment template listing every indicator of the catalogue
///
/// The `Assessment` column is left empty for the model author to fill in
/// with NA, 0, 0.5 or 1.
///
/// # Arguments
/// * `summary` - The indicator catalogue to list
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content with a single `assessment` sheet
///
/// # Examples
/// ```no_run
/// use fairvis::catalog::Catalog;
/// use fairvis::config::Settings;
/// use fairvis::downloader::template_xlsx;
///
/// let catalog = Catalog::load(&Settings::default()).unwrap();
/// std::fs::write("template.xlsx", template_xlsx(&catalog.indicators).unwrap()).unwrap();
/// ```
#[cfg(feature = "web")]
pub fn template_xlsx(summary: &IndicatorSummary) -> Result<Vec<u8>> {
    let columns: Vec<String> = [ID, CATEGORY, SUBCATEGORY, PRIORITY, INDICATOR, ASSESSMENT, COMMENT]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let optional = |s: &Option<String>| s.as_deref().map(Value::from).unwrap_or(Value::Empty);
    let rows = summary
        .indicators
        .iter()
        .map(|i| {
            vec![
                Value::from(i.id.as_str()),
                Value::from(i.category.as_str()),
                optional(&i.subcategory),
                optional(&i.priority),
                optional(&i.indicator),
                Value::Empty,
                Value::Empty,
            ]
        })
        .collect();
    to_xlsx(&Table::from_rows("assessment", columns, rows))
}

// Excel sheet names: at most 31 characters, none of []:*?/\
#[cfg(feature = "web")]
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
