use calamine::{Data, Range, Reader, Xlsx, open_workbook, open_workbook_from_rs};
use log::{debug, info};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::error::{FairError, Result};
use crate::table::{Table, Value};

/// All sheets of a spreadsheet file, in workbook order
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    pub sheets: Vec<Table>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|t| t.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn first(&self) -> Option<&Table> {
        self.sheets.first()
    }

    pub fn into_first(self) -> Option<Table> {
        self.sheets.into_iter().next()
    }
}

/// Load a table from a CSV file
///
/// The table is named after the file stem. The first line is the header.
/// Bytes that are not valid UTF-8 (e.g. Latin-1 exports from Excel) are
/// replaced instead of failing the whole file, the same as for uploads.
///
/// # Arguments
/// * `filepath` - Path to the CSV file
///
/// # Returns
/// * `Result<Table>` - The loaded table or an error
///
/// # Examples
/// ```no_run
/// use fairvis::loader::from_csv;
///
/// match from_csv("data/assessments/BioModels_curated.csv") {
///     Ok(table) => println!("Loaded {} rows", table.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Table> {
    let path = filepath.as_ref();
    let bytes = fs::read(path)?;
    csv_from_str(&file_stem(path), &String::from_utf8_lossy(&bytes))
}

/// Parse CSV text into a table
///
/// Quoted fields may contain commas, doubled quotes and line breaks.
/// Blank lines are ignored.
///
/// # Arguments
/// * `name` - Name given to the table, usually the file stem
/// * `content` - The CSV text, optionally starting with a byte order mark
///
/// # Returns
/// * `Result<Table>` - The parsed table, or `FairError::Csv` for an empty
///   file or an unterminated quoted field
///
/// # Examples
/// ```
/// use fairvis::loader::csv_from_str;
///
/// let table = csv_from_str("scores", "ID,Assessment\nF1,0.5\nA1,NA\n").unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.number(0, "Assessment"), Some(0.5));
/// assert_eq!(table.number(1, "Assessment"), None);
/// ```
pub fn csv_from_str(name: &str, content: &str) -> Result<Table> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let records = split_csv_records(name, content)?;

    let mut records = records.into_iter();
    let Some((_, header)) = records.next() else {
        return Err(FairError::Csv {
            name: name.to_string(),
            line: 1,
            message: "CSV file is empty".to_string(),
        });
    };

    let mut table = Table::new(name, header);
    for (line, fields) in records {
        if fields.len() > table.columns().len() {
            debug!("{}: line {} has {} fields, extra fields dropped", name, line, fields.len());
        }
        table.push_row(fields.iter().map(|f| Value::parse(f)).collect());
    }
    Ok(table)
}

// Split CSV content into records of fields, each tagged with its starting line
fn split_csv_records(name: &str, content: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut pending = String::new();
    let mut start_line = 0;

    for (i, line) in content.lines().enumerate() {
        if pending.is_empty() {
            if line.trim().is_empty() {
                continue;
            }
            start_line = i + 1;
        } else {
            pending.push('\n');
        }
        pending.push_str(line);

        // A record continues on the next line while a quoted field is open
        if let Some(fields) = parse_csv_row(&pending) {
            records.push((start_line, fields));
            pending.clear();
        }
    }

    if !pending.is_empty() {
        return Err(FairError::Csv {
            name: name.to_string(),
            line: start_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    Ok(records)
}

// Parse one CSV record into a vector of strings, `None` while a quoted
// field is still open. A quote only opens a field at its first character,
// so `5" wide` stays a plain field.
fn parse_csv_row(line: &str) -> Option<Vec<String>> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field_start => in_quotes = true,
            ',' if !in_quotes => {
                result.push(std::mem::take(&mut current_field));
                field_start = true;
                continue;
            }
            _ => current_field.push(c),
        }
        field_start = false;
    }

    if in_quotes {
        return None;
    }
    result.push(current_field);
    Some(result)
}

/// Load every worksheet of an Excel file
///
/// # Arguments
/// * `filepath` - Path to the `.xlsx` file
///
/// # Returns
/// * `Result<Workbook>` - One table per worksheet, in workbook order
///
/// # Examples
/// ```no_run
/// use fairvis::loader::from_excel;
///
/// match from_excel("data/FAIR_assessment_template.xlsx") {
///     Ok(workbook) => println!("Sheets: {:?}", workbook.sheet_names()),
///     Err(e) => eprintln!("Error loading Excel: {}", e),
/// }
/// ```
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<Workbook> {
    let mut workbook: Xlsx<_> = open_workbook(filepath.as_ref())?;
    read_sheets(&mut workbook)
}

/// Load every worksheet of an in-memory Excel file (e.g. an upload)
///
/// # Arguments
/// * `bytes` - Contents of an `.xlsx` file
///
/// # Returns
/// * `Result<Workbook>` - One table per worksheet, in workbook order
///
/// # Examples
/// ```no_run
/// use fairvis::loader::excel_from_bytes;
///
/// let bytes = std::fs::read("assessment.xlsx").unwrap();
/// match excel_from_bytes(&bytes) {
///     Ok(workbook) => println!("Sheets: {:?}", workbook.sheet_names()),
///     Err(e) => eprintln!("Not a workbook: {}", e),
/// }
/// ```
pub fn excel_from_bytes(bytes: &[u8]) -> Result<Workbook> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;
    read_sheets(&mut workbook)
}

fn read_sheets<R: std::io::Read + std::io::Seek>(workbook: &mut Xlsx<R>) -> Result<Workbook> {
    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;
        sheets.push(range_to_table(&sheet_name, &range));
    }
    Ok(Workbook { sheets })
}

// First row of the used range is the header; fully empty rows are skipped
fn range_to_table(name: &str, range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_name).collect(),
        None => return Table::new(name, Vec::new()),
    };

    let mut table = Table::new(name, header);
    for row in rows {
        let values: Vec<Value> = row.iter().map(cell_value).collect();
        if values.iter().all(Value::is_empty) {
            continue;
        }
        table.push_row(values);
    }
    table
}

// Header cells keep their text as written, so "1.0" stays "1.0"
fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => cell_value(other).to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) if f.is_nan() => Value::Empty,
        Data::Float(f) => Value::Number(*f),
        Data::String(s) => Value::parse(s),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::Empty | Data::Error(_) => Value::Empty,
        other => Value::Text(other.to_string()),
    }
}

/// Detect file type and load the appropriate format
///
/// A CSV file becomes a single-sheet workbook named after the file stem, a
/// directory becomes one sheet per CSV file inside it.
///
/// # Arguments
/// * `filepath` - A `.csv`, `.xlsx` or `.xlsm` file, or a directory of CSV files
///
/// # Returns
/// * `Result<Workbook>` - The loaded sheets, or `FairError::UnsupportedFormat`
///   for any other extension
///
/// # Examples
/// ```no_run
/// use fairvis::loader::load_workbook;
///
/// match load_workbook("indicators.xlsx") {
///     Ok(workbook) => println!("Sheets: {:?}", workbook.sheet_names()),
///     Err(e) => eprintln!("Error loading file: {}", e),
/// }
/// ```
pub fn load_workbook(filepath: impl AsRef<Path>) -> Result<Workbook> {
    let path = filepath.as_ref();
    info!("Loading {}", path.display());

    if path.is_dir() {
        return csv_directory(path);
    }

    match extension(path).as_deref() {
        Some("csv") => Ok(Workbook {
            sheets: vec![from_csv(path)?],
        }),
        Some("xlsx") | Some("xlsm") => from_excel(path),
        Some(ext) => Err(FairError::UnsupportedFormat(ext.to_string())),
        None => Err(FairError::UnsupportedFormat(format!(
            "{} has no extension",
            path.display()
        ))),
    }
}

/// Load the first sheet of a file
///
/// # Arguments
/// * `filepath` - Any file [`load_workbook`] accepts
///
/// # Returns
/// * `Result<Table>` - The first sheet, or `FairError::MissingSheet` when the
///   workbook has none
pub fn load_table(filepath: impl AsRef<Path>) -> Result<Table> {
    let path = filepath.as_ref();
    load_workbook(path)?
        .into_first()
        .ok_or_else(|| FairError::MissingSheet(format!("{} (first sheet)", path.display())))
}

/// Same dispatch as [`load_workbook`] for uploaded file contents
///
/// # Arguments
/// * `filename` - Name the client sent; only its extension and stem are used
/// * `bytes` - The uploaded file contents
///
/// # Returns
/// * `Result<Workbook>` - The parsed sheets or an error
///
/// # Examples
/// ```
/// use fairvis::loader::workbook_from_upload;
///
/// let workbook = workbook_from_upload("model.csv", b"ID,Assessment\nF1,1\n").unwrap();
/// assert_eq!(workbook.sheet_names(), vec!["model"]);
/// ```
pub fn workbook_from_upload(filename: &str, bytes: &[u8]) -> Result<Workbook> {
    let path = Path::new(filename);
    match extension(path).as_deref() {
        Some("csv") => {
            let content = String::from_utf8_lossy(bytes);
            Ok(Workbook {
                sheets: vec![csv_from_str(&file_stem(path), &content)?],
            })
        }
        Some("xlsx") | Some("xlsm") => excel_from_bytes(bytes),
        Some(ext) => Err(FairError::UnsupportedFormat(ext.to_string())),
        None => Err(FairError::UnsupportedFormat(format!("{} has no extension", filename))),
    }
}

fn csv_directory(dir: &Path) -> Result<Workbook> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| extension(p).as_deref() == Some("csv"))
        .collect();
    paths.sort();

    let sheets = paths.iter().map(from_csv).collect::<Result<Vec<_>>>()?;
    Ok(Workbook { sheets })
}

pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string()
}
