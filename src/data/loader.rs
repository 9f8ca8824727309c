use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    Dataset, Demographic, Metric, Record, SupportedFilters, SCHOOL_COLUMN, YEAR_COLUMN,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a survey file could not be turned into a [`Dataset`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet file: {0}")]
    Parquet(#[from] ParquetError),

    #[error("unreadable parquet column: {0}")]
    Arrow(#[from] ArrowError),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("data row {row}: invalid value {value:?} in column '{column}'")]
    Malformed {
        row: usize,
        column: String,
        value: String,
    },

    #[error("file contains a header but no survey responses")]
    NoRecords,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text, delimiter sniffed from the header
/// * `.tsv`          – tab-delimited text
/// * `.json`         – `[{ "Skóli": "...", "Ár": 2023, ... }, ...]`
/// * `.parquet`      – flat table with one column per field
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => parse_delimited(&read_text(path)?, None),
        "tsv" => parse_delimited(&read_text(path)?, Some(b'\t')),
        "json" => parse_json(&read_text(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Load-once cache
// ---------------------------------------------------------------------------

/// Memoizes loaded datasets per path so a file is parsed at most once.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    /// Return the cached dataset for `path`, loading it on first use.
    /// Failed loads are not cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        if let Some(dataset) = self.entries.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_file(path)?);
        log::info!(
            "Loaded {} responses from {} ({} schools, years {:?}, filters {:?})",
            dataset.len(),
            path.display(),
            dataset.schools.len(),
            dataset.years,
            dataset.supported.iter().collect::<Vec<_>>()
        );
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Cell – one raw value before schema validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Cell {
    fn from_text(s: &str) -> Cell {
        if s.trim().is_empty() {
            Cell::Null
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    /// `Ok(None)` for a missing value, `Err(())` for something that is not a number.
    fn number(&self) -> Result<Option<f64>, ()> {
        let value = match self {
            Cell::Null => return Ok(None),
            Cell::Integer(i) => *i as f64,
            Cell::Float(f) => *f,
            Cell::Bool(_) => return Err(()),
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<f64>()
                    .or_else(|_| s.replace(',', ".").parse::<f64>())
                    .map_err(|_| ())?
            }
        };
        if value.is_nan() {
            Ok(None)
        } else if value.is_infinite() {
            Err(())
        } else {
            Ok(Some(value))
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => Ok(()),
        }
    }
}

static NULL_CELL: Cell = Cell::Null;

/// Column names plus rows of raw cells, as read from any supported format.
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Parse delimited text with a header row.  When `delimiter` is `None` it is
/// sniffed from the header line.
pub fn parse_delimited(text: &str, delimiter: Option<u8>) -> Result<Dataset, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(text));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    into_dataset(RawTable { columns, rows })
}

/// Pick whichever of `,` `;` `\t` occurs most often in the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let mut best = (b',', 0);
    for candidate in [b',', b';', b'\t'] {
        let count = header.bytes().filter(|b| *b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Skóli": "Akurskóli", "Ár": 2023, "Líðan": 7.5, ... },
///   ...
/// ]
/// ```
pub fn parse_json(text: &str) -> Result<Dataset, LoadError> {
    let root: Vec<serde_json::Map<String, JsonValue>> = serde_json::from_str(text)?;

    let mut columns: Vec<String> = Vec::new();
    for obj in &root {
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = root
        .iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    into_dataset(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::from_text(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); categorical columns are read through
/// their display value.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_to_cell(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
    }

    into_dataset(RawTable { columns, rows })
}

/// Extract a single value from an Arrow column at a given row.
fn arrow_to_cell(col: &ArrayRef, row: usize) -> Result<Cell, ArrowError> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::from_text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::from_text(col.as_string::<i64>().value(row)),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        _ => Cell::from_text(&array_value_to_string(col, row)?),
    };
    Ok(cell)
}

// ---------------------------------------------------------------------------
// Schema validation: RawTable -> Dataset
// ---------------------------------------------------------------------------

fn into_dataset(table: RawTable) -> Result<Dataset, LoadError> {
    let position = |name: &str| table.columns.iter().position(|c| c == name);

    let mut missing = Vec::new();
    let mut require = |name: &str| {
        let idx = position(name);
        if idx.is_none() {
            missing.push(name.to_string());
        }
        idx
    };

    let school_idx = require(SCHOOL_COLUMN);
    let year_idx = require(YEAR_COLUMN);
    let metric_idx: Vec<Option<usize>> = Metric::ALL.iter().map(|m| require(m.column())).collect();

    let (Some(school_idx), Some(year_idx), true) =
        (school_idx, year_idx, missing.is_empty())
    else {
        return Err(LoadError::MissingColumns(missing));
    };
    let metric_idx: Vec<usize> = metric_idx.into_iter().flatten().collect();

    let mut supported = SupportedFilters::default();
    let demographic_idx: Vec<(Demographic, usize)> = Demographic::ALL
        .iter()
        .filter_map(|d| position(d.column()).map(|idx| (*d, idx)))
        .collect();
    for (demographic, _) in &demographic_idx {
        supported.set(*demographic, true);
    }

    if table.rows.is_empty() {
        return Err(LoadError::NoRecords);
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(&NULL_CELL);
        let malformed = |column: &str, bad: &Cell| LoadError::Malformed {
            row: row_no,
            column: column.to_string(),
            value: bad.to_string(),
        };

        let school_cell = cell(school_idx);
        let school = school_cell
            .text()
            .ok_or_else(|| malformed(SCHOOL_COLUMN, school_cell))?;

        let year_cell = cell(year_idx);
        let year = year_cell
            .integer()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| malformed(YEAR_COLUMN, year_cell))?;

        let mut record = Record::new(school, year);

        for (metric, idx) in Metric::ALL.iter().zip(&metric_idx) {
            let metric_cell = cell(*idx);
            record.metrics[metric.index()] = metric_cell
                .number()
                .map_err(|_| malformed(metric.column(), metric_cell))?;
        }

        for (demographic, idx) in &demographic_idx {
            if let Some(value) = cell(*idx).text() {
                record = record.with_demographic(*demographic, value);
            }
        }

        records.push(record);
    }

    Ok(Dataset::new(records, supported))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "Skóli,Ár,Kyn,Bakgrunnur,Fjárhagsstaða,Bekkur,Líðan,Kvíði,Einmanaleiki,Skjástund,Tengsl við kennara,Ánægja með skólann";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn parses_full_schema() {
        let text = csv_text(&[
            "Akurskóli,2022,Stúlka,Íslenskur,Góð,8,7.5,3,2,5,8,7",
            "Holtaskóli,2023,Drengur,Erlendur,Slæm,9,6,4,3,6,7,6",
        ]);
        let ds = parse_delimited(&text, None).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.supported, SupportedFilters::all());
        assert_eq!(ds.schools, vec!["Akurskóli", "Holtaskóli"]);
        assert_eq!(ds.years, vec![2022, 2023]);

        let first = &ds.records[0];
        assert_eq!(first.metric(Metric::Wellbeing), Some(7.5));
        assert_eq!(first.metric(Metric::SchoolSatisfaction), Some(7.0));
        assert_eq!(first.demographic(Demographic::Grade), Some("8"));
        assert_eq!(first.demographic(Demographic::FinancialStatus), Some("Góð"));
    }

    #[test]
    fn reports_every_missing_column() {
        let text = "Skóli,Líðan,Kvíði,Einmanaleiki,Skjástund,Tengsl við kennara\nA,1,2,3,4,5";
        match parse_delimited(text, None) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Ár", "Ánægja með skólann"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let text = HEADER.replace("Skóli", "skóli") + "\nA,2022,,,,,1,2,3,4,5,6";
        assert!(matches!(
            parse_delimited(&text, None),
            Err(LoadError::MissingColumns(cols)) if cols == vec!["Skóli"]
        ));
    }

    #[test]
    fn strips_byte_order_mark() {
        let text = format!("\u{feff}{}", csv_text(&["A,2022,,,,,1,2,3,4,5,6"]));
        let ds = parse_delimited(&text, None).unwrap();
        assert_eq!(ds.schools, vec!["A"]);
    }

    #[test]
    fn sniffs_semicolons_and_decimal_commas() {
        let text = format!(
            "{}\nA;2022;Stúlka;Íslenskur;Góð;8;7,5;3;2;5;8;7",
            HEADER.replace(',', ";")
        );
        let ds = parse_delimited(&text, None).unwrap();
        assert_eq!(ds.records[0].metric(Metric::Wellbeing), Some(7.5));
        assert_eq!(ds.records[0].demographic(Demographic::Gender), Some("Stúlka"));
    }

    #[test]
    fn blank_metric_cells_are_missing() {
        let text = csv_text(&["A,2022,,,,,,3,2,5,8,7"]);
        let ds = parse_delimited(&text, None).unwrap();
        let record = &ds.records[0];
        assert_eq!(record.metric(Metric::Wellbeing), None);
        assert_eq!(record.metric(Metric::Anxiety), Some(3.0));
        assert_eq!(record.demographic(Demographic::Gender), None);
        assert!(ds.options[&Demographic::Gender].is_empty());
    }

    #[test]
    fn rejects_non_numeric_metric() {
        let text = csv_text(&["A,2022,,,,,1,2,3,4,5,6", "A,2022,,,,,1,mikill,3,4,5,6"]);
        match parse_delimited(&text, None) {
            Err(LoadError::Malformed { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Kvíði");
                assert_eq!(value, "mikill");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_year() {
        let text = csv_text(&["A,,,,,,1,2,3,4,5,6"]);
        assert!(matches!(
            parse_delimited(&text, None),
            Err(LoadError::Malformed { column, .. }) if column == "Ár"
        ));
    }

    #[test]
    fn header_only_is_an_error() {
        assert!(matches!(parse_delimited(HEADER, None), Err(LoadError::NoRecords)));
    }

    #[test]
    fn demographic_columns_are_optional() {
        let text = "Skóli,Ár,Líðan,Kvíði,Einmanaleiki,Skjástund,Tengsl við kennara,Ánægja með skólann\nA,2022,1,2,3,4,5,6";
        let ds = parse_delimited(text, None).unwrap();
        assert_eq!(ds.supported, SupportedFilters::default());
        assert!(ds.options.is_empty());
    }

    #[test]
    fn parses_records_json() {
        let text = r#"[
            {"Skóli": "A", "Ár": 2022, "Kyn": "Stúlka", "Líðan": 7, "Kvíði": 3.5,
             "Einmanaleiki": null, "Skjástund": 5, "Tengsl við kennara": 8, "Ánægja með skólann": 7},
            {"Skóli": "B", "Ár": 2023.0, "Líðan": 6, "Kvíði": 4,
             "Einmanaleiki": 2, "Skjástund": 6, "Tengsl við kennara": 7, "Ánægja með skólann": 6}
        ]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.supported.supports(Demographic::Gender));
        assert!(!ds.supported.supports(Demographic::Grade));
        assert_eq!(ds.records[0].metric(Metric::Anxiety), Some(3.5));
        assert_eq!(ds.records[0].metric(Metric::Loneliness), None);
        assert_eq!(ds.records[1].year, 2023);
        assert_eq!(ds.records[1].demographic(Demographic::Gender), None);
    }

    #[test]
    fn loads_parquet_file() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let mut fields = vec![
            Field::new(SCHOOL_COLUMN, DataType::Utf8, false),
            Field::new(YEAR_COLUMN, DataType::Int64, false),
        ];
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["A", "B"])),
            Arc::new(Int64Array::from(vec![2022, 2023])),
        ];
        for metric in Metric::ALL {
            fields.push(Field::new(metric.column(), DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(vec![Some(7.0), None])));
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.schools, vec!["A", "B"]);
        assert_eq!(ds.records[0].metric(Metric::Wellbeing), Some(7.0));
        assert_eq!(ds.records[1].metric(Metric::Wellbeing), None);
    }

    #[test]
    fn cache_reads_each_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", csv_text(&["A,2022,,,,,1,2,3,4,5,6"])).unwrap();
        drop(file);

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&path).unwrap();

        // A second lookup must not touch the file system again.
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let mut cache = DatasetCache::default();
        assert!(matches!(cache.get_or_load(&path), Err(LoadError::Io { .. })));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            load_file(Path::new("survey.xlsx")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }
}
