use crate::error::{ContactGraphError, Result};
use crate::loader::mapping::{is_missing, CsvMapping};

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use arrow_csv::reader::Format;
use arrow_csv::{ReaderBuilder, WriterBuilder};
use arrow_schema::{DataType, Field, Schema};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// A CSV file held as text cells
///
/// Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TextTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Text of `column` in `row`, `None` when the column is absent or the cell empty
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.index_of(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Columns whose present cells all parse as numbers
    ///
    /// Infinite values in these columns count as missing.
    pub fn numeric_columns(&self) -> HashSet<usize> {
        (0..self.columns.len())
            .filter(|&index| {
                let mut present = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(index)?.as_deref())
                    .filter(|text| !is_missing(text))
                    .peekable();
                present.peek().is_some() && present.all(|text| text.trim().parse::<f64>().is_ok())
            })
            .collect()
    }
}

/// Read a CSV file with a header row, every column as text
pub fn read_table(path: &Path) -> Result<TextTable> {
    if !path.exists() {
        return Err(ContactGraphError::Csv(format!(
            "CSV file not found: {}",
            path.display()
        )));
    }

    let schema = Arc::new(text_schema(path)?);
    let mut table = TextTable::new(schema.fields().iter().map(|f| f.name().clone()).collect());

    let file = File::open(path)?;
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .build(file)?;

    for batch in reader {
        let batch = batch?;
        let arrays = batch
            .columns()
            .iter()
            .map(|array| {
                array.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
                    ContactGraphError::Csv(format!("{} has a non-text column", path.display()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            table.rows.push(
                arrays
                    .iter()
                    .map(|array| array.is_valid(row).then(|| array.value(row).to_string()))
                    .collect(),
            );
        }
    }

    tracing::debug!("Read {} row(s) from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Write `table` with a header row, creating parent directories
pub fn write_table(path: &Path, table: &TextTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let schema = Arc::new(Schema::new(
        table
            .columns
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = (0..table.columns.len())
        .map(|index| {
            let array: StringArray = table
                .rows
                .iter()
                .map(|row| row.get(index).cloned().flatten())
                .collect();
            Arc::new(array) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema, arrays)?;

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch)?;

    tracing::debug!("Wrote {} row(s) to {}", table.rows.len(), path.display());
    Ok(())
}

/// Read a processed export into create inputs
pub fn read_inputs(path: &Path, mapping: &CsvMapping) -> Result<Vec<Map<String, Value>>> {
    let table = read_table(path)?;

    let present: Vec<&str> = mapping
        .columns
        .iter()
        .map(|(column, _)| column.as_str())
        .filter(|column| table.index_of(column).is_some())
        .collect();
    if present.is_empty() {
        return Err(ContactGraphError::Csv(format!(
            "{} has none of the expected columns",
            path.display()
        )));
    }
    for (column, _) in &mapping.columns {
        if !present.contains(&column.as_str()) {
            tracing::warn!("Column '{}' missing from {}", column, path.display());
        }
    }

    let numeric = table.numeric_columns();
    let is_infinite = |column: &str, text: &str| {
        table.index_of(column).map_or(false, |index| numeric.contains(&index))
            && text.trim().parse::<f64>().map_or(false, f64::is_infinite)
    };

    let inputs = (0..table.rows.len())
        .map(|row| {
            mapping.map_row(|column| {
                table
                    .cell(row, column)
                    .filter(|text| !is_infinite(column, *text))
            })
        })
        .collect();

    Ok(inputs)
}

/// Schema of the header row with every column as nullable text
fn text_schema(path: &Path) -> Result<Schema> {
    let file = File::open(path)?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(file, Some(0))?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| Field::new(field.name(), DataType::Utf8, true))
        .collect();

    Ok(Schema::new(fields))
}
