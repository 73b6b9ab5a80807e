//! Delimited-text readers and writers for expression tables and result sets.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, info};

use crate::data::{ExpressionRecord, ExpressionTable, TextColumn, FUNCTION_COLUMN, GENE_ID_COLUMN};
use crate::error::{ExpressionError, Result};
use crate::testing::{DifferentialExpressionResults, GeneResult};

pub const LOG2_FC_COLUMN: &str = "log2FoldChange";
pub const P_VALUE_COLUMN: &str = "p_value";

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ExpressionError::io(path, e))
}

pub(crate) fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExpressionError::io(parent, e))?;
    }
    File::create(path).map_err(|e| ExpressionError::io(path, e))
}

fn column_position(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn optional_text(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read an expression table from a CSV file.
pub fn read_expression_table(path: impl AsRef<Path>) -> Result<ExpressionTable> {
    let path = path.as_ref();
    let table = parse_expression_table(open(path)?)?;
    info!(
        path = %path.display(),
        genes = table.n_genes(),
        samples = table.n_samples(),
        "loaded expression table"
    );
    Ok(table)
}

/// Parse an expression table from CSV text.
///
/// `Gene_ID` is required and `Function` is optional. Every other column whose
/// cells all hold finite numbers is a sample column; the rest are kept as
/// [`TextColumn`]s and only fail once they are requested for a computation.
pub fn parse_expression_table<R: Read>(reader: R) -> Result<ExpressionTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let gene_col = column_position(&headers, GENE_ID_COLUMN).ok_or(ExpressionError::MissingKeyColumn {
        column: GENE_ID_COLUMN,
    })?;
    let function_col = column_position(&headers, FUNCTION_COLUMN);
    let other_cols: Vec<usize> = (0..headers.len())
        .filter(|&i| i != gene_col && Some(i) != function_col)
        .collect();

    let mut gene_ids = Vec::new();
    let mut functions = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); other_cols.len()];
    for row in rdr.records() {
        let row = row?;
        gene_ids.push(row.get(gene_col).map(str::trim).unwrap_or_default().to_string());
        functions.push(function_col.and_then(|col| optional_text(row.get(col))));
        for (column, &col) in cells.iter_mut().zip(&other_cols) {
            column.push(row.get(col).map(str::trim).unwrap_or_default().to_string());
        }
    }

    let mut sample_names = Vec::new();
    let mut sample_values: Vec<Vec<f64>> = Vec::new();
    let mut text_columns = Vec::new();
    for (&col, column) in other_cols.iter().zip(cells) {
        let name = headers[col].trim().to_string();
        let parsed: Option<Vec<f64>> = column
            .iter()
            .map(|cell| cell.parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect();
        match parsed {
            Some(values) => {
                sample_names.push(name);
                sample_values.push(values);
            }
            None => text_columns.push(TextColumn { name, cells: column }),
        }
    }

    let records: Vec<ExpressionRecord> = gene_ids
        .into_iter()
        .zip(functions)
        .enumerate()
        .map(|(idx, (gene_id, function))| ExpressionRecord {
            gene_id,
            function,
            values: sample_values.iter().map(|column| column[idx]).collect(),
        })
        .collect();

    let n_records = records.len();
    if !text_columns.is_empty() {
        let names: Vec<&str> = text_columns.iter().map(|c| c.name.as_str()).collect();
        debug!(columns = ?names, "kept non-numeric columns as text");
    }
    let table = ExpressionTable::from_records(sample_names, records)?.with_text_columns(text_columns)?;
    // A Function header with only empty cells still counts as present.
    if function_col.is_some() && !table.has_functions() {
        return table.with_functions(vec![None; n_records]);
    }
    Ok(table)
}

fn format_p_value(p_value: Option<f64>) -> String {
    p_value.map_or_else(|| "NaN".to_string(), |p| p.to_string())
}

/// Write a result set as `Gene_ID,log2FoldChange,p_value[,Function]`.
pub fn write_results_to<W: Write>(writer: W, results: &DifferentialExpressionResults) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    let with_function = results.has_functions();

    let mut header = vec![GENE_ID_COLUMN, LOG2_FC_COLUMN, P_VALUE_COLUMN];
    if with_function {
        header.push(FUNCTION_COLUMN);
    }
    wtr.write_record(&header)?;

    for result in results.iter() {
        let mut row = vec![
            result.gene_id.clone(),
            result.log2_fold_change.to_string(),
            format_p_value(result.p_value),
        ];
        if with_function {
            row.push(result.function.clone().unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush().map_err(|e| ExpressionError::io("<results>", e))
}

pub fn write_results(path: impl AsRef<Path>, results: &DifferentialExpressionResults) -> Result<()> {
    let path = path.as_ref();
    write_results_to(create(path)?, results)?;
    info!(path = %path.display(), genes = results.len(), "saved differential expression results");
    Ok(())
}

/// Parse a result set previously written by [`write_results_to`].
pub fn parse_results<R: Read>(reader: R) -> Result<DifferentialExpressionResults> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let gene_col = column_position(&headers, GENE_ID_COLUMN).ok_or(ExpressionError::MissingKeyColumn {
        column: GENE_ID_COLUMN,
    })?;
    let fc_col = column_position(&headers, LOG2_FC_COLUMN).ok_or_else(|| ExpressionError::UnknownColumn {
        column: LOG2_FC_COLUMN.to_string(),
    })?;
    let p_col = column_position(&headers, P_VALUE_COLUMN).ok_or_else(|| ExpressionError::UnknownColumn {
        column: P_VALUE_COLUMN.to_string(),
    })?;
    let function_col = column_position(&headers, FUNCTION_COLUMN);

    let mut results = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let gene_id = row.get(gene_col).map(str::trim).unwrap_or_default().to_string();
        if gene_id.is_empty() {
            return Err(ExpressionError::MissingValue {
                gene_id: format!("<row {}>", results.len() + 1),
                column: GENE_ID_COLUMN.to_string(),
            });
        }

        let fc_cell = row.get(fc_col).map(str::trim).unwrap_or_default();
        let log2_fold_change = fc_cell.parse::<f64>().map_err(|_| ExpressionError::NonNumeric {
            gene_id: gene_id.clone(),
            column: LOG2_FC_COLUMN.to_string(),
            value: fc_cell.to_string(),
        })?;

        let p_cell = row.get(p_col).map(str::trim).unwrap_or_default();
        let p_value = if p_cell.is_empty() {
            None
        } else {
            let p = p_cell.parse::<f64>().map_err(|_| ExpressionError::NonNumeric {
                gene_id: gene_id.clone(),
                column: P_VALUE_COLUMN.to_string(),
                value: p_cell.to_string(),
            })?;
            p.is_finite().then_some(p)
        };

        results.push(GeneResult {
            gene_id,
            log2_fold_change,
            p_value,
            function: function_col.and_then(|col| optional_text(row.get(col))),
        });
    }

    debug!(genes = results.len(), has_function = function_col.is_some(), "parsed result set");
    Ok(DifferentialExpressionResults::new(results, function_col.is_some()))
}

pub fn read_results(path: impl AsRef<Path>) -> Result<DifferentialExpressionResults> {
    parse_results(open(path.as_ref())?)
}
