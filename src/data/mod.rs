//! In-memory expression table keyed by gene identifier.
//!
//! The table stores replicate measurements as a dense genes × samples matrix.
//! Whether a `Function` annotation is present is decided once, when the table
//! is built, and exposed through [`ExpressionTable::has_functions`].

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{ExpressionError, Result};

pub mod annotation;
pub mod io;

pub const GENE_ID_COLUMN: &str = "Gene_ID";
pub const FUNCTION_COLUMN: &str = "Function";

/// One row of an expression table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRecord {
    pub gene_id: String,
    pub function: Option<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ExpressionTable {
    gene_ids: Vec<String>,
    functions: Option<Vec<Option<String>>>,
    sample_names: Vec<String>,
    values: Array2<f64>,
    text_columns: Vec<TextColumn>,
    gene_index: HashMap<String, usize>,
}

/// A column kept as raw text because not every cell holds a number.
///
/// Such columns never enter a computation. Requesting one as a sample column
/// reports the first cell that is missing or not a number.
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
    pub name: String,
    pub cells: Vec<String>,
}

impl TextColumn {
    fn first_invalid_cell(&self, gene_ids: &[String]) -> Option<ExpressionError> {
        self.cells.iter().zip(gene_ids).find_map(|(cell, gene_id)| {
            let cell = cell.trim();
            match cell.parse::<f64>() {
                Ok(value) if value.is_finite() => None,
                Err(_) if !cell.is_empty() => Some(ExpressionError::NonNumeric {
                    gene_id: gene_id.clone(),
                    column: self.name.clone(),
                    value: cell.to_string(),
                }),
                _ => Some(ExpressionError::MissingValue {
                    gene_id: gene_id.clone(),
                    column: self.name.clone(),
                }),
            }
        })
    }
}

impl ExpressionTable {
    /// Build a table from a genes × samples matrix.
    ///
    /// Gene ids must be non-empty and unique, and every cell must hold a
    /// finite measurement.
    pub fn new(
        gene_ids: Vec<String>,
        sample_names: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self> {
        if values.nrows() != gene_ids.len() || values.ncols() != sample_names.len() {
            return Err(ExpressionError::ShapeMismatch {
                expected: format!("{} x {}", gene_ids.len(), sample_names.len()),
                found: format!("{} x {}", values.nrows(), values.ncols()),
            });
        }

        let mut gene_index = HashMap::with_capacity(gene_ids.len());
        for (idx, gene_id) in gene_ids.iter().enumerate() {
            if gene_id.trim().is_empty() {
                return Err(ExpressionError::MissingValue {
                    gene_id: format!("<row {}>", idx + 1),
                    column: GENE_ID_COLUMN.to_string(),
                });
            }
            if gene_index.insert(gene_id.clone(), idx).is_some() {
                return Err(ExpressionError::DuplicateGene {
                    gene_id: gene_id.clone(),
                });
            }
        }

        for ((row, col), &value) in values.indexed_iter() {
            if !value.is_finite() {
                return Err(ExpressionError::MissingValue {
                    gene_id: gene_ids[row].clone(),
                    column: sample_names[col].clone(),
                });
            }
        }

        Ok(ExpressionTable {
            gene_ids,
            functions: None,
            sample_names,
            values,
            text_columns: Vec::new(),
            gene_index,
        })
    }

    /// Build a table from records sharing one sample layout.
    ///
    /// The function column is considered present if any record carries one.
    pub fn from_records(sample_names: Vec<String>, records: Vec<ExpressionRecord>) -> Result<Self> {
        let n_samples = sample_names.len();
        let mut gene_ids = Vec::with_capacity(records.len());
        let mut functions = Vec::with_capacity(records.len());
        let mut flat = Vec::with_capacity(records.len() * n_samples);

        for record in records {
            if record.values.len() != n_samples {
                return Err(ExpressionError::ShapeMismatch {
                    expected: format!("{n_samples} values for gene `{}`", record.gene_id),
                    found: record.values.len().to_string(),
                });
            }
            flat.extend_from_slice(&record.values);
            gene_ids.push(record.gene_id);
            functions.push(record.function);
        }

        let values = Array2::from_shape_vec((gene_ids.len(), n_samples), flat).map_err(|e| {
            ExpressionError::ShapeMismatch {
                expected: format!("{} x {n_samples}", gene_ids.len()),
                found: e.to_string(),
            }
        })?;

        let has_functions = functions.iter().any(Option::is_some);
        let table = ExpressionTable::new(gene_ids, sample_names, values)?;
        if has_functions {
            table.with_functions(functions)
        } else {
            Ok(table)
        }
    }

    /// Attach a function column, one entry per gene in table order.
    pub fn with_functions(mut self, functions: Vec<Option<String>>) -> Result<Self> {
        if functions.len() != self.gene_ids.len() {
            return Err(ExpressionError::ShapeMismatch {
                expected: format!("{} function entries", self.gene_ids.len()),
                found: functions.len().to_string(),
            });
        }
        self.functions = Some(functions);
        Ok(self)
    }

    /// Attach columns that hold text rather than measurements.
    pub fn with_text_columns(mut self, columns: Vec<TextColumn>) -> Result<Self> {
        if let Some(column) = columns.iter().find(|c| c.cells.len() != self.gene_ids.len()) {
            return Err(ExpressionError::ShapeMismatch {
                expected: format!("{} cells in column `{}`", self.gene_ids.len(), column.name),
                found: column.cells.len().to_string(),
            });
        }
        self.text_columns = columns;
        Ok(self)
    }

    /// Attach functions from an annotation map keyed by gene id.
    ///
    /// Genes without an annotation get `None`; the table is marked as carrying
    /// a function column either way.
    pub fn join_functions(self, annotations: &HashMap<String, String>) -> Self {
        let functions = self
            .gene_ids
            .iter()
            .map(|gene_id| annotations.get(gene_id).cloned())
            .collect();
        ExpressionTable {
            functions: Some(functions),
            ..self
        }
    }

    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    pub fn n_samples(&self) -> usize {
        self.sample_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gene_ids.is_empty()
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn text_columns(&self) -> &[TextColumn] {
        &self.text_columns
    }

    pub fn has_functions(&self) -> bool {
        self.functions.is_some()
    }

    pub fn function(&self, gene_idx: usize) -> Option<&str> {
        self.functions
            .as_ref()
            .and_then(|functions| functions.get(gene_idx))
            .and_then(|f| f.as_deref())
    }

    pub fn gene_position(&self, gene_id: &str) -> Option<usize> {
        self.gene_index.get(gene_id).copied()
    }

    pub fn row(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.values.index_axis(Axis(0), gene_idx)
    }

    pub fn record(&self, gene_idx: usize) -> ExpressionRecord {
        ExpressionRecord {
            gene_id: self.gene_ids[gene_idx].clone(),
            function: self.function(gene_idx).map(str::to_string),
            values: self.row(gene_idx).to_vec(),
        }
    }

    /// Resolve column names to sample indices, preserving the requested order.
    ///
    /// Naming a text column reports its first missing or non-numeric cell.
    pub fn column_indices(&self, columns: &[String]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|column| {
                if let Some(idx) = self.sample_names.iter().position(|name| name == column) {
                    return Ok(idx);
                }
                let invalid = self
                    .text_columns
                    .iter()
                    .find(|text| &text.name == column)
                    .and_then(|text| text.first_invalid_cell(&self.gene_ids));
                Err(invalid.unwrap_or_else(|| ExpressionError::UnknownColumn {
                    column: column.clone(),
                }))
            })
            .collect()
    }

    /// Restrict the table to the given genes, keeping table order.
    pub fn select_genes(&self, gene_ids: &[String]) -> Result<ExpressionTable> {
        let wanted: HashSet<&str> = gene_ids.iter().map(String::as_str).collect();
        for gene_id in gene_ids {
            if !self.gene_index.contains_key(gene_id) {
                return Err(ExpressionError::UnknownGene {
                    gene_id: gene_id.clone(),
                });
            }
        }

        let rows: Vec<usize> = (0..self.n_genes())
            .filter(|&idx| wanted.contains(self.gene_ids[idx].as_str()))
            .collect();
        let values = self.values.select(Axis(0), &rows);
        let selected_ids: Vec<String> = rows.iter().map(|&idx| self.gene_ids[idx].clone()).collect();

        let text_columns = self
            .text_columns
            .iter()
            .map(|text| TextColumn {
                name: text.name.clone(),
                cells: rows.iter().map(|&idx| text.cells[idx].clone()).collect(),
            })
            .collect();
        let table = ExpressionTable::new(selected_ids, self.sample_names.clone(), values)?
            .with_text_columns(text_columns)?;
        match &self.functions {
            Some(functions) => {
                table.with_functions(rows.iter().map(|&idx| functions[idx].clone()).collect())
            }
            None => Ok(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn samples() -> Vec<String> {
        ["Control_1", "Control_2", "Stress_1", "Stress_2"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn genes(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_duplicate_gene_rejected() {
        let result = ExpressionTable::new(
            genes(&["A", "A"]),
            samples(),
            array![[1.0, 1.0, 2.0, 2.0], [1.0, 1.0, 2.0, 2.0]],
        );
        assert!(matches!(result, Err(ExpressionError::DuplicateGene { .. })));
    }

    #[test]
    fn test_missing_values_rejected_and_negative_values_kept() {
        let missing = ExpressionTable::new(genes(&["A"]), samples(), array![[1.0, f64::NAN, 2.0, 2.0]]);
        match missing {
            Err(ExpressionError::MissingValue { gene_id, column }) => {
                assert_eq!(gene_id, "A");
                assert_eq!(column, "Control_2");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // Log-scaled or centered data carries negative values
        let centered = ExpressionTable::new(genes(&["A"]), samples(), array![[-0.5, 0.2, 3.0, 4.0]]).unwrap();
        assert_eq!(centered.row(0).to_vec(), vec![-0.5, 0.2, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_gene_id_rejected() {
        let result = ExpressionTable::new(
            genes(&["A", " "]),
            samples(),
            array![[1.0, 1.0, 2.0, 2.0], [1.0, 1.0, 2.0, 2.0]],
        );
        match result {
            Err(ExpressionError::MissingValue { gene_id, column }) => {
                assert_eq!(gene_id, "<row 2>");
                assert_eq!(column, "Gene_ID");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_text_column_errors_only_when_requested() {
        let table = ExpressionTable::new(genes(&["A", "B"]), samples(), array![[1.0, 1.0, 2.0, 2.0], [3.0, 3.0, 3.0, 3.0]])
            .unwrap()
            .with_text_columns(vec![
                TextColumn {
                    name: "Chromosome".to_string(),
                    cells: vec!["chr1".to_string(), "chr2".to_string()],
                },
                TextColumn {
                    name: "Stress_3".to_string(),
                    cells: vec!["4.5".to_string(), "".to_string()],
                },
            ])
            .unwrap();
        assert_eq!(table.column_indices(&["Stress_1".to_string()]).unwrap(), vec![2]);

        let err = table.column_indices(&["Chromosome".to_string()]).unwrap_err();
        assert!(matches!(err, ExpressionError::NonNumeric { ref gene_id, ref value, .. } if gene_id == "A" && value == "chr1"));

        let err = table.column_indices(&["Stress_3".to_string()]).unwrap_err();
        assert!(matches!(err, ExpressionError::MissingValue { ref gene_id, .. } if gene_id == "B"));

        let subset = table.select_genes(&genes(&["B"])).unwrap();
        assert_eq!(subset.text_columns()[0].cells, vec!["chr2"]);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = ExpressionTable::new(genes(&["A", "B"]), samples(), array![[1.0, 1.0, 2.0, 2.0]]);
        assert!(matches!(result, Err(ExpressionError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_column_indices_keep_requested_order() {
        let table = ExpressionTable::new(genes(&["A"]), samples(), array![[1.0, 2.0, 3.0, 4.0]]).unwrap();
        let idx = table
            .column_indices(&["Stress_2".to_string(), "Control_1".to_string()])
            .unwrap();
        assert_eq!(idx, vec![3, 0]);

        let err = table.column_indices(&["Stress_3".to_string()]).unwrap_err();
        assert!(matches!(err, ExpressionError::UnknownColumn { column } if column == "Stress_3"));
    }

    #[test]
    fn test_from_records_detects_function_column() {
        let records = vec![
            ExpressionRecord {
                gene_id: "A".to_string(),
                function: Some("heat shock protein".to_string()),
                values: vec![1.0, 1.0, 2.0, 2.0],
            },
            ExpressionRecord {
                gene_id: "B".to_string(),
                function: None,
                values: vec![3.0, 3.0, 3.0, 3.0],
            },
        ];
        let table = ExpressionTable::from_records(samples(), records).unwrap();
        assert!(table.has_functions());
        assert_eq!(table.function(0), Some("heat shock protein"));
        assert_eq!(table.function(1), None);
        assert_eq!(table.record(1).values, vec![3.0, 3.0, 3.0, 3.0]);

        let plain = ExpressionTable::from_records(
            samples(),
            vec![ExpressionRecord {
                gene_id: "C".to_string(),
                function: None,
                values: vec![0.0; 4],
            }],
        )
        .unwrap();
        assert!(!plain.has_functions());
    }

    #[test]
    fn test_select_genes_keeps_table_order() {
        let table = ExpressionTable::new(
            genes(&["A", "B", "C"]),
            samples(),
            array![[1.0, 1.0, 1.0, 1.0], [2.0, 2.0, 2.0, 2.0], [3.0, 3.0, 3.0, 3.0]],
        )
        .unwrap();
        let subset = table.select_genes(&genes(&["C", "A"])).unwrap();
        assert_eq!(subset.gene_ids(), &genes(&["A", "C"])[..]);
        assert_eq!(subset.row(1).to_vec(), vec![3.0; 4]);

        let err = table.select_genes(&genes(&["Z"])).unwrap_err();
        assert!(matches!(err, ExpressionError::UnknownGene { .. }));
    }

    #[test]
    fn test_join_functions() {
        let table = ExpressionTable::new(
            genes(&["A", "B"]),
            samples(),
            array![[1.0, 1.0, 1.0, 1.0], [2.0, 2.0, 2.0, 2.0]],
        )
        .unwrap();
        let mut annotations = HashMap::new();
        annotations.insert("B".to_string(), "dehydrin".to_string());
        let table = table.join_functions(&annotations);
        assert!(table.has_functions());
        assert_eq!(table.function(0), None);
        assert_eq!(table.function(1), Some("dehydrin"));
    }
}
