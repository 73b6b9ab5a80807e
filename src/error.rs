//! Error type shared by every stage of the analysis.
//!
//! Configuration errors are raised before any computation starts, data errors
//! name the offending gene or column. Numeric degeneracies (zero variance,
//! zero p-values, constant rows) are not errors; they surface as `None`
//! values in the results instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    #[error("{group} group column list is empty")]
    EmptyGroup { group: &'static str },

    #[error("column `{column}` not found in expression table")]
    UnknownColumn { column: String },

    #[error("column `{column}` is listed in both the control and stress groups")]
    OverlappingGroups { column: String },

    #[error("expression table contains no genes")]
    EmptyTable,

    #[error("comparison needs at least 2 datasets, {available} available")]
    InsufficientDatasets { available: usize },

    #[error("dataset `{dataset}` has no Function column")]
    MissingFunctionColumn { dataset: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("required key column `{column}` is missing")]
    MissingKeyColumn { column: &'static str },

    #[error("gene `{gene_id}` appears more than once")]
    DuplicateGene { gene_id: String },

    #[error("non-numeric value `{value}` for gene `{gene_id}` in column `{column}`")]
    NonNumeric {
        gene_id: String,
        column: String,
        value: String,
    },

    #[error("missing value for gene `{gene_id}` in column `{column}`")]
    MissingValue { gene_id: String, column: String },

    #[error("gene `{gene_id}` is not present in the expression table")]
    UnknownGene { gene_id: String },

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Statistics(#[from] anyhow::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ExpressionError {
    /// True for errors caused by the caller's request rather than the data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyGroup { .. }
                | Self::UnknownColumn { .. }
                | Self::OverlappingGroups { .. }
                | Self::EmptyTable
                | Self::InsufficientDatasets { .. }
                | Self::MissingFunctionColumn { .. }
                | Self::InvalidConfig { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_gene_and_column() {
        let err = ExpressionError::NonNumeric {
            gene_id: "Zm00001eb000010".to_string(),
            column: "Stress_2".to_string(),
            value: "n/a".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Zm00001eb000010"));
        assert!(msg.contains("Stress_2"));
        assert!(msg.contains("n/a"));
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(ExpressionError::EmptyGroup { group: "control" }.is_configuration_error());
        assert!(ExpressionError::EmptyTable.is_configuration_error());
        assert!(!ExpressionError::DuplicateGene {
            gene_id: "A".to_string()
        }
        .is_configuration_error());
    }
}
