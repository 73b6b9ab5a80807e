use ndarray::{Array1, ArrayView1};
use tracing::debug;

use crate::data::ExpressionTable;
use crate::error::Result;
use crate::testing::utils::{mean, sample_variance};
use crate::testing::DifferentialExpressionResults;
use crate::visualization::{gene_label, VisualizationConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRow {
    pub gene_id: String,
    pub label: String,
    /// Z-scores across samples, `None` for rows without spread.
    pub z_scores: Option<Array1<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapData {
    pub sample_names: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

impl HeatmapData {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Largest absolute z-score, for a symmetric color scale.
    pub fn max_abs_z(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|row| row.z_scores.as_ref())
            .flat_map(|z| z.iter().copied())
            .fold(0.0, |acc: f64, z| acc.max(z.abs()))
    }
}

/// Z-score a row with its sample standard deviation.
///
/// Returns `None` when the standard deviation is zero or undefined.
pub fn zscore_row(row: ArrayView1<'_, f64>) -> Option<Array1<f64>> {
    let values = row.to_vec();
    let sd = sample_variance(&values).sqrt();
    if !sd.is_finite() || sd == 0.0 {
        return None;
    }
    let m = mean(&values);
    Some(row.mapv(|v| (v - m) / sd))
}

/// Build the heatmap of the top-N genes by p-value.
///
/// Rows follow expression table order and cover every sample column; the
/// function annotation never becomes a value column.
pub fn prepare_heatmap(
    table: &ExpressionTable,
    results: &DifferentialExpressionResults,
    config: &VisualizationConfig,
) -> Result<HeatmapData> {
    let top_genes = results.top_gene_ids(config.top_n);
    let subset = table.select_genes(&top_genes)?;

    let rows: Vec<HeatmapRow> = (0..subset.n_genes())
        .map(|idx| HeatmapRow {
            gene_id: subset.gene_ids()[idx].clone(),
            label: gene_label(
                &subset.gene_ids()[idx],
                subset.function(idx),
                config.annotate_functions,
            ),
            z_scores: zscore_row(subset.row(idx)),
        })
        .collect();

    let constant = rows.iter().filter(|r| r.z_scores.is_none()).count();
    debug!(rows = rows.len(), constant, "prepared heatmap rows");

    Ok(HeatmapData {
        sample_names: subset.sample_names().to_vec(),
        rows,
    })
}
