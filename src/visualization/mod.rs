//! Presentation data for volcano plots and expression heatmaps.
//!
//! Nothing here draws. Both preparers pick the genes with the smallest
//! p-values through [`DifferentialExpressionResults::top_features`] and hand
//! back labeled values for a renderer such as [`crate::render`].
//!
//! [`DifferentialExpressionResults::top_features`]: crate::testing::DifferentialExpressionResults::top_features

pub mod heatmap;
pub mod volcano;

pub use heatmap::{prepare_heatmap, zscore_row, HeatmapData, HeatmapRow};
pub use volcano::{prepare_volcano, VolcanoData, VolcanoPoint};

/// Number of genes annotated or shown when nothing else is configured.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualizationConfig {
    /// How many of the lowest p-value genes to label or show.
    pub top_n: usize,
    /// Append the gene function to labels when one is known.
    pub annotate_functions: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        VisualizationConfig {
            top_n: DEFAULT_TOP_N,
            annotate_functions: true,
        }
    }
}

/// `gene_id`, or `gene_id (function)` when a function is known and wanted.
pub fn gene_label(gene_id: &str, function: Option<&str>, annotate_functions: bool) -> String {
    match function {
        Some(function) if annotate_functions => format!("{gene_id} ({function})"),
        _ => gene_id.to_string(),
    }
}
