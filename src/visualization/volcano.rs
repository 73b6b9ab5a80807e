use crate::testing::significance::{Significance, LOG2_FC_THRESHOLD, P_VALUE_THRESHOLD};
use crate::testing::DifferentialExpressionResults;
use crate::visualization::{gene_label, VisualizationConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct VolcanoPoint {
    pub gene_id: String,
    pub log2_fold_change: f64,
    /// `-log10(p)`; `None` when the p-value is undefined or exactly zero.
    pub neg_log10_p: Option<f64>,
    pub significance: Significance,
    /// Set for the top-N genes only.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolcanoData {
    /// One point per result, in result order.
    pub points: Vec<VolcanoPoint>,
    /// Indices into `points` of the labeled genes, smallest p-value first.
    pub labeled: Vec<usize>,
    /// Height of the horizontal guide line, `-log10(0.05)`.
    pub p_value_line: f64,
    /// Positions of the vertical guide lines, `±1`.
    pub fold_change_lines: (f64, f64),
}

impl VolcanoData {
    /// Points that can actually be placed on the y axis.
    pub fn plottable(&self) -> impl Iterator<Item = &VolcanoPoint> {
        self.points
            .iter()
            .filter(|p| p.neg_log10_p.is_some() && p.log2_fold_change.is_finite())
    }

    pub fn num_significant(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.significance.is_significant())
            .count()
    }
}

pub fn neg_log10(p_value: Option<f64>) -> Option<f64> {
    p_value.filter(|&p| p > 0.0).map(|p| -p.log10())
}

pub fn prepare_volcano(
    results: &DifferentialExpressionResults,
    config: &VisualizationConfig,
) -> VolcanoData {
    let mut points: Vec<VolcanoPoint> = results
        .iter()
        .map(|r| VolcanoPoint {
            gene_id: r.gene_id.clone(),
            log2_fold_change: r.log2_fold_change,
            neg_log10_p: neg_log10(r.p_value),
            significance: r.significance(),
            label: None,
        })
        .collect();

    let labeled = results.top_features(config.top_n);
    for &idx in &labeled {
        let result = &results.results()[idx];
        points[idx].label = Some(gene_label(
            &result.gene_id,
            result.function.as_deref(),
            config.annotate_functions,
        ));
    }

    VolcanoData {
        points,
        labeled,
        p_value_line: -P_VALUE_THRESHOLD.log10(),
        fold_change_lines: (-LOG2_FC_THRESHOLD, LOG2_FC_THRESHOLD),
    }
}
