use tracing::{debug, warn};

use crate::data::ExpressionTable;
use crate::error::{ExpressionError, Result};
use crate::testing::inference::MatrixStatTests;
use crate::testing::significance::{classify, Significance};
use crate::testing::utils::{resolve_groups, round_half_even};

pub mod effect;
pub mod inference;
pub mod significance;

pub mod utils;

/// Decimal places kept for log2 fold changes in results.
pub const LOG2_FC_DECIMALS: i32 = 3;
/// Decimal places kept for p-values in results.
pub const P_VALUE_DECIMALS: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// The test statistic value (Welch's t)
    pub statistic: f64,
    /// Two-sided p-value, `None` when the statistic is undefined
    pub p_value: Option<f64>,
    /// Welch-Satterthwaite degrees of freedom
    pub degrees_of_freedom: Option<f64>,
    /// Standard error of the mean difference
    pub standard_error: Option<f64>,
}

impl TestResult {
    pub fn new(statistic: f64, p_value: Option<f64>) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom: None,
            standard_error: None,
        }
    }

    /// Result for a test that could not be evaluated.
    pub fn undefined() -> Self {
        TestResult::new(f64::NAN, None)
    }

    pub fn with_degrees_of_freedom(mut self, df: f64) -> Self {
        self.degrees_of_freedom = Some(df);
        self
    }

    pub fn with_standard_error(mut self, se: f64) -> Self {
        self.standard_error = Some(se);
        self
    }

    /// Check if the result is statistically significant at the given threshold
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value.is_some_and(|p| p < alpha)
    }
}

/// Differential expression outcome for one gene.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneResult {
    pub gene_id: String,
    /// `log2(mean_stress + 1) - log2(mean_control + 1)`, rounded
    pub log2_fold_change: f64,
    /// Rounded Welch p-value, `None` when undefined
    pub p_value: Option<f64>,
    pub function: Option<String>,
}

impl GeneResult {
    pub fn significance(&self) -> Significance {
        classify(self.p_value, self.log2_fold_change)
    }
}

/// Per-gene results of one analysis run, in expression table order.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialExpressionResults {
    results: Vec<GeneResult>,
    has_functions: bool,
}

impl DifferentialExpressionResults {
    pub fn new(results: Vec<GeneResult>, has_functions: bool) -> Self {
        DifferentialExpressionResults {
            results,
            has_functions,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_functions(&self) -> bool {
        self.has_functions
    }

    pub fn results(&self) -> &[GeneResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneResult> {
        self.results.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&GeneResult> {
        self.results.get(idx)
    }

    /// Get indices of genes classified as significant
    pub fn significant_indices(&self) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.significance().is_significant().then_some(i))
            .collect()
    }

    pub fn num_significant(&self) -> usize {
        self.significant_indices().len()
    }

    /// Get the `n` genes with the smallest p-values.
    ///
    /// The sort is stable, so equal p-values keep table order. Undefined
    /// p-values sort after every defined one.
    pub fn top_features(&self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.results.len()).collect();
        indices.sort_by(|&a, &b| {
            match (self.results[a].p_value, self.results[b].p_value) {
                (Some(pa), Some(pb)) => pa.total_cmp(&pb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
        indices.truncate(n);
        indices
    }

    pub fn top_gene_ids(&self, n: usize) -> Vec<String> {
        self.top_features(n)
            .into_iter()
            .map(|i| self.results[i].gene_id.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a DifferentialExpressionResults {
    type Item = &'a GeneResult;
    type IntoIter = std::slice::Iter<'a, GeneResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Spread the per-gene statistics over the rayon thread pool.
    pub parallel: bool,
}

/// Compute fold change and Welch t-test p-value for every gene.
pub fn differential_expression(
    table: &ExpressionTable,
    control_columns: &[String],
    stress_columns: &[String],
) -> Result<DifferentialExpressionResults> {
    differential_expression_with(table, control_columns, stress_columns, EngineConfig::default())
}

pub fn differential_expression_with(
    table: &ExpressionTable,
    control_columns: &[String],
    stress_columns: &[String],
    config: EngineConfig,
) -> Result<DifferentialExpressionResults> {
    let (control_indices, stress_indices) = resolve_groups(table, control_columns, stress_columns)?;
    if table.is_empty() {
        return Err(ExpressionError::EmptyTable);
    }

    let fold_changes = table
        .values()
        .log2_fold_changes(&control_indices, &stress_indices, config.parallel)?;
    let tests = table
        .values()
        .t_test(&control_indices, &stress_indices, config.parallel)?;

    let results: Vec<GeneResult> = (0..table.n_genes())
        .map(|gene_idx| GeneResult {
            gene_id: table.gene_ids()[gene_idx].clone(),
            log2_fold_change: round_half_even(fold_changes[gene_idx], LOG2_FC_DECIMALS),
            p_value: tests[gene_idx]
                .p_value
                .map(|p| round_half_even(p, P_VALUE_DECIMALS)),
            function: table.function(gene_idx).map(str::to_string),
        })
        .collect();

    let undefined = results.iter().filter(|r| r.p_value.is_none()).count();
    if undefined > 0 {
        warn!(genes = undefined, "p-value undefined for genes with degenerate group variance");
    }
    let undefined_fc = results.iter().filter(|r| r.log2_fold_change.is_nan()).count();
    if undefined_fc > 0 {
        warn!(genes = undefined_fc, "log2 fold change undefined for genes with a group mean at or below -1");
    }

    let results = DifferentialExpressionResults::new(results, table.has_functions());
    debug!(
        genes = results.len(),
        control = control_indices.len(),
        stress = stress_indices.len(),
        significant = results.num_significant(),
        "differential expression computed"
    );
    Ok(results)
}
