//! Cross-dataset comparison of differential expression results.
//!
//! Each dataset (one species or condition set) contributes its result rows,
//! tagged with the dataset name and with the stress category implied by the
//! gene's function. The function-to-category table is supplied by the caller.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::{info, warn};

use crate::data::io::{create, read_results};
use crate::error::{ExpressionError, Result};
use crate::testing::DifferentialExpressionResults;

/// Maps free-text gene functions to an implied stress category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpliedStressMap {
    categories: HashMap<String, String>,
}

impl ImpliedStressMap {
    pub fn new(categories: HashMap<String, String>) -> Self {
        ImpliedStressMap { categories }
    }

    pub fn lookup(&self, function: &str) -> Option<&str> {
        self.categories.get(function).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl FromIterator<(String, String)> for ImpliedStressMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ImpliedStressMap::new(iter.into_iter().collect())
    }
}

/// Result set of one dataset, named for tagging.
#[derive(Debug, Clone)]
pub struct NamedResults {
    pub name: String,
    pub results: DifferentialExpressionResults,
}

impl NamedResults {
    pub fn new(name: impl Into<String>, results: DifferentialExpressionResults) -> Self {
        NamedResults {
            name: name.into(),
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub dataset: String,
    pub gene_id: String,
    pub log2_fold_change: f64,
    pub p_value: Option<f64>,
    pub function: Option<String>,
    pub implied_stress: Option<String>,
    pub abs_log2_fold_change: f64,
}

/// Mean absolute fold change of one (category, dataset) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMean {
    pub implied_stress: Option<String>,
    pub dataset: String,
    pub mean_abs_log2_fold_change: f64,
    pub n_genes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dataset names in first-seen order.
    pub fn datasets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.dataset.as_str()) {
                names.push(&row.dataset);
            }
        }
        names
    }

    /// Mean `abs_log2_fold_change` per implied stress and dataset.
    ///
    /// Groups appear in first-seen order. Rows without a category form their
    /// own `None` group. Undefined fold changes are left out of the mean but
    /// still counted in `n_genes`.
    pub fn grouped_means(&self) -> Vec<GroupedMean> {
        let mut order: Vec<(Option<&str>, &str)> = Vec::new();
        let mut sums: HashMap<(Option<&str>, &str), (f64, usize, usize)> = HashMap::new();

        for row in &self.rows {
            let key = (row.implied_stress.as_deref(), row.dataset.as_str());
            let entry = sums.entry(key).or_insert_with(|| {
                order.push(key);
                (0.0, 0, 0)
            });
            if !row.abs_log2_fold_change.is_nan() {
                entry.0 += row.abs_log2_fold_change;
                entry.1 += 1;
            }
            entry.2 += 1;
        }

        order
            .into_iter()
            .map(|key| {
                let (sum, defined, n) = sums[&key];
                GroupedMean {
                    implied_stress: key.0.map(str::to_string),
                    dataset: key.1.to_string(),
                    mean_abs_log2_fold_change: sum / defined as f64,
                    n_genes: n,
                }
            })
            .collect()
    }
}

/// Concatenate dataset results into one comparison table.
///
/// Every dataset must carry a function column. Output is dataset-major and
/// keeps each dataset's row order.
pub fn compare(datasets: &[NamedResults], implied_stress: &ImpliedStressMap) -> Result<ComparisonTable> {
    if datasets.len() < 2 {
        return Err(ExpressionError::InsufficientDatasets {
            available: datasets.len(),
        });
    }
    if let Some(missing) = datasets.iter().find(|d| !d.results.has_functions()) {
        return Err(ExpressionError::MissingFunctionColumn {
            dataset: missing.name.clone(),
        });
    }

    let rows: Vec<ComparisonRow> = datasets
        .iter()
        .flat_map(|dataset| {
            dataset.results.iter().map(|r| ComparisonRow {
                dataset: dataset.name.clone(),
                gene_id: r.gene_id.clone(),
                log2_fold_change: r.log2_fold_change,
                p_value: r.p_value,
                function: r.function.clone(),
                implied_stress: r
                    .function
                    .as_deref()
                    .and_then(|f| implied_stress.lookup(f))
                    .map(str::to_string),
                abs_log2_fold_change: r.log2_fold_change.abs(),
            })
        })
        .collect();

    let unmapped = rows.iter().filter(|r| r.implied_stress.is_none()).count();
    info!(
        datasets = datasets.len(),
        rows = rows.len(),
        unmapped,
        "built comparison table"
    );
    Ok(ComparisonTable { rows })
}

/// Load the result files that exist, skipping the rest with a warning.
pub fn load_available<P: AsRef<Path>>(sources: &[(String, P)]) -> Result<Vec<NamedResults>> {
    let mut loaded = Vec::with_capacity(sources.len());
    for (name, path) in sources {
        let path = path.as_ref();
        if !path.exists() {
            warn!(dataset = %name, path = %path.display(), "comparison input not found, skipping");
            continue;
        }
        loaded.push(NamedResults::new(name.clone(), read_results(path)?));
    }
    Ok(loaded)
}

pub fn write_comparison_to<W: Write>(writer: W, table: &ComparisonTable) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record([
        "Species",
        "Gene_ID",
        "log2FoldChange",
        "p_value",
        "Function",
        "Implied_Stress",
        "abs_log2FoldChange",
    ])?;
    for row in &table.rows {
        wtr.write_record([
            row.dataset.clone(),
            row.gene_id.clone(),
            row.log2_fold_change.to_string(),
            row.p_value.map_or_else(|| "NaN".to_string(), |p| p.to_string()),
            row.function.clone().unwrap_or_default(),
            row.implied_stress.clone().unwrap_or_default(),
            row.abs_log2_fold_change.to_string(),
        ])?;
    }
    wtr.flush().map_err(|e| ExpressionError::io("<comparison>", e))
}

pub fn write_comparison(path: impl AsRef<Path>, table: &ComparisonTable) -> Result<PathBuf> {
    let path = path.as_ref();
    write_comparison_to(create(path)?, table)?;
    info!(path = %path.display(), rows = table.len(), "saved comparison table");
    Ok(path.to_path_buf())
}
