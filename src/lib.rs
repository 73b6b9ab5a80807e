//! # deg-statistics
//!
//! Differential gene expression between a control and a stress group of
//! samples, with presentation data for volcano plots and heatmaps and a
//! cross-dataset comparison of stress responses.
//!
//! ## Core Features
//!
//! - **Differential Expression**: pseudo-count log2 fold change and Welch's t-test per gene
//! - **Significance Classification**: fixed thresholds on p-value and absolute fold change
//! - **Visualization Data**: volcano points and row z-scored heatmaps of the top genes
//! - **Comparison**: per-dataset results tagged with an implied stress category
//!
//! ## Quick Start
//!
//! Read an expression table with [`data::io::read_expression_table`], run
//! [`testing::differential_expression`] with the control and stress column
//! names, then hand the results to [`visualization`] or [`comparison`].
//!
//! ## Module Organization
//!
//! - **[`data`]**: Expression tables, CSV and GFF3 input/output
//! - **[`testing`]**: Fold change, t-test and significance classification
//! - **[`visualization`]**: Volcano and heatmap preparation
//! - **[`comparison`]**: Cross-dataset aggregation
//! - **[`render`]**: SVG output of prepared plots
//! - **[`config`]**: JSON run configuration

pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod testing;
pub mod visualization;

pub use error::{ExpressionError, Result};
