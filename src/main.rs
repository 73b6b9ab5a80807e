use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use deg_statistics::comparison::{compare, load_available, write_comparison};
use deg_statistics::config::AnalysisConfig;
use deg_statistics::data::annotation::{read_annotations, read_gff3, write_annotations, DEFAULT_SUBSET_SIZE};
use deg_statistics::data::io::{read_expression_table, write_results};
use deg_statistics::render;
use deg_statistics::testing::differential_expression_with;
use deg_statistics::visualization::{prepare_heatmap, prepare_volcano};
use deg_statistics::ExpressionError;

const LOG_ENV: &str = "DEG_LOG";

#[derive(Parser, Debug)]
#[command(name = "deg-stats", version, about = "Differential gene expression under stress")]
struct Cli {
    /// JSON run configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test every gene of an expression table and plot the results
    Analyze {
        /// Expression CSV with a Gene_ID column
        table: PathBuf,
        /// Gene_ID,Function CSV joined onto the table
        #[arg(long)]
        annotations: Option<PathBuf>,
        /// Prefix for output file names
        #[arg(long, default_value = "deg")]
        name: String,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Extract gene descriptions from a GFF3 file
    Annotate {
        gff3: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SUBSET_SIZE)]
        subset_size: usize,
    },
    /// Combine the configured result files into one comparison
    Compare {
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn analyze(
    config: &AnalysisConfig,
    table_path: &Path,
    annotations: Option<&Path>,
    name: &str,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let mut table = read_expression_table(table_path)
        .with_context(|| format!("Failed to read expression table {}", table_path.display()))?;
    if let Some(path) = annotations {
        let functions = read_annotations(path)
            .with_context(|| format!("Failed to read annotations {}", path.display()))?;
        table = table.join_functions(&functions);
    }

    let results = differential_expression_with(
        &table,
        &config.control_columns,
        &config.stress_columns,
        config.engine(),
    )
    .context("Differential expression failed")?;
    info!(
        genes = results.len(),
        significant = results.num_significant(),
        "analysis finished"
    );

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    write_results(output_dir.join(format!("{name}_deg_results.csv")), &results)?;

    let visualization = config.visualization();
    let volcano = prepare_volcano(&results, &visualization);
    render::save(
        output_dir.join(format!("{name}_volcano_plot.svg")),
        &render::volcano_svg(&volcano),
    )?;

    let heatmap = prepare_heatmap(&table, &results, &visualization)?;
    render::save(
        output_dir.join(format!("{name}_heatmap.svg")),
        &render::heatmap_svg(&heatmap),
    )?;
    Ok(())
}

fn compare_datasets(config: &AnalysisConfig, output_dir: &Path) -> anyhow::Result<()> {
    let datasets = load_available(&config.comparison.sources())?;
    let table = match compare(&datasets, &config.comparison.implied_stress_map()) {
        Ok(table) => table,
        Err(ExpressionError::InsufficientDatasets { available }) => {
            warn!(available, "not enough datasets for comparison, skipping");
            return Ok(());
        }
        Err(e) => return Err(e).context("Comparison failed"),
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    write_comparison(output_dir.join("stress_comparison.csv"), &table)?;
    render::save(
        output_dir.join("stress_comparison.svg"),
        &render::comparison_svg(&table),
    )?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze {
            table,
            annotations,
            name,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            analyze(&config, &table, annotations.as_deref(), &name, &output_dir)
        }
        Command::Annotate {
            gff3,
            output,
            subset_size,
        } => {
            let annotations = read_gff3(&gff3, subset_size)
                .with_context(|| format!("Failed to parse {}", gff3.display()))?;
            write_annotations(&output, &annotations)?;
            info!(genes = annotations.len(), path = %output.display(), "annotations written");
            Ok(())
        }
        Command::Compare { output_dir } => {
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            compare_datasets(&config, &output_dir)
        }
    }
}
