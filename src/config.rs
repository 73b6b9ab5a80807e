//! Run configuration, read from JSON.
//!
//! ```json
//! {
//!   "control_columns": ["Control_1", "Control_2"],
//!   "stress_columns": ["Stress_1", "Stress_2"],
//!   "top_n": 10,
//!   "output_dir": "output",
//!   "comparison": {
//!     "datasets": [
//!       { "name": "maize", "results": "output/maize_deg_results.csv" },
//!       { "name": "rice", "results": "output/rice_deg_results.csv" }
//!     ],
//!     "implied_stress": { "heat shock protein": "Heat", "dehydrin": "Drought" }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::comparison::ImpliedStressMap;
use crate::error::{ExpressionError, Result};
use crate::testing::EngineConfig;
use crate::visualization::{VisualizationConfig, DEFAULT_TOP_N};

fn default_control_columns() -> Vec<String> {
    vec!["Control_1".to_string(), "Control_2".to_string()]
}

fn default_stress_columns() -> Vec<String> {
    vec!["Stress_1".to_string(), "Stress_2".to_string()]
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub name: String,
    pub results: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default)]
    pub datasets: Vec<DatasetSource>,
    #[serde(default)]
    pub implied_stress: HashMap<String, String>,
}

impl ComparisonConfig {
    pub fn implied_stress_map(&self) -> ImpliedStressMap {
        ImpliedStressMap::new(self.implied_stress.clone())
    }

    pub fn sources(&self) -> Vec<(String, PathBuf)> {
        self.datasets
            .iter()
            .map(|d| (d.name.clone(), d.results.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_control_columns")]
    pub control_columns: Vec<String>,
    #[serde(default = "default_stress_columns")]
    pub stress_columns: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_true")]
    pub annotate_functions: bool,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            control_columns: default_control_columns(),
            stress_columns: default_stress_columns(),
            top_n: DEFAULT_TOP_N,
            annotate_functions: true,
            parallel: false,
            output_dir: default_output_dir(),
            comparison: ComparisonConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ExpressionError::io(path, e))?;
        Self::from_reader(file)
    }

    /// Reject settings that can never produce a run.
    pub fn validate(&self) -> Result<()> {
        if self.control_columns.is_empty() {
            return Err(ExpressionError::EmptyGroup { group: "control" });
        }
        if self.stress_columns.is_empty() {
            return Err(ExpressionError::EmptyGroup { group: "stress" });
        }
        if self.top_n == 0 {
            return Err(ExpressionError::InvalidConfig {
                reason: "top_n must be at least 1".to_string(),
            });
        }
        let mut names: Vec<&str> = self
            .comparison
            .datasets
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(ExpressionError::InvalidConfig {
                reason: format!("comparison dataset `{}` listed twice", pair[0]),
            });
        }
        Ok(())
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            parallel: self.parallel,
        }
    }

    pub fn visualization(&self) -> VisualizationConfig {
        VisualizationConfig {
            top_n: self.top_n,
            annotate_functions: self.annotate_functions,
        }
    }
}
