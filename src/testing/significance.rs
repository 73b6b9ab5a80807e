//! Fixed-threshold classification of differential expression results.

use std::fmt;

/// Genes need a p-value strictly below this to be called significant.
pub const P_VALUE_THRESHOLD: f64 = 0.05;
/// Genes need an absolute log2 fold change of at least this.
pub const LOG2_FC_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Significance {
    Significant,
    NotSignificant,
}

impl Significance {
    pub fn is_significant(self) -> bool {
        self == Significance::Significant
    }

    pub fn label(self) -> &'static str {
        match self {
            Significance::Significant => "Significant",
            Significance::NotSignificant => "Not Significant",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label a gene from its p-value and log2 fold change.
///
/// An undefined p-value is never significant.
pub fn classify(p_value: Option<f64>, log2_fold_change: f64) -> Significance {
    match p_value {
        Some(p) if p < P_VALUE_THRESHOLD && log2_fold_change.abs() >= LOG2_FC_THRESHOLD => {
            Significance::Significant
        }
        _ => Significance::NotSignificant,
    }
}
