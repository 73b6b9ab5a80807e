//! SVG rendering of prepared plot data.

use std::path::Path;

use svg::node::element::{Line, Text};
use svg::Document;
use tracing::info;

use crate::error::{ExpressionError, Result};

mod comparison;
mod heatmap;
mod volcano;

pub use comparison::comparison_svg;
pub use heatmap::heatmap_svg;
pub use volcano::volcano_svg;

const FONT_FAMILY: &str = "sans-serif";

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub(crate) fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if (domain.1 - domain.0).abs() < f64::EPSILON {
            (domain.0 - 1.0, domain.1 + 1.0)
        } else {
            domain
        };
        LinearScale { domain, range }
    }

    pub(crate) fn map(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// `count` evenly spaced tick values across the domain.
    pub(crate) fn ticks(&self, count: usize) -> Vec<f64> {
        let count = count.max(2);
        let step = (self.domain.1 - self.domain.0) / (count - 1) as f64;
        (0..count).map(|i| self.domain.0 + step * i as f64).collect()
    }
}

pub(crate) fn blank_document(width: f64, height: f64) -> Document {
    Document::new()
        .set("viewBox", (0.0, 0.0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            svg::node::element::Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "#ffffff"),
        )
}

pub(crate) fn text(content: impl Into<String>, x: f64, y: f64, size: u32) -> Text {
    Text::new(content.into())
        .set("x", x)
        .set("y", y)
        .set("font-family", FONT_FAMILY)
        .set("font-size", size)
        .set("fill", "#111827")
}

pub(crate) fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) -> Line {
    Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
        .set("stroke", stroke)
        .set("stroke-width", 1)
}

/// Write a document to disk, creating the parent directory if needed.
pub fn save(path: impl AsRef<Path>, document: &Document) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExpressionError::io(parent, e))?;
    }
    svg::save(path, document).map_err(|e| ExpressionError::io(path, e))?;
    info!(path = %path.display(), "plot saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0));
        assert_abs_diff_eq!(scale.map(0.0), 100.0);
        assert_abs_diff_eq!(scale.map(2.5), 75.0);
        assert_eq!(scale.ticks(3), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_degenerate_domain_is_widened() {
        let scale = LinearScale::new((3.0, 3.0), (0.0, 10.0));
        assert_abs_diff_eq!(scale.map(3.0), 5.0);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plots").join("blank.svg");
        save(&path, &blank_document(10.0, 10.0)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }
}
