use svg::node::element::Circle;
use svg::Document;

use crate::render::{blank_document, line, text, LinearScale};
use crate::testing::significance::Significance;
use crate::visualization::VolcanoData;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 840.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 530.0;

fn color(significance: Significance) -> &'static str {
    match significance {
        Significance::Significant => "red",
        Significance::NotSignificant => "gray",
    }
}

fn dashed(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) -> svg::node::element::Line {
    line(x1, y1, x2, y2, stroke)
        .set("stroke-dasharray", "6,4")
        .set("stroke-width", 0.7)
}

/// Scatter of log2 fold change against `-log10(p)`, colored by significance.
///
/// Points without a finite `-log10(p)` are left out. Labeled genes get their
/// annotation text next to the marker.
pub fn volcano_svg(data: &VolcanoData) -> Document {
    let (fc_low, fc_high) = data.fold_change_lines;
    let (x_min, x_max) = data
        .plottable()
        .map(|p| p.log2_fold_change)
        .fold((fc_low, fc_high), |(lo, hi), fc| (lo.min(fc), hi.max(fc)));
    let y_max = data
        .plottable()
        .filter_map(|p| p.neg_log10_p)
        .fold(data.p_value_line, f64::max);

    let pad = (x_max - x_min) * 0.05;
    let x = LinearScale::new((x_min - pad, x_max + pad), (LEFT, RIGHT));
    let y = LinearScale::new((0.0, y_max * 1.1), (BOTTOM, TOP));

    let mut doc = blank_document(WIDTH, HEIGHT)
        .add(line(LEFT, BOTTOM, RIGHT, BOTTOM, "#111827"))
        .add(line(LEFT, TOP, LEFT, BOTTOM, "#111827"));

    for tick in x.ticks(5) {
        doc = doc
            .add(line(x.map(tick), BOTTOM, x.map(tick), BOTTOM + 5.0, "#111827"))
            .add(text(format!("{tick:.1}"), x.map(tick), BOTTOM + 20.0, 11).set("text-anchor", "middle"));
    }
    for tick in y.ticks(5) {
        doc = doc
            .add(line(LEFT - 5.0, y.map(tick), LEFT, y.map(tick), "#111827"))
            .add(text(format!("{tick:.1}"), LEFT - 8.0, y.map(tick) + 4.0, 11).set("text-anchor", "end"));
    }

    doc = doc
        .add(dashed(LEFT, y.map(data.p_value_line), RIGHT, y.map(data.p_value_line), "black"))
        .add(dashed(x.map(fc_low), TOP, x.map(fc_low), BOTTOM, "blue"))
        .add(dashed(x.map(fc_high), TOP, x.map(fc_high), BOTTOM, "blue"));

    for point in data.plottable() {
        let Some(neg_log10_p) = point.neg_log10_p else {
            continue;
        };
        let (cx, cy) = (x.map(point.log2_fold_change), y.map(neg_log10_p));
        doc = doc.add(
            Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", 4)
                .set("fill", color(point.significance))
                .set("fill-opacity", 0.8),
        );
        if let Some(label) = &point.label {
            doc = doc.add(text(label.clone(), cx + 6.0, cy - 6.0, 10));
        }
    }

    for (row, significance) in [Significance::Significant, Significance::NotSignificant]
        .into_iter()
        .enumerate()
    {
        let ly = TOP + 10.0 + 20.0 * row as f64;
        doc = doc
            .add(
                Circle::new()
                    .set("cx", RIGHT + 25.0)
                    .set("cy", ly)
                    .set("r", 5)
                    .set("fill", color(significance)),
            )
            .add(text(significance.label(), RIGHT + 36.0, ly + 4.0, 12));
    }

    doc.add(
        text("Volcano Plot of Differential Gene Expression", (LEFT + RIGHT) / 2.0, 32.0, 18)
            .set("text-anchor", "middle"),
    )
    .add(text("log2(Fold Change)", (LEFT + RIGHT) / 2.0, HEIGHT - 20.0, 13).set("text-anchor", "middle"))
    .add(
        text("-log10(p-value)", 20.0, (TOP + BOTTOM) / 2.0, 13)
            .set("text-anchor", "middle")
            .set("transform", format!("rotate(-90 20 {})", (TOP + BOTTOM) / 2.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DifferentialExpressionResults, GeneResult};
    use crate::visualization::{prepare_volcano, VisualizationConfig};

    #[test]
    fn test_volcano_svg_contents() {
        let results = DifferentialExpressionResults::new(
            vec![
                GeneResult {
                    gene_id: "Zm01".to_string(),
                    log2_fold_change: 2.1,
                    p_value: Some(0.001),
                    function: Some("dehydrin".to_string()),
                },
                GeneResult {
                    gene_id: "Zm02".to_string(),
                    log2_fold_change: 0.2,
                    p_value: Some(0.6),
                    function: None,
                },
                GeneResult {
                    gene_id: "Zm03".to_string(),
                    log2_fold_change: 0.0,
                    p_value: None,
                    function: None,
                },
            ],
            true,
        );
        let config = VisualizationConfig {
            top_n: 1,
            annotate_functions: true,
        };
        let svg = volcano_svg(&prepare_volcano(&results, &config)).to_string();

        assert!(svg.contains("Volcano Plot of Differential Gene Expression"));
        assert!(svg.contains("Zm01 (dehydrin)"));
        assert!(!svg.contains("Zm02"));
        // Two data points plus two legend markers
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(svg.matches("stroke-dasharray").count(), 3);
    }
}
