use svg::node::element::Rectangle;
use svg::Document;

use crate::comparison::ComparisonTable;
use crate::render::{blank_document, line, text, LinearScale};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 560.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 720.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 470.0;

const PALETTE: [&str; 6] = ["#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860"];
const UNKNOWN_CATEGORY: &str = "Unknown";

/// Grouped bars of mean absolute log2 fold change per implied stress, one
/// bar per dataset inside each group.
pub fn comparison_svg(table: &ComparisonTable) -> Document {
    let means = table.grouped_means();
    let datasets = table.datasets();

    let mut categories: Vec<&str> = Vec::new();
    for mean in &means {
        let category = mean.implied_stress.as_deref().unwrap_or(UNKNOWN_CATEGORY);
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let y_max = means
        .iter()
        .map(|m| m.mean_abs_log2_fold_change)
        .fold(0.0, f64::max);
    let y = LinearScale::new((0.0, y_max * 1.1), (BOTTOM, TOP));

    let group_width = (RIGHT - LEFT) / categories.len().max(1) as f64;
    let bar_width = group_width * 0.8 / datasets.len().max(1) as f64;

    let mut doc = blank_document(WIDTH, HEIGHT)
        .add(line(LEFT, BOTTOM, RIGHT, BOTTOM, "#111827"))
        .add(line(LEFT, TOP, LEFT, BOTTOM, "#111827"));

    for tick in y.ticks(5) {
        doc = doc
            .add(line(LEFT - 5.0, y.map(tick), LEFT, y.map(tick), "#111827"))
            .add(text(format!("{tick:.2}"), LEFT - 8.0, y.map(tick) + 4.0, 11).set("text-anchor", "end"));
    }

    for (g, category) in categories.iter().enumerate() {
        let group_left = LEFT + group_width * g as f64 + group_width * 0.1;
        doc = doc.add(
            text(*category, LEFT + group_width * (g as f64 + 0.5), BOTTOM + 20.0, 12)
                .set("text-anchor", "middle"),
        );

        for mean in means
            .iter()
            .filter(|m| m.implied_stress.as_deref().unwrap_or(UNKNOWN_CATEGORY) == *category)
        {
            if !mean.mean_abs_log2_fold_change.is_finite() {
                continue;
            }
            let d = datasets
                .iter()
                .position(|name| *name == mean.dataset)
                .unwrap_or(0);
            let top = y.map(mean.mean_abs_log2_fold_change);
            doc = doc.add(
                Rectangle::new()
                    .set("x", group_left + bar_width * d as f64)
                    .set("y", top)
                    .set("width", bar_width)
                    .set("height", BOTTOM - top)
                    .set("fill", PALETTE[d % PALETTE.len()]),
            );
        }
    }

    for (d, name) in datasets.iter().enumerate() {
        let ly = TOP + 10.0 + 20.0 * d as f64;
        doc = doc
            .add(
                Rectangle::new()
                    .set("x", RIGHT + 20.0)
                    .set("y", ly - 9.0)
                    .set("width", 12)
                    .set("height", 12)
                    .set("fill", PALETTE[d % PALETTE.len()]),
            )
            .add(text(*name, RIGHT + 38.0, ly + 2.0, 12));
    }

    doc.add(
        text("Stress response across datasets", (LEFT + RIGHT) / 2.0, 32.0, 18).set("text-anchor", "middle"),
    )
    .add(text("Implied Stress", (LEFT + RIGHT) / 2.0, HEIGHT - 40.0, 13).set("text-anchor", "middle"))
    .add(
        text("|log2(Fold Change)|", 20.0, (TOP + BOTTOM) / 2.0, 13)
            .set("text-anchor", "middle")
            .set("transform", format!("rotate(-90 20 {})", (TOP + BOTTOM) / 2.0)),
    )
}
