use svg::node::element::Rectangle;
use svg::Document;

use crate::render::{blank_document, text};
use crate::visualization::HeatmapData;

const CELL_WIDTH: f64 = 90.0;
const CELL_HEIGHT: f64 = 34.0;
const LEFT: f64 = 320.0;
const TOP: f64 = 70.0;
const UNDEFINED_FILL: &str = "#d1d5db";

const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> (f64, f64, f64) {
    (
        a.0 + (b.0 - a.0) * t,
        a.1 + (b.1 - a.1) * t,
        a.2 + (b.2 - a.2) * t,
    )
}

/// Diverging blue-grey-red color for a z-score on a symmetric scale.
pub(crate) fn diverging_color(z: f64, limit: f64) -> String {
    let t = if limit > 0.0 { (z / limit).clamp(-1.0, 1.0) } else { 0.0 };
    let (r, g, b) = if t < 0.0 {
        lerp(NEUTRAL, COLD, -t)
    } else {
        lerp(NEUTRAL, WARM, t)
    };
    format!("rgb({},{},{})", r.round() as u8, g.round() as u8, b.round() as u8)
}

/// Grid of row-normalized expression with each cell's value written in it.
pub fn heatmap_svg(data: &HeatmapData) -> Document {
    let n_cols = data.sample_names.len() as f64;
    let n_rows = data.n_rows() as f64;
    let width = LEFT + CELL_WIDTH * n_cols + 40.0;
    let height = TOP + CELL_HEIGHT * n_rows + 90.0;
    let limit = data.max_abs_z();

    let mut doc = blank_document(width, height);

    for (r, row) in data.rows.iter().enumerate() {
        let y = TOP + CELL_HEIGHT * r as f64;
        doc = doc.add(
            text(row.label.clone(), LEFT - 8.0, y + CELL_HEIGHT / 2.0 + 4.0, 11).set("text-anchor", "end"),
        );

        for c in 0..data.sample_names.len() {
            let x = LEFT + CELL_WIDTH * c as f64;
            let value = row.z_scores.as_ref().map(|z| z[c]);
            let fill = value.map_or_else(|| UNDEFINED_FILL.to_string(), |z| diverging_color(z, limit));
            let annotation = value.map_or_else(|| "NaN".to_string(), |z| format!("{z:.2}"));
            doc = doc
                .add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", y)
                        .set("width", CELL_WIDTH)
                        .set("height", CELL_HEIGHT)
                        .set("fill", fill)
                        .set("stroke", "#ffffff")
                        .set("stroke-width", 0.5),
                )
                .add(
                    text(annotation, x + CELL_WIDTH / 2.0, y + CELL_HEIGHT / 2.0 + 4.0, 11)
                        .set("text-anchor", "middle"),
                );
        }
    }

    let grid_bottom = TOP + CELL_HEIGHT * n_rows;
    for (c, sample) in data.sample_names.iter().enumerate() {
        let x = LEFT + CELL_WIDTH * c as f64 + CELL_WIDTH / 2.0;
        doc = doc.add(text(sample.clone(), x, grid_bottom + 18.0, 11).set("text-anchor", "middle"));
    }

    let center = LEFT + CELL_WIDTH * n_cols / 2.0;
    doc.add(
        text(
            format!("Top {} Differentially Expressed Genes (Z-score)", data.n_rows()),
            center,
            36.0,
            16,
        )
        .set("text-anchor", "middle"),
    )
    .add(text("Samples", center, grid_bottom + 50.0, 13).set("text-anchor", "middle"))
    .add(text("Gene ID", 16.0, TOP - 16.0, 13))
}
