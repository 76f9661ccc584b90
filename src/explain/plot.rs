//! SVG rendering of deletion curves.

use std::path::Path;

use plotters::prelude::*;

use super::{deletion::DeletionCurve, ranking::Strategy};
use crate::error::{LosError, Result};

fn plot_err<E: std::fmt::Display>(err: E) -> LosError {
    LosError::Plot(err.to_string())
}

fn colour(strategy: Strategy) -> RGBColor {
    match strategy {
        Strategy::Attribution => RGBColor(214, 39, 40),
        Strategy::Focus => RGBColor(31, 119, 180),
        Strategy::Random => RGBColor(127, 127, 127),
    }
}

/// Draw one line per strategy on a unit square, AUC in the legend.
pub fn plot_curves(path: &Path, title: &str, curves: &[(Strategy, &DeletionCurve)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let root = SVGBackend::new(path, (720, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("fraction of ranked tokens removed")
        .y_desc("target-class probability")
        .draw()
        .map_err(plot_err)?;

    for (strategy, curve) in curves {
        let colour = colour(*strategy);
        let points = curve.points.iter().map(|p| (p.fraction, p.probability));
        chart
            .draw_series(LineSeries::new(points, colour.stroke_width(2)))
            .map_err(plot_err)?
            .label(format!("{strategy} (AUC {:.3})", curve.auc()))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)?;
    Ok(())
}
