//! SVG drawing of plot models via kuva

use super::{PlotData, RenderedPlot};
use crate::error::PlotResult;

/// Group colours, cycled
#[cfg_attr(not(feature = "kuva"), allow(dead_code))]
const PALETTE: [&str; 6] = [
    "#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860",
];

#[cfg_attr(not(feature = "kuva"), allow(dead_code))]
fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[cfg(feature = "kuva")]
mod kuva_impl {
    use super::color;
    use crate::plot::{PlotBody, PlotData};
    use kuva::prelude::*;

    /// Scene description for one plot model
    pub fn layers(data: &PlotData) -> Vec<Plot> {
        match &data.body {
            PlotBody::Groups(groups) => match data.kind {
                crate::plot::PlotKind::ViolinPlot => {
                    let mut violin = ViolinPlot::new().with_color(color(0));
                    for group in groups {
                        violin = violin.with_group(group.label.as_str(), group.values.clone());
                    }
                    vec![violin.into()]
                }
                _ => {
                    let mut boxes = BoxPlot::new().with_color(color(0));
                    for group in groups {
                        boxes = boxes.with_group(group.label.as_str(), group.values.clone());
                    }
                    vec![boxes.into()]
                }
            },
            PlotBody::Histograms(histograms) => {
                let mut layers: Vec<Plot> = Vec::with_capacity(histograms.len() * 2);
                for (i, h) in histograms.iter().enumerate() {
                    layers.push(
                        Histogram::new()
                            .with_data(h.values.clone())
                            .with_bins(h.bins)
                            .with_range(h.range)
                            .with_color(color(i))
                            .into(),
                    );
                    if !h.density.is_empty() {
                        layers.push(
                            LinePlot::new()
                                .with_data(h.density.clone())
                                .with_color(color(i))
                                .into(),
                        );
                    }
                }
                layers
            }
            PlotBody::Points(points) => vec![ScatterPlot::new()
                .with_data(points.clone())
                .with_color(color(0))
                .with_size(4.0)
                .into()],
        }
    }

    pub fn svg(data: &PlotData) -> String {
        let plots = layers(data);
        let layout = Layout::auto_from_plots(&plots)
            .with_title(data.title.as_str())
            .with_x_label(data.x_label.as_str())
            .with_y_label(data.y_label.as_str());
        render_to_svg(plots, layout)
    }
}

/// Draw a plot model to a standalone SVG document
#[cfg(feature = "kuva")]
pub fn render_svg(data: &PlotData) -> PlotResult<RenderedPlot> {
    let svg = kuva_impl::svg(data);
    tracing::debug!("Rendered {} ({} bytes of SVG)", data.kind, svg.len());
    Ok(RenderedPlot {
        kind: data.kind,
        title: data.title.clone(),
        svg,
    })
}

/// Draw a plot model to a standalone SVG document
///
/// Without the `kuva` feature every plot is unavailable.
#[cfg(not(feature = "kuva"))]
pub fn render_svg(data: &PlotData) -> PlotResult<RenderedPlot> {
    Err(crate::error::PlotError::Unavailable {
        plot: data.kind.to_string(),
        reason: "plot rendering requires the 'kuva' feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Group, PlotBody, PlotKind};

    fn boxes() -> PlotData {
        PlotData {
            kind: PlotKind::Boxplot,
            title: "Boxplot of score by arm".to_string(),
            x_label: "arm".to_string(),
            y_label: "score".to_string(),
            body: PlotBody::Groups(vec![
                Group {
                    label: "a".to_string(),
                    values: vec![1.0, 2.0, 3.0, 4.0],
                },
                Group {
                    label: "b".to_string(),
                    values: vec![2.0, 3.0, 5.0, 9.0],
                },
            ]),
        }
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(color(0), color(PALETTE.len()));
        assert_ne!(color(0), color(1));
    }

    #[cfg(feature = "kuva")]
    #[test]
    fn test_render_keeps_kind_and_title() {
        let plot = render_svg(&boxes()).unwrap();
        assert_eq!(plot.kind, PlotKind::Boxplot);
        assert_eq!(plot.title, "Boxplot of score by arm");
        assert!(plot.svg.contains("<svg"));
        assert!(plot.svg.contains("Boxplot of score by arm"));
    }

    #[cfg(feature = "kuva")]
    #[test]
    fn test_histogram_layers_include_density() {
        use crate::plot::Histogram;
        let data = PlotData {
            kind: PlotKind::DistributionPlot,
            title: "Distribution of x".to_string(),
            x_label: "Value".to_string(),
            y_label: "Count".to_string(),
            body: PlotBody::Histograms(vec![Histogram {
                label: "x".to_string(),
                values: vec![1.0, 2.0, 2.0, 3.0],
                bins: 3,
                range: (1.0, 3.0),
                density: vec![(1.0, 0.5), (2.0, 1.0), (3.0, 0.5)],
            }]),
        };
        assert_eq!(kuva_impl::layers(&data).len(), 2);
    }

    #[cfg(not(feature = "kuva"))]
    #[test]
    fn test_render_without_feature_is_unavailable() {
        assert!(matches!(
            render_svg(&boxes()),
            Err(crate::error::PlotError::Unavailable { .. })
        ));
    }
}
