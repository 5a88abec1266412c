//! Diagnostic plots
//!
//! A plot is first computed as a [`PlotData`] model (grouped values,
//! histogram bins with a density overlay, or points) and then drawn to a
//! standalone SVG document by [`render_svg`], ready to be embedded in a
//! report. Drawing needs the `kuva` feature.
//!
//! Box and violin plots split the primary column by the values of the
//! secondary column when one is selected. The distribution plot overlays the
//! secondary column when it is numeric. The scatterplot needs a numeric
//! secondary column.

mod render;

pub use render::render_svg;

use crate::error::{PlotError, PlotResult};
use imsig_io::{CellValue, Column, Dataset};
use imsig_stats::GaussianKde;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
/// Points sampled along each density curve
const DENSITY_POINTS: usize = 100;

/// Available plot kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    Boxplot,
    ViolinPlot,
    DistributionPlot,
    Scatterplot,
}

impl PlotKind {
    pub const ALL: [PlotKind; 4] = [
        PlotKind::Boxplot,
        PlotKind::ViolinPlot,
        PlotKind::DistributionPlot,
        PlotKind::Scatterplot,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PlotKind::Boxplot => "Boxplot",
            PlotKind::ViolinPlot => "Violin Plot",
            PlotKind::DistributionPlot => "Distribution Plot",
            PlotKind::Scatterplot => "Scatterplot",
        }
    }

    pub fn short_id(&self) -> &'static str {
        match self {
            PlotKind::Boxplot => "box",
            PlotKind::ViolinPlot => "violin",
            PlotKind::DistributionPlot => "distribution",
            PlotKind::Scatterplot => "scatter",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PlotKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PlotKind::ALL
            .into_iter()
            .find(|k| {
                k.short_id() == wanted
                    || k.display_name().to_lowercase() == wanted
                    || k.display_name().to_lowercase().replace(' ', "-") == wanted
            })
            .ok_or_else(|| PlotError::UnknownKind(s.to_string()))
    }
}

/// Values of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    pub values: Vec<f64>,
}

/// One column binned over a shared range, with a scaled density overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub label: String,
    pub values: Vec<f64>,
    pub bins: usize,
    /// (low, high) shared by every histogram of the plot
    pub range: (f64, f64),
    /// (value, expected count) pairs; empty when the column is constant
    pub density: Vec<(f64, f64)>,
}

/// Geometry of a plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlotBody {
    /// Box or violin per group
    Groups(Vec<Group>),
    Histograms(Vec<Histogram>),
    Points(Vec<(f64, f64)>),
}

/// Data model of a single plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub kind: PlotKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: PlotBody,
}

/// A plot rendered to SVG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPlot {
    pub kind: PlotKind,
    pub title: String,
    pub svg: String,
}

/// Compute the data model of `kind` for the selected columns
pub fn build_plot(
    kind: PlotKind,
    dataset: &Dataset,
    col1: &str,
    col2: Option<&str>,
) -> PlotResult<PlotData> {
    let primary = lookup(kind, dataset, col1)?;
    if !primary.is_numeric() {
        return Err(unavailable(
            kind,
            format!("column '{}' is not numeric", col1),
        ));
    }
    let secondary = col2.map(|name| lookup(kind, dataset, name)).transpose()?;

    match kind {
        PlotKind::Boxplot | PlotKind::ViolinPlot => {
            let groups: Vec<Group> = grouped_values(dataset, primary, secondary)
                .into_iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(label, values)| Group { label, values })
                .collect();
            if groups.is_empty() {
                return Err(no_values(kind, col1));
            }
            let prefix = match kind {
                PlotKind::Boxplot => "Boxplot",
                _ => "Violin plot",
            };
            Ok(PlotData {
                kind,
                title: format!("{} of {}", prefix, grouped_title(col1, col2)),
                x_label: col2.unwrap_or("").to_string(),
                y_label: col1.to_string(),
                body: PlotBody::Groups(groups),
            })
        }
        PlotKind::DistributionPlot => {
            let mut series = vec![(col1.to_string(), primary.numeric_values().unwrap_or_default())];
            if let Some(second) = secondary {
                if let Some(values) = second.numeric_values() {
                    series.push((second.name().to_string(), values));
                }
            }
            series.retain(|(_, values)| !values.is_empty());
            if series.is_empty() {
                return Err(no_values(kind, col1));
            }
            let title = series
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(" and ");
            Ok(PlotData {
                kind,
                title: format!("Distribution of {}", title),
                x_label: "Value".to_string(),
                y_label: "Count".to_string(),
                body: PlotBody::Histograms(histograms(series)),
            })
        }
        PlotKind::Scatterplot => {
            let second = secondary
                .ok_or_else(|| unavailable(kind, "requires a second column".to_string()))?;
            if !second.is_numeric() {
                return Err(unavailable(
                    kind,
                    format!("column '{}' is not numeric", second.name()),
                ));
            }
            let points: Vec<(f64, f64)> = (0..dataset.num_rows())
                .filter_map(|row| Some((primary.numeric_at(row)?, second.numeric_at(row)?)))
                .collect();
            if points.is_empty() {
                return Err(no_values(kind, col1));
            }
            Ok(PlotData {
                kind,
                title: format!("{} vs {}", col1, second.name()),
                x_label: col1.to_string(),
                y_label: second.name().to_string(),
                body: PlotBody::Points(points),
            })
        }
    }
}

/// Build and render every requested plot
///
/// Plots that cannot be drawn for this selection are skipped with a warning.
pub fn generate_plots(
    kinds: &[PlotKind],
    dataset: &Dataset,
    col1: &str,
    col2: Option<&str>,
) -> Vec<RenderedPlot> {
    let mut rendered = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        match build_plot(kind, dataset, col1, col2) {
            Ok(data) => match render_svg(&data) {
                Ok(plot) => rendered.push(plot),
                Err(e) => tracing::warn!("Skipping {}: {}", kind, e),
            },
            Err(e) => tracing::warn!("Skipping {}: {}", kind, e),
        }
    }
    rendered
}

fn lookup<'a>(kind: PlotKind, dataset: &'a Dataset, name: &str) -> PlotResult<&'a Column> {
    dataset
        .column(name)
        .ok_or_else(|| unavailable(kind, format!("column '{}' not found", name)))
}

fn unavailable(kind: PlotKind, reason: String) -> PlotError {
    PlotError::Unavailable {
        plot: kind.to_string(),
        reason,
    }
}

fn no_values(kind: PlotKind, column: &str) -> PlotError {
    PlotError::InsufficientData {
        plot: kind.to_string(),
        reason: format!("column '{}' has no values to plot", column),
    }
}

fn grouped_title(col1: &str, col2: Option<&str>) -> String {
    match col2 {
        Some(col2) => format!("{} by {}", col1, col2),
        None => col1.to_string(),
    }
}

/// Primary values split by the secondary column, in ascending key order
fn grouped_values(
    dataset: &Dataset,
    primary: &Column,
    secondary: Option<&Column>,
) -> Vec<(String, Vec<f64>)> {
    let Some(keys) = secondary else {
        return vec![(
            primary.name().to_string(),
            primary.numeric_values().unwrap_or_default(),
        )];
    };

    let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
    for row in 0..dataset.num_rows() {
        if let (Some(x), Some(key)) = (primary.numeric_at(row), keys.cell(row)) {
            groups.entry(key).or_default().push(x);
        }
    }
    groups
        .into_iter()
        .map(|(key, values)| (key.to_string(), values))
        .collect()
}

/// Histograms over a shared range; bin count by Sturges' rule on the
/// largest series
fn histograms(series: Vec<(String, Vec<f64>)>) -> Vec<Histogram> {
    let all = series.iter().flat_map(|(_, v)| v.iter().copied());
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    let largest = series.iter().map(|(_, v)| v.len()).max().unwrap_or(1);
    let bins = ((largest as f64).log2().ceil() as usize + 1).max(1);

    let range = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (range.1 - range.0) / bins as f64;

    series
        .into_iter()
        .map(|(label, values)| {
            let scale = values.len() as f64 * width;
            let density = GaussianKde::new(&values)
                .map(|kde| {
                    kde.grid(DENSITY_POINTS)
                        .into_iter()
                        .map(|(x, d)| (x, d * scale))
                        .collect()
                })
                .unwrap_or_default();
            Histogram {
                label,
                values,
                bins,
                range,
                density,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_columns(
            "plots",
            vec![
                Column::numeric("x", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
                Column::numeric("y", [2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0, 7.0]),
                Column::categorical("g", ["b", "a", "b", "a", "b", "a", "b", "a"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_plot_kind() {
        assert_eq!("violin".parse::<PlotKind>().unwrap(), PlotKind::ViolinPlot);
        assert_eq!("Violin Plot".parse::<PlotKind>().unwrap(), PlotKind::ViolinPlot);
        assert_eq!("distribution-plot".parse::<PlotKind>().unwrap(), PlotKind::DistributionPlot);
        assert!("pie".parse::<PlotKind>().is_err());
    }

    #[test]
    fn test_boxplot_grouped_by_secondary() {
        let data = build_plot(PlotKind::Boxplot, &dataset(), "x", Some("g")).unwrap();
        assert_eq!(data.title, "Boxplot of x by g");
        match data.body {
            PlotBody::Groups(groups) => {
                let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
                assert_eq!(labels, vec!["a", "b"]);
                assert_eq!(groups[0].values, vec![2.0, 4.0, 6.0, 8.0]);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_violin_single_group() {
        let data = build_plot(PlotKind::ViolinPlot, &dataset(), "x", None).unwrap();
        assert_eq!(data.title, "Violin plot of x");
        match data.body {
            PlotBody::Groups(groups) => {
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].label, "x");
                assert_eq!(groups[0].values.len(), 8);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_distribution_overlays_numeric_secondary() {
        let data = build_plot(PlotKind::DistributionPlot, &dataset(), "x", Some("y")).unwrap();
        match data.body {
            PlotBody::Histograms(h) => {
                assert_eq!(h.len(), 2);
                assert_eq!(h[0].range, h[1].range);
                assert_eq!(h[0].range, (1.0, 8.0));
                // Sturges: ceil(log2 8) + 1
                assert_eq!(h[0].bins, 4);
                assert_eq!(h[0].values.len(), 8);
                assert_eq!(h[0].density.len(), DENSITY_POINTS);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_histogram_of_constant_column() {
        let ds = Dataset::from_columns("flat", vec![Column::numeric("c", [3.0, 3.0, 3.0])]).unwrap();
        let data = build_plot(PlotKind::DistributionPlot, &ds, "c", None).unwrap();
        match data.body {
            PlotBody::Histograms(h) => {
                assert_eq!(h[0].range, (2.5, 3.5));
                assert_eq!(h[0].values, vec![3.0, 3.0, 3.0]);
                assert!(h[0].density.is_empty());
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_scatter_needs_numeric_secondary() {
        assert!(build_plot(PlotKind::Scatterplot, &dataset(), "x", None).is_err());
        assert!(matches!(
            build_plot(PlotKind::Scatterplot, &dataset(), "x", Some("g")),
            Err(PlotError::Unavailable { .. })
        ));
        let data = build_plot(PlotKind::Scatterplot, &dataset(), "x", Some("y")).unwrap();
        match data.body {
            PlotBody::Points(points) => {
                assert_eq!(points.len(), 8);
                assert_eq!(points[1], (2.0, 1.0));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[cfg(feature = "kuva")]
    #[test]
    fn test_generate_plots_skips_unavailable() {
        let plots = generate_plots(
            &[PlotKind::Boxplot, PlotKind::Scatterplot],
            &dataset(),
            "x",
            None,
        );
        assert_eq!(plots.len(), 1);
        assert_eq!(plots[0].kind, PlotKind::Boxplot);
        assert!(plots[0].svg.contains("<svg"));
    }

    #[cfg(not(feature = "kuva"))]
    #[test]
    fn test_generate_plots_without_renderer() {
        let plots = generate_plots(&PlotKind::ALL, &dataset(), "x", Some("y"));
        assert!(plots.is_empty());
    }
}
