//! SVG map figures in an equirectangular (plate carrée) projection.
//!
//! Figures are plain SVG markup assembled with `format!` and written to
//! disk. Longitude/latitude map linearly onto the plot area, basemap and
//! network layers are clipped to it, and an optional vertical colorbar
//! sits in the right gutter.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo::BoundingRect;
use geo_types::{Coord, LineString};

use super::colormap::{viridis, Rgb};

const WIDTH: f64 = 1500.0;
const HEIGHT: f64 = 1000.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 40.0;
// Right gutter reserves room for the colorbar
const MARGIN_RIGHT: f64 = 160.0;

const PLOT_WIDTH: f64 = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
const PLOT_HEIGHT: f64 = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

// Strokes thinner than this disappear at figure scale
const MIN_STROKE_WIDTH: f64 = 0.3;

/// Geographic extent of a figure in lon/lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Union of the bounding rectangles of the given lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a LineString<f64>>) -> Option<Self> {
        let mut extent: Option<Extent> = None;

        for line in lines {
            let rect = match line.bounding_rect() {
                Some(r) => r,
                None => continue,
            };

            extent = Some(match extent {
                None => Extent {
                    min_lon: rect.min().x,
                    min_lat: rect.min().y,
                    max_lon: rect.max().x,
                    max_lat: rect.max().y,
                },
                Some(e) => Extent {
                    min_lon: e.min_lon.min(rect.min().x),
                    min_lat: e.min_lat.min(rect.min().y),
                    max_lon: e.max_lon.max(rect.max().x),
                    max_lat: e.max_lat.max(rect.max().y),
                },
            });
        }

        extent
    }

    /// Pad each side by a fraction of the span. Degenerate spans (a single
    /// point, a meridian-aligned line) get a fixed half-degree pad so the
    /// projection never divides by zero.
    pub fn padded(self, frac: f64) -> Self {
        let lon_pad = ((self.max_lon - self.min_lon) * frac).max(0.5);
        let lat_pad = ((self.max_lat - self.min_lat) * frac).max(0.5);

        Extent {
            min_lon: self.min_lon - lon_pad,
            min_lat: self.min_lat - lat_pad,
            max_lon: self.max_lon + lon_pad,
            max_lat: self.max_lat + lat_pad,
        }
    }

    fn lon_span(&self) -> f64 {
        (self.max_lon - self.min_lon).max(1e-9)
    }

    fn lat_span(&self) -> f64 {
        (self.max_lat - self.min_lat).max(1e-9)
    }
}

struct Colorbar {
    label: String,
    min: f64,
    max: f64,
}

/// A single map figure under construction.
pub struct MapFigure {
    title: String,
    extent: Extent,
    layers: String,
    line_count: usize,
    colorbar: Option<Colorbar>,
}

impl MapFigure {
    pub fn new(title: &str, extent: Extent) -> Self {
        Self {
            title: title.to_string(),
            extent,
            layers: String::new(),
            line_count: 0,
            colorbar: None,
        }
    }

    /// Number of polylines added so far (basemap outlines included).
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    fn project(&self, coord: Coord<f64>) -> (f64, f64) {
        let x = MARGIN_LEFT + (coord.x - self.extent.min_lon) / self.extent.lon_span() * PLOT_WIDTH;
        let y = MARGIN_TOP + (self.extent.max_lat - coord.y) / self.extent.lat_span() * PLOT_HEIGHT;
        (x, y)
    }

    fn points_attr(&self, line: &LineString<f64>) -> String {
        let mut points = String::with_capacity(line.0.len() * 16);
        for coord in &line.0 {
            let (x, y) = self.project(*coord);
            if !points.is_empty() {
                points.push(' ');
            }
            let _ = write!(points, "{:.2},{:.2}", x, y);
        }
        points
    }

    /// Dotted gray country outline for the basemap layer.
    pub fn add_outline(&mut self, line: &LineString<f64>) {
        if line.0.len() < 2 {
            return;
        }
        let _ = writeln!(
            self.layers,
            r##"<polyline points="{}" fill="none" stroke="#9a9a9a" stroke-width="0.6" stroke-dasharray="2 3" />"##,
            self.points_attr(line)
        );
        self.line_count += 1;
    }

    /// Colored network line; widths below the visibility floor are raised.
    pub fn add_line(&mut self, line: &LineString<f64>, color: Rgb, width: f64) {
        if line.0.len() < 2 {
            return;
        }
        let _ = writeln!(
            self.layers,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-linecap="round" />"#,
            self.points_attr(line),
            color.to_hex(),
            width.max(MIN_STROKE_WIDTH)
        );
        self.line_count += 1;
    }

    /// Attach a colorbar legend spanning `min..max` of the mapped quantity.
    pub fn with_colorbar(&mut self, label: &str, min: f64, max: f64) {
        self.colorbar = Some(Colorbar {
            label: label.to_string(),
            min,
            max,
        });
    }

    fn colorbar_svg(&self) -> String {
        let cb = match &self.colorbar {
            Some(cb) => cb,
            None => return String::new(),
        };

        let bar_x = WIDTH - MARGIN_RIGHT + 40.0;
        let bar_w = 22.0;
        let bar_y = MARGIN_TOP;
        let bar_h = PLOT_HEIGHT;

        let mut stops = String::new();
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            let _ = writeln!(
                stops,
                r##"<stop offset="{:.3}" stop-color="{}" />"##,
                t,
                viridis(t).to_hex()
            );
        }

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<defs><linearGradient id="cbar" x1="0" y1="1" x2="0" y2="0">{}</linearGradient></defs>"#,
            stops
        );
        let _ = writeln!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="url(#cbar)" stroke="#333333" stroke-width="1" />"##,
            bar_x, bar_y, bar_w, bar_h
        );

        // Min at the bottom, max at the top, midpoint between
        let ticks = [
            (cb.min, bar_y + bar_h),
            ((cb.min + cb.max) / 2.0, bar_y + bar_h / 2.0),
            (cb.max, bar_y),
        ];
        for (value, y) in ticks {
            let _ = writeln!(
                svg,
                r##"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="14" fill="#333333" dominant-baseline="middle">{:.1}</text>"##,
                bar_x + bar_w + 8.0,
                y,
                value
            );
        }

        let label_x = bar_x + bar_w + 72.0;
        let label_y = bar_y + bar_h / 2.0;
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="16" fill="#333333" text-anchor="middle" transform="rotate(-90 {:.1} {:.1})">{}</text>"##,
            label_x, label_y, label_x, label_y, cb.label
        );

        svg
    }

    /// Assemble the complete SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(self.layers.len() + 2048);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = WIDTH,
            h = HEIGHT
        );
        let _ = writeln!(svg, r##"<rect width="100%" height="100%" fill="#ffffff" />"##);
        let _ = writeln!(
            svg,
            r#"<defs><clipPath id="plot"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" /></clipPath></defs>"#,
            MARGIN_LEFT, MARGIN_TOP, PLOT_WIDTH, PLOT_HEIGHT
        );

        let _ = writeln!(svg, r#"<g clip-path="url(#plot)">"#);
        svg.push_str(&self.layers);
        let _ = writeln!(svg, "</g>");

        // Plot frame
        let _ = writeln!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#333333" stroke-width="1" />"##,
            MARGIN_LEFT, MARGIN_TOP, PLOT_WIDTH, PLOT_HEIGHT
        );

        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="24" fill="#111111" text-anchor="middle">{}</text>"##,
            MARGIN_LEFT + PLOT_WIDTH / 2.0,
            MARGIN_TOP - 25.0,
            self.title
        );

        svg.push_str(&self.colorbar_svg());
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the figure to disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_svg())
            .with_context(|| format!("Failed to write figure to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    #[test]
    fn test_extent_union_and_padding() {
        let a = line(&[(0.0, 40.0), (10.0, 50.0)]);
        let b = line(&[(-5.0, 45.0), (2.0, 55.0)]);

        let extent = Extent::from_lines([&a, &b]).unwrap();
        assert_eq!(extent.min_lon, -5.0);
        assert_eq!(extent.max_lon, 10.0);
        assert_eq!(extent.min_lat, 40.0);
        assert_eq!(extent.max_lat, 55.0);

        let padded = extent.padded(0.1);
        assert!(padded.min_lon < extent.min_lon);
        assert!(padded.max_lat > extent.max_lat);
    }

    #[test]
    fn test_extent_of_point_is_padded_open() {
        let point_like = line(&[(8.5, 47.4), (8.5, 47.4)]);
        let extent = Extent::from_lines([&point_like]).unwrap().padded(0.05);

        assert!(extent.lon_span() >= 1.0);
        assert!(extent.lat_span() >= 1.0);
    }

    #[test]
    fn test_extent_of_nothing() {
        assert!(Extent::from_lines(std::iter::empty::<&LineString<f64>>()).is_none());
    }

    #[test]
    fn test_projection_corners() {
        let extent = Extent {
            min_lon: 0.0,
            min_lat: 40.0,
            max_lon: 10.0,
            max_lat: 50.0,
        };
        let figure = MapFigure::new("t", extent);

        let (x, y) = figure.project(Coord { x: 0.0, y: 50.0 });
        assert_eq!((x, y), (MARGIN_LEFT, MARGIN_TOP));

        let (x, y) = figure.project(Coord { x: 10.0, y: 40.0 });
        assert_eq!((x, y), (MARGIN_LEFT + PLOT_WIDTH, MARGIN_TOP + PLOT_HEIGHT));
    }

    #[test]
    fn test_svg_contains_layers_and_legend() {
        let extent = Extent {
            min_lon: 0.0,
            min_lat: 40.0,
            max_lon: 10.0,
            max_lat: 50.0,
        };
        let mut figure = MapFigure::new("European gas transmission network", extent);
        figure.add_outline(&line(&[(1.0, 41.0), (2.0, 42.0)]));
        figure.add_line(&line(&[(3.0, 43.0), (4.0, 44.0)]), viridis(0.8), 1.5);
        figure.with_colorbar("Pipeline capacity (million cubic meters per day)", 0.5, 452.1);

        let svg = figure.to_svg();
        assert_eq!(figure.line_count(), 2);
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("European gas transmission network"));
        assert!(svg.contains("Pipeline capacity"));
        assert!(svg.contains("452.1"));
        assert!(svg.contains("0.5"));
        assert!(svg.contains("url(#cbar)"));
    }

    #[test]
    fn test_degenerate_lines_are_skipped() {
        let extent = Extent {
            min_lon: 0.0,
            min_lat: 40.0,
            max_lon: 10.0,
            max_lat: 50.0,
        };
        let mut figure = MapFigure::new("t", extent);
        figure.add_line(&line(&[(3.0, 43.0)]), viridis(0.5), 1.0);
        assert_eq!(figure.line_count(), 0);
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.svg");

        let extent = Extent {
            min_lon: 0.0,
            min_lat: 40.0,
            max_lon: 10.0,
            max_lat: 50.0,
        };
        let mut figure = MapFigure::new("t", extent);
        figure.add_line(&line(&[(3.0, 43.0), (4.0, 44.0)]), viridis(0.2), 1.0);
        figure.write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
        assert!(written.trim_end().ends_with("</svg>"));
    }
}
