use std::f64::consts::PI;
use std::fmt::Write;

use crate::error::RenderError;
use crate::types::journey::JourneyRecord;

const LINE_WEIGHT: f64 = 5.0;
const LINE_OPACITY: f64 = 0.8;
const MARKER_RADIUS: f64 = 7.0;
const MARKER_FILL_OPACITY: f64 = 0.8;
// Web Mercator is undefined at the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Draws journeys onto some map surface. Read-only with respect to the store.
pub trait RenderAdapter {
    /// Path through the samples plus start and end markers. Nothing for an empty journey.
    fn draw(&mut self, journey: &JourneyRecord, color: &str);
    fn undraw(&mut self, id: &str);
    /// Bounds covering everything currently drawn.
    fn fit_bounds(&mut self) -> Option<Bounds>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn around(lat: f64, lon: f64) -> Self {
        Self {
            min_lat: lat,
            min_lon: lon,
            max_lat: lat,
            max_lon: lon,
        }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lat = self.max_lat.max(lat);
        self.max_lon = self.max_lon.max(lon);
    }

    fn union(mut self, other: Bounds) -> Self {
        self.extend(other.min_lat, other.min_lon);
        self.extend(other.max_lat, other.max_lon);
        self
    }
}

#[derive(Debug, Clone)]
struct Layer {
    id: String,
    name: String,
    color: String,
    /// (lat, lon) in path order.
    path: Vec<(f64, f64)>,
    bounds: Bounds,
}

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub background: Option<String>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            padding: 20,
            background: None,
        }
    }
}

/// An SVG map surface holding one layer per drawn journey.
#[derive(Debug, Clone, Default)]
pub struct SvgMap {
    layers: Vec<Layer>,
    view: Option<Bounds>,
}

impl SvgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_drawn(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    pub fn to_svg(&self, options: &MapOptions) -> Result<String, RenderError> {
        let width = options.width as f64;
        let height = options.height as f64;
        let padding = options.padding as f64;
        let view_width = width - 2.0 * padding;
        let view_height = height - 2.0 * padding;
        if view_width <= 0.0 || view_height <= 0.0 {
            return Err(RenderError::SvgError("Invalid viewport size".to_string()));
        }

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = options.width,
            h = options.height
        );
        if let Some(background) = &options.background {
            let _ = write!(
                svg,
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                escape(background)
            );
        }

        let view = self.view.or_else(|| self.union_bounds());
        if let Some(view) = view {
            let projection = Projection::fit(view, padding, view_width, view_height);
            for layer in &self.layers {
                svg.push_str(&render_layer(layer, &projection));
            }
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    fn union_bounds(&self) -> Option<Bounds> {
        self.layers
            .iter()
            .map(|l| l.bounds)
            .reduce(Bounds::union)
    }
}

impl RenderAdapter for SvgMap {
    fn draw(&mut self, journey: &JourneyRecord, color: &str) {
        let mut samples = journey.samples().iter();
        let Some(first) = samples.next() else {
            return;
        };
        let mut bounds = Bounds::around(first.latitude, first.longitude);
        let mut path = vec![(first.latitude, first.longitude)];
        for sample in samples {
            bounds.extend(sample.latitude, sample.longitude);
            path.push((sample.latitude, sample.longitude));
        }

        self.undraw(&journey.id);
        self.layers.push(Layer {
            id: journey.id.clone(),
            name: journey.name.clone(),
            color: color.to_string(),
            path,
            bounds,
        });
    }

    fn undraw(&mut self, id: &str) {
        self.layers.retain(|l| l.id != id);
    }

    fn fit_bounds(&mut self) -> Option<Bounds> {
        self.view = self.union_bounds();
        self.view
    }
}

struct Projection {
    min_x: f64,
    min_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    fn fit(bounds: Bounds, padding: f64, view_width: f64, view_height: f64) -> Self {
        let (min_x, max_y) = mercator(bounds.min_lat, bounds.min_lon);
        let (max_x, min_y) = mercator(bounds.max_lat, bounds.max_lon);
        let content_width = (max_x - min_x).max(f64::EPSILON);
        let content_height = (max_y - min_y).max(f64::EPSILON);
        let scale = (view_width / content_width).min(view_height / content_height);
        Self {
            min_x,
            min_y,
            scale,
            offset_x: padding + (view_width - content_width * scale) * 0.5,
            offset_y: padding + (view_height - content_height * scale) * 0.5,
        }
    }

    fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = mercator(lat, lon);
        (
            self.offset_x + (x - self.min_x) * self.scale,
            self.offset_y + (y - self.min_y) * self.scale,
        )
    }
}

/// Normalized Web Mercator, y grows southwards.
fn mercator(lat: f64, lon: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (lon + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn render_layer(layer: &Layer, projection: &Projection) -> String {
    let points: Vec<(f64, f64)> = layer
        .path
        .iter()
        .map(|&(lat, lon)| projection.project(lat, lon))
        .collect();
    let color = escape(&layer.color);
    let name = escape(&layer.name);

    let mut out = String::new();
    let _ = write!(out, r#"<g id="journey-{}">"#, escape(&layer.id));
    if points.len() > 1 {
        let coords = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            out,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-opacity="{:.2}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            coords, color, LINE_WEIGHT, LINE_OPACITY
        );
    }
    if let (Some(start), Some(end)) = (points.first(), points.last()) {
        for ((x, y), label) in [(start, "Start"), (end, "End")] {
            let _ = write!(
                out,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" stroke="{}" fill="{}" fill-opacity="{:.2}"><title>{} {}</title></circle>"#,
                x, y, MARKER_RADIUS, color, color, MARKER_FILL_OPACITY, name, label
            );
        }
    }
    out.push_str("</g>");
    out
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
