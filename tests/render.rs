use journeylog_rs::pipeline::rasterize::{rasterize, RasterConfig};
use journeylog_rs::pipeline::render::{MapOptions, RenderAdapter, SvgMap};
use journeylog_rs::types::journey::{GeoSample, JourneyRecord};

fn journey(id: &str, points: &[(f64, f64)]) -> JourneyRecord {
    let data = points.iter().map(|&(lat, lon)| GeoSample::new(lat, lon)).collect();
    JourneyRecord::new(id, format!("Trip {id}"), data)
}

#[test]
fn empty_journey_draws_nothing() {
    let mut map = SvgMap::new();
    map.draw(&journey("empty", &[]), "#2176ae");

    assert_eq!(map.layer_count(), 0);
    assert_eq!(map.fit_bounds(), None);
    let svg = map.to_svg(&MapOptions::default()).expect("svg");
    assert!(!svg.contains("<polyline"));
}

#[test]
fn journey_gets_path_and_markers() {
    let mut map = SvgMap::new();
    map.draw(&journey("a", &[(59.30, 18.00), (59.31, 18.02), (59.33, 18.05)]), "#e53935");

    let svg = map.to_svg(&MapOptions::default()).expect("svg");

    assert!(svg.contains("<polyline"));
    assert!(svg.contains(r##"stroke="#e53935""##));
    assert!(svg.contains("<title>Trip a Start</title>"));
    assert!(svg.contains("<title>Trip a End</title>"));
    assert_eq!(svg.matches("<circle").count(), 2);
}

#[test]
fn fit_bounds_covers_all_layers_and_undraw_removes() {
    let mut map = SvgMap::new();
    map.draw(&journey("a", &[(59.0, 18.0), (59.5, 18.5)]), "#2176ae");
    map.draw(&journey("b", &[(58.0, 17.0)]), "#e53935");

    let bounds = map.fit_bounds().expect("bounds");
    assert_eq!((bounds.min_lat, bounds.min_lon), (58.0, 17.0));
    assert_eq!((bounds.max_lat, bounds.max_lon), (59.5, 18.5));

    map.undraw("b");
    assert!(!map.is_drawn("b"));
    let bounds = map.fit_bounds().expect("bounds");
    assert_eq!(bounds.min_lat, 59.0);
}

#[test]
fn redraw_replaces_the_layer() {
    let mut map = SvgMap::new();
    let trip = journey("a", &[(59.0, 18.0), (59.5, 18.5)]);
    map.draw(&trip, "#2176ae");
    map.draw(&trip, "#e53935");

    assert_eq!(map.layer_count(), 1);
}

#[test]
fn names_are_escaped() {
    let mut map = SvgMap::new();
    let mut trip = journey("a", &[(59.0, 18.0)]);
    trip.name = "<b>&co</b>".to_string();
    map.draw(&trip, "#2176ae");

    let svg = map.to_svg(&MapOptions::default()).expect("svg");
    assert!(svg.contains("&lt;b&gt;&amp;co&lt;/b&gt; Start"));
}

#[test]
fn rejects_degenerate_viewport() {
    let map = SvgMap::new();
    let options = MapOptions {
        width: 10,
        height: 10,
        padding: 20,
        background: None,
    };
    assert!(map.to_svg(&options).is_err());
}

#[test]
fn rasterizes_to_png() {
    let mut map = SvgMap::new();
    map.draw(&journey("a", &[(59.30, 18.00), (59.33, 18.05)]), "#2176ae");
    let options = MapOptions {
        width: 200,
        height: 150,
        ..MapOptions::default()
    };
    let svg = map.to_svg(&options).expect("svg");

    let png = rasterize(
        &svg,
        &RasterConfig {
            width: 200,
            height: 150,
            background: Some("#ffffff".to_string()),
        },
    )
    .expect("png");

    assert_eq!(&png[1..4], b"PNG");
}
