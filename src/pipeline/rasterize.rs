use crate::error::RasterError;
use crate::types::palette::parse_hex_color;

#[derive(Debug, Clone)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
    /// `#rrggbb`; transparent when absent.
    pub background: Option<String>,
}

pub fn rasterize(svg: &str, config: &RasterConfig) -> Result<Vec<u8>, RasterError> {
    // The map has no text nodes, an empty font database is enough.
    let fontdb = usvg::fontdb::Database::new();
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options, &fontdb)
        .map_err(|e| RasterError::RenderFailed(format!("Failed to parse SVG: {}", e)))?;

    let mut pixmap = tiny_skia::Pixmap::new(config.width, config.height)
        .ok_or_else(|| RasterError::RenderFailed("Failed to create pixmap".to_string()))?;

    if let Some((r, g, b)) = config.background.as_deref().and_then(parse_hex_color) {
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
    }

    let transform = tiny_skia::Transform::from_scale(
        config.width as f32 / tree.size().width(),
        config.height as f32 / tree.size().height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RasterError::RenderFailed(format!("Failed to encode PNG: {}", e)))
}
