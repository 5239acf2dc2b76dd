use serde::{Deserialize, Serialize};

/// Display colors handed out to journeys by their position in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub name: &'static str,
    pub colors: Vec<&'static str>,
}

impl Palette {
    /// The upload page colors.
    pub fn default() -> Self {
        Self {
            name: "upload",
            colors: vec![
                "#2176ae", "#e53935", "#2e7d32", "#f59e0b", "#5cc1ff", "#ff6b6b", "#52d273",
                "#f6c453",
            ],
        }
    }

    pub fn color_for(&self, index: usize) -> &'static str {
        if self.colors.is_empty() {
            return "#2176ae";
        }
        self.colors[index % self.colors.len()]
    }
}

/// `#rrggbb` to an rgb triple.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let value = hex.trim_start_matches('#');
    if value.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&value[0..2], 16).ok()?;
    let g = u8::from_str_radix(&value[2..4], 16).ok()?;
    let b = u8::from_str_radix(&value[4..6], 16).ok()?;
    Some((r, g, b))
}
