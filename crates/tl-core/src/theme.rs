//! Highlight colors. One highlight field exists per color.

use serde::{Deserialize, Serialize};

/// Colors of the classic timeline theme, in category order.
pub const CLASSIC_HIGHLIGHT_COLORS: [&str; 4] = ["#FFFF00", "#FFC000", "#FF0000", "#0000FF"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub highlight_colors: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            highlight_colors: CLASSIC_HIGHLIGHT_COLORS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Number of highlight categories the theme can show.
    pub fn highlight_count(&self) -> usize {
        self.highlight_colors.len()
    }

    pub fn highlight_color(&self, category: usize) -> Option<&str> {
        self.highlight_colors.get(category).map(String::as_str)
    }
}
