//! Theme colors, with optional `#RRGGBB` overrides from the `[theme]`
//! table of the config file.

use ratatui::style::Color;
use std::collections::BTreeMap;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Focused borders, key hints
    pub danger: Color,      // Armed chip, remove control
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Placeholder, hints
    pub chip_bg: Color,     // Chip badge background
    pub bg_selected: Color, // Candidate cursor
    pub inactive: Color,    // Unfocused borders
    pub header: Color,      // Box titles
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            chip_bg: Color::Rgb(49, 50, 68),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Apply config overrides on top of the default palette
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut theme = Self::default();

        for (key, value) in overrides {
            let Some(color) = Self::parse_hex_color(value) else {
                tracing::warn!("Ignoring theme.{}: not a hex color: {}", key, value);
                continue;
            };

            let slot = match key.as_str() {
                "accent" => &mut theme.accent,
                "danger" => &mut theme.danger,
                "text" => &mut theme.text,
                "text_dim" => &mut theme.text_dim,
                "chip_bg" => &mut theme.chip_bg,
                "bg_selected" => &mut theme.bg_selected,
                "inactive" => &mut theme.inactive,
                "header" => &mut theme.header,
                _ => {
                    tracing::warn!("Unknown theme key: {}", key);
                    continue;
                }
            };
            *slot = color;
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let digit = |i: usize, len: usize| -> Option<u8> {
            u8::from_str_radix(hex.get(i..i + len)?, 16).ok()
        };

        match hex.len() {
            6 => Some(Color::Rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
            3 => Some(Color::Rgb(digit(0, 1)? * 17, digit(1, 1)? * 17, digit(2, 1)? * 17)),
            _ => None,
        }
    }
}
