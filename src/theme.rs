use ratatui::style::Color;

use crate::window::RiskLevel;

// Centralized theme colors.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);
pub const ACCENT_ALT_RGB: (u8, u8, u8) = (255, 165, 0);

pub fn rgb_to_color(rgb: (u8, u8, u8)) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn accent() -> Color {
    rgb_to_color(ACCENT_RGB)
}

pub fn accent_alt() -> Color {
    rgb_to_color(ACCENT_ALT_RGB)
}

// Desktop
pub fn desktop_bg() -> Color {
    Color::Black
}

// Launcher
pub fn launcher_bg() -> Color {
    Color::DarkGray
}
pub fn launcher_fg() -> Color {
    Color::Black
}
pub fn launcher_hover_bg() -> Color {
    Color::Gray
}
pub fn preview_bg() -> Color {
    Color::Black
}
pub fn preview_border() -> Color {
    accent_alt()
}

// Risk levels
pub fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::Red,
    }
}

// Decorator
pub fn decorator_header_bg() -> Color {
    Color::Blue
}
pub fn decorator_header_inactive_bg() -> Color {
    Color::DarkGray
}
pub fn decorator_header_fg() -> Color {
    Color::White
}
pub fn decorator_border() -> Color {
    Color::DarkGray
}
pub fn resize_outline() -> Color {
    accent()
}

// Content failure placeholder
pub fn placeholder_fg() -> Color {
    Color::Red
}

// Log view highlight
pub fn log_highlight() -> Color {
    accent_alt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_returns_rgb() {
        assert_eq!(accent(), Color::Rgb(200, 100, 0));
    }

    #[test]
    fn risk_levels_have_distinct_colors() {
        let low = risk_color(RiskLevel::Low);
        let medium = risk_color(RiskLevel::Medium);
        let high = risk_color(RiskLevel::High);
        assert_ne!(low, medium);
        assert_ne!(medium, high);
        assert_ne!(low, high);
    }
}
