//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;
use serde::{Deserialize, Serialize};

/// Theme selection from the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Detect from the terminal background
    #[default]
    Auto,
    Dark,
    Light,
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score colors: at or above the threshold vs below it
    pub score_ok: Color,
    pub score_weak: Color,

    // Radar chart
    pub radar_grid: Color,
    pub radar_threshold: Color,
    pub radar_shape: Color,
    pub radar_label: Color,

    // Form
    pub field_label: Color,
    pub field_value: Style,
    pub field_selected: Style,

    // Styles
    pub header_style: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,
    pub flash_info: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_ok: Color::Green,
            score_weak: Color::Red,
            radar_grid: Color::Indexed(240),
            radar_threshold: Color::Yellow,
            radar_shape: Color::Cyan,
            radar_label: Color::White,
            field_label: Color::Gray,
            field_value: Style::new().fg(Color::White).bold(),
            field_selected: Style::new().reversed(),
            header_style: Style::new().bold(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            flash_info: Color::White,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn light() -> Self {
        Self {
            score_ok: Color::Rgb(0, 120, 40),
            score_weak: Color::Rgb(180, 0, 0),
            radar_grid: Color::Indexed(250),
            radar_threshold: Color::Rgb(170, 110, 0),
            radar_shape: Color::Blue,
            radar_label: Color::Black,
            field_label: Color::DarkGray,
            field_value: Style::new().fg(Color::Black).bold(),
            field_selected: Style::new().reversed(),
            header_style: Style::new().bold(),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 120, 40),
            flash_error: Color::Rgb(180, 0, 0),
            flash_info: Color::Black,
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
        }
    }

    /// Color for a score relative to the weak-axis threshold
    pub fn score_color(&self, score: f64, threshold: f64) -> Color {
        if score < threshold {
            self.score_weak
        } else {
            self.score_ok
        }
    }
}

/// Luma above which a terminal background counts as light
const LIGHT_LUMA: f32 = 0.6;

/// Pick a palette. `Auto` queries the terminal background and falls back
/// to dark when the terminal does not answer.
pub fn resolve_theme(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors::dark(),
        Theme::Light => ThemeColors::light(),
        Theme::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA => ThemeColors::light(),
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                tracing::debug!("terminal background detection failed: {}", e);
                ThemeColors::dark()
            }
        },
    }
}
