use iced::Color;
use serde::{Deserialize, Serialize};

// ─── ACCENT COLORS ──────────────────────────────────────────────

/// Fill color of the gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccentColor {
    Red,
    Orange,
    Green,
    #[default]
    Blue,
    Violet,
}

impl AccentColor {
    pub fn color(&self) -> Color {
        match self {
            AccentColor::Red => Color::from_rgb(0.93, 0.30, 0.35),
            AccentColor::Orange => Color::from_rgb(0.96, 0.52, 0.20),
            AccentColor::Green => Color::from_rgb(0.35, 0.87, 0.40),
            AccentColor::Blue => Color::from_rgb(0.33, 0.63, 0.95),
            AccentColor::Violet => Color::from_rgb(0.65, 0.45, 0.85),
        }
    }
}

// ─── THEME VARIANTS ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeVariant {
    CatppuccinLatte,
    #[default]
    CatppuccinMocha,
    GruvboxLight,
    GruvboxDark,
}

impl ThemeVariant {
    pub fn is_light(&self) -> bool {
        matches!(self, ThemeVariant::CatppuccinLatte | ThemeVariant::GruvboxLight)
    }
}

// ─── PALETTE ────────────────────────────────────────────────────

/// Every color the widget draws with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub label: Color,
    pub text: Color,
    /// Empty part of a gauge.
    pub bar_bg: Color,
    /// Filled part of a gauge.
    pub accent: Color,
    /// Background of an indicator in alert.
    pub alert: Color,
}

pub fn build_palette(theme: ThemeVariant, accent: AccentColor) -> Palette {
    Palette {
        accent: accent.color(),
        ..base_palette(theme)
    }
}

fn base_palette(theme: ThemeVariant) -> Palette {
    match theme {
        ThemeVariant::CatppuccinLatte => Palette {
            bg:     hex(0xef, 0xf1, 0xf5),
            label:  hex(0x6c, 0x6f, 0x85),
            text:   hex(0x4c, 0x4f, 0x69),
            bar_bg: hex(0xcc, 0xd0, 0xda),
            accent: hex(0x1e, 0x66, 0xf5),
            alert:  hex(0xd2, 0x0f, 0x39),
        },
        ThemeVariant::CatppuccinMocha => Palette {
            bg:     hex(0x1e, 0x1e, 0x2e),
            label:  hex(0xa6, 0xad, 0xc8),
            text:   hex(0xcd, 0xd6, 0xf4),
            bar_bg: hex(0x31, 0x32, 0x44),
            accent: hex(0x89, 0xb4, 0xfa),
            alert:  hex(0xf3, 0x8b, 0xa8),
        },
        ThemeVariant::GruvboxLight => Palette {
            bg:     hex(0xfb, 0xf1, 0xc7),
            label:  hex(0x66, 0x5c, 0x54),
            text:   hex(0x3c, 0x38, 0x36),
            bar_bg: hex(0xd5, 0xc4, 0xa1),
            accent: hex(0x07, 0x66, 0x78),
            alert:  hex(0x9d, 0x00, 0x06),
        },
        ThemeVariant::GruvboxDark => Palette {
            bg:     hex(0x28, 0x28, 0x28),
            label:  hex(0xa8, 0x99, 0x84),
            text:   hex(0xeb, 0xdb, 0xb2),
            bar_bg: hex(0x3c, 0x38, 0x36),
            accent: hex(0x83, 0xa5, 0x98),
            alert:  hex(0xfb, 0x49, 0x34),
        },
    }
}

const fn hex(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_overrides_base() {
        let p = build_palette(ThemeVariant::GruvboxDark, AccentColor::Orange);
        assert_eq!(p.accent, AccentColor::Orange.color());
        assert_eq!(p.bg, base_palette(ThemeVariant::GruvboxDark).bg);
    }

    #[test]
    fn test_light_variants() {
        assert!(ThemeVariant::CatppuccinLatte.is_light());
        assert!(ThemeVariant::GruvboxLight.is_light());
        assert!(!ThemeVariant::default().is_light());
    }
}
