//! Cosmetic color palettes rendered as CSS custom properties.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// HSL components for one scheme, in `H S% L%` CSS form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemeColors {
    pub light: &'static str,
    pub dark: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub name: &'static str,
    pub primary: SchemeColors,
    pub secondary: SchemeColors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

const fn palette(name: &'static str, primary: [&'static str; 2], secondary: [&'static str; 2]) -> Palette {
    Palette {
        name,
        primary: SchemeColors { light: primary[0], dark: primary[1] },
        secondary: SchemeColors { light: secondary[0], dark: secondary[1] },
    }
}

pub const PALETTES: [Palette; 11] = [
    palette("Default", ["217.2 91.2% 59.8%", "217.2 91.2% 59.8%"], ["228 9% 92.2%", "228 9% 14.9%"]),
    palette("Mint", ["160 60% 45%", "160 70% 50%"], ["160 20% 90%", "160 10% 20%"]),
    palette("Sunset", ["30 80% 55%", "30 90% 60%"], ["20 30% 92%", "20 15% 22%"]),
    palette("Ocean", ["205 80% 55%", "205 90% 65%"], ["190 20% 90%", "190 15% 20%"]),
    palette("Plum", ["260 70% 60%", "260 80% 70%"], ["300 20% 92%", "270 10% 22%"]),
    palette("Emerald", ["145 65% 50%", "145 75% 60%"], ["150 20% 90%", "150 15% 20%"]),
    palette("Ruby", ["340 85% 60%", "340 90% 70%"], ["345 25% 92%", "345 15% 22%"]),
    palette("Amber", ["35 90% 55%", "40 95% 65%"], ["45 30% 90%", "45 20% 20%"]),
    palette("Sapphire", ["210 80% 55%", "210 90% 65%"], ["215 30% 90%", "215 15% 20%"]),
    palette("Jade", ["165 60% 45%", "165 70% 55%"], ["170 20% 90%", "170 10% 20%"]),
    palette("Garnet", ["350 70% 55%", "350 80% 65%"], ["355 20% 92%", "355 10% 22%"]),
];

/// Case-insensitive palette lookup.
#[must_use]
pub fn find_palette(name: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Palette {
    /// `:root` block setting `--primary` and `--secondary` for `scheme`.
    #[must_use]
    pub fn css(&self, scheme: ColorScheme) -> String {
        let (primary, secondary) = match scheme {
            ColorScheme::Light => (self.primary.light, self.secondary.light),
            ColorScheme::Dark => (self.primary.dark, self.secondary.dark),
        };
        let mut css = String::from(":root {\n");
        let _ = writeln!(css, "  --primary: {primary};");
        let _ = writeln!(css, "  --secondary: {secondary};");
        css.push_str("}\n");
        css
    }
}
