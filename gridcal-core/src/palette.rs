//! Event color codes.
//!
//! Google Calendar tags events with a small numeric `colorId`. The mapping to
//! hex values is fixed; anything unrecognised paints in `DEFAULT_COLOR_HEX`.

use std::fmt;

/// Fill for events with no color code or one outside the palette.
pub const DEFAULT_COLOR_HEX: &str = "#51b749";

/// Fill for every holiday overlay event.
pub const HOLIDAY_COLOR_HEX: &str = "#4caf50";

/// One known color code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub code: &'static str,
    pub name: &'static str,
    pub hex: &'static str,
}

pub const PALETTE: [PaletteEntry; 11] = [
    PaletteEntry { code: "1", name: "Blue", hex: "#a4bdfc" },
    PaletteEntry { code: "2", name: "Mint", hex: "#7ae7bf" },
    PaletteEntry { code: "3", name: "Purple", hex: "#dbadff" },
    PaletteEntry { code: "4", name: "Salmon", hex: "#ff887c" },
    PaletteEntry { code: "5", name: "Yellow", hex: "#fbd75b" },
    PaletteEntry { code: "6", name: "Orange", hex: "#ffb878" },
    PaletteEntry { code: "7", name: "Cyan", hex: "#46d6db" },
    PaletteEntry { code: "8", name: "Gray", hex: "#e1e1e1" },
    PaletteEntry { code: "9", name: "Turquoise", hex: "#5484ed" },
    PaletteEntry { code: "10", name: "Green", hex: "#51b749" },
    PaletteEntry { code: "11", name: "Red", hex: "#dc2127" },
];

/// Codes offered by the edit form, in menu order.
pub const SELECTABLE_CODES: [&str; 8] = ["11", "6", "5", "10", "9", "1", "3", "8"];

/// Look up a palette entry by code.
pub fn entry(code: &str) -> Option<&'static PaletteEntry> {
    PALETTE.iter().find(|e| e.code == code)
}

/// Resolve a color code to its hex value. Never fails.
pub fn resolve_color(code: Option<&str>) -> &'static str {
    code.and_then(entry)
        .map(|e| e.hex)
        .unwrap_or(DEFAULT_COLOR_HEX)
}

/// The colors the edit form lets the user choose from.
pub fn selectable() -> impl Iterator<Item = &'static PaletteEntry> {
    SELECTABLE_CODES.iter().filter_map(|code| entry(code))
}

pub fn is_selectable(code: &str) -> bool {
    SELECTABLE_CODES.contains(&code)
}

/// A 24-bit color used by the paint model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse a hex value, falling back to the default green.
    pub fn from_hex_or_default(hex: &str) -> Self {
        Self::from_hex(hex)
            .or_else(|| Self::from_hex(DEFAULT_COLOR_HEX))
            .unwrap_or(Rgb::new(0x51, 0xB7, 0x49))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
