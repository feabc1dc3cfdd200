use crate::draw::model::Color;

/// Colors offered as swatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swatch {
    Black,
    White,
    Red,
    Crimson,
    Pink,
    Grape,
    Brown,
    Blue,
    Indigo,
    Green,
    DarkGreen,
    Yellow,
    Orange,
}

impl Swatch {
    pub const ALL: [Swatch; 13] = [
        Swatch::Black,
        Swatch::White,
        Swatch::Red,
        Swatch::Crimson,
        Swatch::Pink,
        Swatch::Grape,
        Swatch::Brown,
        Swatch::Blue,
        Swatch::Indigo,
        Swatch::Green,
        Swatch::DarkGreen,
        Swatch::Yellow,
        Swatch::Orange,
    ];

    pub const fn color(self) -> Color {
        match self {
            Swatch::Black => Color::rgb(0, 0, 0),
            Swatch::White => Color::rgb(255, 255, 255),
            Swatch::Red => Color::rgb(255, 0, 0),
            Swatch::Crimson => Color::rgb(0xee, 0x33, 0x33),
            Swatch::Pink => Color::rgb(0xe6, 0x49, 0x80),
            Swatch::Grape => Color::rgb(0xbe, 0x4b, 0xdb),
            Swatch::Brown => Color::rgb(0x89, 0x32, 0x00),
            Swatch::Blue => Color::rgb(0x22, 0x8b, 0xe6),
            Swatch::Indigo => Color::rgb(0x33, 0x33, 0xee),
            Swatch::Green => Color::rgb(0x40, 0xc0, 0x57),
            Swatch::DarkGreen => Color::rgb(0x00, 0xaa, 0x00),
            Swatch::Yellow => Color::rgb(0xfa, 0xb0, 0x05),
            Swatch::Orange => Color::rgb(0xfd, 0x7e, 0x14),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Swatch::Black => "black",
            Swatch::White => "white",
            Swatch::Red => "red",
            Swatch::Crimson => "crimson",
            Swatch::Pink => "pink",
            Swatch::Grape => "grape",
            Swatch::Brown => "brown",
            Swatch::Blue => "blue",
            Swatch::Indigo => "indigo",
            Swatch::Green => "green",
            Swatch::DarkGreen => "dark green",
            Swatch::Yellow => "yellow",
            Swatch::Orange => "orange",
        }
    }

    pub fn from_color(color: Color) -> Option<Swatch> {
        Swatch::ALL
            .iter()
            .copied()
            .find(|swatch| swatch.color() == color)
    }

    /// Parses `rgb(r, g, b)` or `#rrggbb` and maps it onto a swatch.
    ///
    /// Colors that are not part of the palette yield `None`.
    pub fn parse(text: &str) -> Option<Swatch> {
        let text = text.trim();
        let color = if let Some(hex) = text.strip_prefix('#') {
            parse_hex(hex)?
        } else if let Some(body) = text
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            parse_rgb_components(body)?
        } else {
            return None;
        };
        Swatch::from_color(color)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_rgb_components(body: &str) -> Option<Color> {
    let mut parts = body.split(',').map(|part| part.trim().parse::<u8>().ok());
    let r = parts.next()??;
    let g = parts.next()??;
    let b = parts.next()??;
    if parts.next().is_some() {
        return None;
    }
    Some(Color::rgb(r, g, b))
}

/// Holds the stroke color read by stroke capture at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    current: Swatch,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            current: Swatch::White,
        }
    }
}

impl Palette {
    pub fn select_color(&mut self, swatch: Swatch) {
        if self.current != swatch {
            tracing::debug!(swatch = swatch.label(), "stroke color selected");
        }
        self.current = swatch;
    }

    pub fn current(&self) -> Swatch {
        self.current
    }

    pub fn current_color(&self) -> Color {
        self.current.color()
    }
}
