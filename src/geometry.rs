//! Shared geometric and color primitives used by the surface, tools and config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Inclusive axis-aligned box spanned by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub const fn width(&self) -> u32 {
        self.right.abs_diff(self.left)
    }

    pub const fn height(&self) -> u32 {
        self.bottom.abs_diff(self.top)
    }

    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Vertex set produced for one shape, ready to be rasterized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outline {
    Line(Point, Point),
    /// Closed polygon; the last vertex connects back to the first.
    Polygon(Vec<Point>),
    /// Ellipse inscribed in the box.
    Ellipse(Bounds),
}

impl Outline {
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Self::Line(start, end) => vec![*start, *end],
            Self::Polygon(vertices) => vertices.clone(),
            Self::Ellipse(bounds) => vec![
                Point::new(bounds.left, bounds.top),
                Point::new(bounds.right, bounds.bottom),
            ],
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Line(start, end) => Some(Bounds::spanning(*start, *end)),
            Self::Ellipse(bounds) => Some(*bounds),
            Self::Polygon(vertices) => {
                let (first, rest) = vertices.split_first()?;
                Some(rest.iter().fold(Bounds::spanning(*first, *first), |acc, point| {
                    Bounds {
                        left: acc.left.min(point.x),
                        top: acc.top.min(point.y),
                        right: acc.right.max(point.x),
                        bottom: acc.bottom.max(point.y),
                    }
                }))
            }
        }
    }

    pub const fn is_fillable(&self) -> bool {
        !matches!(self, Self::Line(..))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}; expected #RRGGBB or a palette name")]
pub struct ParseColorError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub const fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }

    /// Accepts `#RRGGBB`, `RRGGBB` or a preset palette name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        PresetColor::from_name(value)
            .map(PresetColor::color)
            .or_else(|| parse_hex_rgb(value))
    }

    /// Outcome of a custom color pick; a cancelled pick paints white.
    pub fn from_picker(picked: Option<Self>) -> Self {
        picked.unwrap_or(Self::WHITE)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(ParseColorError(value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self::new(r, g, b)
    }
}

fn parse_hex_rgb(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let red = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let green = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let blue = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::new(red, green, blue))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetColor {
    Black,
    Blue,
    Green,
    Red,
    Magenta,
    Gray,
    Orange,
    Yellow,
    Pink,
    Cyan,
    LightGray,
}

impl PresetColor {
    pub const ALL: [Self; 11] = [
        Self::Black,
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Magenta,
        Self::Gray,
        Self::Orange,
        Self::Yellow,
        Self::Pink,
        Self::Cyan,
        Self::LightGray,
    ];

    pub const fn color(self) -> Color {
        match self {
            Self::Black => Color::new(0, 0, 0),
            Self::Blue => Color::new(0, 0, 255),
            Self::Green => Color::new(0, 255, 0),
            Self::Red => Color::new(255, 0, 0),
            Self::Magenta => Color::new(255, 0, 255),
            Self::Gray => Color::new(128, 128, 128),
            Self::Orange => Color::new(255, 200, 0),
            Self::Yellow => Color::new(255, 255, 0),
            Self::Pink => Color::new(255, 175, 175),
            Self::Cyan => Color::new(0, 255, 255),
            Self::LightGray => Color::new(192, 192, 192),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
            Self::Magenta => "magenta",
            Self::Gray => "gray",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Cyan => "cyan",
            Self::LightGray => "light_gray",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let normalized = match normalized.as_str() {
            "grey" => "gray",
            "light_grey" | "lightgray" | "lightgrey" => "light_gray",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_hash_or_plain_six_digit_hex() {
        assert_eq!(Color::parse("#12ab34"), Some(Color::new(0x12, 0xab, 0x34)));
        assert_eq!(Color::parse("12AB34"), Some(Color::new(0x12, 0xab, 0x34)));
    }

    #[test]
    fn parse_rejects_invalid_values() {
        assert_eq!(Color::parse("#fff"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
        assert_eq!(Color::parse(""), None);
        assert_eq!(Color::parse("#ééé"), None);
    }

    #[test]
    fn parse_resolves_preset_names_and_aliases() {
        assert_eq!(Color::parse("red"), Some(Color::new(255, 0, 0)));
        assert_eq!(Color::parse("Light Gray"), Some(Color::new(192, 192, 192)));
        assert_eq!(Color::parse("grey"), Some(Color::new(128, 128, 128)));
    }

    #[test]
    fn cancelled_picker_falls_back_to_white() {
        assert_eq!(Color::from_picker(None), Color::WHITE);
        assert_eq!(
            Color::from_picker(Some(PresetColor::Cyan.color())),
            Color::new(0, 255, 255)
        );
    }

    #[test]
    fn bounds_spanning_normalizes_corner_order() {
        let bounds = Bounds::spanning(Point::new(50, 10), Point::new(10, 40));
        assert_eq!(
            bounds,
            Bounds {
                left: 10,
                top: 10,
                right: 50,
                bottom: 40
            }
        );
        assert_eq!(bounds.width(), 40);
        assert_eq!(bounds.height(), 30);
        assert!(bounds.contains(Point::new(10, 40)));
        assert!(!bounds.contains(Point::new(9, 40)));
    }

    #[test]
    fn color_deserializes_from_names_and_hex() {
        let colors: Vec<Color> = serde_json::from_str(r##"["orange", "#0000ff"]"##).unwrap();
        assert_eq!(colors, vec![Color::new(255, 200, 0), Color::new(0, 0, 255)]);
        assert!(serde_json::from_str::<Color>(r#""mauve""#).is_err());
        assert_eq!(serde_json::to_string(&Color::WHITE).unwrap(), r##""#ffffff""##);
    }

    #[test]
    fn hex_round_trips_through_formatting() {
        let color = Color::new(0xde, 0xad, 0x01);
        assert_eq!(Color::parse(&color.to_hex()), Some(color));
    }
}
