//! Spatial and common types

use crate::error::{MoteError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

/// A 2D vector in device pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector for an angle in radians (0 = +x, PI/2 = +y / screen down)
    pub fn from_angle(radians: f32) -> Self {
        Self {
            x: radians.cos(),
            y: radians.sin(),
        }
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance_squared(&self, other: Self) -> f32 {
        (*self - other).length_squared()
    }

    pub fn distance(&self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Drawing surface dimensions in device pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Parse a CSS-like length (`"50%"`, `"120px"`) against a full extent.
/// Anything else resolves to the full extent.
pub fn parse_size(value: &str, full: f32) -> f32 {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        if let Ok(p) = pct.trim().parse::<f32>() {
            return (full * p / 100.0).round();
        }
    } else if let Some(px) = value.strip_suffix("px") {
        if let Ok(p) = px.trim().parse::<f32>() {
            return p.trunc();
        }
    }
    full
}

/// RGBA color, channels in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Same color with a replaced alpha, clamped to [0, 1]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// 8-bit channels, as a canvas would report them
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)`
    /// or a basic named color.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim().to_ascii_lowercase();
        let invalid = || MoteError::InvalidColor(input.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        if let Some(body) = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = body
                .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(invalid());
            }
            let channel = |p: &str| -> Option<u8> {
                p.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8)
            };
            let r = channel(parts[0]).ok_or_else(invalid)?;
            let g = channel(parts[1]).ok_or_else(invalid)?;
            let b = channel(parts[2]).ok_or_else(invalid)?;
            let a = match parts.get(3) {
                Some(p) => p.parse::<f32>().map_err(|_| invalid())?,
                None => 1.0,
            };
            return Ok(Self::from_rgb8(r, g, b, a));
        }

        let named = match s.as_str() {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::from_hex(0xFF0000),
            "green" => Self::from_hex(0x008000),
            "lime" => Self::from_hex(0x00FF00),
            "blue" => Self::from_hex(0x0000FF),
            "yellow" => Self::from_hex(0xFFFF00),
            "cyan" | "aqua" => Self::from_hex(0x00FFFF),
            "magenta" | "fuchsia" => Self::from_hex(0xFF00FF),
            "orange" => Self::from_hex(0xFFA500),
            "purple" => Self::from_hex(0x800080),
            "gray" | "grey" => Self::from_hex(0x808080),
            "transparent" => Self::new(0.0, 0.0, 0.0, 0.0),
            _ => return Err(invalid()),
        };
        Ok(named)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => Some(Color::from_rgb8(nibble(0)?, nibble(1)?, nibble(2)?, 1.0)),
        4 => Some(Color::from_rgb8(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            nibble(3)? as f32 / 255.0,
        )),
        6 => Some(Color::from_rgb8(byte(0)?, byte(2)?, byte(4)?, 1.0)),
        8 => Some(Color::from_rgb8(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)? as f32 / 255.0,
        )),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = MoteError;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
