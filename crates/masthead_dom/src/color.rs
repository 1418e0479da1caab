//! CSS color values
//!
//! Computed styles report colors as strings (`rgb(255, 255, 255)`,
//! `rgba(0, 0, 0, 0)`, `transparent`); configuration carries hex strings.
//! [`Rgba`] parses both forms and formats back to the compact
//! `rgba(r,g,b,a)` notation written into style variables.
//!
//! # Supported Syntax
//!
//! - Hex: `#rgb`, `#rrggbb`, `#rrggbbaa`
//! - Functional: `rgb(r, g, b)`, `rgba(r, g, b, a)` (channels 0-255, alpha 0-1)
//! - Named: `transparent`, `black`, `white` and a handful of basics

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1, take_while_m_n},
    character::complete::{char, multispace0},
    combinator::{all_consuming, opt},
    error::ParseError as NomParseError,
    number::complete::float,
    sequence::{delimited, preceded},
    IResult,
};

use crate::error::ColorError;

/// An sRGB color with 8-bit channels and a fractional alpha
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in 0.0..=1.0
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0.0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Replace the alpha channel, clamped to 0.0..=1.0
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = clamp_unit(alpha);
        self
    }

    /// Parse any supported CSS color string
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        all_consuming(parse_color::<nom::error::Error<&str>>)(trimmed)
            .map(|(_, color)| color)
            .map_err(|_| ColorError::Invalid(input.to_string()))
    }

    /// Parse a hex color with or without the leading `#`
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        all_consuming(hex_digits::<nom::error::Error<&str>>)(digits)
            .map(|(_, color)| color)
            .map_err(|_| ColorError::Invalid(input.to_string()))
    }

    /// Fully transparent colors contribute nothing when composited
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Perceived luminance in 0.0..=1.0 (ITU-R BT.601 weights)
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }

    /// Compact CSS form, e.g. `rgba(255,255,255,0.98)`
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

// ============================================================================
// Parsers
// ============================================================================

fn parse_color<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Rgba, E> {
    alt((
        preceded(char('#'), hex_digits),
        functional_color,
        named_color,
    ))(input)
}

/// Hex digits without the `#`: 3, 6 or 8 of them
fn hex_digits<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Rgba, E> {
    let (rest, hex) = take_while_m_n(3, 8, |c: char| c.is_ascii_hexdigit())(input)?;

    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    let color = match hex.len() {
        3 => {
            let expand = |i: usize| byte(&hex[i..i + 1].repeat(2));
            match (expand(0), expand(1), expand(2)) {
                (Some(r), Some(g), Some(b)) => Some(Rgba::rgb(r, g, b)),
                _ => None,
            }
        }
        6 => match (byte(&hex[0..2]), byte(&hex[2..4]), byte(&hex[4..6])) {
            (Some(r), Some(g), Some(b)) => Some(Rgba::rgb(r, g, b)),
            _ => None,
        },
        8 => match (
            byte(&hex[0..2]),
            byte(&hex[2..4]),
            byte(&hex[4..6]),
            byte(&hex[6..8]),
        ) {
            (Some(r), Some(g), Some(b), Some(a)) => {
                Some(Rgba::rgba(r, g, b, a as f32 / 255.0))
            }
            _ => None,
        },
        _ => None,
    };

    match color {
        Some(color) => Ok((rest, color)),
        None => Err(nom::Err::Error(E::from_error_kind(
            input,
            nom::error::ErrorKind::LengthValue,
        ))),
    }
}

/// `rgb(...)` or `rgba(...)`; both accept an optional fourth alpha argument
fn functional_color<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Rgba, E> {
    let (input, _) = alt((tag_no_case("rgba"), tag_no_case("rgb")))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;
    let (input, r) = delimited(multispace0, float, multispace0)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, g) = delimited(multispace0, float, multispace0)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, b) = delimited(multispace0, float, multispace0)(input)?;
    let (input, a) = opt(preceded(
        char(','),
        delimited(multispace0, float, multispace0),
    ))(input)?;
    let (input, _) = char(')')(input)?;

    Ok((
        input,
        Rgba::rgba(channel(r), channel(g), channel(b), clamp_unit(a.unwrap_or(1.0))),
    ))
}

fn named_color<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Rgba, E> {
    let (rest, name) = take_while1(|c: char| c.is_ascii_alphabetic())(input)?;
    let color = match name.to_ascii_lowercase().as_str() {
        "transparent" => Rgba::TRANSPARENT,
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "red" => Rgba::rgb(255, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "yellow" => Rgba::rgb(255, 255, 0),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        _ => {
            return Err(nom::Err::Error(E::from_error_kind(
                input,
                nom::error::ErrorKind::Tag,
            )))
        }
    };
    Ok((rest, color))
}
