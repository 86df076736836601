//! Textual color notations
//!
//! Accepted input forms (case-insensitive, surrounding whitespace ignored):
//!
//! ```text
//! #RGB  #RGBA  #RRGGBB  #RRGGBBAA     ('#' optional)
//! rgb(r, g, b)  rgba(r, g, b, a)
//! r, g, b[, a]
//! ```
//!
//! Short hex forms duplicate each digit (`#abc` is `#aabbcc`). A missing
//! alpha channel means 255.

use super::Color;
use crate::error::{Error, Result};

/// How [`format_hex`] treats the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaFormat {
    /// Always `#rrggbb`
    Omit,
    /// Always `#rrggbbaa`
    Always,
    /// `#rrggbb` when alpha is 255, `#rrggbbaa` otherwise
    #[default]
    Compact,
}

/// Parse a color from text.
///
/// # Errors
///
/// Returns [`Error::Format`] for unknown notations, non-hex digits,
/// wrong component counts and components outside `0..=255`.
///
/// # Examples
///
/// ```
/// use palmap_core::{Color, color};
///
/// assert_eq!(color::parse("#abc").unwrap(), Color::new(170, 187, 204, 255));
/// assert_eq!(color::parse("rgba(10,20,30,40)").unwrap(), Color::new(10, 20, 30, 40));
/// assert!(color::parse("zzz").is_err());
/// ```
pub fn parse(text: &str) -> Result<Color> {
    let text = text.trim().to_ascii_lowercase();
    if text.is_empty() {
        return Err(Error::format("empty color string"));
    }

    let function = [("rgba(", 4), ("rgb(", 3)]
        .into_iter()
        .find_map(|(prefix, arity)| text.strip_prefix(prefix).map(|args| (args, arity)));
    if let Some((args, arity)) = function {
        let args = args
            .strip_suffix(')')
            .ok_or_else(|| Error::format(format!("unterminated color function: '{text}'")))?;
        if args.split(',').count() != arity {
            return Err(Error::format(format!(
                "'{text}' needs {arity} components"
            )));
        }
        return parse_components(args);
    }
    if text.contains(',') {
        return parse_components(&text);
    }

    let hex = text.strip_prefix('#').unwrap_or(&text);
    parse_hex(hex)
}

/// Format a color as lowercase hex with a `#` prefix.
pub fn format_hex(color: Color, alpha: AlphaFormat) -> String {
    let Color { r, g, b, a } = color;
    let with_alpha = match alpha {
        AlphaFormat::Omit => false,
        AlphaFormat::Always => true,
        AlphaFormat::Compact => a != 255,
    };
    if with_alpha {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Format a color in functional notation, `rgb(..)` when opaque.
pub fn format_rgba(color: Color) -> String {
    let Color { r, g, b, a } = color;
    if a == 255 {
        format!("rgb({r}, {g}, {b})")
    } else {
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse 3, 4, 6 or 8 hex digits (no prefix).
fn parse_hex(hex: &str) -> Result<Color> {
    let bytes = hex.as_bytes();
    let digits: Vec<u8> = bytes
        .iter()
        .map(|&c| nibble(c))
        .collect::<Option<_>>()
        .ok_or_else(|| Error::format(format!("invalid hex digits in '{hex}'")))?;

    let short = |d: u8| (d << 4) | d;
    let long = |hi: u8, lo: u8| (hi << 4) | lo;

    let channels = match digits.as_slice() {
        [r, g, b] => [short(*r), short(*g), short(*b), 255],
        [r, g, b, a] => [short(*r), short(*g), short(*b), short(*a)],
        [r1, r2, g1, g2, b1, b2] => [long(*r1, *r2), long(*g1, *g2), long(*b1, *b2), 255],
        [r1, r2, g1, g2, b1, b2, a1, a2] => [
            long(*r1, *r2),
            long(*g1, *g2),
            long(*b1, *b2),
            long(*a1, *a2),
        ],
        _ => {
            return Err(Error::format(format!(
                "invalid hex length {} in '{hex}'",
                digits.len()
            )));
        }
    };
    Ok(Color::from_array(channels))
}

/// Parse "r, g, b" or "r, g, b, a" decimal components.
fn parse_components(args: &str) -> Result<Color> {
    let values = args
        .split(',')
        .map(|t| {
            let t = t.trim();
            t.parse::<u8>()
                .map_err(|_| Error::format(format!("color component out of range: '{t}'")))
        })
        .collect::<Result<Vec<u8>>>()?;

    match values.as_slice() {
        [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
        [r, g, b, a] => Ok(Color::new(*r, *g, *b, *a)),
        _ => Err(Error::format(format!(
            "expected 3 or 4 color components, got {}",
            values.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(parse("#abc").unwrap(), Color::new(170, 187, 204, 255));
        assert_eq!(parse("#abcd").unwrap(), Color::new(170, 187, 204, 221));
        assert_eq!(parse("ABC").unwrap(), Color::new(170, 187, 204, 255));
    }

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(parse("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(parse("  FF800040 ").unwrap(), Color::new(255, 128, 0, 64));
    }

    #[test]
    fn test_parse_functional() {
        assert_eq!(parse("rgba(10,20,30,40)").unwrap(), Color::new(10, 20, 30, 40));
        assert_eq!(parse("RGB( 1, 2, 3 )").unwrap(), Color::rgb(1, 2, 3));
        assert!(parse("rgb(1,2,3").is_err());
        assert!(parse("rgb(1,2)").is_err());
        assert!(matches!(parse("rgb(1,2,3,4)"), Err(Error::Format(_))));
        assert!(matches!(parse("rgba(1,2,3)"), Err(Error::Format(_))));
    }

    #[test]
    fn test_parse_bare_components() {
        assert_eq!(parse("1, 2, 3").unwrap(), Color::rgb(1, 2, 3));
        assert_eq!(parse("1,2,3,4").unwrap(), Color::new(1, 2, 3, 4));
        assert!(parse("1,2,256").is_err());
        assert!(parse("-1,2,3").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse("zzz"), Err(Error::Format(_))));
        assert!(parse("").is_err());
        assert!(parse("#12345").is_err());
        assert!(parse("#gg0000").is_err());
    }

    #[test]
    fn test_format_hex() {
        let c = Color::new(0xAB, 0x01, 0xFF, 0x80);
        assert_eq!(format_hex(c, AlphaFormat::Omit), "#ab01ff");
        assert_eq!(format_hex(c, AlphaFormat::Always), "#ab01ff80");
        assert_eq!(format_hex(c, AlphaFormat::Compact), "#ab01ff80");
        assert_eq!(format_hex(c.opaque(), AlphaFormat::Compact), "#ab01ff");
        assert_eq!(format_hex(c.opaque(), AlphaFormat::Always), "#ab01ffff");
    }

    #[test]
    fn test_format_rgba() {
        assert_eq!(format_rgba(Color::rgb(1, 2, 3)), "rgb(1, 2, 3)");
        assert_eq!(format_rgba(Color::new(1, 2, 3, 4)), "rgba(1, 2, 3, 4)");
    }

    #[test]
    fn test_format_then_parse() {
        let c = Color::new(12, 34, 56, 78);
        assert_eq!(parse(&format_hex(c, AlphaFormat::Always)).unwrap(), c);
        assert_eq!(parse(&format_rgba(c)).unwrap(), c);
    }
}
