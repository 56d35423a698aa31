//! Parser for compact type specifier strings such as `"u4"`, `"<i4"` or `"S10"`.
//!
//! A specifier is `[order][kind][width]`:
//!
//! * an optional byte order character: `<` little-endian, `>` big-endian,
//!   `|` not relevant;
//! * a type kind character: `i` signed integer, `u` unsigned integer,
//!   `f` float, `c` complex, `S` fixed-length bytes;
//! * the width as a decimal integer, in the base units of the descriptor the
//!   field belongs to.
//!
//! Parsing is a pure function; `c` (complex) parses successfully but is
//! rejected later by the codec engine.

use crate::descriptor::ByteOrder;
use crate::errors::ParseError;

/// Basic type kind carried by a specifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Int,
    Float,
    Complex,
    Bytes,
}

/// Normalized parameters extracted from a type specifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeParams {
    /// Byte order hint, if the specifier carried one. `|` maps to `None`.
    pub byteorder: Option<ByteOrder>,
    pub kind: SpecKind,
    /// Width in the base units of the enclosing descriptor.
    pub size: usize,
    /// `Some(true)` for `i`, `Some(false)` for `u`, `None` otherwise.
    pub signed: Option<bool>,
}

/// Parses a type specifier string into [TypeParams].
pub fn parse(spec: &str) -> Result<TypeParams, ParseError> {
    let mut chars = spec.chars();
    let first = chars.next().ok_or(ParseError::Empty)?;

    let (byteorder, kind_char) = match first {
        '<' => (Some(ByteOrder::Little), chars.next().ok_or(ParseError::Empty)?),
        '>' => (Some(ByteOrder::Big), chars.next().ok_or(ParseError::Empty)?),
        '|' => (None, chars.next().ok_or(ParseError::Empty)?),
        c => (None, c),
    };

    let (kind, signed) = match kind_char {
        'i' => (SpecKind::Int, Some(true)),
        'u' => (SpecKind::Int, Some(false)),
        'f' => (SpecKind::Float, None),
        'c' => (SpecKind::Complex, None),
        'S' => (SpecKind::Bytes, None),
        c => return Err(ParseError::UnknownKind(c)),
    };

    let digits = chars.as_str();
    if digits.is_empty() {
        return Err(ParseError::MissingWidth);
    }

    let size: usize = digits.parse().map_err(|_| ParseError::InvalidWidth)?;
    if size == 0 {
        return Err(ParseError::InvalidWidth);
    }

    Ok(TypeParams {
        byteorder,
        kind,
        size,
        signed,
    })
}

impl TypeParams {
    /// Renders the parameters back into a specifier string.
    pub fn to_spec(&self) -> String {
        let order = match self.byteorder {
            Some(ByteOrder::Little) => "<",
            Some(ByteOrder::Big) => ">",
            Some(ByteOrder::Native) | None => "",
        };
        let kind = match (self.kind, self.signed) {
            (SpecKind::Int, Some(true)) => "i",
            (SpecKind::Int, _) => "u",
            (SpecKind::Float, _) => "f",
            (SpecKind::Complex, _) => "c",
            (SpecKind::Bytes, _) => "S",
        };
        format!("{order}{kind}{}", self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unsigned() {
        let params = parse("u4").unwrap();
        assert_eq!(params.byteorder, None);
        assert_eq!(params.kind, SpecKind::Int);
        assert_eq!(params.size, 4);
        assert_eq!(params.signed, Some(false));
    }

    #[test]
    fn test_parse_signed_little_endian() {
        let params = parse("<i4").unwrap();
        assert_eq!(params.byteorder, Some(ByteOrder::Little));
        assert_eq!(params.signed, Some(true));
        assert_eq!(params.size, 4);
    }

    #[test]
    fn test_parse_big_endian_float() {
        let params = parse(">f8").unwrap();
        assert_eq!(params.byteorder, Some(ByteOrder::Big));
        assert_eq!(params.kind, SpecKind::Float);
        assert_eq!(params.signed, None);
    }

    #[test]
    fn test_parse_irrelevant_order() {
        let params = parse("|S10").unwrap();
        assert_eq!(params.byteorder, None);
        assert_eq!(params.kind, SpecKind::Bytes);
        assert_eq!(params.size, 10);
    }

    #[test]
    fn test_parse_complex_is_accepted() {
        assert_eq!(parse("c16").unwrap().kind, SpecKind::Complex);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("<"), Err(ParseError::Empty));
        assert_eq!(parse("x4"), Err(ParseError::UnknownKind('x')));
        assert_eq!(parse("u"), Err(ParseError::MissingWidth));
        assert_eq!(parse("u4x"), Err(ParseError::InvalidWidth));
        assert_eq!(parse("u0"), Err(ParseError::InvalidWidth));
        assert_eq!(parse("i-4"), Err(ParseError::InvalidWidth));
    }

    #[test]
    fn test_round_trip_to_spec() {
        for spec in ["u4", "i8", "<i4", ">f8", "S10", "c16"] {
            assert_eq!(parse(spec).unwrap().to_spec(), spec);
        }
    }
}
