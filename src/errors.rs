//! Error types for type-spec parsing, layout resolution and the codec engine.
//!
//! Two classes of failure exist: structural errors ([ParseError], [LayoutError])
//! are raised once while building a [crate::descriptor::Descriptor] and make
//! the descriptor unusable; data errors ([DecodeError], [EncodeError]) are
//! raised per call and leave the descriptor intact.

use std::fmt;

/// Errors produced when parsing a type specifier string (e.g. `"<i4"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The specifier is empty.
    Empty,
    /// Unknown type kind character (not one of `i`, `u`, `f`, `c`, `S`).
    UnknownKind(char),
    /// No width digits after the kind character.
    MissingWidth,
    /// Width is not a positive decimal integer.
    InvalidWidth,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty type specifier"),
            ParseError::UnknownKind(c) => write!(f, "unknown type kind character '{c}'"),
            ParseError::MissingWidth => write!(f, "type specifier has no width"),
            ParseError::InvalidWidth => write!(f, "type specifier width is not a positive integer"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors produced when resolving [crate::field::FieldSpec]s into a
/// [crate::descriptor::Descriptor]. All of these are structural: once
/// resolution succeeds they can no longer occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A type specifier string was malformed.
    Parse(ParseError),
    /// Field has no size and none can be inferred from its kind.
    MissingFieldSize(String),
    /// Field-level size/signedness contradicts the embedded type parameters,
    /// or a field byteorder hint contradicts the descriptor byteorder.
    ConflictingFieldSpec(String),
    /// A nested record uses different base units than its parent.
    IncompatibleBaseUnits(String),
    /// The explicit record size is smaller than the span of its fields.
    SizeTooSmall { given: usize, required: usize },
    /// Field size is zero, or a numeric field is wider than 64 bits.
    InvalidFieldSize(String),
    /// Field geometry (size, repeat, offset) does not fit in a `usize`.
    SizeOverflow(String),
    /// An enum member's raw value does not fit the field's resolved width.
    EnumMemberOutOfRange(String),
    /// Repeat count is zero.
    InvalidRepeat(String),
    /// A bit order was specified for a byte-based descriptor.
    BitOrderNotAllowed,
    /// Two fields share the same name.
    DuplicateFieldName(String),
    /// Enum members do not share a single underlying primitive type.
    HeterogeneousEnum,
    /// Two enum members share the same name or the same raw value.
    DuplicateEnumMember(String),
    /// An enum has no members.
    EmptyEnum,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Parse(err) => write!(f, "invalid type specifier: {err}"),
            LayoutError::MissingFieldSize(name) => {
                write!(f, "size not specified for field '{name}'")
            }
            LayoutError::ConflictingFieldSpec(name) => {
                write!(f, "conflicting parameters for field '{name}'")
            }
            LayoutError::IncompatibleBaseUnits(name) => {
                write!(f, "nested record '{name}' uses different base units")
            }
            LayoutError::SizeTooSmall { given, required } => write!(
                f,
                "specified size ({given}) is smaller than the total size of fields ({required})"
            ),
            LayoutError::InvalidFieldSize(name) => write!(f, "invalid size for field '{name}'"),
            LayoutError::SizeOverflow(name) => {
                write!(f, "size arithmetic overflows for field '{name}'")
            }
            LayoutError::EnumMemberOutOfRange(name) => {
                write!(f, "enum member does not fit the width of field '{name}'")
            }
            LayoutError::InvalidRepeat(name) => {
                write!(f, "repeat count must be positive for field '{name}'")
            }
            LayoutError::BitOrderNotAllowed => {
                write!(f, "bit order cannot be specified for byte-based descriptors")
            }
            LayoutError::DuplicateFieldName(name) => write!(f, "duplicate field name '{name}'"),
            LayoutError::HeterogeneousEnum => {
                write!(f, "enum members must share a single underlying type")
            }
            LayoutError::DuplicateEnumMember(name) => {
                write!(f, "duplicate enum member '{name}'")
            }
            LayoutError::EmptyEnum => write!(f, "enum has no members"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<ParseError> for LayoutError {
    fn from(err: ParseError) -> Self {
        LayoutError::Parse(err)
    }
}

/// Errors produced by [crate::descriptor::Descriptor::decode].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input buffer length differs from the descriptor's byte length.
    BufferSizeMismatch { expected: usize, actual: usize },
    /// A bit read went beyond the end of the buffer.
    OutOfBounds,
    /// More than 64 bits were requested in a single read.
    TooManyBits,
    /// The decoded underlying value has no entry in the enum table.
    UnknownEnumValue(String),
    /// The field type cannot be decoded (complex numbers, non-IEEE float
    /// widths, little-endian bit fields of non-byte-multiple width).
    UnsupportedType(String),
    /// Text field bytes are not valid UTF-8.
    InvalidText(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BufferSizeMismatch { expected, actual } => {
                write!(f, "buffer size mismatch: expected {expected} bytes, got {actual}")
            }
            DecodeError::OutOfBounds => write!(f, "bit read out of bounds"),
            DecodeError::TooManyBits => write!(f, "more than 64 bits requested in a single read"),
            DecodeError::UnknownEnumValue(name) => {
                write!(f, "unknown enum value decoded for field '{name}'")
            }
            DecodeError::UnsupportedType(name) => {
                write!(f, "field '{name}' has a type the codec does not support")
            }
            DecodeError::InvalidText(name) => write!(f, "field '{name}' is not valid UTF-8"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Errors produced by [crate::descriptor::Descriptor::encode].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A value does not fit the declared width or length of its field.
    ValueOutOfRange(String),
    /// The record has no value for a field that carries no default.
    MissingField(String),
    /// The value variant does not match the field kind.
    TypeMismatch(String),
    /// The enum member name is not present in the enum table.
    UnknownEnumMember(String),
    /// The field type cannot be encoded.
    UnsupportedType(String),
    /// A bit write went beyond the end of the buffer.
    OutOfBounds,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::ValueOutOfRange(name) => {
                write!(f, "value out of range for field '{name}'")
            }
            EncodeError::MissingField(name) => write!(f, "missing value for field '{name}'"),
            EncodeError::TypeMismatch(name) => {
                write!(f, "value type does not match field '{name}'")
            }
            EncodeError::UnknownEnumMember(name) => {
                write!(f, "unknown enum member for field '{name}'")
            }
            EncodeError::UnsupportedType(name) => {
                write!(f, "field '{name}' has a type the codec does not support")
            }
            EncodeError::OutOfBounds => write!(f, "bit write out of bounds"),
        }
    }
}

impl std::error::Error for EncodeError {}
