//! Declaration of record fields, prior to layout resolution.

use std::sync::Arc;

use crate::descriptor::Descriptor;
use crate::enummap::EnumMap;
use crate::errors::{LayoutError, ParseError};
use crate::typespec::{self, SpecKind, TypeParams};
use crate::value::Value;

/// The type of a field's decoded value.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Bool,
    /// Integer; signedness comes from the field's `signed` flag.
    Int,
    /// IEEE 754 float (binary32 or binary64).
    Float,
    /// Complex numbers parse but are rejected by the codec engine.
    Complex,
    /// Raw fixed-length byte blob.
    Bytes,
    /// Fixed-length UTF-8 text; the size is the encoded byte length.
    Str,
    /// Enumeration over an underlying primitive.
    Enum(Arc<EnumMap>),
    /// Nested record with its own resolved descriptor.
    Record(Arc<Descriptor>),
}

impl TypeKind {
    /// True for kinds where the `signed` flag is meaningful.
    pub fn is_int(&self) -> bool {
        matches!(self, TypeKind::Int)
    }
}

/// One declared field of a record, before offsets are resolved.
///
/// `size` and `offset` are expressed in the base units of the enclosing
/// descriptor and may be omitted where inferable: bools default to size 1,
/// nested records infer their own resolved size, and a type specifier string
/// supplies size and signedness.
///
/// ```
/// use bitrec::field::FieldSpec;
///
/// let field = FieldSpec::from_spec("level", "u3").unwrap().with_offset(1);
/// assert_eq!(field.offset, Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: TypeKind,
    /// Size of one item, in base units.
    pub size: Option<usize>,
    /// Absolute offset, in base units. When absent the resolver continues
    /// from the previous field.
    pub offset: Option<usize>,
    pub signed: Option<bool>,
    /// Number of items; `Some(n)` turns the field into a sequence.
    pub repeat: Option<usize>,
    /// Value used when constructing a record without an explicit value.
    /// Never validated against `kind`.
    pub default: Option<Value>,
    /// Type parameters embedded by a specifier string, if the field was built
    /// with [FieldSpec::from_spec].
    pub(crate) params: Option<TypeParams>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
            size: None,
            offset: None,
            signed: None,
            repeat: None,
            default: None,
            params: None,
        }
    }

    /// Builds a field from a type specifier string such as `"u4"` or `"<i4"`.
    pub fn from_spec(name: impl Into<String>, spec: &str) -> Result<Self, ParseError> {
        let params = typespec::parse(spec)?;
        let kind = match params.kind {
            SpecKind::Int => TypeKind::Int,
            SpecKind::Float => TypeKind::Float,
            SpecKind::Complex => TypeKind::Complex,
            SpecKind::Bytes => TypeKind::Bytes,
        };

        let mut field = FieldSpec::new(name, kind);
        field.params = Some(params);
        Ok(field)
    }

    /// Convenience constructor for a nested record field.
    pub fn record(name: impl Into<String>, descriptor: Arc<Descriptor>) -> Self {
        FieldSpec::new(name, TypeKind::Record(descriptor))
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = Some(signed);
        self
    }

    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Byte order hint carried by the type specifier, if any.
    pub(crate) fn byteorder_hint(&self) -> Option<crate::descriptor::ByteOrder> {
        self.params.and_then(|p| p.byteorder)
    }

    /// Computes the effective item size and signedness, merging field-level
    /// arguments with specifier-embedded parameters and kind inference.
    pub(crate) fn effective_size_signed(&self) -> Result<(usize, bool), LayoutError> {
        let embedded_size = self.params.map(|p| p.size);
        let embedded_signed = self.params.and_then(|p| p.signed);

        // A direct conflict between field-level and embedded values is an
        // error; matching values are allowed.
        if let (Some(explicit), Some(embedded)) = (self.size, embedded_size) {
            if explicit != embedded {
                return Err(LayoutError::ConflictingFieldSpec(self.name.clone()));
            }
        }
        if let (Some(explicit), Some(embedded)) = (self.signed, embedded_signed) {
            if explicit != embedded {
                return Err(LayoutError::ConflictingFieldSpec(self.name.clone()));
            }
        }

        let size = match self.size.or(embedded_size) {
            Some(size) => size,
            None => match &self.kind {
                TypeKind::Bool => 1,
                TypeKind::Record(descriptor) => descriptor.total_size(),
                _ => return Err(LayoutError::MissingFieldSize(self.name.clone())),
            },
        };

        if size == 0 {
            return Err(LayoutError::InvalidFieldSize(self.name.clone()));
        }
        if self.repeat == Some(0) {
            return Err(LayoutError::InvalidRepeat(self.name.clone()));
        }

        if let TypeKind::Record(descriptor) = &self.kind {
            if size != descriptor.total_size() {
                return Err(LayoutError::ConflictingFieldSpec(self.name.clone()));
            }
        }

        // `signed` is silently ignored for non-integer kinds. Enums over an
        // integer underlying type count as integers here.
        let int_like = match &self.kind {
            TypeKind::Int => true,
            TypeKind::Enum(map) => map.base() == crate::enummap::EnumBase::Int,
            _ => false,
        };
        let signed = if int_like {
            self.signed.or(embedded_signed).unwrap_or(false)
        } else {
            false
        };

        Ok((size, signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_size_defaults_to_one() {
        let field = FieldSpec::new("flag", TypeKind::Bool);
        assert_eq!(field.effective_size_signed().unwrap(), (1, false));
    }

    #[test]
    fn test_spec_supplies_size_and_signedness() {
        let field = FieldSpec::from_spec("value", "i4").unwrap();
        assert_eq!(field.effective_size_signed().unwrap(), (4, true));
    }

    #[test]
    fn test_matching_explicit_values_allowed() {
        let field = FieldSpec::from_spec("value", "i4").unwrap().with_size(4);
        assert_eq!(field.effective_size_signed().unwrap(), (4, true));
    }

    #[test]
    fn test_conflicting_size_rejected() {
        let field = FieldSpec::from_spec("value", "i4").unwrap().with_size(8);
        assert_eq!(
            field.effective_size_signed(),
            Err(LayoutError::ConflictingFieldSpec("value".to_string()))
        );
    }

    #[test]
    fn test_conflicting_signedness_rejected() {
        let field = FieldSpec::from_spec("value", "u4").unwrap().with_signed(true);
        assert_eq!(
            field.effective_size_signed(),
            Err(LayoutError::ConflictingFieldSpec("value".to_string()))
        );
    }

    #[test]
    fn test_missing_size_rejected() {
        let field = FieldSpec::new("value", TypeKind::Int);
        assert_eq!(
            field.effective_size_signed(),
            Err(LayoutError::MissingFieldSize("value".to_string()))
        );
    }

    #[test]
    fn test_signed_ignored_for_non_int() {
        let field = FieldSpec::new("blob", TypeKind::Bytes)
            .with_size(4)
            .with_signed(true);
        assert_eq!(field.effective_size_signed().unwrap(), (4, false));
    }

    #[test]
    fn test_zero_size_rejected() {
        let field = FieldSpec::new("value", TypeKind::Int).with_size(0);
        assert_eq!(
            field.effective_size_signed(),
            Err(LayoutError::InvalidFieldSize("value".to_string()))
        );
    }

    #[test]
    fn test_zero_repeat_rejected() {
        let field = FieldSpec::new("value", TypeKind::Int)
            .with_size(1)
            .with_repeat(0);
        assert_eq!(
            field.effective_size_signed(),
            Err(LayoutError::InvalidRepeat("value".to_string()))
        );
    }
}
