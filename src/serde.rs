//! JSON-deserializable record definitions.
//!
//! These types describe the *shape* of a binary record. They are intended to
//! be constructed from JSON (for example a schema file shipped with your
//! application) and then resolved into a core [Descriptor] via `TryFrom`.
//!
//! ```
//! # #[cfg(feature = "serde")] {
//! use bitrec::descriptor::Descriptor;
//! use bitrec::serde::RecordDef;
//!
//! let def: RecordDef = serde_json::from_str(
//!     r#"{ "fields": [
//!         { "name": "id",    "type": { "Spec": "u2" } },
//!         { "name": "ready", "type": "Bool" }
//!     ] }"#,
//! ).unwrap();
//! let descriptor = Descriptor::try_from(def).unwrap();
//! assert_eq!(descriptor.total_size(), 3);
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::descriptor::{BaseUnits, BitOrder, ByteOrder, Descriptor};
use crate::enummap::{EnumMap, RawEnumValue};
use crate::errors::LayoutError;
use crate::field::{FieldSpec, TypeKind};
use crate::typespec;
use crate::value::Value;

/// Base units of sizes and offsets in the definition.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum BaseUnitsDef {
    Bits,
    #[default]
    Bytes,
}

impl From<BaseUnitsDef> for BaseUnits {
    fn from(def: BaseUnitsDef) -> Self {
        match def {
            BaseUnitsDef::Bits => BaseUnits::Bits,
            BaseUnitsDef::Bytes => BaseUnits::Bytes,
        }
    }
}

/// Byte order of multi-byte fields.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum ByteOrderDef {
    #[default]
    Big,
    Little,
    Native,
}

impl From<ByteOrderDef> for ByteOrder {
    fn from(def: ByteOrderDef) -> Self {
        match def {
            ByteOrderDef::Big => ByteOrder::Big,
            ByteOrderDef::Little => ByteOrder::Little,
            ByteOrderDef::Native => ByteOrder::Native,
        }
    }
}

/// Intra-byte bit numbering for bit-based records.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum BitOrderDef {
    #[default]
    MsbFirst,
    LsbFirst,
}

impl From<BitOrderDef> for BitOrder {
    fn from(def: BitOrderDef) -> Self {
        match def {
            BitOrderDef::MsbFirst => BitOrder::MsbFirst,
            BitOrderDef::LsbFirst => BitOrder::LsbFirst,
        }
    }
}

/// Top-level record definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecordDef {
    #[serde(default)]
    pub baseunits: BaseUnitsDef,
    #[serde(default)]
    pub byteorder: ByteOrderDef,
    /// Only valid for bit-based records; defaults to MSB-first there.
    #[serde(default)]
    pub bitorder: Option<BitOrderDef>,
    /// Explicit total size in base units.
    #[serde(default)]
    pub size: Option<usize>,
    pub fields: Vec<FieldDef>,
}

/// Definition of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Field name; becomes the key in decoded records.
    pub name: String,
    /// Field type; see [TypeDef].
    #[serde(rename = "type")]
    pub kind: TypeDef,
    /// Item size in base units, where the type does not already supply it.
    #[serde(default)]
    pub size: Option<usize>,
    /// Explicit absolute offset in base units.
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub signed: Option<bool>,
    /// Number of items for sequence fields.
    #[serde(default)]
    pub repeat: Option<usize>,
    /// Value used when encoding a record that omits this field. For enum
    /// fields a string names the member.
    #[serde(default)]
    pub default: Option<ValueDef>,
}

/// A field default value in a definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ValueDef {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl From<ValueDef> for Value {
    fn from(def: ValueDef) -> Self {
        match def {
            ValueDef::Bool(v) => Value::Bool(v),
            ValueDef::UInt(v) => Value::UInt(v),
            ValueDef::Int(v) => Value::Int(v),
            ValueDef::Float(v) => Value::Float(v),
            ValueDef::Str(v) => Value::Str(v),
            ValueDef::Bytes(v) => Value::Bytes(v),
        }
    }
}

/// Field type in a definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub enum TypeDef {
    /// Compact type specifier string, e.g. `"u4"`, `"<i4"`, `"S10"`.
    Spec(String),
    Bool,
    /// Fixed-length UTF-8 text; the field size is the byte length.
    Str,
    /// Enumeration over an underlying primitive. `base` is an optional type
    /// specifier for the underlying value (supplying size and signedness).
    Enum {
        #[serde(default)]
        base: Option<String>,
        members: Vec<MemberDef>,
    },
    /// Nested record with its own definition.
    Record(RecordDef),
}

/// One enum member.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemberDef {
    pub name: String,
    pub value: RawDef,
}

/// Underlying raw value of an enum member.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum RawDef {
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl From<RawDef> for RawEnumValue {
    fn from(def: RawDef) -> Self {
        match def {
            RawDef::Int(v) => RawEnumValue::Int(v),
            RawDef::Str(v) => RawEnumValue::Str(v),
            RawDef::Bytes(v) => RawEnumValue::Bytes(v),
        }
    }
}

impl TryFrom<FieldDef> for FieldSpec {
    type Error = LayoutError;

    fn try_from(def: FieldDef) -> Result<Self, Self::Error> {
        let mut field = match def.kind {
            TypeDef::Spec(spec) => FieldSpec::from_spec(def.name, &spec)?,
            TypeDef::Bool => FieldSpec::new(def.name, TypeKind::Bool),
            TypeDef::Str => FieldSpec::new(def.name, TypeKind::Str),
            TypeDef::Enum { base, members } => {
                let map = EnumMap::new(
                    members
                        .into_iter()
                        .map(|m| (m.name, RawEnumValue::from(m.value))),
                )?;
                let mut field = FieldSpec::new(def.name, TypeKind::Enum(Arc::new(map)));
                if let Some(base) = base {
                    field.params = Some(typespec::parse(&base)?);
                }
                field
            }
            TypeDef::Record(nested) => {
                let descriptor = Descriptor::try_from(nested)?;
                FieldSpec::record(def.name, descriptor.into_shared())
            }
        };

        field.size = field.size.or(def.size);
        field.offset = def.offset;
        field.signed = field.signed.or(def.signed);
        field.repeat = def.repeat;
        field.default = def.default.map(Into::into);

        Ok(field)
    }
}

impl TryFrom<RecordDef> for Descriptor {
    type Error = LayoutError;

    fn try_from(def: RecordDef) -> Result<Self, Self::Error> {
        let fields = def
            .fields
            .into_iter()
            .map(FieldSpec::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Descriptor::resolve(
            def.baseunits.into(),
            def.byteorder.into(),
            def.bitorder.map(Into::into),
            fields,
            def.size,
        )
    }
}
