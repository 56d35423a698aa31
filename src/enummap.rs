//! Bidirectional mapping between enum member names and underlying raw values.

use std::collections::BTreeMap;

use crate::errors::LayoutError;

/// Underlying primitive value of an enum member.
///
/// All members of one [EnumMap] must use the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RawEnumValue {
    Int(i64),
    Bytes(Vec<u8>),
    Str(String),
}

impl RawEnumValue {
    fn base(&self) -> EnumBase {
        match self {
            RawEnumValue::Int(_) => EnumBase::Int,
            RawEnumValue::Bytes(_) => EnumBase::Bytes,
            RawEnumValue::Str(_) => EnumBase::Str,
        }
    }
}

impl From<i64> for RawEnumValue {
    fn from(v: i64) -> Self {
        RawEnumValue::Int(v)
    }
}

impl From<&str> for RawEnumValue {
    fn from(v: &str) -> Self {
        RawEnumValue::Str(v.to_string())
    }
}

impl From<Vec<u8>> for RawEnumValue {
    fn from(v: Vec<u8>) -> Self {
        RawEnumValue::Bytes(v)
    }
}

/// Underlying primitive type shared by every member of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumBase {
    Int,
    Bytes,
    Str,
}

/// Immutable two-way lookup table between member names and raw values.
///
/// Built once with [EnumMap::new], then shared read-only by every codec
/// operation over fields of this enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMap {
    base: EnumBase,
    by_name: BTreeMap<String, RawEnumValue>,
    by_raw: BTreeMap<RawEnumValue, String>,
}

impl EnumMap {
    /// Builds the table from `(name, raw)` members.
    ///
    /// Fails if the member list is empty, if raw values are not homogeneous in
    /// their underlying type, or if any name or raw value appears twice.
    pub fn new<N, R, I>(members: I) -> Result<Self, LayoutError>
    where
        N: Into<String>,
        R: Into<RawEnumValue>,
        I: IntoIterator<Item = (N, R)>,
    {
        let mut by_name = BTreeMap::new();
        let mut by_raw = BTreeMap::new();
        let mut base = None;

        for (name, raw) in members {
            let name = name.into();
            let raw = raw.into();

            match base {
                None => base = Some(raw.base()),
                Some(b) if b != raw.base() => return Err(LayoutError::HeterogeneousEnum),
                Some(_) => {}
            }

            if by_name.contains_key(&name) {
                return Err(LayoutError::DuplicateEnumMember(name));
            }
            if let Some(prev) = by_raw.insert(raw.clone(), name.clone()) {
                return Err(LayoutError::DuplicateEnumMember(prev));
            }
            by_name.insert(name, raw);
        }

        let base = base.ok_or(LayoutError::EmptyEnum)?;

        Ok(EnumMap {
            base,
            by_name,
            by_raw,
        })
    }

    /// Underlying primitive type of every member.
    pub fn base(&self) -> EnumBase {
        self.base
    }

    /// Member name for a raw value, if mapped.
    pub fn name_of(&self, raw: &RawEnumValue) -> Option<&str> {
        self.by_raw.get(raw).map(String::as_str)
    }

    /// Raw value for a member name, if mapped.
    pub fn raw_of(&self, name: &str) -> Option<&RawEnumValue> {
        self.by_name.get(name)
    }

    /// Member names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// All `(name, raw)` members in name order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &RawEnumValue)> {
        self.by_name.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
