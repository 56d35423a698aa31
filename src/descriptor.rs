//! The resolved, immutable schema of one record type.

use std::sync::Arc;

use crate::codec;
use crate::errors::{DecodeError, EncodeError, LayoutError};
use crate::field::FieldSpec;
use crate::layout::{self, Advisory, ResolvedField};
use crate::value::Record;

/// Unit in which every size and offset of a descriptor is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUnits {
    Bits,
    Bytes,
}

impl BaseUnits {
    /// Number of bits in one base unit.
    pub fn bits_per_unit(self) -> usize {
        match self {
            BaseUnits::Bits => 1,
            BaseUnits::Bytes => 8,
        }
    }
}

/// Byte order (endianness) of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
    /// The executing platform's order; pinned at resolve time.
    Native,
}

impl ByteOrder {
    /// Replaces `Native` with the host platform's order.
    pub fn resolved(self) -> ByteOrder {
        match self {
            ByteOrder::Native => {
                if cfg!(target_endian = "little") {
                    ByteOrder::Little
                } else {
                    ByteOrder::Big
                }
            }
            other => other,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::Big
    }
}

/// Intra-byte bit numbering for bit-based descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Bit 0 is the most significant bit of each byte.
    MsbFirst,
    /// Bit 0 is the least significant bit of each byte.
    LsbFirst,
}

impl Default for BitOrder {
    fn default() -> Self {
        BitOrder::MsbFirst
    }
}

/// Fully resolved record descriptor: base units, byte/bit order, ordered
/// field layout and total size.
///
/// Built once with [Descriptor::resolve] (or through [DescriptorBuilder]) and
/// treated as read-only afterwards; safe to share across threads for any
/// number of concurrent [decode](Descriptor::decode) and
/// [encode](Descriptor::encode) calls. Nested record fields hold an `Arc` to
/// another fully resolved descriptor, so the reference graph is acyclic by
/// construction.
///
/// ```
/// use bitrec::descriptor::{BaseUnits, Descriptor};
/// use bitrec::field::FieldSpec;
///
/// let descriptor = Descriptor::builder(BaseUnits::Bytes)
///     .field(FieldSpec::from_spec("id", "u2").unwrap())
///     .field(FieldSpec::from_spec("level", "u1").unwrap())
///     .resolve()
///     .unwrap();
///
/// let record = descriptor.decode(&[0x01, 0x02, 0x03]).unwrap();
/// assert_eq!(record["id"], bitrec::value::Value::UInt(0x0102));
/// assert_eq!(descriptor.encode(&record).unwrap(), vec![0x01, 0x02, 0x03]);
/// ```
#[derive(Debug, Clone)]
pub struct Descriptor {
    baseunits: BaseUnits,
    byteorder: ByteOrder,
    bitorder: Option<BitOrder>,
    fields: Vec<ResolvedField>,
    total_size: usize,
    advisories: Vec<Advisory>,
}

impl Descriptor {
    /// Resolves the layout of `fields` and builds the descriptor.
    ///
    /// `bitorder` must be `None` for byte-based descriptors; bit-based ones
    /// default to [BitOrder::MsbFirst] when it is omitted. `explicit_size`
    /// pads the record beyond its last field; a value smaller than the span
    /// of the fields is rejected.
    pub fn resolve(
        baseunits: BaseUnits,
        byteorder: ByteOrder,
        bitorder: Option<BitOrder>,
        fields: Vec<FieldSpec>,
        explicit_size: Option<usize>,
    ) -> Result<Self, LayoutError> {
        let layout = layout::resolve(baseunits, byteorder, bitorder, &fields, explicit_size)?;

        let bitorder = match baseunits {
            BaseUnits::Bits => Some(bitorder.unwrap_or_default()),
            BaseUnits::Bytes => None,
        };

        Ok(Descriptor {
            baseunits,
            byteorder: byteorder.resolved(),
            bitorder,
            fields: layout.fields,
            total_size: layout.total_size,
            advisories: layout.advisories,
        })
    }

    /// Starts a builder for a descriptor with the given base units.
    pub fn builder(baseunits: BaseUnits) -> DescriptorBuilder {
        DescriptorBuilder {
            baseunits,
            byteorder: ByteOrder::default(),
            bitorder: None,
            fields: Vec::new(),
            size: None,
        }
    }

    pub fn baseunits(&self) -> BaseUnits {
        self.baseunits
    }

    /// Effective byte order; never [ByteOrder::Native].
    pub fn byteorder(&self) -> ByteOrder {
        self.byteorder
    }

    pub fn bitorder(&self) -> Option<BitOrder> {
        self.bitorder
    }

    /// Total record size in base units.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Total record size converted to the requested unit. Bits round up to
    /// whole bytes.
    pub fn size_in(&self, units: BaseUnits) -> usize {
        match (self.baseunits, units) {
            (BaseUnits::Bits, BaseUnits::Bytes) => self.total_size.div_ceil(8),
            (BaseUnits::Bytes, BaseUnits::Bits) => self.total_size * 8,
            _ => self.total_size,
        }
    }

    /// Exact length in bytes of the buffers [decode](Descriptor::decode)
    /// consumes and [encode](Descriptor::encode) produces.
    pub fn byte_len(&self) -> usize {
        self.size_in(BaseUnits::Bytes)
    }

    /// Nominal ordered field list; nested record fields appear as a single
    /// entry carrying their own descriptor.
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Flat leaf-field list: nested record fields are spliced in with
    /// dot-qualified names and offsets shifted into this record's address
    /// space.
    pub fn flat_fields(&self) -> Vec<ResolvedField> {
        layout::flatten(&self.fields, "", 0)
    }

    /// Warning-class diagnostics collected during resolution.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Constructs a record from field defaults; fields with no declared
    /// default get a kind-derived zero value.
    pub fn default_record(&self) -> Record {
        self.fields
            .iter()
            .map(|field| {
                let value = field
                    .default
                    .clone()
                    .unwrap_or_else(|| layout::zero_value(field, self.baseunits));
                (field.name.clone(), value)
            })
            .collect()
    }

    /// Decodes a byte buffer of exactly [byte_len](Descriptor::byte_len)
    /// bytes into a [Record].
    pub fn decode(&self, data: &[u8]) -> Result<Record, DecodeError> {
        codec::decode(self, data)
    }

    /// Encodes a record into a freshly allocated buffer of exactly
    /// [byte_len](Descriptor::byte_len) bytes. Fields absent from the record
    /// fall back to their declared default.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>, EncodeError> {
        codec::encode(self, record)
    }

    /// Wraps the descriptor in an [Arc] for use as a nested record type.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Builder-style construction of a [Descriptor].
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    baseunits: BaseUnits,
    byteorder: ByteOrder,
    bitorder: Option<BitOrder>,
    fields: Vec<FieldSpec>,
    size: Option<usize>,
}

impl DescriptorBuilder {
    pub fn byteorder(mut self, byteorder: ByteOrder) -> Self {
        self.byteorder = byteorder;
        self
    }

    pub fn bitorder(mut self, bitorder: BitOrder) -> Self {
        self.bitorder = Some(bitorder);
        self
    }

    /// Explicit total size in base units.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn resolve(self) -> Result<Descriptor, LayoutError> {
        Descriptor::resolve(
            self.baseunits,
            self.byteorder,
            self.bitorder,
            self.fields,
            self.size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::TypeKind;

    fn sub_descriptor() -> Arc<Descriptor> {
        Descriptor::builder(BaseUnits::Bytes)
            .field(FieldSpec::from_spec("x", "u2").unwrap())
            .field(FieldSpec::from_spec("y", "u2").unwrap())
            .resolve()
            .unwrap()
            .into_shared()
    }

    #[test]
    fn test_nested_record_layout() {
        let descriptor = Descriptor::builder(BaseUnits::Bytes)
            .field(FieldSpec::from_spec("head", "u4").unwrap())
            .field(FieldSpec::record("sub", sub_descriptor()))
            .resolve()
            .unwrap();

        assert_eq!(descriptor.total_size(), 8);

        let flat = descriptor.flat_fields();
        let names: Vec<&str> = flat.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["head", "sub.x", "sub.y"]);
        assert_eq!(flat[1].offset, 4);
        assert_eq!(flat[2].offset, 6);
    }

    #[test]
    fn test_nested_record_size_inferred() {
        let field = FieldSpec::record("sub", sub_descriptor());
        assert_eq!(field.effective_size_signed().unwrap(), (4, false));
    }

    #[test]
    fn test_nested_base_unit_mismatch_rejected() {
        let bit_sub = Descriptor::builder(BaseUnits::Bits)
            .field(FieldSpec::from_spec("v", "u8").unwrap())
            .resolve()
            .unwrap()
            .into_shared();

        let err = Descriptor::builder(BaseUnits::Bytes)
            .field(FieldSpec::record("sub", bit_sub))
            .resolve()
            .unwrap_err();
        assert_eq!(err, LayoutError::IncompatibleBaseUnits("sub".to_string()));
    }

    #[test]
    fn test_size_in_conversions() {
        let bits = Descriptor::builder(BaseUnits::Bits)
            .field(FieldSpec::from_spec("v", "u12").unwrap())
            .resolve()
            .unwrap();
        assert_eq!(bits.total_size(), 12);
        assert_eq!(bits.size_in(BaseUnits::Bits), 12);
        assert_eq!(bits.size_in(BaseUnits::Bytes), 2);
        assert_eq!(bits.byte_len(), 2);

        let bytes = Descriptor::builder(BaseUnits::Bytes)
            .field(FieldSpec::from_spec("v", "u4").unwrap())
            .resolve()
            .unwrap();
        assert_eq!(bytes.size_in(BaseUnits::Bits), 32);
        assert_eq!(bytes.byte_len(), 4);
    }

    #[test]
    fn test_native_byteorder_pinned() {
        let descriptor = Descriptor::builder(BaseUnits::Bytes)
            .byteorder(ByteOrder::Native)
            .field(FieldSpec::from_spec("v", "u2").unwrap())
            .resolve()
            .unwrap();
        assert_ne!(descriptor.byteorder(), ByteOrder::Native);
    }

    #[test]
    fn test_default_record_uses_declared_defaults() {
        let descriptor = Descriptor::builder(BaseUnits::Bytes)
            .field(
                FieldSpec::from_spec("id", "u2")
                    .unwrap()
                    .with_default(7u64),
            )
            .field(FieldSpec::new("flag", TypeKind::Bool))
            .resolve()
            .unwrap();

        let record = descriptor.default_record();
        assert_eq!(record["id"], crate::value::Value::UInt(7));
        assert_eq!(record["flag"], crate::value::Value::Bool(false));
    }

    #[test]
    fn test_field_lookup() {
        let descriptor = Descriptor::builder(BaseUnits::Bytes)
            .field(FieldSpec::from_spec("id", "u2").unwrap())
            .resolve()
            .unwrap();
        assert_eq!(descriptor.field("id").unwrap().size, 2);
        assert!(descriptor.field("nope").is_none());
    }
}
