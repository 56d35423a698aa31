//! Layout resolution: turns an ordered list of [FieldSpec]s into a flat,
//! validated layout with absolute offsets and a known total size.

use crate::descriptor::{BaseUnits, BitOrder, ByteOrder};
use crate::enummap::{EnumBase, EnumMap, RawEnumValue};
use crate::errors::LayoutError;
use crate::field::{FieldSpec, TypeKind};
use crate::value::Value;

/// One field after resolution: absolute offset and item size in base units,
/// effective byte/bit order, signedness. Immutable once built.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub name: String,
    pub kind: TypeKind,
    /// Absolute offset from the start of the record, in base units.
    pub offset: usize,
    /// Size of one item, in base units.
    pub size: usize,
    /// Number of items for sequence fields; `None` for scalars.
    pub repeat: Option<usize>,
    pub signed: bool,
    pub byteorder: ByteOrder,
    pub bitorder: Option<BitOrder>,
    pub default: Option<Value>,
}

impl ResolvedField {
    /// Total span of the field in base units: `size * repeat`.
    pub fn footprint(&self) -> usize {
        self.size * self.repeat.unwrap_or(1)
    }
}

/// Warning-class diagnostics collected during resolution.
///
/// Advisories never fail resolution; they flag layouts that are legal but
/// usually indicate a schema mistake, such as an undeclared gap whose
/// following field forgot an explicit offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// An explicit offset points before the end of the preceding field.
    OverlappingOffset {
        field: String,
        offset: usize,
        expected: usize,
    },
    /// The resolved fields do not tile the total size contiguously.
    NonContiguousLayout { gap_at: usize, gap_len: usize },
    /// A bit-based record whose total size is not a whole number of bytes.
    BitSizeNotByteAligned { total_bits: usize },
}

#[derive(Debug)]
pub(crate) struct ResolvedLayout {
    pub fields: Vec<ResolvedField>,
    pub total_size: usize,
    pub advisories: Vec<Advisory>,
}

/// Walks the field list in declaration order, computing absolute offsets and
/// the total record size.
///
/// An explicit field offset is taken verbatim and bridges intentional gaps;
/// without one the cursor continues from the previous field. No heuristic gap
/// detection is performed: when a field present in the real binary layout is
/// omitted from the declaration, subsequent implicit offsets are silently
/// wrong unless the next field carries an explicit offset.
pub(crate) fn resolve(
    baseunits: BaseUnits,
    byteorder: ByteOrder,
    bitorder: Option<BitOrder>,
    specs: &[FieldSpec],
    explicit_size: Option<usize>,
) -> Result<ResolvedLayout, LayoutError> {
    let bitorder = match (baseunits, bitorder) {
        (BaseUnits::Bytes, Some(_)) => return Err(LayoutError::BitOrderNotAllowed),
        (BaseUnits::Bytes, None) => None,
        (BaseUnits::Bits, order) => Some(order.unwrap_or_default()),
    };

    // Native byte order is pinned to the host order here, once, so that
    // decode and encode always agree.
    let byteorder = byteorder.resolved();

    let mut fields: Vec<ResolvedField> = Vec::with_capacity(specs.len());
    let mut advisories = Vec::new();
    let mut cursor = 0usize;
    let mut max_end = 0usize;

    for spec in specs {
        if fields.iter().any(|f| f.name == spec.name) {
            return Err(LayoutError::DuplicateFieldName(spec.name.clone()));
        }

        let (size, signed) = spec.effective_size_signed()?;

        if let Some(hint) = spec.byteorder_hint() {
            if hint.resolved() != byteorder {
                return Err(LayoutError::ConflictingFieldSpec(spec.name.clone()));
            }
        }

        if let TypeKind::Record(nested) = &spec.kind {
            if nested.baseunits() != baseunits {
                return Err(LayoutError::IncompatibleBaseUnits(spec.name.clone()));
            }
        }

        // Width-exact numeric fields live in a u64 accumulator.
        let item_bits = size
            .checked_mul(baseunits.bits_per_unit())
            .ok_or_else(|| LayoutError::SizeOverflow(spec.name.clone()))?;
        if matches!(spec.kind, TypeKind::Bool | TypeKind::Int | TypeKind::Float) && item_bits > 64 {
            return Err(LayoutError::InvalidFieldSize(spec.name.clone()));
        }

        if let TypeKind::Enum(map) = &spec.kind {
            check_enum_members(&spec.name, map, item_bits, signed)?;
        }

        let offset = match spec.offset {
            Some(offset) => {
                if offset < cursor {
                    advisories.push(Advisory::OverlappingOffset {
                        field: spec.name.clone(),
                        offset,
                        expected: cursor,
                    });
                }
                offset
            }
            None => cursor,
        };

        let field = ResolvedField {
            name: spec.name.clone(),
            kind: spec.kind.clone(),
            offset,
            size,
            repeat: spec.repeat,
            signed,
            byteorder,
            bitorder,
            default: spec.default.clone(),
        };

        let footprint = size
            .checked_mul(spec.repeat.unwrap_or(1))
            .ok_or_else(|| LayoutError::SizeOverflow(spec.name.clone()))?;
        cursor = offset
            .checked_add(footprint)
            .ok_or_else(|| LayoutError::SizeOverflow(spec.name.clone()))?;
        max_end = max_end.max(cursor);
        fields.push(field);
    }

    let total_size = match explicit_size {
        Some(given) if given < max_end => {
            return Err(LayoutError::SizeTooSmall {
                given,
                required: max_end,
            });
        }
        Some(given) => given,
        None => max_end,
    };

    check_tiling(&fields, total_size, &mut advisories);

    if baseunits == BaseUnits::Bits && total_size % 8 != 0 {
        advisories.push(Advisory::BitSizeNotByteAligned {
            total_bits: total_size,
        });
    }

    Ok(ResolvedLayout {
        fields,
        total_size,
        advisories,
    })
}

/// Flags spans of the record not covered by any field. Overlaps are already
/// reported per field, so the walk only advances.
fn check_tiling(fields: &[ResolvedField], total_size: usize, advisories: &mut Vec<Advisory>) {
    let mut spans: Vec<(usize, usize)> = fields
        .iter()
        .map(|f| (f.offset, f.offset + f.footprint()))
        .collect();
    spans.sort_unstable();

    let mut end = 0usize;
    for (start, span_end) in spans {
        if start > end {
            advisories.push(Advisory::NonContiguousLayout {
                gap_at: end,
                gap_len: start - end,
            });
        }
        end = end.max(span_end);
    }

    if end < total_size {
        advisories.push(Advisory::NonContiguousLayout {
            gap_at: end,
            gap_len: total_size - end,
        });
    }
}

/// Validates every enum member against the field's resolved width, so that
/// encoding a member drawn from the table can never fail per call.
fn check_enum_members(
    name: &str,
    map: &EnumMap,
    item_bits: usize,
    signed: bool,
) -> Result<(), LayoutError> {
    match map.base() {
        EnumBase::Int => {
            if item_bits > 64 {
                return Err(LayoutError::InvalidFieldSize(name.to_string()));
            }
            let umax = if item_bits == 64 {
                u64::MAX
            } else {
                (1u64 << item_bits) - 1
            };
            for (_, raw) in map.members() {
                let RawEnumValue::Int(v) = raw else { continue };
                let fits = if signed {
                    let max = (umax >> 1) as i64;
                    *v >= -max - 1 && *v <= max
                } else {
                    *v >= 0 && (*v as u64) <= umax
                };
                if !fits {
                    return Err(LayoutError::EnumMemberOutOfRange(name.to_string()));
                }
            }
        }
        EnumBase::Bytes | EnumBase::Str => {
            if item_bits % 8 != 0 {
                return Err(LayoutError::InvalidFieldSize(name.to_string()));
            }
            let byte_len = item_bits / 8;
            for (_, raw) in map.members() {
                let len = match raw {
                    RawEnumValue::Bytes(blob) => blob.len(),
                    RawEnumValue::Str(text) => text.len(),
                    RawEnumValue::Int(_) => continue,
                };
                if len != byte_len {
                    return Err(LayoutError::EnumMemberOutOfRange(name.to_string()));
                }
            }
        }
    }

    Ok(())
}

/// Recursively splices nested record fields into a flat leaf-field list with
/// dot-qualified names and offsets shifted into the root's address space.
pub(crate) fn flatten(fields: &[ResolvedField], prefix: &str, shift: usize) -> Vec<ResolvedField> {
    let mut out = Vec::new();

    for field in fields {
        match &field.kind {
            TypeKind::Record(nested) if field.repeat.is_none() => {
                let qualified = format!("{prefix}{}.", field.name);
                out.extend(flatten(
                    nested.fields(),
                    &qualified,
                    shift + field.offset,
                ));
            }
            _ => {
                let mut leaf = field.clone();
                leaf.name = format!("{prefix}{}", field.name);
                leaf.offset += shift;
                out.push(leaf);
            }
        }
    }

    out
}

/// Zero value used by [Descriptor::default_record](crate::descriptor::Descriptor::default_record)
/// for fields that carry no explicit default.
pub(crate) fn zero_value(field: &ResolvedField, baseunits: BaseUnits) -> Value {
    let item = match &field.kind {
        TypeKind::Bool => Value::Bool(false),
        TypeKind::Int if field.signed => Value::Int(0),
        TypeKind::Int | TypeKind::Complex => Value::UInt(0),
        TypeKind::Float => Value::Float(0.0),
        TypeKind::Bytes => Value::Bytes(vec![0; byte_len(field.size, baseunits)]),
        TypeKind::Str => Value::Str("\0".repeat(byte_len(field.size, baseunits))),
        TypeKind::Enum(map) => {
            // Deterministic: the first member in name order.
            let name = map
                .names()
                .next()
                .expect("enum maps cannot be empty")
                .to_string();
            Value::Enum(name)
        }
        TypeKind::Record(nested) => Value::Record(nested.default_record()),
    };

    match field.repeat {
        Some(n) => Value::Seq(vec![item; n]),
        None => item,
    }
}

fn byte_len(size: usize, baseunits: BaseUnits) -> usize {
    match baseunits {
        BaseUnits::Bytes => size,
        BaseUnits::Bits => size.div_ceil(8),
    }
}
