//! Bit-level codec engine: decoding and encoding records against a resolved
//! [Descriptor].
//!
//! Every offset and size is converted to bits internally, so byte-based and
//! bit-based descriptors share one extraction path. Integers are
//! width-exact two's-complement: decode sign-extends, encode range-checks and
//! never truncates.

use crate::bits;
use crate::descriptor::{BitOrder, ByteOrder, Descriptor};
use crate::enummap::{EnumBase, RawEnumValue};
use crate::errors::{DecodeError, EncodeError};
use crate::field::TypeKind;
use crate::layout::ResolvedField;
use crate::value::{Record, Value};

pub(crate) fn decode(descriptor: &Descriptor, data: &[u8]) -> Result<Record, DecodeError> {
    let expected = descriptor.byte_len();
    if data.len() != expected {
        return Err(DecodeError::BufferSizeMismatch {
            expected,
            actual: data.len(),
        });
    }

    decode_record(descriptor, data, 0)
}

pub(crate) fn encode(descriptor: &Descriptor, record: &Record) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![0u8; descriptor.byte_len()];
    encode_record(descriptor, record, &mut buf, 0)?;
    Ok(buf)
}

fn decode_record(
    descriptor: &Descriptor,
    data: &[u8],
    bit_base: usize,
) -> Result<Record, DecodeError> {
    let unit = descriptor.baseunits().bits_per_unit();
    let mut record = Record::new();

    for field in descriptor.fields() {
        let item_bits = field.size * unit;
        let start = bit_base + field.offset * unit;

        let value = match field.repeat {
            Some(count) => {
                let mut items = Vec::with_capacity(count);
                for i in 0..count {
                    items.push(decode_scalar(field, item_bits, data, start + i * item_bits)?);
                }
                Value::Seq(items)
            }
            None => decode_scalar(field, item_bits, data, start)?,
        };

        record.set(field.name.clone(), value);
    }

    Ok(record)
}

fn decode_scalar(
    field: &ResolvedField,
    item_bits: usize,
    data: &[u8],
    start: usize,
) -> Result<Value, DecodeError> {
    let bitorder = field.bitorder.unwrap_or_default();

    match &field.kind {
        TypeKind::Complex => Err(DecodeError::UnsupportedType(field.name.clone())),
        TypeKind::Bool => {
            let raw = bits::read_bits(data, start, item_bits, bitorder)?;
            Ok(Value::Bool(raw != 0))
        }
        TypeKind::Int => {
            let raw = read_uint(data, start, item_bits, field.byteorder, bitorder, &field.name)?;
            if field.signed {
                Ok(Value::Int(bits::sign_extend(raw, item_bits)))
            } else {
                Ok(Value::UInt(raw))
            }
        }
        TypeKind::Float => {
            let raw = read_uint(data, start, item_bits, field.byteorder, bitorder, &field.name)?;
            match item_bits {
                32 => Ok(Value::Float(f32::from_bits(raw as u32) as f64)),
                64 => Ok(Value::Float(f64::from_bits(raw))),
                _ => Err(DecodeError::UnsupportedType(field.name.clone())),
            }
        }
        TypeKind::Bytes => {
            let blob = read_blob(data, start, item_bits, bitorder, &field.name)?;
            Ok(Value::Bytes(blob))
        }
        TypeKind::Str => {
            let blob = read_blob(data, start, item_bits, bitorder, &field.name)?;
            let text = String::from_utf8(blob)
                .map_err(|_| DecodeError::InvalidText(field.name.clone()))?;
            Ok(Value::Str(text))
        }
        TypeKind::Enum(map) => {
            let raw = match map.base() {
                EnumBase::Int => {
                    let raw =
                        read_uint(data, start, item_bits, field.byteorder, bitorder, &field.name)?;
                    let v = if field.signed {
                        bits::sign_extend(raw, item_bits)
                    } else if raw <= i64::MAX as u64 {
                        raw as i64
                    } else {
                        return Err(DecodeError::UnknownEnumValue(field.name.clone()));
                    };
                    RawEnumValue::Int(v)
                }
                EnumBase::Bytes => {
                    RawEnumValue::Bytes(read_blob(data, start, item_bits, bitorder, &field.name)?)
                }
                EnumBase::Str => {
                    let blob = read_blob(data, start, item_bits, bitorder, &field.name)?;
                    let text = String::from_utf8(blob)
                        .map_err(|_| DecodeError::InvalidText(field.name.clone()))?;
                    RawEnumValue::Str(text)
                }
            };

            match map.name_of(&raw) {
                Some(name) => Ok(Value::Enum(name.to_string())),
                None => Err(DecodeError::UnknownEnumValue(field.name.clone())),
            }
        }
        TypeKind::Record(nested) => Ok(Value::Record(decode_record(nested, data, start)?)),
    }
}

fn encode_record(
    descriptor: &Descriptor,
    record: &Record,
    buf: &mut [u8],
    bit_base: usize,
) -> Result<(), EncodeError> {
    let unit = descriptor.baseunits().bits_per_unit();

    for field in descriptor.fields() {
        let value = record
            .get(&field.name)
            .or(field.default.as_ref())
            .ok_or_else(|| EncodeError::MissingField(field.name.clone()))?;

        let item_bits = field.size * unit;
        let start = bit_base + field.offset * unit;

        match field.repeat {
            Some(count) => {
                let Value::Seq(items) = value else {
                    return Err(EncodeError::TypeMismatch(field.name.clone()));
                };
                if items.len() != count {
                    return Err(EncodeError::ValueOutOfRange(field.name.clone()));
                }
                for (i, item) in items.iter().enumerate() {
                    encode_scalar(field, item_bits, item, buf, start + i * item_bits)?;
                }
            }
            None => encode_scalar(field, item_bits, value, buf, start)?,
        }
    }

    Ok(())
}

fn encode_scalar(
    field: &ResolvedField,
    item_bits: usize,
    value: &Value,
    buf: &mut [u8],
    start: usize,
) -> Result<(), EncodeError> {
    let bitorder = field.bitorder.unwrap_or_default();

    match (&field.kind, value) {
        (TypeKind::Complex, _) => Err(EncodeError::UnsupportedType(field.name.clone())),
        (TypeKind::Bool, Value::Bool(b)) => {
            bits::write_bits(buf, start, item_bits, *b as u64, bitorder)
        }
        (TypeKind::Int, Value::UInt(v)) => {
            let raw = uint_to_raw(*v, item_bits, field.signed, &field.name)?;
            write_uint(buf, start, item_bits, raw, field.byteorder, bitorder, &field.name)
        }
        (TypeKind::Int, Value::Int(v)) => {
            let raw = int_to_raw(*v, item_bits, field.signed, &field.name)?;
            write_uint(buf, start, item_bits, raw, field.byteorder, bitorder, &field.name)
        }
        (TypeKind::Float, Value::Float(v)) => {
            let raw = match item_bits {
                32 => {
                    let narrowed = *v as f32;
                    // A finite value overflowing the binary32 range casts to
                    // infinity; that is a range error, not a representation.
                    if narrowed.is_infinite() && v.is_finite() {
                        return Err(EncodeError::ValueOutOfRange(field.name.clone()));
                    }
                    narrowed.to_bits() as u64
                }
                64 => v.to_bits(),
                _ => return Err(EncodeError::UnsupportedType(field.name.clone())),
            };
            write_uint(buf, start, item_bits, raw, field.byteorder, bitorder, &field.name)
        }
        (TypeKind::Bytes, Value::Bytes(blob)) => {
            write_blob(buf, start, item_bits, blob, bitorder, &field.name)
        }
        (TypeKind::Str, Value::Str(text)) => {
            write_blob(buf, start, item_bits, text.as_bytes(), bitorder, &field.name)
        }
        (TypeKind::Enum(map), Value::Enum(name) | Value::Str(name)) => {
            let raw = map
                .raw_of(name)
                .ok_or_else(|| EncodeError::UnknownEnumMember(field.name.clone()))?;

            match raw {
                RawEnumValue::Int(v) => {
                    let raw = int_to_raw(*v, item_bits, field.signed, &field.name)?;
                    write_uint(buf, start, item_bits, raw, field.byteorder, bitorder, &field.name)
                }
                RawEnumValue::Bytes(blob) => {
                    write_blob(buf, start, item_bits, blob, bitorder, &field.name)
                }
                RawEnumValue::Str(text) => {
                    write_blob(buf, start, item_bits, text.as_bytes(), bitorder, &field.name)
                }
            }
        }
        (TypeKind::Record(nested), Value::Record(sub)) => encode_record(nested, sub, buf, start),
        _ => Err(EncodeError::TypeMismatch(field.name.clone())),
    }
}

/// Reads `bits` as an unsigned value, honoring byte order for multi-byte
/// fields. Little-endian fields wider than 8 bits must span whole bytes.
fn read_uint(
    data: &[u8],
    start: usize,
    item_bits: usize,
    byteorder: ByteOrder,
    bitorder: BitOrder,
    name: &str,
) -> Result<u64, DecodeError> {
    if byteorder.resolved() == ByteOrder::Little && item_bits > 8 {
        if item_bits % 8 != 0 {
            return Err(DecodeError::UnsupportedType(name.to_string()));
        }
        let mut value = 0u64;
        for i in 0..item_bits / 8 {
            let byte = bits::read_bits(data, start + i * 8, 8, bitorder)?;
            value |= byte << (8 * i);
        }
        Ok(value)
    } else {
        bits::read_bits(data, start, item_bits, bitorder)
    }
}

fn write_uint(
    buf: &mut [u8],
    start: usize,
    item_bits: usize,
    raw: u64,
    byteorder: ByteOrder,
    bitorder: BitOrder,
    name: &str,
) -> Result<(), EncodeError> {
    if byteorder.resolved() == ByteOrder::Little && item_bits > 8 {
        if item_bits % 8 != 0 {
            return Err(EncodeError::UnsupportedType(name.to_string()));
        }
        for i in 0..item_bits / 8 {
            let byte = (raw >> (8 * i)) & 0xFF;
            bits::write_bits(buf, start + i * 8, 8, byte, bitorder)?;
        }
        Ok(())
    } else {
        bits::write_bits(buf, start, item_bits, raw, bitorder)
    }
}

fn read_blob(
    data: &[u8],
    start: usize,
    item_bits: usize,
    bitorder: BitOrder,
    name: &str,
) -> Result<Vec<u8>, DecodeError> {
    if item_bits % 8 != 0 {
        return Err(DecodeError::UnsupportedType(name.to_string()));
    }

    let mut blob = Vec::with_capacity(item_bits / 8);
    for i in 0..item_bits / 8 {
        blob.push(bits::read_bits(data, start + i * 8, 8, bitorder)? as u8);
    }
    Ok(blob)
}

fn write_blob(
    buf: &mut [u8],
    start: usize,
    item_bits: usize,
    blob: &[u8],
    bitorder: BitOrder,
    name: &str,
) -> Result<(), EncodeError> {
    if item_bits % 8 != 0 {
        return Err(EncodeError::UnsupportedType(name.to_string()));
    }
    // Exact fit: a value shorter or longer than the field is never padded or
    // truncated.
    if blob.len() != item_bits / 8 {
        return Err(EncodeError::ValueOutOfRange(name.to_string()));
    }

    for (i, &byte) in blob.iter().enumerate() {
        bits::write_bits(buf, start + i * 8, 8, byte as u64, bitorder)?;
    }
    Ok(())
}

fn mask(bits: usize) -> u64 {
    if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Validates an unsigned value against the field width and signedness and
/// returns the raw bit pattern.
fn uint_to_raw(v: u64, item_bits: usize, signed: bool, name: &str) -> Result<u64, EncodeError> {
    let max = if signed { mask(item_bits) >> 1 } else { mask(item_bits) };
    if v > max {
        return Err(EncodeError::ValueOutOfRange(name.to_string()));
    }
    Ok(v)
}

/// Validates a signed value against the field width and signedness and
/// returns the width-exact two's-complement bit pattern.
fn int_to_raw(v: i64, item_bits: usize, signed: bool, name: &str) -> Result<u64, EncodeError> {
    if signed {
        let max = (mask(item_bits) >> 1) as i64;
        let min = -max - 1;
        if v < min || v > max {
            return Err(EncodeError::ValueOutOfRange(name.to_string()));
        }
        Ok((v as u64) & mask(item_bits))
    } else {
        if v < 0 {
            return Err(EncodeError::ValueOutOfRange(name.to_string()));
        }
        uint_to_raw(v as u64, item_bits, false, name)
    }
}
