//! Property tests: decode/encode round-trips over randomly generated
//! contiguous layouts and in-range values.

use bitrec::descriptor::{BaseUnits, BitOrder, Descriptor};
use bitrec::field::FieldSpec;
use bitrec::value::{Record, Value};
use proptest::collection::vec;
use proptest::prelude::*;

/// Builds a bit-based descriptor whose unsigned fields tile the record
/// contiguously, padded to a whole number of bytes.
fn contiguous_descriptor(widths: &[usize], bitorder: BitOrder) -> Descriptor {
    let mut fields: Vec<FieldSpec> = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| FieldSpec::from_spec(format!("f{i}"), &format!("u{w}")).unwrap())
        .collect();

    let total: usize = widths.iter().sum();
    if total % 8 != 0 {
        fields.push(
            FieldSpec::from_spec("pad", &format!("u{}", 8 - total % 8)).unwrap(),
        );
    }

    Descriptor::builder(BaseUnits::Bits)
        .bitorder(bitorder)
        .fields(fields)
        .resolve()
        .unwrap()
}

proptest! {
    #[test]
    fn buffer_round_trips_through_decode_encode(
        widths in vec(1usize..=64, 1..12),
        seed in vec(any::<u8>(), 96),
    ) {
        for bitorder in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
            let descriptor = contiguous_descriptor(&widths, bitorder);
            let buffer = &seed[..descriptor.byte_len()];

            let record = descriptor.decode(buffer).unwrap();
            let encoded = descriptor.encode(&record).unwrap();
            prop_assert_eq!(&encoded[..], buffer);
        }
    }

    #[test]
    fn unsigned_values_round_trip(
        widths_and_values in vec((1usize..=64).prop_flat_map(|w| {
            let max = if w == 64 { u64::MAX } else { (1u64 << w) - 1 };
            (Just(w), 0u64..=max)
        }), 1..10),
    ) {
        let widths: Vec<usize> = widths_and_values.iter().map(|(w, _)| *w).collect();
        let descriptor = contiguous_descriptor(&widths, BitOrder::MsbFirst);

        let mut record = descriptor.default_record();
        for (i, (_, value)) in widths_and_values.iter().enumerate() {
            record.set(format!("f{i}"), *value);
        }

        let encoded = descriptor.encode(&record).unwrap();
        let decoded = descriptor.decode(&encoded).unwrap();
        for (i, (_, value)) in widths_and_values.iter().enumerate() {
            prop_assert_eq!(decoded.get(&format!("f{i}")), Some(&Value::UInt(*value)));
        }
    }

    #[test]
    fn signed_values_round_trip(
        width in 2usize..=64,
        raw in any::<i64>(),
    ) {
        let max = if width == 64 { i64::MAX } else { (1i64 << (width - 1)) - 1 };
        let min = -max - 1;
        let value = raw.clamp(min, max);

        let descriptor = Descriptor::builder(BaseUnits::Bits)
            .field(FieldSpec::from_spec("v", &format!("i{width}")).unwrap())
            .resolve()
            .unwrap();

        let mut record = Record::new();
        record.set("v", value);

        let encoded = descriptor.encode(&record).unwrap();
        let decoded = descriptor.decode(&encoded).unwrap();
        prop_assert_eq!(decoded.get("v"), Some(&Value::Int(value)));
    }

    #[test]
    fn byte_records_round_trip(
        sizes in vec(1usize..=8, 1..8),
        seed in vec(any::<u8>(), 64),
    ) {
        let fields = sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| FieldSpec::from_spec(format!("f{i}"), &format!("u{s}")).unwrap());

        let descriptor = Descriptor::builder(BaseUnits::Bytes)
            .fields(fields)
            .resolve()
            .unwrap();

        let buffer = &seed[..descriptor.byte_len()];
        let record = descriptor.decode(buffer).unwrap();
        prop_assert_eq!(&descriptor.encode(&record).unwrap()[..], buffer);
    }
}
