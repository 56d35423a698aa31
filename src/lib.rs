//! # bitrec
//!
//! Declarative descriptors and bit-level codecs for fixed-size binary records.
//!
//! Declare a record's fields (type kind, size, optional offset, signedness,
//! repeat count), let the layout resolver compute absolute offsets and the
//! total size, then decode byte buffers into structured records and encode
//! them back. Fields may sit at arbitrary bit granularity with independent
//! byte order and bit order; nested records and fixed-length sequences are
//! flattened into the parent's address space.
//!
//! ## Example
//!
//! ```
//! use bitrec::descriptor::{BaseUnits, Descriptor};
//! use bitrec::field::FieldSpec;
//! use bitrec::value::Value;
//!
//! // An 8-bit record: one flag bit, a 3-bit mode, a 4-bit level.
//! let descriptor = Descriptor::builder(BaseUnits::Bits)
//!     .field(FieldSpec::new("flag", bitrec::field::TypeKind::Bool))
//!     .field(FieldSpec::from_spec("mode", "u3").unwrap())
//!     .field(FieldSpec::from_spec("level", "u4").unwrap())
//!     .resolve()
//!     .unwrap();
//!
//! let record = descriptor.decode(&[0b1101_1010]).unwrap();
//! assert_eq!(record["flag"], Value::Bool(true));
//! assert_eq!(record["mode"], Value::UInt(5));
//! assert_eq!(record["level"], Value::UInt(10));
//! assert_eq!(descriptor.encode(&record).unwrap(), vec![0b1101_1010]);
//! ```
//!
//! A [descriptor::Descriptor] is built once and is then safe to share across
//! threads for any number of concurrent decode/encode calls.

pub mod bits;
pub mod descriptor;
pub mod enummap;
pub mod errors;
pub mod field;
pub mod layout;
pub mod typespec;
pub mod value;

mod codec;

#[cfg(feature = "serde")]
pub mod serde;
