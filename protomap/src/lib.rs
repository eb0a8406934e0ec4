//! Contract-driven protobuf serialisation.
//!
//! Message structs declare their wire encoding once, next to the type,
//! through a [`MessageContract`] built from [`FieldDescriptor`]s. On first
//! serialise or deserialise the contract is resolved into a structural
//! [`MessageSchema`], registered in a [`SchemaRegistry`], and reused from
//! then on. Byte-level encoding and decoding is delegated to prost.
//!
//! ```
//! use protomap::{FieldDescriptor, MessageContract, ProtoContract, Record, Serialiser, WireKind};
//!
//! #[derive(Debug, PartialEq, Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl ProtoContract for Point {
//!     fn contract() -> MessageContract {
//!         MessageContract::of::<Self>()
//!             .field(FieldDescriptor::new("x", 1, WireKind::Int32))
//!             .field(FieldDescriptor::new("y", 2, WireKind::Int32))
//!     }
//!
//!     fn to_record(&self) -> Record {
//!         Record::new().with_i32("x", self.x).with_i32("y", self.y)
//!     }
//!
//!     fn from_record(mut record: Record) -> protomap::Result<Self> {
//!         Ok(Point {
//!             x: record.take_i32("x").unwrap_or_default(),
//!             y: record.take_i32("y").unwrap_or_default(),
//!         })
//!     }
//! }
//!
//! let serialiser = Serialiser::new();
//! let bytes = serialiser.serialise(&Point { x: 3, y: 4 }).unwrap();
//! let decoded: Point = serialiser.deserialise(&bytes).unwrap();
//! assert_eq!(decoded, Point { x: 3, y: 4 });
//! ```

mod codec;
mod registry;
mod registry_test;
mod serialiser;

pub use protomap_core::{
    FieldDescriptor, MessageContract, MessageSchema, NestedRef, ProtoContract, Record, Result,
    SchemaError, SchemaField, Value, WireKind, WirePrimitive,
};
pub use registry::SchemaRegistry;
pub use serialiser::Serialiser;
