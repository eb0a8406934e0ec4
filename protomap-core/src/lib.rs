pub mod contract;
pub mod errors;
pub mod schema;
pub mod value;

pub use contract::{FieldDescriptor, MessageContract, NestedRef, ProtoContract, WireKind};
pub use errors::{Result, SchemaError};
pub use schema::{MessageSchema, SchemaField, WirePrimitive};
pub use value::{Record, Value};
