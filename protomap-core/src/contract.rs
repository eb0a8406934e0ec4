use std::fmt;
use std::str::FromStr;

use crate::errors::{Result, SchemaError};
use crate::value::Record;

/// Wire kind declared per field.
///
/// Determines both the runtime value shape expected on the record and the
/// wire-level primitive the field maps to once the schema is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    Int32,
    Int64,
    Double,
    String,
    Bool,
    Bytes,
    /// Encoded as int32 on the wire; records carry the numeric code.
    Enum,
    /// Nested message; requires a nested contract reference.
    Message,
    /// Repeated occurrence of a nested message; requires a nested contract reference.
    Repeated,
}

impl WireKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireKind::Int32 => "int32",
            WireKind::Int64 => "int64",
            WireKind::Double => "double",
            WireKind::String => "string",
            WireKind::Bool => "bool",
            WireKind::Bytes => "bytes",
            WireKind::Enum => "enum",
            WireKind::Message => "message",
            WireKind::Repeated => "repeated",
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "int32" => Ok(WireKind::Int32),
            "int64" => Ok(WireKind::Int64),
            "double" => Ok(WireKind::Double),
            "string" => Ok(WireKind::String),
            "bool" => Ok(WireKind::Bool),
            "bytes" => Ok(WireKind::Bytes),
            "enum" => Ok(WireKind::Enum),
            "message" => Ok(WireKind::Message),
            "repeated" => Ok(WireKind::Repeated),
            other => Err(SchemaError::UnsupportedKind(other.to_string())),
        }
    }
}

impl TryFrom<i32> for WireKind {
    type Error = SchemaError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(WireKind::Int32),
            1 => Ok(WireKind::Int64),
            2 => Ok(WireKind::Double),
            3 => Ok(WireKind::String),
            4 => Ok(WireKind::Bool),
            5 => Ok(WireKind::Bytes),
            6 => Ok(WireKind::Enum),
            7 => Ok(WireKind::Message),
            8 => Ok(WireKind::Repeated),
            other => Err(SchemaError::UnsupportedKind(format!("kind code {}", other))),
        }
    }
}

/// Reference to the contract of a nested message type.
///
/// The explicit replacement for passing the nested class itself: resolution
/// calls the function to obtain the nested contract and recurses into it.
pub type NestedRef = fn() -> MessageContract;

/// Declares one field's wire encoding: caller-assigned id, optional wire name
/// override, wire kind, and (for Message/Repeated) the nested contract.
///
/// Construction performs no validation; a missing nested reference or an
/// out-of-range id surfaces at resolution time.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub id: u32,
    /// The field's own name on the record / struct.
    pub name: String,
    /// Name visible on the wire description; defaults to `name`.
    pub wire_name: Option<String>,
    pub kind: WireKind,
    pub nested: Option<NestedRef>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, id: u32, kind: WireKind) -> Self {
        FieldDescriptor {
            id,
            name: name.into(),
            wire_name: None,
            kind,
            nested: None,
        }
    }

    /// A singular nested-message field.
    pub fn message(name: impl Into<String>, id: u32, nested: NestedRef) -> Self {
        FieldDescriptor::new(name, id, WireKind::Message).nested(nested)
    }

    /// A repeated nested-message field.
    pub fn repeated(name: impl Into<String>, id: u32, nested: NestedRef) -> Self {
        FieldDescriptor::new(name, id, WireKind::Repeated).nested(nested)
    }

    /// Override the name used on the wire description.
    pub fn wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    pub fn nested(mut self, nested: NestedRef) -> Self {
        self.nested = Some(nested);
        self
    }
}

/// Declares a type as a serialisable message: its wire type name plus the
/// accumulated field descriptors, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContract {
    pub type_name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl MessageContract {
    pub fn new(type_name: impl Into<String>) -> Self {
        MessageContract {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Contract named after the Rust type's own declared name, mirroring the
    /// default of taking the class name when no override is given.
    pub fn of<T>() -> Self {
        let full = std::any::type_name::<T>();
        let name = full.rsplit("::").next().unwrap_or(full);
        MessageContract::new(name)
    }

    /// Add a field descriptor. Re-declaring an already present field name
    /// replaces its descriptor in place; distinct names accumulate in
    /// declaration order.
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        match self.fields.iter_mut().find(|f| f.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.fields.push(descriptor),
        }
        self
    }
}

/// Implemented next to each message struct; the declare-once surface that
/// binds a type to its contract and to its record projection.
pub trait ProtoContract: Sized {
    /// The message contract: wire type name plus field descriptor table.
    fn contract() -> MessageContract;

    /// Project the instance into its named-field record form.
    fn to_record(&self) -> Record;

    /// Rebuild an instance from a decoded record. Fields absent from the
    /// record read back as their defaults.
    fn from_record(record: Record) -> Result<Self>;
}
