use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire-level primitive a resolved field maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WirePrimitive {
    Int32,
    Int64,
    Double,
    String,
    Bool,
    Bytes,
    /// Nested message, carrying the resolved wire type name.
    Message(String),
}

impl fmt::Display for WirePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WirePrimitive::Int32 => f.write_str("int32"),
            WirePrimitive::Int64 => f.write_str("int64"),
            WirePrimitive::Double => f.write_str("double"),
            WirePrimitive::String => f.write_str("string"),
            WirePrimitive::Bool => f.write_str("bool"),
            WirePrimitive::Bytes => f.write_str("bytes"),
            WirePrimitive::Message(name) => f.write_str(name),
        }
    }
}

/// One resolved field of a message schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub id: u32,
    /// The field's own name on the record / struct.
    pub name: String,
    /// Name visible on the wire description.
    pub wire_name: String,
    pub primitive: WirePrimitive,
    pub repeated: bool,
}

/// Fully resolved structural description of a message type.
///
/// Fields keep their declaration order. A schema is registered at most once
/// per type name, with all transitively nested types resolved before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSchema {
    pub type_name: String,
    pub fields: Vec<SchemaField>,
}

impl MessageSchema {
    pub fn field_by_id(&self, id: u32) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
